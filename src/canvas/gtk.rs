//! GTK4 arrangement window that runs on the **main thread**.
//!
//! # Widget tree
//!
//! ```text
//! window
//! └ .outlay                    (vertical box)
//!     ├ .canvas                (GtkFixed, drag target)
//!     │   ├ .monitor-button
//!     │   ├ .monitor-button.selected
//!     │   └ …
//!     └ .toolbar
//!         ├ .monitor-info      (label for the selected monitor)
//!         ├ GtkSpinButton      (view scale)
//!         └ .save-button
//! ```
//!
//! Buttons do not receive input themselves.  A single `GestureDrag` on the
//! canvas hit-tests through [`Arrangement::button_at`] and forwards pointer
//! positions to the drag controller.
//!
//! The save button hands the current layout to the caller's `on_save`
//! callback.  Closing the window returns the arranged monitors.

use crate::arrange::{Arrangement, Point, ViewSettings};
use crate::config::Config;
use crate::monitor::Monitor;
use gtk4::prelude::*;
use gtk4::{gdk, glib};
use log::{debug, error, info, warn};
use std::cell::RefCell;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

//  Layout constants

const CANVAS_WIDTH: f64 = 1200.0;
const CANVAS_HEIGHT: f64 = 720.0;
const MIN_VIEW_SCALE: f64 = 0.05;
const MAX_VIEW_SCALE: f64 = 0.5;

//  Default CSS

const DEFAULT_CSS: &str = r#"
.canvas {
    background-color: rgba(0, 0, 0, 0.25);
}

.monitor-button {
    background-color: rgba(80, 120, 200, 0.6);
    border: 1px solid rgba(255, 255, 255, 0.4);
    border-radius: 0;
    padding: 0;
}

.monitor-button.selected {
    background-color: rgba(80, 160, 255, 0.85);
    border-color: white;
}

.toolbar {
    padding: 6px;
}
"#;

//  Canvas widgets

struct Canvas {
    fixed: gtk4::Fixed,
    /// One widget per arrangement button, in the same order.
    widgets: Vec<gtk4::Button>,
    info: gtk4::Label,
}

impl Canvas {
    fn new(arrangement: &Arrangement, use_desc: bool) -> Self {
        let fixed = gtk4::Fixed::new();
        fixed.add_css_class("canvas");
        let (w, h) = arrangement.canvas_size();
        fixed.set_size_request(w as i32, h as i32);

        let widgets = arrangement
            .monitors()
            .iter()
            .map(|m| {
                let button = gtk4::Button::with_label(&button_label(m, use_desc));
                button.add_css_class("monitor-button");
                button.set_can_target(false);
                fixed.put(&button, 0.0, 0.0);
                button
            })
            .collect();

        let info = gtk4::Label::new(None);
        info.add_css_class("monitor-info");
        info.set_hexpand(true);
        info.set_xalign(0.0);

        Self {
            fixed,
            widgets,
            info,
        }
    }

    /// Move and resize every widget to its button rectangle.
    fn sync(&self, arrangement: &Arrangement) {
        for (widget, button) in self.widgets.iter().zip(arrangement.buttons()) {
            widget.set_size_request(button.rect.width as i32, button.rect.height as i32);
            self.fixed.move_(widget, button.rect.x, button.rect.y);
            if button.selected {
                widget.add_css_class("selected");
            } else {
                widget.remove_css_class("selected");
            }
        }
        self.info.set_text(&describe_selection(arrangement));
    }
}

fn button_label(m: &Monitor, use_desc: bool) -> String {
    if use_desc && !m.description().is_empty() {
        m.description().to_string()
    } else {
        m.name().to_string()
    }
}

fn describe_selection(arrangement: &Arrangement) -> String {
    match arrangement.selected().and_then(|name| arrangement.monitor(name)) {
        Some(m) => format!(
            "{}  {}  scale {}  transform {}  at {},{}",
            m.name(),
            m.current_mode(),
            m.scale(),
            m.transform(),
            m.x(),
            m.y()
        ),
        None => "Drag a monitor to arrange it".into(),
    }
}

//  Public API

/// Show `monitors` in an arrangement window and run the GLib main loop on
/// the current thread until the window is closed.
///
/// View-scale changes are written back to `config_path`.  Returns the
/// monitors as arranged when the window closes, or `None` if the window
/// could not be shown.
pub fn run_main_loop(
    monitors: Vec<Monitor>,
    config: Config,
    config_path: PathBuf,
    css_path: Option<PathBuf>,
    on_save: impl Fn(&[Monitor]) + 'static,
) -> Option<Vec<Monitor>> {
    if let Err(e) = gtk4::init() {
        error!("failed to initialise GTK4: {}", e);
        return None;
    }
    info!("GTK4 initialised on main thread");

    install_css(&stylesheet(css_path.as_deref()));

    let settings: ViewSettings = config.view_settings();
    let arrangement = match Arrangement::new(monitors, settings, (CANVAS_WIDTH, CANVAS_HEIGHT)) {
        Ok(a) => Rc::new(RefCell::new(a)),
        Err(e) => {
            error!("cannot arrange monitors: {}", e);
            return None;
        }
    };
    let config = Rc::new(RefCell::new(config));

    let canvas = Rc::new(Canvas::new(&arrangement.borrow(), config.borrow().use_desc));
    canvas.sync(&arrangement.borrow());

    //  Dragging
    let drag = gtk4::GestureDrag::new();
    drag.set_button(gdk::BUTTON_PRIMARY);
    {
        let arrangement = arrangement.clone();
        let canvas = canvas.clone();
        drag.connect_drag_begin(move |_, x, y| {
            let pointer = Point::new(x, y);
            let mut arr = arrangement.borrow_mut();
            let Some(name) = arr.button_at(pointer).map(str::to_string) else {
                return;
            };
            if let Err(e) = arr.begin_drag(&name, pointer) {
                warn!("{}", e);
            }
            canvas.sync(&arr);
        });
    }
    {
        let arrangement = arrangement.clone();
        let canvas = canvas.clone();
        drag.connect_drag_update(move |gesture, dx, dy| {
            let Some((x, y)) = gesture.start_point() else {
                return;
            };
            let mut arr = arrangement.borrow_mut();
            if arr.drag_to(Point::new(x + dx, y + dy)).is_some() {
                arr.process_changes();
                canvas.sync(&arr);
            }
        });
    }
    {
        let arrangement = arrangement.clone();
        drag.connect_drag_end(move |_, _, _| {
            arrangement.borrow_mut().end_drag();
        });
    }
    canvas.fixed.add_controller(drag);

    //  View scale
    let spin = gtk4::SpinButton::with_range(MIN_VIEW_SCALE, MAX_VIEW_SCALE, 0.01);
    spin.set_digits(2);
    spin.set_value(settings.view_scale);
    spin.set_tooltip_text(Some("View scale"));
    {
        let arrangement = arrangement.clone();
        let canvas = canvas.clone();
        let config = config.clone();
        spin.connect_value_changed(move |spin| {
            let value = spin.value();
            let mut arr = arrangement.borrow_mut();
            if let Err(e) = arr.set_view_scale(value) {
                warn!("{}", e);
                return;
            }
            canvas.sync(&arr);

            let mut cfg = config.borrow_mut();
            cfg.view_scale = value;
            if let Err(e) = cfg.save(&config_path) {
                warn!("{}", e);
            }
        });
    }

    let save = gtk4::Button::with_label("Save");
    save.add_css_class("save-button");
    {
        let arrangement = arrangement.clone();
        save.connect_clicked(move |_| on_save(arrangement.borrow().monitors()));
    }

    let toolbar = gtk4::Box::new(gtk4::Orientation::Horizontal, 6);
    toolbar.add_css_class("toolbar");
    toolbar.append(&canvas.info);
    toolbar.append(&spin);
    toolbar.append(&save);

    let root = gtk4::Box::new(gtk4::Orientation::Vertical, 0);
    root.add_css_class("outlay");
    root.append(&canvas.fixed);
    root.append(&toolbar);

    let window = gtk4::Window::new();
    window.set_title(Some("outlay"));
    window.set_child(Some(&root));

    let main_loop = glib::MainLoop::new(None, false);
    {
        let main_loop = main_loop.clone();
        window.connect_close_request(move |_| {
            main_loop.quit();
            glib::Propagation::Proceed
        });
    }
    window.present();

    //  Edits made outside the drag (profiles, forms) arrive as changes.
    {
        let arrangement = arrangement.clone();
        let canvas = canvas.clone();
        glib::timeout_add_local(Duration::from_millis(50), move || {
            let mut arr = arrangement.borrow_mut();
            let changes = arr.process_changes();
            if !changes.is_empty() {
                debug!("{} pending change(s)", changes.len());
                canvas.sync(&arr);
            }
            glib::ControlFlow::Continue
        });
    }

    info!("entering GLib main loop");
    main_loop.run();
    info!("GLib main loop exited");

    let monitors = arrangement.borrow_mut().take_monitors();
    Some(monitors)
}

//  Styling

/// The user's stylesheet at `path`, or the built-in one when there is none.
fn stylesheet(path: Option<&Path>) -> Cow<'static, str> {
    let Some(path) = path else {
        return Cow::Borrowed(DEFAULT_CSS);
    };
    match std::fs::read_to_string(path) {
        Ok(css) => {
            debug!("stylesheet {}", path.display());
            Cow::Owned(css)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Cow::Borrowed(DEFAULT_CSS),
        Err(e) => {
            warn!("ignoring {}: {}", path.display(), e);
            Cow::Borrowed(DEFAULT_CSS)
        }
    }
}

fn install_css(css: &str) {
    let Some(display) = gdk::Display::default() else {
        warn!("no display to style");
        return;
    };
    let provider = gtk4::CssProvider::new();
    #[allow(deprecated)]
    provider.load_from_data(css);
    gtk4::style_context_add_provider_for_display(
        &display,
        &provider,
        gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
    );
}
