//! Entry point for the **outlay** command.
//!
//! Detects the running compositor, takes a monitor snapshot and then acts
//! on the command-line flags:
//!
//! ```text
//! outlay [--list]                 print the monitors (default)
//! outlay --print-config           print the native compositor config
//! outlay --save-config            write it to the compositor's config dir
//!                                 and reload the compositor
//! outlay --save-profile NAME      store the current layout as a profile
//! outlay --apply-profile NAME     apply a profile before anything else
//! outlay --list-profiles          print the stored profile names
//! outlay --workspace-rules        print Hyprland workspace rules
//! outlay --gui                    open the arrangement canvas
//! ```
//!
//! The `--gui` flag needs the `canvas-gtk` feature.  It runs right after
//! `--apply-profile`; the saving and printing flags then act on the layout
//! the window was closed with.

use log::{error, info, warn};
use outlay::config::{xdg_config_home, Config};
use outlay::monitor::Monitor;
use outlay::profile::{Profile, ProfileStore};
use outlay::session::SessionMonitorService;
use outlay::traits::MonitorService;

/// Resolve the CSS stylesheet path.
#[cfg(feature = "canvas-gtk")]
fn css_path() -> std::path::PathBuf {
    outlay::config::config_dir().join("style.css")
}

//  Argument helpers

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

/// The argument following `flag`, if both are present.
fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

/// `--save-profile` and `--apply-profile` need a name; exit if it is missing.
fn required_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    if !has_flag(args, flag) {
        return None;
    }
    match flag_value(args, flag).filter(|v| !v.starts_with("--")) {
        Some(v) => Some(v),
        None => {
            error!("{} needs a profile name", flag);
            std::process::exit(2);
        }
    }
}

//  Main

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config_path = Config::default_path();
    let config = Config::load_or_repair(&config_path);
    let store = ProfileStore::new(ProfileStore::default_dir());

    if has_flag(&args, "--list-profiles") {
        match store.list() {
            Ok(names) => names.iter().for_each(|n| println!("{}", n)),
            Err(e) => {
                error!("{}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let service = match SessionMonitorService::from_env() {
        Ok(s) => {
            info!("detected {} session", s.session_type());
            s
        }
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let mut monitors = match service.list() {
        Ok(m) => {
            info!("found {} monitor(s)", m.len());
            m
        }
        Err(e) => {
            error!("failed to query monitors: {}", e);
            std::process::exit(1);
        }
    };

    let mut acted = false;

    if let Some(name) = required_value(&args, "--apply-profile") {
        apply_profile(&store, name, &mut monitors);
        acted = true;
    }

    if has_flag(&args, "--gui") {
        monitors = run_gui(monitors, &service, config.clone(), config_path);
        acted = true;
    }

    if let Some(name) = required_value(&args, "--save-profile") {
        if let Err(e) = store.save(name, &Profile::capture(&monitors)) {
            error!("{}", e);
            std::process::exit(1);
        }
        acted = true;
    }

    if has_flag(&args, "--workspace-rules") {
        print_workspace_rules(&service);
        acted = true;
    }

    if has_flag(&args, "--print-config") {
        print!("{}", service.render_config(&monitors, config.use_desc));
        acted = true;
    }

    if has_flag(&args, "--save-config") {
        if !save_native_config(&service, &monitors, config.use_desc) {
            std::process::exit(1);
        }
        acted = true;
    }

    if !acted || has_flag(&args, "--list") {
        print_monitors(&monitors);
    }
}

//  Actions

fn print_monitors(monitors: &[Monitor]) {
    for m in monitors {
        let mut line = format!(
            "{}: {} at {},{} scale {} transform {}",
            m.name(),
            m.current_mode(),
            m.x(),
            m.y(),
            m.scale(),
            m.transform()
        );
        if !m.is_active() {
            line.push_str(" (disabled)");
        }
        if let Some(target) = m.mirror_of() {
            line.push_str(&format!(" mirroring {}", target));
        }
        println!("{}", line);
    }
}

fn apply_profile(store: &ProfileStore, name: &str, monitors: &mut [Monitor]) {
    let profile = match store.load(name) {
        Ok(p) => p,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };
    match profile.apply(monitors) {
        Ok(unmatched) if unmatched.is_empty() => info!("applied profile {}", name),
        Ok(unmatched) => warn!(
            "applied profile {}; not connected: {}",
            name,
            unmatched.join(", ")
        ),
        Err(e) => {
            error!("profile {}: {}", name, e);
            std::process::exit(1);
        }
    }
}

fn print_workspace_rules(service: &SessionMonitorService) {
    let SessionMonitorService::Hyprland(hypr) = service else {
        warn!("workspace rules are only available on Hyprland");
        return;
    };
    match outlay::hyprland::workspace_rules::workspace_rules(hypr.ipc()) {
        Ok(rules) => rules.iter().for_each(|r| println!("{}", r)),
        Err(e) => error!("failed to query workspace rules: {}", e),
    }
}

/// Write the native config and reload the compositor.  A failed reload
/// only warns since the file is already in place.
fn save_native_config(service: &SessionMonitorService, monitors: &[Monitor], use_desc: bool) -> bool {
    match service.save_config(monitors, use_desc, &xdg_config_home()) {
        Ok(path) => info!("wrote {}", path.display()),
        Err(e) => {
            error!("failed to write native config: {}", e);
            return false;
        }
    }
    if let Err(e) = service.reload() {
        warn!("compositor reload failed: {}", e);
    }
    true
}

/// Run the arrangement window and return the layout it was closed with.
#[cfg(feature = "canvas-gtk")]
fn run_gui(
    monitors: Vec<Monitor>,
    service: &SessionMonitorService,
    config: Config,
    config_path: std::path::PathBuf,
) -> Vec<Monitor> {
    let use_desc = config.use_desc;
    let saver = service.clone();
    let on_save = move |arranged: &[Monitor]| {
        save_native_config(&saver, arranged, use_desc);
    };
    match outlay::canvas::gtk::run_main_loop(monitors, config, config_path, Some(css_path()), on_save) {
        Some(arranged) => arranged,
        None => std::process::exit(1),
    }
}

#[cfg(not(feature = "canvas-gtk"))]
fn run_gui(
    _monitors: Vec<Monitor>,
    _service: &SessionMonitorService,
    _config: Config,
    _config_path: std::path::PathBuf,
) -> Vec<Monitor> {
    error!("--gui requires the `canvas-gtk` feature");
    std::process::exit(1);
}
