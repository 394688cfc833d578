//! Screen-space arrangement of monitors and the drag/snap controller.
//!
//! The canvas draws every monitor as a [`MonitorButton`] whose rectangle is
//! the monitor's logical rectangle multiplied by the view scale.  Dragging a
//! button clamps it to the canvas, snaps its edges onto the canvas origin or
//! onto the edges of the other monitors, and writes the resulting logical
//! position back through [`Monitor::set_x`] / [`Monitor::set_y`].
//!
//! The [`Arrangement`] listens to its own monitors through a channel, so
//! edits made elsewhere (a form changing the scale, a profile being applied)
//! are picked up by [`Arrangement::process_changes`].
//!
//! Nothing in here touches a toolkit; the GTK canvas only feeds pointer
//! coordinates in and moves widgets to the rectangles that come out.

use crate::monitor::{Monitor, MonitorChange, MonitorError, MonitorProperty, SubscriptionId};
use log::{debug, warn};
use std::rc::Rc;
use std::sync::mpsc;

/// A point in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Half-open containment: the right and bottom edges are outside.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }

    fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = (self.x + self.width).max(other.x + other.width);
        let bottom = (self.y + self.height).max(other.y + other.height);
        Rect::new(x, y, right - x, bottom - y)
    }
}

/// Canvas preferences that shape the arrangement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewSettings {
    /// Canvas pixels per logical pixel.
    pub view_scale: f64,
    pub snap_threshold: u32,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            view_scale: crate::config::DEFAULT_VIEW_SCALE,
            snap_threshold: crate::config::DEFAULT_SNAP_THRESHOLD,
        }
    }
}

impl ViewSettings {
    /// Snap distance in canvas pixels, never below one.
    pub fn snap_distance(&self) -> f64 {
        (self.snap_threshold as f64 * self.view_scale * 10.0)
            .round()
            .max(1.0)
    }
}

/// The on-canvas representation of one monitor.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorButton {
    pub name: String,
    /// Position and size in canvas pixels.
    pub rect: Rect,
    pub selected: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ArrangeError {
    #[error("no monitor named {0:?}")]
    UnknownMonitor(String),
    #[error("view scale must be a positive number, got {0}")]
    InvalidViewScale(f64),
    #[error(transparent)]
    Monitor(#[from] MonitorError),
}

/// Per-gesture state, reset by every [`Arrangement::begin_drag`].
#[derive(Debug, Clone, Copy)]
struct DragState {
    index: usize,
    /// Pointer position relative to the button's top-left corner.
    origin: Point,
    /// Largest top-left position that keeps the button on the canvas.
    bound: Point,
    previous: Option<Point>,
}

/// Monitors plus their canvas buttons.
pub struct Arrangement {
    monitors: Vec<Monitor>,
    buttons: Vec<MonitorButton>,
    subscriptions: Vec<SubscriptionId>,
    changes: mpsc::Receiver<MonitorChange>,
    settings: ViewSettings,
    canvas: (f64, f64),
    drag: Option<DragState>,
}

impl Arrangement {
    /// Lay out `monitors` on a canvas of `canvas` pixels.
    pub fn new(
        mut monitors: Vec<Monitor>,
        settings: ViewSettings,
        canvas: (f64, f64),
    ) -> Result<Self, ArrangeError> {
        check_view_scale(settings.view_scale)?;
        let (tx, rx) = mpsc::channel();
        let tx = Rc::new(tx);
        let subscriptions = monitors
            .iter_mut()
            .map(|m| m.subscribe(tx.clone()))
            .collect();
        let buttons = monitors
            .iter()
            .map(|m| MonitorButton {
                name: m.name().to_string(),
                rect: button_rect(m, settings.view_scale),
                selected: false,
            })
            .collect();
        debug!("arrangement of {} monitor(s)", monitors.len());
        Ok(Self {
            monitors,
            buttons,
            subscriptions,
            changes: rx,
            settings,
            canvas,
            drag: None,
        })
    }

    pub fn monitors(&self) -> &[Monitor] {
        &self.monitors
    }

    pub fn monitor(&self, name: &str) -> Option<&Monitor> {
        self.monitors.iter().find(|m| m.name() == name)
    }

    /// Mutable access for editors.  Changes made here reach the buttons on
    /// the next [`process_changes`](Self::process_changes).
    pub fn monitor_mut(&mut self, name: &str) -> Option<&mut Monitor> {
        self.monitors.iter_mut().find(|m| m.name() == name)
    }

    pub fn buttons(&self) -> &[MonitorButton] {
        &self.buttons
    }

    pub fn button(&self, name: &str) -> Option<&MonitorButton> {
        self.buttons.iter().find(|b| b.name == name)
    }

    pub fn settings(&self) -> ViewSettings {
        self.settings
    }

    pub fn set_snap_threshold(&mut self, threshold: u32) {
        self.settings.snap_threshold = threshold;
    }

    pub fn canvas_size(&self) -> (f64, f64) {
        self.canvas
    }

    pub fn set_canvas_size(&mut self, width: f64, height: f64) {
        self.canvas = (width.max(0.0), height.max(0.0));
    }

    /// Detach from the monitors and hand them back.
    pub fn into_monitors(mut self) -> Vec<Monitor> {
        self.take_monitors()
    }

    /// Detach from the monitors and move them out, leaving the arrangement
    /// empty.  For owners that only hold the arrangement behind a shared
    /// reference, such as toolkit callbacks.
    pub fn take_monitors(&mut self) -> Vec<Monitor> {
        self.detach();
        self.drag = None;
        self.buttons.clear();
        std::mem::take(&mut self.monitors)
    }

    fn index_of(&self, name: &str) -> Result<usize, ArrangeError> {
        self.monitors
            .iter()
            .position(|m| m.name() == name)
            .ok_or_else(|| ArrangeError::UnknownMonitor(name.to_string()))
    }

    //  Layout

    /// Change the view scale and reflow every button.
    pub fn set_view_scale(&mut self, view_scale: f64) -> Result<(), ArrangeError> {
        check_view_scale(view_scale)?;
        self.settings.view_scale = view_scale;
        for (button, monitor) in self.buttons.iter_mut().zip(&self.monitors) {
            button.rect = button_rect(monitor, view_scale);
        }
        debug!("view scale {}, reflowed {} button(s)", view_scale, self.buttons.len());
        Ok(())
    }

    /// Recompute one button's rectangle from its monitor.
    pub fn reflow(&mut self, name: &str) -> Result<(), ArrangeError> {
        let i = self.index_of(name)?;
        self.buttons[i].rect = button_rect(&self.monitors[i], self.settings.view_scale);
        Ok(())
    }

    /// Drain the changes the monitors reported since the last call and
    /// bring the buttons up to date.  The drained changes are returned so
    /// the caller can refresh whatever else shows them.
    pub fn process_changes(&mut self) -> Vec<MonitorChange> {
        let changes: Vec<MonitorChange> = self.changes.try_iter().collect();
        for change in &changes {
            let Ok(i) = self.index_of(&change.monitor) else {
                continue;
            };
            match &change.property {
                p if p.affects_size() => {
                    self.buttons[i].rect = button_rect(&self.monitors[i], self.settings.view_scale);
                }
                MonitorProperty::X(_) | MonitorProperty::Y(_) => self.reposition(i),
                _ => {}
            }
        }
        changes
    }

    /// Move a button to its monitor's position unless it already sits on a
    /// canvas pixel that maps there, which is the case after a drag.
    fn reposition(&mut self, i: usize) {
        let vs = self.settings.view_scale;
        let m = &self.monitors[i];
        let rect = &mut self.buttons[i].rect;
        if (rect.x / vs).round() as i32 != m.x() {
            rect.x = (m.x() as f64 * vs).round();
        }
        if (rect.y / vs).round() as i32 != m.y() {
            rect.y = (m.y() as f64 * vs).round();
        }
    }

    //  Selection and hit testing

    /// The topmost button under `point`.  Later buttons are drawn on top.
    pub fn button_at(&self, point: Point) -> Option<&str> {
        self.buttons
            .iter()
            .rev()
            .find(|b| b.rect.contains(point))
            .map(|b| b.name.as_str())
    }

    /// Select `name` and deselect every other button.
    pub fn select(&mut self, name: &str) -> Result<(), ArrangeError> {
        let i = self.index_of(name)?;
        for (j, b) in self.buttons.iter_mut().enumerate() {
            b.selected = i == j;
        }
        Ok(())
    }

    pub fn selected(&self) -> Option<&str> {
        self.buttons
            .iter()
            .find(|b| b.selected)
            .map(|b| b.name.as_str())
    }

    /// Logical rectangle enclosing every monitor, `None` when empty.
    pub fn bounding_box(&self) -> Option<Rect> {
        self.monitors
            .iter()
            .map(|m| {
                let (w, h) = m.logical_size();
                Rect::new(m.x() as f64, m.y() as f64, w, h)
            })
            .reduce(|a, b| a.union(&b))
    }

    //  Dragging

    /// Start dragging `name` with the pointer at `pointer` (canvas
    /// coordinates).  Also selects the button.
    pub fn begin_drag(&mut self, name: &str, pointer: Point) -> Result<(), ArrangeError> {
        let i = self.index_of(name)?;
        self.select(name)?;
        let rect = self.buttons[i].rect;
        self.drag = Some(DragState {
            index: i,
            origin: Point::new(pointer.x - rect.x, pointer.y - rect.y),
            bound: Point::new(
                (self.canvas.0 - rect.width).max(0.0),
                (self.canvas.1 - rect.height).max(0.0),
            ),
            previous: None,
        });
        debug!("drag {} from {:?}", name, pointer);
        Ok(())
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Feed one pointer motion.  Returns the button's new top-left corner,
    /// or `None` when nothing is being dragged or the rounded position did
    /// not change since the previous motion.
    pub fn drag_to(&mut self, pointer: Point) -> Option<Point> {
        let drag = self.drag.as_mut()?;
        let x = (pointer.x - drag.origin.x).clamp(0.0, drag.bound.x).round();
        let y = (pointer.y - drag.origin.y).clamp(0.0, drag.bound.y).round();
        let rounded = Point::new(x, y);
        if drag.previous == Some(rounded) {
            return None;
        }
        drag.previous = Some(rounded);
        let drag = *drag;
        let i = drag.index;

        let vs = self.settings.view_scale;
        let t = self.settings.snap_distance();
        let (xs, ys) = self.snap_candidates(i);
        let (w, h) = self.monitors[i].logical_size();
        let x = snap_axis(x, w * vs, &xs, t, drag.bound.x);
        let y = snap_axis(y, h * vs, &ys, t, drag.bound.y);

        let monitor = &mut self.monitors[i];
        if let Err(e) = monitor
            .set_x((x / vs).round() as i32)
            .and_then(|_| monitor.set_y((y / vs).round() as i32))
        {
            warn!("{}: {}", monitor.name(), e);
        }

        let moved = Point::new(x.round(), y.round());
        let rect = &mut self.buttons[i].rect;
        rect.x = moved.x;
        rect.y = moved.y;
        Some(moved)
    }

    /// Finish the current gesture.
    pub fn end_drag(&mut self) {
        if let Some(d) = self.drag.take() {
            let m = &self.monitors[d.index];
            debug!("dropped {} at {},{}", m.name(), m.x(), m.y());
        }
    }

    /// Snap targets per axis in canvas pixels: the origin, then the near
    /// and far edge of every other monitor in list order, without repeats.
    fn snap_candidates(&self, skip: usize) -> (Vec<f64>, Vec<f64>) {
        let vs = self.settings.view_scale;
        let mut xs = vec![0.0];
        let mut ys = vec![0.0];
        for (j, m) in self.monitors.iter().enumerate() {
            if j == skip {
                continue;
            }
            let (w, h) = m.logical_size();
            let (x, y) = (m.x() as f64, m.y() as f64);
            push_unique(&mut xs, x * vs);
            push_unique(&mut xs, (x + w) * vs);
            push_unique(&mut ys, y * vs);
            push_unique(&mut ys, (y + h) * vs);
        }
        (xs, ys)
    }

    fn detach(&mut self) {
        for (m, id) in self.monitors.iter_mut().zip(self.subscriptions.drain(..)) {
            m.unsubscribe(id);
        }
    }
}

impl Drop for Arrangement {
    fn drop(&mut self) {
        self.detach();
    }
}

fn check_view_scale(view_scale: f64) -> Result<(), ArrangeError> {
    if view_scale.is_finite() && view_scale > 0.0 {
        Ok(())
    } else {
        Err(ArrangeError::InvalidViewScale(view_scale))
    }
}

fn button_rect(m: &Monitor, view_scale: f64) -> Rect {
    let (w, h) = m.logical_size();
    Rect::new(
        (m.x() as f64 * view_scale).round(),
        (m.y() as f64 * view_scale).round(),
        (w * view_scale).round(),
        (h * view_scale).round(),
    )
}

fn push_unique(v: &mut Vec<f64>, value: f64) {
    if !v.contains(&value) {
        v.push(value);
    }
}

/// Snap the near edge `pos` of a span of `size` onto the first candidate
/// that either edge is within `t` of.  Alignments that would put the near
/// edge outside `[0, bound]` are skipped.
fn snap_axis(pos: f64, size: f64, candidates: &[f64], t: f64, bound: f64) -> f64 {
    const EPSILON: f64 = 1e-9;
    let fits = |p: f64| p >= -EPSILON && p <= bound + EPSILON;
    for &c in candidates {
        if (pos - c).abs() <= t && fits(c) {
            return c.clamp(0.0, bound);
        }
        let aligned = c - size;
        if (pos + size - c).abs() <= t && fits(aligned) {
            return aligned.clamp(0.0, bound);
        }
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::tests::monitor;
    use crate::transform::TransformMode;

    fn settings(view_scale: f64, snap_threshold: u32) -> ViewSettings {
        ViewSettings {
            view_scale,
            snap_threshold,
        }
    }

    fn placed(name: &str, w: u32, h: u32, scale: f64, x: i32, y: i32) -> Monitor {
        let mut m = monitor(name, w, h, scale);
        m.set_x(x).unwrap();
        m.set_y(y).unwrap();
        m
    }

    #[test]
    fn snap_distance_scales_and_has_a_floor() {
        assert_eq!(settings(0.15, 10).snap_distance(), 15.0);
        assert_eq!(settings(0.1, 0).snap_distance(), 1.0);
        assert_eq!(settings(0.3, 1).snap_distance(), 3.0);
    }

    #[test]
    fn buttons_follow_logical_rectangles() {
        let arr = Arrangement::new(
            vec![
                placed("eDP-1", 2560, 1600, 2.0, 0, 0),
                placed("DP-1", 1920, 1080, 1.0, 1280, 0),
            ],
            settings(0.1, 10),
            (1000.0, 1000.0),
        )
        .unwrap();
        assert_eq!(arr.button("eDP-1").unwrap().rect, Rect::new(0.0, 0.0, 128.0, 80.0));
        assert_eq!(arr.button("DP-1").unwrap().rect, Rect::new(128.0, 0.0, 192.0, 108.0));
    }

    #[test]
    fn drag_is_clamped_to_the_canvas() {
        // 2000x1500 at view scale 0.1 is a 200x150 button.
        let mut arr = Arrangement::new(
            vec![monitor("DP-1", 2000, 1500, 1.0)],
            settings(0.1, 0),
            (1000.0, 1000.0),
        )
        .unwrap();
        arr.begin_drag("DP-1", Point::new(0.0, 0.0)).unwrap();
        let p = arr.drag_to(Point::new(-50.0, 5000.0)).unwrap();
        assert_eq!(p, Point::new(0.0, 850.0));
        assert_eq!(arr.monitor("DP-1").unwrap().y(), 8500);
    }

    #[test]
    fn pointer_offset_inside_button_is_preserved() {
        let mut arr = Arrangement::new(
            vec![monitor("DP-1", 1000, 1000, 1.0)],
            settings(0.1, 0),
            (1000.0, 1000.0),
        )
        .unwrap();
        arr.begin_drag("DP-1", Point::new(40.0, 30.0)).unwrap();
        let p = arr.drag_to(Point::new(440.0, 330.0)).unwrap();
        assert_eq!(p, Point::new(400.0, 300.0));
        assert_eq!((arr.monitor("DP-1").unwrap().x(), arr.monitor("DP-1").unwrap().y()), (4000, 3000));
    }

    #[test]
    fn identical_motion_is_a_no_op() {
        let mut arr = Arrangement::new(
            vec![monitor("DP-1", 1000, 1000, 1.0)],
            settings(0.1, 0),
            (1000.0, 1000.0),
        )
        .unwrap();
        arr.begin_drag("DP-1", Point::default()).unwrap();
        assert!(arr.drag_to(Point::new(300.2, 300.0)).is_some());
        assert!(arr.drag_to(Point::new(299.8, 300.0)).is_none());
        arr.process_changes();
        assert!(arr.drag_to(Point::new(300.0, 300.0)).is_none());
        assert!(arr.process_changes().is_empty());
    }

    #[test]
    fn motion_without_drag_is_ignored() {
        let mut arr =
            Arrangement::new(vec![monitor("DP-1", 1000, 1000, 1.0)], settings(0.1, 0), (500.0, 500.0))
                .unwrap();
        assert!(arr.drag_to(Point::new(10.0, 10.0)).is_none());
        arr.begin_drag("DP-1", Point::default()).unwrap();
        arr.end_drag();
        assert!(!arr.is_dragging());
        assert!(arr.drag_to(Point::new(10.0, 10.0)).is_none());
    }

    #[test]
    fn snaps_near_edge_onto_neighbour_far_edge() {
        // Neighbour: 1920 logical wide, so its right edge is at 192 px.
        let mut arr = Arrangement::new(
            vec![
                placed("A", 1920, 1080, 1.0, 0, 0),
                placed("B", 1920, 1080, 1.0, 5000, 5000),
            ],
            settings(0.1, 10),
            (2000.0, 2000.0),
        )
        .unwrap();
        arr.begin_drag("B", Point::new(500.0, 500.0)).unwrap();
        // 10 px threshold: 200 is within reach of 192, and 5 of 0.
        let p = arr.drag_to(Point::new(200.0, 5.0)).unwrap();
        assert_eq!(p, Point::new(192.0, 0.0));
        let b = arr.monitor("B").unwrap();
        assert_eq!((b.x(), b.y()), (1920, 0));
    }

    #[test]
    fn snap_lands_exactly_from_any_offset_within_reach() {
        // A's right edge is at 192 px and its bottom edge at 108 px; the
        // snap distance is 10 px.
        for offset in [-9.4, -7.5, -3.25, -0.4, 0.0, 0.6, 2.5, 6.75, 9.4] {
            let mut arr = Arrangement::new(
                vec![
                    placed("A", 1920, 1080, 1.0, 0, 0),
                    placed("B", 1920, 1080, 1.0, 5000, 5000),
                ],
                settings(0.1, 10),
                (2000.0, 2000.0),
            )
            .unwrap();
            arr.begin_drag("B", Point::new(500.0, 500.0)).unwrap();
            let p = arr.drag_to(Point::new(192.0 + offset, 108.0 + offset)).unwrap();
            assert_eq!(p, Point::new(192.0, 108.0), "offset {offset}");
            let b = arr.monitor("B").unwrap();
            assert_eq!((b.x(), b.y()), (1920, 1080), "offset {offset}");
        }
    }

    #[test]
    fn snaps_bottom_edge_onto_neighbour_top_edge() {
        // A's top edge is at 200 px.  B is 108 px tall, so dropping it at
        // 96 puts its bottom edge 4 px above A and it snaps flush.
        let mut arr = Arrangement::new(
            vec![
                placed("A", 1920, 1080, 1.0, 0, 2000),
                placed("B", 1920, 1080, 1.0, 5000, 5000),
            ],
            settings(0.1, 10),
            (2000.0, 2000.0),
        )
        .unwrap();
        arr.begin_drag("B", Point::new(500.0, 500.0)).unwrap();
        let p = arr.drag_to(Point::new(600.0, 96.0)).unwrap();
        assert_eq!(p.y, 92.0);
        assert_eq!(arr.monitor("B").unwrap().y(), 920);
    }

    #[test]
    fn snaps_far_edge_onto_candidate() {
        let mut arr = Arrangement::new(
            vec![
                placed("A", 1000, 1000, 1.0, 2000, 0),
                placed("B", 1000, 1000, 1.0, 0, 5000),
            ],
            settings(0.1, 10),
            (2000.0, 2000.0),
        )
        .unwrap();
        arr.begin_drag("B", Point::new(0.0, 500.0)).unwrap();
        // B is 100 px wide; its right edge at 195 lands on A's left edge 200.
        let p = arr.drag_to(Point::new(95.0, 500.0)).unwrap();
        assert_eq!(p.x, 100.0);
        assert_eq!(arr.monitor("B").unwrap().x(), 1000);
    }

    #[test]
    fn snap_onto_fractional_edge_keeps_logical_precision() {
        // 2256 / 1.5 = 1504 logical, which is 225.6 canvas pixels.
        let mut arr = Arrangement::new(
            vec![
                placed("eDP-1", 2256, 1504, 1.5, 0, 0),
                placed("DP-1", 1920, 1080, 1.0, 6000, 6000),
            ],
            settings(0.15, 10),
            (2000.0, 2000.0),
        )
        .unwrap();
        arr.begin_drag("DP-1", Point::new(900.0, 900.0)).unwrap();
        let p = arr.drag_to(Point::new(230.0, 400.0)).unwrap();
        assert_eq!(p.x, 226.0);
        assert_eq!(arr.monitor("DP-1").unwrap().x(), 1504);
    }

    #[test]
    fn origin_is_the_first_candidate() {
        assert_eq!(snap_axis(4.0, 100.0, &[0.0, 5.0], 10.0, 900.0), 0.0);
        assert_eq!(snap_axis(50.0, 100.0, &[0.0, 155.0], 10.0, 900.0), 55.0);
        assert_eq!(snap_axis(50.0, 100.0, &[0.0, 500.0], 10.0, 900.0), 50.0);
    }

    #[test]
    fn snap_never_leaves_the_canvas() {
        // Canvas 1000 px, B 300 px wide so its bound is 700.  A's left edge
        // sits at 1005 px, just past where B's right edge can reach.
        let mut arr = Arrangement::new(
            vec![
                placed("A", 1000, 1000, 1.0, 10050, 0),
                placed("B", 3000, 1000, 1.0, 0, 5000),
            ],
            settings(0.1, 10),
            (1000.0, 1000.0),
        )
        .unwrap();
        arr.begin_drag("B", Point::new(0.0, 500.0)).unwrap();
        let p = arr.drag_to(Point::new(5000.0, 500.0)).unwrap();
        assert_eq!(p.x, 700.0);
        assert_eq!(arr.monitor("B").unwrap().x(), 7000);
        let rect = arr.button("B").unwrap().rect;
        assert!(rect.x + rect.width <= 1000.0);
    }

    #[test]
    fn out_of_range_alignment_falls_through_to_later_candidates() {
        // Aligning the far edge onto 95 would need -5, so 5 wins instead.
        assert_eq!(snap_axis(2.0, 100.0, &[95.0, 5.0], 10.0, 900.0), 5.0);
        assert_eq!(snap_axis(0.0, 100.0, &[95.0], 10.0, 900.0), 0.0);
    }

    #[test]
    fn overlap_is_permitted() {
        let mut arr = Arrangement::new(
            vec![
                placed("A", 1000, 1000, 1.0, 0, 0),
                placed("B", 1000, 1000, 1.0, 5000, 0),
            ],
            settings(0.1, 0),
            (1000.0, 1000.0),
        )
        .unwrap();
        arr.begin_drag("B", Point::new(500.0, 0.0)).unwrap();
        arr.drag_to(Point::new(50.0, 50.0)).unwrap();
        let b = arr.monitor("B").unwrap();
        assert_eq!((b.x(), b.y()), (500, 500));
        assert_eq!(arr.button_at(Point::new(60.0, 60.0)), Some("B"));
        assert_eq!(arr.button_at(Point::new(20.0, 20.0)), Some("A"));
        assert_eq!(arr.button_at(Point::new(900.0, 900.0)), None);
    }

    #[test]
    fn changing_view_scale_reflows_everything() {
        let mut arr = Arrangement::new(
            vec![
                placed("A", 1920, 1080, 1.0, 0, 0),
                placed("B", 2560, 1440, 1.0, 1920, 0),
            ],
            settings(0.15, 10),
            (1000.0, 1000.0),
        )
        .unwrap();
        let before: Vec<Rect> = arr.buttons().iter().map(|b| b.rect).collect();
        arr.set_view_scale(0.30).unwrap();
        for (old, new) in before.iter().zip(arr.buttons()) {
            assert_eq!(new.rect.x, old.x * 2.0);
            assert_eq!(new.rect.y, old.y * 2.0);
            assert_eq!(new.rect.width, old.width * 2.0);
            assert_eq!(new.rect.height, old.height * 2.0);
        }
        assert!(matches!(
            arr.set_view_scale(0.0),
            Err(ArrangeError::InvalidViewScale(_))
        ));
    }

    #[test]
    fn transform_change_reflows_only_that_button() {
        let mut arr = Arrangement::new(
            vec![
                placed("A", 1920, 1080, 1.0, 0, 0),
                placed("B", 1920, 1080, 1.0, 1920, 0),
            ],
            settings(0.1, 10),
            (1000.0, 1000.0),
        )
        .unwrap();
        arr.monitor_mut("B")
            .unwrap()
            .set_transform(TransformMode::Rotate90)
            .unwrap();
        let changes = arr.process_changes();
        assert_eq!(changes.len(), 1);
        assert_eq!(arr.button("B").unwrap().rect, Rect::new(192.0, 0.0, 108.0, 192.0));
        assert_eq!(arr.button("A").unwrap().rect, Rect::new(0.0, 0.0, 192.0, 108.0));
    }

    #[test]
    fn external_position_change_moves_the_button() {
        let mut arr = Arrangement::new(
            vec![monitor("A", 1920, 1080, 1.0)],
            settings(0.1, 10),
            (1000.0, 1000.0),
        )
        .unwrap();
        arr.monitor_mut("A").unwrap().set_x(3000).unwrap();
        arr.process_changes();
        assert_eq!(arr.button("A").unwrap().rect.x, 300.0);
    }

    #[test]
    fn selection_is_exclusive() {
        let mut arr = Arrangement::new(
            vec![monitor("A", 100, 100, 1.0), monitor("B", 100, 100, 1.0)],
            settings(0.1, 10),
            (1000.0, 1000.0),
        )
        .unwrap();
        arr.select("A").unwrap();
        arr.begin_drag("B", Point::default()).unwrap();
        assert_eq!(arr.selected(), Some("B"));
        assert_eq!(arr.buttons().iter().filter(|b| b.selected).count(), 1);
        assert!(matches!(
            arr.select("C"),
            Err(ArrangeError::UnknownMonitor(name)) if name == "C"
        ));
    }

    #[test]
    fn bounding_box_spans_all_monitors() {
        let arr = Arrangement::new(
            vec![
                placed("A", 1920, 1080, 1.0, 0, 0),
                placed("B", 2560, 1440, 2.0, 1920, -200),
            ],
            settings(0.1, 10),
            (1000.0, 1000.0),
        )
        .unwrap();
        assert_eq!(arr.bounding_box(), Some(Rect::new(0.0, -200.0, 3200.0, 1280.0)));

        let empty = Arrangement::new(Vec::new(), settings(0.1, 10), (1.0, 1.0)).unwrap();
        assert_eq!(empty.bounding_box(), None);
    }

    #[test]
    fn dropping_detaches_from_monitors() {
        let arr = Arrangement::new(
            vec![monitor("A", 100, 100, 1.0), monitor("B", 100, 100, 1.0)],
            settings(0.1, 10),
            (1000.0, 1000.0),
        )
        .unwrap();
        assert!(arr.monitors().iter().all(|m| m.observer_count() == 1));
        let monitors = arr.into_monitors();
        assert!(monitors.iter().all(|m| m.observer_count() == 0));
    }

    #[test]
    fn taken_monitors_keep_the_dragged_layout() {
        let mut arr = Arrangement::new(
            vec![monitor("A", 1000, 1000, 1.0), monitor("B", 1000, 1000, 1.0)],
            settings(0.1, 0),
            (1000.0, 1000.0),
        )
        .unwrap();
        arr.begin_drag("B", Point::default()).unwrap();
        arr.drag_to(Point::new(300.0, 40.0)).unwrap();

        let monitors = arr.take_monitors();
        assert!(arr.monitors().is_empty());
        assert!(arr.buttons().is_empty());
        assert!(!arr.is_dragging());
        assert_eq!((monitors[1].x(), monitors[1].y()), (3000, 400));
        assert!(monitors.iter().all(|m| m.observer_count() == 0));
    }

    #[test]
    fn invalid_initial_view_scale_is_rejected() {
        let err = Arrangement::new(Vec::new(), settings(-1.0, 10), (1.0, 1.0));
        assert!(matches!(err, Err(ArrangeError::InvalidViewScale(_))));
    }
}
