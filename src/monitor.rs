//! The backend-independent monitor entity.
//!
//! A [`Monitor`] wraps one [`MonitorConfiguration`] and is the only way to
//! mutate it.  Every setter follows the same protocol:
//!
//! 1. Out-of-domain values are rejected with
//!    [`MonitorError::InvalidArgument`] before anything changes.
//! 2. Writing the current value again is a no-op.
//! 3. Otherwise the configuration is updated and every subscribed
//!    [`MonitorObserver`] receives a typed [`MonitorChange`].
//!
//! Observers are attached with [`Monitor::subscribe`] and must detach
//! themselves with [`Monitor::unsubscribe`]; the monitor never prunes them.

use crate::mode::{dedup_modes, MonitorMode};
use crate::traits::MonitorObserver;
use crate::transform::TransformMode;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// Which compositor a monitor was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Hyprland,
    Sway,
    #[default]
    Unknown,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Hyprland => write!(f, "hyprland"),
            Backend::Sway => write!(f, "sway"),
            Backend::Unknown => write!(f, "unknown"),
        }
    }
}

/// Mutable state backing one [`Monitor`].
///
/// Adapters fill this in from a compositor response; afterwards it is only
/// reachable read-only through [`Monitor::configuration`].
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfiguration {
    pub name: String,
    pub make: String,
    pub model: String,
    pub serial: String,
    /// Compositor-provided description (usually `make model serial`).
    pub description: String,
    pub is_active: bool,
    /// Logical-space top-left corner.
    pub x: i32,
    pub y: i32,
    /// Pre-scale pixel dimensions of the current mode.
    pub physical_width: u32,
    pub physical_height: u32,
    /// Fractional scaling factor, always `> 0`.
    pub scale: f64,
    /// Refresh rate in Hz.
    pub refresh_rate: f64,
    pub transform: TransformMode,
    /// Backend-reported modes, in order, without duplicates.
    pub available_modes: Vec<MonitorMode>,
    pub is_adaptive_sync_enabled: bool,
    pub is_dpms_enabled: bool,
    pub is_ten_bit_enabled: bool,
    pub backend: Backend,
    pub is_mirror: bool,
    pub is_mirror_of: Option<String>,
    /// Opaque compositor handle (Hyprland monitor id) used to look up the
    /// matching toolkit display.
    pub display_id: Option<i64>,
}

impl Default for MonitorConfiguration {
    fn default() -> Self {
        Self {
            name: String::new(),
            make: String::new(),
            model: String::new(),
            serial: String::new(),
            description: String::new(),
            is_active: true,
            x: 0,
            y: 0,
            physical_width: 0,
            physical_height: 0,
            scale: 1.0,
            refresh_rate: 60.0,
            transform: TransformMode::Normal,
            available_modes: Vec::new(),
            is_adaptive_sync_enabled: false,
            is_dpms_enabled: true,
            is_ten_bit_enabled: false,
            backend: Backend::Unknown,
            is_mirror: false,
            is_mirror_of: None,
            display_id: None,
        }
    }
}

//  Change events

/// The settable properties of a [`Monitor`], without values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MonitorField {
    Name,
    X,
    Y,
    Width,
    Height,
    Scale,
    RefreshRate,
    AdaptiveSync,
    Dpms,
    TenBit,
    Transform,
    Mirror,
    Active,
}

impl fmt::Display for MonitorField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MonitorField::Name => "name",
            MonitorField::X => "x",
            MonitorField::Y => "y",
            MonitorField::Width => "width",
            MonitorField::Height => "height",
            MonitorField::Scale => "scale",
            MonitorField::RefreshRate => "refresh-rate",
            MonitorField::AdaptiveSync => "adaptive-sync",
            MonitorField::Dpms => "dpms",
            MonitorField::TenBit => "ten-bit",
            MonitorField::Transform => "transform",
            MonitorField::Mirror => "mirror",
            MonitorField::Active => "active",
        };
        f.write_str(s)
    }
}

/// A property together with its (new) value.
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorProperty {
    X(i32),
    Y(i32),
    Width(u32),
    Height(u32),
    Scale(f64),
    RefreshRate(f64),
    AdaptiveSync(bool),
    Dpms(bool),
    TenBit(bool),
    Transform(TransformMode),
    /// Name of the mirrored monitor, `None` to stop mirroring.
    Mirror(Option<String>),
    Active(bool),
}

impl MonitorProperty {
    pub fn field(&self) -> MonitorField {
        match self {
            MonitorProperty::X(_) => MonitorField::X,
            MonitorProperty::Y(_) => MonitorField::Y,
            MonitorProperty::Width(_) => MonitorField::Width,
            MonitorProperty::Height(_) => MonitorField::Height,
            MonitorProperty::Scale(_) => MonitorField::Scale,
            MonitorProperty::RefreshRate(_) => MonitorField::RefreshRate,
            MonitorProperty::AdaptiveSync(_) => MonitorField::AdaptiveSync,
            MonitorProperty::Dpms(_) => MonitorField::Dpms,
            MonitorProperty::TenBit(_) => MonitorField::TenBit,
            MonitorProperty::Transform(_) => MonitorField::Transform,
            MonitorProperty::Mirror(_) => MonitorField::Mirror,
            MonitorProperty::Active(_) => MonitorField::Active,
        }
    }

    /// Whether a change of this property alters the monitor's logical size.
    pub fn affects_size(&self) -> bool {
        matches!(
            self,
            MonitorProperty::Width(_)
                | MonitorProperty::Height(_)
                | MonitorProperty::Scale(_)
                | MonitorProperty::Transform(_)
        )
    }
}

/// Notification delivered to observers after a committed mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorChange {
    /// Name of the monitor that changed.
    pub monitor: String,
    pub property: MonitorProperty,
}

/// Handle returned by [`Monitor::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Errors produced by [`Monitor`] setters and constructors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MonitorError {
    #[error("invalid {field}: {reason}")]
    InvalidArgument { field: MonitorField, reason: String },
}

fn invalid(field: MonitorField, reason: impl Into<String>) -> MonitorError {
    MonitorError::InvalidArgument {
        field,
        reason: reason.into(),
    }
}

//  Monitor

/// One display output, normalised across backends.
pub struct Monitor {
    config: MonitorConfiguration,
    observers: Vec<(SubscriptionId, Rc<dyn MonitorObserver>)>,
    next_subscription: u64,
}

impl fmt::Debug for Monitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Monitor")
            .field("config", &self.config)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Monitor {
    /// Wrap a configuration, checking the invariants every monitor must
    /// satisfy: a non-empty name, positive size and scale, a positive
    /// refresh rate and no self-mirroring.
    pub fn new(config: MonitorConfiguration) -> Result<Self, MonitorError> {
        if config.name.is_empty() {
            return Err(invalid(MonitorField::Name, "must not be empty"));
        }
        check_dimension(MonitorField::Width, config.physical_width)?;
        check_dimension(MonitorField::Height, config.physical_height)?;
        check_positive(MonitorField::Scale, config.scale)?;
        check_positive(MonitorField::RefreshRate, config.refresh_rate)?;
        if config.is_mirror_of.as_deref() == Some(config.name.as_str()) {
            return Err(invalid(MonitorField::Mirror, "a monitor cannot mirror itself"));
        }
        if config.is_mirror != config.is_mirror_of.is_some() {
            return Err(invalid(
                MonitorField::Mirror,
                "is_mirror must agree with is_mirror_of",
            ));
        }
        Ok(Self {
            config,
            observers: Vec::new(),
            next_subscription: 0,
        })
    }

    //  Observers

    /// Register an observer.  It stays registered until
    /// [`unsubscribe`](Self::unsubscribe) is called with the returned id.
    pub fn subscribe(&mut self, observer: Rc<dyn MonitorObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, observer));
        id
    }

    /// Detach an observer.  Returns `false` if the id was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    //  Getters

    pub fn configuration(&self) -> &MonitorConfiguration {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn make(&self) -> &str {
        &self.config.make
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub fn serial(&self) -> &str {
        &self.config.serial
    }

    pub fn description(&self) -> &str {
        &self.config.description
    }

    pub fn is_active(&self) -> bool {
        self.config.is_active
    }

    pub fn x(&self) -> i32 {
        self.config.x
    }

    pub fn y(&self) -> i32 {
        self.config.y
    }

    /// Physical (pre-scale) width of the current mode.
    pub fn width(&self) -> u32 {
        self.config.physical_width
    }

    /// Physical (pre-scale) height of the current mode.
    pub fn height(&self) -> u32 {
        self.config.physical_height
    }

    pub fn scale(&self) -> f64 {
        self.config.scale
    }

    pub fn refresh_rate(&self) -> f64 {
        self.config.refresh_rate
    }

    pub fn transform(&self) -> TransformMode {
        self.config.transform
    }

    pub fn available_modes(&self) -> &[MonitorMode] {
        &self.config.available_modes
    }

    /// The mode the monitor is currently running.
    pub fn current_mode(&self) -> MonitorMode {
        MonitorMode::new(
            self.config.physical_width,
            self.config.physical_height,
            self.config.refresh_rate,
        )
    }

    pub fn is_adaptive_sync_enabled(&self) -> bool {
        self.config.is_adaptive_sync_enabled
    }

    pub fn is_dpms_enabled(&self) -> bool {
        self.config.is_dpms_enabled
    }

    pub fn is_ten_bit_enabled(&self) -> bool {
        self.config.is_ten_bit_enabled
    }

    pub fn backend(&self) -> Backend {
        self.config.backend
    }

    pub fn is_mirror(&self) -> bool {
        self.config.is_mirror
    }

    /// Name of the monitor this one mirrors, if any.
    pub fn mirror_of(&self) -> Option<&str> {
        self.config.is_mirror_of.as_deref()
    }

    pub fn display_id(&self) -> Option<i64> {
        self.config.display_id
    }

    /// Width in logical space: physical size divided by scale, using the
    /// physical height when the transform rotates by 90° or 270°.
    pub fn logical_width(&self) -> f64 {
        let physical = if self.config.transform.is_rotated() {
            self.config.physical_height
        } else {
            self.config.physical_width
        };
        physical as f64 / self.config.scale
    }

    /// Height in logical space; see [`logical_width`](Self::logical_width).
    pub fn logical_height(&self) -> f64 {
        let physical = if self.config.transform.is_rotated() {
            self.config.physical_width
        } else {
            self.config.physical_height
        };
        physical as f64 / self.config.scale
    }

    pub fn logical_size(&self) -> (f64, f64) {
        (self.logical_width(), self.logical_height())
    }

    //  Setters

    pub fn set_x(&mut self, x: i32) -> Result<bool, MonitorError> {
        self.set(MonitorProperty::X(x))
    }

    pub fn set_y(&mut self, y: i32) -> Result<bool, MonitorError> {
        self.set(MonitorProperty::Y(y))
    }

    pub fn set_width(&mut self, width: u32) -> Result<bool, MonitorError> {
        self.set(MonitorProperty::Width(width))
    }

    pub fn set_height(&mut self, height: u32) -> Result<bool, MonitorError> {
        self.set(MonitorProperty::Height(height))
    }

    pub fn set_scale(&mut self, scale: f64) -> Result<bool, MonitorError> {
        self.set(MonitorProperty::Scale(scale))
    }

    pub fn set_refresh_rate(&mut self, rate: f64) -> Result<bool, MonitorError> {
        self.set(MonitorProperty::RefreshRate(rate))
    }

    pub fn set_adaptive_sync(&mut self, enabled: bool) -> Result<bool, MonitorError> {
        self.set(MonitorProperty::AdaptiveSync(enabled))
    }

    pub fn set_dpms(&mut self, enabled: bool) -> Result<bool, MonitorError> {
        self.set(MonitorProperty::Dpms(enabled))
    }

    pub fn set_ten_bit(&mut self, enabled: bool) -> Result<bool, MonitorError> {
        self.set(MonitorProperty::TenBit(enabled))
    }

    pub fn set_transform(&mut self, transform: TransformMode) -> Result<bool, MonitorError> {
        self.set(MonitorProperty::Transform(transform))
    }

    pub fn set_active(&mut self, active: bool) -> Result<bool, MonitorError> {
        self.set(MonitorProperty::Active(active))
    }

    /// Start mirroring `target`, or stop mirroring with `None`.
    ///
    /// `is_mirror` always follows `is_mirror_of`; the two change together
    /// in a single event.
    pub fn set_mirror(&mut self, target: Option<&str>) -> Result<bool, MonitorError> {
        self.set(MonitorProperty::Mirror(target.map(str::to_string)))
    }

    /// Switch to `mode`: width, height and refresh rate, one event per field
    /// that actually changed.  Nothing changes if any part is invalid.
    pub fn set_mode(&mut self, mode: MonitorMode) -> Result<bool, MonitorError> {
        let props = [
            MonitorProperty::Width(mode.width),
            MonitorProperty::Height(mode.height),
            MonitorProperty::RefreshRate(mode.refresh_rate),
        ];
        self.set_all(props)
    }

    /// Validate every property first, then apply them in order.
    pub fn set_all(
        &mut self,
        props: impl IntoIterator<Item = MonitorProperty>,
    ) -> Result<bool, MonitorError> {
        let props: Vec<MonitorProperty> = props.into_iter().collect();
        for p in &props {
            self.validate(p)?;
        }
        let mut changed = false;
        for p in props {
            changed |= self.set(p)?;
        }
        Ok(changed)
    }

    /// Generic setter behind all `set_*` methods.
    ///
    /// Returns `Ok(true)` when the value changed and observers were told,
    /// `Ok(false)` when it already had that value.
    pub fn set(&mut self, property: MonitorProperty) -> Result<bool, MonitorError> {
        self.validate(&property)?;
        if !self.write(&property) {
            return Ok(false);
        }
        debug!("{}: {} -> {:?}", self.config.name, property.field(), property);
        let change = MonitorChange {
            monitor: self.config.name.clone(),
            property,
        };
        for (_, observer) in &self.observers {
            observer.property_changed(&change);
        }
        Ok(true)
    }

    fn validate(&self, property: &MonitorProperty) -> Result<(), MonitorError> {
        match property {
            MonitorProperty::Width(w) => check_dimension(MonitorField::Width, *w),
            MonitorProperty::Height(h) => check_dimension(MonitorField::Height, *h),
            MonitorProperty::Scale(s) => check_positive(MonitorField::Scale, *s),
            MonitorProperty::RefreshRate(r) => check_positive(MonitorField::RefreshRate, *r),
            MonitorProperty::Mirror(Some(target)) => {
                if target.is_empty() {
                    Err(invalid(MonitorField::Mirror, "target name is empty"))
                } else if *target == self.config.name {
                    Err(invalid(MonitorField::Mirror, "a monitor cannot mirror itself"))
                } else {
                    Ok(())
                }
            }
            _ => Ok(()),
        }
    }

    /// Store a validated value; `false` when it equals the current one.
    fn write(&mut self, property: &MonitorProperty) -> bool {
        let c = &mut self.config;
        match property {
            MonitorProperty::X(v) => replace(&mut c.x, *v),
            MonitorProperty::Y(v) => replace(&mut c.y, *v),
            MonitorProperty::Width(v) => replace(&mut c.physical_width, *v),
            MonitorProperty::Height(v) => replace(&mut c.physical_height, *v),
            MonitorProperty::Scale(v) => replace(&mut c.scale, *v),
            MonitorProperty::RefreshRate(v) => replace(&mut c.refresh_rate, *v),
            MonitorProperty::AdaptiveSync(v) => replace(&mut c.is_adaptive_sync_enabled, *v),
            MonitorProperty::Dpms(v) => replace(&mut c.is_dpms_enabled, *v),
            MonitorProperty::TenBit(v) => replace(&mut c.is_ten_bit_enabled, *v),
            MonitorProperty::Transform(v) => replace(&mut c.transform, *v),
            MonitorProperty::Active(v) => replace(&mut c.is_active, *v),
            MonitorProperty::Mirror(target) => {
                if c.is_mirror_of == *target {
                    return false;
                }
                c.is_mirror_of = target.clone();
                c.is_mirror = target.is_some();
                true
            }
        }
    }

    //  Snapshots

    /// Serializable view of the mutable fields, for profiles.
    pub fn state(&self) -> MonitorState {
        let c = &self.config;
        MonitorState {
            name: c.name.clone(),
            x: c.x,
            y: c.y,
            width: c.physical_width,
            height: c.physical_height,
            scale: c.scale,
            refresh_rate: c.refresh_rate,
            transform: c.transform,
            adaptive_sync: c.is_adaptive_sync_enabled,
            dpms: c.is_dpms_enabled,
            ten_bit: c.is_ten_bit_enabled,
            mirror: c.is_mirror_of.clone(),
            active: c.is_active,
        }
    }

    /// Write a snapshot back through the setters.  The snapshot must belong
    /// to this monitor, and nothing changes if any field is invalid.
    pub fn apply_state(&mut self, state: &MonitorState) -> Result<bool, MonitorError> {
        if state.name != self.config.name {
            return Err(invalid(
                MonitorField::Name,
                format!("snapshot is for {:?}, not {:?}", state.name, self.config.name),
            ));
        }
        self.set_all([
            MonitorProperty::Width(state.width),
            MonitorProperty::Height(state.height),
            MonitorProperty::Scale(state.scale),
            MonitorProperty::RefreshRate(state.refresh_rate),
            MonitorProperty::Transform(state.transform),
            MonitorProperty::X(state.x),
            MonitorProperty::Y(state.y),
            MonitorProperty::AdaptiveSync(state.adaptive_sync),
            MonitorProperty::Dpms(state.dpms),
            MonitorProperty::TenBit(state.ten_bit),
            MonitorProperty::Mirror(state.mirror.clone()),
            MonitorProperty::Active(state.active),
        ])
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        if !self.observers.is_empty() {
            warn!(
                "monitor {} dropped with {} observer(s) still attached",
                self.config.name,
                self.observers.len()
            );
        }
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

fn check_dimension(field: MonitorField, value: u32) -> Result<(), MonitorError> {
    if value == 0 {
        Err(invalid(field, "must be greater than zero"))
    } else {
        Ok(())
    }
}

fn check_positive(field: MonitorField, value: f64) -> Result<(), MonitorError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be a positive number, got {}", value)))
    }
}

/// Serializable snapshot of a monitor's user-editable state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorState {
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub scale: f64,
    pub refresh_rate: f64,
    #[serde(default)]
    pub transform: TransformMode,
    #[serde(default)]
    pub adaptive_sync: bool,
    #[serde(default = "default_true")]
    pub dpms: bool,
    #[serde(default)]
    pub ten_bit: bool,
    #[serde(default)]
    pub mirror: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

/// Turn the configurations from one compositor query into monitors,
/// enforcing the snapshot-wide invariants:
///
/// * names are unique (later duplicates are dropped),
/// * modes are deduplicated,
/// * a mirror target names another monitor of the same snapshot.
///
/// Configurations that still fail [`Monitor::new`] are logged and skipped.
pub fn build_snapshot(input: impl IntoIterator<Item = MonitorConfiguration>) -> Vec<Monitor> {
    let mut configs: Vec<MonitorConfiguration> = Vec::new();
    for mut c in input {
        if configs.iter().any(|o| o.name == c.name) {
            warn!("duplicate monitor name {:?}, ignoring", c.name);
            continue;
        }
        c.available_modes = dedup_modes(std::mem::take(&mut c.available_modes));
        configs.push(c);
    }

    let names: Vec<String> = configs.iter().map(|c| c.name.clone()).collect();
    configs
        .into_iter()
        .filter_map(|mut c| {
            let dangling = c
                .is_mirror_of
                .as_deref()
                .is_some_and(|t| t == c.name || !names.iter().any(|n| n == t));
            if dangling {
                warn!("{}: ignoring invalid mirror target {:?}", c.name, c.is_mirror_of);
                c.is_mirror_of = None;
            }
            c.is_mirror = c.is_mirror_of.is_some();
            let name = c.name.clone();
            match Monitor::new(c) {
                Ok(m) => Some(m),
                Err(e) => {
                    warn!("skipping monitor {:?}: {}", name, e);
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::sync::mpsc;

    /// Observer that records every change it sees.
    #[derive(Default)]
    pub(crate) struct Recorder {
        pub(crate) changes: RefCell<Vec<MonitorChange>>,
    }

    impl MonitorObserver for Recorder {
        fn property_changed(&self, change: &MonitorChange) {
            self.changes.borrow_mut().push(change.clone());
        }
    }

    pub(crate) fn monitor(name: &str, width: u32, height: u32, scale: f64) -> Monitor {
        Monitor::new(MonitorConfiguration {
            name: name.into(),
            physical_width: width,
            physical_height: height,
            scale,
            ..Default::default()
        })
        .unwrap()
    }

    fn observed(m: &mut Monitor) -> (Rc<Recorder>, SubscriptionId) {
        let rec = Rc::new(Recorder::default());
        let id = m.subscribe(rec.clone());
        (rec, id)
    }

    #[test]
    fn logical_size_divides_by_scale() {
        let m = monitor("DP-1", 2560, 1440, 1.25);
        assert_eq!(m.logical_size(), (2048.0, 1152.0));
    }

    #[test]
    fn rotated_transforms_swap_logical_axes() {
        for t in crate::transform::HYPRLAND_TRANSFORMS {
            let mut m = monitor("DP-1", 3000, 2000, 2.0);
            m.set_transform(t).unwrap();
            if t.is_rotated() {
                assert_eq!(m.logical_size(), (1000.0, 1500.0), "{t:?}");
            } else {
                assert_eq!(m.logical_size(), (1500.0, 1000.0), "{t:?}");
            }
        }
    }

    #[test]
    fn redundant_write_notifies_once() {
        let mut m = monitor("DP-1", 1920, 1080, 1.0);
        let (rec, id) = observed(&mut m);
        assert!(m.set_x(100).unwrap());
        assert!(!m.set_x(100).unwrap());
        assert_eq!(rec.changes.borrow().len(), 1);
        assert_eq!(
            rec.changes.borrow()[0],
            MonitorChange {
                monitor: "DP-1".into(),
                property: MonitorProperty::X(100),
            }
        );
        m.unsubscribe(id);
    }

    #[test]
    fn invalid_scale_is_rejected_without_event() {
        let mut m = monitor("DP-1", 1920, 1080, 1.0);
        let (rec, id) = observed(&mut m);
        for bad in [0.0, -1.5, f64::NAN, f64::INFINITY] {
            let err = m.set_scale(bad).unwrap_err();
            assert!(matches!(
                err,
                MonitorError::InvalidArgument { field: MonitorField::Scale, .. }
            ));
        }
        assert_eq!(m.scale(), 1.0);
        assert!(rec.changes.borrow().is_empty());
        m.unsubscribe(id);
    }

    #[test]
    fn zero_width_is_rejected() {
        let mut m = monitor("DP-1", 1920, 1080, 1.0);
        assert!(m.set_width(0).is_err());
        assert_eq!(m.width(), 1920);
    }

    #[test]
    fn set_mirror_sets_and_clears_both_fields() {
        let mut m = monitor("HDMI-A-1", 1920, 1080, 1.0);
        let (rec, id) = observed(&mut m);

        m.set_mirror(Some("DP-1")).unwrap();
        assert!(m.is_mirror());
        assert_eq!(m.mirror_of(), Some("DP-1"));

        m.set_mirror(None).unwrap();
        assert!(!m.is_mirror());
        assert_eq!(m.mirror_of(), None);

        let fields: Vec<_> = rec.changes.borrow().iter().map(|c| c.property.clone()).collect();
        assert_eq!(
            fields,
            vec![
                MonitorProperty::Mirror(Some("DP-1".into())),
                MonitorProperty::Mirror(None),
            ]
        );
        m.unsubscribe(id);
    }

    #[test]
    fn monitor_cannot_mirror_itself() {
        let mut m = monitor("DP-1", 1920, 1080, 1.0);
        assert!(m.set_mirror(Some("DP-1")).is_err());
        assert!(!m.is_mirror());
    }

    #[test]
    fn set_mode_is_all_or_nothing() {
        let mut m = monitor("DP-1", 1920, 1080, 1.0);
        let err = m.set_mode(MonitorMode::new(2560, 1440, 0.0));
        assert!(err.is_err());
        assert_eq!(m.current_mode(), MonitorMode::new(1920, 1080, 60.0));

        let (rec, id) = observed(&mut m);
        m.set_mode(MonitorMode::new(2560, 1080, 60.0)).unwrap();
        // Height and refresh rate were unchanged.
        assert_eq!(rec.changes.borrow().len(), 1);
        m.unsubscribe(id);
    }

    #[test]
    fn unsubscribed_observer_hears_nothing() {
        let mut m = monitor("DP-1", 1920, 1080, 1.0);
        let (rec, id) = observed(&mut m);
        assert!(m.unsubscribe(id));
        assert!(!m.unsubscribe(id));
        m.set_y(50).unwrap();
        assert!(rec.changes.borrow().is_empty());
        assert_eq!(m.observer_count(), 0);
    }

    #[test]
    fn channel_observer_receives_changes() {
        let mut m = monitor("DP-1", 1920, 1080, 1.0);
        let (tx, rx) = mpsc::channel();
        let id = m.subscribe(Rc::new(tx));
        m.set_transform(TransformMode::Rotate90).unwrap();
        m.set_dpms(false).unwrap();
        let got: Vec<_> = rx.try_iter().map(|c| c.property).collect();
        assert_eq!(
            got,
            vec![
                MonitorProperty::Transform(TransformMode::Rotate90),
                MonitorProperty::Dpms(false),
            ]
        );
        m.unsubscribe(id);
    }

    #[test]
    fn new_rejects_broken_configurations() {
        let base = MonitorConfiguration {
            name: "DP-1".into(),
            physical_width: 1920,
            physical_height: 1080,
            ..Default::default()
        };
        assert!(Monitor::new(MonitorConfiguration { scale: 0.0, ..base.clone() }).is_err());
        assert!(Monitor::new(MonitorConfiguration { name: String::new(), ..base.clone() }).is_err());
        assert!(Monitor::new(MonitorConfiguration {
            is_mirror: true,
            is_mirror_of: Some("DP-1".into()),
            ..base.clone()
        })
        .is_err());
        assert!(Monitor::new(base).is_ok());
    }

    #[test]
    fn snapshot_drops_duplicates_and_self_mirrors() {
        let cfg = |name: &str, mirror: Option<&str>| MonitorConfiguration {
            name: name.into(),
            physical_width: 1920,
            physical_height: 1080,
            is_mirror: mirror.is_some(),
            is_mirror_of: mirror.map(str::to_string),
            available_modes: vec![MonitorMode::new(1920, 1080, 60.0); 3],
            ..Default::default()
        };
        let monitors = build_snapshot(vec![
            cfg("DP-1", Some("DP-1")),
            cfg("DP-2", Some("DP-1")),
            cfg("DP-1", None),
            cfg("", None),
        ]);
        let names: Vec<_> = monitors.iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["DP-1", "DP-2"]);
        assert!(!monitors[0].is_mirror());
        assert_eq!(monitors[1].mirror_of(), Some("DP-1"));
        assert_eq!(monitors[0].available_modes().len(), 1);
    }

    #[test]
    fn state_round_trips_through_apply() {
        let mut a = monitor("DP-1", 1920, 1080, 1.0);
        a.set_x(1920).unwrap();
        a.set_transform(TransformMode::Rotate270).unwrap();
        a.set_mirror(Some("eDP-1")).unwrap();
        let state = a.state();

        let mut b = monitor("DP-1", 1280, 720, 2.0);
        assert!(b.apply_state(&state).unwrap());
        assert_eq!(b.state(), state);
        assert!(!b.apply_state(&state).unwrap());

        let mut other = monitor("DP-2", 1920, 1080, 1.0);
        assert!(other.apply_state(&state).is_err());
    }
}
