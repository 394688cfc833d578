//! **outlay**: visual monitor arrangement for Sway and Hyprland.
//!
//! Monitors are read from the running compositor, normalised into one
//! backend-independent [`monitor::Monitor`] type, and arranged on a scaled
//! canvas where they can be dragged and snapped against each other.  The
//! result can be written back as a native compositor config or stored as a
//! named profile.
//!
//! # Architecture
//!
//! The crate is organised around two core traits:
//!
//! * [`traits::MonitorService`]: produces a monitor snapshot so the
//!   arrangement logic is not coupled to any specific compositor.
//! * [`traits::MonitorObserver`]: receives typed change events from a
//!   monitor, so views stay in sync without polling.
//!
//! Concrete services live in [`hyprland`] (Hyprland IPC) and [`sway`]
//! (i3-ipc); [`session`] picks one from the environment.  The drag and snap
//! controller in [`arrange`] is toolkit independent; [`canvas`] puts it on
//! screen when the `canvas-gtk` feature is enabled.

pub mod arrange;
pub mod canvas;
pub mod config;
pub mod hyprland;
pub mod mode;
pub mod monitor;
pub mod profile;
pub mod session;
pub mod sway;
pub mod traits;
pub mod transform;

/// First line of every generated compositor config file.
pub const GENERATED_HEADER: &str = "# Generated by outlay. Do not edit manually.";
