//! Hyprland-specific implementations.
//!
//! This module provides the Hyprland [`MonitorService`](crate::traits::MonitorService),
//! the workspace-rule query and the `monitor=` config writer, all powered by
//! Hyprland's request socket.
//!
//! Nothing outside this module should reference Hyprland's wire format
//! directly.

pub mod config;
pub mod ipc;
pub mod monitors;
pub mod workspace_rules;
