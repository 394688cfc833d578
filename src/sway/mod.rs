//! Sway-specific implementations: the i3-ipc client, the output adapter
//! behind [`SwayMonitorService`](outputs::SwayMonitorService) and the
//! `output` config writer.

pub mod config;
pub mod ipc;
pub mod outputs;
