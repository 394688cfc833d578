//! Hyprland workspace-to-monitor bindings (`j/workspacerules`).

use super::ipc::HyprlandIpc;
use crate::traits::BackendError;
use serde::Deserialize;
use std::fmt;

/// One `workspace=…` rule binding a workspace to a monitor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorkspaceRule {
    /// Workspace selector as written in the config (`"1"`, `"name:web"`, …).
    #[serde(rename = "workspaceString", default)]
    pub workspace: String,
    /// Monitor name or `desc:` selector; empty when the rule has none.
    #[serde(default)]
    pub monitor: String,
    /// Whether this is the monitor's default workspace.
    #[serde(default)]
    pub default: bool,
}

impl WorkspaceRule {
    pub fn is_bound_to(&self, monitor: &str) -> bool {
        self.monitor == monitor
    }
}

impl fmt::Display for WorkspaceRule {
    /// Renders the rule in `hyprland.conf` syntax.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "workspace={},monitor:{},default:{}",
            self.workspace, self.monitor, self.default
        )
    }
}

/// Parse a `j/workspacerules` reply.  Rules without a monitor are dropped.
pub fn parse_workspace_rules(json: &str) -> Result<Vec<WorkspaceRule>, BackendError> {
    let rules: Vec<WorkspaceRule> = serde_json::from_str(json)?;
    Ok(rules.into_iter().filter(|r| !r.monitor.is_empty()).collect())
}

/// Query the workspace rules of the running Hyprland instance.
pub fn workspace_rules(ipc: &HyprlandIpc) -> Result<Vec<WorkspaceRule>, BackendError> {
    parse_workspace_rules(&ipc.json("workspacerules")?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hyprland::ipc::tests::serve_once;

    const RULES: &str = r#"[
        {"workspaceString": "1", "monitor": "DP-1", "default": true, "persistent": true},
        {"workspaceString": "2", "monitor": "HDMI-A-1"},
        {"workspaceString": "special:scratch", "gapsIn": [5, 5, 5, 5]}
    ]"#;

    #[test]
    fn parses_rules_and_skips_unbound() {
        let rules = parse_workspace_rules(RULES).unwrap();
        assert_eq!(rules.len(), 2);
        assert!(rules[0].default);
        assert!(rules[1].is_bound_to("HDMI-A-1"));
        assert!(!rules[1].default);
    }

    #[test]
    fn renders_config_syntax() {
        let rules = parse_workspace_rules(RULES).unwrap();
        assert_eq!(rules[0].to_string(), "workspace=1,monitor:DP-1,default:true");
    }

    #[test]
    fn queries_workspacerules() {
        let (path, server) = serve_once(RULES);
        let rules = workspace_rules(&HyprlandIpc::at(&path)).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(server.join().unwrap(), "j/workspacerules");
        let _ = std::fs::remove_file(&path);
    }
}
