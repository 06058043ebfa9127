// config.rs — Governance configuration.
//
// GovernanceConfig determines where sealed audit records and observation
// events are written, and which gateway-level screens apply. Defaults live
// under a `.aim/` directory in the project root; `.aim/governance.toml`
// overrides them:
//
//   audit_log = ".aim/audit.jsonl"
//   events_log = ".aim/events.jsonl"
//   enforce_phrase_policy = true
//   max_parameters_bytes = 1000000
//   allowed_workflows = ["deploy-to-staging", "rotate-logs"]

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// Directory holding governance state inside a project.
pub const AIM_DIR: &str = ".aim";

/// Config file name inside [`AIM_DIR`].
pub const CONFIG_FILE: &str = "governance.toml";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GovernanceConfig {
    /// Path to the append-only audit log.
    #[serde(default = "default_audit_log")]
    pub audit_log: PathBuf,

    /// Path to the observation event log.
    #[serde(default = "default_events_log")]
    pub events_log: PathBuf,

    /// Run the prescriptive-language filter on draft/research output.
    #[serde(default = "default_enforce_phrase_policy")]
    pub enforce_phrase_policy: bool,

    /// Largest accepted size of the serialized request parameters.
    #[serde(default = "default_max_parameters_bytes")]
    pub max_parameters_bytes: usize,

    /// When non-empty, only these workflows may run.
    #[serde(default)]
    pub allowed_workflows: Vec<String>,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            audit_log: default_audit_log(),
            events_log: default_events_log(),
            enforce_phrase_policy: default_enforce_phrase_policy(),
            max_parameters_bytes: default_max_parameters_bytes(),
            allowed_workflows: Vec::new(),
        }
    }
}

// Serde default functions
fn default_audit_log() -> PathBuf {
    PathBuf::from(AIM_DIR).join("audit.jsonl")
}

fn default_events_log() -> PathBuf {
    PathBuf::from(AIM_DIR).join("events.jsonl")
}

fn default_enforce_phrase_policy() -> bool {
    true
}

fn default_max_parameters_bytes() -> usize {
    1_000_000
}

impl GovernanceConfig {
    /// Default config with paths anchored at `project_root`.
    pub fn for_project(project_root: impl AsRef<Path>) -> Self {
        Self::default().anchored(project_root.as_ref())
    }

    /// Load `.aim/governance.toml` from `project_root`, falling back to
    /// defaults when the file does not exist. Relative paths in the file are
    /// resolved against `project_root`.
    pub fn load(project_root: impl AsRef<Path>) -> Result<Self, GatewayError> {
        let root = project_root.as_ref();
        let path = root.join(AIM_DIR).join(CONFIG_FILE);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no governance config, using defaults");
            return Ok(Self::for_project(root));
        }

        let content = std::fs::read_to_string(&path).map_err(|source| GatewayError::IoError {
            path: path.clone(),
            source,
        })?;
        let config: Self = toml::from_str(&content)
            .map_err(|source| GatewayError::ConfigParse { path, source })?;
        Ok(config.anchored(root))
    }

    /// Whether `workflow_name` passes the allow-list (empty list allows all).
    pub fn is_workflow_allowed(&self, workflow_name: &str) -> bool {
        self.allowed_workflows.is_empty()
            || self.allowed_workflows.iter().any(|w| w == workflow_name)
    }

    fn anchored(mut self, root: &Path) -> Self {
        if self.audit_log.is_relative() {
            self.audit_log = root.join(&self.audit_log);
        }
        if self.events_log.is_relative() {
            self.events_log = root.join(&self.events_log);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn for_project_uses_aim_layout() {
        let config = GovernanceConfig::for_project("/srv/project");
        assert_eq!(config.audit_log, PathBuf::from("/srv/project/.aim/audit.jsonl"));
        assert_eq!(config.events_log, PathBuf::from("/srv/project/.aim/events.jsonl"));
        assert!(config.enforce_phrase_policy);
        assert_eq!(config.max_parameters_bytes, 1_000_000);
        assert!(config.allowed_workflows.is_empty());
    }

    #[test]
    fn load_without_file_returns_defaults() {
        let dir = tempdir().unwrap();
        let config = GovernanceConfig::load(dir.path()).unwrap();
        assert_eq!(config, GovernanceConfig::for_project(dir.path()));
    }

    #[test]
    fn load_reads_overrides_and_anchors_relative_paths() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(AIM_DIR)).unwrap();
        std::fs::write(
            dir.path().join(AIM_DIR).join(CONFIG_FILE),
            r#"
audit_log = "logs/governance.jsonl"
enforce_phrase_policy = false
allowed_workflows = ["deploy-to-staging"]
"#,
        )
        .unwrap();

        let config = GovernanceConfig::load(dir.path()).unwrap();
        assert_eq!(config.audit_log, dir.path().join("logs/governance.jsonl"));
        assert_eq!(config.events_log, dir.path().join(".aim/events.jsonl"));
        assert!(!config.enforce_phrase_policy);
        assert!(config.is_workflow_allowed("deploy-to-staging"));
        assert!(!config.is_workflow_allowed("drop-database"));
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(AIM_DIR)).unwrap();
        std::fs::write(
            dir.path().join(AIM_DIR).join(CONFIG_FILE),
            "max_parameters_bytes = \"lots\"",
        )
        .unwrap();

        match GovernanceConfig::load(dir.path()) {
            Err(GatewayError::ConfigParse { path, .. }) => {
                assert!(path.ends_with("governance.toml"));
            }
            other => panic!("expected ConfigParse, got {:?}", other),
        }
    }

    #[test]
    fn empty_allow_list_allows_everything() {
        assert!(GovernanceConfig::default().is_workflow_allowed("anything"));
    }
}
