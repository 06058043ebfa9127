// mod.rs — Subcommand implementations and shared request loading.

pub mod audit;
pub mod check;
pub mod record;
pub mod validate;

use std::path::Path;

use aim_policy::GovernanceRequest;
use anyhow::Context;

/// Load a governance request from a `.json`, `.yaml` or `.yml` file.
///
/// Files with any other extension are parsed as JSON.
pub fn load_request(path: &Path) -> anyhow::Result<GovernanceRequest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read request file {}", path.display()))?;

    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    let request = if is_yaml {
        serde_yaml::from_str(&content)
            .with_context(|| format!("invalid YAML request in {}", path.display()))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("invalid JSON request in {}", path.display()))?
    };
    Ok(request)
}
