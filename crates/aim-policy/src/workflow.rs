// workflow.rs — Workflow name validation.
//
// Workflow names end up in file paths on the executing side, so anything
// beyond `[a-zA-Z0-9_-]` (slashes, dots, "..") is refused outright.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::PolicyError;

fn workflow_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("static regex is valid"))
}

/// Validate a workflow name, returning it unchanged when acceptable.
pub fn validate_workflow_name(name: &str) -> Result<&str, PolicyError> {
    if workflow_name_regex().is_match(name) {
        Ok(name)
    } else {
        Err(PolicyError::InvalidWorkflowName(name.to_string()))
    }
}
