// summary.rs — Human-readable governance context for logs and chat notices.

use crate::mode::DragMode;
use crate::validator::GovernanceRequest;

/// Objectives longer than this are truncated for display.
const OBJECTIVE_DISPLAY_CHARS: usize = 80;

/// How many source types are listed before the rest are elided.
const SOURCE_TYPES_SHOWN: usize = 3;

/// Render the governance context of an admitted request.
///
/// ```text
/// Governance Context:
/// - Actor: Jake Smith (Product Lead)
/// - Mission: Deploy updated application to staging
/// - DRAG Mode: EXECUTE
/// - Input Sources: 1 (slack_webhook)
/// - Success Criteria: 3
/// - Constraints: 2
/// ```
///
/// Truncation applies to the rendered text only; the request is untouched.
pub fn governance_summary(request: &GovernanceRequest, mode: DragMode) -> String {
    let aim = &request.declaration;
    let source_types: Vec<&str> = aim
        .input
        .sources
        .iter()
        .take(SOURCE_TYPES_SHOWN)
        .map(|s| s.source_type.as_str())
        .collect();

    format!(
        "Governance Context:\n\
         - Actor: {} ({})\n\
         - Mission: {}\n\
         - DRAG Mode: {}\n\
         - Input Sources: {} ({})\n\
         - Success Criteria: {}\n\
         - Constraints: {}",
        aim.actor.name,
        aim.actor.role,
        truncate_for_display(&aim.mission.objective, OBJECTIVE_DISPLAY_CHARS),
        mode.as_str().to_uppercase(),
        aim.input.sources.len(),
        source_types.join(", "),
        aim.mission.success_criteria.len(),
        aim.input.constraints.len(),
    )
}

/// Cut `text` to at most `max` characters, appending "..." when cut.
fn truncate_for_display(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::{Actor, Declaration, Input, InputSource, Mission};

    fn request_with_objective(objective: &str) -> GovernanceRequest {
        let aim = Declaration::new(
            Actor::new("Jake Smith", "Product Lead"),
            Input::new(vec![
                InputSource::new("slack_webhook", "payload"),
                InputSource::new("configuration", "terraform.tfvars"),
                InputSource::new("file", "workflow.yml"),
                InputSource::new("database", "deploy history"),
            ])
            .with_constraint("Read-only access")
            .with_constraint("No infrastructure changes"),
            Mission::new(
                objective,
                vec![
                    "Zero downtime".to_string(),
                    "Health checks pass".to_string(),
                    "Rollback on failure".to_string(),
                ],
            ),
        );
        GovernanceRequest::new("deploy-to-staging", aim, "execute")
    }

    #[test]
    fn summary_lists_governance_context() {
        let request = request_with_objective("Deploy updated application to staging");
        let summary = governance_summary(&request, DragMode::Execute);
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Governance Context:",
                "- Actor: Jake Smith (Product Lead)",
                "- Mission: Deploy updated application to staging",
                "- DRAG Mode: EXECUTE",
                "- Input Sources: 4 (slack_webhook, configuration, file)",
                "- Success Criteria: 3",
                "- Constraints: 2",
            ]
        );
    }

    #[test]
    fn long_objective_is_truncated_for_display_only() {
        let objective = "x".repeat(100);
        let request = request_with_objective(&objective);
        let summary = governance_summary(&request, DragMode::Draft);
        assert!(summary.contains(&format!("- Mission: {}...\n", "x".repeat(80))));
        assert_eq!(request.declaration.mission.objective.len(), 100);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_for_display("ééé", 2), "éé...");
        assert_eq!(truncate_for_display("ééé", 3), "ééé");
    }
}
