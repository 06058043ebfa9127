// validate.rs — `aim validate`: run the admissibility gate on a request file.

use std::path::Path;

use aim_policy::{governance_summary, validate_with_trace, AdmissibilityDecision, ValidationTrace};

pub fn execute(file: &Path, json: bool) -> anyhow::Result<()> {
    let request = super::load_request(file)?;
    let trace = validate_with_trace(&request);

    if json {
        println!("{}", serde_json::to_string_pretty(&trace)?);
    } else {
        print!("{}", render_steps(&trace));
        if let AdmissibilityDecision::Admitted { mode } = trace.decision {
            println!();
            println!("{}", governance_summary(&request, mode));
        }
    }

    match trace.decision {
        AdmissibilityDecision::Admitted { mode } => {
            tracing::debug!(
                workflow_name = %request.workflow_name,
                drag_mode = %mode,
                "request admitted"
            );
            Ok(())
        }
        AdmissibilityDecision::Rejected { reason, .. } => {
            anyhow::bail!("Request rejected: {}", reason)
        }
    }
}

/// One line per check, then the decision.
fn render_steps(trace: &ValidationTrace) -> String {
    let mut out = String::new();
    for step in &trace.steps {
        out.push_str(&format!("  {:<20} {}\n", step.check, step.outcome));
    }
    match &trace.decision {
        AdmissibilityDecision::Admitted { mode } => {
            out.push_str(&format!("ADMITTED ({})\n", mode.as_str().to_uppercase()));
        }
        AdmissibilityDecision::Rejected { rule, reason } => {
            out.push_str(&format!("REJECTED [{}]: {}\n", rule, reason));
        }
    }
    out
}
