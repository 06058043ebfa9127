// validator.rs — Admissibility gate for governance requests.
//
// Every governed action passes through `validate()` before it may run.
// Checks run in a fixed order and stop at the first failure:
//
// 1. Actor name (trimmed) has fewer than 3 characters? → Reject
// 2. No input sources? → Reject
// 3. Mission objective shorter than 10 characters? → Reject
// 4. No success criteria? → Reject
// 5. Mode is not draft/research/grunt/execute? → Reject (analysis is human-only)
// 6. Any remaining field-level error (e.g., email without "@")? → Reject
// 7. Otherwise → Admit
//
// Accountability comes first: a request with no real person behind it is
// reported as such even if everything else is also wrong.
//
// This gate does not run the phrase policy; that happens once the action
// has produced text.

use serde::{Deserialize, Serialize};

use crate::declaration::{Declaration, MIN_OBJECTIVE_CHARS};
use crate::error::PolicyError;
use crate::mode::DragMode;

/// Minimum trimmed length of the actor's name, in characters.
pub const MIN_ACTOR_NAME_CHARS: usize = 3;

/// A governance-aware workflow execution request.
///
/// `mode` stays a raw string so that a reserved or unknown mode reaches the
/// gate and is rejected with a reason, rather than failing to parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernanceRequest {
    /// Name of the workflow to execute.
    pub workflow_name: String,
    /// The complete AIM declaration.
    #[serde(alias = "aim")]
    pub declaration: Declaration,
    /// Requested DRAG mode, as supplied by the caller.
    #[serde(alias = "drag_mode")]
    pub mode: String,
    /// Workflow-specific parameters.
    #[serde(default)]
    pub parameters: serde_json::Map<String, serde_json::Value>,
    /// Correlation id supplied by the caller, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

impl GovernanceRequest {
    pub fn new(
        workflow_name: impl Into<String>,
        declaration: Declaration,
        mode: impl Into<String>,
    ) -> Self {
        Self {
            workflow_name: workflow_name.into(),
            declaration,
            mode: mode.into(),
            parameters: serde_json::Map::new(),
            trace_id: None,
        }
    }

    /// Add one workflow parameter and return self (builder pattern).
    pub fn with_parameter(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }
}

/// Which admissibility rule rejected a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionRule {
    ActorName,
    InputSources,
    MissionObjective,
    SuccessCriteria,
    ReservedMode,
    UnknownMode,
    MalformedField,
}

impl RejectionRule {
    /// Stable label, suitable for a metrics `failure_reason` dimension.
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionRule::ActorName => "actor_name",
            RejectionRule::InputSources => "input_sources",
            RejectionRule::MissionObjective => "mission_objective",
            RejectionRule::SuccessCriteria => "success_criteria",
            RejectionRule::ReservedMode => "reserved_mode",
            RejectionRule::UnknownMode => "unknown_mode",
            RejectionRule::MalformedField => "malformed_field",
        }
    }
}

impl std::fmt::Display for RejectionRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outcome of the admissibility gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum AdmissibilityDecision {
    /// The request may proceed under the parsed mode.
    Admitted { mode: DragMode },
    /// The request must not proceed.
    Rejected { rule: RejectionRule, reason: String },
}

impl AdmissibilityDecision {
    pub fn is_admitted(&self) -> bool {
        matches!(self, AdmissibilityDecision::Admitted { .. })
    }

    /// The single rejection reason, if rejected.
    pub fn reason(&self) -> Option<&str> {
        match self {
            AdmissibilityDecision::Admitted { .. } => None,
            AdmissibilityDecision::Rejected { reason, .. } => Some(reason),
        }
    }

    /// The admitted mode, if admitted.
    pub fn mode(&self) -> Option<DragMode> {
        match self {
            AdmissibilityDecision::Admitted { mode } => Some(*mode),
            AdmissibilityDecision::Rejected { .. } => None,
        }
    }

    fn reject(rule: RejectionRule, reason: impl Into<String>) -> Self {
        AdmissibilityDecision::Rejected {
            rule,
            reason: reason.into(),
        }
    }
}

/// One check performed by the gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationStep {
    /// Which check was performed (e.g., "actor_name", "drag_mode").
    pub check: String,
    /// "passed", or "failed: <reason>".
    pub outcome: String,
    /// Whether this step decided the result.
    pub terminal: bool,
}

/// The decision together with every check that led to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationTrace {
    pub decision: AdmissibilityDecision,
    pub steps: Vec<ValidationStep>,
}

/// A business rule over the declaration: `None` when satisfied.
type RuleCheck = fn(&Declaration) -> Option<AdmissibilityDecision>;

/// Declaration rules, in evaluation order.
const DECLARATION_RULES: &[(&str, RuleCheck)] = &[
    ("actor_name", check_actor_name),
    ("input_sources", check_input_sources),
    ("mission_objective", check_mission_objective),
    ("success_criteria", check_success_criteria),
];

/// Validate a governance request. Returns exactly one reason on rejection.
pub fn validate(request: &GovernanceRequest) -> AdmissibilityDecision {
    validate_with_trace(request).decision
}

/// Same as [`validate`], recording each check for decision observability.
pub fn validate_with_trace(request: &GovernanceRequest) -> ValidationTrace {
    let mut steps = Vec::new();

    for (check, rule) in DECLARATION_RULES {
        if let Some(decision) = rule(&request.declaration) {
            steps.push(failed_step(check, &decision));
            return ValidationTrace { decision, steps };
        }
        steps.push(passed_step(check));
    }

    let mode = match request.mode.parse::<DragMode>() {
        Ok(mode) => mode,
        Err(err) => {
            let decision = mode_rejection(&err);
            steps.push(failed_step("drag_mode", &decision));
            return ValidationTrace { decision, steps };
        }
    };
    steps.push(passed_step("drag_mode"));

    // Field-level problems the business rules above do not cover.
    if let Some(field_error) = request.declaration.validate().into_iter().next() {
        let decision = AdmissibilityDecision::reject(
            RejectionRule::MalformedField,
            format!("Invalid declaration field {}", field_error),
        );
        steps.push(failed_step("declaration_fields", &decision));
        return ValidationTrace { decision, steps };
    }
    steps.push(ValidationStep {
        check: "declaration_fields".to_string(),
        outcome: "passed".to_string(),
        terminal: true,
    });

    ValidationTrace {
        decision: AdmissibilityDecision::Admitted { mode },
        steps,
    }
}

fn check_actor_name(aim: &Declaration) -> Option<AdmissibilityDecision> {
    (aim.actor.name.trim().chars().count() < MIN_ACTOR_NAME_CHARS).then(|| {
        AdmissibilityDecision::reject(
            RejectionRule::ActorName,
            "Actor name must be at least 3 characters (real person required)",
        )
    })
}

fn check_input_sources(aim: &Declaration) -> Option<AdmissibilityDecision> {
    aim.input.sources.is_empty().then(|| {
        AdmissibilityDecision::reject(
            RejectionRule::InputSources,
            "At least one input source required to constrain AI behavior",
        )
    })
}

fn check_mission_objective(aim: &Declaration) -> Option<AdmissibilityDecision> {
    (aim.mission.objective_len() < MIN_OBJECTIVE_CHARS).then(|| {
        AdmissibilityDecision::reject(
            RejectionRule::MissionObjective,
            "Mission objective too vague (minimum 10 characters)",
        )
    })
}

fn check_success_criteria(aim: &Declaration) -> Option<AdmissibilityDecision> {
    aim.mission.success_criteria.is_empty().then(|| {
        AdmissibilityDecision::reject(
            RejectionRule::SuccessCriteria,
            "Mission must have at least one success criterion",
        )
    })
}

fn mode_rejection(err: &PolicyError) -> AdmissibilityDecision {
    match err {
        PolicyError::UnknownMode(raw) => AdmissibilityDecision::reject(
            RejectionRule::UnknownMode,
            format!(
                "Invalid DRAG mode '{}'. Allowed modes: draft, research, grunt, execute. Analysis is human-only.",
                raw
            ),
        ),
        _ => AdmissibilityDecision::reject(
            RejectionRule::ReservedMode,
            "Invalid DRAG mode. Analysis is human-only.",
        ),
    }
}

fn passed_step(check: &str) -> ValidationStep {
    ValidationStep {
        check: check.to_string(),
        outcome: "passed".to_string(),
        terminal: false,
    }
}

fn failed_step(check: &str, decision: &AdmissibilityDecision) -> ValidationStep {
    ValidationStep {
        check: check.to_string(),
        outcome: format!("failed: {}", decision.reason().unwrap_or_default()),
        terminal: true,
    }
}
