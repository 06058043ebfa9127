// governor.rs — Runs one governed action between the gate and the audit log.
//
// Flow for `Governor::govern()`:
//
// 1. Trace id: the request's own, or a fresh UUID v4.
// 2. Screens: workflow name syntax, allow-list, parameter size.
// 3. Admissibility gate (aim_policy::validate).
//    Rejected → sealed "rejected" record, ValidationFailed event, done.
// 4. The caller's action runs, timed.
// 5. Draft/research text output → phrase policy. A violation turns the
//    outcome into "failure": the action happened but did not meet policy.
// 6. Sealed record → audit sink; ActionCompleted + AuditRecorded events.
//
// The audit sink is the only place a failure stops the flow: a record that
// cannot be stored is an error, never silently dropped.

use std::time::Instant;

use aim_audit::{AuditOutcome, AuditRecord, AuditSink};
use aim_policy::{
    check_output, governance_summary, validate, validate_workflow_name, AdmissibilityDecision,
    DragMode, GovernanceRequest, PhraseVerdict,
};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::config::GovernanceConfig;
use crate::error::GatewayError;
use crate::events::{EventDispatcher, GovernanceEvent};

/// What an admitted action produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionOutput {
    /// Structured result handed back to the caller (not audited).
    pub result: serde_json::Value,
    /// Generated text subject to the phrase policy, if any.
    pub text: Option<String>,
}

impl ActionOutput {
    pub fn new(result: serde_json::Value) -> Self {
        Self { result, text: None }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// The view of an admitted request given to the action closure.
#[derive(Debug, Clone, Copy)]
pub struct AdmittedRequest<'a> {
    pub trace_id: &'a str,
    pub mode: DragMode,
    pub request: &'a GovernanceRequest,
}

/// How a governed action ended, with its sealed audit record.
#[derive(Debug, Clone, PartialEq)]
pub enum GovernanceOutcome {
    /// Refused before the action started (a 400-class outcome).
    Rejected {
        trace_id: String,
        /// Stable label of the failing check (e.g., "actor_name").
        failure_reason: String,
        reason: String,
        record: AuditRecord,
    },
    /// The action ran; `record.outcome` says whether it met policy.
    Completed {
        record: AuditRecord,
        output: Option<ActionOutput>,
    },
}

impl GovernanceOutcome {
    pub fn trace_id(&self) -> &str {
        &self.record().trace_id
    }

    pub fn record(&self) -> &AuditRecord {
        match self {
            GovernanceOutcome::Rejected { record, .. } => record,
            GovernanceOutcome::Completed { record, .. } => record,
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, GovernanceOutcome::Rejected { .. })
    }

    /// HTTP status the surrounding server should answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            GovernanceOutcome::Rejected { .. } => 400,
            GovernanceOutcome::Completed { record, .. } => match record.outcome {
                AuditOutcome::Success => 200,
                _ => 500,
            },
        }
    }

    /// Error payload `{error, code, trace_id}` for non-success outcomes.
    pub fn error_body(&self) -> Option<serde_json::Value> {
        match self {
            GovernanceOutcome::Rejected {
                trace_id, reason, ..
            } => Some(json!({
                "error": reason,
                "code": "VALIDATION_ERROR",
                "trace_id": trace_id,
            })),
            GovernanceOutcome::Completed { record, .. } if record.outcome != AuditOutcome::Success => {
                Some(json!({
                    "error": record.error.as_deref().unwrap_or("Unknown error"),
                    "code": "EXECUTION_FAILED",
                    "trace_id": record.trace_id,
                }))
            }
            GovernanceOutcome::Completed { .. } => None,
        }
    }
}

/// Sequences governed actions against caller-supplied sinks.
pub struct Governor<S: AuditSink> {
    config: GovernanceConfig,
    audit: S,
    events: EventDispatcher,
}

impl<S: AuditSink> Governor<S> {
    pub fn new(config: GovernanceConfig, audit: S, events: EventDispatcher) -> Self {
        Self {
            config,
            audit,
            events,
        }
    }

    pub fn config(&self) -> &GovernanceConfig {
        &self.config
    }

    pub fn audit_sink(&self) -> &S {
        &self.audit
    }

    /// Consume the governor, returning its audit sink.
    pub fn into_audit_sink(self) -> S {
        self.audit
    }

    /// Gate, run, filter, seal and record one action.
    ///
    /// `action` runs only if the request is admitted. It returns its output,
    /// or an error message that is recorded as a failure.
    pub fn govern<F>(
        &mut self,
        request: GovernanceRequest,
        action: F,
    ) -> Result<GovernanceOutcome, GatewayError>
    where
        F: FnOnce(AdmittedRequest<'_>) -> Result<ActionOutput, String>,
    {
        let trace_id = request
            .trace_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        if let Some((label, reason)) = self.screen(&request)? {
            return self.reject(&request, trace_id, label, reason);
        }

        let mode = match validate(&request) {
            AdmissibilityDecision::Admitted { mode } => mode,
            AdmissibilityDecision::Rejected { rule, reason } => {
                return self.reject(&request, trace_id, rule.as_str().to_string(), reason);
            }
        };

        tracing::info!(
            trace_id = %trace_id,
            actor = %request.declaration.actor.name,
            drag_mode = %mode,
            workflow_name = %request.workflow_name,
            "governance request admitted"
        );
        tracing::debug!("{}", governance_summary(&request, mode));
        self.events.dispatch(&GovernanceEvent::RequestValidated {
            trace_id: trace_id.clone(),
            drag_mode: mode.to_string(),
            actor_role: request.declaration.actor.role.clone(),
            workflow_name: request.workflow_name.clone(),
            timestamp: Utc::now(),
        });

        let started = Instant::now();
        let result = action(AdmittedRequest {
            trace_id: &trace_id,
            mode,
            request: &request,
        });
        let elapsed = started.elapsed();

        let (outcome, error, output) = match result {
            Ok(output) => match self.phrase_violation(&trace_id, mode, &output) {
                Some(reason) => (AuditOutcome::Failure, Some(reason), Some(output)),
                None => (AuditOutcome::Success, None, Some(output)),
            },
            Err(message) => (AuditOutcome::Failure, Some(message), None),
        };

        let mut record = AuditRecord::new(
            trace_id.as_str(),
            request.declaration.to_snapshot(),
            request.mode.as_str(),
            request.workflow_name.as_str(),
            outcome,
        )
        .with_parameters(request.parameters.clone())
        .with_duration(elapsed);
        record.error = error;

        let record = self.seal_and_store(record)?;

        tracing::info!(
            trace_id = %trace_id,
            actor = %request.declaration.actor.name,
            drag_mode = %mode,
            workflow_name = %request.workflow_name,
            outcome = %outcome,
            duration_seconds = elapsed.as_secs_f64(),
            "governed action completed"
        );
        self.events.dispatch(&GovernanceEvent::ActionCompleted {
            trace_id: trace_id.clone(),
            workflow_name: request.workflow_name.clone(),
            drag_mode: mode.to_string(),
            outcome: outcome.to_string(),
            duration_seconds: elapsed.as_secs_f64(),
            timestamp: Utc::now(),
        });
        self.announce_record(&record);

        Ok(GovernanceOutcome::Completed { record, output })
    }

    /// Gateway-level screens that run before the admissibility gate.
    fn screen(&self, request: &GovernanceRequest) -> Result<Option<(String, String)>, GatewayError> {
        if let Err(e) = validate_workflow_name(&request.workflow_name) {
            return Ok(Some(("invalid_workflow_name".to_string(), e.to_string())));
        }
        if !self.config.is_workflow_allowed(&request.workflow_name) {
            return Ok(Some((
                "workflow_not_allowed".to_string(),
                format!("Workflow '{}' is not in the allowed list", request.workflow_name),
            )));
        }
        let size = serde_json::to_vec(&request.parameters)?.len();
        if size > self.config.max_parameters_bytes {
            return Ok(Some((
                "parameters_too_large".to_string(),
                format!(
                    "Request parameters too large ({} bytes, max {})",
                    size, self.config.max_parameters_bytes
                ),
            )));
        }
        Ok(None)
    }

    /// Phrase-policy reason for the output, if it violates policy.
    fn phrase_violation(&self, trace_id: &str, mode: DragMode, output: &ActionOutput) -> Option<String> {
        if !self.config.enforce_phrase_policy {
            return None;
        }
        let text = output.text.as_deref()?;
        match check_output(text, mode) {
            PhraseVerdict::Accepted => None,
            PhraseVerdict::Rejected { phrase, reason } => {
                tracing::warn!(
                    trace_id = %trace_id,
                    drag_mode = %mode,
                    phrase = %phrase,
                    "prescriptive language in output"
                );
                self.events.dispatch(&GovernanceEvent::PrescriptiveLanguageDetected {
                    trace_id: trace_id.to_string(),
                    drag_mode: mode.to_string(),
                    phrase,
                    timestamp: Utc::now(),
                });
                Some(reason)
            }
        }
    }

    fn reject(
        &mut self,
        request: &GovernanceRequest,
        trace_id: String,
        failure_reason: String,
        reason: String,
    ) -> Result<GovernanceOutcome, GatewayError> {
        tracing::warn!(
            trace_id = %trace_id,
            actor = %request.declaration.actor.name,
            drag_mode = %request.mode,
            workflow_name = %request.workflow_name,
            failure_reason = %failure_reason,
            "governance request rejected: {}",
            reason
        );
        self.events.dispatch(&GovernanceEvent::ValidationFailed {
            trace_id: trace_id.clone(),
            drag_mode: request.mode.clone(),
            workflow_name: request.workflow_name.clone(),
            failure_reason: failure_reason.clone(),
            reason: reason.clone(),
            timestamp: Utc::now(),
        });

        let record = AuditRecord::new(
            trace_id.as_str(),
            request.declaration.to_snapshot(),
            request.mode.as_str(),
            request.workflow_name.as_str(),
            AuditOutcome::Rejected,
        )
        .with_parameters(request.parameters.clone())
        .with_error(reason.as_str());

        let record = self.seal_and_store(record)?;
        self.announce_record(&record);

        Ok(GovernanceOutcome::Rejected {
            trace_id,
            failure_reason,
            reason,
            record,
        })
    }

    /// Seal the record and hand a copy to the audit sink.
    fn seal_and_store(&mut self, mut record: AuditRecord) -> Result<AuditRecord, GatewayError> {
        record.finalize()?;
        self.audit.record(record.clone())?;
        Ok(record)
    }

    fn announce_record(&self, record: &AuditRecord) {
        self.events.dispatch(&GovernanceEvent::AuditRecorded {
            trace_id: record.trace_id.clone(),
            drag_mode: record.mode.clone(),
            outcome: record.outcome.to_string(),
            integrity_hash: record.integrity_hash.clone().unwrap_or_default(),
            timestamp: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MemorySink;
    use aim_audit::MemoryAuditSink;
    use aim_policy::{Actor, Declaration, Input, InputSource, Mission};

    fn declaration() -> Declaration {
        Declaration::new(
            Actor::new("Jake Smith", "Product Lead").with_email("jake@example.org"),
            Input::new(vec![InputSource::new("slack_webhook", "Slash command payload")]),
            Mission::new(
                "Deploy updated application to staging",
                vec!["Zero downtime".to_string()],
            ),
        )
    }

    fn governor(config: GovernanceConfig) -> (Governor<MemoryAuditSink>, MemorySink) {
        let events = MemorySink::new();
        let mut dispatcher = EventDispatcher::new();
        dispatcher.add_sink(Box::new(events.clone()));
        (
            Governor::new(config, MemoryAuditSink::new(), dispatcher),
            events,
        )
    }

    fn event_types(sink: &MemorySink) -> Vec<String> {
        sink.events()
            .iter()
            .map(|e| e.event_type().to_string())
            .collect()
    }

    #[test]
    fn admitted_action_is_sealed_as_success() {
        let (mut gov, events) = governor(GovernanceConfig::default());
        let request = GovernanceRequest::new("deploy-to-staging", declaration(), "execute")
            .with_parameter("environment", json!("staging"))
            .with_trace_id("trace-42");

        let outcome = gov
            .govern(request, |admitted| {
                assert_eq!(admitted.mode, DragMode::Execute);
                assert_eq!(admitted.trace_id, "trace-42");
                Ok(ActionOutput::new(json!({"deployed": true})))
            })
            .unwrap();

        assert!(!outcome.is_rejected());
        assert_eq!(outcome.http_status(), 200);
        assert_eq!(outcome.error_body(), None);
        let record = outcome.record();
        assert_eq!(record.outcome, AuditOutcome::Success);
        assert_eq!(record.mode, "execute");
        assert_eq!(record.parameters["environment"], "staging");
        assert!(record.duration_seconds.unwrap() >= 0.0);
        assert!(record.verify_integrity());

        assert_eq!(gov.audit_sink().records(), &[record.clone()]);
        assert_eq!(
            event_types(&events),
            vec!["request_validated", "action_completed", "audit_recorded"]
        );
    }

    #[test]
    fn rejected_request_never_runs_the_action() {
        let (mut gov, events) = governor(GovernanceConfig::default());
        let request = GovernanceRequest::new("deploy-to-staging", declaration(), "analysis");

        let outcome = gov
            .govern(request, |_| panic!("action must not run"))
            .unwrap();

        match &outcome {
            GovernanceOutcome::Rejected {
                failure_reason,
                reason,
                record,
                ..
            } => {
                assert_eq!(failure_reason, "reserved_mode");
                assert_eq!(reason, "Invalid DRAG mode. Analysis is human-only.");
                assert_eq!(record.outcome, AuditOutcome::Rejected);
                assert_eq!(record.mode, "analysis");
                assert_eq!(record.duration_seconds, None);
                assert!(record.verify_integrity());
            }
            other => panic!("expected rejection, got {:?}", other),
        }
        assert_eq!(outcome.http_status(), 400);
        let body = outcome.error_body().unwrap();
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["trace_id"], outcome.trace_id());
        assert_eq!(event_types(&events), vec!["validation_failed", "audit_recorded"]);
        assert_eq!(gov.audit_sink().records().len(), 1);
    }

    #[test]
    fn records_store_the_mode_as_sent() {
        let (mut gov, _) = governor(GovernanceConfig::default());

        let admitted = GovernanceRequest::new("deploy-to-staging", declaration(), "grunt");
        let outcome = gov.govern(admitted, |_| Ok(ActionOutput::default())).unwrap();
        assert_eq!(outcome.record().mode, "grunt");

        let shouted = GovernanceRequest::new("deploy-to-staging", declaration(), "GRUNT");
        let outcome = gov.govern(shouted, |_| panic!("must not run")).unwrap();
        assert!(outcome.is_rejected());
        assert_eq!(outcome.record().mode, "GRUNT");
    }

    #[test]
    fn generated_trace_id_is_a_uuid() {
        let (mut gov, _) = governor(GovernanceConfig::default());
        let request = GovernanceRequest::new("deploy-to-staging", declaration(), "grunt");
        let outcome = gov.govern(request, |_| Ok(ActionOutput::default())).unwrap();
        assert!(Uuid::parse_str(outcome.trace_id()).is_ok());
    }

    #[test]
    fn prescriptive_draft_output_is_recorded_as_failure() {
        let (mut gov, events) = governor(GovernanceConfig::default());
        let request = GovernanceRequest::new("draft-release-notes", declaration(), "draft");

        let outcome = gov
            .govern(request, |_| {
                Ok(ActionOutput::new(json!(null)).with_text("You must ship this on Friday."))
            })
            .unwrap();

        let record = outcome.record();
        assert_eq!(record.outcome, AuditOutcome::Failure);
        assert!(record.error.as_deref().unwrap().contains("'you must'"));
        assert_eq!(outcome.http_status(), 500);
        assert_eq!(
            event_types(&events),
            vec![
                "request_validated",
                "prescriptive_language_detected",
                "action_completed",
                "audit_recorded",
            ]
        );
        // The action still happened; its output is returned to the caller.
        match outcome {
            GovernanceOutcome::Completed { output, .. } => assert!(output.is_some()),
            other => panic!("expected completion, got {:?}", other),
        }
    }

    #[test]
    fn phrase_policy_can_be_disabled() {
        let config = GovernanceConfig {
            enforce_phrase_policy: false,
            ..GovernanceConfig::default()
        };
        let (mut gov, _) = governor(config);
        let request = GovernanceRequest::new("draft-release-notes", declaration(), "draft");
        let outcome = gov
            .govern(request, |_| Ok(ActionOutput::default().with_text("You must ship.")))
            .unwrap();
        assert_eq!(outcome.record().outcome, AuditOutcome::Success);
    }

    #[test]
    fn directive_output_is_fine_in_execute_mode() {
        let (mut gov, _) = governor(GovernanceConfig::default());
        let request = GovernanceRequest::new("deploy-to-staging", declaration(), "execute");
        let outcome = gov
            .govern(request, |_| Ok(ActionOutput::default().with_text("You must restart.")))
            .unwrap();
        assert_eq!(outcome.record().outcome, AuditOutcome::Success);
    }

    #[test]
    fn action_error_is_recorded_as_failure() {
        let (mut gov, _) = governor(GovernanceConfig::default());
        let request = GovernanceRequest::new("deploy-to-staging", declaration(), "execute");
        let outcome = gov
            .govern(request, |_| Err("orchestrator unreachable".to_string()))
            .unwrap();
        let record = outcome.record();
        assert_eq!(record.outcome, AuditOutcome::Failure);
        assert_eq!(record.error.as_deref(), Some("orchestrator unreachable"));
        assert_eq!(outcome.error_body().unwrap()["code"], "EXECUTION_FAILED");
    }

    #[test]
    fn traversal_workflow_name_is_screened_out() {
        let (mut gov, events) = governor(GovernanceConfig::default());
        let request = GovernanceRequest::new("../../etc/passwd", declaration(), "execute");
        let outcome = gov.govern(request, |_| panic!("must not run")).unwrap();
        match outcome {
            GovernanceOutcome::Rejected { failure_reason, .. } => {
                assert_eq!(failure_reason, "invalid_workflow_name");
            }
            other => panic!("expected rejection, got {:?}", other),
        }
        assert_eq!(event_types(&events)[0], "validation_failed");
    }

    #[test]
    fn workflow_outside_allow_list_is_screened_out() {
        let config = GovernanceConfig {
            allowed_workflows: vec!["rotate-logs".to_string()],
            ..GovernanceConfig::default()
        };
        let (mut gov, _) = governor(config);
        let request = GovernanceRequest::new("deploy-to-staging", declaration(), "execute");
        let outcome = gov.govern(request, |_| panic!("must not run")).unwrap();
        assert!(outcome.is_rejected());
    }

    #[test]
    fn oversized_parameters_are_screened_out() {
        let config = GovernanceConfig {
            max_parameters_bytes: 16,
            ..GovernanceConfig::default()
        };
        let (mut gov, _) = governor(config);
        let request = GovernanceRequest::new("deploy-to-staging", declaration(), "execute")
            .with_parameter("payload", json!("x".repeat(64)));
        let outcome = gov.govern(request, |_| panic!("must not run")).unwrap();
        match outcome {
            GovernanceOutcome::Rejected {
                failure_reason,
                reason,
                ..
            } => {
                assert_eq!(failure_reason, "parameters_too_large");
                assert!(reason.contains("max 16"));
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }
}
