// events.rs — Observation events and notification dispatch.
//
// The gateway does not publish metrics or chat messages itself. It emits
// GovernanceEvents carrying plain values (mode, actor role, workflow,
// outcome, duration, failure reason) and hands them to whatever sinks the
// caller registered: a JSONL log, a metrics exporter, a webhook notifier.
//
// Dispatch is synchronous and best-effort: a failing sink is logged and
// skipped, it never fails the governed action.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// Events emitted at each governance decision point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum GovernanceEvent {
    /// A request passed the admissibility gate.
    RequestValidated {
        trace_id: String,
        drag_mode: String,
        actor_role: String,
        workflow_name: String,
        timestamp: DateTime<Utc>,
    },

    /// A request was refused before its action started.
    ValidationFailed {
        trace_id: String,
        drag_mode: String,
        workflow_name: String,
        /// Stable label of the failing rule (e.g., "actor_name").
        failure_reason: String,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// Draft/research output contained directive language.
    PrescriptiveLanguageDetected {
        trace_id: String,
        drag_mode: String,
        phrase: String,
        timestamp: DateTime<Utc>,
    },

    /// An admitted action finished (successfully or not).
    ActionCompleted {
        trace_id: String,
        workflow_name: String,
        drag_mode: String,
        outcome: String,
        duration_seconds: f64,
        timestamp: DateTime<Utc>,
    },

    /// A sealed audit record was handed to the audit sink.
    AuditRecorded {
        trace_id: String,
        drag_mode: String,
        outcome: String,
        integrity_hash: String,
        timestamp: DateTime<Utc>,
    },
}

impl GovernanceEvent {
    /// Get the event type name as a string.
    pub fn event_type(&self) -> &str {
        match self {
            GovernanceEvent::RequestValidated { .. } => "request_validated",
            GovernanceEvent::ValidationFailed { .. } => "validation_failed",
            GovernanceEvent::PrescriptiveLanguageDetected { .. } => {
                "prescriptive_language_detected"
            }
            GovernanceEvent::ActionCompleted { .. } => "action_completed",
            GovernanceEvent::AuditRecorded { .. } => "audit_recorded",
        }
    }

    /// The trace id every event carries.
    pub fn trace_id(&self) -> &str {
        match self {
            GovernanceEvent::RequestValidated { trace_id, .. }
            | GovernanceEvent::ValidationFailed { trace_id, .. }
            | GovernanceEvent::PrescriptiveLanguageDetected { trace_id, .. }
            | GovernanceEvent::ActionCompleted { trace_id, .. }
            | GovernanceEvent::AuditRecorded { trace_id, .. } => trace_id,
        }
    }
}

/// Trait for receiving governance events.
///
/// Implementations decide what to do with each event: append to a file,
/// bump a counter, post to a chat webhook.
pub trait NotificationSink: Send {
    /// Handle an event. Errors are logged but don't stop the system.
    fn send(&self, event: &GovernanceEvent) -> Result<(), GatewayError>;
}

/// Logs events as JSONL to a file.
pub struct LogSink {
    path: PathBuf,
}

impl LogSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl NotificationSink for LogSink {
    fn send(&self, event: &GovernanceEvent) -> Result<(), GatewayError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| GatewayError::IoError {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| GatewayError::IoError {
                path: self.path.clone(),
                source,
            })?;

        let json = serde_json::to_string(event)?;
        writeln!(file, "{}", json).map_err(|source| GatewayError::IoError {
            path: self.path.clone(),
            source,
        })?;

        Ok(())
    }
}

/// Collects events in memory. Clones share the same buffer, so one clone
/// can be registered with a dispatcher while another is inspected.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<GovernanceEvent>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events received so far.
    pub fn events(&self) -> Vec<GovernanceEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl NotificationSink for MemorySink {
    fn send(&self, event: &GovernanceEvent) -> Result<(), GatewayError> {
        match self.events.lock() {
            Ok(mut events) => events.push(event.clone()),
            Err(poisoned) => poisoned.into_inner().push(event.clone()),
        }
        Ok(())
    }
}

/// Dispatches events to multiple sinks.
///
/// Errors from individual sinks are logged (via tracing) but don't
/// prevent other sinks from receiving the event.
pub struct EventDispatcher {
    sinks: Vec<Box<dyn NotificationSink>>,
}

impl EventDispatcher {
    /// Create a new dispatcher with no sinks.
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    /// Add a notification sink.
    pub fn add_sink(&mut self, sink: Box<dyn NotificationSink>) {
        self.sinks.push(sink);
    }

    /// Dispatch an event to all sinks.
    pub fn dispatch(&self, event: &GovernanceEvent) {
        for sink in &self.sinks {
            if let Err(e) = sink.send(event) {
                tracing::warn!(
                    event_type = event.event_type(),
                    trace_id = event.trace_id(),
                    "notification sink error: {}",
                    e
                );
            }
        }
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
