// record.rs — Audit record data model and integrity sealing.
//
// One AuditRecord per governed action. Lifecycle:
//
//   new() → builder setters → finalize() → handed to a sink
//
// `finalize()` hashes every field except `integrity_hash` itself and stores
// the digest. After that the record is append-only: changing any field makes
// `verify_integrity()` return false.

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::AuditError;
use crate::hasher;

/// How a governed action ended.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    /// The action ran and met policy.
    Success,
    /// The action ran but errored, or its output violated policy.
    Failure,
    /// The action was refused before it started.
    Rejected,
}

impl AuditOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditOutcome::Success => "success",
            AuditOutcome::Failure => "failure",
            AuditOutcome::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// A tamper-evident record of one governed action — one line in the audit log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditRecord {
    /// Correlation id shared with logs, events and the HTTP response.
    pub trace_id: String,

    /// When the record was created (UTC).
    pub timestamp: DateTime<Utc>,

    /// Structured copy of the AIM declaration the action ran under.
    pub declaration_snapshot: serde_json::Value,

    /// DRAG mode as requested (may be an inadmissible value on rejections).
    pub mode: String,

    pub workflow_name: String,

    #[serde(default)]
    pub parameters: serde_json::Map<String, serde_json::Value>,

    pub outcome: AuditOutcome,

    /// Error or rejection reason, when the outcome is not a success.
    pub error: Option<String>,

    /// Wall-clock duration of the action; absent for rejections.
    pub duration_seconds: Option<f64>,

    /// SHA-256 over every other field, set by `finalize()`.
    pub integrity_hash: Option<String>,
}

impl AuditRecord {
    /// Create an unsealed record timestamped now.
    pub fn new(
        trace_id: impl Into<String>,
        declaration_snapshot: serde_json::Value,
        mode: impl Into<String>,
        workflow_name: impl Into<String>,
        outcome: AuditOutcome,
    ) -> Self {
        Self {
            trace_id: trace_id.into(),
            timestamp: Utc::now(),
            declaration_snapshot,
            mode: mode.into(),
            workflow_name: workflow_name.into(),
            parameters: serde_json::Map::new(),
            outcome,
            error: None,
            duration_seconds: None,
            integrity_hash: None,
        }
    }

    pub fn with_parameters(mut self, parameters: serde_json::Map<String, serde_json::Value>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Record how long the action took. A `Duration` is never negative.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_seconds = Some(duration.as_secs_f64());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Whether `finalize()` has sealed this record.
    pub fn is_finalized(&self) -> bool {
        self.integrity_hash.is_some()
    }

    /// Canonical serialization of every field except `integrity_hash`.
    ///
    /// Keys are sorted at every depth and the timestamp is rendered as an
    /// ISO-8601 UTC string, so the bytes depend only on the field values.
    pub fn canonical_form(&self) -> String {
        let body = json!({
            "trace_id": self.trace_id,
            "timestamp": self.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            "declaration_snapshot": self.declaration_snapshot,
            "mode": self.mode,
            "workflow_name": self.workflow_name,
            "parameters": self.parameters,
            "outcome": self.outcome.as_str(),
            "error": self.error,
            "duration_seconds": self.duration_seconds,
        });
        hasher::canonical_json(&body)
    }

    /// SHA-256 of the canonical form, as 64 lowercase hex characters.
    pub fn compute_integrity_hash(&self) -> String {
        hasher::hash_str(&self.canonical_form())
    }

    /// Seal the record. Call exactly once, after every other field is final.
    ///
    /// Sealing twice is a caller defect and returns `AlreadyFinalized`
    /// without touching the existing hash.
    pub fn finalize(&mut self) -> Result<&str, AuditError> {
        if self.integrity_hash.is_some() {
            return Err(AuditError::AlreadyFinalized {
                trace_id: self.trace_id.clone(),
            });
        }
        let hash = self.compute_integrity_hash();
        Ok(self.integrity_hash.insert(hash).as_str())
    }

    /// Recompute the digest and compare it with the stored one.
    ///
    /// An unsealed record never verifies.
    pub fn verify_integrity(&self) -> bool {
        match &self.integrity_hash {
            Some(stored) => *stored == self.compute_integrity_hash(),
            None => false,
        }
    }
}
