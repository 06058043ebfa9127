//! # aim-audit
//!
//! Tamper-evident audit records for governed AI actions.
//!
//! Every governed action, whether it succeeded, failed, or was rejected
//! before starting, produces one [`AuditRecord`]. Calling
//! [`AuditRecord::finalize`] seals it with a SHA-256 digest over a canonical
//! serialization of every other field; [`AuditRecord::verify_integrity`]
//! recomputes that digest later and detects any modification.
//!
//! This is tamper *evidence*, not prevention: there is no signing key at this
//! layer. Sealed records are handed to an [`AuditSink`], such as the
//! append-only JSONL [`AuditLog`].
//!
//! ## Quick Example
//!
//! ```rust,no_run
//! use aim_audit::{AuditLog, AuditOutcome, AuditRecord, AuditSink};
//!
//! let mut log = AuditLog::open("/tmp/audit.jsonl").unwrap();
//! let mut record = AuditRecord::new(
//!     "trace-1",
//!     serde_json::json!({"actor": {"name": "Jake Smith"}}),
//!     "execute",
//!     "deploy-to-staging",
//!     AuditOutcome::Success,
//! );
//! record.finalize().unwrap();
//! log.record(record).unwrap();
//! ```

pub mod error;
pub mod hasher;
pub mod log;
pub mod record;
pub mod sink;

pub use error::AuditError;
pub use log::{AuditLog, IntegrityReport, TamperedRecord};
pub use record::{AuditOutcome, AuditRecord};
pub use sink::{AuditSink, MemoryAuditSink};
