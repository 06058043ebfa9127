//! # aim-gateway
//!
//! Sequences one governed action end to end:
//!
//! 1. assign a trace id and screen the workflow name and parameter size,
//! 2. run the admissibility gate from `aim-policy`,
//! 3. run the caller's action (this crate never executes workflows itself),
//! 4. filter prescriptive language in the action's output,
//! 5. seal an [`aim_audit::AuditRecord`] and hand it to the caller's sink,
//! 6. publish [`GovernanceEvent`]s for metrics and notifications.
//!
//! Every sink is supplied by the caller when the [`Governor`] is built.

pub mod config;
pub mod error;
pub mod events;
pub mod governor;

pub use config::GovernanceConfig;
pub use error::GatewayError;
pub use events::{EventDispatcher, GovernanceEvent, LogSink, MemorySink, NotificationSink};
pub use governor::{ActionOutput, AdmittedRequest, GovernanceOutcome, Governor};
