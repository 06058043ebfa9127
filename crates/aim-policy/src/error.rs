// error.rs — Error types for the intent-lock subsystem.

use thiserror::Error;

/// Errors that can occur while interpreting governance input.
///
/// Admissibility rejections are *not* errors — they are returned as an
/// [`AdmissibilityDecision`](crate::AdmissibilityDecision). These variants
/// cover input that cannot even be interpreted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PolicyError {
    /// The requested mode is the reserved human-only analysis mode.
    #[error("DRAG mode '{0}' is reserved: analysis is human-only")]
    ReservedMode(String),

    /// The requested mode is not a DRAG mode at all.
    #[error("unknown DRAG mode '{0}' (expected one of: draft, research, grunt, execute)")]
    UnknownMode(String),

    /// The workflow name contains characters outside `[a-zA-Z0-9_-]`.
    #[error("invalid workflow name '{0}': must contain only alphanumerics, hyphens, and underscores")]
    InvalidWorkflowName(String),
}
