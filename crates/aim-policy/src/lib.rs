//! # aim-policy
//!
//! Intent-lock validation for governed AI actions.
//!
//! Before an automated action runs, a named human declares an AIM
//! ([`Declaration`]): the accountable **A**ctor, the permitted **I**nputs and
//! the **M**ission it serves. The [`validate`] gate decides whether that
//! declaration, together with the requested DRAG [`DragMode`], may proceed.
//! Once the action has produced text, [`check_output`] filters prescriptive
//! language in modes where the AI must present options rather than decide.
//!
//! ## Key invariants
//!
//! - **Accountability first**: the actor check runs before any content-shape
//!   check, and the first failing rule is the only reason reported.
//! - **Analysis is human-only**: `"analysis"` is never a constructible mode.
//!   It is rejected with its own error, distinct from an unknown mode string.
//! - **Pure**: every operation here is value-in/value-out with no I/O.

pub mod declaration;
pub mod error;
pub mod mode;
pub mod phrase;
pub mod summary;
pub mod validator;
pub mod workflow;

pub use declaration::{Actor, Declaration, FieldError, Input, InputSource, Mission};
pub use error::PolicyError;
pub use mode::DragMode;
pub use phrase::{check_output, PhraseVerdict, ALLOWED_PHRASES, FORBIDDEN_PHRASES};
pub use summary::governance_summary;
pub use validator::{
    validate, validate_with_trace, AdmissibilityDecision, GovernanceRequest, RejectionRule,
    ValidationStep, ValidationTrace,
};
pub use workflow::validate_workflow_name;
