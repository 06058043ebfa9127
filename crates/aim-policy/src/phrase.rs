// phrase.rs — Prescriptive-language filter.
//
// In Draft and Research modes the AI presents options; the decision stays
// with the accountable human. Output that tells the reader what to do
// ("you should", "I recommend") is rejected in those modes. Grunt and
// Execute modes act on an already-made decision, so anything goes.
//
// Matching is a case-insensitive substring search, scanned in
// FORBIDDEN_PHRASES order; the first hit decides the reason.

use serde::{Deserialize, Serialize};

use crate::mode::DragMode;

/// Directive phrases disallowed in Draft and Research modes, in scan order.
pub const FORBIDDEN_PHRASES: &[&str] = &[
    "you should",
    "you must",
    "the best option is",
    "this is the right choice",
    "definitely do",
    "always use",
    "never use",
    "i recommend",
    "my recommendation is",
];

/// Neutral phrasings offered as corrective guidance.
pub const ALLOWED_PHRASES: &[&str] = &[
    "options include",
    "trade-offs are",
    "considerations include",
    "alternatives are",
    "one approach is",
    "another option is",
    "unknowns are",
    "risks include",
];

/// How many allowed phrases a rejection suggests.
const SUGGESTION_COUNT: usize = 3;

/// The result of checking AI output against the phrase policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum PhraseVerdict {
    /// The output is acceptable for the mode.
    Accepted,
    /// The output contains a directive phrase.
    Rejected {
        /// The deny-listed phrase that matched (lowercase).
        phrase: String,
        /// Human-readable reason, including neutral alternatives.
        reason: String,
    },
}

impl PhraseVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, PhraseVerdict::Accepted)
    }

    /// The rejection reason, if any.
    pub fn reason(&self) -> Option<&str> {
        match self {
            PhraseVerdict::Accepted => None,
            PhraseVerdict::Rejected { reason, .. } => Some(reason),
        }
    }
}

/// Check AI-generated text for prescriptive language under `mode`.
///
/// Pure function: the caller decides what to do with a rejection
/// (mark the audit record, emit an observation event).
pub fn check_output(output: &str, mode: DragMode) -> PhraseVerdict {
    if mode.allows_directives() {
        return PhraseVerdict::Accepted;
    }

    let lowered = output.to_lowercase();
    match FORBIDDEN_PHRASES
        .iter()
        .find(|phrase| lowered.contains(*phrase))
    {
        Some(phrase) => PhraseVerdict::Rejected {
            phrase: phrase.to_string(),
            reason: format!(
                "Prescriptive language detected in {} mode: '{}'. Use neutral phrasing like: {}",
                mode,
                phrase,
                ALLOWED_PHRASES[..SUGGESTION_COUNT].join(", ")
            ),
        },
        None => PhraseVerdict::Accepted,
    }
}
