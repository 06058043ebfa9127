// mode.rs — DRAG responsibility modes.
//
// DRAG splits one action's responsibility between automation and people:
//   Draft     — AI produces first versions
//   Research  — AI surfaces unknowns, risks and options
//   Analysis  — HUMAN-ONLY judgment over trade-offs
//   Grunt     — AI handles mechanical, repetitive work
// plus Execute, for running an approved workflow under human oversight.
//
// Analysis has no variant here. A value that cannot be constructed cannot
// be smuggled through the validator, and parsing "analysis" fails with its
// own error so callers can tell it apart from a typo.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PolicyError;

/// The name of the mode reserved for human judgment.
pub const RESERVED_MODE: &str = "analysis";

/// A DRAG mode an AI-assisted action may run under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum DragMode {
    /// Generate initial versions.
    Draft,
    /// Surface unknowns, risks and options.
    Research,
    /// Mechanical, repetitive tasks.
    Grunt,
    /// Execute an approved workflow with human oversight.
    Execute,
}

impl DragMode {
    /// Every constructible mode, in declaration order.
    pub const ALL: [DragMode; 4] = [
        DragMode::Draft,
        DragMode::Research,
        DragMode::Grunt,
        DragMode::Execute,
    ];

    /// The lowercase wire name of this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            DragMode::Draft => "draft",
            DragMode::Research => "research",
            DragMode::Grunt => "grunt",
            DragMode::Execute => "execute",
        }
    }

    /// Whether output in this mode may use directive language.
    ///
    /// Draft and Research must present options; Grunt and Execute act.
    pub fn allows_directives(&self) -> bool {
        matches!(self, DragMode::Grunt | DragMode::Execute)
    }
}

impl fmt::Display for DragMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for DragMode {
    type Err = PolicyError;

    /// Parse a mode name. Only the exact lowercase names are modes; the
    /// reserved name is recognized in any casing so it is never reported
    /// as a typo.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(DragMode::Draft),
            "research" => Ok(DragMode::Research),
            "grunt" => Ok(DragMode::Grunt),
            "execute" => Ok(DragMode::Execute),
            _ if s.trim().eq_ignore_ascii_case(RESERVED_MODE) => {
                Err(PolicyError::ReservedMode(s.to_string()))
            }
            _ => Err(PolicyError::UnknownMode(s.to_string())),
        }
    }
}

impl TryFrom<String> for DragMode {
    type Error = PolicyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_modes() {
        for mode in DragMode::ALL {
            assert_eq!(mode.as_str().parse::<DragMode>().unwrap(), mode);
        }
    }

    #[test]
    fn non_lowercase_mode_names_are_unknown() {
        for raw in ["EXECUTE", " Draft ", "Research", "grunt ", "Execute"] {
            match raw.parse::<DragMode>() {
                Err(PolicyError::UnknownMode(s)) => assert_eq!(s, raw),
                other => panic!("expected UnknownMode for {:?}, got {:?}", raw, other),
            }
        }
    }

    #[test]
    fn analysis_is_reserved_in_any_casing() {
        for raw in ["analysis", "ANALYSIS", "Analysis", " aNaLySiS"] {
            match raw.parse::<DragMode>() {
                Err(PolicyError::ReservedMode(s)) => assert_eq!(s, raw),
                other => panic!("expected ReservedMode for {:?}, got {:?}", raw, other),
            }
        }
    }

    #[test]
    fn unknown_mode_is_distinct_from_reserved() {
        match "decide".parse::<DragMode>() {
            Err(PolicyError::UnknownMode(s)) => assert_eq!(s, "decide"),
            other => panic!("expected UnknownMode, got {:?}", other),
        }
    }

    #[test]
    fn only_grunt_and_execute_allow_directives() {
        assert!(DragMode::Execute.allows_directives());
        assert!(DragMode::Grunt.allows_directives());
        assert!(!DragMode::Draft.allows_directives());
        assert!(!DragMode::Research.allows_directives());
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&DragMode::Research).unwrap();
        assert_eq!(json, "\"research\"");
    }

    #[test]
    fn deserialization_rejects_analysis() {
        let err = serde_json::from_str::<DragMode>("\"analysis\"").unwrap_err();
        assert!(err.to_string().contains("human-only"));
    }
}
