// declaration.rs — AIM (intent lock) declaration model.
//
// An AIM declaration must exist before any governed action runs:
//   Actor   — the named human accountable for the outcome
//   Input   — the real-world data sources the action may read, plus rules
//   Mission — what must improve, and how success is measured
//
// Each part exposes `validate()` returning field-level errors. Construction
// never coerces: an invalid value is kept as-is and reported, so the caller
// sees exactly what was declared.

use serde::{Deserialize, Serialize};
use serde_json::json;

/// Minimum length of a mission objective, in characters.
pub const MIN_OBJECTIVE_CHARS: usize = 10;

/// One field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Dotted path of the offending field (e.g., "actor.email").
    pub field: String,
    /// What is wrong with it.
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Prefix the field path with a parent component.
    fn nested(mut self, parent: &str) -> Self {
        self.field = format!("{}.{}", parent, self.field);
        self
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// The named human accountable for an AI-assisted action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Full name of the accountable person.
    pub name: String,
    /// Contact email for accountability.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Role or title (e.g., "DevOps Engineer", "Product Lead").
    pub role: String,
}

impl Actor {
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
            role: role.into(),
        }
    }

    /// Set the contact email and return self (builder pattern).
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Field-level checks. An empty list means the actor is well-formed.
    ///
    /// The email check only looks for an "@"; it is not an address grammar.
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", "must not be empty"));
        }
        if self.role.is_empty() {
            errors.push(FieldError::new("role", "must not be empty"));
        }
        if let Some(email) = &self.email {
            if !email.contains('@') {
                errors.push(FieldError::new("email", "invalid email format (missing '@')"));
            }
        }
        errors
    }
}

/// A real-world data source the action is allowed to read.
///
/// Examples: `{"type": "api_endpoint", "description": "Slack webhook payload"}`,
/// `{"type": "configuration", "description": "terraform.tfvars"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSource {
    /// Kind of input (e.g., "file", "api", "database", "configuration").
    #[serde(rename = "type")]
    pub source_type: String,
    /// Human-readable description of the input.
    pub description: String,
    /// Path, URL, or identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl InputSource {
    pub fn new(source_type: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            source_type: source_type.into(),
            description: description.into(),
            location: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// The data an action may use and the rules it must follow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Input {
    /// Permitted data sources, in declaration order. Must not be empty.
    pub sources: Vec<InputSource>,
    /// Free-text rules (e.g., "Read-only access", "No destructive ops").
    #[serde(default)]
    pub constraints: Vec<String>,
}

impl Input {
    pub fn new(sources: Vec<InputSource>) -> Self {
        Self {
            sources,
            constraints: Vec::new(),
        }
    }

    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraints.push(constraint.into());
        self
    }

    pub fn validate(&self) -> Vec<FieldError> {
        if self.sources.is_empty() {
            vec![FieldError::new(
                "sources",
                "at least one input source is required",
            )]
        } else {
            Vec::new()
        }
    }
}

/// What decision or outcome must improve, and how success is measured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mission {
    /// Clear statement of what must improve (at least 10 characters).
    pub objective: String,
    /// Measurable success indicators. Must not be empty.
    pub success_criteria: Vec<String>,
}

impl Mission {
    pub fn new(objective: impl Into<String>, success_criteria: Vec<String>) -> Self {
        Self {
            objective: objective.into(),
            success_criteria,
        }
    }

    /// Length of the objective in characters (not bytes).
    pub fn objective_len(&self) -> usize {
        self.objective.chars().count()
    }

    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.objective_len() < MIN_OBJECTIVE_CHARS {
            errors.push(FieldError::new(
                "objective",
                format!("must be at least {} characters", MIN_OBJECTIVE_CHARS),
            ));
        }
        if self.success_criteria.is_empty() {
            errors.push(FieldError::new(
                "success_criteria",
                "at least one success criterion is required",
            ));
        }
        errors
    }
}

/// A complete AIM declaration — the aggregate root of the intent lock.
///
/// ```rust
/// use aim_policy::{Actor, Declaration, Input, InputSource, Mission};
///
/// let aim = Declaration::new(
///     Actor::new("Jake Smith", "Product Lead").with_email("jake@example.org"),
///     Input::new(vec![InputSource::new("slack_webhook", "Slash command payload")])
///         .with_constraint("Read-only access"),
///     Mission::new(
///         "Deploy updated application to staging environment",
///         vec!["Zero downtime".to_string()],
///     ),
/// );
/// assert!(aim.validate().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub actor: Actor,
    pub input: Input,
    pub mission: Mission,
}

impl Declaration {
    pub fn new(actor: Actor, input: Input, mission: Mission) -> Self {
        Self {
            actor,
            input,
            mission,
        }
    }

    /// Field-level errors of all three parts, with dotted paths
    /// (`actor.name`, `input.sources`, `mission.objective`, ...).
    pub fn validate(&self) -> Vec<FieldError> {
        let actor = self.actor.validate().into_iter().map(|e| e.nested("actor"));
        let input = self.input.validate().into_iter().map(|e| e.nested("input"));
        let mission = self
            .mission
            .validate()
            .into_iter()
            .map(|e| e.nested("mission"));
        actor.chain(input).chain(mission).collect()
    }

    /// Structured copy of the declaration for audit records.
    pub fn to_snapshot(&self) -> serde_json::Value {
        let sources: Vec<serde_json::Value> = self
            .input
            .sources
            .iter()
            .map(|s| {
                json!({
                    "type": s.source_type,
                    "description": s.description,
                    "location": s.location,
                })
            })
            .collect();

        json!({
            "actor": {
                "name": self.actor.name,
                "email": self.actor.email,
                "role": self.actor.role,
            },
            "input": {
                "sources": sources,
                "constraints": self.input.constraints,
            },
            "mission": {
                "objective": self.mission.objective,
                "success_criteria": self.mission.success_criteria,
            },
        })
    }
}
