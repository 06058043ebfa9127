// error.rs — Error types for the governance gateway.
//
// Rejections and failed actions are outcomes, not errors. These variants
// cover the gateway's own plumbing: config files, sinks, serialization.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// A file I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The governance config file is not valid TOML for `GovernanceConfig`.
    #[error("invalid config at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// The audit sink refused or failed to store a record.
    #[error("audit error: {0}")]
    Audit(#[from] aim_audit::AuditError),

    /// Failed to serialize an event or request parameters.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
