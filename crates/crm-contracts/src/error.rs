//! Error types for the CRM authorization core.
//!
//! Authorization denials are never errors: `can()` answers `false`. The
//! variants here cover storage, configuration, and wiring faults only.

use thiserror::Error;

/// The unified error type for the CRM crates.
#[derive(Debug, Error)]
pub enum CrmError {
    /// The storage adapter could not read or write a key.
    #[error("storage error: {reason}")]
    Storage { reason: String },

    /// A value could not be encoded to or decoded from JSON.
    #[error("serialization error: {reason}")]
    Serialization { reason: String },

    /// A configuration or preset file is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// A caller supplied a value that cannot be used (blank subject, bad grant syntax).
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// A role or subject referenced by id or key does not exist.
    #[error("not found: {what}")]
    NotFound { what: String },

    /// The acting user may not perform a management operation.
    #[error("forbidden: {reason}")]
    Forbidden { reason: String },

    /// The ability was looked up with no provider in scope.
    ///
    /// This is a wiring defect, never a user-facing condition.
    #[error("ability lookup outside of an ability provider scope")]
    OutsideProviderScope,
}

impl From<std::io::Error> for CrmError {
    fn from(e: std::io::Error) -> Self {
        CrmError::Storage { reason: e.to_string() }
    }
}

impl From<serde_json::Error> for CrmError {
    fn from(e: serde_json::Error) -> Self {
        CrmError::Serialization { reason: e.to_string() }
    }
}

/// Convenience alias used throughout the CRM crates.
pub type CrmResult<T> = Result<T, CrmError>;
