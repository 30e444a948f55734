//! Error taxonomy for the issuance pipeline.
//!
//! One discriminated enum per failure class so callers pattern-match instead
//! of string-matching messages. Validation and conflict failures are
//! client-caused and never retried; transport failures are potentially
//! transient; a provider rejection is a business outcome, not a client bug.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across the pipeline.
pub type IssuanceResult<T> = Result<T, IssuanceError>;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl core::fmt::Display for FieldError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Rejection reported by the fiscal authority through the provider.
///
/// Carries the authority's original status so operators can diagnose the
/// document instead of a flattened error string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderRejection {
    pub status_code: Option<String>,
    pub status_message: String,
    /// Raw `ErrorMessage` block from the provider, when present.
    pub detail: Option<serde_json::Value>,
}

/// Provider login failure.
///
/// An HTML answer is a misconfigured-endpoint signal, not a credentials
/// problem; it gets its own variant so operators fix the URL, not the login.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    #[error("login response did not contain an access token")]
    MissingToken,

    #[error("login rejected: {0}")]
    Rejected(String),

    #[error("received HTML instead of JSON from {url}; check the configured provider base URL")]
    HtmlResponse { url: String },

    #[error("login transport failure: {0}")]
    Transport(String),
}

/// Pipeline-level error.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum IssuanceError {
    /// The request failed field-level validation; all violations are listed.
    #[error("validation failed ({} field error(s))", .0.len())]
    Validation(Vec<FieldError>),

    /// An issued invoice already exists for the order code.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Unknown invoice or order.
    #[error("not found: {0}")]
    NotFound(String),

    /// Provider login failed.
    #[error("provider authentication failed: {0}")]
    Authentication(#[from] AuthFailure),

    /// Network error, timeout, or a non-2xx provider answer.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The provider accepted the call but the fiscal authority rejected the
    /// document. Must never be conflated with successful issuance.
    #[error("document rejected by fiscal authority: {}", .0.status_message)]
    Rejected(ProviderRejection),
}

impl IssuanceError {
    pub fn validation(errors: Vec<FieldError>) -> Self {
        Self::Validation(errors)
    }

    /// Single-field validation failure.
    pub fn validation_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }
}
