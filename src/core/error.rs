//! Typed error handling for the toy catalog
//!
//! Every fallible catalog operation returns [`CatalogError`], so callers can
//! match on the failure kind instead of inspecting strings.
//!
//! # Error Categories
//!
//! - Storage failures (network, non-success status) are propagated unchanged
//!   from the storage collaborator. They are the only retryable kind.
//! - Authorization failures ([`CatalogError::Unauthorized`],
//!   [`CatalogError::Forbidden`]) come from the single capability check in
//!   [`crate::core::auth`].
//! - Validation failures come from toy drafts and filter forms; they never
//!   reach the query pipeline.
//!
//! An empty query result is not an error.
//!
//! # Example
//!
//! ```rust,ignore
//! match catalog.remove(&toy_id).await {
//!     Ok(id) => println!("Toy {} removed", id),
//!     Err(CatalogError::Forbidden { .. }) => println!("Admins only"),
//!     Err(e) if e.is_retryable() => println!("Try again later: {}", e),
//!     Err(e) => eprintln!("Cannot remove toy: {}", e),
//! }
//! ```

use thiserror::Error;

/// The error type shared by the pipeline boundary, the stores and the facade
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The storage collaborator could not be reached or answered with a failure status
    #[error("storage request failed: {message}")]
    Storage {
        /// HTTP status when the backend answered at all
        status: Option<u16>,
        message: String,
    },

    /// The requested record does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// No user is logged in
    #[error("login required to {action}")]
    Unauthorized { action: &'static str },

    /// A user is logged in but lacks the required rights
    #[error("insufficient rights to {action}")]
    Forbidden { action: &'static str },

    /// Login with an unknown username or a wrong password
    #[error("invalid username or password")]
    InvalidCredentials,

    /// A record with the same unique key already exists
    #[error("already exists: {0}")]
    Conflict(String),

    /// Field-level validation of a draft or form failed
    #[error("validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// A form field or message could not be accepted
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    /// A label outside the vocabulary was supplied
    #[error("unknown label: {0}")]
    UnknownLabel(String),

    /// The storage collaborator answered with a payload we cannot decode
    #[error("malformed storage payload: {0}")]
    Decode(String),
}

impl CatalogError {
    /// Shorthand for a storage failure without an HTTP status
    pub fn storage(message: impl Into<String>) -> Self {
        CatalogError::Storage {
            status: None,
            message: message.into(),
        }
    }

    /// Shorthand for a missing toy
    pub fn toy_not_found(id: impl Into<String>) -> Self {
        CatalogError::NotFound {
            entity: "toy",
            id: id.into(),
        }
    }

    /// Stable code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CatalogError::Storage { .. } => "STORAGE_ERROR",
            CatalogError::NotFound { .. } => "NOT_FOUND",
            CatalogError::Unauthorized { .. } => "UNAUTHORIZED",
            CatalogError::Forbidden { .. } => "FORBIDDEN",
            CatalogError::InvalidCredentials => "INVALID_CREDENTIALS",
            CatalogError::Conflict(_) => "CONFLICT",
            CatalogError::Validation(_) => "VALIDATION_ERROR",
            CatalogError::InvalidInput { .. } => "INVALID_INPUT",
            CatalogError::UnknownLabel(_) => "UNKNOWN_LABEL",
            CatalogError::Decode(_) => "DECODE_ERROR",
        }
    }

    /// Whether retrying the same call could succeed
    ///
    /// Only transport failures and 5xx answers qualify; a 4xx will fail again.
    pub fn is_retryable(&self) -> bool {
        match self {
            CatalogError::Storage { status: None, .. } => true,
            CatalogError::Storage {
                status: Some(code), ..
            } => *code >= 500,
            _ => false,
        }
    }
}

#[cfg(feature = "rest")]
impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return CatalogError::Decode(err.to_string());
        }
        CatalogError::Storage {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}
