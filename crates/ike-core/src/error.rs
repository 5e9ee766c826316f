//! The error schema shared by every route.
//!
//! Each failure is reported as `{"message", "error", "kind"}`: a short
//! summary fixed per kind, the underlying detail, and a machine-readable kind.

use serde::{Deserialize, Serialize};

/// Classification of a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The request body could not be decoded.
    MalformedRequest,
    /// The body decoded but carries a value that cannot be used.
    InvalidInput,
    /// The database rejected the supplied credentials.
    Authentication,
    /// The database could not be reached.
    Unavailable,
    NotFound,
    /// Any other failure while running a statement.
    QueryFailed,
}

impl ErrorKind {
    pub fn summary(&self) -> &'static str {
        match self {
            Self::MalformedRequest => "Malformed request body",
            Self::InvalidInput => "Invalid request",
            Self::Authentication => "Database authentication failed",
            Self::Unavailable => "Database unavailable",
            Self::NotFound => "Not found",
            Self::QueryFailed => "Query failed",
        }
    }
}

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    pub error: String,
    pub kind: ErrorKind,
    /// Set only by routes whose success payload carries a `success` flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
}

impl ErrorBody {
    pub fn new(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            message: kind.summary().to_string(),
            error: detail.into(),
            kind,
            success: None,
        }
    }

    pub fn with_success(mut self, success: bool) -> Self {
        self.success = Some(success);
        self
    }
}
