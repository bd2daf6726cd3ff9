//! Error types for vTM REST operations.
//!
//! Every failure coming back from the traffic manager keeps its HTTP status
//! when one exists, so callers can tell a missing object (404) apart from a
//! rejected document or an unreachable server. Errors are also grouped into
//! categories for user feedback.

use std::fmt;

/// Result type alias for vTM client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of client errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Connection, DNS or TLS failures (transient, retryable).
    Network,
    /// The object does not exist on the traffic manager.
    NotFound,
    /// Credentials were rejected.
    Auth,
    /// The traffic manager refused the document.
    Validation,
    /// The traffic manager failed internally.
    Server,
    /// A response body could not be decoded.
    Format,
    /// Other/unknown errors.
    Other,
}

impl ErrorCategory {
    /// Whether this error category is typically transient and worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network | Self::Server)
    }

    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "Network connectivity issue",
            Self::NotFound => "Object not found",
            Self::Auth => "Authentication failed",
            Self::Validation => "Configuration rejected",
            Self::Server => "Traffic manager error",
            Self::Format => "Unexpected response format",
            Self::Other => "Unexpected error",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Network => "Check the server URL and that the REST API is enabled",
            Self::NotFound => "Run `brocade refresh` to forget objects deleted elsewhere",
            Self::Auth => "Check BROCADE_USERNAME and BROCADE_PASSWORD",
            Self::Validation => "Check the field values in the manifest",
            Self::Server => "Check the traffic manager event log and try again",
            Self::Format => "Check that api_version matches the traffic manager",
            Self::Other => "Check the error details for more information",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur while talking to the traffic manager.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed, with the response status when one was received.
    #[error("HTTP request failed: {message}")]
    Http {
        /// Error message.
        message: String,
        /// HTTP status code if available.
        status: Option<u16>,
    },

    /// Response body did not match the expected document.
    #[error("invalid API response: {0}")]
    InvalidResponse(String),

    /// Client could not be built from the given settings.
    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl Error {
    /// Create an HTTP error.
    pub fn http(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::Http {
            message: message.into(),
            status,
        }
    }

    /// Create an HTTP error from a bare status code.
    pub fn status(code: u16) -> Self {
        Self::http(format!("HTTP {code}"), Some(code))
    }

    /// HTTP status of the failed request, if the server answered.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => *status,
            _ => None,
        }
    }

    /// Whether the server reported that the object does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }

    /// Get the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Http { status: None, .. } => ErrorCategory::Network,
            Error::Http {
                status: Some(code), ..
            } => match code {
                404 => ErrorCategory::NotFound,
                401 | 403 => ErrorCategory::Auth,
                400 | 409 | 422 => ErrorCategory::Validation,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Other,
            },
            Error::InvalidResponse(_) => ErrorCategory::Format,
            Error::Config(_) => ErrorCategory::Other,
        }
    }

    /// Whether this error is typically transient and worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::status(code),
            other => Self::Http {
                message: other.to_string(),
                status: None,
            },
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}
