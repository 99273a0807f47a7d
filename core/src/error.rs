//! Error types for the MessFinder API client.
//!
//! # Design
//! Every failure the client can observe collapses into one of the variants of
//! [`ApiError`], and every variant renders to the uniform
//! `{success: false, message, statusCode}` shape through [`ErrorEnvelope`].
//! Slices store only the rendered message; hosts that need to branch (for
//! example on 401) match the variant.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validation::ValidationErrors;

pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection.";
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please log in again.";

/// Errors produced while building requests or interpreting responses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// No response reached the client (connection refused, timeout).
    #[error("{message}")]
    Network { message: String },

    /// The server answered 401; persisted credentials have been purged.
    #[error("{message}")]
    Unauthorized { message: String },

    /// Any other non-2xx answer, or a 2xx envelope with `success: false`.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// Client-side form checks failed; no request was sent.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// The request payload could not be serialized to JSON.
    #[error("failed to encode request: {0}")]
    Serialization(String),

    /// The response body could not be decoded into the expected type.
    #[error("unexpected response from server: {0}")]
    Deserialization(String),
}

impl ApiError {
    pub fn network() -> Self {
        ApiError::Network {
            message: NETWORK_ERROR_MESSAGE.to_string(),
        }
    }

    /// The message shown to the user and stored on slices.
    pub fn message(&self) -> String {
        self.to_string()
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    pub fn to_envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            success: false,
            message: self.message(),
            status_code: self.status_code(),
        }
    }
}

/// The normalized error shape handed to hosts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl From<ApiError> for ErrorEnvelope {
    fn from(err: ApiError) -> Self {
        err.to_envelope()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_error_has_no_status() {
        let envelope = ApiError::network().to_envelope();
        assert!(!envelope.success);
        assert_eq!(envelope.message, NETWORK_ERROR_MESSAGE);
        assert_eq!(envelope.status_code, None);
    }

    #[test]
    fn http_error_keeps_server_message_and_status() {
        let err = ApiError::Http {
            status: 409,
            message: "Mess already booked".to_string(),
        };
        let json = serde_json::to_value(err.to_envelope()).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Mess already booked");
        assert_eq!(json["statusCode"], 409);
    }

    #[test]
    fn unauthorized_reports_401() {
        let err = ApiError::Unauthorized {
            message: SESSION_EXPIRED_MESSAGE.to_string(),
        };
        assert!(err.is_unauthorized());
        assert_eq!(err.status_code(), Some(401));
    }
}
