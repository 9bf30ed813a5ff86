//! Client error types

use http::StatusCode;
use shared::{AppError, ErrorCode};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Field name → user-facing message, produced by client-side validation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure (connection refused, timeout, decode)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response, with the raw payload
    #[error("HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// Authentication required (401), with the raw payload
    #[error("Authentication required")]
    Unauthorized { body: String },

    /// Rejected client-side before any request was sent
    #[error("Validation error: {0}")]
    Validation(FieldErrors),

    /// Structured application error
    ///
    /// Status failures that carry a domain meaning are turned into this
    /// variant by [`ClientError::for_status`]; the original status and
    /// payload are kept in the details.
    #[error(transparent)]
    App(#[from] AppError),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// HTTP status of the failed call, when the server answered
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            Self::Http(e) => e.status(),
            Self::App(e) => e
                .details
                .as_ref()
                .and_then(|d| d.get(STATUS_DETAIL))
                .and_then(|v| v.as_u64())
                .and_then(|v| StatusCode::from_u16(v as u16).ok())
                .or_else(|| Some(e.http_status())),
            _ => None,
        }
    }

    /// Raw response payload, when the server answered
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Status { body, .. } | Self::Unauthorized { body } => Some(body),
            Self::App(e) => e
                .details
                .as_ref()
                .and_then(|d| d.get(BODY_DETAIL))
                .and_then(|v| v.as_str()),
            _ => None,
        }
    }

    /// Message carried in the server's JSON error payload, if any
    pub fn server_message(&self) -> Option<String> {
        self.body().and_then(parse_server_message)
    }

    /// Give a `status` failure its domain `code`; other errors pass through
    ///
    /// The message is the server's when it sent one, otherwise the code's.
    pub fn for_status(self, status: StatusCode, code: ErrorCode) -> Self {
        match self {
            Self::Status { status: s, body } if s == status => {
                let message =
                    parse_server_message(&body).unwrap_or_else(|| code.message().to_string());
                Self::App(
                    AppError::with_message(code, message)
                        .with_detail(STATUS_DETAIL, s.as_u16())
                        .with_detail(BODY_DETAIL, body),
                )
            }
            other => other,
        }
    }

    /// Closest unified error code, for logs and machine-readable output
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Http(e) if e.is_timeout() => ErrorCode::TimeoutError,
            Self::Http(_) => ErrorCode::NetworkError,
            Self::Status { status, .. } => match *status {
                StatusCode::BAD_REQUEST => ErrorCode::InvalidRequest,
                StatusCode::UNAUTHORIZED => ErrorCode::NotAuthenticated,
                StatusCode::FORBIDDEN => ErrorCode::PermissionDenied,
                StatusCode::NOT_FOUND => ErrorCode::NotFound,
                StatusCode::CONFLICT => ErrorCode::AlreadyExists,
                _ => ErrorCode::InternalError,
            },
            Self::Unauthorized { .. } => ErrorCode::NotAuthenticated,
            Self::Validation(_) => ErrorCode::ValidationFailed,
            Self::App(e) => e.code,
            Self::InvalidResponse(_) | Self::Serialization(_) => ErrorCode::InvalidFormat,
            Self::Config(_) => ErrorCode::ConfigError,
        }
    }
}

const STATUS_DETAIL: &str = "status";
const BODY_DETAIL: &str = "body";

fn parse_server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error", "mensagem"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_accessor() {
        let err = ClientError::Status {
            status: StatusCode::CONFLICT,
            body: String::new(),
        };
        assert_eq!(err.status(), Some(StatusCode::CONFLICT));
        assert_eq!(err.code(), ErrorCode::AlreadyExists);

        let err = ClientError::Unauthorized {
            body: r#"{"message":"Token expirado"}"#.into(),
        };
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
        assert_eq!(err.server_message().as_deref(), Some("Token expirado"));
        assert_eq!(ClientError::Validation(FieldErrors::new()).status(), None);
    }

    #[test]
    fn test_server_message() {
        let err = ClientError::Status {
            status: StatusCode::BAD_REQUEST,
            body: r#"{"status":400,"message":"Usuário já apoiou este problema"}"#.into(),
        };
        assert_eq!(
            err.server_message().as_deref(),
            Some("Usuário já apoiou este problema")
        );

        let err = ClientError::Status {
            status: StatusCode::BAD_GATEWAY,
            body: "<html>bad gateway</html>".into(),
        };
        assert!(err.server_message().is_none());
    }

    #[test]
    fn test_field_errors_display() {
        let mut errors = FieldErrors::new();
        errors.insert("titulo", "muito curto");
        errors.insert("descricao", "obrigatória");
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.to_string(), "descricao: obrigatória; titulo: muito curto");
        assert_eq!(errors.get("titulo"), Some("muito curto"));
    }

    #[test]
    fn test_for_status_gives_domain_code() {
        let err = ClientError::Status {
            status: StatusCode::CONFLICT,
            body: r#"{"message":"Problema semelhante a 30 m"}"#.into(),
        }
        .for_status(StatusCode::CONFLICT, ErrorCode::SimilarIssueNearby);

        assert_eq!(err.code(), ErrorCode::SimilarIssueNearby);
        assert_eq!(err.status(), Some(StatusCode::CONFLICT));
        assert_eq!(err.server_message().as_deref(), Some("Problema semelhante a 30 m"));
        assert_eq!(err.to_string(), "Problema semelhante a 30 m");
    }

    #[test]
    fn test_for_status_without_payload_uses_code_message() {
        let err = ClientError::Status {
            status: StatusCode::NOT_FOUND,
            body: String::new(),
        }
        .for_status(StatusCode::NOT_FOUND, ErrorCode::IssueNotFound);
        assert_eq!(err.code(), ErrorCode::IssueNotFound);
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(err.body(), Some(""));
        assert_eq!(err.to_string(), ErrorCode::IssueNotFound.message());
    }

    #[test]
    fn test_for_status_leaves_other_statuses() {
        let err = ClientError::Status {
            status: StatusCode::BAD_GATEWAY,
            body: String::new(),
        }
        .for_status(StatusCode::NOT_FOUND, ErrorCode::IssueNotFound);
        assert!(matches!(err, ClientError::Status { .. }));
        assert_eq!(err.code(), ErrorCode::InternalError);
    }

    #[test]
    fn test_local_app_error_status_follows_code() {
        let err: ClientError = AppError::new(ErrorCode::CommentContentRequired).into();
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        assert!(err.body().is_none());
    }

    #[test]
    fn test_app_error_code_passthrough() {
        let err: ClientError = AppError::new(ErrorCode::FileTooLarge).into();
        assert_eq!(err.code(), ErrorCode::FileTooLarge);
    }
}
