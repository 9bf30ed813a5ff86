//! Unified error codes for the Praças client stack
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Issue and interaction errors
//! - 3xxx: Geolocation errors
//! - 4xxx: File attachment errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so they serialize the same
/// way in JSON CLI output and in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Permission denied
    PermissionDenied = 1010,

    // ==================== 2xxx: Issue ====================
    /// Issue not found
    IssueNotFound = 2001,
    /// A similar issue was already reported nearby
    SimilarIssueNearby = 2002,
    /// Interaction not found
    InteractionNotFound = 2101,
    /// The user already performed this interaction
    InteractionAlreadyExists = 2102,
    /// Comment interaction without content
    CommentContentRequired = 2103,

    // ==================== 3xxx: Geolocation ====================
    /// No geolocation capability available
    GeolocationUnsupported = 3001,
    /// Geolocation permission denied
    GeolocationPermissionDenied = 3002,
    /// Position unavailable
    GeolocationUnavailable = 3003,
    /// Position acquisition timed out
    GeolocationTimeout = 3004,
    /// Unknown geolocation failure
    GeolocationUnknown = 3005,

    // ==================== 4xxx: File attachment ====================
    /// File too large
    FileTooLarge = 4001,
    /// Unsupported file format
    UnsupportedFileFormat = 4002,
    /// Empty file provided
    EmptyFile = 4003,
    /// File could not be read
    FileReadFailed = 4004,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Network error
    NetworkError = 9003,
    /// Operation timeout
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::PermissionDenied => "Permission denied",

            // Issue
            ErrorCode::IssueNotFound => "Issue not found",
            ErrorCode::SimilarIssueNearby => "A similar issue was already reported nearby",
            ErrorCode::InteractionNotFound => "Interaction not found",
            ErrorCode::InteractionAlreadyExists => "Interaction already performed",
            ErrorCode::CommentContentRequired => "Comment content is required",

            // Geolocation
            ErrorCode::GeolocationUnsupported => "Geolocation is not supported",
            ErrorCode::GeolocationPermissionDenied => "Geolocation permission denied",
            ErrorCode::GeolocationUnavailable => "Position unavailable",
            ErrorCode::GeolocationTimeout => "Position acquisition timed out",
            ErrorCode::GeolocationUnknown => "Unknown geolocation error",

            // File attachment
            ErrorCode::FileTooLarge => "File too large",
            ErrorCode::UnsupportedFileFormat => "Unsupported file format",
            ErrorCode::EmptyFile => "Empty file provided",
            ErrorCode::FileReadFailed => "File could not be read",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1010 => Ok(ErrorCode::PermissionDenied),

            // Issue
            2001 => Ok(ErrorCode::IssueNotFound),
            2002 => Ok(ErrorCode::SimilarIssueNearby),
            2101 => Ok(ErrorCode::InteractionNotFound),
            2102 => Ok(ErrorCode::InteractionAlreadyExists),
            2103 => Ok(ErrorCode::CommentContentRequired),

            // Geolocation
            3001 => Ok(ErrorCode::GeolocationUnsupported),
            3002 => Ok(ErrorCode::GeolocationPermissionDenied),
            3003 => Ok(ErrorCode::GeolocationUnavailable),
            3004 => Ok(ErrorCode::GeolocationTimeout),
            3005 => Ok(ErrorCode::GeolocationUnknown),

            // File attachment
            4001 => Ok(ErrorCode::FileTooLarge),
            4002 => Ok(ErrorCode::UnsupportedFileFormat),
            4003 => Ok(ErrorCode::EmptyFile),
            4004 => Ok(ErrorCode::FileReadFailed),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
