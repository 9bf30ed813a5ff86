//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the HTTP status code this error corresponds to on the wire
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound | Self::IssueNotFound | Self::InteractionNotFound => {
                StatusCode::NOT_FOUND
            }

            // 409 Conflict
            Self::AlreadyExists | Self::SimilarIssueNearby => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated | Self::TokenExpired | Self::TokenInvalid => {
                StatusCode::UNAUTHORIZED
            }

            // 403 Forbidden
            Self::PermissionDenied => StatusCode::FORBIDDEN,

            // 400 Bad Request
            Self::ValidationFailed
            | Self::InvalidRequest
            | Self::InvalidFormat
            | Self::RequiredField
            | Self::ValueOutOfRange
            | Self::InteractionAlreadyExists
            | Self::CommentContentRequired
            | Self::UnsupportedFileFormat
            | Self::EmptyFile => StatusCode::BAD_REQUEST,

            // 413 Payload Too Large
            Self::FileTooLarge => StatusCode::PAYLOAD_TOO_LARGE,

            // 504 Gateway Timeout
            Self::TimeoutError | Self::GeolocationTimeout => StatusCode::GATEWAY_TIMEOUT,

            // 503 Service Unavailable
            Self::NetworkError | Self::GeolocationUnavailable => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::Unknown
            | Self::GeolocationUnsupported
            | Self::GeolocationPermissionDenied
            | Self::GeolocationUnknown
            | Self::FileReadFailed
            | Self::InternalError
            | Self::ConfigError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
