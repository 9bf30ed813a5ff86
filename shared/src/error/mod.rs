//! Unified error system
//!
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`AppError`]: Rich error type with codes, messages, and details
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Issue and interaction errors
//! - 3xxx: Geolocation errors
//! - 4xxx: File attachment errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//!
//! let err = AppError::new(ErrorCode::IssueNotFound);
//! assert_eq!(err.http_status(), http::StatusCode::NOT_FOUND);
//!
//! let err = AppError::with_message(ErrorCode::SimilarIssueNearby, "Problema semelhante próximo")
//!     .with_detail("status", 409);
//! assert_eq!(err.http_status(), http::StatusCode::CONFLICT);
//! ```

mod codes;
mod http;
mod types;

pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::AppError;
