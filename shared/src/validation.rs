//! Input validation helpers
//!
//! Centralized text length limits for issue reports and interactions.
//! Lengths are counted in characters, not bytes, so accented Portuguese
//! text is measured the way the user typed it.

use crate::error::{AppError, ErrorCode};

// ── Text length limits ──────────────────────────────────────────────

/// Issue title (`u64`, the length type of the validator derive)
pub const TITULO_MIN_LEN: u64 = 5;
pub const TITULO_MAX_LEN: u64 = 150;

/// Issue description
pub const DESCRICAO_MIN_LEN: u64 = 10;
pub const DESCRICAO_MAX_LEN: u64 = 2000;

/// Comment interaction content
pub const MAX_COMMENT_LEN: usize = 2000;

/// Photo attachments (5 MiB)
pub const MAX_PHOTO_BYTES: u64 = 5 * 1024 * 1024;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.chars().count() > max_len
    {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("{field} is too long ({} chars, max {max_len})", v.chars().count()),
        )
        .with_detail("field", field));
    }
    Ok(())
}
