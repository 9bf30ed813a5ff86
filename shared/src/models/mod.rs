//! Data models
//!
//! Wire types exchanged with the issues backend.
//! All IDs are `i64`.

pub mod geo;
pub mod interaction;
pub mod issue;

// Re-exports
pub use geo::*;
pub use interaction::*;
pub use issue::*;
