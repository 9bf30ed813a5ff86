//! Shared types for the Praças issue map
//!
//! Wire models, display configuration, the unified error system and
//! validation helpers used by the client and the CLI.

pub mod error;
pub mod models;
pub mod validation;

// Re-exports
pub use error::{AppError, ErrorCode};
pub use models::{
    Coordinate, Interaction, InteractionType, Issue, IssueDetail, IssueStatus, IssueType,
    NewInteraction, NewIssue, StatusDisplay, StatusUpdate, TypeDisplay,
};
pub use serde::{Deserialize, Serialize};
