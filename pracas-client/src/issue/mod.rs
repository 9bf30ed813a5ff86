//! Issue components: cards, the report form and its photo attachment

pub mod card;
pub mod form;
pub mod photo;

pub use card::{CardVariant, IssueCard, detail_link};
pub use form::{IssueFormModal, submit_error_message};
pub use photo::PhotoAttachment;
