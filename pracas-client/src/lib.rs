//! Praças client - community issue map
//!
//! Talks to the issues REST API and keeps the headless state behind the
//! issues map: the issue list around a center, the selected issue, the
//! report form and the map view itself.

pub mod config;
pub mod controller;
pub mod error;
pub mod http;
pub mod issue;
pub mod location;
pub mod map;
pub mod repository;
pub mod session;

pub use config::ClientConfig;
pub use controller::{InteractionOutcome, IssuesMapController, MapQuery, MapState};
pub use error::{ClientError, ClientResult, FieldErrors};
pub use http::{HttpClient, NetworkHttpClient};
pub use issue::{CardVariant, IssueCard, IssueFormModal, PhotoAttachment};
pub use location::{
    FixedLocation, GeolocationError, LocationOptions, LocationSnapshot, LocationSource,
    UnsupportedLocation, UserLocationProvider,
};
pub use map::{DeepLink, IssueMarker, MapOptions, MapView, Notice, NoticeKind, Viewport};
pub use repository::{IssueApi, IssueRepository};
pub use session::{Session, SessionHandle, TokenClaims, UserRole};

// Re-export shared types for convenience
pub use shared::{
    Coordinate, Interaction, InteractionType, Issue, IssueDetail, IssueStatus, IssueType,
    NewInteraction, NewIssue,
};
