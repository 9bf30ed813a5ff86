//! Map screen: view state, deep links and notices

mod deep_link;
mod notice;
mod view;

pub use deep_link::{DeepLink, strip_issue_id};
pub use notice::{GEOLOCATION_NOTICE_TTL, Notice, NoticeKind};
pub use view::{DEFAULT_ZOOM, IssueMarker, MapOptions, MapView, Viewport};
