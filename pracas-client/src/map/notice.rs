//! Dismissible notices shown over the map

use std::time::{Duration, Instant};

/// Lifetime of the "using default location" notice
pub const GEOLOCATION_NOTICE_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub kind: NoticeKind,
    /// `None` for banners that stay until dismissed
    pub expires_at: Option<Instant>,
    /// Whether the banner offers a retry action
    pub retryable: bool,
}

impl Notice {
    /// Auto-expiring notification
    pub fn transient(
        message: impl Into<String>,
        kind: NoticeKind,
        ttl: Duration,
        now: Instant,
    ) -> Self {
        Self {
            message: message.into(),
            kind,
            expires_at: Some(now + ttl),
            retryable: false,
        }
    }

    /// Error banner that stays until dismissed
    pub fn banner(message: impl Into<String>, retryable: bool) -> Self {
        Self {
            message: message.into(),
            kind: NoticeKind::Error,
            expires_at: None,
            retryable,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}
