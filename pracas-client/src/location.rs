//! User location provider
//!
//! Best-effort acquisition of the device position. Failure is never fatal:
//! the provider always ends up with a position, live or the default one.

use async_trait::async_trait;
use shared::{Coordinate, ErrorCode};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;

/// Why a live position could not be obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("geolocation unsupported")]
    Unsupported,
    #[error("geolocation permission denied")]
    PermissionDenied,
    #[error("position unavailable")]
    Unavailable,
    #[error("geolocation timed out")]
    Timeout,
    #[error("unknown geolocation error")]
    Unknown,
}

impl GeolocationError {
    /// Message shown to the user
    pub fn message(&self) -> &'static str {
        match self {
            Self::Unsupported => "Geolocalização não é suportada neste dispositivo",
            Self::PermissionDenied => "Permissão de localização negada",
            Self::Unavailable => "Localização indisponível",
            Self::Timeout => "Tempo esgotado ao obter a localização",
            Self::Unknown => "Erro desconhecido ao obter a localização",
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Unsupported => ErrorCode::GeolocationUnsupported,
            Self::PermissionDenied => ErrorCode::GeolocationPermissionDenied,
            Self::Unavailable => ErrorCode::GeolocationUnavailable,
            Self::Timeout => ErrorCode::GeolocationTimeout,
            Self::Unknown => ErrorCode::GeolocationUnknown,
        }
    }
}

/// Device positioning capability
#[async_trait]
pub trait LocationSource: Send + Sync {
    async fn current_position(&self) -> Result<Coordinate, GeolocationError>;
}

/// A position known up front (configuration, command line)
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinate);

#[async_trait]
impl LocationSource for FixedLocation {
    async fn current_position(&self) -> Result<Coordinate, GeolocationError> {
        Ok(self.0)
    }
}

/// Host without any positioning capability
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedLocation;

#[async_trait]
impl LocationSource for UnsupportedLocation {
    async fn current_position(&self) -> Result<Coordinate, GeolocationError> {
        Err(GeolocationError::Unsupported)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LocationOptions {
    pub timeout: Duration,
    pub fallback: Coordinate,
}

impl Default for LocationOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            fallback: Coordinate::DEFAULT_CENTER,
        }
    }
}

/// Observable state of the provider
#[derive(Debug, Clone, PartialEq)]
pub struct LocationSnapshot {
    pub position: Option<Coordinate>,
    pub error: Option<String>,
    pub error_kind: Option<GeolocationError>,
    pub is_loading: bool,
}

pub struct UserLocationProvider {
    source: Arc<dyn LocationSource>,
    options: LocationOptions,
    state: RwLock<LocationSnapshot>,
}

impl UserLocationProvider {
    pub fn new(source: Arc<dyn LocationSource>, options: LocationOptions) -> Self {
        Self {
            source,
            options,
            state: RwLock::new(LocationSnapshot {
                position: None,
                error: None,
                error_kind: None,
                is_loading: true,
            }),
        }
    }

    /// Acquire the position; falls back to the default coordinate on any failure
    pub async fn acquire(&self) -> LocationSnapshot {
        {
            let mut state = self.state.write().await;
            state.is_loading = true;
            state.error = None;
            state.error_kind = None;
        }

        let lookup = self.source.current_position();
        let result = match tokio::time::timeout(self.options.timeout, lookup).await {
            Ok(result) => result,
            Err(_) => Err(GeolocationError::Timeout),
        };

        let mut state = self.state.write().await;
        match result {
            Ok(position) => {
                tracing::debug!(%position, "position acquired");
                state.position = Some(position);
            }
            Err(e) => {
                tracing::warn!(
                    reason = %e,
                    fallback = %self.options.fallback,
                    "using default position"
                );
                state.position = Some(self.options.fallback);
                state.error = Some(e.message().to_string());
                state.error_kind = Some(e);
            }
        }
        state.is_loading = false;
        state.clone()
    }

    /// Re-trigger acquisition, clearing any prior error
    pub async fn refetch(&self) -> LocationSnapshot {
        self.acquire().await
    }

    pub async fn snapshot(&self) -> LocationSnapshot {
        self.state.read().await.clone()
    }

    /// Current best position (fallback until one was acquired)
    pub async fn position(&self) -> Coordinate {
        self.state
            .read()
            .await
            .position
            .unwrap_or(self.options.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct DeniedThenGranted {
        calls: AtomicUsize,
        granted: Coordinate,
    }

    #[async_trait]
    impl LocationSource for DeniedThenGranted {
        async fn current_position(&self) -> Result<Coordinate, GeolocationError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(GeolocationError::PermissionDenied)
            } else {
                Ok(self.granted)
            }
        }
    }

    struct NeverAnswers;

    #[async_trait]
    impl LocationSource for NeverAnswers {
        async fn current_position(&self) -> Result<Coordinate, GeolocationError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_fixed_location() {
        let here = Coordinate::new(-23.55, -46.63);
        let provider =
            UserLocationProvider::new(Arc::new(FixedLocation(here)), LocationOptions::default());
        assert!(provider.snapshot().await.is_loading);

        let snapshot = provider.acquire().await;
        assert_eq!(snapshot.position, Some(here));
        assert!(snapshot.error.is_none());
        assert!(!snapshot.is_loading);
    }

    #[tokio::test]
    async fn test_denied_falls_back_to_default() {
        let source = DeniedThenGranted {
            calls: AtomicUsize::new(0),
            granted: Coordinate::new(-27.59, -48.55),
        };
        let provider = UserLocationProvider::new(Arc::new(source), LocationOptions::default());

        let snapshot = provider.acquire().await;
        assert_eq!(snapshot.position, Some(Coordinate::new(-26.3045, -48.8487)));
        assert_eq!(snapshot.error_kind, Some(GeolocationError::PermissionDenied));
        assert!(!snapshot.error.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_refetch_clears_error() {
        let granted = Coordinate::new(-27.59, -48.55);
        let source = DeniedThenGranted {
            calls: AtomicUsize::new(0),
            granted,
        };
        let provider = UserLocationProvider::new(Arc::new(source), LocationOptions::default());

        assert!(provider.acquire().await.error.is_some());
        let snapshot = provider.refetch().await;
        assert!(snapshot.error.is_none());
        assert_eq!(snapshot.position, Some(granted));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_reason() {
        let provider = UserLocationProvider::new(
            Arc::new(NeverAnswers),
            LocationOptions {
                timeout: Duration::from_secs(10),
                ..Default::default()
            },
        );
        let snapshot = provider.acquire().await;
        assert_eq!(snapshot.error_kind, Some(GeolocationError::Timeout));
        assert_eq!(snapshot.position, Some(Coordinate::DEFAULT_CENTER));
    }

    #[tokio::test]
    async fn test_unsupported() {
        let provider =
            UserLocationProvider::new(Arc::new(UnsupportedLocation), LocationOptions::default());
        assert_eq!(provider.position().await, Coordinate::DEFAULT_CENTER);
        let snapshot = provider.acquire().await;
        assert_eq!(
            snapshot.error_kind.map(|e| e.code()),
            Some(ErrorCode::GeolocationUnsupported)
        );
    }
}
