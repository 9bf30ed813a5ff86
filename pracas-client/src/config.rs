//! Client configuration

use crate::error::{ClientError, ClientResult};
use crate::http::NetworkHttpClient;
use crate::repository::IssueRepository;
use crate::session::{Session, SessionHandle};
use shared::Coordinate;
use std::time::Duration;

/// Default proximity radius for the issue map (meters)
pub const DEFAULT_RADIUS_METERS: u32 = 5000;

/// Default geolocation acquisition timeout (milliseconds)
pub const DEFAULT_GEOLOCATION_TIMEOUT_MS: u64 = 10_000;

/// Client configuration for connecting to the issues backend
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | PRACAS_API_URL | http://localhost:8080 | backend base URL |
/// | PRACAS_TOKEN | - | bearer access token |
/// | PRACAS_REFRESH_TOKEN | - | refresh token |
/// | PRACAS_TIMEOUT_SECS | 30 | HTTP timeout |
/// | PRACAS_RADIUS_METERS | 5000 | proximity radius |
/// | PRACAS_GEO_TIMEOUT_MS | 10000 | geolocation timeout |
/// | PRACAS_LAT / PRACAS_LNG | - | device position |
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL (e.g., "http://localhost:8080")
    pub base_url: String,

    /// JWT access token for authentication
    pub token: Option<String>,

    /// Refresh token kept alongside the access token
    pub refresh_token: Option<String>,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Proximity search radius in meters
    pub radius_meters: u32,

    /// Geolocation acquisition timeout in milliseconds
    pub geolocation_timeout_ms: u64,

    /// Device position, when the host knows it
    pub device_position: Option<Coordinate>,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            refresh_token: None,
            timeout: 30,
            radius_meters: DEFAULT_RADIUS_METERS,
            geolocation_timeout_ms: DEFAULT_GEOLOCATION_TIMEOUT_MS,
            device_position: None,
        }
    }

    /// Load configuration from the environment (and `.env`, if present)
    ///
    /// Unset variables fall back to defaults.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let lat = env_parse::<f64>("PRACAS_LAT");
        let lng = env_parse::<f64>("PRACAS_LNG");
        let device_position = match (lat, lng) {
            (Some(lat), Some(lng)) => Coordinate::checked(lat, lng),
            _ => None,
        };

        Self {
            base_url: std::env::var("PRACAS_API_URL")
                .unwrap_or_else(|_| "http://localhost:8080".into()),
            token: std::env::var("PRACAS_TOKEN").ok().filter(|t| !t.is_empty()),
            refresh_token: std::env::var("PRACAS_REFRESH_TOKEN")
                .ok()
                .filter(|t| !t.is_empty()),
            timeout: env_parse("PRACAS_TIMEOUT_SECS").unwrap_or(30),
            radius_meters: env_parse("PRACAS_RADIUS_METERS").unwrap_or(DEFAULT_RADIUS_METERS),
            geolocation_timeout_ms: env_parse("PRACAS_GEO_TIMEOUT_MS")
                .unwrap_or(DEFAULT_GEOLOCATION_TIMEOUT_MS),
            device_position,
        }
    }

    /// Set the JWT token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the refresh token
    pub fn with_refresh_token(mut self, token: impl Into<String>) -> Self {
        self.refresh_token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Set the proximity radius
    pub fn with_radius(mut self, meters: u32) -> Self {
        self.radius_meters = meters;
        self
    }

    /// Set the geolocation timeout
    pub fn with_geolocation_timeout(mut self, timeout: Duration) -> Self {
        self.geolocation_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set the device position
    pub fn with_device_position(mut self, position: Coordinate) -> Self {
        self.device_position = Some(position);
        self
    }

    pub fn geolocation_timeout(&self) -> Duration {
        Duration::from_millis(self.geolocation_timeout_ms)
    }

    /// Check the configuration before building clients from it
    pub fn validate(&self) -> ClientResult<()> {
        let url = url::Url::parse(&self.base_url)
            .map_err(|e| ClientError::Config(format!("invalid base URL {}: {e}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::Config(format!(
                "unsupported URL scheme: {}",
                url.scheme()
            )));
        }
        if self.timeout == 0 {
            return Err(ClientError::Config("timeout must be greater than zero".into()));
        }
        if self.radius_meters == 0 {
            return Err(ClientError::Config("radius must be greater than zero".into()));
        }
        Ok(())
    }

    /// Create a session seeded with the configured tokens
    pub fn session(&self) -> SessionHandle {
        let mut session = Session::new();
        if let Some(token) = &self.token {
            session.set_tokens(token.clone(), self.refresh_token.clone());
        }
        session.into_handle()
    }

    /// Create an HTTP client from this configuration
    pub fn build_http_client(&self, session: SessionHandle) -> ClientResult<NetworkHttpClient> {
        self.validate()?;
        NetworkHttpClient::new(self, session)
    }

    /// Create an issue repository from this configuration
    pub fn build_repository(&self, session: SessionHandle) -> ClientResult<IssueRepository> {
        Ok(IssueRepository::new(self.build_http_client(session)?))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080")
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
