//! Auth session
//!
//! Holds the access/refresh token pair and is handed explicitly to the
//! HTTP layer instead of living in ambient storage.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::AppError;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared, mutable session used by every request
pub type SessionHandle = Arc<RwLock<Session>>;

/// Token pair for the current user
#[derive(Debug, Clone, Default)]
pub struct Session {
    access_token: Option<String>,
    refresh_token: Option<String>,
}

impl Session {
    /// Creates a new empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps the session for sharing with the HTTP client.
    pub fn into_handle(self) -> SessionHandle {
        Arc::new(RwLock::new(self))
    }

    /// Stores the token pair after login or refresh.
    pub fn set_tokens(&mut self, access_token: String, refresh_token: Option<String>) {
        self.access_token = Some(access_token);
        self.refresh_token = refresh_token;
    }

    /// Clears the session data on logout.
    pub fn clear(&mut self) {
        self.access_token = None;
        self.refresh_token = None;
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// Authorization header value
    pub fn bearer(&self) -> Option<String> {
        self.access_token.as_ref().map(|t| format!("Bearer {}", t))
    }

    /// Decoded claims of the access token (signature is not verified)
    pub fn claims(&self) -> Result<TokenClaims, AppError> {
        let token = self
            .access_token
            .as_deref()
            .ok_or_else(AppError::not_authenticated)?;
        TokenClaims::decode(token)
    }
}

/// Role shown next to the user's name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRole {
    Admin,
    Empresa,
    Cidadao,
}

impl UserRole {
    pub fn label(&self) -> &'static str {
        match self {
            UserRole::Admin => "Administrador",
            UserRole::Empresa => "Empresa",
            UserRole::Cidadao => "Cidadão",
        }
    }

    fn from_claim(raw: &str) -> Self {
        let name = raw.trim().trim_start_matches("ROLE_");
        if name.eq_ignore_ascii_case("ADMIN") || name.eq_ignore_ascii_case("ADMINISTRADOR") {
            UserRole::Admin
        } else if name.eq_ignore_ascii_case("EMPRESA") {
            UserRole::Empresa
        } else {
            UserRole::Cidadao
        }
    }
}

/// JWT payload fields the client cares about
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub nome: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    /// Expiration (seconds since epoch)
    #[serde(default)]
    pub exp: Option<i64>,
}

impl TokenClaims {
    /// Decode the payload segment of a JWT
    pub fn decode(token: &str) -> Result<Self, AppError> {
        let payload = token
            .split('.')
            .nth(1)
            .ok_or_else(|| AppError::invalid_token("token is not a JWT"))?;
        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| AppError::invalid_token(format!("invalid token payload: {e}")))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| AppError::invalid_token(format!("invalid token claims: {e}")))
    }

    /// Highest-privilege role present in the token
    pub fn role(&self) -> UserRole {
        let all = self.role.iter().chain(self.roles.iter());
        let roles: Vec<UserRole> = all.map(|r| UserRole::from_claim(r)).collect();
        if roles.contains(&UserRole::Admin) {
            UserRole::Admin
        } else if roles.contains(&UserRole::Empresa) {
            UserRole::Empresa
        } else {
            UserRole::Cidadao
        }
    }

    pub fn display_name(&self) -> Option<&str> {
        self.nome
            .as_deref()
            .or(self.email.as_deref())
            .or(self.sub.as_deref())
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.exp.is_some_and(|exp| exp <= now.timestamp())
    }
}
