//! HTTP transport for the issues backend

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::session::SessionHandle;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// HTTP client trait
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T>;
    async fn get_with_query<T: DeserializeOwned, Q: Serialize + Sync>(
        &self,
        path: &str,
        query: &Q,
    ) -> ClientResult<T>;
    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T>;
    async fn patch<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T>;
    async fn delete(&self, path: &str) -> ClientResult<()>;
}

/// Network HTTP client (reqwest), bearer token read from the session per call
#[derive(Debug, Clone)]
pub struct NetworkHttpClient {
    client: Client,
    base_url: String,
    session: SessionHandle,
}

impl NetworkHttpClient {
    pub fn new(config: &ClientConfig, session: SessionHandle) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        tracing::debug!(%method, path, "sending request");
        let mut req = self.client.request(method, self.url(path));
        if let Some(auth) = self.session.read().await.bearer() {
            req = req.header(reqwest::header::AUTHORIZATION, auth);
        }
        req
    }

    async fn check_status(response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(%status, error = %e, "failed to read error payload");
                String::new()
            }
        };
        tracing::debug!(%status, body = %body, "request failed");
        match status {
            StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized { body }),
            _ => Err(ClientError::Status { status, body }),
        }
    }

    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let response = Self::check_status(response).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            ClientError::InvalidResponse(format!("unexpected payload: {e}"))
        })
    }
}

#[async_trait]
impl HttpClient for NetworkHttpClient {
    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self.request(Method::GET, path).await.send().await?;
        Self::handle_response(response).await
    }

    async fn get_with_query<T: DeserializeOwned, Q: Serialize + Sync>(
        &self,
        path: &str,
        query: &Q,
    ) -> ClientResult<T> {
        let response = self
            .request(Method::GET, path)
            .await
            .query(query)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let response = self
            .request(Method::POST, path)
            .await
            .json(body)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    async fn patch<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let response = self
            .request(Method::PATCH, path)
            .await
            .json(body)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    async fn delete(&self, path: &str) -> ClientResult<()> {
        let response = self.request(Method::DELETE, path).await.send().await?;
        Self::check_status(response).await?;
        Ok(())
    }
}
