//! Issue repository
//!
//! One method per backend endpoint. No retry, caching or batching: errors
//! propagate to the caller carrying the HTTP status and payload. Statuses
//! with a domain meaning on a given endpoint (404 on an issue path, 409 on
//! create) surface as [`ClientError::App`] with the matching [`ErrorCode`].

use crate::error::{ClientError, ClientResult};
use crate::http::{HttpClient, NetworkHttpClient};
use async_trait::async_trait;
use http::StatusCode;
use serde::Serialize;
use shared::{
    Coordinate, ErrorCode, Interaction, Issue, IssueDetail, IssueStatus, NewInteraction,
    NewIssue, StatusUpdate,
};

const ISSUES_PATH: &str = "/api/issues";

fn issue_not_found(err: ClientError) -> ClientError {
    err.for_status(StatusCode::NOT_FOUND, ErrorCode::IssueNotFound)
}

/// Operations on community issues
///
/// The map controller and the report form depend on this trait rather than
/// on the HTTP repository, so they can be driven by in-memory fakes.
#[async_trait]
pub trait IssueApi: Send + Sync {
    async fn find_all(&self) -> ClientResult<Vec<Issue>>;
    async fn find_by_proximity(&self, center: Coordinate, radius_meters: u32)
    -> ClientResult<Vec<Issue>>;
    async fn find_by_id(&self, id: i64) -> ClientResult<Issue>;
    async fn find_by_id_with_details(&self, id: i64) -> ClientResult<IssueDetail>;
    async fn create(&self, issue: &NewIssue) -> ClientResult<Issue>;
    async fn update_status(&self, id: i64, status: IssueStatus) -> ClientResult<Issue>;
    async fn add_interaction(
        &self,
        issue_id: i64,
        interaction: &NewInteraction,
    ) -> ClientResult<Interaction>;
    async fn find_interactions(&self, issue_id: i64) -> ClientResult<Vec<Interaction>>;
    async fn remove_interaction(&self, issue_id: i64, interaction_id: i64) -> ClientResult<()>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProximityQuery {
    latitude: f64,
    longitude: f64,
    raio_metros: u32,
}

/// REST implementation of [`IssueApi`]
#[derive(Debug, Clone)]
pub struct IssueRepository<H = NetworkHttpClient> {
    http: H,
}

impl<H: HttpClient> IssueRepository<H> {
    pub fn new(http: H) -> Self {
        Self { http }
    }

    pub fn http(&self) -> &H {
        &self.http
    }
}

#[async_trait]
impl<H: HttpClient> IssueApi for IssueRepository<H> {
    async fn find_all(&self) -> ClientResult<Vec<Issue>> {
        self.http.get(ISSUES_PATH).await
    }

    async fn find_by_proximity(
        &self,
        center: Coordinate,
        radius_meters: u32,
    ) -> ClientResult<Vec<Issue>> {
        let query = ProximityQuery {
            latitude: center.lat,
            longitude: center.lng,
            raio_metros: radius_meters,
        };
        self.http
            .get_with_query(&format!("{ISSUES_PATH}/proximidade"), &query)
            .await
    }

    async fn find_by_id(&self, id: i64) -> ClientResult<Issue> {
        self.http
            .get(&format!("{ISSUES_PATH}/{id}"))
            .await
            .map_err(issue_not_found)
    }

    async fn find_by_id_with_details(&self, id: i64) -> ClientResult<IssueDetail> {
        self.http
            .get(&format!("{ISSUES_PATH}/{id}/detalhes"))
            .await
            .map_err(issue_not_found)
    }

    async fn create(&self, issue: &NewIssue) -> ClientResult<Issue> {
        let created: Issue = self
            .http
            .post(ISSUES_PATH, issue)
            .await
            .map_err(|e| e.for_status(StatusCode::CONFLICT, ErrorCode::SimilarIssueNearby))?;
        tracing::info!(id = created.id, tipo = %created.tipo, "issue created");
        Ok(created)
    }

    async fn update_status(&self, id: i64, status: IssueStatus) -> ClientResult<Issue> {
        let updated: Issue = self
            .http
            .patch(&format!("{ISSUES_PATH}/{id}/status"), &StatusUpdate { status })
            .await
            .map_err(issue_not_found)?;
        tracing::info!(id, status = %updated.status, "issue status updated");
        Ok(updated)
    }

    async fn add_interaction(
        &self,
        issue_id: i64,
        interaction: &NewInteraction,
    ) -> ClientResult<Interaction> {
        let created: Interaction = self
            .http
            .post(&format!("{ISSUES_PATH}/{issue_id}/interacoes"), interaction)
            .await
            .map_err(|e| {
                // 400 means a missing comment text or a repeated support/like
                let rejected = if interaction.tipo.requires_content() {
                    ErrorCode::CommentContentRequired
                } else {
                    ErrorCode::InteractionAlreadyExists
                };
                issue_not_found(e).for_status(StatusCode::BAD_REQUEST, rejected)
            })?;
        tracing::info!(issue_id, tipo = %created.tipo, "interaction added");
        Ok(created)
    }

    async fn find_interactions(&self, issue_id: i64) -> ClientResult<Vec<Interaction>> {
        self.http
            .get(&format!("{ISSUES_PATH}/{issue_id}/interacoes"))
            .await
            .map_err(issue_not_found)
    }

    async fn remove_interaction(&self, issue_id: i64, interaction_id: i64) -> ClientResult<()> {
        self.http
            .delete(&format!(
                "{ISSUES_PATH}/{issue_id}/interacoes/{interaction_id}"
            ))
            .await
            .map_err(|e| e.for_status(StatusCode::NOT_FOUND, ErrorCode::InteractionNotFound))?;
        tracing::info!(issue_id, interaction_id, "interaction removed");
        Ok(())
    }
}
