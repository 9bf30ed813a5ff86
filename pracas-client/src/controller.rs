//! Issues map controller
//!
//! Owns the issue list shown on the map, the selected issue and the
//! interaction flow. Every fetch is tagged with a generation number and
//! only the latest generation's response is applied, so overlapping
//! fetches caused by fast panning never leave stale data behind.

use crate::error::ClientError;
use crate::repository::IssueApi;
use http::StatusCode;
use shared::validation::{MAX_COMMENT_LEN, validate_optional_text};
use shared::{Coordinate, ErrorCode, InteractionType, Issue, IssueDetail, NewInteraction};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

const LOAD_ERROR_MESSAGE: &str = "Não foi possível carregar os problemas. Tente novamente.";
const DETAIL_ERROR_MESSAGE: &str = "Não foi possível carregar os detalhes do problema.";
const EMPTY_COMMENT_MESSAGE: &str = "O comentário não pode ser vazio";

/// Center and radius the list is fetched for
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapQuery {
    pub center: Coordinate,
    pub radius_meters: u32,
}

/// Snapshot of the controller state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapState {
    pub issues: Vec<Issue>,
    pub selected_issue: Option<IssueDetail>,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Result of an interaction mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionOutcome {
    pub success: bool,
    pub error: Option<String>,
    pub code: Option<ErrorCode>,
}

impl InteractionOutcome {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
            code: None,
        }
    }

    fn failed(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            code: Some(code),
        }
    }
}

/// User-facing message for a failed interaction
///
/// The backend answers 400 when the user already supported or liked the
/// issue.
pub fn interaction_error_message(err: &ClientError) -> String {
    match err.status() {
        Some(StatusCode::BAD_REQUEST) => "Você já realizou esta ação".to_string(),
        Some(StatusCode::UNAUTHORIZED) => "Você precisa estar logado para interagir".to_string(),
        Some(StatusCode::NOT_FOUND) => "Problema não encontrado".to_string(),
        _ => "Erro ao registrar interação. Tente novamente.".to_string(),
    }
}

pub struct IssuesMapController {
    api: Arc<dyn IssueApi>,
    query: Mutex<Option<MapQuery>>,
    state: Mutex<MapState>,
    list_generation: AtomicU64,
    detail_generation: AtomicU64,
}

impl IssuesMapController {
    pub fn new(api: Arc<dyn IssueApi>) -> Self {
        Self {
            api,
            query: Mutex::new(None),
            state: Mutex::new(MapState::default()),
            list_generation: AtomicU64::new(0),
            detail_generation: AtomicU64::new(0),
        }
    }

    pub fn api(&self) -> &Arc<dyn IssueApi> {
        &self.api
    }

    pub async fn state(&self) -> MapState {
        self.state.lock().await.clone()
    }

    pub async fn query(&self) -> Option<MapQuery> {
        *self.query.lock().await
    }

    /// Update center/radius; refetches only when either actually changed
    pub async fn set_view(&self, center: Coordinate, radius_meters: u32) {
        let next = MapQuery {
            center,
            radius_meters,
        };
        {
            let mut query = self.query.lock().await;
            if *query == Some(next) {
                return;
            }
            *query = Some(next);
        }
        self.load_issues().await;
    }

    /// Force a list reload (manual retry)
    pub async fn refetch(&self) {
        self.load_issues().await;
    }

    pub async fn clear_error(&self) {
        self.state.lock().await.error = None;
    }

    async fn load_issues(&self) {
        let generation = self.list_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let query = *self.query.lock().await;
        self.state.lock().await.is_loading = true;

        let result = match query {
            Some(q) => match self.api.find_by_proximity(q.center, q.radius_meters).await {
                Ok(issues) => Ok(issues),
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "proximity search failed, falling back to full list"
                    );
                    self.api.find_all().await
                }
            },
            None => self.api.find_all().await,
        };

        let mut state = self.state.lock().await;
        if self.list_generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(generation, "discarding stale issue list");
            return;
        }
        match result {
            Ok(issues) => {
                tracing::debug!(count = issues.len(), generation, "issue list loaded");
                state.issues = issues;
                state.error = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "issue list unavailable");
                state.error = Some(LOAD_ERROR_MESSAGE.to_string());
            }
        }
        state.is_loading = false;
    }

    /// Select an issue, fetching its details
    ///
    /// When the detail fetch fails the partial list entry is kept as the
    /// selection instead of failing.
    pub async fn select_issue(&self, issue: &Issue) {
        let generation = self.detail_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let detail = match self.api.find_by_id_with_details(issue.id).await {
            Ok(detail) => detail,
            Err(e) => {
                tracing::warn!(
                    id = issue.id,
                    error = %e,
                    "detail fetch failed, using partial issue"
                );
                IssueDetail::partial(issue.clone())
            }
        };
        let mut state = self.state.lock().await;
        if self.detail_generation.load(Ordering::SeqCst) == generation {
            state.selected_issue = Some(detail);
        } else {
            tracing::debug!(id = issue.id, generation, "discarding stale issue detail");
        }
    }

    /// Select by id (deep links); uses the loaded list entry when present
    pub async fn select_issue_by_id(&self, id: i64) -> Option<IssueDetail> {
        let known = self
            .state
            .lock()
            .await
            .issues
            .iter()
            .find(|i| i.id == id)
            .cloned();

        match known {
            Some(issue) => self.select_issue(&issue).await,
            None => {
                let generation = self.detail_generation.fetch_add(1, Ordering::SeqCst) + 1;
                let result = self.api.find_by_id_with_details(id).await;
                let mut state = self.state.lock().await;
                if self.detail_generation.load(Ordering::SeqCst) != generation {
                    return None;
                }
                match result {
                    Ok(detail) => state.selected_issue = Some(detail),
                    Err(e) => {
                        tracing::warn!(id, error = %e, "linked issue unavailable");
                        state.error = Some(DETAIL_ERROR_MESSAGE.to_string());
                        return None;
                    }
                }
            }
        }
        self.state.lock().await.selected_issue.clone()
    }

    /// Drop the selection; a detail fetch still in flight is discarded
    pub async fn clear_selection(&self) {
        let mut state = self.state.lock().await;
        self.detail_generation.fetch_add(1, Ordering::SeqCst);
        state.selected_issue = None;
    }

    /// Add an interaction, then refresh the list and (if selected) the detail
    pub async fn add_interaction(
        &self,
        issue_id: i64,
        tipo: InteractionType,
        conteudo: Option<String>,
    ) -> InteractionOutcome {
        let conteudo = conteudo
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        if tipo.requires_content() && conteudo.is_none() {
            return InteractionOutcome::failed(
                ErrorCode::CommentContentRequired,
                EMPTY_COMMENT_MESSAGE,
            );
        }
        if let Err(e) = validate_optional_text(&conteudo, "conteudo", MAX_COMMENT_LEN) {
            return InteractionOutcome::failed(e.code, e.message);
        }

        let payload = NewInteraction { tipo, conteudo };
        if let Err(e) = self.api.add_interaction(issue_id, &payload).await {
            tracing::warn!(
                issue_id,
                tipo = %tipo,
                error = %e,
                code = %e.code(),
                "interaction rejected"
            );
            return InteractionOutcome::failed(e.code(), interaction_error_message(&e));
        }

        self.load_issues().await;

        let selected_id = self
            .state
            .lock()
            .await
            .selected_issue
            .as_ref()
            .map(|d| d.issue.id);
        if selected_id == Some(issue_id) {
            self.refresh_selected(issue_id).await;
        }

        InteractionOutcome::ok()
    }

    async fn refresh_selected(&self, issue_id: i64) {
        let generation = self.detail_generation.fetch_add(1, Ordering::SeqCst) + 1;
        match self.api.find_by_id_with_details(issue_id).await {
            Ok(detail) => {
                let mut state = self.state.lock().await;
                if self.detail_generation.load(Ordering::SeqCst) == generation {
                    state.selected_issue = Some(detail);
                }
            }
            Err(e) => {
                tracing::warn!(issue_id, error = %e, "could not refresh selected issue");
            }
        }
    }
}
