//! Headless map view
//!
//! Holds everything a front-end needs to draw the issues map: viewport,
//! user marker, issue markers, the open report form or popup card, and the
//! current notice. Front-ends forward user gestures to the methods here and
//! redraw from the getters afterwards.

use super::deep_link::{DeepLink, strip_issue_id};
use super::notice::{GEOLOCATION_NOTICE_TTL, Notice, NoticeKind};
use crate::config::DEFAULT_RADIUS_METERS;
use crate::controller::{InteractionOutcome, IssuesMapController, MapState};
use crate::error::ClientResult;
use crate::issue::{IssueCard, IssueFormModal, detail_link};
use crate::location::UserLocationProvider;
use shared::{Coordinate, Issue};
use std::sync::Arc;
use std::time::Instant;

pub const DEFAULT_ZOOM: u8 = 15;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: Coordinate,
    pub zoom: u8,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            center: Coordinate::DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
        }
    }
}

/// One marker per visible issue, styled by its type
#[derive(Debug, Clone, PartialEq)]
pub struct IssueMarker {
    pub issue_id: i64,
    pub position: Coordinate,
    pub icon: &'static str,
    pub color: &'static str,
    pub title: String,
}

impl From<&Issue> for IssueMarker {
    fn from(issue: &Issue) -> Self {
        let display = issue.tipo.display();
        Self {
            issue_id: issue.id,
            position: issue.position(),
            icon: display.icon,
            color: display.color,
            title: issue.titulo.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MapOptions {
    pub radius_meters: u32,
    pub zoom: u8,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            radius_meters: DEFAULT_RADIUS_METERS,
            zoom: DEFAULT_ZOOM,
        }
    }
}

pub struct MapView {
    controller: Arc<IssuesMapController>,
    radius_meters: u32,
    viewport: Viewport,
    user_position: Option<Coordinate>,
    markers: Vec<IssueMarker>,
    form: Option<IssueFormModal>,
    card: Option<IssueCard>,
    notice: Option<Notice>,
}

impl MapView {
    pub fn new(controller: Arc<IssuesMapController>, options: MapOptions) -> Self {
        Self {
            controller,
            radius_meters: options.radius_meters,
            viewport: Viewport {
                center: Coordinate::DEFAULT_CENTER,
                zoom: options.zoom,
            },
            user_position: None,
            markers: Vec::new(),
            form: None,
            card: None,
            notice: None,
        }
    }

    /// Locate the user, center the map there and load the first markers
    pub async fn init(&mut self, location: &UserLocationProvider) {
        let snapshot = location.acquire().await;
        let position = snapshot.position.unwrap_or(Coordinate::DEFAULT_CENTER);
        self.user_position = Some(position);
        self.viewport.center = position;

        if let Some(message) = snapshot.error {
            self.notice = Some(Notice::transient(
                format!("{message}. Usando localização padrão."),
                NoticeKind::Info,
                GEOLOCATION_NOTICE_TTL,
                Instant::now(),
            ));
        }

        self.controller
            .set_view(self.viewport.center, self.radius_meters)
            .await;
        self.sync().await;
    }

    /// Rebuild markers, card and banner from the controller state
    pub async fn sync(&mut self) {
        let state = self.controller.state().await;
        self.markers = state.issues.iter().map(IssueMarker::from).collect();
        self.refresh_card(&state);

        match state.error {
            Some(message) => {
                let already_shown = self
                    .notice
                    .as_ref()
                    .is_some_and(|n| n.kind == NoticeKind::Error && n.message == message);
                if !already_shown {
                    self.notice = Some(Notice::banner(message, true));
                }
            }
            None => {
                if self.notice.as_ref().is_some_and(|n| n.retryable) {
                    self.notice = None;
                }
            }
        }
    }

    fn refresh_card(&mut self, state: &MapState) {
        let Some(card) = self.card.as_mut() else {
            return;
        };
        let id = card.issue().id;
        match &state.selected_issue {
            Some(detail) if detail.issue.id == id => {
                card.refresh(detail.issue.clone(), Some(detail.interacoes.clone()));
            }
            _ => {
                if let Some(issue) = state.issues.iter().find(|i| i.id == id) {
                    card.refresh(issue.clone(), None);
                }
            }
        }
    }

    /// Tap on the map: open the report form at that point
    pub fn tap(&mut self, at: Coordinate) -> &mut IssueFormModal {
        self.card = None;
        self.form.insert(IssueFormModal::new(at))
    }

    /// Floating action button: report at the current map center
    pub fn open_form_at_center(&mut self) -> &mut IssueFormModal {
        self.tap(self.viewport.center)
    }

    pub fn close_form(&mut self) {
        self.form = None;
    }

    /// Submit the open form; `None` when no form is open
    ///
    /// On success the form closes and the list is reloaded so the new
    /// marker shows up. On failure the form stays open with its error.
    pub async fn submit_form(&mut self) -> Option<ClientResult<Issue>> {
        let api = Arc::clone(self.controller.api());
        let form = self.form.as_mut()?;
        let result = form.submit(api.as_ref()).await;
        if let Ok(created) = &result {
            tracing::info!(id = created.id, tipo = %created.tipo, "issue reported");
            self.form = None;
            self.controller.refetch().await;
            self.sync().await;
        }
        Some(result)
    }

    /// Marker tap: open the compact popup and select the issue
    pub async fn tap_marker(&mut self, issue_id: i64) -> Option<&IssueCard> {
        let state = self.controller.state().await;
        let issue = state.issues.into_iter().find(|i| i.id == issue_id)?;

        let mut card = IssueCard::compact(issue.clone());
        if let Some(origin) = self.user_position {
            card = card.with_distance_from(origin);
        }
        self.form = None;
        self.card = Some(card);

        self.controller.select_issue(&issue).await;
        self.sync().await;
        self.card.as_ref()
    }

    pub async fn close_card(&mut self) {
        self.card = None;
        self.controller.clear_selection().await;
    }

    /// Support button on the popup card
    pub async fn support(&mut self, issue_id: i64) -> InteractionOutcome {
        let controller = Arc::clone(&self.controller);
        let outcome = match self.card.as_mut().filter(|c| c.issue().id == issue_id) {
            Some(card) => card.support(&controller).await,
            None => {
                controller
                    .add_interaction(issue_id, shared::InteractionType::Apoio, None)
                    .await
            }
        };
        self.sync().await;
        outcome
    }

    pub async fn comment(&mut self, issue_id: i64, text: impl Into<String>) -> InteractionOutcome {
        let controller = Arc::clone(&self.controller);
        let text = text.into();
        let outcome = match self.card.as_mut().filter(|c| c.issue().id == issue_id) {
            Some(card) => card.comment(&controller, text).await,
            None => {
                controller
                    .add_interaction(issue_id, shared::InteractionType::Comentario, Some(text))
                    .await
            }
        };
        self.sync().await;
        outcome
    }

    /// Fly to a new center keeping the zoom; `false` when unchanged
    pub async fn recenter(&mut self, center: Coordinate) -> bool {
        if self.viewport.center == center {
            return false;
        }
        self.viewport.center = center;
        self.controller.set_view(center, self.radius_meters).await;
        self.sync().await;
        true
    }

    /// The user panned or zoomed
    pub async fn viewport_moved(&mut self, center: Coordinate, zoom: u8) {
        self.viewport = Viewport { center, zoom };
        self.controller.set_view(center, self.radius_meters).await;
        self.sync().await;
    }

    /// Recenter on `lat`/`lng` and open the detail card for `issueId`
    ///
    /// `issueId` is consumed: when present, the link to keep showing is
    /// returned without it so reloading does not reopen the card. The card
    /// itself is available from [`MapView::card`].
    pub async fn apply_deep_link(&mut self, link: &str) -> Result<Option<String>, url::ParseError> {
        let parsed = DeepLink::parse(link)?;
        if let Some(center) = parsed.center {
            self.recenter(center).await;
        }
        let Some(id) = parsed.issue_id else {
            return Ok(None);
        };
        let remaining = strip_issue_id(link)?;
        let detail = self.controller.select_issue_by_id(id).await;
        match detail {
            Some(detail) => {
                let mut card = IssueCard::detailed(detail);
                if let Some(origin) = self.user_position {
                    card = card.with_distance_from(origin);
                }
                self.form = None;
                self.card = Some(card);
            }
            None => tracing::warn!(id, "deep link points to an unavailable issue"),
        }
        self.sync().await;
        tracing::debug!(id, link = %remaining, "deep link consumed");
        Ok(Some(remaining))
    }

    /// Retry action on the error banner
    pub async fn retry(&mut self) {
        self.notice = None;
        self.controller.clear_error().await;
        self.controller.refetch().await;
        self.sync().await;
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Drop the notice once its lifetime is over
    pub fn expire_notices(&mut self, now: Instant) {
        if self.notice.as_ref().is_some_and(|n| n.is_expired(now)) {
            self.notice = None;
        }
    }

    pub fn controller(&self) -> &Arc<IssuesMapController> {
        &self.controller
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn user_position(&self) -> Option<Coordinate> {
        self.user_position
    }

    pub fn markers(&self) -> &[IssueMarker] {
        &self.markers
    }

    pub fn form(&self) -> Option<&IssueFormModal> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut IssueFormModal> {
        self.form.as_mut()
    }

    pub fn card(&self) -> Option<&IssueCard> {
        self.card.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn detail_link(&self, issue_id: i64) -> String {
        detail_link(issue_id)
    }
}
