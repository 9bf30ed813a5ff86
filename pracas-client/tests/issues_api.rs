// pracas-client/tests/issues_api.rs
// Repository, controller and map view against an in-process mock backend

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, patch};
use axum::{Json, Router};
use pracas_client::{
    ClientConfig, ClientError, Coordinate, InteractionType, IssueApi, IssueStatus, IssueType,
    IssuesMapController, LocationOptions, MapOptions, MapView, NewInteraction, NewIssue,
    UnsupportedLocation, UserLocationProvider,
};
use serde::Deserialize;
use shared::{ErrorCode, Interaction, Issue, IssueDetail, StatusUpdate};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Backend {
    issues: Mutex<Vec<Issue>>,
    interactions: Mutex<Vec<(i64, Interaction)>>,
    proximity_fails: AtomicBool,
    all_fails: AtomicBool,
    proximity_calls: AtomicUsize,
    all_calls: AtomicUsize,
    last_auth: Mutex<Option<String>>,
}

type Shared = Arc<Backend>;
type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

fn not_found() -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, "Problema não encontrado".into())
}

fn unavailable() -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, "falha".into())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProximityParams {
    latitude: f64,
    longitude: f64,
    raio_metros: u32,
}

async fn list(State(backend): State<Shared>) -> ApiResult<Vec<Issue>> {
    backend.all_calls.fetch_add(1, Ordering::SeqCst);
    if backend.all_fails.load(Ordering::SeqCst) {
        return Err(unavailable());
    }
    Ok(Json(backend.issues.lock().unwrap().clone()))
}

async fn proximity(
    State(backend): State<Shared>,
    Query(params): Query<ProximityParams>,
) -> ApiResult<Vec<Issue>> {
    backend.proximity_calls.fetch_add(1, Ordering::SeqCst);
    if backend.proximity_fails.load(Ordering::SeqCst) {
        return Err(unavailable());
    }
    let center = Coordinate::new(params.latitude, params.longitude);
    let nearby = backend
        .issues
        .lock()
        .unwrap()
        .iter()
        .filter(|i| center.distance_to(&i.position()) <= f64::from(params.raio_metros))
        .cloned()
        .collect();
    Ok(Json(nearby))
}

async fn create(
    State(backend): State<Shared>,
    headers: HeaderMap,
    Json(new): Json<NewIssue>,
) -> Result<(StatusCode, Json<Issue>), (StatusCode, String)> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    if auth.is_none() {
        return Err((StatusCode::UNAUTHORIZED, String::new()));
    }
    *backend.last_auth.lock().unwrap() = auth;

    let mut issues = backend.issues.lock().unwrap();
    let at = Coordinate::new(new.latitude, new.longitude);
    if issues
        .iter()
        .any(|i| i.tipo == new.tipo && i.position().distance_to(&at) <= 50.0)
    {
        return Err((
            StatusCode::CONFLICT,
            r#"{"status":409,"message":"Já existe um problema semelhante a menos de 50 m"}"#.into(),
        ));
    }
    let issue = Issue {
        id: issues.len() as i64 + 1,
        titulo: new.titulo,
        descricao: new.descricao,
        tipo: new.tipo,
        status: IssueStatus::Aberta,
        latitude: new.latitude,
        longitude: new.longitude,
        foto_url: new.foto_url,
        autor_nome: Some("Maria".into()),
        data_criacao: None,
        total_apoios: 0,
        total_interacoes: 0,
    };
    issues.push(issue.clone());
    Ok((StatusCode::CREATED, Json(issue)))
}

fn find(backend: &Backend, id: i64) -> Result<Issue, (StatusCode, String)> {
    backend
        .issues
        .lock()
        .unwrap()
        .iter()
        .find(|i| i.id == id)
        .cloned()
        .ok_or_else(not_found)
}

fn interactions_of(backend: &Backend, id: i64) -> Vec<Interaction> {
    backend
        .interactions
        .lock()
        .unwrap()
        .iter()
        .filter(|(issue_id, _)| *issue_id == id)
        .map(|(_, i)| i.clone())
        .collect()
}

async fn by_id(State(backend): State<Shared>, Path(id): Path<i64>) -> ApiResult<Issue> {
    find(&backend, id).map(Json)
}

async fn details(State(backend): State<Shared>, Path(id): Path<i64>) -> ApiResult<IssueDetail> {
    let issue = find(&backend, id)?;
    Ok(Json(IssueDetail {
        issue,
        interacoes: interactions_of(&backend, id),
    }))
}

async fn update_status(
    State(backend): State<Shared>,
    Path(id): Path<i64>,
    Json(update): Json<StatusUpdate>,
) -> ApiResult<Issue> {
    let mut issues = backend.issues.lock().unwrap();
    let issue = issues.iter_mut().find(|i| i.id == id).ok_or_else(not_found)?;
    issue.status = update.status;
    Ok(Json(issue.clone()))
}

async fn add_interaction(
    State(backend): State<Shared>,
    Path(id): Path<i64>,
    Json(new): Json<NewInteraction>,
) -> Result<(StatusCode, Json<Interaction>), (StatusCode, String)> {
    if new.tipo == InteractionType::Comentario
        && new.conteudo.as_deref().is_none_or(|c| c.trim().is_empty())
    {
        return Err((StatusCode::BAD_REQUEST, "conteúdo obrigatório".into()));
    }
    if new.tipo == InteractionType::Apoio
        && interactions_of(&backend, id)
            .iter()
            .any(|i| i.tipo == InteractionType::Apoio)
    {
        return Err((StatusCode::BAD_REQUEST, "já apoiado".into()));
    }

    {
        let mut issues = backend.issues.lock().unwrap();
        let issue = issues.iter_mut().find(|i| i.id == id).ok_or_else(not_found)?;
        issue.total_interacoes += 1;
        if new.tipo == InteractionType::Apoio {
            issue.total_apoios += 1;
        }
    }

    let mut interactions = backend.interactions.lock().unwrap();
    let interaction = Interaction {
        id: interactions.len() as i64 + 1,
        tipo: new.tipo,
        conteudo: new.conteudo,
        usuario_nome: Some("Maria".into()),
        data_criacao: None,
    };
    interactions.push((id, interaction.clone()));
    Ok((StatusCode::CREATED, Json(interaction)))
}

async fn list_interactions(
    State(backend): State<Shared>,
    Path(id): Path<i64>,
) -> ApiResult<Vec<Interaction>> {
    find(&backend, id)?;
    Ok(Json(interactions_of(&backend, id)))
}

async fn remove_interaction(
    State(backend): State<Shared>,
    Path((id, interaction_id)): Path<(i64, i64)>,
) -> Result<StatusCode, (StatusCode, String)> {
    let mut interactions = backend.interactions.lock().unwrap();
    let before = interactions.len();
    interactions.retain(|(issue_id, i)| !(*issue_id == id && i.id == interaction_id));
    if interactions.len() == before {
        return Err(not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn spawn_backend(backend: Shared) -> SocketAddr {
    let app = Router::new()
        .route("/api/issues", get(list).post(create))
        .route("/api/issues/proximidade", get(proximity))
        .route("/api/issues/{id}", get(by_id))
        .route("/api/issues/{id}/detalhes", get(details))
        .route("/api/issues/{id}/status", patch(update_status))
        .route(
            "/api/issues/{id}/interacoes",
            get(list_interactions).post(add_interaction),
        )
        .route(
            "/api/issues/{id}/interacoes/{interaction_id}",
            delete(remove_interaction),
        )
        .with_state(backend);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });
    addr
}

async fn repository(addr: SocketAddr, token: Option<&str>) -> Arc<dyn IssueApi> {
    let mut config = ClientConfig::new(format!("http://{addr}"));
    if let Some(token) = token {
        config = config.with_token(token);
    }
    let repo = config
        .build_repository(config.session())
        .expect("build repository");
    Arc::new(repo)
}

fn report(titulo: &str, descricao: &str, tipo: IssueType, at: Coordinate) -> NewIssue {
    NewIssue {
        titulo: titulo.into(),
        descricao: descricao.into(),
        tipo,
        latitude: at.lat,
        longitude: at.lng,
        foto_url: None,
    }
}

#[tokio::test]
async fn test_created_issue_appears_in_list_and_proximity() {
    let backend = Shared::default();
    let addr = spawn_backend(backend.clone()).await;
    let api = repository(addr, Some("token-abc")).await;

    let at = Coordinate::new(-26.3050, -48.8490);
    let created = api
        .create(&report(
            "Lixo acumulado",
            "Sacos de lixo acumulados na calçada",
            IssueType::Lixo,
            at,
        ))
        .await
        .unwrap();
    assert_eq!(created.status, IssueStatus::Aberta);
    assert_eq!(
        backend.last_auth.lock().unwrap().as_deref(),
        Some("Bearer token-abc")
    );

    let all = api.find_all().await.unwrap();
    assert!(all.iter().any(|i| i.id == created.id));

    let nearby = api
        .find_by_proximity(Coordinate::DEFAULT_CENTER, 5000)
        .await
        .unwrap();
    assert!(nearby.iter().any(|i| i.id == created.id));

    let far = api
        .find_by_proximity(Coordinate::new(-23.55, -46.63), 5000)
        .await
        .unwrap();
    assert!(far.is_empty());
}

#[tokio::test]
async fn test_create_without_token_is_unauthorized() {
    let backend = Shared::default();
    let addr = spawn_backend(backend).await;
    let api = repository(addr, None).await;

    let err = api
        .create(&report(
            "Poste apagado",
            "Poste apagado há uma semana",
            IssueType::Iluminacao,
            Coordinate::DEFAULT_CENTER,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized { .. }));
    assert_eq!(err.code(), ErrorCode::NotAuthenticated);
}

#[tokio::test]
async fn test_missing_issue_carries_status() {
    let backend = Shared::default();
    let addr = spawn_backend(backend).await;
    let api = repository(addr, None).await;

    let err = api.find_by_id(42).await.unwrap_err();
    assert_eq!(err.status(), Some(http::StatusCode::NOT_FOUND));
    assert_eq!(err.code(), ErrorCode::IssueNotFound);
    assert_eq!(err.body(), Some("Problema não encontrado"));

    let err = api.find_by_id_with_details(42).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::IssueNotFound);

    let err = api
        .update_status(42, IssueStatus::Resolvida)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::IssueNotFound);

    let err = api.remove_interaction(42, 1).await.unwrap_err();
    assert_eq!(err.status(), Some(http::StatusCode::NOT_FOUND));
    assert_eq!(err.code(), ErrorCode::InteractionNotFound);
}

#[tokio::test]
async fn test_similar_report_nearby_is_rejected() {
    let backend = Shared::default();
    let addr = spawn_backend(backend.clone()).await;
    let api = repository(addr, Some("token-abc")).await;
    let poste = report(
        "Poste apagado",
        "Poste apagado há uma semana",
        IssueType::Iluminacao,
        Coordinate::DEFAULT_CENTER,
    );
    api.create(&poste).await.unwrap();

    let err = api.create(&poste).await.unwrap_err();
    assert_eq!(err.status(), Some(http::StatusCode::CONFLICT));
    assert_eq!(err.code(), ErrorCode::SimilarIssueNearby);
    assert_eq!(
        err.server_message().as_deref(),
        Some("Já existe um problema semelhante a menos de 50 m")
    );
    assert_eq!(backend.issues.lock().unwrap().len(), 1);

    // another type at the same spot is fine
    let lixo = report(
        "Lixo acumulado",
        "Sacos de lixo acumulados na calçada",
        IssueType::Lixo,
        Coordinate::DEFAULT_CENTER,
    );
    api.create(&lixo).await.unwrap();
}

#[tokio::test]
async fn test_comment_requires_content_and_counts_on_refetch() {
    let backend = Shared::default();
    let addr = spawn_backend(backend.clone()).await;
    let api = repository(addr, Some("token-abc")).await;
    let created = api
        .create(&report(
            "Calçada quebrada",
            "Calçada quebrada em frente à escola",
            IssueType::CalcadaDanificada,
            Coordinate::DEFAULT_CENTER,
        ))
        .await
        .unwrap();

    let controller = IssuesMapController::new(api.clone());
    controller.set_view(Coordinate::DEFAULT_CENTER, 5000).await;

    let rejected = controller
        .add_interaction(created.id, InteractionType::Comentario, None)
        .await;
    assert!(!rejected.success);
    assert_eq!(rejected.code, Some(ErrorCode::CommentContentRequired));
    assert!(backend.interactions.lock().unwrap().is_empty());

    // a blank comment that skips the controller is refused by the backend
    let err = api
        .add_interaction(
            created.id,
            &NewInteraction {
                tipo: InteractionType::Comentario,
                conteudo: Some("  ".into()),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::CommentContentRequired);
    assert_eq!(err.status(), Some(http::StatusCode::BAD_REQUEST));

    let outcome = controller
        .add_interaction(
            created.id,
            InteractionType::Comentario,
            Some("Quase caí aqui ontem".into()),
        )
        .await;
    assert!(outcome.success);

    let state = controller.state().await;
    let listed = state.issues.iter().find(|i| i.id == created.id).unwrap();
    assert_eq!(listed.total_interacoes, 1);

    let interactions = api.find_interactions(created.id).await.unwrap();
    assert_eq!(interactions.len(), 1);
    assert_eq!(interactions[0].conteudo.as_deref(), Some("Quase caí aqui ontem"));

    api.remove_interaction(created.id, interactions[0].id)
        .await
        .unwrap();
    assert!(api.find_interactions(created.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_repeated_support_is_reported() {
    let backend = Shared::default();
    let addr = spawn_backend(backend).await;
    let api = repository(addr, Some("token-abc")).await;
    let created = api
        .create(&report(
            "Árvore caída",
            "Galho grande bloqueando a rua",
            IssueType::PodaArvore,
            Coordinate::DEFAULT_CENTER,
        ))
        .await
        .unwrap();

    let controller = IssuesMapController::new(api.clone());
    let first = controller
        .add_interaction(created.id, InteractionType::Apoio, None)
        .await;
    assert!(first.success);

    let second = controller
        .add_interaction(created.id, InteractionType::Apoio, None)
        .await;
    assert!(!second.success);
    assert_eq!(second.error.as_deref(), Some("Você já realizou esta ação"));
    assert_eq!(second.code, Some(ErrorCode::InteractionAlreadyExists));

    let missing = controller
        .add_interaction(999, InteractionType::Apoio, None)
        .await;
    assert_eq!(missing.code, Some(ErrorCode::IssueNotFound));
    assert_eq!(missing.error.as_deref(), Some("Problema não encontrado"));
}

#[tokio::test]
async fn test_proximity_failure_falls_back_silently() {
    let backend = Shared::default();
    let addr = spawn_backend(backend.clone()).await;
    let api = repository(addr, Some("token-abc")).await;
    api.create(&report(
        "Pichação no muro",
        "Pichação no muro da praça",
        IssueType::Pichacao,
        Coordinate::DEFAULT_CENTER,
    ))
    .await
    .unwrap();

    backend.proximity_fails.store(true, Ordering::SeqCst);
    let controller = IssuesMapController::new(api);
    controller.set_view(Coordinate::DEFAULT_CENTER, 5000).await;

    let state = controller.state().await;
    assert_eq!(state.issues.len(), 1);
    assert!(state.error.is_none());
    assert_eq!(backend.proximity_calls.load(Ordering::SeqCst), 1);
    assert_eq!(backend.all_calls.load(Ordering::SeqCst), 1);

    backend.all_fails.store(true, Ordering::SeqCst);
    controller.refetch().await;
    let state = controller.state().await;
    assert!(state.error.is_some());
    assert!(!state.is_loading);
}

#[tokio::test]
async fn test_status_update() {
    let backend = Shared::default();
    let addr = spawn_backend(backend).await;
    let api = repository(addr, Some("token-admin")).await;
    let created = api
        .create(&report(
            "Vazamento de água",
            "Cano estourado na esquina",
            IssueType::Vazamento,
            Coordinate::DEFAULT_CENTER,
        ))
        .await
        .unwrap();

    let updated = api
        .update_status(created.id, IssueStatus::EmAndamento)
        .await
        .unwrap();
    assert_eq!(updated.status, IssueStatus::EmAndamento);
    assert_eq!(
        api.find_by_id(created.id).await.unwrap().status,
        IssueStatus::EmAndamento
    );
}

#[tokio::test]
async fn test_tap_to_report_shows_pothole_marker() {
    let backend = Shared::default();
    let addr = spawn_backend(backend).await;
    let api = repository(addr, Some("token-abc")).await;

    let controller = Arc::new(IssuesMapController::new(api));
    let mut map = MapView::new(controller, MapOptions::default());
    let location =
        UserLocationProvider::new(Arc::new(UnsupportedLocation), LocationOptions::default());
    map.init(&location).await;
    assert_eq!(map.viewport().center, Coordinate::DEFAULT_CENTER);
    assert!(map.markers().is_empty());

    let tapped = Coordinate::new(-26.3030, -48.8470);
    let form = map.tap(tapped);
    form.titulo = "Buraco na rua X".into();
    form.descricao = "Buraco grande e perigoso perto da esquina".into();
    form.tipo = Some(IssueType::Buraco);

    let created = map.submit_form().await.unwrap().unwrap();
    assert_eq!(created.tipo, IssueType::Buraco);

    let marker = map
        .markers()
        .iter()
        .find(|m| m.issue_id == created.id)
        .expect("marker for the new issue");
    assert_eq!(marker.icon, "🕳️");
    assert_eq!(marker.position, tapped);
    assert_eq!(marker.title, "Buraco na rua X");
}
