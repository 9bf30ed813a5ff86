//! Subcommand implementations

use crate::{Cli, Command};
use anyhow::{Context as _, bail};
use pracas_client::issue::submit_error_message;
use pracas_client::{
    ClientConfig, ClientError, Coordinate, FixedLocation, InteractionType, IssueApi, IssueCard,
    IssueFormModal, IssuesMapController, LocationOptions, LocationSource, MapOptions, MapView,
    SessionHandle, UnsupportedLocation, UserLocationProvider,
};
use serde_json::json;
use shared::{ErrorCode, Issue, IssueStatus, IssueType};
use std::path::PathBuf;
use std::sync::Arc;

struct Context {
    config: ClientConfig,
    session: SessionHandle,
    api: Arc<dyn IssueApi>,
    json: bool,
}

impl Context {
    fn new(cli: &Cli, mut config: ClientConfig) -> anyhow::Result<Self> {
        if let Some(url) = &cli.api_url {
            config.base_url = url.clone();
        }
        if let Some(token) = &cli.token {
            config.token = Some(token.clone());
        }
        let session = config.session();
        let repo = config
            .build_repository(session.clone())
            .context("invalid client configuration")?;
        Ok(Self {
            config,
            session,
            api: Arc::new(repo),
            json: cli.json,
        })
    }

    fn controller(&self) -> Arc<IssuesMapController> {
        Arc::new(IssuesMapController::new(Arc::clone(&self.api)))
    }

    fn location(&self) -> UserLocationProvider {
        let source: Arc<dyn LocationSource> = match self.config.device_position {
            Some(position) => Arc::new(FixedLocation(position)),
            None => Arc::new(UnsupportedLocation),
        };
        UserLocationProvider::new(
            source,
            LocationOptions {
                timeout: self.config.geolocation_timeout(),
                ..LocationOptions::default()
            },
        )
    }

    /// Explicit `--lat/--lng`, otherwise the device position or its fallback
    async fn position(&self, lat: Option<f64>, lng: Option<f64>) -> anyhow::Result<Coordinate> {
        match (lat, lng) {
            (Some(lat), Some(lng)) => Coordinate::checked(lat, lng)
                .with_context(|| format!("coordenada inválida: {lat}, {lng}")),
            (None, None) => {
                let snapshot = self.location().acquire().await;
                if let Some(error) = &snapshot.error {
                    eprintln!("aviso: {error}. Usando localização padrão.");
                }
                Ok(snapshot.position.unwrap_or(Coordinate::DEFAULT_CENTER))
            }
            _ => bail!("informe --lat e --lng juntos"),
        }
    }

    fn print_json(&self, value: &impl serde::Serialize) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    fn print_issues(&self, issues: &[Issue]) -> anyhow::Result<()> {
        if self.json {
            return self.print_json(&issues);
        }
        if issues.is_empty() {
            println!("Nenhum problema encontrado.");
        }
        for issue in issues {
            println!("{}", issue_line(issue));
        }
        Ok(())
    }

    fn print_issue(&self, issue: &Issue) -> anyhow::Result<()> {
        if self.json {
            return self.print_json(issue);
        }
        println!("{}", issue_line(issue));
        Ok(())
    }
}

fn issue_line(issue: &Issue) -> String {
    let tipo = issue.tipo.display();
    format!(
        "{} #{} {} · {} · {} · 👍 {}",
        tipo.icon,
        issue.id,
        issue.titulo,
        tipo.label,
        issue.status.display().label,
        issue.total_apoios
    )
}

/// Client error as shown to the user
fn describe(err: &ClientError) -> String {
    match err.code() {
        ErrorCode::IssueNotFound | ErrorCode::NotFound => "Problema não encontrado".to_string(),
        ErrorCode::InteractionNotFound => "Interação não encontrada".to_string(),
        ErrorCode::NotAuthenticated => "Você precisa estar logado".to_string(),
        code => err
            .server_message()
            .unwrap_or_else(|| format!("{err} [{code}]")),
    }
}

pub async fn run(cli: Cli, config: ClientConfig) -> anyhow::Result<()> {
    let ctx = Context::new(&cli, config)?;
    tracing::debug!(base_url = %ctx.config.base_url, command = ?cli.command, "running command");

    match cli.command {
        Command::List => {
            let issues = ctx.api.find_all().await.map_err(|e| anyhow::anyhow!(describe(&e)))?;
            ctx.print_issues(&issues)
        }
        Command::Nearby { lat, lng, radius } => {
            let center = ctx.position(lat, lng).await?;
            let radius = radius.unwrap_or(ctx.config.radius_meters);
            let controller = ctx.controller();
            controller.set_view(center, radius).await;
            let state = controller.state().await;
            if let Some(error) = state.error {
                bail!(error);
            }
            ctx.print_issues(&state.issues)
        }
        Command::Show { id } => show(&ctx, id).await,
        Command::Report {
            titulo,
            descricao,
            tipo,
            lat,
            lng,
            foto,
        } => report(&ctx, titulo, descricao, tipo, (lat, lng), foto).await,
        Command::Support { id } => interact(&ctx, id, InteractionType::Apoio, None).await,
        Command::Comment { id, texto } => {
            interact(&ctx, id, InteractionType::Comentario, Some(texto)).await
        }
        Command::Interactions { id } => {
            let interactions = ctx
                .api
                .find_interactions(id)
                .await
                .map_err(|e| anyhow::anyhow!(describe(&e)))?;
            if ctx.json {
                return ctx.print_json(&interactions);
            }
            if interactions.is_empty() {
                println!("Nenhuma interação.");
            }
            for i in &interactions {
                let who = i.usuario_nome.as_deref().unwrap_or("Anônimo");
                match &i.conteudo {
                    Some(text) => println!("{} #{} {}: {}", i.tipo.icon(), i.id, who, text),
                    None => println!("{} #{} {} ({})", i.tipo.icon(), i.id, who, i.tipo.label()),
                }
            }
            Ok(())
        }
        Command::Uncomment { id, interaction_id } => {
            ctx.api
                .remove_interaction(id, interaction_id)
                .await
                .map_err(|e| anyhow::anyhow!(describe(&e)))?;
            if ctx.json {
                return ctx.print_json(&json!({ "removed": interaction_id }));
            }
            println!("Interação #{interaction_id} removida.");
            Ok(())
        }
        Command::Status { id, status } => update_status(&ctx, id, status).await,
        Command::Map { link } => map(&ctx, link.as_deref()).await,
        Command::Whoami => whoami(&ctx).await,
        Command::Types => types(&ctx),
    }
}

async fn show(ctx: &Context, id: i64) -> anyhow::Result<()> {
    let detail = ctx
        .api
        .find_by_id_with_details(id)
        .await
        .map_err(|e| anyhow::anyhow!(describe(&e)))?;
    if ctx.json {
        return ctx.print_json(&detail);
    }
    let mut card = IssueCard::detailed(detail);
    if let Some(origin) = ctx.config.device_position {
        card = card.with_distance_from(origin);
    }
    for line in card.render() {
        println!("{line}");
    }
    Ok(())
}

async fn report(
    ctx: &Context,
    titulo: String,
    descricao: String,
    tipo: IssueType,
    (lat, lng): (Option<f64>, Option<f64>),
    foto: Option<PathBuf>,
) -> anyhow::Result<()> {
    let position = ctx.position(lat, lng).await?;
    let mut form = IssueFormModal::new(position);
    form.titulo = titulo;
    form.descricao = descricao;
    form.tipo = Some(tipo);

    if let Some(path) = foto {
        form.attach_photo_path(&path)
            .await
            .map_err(|e| anyhow::anyhow!(e.message))?;
        if let Some(photo) = form.photo() {
            eprintln!(
                "aviso: foto {} ({} bytes) não será enviada ao servidor",
                photo.file_name(),
                photo.size()
            );
        }
    }

    match form.submit(ctx.api.as_ref()).await {
        Ok(created) => {
            if !ctx.json {
                println!("Problema registrado em {position}.");
            }
            ctx.print_issue(&created)
        }
        Err(ClientError::Validation(errors)) => {
            for (field, message) in errors.iter() {
                eprintln!("  {field}: {message}");
            }
            bail!("dados inválidos")
        }
        Err(e) => {
            let message = form
                .submit_error()
                .map(str::to_string)
                .unwrap_or_else(|| submit_error_message(&e));
            bail!(message)
        }
    }
}

async fn interact(
    ctx: &Context,
    id: i64,
    tipo: InteractionType,
    conteudo: Option<String>,
) -> anyhow::Result<()> {
    let controller = ctx.controller();
    let outcome = controller.add_interaction(id, tipo, conteudo).await;
    if let Some(error) = outcome.error {
        bail!(error);
    }

    let updated = controller
        .state()
        .await
        .issues
        .into_iter()
        .find(|i| i.id == id);
    if ctx.json {
        return ctx.print_json(&json!({ "success": outcome.success, "issue": updated }));
    }
    println!("{} registrado.", tipo.label());
    if let Some(issue) = updated {
        println!("{}", issue_line(&issue));
    }
    Ok(())
}

async fn update_status(ctx: &Context, id: i64, status: IssueStatus) -> anyhow::Result<()> {
    let updated = ctx
        .api
        .update_status(id, status)
        .await
        .map_err(|e| anyhow::anyhow!(describe(&e)))?;
    ctx.print_issue(&updated)
}

async fn map(ctx: &Context, link: Option<&str>) -> anyhow::Result<()> {
    let mut view = MapView::new(
        ctx.controller(),
        MapOptions {
            radius_meters: ctx.config.radius_meters,
            ..MapOptions::default()
        },
    );
    view.init(&ctx.location()).await;

    let remaining_link = match link {
        Some(link) => view
            .apply_deep_link(link)
            .await
            .with_context(|| format!("link inválido: {link}"))?,
        None => None,
    };

    let viewport = view.viewport();
    if ctx.json {
        let markers: Vec<_> = view
            .markers()
            .iter()
            .map(|m| {
                json!({
                    "issueId": m.issue_id,
                    "latitude": m.position.lat,
                    "longitude": m.position.lng,
                    "icon": m.icon,
                    "color": m.color,
                    "title": m.title,
                })
            })
            .collect();
        return ctx.print_json(&json!({
            "center": viewport.center,
            "zoom": viewport.zoom,
            "userPosition": view.user_position(),
            "notice": view.notice().map(|n| n.message.clone()),
            "markers": markers,
            "card": view.card().map(|c| c.render()),
            "link": remaining_link,
        }));
    }

    println!("Centro: {} (zoom {})", viewport.center, viewport.zoom);
    if let Some(link) = &remaining_link {
        println!("Link: {link}");
    }
    if let Some(notice) = view.notice() {
        println!("! {}", notice.message);
    }
    if view.markers().is_empty() {
        println!("Nenhum problema nesta região.");
    }
    for marker in view.markers() {
        println!(
            "{} #{} {} ({})",
            marker.icon, marker.issue_id, marker.title, marker.position
        );
    }
    if let Some(card) = view.card() {
        println!();
        for line in card.render() {
            println!("{line}");
        }
    }
    Ok(())
}

async fn whoami(ctx: &Context) -> anyhow::Result<()> {
    let session = ctx.session.read().await;
    if !session.is_authenticated() {
        bail!("não autenticado");
    }
    let claims = session.claims().map_err(|e| anyhow::anyhow!(e.message))?;
    let role = claims.role();
    let expired = claims.is_expired(chrono::Utc::now());

    if ctx.json {
        return ctx.print_json(&json!({
            "name": claims.display_name(),
            "role": role.label(),
            "expired": expired,
        }));
    }
    println!(
        "{} ({})",
        claims.display_name().unwrap_or("Usuário"),
        role.label()
    );
    if expired {
        println!("! sessão expirada");
    }
    Ok(())
}

fn types(ctx: &Context) -> anyhow::Result<()> {
    if ctx.json {
        let tipos: Vec<_> = IssueType::ALL
            .iter()
            .map(|t| {
                let d = t.display();
                json!({ "tipo": t, "label": d.label, "icon": d.icon, "color": d.color })
            })
            .collect();
        let statuses: Vec<_> = IssueStatus::ALL
            .iter()
            .map(|s| json!({ "status": s, "label": s.display().label }))
            .collect();
        return ctx.print_json(&json!({ "tipos": tipos, "status": statuses }));
    }

    println!("Tipos:");
    for tipo in IssueType::ALL {
        let d = tipo.display();
        println!("  {} {:<20} {}", d.icon, tipo.as_str(), d.label);
    }
    println!("Status:");
    for status in IssueStatus::ALL {
        println!("  {:<20} {}", status.as_str(), status.display().label);
    }
    Ok(())
}
