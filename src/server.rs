use std::sync::Arc;
use std::time::Duration;

use axum::{
    Form, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::AppState;
use crate::chat::{ChatApi, HttpChatApi};
use crate::config::AppConfig;
use crate::ui::Renderer;
use crate::widget::{SubmitOutcome, WidgetStore};

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    info!(
        name: "chat.config.loaded",
        endpoint = %config.chat.endpoint,
        overlap_policy = ?config.widget.overlap_policy,
        "Chat endpoint configured"
    );

    let api: Arc<dyn ChatApi> = Arc::new(HttpChatApi::new(config.chat.endpoint.clone()));
    let state = build_state(Arc::clone(&config), api)?;

    let _sweeper = state.widgets.spawn_sweeper(
        Duration::from_secs(config.widget.sweep_interval_secs),
        Duration::from_secs(config.widget.idle_timeout_secs),
    );

    let app = router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

/// Assemble shared state around a chat client.
pub fn build_state(config: Arc<AppConfig>, api: Arc<dyn ChatApi>) -> anyhow::Result<AppState> {
    let renderer = Renderer::new(config.page_settings())?;
    let widgets = WidgetStore::new(api, config.widget_settings());
    Ok(AppState {
        widgets,
        renderer: Arc::new(renderer),
        config,
    })
}

/// Build the router.
pub fn router(state: AppState) -> Router {
    let static_dir = state.config.server.static_dir.clone();

    Router::new()
        .route("/", get(index_handler))
        .route(
            "/widget/{id}/messages",
            get(api_get_messages).post(api_submit),
        )
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// HTML Page Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET / - New widget page.
async fn index_handler(State(state): State<AppState>) -> Result<Html<String>, (StatusCode, String)> {
    let widget = state.widgets.create().await;
    tracing::debug!(widget_id = %widget.id(), "Created widget for page load");

    let snapshot = widget.snapshot().await;
    state.renderer.page(&snapshot).map(Html).map_err(render_failed)
}

// ─────────────────────────────────────────────────────────────────────────────
// Widget Fragment Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Form body posted by the widget.
#[derive(Debug, Deserialize)]
struct SubmitForm {
    /// Text typed by the user.
    #[serde(default)]
    message: String,
}

/// GET /widget/{id}/messages - Message list fragment with the current draft.
async fn api_get_messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, (StatusCode, String)> {
    let Some(widget) = state.widgets.get(&id).await else {
        return Err(widget_not_found(&id));
    };

    let snapshot = widget.snapshot().await;
    state.renderer.update(&snapshot).map(Html).map_err(render_failed)
}

/// POST /widget/{id}/messages - Submit and return the updated list.
///
/// A rejected overlapping submit answers 409 with the unchanged list and the
/// text restored as the draft; the page is configured to swap 409s so the
/// optimistic bubble is replaced.
async fn api_submit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<SubmitForm>,
) -> Result<Response, (StatusCode, String)> {
    let Some(widget) = state.widgets.get(&id).await else {
        return Err(widget_not_found(&id));
    };

    tracing::info!(
        widget_id = %id,
        message_length = form.message.len(),
        "Received submit"
    );

    let outcome = widget.submit(&form.message).await;
    let status = match outcome {
        SubmitOutcome::Busy => StatusCode::CONFLICT,
        SubmitOutcome::Ignored
        | SubmitOutcome::Replied
        | SubmitOutcome::Failed
        | SubmitOutcome::Superseded => StatusCode::OK,
    };

    let snapshot = widget.snapshot().await;
    let html = state.renderer.update(&snapshot).map_err(render_failed)?;
    Ok((status, Html(html)).into_response())
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn widget_not_found(id: &str) -> (StatusCode, String) {
    tracing::debug!(widget_id = %id, "Widget not found");
    (StatusCode::NOT_FOUND, "Widget not found".to_string())
}

fn render_failed(e: crate::ui::RenderError) -> (StatusCode, String) {
    tracing::error!(error = %e, "Failed to render widget");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Failed to render widget".to_string(),
    )
}
