use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    serve, Json, Router,
};
use minijinja::{path_loader, Environment};
use minijinja_autoreload::AutoReloader;
use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::Arc,
};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::chat::ChatService;
use crate::config::ServerConfig;
use crate::constants;
use crate::error::ChatError;
use crate::wire::{ChatRequest, ChatResponse};

/// Where the server listens and what it serves from disk.
#[derive(Debug, Clone)]
pub struct WebSettings {
    pub port: u16,
    pub templates_dir: PathBuf,
    pub static_dir: PathBuf,
}

// Shared application state
#[derive(Clone)]
pub struct AppState {
    templates: Arc<AutoReloader>,
    chat: ChatService,
}

impl AppState {
    pub fn new(config: &ServerConfig, templates_dir: impl Into<PathBuf>) -> Self {
        Self {
            templates: Arc::new(create_minijinja_env(templates_dir.into())),
            chat: ChatService::new(config),
        }
    }
}

// Minijinja environment, reloaded whenever a template changes on disk
fn create_minijinja_env(templates_dir: PathBuf) -> AutoReloader {
    AutoReloader::new(move |notifier| {
        let mut env = Environment::new();
        env.set_loader(path_loader(&templates_dir));
        notifier.watch_path(&templates_dir, true);
        Ok(env)
    })
}

async fn index_handler(
    State(state): State<AppState>,
) -> Result<Html<String>, (StatusCode, Html<String>)> {
    state
        .templates
        .acquire_env()
        .and_then(|env| {
            env.get_template("index.html").and_then(|tmpl| {
                tmpl.render(minijinja::context! {
                    title => "AI Consultant Chat",
                })
            })
        })
        .map(Html)
        .map_err(|e| {
            error!("Failed to get or render template: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(format!("Internal Server Error: {}", e)),
            )
        })
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn chat_handler(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ChatError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(%rejection, "Rejected malformed chat request");
        ChatError::BadRequest(constants::INVALID_MESSAGES.to_string())
    })?;

    match state.chat.respond(&request).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            error!("Chat API error: {}", e);
            Err(e)
        }
    }
}

/// Build the application router. Exposed so tests can drive it in-process.
pub fn build_router(state: AppState, static_dir: &Path) -> Router {
    let static_files_service = ServeDir::new(static_dir).not_found_service(tower::service_fn(
        |_: axum::extract::Request| async {
            Ok::<_, std::convert::Infallible>((StatusCode::NOT_FOUND, "Not Found").into_response())
        },
    ));

    Router::new()
        .route("/", get(index_handler))
        .route("/api/health", get(health_handler))
        .route("/api/chat", post(chat_handler))
        .nest_service("/static", static_files_service)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn start_web_server(config: &ServerConfig, settings: WebSettings) -> Result<()> {
    let state = AppState::new(config, settings.templates_dir.clone());
    let app = build_router(state, &settings.static_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    info!("Web server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind to address {}", addr))?;

    serve(listener, app.into_make_service())
        .await
        .context("Web server failed")?;

    Ok(())
}
