use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, State, rejection::BytesRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use decorai::{
    AppConfig, ConfigManager, DesignAdapter, Dispatcher, GoogleProvider, RequestEnvelope,
    types::ErrorBody,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub const GENERATE_PATH: &str = "/api/generate";

/// Request body cap. Room photos arrive base64-encoded inside the JSON envelope.
pub const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

// ---------------------------------------------------------------------------
// App state
// ---------------------------------------------------------------------------

pub struct AppState {
    pub dispatcher: Dispatcher,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            max_body_bytes: MAX_BODY_BYTES,
        }
    }

    pub fn with_body_limit(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    /// Build the Gemini-backed dispatcher described by `config`.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let Some(api_key) = config.resolve_api_key() else {
            anyhow::bail!(
                "No API key configured. Set GEMINI_API_KEY or run `decorai-proxy config --api-key <KEY>`."
            );
        };

        let provider = GoogleProvider::new(api_key, config.base_url());
        let adapter = DesignAdapter::new(Arc::new(provider), config.designer_config());
        Ok(Self::new(Dispatcher::new(adapter)))
    }
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = DefaultBodyLimit::max(state.max_body_bytes);
    Router::new()
        .route(GENERATE_PATH, post(generate).fallback(method_not_allowed))
        .layer(body_limit)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run_server(host: &str, port: u16, config: &ConfigManager) -> anyhow::Result<()> {
    let app_config = config.load()?;
    let state = Arc::new(AppState::from_config(&app_config)?);

    let designer = state.dispatcher.adapter().config();
    tracing::info!(
        text_model = %designer.text_model,
        image_model = %designer.image_model,
        base_url = %app_config.base_url(),
        "provider configured"
    );

    let app = router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("design proxy listening on {}{}", addr, GENERATE_PATH);

    axum::serve(listener, app).await?;

    Ok(())
}

// ---------------------------------------------------------------------------
// POST /api/generate
// ---------------------------------------------------------------------------

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}

fn server_error(message: impl std::fmt::Display) -> Response {
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Server error: {}", message),
    )
}

async fn generate(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let request_id = uuid::Uuid::new_v4();

    let body = match body {
        Ok(b) => b,
        Err(e) => {
            tracing::error!(%request_id, error = %e, "failed to read request body");
            return server_error(e.body_text());
        }
    };

    let envelope: RequestEnvelope = match serde_json::from_slice(&body) {
        Ok(e) => e,
        Err(e) => {
            tracing::error!(%request_id, error = %e, "request body is not a valid envelope");
            return server_error(e);
        }
    };

    // Detached so a dropped connection does not cancel the provider call.
    let task = tokio::spawn(handle(state, envelope, request_id));
    match task.await {
        Ok(resp) => resp,
        Err(e) => {
            tracing::error!(%request_id, error = %e, "dispatch task failed");
            server_error(e)
        }
    }
}

async fn handle(
    state: Arc<AppState>,
    envelope: RequestEnvelope,
    request_id: uuid::Uuid,
) -> Response {
    let action = envelope.action.clone();
    match state.dispatcher.dispatch(envelope).await {
        Ok(output) => {
            tracing::info!(%request_id, %action, "action completed");
            Json(output).into_response()
        }
        Err(e) if e.is_client_error() => {
            tracing::warn!(%request_id, %action, "rejected unknown action");
            error_response(StatusCode::BAD_REQUEST, e.to_string())
        }
        Err(e) => {
            tracing::error!(%request_id, %action, error = %e, "action failed");
            server_error(e)
        }
    }
}

async fn method_not_allowed() -> Response {
    error_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
}
