//! HTTP 服务：提供原始文档与语音合成接口。
//!
//! # Server Module
//!
//! Two routes:
//!
//! | Route | Behaviour |
//! |-------|-----------|
//! | `GET /getFormat?format=KEY` | raw source for `KEY` with its content type |
//! | `POST /tts?format=KEY` | body is speech markup; responds with audio |
//!
//! `POST /tts` goes through the [`SynthesisCache`], so each cache key is
//! synthesized once and served from the store afterwards.

use crate::format::FormatKey;
use crate::ingest::SourceCatalog;
use crate::ssml::SpeechDocument;
use crate::synthesis::{SynthesisCache, SynthesisError};
use axum::{
    extract::{Query, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<SourceCatalog>,
    pub cache: Arc<SynthesisCache>,
}

impl AppState {
    pub fn new(catalog: SourceCatalog, cache: SynthesisCache) -> Self {
        Self {
            catalog: Arc::new(catalog),
            cache: Arc::new(cache),
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/getFormat", get(get_format))
        .route("/tts", post(text_to_speech))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Serve on an already-bound listener until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "speech server listening");
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

#[derive(Debug, Deserialize)]
struct FormatQuery {
    format: Option<String>,
}

impl FormatQuery {
    fn key(&self) -> Result<FormatKey, ApiError> {
        let raw = self
            .format
            .as_deref()
            .ok_or_else(|| ApiError::bad_request("missing 'format' query parameter"))?;
        raw.parse()
            .map_err(|e: crate::format::UnknownFormat| ApiError::bad_request(e.to_string()))
    }
}

async fn get_format(
    State(state): State<AppState>,
    Query(query): Query<FormatQuery>,
) -> Result<Response, ApiError> {
    let key = query.key()?;
    let source = state
        .catalog
        .get(key)
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, format!("no source for format '{}'", key)))?;
    debug!(format = %key, bytes = source.body.len(), "serving raw source");
    Ok(([(CONTENT_TYPE, source.kind.mime_type())], source.body.clone()).into_response())
}

async fn text_to_speech(
    State(state): State<AppState>,
    Query(query): Query<FormatQuery>,
    body: String,
) -> Result<Response, ApiError> {
    let key = query.key()?;
    // Validated only; the provider receives the body exactly as posted.
    SpeechDocument::parse(&body)
        .map_err(|e| ApiError::bad_request(format!("invalid speech markup: {}", e)))?;

    let audio = state.cache.synthesize(key, &body).await.map_err(|e| {
        warn!(format = %key, error = %e, "synthesis failed");
        ApiError::from(e)
    })?;
    let mime = state.cache.encoding().mime_type();
    Ok(([(CONTENT_TYPE, mime)], audio).into_response())
}

/// Error response rendered as `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl From<SynthesisError> for ApiError {
    fn from(e: SynthesisError) -> Self {
        let status = match &e {
            SynthesisError::Provider(_)
            | SynthesisError::ProviderStatus { .. }
            | SynthesisError::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
            SynthesisError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            SynthesisError::Cache(_) | SynthesisError::Configuration(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}
