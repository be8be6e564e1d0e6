//! HTTP routes over [`MixerService`].
//!
//! Paths keep their trailing slash. Reads return JSON; successful writes
//! return 200 with an empty body.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use mixctl::{CardMap, Control, MixerError, MixerService};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

/// Value of the `Server` header on every response.
pub const SERVER_NAME: &str = "ALSA Mixer webserver";

/// Shared state for web handlers
#[derive(Clone)]
pub struct WebState {
    pub service: Arc<MixerService>,
}

impl WebState {
    pub fn new(service: MixerService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

pub fn router(state: WebState) -> Router {
    Router::new()
        .route("/cards/", get(list_cards))
        .route("/card/", get(selected_card).delete(clear_card))
        .route("/card/{id}/", put(select_card))
        .route("/controls/", get(list_controls))
        .route("/equalizer/", get(list_equalizer))
        .route("/control/{id}/{status}/", put(set_switch))
        .route("/source/{id}/{item}/", put(set_source))
        .route("/volume/{id}/{*levels}", put(set_volume))
        .route("/equalizer/{id}/{*levels}", put(set_equalizer))
        .route("/health", get(health))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            header::SERVER,
            HeaderValue::from_static(SERVER_NAME),
        ))
        .with_state(state)
}

/// A [`MixerError`] rendered as a plain-text HTTP error.
#[derive(Debug)]
pub struct ApiError(pub MixerError);

impl From<MixerError> for ApiError {
    fn from(error: MixerError) -> Self {
        Self(error)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            MixerError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            MixerError::NotFound { .. } => StatusCode::NOT_FOUND,
            MixerError::ScopeMismatch { .. } => StatusCode::CONFLICT,
            MixerError::Invoke(_) | MixerError::CommandFailed { .. } => StatusCode::BAD_GATEWAY,
            MixerError::Registry { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.0.is_client_error() {
            debug!(%status, error = %self.0, "rejected request");
        } else {
            warn!(%status, error = %self.0, "mixer operation failed");
        }
        (status, self.0.to_string()).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

async fn list_cards(State(state): State<WebState>) -> ApiResult<Json<CardMap>> {
    Ok(Json(state.service.cards().await?))
}

async fn selected_card(State(state): State<WebState>) -> Json<Option<u32>> {
    Json(state.service.selected_card().await)
}

async fn select_card(State(state): State<WebState>, Path(id): Path<u32>) -> StatusCode {
    state.service.select_card(id).await;
    StatusCode::OK
}

async fn clear_card(State(state): State<WebState>) -> StatusCode {
    state.service.clear_card().await;
    StatusCode::OK
}

async fn list_controls(State(state): State<WebState>) -> Json<Vec<Control>> {
    Json(state.service.controls().await)
}

async fn list_equalizer(State(state): State<WebState>) -> Json<Vec<Control>> {
    Json(state.service.equalizer().await)
}

async fn set_switch(
    State(state): State<WebState>,
    Path((id, status)): Path<(i64, i64)>,
) -> ApiResult<StatusCode> {
    state.service.set_switch(id, status).await?;
    Ok(StatusCode::OK)
}

async fn set_source(
    State(state): State<WebState>,
    Path((id, item)): Path<(i64, i64)>,
) -> ApiResult<StatusCode> {
    state.service.set_source(id, item).await?;
    Ok(StatusCode::OK)
}

async fn set_volume(
    State(state): State<WebState>,
    Path((id, levels)): Path<(i64, String)>,
) -> ApiResult<StatusCode> {
    state.service.set_volume(id, &split_levels(&levels)).await?;
    Ok(StatusCode::OK)
}

async fn set_equalizer(
    State(state): State<WebState>,
    Path((id, levels)): Path<(i64, String)>,
) -> ApiResult<StatusCode> {
    state.service.set_equalizer(id, &split_levels(&levels)).await?;
    Ok(StatusCode::OK)
}

async fn health(State(state): State<WebState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "persist": state.service.persists(),
    }))
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// `10/20/` → `["10", "20", ""]`. Filtering happens in the service.
fn split_levels(levels: &str) -> Vec<String> {
    levels
        .trim_start_matches('/')
        .split('/')
        .map(str::to_string)
        .collect()
}
