//! HTTP routes and handlers for the redline daemon API.

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, DefaultBodyLimit, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use redline_core::{
    compare, extract_text, ClassifiedChange, ComparisonResult, DiffOp, DocumentFormat,
    RedlineError,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::state::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let body_limit = state.limits.max_body_bytes;

    Router::new()
        .route("/health", get(health))
        .route("/compare", post(compare_texts))
        .route("/categorize", post(categorize))
        .route("/extract", post(extract))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

// =============================================================================
// Errors
// =============================================================================

/// Error response: `{"error": "..."}` with a status code.
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    fn bad_request(message: impl ToString) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.to_string(),
        }
    }

    fn internal(message: impl ToString) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.to_string(),
        }
    }
}

impl From<RedlineError> for ApiError {
    fn from(err: RedlineError) -> Self {
        if err.is_client_error() {
            Self::bad_request(err)
        } else {
            Self::internal(err)
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, "{}", self.message);
        } else {
            tracing::debug!(status = %self.status, "{}", self.message);
        }
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

// =============================================================================
// Health
// =============================================================================

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "redline-daemon",
        "version": env!("CARGO_PKG_VERSION"),
        "classifier": state.classifier_name(),
        "uptimeSeconds": state.uptime_seconds(),
    }))
}

// =============================================================================
// Compare
// =============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompareRequest {
    original_text: Option<String>,
    revised_text: Option<String>,
}

fn check_length(text: &str, max_length: usize) -> Result<(), RedlineError> {
    let length = text.chars().count();
    if length > max_length {
        return Err(RedlineError::InputTooLarge { length, max_length });
    }
    Ok(())
}

async fn compare_texts(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CompareRequest>, JsonRejection>,
) -> Result<Json<ComparisonResult>, ApiError> {
    let start = Instant::now();
    let Json(request) = payload?;

    let original = request
        .original_text
        .ok_or(RedlineError::MissingField("originalText"))?;
    let revised = request
        .revised_text
        .ok_or(RedlineError::MissingField("revisedText"))?;
    check_length(&original, state.limits.max_input_chars)?;
    check_length(&revised, state.limits.max_input_chars)?;

    let result = tokio::task::spawn_blocking(move || compare(&original, &revised))
        .await
        .map_err(|e| ApiError::internal(format!("comparison task failed: {}", e)))?;

    tracing::debug!(
        changes = result.stats.total_changes,
        duration_ms = start.elapsed().as_millis() as u64,
        "compare request served"
    );
    Ok(Json(result))
}

// =============================================================================
// Categorize
// =============================================================================

#[derive(Deserialize)]
struct CategorizeRequest {
    changes: Option<Vec<DiffOp>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CategorizeResponse {
    categorized_changes: Vec<ClassifiedChange>,
}

async fn categorize(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CategorizeRequest>, JsonRejection>,
) -> Result<Json<CategorizeResponse>, ApiError> {
    let Json(request) = payload?;
    let changes = request
        .changes
        .ok_or(RedlineError::MissingField("changes"))?;

    let categorized_changes = state.classifier.classify(&changes).await;
    Ok(Json(CategorizeResponse {
        categorized_changes,
    }))
}

// =============================================================================
// Extract
// =============================================================================

#[derive(Deserialize)]
struct ExtractParams {
    format: Option<String>,
}

#[derive(Serialize)]
struct ExtractResponse {
    text: String,
}

async fn extract(
    Query(params): Query<ExtractParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ExtractResponse>, ApiError> {
    // Query parameter wins over the Content-Type header.
    let declared = params.format.or_else(|| {
        headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    });
    let Some(declared) = declared else {
        return Err(ApiError::bad_request(
            "Missing document format: pass ?format=docx or ?format=txt",
        ));
    };
    let format: DocumentFormat = declared.parse()?;

    let text = tokio::task::spawn_blocking(move || extract_text(&body, format))
        .await
        .map_err(|e| ApiError::internal(format!("extraction task failed: {}", e)))??;

    Ok(Json(ExtractResponse { text }))
}
