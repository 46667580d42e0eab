use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::archive;
use crate::errors::ApiError;
use crate::service::BundleService;

/// Matches the original deployment's 2 MiB JSON body cap.
const BODY_LIMIT: usize = 2 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<BundleService>,
}

pub fn router(service: Arc<BundleService>, static_dir: &str) -> Router {
    Router::new()
        .route("/api/generate", post(generate))
        .route("/api/download", post(download))
        .fallback_service(ServeDir::new(static_dir))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { service })
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::InvalidInput(message) => {
                (StatusCode::BAD_REQUEST, json!({ "error": message }))
            }
            ApiError::Config(detail) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": format!("server misconfigured: {detail}") }),
            ),
            ApiError::UpstreamUnavailable(detail) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "upstream or server error", "detail": detail }),
            ),
            ApiError::Upstream { status, body } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": "upstream or server error",
                    "detail": { "status": status, "body": body },
                }),
            ),
            ApiError::InvalidModelOutput { preview } => (
                StatusCode::BAD_GATEWAY,
                json!({
                    "error": "model response not valid JSON",
                    "model_text_preview": preview,
                }),
            ),
            ApiError::MissingMarkup { keys } => (
                StatusCode::BAD_GATEWAY,
                json!({ "error": "generated bundle missing index.html", "keys": keys }),
            ),
            ApiError::Archive(detail) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "failed to create zip", "detail": detail }),
            ),
        };
        (status, Json(body)).into_response()
    }
}

async fn generate(State(state): State<AppState>, Json(body): Json<Value>) -> Response {
    let Some(prompt) = body.get("prompt").and_then(Value::as_str) else {
        return ApiError::InvalidInput("missing prompt string in request body".into())
            .into_response();
    };

    let request_id = Uuid::new_v4();
    tracing::info!(%request_id, prompt_chars = prompt.chars().count(), "generate request");

    match state.service.generate(prompt).await {
        Ok(bundle) => Json(json!({
            "files": {
                "index.html": bundle.markup,
                "styles.css": bundle.stylesheet,
                "script.js": bundle.script,
            }
        }))
        .into_response(),
        Err(err) => {
            tracing::warn!(%request_id, error = %err, "generate failed");
            err.into_response()
        }
    }
}

async fn download(Json(body): Json<Value>) -> Response {
    let Some(files) = body.get("files").and_then(Value::as_object) else {
        return ApiError::InvalidInput("missing files object in body".into()).into_response();
    };

    match archive::build_zip(files) {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, "application/zip"),
                (header::CONTENT_DISPOSITION, "attachment; filename=site.zip"),
            ],
            bytes,
        )
            .into_response(),
        Err(err) => {
            tracing::error!(error = %err, "archive construction failed");
            ApiError::from(err).into_response()
        }
    }
}
