mod check;
mod generate;

use std::{sync::Arc, time::Duration};

use axum::{
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use bizprof_scraper::ScraperError;
use bizprof_summarizer::{PipelineError, ProfilePipeline, SummarizerError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{
    enforce_rate_limit, request_id, RateLimitState, RequestId, REQUEST_ID_HEADER,
};

pub const INSUFFICIENT_CONTENT_MESSAGE: &str =
    "Could not extract enough content from the provided site.";

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ProfilePipeline>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
    /// Overrides the status derived from the error code.
    #[serde(skip)]
    status: Option<StatusCode>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
            status: None,
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status.unwrap_or(match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "validation_error" => StatusCode::BAD_REQUEST,
            "insufficient_content" => StatusCode::UNPROCESSABLE_ENTITY,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "upstream_error" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        });
        (status, Json(self)).into_response()
    }
}

/// Maps a failed profile run onto the API error taxonomy.
pub(super) fn map_pipeline_error(request_id: String, error: &PipelineError) -> ApiError {
    match error {
        PipelineError::Scraper(ScraperError::InsufficientContent { url }) => {
            tracing::info!(url = %url, "insufficient content");
            ApiError::new(request_id, "insufficient_content", INSUFFICIENT_CONTENT_MESSAGE)
        }
        PipelineError::Summarizer(SummarizerError::MissingApiKey) => {
            tracing::error!("summarizer credentials are not configured");
            ApiError::new(request_id, "missing_credentials", error.to_string())
        }
        PipelineError::Summarizer(SummarizerError::Upstream { status, body }) => {
            tracing::warn!(status, "summarizer upstream error");
            let api_error = ApiError::new(
                request_id,
                "upstream_error",
                format!("summarizer error: {status} {body}"),
            );
            match StatusCode::from_u16(*status) {
                Ok(code) => api_error.with_status(code),
                Err(_) => api_error,
            }
        }
        other => {
            tracing::error!(error = %other, "profile generation failed");
            ApiError::new(request_id, "internal_error", other.to_string())
        }
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
}

fn profile_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/generate", post(generate::generate_profile))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/check", get(check::check_summarizer));

    Router::new()
        .merge(public_routes)
        .merge(profile_router(rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id))
                .layer(TraceLayer::new_for_http()),
        )
        .with_state(state)
}

async fn health(Extension(req_id): Extension<RequestId>) -> impl IntoResponse {
    Json(ApiResponse {
        data: HealthData { status: "ok" },
        meta: ResponseMeta::new(req_id.0),
    })
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(30, Duration::from_secs(60))
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
