use axum::{body::Bytes, extract::State, Extension, Json};
use bizprof_core::{BusinessProfileRecord, CrawlTarget};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_pipeline_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Default, Deserialize)]
pub(super) struct GenerateRequest {
    #[serde(default)]
    url: Option<String>,
}

impl GenerateRequest {
    /// Any body that is not a JSON object with a string `url` reads as empty.
    fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }
}

pub(super) async fn generate_profile(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Bytes,
) -> Result<Json<ApiResponse<BusinessProfileRecord>>, ApiError> {
    let request = GenerateRequest::from_body(&body);
    let Some(raw_url) = request.url.filter(|u| !u.is_empty()) else {
        return Err(ApiError::new(req_id.0, "validation_error", "Missing url"));
    };

    let target = CrawlTarget::parse(&raw_url)
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;

    tracing::info!(url = %target, request_id = %req_id.0, "profile requested");
    let record = state
        .pipeline
        .profile(&target)
        .await
        .map_err(|e| map_pipeline_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: record,
        meta: ResponseMeta::new(req_id.0),
    }))
}
