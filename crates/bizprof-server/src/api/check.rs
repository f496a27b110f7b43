use axum::{extract::State, Extension, Json};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub(super) struct CheckData {
    pub has_key: bool,
    pub model: String,
}

/// Reports whether a summarizer credential is configured, never the key itself.
pub(super) async fn check_summarizer(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<CheckData>> {
    let summarizer = state.pipeline.summarizer();
    Json(ApiResponse {
        data: CheckData {
            has_key: summarizer.has_key(),
            model: summarizer.model().to_string(),
        },
        meta: ResponseMeta::new(req_id.0),
    })
}
