/// Asset upload endpoint
///
/// `POST /v1/uploads` takes the raw image bytes as the body and answers
/// `{"url": "..."}`. The URL can then be stored as a workspace or project
/// image.

use crate::{app::AppState, error::ApiResult};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap},
    Extension, Json,
};
use parallel_shared::{auth::session::RequestContext, services::uploads};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub url: String,
}

pub async fn upload(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<UploadResponse>> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream");

    let url = uploads::upload_asset(
        state.uploader.as_ref(),
        &ctx,
        body,
        content_type,
        state.config.upload.max_bytes,
    )
    .await?;

    Ok(Json(UploadResponse { url }))
}
