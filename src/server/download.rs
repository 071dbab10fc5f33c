use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use relay_core::models::download::DownloadRequest;
use serde::Deserialize;

use super::{ApiError, AppState};
use crate::core::filename::build_content_disposition;

#[derive(Debug, Deserialize)]
pub struct DownloadParams {
    pub url: Option<String>,
    pub format: Option<String>,
}

pub async fn download(
    State(state): State<AppState>,
    Query(params): Query<DownloadParams>,
) -> Result<Response, ApiError> {
    let request = DownloadRequest::new(params.url.as_deref(), params.format.as_deref())?;
    let prepared = state.downloader.prepare(&request).await?;

    let mut response = (StatusCode::OK, Body::from_stream(prepared.body)).into_response();
    let headers = response.headers_mut();

    if let Ok(value) = HeaderValue::from_str(&build_content_disposition(&prepared.filename)) {
        headers.insert(CONTENT_DISPOSITION, value);
    }
    if let Ok(value) = HeaderValue::from_str(&prepared.content_type) {
        headers.insert(CONTENT_TYPE, value);
    }
    if let Some(length) = prepared.content_length {
        headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
    }

    Ok(response)
}
