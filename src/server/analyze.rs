use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::Json;
use relay_core::models::media::{AnalysisResult, DownloadVariant, VariantKind};
use relay_core::{Platform, RelayError};
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeParams {
    pub url: Option<String>,
    pub platform: Option<String>,
}

/// Wire shape of an analysis: the result plus a proxy link per variant.
#[derive(Debug, Serialize)]
pub struct AnalysisView {
    pub platform: Platform,
    pub title: String,
    pub description: String,
    pub icon: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    pub downloads: Vec<VariantView>,
}

#[derive(Debug, Serialize)]
pub struct VariantView {
    pub label: String,
    pub icon: String,
    pub url: String,
    pub format: String,
    pub kind: VariantKind,
    pub download: String,
}

impl From<DownloadVariant> for VariantView {
    fn from(variant: DownloadVariant) -> Self {
        Self {
            download: variant.proxy_link(),
            format: variant.format.as_wire().to_string(),
            label: variant.label,
            icon: variant.icon,
            url: variant.url,
            kind: variant.kind,
        }
    }
}

impl From<AnalysisResult> for AnalysisView {
    fn from(result: AnalysisResult) -> Self {
        Self {
            platform: result.platform,
            title: result.title,
            description: result.description,
            icon: result.icon,
            thumbnail: result.thumbnail,
            downloads: result.downloads.into_iter().map(VariantView::from).collect(),
        }
    }
}

pub async fn analyze_post(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeParams>, JsonRejection>,
) -> Result<Json<AnalysisView>, ApiError> {
    let params = match payload {
        Ok(Json(params)) => params,
        Err(rejection) => {
            tracing::debug!("[http] unreadable analyze body: {}", rejection.body_text());
            AnalyzeParams::default()
        }
    };
    run(&state, params).await
}

pub async fn analyze_get(
    State(state): State<AppState>,
    Query(params): Query<AnalyzeParams>,
) -> Result<Json<AnalysisView>, ApiError> {
    run(&state, params).await
}

async fn run(state: &AppState, params: AnalyzeParams) -> Result<Json<AnalysisView>, ApiError> {
    let url = params
        .url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| RelayError::MissingInput("URL is required".to_string()))?;

    let result = state
        .analyzer
        .analyze(url, params.platform.as_deref())
        .await?;
    Ok(Json(result.into()))
}
