//! HTTP surface: `/analyze`, `/download` and a plain health route.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use relay_core::models::settings::ServerConfig;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::core::analyzer::Analyzer;
use crate::core::http_client::{HttpFetcher, MediaFetcher};
use crate::core::proxy::ProxyDownloader;
use crate::core::video_info::VideoInfoProvider;
use crate::core::ytdlp::YtDlpProvider;
use crate::platforms::MetadataExtractor;

pub mod analyze;
pub mod download;
pub mod error;

pub use error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    pub downloader: Arc<ProxyDownloader>,
}

impl AppState {
    /// Wires the production collaborators: yt-dlp and a shared reqwest client.
    pub fn new(config: &ServerConfig) -> Self {
        let provider: Arc<dyn VideoInfoProvider> = Arc::new(YtDlpProvider::new(config));
        let fetcher: Arc<dyn MediaFetcher> = Arc::new(HttpFetcher::new(config));
        Self::with_collaborators(config, provider, fetcher)
    }

    pub fn with_collaborators(
        config: &ServerConfig,
        provider: Arc<dyn VideoInfoProvider>,
        fetcher: Arc<dyn MediaFetcher>,
    ) -> Self {
        let extractor =
            MetadataExtractor::new(provider.clone(), fetcher.clone(), config.youtube_strategy);
        Self {
            analyzer: Arc::new(Analyzer::new(extractor)),
            downloader: Arc::new(ProxyDownloader::new(provider, fetcher)),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/analyze", get(analyze::analyze_get).post(analyze::analyze_post))
        .route("/download", get(download::download))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

async fn index() -> &'static str {
    "media-relay is running"
}
