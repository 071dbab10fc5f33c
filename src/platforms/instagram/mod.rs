use std::sync::Arc;

use async_trait::async_trait;
use relay_core::models::media::MediaDescriptor;
use relay_core::RelayError;

use crate::core::http_client::MediaFetcher;
use crate::core::scrape;
use crate::platforms::traits::PlatformExtractor;

pub struct InstagramExtractor {
    fetcher: Arc<dyn MediaFetcher>,
}

impl InstagramExtractor {
    pub fn new(fetcher: Arc<dyn MediaFetcher>) -> Self {
        Self { fetcher }
    }

    fn extract_post_id(url: &str) -> Option<String> {
        let parsed = url::Url::parse(url).ok()?;
        let segments: Vec<&str> = parsed.path().split('/').filter(|s| !s.is_empty()).collect();

        match segments.first() {
            Some(&"p") | Some(&"reel") | Some(&"reels") | Some(&"tv") => {
                segments.get(1).map(|s| s.to_string())
            }
            _ => None,
        }
    }
}

#[async_trait]
impl PlatformExtractor for InstagramExtractor {
    fn name(&self) -> &str {
        "instagram"
    }

    async fn extract(&self, url: &str) -> Result<MediaDescriptor, RelayError> {
        match Self::extract_post_id(url) {
            Some(id) => tracing::info!("[instagram] scraping post {}", id),
            None => tracing::info!("[instagram] scraping {}", url),
        }

        let descriptor = scrape::scrape_open_graph(self.fetcher.as_ref(), url).await?;
        tracing::debug!(
            "[instagram] video={} image={}",
            descriptor.video_url.is_some(),
            descriptor.image_url.is_some()
        );
        Ok(descriptor)
    }
}
