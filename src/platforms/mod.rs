use std::sync::Arc;

pub use relay_core::platforms::Platform;
use relay_core::models::media::MediaDescriptor;
use relay_core::models::settings::YoutubeStrategy;
use relay_core::RelayError;

use crate::core::http_client::MediaFetcher;
use crate::core::video_info::VideoInfoProvider;

pub mod instagram;
pub mod pinterest;
pub mod traits;
pub mod youtube;

use traits::PlatformExtractor;

/// Per-platform extraction, dispatched on the closed `Platform` enum.
pub struct MetadataExtractor {
    youtube: youtube::YouTubeExtractor,
    instagram: instagram::InstagramExtractor,
    pinterest: pinterest::PinterestExtractor,
}

impl MetadataExtractor {
    pub fn new(
        provider: Arc<dyn VideoInfoProvider>,
        fetcher: Arc<dyn MediaFetcher>,
        strategy: YoutubeStrategy,
    ) -> Self {
        Self {
            youtube: youtube::YouTubeExtractor::new(provider, strategy),
            instagram: instagram::InstagramExtractor::new(fetcher.clone()),
            pinterest: pinterest::PinterestExtractor::new(fetcher),
        }
    }

    pub async fn extract(&self, platform: Platform, url: &str) -> Result<MediaDescriptor, RelayError> {
        let extractor: &dyn PlatformExtractor = match platform {
            Platform::YouTube => &self.youtube,
            Platform::Instagram => &self.instagram,
            Platform::Pinterest => &self.pinterest,
            Platform::Unsupported => {
                return Err(RelayError::UnsupportedPlatform(
                    "Unsupported or invalid URL".to_string(),
                ))
            }
        };

        tracing::debug!("[extract] {} via {}", url, extractor.name());
        extractor.extract(url).await
    }
}
