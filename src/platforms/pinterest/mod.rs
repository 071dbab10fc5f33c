use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use relay_core::models::media::MediaDescriptor;
use relay_core::RelayError;

use crate::core::http_client::MediaFetcher;
use crate::core::scrape;
use crate::platforms::traits::PlatformExtractor;

static PIN_NOT_FOUND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""__typename"\s*:\s*"PinNotFound""#).unwrap());

pub struct PinterestExtractor {
    fetcher: Arc<dyn MediaFetcher>,
}

impl PinterestExtractor {
    pub fn new(fetcher: Arc<dyn MediaFetcher>) -> Self {
        Self { fetcher }
    }

    fn extract_pin_id(url: &str) -> Option<String> {
        let parsed = url::Url::parse(url).ok()?;
        let segments: Vec<&str> = parsed.path().split('/').filter(|s| !s.is_empty()).collect();

        if segments.first() != Some(&"pin") {
            return None;
        }

        let raw_id = segments.get(1)?;
        if raw_id.contains("--") {
            return raw_id.split("--").last().map(|s| s.to_string());
        }
        Some(raw_id.to_string())
    }

    fn is_short_link(url: &str) -> bool {
        url::Url::parse(url)
            .ok()
            .and_then(|parsed| parsed.host_str().map(|h| h == "pin.it"))
            .unwrap_or(false)
    }

    fn check_pin_not_found(html: &str) -> bool {
        PIN_NOT_FOUND_RE.is_match(html)
    }
}

#[async_trait]
impl PlatformExtractor for PinterestExtractor {
    fn name(&self) -> &str {
        "pinterest"
    }

    async fn extract(&self, url: &str) -> Result<MediaDescriptor, RelayError> {
        if Self::is_short_link(url) {
            tracing::info!("[pinterest] following short link {}", url);
        } else if let Some(id) = Self::extract_pin_id(url) {
            tracing::info!("[pinterest] scraping pin {}", id);
        }

        // Short links redirect to the pin page; the fetch follows them.
        let html = self.fetcher.fetch_page(url).await?;

        if Self::check_pin_not_found(&html) {
            return Err(RelayError::NoMediaFound(url.to_string()));
        }

        scrape::descriptor_from_html(url, &html)
    }
}
