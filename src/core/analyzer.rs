use relay_core::models::media::AnalysisResult;
use relay_core::{Platform, RelayError};

use crate::core::normalizer;
use crate::core::url_parser;
use crate::platforms::MetadataExtractor;

/// classify -> extract -> normalize, one request at a time.
pub struct Analyzer {
    extractor: MetadataExtractor,
}

impl Analyzer {
    pub fn new(extractor: MetadataExtractor) -> Self {
        Self { extractor }
    }

    pub async fn analyze(
        &self,
        url: &str,
        platform_hint: Option<&str>,
    ) -> Result<AnalysisResult, RelayError> {
        let classified = url_parser::classify(url)?;

        if !classified.platform.is_supported() {
            tracing::info!("[analyze] unsupported url {}", url.trim());
            return Err(RelayError::UnsupportedPlatform(
                "Unsupported or invalid URL".to_string(),
            ));
        }

        if let Some(hint) = platform_hint.map(str::trim).filter(|h| !h.is_empty()) {
            let matches = hint
                .parse::<Platform>()
                .map(|p| p == classified.platform)
                .unwrap_or(false);
            if !matches {
                tracing::info!(
                    "[analyze] platform hint '{}' does not match {} for {}",
                    hint,
                    classified.platform,
                    classified.url
                );
                return Err(RelayError::UnsupportedPlatform(format!(
                    "URL is not a {} link",
                    hint
                )));
            }
        }

        let descriptor = self
            .extractor
            .extract(classified.platform, &classified.url)
            .await?;
        let result = normalizer::normalize(classified.platform, descriptor)?;

        tracing::info!(
            "[analyze] {} -> {} ({} variants)",
            classified.url,
            result.platform,
            result.downloads.len()
        );
        Ok(result)
    }
}
