//! Interface to the structured video-info provider used for YouTube.

use async_trait::async_trait;
use relay_core::RelayError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoInfo {
    pub id: String,
    pub title: Option<String>,
    pub author: Option<String>,
    pub thumbnail_url: Option<String>,
    pub formats: Vec<RawFormat>,
}

/// One rendition reported by the provider, playable with a plain GET.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFormat {
    pub format_id: String,
    pub quality_label: Option<String>,
    pub mime_type: Option<String>,
    pub url: String,
    pub height: Option<u32>,
    pub has_video: bool,
    pub has_audio: bool,
    /// Total bitrate in kbit/s.
    pub bitrate: Option<f64>,
    /// Headers the origin expects when fetching `url`.
    pub http_headers: Vec<(String, String)>,
}

#[async_trait]
pub trait VideoInfoProvider: Send + Sync {
    fn validate_url(&self, url: &str) -> bool;

    /// Resolves metadata and fresh rendition URLs. Never retried internally.
    async fn get_info(&self, url: &str) -> Result<VideoInfo, RelayError>;
}

impl VideoInfo {
    /// Best audio-only rendition, falling back to the best combined one.
    pub fn best_audio(&self) -> Option<&RawFormat> {
        self.formats
            .iter()
            .filter(|f| f.has_audio && !f.has_video)
            .max_by(|a, b| cmp_bitrate(a, b))
            .or_else(|| self.best_combined())
    }

    /// Highest combined audio+video rendition, falling back to video only.
    pub fn best_combined(&self) -> Option<&RawFormat> {
        self.formats
            .iter()
            .filter(|f| f.has_video && f.has_audio)
            .max_by(|a, b| cmp_quality(a, b))
            .or_else(|| {
                self.formats
                    .iter()
                    .filter(|f| f.has_video)
                    .max_by(|a, b| cmp_quality(a, b))
            })
    }

    /// Rendition carrying `label`, preferring one that also has audio.
    pub fn by_label(&self, label: &str) -> Option<&RawFormat> {
        let mut matching = self
            .formats
            .iter()
            .filter(|f| f.has_video && f.quality_label.as_deref() == Some(label));
        let first = matching.next()?;
        if first.has_audio {
            return Some(first);
        }
        Some(matching.find(|f| f.has_audio).unwrap_or(first))
    }
}

fn cmp_bitrate(a: &RawFormat, b: &RawFormat) -> std::cmp::Ordering {
    a.bitrate
        .unwrap_or(0.0)
        .total_cmp(&b.bitrate.unwrap_or(0.0))
}

fn cmp_quality(a: &RawFormat, b: &RawFormat) -> std::cmp::Ordering {
    a.height
        .unwrap_or(0)
        .cmp(&b.height.unwrap_or(0))
        .then_with(|| cmp_bitrate(a, b))
}
