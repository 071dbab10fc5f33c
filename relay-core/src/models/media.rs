use serde::{Deserialize, Serialize};

use crate::models::download::FormatToken;
use crate::platforms::Platform;

/// Raw, platform-specific extraction result before normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaDescriptor {
    /// The canonical URL the descriptor was extracted from.
    pub source_url: String,
    pub title: Option<String>,
    pub author: Option<String>,
    pub thumbnail_url: Option<String>,
    /// `og:video` for scraped pages.
    pub video_url: Option<String>,
    /// `og:image` for scraped pages.
    pub image_url: Option<String>,
    /// Ordered renditions offered by a structured provider.
    pub formats: Vec<FormatEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormatEntry {
    pub label: String,
    pub token: FormatToken,
    pub kind: VariantKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantKind {
    Video,
    Audio,
    Image,
    /// Passed through byte-for-byte without a more specific type, e.g. GIFs.
    Direct,
}

impl VariantKind {
    pub fn icon_hint(&self) -> &'static str {
        match self {
            VariantKind::Video => "🎥",
            VariantKind::Audio => "🎵",
            VariantKind::Image => "🖼️",
            VariantKind::Direct => "📦",
        }
    }
}

/// One selectable rendition offered to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadVariant {
    pub label: String,
    pub icon: String,
    /// Media URL for direct sources, canonical page URL for provider sources.
    pub url: String,
    pub format: FormatToken,
    pub kind: VariantKind,
}

impl DownloadVariant {
    /// Relative link that streams this variant through the relay.
    pub fn proxy_link(&self) -> String {
        format!(
            "/download?url={}&format={}",
            urlencoding::encode(&self.url),
            urlencoding::encode(self.format.as_wire())
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub platform: Platform,
    pub title: String,
    pub description: String,
    pub icon: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    pub downloads: Vec<DownloadVariant>,
}
