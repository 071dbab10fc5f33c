//! Maps platform-specific descriptors onto the single `AnalysisResult` schema.

use relay_core::models::download::FormatToken;
use relay_core::models::media::{AnalysisResult, DownloadVariant, MediaDescriptor, VariantKind};
use relay_core::{Platform, RelayError};

use crate::core::filename::extension_from_url;

struct PlatformProfile {
    default_title: &'static str,
    default_description: &'static str,
    icon: &'static str,
}

fn profile(platform: Platform) -> Option<PlatformProfile> {
    match platform {
        Platform::YouTube => Some(PlatformProfile {
            default_title: "YouTube Video",
            default_description: "YouTube Video",
            icon: "https://www.youtube.com/s/desktop/feather.png",
        }),
        Platform::Instagram => Some(PlatformProfile {
            default_title: "Instagram Post",
            default_description: "Instagram Media",
            icon: "https://www.instagram.com/static/images/ico/favicon-200.png/ab6eff595bb1.png",
        }),
        Platform::Pinterest => Some(PlatformProfile {
            default_title: "Pinterest Pin",
            default_description: "Pinterest Media",
            icon: "https://s.pinimg.com/webapp/favicon-54a5b2d5.png",
        }),
        Platform::Unsupported => None,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub fn normalize(platform: Platform, descriptor: MediaDescriptor) -> Result<AnalysisResult, RelayError> {
    let profile = profile(platform)
        .ok_or_else(|| RelayError::UnsupportedPlatform("Unsupported or invalid URL".to_string()))?;

    let downloads = match platform {
        Platform::YouTube => provider_variants(&descriptor),
        Platform::Instagram | Platform::Pinterest => scraped_variant(&descriptor).into_iter().collect(),
        Platform::Unsupported => Vec::new(),
    };

    if downloads.is_empty() {
        return Err(RelayError::NoMediaFound(descriptor.source_url));
    }

    let description = match platform {
        Platform::YouTube => non_blank(descriptor.author),
        _ => None,
    }
    .unwrap_or_else(|| profile.default_description.to_string());

    Ok(AnalysisResult {
        platform,
        title: non_blank(descriptor.title).unwrap_or_else(|| profile.default_title.to_string()),
        description,
        icon: profile.icon.to_string(),
        thumbnail: non_blank(descriptor.thumbnail_url),
        downloads,
    })
}

fn provider_variants(descriptor: &MediaDescriptor) -> Vec<DownloadVariant> {
    descriptor
        .formats
        .iter()
        .map(|entry| DownloadVariant {
            label: entry.label.clone(),
            icon: entry.kind.icon_hint().to_string(),
            url: descriptor.source_url.clone(),
            format: entry.token.clone(),
            kind: entry.kind,
        })
        .collect()
}

/// A video attribute wins over an image attribute.
fn scraped_variant(descriptor: &MediaDescriptor) -> Option<DownloadVariant> {
    let (url, label, kind) = if let Some(video) = descriptor.video_url.as_deref() {
        (video, "MP4 Video", VariantKind::Video)
    } else {
        let image = descriptor.image_url.as_deref()?;
        if extension_from_url(image).as_deref() == Some("gif") {
            (image, "GIF", VariantKind::Direct)
        } else {
            (image, "Image", VariantKind::Image)
        }
    };

    Some(DownloadVariant {
        label: label.to_string(),
        icon: kind.icon_hint().to_string(),
        url: url.to_string(),
        format: FormatToken::Direct,
        kind,
    })
}
