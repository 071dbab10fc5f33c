use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use relay_core::models::download::FormatToken;
use relay_core::models::media::{FormatEntry, MediaDescriptor, VariantKind};
use relay_core::models::settings::YoutubeStrategy;
use relay_core::RelayError;

use crate::core::video_info::{RawFormat, VideoInfo, VideoInfoProvider};
use crate::platforms::traits::PlatformExtractor;

pub struct YouTubeExtractor {
    provider: Arc<dyn VideoInfoProvider>,
    strategy: YoutubeStrategy,
}

impl YouTubeExtractor {
    pub fn new(provider: Arc<dyn VideoInfoProvider>, strategy: YoutubeStrategy) -> Self {
        Self { provider, strategy }
    }

    /// The two fixed choices offered by the curated strategy.
    pub fn curated_formats() -> Vec<FormatEntry> {
        vec![
            FormatEntry {
                label: "MP4 Video".to_string(),
                token: FormatToken::Highest,
                kind: VariantKind::Video,
            },
            FormatEntry {
                label: "MP3 Audio".to_string(),
                token: FormatToken::AudioOnly,
                kind: VariantKind::Audio,
            },
        ]
    }

    /// One entry per distinct quality label, tallest first, then audio.
    pub fn format_list(info: &VideoInfo) -> Vec<FormatEntry> {
        let mut videos: Vec<&RawFormat> = info
            .formats
            .iter()
            .filter(|f| f.has_video && f.quality_label.is_some())
            .collect();

        videos.sort_by(|a, b| {
            b.height
                .unwrap_or(0)
                .cmp(&a.height.unwrap_or(0))
                .then_with(|| b.has_audio.cmp(&a.has_audio))
                .then_with(|| a.quality_label.cmp(&b.quality_label))
        });

        let mut seen: HashSet<&str> = HashSet::new();
        let mut entries: Vec<FormatEntry> = Vec::new();

        for f in videos {
            let Some(label) = f.quality_label.as_deref() else {
                continue;
            };
            if !seen.insert(label) {
                continue;
            }
            let display = if f.has_audio {
                format!("MP4 {}", label)
            } else {
                format!("MP4 {} (video only)", label)
            };
            entries.push(FormatEntry {
                label: display,
                token: FormatToken::Quality(label.to_string()),
                kind: VariantKind::Video,
            });
        }

        if info.formats.iter().any(|f| f.has_audio && !f.has_video) {
            entries.push(FormatEntry {
                label: "MP3 Audio".to_string(),
                token: FormatToken::AudioOnly,
                kind: VariantKind::Audio,
            });
        }

        entries
    }
}

#[async_trait]
impl PlatformExtractor for YouTubeExtractor {
    fn name(&self) -> &str {
        "youtube"
    }

    async fn extract(&self, url: &str) -> Result<MediaDescriptor, RelayError> {
        if !self.provider.validate_url(url) {
            return Err(RelayError::parse(url, "could not extract a video id"));
        }

        tracing::info!("[youtube] resolving {} ({} strategy)", url, self.strategy);
        let info = self.provider.get_info(url).await?;

        let formats = match self.strategy {
            YoutubeStrategy::Curated => Self::curated_formats(),
            YoutubeStrategy::Formats => Self::format_list(&info),
        };

        if formats.is_empty() {
            return Err(RelayError::NoMediaFound(url.to_string()));
        }

        tracing::debug!(
            "[youtube] video {} offers {} of {} renditions",
            info.id,
            formats.len(),
            info.formats.len()
        );

        Ok(MediaDescriptor {
            source_url: url.to_string(),
            title: info.title,
            author: info.author,
            thumbnail_url: info.thumbnail_url,
            video_url: None,
            image_url: None,
            formats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubProvider(Result<VideoInfo, RelayError>);

    #[async_trait]
    impl VideoInfoProvider for StubProvider {
        fn validate_url(&self, url: &str) -> bool {
            crate::core::url_parser::is_youtube_video(url)
        }

        async fn get_info(&self, _url: &str) -> Result<VideoInfo, RelayError> {
            self.0.clone()
        }
    }

    fn raw(id: &str, height: Option<u32>, video: bool, audio: bool) -> RawFormat {
        RawFormat {
            format_id: id.to_string(),
            quality_label: height.map(|h| format!("{}p", h)),
            mime_type: Some(if video { "video/mp4" } else { "audio/webm" }.to_string()),
            url: format!("https://rr.googlevideo.com/{}", id),
            height,
            has_video: video,
            has_audio: audio,
            ..Default::default()
        }
    }

    fn info() -> VideoInfo {
        VideoInfo {
            id: "ABC123".into(),
            title: Some("Title".into()),
            author: Some("Channel".into()),
            thumbnail_url: None,
            formats: vec![
                raw("18", Some(360), true, true),
                raw("251", None, false, true),
                raw("137", Some(1080), true, false),
                raw("136", Some(720), true, false),
                raw("22", Some(720), true, true),
            ],
        }
    }

    const URL: &str = "https://www.youtube.com/watch?v=ABC123";

    #[tokio::test]
    async fn curated_strategy_offers_two_choices() {
        let extractor =
            YouTubeExtractor::new(Arc::new(StubProvider(Ok(info()))), YoutubeStrategy::Curated);
        let descriptor = extractor.extract(URL).await.unwrap();

        let tokens: Vec<FormatToken> = descriptor.formats.iter().map(|f| f.token.clone()).collect();
        assert_eq!(tokens, vec![FormatToken::Highest, FormatToken::AudioOnly]);
        assert_eq!(descriptor.title.as_deref(), Some("Title"));
        assert_eq!(descriptor.author.as_deref(), Some("Channel"));
    }

    #[tokio::test]
    async fn formats_strategy_lists_qualities_tallest_first() {
        let extractor =
            YouTubeExtractor::new(Arc::new(StubProvider(Ok(info()))), YoutubeStrategy::Formats);
        let descriptor = extractor.extract(URL).await.unwrap();

        let labels: Vec<&str> = descriptor.formats.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["MP4 1080p (video only)", "MP4 720p", "MP4 360p", "MP3 Audio"]
        );
        assert_eq!(
            descriptor.formats[1].token,
            FormatToken::Quality("720p".to_string())
        );
    }

    #[tokio::test]
    async fn formats_strategy_without_formats_is_no_media() {
        let empty = VideoInfo {
            id: "ABC123".into(),
            ..Default::default()
        };
        let extractor =
            YouTubeExtractor::new(Arc::new(StubProvider(Ok(empty))), YoutubeStrategy::Formats);
        assert!(matches!(
            extractor.extract(URL).await,
            Err(RelayError::NoMediaFound(_))
        ));
    }

    #[tokio::test]
    async fn provider_failure_propagates() {
        let extractor = YouTubeExtractor::new(
            Arc::new(StubProvider(Err(RelayError::parse(URL, "Video unavailable")))),
            YoutubeStrategy::Curated,
        );
        assert!(matches!(
            extractor.extract(URL).await,
            Err(RelayError::UpstreamParseError { .. })
        ));
    }

    #[test]
    fn format_list_is_deterministic() {
        let a = YouTubeExtractor::format_list(&info());
        let b = YouTubeExtractor::format_list(&info());
        assert_eq!(a, b);
    }
}
