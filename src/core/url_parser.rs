use std::sync::LazyLock;

use regex::Regex;
use relay_core::{Platform, RelayError};

static VIDEO_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,64}$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedUrl {
    pub platform: Platform,
    pub url: String,
}

/// Maps a raw URL to its platform and the canonical form extraction expects.
///
/// Purely syntactic. YouTube video shapes are checked first, then known
/// scrape hosts; anything else is `Unsupported`.
pub fn classify(raw: &str) -> Result<ClassifiedUrl, RelayError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(RelayError::MissingInput("url is required".to_string()));
    }

    let parsed = match parse_lenient(trimmed) {
        Some(parsed) => parsed,
        None => {
            return Ok(ClassifiedUrl {
                platform: Platform::Unsupported,
                url: trimmed.to_string(),
            })
        }
    };

    if let Some(id) = youtube_video_id(&parsed) {
        return Ok(ClassifiedUrl {
            platform: Platform::YouTube,
            url: canonical_watch_url(&id),
        });
    }

    let platform = parsed
        .host_str()
        .map(Platform::from_host)
        .unwrap_or(Platform::Unsupported);

    Ok(ClassifiedUrl {
        platform,
        url: if platform.is_supported() {
            parsed.to_string()
        } else {
            trimmed.to_string()
        },
    })
}

pub fn canonical_watch_url(id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", id)
}

fn parse_lenient(raw: &str) -> Option<url::Url> {
    let parsed = match url::Url::parse(raw) {
        Ok(parsed) => parsed,
        Err(_) if !raw.contains("://") => url::Url::parse(&format!("https://{}", raw)).ok()?,
        Err(_) => return None,
    };
    matches!(parsed.scheme(), "http" | "https").then_some(parsed)
}

fn is_youtube_host(host: &str) -> bool {
    host == "youtube.com"
        || host.ends_with(".youtube.com")
        || host == "youtube-nocookie.com"
        || host.ends_with(".youtube-nocookie.com")
}

/// Extracts the video id from any YouTube video URL shape.
pub fn youtube_video_id(parsed: &url::Url) -> Option<String> {
    let host = parsed.host_str()?.to_lowercase();
    let segments: Vec<&str> = parsed.path().split('/').filter(|s| !s.is_empty()).collect();

    let id = if host == "youtu.be" || host == "www.youtu.be" {
        segments.first().map(|s| s.to_string())
    } else if is_youtube_host(&host) {
        match parsed.query_pairs().find(|(k, _)| k == "v") {
            Some((_, v)) => Some(v.to_string()),
            None => match segments.as_slice() {
                ["shorts" | "embed" | "live" | "v", id, ..] => Some(id.to_string()),
                _ => None,
            },
        }
    } else {
        None
    };

    id.filter(|id| VIDEO_ID_RE.is_match(id))
}

/// Whether the structured video provider can handle this URL.
pub fn is_youtube_video(raw: &str) -> bool {
    parse_lenient(raw.trim())
        .and_then(|parsed| youtube_video_id(&parsed))
        .is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shorts_rewritten_to_watch_url() {
        let classified = classify("https://www.youtube.com/shorts/ABC123?feature=share").unwrap();
        assert_eq!(classified.platform, Platform::YouTube);
        assert_eq!(classified.url, "https://www.youtube.com/watch?v=ABC123");
    }

    #[test]
    fn short_form_matches_canonical_form() {
        let short = classify("https://www.youtube.com/shorts/ABC123?feature=share").unwrap();
        let canonical = classify("https://www.youtube.com/watch?v=ABC123").unwrap();
        assert_eq!(short, canonical);
        assert_eq!(classify(&canonical.url).unwrap(), canonical);
    }

    #[test]
    fn other_youtube_shapes() {
        for input in [
            "https://youtu.be/dQw4w9WgXcQ?t=10",
            "https://m.youtube.com/watch?v=dQw4w9WgXcQ&list=PL1",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/live/dQw4w9WgXcQ",
            "https://www.youtube-nocookie.com/embed/dQw4w9WgXcQ",
            "youtube.com/watch?v=dQw4w9WgXcQ",
        ] {
            let classified = classify(input).unwrap();
            assert_eq!(classified.platform, Platform::YouTube, "{}", input);
            assert_eq!(classified.url, "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
        }
    }

    #[test]
    fn youtube_non_video_pages_are_unsupported() {
        for input in [
            "https://www.youtube.com/@somechannel",
            "https://www.youtube.com/",
            "https://www.youtube.com/watch?v=bad%20id",
        ] {
            assert_eq!(classify(input).unwrap().platform, Platform::Unsupported, "{}", input);
        }
    }

    #[test]
    fn scrape_platforms_by_host() {
        let ig = classify("https://www.instagram.com/p/Cxyz123/").unwrap();
        assert_eq!(ig.platform, Platform::Instagram);
        assert_eq!(ig.url, "https://www.instagram.com/p/Cxyz123/");

        let pin = classify("https://br.pinterest.com/pin/123456789/").unwrap();
        assert_eq!(pin.platform, Platform::Pinterest);

        let short_pin = classify("https://pin.it/abcDEF").unwrap();
        assert_eq!(short_pin.platform, Platform::Pinterest);
    }

    #[test]
    fn unknown_urls_are_unsupported() {
        for input in [
            "https://example.com/video.mp4",
            "not a url at all",
            "ftp://instagram.com/p/x",
            "https://vimeo.com/12345",
        ] {
            assert_eq!(classify(input).unwrap().platform, Platform::Unsupported, "{}", input);
        }
    }

    #[test]
    fn empty_input_is_missing() {
        assert!(matches!(classify(""), Err(RelayError::MissingInput(_))));
        assert!(matches!(classify("   "), Err(RelayError::MissingInput(_))));
    }

    #[test]
    fn youtube_detection_helper() {
        assert!(is_youtube_video("https://youtu.be/abc_DEF-123"));
        assert!(!is_youtube_video("https://cdn.example.com/x.mp4"));
    }
}
