use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::RelayError;

/// Which rendition the proxy should stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FormatToken {
    /// Highest-quality combined rendition (`mp4` on the wire).
    Highest,
    /// Best audio-only rendition (`mp3` on the wire).
    AudioOnly,
    /// The source URL is itself the media file.
    Direct,
    /// A specific quality label such as `720p`.
    Quality(String),
}

impl FormatToken {
    pub fn parse(raw: &str) -> Result<Self, RelayError> {
        let value = raw.trim();
        if value.is_empty() {
            return Err(RelayError::MissingInput("format is required".to_string()));
        }
        Ok(match value.to_lowercase().as_str() {
            "mp4" | "highest" | "best" => FormatToken::Highest,
            "mp3" | "audio" | "audioonly" => FormatToken::AudioOnly,
            "direct" => FormatToken::Direct,
            _ => FormatToken::Quality(value.to_string()),
        })
    }

    pub fn as_wire(&self) -> &str {
        match self {
            FormatToken::Highest => "mp4",
            FormatToken::AudioOnly => "mp3",
            FormatToken::Direct => "direct",
            FormatToken::Quality(label) => label,
        }
    }
}

impl fmt::Display for FormatToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl Serialize for FormatToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DownloadRequest {
    pub source_url: String,
    pub format: FormatToken,
}

impl DownloadRequest {
    pub fn new(url: Option<&str>, format: Option<&str>) -> Result<Self, RelayError> {
        let source_url = url
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| RelayError::MissingInput("url is required".to_string()))?;
        let format = FormatToken::parse(format.unwrap_or_default())?;
        Ok(Self {
            source_url: source_url.to_string(),
            format,
        })
    }
}

/// Lifecycle of one proxied response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Idle,
    HeadersResolved,
    Streaming,
    Completed,
    Aborted,
}

impl StreamState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamState::Completed | StreamState::Aborted)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StreamState::Idle => "idle",
            StreamState::HeadersResolved => "headers_resolved",
            StreamState::Streaming => "streaming",
            StreamState::Completed => "completed",
            StreamState::Aborted => "aborted",
        }
    }
}

impl fmt::Display for StreamState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wire_tokens() {
        assert_eq!(FormatToken::parse("mp4").unwrap(), FormatToken::Highest);
        assert_eq!(FormatToken::parse("MP3").unwrap(), FormatToken::AudioOnly);
        assert_eq!(FormatToken::parse("audioonly").unwrap(), FormatToken::AudioOnly);
        assert_eq!(FormatToken::parse("direct").unwrap(), FormatToken::Direct);
        assert_eq!(
            FormatToken::parse("720p").unwrap(),
            FormatToken::Quality("720p".to_string())
        );
    }

    #[test]
    fn empty_format_is_missing_input() {
        assert!(matches!(
            FormatToken::parse("  "),
            Err(RelayError::MissingInput(_))
        ));
    }

    #[test]
    fn request_requires_url() {
        assert!(matches!(
            DownloadRequest::new(None, Some("mp4")),
            Err(RelayError::MissingInput(_))
        ));
        assert!(matches!(
            DownloadRequest::new(Some(""), Some("mp4")),
            Err(RelayError::MissingInput(_))
        ));
    }

    #[test]
    fn request_trims_url() {
        let req = DownloadRequest::new(Some(" https://cdn/x.jpg "), Some("direct")).unwrap();
        assert_eq!(req.source_url, "https://cdn/x.jpg");
        assert_eq!(req.format, FormatToken::Direct);
    }

    #[test]
    fn stream_states_display_and_terminality() {
        assert_eq!(StreamState::Idle.to_string(), "idle");
        assert_eq!(StreamState::HeadersResolved.to_string(), "headers_resolved");
        assert!(!StreamState::Idle.is_terminal());
        assert!(!StreamState::Streaming.is_terminal());
        assert!(StreamState::Completed.is_terminal());
        assert!(StreamState::Aborted.is_terminal());
    }
}
