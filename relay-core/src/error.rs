//! Error taxonomy shared by every stage of the relay pipeline.
//!
//! Variants are split into two classes: input errors, which are the caller's
//! fault and map to a 4xx response, and upstream errors, which describe a
//! third-party origin misbehaving and map to a 5xx response.

use thiserror::Error;

/// Errors raised while classifying, extracting, normalizing or proxying media.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RelayError {
    /// No URL (or an empty one) was supplied.
    #[error("missing input: {0}")]
    MissingInput(String),

    /// The URL does not belong to a supported platform, or the request
    /// combination cannot be served.
    #[error("unsupported: {0}")]
    UnsupportedPlatform(String),

    /// The origin could not be reached or answered with a non-2xx status.
    #[error("upstream fetch failed for {url}: {reason}")]
    UpstreamFetchError { url: String, reason: String },

    /// The origin answered but the expected fields were absent or malformed.
    #[error("upstream response could not be parsed for {url}: {reason}")]
    UpstreamParseError { url: String, reason: String },

    /// The page was fetched but carried no recognizable media.
    #[error("no media found at {0}")]
    NoMediaFound(String),

    /// The origin did not answer within the configured bound.
    #[error("upstream timed out after {seconds}s for {url}")]
    UpstreamTimeout { url: String, seconds: u64 },
}

/// Coarse classification used by the HTTP boundary to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Input,
    Upstream,
    Timeout,
}

impl RelayError {
    #[must_use]
    pub fn fetch(url: &str, reason: impl Into<String>) -> Self {
        Self::UpstreamFetchError {
            url: url.to_string(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn parse(url: &str, reason: impl Into<String>) -> Self {
        Self::UpstreamParseError {
            url: url.to_string(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn timeout(url: &str, seconds: u64) -> Self {
        Self::UpstreamTimeout {
            url: url.to_string(),
            seconds,
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            Self::MissingInput(_) | Self::UnsupportedPlatform(_) => ErrorClass::Input,
            Self::UpstreamTimeout { .. } => ErrorClass::Timeout,
            Self::UpstreamFetchError { .. }
            | Self::UpstreamParseError { .. }
            | Self::NoMediaFound(_) => ErrorClass::Upstream,
        }
    }

    /// Stable snake_case identifier exposed to clients.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingInput(_) => "missing_input",
            Self::UnsupportedPlatform(_) => "unsupported_platform",
            Self::UpstreamFetchError { .. } => "upstream_fetch_error",
            Self::UpstreamParseError { .. } => "upstream_parse_error",
            Self::NoMediaFound(_) => "no_media_found",
            Self::UpstreamTimeout { .. } => "upstream_timeout",
        }
    }

    /// Short message safe to return to a client.
    ///
    /// Input errors echo their detail since it describes the caller's own
    /// request. Upstream errors never include origin output.
    pub fn public_message(&self) -> String {
        match self {
            Self::MissingInput(detail) | Self::UnsupportedPlatform(detail) => detail.clone(),
            Self::UpstreamFetchError { .. } => "Failed to reach the media origin".to_string(),
            Self::UpstreamParseError { .. } => "Failed to analyze URL".to_string(),
            Self::NoMediaFound(_) => "No downloadable media found".to_string(),
            Self::UpstreamTimeout { .. } => "The media origin took too long to respond".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_are_client_class() {
        assert_eq!(RelayError::MissingInput("url".into()).class(), ErrorClass::Input);
        assert_eq!(
            RelayError::UnsupportedPlatform("x".into()).class(),
            ErrorClass::Input
        );
    }

    #[test]
    fn upstream_errors_are_server_class() {
        assert_eq!(RelayError::fetch("u", "503").class(), ErrorClass::Upstream);
        assert_eq!(RelayError::parse("u", "bad id").class(), ErrorClass::Upstream);
        assert_eq!(RelayError::NoMediaFound("u".into()).class(), ErrorClass::Upstream);
        assert_eq!(RelayError::timeout("u", 30).class(), ErrorClass::Timeout);
    }

    #[test]
    fn public_message_hides_upstream_detail() {
        let err = RelayError::parse("https://www.youtube.com/watch?v=x", "ERROR: [youtube] x: Video unavailable\nTraceback");
        let msg = err.public_message();
        assert!(!msg.contains("Traceback"));
        assert!(!msg.contains("youtube.com"));
    }
}
