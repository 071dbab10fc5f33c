use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    YouTube,
    Instagram,
    Pinterest,
    Unsupported,
}

impl Platform {
    /// Host-based detection for the scrape platforms. YouTube is matched by
    /// URL shape in the classifier, not here.
    pub fn from_host(host: &str) -> Self {
        let host = host.to_lowercase();
        if host.contains("instagram.com") {
            return Platform::Instagram;
        }
        if host == "pin.it" || host.contains("pinterest.") {
            return Platform::Pinterest;
        }
        Platform::Unsupported
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::YouTube => "youtube",
            Platform::Instagram => "instagram",
            Platform::Pinterest => "pinterest",
            Platform::Unsupported => "unsupported",
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Platform::Unsupported)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "youtube" => Ok(Platform::YouTube),
            "instagram" => Ok(Platform::Instagram),
            "pinterest" => Ok(Platform::Pinterest),
            other => Err(format!("unknown platform '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_detection() {
        assert_eq!(Platform::from_host("www.instagram.com"), Platform::Instagram);
        assert_eq!(Platform::from_host("br.pinterest.com"), Platform::Pinterest);
        assert_eq!(Platform::from_host("www.pinterest.co.uk"), Platform::Pinterest);
        assert_eq!(Platform::from_host("pin.it"), Platform::Pinterest);
        assert_eq!(Platform::from_host("example.com"), Platform::Unsupported);
        assert_eq!(Platform::from_host("www.youtube.com"), Platform::Unsupported);
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&Platform::YouTube).unwrap();
        assert_eq!(json, "\"youtube\"");
    }

    #[test]
    fn parses_hint() {
        assert_eq!("Instagram".parse::<Platform>(), Ok(Platform::Instagram));
        assert!("tiktok".parse::<Platform>().is_err());
    }
}
