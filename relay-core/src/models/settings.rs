use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub youtube_strategy: YoutubeStrategy,
    #[serde(default)]
    pub log_format: LogFormat,
    #[serde(default)]
    pub ytdlp_path: Option<PathBuf>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default)]
    pub timeouts: TimeoutSettings,
}

/// How YouTube results are offered to the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YoutubeStrategy {
    /// Two fixed choices: combined video and audio only.
    #[default]
    Curated,
    /// Every distinct quality the provider reports.
    Formats,
}

impl FromStr for YoutubeStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "curated" => Ok(YoutubeStrategy::Curated),
            "formats" | "all" => Ok(YoutubeStrategy::Formats),
            other => Err(format!("unknown youtube strategy '{}'", other)),
        }
    }
}

impl fmt::Display for YoutubeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YoutubeStrategy::Curated => f.write_str("curated"),
            YoutubeStrategy::Formats => f.write_str("formats"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

/// Upper bounds for every outbound wait, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutSettings {
    #[serde(default = "default_metadata_secs")]
    pub metadata_secs: u64,
    #[serde(default = "default_connect_secs")]
    pub connect_secs: u64,
    #[serde(default = "default_media_headers_secs")]
    pub media_headers_secs: u64,
    #[serde(default = "default_chunk_idle_secs")]
    pub chunk_idle_secs: u64,
    #[serde(default = "default_provider_secs")]
    pub provider_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    5000
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.into()
}

fn default_metadata_secs() -> u64 {
    30
}

fn default_connect_secs() -> u64 {
    15
}

fn default_media_headers_secs() -> u64 {
    30
}

fn default_chunk_idle_secs() -> u64 {
    45
}

fn default_provider_secs() -> u64 {
    60
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            metadata_secs: default_metadata_secs(),
            connect_secs: default_connect_secs(),
            media_headers_secs: default_media_headers_secs(),
            chunk_idle_secs: default_chunk_idle_secs(),
            provider_secs: default_provider_secs(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            youtube_strategy: YoutubeStrategy::default(),
            log_format: LogFormat::default(),
            ytdlp_path: None,
            user_agent: default_user_agent(),
            timeouts: TimeoutSettings::default(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
