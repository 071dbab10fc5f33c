use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use relay_core::models::settings::{ServerConfig, TimeoutSettings};

pub const CONFIG_ENV: &str = "MEDIA_RELAY_CONFIG";

/// Reads the optional JSON file, then applies environment overrides.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<ServerConfig> {
    let config = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str::<ServerConfig>(&raw)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => ServerConfig::default(),
    };

    let config = apply_env(config, |key| std::env::var(key).ok())?;
    validate_timeouts(&config.timeouts)?;
    Ok(config)
}

/// Every bound must be positive; a zero timeout fails every request.
pub fn validate_timeouts(timeouts: &TimeoutSettings) -> anyhow::Result<()> {
    let bounds = [
        ("metadata_secs", timeouts.metadata_secs),
        ("connect_secs", timeouts.connect_secs),
        ("media_headers_secs", timeouts.media_headers_secs),
        ("chunk_idle_secs", timeouts.chunk_idle_secs),
        ("provider_secs", timeouts.provider_secs),
    ];
    for (name, secs) in bounds {
        if secs == 0 {
            bail!("timeouts.{} must be greater than zero", name);
        }
    }
    Ok(())
}

pub fn apply_env<F>(mut config: ServerConfig, lookup: F) -> anyhow::Result<ServerConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    if let Some(port) = get("PORT") {
        config.port = port
            .parse()
            .with_context(|| format!("PORT must be a port number, got '{}'", port))?;
    }
    if let Some(host) = get("MEDIA_RELAY_HOST") {
        config.host = host;
    }
    if let Some(strategy) = get("MEDIA_RELAY_YOUTUBE_STRATEGY") {
        config.youtube_strategy = strategy.parse().map_err(anyhow::Error::msg)?;
    }
    if let Some(path) = get("MEDIA_RELAY_YTDLP") {
        config.ytdlp_path = Some(PathBuf::from(path));
    }
    if let Some(format) = get("MEDIA_RELAY_LOG_FORMAT") {
        config.log_format = format.parse().map_err(anyhow::Error::msg)?;
    }
    if let Some(secs) = get("MEDIA_RELAY_FETCH_TIMEOUT_SECS") {
        let secs: u64 = secs
            .parse()
            .with_context(|| format!("MEDIA_RELAY_FETCH_TIMEOUT_SECS must be seconds, got '{}'", secs))?;
        if secs == 0 {
            bail!("MEDIA_RELAY_FETCH_TIMEOUT_SECS must be greater than zero");
        }
        config.timeouts.metadata_secs = secs;
        config.timeouts.media_headers_secs = secs;
    }

    Ok(config)
}
