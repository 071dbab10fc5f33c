use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use relay_core::models::settings::ServerConfig;
use relay_core::RelayError;

use crate::core::paths::managed_bin_dir;
use crate::core::process;
use crate::core::url_parser;
use crate::core::video_info::{RawFormat, VideoInfo, VideoInfoProvider};

fn bin_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "yt-dlp.exe"
    } else {
        "yt-dlp"
    }
}

pub async fn find_ytdlp() -> Option<PathBuf> {
    if let Ok(status) = process::command(bin_name())
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
    {
        if status.success() {
            return Some(PathBuf::from(bin_name()));
        }
    }

    let managed = managed_bin_dir()?.join(bin_name());
    if managed.exists() {
        return Some(managed);
    }

    None
}

/// `VideoInfoProvider` backed by `yt-dlp --dump-json`.
pub struct YtDlpProvider {
    configured: Option<PathBuf>,
    discovered: OnceCell<PathBuf>,
    timeout: Duration,
}

impl YtDlpProvider {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            configured: config.ytdlp_path.clone(),
            discovered: OnceCell::new(),
            timeout: Duration::from_secs(config.timeouts.provider_secs),
        }
    }

    /// Configured path, else the first successful discovery. A failed
    /// discovery is retried on the next call.
    async fn binary(&self) -> Result<PathBuf, RelayError> {
        if let Some(path) = &self.configured {
            return Ok(path.clone());
        }

        let timeout = self.timeout;
        self.discovered
            .get_or_try_init(|| async move {
                match tokio::time::timeout(timeout, find_ytdlp()).await {
                    Ok(Some(path)) => {
                        tracing::info!("[ytdlp] using {}", path.display());
                        Ok(path)
                    }
                    Ok(None) => Err(RelayError::fetch("yt-dlp", "yt-dlp executable not found")),
                    Err(_) => Err(RelayError::timeout("yt-dlp", timeout.as_secs())),
                }
            })
            .await
            .cloned()
    }

    async fn dump_json(&self, ytdlp: &Path, url: &str) -> Result<serde_json::Value, RelayError> {
        let mut cmd = process::command(ytdlp);
        cmd.args(["--dump-json", "--no-warnings", "--no-playlist", url])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(RelayError::fetch(url, format!("failed to run yt-dlp: {}", e)))
            }
            Err(_) => return Err(RelayError::timeout(url, self.timeout.as_secs())),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::warn!("[ytdlp] failed for {}: {}", url, stderr.trim());
            return Err(RelayError::parse(url, stderr.trim().to_string()));
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| RelayError::parse(url, format!("invalid yt-dlp JSON: {}", e)))
    }
}

#[async_trait]
impl VideoInfoProvider for YtDlpProvider {
    fn validate_url(&self, url: &str) -> bool {
        url_parser::is_youtube_video(url)
    }

    async fn get_info(&self, url: &str) -> Result<VideoInfo, RelayError> {
        if !self.validate_url(url) {
            return Err(RelayError::parse(url, "not a recognizable video URL"));
        }

        let ytdlp = self.binary().await?;
        let json = self.dump_json(&ytdlp, url).await?;
        parse_video_info(url, &json)
    }
}

fn str_field(json: &serde_json::Value, key: &str) -> Option<String> {
    json.get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

pub fn parse_video_info(url: &str, json: &serde_json::Value) -> Result<VideoInfo, RelayError> {
    let id = str_field(json, "id").ok_or_else(|| RelayError::parse(url, "missing video id"))?;

    let is_live = json
        .get("is_live")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    if is_live {
        return Err(RelayError::parse(url, "livestreams are not supported"));
    }

    let formats = json
        .get("formats")
        .and_then(|v| v.as_array())
        .map(|formats| formats.iter().filter_map(parse_format).collect())
        .unwrap_or_default();

    Ok(VideoInfo {
        id,
        title: str_field(json, "title"),
        author: str_field(json, "uploader").or_else(|| str_field(json, "channel")),
        thumbnail_url: str_field(json, "thumbnail"),
        formats,
    })
}

fn parse_format(f: &serde_json::Value) -> Option<RawFormat> {
    let protocol = f.get("protocol").and_then(|v| v.as_str()).unwrap_or("https");
    if protocol != "https" && protocol != "http" {
        return None;
    }

    let url = str_field(f, "url")?;
    let format_id = str_field(f, "format_id").unwrap_or_default();
    let ext = str_field(f, "ext").unwrap_or_else(|| "mp4".to_string());
    let vcodec = f.get("vcodec").and_then(|v| v.as_str()).unwrap_or("none");
    let acodec = f.get("acodec").and_then(|v| v.as_str()).unwrap_or("none");
    let has_video = vcodec != "none";
    let has_audio = acodec != "none";

    if !has_video && !has_audio {
        return None;
    }

    let height = f
        .get("height")
        .and_then(|v| v.as_u64())
        .map(|h| h as u32)
        .filter(|h| *h > 0);
    let fps = f.get("fps").and_then(|v| v.as_f64()).unwrap_or(0.0);

    let quality_label = match height {
        Some(h) if has_video && fps > 30.0 => Some(format!("{}p{}", h, fps.round() as u32)),
        Some(h) if has_video => Some(format!("{}p", h)),
        _ => None,
    };

    let mime_type = if has_video {
        Some(format!("video/{}", ext))
    } else if ext == "m4a" {
        Some("audio/mp4".to_string())
    } else {
        Some(format!("audio/{}", ext))
    };

    let http_headers = f
        .get("http_headers")
        .and_then(|v| v.as_object())
        .map(|headers| {
            headers
                .iter()
                .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                .collect()
        })
        .unwrap_or_default();

    Some(RawFormat {
        format_id,
        quality_label,
        mime_type,
        url,
        height,
        has_video,
        has_audio,
        bitrate: f.get("tbr").and_then(|v| v.as_f64()),
        http_headers,
    })
}
