use relay_core::models::download::FormatToken;

const KNOWN_EXTENSIONS: &[&str] = &[
    "mp4", "mov", "webm", "mp3", "m4a", "jpg", "jpeg", "png", "gif", "webp",
];

/// Extension of the URL's last path segment, if it is a known media type.
pub fn extension_from_url(url: &str) -> Option<String> {
    let path = match url::Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split(['?', '#']).next().unwrap_or_default().to_string(),
    };

    let last = path.rsplit('/').next()?;
    let (_, ext) = last.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();

    KNOWN_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// Extension implied by a media `Content-Type`, parameters ignored.
pub fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        "video/mp4" => Some("mp4"),
        "video/webm" => Some("webm"),
        "video/quicktime" => Some("mov"),
        "audio/mpeg" | "audio/mp3" => Some("mp3"),
        "audio/mp4" | "audio/x-m4a" => Some("m4a"),
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// Attachment name for a proxied download. Direct media without a known
/// extension is named `media.jpg`.
pub fn download_filename(format: &FormatToken, extension: Option<&str>) -> String {
    match format {
        FormatToken::AudioOnly => "audio.mp3".to_string(),
        FormatToken::Highest | FormatToken::Quality(_) => "video.mp4".to_string(),
        FormatToken::Direct => format!("media.{}", extension.unwrap_or("jpg")),
    }
}

pub fn content_type_for_filename(filename: &str) -> &'static str {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "mp3" => "audio/mpeg",
        "m4a" => "audio/mp4",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Whether an origin `Content-Type` can be forwarded as-is.
pub fn is_media_content_type(content_type: &str) -> bool {
    let ct = content_type.trim().to_ascii_lowercase();
    ct.starts_with("video/") || ct.starts_with("audio/") || ct.starts_with("image/")
}

pub fn is_html_content_type(content_type: &str) -> bool {
    content_type.trim().to_ascii_lowercase().starts_with("text/html")
}

pub fn build_content_disposition(filename: &str) -> String {
    format!("attachment; filename=\"{}\"", sanitize_ascii_filename(filename))
}

fn sanitize_ascii_filename(value: &str) -> String {
    let sanitized: String = value
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.trim_matches('_').is_empty() {
        "download.bin".to_string()
    } else {
        sanitized
    }
}
