use relay_core::models::media::MediaDescriptor;
use relay_core::RelayError;
use scraper::{Html, Selector};

use crate::core::http_client::MediaFetcher;

/// Fetches `url` once and reads its Open Graph media into a descriptor.
///
/// Fails with `NoMediaFound` when the page has neither a video nor an image.
pub async fn scrape_open_graph(
    fetcher: &dyn MediaFetcher,
    url: &str,
) -> Result<MediaDescriptor, RelayError> {
    let html = fetcher.fetch_page(url).await?;
    descriptor_from_html(url, &html)
}

pub fn descriptor_from_html(url: &str, html: &str) -> Result<MediaDescriptor, RelayError> {
    let og = OpenGraph::parse(html);

    if !og.has_media() {
        return Err(RelayError::NoMediaFound(url.to_string()));
    }

    Ok(MediaDescriptor {
        source_url: url.to_string(),
        title: og.title,
        thumbnail_url: og.image.clone(),
        video_url: og.video,
        image_url: og.image,
        ..Default::default()
    })
}

/// Open Graph properties read from a page's `<meta>` tags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpenGraph {
    pub title: Option<String>,
    pub video: Option<String>,
    pub image: Option<String>,
}

impl OpenGraph {
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);

        Self {
            title: first_meta(&document, &["og:title"]),
            video: first_meta(&document, &["og:video", "og:video:secure_url", "og:video:url"]),
            image: first_meta(&document, &["og:image", "og:image:secure_url"]),
        }
    }

    pub fn has_media(&self) -> bool {
        self.video.is_some() || self.image.is_some()
    }
}

/// Returns the first non-blank `content` among `properties`, in order.
pub fn first_meta(document: &Html, properties: &[&str]) -> Option<String> {
    properties
        .iter()
        .find_map(|property| meta_content(document, property))
}

pub fn meta_content(document: &Html, property: &str) -> Option<String> {
    // Some pages use name= instead of property= for og tags.
    let css = format!(
        r#"meta[property="{0}"], meta[name="{0}"]"#,
        property
    );
    let selector = Selector::parse(&css).ok()?;

    document
        .select(&selector)
        .filter_map(|el| el.value().attr("content"))
        .map(str::trim)
        .find(|content| !content.is_empty())
        .map(|content| content.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_og_properties() {
        let html = r#"<html><head>
            <meta property="og:title" content="Cat Video" />
            <meta property="og:video" content="https://cdn/x.mp4" />
            <meta property="og:description" content="A cat" />
        </head><body></body></html>"#;

        let og = OpenGraph::parse(html);
        assert_eq!(og.title.as_deref(), Some("Cat Video"));
        assert_eq!(og.video.as_deref(), Some("https://cdn/x.mp4"));
        assert_eq!(og.image, None);
        assert!(og.has_media());
    }

    #[test]
    fn falls_back_to_secure_url_and_name_attribute() {
        let html = r#"<head>
            <meta name="og:image:secure_url" content="https://i.pinimg.com/originals/a.jpg">
            <meta property="og:video:secure_url" content="https://v1.pinimg.com/videos/a.mp4">
        </head>"#;

        let og = OpenGraph::parse(html);
        assert_eq!(og.image.as_deref(), Some("https://i.pinimg.com/originals/a.jpg"));
        assert_eq!(og.video.as_deref(), Some("https://v1.pinimg.com/videos/a.mp4"));
    }

    #[test]
    fn blank_content_counts_as_absent() {
        let html = r#"<head><meta property="og:image" content="  "></head>"#;
        let og = OpenGraph::parse(html);
        assert_eq!(og.image, None);
        assert!(!og.has_media());
    }

    #[test]
    fn first_non_blank_duplicate_wins() {
        let html = r#"<head>
            <meta property="og:image" content="">
            <meta property="og:image" content="https://cdn/1.jpg">
            <meta property="og:image" content="https://cdn/2.jpg">
        </head>"#;
        assert_eq!(OpenGraph::parse(html).image.as_deref(), Some("https://cdn/1.jpg"));
    }
}
