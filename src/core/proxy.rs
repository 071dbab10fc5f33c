use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::{Stream, StreamExt};
use relay_core::models::download::{DownloadRequest, FormatToken, StreamState};
use relay_core::{Platform, RelayError};

use crate::core::filename::{
    content_type_for_filename, download_filename, extension_for_content_type, extension_from_url,
    is_html_content_type, is_media_content_type,
};
use crate::core::http_client::{ByteStream, MediaFetcher};
use crate::core::url_parser;
use crate::core::video_info::VideoInfoProvider;

/// Response framing plus a body that has not started flowing yet.
pub struct PreparedDownload {
    pub filename: String,
    pub content_type: String,
    pub content_length: Option<u64>,
    pub body: ProxyStream,
}

/// The URL actually fetched, with what the provider knows about it.
struct Rendition {
    url: String,
    headers: Vec<(String, String)>,
    mime_type: Option<String>,
}

pub struct ProxyDownloader {
    provider: Arc<dyn VideoInfoProvider>,
    fetcher: Arc<dyn MediaFetcher>,
}

impl ProxyDownloader {
    pub fn new(provider: Arc<dyn VideoInfoProvider>, fetcher: Arc<dyn MediaFetcher>) -> Self {
        Self { provider, fetcher }
    }

    /// Resolves the origin and its headers. No byte is read from the body.
    ///
    /// Any error returned here happens before a response is committed, so the
    /// caller can still answer with a structured error.
    pub async fn prepare(&self, request: &DownloadRequest) -> Result<PreparedDownload, RelayError> {
        let (rendition, format) = if self.provider.validate_url(&request.source_url) {
            let rendition = self.resolve_rendition(request).await?;
            let format = match &request.format {
                FormatToken::Direct => FormatToken::Highest,
                other => other.clone(),
            };
            (rendition, format)
        } else if request.format == FormatToken::Direct {
            let rendition = Rendition {
                url: request.source_url.clone(),
                headers: Vec::new(),
                mime_type: None,
            };
            (rendition, FormatToken::Direct)
        } else {
            return Err(RelayError::UnsupportedPlatform(
                "Invalid download request".to_string(),
            ));
        };

        let media_url = rendition.url.as_str();
        let fetched = self.fetcher.fetch_stream(media_url, &rendition.headers).await?;

        if let Some(ct) = fetched.content_type.as_deref() {
            if is_html_content_type(ct) {
                return Err(RelayError::parse(media_url, "origin returned HTML instead of media"));
            }
        }

        let extension = extension_from_url(&request.source_url)
            .or_else(|| extension_from_url(&fetched.final_url))
            .or_else(|| {
                fetched
                    .content_type
                    .as_deref()
                    .and_then(extension_for_content_type)
                    .map(str::to_string)
            });
        let filename = download_filename(&format, extension.as_deref());

        let content_type = fetched
            .content_type
            .as_deref()
            .filter(|ct| is_media_content_type(ct))
            .or(rendition.mime_type.as_deref())
            .map(|ct| ct.to_string())
            .unwrap_or_else(|| content_type_for_filename(&filename).to_string());

        tracing::info!(
            "[proxy] {} -> {} for {} as {} ({}, {} bytes)",
            StreamState::Idle,
            StreamState::HeadersResolved,
            request.source_url,
            filename,
            content_type,
            fetched
                .content_length
                .map(|n| n.to_string())
                .unwrap_or_else(|| "unknown".to_string())
        );

        Ok(PreparedDownload {
            body: ProxyStream::new(fetched.body, filename.clone()),
            filename,
            content_type,
            content_length: fetched.content_length,
        })
    }

    /// Re-resolves a provider source so the rendition URL is never stale.
    async fn resolve_rendition(&self, request: &DownloadRequest) -> Result<Rendition, RelayError> {
        let source = match url_parser::classify(&request.source_url)? {
            classified if classified.platform == Platform::YouTube => classified.url,
            _ => request.source_url.clone(),
        };

        let info = self.provider.get_info(&source).await?;

        let selected = match &request.format {
            FormatToken::AudioOnly => info.best_audio(),
            FormatToken::Quality(label) => info.by_label(label).or_else(|| {
                tracing::warn!("[proxy] quality {} not offered for {}, using highest", label, source);
                info.best_combined()
            }),
            FormatToken::Highest | FormatToken::Direct => info.best_combined(),
        }
        .ok_or_else(|| RelayError::NoMediaFound(source.clone()))?;

        tracing::debug!(
            "[proxy] video {} -> format {}",
            info.id,
            selected.format_id
        );
        Ok(Rendition {
            url: selected.url.clone(),
            headers: selected.http_headers.clone(),
            mime_type: selected.mime_type.clone(),
        })
    }
}

/// Body stream that records the `Streaming -> Completed | Aborted` transitions.
///
/// After the first error the stream ends, which makes the server drop the
/// connection instead of sending a truncated body as if it were complete.
pub struct ProxyStream {
    inner: ByteStream,
    state: StreamState,
    label: String,
    bytes: u64,
}

impl ProxyStream {
    pub fn new(inner: ByteStream, label: String) -> Self {
        Self {
            inner,
            state: StreamState::HeadersResolved,
            label,
            bytes: 0,
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    fn transition(&mut self, to: StreamState) {
        if self.state != to {
            tracing::debug!("[proxy] {} {} -> {}", self.label, self.state, to);
            self.state = to;
        }
    }
}

impl Stream for ProxyStream {
    type Item = Result<Bytes, RelayError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.state.is_terminal() {
            return Poll::Ready(None);
        }

        match this.inner.poll_next_unpin(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                this.transition(StreamState::Streaming);
                this.bytes += chunk.len() as u64;
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(e))) => {
                this.transition(StreamState::Aborted);
                tracing::warn!(
                    "[proxy] {} aborted after {} bytes: {}",
                    this.label,
                    this.bytes,
                    e
                );
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                this.transition(StreamState::Completed);
                tracing::info!("[proxy] {} completed, {} bytes", this.label, this.bytes);
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for ProxyStream {
    fn drop(&mut self) {
        if !self.state.is_terminal() {
            tracing::warn!(
                "[proxy] {} dropped by client after {} bytes",
                self.label,
                self.bytes
            );
        }
    }
}
