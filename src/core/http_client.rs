use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use relay_core::models::settings::ServerConfig;
use relay_core::RelayError;

pub type ByteStream = BoxStream<'static, Result<Bytes, RelayError>>;

/// An origin response whose headers have arrived but whose body has not been read.
pub struct FetchedStream {
    pub final_url: String,
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    pub body: ByteStream,
}

impl std::fmt::Debug for FetchedStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchedStream")
            .field("final_url", &self.final_url)
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Outbound HTTP used by extraction and proxying.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Fetches an HTML page as a browser would. Exactly one request.
    async fn fetch_page(&self, url: &str) -> Result<String, RelayError>;

    /// Starts a streamed fetch and returns once response headers are in.
    async fn fetch_stream(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<FetchedStream, RelayError>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
    metadata_timeout: Duration,
    headers_timeout: Duration,
    chunk_idle: Duration,
}

impl HttpFetcher {
    pub fn new(config: &ServerConfig) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .pool_max_idle_per_host(16)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(
                    "[fetch] client builder failed ({}), using defaults without browser user agent",
                    e
                );
                reqwest::Client::default()
            });

        Self {
            client,
            metadata_timeout: Duration::from_secs(config.timeouts.metadata_secs),
            headers_timeout: Duration::from_secs(config.timeouts.media_headers_secs),
            chunk_idle: Duration::from_secs(config.timeouts.chunk_idle_secs),
        }
    }
}

fn map_send_error(url: &str, err: reqwest::Error, timeout: Duration) -> RelayError {
    if err.is_timeout() {
        RelayError::timeout(url, timeout.as_secs())
    } else {
        RelayError::fetch(url, err.to_string())
    }
}

#[async_trait]
impl MediaFetcher for HttpFetcher {
    async fn fetch_page(&self, url: &str) -> Result<String, RelayError> {
        tracing::debug!("[fetch] page {}", url);

        let response = self
            .client
            .get(url)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .header("Accept-Language", "en-US,en;q=0.9")
            .timeout(self.metadata_timeout)
            .send()
            .await
            .map_err(|e| map_send_error(url, e, self.metadata_timeout))?;

        if !response.status().is_success() {
            return Err(RelayError::fetch(url, format!("HTTP {}", response.status())));
        }

        response
            .text()
            .await
            .map_err(|e| map_send_error(url, e, self.metadata_timeout))
    }

    async fn fetch_stream(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<FetchedStream, RelayError> {
        tracing::debug!("[fetch] stream {}", url);

        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = match tokio::time::timeout(self.headers_timeout, request.send()).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(map_send_error(url, e, self.headers_timeout)),
            Err(_) => return Err(RelayError::timeout(url, self.headers_timeout.as_secs())),
        };

        if !response.status().is_success() {
            return Err(RelayError::fetch(url, format!("HTTP {}", response.status())));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let content_length = response.content_length();
        let final_url = response.url().to_string();

        let idle = self.chunk_idle;
        let origin = url.to_string();
        let chunks = Box::pin(response.bytes_stream());
        let body = futures::stream::unfold((chunks, origin), move |(mut chunks, origin)| async move {
            match tokio::time::timeout(idle, chunks.next()).await {
                Ok(Some(Ok(chunk))) => Some((Ok(chunk), (chunks, origin))),
                Ok(Some(Err(e))) => {
                    let err = RelayError::fetch(&origin, e.to_string());
                    Some((Err(err), (chunks, origin)))
                }
                Ok(None) => None,
                Err(_) => {
                    let err = RelayError::timeout(&origin, idle.as_secs());
                    Some((Err(err), (chunks, origin)))
                }
            }
        })
        .boxed();

        Ok(FetchedStream {
            final_url,
            content_type,
            content_length,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use wiremock::matchers::{header_regex, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(&ServerConfig::default())
    }

    #[tokio::test]
    async fn fetch_page_sends_browser_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/p/abc/"))
            .and(header_regex("user-agent", "Mozilla/5.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .expect(1)
            .mount(&server)
            .await;

        let html = fetcher()
            .fetch_page(&format!("{}/p/abc/", server.uri()))
            .await
            .unwrap();
        assert_eq!(html, "<html></html>");
    }

    #[tokio::test]
    async fn fetch_page_non_success_is_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = fetcher().fetch_page(&server.uri()).await.unwrap_err();
        assert!(matches!(err, RelayError::UpstreamFetchError { .. }));
    }

    #[tokio::test]
    async fn fetch_page_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_delay(std::time::Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let mut config = ServerConfig::default();
        config.timeouts.metadata_secs = 1;
        let err = HttpFetcher::new(&config)
            .fetch_page(&server.uri())
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::UpstreamTimeout { .. }));
    }

    #[tokio::test]
    async fn fetch_stream_yields_body_and_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/clip.mp4"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "video/mp4")
                    .set_body_bytes(b"0123456789".to_vec()),
            )
            .mount(&server)
            .await;

        let fetched = fetcher()
            .fetch_stream(&format!("{}/clip.mp4", server.uri()), &[])
            .await
            .unwrap();
        assert_eq!(fetched.content_type.as_deref(), Some("video/mp4"));
        assert_eq!(fetched.content_length, Some(10));

        let chunks: Vec<_> = fetched.body.collect().await;
        let bytes: Vec<u8> = chunks
            .into_iter()
            .flat_map(|c| c.unwrap().to_vec())
            .collect();
        assert_eq!(bytes, b"0123456789");
    }

    #[tokio::test]
    async fn fetch_stream_forwards_extra_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header_regex("referer", "^https://www.youtube.com/$"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ok".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let headers = vec![("Referer".to_string(), "https://www.youtube.com/".to_string())];
        let fetched = fetcher().fetch_stream(&server.uri(), &headers).await;
        assert!(fetched.is_ok());
    }

    /// Origin that reads the request, writes `reply` and then holds the socket open.
    async fn stalling_origin(reply: &'static [u8]) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            if !reply.is_empty() {
                socket.write_all(reply).await.unwrap();
                socket.flush().await.unwrap();
            }
            tokio::time::sleep(std::time::Duration::from_secs(30)).await;
            drop(socket);
        });

        format!("http://{}/clip.mp4", addr)
    }

    #[tokio::test]
    async fn fetch_stream_times_out_waiting_for_headers() {
        let url = stalling_origin(b"").await;

        let mut config = ServerConfig::default();
        config.timeouts.media_headers_secs = 1;
        let err = HttpFetcher::new(&config)
            .fetch_stream(&url, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::UpstreamTimeout { seconds: 1, .. }));
    }

    #[tokio::test]
    async fn fetch_stream_times_out_when_body_stalls() {
        let url = stalling_origin(
            b"HTTP/1.1 200 OK\r\nContent-Type: video/mp4\r\nContent-Length: 100\r\n\r\nabcd",
        )
        .await;

        let mut config = ServerConfig::default();
        config.timeouts.chunk_idle_secs = 1;
        let mut fetched = HttpFetcher::new(&config)
            .fetch_stream(&url, &[])
            .await
            .unwrap();
        assert_eq!(fetched.content_type.as_deref(), Some("video/mp4"));

        let mut received = Vec::new();
        let err = loop {
            match fetched.body.next().await {
                Some(Ok(chunk)) => received.extend_from_slice(&chunk),
                Some(Err(e)) => break e,
                None => panic!("stream ended without an idle timeout"),
            }
        };
        assert_eq!(received, b"abcd");
        assert!(matches!(err, RelayError::UpstreamTimeout { seconds: 1, .. }));
    }

    #[tokio::test]
    async fn invalid_user_agent_falls_back_to_default_client() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let config = ServerConfig {
            user_agent: "bad\nagent".to_string(),
            ..ServerConfig::default()
        };
        let html = HttpFetcher::new(&config).fetch_page(&server.uri()).await.unwrap();
        assert_eq!(html, "ok");
    }

    #[tokio::test]
    async fn fetch_stream_rejects_non_success_before_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = fetcher().fetch_stream(&server.uri(), &[]).await.unwrap_err();
        assert!(matches!(err, RelayError::UpstreamFetchError { .. }));
    }
}
