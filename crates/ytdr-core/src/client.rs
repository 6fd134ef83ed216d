//! HTTP client for YouTube
//!
//! Wraps a `reqwest::Client`, optionally routed through a SOCKS5 proxy,
//! and performs the video info request. Media downloads reuse the same
//! transport (see [`crate::download`]).

use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{Result, YtdrError};
use crate::url::{VIDEO_INFO_ENDPOINT, build_video_info_url};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Connect timeout for every request, and total timeout for the
    /// video info request, in seconds (default: 30)
    pub timeout_secs: u64,
    /// SOCKS5 proxy as `host:port` or a `socks5://`/`socks5h://` URL
    /// (default: None, direct connection)
    pub socks5_proxy: Option<String>,
    /// Video info endpoint (default: [`VIDEO_INFO_ENDPOINT`])
    pub metadata_endpoint: String,
    /// User-Agent header sent with every request
    pub user_agent: String,
    /// Folder used by `start_download_file` (default: None, `~/Movies/youtubedr`)
    pub output_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            socks5_proxy: None,
            metadata_endpoint: VIDEO_INFO_ENDPOINT.to_string(),
            user_agent: USER_AGENT.to_string(),
            output_dir: None,
        }
    }
}

impl ClientConfig {
    /// Default configuration routed through a SOCKS5 proxy
    pub fn with_socks5_proxy(proxy: impl Into<String>) -> Self {
        Self {
            socks5_proxy: Some(proxy.into()),
            ..Self::default()
        }
    }
}

/// Normalizes a proxy setting into a URL reqwest understands
///
/// A bare `host:port` is treated as `socks5://host:port`.
fn socks5_proxy_url(proxy: &str) -> Result<String> {
    let proxy = proxy.trim();
    if proxy.is_empty() {
        return Err(YtdrError::InvalidProxy("proxy address is empty".to_string()));
    }
    if proxy.starts_with("socks5://") || proxy.starts_with("socks5h://") {
        return Ok(proxy.to_string());
    }
    if proxy.contains("://") {
        return Err(YtdrError::InvalidProxy(format!(
            "only SOCKS5 proxies are supported, got '{}'",
            proxy
        )));
    }
    Ok(format!("socks5://{}", proxy))
}

/// HTTP client wrapper used by every network step
pub struct YoutubeClient {
    client: reqwest::Client,
    metadata_endpoint: String,
    timeout: Duration,
}

impl YoutubeClient {
    /// Create a new client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(&ClientConfig::default())
    }

    /// Create a new client with custom configuration
    ///
    /// # Errors
    /// - `InvalidProxy` if the proxy string cannot be used
    /// - `Transport` if the underlying client cannot be built
    pub fn with_config(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str());

        match config.socks5_proxy.as_deref() {
            Some(proxy) => {
                let proxy_url = socks5_proxy_url(proxy)?;
                let proxy = reqwest::Proxy::all(&proxy_url)
                    .map_err(|e| YtdrError::InvalidProxy(format!("{}: {}", proxy_url, e)))?;
                info!("Using http with proxy {}", proxy_url);
                builder = builder.proxy(proxy);
            }
            None => {
                debug!("Using http without proxy");
                builder = builder.no_proxy();
            }
        }

        let client = builder.build().map_err(YtdrError::Transport)?;
        Ok(Self::from_reqwest(client, config))
    }

    /// Wrap an already configured `reqwest::Client`
    ///
    /// Proxy and user agent settings in `config` are ignored; only the
    /// endpoint and timeout are used.
    pub fn from_reqwest(client: reqwest::Client, config: &ClientConfig) -> Self {
        Self {
            client,
            metadata_endpoint: config.metadata_endpoint.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Fetch the raw video info document for a video ID
    ///
    /// Issues a single GET, no retries.
    ///
    /// # Errors
    /// - `Transport` - connection failure or unreadable body
    /// - `UpstreamStatus` - the server answered with a status other than 200
    pub async fn fetch_video_info(&self, video_id: &str) -> Result<String> {
        let url = build_video_info_url(&self.metadata_endpoint, video_id);
        debug!("url: {}", url);

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(YtdrError::Transport)?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(YtdrError::UpstreamStatus {
                status: status.as_u16(),
                url,
            });
        }

        response.text().await.map_err(YtdrError::Transport)
    }

    /// Start a GET for a media URL and check its status
    ///
    /// # Errors
    /// - `Transport` - connection failure
    /// - `UpstreamStatus` - the server answered with a status other than 200
    pub async fn get_media(&self, url: &str) -> Result<reqwest::Response> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(YtdrError::Transport)?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            debug!("non 200 status code received: {}", status);
            return Err(YtdrError::UpstreamStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> ClientConfig {
        ClientConfig {
            metadata_endpoint: format!("{}/get_video_info", server.uri()),
            ..ClientConfig::default()
        }
    }

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.socks5_proxy, None);
        assert_eq!(config.metadata_endpoint, VIDEO_INFO_ENDPOINT);
        assert!(config.output_dir.is_none());
    }

    #[test]
    fn test_client_creation() {
        assert!(YoutubeClient::new().is_ok());
    }

    #[test]
    fn test_client_with_socks5_proxy() {
        let config = ClientConfig::with_socks5_proxy("127.0.0.1:1080");
        assert!(YoutubeClient::with_config(&config).is_ok());
    }

    #[test]
    fn test_socks5_proxy_url_normalization() {
        assert_eq!(socks5_proxy_url("127.0.0.1:1080").unwrap(), "socks5://127.0.0.1:1080");
        assert_eq!(
            socks5_proxy_url("socks5h://proxy.local:9050").unwrap(),
            "socks5h://proxy.local:9050"
        );
    }

    #[test]
    fn test_socks5_proxy_url_rejects_other_schemes() {
        assert!(matches!(
            socks5_proxy_url("http://proxy.local:3128"),
            Err(YtdrError::InvalidProxy(_))
        ));
        assert!(matches!(socks5_proxy_url("  "), Err(YtdrError::InvalidProxy(_))));
    }

    #[tokio::test]
    async fn test_fetch_video_info_sends_id_and_eurl() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get_video_info"))
            .and(query_param("video_id", "dQw4w9WgXcQ"))
            .and(query_param("eurl", "https://youtube.googleapis.com/v/dQw4w9WgXcQ"))
            .respond_with(ResponseTemplate::new(200).set_body_string("status=ok"))
            .expect(1)
            .mount(&server)
            .await;

        let client = YoutubeClient::with_config(&config_for(&server)).unwrap();
        let body = client.fetch_video_info("dQw4w9WgXcQ").await.unwrap();
        assert_eq!(body, "status=ok");
    }

    #[tokio::test]
    async fn test_fetch_video_info_non_200() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get_video_info"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = YoutubeClient::with_config(&config_for(&server)).unwrap();
        match client.fetch_video_info("dQw4w9WgXcQ").await {
            Err(YtdrError::UpstreamStatus { status, .. }) => assert_eq!(status, 404),
            other => panic!("Expected UpstreamStatus error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_video_info_connection_refused() {
        let config = ClientConfig {
            metadata_endpoint: "http://127.0.0.1:1/get_video_info".to_string(),
            timeout_secs: 2,
            ..ClientConfig::default()
        };
        let client = YoutubeClient::with_config(&config).unwrap();
        assert!(matches!(
            client.fetch_video_info("dQw4w9WgXcQ").await,
            Err(YtdrError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_get_media_non_200() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/videoplayback"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let client = YoutubeClient::new().unwrap();
        let url = format!("{}/videoplayback", server.uri());
        match client.get_media(&url).await {
            Err(YtdrError::UpstreamStatus { status, url: failed }) => {
                assert_eq!(status, 403);
                assert_eq!(failed, url);
            }
            other => panic!("Expected UpstreamStatus error, got {:?}", other.map(|r| r.status())),
        }
    }
}
