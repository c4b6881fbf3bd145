//! Hong Kong Observatory open-data client.
//!
//! Fetches the 10-minute mean wind table and the warning-detail feed and
//! converts them to the shared `WindReading` / `OfficialWarning` types.

pub mod warning;
pub mod wind;

use std::time::Duration;

use async_trait::async_trait;
use common::{EngineConfig, Error, OfficialWarning, WindReading};
use tracing::debug;

pub use warning::{parse_warning_feed, TcSignal};
pub use wind::parse_wind_table;

/// Longest slice of an error body carried into an error message.
const ERROR_BODY_CHARS: usize = 500;

/// The two upstream feeds the signal engine consumes.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Every row of the wind table, reference or not.
    async fn fetch_readings(&self) -> Result<Vec<WindReading>, Error>;

    /// The tropical cyclone signal currently in force.
    async fn fetch_official_signal(&self) -> Result<OfficialWarning, Error>;
}

/// HKO client with connection pooling and a bounded request timeout.
#[derive(Debug, Clone)]
pub struct HkoClient {
    client: reqwest::Client,
    wind_feed_url: String,
    warning_feed_url: String,
    timeout: Duration,
}

impl HkoClient {
    pub fn new(config: &EngineConfig) -> Result<Self, Error> {
        let timeout = Duration::from_secs(config.http_timeout_secs);
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .pool_max_idle_per_host(2)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HKO HTTP client: {e}")))?;

        Ok(Self {
            client,
            wind_feed_url: config.wind_feed_url.clone(),
            warning_feed_url: config.warning_feed_url.clone(),
            timeout,
        })
    }

    /// Fetch and parse the wind table.
    pub async fn fetch_readings(&self) -> Result<Vec<WindReading>, Error> {
        let body = self.get_text(&self.wind_feed_url, "wind").await?;
        parse_wind_table(&body)
    }

    /// Fetch the warning feed and resolve the tropical cyclone signal.
    pub async fn fetch_official_signal(&self) -> Result<OfficialWarning, Error> {
        let body = self.get_text(&self.warning_feed_url, "warning").await?;
        parse_warning_feed(&body)
    }

    async fn get_text(&self, url: &str, feed: &str) -> Result<String, Error> {
        debug!("Fetching HKO {} feed: {}", feed, url);

        let resp = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Fetch(format!(
                    "{feed} feed timed out after {}s",
                    self.timeout.as_secs()
                ))
            } else {
                Error::Fetch(format!("HTTP error for {feed} feed: {e}"))
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(ERROR_BODY_CHARS).collect();
            return Err(Error::Fetch(format!(
                "HKO {feed} feed returned {}: {}",
                status.as_u16(),
                snippet
            )));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| Error::Fetch(format!("failed reading {feed} feed body: {e}")))?;

        debug!("HKO {} feed returned {} bytes", feed, body.len());
        Ok(body)
    }
}

#[async_trait]
impl FeedSource for HkoClient {
    async fn fetch_readings(&self) -> Result<Vec<WindReading>, Error> {
        HkoClient::fetch_readings(self).await
    }

    async fn fetch_official_signal(&self) -> Result<OfficialWarning, Error> {
        HkoClient::fetch_official_signal(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Config pointing both feeds at a local listener.
    fn local_config(addr: std::net::SocketAddr, timeout_secs: u64) -> EngineConfig {
        EngineConfig {
            wind_feed_url: format!("http://{addr}/latest_10min_wind.csv"),
            warning_feed_url: format!("http://{addr}/warningInfo"),
            http_timeout_secs: timeout_secs,
            ..EngineConfig::default()
        }
    }

    #[test]
    fn test_client_builds_from_default_config() {
        let client = HkoClient::new(&EngineConfig::default()).unwrap();
        assert_eq!(client.timeout, Duration::from_secs(10));
        assert!(client.wind_feed_url.ends_with("latest_10min_wind.csv"));
        assert!(client.warning_feed_url.contains("warningInfo"));
    }

    #[tokio::test]
    async fn test_unreachable_feed_is_fetch_error() {
        let config = EngineConfig {
            wind_feed_url: "http://127.0.0.1:1/latest_10min_wind.csv".into(),
            warning_feed_url: "http://127.0.0.1:1/warningInfo".into(),
            http_timeout_secs: 2,
            ..EngineConfig::default()
        };
        let client = HkoClient::new(&config).unwrap();

        assert!(client.fetch_readings().await.unwrap_err().is_fetch());
        assert!(client.fetch_official_signal().await.unwrap_err().is_fetch());
    }

    #[tokio::test]
    async fn test_non_success_status_is_fetch_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf).await;
                let body = "Service Unavailable";
                let response = format!(
                    "HTTP/1.1 503 Service Unavailable\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        let client = HkoClient::new(&local_config(addr, 5)).unwrap();

        let err = client.fetch_readings().await.unwrap_err();
        assert!(err.is_fetch());
        assert!(err.to_string().contains("503"), "{err}");

        let err = client.fetch_official_signal().await.unwrap_err();
        assert!(err.is_fetch());
        assert!(err.to_string().contains("503"), "{err}");
    }

    #[tokio::test]
    async fn test_silent_upstream_times_out_as_fetch_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            // Accept and never answer.
            while let Ok((stream, _)) = listener.accept().await {
                held.push(stream);
            }
        });

        let client = HkoClient::new(&local_config(addr, 1)).unwrap();

        let err = client.fetch_readings().await.unwrap_err();
        assert!(err.is_fetch());
        assert!(err.to_string().contains("timed out after 1s"), "{err}");
    }
}
