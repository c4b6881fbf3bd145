//! Engine configuration types.

use serde::{Deserialize, Serialize};

/// Latest 10-minute mean wind table published by the Observatory.
pub const DEFAULT_WIND_FEED_URL: &str =
    "https://data.weather.gov.hk/weatherAPI/hko_data/regional-weather/latest_10min_wind.csv";

/// Open-data warning detail feed (English).
pub const DEFAULT_WARNING_FEED_URL: &str =
    "https://data.weather.gov.hk/weatherAPI/opendata/weather.php?dataType=warningInfo&lang=en";

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// CSV feed of 10-minute mean wind speeds.
    #[serde(default = "default_wind_feed_url")]
    pub wind_feed_url: String,

    /// JSON feed of active warning details.
    #[serde(default = "default_warning_feed_url")]
    pub warning_feed_url: String,

    /// How long a fetched feed stays valid (seconds).
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    /// Per-request HTTP timeout (seconds).
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    /// User-Agent sent with every feed request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

// ── Defaults ──────────────────────────────────────────────────────────

fn default_wind_feed_url() -> String {
    DEFAULT_WIND_FEED_URL.into()
}
fn default_warning_feed_url() -> String {
    DEFAULT_WARNING_FEED_URL.into()
}
fn default_cache_ttl() -> u64 {
    600
}
fn default_http_timeout() -> u64 {
    10
}
fn default_user_agent() -> String {
    concat!("typhoon-signal/", env!("CARGO_PKG_VERSION")).into()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            wind_feed_url: default_wind_feed_url(),
            warning_feed_url: default_warning_feed_url(),
            cache_ttl_secs: default_cache_ttl(),
            http_timeout_secs: default_http_timeout(),
            user_agent: default_user_agent(),
        }
    }
}
