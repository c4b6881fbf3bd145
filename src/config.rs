//! Configuration loader — merges env vars, .env file, and config.toml.

use common::{EngineConfig, Error, Result};
use std::path::Path;

const DEFAULT_CONFIG_PATH: &str = "config.toml";
const MAX_HTTP_TIMEOUT_SECS: u64 = 120;

fn parse_positive_u64(raw: &str, env_name: &str) -> Result<u64> {
    let parsed = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| Error::Config(format!("{env_name} must be an integer > 0")))?;
    if parsed == 0 {
        return Err(Error::Config(format!("{env_name} must be an integer > 0")));
    }
    Ok(parsed)
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

fn validate_config(config: &EngineConfig) -> Result<()> {
    let mut issues: Vec<String> = Vec::new();

    if !is_http_url(&config.wind_feed_url) {
        issues.push("wind_feed_url must be an http(s) URL".into());
    }
    if !is_http_url(&config.warning_feed_url) {
        issues.push("warning_feed_url must be an http(s) URL".into());
    }
    if config.cache_ttl_secs == 0 {
        issues.push("cache_ttl_secs must be > 0".into());
    }
    if config.http_timeout_secs == 0 || config.http_timeout_secs > MAX_HTTP_TIMEOUT_SECS {
        issues.push(format!(
            "http_timeout_secs must be in 1..={MAX_HTTP_TIMEOUT_SECS}"
        ));
    }
    if config.user_agent.trim().is_empty() {
        issues.push("user_agent must not be empty".into());
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "Invalid config:\n - {}",
            issues.join("\n - ")
        )))
    }
}

/// Overlay environment variables (highest priority) onto `config`.
fn apply_env_overrides(
    config: &mut EngineConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    if let Some(url) = lookup("HKO_WIND_FEED_URL") {
        config.wind_feed_url = url.trim().to_string();
    }
    if let Some(url) = lookup("HKO_WARNING_FEED_URL") {
        config.warning_feed_url = url.trim().to_string();
    }
    if let Some(raw) = lookup("SIGNAL_CACHE_TTL_SECS") {
        config.cache_ttl_secs = parse_positive_u64(&raw, "SIGNAL_CACHE_TTL_SECS")?;
    }
    if let Some(raw) = lookup("HKO_HTTP_TIMEOUT_SECS") {
        config.http_timeout_secs = parse_positive_u64(&raw, "HKO_HTTP_TIMEOUT_SECS")?;
    }
    if let Some(agent) = lookup("HKO_USER_AGENT") {
        config.user_agent = agent;
    }
    Ok(())
}

/// Load engine configuration from environment and optional config file.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    // 1. Load .env file from the working directory or its parents.
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }

    // 2. Start with defaults.
    let mut config = EngineConfig::default();

    // 3. An explicit path must exist; the default one is optional.
    let config_path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
    if path.is_some() || config_path.exists() {
        tracing::debug!("Reading config from {}", config_path.display());
        let contents = std::fs::read_to_string(config_path)?;
        config = toml::from_str(&contents).map_err(|e| {
            Error::Config(format!("Failed to parse {}: {}", config_path.display(), e))
        })?;
        tracing::debug!("Loaded config from {}", config_path.display());
    }

    // 4. Override with environment variables.
    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;

    // 5. Validate.
    validate_config(&config)?;

    Ok(config)
}
