//! Monitor configuration.

use std::time::Duration;

use serde::Deserialize;

/// Configuration for the presence monitor service.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Listen address for the JSON API (e.g., "0.0.0.0:8080").
    #[serde(default = "MonitorConfig::default_listen_addr")]
    pub listen_addr: String,

    /// Automatic refresh interval in seconds.
    #[serde(default = "MonitorConfig::default_refresh_interval")]
    pub refresh_interval_seconds: u64,

    /// Users requested per listing. Only the first page is fetched.
    #[serde(default = "MonitorConfig::default_page_size")]
    pub page_size: u32,

    /// Presence source identifier sent with each lookup.
    #[serde(default = "MonitorConfig::default_presence_source")]
    pub presence_source: String,

    /// Upper bound on a single presence lookup, in seconds.
    #[serde(default = "MonitorConfig::default_lookup_timeout")]
    pub lookup_timeout_seconds: u64,

    /// Timeout for every platform HTTP request, in seconds.
    #[serde(default = "MonitorConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl MonitorConfig {
    fn default_listen_addr() -> String {
        "0.0.0.0:8080".to_string()
    }

    const fn default_refresh_interval() -> u64 {
        30
    }

    const fn default_page_size() -> u32 {
        100
    }

    fn default_presence_source() -> String {
        "PURECLOUD".to_string()
    }

    const fn default_lookup_timeout() -> u64 {
        10
    }

    const fn default_request_timeout() -> u64 {
        30
    }

    /// Load configuration from environment variables.
    ///
    /// Supported environment variables:
    /// - `LISTEN_ADDR`: listen address for the JSON API
    /// - `REFRESH_INTERVAL_SECONDS`: automatic refresh interval
    /// - `USER_PAGE_SIZE`: users requested per listing
    /// - `PRESENCE_SOURCE_ID`: presence source identifier
    /// - `PRESENCE_LOOKUP_TIMEOUT_SECONDS`: per-lookup timeout
    /// - `REQUEST_TIMEOUT_SECONDS`: platform HTTP request timeout
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("LISTEN_ADDR") {
            config.listen_addr = val;
        }
        if let Ok(val) = std::env::var("REFRESH_INTERVAL_SECONDS") {
            if let Ok(n) = val.parse() {
                config.refresh_interval_seconds = n;
            }
        }
        if let Ok(val) = std::env::var("USER_PAGE_SIZE") {
            if let Ok(n) = val.parse() {
                config.page_size = n;
            }
        }
        if let Ok(val) = std::env::var("PRESENCE_SOURCE_ID") {
            config.presence_source = val;
        }
        if let Ok(val) = std::env::var("PRESENCE_LOOKUP_TIMEOUT_SECONDS") {
            if let Ok(n) = val.parse() {
                config.lookup_timeout_seconds = n;
            }
        }
        if let Ok(val) = std::env::var("REQUEST_TIMEOUT_SECONDS") {
            if let Ok(n) = val.parse() {
                config.request_timeout_seconds = n;
            }
        }

        config
    }

    /// Get the refresh interval as a `Duration`.
    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_seconds.max(1))
    }

    /// Get the presence lookup timeout as a `Duration`.
    #[must_use]
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_seconds)
    }

    /// Get the request timeout as a `Duration`.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            listen_addr: Self::default_listen_addr(),
            refresh_interval_seconds: Self::default_refresh_interval(),
            page_size: Self::default_page_size(),
            presence_source: Self::default_presence_source(),
            lookup_timeout_seconds: Self::default_lookup_timeout(),
            request_timeout_seconds: Self::default_request_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = MonitorConfig::default();
        assert_eq!(config.listen_addr, "0.0.0.0:8080");
        assert_eq!(config.refresh_interval_seconds, 30);
        assert_eq!(config.page_size, 100);
        assert_eq!(config.presence_source, "PURECLOUD");
        assert_eq!(config.lookup_timeout_seconds, 10);
    }

    #[test]
    fn durations() {
        let config = MonitorConfig::default();
        assert_eq!(config.refresh_interval(), Duration::from_secs(30));
        assert_eq!(config.lookup_timeout(), Duration::from_secs(10));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn zero_interval_is_clamped() {
        let config = MonitorConfig {
            refresh_interval_seconds: 0,
            ..MonitorConfig::default()
        };
        assert_eq!(config.refresh_interval(), Duration::from_secs(1));
    }

    #[test]
    fn deserialize_with_defaults() {
        let config: MonitorConfig =
            serde_json::from_str(r#"{"page_size": 25, "presence_source": "CUSTOM"}"#).unwrap();
        assert_eq!(config.page_size, 25);
        assert_eq!(config.presence_source, "CUSTOM");
        assert_eq!(config.refresh_interval_seconds, 30);
    }
}
