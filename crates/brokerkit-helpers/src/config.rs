//! Helper configuration.

use std::str::FromStr;

use thiserror::Error;

/// Environment variable selecting paper trading.
pub const ENV_PAPER: &str = "BROKERKIT_PAPER";
/// Environment variable selecting the stock data feed.
pub const ENV_FEED: &str = "BROKERKIT_FEED";
/// Environment variable selecting the crypto venue location.
pub const ENV_CRYPTO_LOCATION: &str = "BROKERKIT_CRYPTO_LOCATION";
/// Environment variable overriding the default news lookback in days.
pub const ENV_NEWS_DAYS_BACK: &str = "BROKERKIT_NEWS_DAYS_BACK";

/// Stock market-data feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DataFeed {
    /// Investors Exchange only.
    #[default]
    Iex,
    /// Consolidated feed from all US exchanges.
    Sip,
    /// Consolidated feed delayed by 15 minutes.
    DelayedSip,
    /// Over-the-counter venues.
    Otc,
}

impl DataFeed {
    /// Returns the upstream parameter value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Iex => "iex",
            Self::Sip => "sip",
            Self::DelayedSip => "delayed_sip",
            Self::Otc => "otc",
        }
    }
}

impl std::fmt::Display for DataFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataFeed {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "iex" => Ok(Self::Iex),
            "sip" => Ok(Self::Sip),
            "delayed_sip" => Ok(Self::DelayedSip),
            "otc" => Ok(Self::Otc),
            _ => Err(ConfigError::invalid(ENV_FEED, s, "expected iex, sip, delayed_sip or otc")),
        }
    }
}

/// Errors raised while reading configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A value could not be interpreted.
    #[error("Invalid value '{value}' for {key}: {reason}")]
    Invalid {
        /// Setting name.
        key: &'static str,
        /// Offending value.
        value: String,
        /// What was expected.
        reason: &'static str,
    },
}

impl ConfigError {
    fn invalid(key: &'static str, value: &str, reason: &'static str) -> Self {
        Self::Invalid {
            key,
            value: value.to_string(),
            reason,
        }
    }
}

/// Settings shared by every helper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelperConfig {
    /// Trade against the paper environment.
    pub paper: bool,
    /// Stock market-data feed.
    pub feed: DataFeed,
    /// Crypto venue location (e.g. `us`).
    pub crypto_location: String,
    /// Lookback for news queries that carry no time inputs.
    pub news_days_back: u32,
}

impl Default for HelperConfig {
    fn default() -> Self {
        Self {
            paper: true,
            feed: DataFeed::Iex,
            crypto_location: "us".to_string(),
            news_days_back: 7,
        }
    }
}

impl HelperConfig {
    /// Reads overrides from the `BROKERKIT_*` environment variables.
    ///
    /// Unset variables keep their default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a set but malformed variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads overrides through `lookup`, which maps a variable name to its value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a present but malformed value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_PAPER) {
            config.paper = parse_flag(&value)
                .ok_or_else(|| ConfigError::invalid(ENV_PAPER, &value, "expected true or false"))?;
        }
        if let Some(value) = lookup(ENV_FEED) {
            config.feed = value.parse()?;
        }
        if let Some(value) = lookup(ENV_CRYPTO_LOCATION) {
            let location = value.trim();
            if location.is_empty() {
                return Err(ConfigError::invalid(ENV_CRYPTO_LOCATION, &value, "must not be empty"));
            }
            config.crypto_location = location.to_ascii_lowercase();
        }
        if let Some(value) = lookup(ENV_NEWS_DAYS_BACK) {
            config.news_days_back = value
                .trim()
                .parse()
                .ok()
                .filter(|days| *days > 0)
                .ok_or_else(|| {
                    ConfigError::invalid(ENV_NEWS_DAYS_BACK, &value, "expected a positive integer")
                })?;
        }

        tracing::debug!(?config, "helper configuration loaded");
        Ok(config)
    }

    /// Sets paper trading.
    #[must_use]
    pub const fn with_paper(mut self, paper: bool) -> Self {
        self.paper = paper;
        self
    }

    /// Sets the stock data feed.
    #[must_use]
    pub const fn with_feed(mut self, feed: DataFeed) -> Self {
        self.feed = feed;
        self
    }

    /// Sets the crypto venue location.
    #[must_use]
    pub fn with_crypto_location(mut self, location: impl Into<String>) -> Self {
        self.crypto_location = location.into();
        self
    }

    /// Sets the default news lookback.
    #[must_use]
    pub const fn with_news_days_back(mut self, days: u32) -> Self {
        self.news_days_back = days;
        self
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = HelperConfig::default();
        assert!(config.paper);
        assert_eq!(config.feed, DataFeed::Iex);
        assert_eq!(config.crypto_location, "us");
        assert_eq!(config.news_days_back, 7);
        assert_eq!(HelperConfig::from_lookup(lookup(&[])).unwrap(), config);
    }

    #[test]
    fn test_overrides() {
        let config = HelperConfig::from_lookup(lookup(&[
            (ENV_PAPER, "false"),
            (ENV_FEED, "SIP"),
            (ENV_CRYPTO_LOCATION, " EU1 "),
            (ENV_NEWS_DAYS_BACK, "3"),
        ]))
        .unwrap();
        assert!(!config.paper);
        assert_eq!(config.feed, DataFeed::Sip);
        assert_eq!(config.crypto_location, "eu1");
        assert_eq!(config.news_days_back, 3);
    }

    #[test]
    fn test_malformed_values() {
        for (key, value) in [
            (ENV_PAPER, "maybe"),
            (ENV_FEED, "nasdaq"),
            (ENV_CRYPTO_LOCATION, "  "),
            (ENV_NEWS_DAYS_BACK, "0"),
            (ENV_NEWS_DAYS_BACK, "-1"),
        ] {
            let err = HelperConfig::from_lookup(lookup(&[(key, value)])).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { key: k, .. } if k == key), "{key}={value}");
        }
    }

    #[test]
    fn test_builders() {
        let config = HelperConfig::default()
            .with_paper(false)
            .with_feed(DataFeed::Otc)
            .with_crypto_location("eu1")
            .with_news_days_back(30);
        assert_eq!(config.feed.to_string(), "otc");
        assert_eq!(config.news_days_back, 30);
    }
}
