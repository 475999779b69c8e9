use std::{env, time::Duration};
use thiserror::Error;

pub const DEFAULT_GEOCODER_URL: &str = "https://map.yahooapis.jp/geocode/V2/geoCoder";
pub const DEFAULT_ZIP_SEARCH_URL: &str = "https://map.yahooapis.jp/search/zip/V1/zipCodeSearch";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("YAHOO_API_KEY is not set")]
    MissingApiKey,

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Everything the Yahoo client needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    pub api_key: String,
    pub geocoder_url: String,
    pub zip_search_url: String,
    pub timeout: Duration,
}

impl GeocoderConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            geocoder_url: DEFAULT_GEOCODER_URL.to_string(),
            zip_search_url: DEFAULT_ZIP_SEARCH_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Reads the credential and optional endpoint overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("YAHOO_API_KEY")
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let mut config = Self::new(api_key);
        if let Some(url) = lookup("YAHOO_GEOCODER_URL") {
            config.geocoder_url = url;
        }
        if let Some(url) = lookup("YAHOO_ZIP_SEARCH_URL") {
            config.zip_search_url = url;
        }
        if let Some(raw) = lookup("YAHOO_TIMEOUT_SECS") {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidValue {
                    name: "YAHOO_TIMEOUT_SECS",
                    value: raw.clone(),
                })?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}
