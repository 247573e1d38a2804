//! Widget configuration.

use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

pub const API_BASE_URL_VAR: &str = "CONTEXT_API_BASE_URL";
pub const API_TIMEOUT_VAR: &str = "CONTEXT_API_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetConfig {
    /// Root of the customer context API; `/customer/{id}/context` is appended.
    pub api_base_url: Url,
    /// `None` means no timeout: a hung request leaves the page in Loading.
    pub request_timeout: Option<Duration>,
}

impl WidgetConfig {
    pub fn new(api_base_url: &str) -> Result<Self, ConfigError> {
        let url = Url::parse(api_base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: api_base_url.to_string(),
            reason: e.to_string(),
        })?;
        if url.cannot_be_a_base() {
            return Err(ConfigError::InvalidBaseUrl {
                url: api_base_url.to_string(),
                reason: "URL cannot carry path segments".to_string(),
            });
        }

        Ok(Self {
            api_base_url: url,
            request_timeout: None,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Read `CONTEXT_API_BASE_URL` and the optional `CONTEXT_API_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base = std::env::var(API_BASE_URL_VAR)
            .map_err(|_| ConfigError::MissingVar(API_BASE_URL_VAR))?;
        let timeout = std::env::var(API_TIMEOUT_VAR).ok();
        Self::from_parts(&base, timeout.as_deref())
    }

    fn from_parts(base: &str, timeout_secs: Option<&str>) -> Result<Self, ConfigError> {
        let config = Self::new(base)?;
        match timeout_secs {
            None => Ok(config),
            Some(raw) => {
                let secs = raw
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidValue {
                        var: API_TIMEOUT_VAR,
                        value: raw.to_string(),
                    })?;
                Ok(config.with_timeout(Duration::from_secs(secs)))
            }
        }
    }
}
