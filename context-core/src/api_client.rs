//! HTTP client for the customer context API.

use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::config::WidgetConfig;
use crate::error::{ConfigError, ContextError};
use crate::types::CustomerContext;

pub struct ContextApiClient {
    http: Client,
    base_url: Url,
}

impl ContextApiClient {
    pub fn new(config: &WidgetConfig) -> Result<Self, ConfigError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: config.api_base_url.clone(),
        })
    }

    /// `{base}/customer/{customer_key}/context`, the key as one path segment.
    pub fn context_url(&self, customer_key: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["customer", customer_key, "context"]);
        }
        url
    }

    pub async fn fetch_context(&self, customer_key: &str) -> Result<CustomerContext, ContextError> {
        let url = self.context_url(customer_key);
        debug!(%url, "Requesting customer context");

        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|source| ContextError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ContextError::Api {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| ContextError::Transport {
                url: url.to_string(),
                source,
            })?;

        CustomerContext::from_slice(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ContextApiClient {
        ContextApiClient::new(&WidgetConfig::new(base).unwrap()).unwrap()
    }

    #[test]
    fn test_context_url_keeps_email_readable() {
        let url = client("https://api.example.com").context_url("a@b.com");
        assert_eq!(url.as_str(), "https://api.example.com/customer/a@b.com/context");
    }

    #[test]
    fn test_context_url_under_base_path() {
        let url = client("https://api.example.com/v1/").context_url("3477");
        assert_eq!(url.as_str(), "https://api.example.com/v1/customer/3477/context");
    }

    #[test]
    fn test_context_url_escapes_slashes_in_key() {
        let url = client("https://api.example.com").context_url("a/b");
        assert_eq!(url.as_str(), "https://api.example.com/customer/a%2Fb/context");
    }
}
