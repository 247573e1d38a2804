//! Error types for the customer context widget.
//!
//! Every failure in the load sequence maps to exactly one `ContextError`
//! variant. The widget shows a single generic error panel for all of them;
//! `ContextError::kind` only exists so logs can tell them apart.

use thiserror::Error;

/// Failure while talking to the host platform.
#[derive(Debug, Error)]
pub enum HostBridgeError {
    /// The host refused the call (unknown entity, permissions, SDK not ready).
    #[error("host rejected request: {0}")]
    Rejected(String),

    /// The CRM REST endpoint could not be reached.
    #[error("CRM request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The CRM REST endpoint answered with a non-success status.
    #[error("CRM API error: {status}")]
    Status { status: u16 },

    /// The host answered with something that is not a record envelope.
    #[error("CRM response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),

    /// Fixture file could not be read.
    #[error("failed to read fixture {path}: {source}")]
    Fixture {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failure anywhere in resolve → fetch → parse.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("host bridge error: {0}")]
    HostBridge(#[from] HostBridgeError),

    /// The host resolved the record fetch with an empty `data` array.
    #[error("host returned no record for {record_id}")]
    RecordNotFound { record_id: String },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("API Error: {status}")]
    Api { status: u16 },

    /// Body was not JSON, or did not match the customer context shape.
    #[error("malformed customer context: {0}")]
    MalformedResponse(String),

    #[error("render failed: {0}")]
    Render(#[from] RenderError),
}

impl ContextError {
    /// Short, stable name of the failure kind, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            ContextError::HostBridge(_) => "host_bridge",
            ContextError::RecordNotFound { .. } => "record_not_found",
            ContextError::Transport { .. } => "transport",
            ContextError::Api { .. } => "api_status",
            ContextError::MalformedResponse(_) => "malformed_response",
            ContextError::Render(_) => "render",
        }
    }
}

/// Failure in the handlebars layer.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template registration failed: {0}")]
    Template(String),

    #[error("template render failed: {0}")]
    Render(String),
}

/// Invalid widget configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid base URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("failed to set up templates: {0}")]
    Templates(#[from] RenderError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_are_distinct() {
        let errors = vec![
            ContextError::HostBridge(HostBridgeError::Rejected("no sdk".into())),
            ContextError::RecordNotFound {
                record_id: "42".into(),
            },
            ContextError::Api { status: 500 },
            ContextError::MalformedResponse("missing field `summary`".into()),
            ContextError::Render(RenderError::Render("missing template".into())),
        ];

        let mut kinds: Vec<&str> = errors.iter().map(ContextError::kind).collect();
        kinds.sort_unstable();
        kinds.dedup();
        assert_eq!(kinds.len(), errors.len());
    }

    #[test]
    fn test_api_error_message_carries_status() {
        let err = ContextError::Api { status: 404 };
        assert_eq!(err.to_string(), "API Error: 404");
    }
}
