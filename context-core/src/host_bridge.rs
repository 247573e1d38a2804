//! Host Bridge: the only boundary between the widget and the CRM platform.
//!
//! The loader only ever talks to the host through this trait, so the embedded
//! SDK, the CRM REST API and test doubles are interchangeable.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::HostBridgeError;
use crate::types::Record;

pub type Result<T> = std::result::Result<T, HostBridgeError>;

/// CRM module name, e.g. `Contacts` or `Leads`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityType(pub String);

impl EntityType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Arguments of the host's record fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordRequest {
    #[serde(rename = "Entity")]
    pub entity: EntityType,
    #[serde(rename = "RecordID")]
    pub record_id: String,
}

/// Record fetch envelope, `{ "data": [ ... ] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordResponse {
    #[serde(default)]
    pub data: Vec<Record>,
}

#[async_trait]
pub trait HostBridge: Send + Sync {
    /// Initialise the host SDK. Called once before any event is handled.
    async fn init(&self) -> Result<()>;

    /// Entity type of the record view the widget is embedded in.
    fn current_entity(&self) -> EntityType;

    async fn get_record(&self, request: RecordRequest) -> Result<RecordResponse>;
}

// ============================================================================
// MemoryHostBridge
// ============================================================================

/// In-memory bridge serving fixed records. Used by tests and by the
/// `--fixture` mode of the preview server.
#[derive(Debug, Clone)]
pub struct MemoryHostBridge {
    entity: EntityType,
    records: HashMap<String, Vec<Record>>,
    reject_with: Option<String>,
}

/// On-disk fixture layout: `{"entity": "Contacts", "records": {"<id>": {...}}}`.
#[derive(Debug, Deserialize)]
struct Fixture {
    entity: EntityType,
    #[serde(default)]
    records: HashMap<String, Record>,
}

impl MemoryHostBridge {
    pub fn new(entity: EntityType) -> Self {
        Self {
            entity,
            records: HashMap::new(),
            reject_with: None,
        }
    }

    /// Register a record. Unknown ids resolve with an empty `data` array.
    pub fn with_record(mut self, record_id: &str, record: Record) -> Self {
        self.records
            .entry(record_id.to_string())
            .or_default()
            .push(record);
        self
    }

    /// Make every `get_record` call fail, as a host without permission would.
    pub fn rejecting(mut self, reason: &str) -> Self {
        self.reject_with = Some(reason.to_string());
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let fixture: Fixture = serde_json::from_str(json)?;
        let mut bridge = Self::new(fixture.entity);
        for (id, record) in fixture.records {
            bridge = bridge.with_record(&id, record);
        }
        Ok(bridge)
    }

    pub fn from_fixture_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| HostBridgeError::Fixture {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }
}

#[async_trait]
impl HostBridge for MemoryHostBridge {
    async fn init(&self) -> Result<()> {
        Ok(())
    }

    fn current_entity(&self) -> EntityType {
        self.entity.clone()
    }

    async fn get_record(&self, request: RecordRequest) -> Result<RecordResponse> {
        if let Some(reason) = &self.reject_with {
            return Err(HostBridgeError::Rejected(reason.clone()));
        }
        if request.entity != self.entity {
            return Err(HostBridgeError::Rejected(format!(
                "unknown entity {}",
                request.entity
            )));
        }

        Ok(RecordResponse {
            data: self
                .records
                .get(&request.record_id)
                .cloned()
                .unwrap_or_default(),
        })
    }
}

// ============================================================================
// RestHostBridge
// ============================================================================

/// Reads records through the CRM REST API:
/// `GET {base}/crm/v2/{Entity}/{RecordID}` with an OAuth token header.
pub struct RestHostBridge {
    http: reqwest::Client,
    base_url: url::Url,
    oauth_token: String,
    entity: EntityType,
}

impl RestHostBridge {
    pub fn new(base_url: url::Url, oauth_token: String, entity: EntityType) -> Result<Self> {
        if base_url.cannot_be_a_base() {
            return Err(HostBridgeError::Rejected(format!(
                "CRM base URL cannot carry a path: {base_url}"
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url,
            oauth_token,
            entity,
        })
    }

    fn record_url(&self, request: &RecordRequest) -> url::Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend([
                "crm",
                "v2",
                request.entity.as_str(),
                request.record_id.as_str(),
            ]);
        }
        url
    }
}

#[async_trait]
impl HostBridge for RestHostBridge {
    async fn init(&self) -> Result<()> {
        info!(base_url = %self.base_url, entity = %self.entity, "CRM REST bridge ready");
        Ok(())
    }

    fn current_entity(&self) -> EntityType {
        self.entity.clone()
    }

    async fn get_record(&self, request: RecordRequest) -> Result<RecordResponse> {
        let url = self.record_url(&request);
        debug!(%url, "Fetching CRM record");

        let response = self
            .http
            .get(url)
            .header(
                "Authorization",
                format!("Zoho-oauthtoken {}", self.oauth_token),
            )
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        // The CRM answers 204 for ids that do not exist.
        if status == reqwest::StatusCode::NO_CONTENT {
            return Ok(RecordResponse::default());
        }
        if !status.is_success() {
            return Err(HostBridgeError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn contacts() -> EntityType {
        EntityType::new("Contacts")
    }

    #[tokio::test]
    async fn test_memory_bridge_returns_registered_record() {
        let record = json!({"Email": "a@b.com"}).as_object().cloned().unwrap();
        let bridge = MemoryHostBridge::new(contacts()).with_record("1", record.clone());

        let response = bridge
            .get_record(RecordRequest {
                entity: contacts(),
                record_id: "1".into(),
            })
            .await
            .unwrap();
        assert_eq!(response.data, vec![record]);
    }

    #[tokio::test]
    async fn test_memory_bridge_unknown_id_is_empty() {
        let bridge = MemoryHostBridge::new(contacts());
        let response = bridge
            .get_record(RecordRequest {
                entity: contacts(),
                record_id: "missing".into(),
            })
            .await
            .unwrap();
        assert!(response.data.is_empty());
    }

    #[tokio::test]
    async fn test_memory_bridge_rejects_other_entity() {
        let bridge = MemoryHostBridge::new(contacts());
        let err = bridge
            .get_record(RecordRequest {
                entity: EntityType::new("Leads"),
                record_id: "1".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, HostBridgeError::Rejected(_)));
    }

    #[test]
    fn test_fixture_json() {
        let bridge = MemoryHostBridge::from_json(
            r#"{"entity": "Leads", "records": {"77": {"Email": "x@y.io"}}}"#,
        )
        .unwrap();
        assert_eq!(bridge.current_entity(), EntityType::new("Leads"));
        assert_eq!(bridge.records["77"].len(), 1);
    }

    #[test]
    fn test_record_request_uses_sdk_field_names() {
        let value = serde_json::to_value(RecordRequest {
            entity: contacts(),
            record_id: "9".into(),
        })
        .unwrap();
        assert_eq!(value, json!({"Entity": "Contacts", "RecordID": "9"}));
    }

    #[test]
    fn test_rest_record_url() {
        let bridge = RestHostBridge::new(
            url::Url::parse("https://www.zohoapis.com/").unwrap(),
            "token".into(),
            contacts(),
        )
        .unwrap();
        let url = bridge.record_url(&RecordRequest {
            entity: contacts(),
            record_id: "3477".into(),
        });
        assert_eq!(url.as_str(), "https://www.zohoapis.com/crm/v2/Contacts/3477");
    }
}
