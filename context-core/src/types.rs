//! Payload and record types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A CRM record as returned by the host, field name → value.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Host record field holding the customer's email address.
pub const EMAIL_FIELD: &str = "Email";

// ============================================================================
// Record reference
// ============================================================================

/// Identifier of the record the widget was opened on, plus the email read
/// from that record (if any).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordReference {
    pub record_id: String,
    pub email: Option<String>,
}

impl RecordReference {
    /// Build from the first record the host returned. A missing, `null`,
    /// empty or non-string `Email` counts as absent.
    pub fn from_record(record_id: &str, record: &Record) -> Self {
        let email = record
            .get(EMAIL_FIELD)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Self {
            record_id: record_id.to_string(),
            email,
        }
    }

    /// Key the context API is addressed by: email when known, else the record id.
    pub fn customer_key(&self) -> &str {
        self.email.as_deref().unwrap_or(&self.record_id)
    }
}

// ============================================================================
// Customer context payload
// ============================================================================

/// Risk score as sent by the API: either a number or a label like `"Low"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RiskScore {
    Number(f64),
    Label(String),
}

impl RiskScore {
    pub fn as_label(&self) -> Option<&str> {
        match self {
            RiskScore::Label(s) => Some(s),
            RiskScore::Number(_) => None,
        }
    }
}

impl fmt::Display for RiskScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskScore::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            RiskScore::Number(n) => write!(f, "{}", n),
            RiskScore::Label(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSummary {
    pub account_value: f64,
    pub risk_score: RiskScore,
    pub support_tier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_contact: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportTicket {
    pub date: String,
    pub issue_type: String,
    pub priority: String,
    pub status: String,
}

/// Response of `GET /customer/{id}/context`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerContext {
    pub summary: CustomerSummary,
    /// Server order, rendered as received.
    pub recent_tickets: Vec<SupportTicket>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_info: Option<BTreeMap<String, serde_json::Value>>,
}

impl CustomerContext {
    /// Decode and shape-check an API response body.
    pub fn from_slice(body: &[u8]) -> Result<Self, crate::error::ContextError> {
        serde_json::from_slice(body)
            .map_err(|e| crate::error::ContextError::MalformedResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ContextError;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_customer_key_prefers_email() {
        let r = RecordReference::from_record("3477", &record(json!({"Email": "a@b.com"})));
        assert_eq!(r.customer_key(), "a@b.com");
    }

    #[test]
    fn test_customer_key_falls_back_to_record_id() {
        for rec in [
            json!({}),
            json!({"Email": null}),
            json!({"Email": ""}),
            json!({"Email": 7}),
        ] {
            let r = RecordReference::from_record("3477", &record(rec));
            assert_eq!(r.customer_key(), "3477");
            assert!(r.email.is_none());
        }
    }

    #[test]
    fn test_risk_score_accepts_number_or_label() {
        let n: RiskScore = serde_json::from_value(json!(72)).unwrap();
        let l: RiskScore = serde_json::from_value(json!("Low")).unwrap();
        assert_eq!(n, RiskScore::Number(72.0));
        assert_eq!(n.to_string(), "72");
        assert_eq!(RiskScore::Number(3.5).to_string(), "3.5");
        assert_eq!(l.as_label(), Some("Low"));
    }

    #[test]
    fn test_context_ignores_unknown_fields() {
        let body = json!({
            "summary": {
                "customer_id": "C-1",
                "account_value": 45230.0,
                "risk_score": "Low",
                "support_tier": "Premium",
                "last_contact": "3 days ago"
            },
            "recent_tickets": [
                {"date": "2025-09-15", "issue_type": "Technical Issue", "priority": "High",
                 "status": "Resolved", "resolution_time": "4.2 hours"}
            ],
            "account_info": {"license_count": 125}
        });

        let ctx = CustomerContext::from_slice(body.to_string().as_bytes()).unwrap();
        assert_eq!(ctx.summary.support_tier, "Premium");
        assert_eq!(ctx.summary.last_contact.as_deref(), Some("3 days ago"));
        assert_eq!(ctx.recent_tickets.len(), 1);
        assert_eq!(
            ctx.account_info.unwrap().get("license_count"),
            Some(&json!(125))
        );
    }

    #[test]
    fn test_missing_field_is_malformed() {
        let body = br#"{"summary": {"account_value": 1, "risk_score": "Low"}, "recent_tickets": []}"#;
        match CustomerContext::from_slice(body) {
            Err(ContextError::MalformedResponse(msg)) => assert!(msg.contains("support_tier")),
            other => panic!("expected MalformedResponse, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        assert!(matches!(
            CustomerContext::from_slice(b"<html>oops</html>"),
            Err(ContextError::MalformedResponse(_))
        ));
    }
}
