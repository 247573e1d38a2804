//! CRM REST host bridge against a mocked CRM.

use context_core::{EntityType, HostBridge, HostBridgeError, RecordRequest, RestHostBridge};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn bridge(server: &MockServer) -> RestHostBridge {
    RestHostBridge::new(
        url::Url::parse(&server.uri()).unwrap(),
        "tok-123".to_string(),
        EntityType::new("Contacts"),
    )
    .unwrap()
}

fn request(id: &str) -> RecordRequest {
    RecordRequest {
        entity: EntityType::new("Contacts"),
        record_id: id.to_string(),
    }
}

#[tokio::test]
async fn test_get_record_sends_token_and_decodes_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/crm/v2/Contacts/3477"))
        .and(header("Authorization", "Zoho-oauthtoken tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "3477", "Email": "a@b.com"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = bridge(&server).get_record(request("3477")).await.unwrap();
    assert_eq!(response.data.len(), 1);
    assert_eq!(response.data[0]["Email"], json!("a@b.com"));
}

#[tokio::test]
async fn test_no_content_is_empty_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let response = bridge(&server).get_record(request("0")).await.unwrap();
    assert!(response.data.is_empty());
}

#[tokio::test]
async fn test_unauthorized_is_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = bridge(&server).get_record(request("1")).await.unwrap_err();
    assert!(matches!(err, HostBridgeError::Status { status: 401 }));
}

#[tokio::test]
async fn test_non_envelope_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[1, 2]"))
        .mount(&server)
        .await;

    let err = bridge(&server).get_record(request("1")).await.unwrap_err();
    assert!(matches!(err, HostBridgeError::Decode(_)));
}
