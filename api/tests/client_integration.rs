//! Integration tests for the API client: error-code mapping, the
//! one-notification-per-failure contract, and request shapes.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code

use boxoffice_api::{ApiClient, ApiError, ApiPrefix, GENERIC_ERROR_MESSAGE, Notifier};
use serde::Deserialize;
use serde_json::json;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Notifier that records every message it is asked to show
#[derive(Clone, Default)]
struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn error(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

#[derive(Debug, Deserialize, PartialEq)]
struct EventSummary {
    id: String,
    name: String,
}

fn client_for(server: &MockServer, notifier: &RecordingNotifier) -> ApiClient {
    ApiClient::new(server.uri(), Arc::new(notifier.clone())).expect("client builds")
}

#[tokio::test]
async fn success_decodes_body_and_never_notifies() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events/evt-1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "evt-1", "name": "Rock Night"})),
        )
        .mount(&server)
        .await;

    let notifier = RecordingNotifier::default();
    let client = client_for(&server, &notifier);

    let event: EventSummary = client.get(ApiPrefix::Events, "evt-1", &[]).await.unwrap();

    assert_eq!(
        event,
        EventSummary {
            id: "evt-1".to_string(),
            name: "Rock Night".to_string()
        }
    );
    assert!(notifier.messages().is_empty());
}

#[tokio::test]
async fn query_params_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events"))
        .and(query_param("city", "sao-paulo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let notifier = RecordingNotifier::default();
    let client = client_for(&server, &notifier);

    let events: Vec<EventSummary> = client
        .get(ApiPrefix::Events, "", &[("city", "sao-paulo".to_string())])
        .await
        .unwrap();

    assert!(events.is_empty());
}

#[tokio::test]
async fn known_error_code_maps_to_localized_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/payments/holds"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({"code": "HOLD_EXPIRED"})))
        .mount(&server)
        .await;

    let notifier = RecordingNotifier::default();
    let client = client_for(&server, &notifier);

    let result: Result<serde_json::Value, ApiError> = client
        .post(ApiPrefix::Payments, "holds", &json!({"eventId": "evt-1"}))
        .await;

    match result {
        Err(ApiError::Api { status, code, message }) => {
            assert_eq!(status, 409);
            assert_eq!(code.as_deref(), Some("HOLD_EXPIRED"));
            assert!(message.contains("reservation expired"));
        },
        other => panic!("expected Api error, got {other:?}"),
    }

    // Exactly one toast for the failure, carrying the mapped message.
    let messages = notifier.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("reservation expired"));
}

#[tokio::test]
async fn unknown_error_code_falls_back_to_generic_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tickets/t-9"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"code": "SOMETHING_NEW"})))
        .mount(&server)
        .await;

    let notifier = RecordingNotifier::default();
    let client = client_for(&server, &notifier);

    let result: Result<serde_json::Value, ApiError> =
        client.get(ApiPrefix::Tickets, "t-9", &[]).await;

    assert!(result.is_err());
    assert_eq!(notifier.messages(), vec![GENERIC_ERROR_MESSAGE.to_string()]);
}

#[tokio::test]
async fn empty_error_body_falls_back_to_generic_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let notifier = RecordingNotifier::default();
    let client = client_for(&server, &notifier);

    let result: Result<serde_json::Value, ApiError> =
        client.get(ApiPrefix::Users, "me", &[]).await;

    assert!(matches!(result, Err(ApiError::Api { status: 404, .. })));
    assert_eq!(notifier.messages(), vec![GENERIC_ERROR_MESSAGE.to_string()]);
}

#[tokio::test]
async fn network_failure_notifies_generic_message() {
    // Nothing listens on this port.
    let notifier = RecordingNotifier::default();
    let client =
        ApiClient::new("http://127.0.0.1:9", Arc::new(notifier.clone())).expect("client builds");

    let result: Result<serde_json::Value, ApiError> =
        client.get(ApiPrefix::Events, "evt-1", &[]).await;

    assert!(matches!(result, Err(ApiError::Request(_))));
    assert_eq!(notifier.messages(), vec![GENERIC_ERROR_MESSAGE.to_string()]);
}

#[tokio::test]
async fn delete_succeeds_without_decoding_a_body() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/payments/holds/h-1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let notifier = RecordingNotifier::default();
    let client = client_for(&server, &notifier);

    client.delete(ApiPrefix::Payments, "holds/h-1").await.unwrap();
    assert!(notifier.messages().is_empty());
}

#[tokio::test]
async fn multipart_upload_posts_form_data() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/crm/imports"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accepted": true})))
        .mount(&server)
        .await;

    let notifier = RecordingNotifier::default();
    let client = client_for(&server, &notifier);

    let form = reqwest::multipart::Form::new().text("label", "attendees.csv");
    let response: serde_json::Value = client
        .post_file(ApiPrefix::Crm, "imports", form)
        .await
        .unwrap();

    assert_eq!(response, json!({"accepted": true}));
}
