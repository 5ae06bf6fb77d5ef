//! SendGrid transport tests.

#![cfg(feature = "sendgrid")]

use mailbatch::providers::SendGridTransport;
use mailbatch::{Dispatcher, MailError, Options, RawMessage, Request, Transport};
use serde_json::json;
use std::collections::HashMap;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helper Functions
// ============================================================================

fn valid_message() -> RawMessage {
    RawMessage::new()
        .from("tony.stark@example.com")
        .to("steve.rogers@example.com")
        .subject("Hello, Avengers!")
        .html("<h1>Hello</h1>")
        .text("Hello")
}

fn request_for(raw: RawMessage) -> Request {
    let message = raw.build().unwrap();
    Request::mail_send(Request::default(), &message).unwrap()
}

fn success_response() -> ResponseTemplate {
    ResponseTemplate::new(202).insert_header("X-Message-Id", "123-xyz")
}

fn dispatcher_for(server: &MockServer) -> Dispatcher {
    let mut dispatcher = Dispatcher::new();
    dispatcher.configure(
        Options::new()
            .api_key("SG.test-api-key")
            .base_url(server.uri()),
    );
    dispatcher
}

// ============================================================================
// Basic Submission Tests
// ============================================================================

#[tokio::test]
async fn successful_submit_returns_ok() {
    let server = MockServer::start().await;
    let transport = SendGridTransport::new("SG.test-api-key").base_url(server.uri());

    Mock::given(method("POST"))
        .and(path("/v3/mail/send"))
        .and(header("Authorization", "Bearer SG.test-api-key"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({
            "from": {"email": "tony.stark@example.com"},
            "personalizations": [{"to": [{"email": "steve.rogers@example.com"}]}],
            "content": [
                {"type": "text/plain", "value": "Hello"},
                {"type": "text/html", "value": "<h1>Hello</h1>"}
            ],
            "subject": "Hello, Avengers!"
        })))
        .respond_with(success_response())
        .expect(1)
        .mount(&server)
        .await;

    let response = transport.submit(request_for(valid_message())).await.unwrap();
    assert_eq!(response.status, 202);
    assert_eq!(response.message_id, "123-xyz");
    assert!(response.body.is_none());
}

#[tokio::test]
async fn missing_message_id_header_generates_one() {
    let server = MockServer::start().await;
    let transport = SendGridTransport::new("SG.test-api-key").base_url(server.uri());

    Mock::given(method("POST"))
        .and(path("/v3/mail/send"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let response = transport.submit(request_for(valid_message())).await.unwrap();
    assert!(!response.message_id.is_empty());
}

#[tokio::test]
async fn response_body_is_kept() {
    let server = MockServer::start().await;
    let transport = SendGridTransport::new("SG.test-api-key").base_url(server.uri());

    Mock::given(method("POST"))
        .and(path("/v3/mail/send"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "success"})))
        .expect(1)
        .mount(&server)
        .await;

    let response = transport.submit(request_for(valid_message())).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.body, Some(json!({"message": "success"})));
}

#[tokio::test]
async fn compressed_submit_sets_content_encoding() {
    let server = MockServer::start().await;
    let transport = SendGridTransport::new("SG.test-api-key")
        .base_url(server.uri())
        .compress(true);

    Mock::given(method("POST"))
        .and(path("/v3/mail/send"))
        .and(header("Content-Encoding", "gzip"))
        .respond_with(success_response())
        .expect(1)
        .mount(&server)
        .await;

    assert!(transport.submit(request_for(valid_message())).await.is_ok());
}

// ============================================================================
// Full Payload Tests
// ============================================================================

#[tokio::test]
async fn template_reply_to_and_substitutions_are_sent() {
    let server = MockServer::start().await;
    let transport = SendGridTransport::new("SG.test-api-key").base_url(server.uri());

    let raw = RawMessage::new()
        .from(("T Stark", "tony.stark@example.com"))
        .to_all(["Steve Rogers <steve.rogers@example.com>", "bruce.banner@example.com"])
        .reply_to("hulk.smash@example.com")
        .subject("Hello, -name-!")
        .template_id("welcome")
        .substitutions(vec![
            HashMap::from([("-name-".to_string(), "Steve".to_string())]),
            HashMap::from([("-name-".to_string(), "Bruce".to_string())]),
        ]);

    Mock::given(method("POST"))
        .and(path("/v3/mail/send"))
        .and(body_json(json!({
            "from": {"name": "T Stark", "email": "tony.stark@example.com"},
            "personalizations": [
                {
                    "to": [{"name": "Steve Rogers", "email": "steve.rogers@example.com"}],
                    "substitutions": {"-name-": "Steve"}
                },
                {
                    "to": [{"email": "bruce.banner@example.com"}],
                    "substitutions": {"-name-": "Bruce"}
                }
            ],
            "reply_to": {"email": "hulk.smash@example.com"},
            "subject": "Hello, -name-!",
            "template_id": "welcome"
        })))
        .respond_with(success_response())
        .expect(1)
        .mount(&server)
        .await;

    assert!(transport.submit(request_for(raw)).await.is_ok());
}

// ============================================================================
// Error Response Tests
// ============================================================================

#[tokio::test]
async fn submit_with_429_response() {
    let server = MockServer::start().await;
    let transport = SendGridTransport::new("SG.test-api-key").base_url(server.uri());

    Mock::given(method("POST"))
        .and(path("/v3/mail/send"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "errors": [{"field": null, "message": "too many requests"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = transport.submit(request_for(valid_message())).await.unwrap_err();
    assert!(err.is_transport());
    assert!(err.to_string().contains("too many requests"));
    assert!(matches!(err, MailError::ProviderError { status: Some(429), .. }));
}

#[tokio::test]
async fn submit_with_400_response_names_field() {
    let server = MockServer::start().await;
    let transport = SendGridTransport::new("SG.test-api-key").base_url(server.uri());

    Mock::given(method("POST"))
        .and(path("/v3/mail/send"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errors": [{"field": "from.email", "message": "error message explained"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = transport.submit(request_for(valid_message())).await.unwrap_err();
    assert!(err.to_string().contains("error message explained (from.email)"));
}

#[tokio::test]
async fn submit_with_500_empty_body() {
    let server = MockServer::start().await;
    let transport = SendGridTransport::new("SG.test-api-key").base_url(server.uri());

    Mock::given(method("POST"))
        .and(path("/v3/mail/send"))
        .respond_with(ResponseTemplate::new(500).set_body_string(""))
        .expect(1)
        .mount(&server)
        .await;

    let err = transport.submit(request_for(valid_message())).await.unwrap_err();
    assert!(matches!(err, MailError::ProviderError { status: Some(500), .. }));
    assert!(err.to_string().contains("Unknown error"));
}

// ============================================================================
// Dispatcher Through HTTP
// ============================================================================

#[tokio::test]
async fn configured_dispatcher_sends_batch_over_http() {
    let server = MockServer::start().await;
    let dispatcher = dispatcher_for(&server);

    Mock::given(method("POST"))
        .and(path("/v3/mail/send"))
        .and(header("Authorization", "Bearer SG.test-api-key"))
        .respond_with(success_response())
        .expect(2)
        .mount(&server)
        .await;

    let responses = dispatcher
        .send(vec![valid_message(), valid_message().to("bruce.banner@example.com")])
        .await
        .unwrap();

    assert_eq!(responses.len(), 2);
    assert!(responses.iter().all(|r| r.message_id == "123-xyz"));
}

#[tokio::test]
async fn invalid_batch_issues_no_http_call() {
    let server = MockServer::start().await;
    let dispatcher = dispatcher_for(&server);

    Mock::given(method("POST"))
        .respond_with(success_response())
        .expect(0)
        .mount(&server)
        .await;

    let err = dispatcher
        .send(vec![valid_message(), RawMessage::new().to("steve.rogers@example.com")])
        .await
        .unwrap_err();

    assert!(matches!(err, MailError::InvalidSender(_)));
}

#[tokio::test]
async fn batch_fails_with_api_error() {
    let server = MockServer::start().await;
    let dispatcher = dispatcher_for(&server);

    Mock::given(method("POST"))
        .and(path("/v3/mail/send"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "errors": [{"field": null, "message": "authorization required"}]
        })))
        .mount(&server)
        .await;

    let err = dispatcher.send(valid_message()).await.unwrap_err();
    assert!(err.is_transport());
    assert!(err.to_string().contains("authorization required"));
}
