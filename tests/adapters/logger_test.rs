//! Logger transport tests.

use mailbatch::providers::LoggerTransport;
use mailbatch::{Dispatcher, RawMessage};

// ============================================================================
// Basic Delivery Tests
// ============================================================================

#[tokio::test]
async fn send_returns_ok() {
    let dispatcher = Dispatcher::with_transport(LoggerTransport::new());

    let message = RawMessage::new()
        .from("tony.stark@example.com")
        .to("steve.rogers@example.com")
        .subject("Hello, Avengers!")
        .text("Hello!");

    let responses = dispatcher.send(message).await.unwrap();
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].status, 202);
    assert!(!responses[0].message_id.is_empty());
}

#[tokio::test]
async fn send_with_full_logging_returns_ok() {
    let dispatcher = Dispatcher::with_transport(LoggerTransport::full());

    let message = RawMessage::new()
        .from(("T Stark", "tony.stark@example.com"))
        .to_all(["steve.rogers@example.com", "Bruce Banner <bruce.banner@example.com>"])
        .reply_to("nick.fury@example.com")
        .subject("Hello, Avengers!")
        .html("<h1>Hello!</h1>")
        .text("Hello!");

    let responses = dispatcher.send(message).await.unwrap();
    assert_eq!(responses.len(), 1);
}

#[tokio::test]
async fn each_message_gets_its_own_id() {
    let dispatcher = Dispatcher::with_transport(LoggerTransport::new());

    let message = RawMessage::new()
        .from("tony.stark@example.com")
        .to("steve.rogers@example.com")
        .template_id("welcome");

    let responses = dispatcher
        .send(vec![message.clone(), message])
        .await
        .unwrap();

    assert_eq!(responses.len(), 2);
    assert_ne!(responses[0].message_id, responses[1].message_id);
}
