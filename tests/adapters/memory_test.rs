//! Memory transport tests.

use mailbatch::providers::MemoryTransport;
use mailbatch::{Dispatcher, MailError, RawMessage};

fn message_to(to: &str) -> RawMessage {
    RawMessage::new()
        .from("tony.stark@example.com")
        .to(to)
        .subject("Hello, Avengers!")
        .text("Hello!")
}

#[tokio::test]
async fn captures_every_request_of_a_batch() {
    let transport = MemoryTransport::new();
    let dispatcher = Dispatcher::with_transport(transport.clone());

    dispatcher
        .send(vec![
            message_to("steve.rogers@example.com"),
            message_to("bruce.banner@example.com"),
        ])
        .await
        .unwrap();

    assert_eq!(transport.request_count(), 2);
    assert!(transport.sent_to("steve.rogers@example.com"));
    assert!(transport.sent_to("bruce.banner@example.com"));

    for stored in transport.requests() {
        assert_eq!(stored.request.path, "/v3/mail/send");
        assert_eq!(stored.request.method.as_str(), "POST");
    }
}

#[tokio::test]
async fn stored_body_is_plain_json() {
    let transport = MemoryTransport::new();
    let dispatcher = Dispatcher::with_transport(transport.clone());

    dispatcher
        .send(
            RawMessage::new()
                .from("tony.stark@example.com")
                .to_all(["a@example.com", "b@example.com"])
                .text("Hi"),
        )
        .await
        .unwrap();

    let stored = transport.last_request().unwrap();
    let personalizations = stored.request.body["personalizations"].as_array().unwrap();
    assert_eq!(personalizations.len(), 2);
    assert_eq!(personalizations[1]["to"][0]["email"], "b@example.com");
    assert_eq!(stored.recipients(), vec!["a@example.com", "b@example.com"]);
}

#[tokio::test]
async fn simulated_failure_fails_the_batch() {
    let transport = MemoryTransport::new();
    transport.set_failure("Simulated outage");
    let dispatcher = Dispatcher::with_transport(transport.clone());

    let err = dispatcher
        .send(message_to("steve.rogers@example.com"))
        .await
        .unwrap_err();

    assert!(err.is_transport());
    assert!(err.to_string().contains("Simulated outage"));
}

#[tokio::test]
async fn one_rejected_recipient_fails_the_batch() {
    let transport = MemoryTransport::new();
    transport.fail_for("loki@example.com");
    let dispatcher = Dispatcher::with_transport(transport.clone());

    let err = dispatcher
        .send(vec![
            message_to("steve.rogers@example.com"),
            message_to("loki@example.com"),
        ])
        .await
        .unwrap_err();

    assert!(matches!(err, MailError::ProviderError { provider: "memory", .. }));
}
