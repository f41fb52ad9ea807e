//! End-to-end tests: a Session driving the HTTP client against wiremock.

use std::sync::Arc;
use std::time::Duration;

use cue::prelude::*;
use cue::{BackendKind, CueConfig, MemoryClipboard};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn ndjson(lines: &[&str]) -> ResponseTemplate {
    let mut body = lines.join("\n");
    body.push('\n');
    ResponseTemplate::new(200).set_body_raw(body, "application/x-ndjson")
}

async fn mount_for_prompt(server: &MockServer, prompt: &str, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({"prompt": prompt})))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn results_are_listed_newest_first() {
    let server = MockServer::start().await;
    mount_for_prompt(
        &server,
        "first",
        ndjson(&[r#"{"response":"one","done":true}"#]),
    )
    .await;
    mount_for_prompt(
        &server,
        "second",
        ndjson(&[r#"{"response":"tw","done":false}"#, r#"{"response":"o","done":true}"#]),
    )
    .await;

    let mut session = Session::new(Ollama::new().base_url(server.uri()));
    session.submit("first").unwrap();
    session.finish().await.unwrap();
    session.submit("second").unwrap();
    session.finish().await.unwrap();

    let listed: Vec<_> = session
        .history()
        .iter()
        .map(|e| (e.prompt(), e.generated_text()))
        .collect();
    assert_eq!(listed, [("second", "two"), ("first", "one")]);
}

#[tokio::test]
async fn server_error_is_shown_and_nothing_is_listed() {
    let server = MockServer::start().await;
    mount_for_prompt(
        &server,
        "p",
        ResponseTemplate::new(500).set_body_string("model crashed"),
    )
    .await;

    let mut session = Session::new(Ollama::new().base_url(server.uri()));
    session.submit("p").unwrap();
    let err = session.finish().await.unwrap_err();

    assert!(matches!(
        err,
        SessionError::Generation(GenerationError::ServerError { status: 500, .. })
    ));
    assert_eq!(
        session.last_error(),
        Some("Error: server returned HTTP 500: model crashed")
    );
    assert!(session.history().is_empty());
    assert!(!session.is_generating());
}

#[tokio::test]
async fn cancel_interrupts_a_slow_server() {
    let server = MockServer::start().await;
    mount_for_prompt(
        &server,
        "slow",
        ndjson(&[r#"{"response":"late"}"#]).set_delay(Duration::from_secs(10)),
    )
    .await;

    let mut session = Session::new(Ollama::new().base_url(server.uri()));
    session.submit("slow").unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    session.cancel();

    let err = tokio::time::timeout(Duration::from_secs(2), session.finish())
        .await
        .expect("cancel is prompt")
        .unwrap_err();
    assert!(matches!(err, SessionError::Generation(GenerationError::Cancelled)));
    assert!(session.history().is_empty());
}

#[tokio::test]
async fn sessions_sharing_a_client_do_not_interleave() {
    let server = MockServer::start().await;
    mount_for_prompt(
        &server,
        "left",
        ndjson(&[r#"{"response":"L1"}"#, r#"{"response":"L2"}"#])
            .set_delay(Duration::from_millis(80)),
    )
    .await;
    mount_for_prompt(
        &server,
        "right",
        ndjson(&[r#"{"response":"R1"}"#, r#"{"response":"R2"}"#])
            .set_delay(Duration::from_millis(40)),
    )
    .await;

    let client = Arc::new(Ollama::new().base_url(server.uri()));
    let mut left = Session::with_shared(Arc::clone(&client));
    let mut right = Session::with_shared(client);
    left.submit("left").unwrap();
    right.submit("right").unwrap();

    let (l, r) = tokio::join!(left.finish(), right.finish());
    let (l, r) = (l.unwrap(), r.unwrap());

    assert_eq!(left.history().get(l).map(Entry::generated_text), Some("L1L2"));
    assert_eq!(right.history().get(r).map(Entry::generated_text), Some("R1R2"));
}

#[tokio::test]
async fn configured_backend_reaches_the_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({"model": "llama3.2", "prompt": "hi"})))
        .respond_with(ndjson(&[r#"{"response":"hello"}"#]))
        .expect(1)
        .mount(&server)
        .await;

    let config = CueConfig {
        base_url: server.uri(),
        model: "llama3.2".into(),
        backend: BackendKind::Http,
        ..CueConfig::default()
    };

    let mut session = Session::new(config.backend());
    session.submit("hi").unwrap();
    let id = session.finish().await.unwrap();

    let clipboard = MemoryClipboard::new();
    session.copy(id, &clipboard).await.unwrap();
    assert_eq!(clipboard.contents().await.as_deref(), Some("hello"));
}
