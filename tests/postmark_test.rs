//! Postmark engine tests against a WireMock server

mod common;

use email_hook::{EmailEngine, EmailError, EmailRequest, EmailSender, ValidationIssue};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn postmark_engine(base_url: &str, api_key: Option<&str>) -> EmailEngine {
    EmailEngine::from_name("POSTMARK", common::postmark_settings(base_url, api_key)).unwrap()
}

#[tokio::test]
async fn test_send_mail_posts_one_shaped_payload() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/email"))
        .and(header("X-Postmark-Server-Token", "server-token"))
        .and(header("Accept", "application/json"))
        .and(body_json(json!({
            "From": common::SENDER,
            "To": "a@b.com",
            "Subject": "x",
            "HtmlBody": "y"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "To": "a@b.com",
            "SubmittedAt": "2024-01-01T00:00:00Z",
            "MessageID": "b7bc2f4a-e38e-4336-af7d-e6c392c2f817",
            "ErrorCode": 0,
            "Message": "OK"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let engine = postmark_engine(&mock_server.uri(), Some("server-token"));
    let request = EmailRequest::new("a@b.com").with_subject("x").with_html_body("y");

    let receipt = engine.send_mail(&request).await.unwrap();

    assert_eq!(receipt.engine, "POSTMARK");
    assert_eq!(
        receipt.message_id.as_deref(),
        Some("b7bc2f4a-e38e-4336-af7d-e6c392c2f817")
    );
}

#[tokio::test]
async fn test_missing_api_key_makes_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let engine = postmark_engine(&mock_server.uri(), None);
    let request = EmailRequest::new("a@b.com").with_subject("x").with_html_body("y");

    let err = engine.send_mail(&request).await.unwrap_err();
    assert_eq!(
        err.issues(),
        &[ValidationIssue::MissingConfiguration(
            "POSTMARK_API_KEY".to_string()
        )]
    );
}

#[tokio::test]
async fn test_missing_subject_makes_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let engine = postmark_engine(&mock_server.uri(), Some("server-token"));
    let err = engine
        .send_mail(&EmailRequest::new("a@b.com").with_html_body("y"))
        .await
        .unwrap_err();

    assert_eq!(
        err.issues(),
        &[ValidationIssue::MissingParameter("Subject".to_string())]
    );
}

#[tokio::test]
async fn test_rejected_message_is_a_transport_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/email"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "ErrorCode": 300,
            "Message": "Invalid 'From' address"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let engine = postmark_engine(&mock_server.uri(), Some("server-token"));
    let request = EmailRequest::new("a@b.com").with_subject("x").with_html_body("y");

    match engine.send_mail(&request).await {
        Err(EmailError::Transport(msg)) => {
            assert!(msg.contains("422"));
            assert!(msg.contains("[300] Invalid 'From' address"));
        }
        other => panic!("Expected Transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unauthorized_with_plain_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/email"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&mock_server)
        .await;

    let engine = postmark_engine(&mock_server.uri(), Some("wrong-token"));
    let request = EmailRequest::new("a@b.com").with_subject("x").with_html_body("y");

    let err = engine.send_mail(&request).await.unwrap_err();
    assert!(matches!(err, EmailError::Transport(ref msg) if msg.contains("Unauthorized")));
}

#[tokio::test]
async fn test_cc_bcc_and_text_body_are_forwarded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/email"))
        .and(body_json(json!({
            "From": "me@example.com",
            "To": "a@b.com, c@d.com",
            "Cc": "cc@example.com",
            "Bcc": "bcc@example.com",
            "Subject": "x",
            "HtmlBody": "<p>y</p>",
            "TextBody": "y"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "MessageID": "msg-2",
            "ErrorCode": 0,
            "Message": "OK"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let engine = postmark_engine(&mock_server.uri(), Some("server-token"));
    let request = EmailRequest::to_many(["a@b.com", "c@d.com"])
        .with_from("me@example.com")
        .with_subject("x")
        .with_html_body("<p>y</p>")
        .with_text_body("y")
        .with_cc("cc@example.com")
        .with_bcc("bcc@example.com");

    let receipt = engine.send_mail(&request).await.unwrap();
    assert_eq!(receipt.message_id.as_deref(), Some("msg-2"));
}

#[tokio::test]
async fn test_unreachable_api_is_a_transport_error() {
    // Nothing listens on port 1
    let engine = postmark_engine("http://127.0.0.1:1", Some("server-token"));
    let request = EmailRequest::new("a@b.com").with_subject("x").with_html_body("y");

    let err = engine.send_mail(&request).await.unwrap_err();
    assert!(matches!(err, EmailError::Transport(_)));
}

#[tokio::test]
async fn test_quoted_display_name_is_sent_intact() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/email"))
        .and(body_json(json!({
            "From": common::SENDER,
            "To": "\"Doe, Jane\" <jane@example.com>",
            "Subject": "x",
            "HtmlBody": "y"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "MessageID": "msg-3",
            "ErrorCode": 0,
            "Message": "OK"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let engine = postmark_engine(&mock_server.uri(), Some("server-token"));
    let request = EmailRequest::new("\"Doe, Jane\" <jane@example.com>")
        .with_subject("x")
        .with_html_body("y");

    let receipt = engine.send_mail(&request).await.unwrap();
    assert_eq!(receipt.message_id.as_deref(), Some("msg-3"));
}
