//! Email request domain types

use std::collections::BTreeMap;

/// Settings an engine requires, keyed by setting name
///
/// A `None` value marks a setting that is absent from the environment.
pub type ConfigMap = BTreeMap<&'static str, Option<String>>;

/// Generic send request shared by every engine
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailRequest {
    pub to: Vec<String>,
    /// Sender; the `EMAIL_HOST_USER` setting is used when absent
    pub from: Option<String>,
    pub subject: String,
    pub html_body: String,
    pub text_body: Option<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
}

impl EmailRequest {
    pub fn new(to: impl Into<String>) -> Self {
        Self {
            to: vec![to.into()],
            ..Default::default()
        }
    }

    pub fn to_many<I, S>(to: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            to: to.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    pub fn with_html_body(mut self, html_body: impl Into<String>) -> Self {
        self.html_body = html_body.into();
        self
    }

    pub fn with_text_body(mut self, text_body: impl Into<String>) -> Self {
        self.text_body = Some(text_body.into());
        self
    }

    pub fn with_cc(mut self, cc: impl Into<String>) -> Self {
        self.cc.push(cc.into());
        self
    }

    pub fn with_bcc(mut self, bcc: impl Into<String>) -> Self {
        self.bcc.push(bcc.into());
        self
    }

    /// Resolve the sender, falling back to `default` when no non-empty
    /// `from` was given
    pub fn sender(&self, default: Option<&str>) -> String {
        self.from
            .as_deref()
            .filter(|from| !from.trim().is_empty())
            .or(default)
            .unwrap_or_default()
            .to_string()
    }
}

/// Outcome of a successful send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReceipt {
    /// Name of the engine that delivered the message
    pub engine: &'static str,
    /// Provider message id, when the transport reports one
    pub message_id: Option<String>,
}

impl SendReceipt {
    pub fn new(engine: &'static str, message_id: Option<String>) -> Self {
        Self { engine, message_id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_request_builder() {
        let request = EmailRequest::new("to@example.com")
            .with_from("from@example.com")
            .with_subject("Subject")
            .with_html_body("<p>Hello</p>")
            .with_text_body("Hello")
            .with_cc("cc@example.com")
            .with_bcc("bcc@example.com");

        assert_eq!(request.to, vec!["to@example.com"]);
        assert_eq!(request.from.as_deref(), Some("from@example.com"));
        assert_eq!(request.subject, "Subject");
        assert_eq!(request.html_body, "<p>Hello</p>");
        assert_eq!(request.text_body.as_deref(), Some("Hello"));
        assert_eq!(request.cc, vec!["cc@example.com"]);
        assert_eq!(request.bcc, vec!["bcc@example.com"]);
    }

    #[test]
    fn test_email_request_to_many() {
        let request = EmailRequest::to_many(["a@example.com", "b@example.com"]);
        assert_eq!(request.to.len(), 2);
        assert!(request.cc.is_empty());
    }

    #[test]
    fn test_sender_prefers_explicit_from() {
        let request = EmailRequest::new("to@example.com").with_from("me@example.com");
        assert_eq!(request.sender(Some("default@example.com")), "me@example.com");
    }

    #[test]
    fn test_sender_falls_back_to_default() {
        let request = EmailRequest::new("to@example.com");
        assert_eq!(
            request.sender(Some("default@example.com")),
            "default@example.com"
        );

        let request = request.with_from("");
        assert_eq!(
            request.sender(Some("default@example.com")),
            "default@example.com"
        );
        assert_eq!(request.sender(None), "");
    }

    #[test]
    fn test_send_receipt() {
        let receipt = SendReceipt::new("POSTMARK", Some("msg-123".to_string()));
        assert_eq!(receipt.engine, "POSTMARK");
        assert_eq!(receipt.message_id.as_deref(), Some("msg-123"));
    }
}
