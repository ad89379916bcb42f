//! Framework mailer engine: SMTP delivery using lettre
//!
//! Needs no engine-specific settings; it uses the global `EMAIL_*` mail
//! configuration the way a web framework's built-in mailer does.

use super::engine::{Engine, ParameterCheck};
use crate::config::{MailerConfig, Settings};
use crate::domain::{ConfigMap, EmailRequest, SendReceipt};
use crate::error::{EmailError, Result, ValidationIssue};
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

pub const ENGINE_NAME: &str = "DJANGO";

const MESSAGE_ID_HEADER: &str = "Message-ID";

/// Send parameters in the mailer's own vocabulary
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MailerPayload {
    pub subject: String,
    /// Plain-text body
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_message: Option<String>,
    pub from_email: String,
    pub recipient_list: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cc: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bcc: Vec<String>,
}

pub struct FrameworkMailerEngine {
    settings: Arc<Settings>,
}

impl FrameworkMailerEngine {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }

    fn transport(config: &MailerConfig) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        let mut builder = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|e| EmailError::ClientConstruction(e.to_string()))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        };

        builder = builder
            .port(config.port)
            .timeout(Some(Duration::from_secs(config.timeout_secs)));

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(builder.build())
    }
}

fn parse_mailbox(field: &str, address: &str) -> Result<Mailbox> {
    address.trim().parse().map_err(|_| {
        EmailError::Validation(vec![ValidationIssue::InvalidAddress {
            field: field.to_string(),
            value: address.to_string(),
        }])
    })
}

/// Build the MIME message; both bodies become `multipart/alternative`
///
/// Every message gets a generated `Message-ID`, which is what the receipt
/// reports back.
pub fn build_message(payload: &MailerPayload) -> Result<Message> {
    let mut builder = Message::builder()
        .message_id(None)
        .from(parse_mailbox("from_email", &payload.from_email)?)
        .subject(&payload.subject);

    for to in &payload.recipient_list {
        builder = builder.to(parse_mailbox("recipient_list", to)?);
    }
    for cc in &payload.cc {
        builder = builder.cc(parse_mailbox("cc", cc)?);
    }
    for bcc in &payload.bcc {
        builder = builder.bcc(parse_mailbox("bcc", bcc)?);
    }

    let message = match &payload.html_message {
        Some(html) if !payload.message.is_empty() => builder.multipart(
            MultiPart::alternative()
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_PLAIN)
                        .body(payload.message.clone()),
                )
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_HTML)
                        .body(html.clone()),
                ),
        ),
        Some(html) => builder.header(ContentType::TEXT_HTML).body(html.clone()),
        None => builder
            .header(ContentType::TEXT_PLAIN)
            .body(payload.message.clone()),
    };

    message.map_err(|e| EmailError::Transport(format!("Failed to build message: {}", e)))
}

#[async_trait]
impl Engine for FrameworkMailerEngine {
    type Payload = MailerPayload;

    fn name(&self) -> &'static str {
        ENGINE_NAME
    }

    fn configuration(&self) -> ConfigMap {
        ConfigMap::new()
    }

    fn sending_parameters(&self, request: &EmailRequest) -> MailerPayload {
        MailerPayload {
            subject: request.subject.clone(),
            message: request.text_body.clone().unwrap_or_default(),
            html_message: Some(request.html_body.clone()).filter(|html| !html.is_empty()),
            from_email: request.sender(self.settings.default_from_email.as_deref()),
            recipient_list: request.to.clone(),
            cc: request.cc.clone(),
            bcc: request.bcc.clone(),
        }
    }

    fn check_parameters(&self, payload: &MailerPayload) -> Vec<ValidationIssue> {
        ParameterCheck::new()
            .require("from_email", &payload.from_email)
            .addresses("from_email", [payload.from_email.as_str()])
            .require_list("recipient_list", payload.recipient_list.iter().map(String::as_str))
            .addresses("recipient_list", payload.recipient_list.iter().map(String::as_str))
            .addresses("cc", payload.cc.iter().map(String::as_str))
            .addresses("bcc", payload.bcc.iter().map(String::as_str))
            .require("subject", &payload.subject)
            .require_any(
                "message",
                &[
                    payload.message.as_str(),
                    payload.html_message.as_deref().unwrap_or_default(),
                ],
            )
            .finish()
    }

    async fn send(&self, payload: MailerPayload) -> Result<SendReceipt> {
        let email = build_message(&payload)?;
        let message_id = email
            .headers()
            .get_raw(MESSAGE_ID_HEADER)
            .map(str::to_string);
        let transport = Self::transport(&self.settings.mailer)?;

        transport
            .send(email)
            .await
            .map_err(|e| EmailError::Transport(e.to_string()))?;

        Ok(SendReceipt::new(ENGINE_NAME, message_id))
    }
}
