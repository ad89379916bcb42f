//! Postmark transactional email engine
//!
//! Sends through the Postmark HTTP API (`POST /email`), authenticated with a
//! server token taken from `POSTMARK_API_KEY`.

use super::engine::{Engine, ParameterCheck};
use crate::config::Settings;
use crate::domain::{ConfigMap, EmailRequest, SendReceipt};
use crate::error::{EmailError, Result, ValidationIssue};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use serde::{Deserialize, Serialize, Serializer};
use std::sync::Arc;
use std::time::Duration;

pub const ENGINE_NAME: &str = "POSTMARK";
pub const POSTMARK_API_KEY: &str = "POSTMARK_API_KEY";

const SERVER_TOKEN_HEADER: &str = "X-Postmark-Server-Token";

/// Body of a Postmark single-email request
///
/// Recipients stay lists until serialization, where Postmark expects one
/// comma-separated string per field.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct PostmarkPayload {
    pub from: String,
    #[serde(serialize_with = "serialize_joined")]
    pub to: Vec<String>,
    #[serde(
        skip_serializing_if = "Vec::is_empty",
        serialize_with = "serialize_joined"
    )]
    pub cc: Vec<String>,
    #[serde(
        skip_serializing_if = "Vec::is_empty",
        serialize_with = "serialize_joined"
    )]
    pub bcc: Vec<String>,
    pub subject: String,
    pub html_body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_body: Option<String>,
}

fn serialize_joined<S>(
    addresses: &[String],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&addresses.join(", "))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PostmarkResponse {
    #[serde(rename = "MessageID")]
    message_id: Option<String>,
    #[serde(default)]
    error_code: i64,
    #[serde(default)]
    message: String,
}

pub struct PostmarkEngine {
    settings: Arc<Settings>,
}

impl PostmarkEngine {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }

    fn client(&self) -> Result<Client> {
        let token = self
            .configuration()
            .remove(POSTMARK_API_KEY)
            .flatten()
            .ok_or_else(|| {
                EmailError::ClientConstruction(format!("{} is not set", POSTMARK_API_KEY))
            })?;

        let mut token = HeaderValue::from_str(&token).map_err(|e| {
            EmailError::ClientConstruction(format!("Invalid Postmark server token: {}", e))
        })?;
        token.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(SERVER_TOKEN_HEADER, token);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(self.settings.postmark.timeout_secs))
            .build()
            .map_err(|e| EmailError::ClientConstruction(e.to_string()))
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/email",
            self.settings.postmark.api_url.trim_end_matches('/')
        )
    }
}

fn clean_addresses(addresses: &[String]) -> Vec<String> {
    addresses
        .iter()
        .map(|a| a.trim())
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .collect()
}

#[async_trait]
impl Engine for PostmarkEngine {
    type Payload = PostmarkPayload;

    fn name(&self) -> &'static str {
        ENGINE_NAME
    }

    fn configuration(&self) -> ConfigMap {
        ConfigMap::from([(POSTMARK_API_KEY, self.settings.postmark.api_key.clone())])
    }

    fn sending_parameters(&self, request: &EmailRequest) -> PostmarkPayload {
        PostmarkPayload {
            from: request.sender(self.settings.default_from_email.as_deref()),
            to: clean_addresses(&request.to),
            cc: clean_addresses(&request.cc),
            bcc: clean_addresses(&request.bcc),
            subject: request.subject.clone(),
            html_body: request.html_body.clone(),
            text_body: request.text_body.clone().filter(|t| !t.is_empty()),
        }
    }

    fn check_parameters(&self, payload: &PostmarkPayload) -> Vec<ValidationIssue> {
        ParameterCheck::new()
            .require("From", &payload.from)
            .addresses("From", [payload.from.as_str()])
            .require_list("To", payload.to.iter().map(String::as_str))
            .addresses("To", payload.to.iter().map(String::as_str))
            .addresses("Cc", payload.cc.iter().map(String::as_str))
            .addresses("Bcc", payload.bcc.iter().map(String::as_str))
            .require("Subject", &payload.subject)
            .require("HtmlBody", &payload.html_body)
            .finish()
    }

    async fn send(&self, payload: PostmarkPayload) -> Result<SendReceipt> {
        let client = self.client()?;

        let response = client
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .map_err(|e| EmailError::Transport(format!("Postmark request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<PostmarkResponse>(&body)
                .map(|r| format!("[{}] {}", r.error_code, r.message))
                .unwrap_or(body);
            return Err(EmailError::Transport(format!(
                "Postmark returned {}: {}",
                status, detail
            )));
        }

        let body: PostmarkResponse = response.json().await.map_err(|e| {
            EmailError::Transport(format!("Failed to parse Postmark response: {}", e))
        })?;

        if body.error_code != 0 {
            return Err(EmailError::Transport(format!(
                "Postmark rejected the message: [{}] {}",
                body.error_code, body.message
            )));
        }

        Ok(SendReceipt::new(ENGINE_NAME, body.message_id))
    }
}
