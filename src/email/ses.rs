//! AWS SES email engine
//!
//! Provides email sending via AWS Simple Email Service (SES) v2 API with
//! explicit access key credentials.

use super::engine::{is_blank, Engine, ParameterCheck};
use crate::config::Settings;
use crate::domain::{ConfigMap, EmailRequest, SendReceipt};
use crate::error::{EmailError, Result, ValidationIssue};
use async_trait::async_trait;
use aws_sdk_sesv2::{
    config::{Credentials, Region},
    error::DisplayErrorContext,
    types::{Body, Content, Destination, EmailContent, Message},
    Client,
};
use serde::Serialize;
use std::sync::Arc;

pub const ENGINE_NAME: &str = "AWSSES";
pub const AWS_SES_ACCESS_KEY_ID: &str = "AWS_SES_ACCESS_KEY_ID";
pub const AWS_SES_SECRET_ACCESS_KEY: &str = "AWS_SES_SECRET_ACCESS_KEY";
pub const AWS_SES_REGION: &str = "AWS_SES_REGION";

const CHARSET: &str = "UTF-8";

/// SES send parameters
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct SesPayload {
    pub source: String,
    pub destination: SesDestination,
    pub message: SesMessage,
}

/// Recipient lists; absent CC/BCC are empty lists, never strings
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct SesDestination {
    pub to_addresses: Vec<String>,
    pub cc_addresses: Vec<String>,
    pub bcc_addresses: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct SesMessage {
    pub body: SesBody,
    pub subject: SesContent,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct SesBody {
    pub html: SesContent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<SesContent>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct SesContent {
    pub charset: String,
    pub data: String,
}

impl SesContent {
    fn utf8(data: impl Into<String>) -> Self {
        Self {
            charset: CHARSET.to_string(),
            data: data.into(),
        }
    }

    fn to_sdk(&self) -> Result<Content> {
        Content::builder()
            .data(&self.data)
            .charset(&self.charset)
            .build()
            .map_err(|e| EmailError::Transport(format!("Invalid SES content: {}", e)))
    }
}

pub struct SesEngine {
    settings: Arc<Settings>,
}

impl SesEngine {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }

    /// Build an SES client from the current configuration bundle
    async fn client(&self) -> Result<Client> {
        let mut config = self.configuration();
        let mut take = |key: &str| {
            config
                .remove(key)
                .flatten()
                .filter(|v| !is_blank(Some(v.as_str())))
                .ok_or_else(|| EmailError::ClientConstruction(format!("{} is not set", key)))
        };

        let access_key_id = take(AWS_SES_ACCESS_KEY_ID)?;
        let secret_access_key = take(AWS_SES_SECRET_ACCESS_KEY)?;
        let region = take(AWS_SES_REGION)?;

        let credentials = Credentials::new(
            access_key_id,
            secret_access_key,
            None, // session token
            None, // expiration
            "email-hook-ses",
        );

        let mut loader = aws_config::from_env()
            .region(Region::new(region))
            .credentials_provider(credentials);

        if let Some(endpoint_url) = &self.settings.ses.endpoint_url {
            loader = loader.endpoint_url(endpoint_url.clone());
        }

        Ok(Client::new(&loader.load().await))
    }
}

fn non_empty(addresses: Vec<String>) -> Option<Vec<String>> {
    Some(addresses).filter(|a| !a.is_empty())
}

#[async_trait]
impl Engine for SesEngine {
    type Payload = SesPayload;

    fn name(&self) -> &'static str {
        ENGINE_NAME
    }

    fn configuration(&self) -> ConfigMap {
        let ses = &self.settings.ses;
        ConfigMap::from([
            (AWS_SES_ACCESS_KEY_ID, ses.access_key_id.clone()),
            (AWS_SES_SECRET_ACCESS_KEY, ses.secret_access_key.clone()),
            (AWS_SES_REGION, ses.region.clone()),
        ])
    }

    fn sending_parameters(&self, request: &EmailRequest) -> SesPayload {
        SesPayload {
            source: request.sender(self.settings.default_from_email.as_deref()),
            destination: SesDestination {
                to_addresses: request.to.clone(),
                cc_addresses: request.cc.clone(),
                bcc_addresses: request.bcc.clone(),
            },
            message: SesMessage {
                body: SesBody {
                    html: SesContent::utf8(request.html_body.clone()),
                    text: request
                        .text_body
                        .as_deref()
                        .filter(|t| !t.is_empty())
                        .map(SesContent::utf8),
                },
                subject: SesContent::utf8(request.subject.clone()),
            },
        }
    }

    fn check_parameters(&self, payload: &SesPayload) -> Vec<ValidationIssue> {
        let destination = &payload.destination;
        ParameterCheck::new()
            .require("Source", &payload.source)
            .addresses("Source", [payload.source.as_str()])
            .require_list("ToAddresses", destination.to_addresses.iter().map(String::as_str))
            .addresses("ToAddresses", destination.to_addresses.iter().map(String::as_str))
            .addresses("CcAddresses", destination.cc_addresses.iter().map(String::as_str))
            .addresses("BccAddresses", destination.bcc_addresses.iter().map(String::as_str))
            .require("Subject", &payload.message.subject.data)
            .require("Html", &payload.message.body.html.data)
            .finish()
    }

    async fn send(&self, payload: SesPayload) -> Result<SendReceipt> {
        let client = self.client().await?;

        let SesPayload {
            source,
            destination,
            message,
        } = payload;

        let destination = Destination::builder()
            .set_to_addresses(non_empty(destination.to_addresses))
            .set_cc_addresses(non_empty(destination.cc_addresses))
            .set_bcc_addresses(non_empty(destination.bcc_addresses))
            .build();

        let mut body = Body::builder().html(message.body.html.to_sdk()?);
        if let Some(text) = &message.body.text {
            body = body.text(text.to_sdk()?);
        }

        let ses_message = Message::builder()
            .subject(message.subject.to_sdk()?)
            .body(body.build())
            .build();

        let mut request = client
            .send_email()
            .from_email_address(source)
            .destination(destination)
            .content(EmailContent::builder().simple(ses_message).build());

        if let Some(config_set) = &self.settings.ses.configuration_set {
            request = request.configuration_set_name(config_set);
        }

        let response = request
            .send()
            .await
            .map_err(|e| EmailError::Transport(DisplayErrorContext(&e).to_string()))?;

        Ok(SendReceipt::new(
            ENGINE_NAME,
            response.message_id().map(str::to_string),
        ))
    }
}
