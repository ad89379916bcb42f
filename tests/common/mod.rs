//! Common test utilities

#![allow(dead_code)]

use email_hook::config::{MailerConfig, PostmarkConfig, SesConfig, Settings};
use std::sync::Arc;

pub const SENDER: &str = "noreply@example.com";

pub fn postmark_settings(api_url: &str, api_key: Option<&str>) -> Arc<Settings> {
    Arc::new(Settings {
        default_from_email: Some(SENDER.to_string()),
        postmark: PostmarkConfig {
            api_key: api_key.map(str::to_string),
            api_url: api_url.to_string(),
            timeout_secs: 5,
        },
        ..Default::default()
    })
}

pub fn ses_settings(endpoint_url: &str, access_key_id: Option<&str>) -> Arc<Settings> {
    Arc::new(Settings {
        default_from_email: Some(SENDER.to_string()),
        ses: SesConfig {
            access_key_id: access_key_id.map(str::to_string),
            secret_access_key: Some("wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY".to_string()),
            region: Some("us-east-1".to_string()),
            endpoint_url: Some(endpoint_url.to_string()),
            configuration_set: None,
        },
        ..Default::default()
    })
}

pub fn mailer_settings(port: u16) -> Arc<Settings> {
    Arc::new(Settings {
        default_from_email: Some(SENDER.to_string()),
        mailer: MailerConfig {
            host: "127.0.0.1".to_string(),
            port,
            timeout_secs: 5,
            ..Default::default()
        },
        ..Default::default()
    })
}
