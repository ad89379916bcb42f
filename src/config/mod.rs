//! Configuration management for Email Hook
//!
//! Settings are read once from the process environment and then shared
//! read-only through `Arc<Settings>`. Engines derive their configuration
//! bundle from these values on every call.

use anyhow::{Context, Result};
use std::env;

/// Process-wide settings
#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// Engine used by the CLI when `--engine` is not given
    pub engine: Option<String>,
    /// Default sender address (`EMAIL_HOST_USER`)
    pub default_from_email: Option<String>,
    /// Framework mailer (SMTP) configuration
    pub mailer: MailerConfig,
    /// Postmark configuration
    pub postmark: PostmarkConfig,
    /// AWS SES configuration
    pub ses: SesConfig,
    /// Logging configuration
    pub telemetry: TelemetryConfig,
}

/// SMTP settings shared by every message the framework mailer sends
#[derive(Debug, Clone)]
pub struct MailerConfig {
    pub host: String,
    /// SMTP server port (typically 587 for TLS, 465 for SSL, 25 for unencrypted)
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub use_tls: bool,
    pub timeout_secs: u64,
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 25,
            username: None,
            password: None,
            use_tls: false,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PostmarkConfig {
    pub api_key: Option<String>,
    /// Base URL of the Postmark API, overridable for tests
    pub api_url: String,
    pub timeout_secs: u64,
}

impl Default for PostmarkConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_POSTMARK_API_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SesConfig {
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub region: Option<String>,
    /// Endpoint override (e.g. a local SES emulator)
    pub endpoint_url: Option<String>,
    /// Configuration set name (optional, for tracking)
    pub configuration_set: Option<String>,
}

impl Default for SesConfig {
    fn default() -> Self {
        Self {
            access_key_id: None,
            secret_access_key: None,
            region: Some(DEFAULT_AWS_REGION.to_string()),
            endpoint_url: None,
            configuration_set: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// "text" or "json"
    pub log_format: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

pub const DEFAULT_POSTMARK_API_URL: &str = "https://api.postmarkapp.com";
pub const DEFAULT_AWS_REGION: &str = "us-east-1";

impl Settings {
    /// Load settings from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load settings through an arbitrary key lookup
    ///
    /// Empty values are treated as unset so that fallbacks apply.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let default_from_email = get("EMAIL_HOST_USER");

        Ok(Self {
            engine: get("EMAIL_ENGINE"),
            default_from_email: default_from_email.clone(),
            mailer: MailerConfig {
                host: get("EMAIL_HOST").unwrap_or_else(|| "localhost".to_string()),
                port: get("EMAIL_PORT")
                    .unwrap_or_else(|| "25".to_string())
                    .parse()
                    .context("Invalid EMAIL_PORT")?,
                username: default_from_email,
                password: get("EMAIL_HOST_PASSWORD"),
                use_tls: get("EMAIL_USE_TLS")
                    .map(|s| s.to_lowercase() == "true")
                    .unwrap_or(false),
                timeout_secs: get("EMAIL_TIMEOUT")
                    .unwrap_or_else(|| "30".to_string())
                    .parse()
                    .context("Invalid EMAIL_TIMEOUT")?,
            },
            postmark: PostmarkConfig {
                api_key: get("POSTMARK_API_KEY"),
                api_url: get("POSTMARK_API_URL")
                    .unwrap_or_else(|| DEFAULT_POSTMARK_API_URL.to_string()),
                timeout_secs: get("POSTMARK_TIMEOUT")
                    .unwrap_or_else(|| "30".to_string())
                    .parse()
                    .context("Invalid POSTMARK_TIMEOUT")?,
            },
            ses: SesConfig {
                access_key_id: get("AWS_SES_ACCESS_KEY_ID").or_else(|| get("AWS_ACCESS_KEY_ID")),
                secret_access_key: get("AWS_SES_SECRET_ACCESS_KEY")
                    .or_else(|| get("AWS_SECRET_ACCESS_KEY")),
                region: get("AWS_SES_REGION")
                    .or_else(|| get("AWS_DEFAULT_REGION"))
                    .or_else(|| Some(DEFAULT_AWS_REGION.to_string())),
                endpoint_url: get("AWS_SES_ENDPOINT_URL"),
                configuration_set: get("AWS_SES_CONFIGURATION_SET_NAME"),
            },
            telemetry: TelemetryConfig {
                log_format: get("LOG_FORMAT").unwrap_or_else(|| "text".to_string()),
            },
        })
    }
}
