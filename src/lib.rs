//! Email Hook - pluggable email delivery
//!
//! This crate provides one sending interface over several delivery backends
//! (an SMTP mailer, the Postmark API and AWS SES), selected at runtime by name.

pub mod cli;
pub mod config;
pub mod domain;
pub mod email;
pub mod error;
pub mod telemetry;

// Re-export commonly used types
pub use config::Settings;
pub use domain::{EmailRequest, SendReceipt};
pub use email::{resolve, EmailEngine, EmailSender, Engine, EngineKind};
pub use error::{EmailError, Result, ValidationIssue};
