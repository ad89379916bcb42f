//! Command-line interface

use crate::config::Settings;
use crate::domain::{EmailRequest, SendReceipt};
use crate::email::{EmailEngine, EmailSender, EngineKind};
use crate::error::EmailError;
use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "email-hook", version, about = "Send email through a pluggable delivery engine")]
pub struct Cli {
    /// Engine name (DJANGO, POSTMARK or AWSSES); defaults to EMAIL_ENGINE
    #[arg(long, global = true)]
    pub engine: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send one message
    Send(SendArgs),
    /// Report whether the engine's settings are complete
    Status,
    /// List available engines
    Engines,
}

#[derive(Args, Debug, Clone)]
pub struct SendArgs {
    /// Recipient (repeatable)
    #[arg(long = "to", required = true)]
    pub to: Vec<String>,

    /// Sender; EMAIL_HOST_USER when omitted
    #[arg(long)]
    pub from: Option<String>,

    #[arg(long)]
    pub subject: String,

    #[arg(long, default_value = "")]
    pub html_body: String,

    #[arg(long)]
    pub text_body: Option<String>,

    #[arg(long)]
    pub cc: Vec<String>,

    #[arg(long)]
    pub bcc: Vec<String>,
}

impl From<SendArgs> for EmailRequest {
    fn from(args: SendArgs) -> Self {
        EmailRequest {
            to: args.to,
            from: args.from,
            subject: args.subject,
            html_body: args.html_body,
            text_body: args.text_body,
            cc: args.cc,
            bcc: args.bcc,
        }
    }
}

/// Pick the engine name: the flag wins over `EMAIL_ENGINE`
pub fn engine_name<'a>(flag: Option<&'a str>, settings: &'a Settings) -> Result<&'a str> {
    flag.or(settings.engine.as_deref()).ok_or_else(|| {
        anyhow!(
            "No email engine selected; pass --engine or set EMAIL_ENGINE ({})",
            EngineKind::names().join(", ")
        )
    })
}

pub async fn send(sender: &dyn EmailSender, args: SendArgs) -> Result<SendReceipt> {
    let request = EmailRequest::from(args);
    Ok(sender.send_mail(&request).await?)
}

/// One line per required setting (values never printed), then the verdict
pub fn status_report(sender: &dyn EmailSender) -> (String, bool) {
    let mut lines = vec![format!("engine: {}", sender.engine_name())];

    for (key, value) in sender.configuration() {
        let state = match value.as_deref().map(str::trim) {
            Some(v) if !v.is_empty() => "set",
            _ => "missing",
        };
        lines.push(format!("{}: {}", key, state));
    }

    let issues = sender.check_configuration();
    let ready = issues.is_empty();
    if ready {
        lines.push("status: ready".to_string());
    } else {
        for issue in &issues {
            lines.push(format!("error: {}", issue));
        }
    }

    (lines.join("\n"), ready)
}

pub fn engines_report() -> String {
    EngineKind::names().join("\n")
}

fn build_engine(flag: Option<&str>, settings: &Arc<Settings>) -> Result<EmailEngine> {
    let name = engine_name(flag, settings)?;
    Ok(EmailEngine::from_name(name, settings.clone())?)
}

pub async fn run(cli: Cli, settings: Arc<Settings>) -> Result<()> {
    match cli.command {
        Command::Send(args) => {
            let engine = build_engine(cli.engine.as_deref(), &settings)?;
            let receipt = send(&engine, args).await?;
            println!(
                "Email sent via {} (message id: {})",
                receipt.engine,
                receipt.message_id.as_deref().unwrap_or("-")
            );
        }
        Command::Status => {
            let engine = build_engine(cli.engine.as_deref(), &settings)?;
            let (report, ready) = status_report(&engine);
            println!("{}", report);
            if !ready {
                return Err(EmailError::Validation(engine.check_configuration()).into());
            }
        }
        Command::Engines => println!("{}", engines_report()),
    }

    Ok(())
}
