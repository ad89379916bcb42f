use anyhow::Result;
use clap::Parser;
use email_hook::{
    cli::{self, Cli},
    config::Settings,
    telemetry,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;

    telemetry::init(&settings.telemetry);

    let cli = Cli::parse();
    cli::run(cli, Arc::new(settings)).await
}
