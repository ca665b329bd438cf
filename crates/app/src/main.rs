mod commands;
mod config;
mod error;

use crate::{
    config::{AppConfig, Command},
    error::Result,
};

#[tokio::main]
async fn main() -> Result<()> {
    let (settings, command) = config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "finance_tracker={level},tracker={level},server={level},engine={level}",
            level = settings.level
        ))
        .init();

    match command {
        Command::Serve => serve(&settings).await,
        Command::Dashboard(args) => commands::dashboard(&settings, args).await,
        Command::Report(args) => commands::report(&settings, args).await,
        Command::History(args) => commands::history(&settings, args).await,
        Command::Record(args) => commands::record(&settings, args).await,
        Command::Advice(args) => commands::advice(&settings, args).await,
    }
}

async fn serve(settings: &AppConfig) -> Result<()> {
    let ledger = engine::Ledger::builder()
        .exchange_rate(settings.exchange_rate)
        .build()?;
    let addr = format!("{}:{}", settings.bind, settings.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    server::run_with_listener(ledger, listener).await?;
    Ok(())
}
