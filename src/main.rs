use anyhow::Result;
use clap::Parser;
use ragie_import::cli::{run, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    // .env may hold RAGIE_API_KEY / RAGIE_BASE_URL
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let command = cli.command.name();
    tracing::info!(
        command,
        dry_run = cli.global.dry_run,
        partition = cli.global.partition.as_deref().unwrap_or("<default>"),
        "ragie-import starting"
    );

    let result = run(cli).await;
    match &result {
        Ok(_) => tracing::info!(command, "ragie-import finished"),
        Err(e) => tracing::error!(command, error = %e, "ragie-import failed"),
    }
    result
}
