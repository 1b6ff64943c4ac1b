use std::path::PathBuf;

use clap::Parser;
use students_api::config::AppConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "students-api")]
#[command(about = "Students API - CRUD service for student records")]
#[command(version)]
struct Args {
    #[arg(long, help = "Path to the configuration file (CONFIG_PATH takes precedence)")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up CONFIG_PATH, RUST_LOG, etc.
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    let config = match AppConfig::load(args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let default_level = if config.is_development() { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    tracing::info!("Starting Students API in {:?} mode", config.environment);

    students_api::server::run(config).await
}
