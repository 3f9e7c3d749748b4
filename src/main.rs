use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use drivetrain_runtime::config::DriveConfig;

/// Maneuver runtime for the two-wheel drivetrain
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Path to a JSON drive configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the bus bridge serial port
    #[arg(long)]
    port: Option<String>,
}

#[tokio::main]
async fn main() {
    // Setup logging (set RUST_LOG=info or debug)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(path) => match DriveConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Config error: {}", e);
                std::process::exit(1);
            }
        },
        None => DriveConfig::default(),
    };
    if let Some(port) = cli.port {
        config.port = port;
    }

    if let Err(e) = drivetrain_runtime::runtime::run(config).await {
        eprintln!("Runtime error: {}", e);
        std::process::exit(1);
    }
}
