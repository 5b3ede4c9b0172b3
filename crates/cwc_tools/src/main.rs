//! Coding World Cup - Development Tools

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cwc-tools")]
#[command(about = "Development tools for the Coding World Cup")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a match configuration file
    Validate {
        /// Path to the RON match configuration
        #[arg(default_value = "config/match.ron")]
        path: String,
    },
}

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { path } => {
            tracing::info!("Validating match config: {path}");
            match cwc_tools::validate::validate_match_config(std::path::Path::new(&path)) {
                Ok(config) => {
                    tracing::info!("Validation passed: {}", cwc_tools::validate::describe(&config));
                }
                Err(e) => {
                    tracing::error!("Validation failed: {e}");
                    std::process::exit(1);
                }
            }
        }
    }
}
