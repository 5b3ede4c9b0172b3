//! Coding World Cup - Match Server

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use cwc_core::team::TeamNumber;
use cwc_server::runner::RunOutcome;
use cwc_server::ServerConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cwc-server")]
#[command(about = "Run one Coding World Cup match between two TCP agents")]
struct Cli {
    /// Port to listen on
    #[arg(short, long, default_value_t = 12345)]
    port: u16,

    /// Response deadline per request in milliseconds (0 waits forever)
    #[arg(long, default_value_t = 1000)]
    response_timeout_ms: u64,

    /// RON match configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Team taking the opening kickoff (1 or 2)
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=2))]
    kickoff: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = ServerConfig {
        port: cli.port,
        response_timeout_ms: cli.response_timeout_ms,
        match_config: cli.config,
        team_kicking_off: TeamNumber::try_from(cli.kickoff).unwrap_or(TeamNumber::One),
    };

    tracing::info!("Starting Coding World Cup match server");

    match cwc_server::connection::serve(&config).await {
        Ok(RunOutcome::Completed { team1, team2 }) => {
            tracing::info!("Final score {} - {}", team1.score, team2.score);
            ExitCode::SUCCESS
        }
        Ok(RunOutcome::Abandoned { game_time_seconds }) => {
            tracing::warn!("Match abandoned at {game_time_seconds:.2}s");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Server failed: {e}");
            ExitCode::FAILURE
        }
    }
}
