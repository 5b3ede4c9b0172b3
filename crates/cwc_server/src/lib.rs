//! # CWC Match Server
//!
//! Runs one match between two agents connected over TCP.
//!
//! Each match runs on its own task that owns the [`cwc_core::game::Match`]
//! exclusively. Agent connections talk to it only through channels, and the
//! per-phase response deadline lives here rather than in the core.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod connection;
pub mod error;
pub mod runner;
pub mod transport;

use std::path::PathBuf;
use std::time::Duration;

use cwc_core::config::MatchConfig;
use cwc_core::team::TeamNumber;

pub use error::{ServerError, ServerResult};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on.
    pub port: u16,
    /// How long an agent may take to answer a request, in milliseconds.
    /// Zero waits forever.
    pub response_timeout_ms: u64,
    /// RON match configuration. Defaults are used when absent.
    pub match_config: Option<PathBuf>,
    /// Side taking the opening kickoff.
    pub team_kicking_off: TeamNumber,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 12345,
            response_timeout_ms: 1000,
            match_config: None,
            team_kicking_off: TeamNumber::One,
        }
    }
}

impl ServerConfig {
    /// Response deadline, or `None` to wait forever.
    #[must_use]
    pub fn response_timeout(&self) -> Option<Duration> {
        (self.response_timeout_ms > 0).then(|| Duration::from_millis(self.response_timeout_ms))
    }

    /// Load the match configuration named by this config.
    pub fn load_match_config(&self) -> ServerResult<MatchConfig> {
        match &self.match_config {
            Some(path) => Ok(MatchConfig::load(path)?),
            None => Ok(MatchConfig::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 12345);
        assert_eq!(config.response_timeout(), Some(Duration::from_secs(1)));
        assert_eq!(config.load_match_config().unwrap(), MatchConfig::default());
    }

    #[test]
    fn test_zero_timeout_waits_forever() {
        let config = ServerConfig {
            response_timeout_ms: 0,
            ..ServerConfig::default()
        };
        assert_eq!(config.response_timeout(), None);
    }

    #[test]
    fn test_missing_match_config_is_an_error() {
        let config = ServerConfig {
            match_config: Some(PathBuf::from("/nonexistent/match.ron")),
            ..ServerConfig::default()
        };
        assert!(config.load_match_config().is_err());
    }
}
