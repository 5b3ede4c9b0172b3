//! Match configuration validation.

use std::path::Path;

use cwc_core::config::MatchConfig;
use cwc_core::error::Result;

/// Load and validate a RON match configuration file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or holds values
/// the match cannot run with.
pub fn validate_match_config(path: &Path) -> Result<MatchConfig> {
    let config = MatchConfig::load(path)?;
    tracing::debug!(?config, "Loaded match config");
    Ok(config)
}

/// One-line description of a valid configuration.
#[must_use]
pub fn describe(config: &MatchConfig) -> String {
    format!(
        "{}x{} pitch, {} s ticks, {} ticks per turn ({} s), {} s match",
        config.pitch.width,
        config.pitch.height,
        config.tick_interval_seconds,
        config.ticks_per_turn,
        config.turn_seconds(),
        config.match_duration_seconds,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("valid.ron");
        fs::write(
            &path,
            "(tick_interval_seconds: 0.02, ticks_per_turn: 5, match_duration_seconds: 90.0)",
        )
        .unwrap();

        let config = validate_match_config(&path).unwrap();
        assert_eq!(config.ticks_per_turn, 5);
        assert!(describe(&config).contains("5 ticks per turn"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zero_ticks.ron");
        fs::write(&path, "(ticks_per_turn: 0)").unwrap();

        assert!(validate_match_config(&path).is_err());
    }

    #[test]
    fn test_missing_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(validate_match_config(&dir.path().join("match.ron")).is_err());
    }
}
