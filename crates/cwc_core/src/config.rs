//! Match configuration.
//!
//! Loaded from RON files, for example:
//!
//! ```ron
//! MatchConfig(
//!     tick_interval_seconds: 0.01,
//!     ticks_per_turn: 10,
//!     match_duration_seconds: 600.0,
//!     pitch: Pitch(
//!         width: 100.0,
//!         height: 50.0,
//!         centre_circle_radius: 10.0,
//!         goal_y1: 21.0,
//!         goal_y2: 29.0,
//!     ),
//! )
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::math::Vec2;

/// Pitch dimensions in metres. The origin is the corner at the left goal
/// line; x runs along the length of the pitch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pitch {
    /// Length of the pitch (x extent).
    pub width: f64,
    /// Breadth of the pitch (y extent).
    pub height: f64,
    /// Radius of the centre circle.
    pub centre_circle_radius: f64,
    /// Lower y of the goal mouth.
    pub goal_y1: f64,
    /// Upper y of the goal mouth.
    pub goal_y2: f64,
}

impl Default for Pitch {
    fn default() -> Self {
        Self {
            width: 100.0,
            height: 50.0,
            centre_circle_radius: 10.0,
            goal_y1: 21.0,
            goal_y2: 29.0,
        }
    }
}

impl Pitch {
    /// Centre spot.
    #[must_use]
    pub fn centre(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// True if `point` is on the pitch (boundary included).
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= 0.0 && point.x <= self.width && point.y >= 0.0 && point.y <= self.height
    }

    /// True if `point` is strictly inside the centre circle.
    #[must_use]
    pub fn in_centre_circle(&self, point: Vec2) -> bool {
        point.distance_to(self.centre()) < self.centre_circle_radius
    }
}

/// Timing and geometry of a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Length of one simulation tick in seconds.
    pub tick_interval_seconds: f64,
    /// Simulation ticks played between two PLAY requests.
    pub ticks_per_turn: u32,
    /// Game time after which the match ends.
    pub match_duration_seconds: f64,
    /// Pitch geometry.
    pub pitch: Pitch,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            tick_interval_seconds: 0.01,
            ticks_per_turn: 10,
            match_duration_seconds: 600.0,
            pitch: Pitch::default(),
        }
    }
}

impl MatchConfig {
    /// Parse a config from RON text and validate it.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        let config: Self = ron::from_str(text).map_err(|e| GameError::ConfigLoad {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a RON config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| GameError::ConfigLoad {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config: Self = ron::from_str(&text).map_err(|e| GameError::ConfigLoad {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<()> {
        if !self.tick_interval_seconds.is_finite() || self.tick_interval_seconds <= 0.0 {
            return Err(GameError::InvalidConfig(format!(
                "tick_interval_seconds must be positive, got {}",
                self.tick_interval_seconds
            )));
        }
        if self.ticks_per_turn == 0 {
            return Err(GameError::InvalidConfig(
                "ticks_per_turn must be at least 1".to_string(),
            ));
        }
        if !self.match_duration_seconds.is_finite() || self.match_duration_seconds <= 0.0 {
            return Err(GameError::InvalidConfig(format!(
                "match_duration_seconds must be positive, got {}",
                self.match_duration_seconds
            )));
        }

        let pitch = &self.pitch;
        let dims = [pitch.width, pitch.height, pitch.centre_circle_radius];
        if dims.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(GameError::InvalidConfig(
                "pitch dimensions must be positive".to_string(),
            ));
        }
        if pitch.centre_circle_radius * 2.0 >= pitch.height.min(pitch.width / 2.0) {
            return Err(GameError::InvalidConfig(
                "centre circle does not fit on the pitch".to_string(),
            ));
        }
        if !(0.0 <= pitch.goal_y1 && pitch.goal_y1 < pitch.goal_y2 && pitch.goal_y2 <= pitch.height)
        {
            return Err(GameError::InvalidConfig(format!(
                "goal mouth {}..{} must lie within the pitch height",
                pitch.goal_y1, pitch.goal_y2
            )));
        }
        Ok(())
    }

    /// Game time covered by one turn.
    #[must_use]
    pub fn turn_seconds(&self) -> f64 {
        self.tick_interval_seconds * f64::from(self.ticks_per_turn)
    }
}
