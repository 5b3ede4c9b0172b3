//! Player state and per-tick update.
//!
//! A player owns three disjoint state records:
//!
//! - [`DynamicState`]: position, facing and energy. Changed every tick by the
//!   kinematic model and at phase boundaries by phase logic.
//! - [`StaticState`]: number, type and abilities. Only rule logic (injuries
//!   and the like) may change it.
//! - [`Intentions`]: the controlling agent's private directive for the
//!   current turn. Never shown to the opposing agent.

use serde::{Deserialize, Serialize};

use crate::kinematics::{self, MAX_ENERGY};
use crate::math::Vec2;

/// Unique player number within a match.
pub type PlayerNumber = u32;

/// Classification of a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayerType {
    /// Outfield player.
    Player,
    /// Goalkeeper.
    Goalkeeper,
}

/// Frequently changing, publicly visible state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DynamicState {
    /// Position on the pitch in metres.
    pub position: Vec2,
    /// Facing, in degrees `[0, 360)`.
    pub direction: f64,
    /// Remaining energy, 0-100.
    pub energy: f64,
}

impl Default for DynamicState {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            direction: 0.0,
            energy: MAX_ENERGY,
        }
    }
}

/// Skills and identity. Ability values are 0-100 and act as multipliers
/// on the matching physical capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticState {
    /// Player number, unique across the match.
    pub player_number: PlayerNumber,
    /// Outfield player or goalkeeper.
    pub player_type: PlayerType,
    /// Multiplier on running speed.
    pub running_ability: f64,
    /// How accurately the player passes the ball.
    pub passing_ability: f64,
    /// Kicking accuracy when not passing, including shots at goal.
    pub kicking_ability: f64,
    /// Chance of keeping the ball under pressure.
    pub ball_control_ability: f64,
    /// Chance of winning the ball in a tackle.
    pub tackling_ability: f64,
}

impl StaticState {
    /// Create static state with every ability at 50.
    #[must_use]
    pub fn new(player_number: PlayerNumber, player_type: PlayerType) -> Self {
        Self {
            player_number,
            player_type,
            running_ability: 50.0,
            passing_ability: 50.0,
            kicking_ability: 50.0,
            ball_control_ability: 50.0,
            tackling_ability: 50.0,
        }
    }
}

/// The agent's directive for one player.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intentions {
    /// No directive: the player stands still.
    #[default]
    None,
    /// Turn to face `direction` degrees.
    Turn {
        /// Desired facing in degrees.
        direction: f64,
    },
    /// Move to `destination`, turning first if needed.
    Move {
        /// Desired position in metres.
        destination: Vec2,
    },
}

/// Serializable view of one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    /// Dynamic state.
    pub dynamic: DynamicState,
    /// Static state.
    pub config: StaticState,
    /// Private intentions; only present for the controlling agent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intentions: Option<Intentions>,
}

/// One player on a team.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    dynamic: DynamicState,
    config: StaticState,
    intentions: Intentions,
}

impl Player {
    /// Create a player at the origin with full energy and no intention.
    #[must_use]
    pub fn new(player_number: PlayerNumber, player_type: PlayerType) -> Self {
        Self {
            dynamic: DynamicState::default(),
            config: StaticState::new(player_number, player_type),
            intentions: Intentions::None,
        }
    }

    /// Player number.
    #[must_use]
    pub fn number(&self) -> PlayerNumber {
        self.config.player_number
    }

    /// True for outfield players.
    #[must_use]
    pub fn is_player(&self) -> bool {
        self.config.player_type == PlayerType::Player
    }

    /// True for goalkeepers.
    #[must_use]
    pub fn is_goalkeeper(&self) -> bool {
        self.config.player_type == PlayerType::Goalkeeper
    }

    /// Dynamic state.
    #[must_use]
    pub fn dynamic(&self) -> &DynamicState {
        &self.dynamic
    }

    /// Mutable dynamic state, for phase logic such as formation resets.
    pub fn dynamic_mut(&mut self) -> &mut DynamicState {
        &mut self.dynamic
    }

    /// Static state.
    #[must_use]
    pub fn config(&self) -> &StaticState {
        &self.config
    }

    /// Mutable static state, for rule logic.
    pub fn config_mut(&mut self) -> &mut StaticState {
        &mut self.config
    }

    /// Current intention.
    #[must_use]
    pub fn intentions(&self) -> &Intentions {
        &self.intentions
    }

    /// Replace the current intention.
    pub fn set_intentions(&mut self, intentions: Intentions) {
        self.intentions = intentions;
    }

    /// Drop any intention.
    pub fn clear_intentions(&mut self) {
        self.intentions = Intentions::None;
    }

    /// Current running speed in m/s.
    #[must_use]
    pub fn speed(&self) -> f64 {
        kinematics::speed(&self.config, &self.dynamic)
    }

    /// Turn or move according to the current intention over one tick.
    pub fn update_position(&mut self, tick_seconds: f64) {
        self.dynamic = kinematics::step(&self.config, &self.dynamic, &self.intentions, tick_seconds);
    }

    /// Snapshot of this player. `public_only` omits the intentions.
    #[must_use]
    pub fn snapshot(&self, public_only: bool) -> PlayerSnapshot {
        PlayerSnapshot {
            dynamic: self.dynamic,
            config: self.config.clone(),
            intentions: (!public_only).then_some(self.intentions),
        }
    }
}
