//! Teams and squad management.
//!
//! A team owns its squad (fixed once assembled) and its [`TeamState`].
//! Validation of an agent's kickoff and play replies lives here too, since
//! it only ever touches the replying agent's own team.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::Pitch;
use crate::error::ResponseError;
use crate::math::{normalize_degrees, Vec2};
use crate::player::{Intentions, Player, PlayerNumber, PlayerSnapshot, PlayerType};
use crate::protocol::{KickoffResponse, PlayResponse};

/// Number of outfield players on each team (the goalkeeper is extra).
pub const NUMBER_OF_PLAYERS: usize = 5;

/// Default kickoff formation for a team attacking toward +x, as fractions of
/// the pitch size. Every spot is in the team's own half and outside the
/// centre circle of the default pitch.
const KICKOFF_FORMATION: [(f64, f64); NUMBER_OF_PLAYERS] = [
    (0.25, 0.2),
    (0.25, 0.8),
    (0.35, 0.5),
    (0.4, 0.3),
    (0.4, 0.7),
];

/// Distance of the goalkeeper's kickoff spot from their goal line.
const GOALKEEPER_LINE_OFFSET: f64 = 0.5;

/// Team identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum TeamNumber {
    /// Team 1.
    One,
    /// Team 2.
    Two,
}

impl TeamNumber {
    /// Index into per-team arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }
}

impl From<TeamNumber> for u8 {
    fn from(number: TeamNumber) -> Self {
        match number {
            TeamNumber::One => 1,
            TeamNumber::Two => 2,
        }
    }
}

impl TryFrom<u8> for TeamNumber {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            other => Err(format!("team number must be 1 or 2, got {other}")),
        }
    }
}

/// Which goal a team is attacking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayingDirection {
    /// Attacking the goal at `x = 0`; own half is the right half.
    Left,
    /// Attacking the goal at `x = width`; own half is the left half.
    Right,
}

/// Team-level state shared with every agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamState {
    /// Team identity.
    pub team_number: TeamNumber,
    /// Goals scored.
    pub score: u32,
    /// Current playing direction.
    pub direction: PlayingDirection,
}

/// Serializable view of a team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSnapshot {
    /// Team state.
    pub team: TeamState,
    /// Players in squad order.
    pub players: Vec<PlayerSnapshot>,
}

/// One side's full squad.
#[derive(Debug, Clone, PartialEq)]
pub struct Team {
    state: TeamState,
    players: Vec<Player>,
}

impl Team {
    /// Assemble a squad of [`NUMBER_OF_PLAYERS`] outfield players followed by
    /// a goalkeeper, numbered consecutively from `first_player_number`.
    #[must_use]
    pub fn new(
        team_number: TeamNumber,
        direction: PlayingDirection,
        first_player_number: PlayerNumber,
    ) -> Self {
        let mut players: Vec<Player> = (0..NUMBER_OF_PLAYERS as PlayerNumber)
            .map(|i| Player::new(first_player_number + i, PlayerType::Player))
            .collect();
        players.push(Player::new(
            first_player_number + NUMBER_OF_PLAYERS as PlayerNumber,
            PlayerType::Goalkeeper,
        ));

        Self {
            state: TeamState {
                team_number,
                score: 0,
                direction,
            },
            players,
        }
    }

    /// Team identity.
    #[must_use]
    pub fn number(&self) -> TeamNumber {
        self.state.team_number
    }

    /// Team state.
    #[must_use]
    pub fn state(&self) -> &TeamState {
        &self.state
    }

    /// Mutable team state, for rule logic (scores, change of ends).
    pub fn state_mut(&mut self) -> &mut TeamState {
        &mut self.state
    }

    /// Players in squad order.
    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Look up a player by number.
    #[must_use]
    pub fn player(&self, number: PlayerNumber) -> Option<&Player> {
        self.players.iter().find(|p| p.number() == number)
    }

    /// Look up a player by number, mutably.
    pub fn player_mut(&mut self, number: PlayerNumber) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.number() == number)
    }

    /// Move or turn every player by one tick.
    pub fn update_positions(&mut self, tick_seconds: f64) {
        for player in &mut self.players {
            player.update_position(tick_seconds);
        }
    }

    /// Snapshot of the team. `public_only` omits player intentions.
    #[must_use]
    pub fn snapshot(&self, public_only: bool) -> TeamSnapshot {
        TeamSnapshot {
            team: self.state,
            players: self
                .players
                .iter()
                .map(|player| player.snapshot(public_only))
                .collect(),
        }
    }

    /// Drop every player's intention.
    pub fn clear_intentions(&mut self) {
        for player in &mut self.players {
            player.clear_intentions();
        }
    }

    /// Put every player on their default kickoff spot, facing the opposing
    /// goal.
    pub fn set_default_kickoff_positions(&mut self, pitch: &Pitch) {
        let direction = self.state.direction;
        let facing = match direction {
            PlayingDirection::Right => 0.0,
            PlayingDirection::Left => 180.0,
        };
        let mirror = |x: f64| match direction {
            PlayingDirection::Right => x,
            PlayingDirection::Left => pitch.width - x,
        };

        let mut formation = KICKOFF_FORMATION.iter();
        for player in &mut self.players {
            let position = if player.is_goalkeeper() {
                Vec2::new(mirror(GOALKEEPER_LINE_OFFSET), pitch.height / 2.0)
            } else {
                let (fx, fy) = formation.next().copied().unwrap_or((0.25, 0.5));
                Vec2::new(mirror(fx * pitch.width), fy * pitch.height)
            };
            let dynamic = player.dynamic_mut();
            dynamic.position = position;
            dynamic.direction = facing;
        }
    }

    /// True if `point` is on the pitch and in this team's half.
    #[must_use]
    pub fn own_half_contains(&self, pitch: &Pitch, point: Vec2) -> bool {
        let half = pitch.width / 2.0;
        pitch.contains(point)
            && match self.state.direction {
                PlayingDirection::Right => point.x <= half,
                PlayingDirection::Left => point.x >= half,
            }
    }

    /// Validate and apply a kickoff reply.
    ///
    /// Placements must name distinct players of this team, stay in the own
    /// half and, for the side not kicking off, outside the centre circle.
    /// Nothing is applied unless every placement is valid.
    pub fn process_kickoff_response(
        &mut self,
        response: &KickoffResponse,
        is_team_kicking_off: bool,
        pitch: &Pitch,
    ) -> Result<(), ResponseError> {
        let mut seen = HashSet::new();
        for placement in &response.players {
            let number = placement.player_number;
            if self.player(number).is_none() {
                return Err(ResponseError::UnknownPlayer(number));
            }
            if !seen.insert(number) {
                return Err(ResponseError::DuplicatePlayer(number));
            }
            if !placement.direction.is_finite() {
                return Err(ResponseError::InvalidValue {
                    player: number,
                    field: "direction",
                });
            }
            let position = placement.position;
            if !position.is_finite() || !self.own_half_contains(pitch, position) {
                return Err(ResponseError::OutOfBounds {
                    player: number,
                    x: position.x,
                    y: position.y,
                    reason: "kickoff positions must be in your own half",
                });
            }
            if !is_team_kicking_off && pitch.in_centre_circle(position) {
                return Err(ResponseError::OutOfBounds {
                    player: number,
                    x: position.x,
                    y: position.y,
                    reason: "the team not kicking off must stay outside the centre circle",
                });
            }
        }

        for placement in &response.players {
            if let Some(player) = self.player_mut(placement.player_number) {
                let dynamic = player.dynamic_mut();
                dynamic.position = placement.position;
                dynamic.direction = normalize_degrees(placement.direction);
            }
        }
        Ok(())
    }

    /// Validate and apply a play reply: new intentions for listed players.
    ///
    /// All-or-nothing, like [`Self::process_kickoff_response`].
    pub fn process_play_response(
        &mut self,
        response: &PlayResponse,
        pitch: &Pitch,
    ) -> Result<(), ResponseError> {
        let mut seen = HashSet::new();
        for action in &response.players {
            let number = action.player_number;
            if self.player(number).is_none() {
                return Err(ResponseError::UnknownPlayer(number));
            }
            if !seen.insert(number) {
                return Err(ResponseError::DuplicatePlayer(number));
            }
            match action.action {
                Intentions::None => {}
                Intentions::Turn { direction } => {
                    if !direction.is_finite() {
                        return Err(ResponseError::InvalidValue {
                            player: number,
                            field: "direction",
                        });
                    }
                }
                Intentions::Move { destination } => {
                    if !destination.is_finite() || !pitch.contains(destination) {
                        return Err(ResponseError::OutOfBounds {
                            player: number,
                            x: destination.x,
                            y: destination.y,
                            reason: "destination must be on the pitch",
                        });
                    }
                }
            }
        }

        for action in &response.players {
            if let Some(player) = self.player_mut(action.player_number) {
                player.set_intentions(action.action);
            }
        }
        Ok(())
    }
}
