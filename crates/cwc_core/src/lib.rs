//! # CWC Core
//!
//! Deterministic match core for the Coding World Cup.
//!
//! This crate contains **only** match logic:
//! - No networking
//! - No clocks or timers
//! - No system randomness
//!
//! Agents are reached through the [`transport`] traits, so the same match
//! runs under the TCP server, in tests and in benchmarks.
//!
//! ## Crate Structure
//!
//! - [`game`] - The match: teams, active phase, simulation clock
//! - [`phase`] - Kickoff and play phases, two-agent reply synchronization
//! - [`team`] - Squads, kickoff formation, reply validation
//! - [`player`] - Player state and intentions
//! - [`kinematics`] - Turning and running per tick
//! - [`protocol`] - Request, reply and event payloads
//! - [`config`] - Match configuration (RON)
//! - [`math`] - Angles and 2D vectors

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod config;
pub mod error;
pub mod game;
pub mod kinematics;
pub mod math;
pub mod phase;
pub mod player;
pub mod protocol;
pub mod team;
pub mod transport;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{MatchConfig, Pitch};
    pub use crate::error::{GameError, ResponseError, Result};
    pub use crate::game::{Delivery, Match, MatchStatus};
    pub use crate::math::{Vec2, EPSILON};
    pub use crate::phase::{KickoffPhase, Phase, PhaseKind, PhaseStatus, PlayPhase};
    pub use crate::player::{
        DynamicState, Intentions, Player, PlayerNumber, PlayerType, StaticState,
    };
    pub use crate::protocol::{
        AgentId, AgentReply, AgentRequest, AgentResponse, KickoffPlacement, KickoffResponse,
        MatchEvent, PhaseId, PlayResponse, PlayerAction, RequestBody, RequestKind,
    };
    pub use crate::team::{PlayingDirection, Team, TeamNumber, TeamSnapshot, TeamState};
    pub use crate::transport::{AgentTransport, EventSink};
}
