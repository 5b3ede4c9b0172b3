//! The match: two teams, the active phase and the simulation clock.
//!
//! The match is the only owner of its teams and of the active [`Phase`].
//! Everything that changes match state goes through `&mut Match`, so a
//! single task driving one match needs no locking.
//!
//! # Flow
//!
//! 1. [`Match::start`] enters the kickoff phase, which broadcasts the kickoff
//!    event and sends `KICKOFF` requests.
//! 2. The transport calls [`Match::deliver`] with each reply. The second
//!    reply for the active phase completes it; each agent's rejected reply is
//!    reported back to that agent only.
//! 3. The match then plays the next turn: `ticks_per_turn` kinematic ticks,
//!    a public `STATE` event, and a new play phase with fresh requests.
//! 4. Once game time reaches the configured duration the match publishes
//!    `GAME_OVER` and stops entering phases.
//!
//! # Example
//!
//! ```
//! use cwc_core::prelude::*;
//!
//! struct Silent;
//! impl AgentTransport for Silent {
//!     fn send_request(&mut self, _: AgentId, _: &AgentRequest) {}
//!     fn send_error(&mut self, _: AgentId, _: &str) {}
//! }
//! impl EventSink for Silent {
//!     fn publish(&mut self, _: &MatchEvent, _: bool, _: bool) {}
//! }
//!
//! let mut game = Match::new(MatchConfig::default(), Silent, Silent).unwrap();
//! let phase = game.start(TeamNumber::One).unwrap();
//!
//! let reply = AgentResponse::new(RequestKind::Kickoff, serde_json::json!({}));
//! assert_eq!(game.deliver(phase, AgentId::Agent1, reply.clone().into()), Delivery::Stored);
//! assert_eq!(game.deliver(phase, AgentId::Agent2, reply.into()), Delivery::Completed);
//! assert_eq!(game.current_request_kind(), Some(RequestKind::Play));
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use tracing::{debug, info, warn};

use crate::config::MatchConfig;
use crate::error::{GameError, Result};
use crate::math::EPSILON;
use crate::phase::{
    KickoffPhase, NextPhase, Phase, PhaseContext, PhaseEntry, PhaseKind, PlayPhase, SlotFill,
};
use crate::player::Intentions;
use crate::protocol::{AgentId, AgentReply, MatchEvent, PhaseId, RequestKind};
use crate::team::{PlayingDirection, Team, TeamNumber, NUMBER_OF_PLAYERS};
use crate::transport::{AgentTransport, EventSink};

/// Lifecycle of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    /// Created, kickoff not yet requested.
    NotStarted,
    /// Phases are running.
    InProgress,
    /// Ended normally or torn down; no further phases.
    Finished,
}

/// What happened to a reply handed to [`Match::deliver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Stored; the phase is still waiting for the other agent.
    Stored,
    /// Completed the phase, which was then processed.
    Completed,
    /// The agent already replied to this phase. Ignored.
    Duplicate,
    /// The phase is not (or no longer) active. Ignored.
    Stale,
}

/// A match between two agent-controlled teams.
#[derive(Debug)]
pub struct Match<T: AgentTransport, E: EventSink> {
    config: MatchConfig,
    teams: [Team; 2],
    phase: Option<Phase>,
    next_phase_id: PhaseId,
    tick: u64,
    status: MatchStatus,
    transport: T,
    events: E,
}

impl<T: AgentTransport, E: EventSink> Match<T, E> {
    /// Create a match with both squads in their default kickoff formation.
    ///
    /// Team 1 starts attacking toward +x.
    pub fn new(config: MatchConfig, transport: T, events: E) -> Result<Self> {
        config.validate()?;

        let second_team_first_number = (NUMBER_OF_PLAYERS + 1) as u32;
        let mut teams = [
            Team::new(TeamNumber::One, PlayingDirection::Right, 0),
            Team::new(
                TeamNumber::Two,
                PlayingDirection::Left,
                second_team_first_number,
            ),
        ];
        for team in &mut teams {
            team.set_default_kickoff_positions(&config.pitch);
        }

        Ok(Self {
            config,
            teams,
            phase: None,
            next_phase_id: 1,
            tick: 0,
            status: MatchStatus::NotStarted,
            transport,
            events,
        })
    }

    /// Match configuration.
    #[must_use]
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Lifecycle status.
    #[must_use]
    pub fn status(&self) -> MatchStatus {
        self.status
    }

    /// Number of simulation ticks played.
    #[must_use]
    pub const fn get_tick(&self) -> u64 {
        self.tick
    }

    /// Game time in seconds.
    #[must_use]
    pub fn game_time_seconds(&self) -> f64 {
        self.tick as f64 * self.config.tick_interval_seconds
    }

    /// Both teams, team 1 first.
    #[must_use]
    pub fn teams(&self) -> &[Team; 2] {
        &self.teams
    }

    /// One team.
    #[must_use]
    pub fn team(&self, number: TeamNumber) -> &Team {
        &self.teams[number.index()]
    }

    /// One team, mutably (for rule logic and test setup).
    pub fn team_mut(&mut self, number: TeamNumber) -> &mut Team {
        &mut self.teams[number.index()]
    }

    /// The active phase, if any.
    #[must_use]
    pub fn phase(&self) -> Option<&Phase> {
        self.phase.as_ref()
    }

    /// Identifier of the active phase.
    #[must_use]
    pub fn current_phase_id(&self) -> Option<PhaseId> {
        self.phase.as_ref().map(Phase::id)
    }

    /// Request kind of the active phase.
    #[must_use]
    pub fn current_request_kind(&self) -> Option<RequestKind> {
        self.phase.as_ref().map(|phase| phase.kind().request_kind())
    }

    /// Agents the active phase is still waiting for.
    #[must_use]
    pub fn pending_agents(&self) -> Vec<AgentId> {
        self.phase
            .as_ref()
            .map(Phase::pending_agents)
            .unwrap_or_default()
    }

    /// The agent transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The agent transport, mutably.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// The event sink.
    #[must_use]
    pub fn events(&self) -> &E {
        &self.events
    }

    /// The event sink, mutably.
    pub fn events_mut(&mut self) -> &mut E {
        &mut self.events
    }

    /// Begin the match with a kickoff by `team_kicking_off`.
    ///
    /// Returns the kickoff phase id.
    ///
    /// # Errors
    ///
    /// Returns an error if the match was already started.
    pub fn start(&mut self, team_kicking_off: TeamNumber) -> Result<PhaseId> {
        if self.status != MatchStatus::NotStarted {
            return Err(GameError::InvalidState(format!(
                "cannot start a match that is {:?}",
                self.status
            )));
        }
        self.status = MatchStatus::InProgress;
        info!(?team_kicking_off, "Match started");
        Ok(self.enter(PhaseKind::Kickoff(KickoffPhase::new(team_kicking_off))))
    }

    /// Hand a reply for phase `phase_id` from `agent` to the match.
    ///
    /// Replies for any phase other than the active one are no-ops, as are
    /// repeat replies from an agent that already answered.
    pub fn deliver(&mut self, phase_id: PhaseId, agent: AgentId, reply: AgentReply) -> Delivery {
        let Some(phase) = self.phase.as_mut().filter(|phase| phase.id() == phase_id) else {
            debug!(phase = phase_id, %agent, "Discarding reply for inactive phase");
            return Delivery::Stale;
        };

        match phase.offer(agent, reply) {
            SlotFill::Waiting => {
                debug!(phase = phase_id, %agent, "Stored reply");
                Delivery::Stored
            }
            SlotFill::Duplicate => {
                debug!(phase = phase_id, %agent, "Ignoring duplicate reply");
                Delivery::Duplicate
            }
            SlotFill::AlreadyComplete => Delivery::Stale,
            SlotFill::Complete { agent1, agent2 } => {
                if let Some(phase) = self.phase.take() {
                    self.complete_phase(&phase, &agent1, &agent2);
                }
                Delivery::Completed
            }
        }
    }

    /// Tear the match down. Any reply still in flight becomes stale.
    pub fn abandon(&mut self) {
        if let Some(phase) = self.phase.take() {
            info!(phase = phase.id(), "Match abandoned while awaiting replies");
        }
        self.status = MatchStatus::Finished;
    }

    /// Advance every player by one tick.
    pub fn tick(&mut self) {
        let tick_seconds = self.config.tick_interval_seconds;
        for team in &mut self.teams {
            team.update_positions(tick_seconds);
        }
        self.tick += 1;

        #[cfg(debug_assertions)]
        {
            let hash = self.state_hash();
            tracing::trace!(tick = self.tick, state_hash = hash, "Match state hash");
        }
    }

    /// Drop every player's intention.
    pub fn clear_all_actions(&mut self) {
        for team in &mut self.teams {
            team.clear_intentions();
        }
    }

    /// Reset both teams to the default kickoff formation.
    pub fn set_default_kickoff_positions(&mut self) {
        for team in &mut self.teams {
            team.set_default_kickoff_positions(&self.config.pitch);
        }
    }

    /// Calculate a hash of the current match state.
    ///
    /// Two matches with identical state produce identical hashes.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.tick.hash(&mut hasher);
        self.current_phase_id().hash(&mut hasher);

        for team in &self.teams {
            let state = team.state();
            u8::from(state.team_number).hash(&mut hasher);
            state.score.hash(&mut hasher);

            for player in team.players() {
                player.number().hash(&mut hasher);

                let dynamic = player.dynamic();
                dynamic.position.x.to_bits().hash(&mut hasher);
                dynamic.position.y.to_bits().hash(&mut hasher);
                dynamic.direction.to_bits().hash(&mut hasher);
                dynamic.energy.to_bits().hash(&mut hasher);

                match *player.intentions() {
                    Intentions::None => 0u8.hash(&mut hasher),
                    Intentions::Turn { direction } => {
                        1u8.hash(&mut hasher);
                        direction.to_bits().hash(&mut hasher);
                    }
                    Intentions::Move { destination } => {
                        2u8.hash(&mut hasher);
                        destination.x.to_bits().hash(&mut hasher);
                        destination.y.to_bits().hash(&mut hasher);
                    }
                }
            }
        }

        hasher.finish()
    }

    /// Enter a new phase: publish its event, store it, send its requests.
    fn enter(&mut self, kind: PhaseKind) -> PhaseId {
        let id = self.next_phase_id;
        self.next_phase_id += 1;

        let PhaseEntry { event, requests } = kind.entry(id, &self.teams);
        info!(phase = id, kind = %kind.request_kind(), tick = self.tick, "Entering phase");

        if let Some(event) = &event {
            self.events.publish(event, true, true);
        }
        let phase = self.phase.insert(Phase::new(id, kind, requests));
        for agent in AgentId::BOTH {
            self.transport.send_request(agent, phase.request(agent));
        }
        id
    }

    /// Run a completed phase's handler, report rejected replies, move on.
    fn complete_phase(&mut self, phase: &Phase, agent1: &AgentReply, agent2: &AgentReply) {
        let mut ctx = PhaseContext {
            teams: &mut self.teams,
            config: &self.config,
        };
        let outcome = phase.kind().complete(&mut ctx, agent1, agent2);

        for agent in AgentId::BOTH {
            if let Err(error) = outcome.result(agent) {
                warn!(phase = phase.id(), %agent, %error, "Rejected agent reply");
                self.transport.send_error(agent, &error.to_string());
            }
        }

        match outcome.next {
            NextPhase::Play => self.play_next_turn(),
        }
    }

    /// Simulate one turn, broadcast the state, then ask for the next actions
    /// or end the match.
    fn play_next_turn(&mut self) {
        for _ in 0..self.config.ticks_per_turn {
            self.tick();
        }

        let game_time_seconds = self.game_time_seconds();
        let state = MatchEvent::State {
            game_time_seconds,
            team1: self.teams[0].snapshot(true),
            team2: self.teams[1].snapshot(true),
        };
        self.events.publish(&state, true, true);

        if game_time_seconds + EPSILON >= self.config.match_duration_seconds {
            self.finish();
        } else {
            self.enter(PhaseKind::Play(PlayPhase::new(game_time_seconds)));
        }
    }

    fn finish(&mut self) {
        self.phase = None;
        self.status = MatchStatus::Finished;
        info!(tick = self.tick, "Match finished");

        let event = MatchEvent::GameOver {
            team1: *self.teams[0].state(),
            team2: *self.teams[1].state(),
        };
        self.events.publish(&event, true, true);
    }
}
