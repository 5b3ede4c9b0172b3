//! Test fixtures and helpers.
//!
//! Recording collaborators and pre-built matches and replies
//! for consistent testing.

use cwc_core::config::MatchConfig;
use cwc_core::game::{Delivery, Match};
use cwc_core::math::Vec2;
use cwc_core::player::{Intentions, PlayerNumber};
use cwc_core::protocol::{
    AgentId, AgentReply, AgentRequest, AgentResponse, MatchEvent, PhaseId, RequestKind,
};
use cwc_core::team::TeamNumber;
use cwc_core::transport::{AgentTransport, EventSink};
use serde_json::json;

/// Transport that records everything sent to the agents.
#[derive(Debug, Default, Clone)]
pub struct RecordingTransport {
    /// Requests in send order.
    pub requests: Vec<(AgentId, AgentRequest)>,
    /// Error notices in send order.
    pub errors: Vec<(AgentId, String)>,
}

impl RecordingTransport {
    /// Requests sent to one agent.
    #[must_use]
    pub fn requests_for(&self, agent: AgentId) -> Vec<&AgentRequest> {
        self.requests
            .iter()
            .filter(|(to, _)| *to == agent)
            .map(|(_, request)| request)
            .collect()
    }

    /// Error notices sent to one agent.
    #[must_use]
    pub fn errors_for(&self, agent: AgentId) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|(to, _)| *to == agent)
            .map(|(_, message)| message.as_str())
            .collect()
    }
}

impl AgentTransport for RecordingTransport {
    fn send_request(&mut self, agent: AgentId, request: &AgentRequest) {
        tracing::trace!(%agent, phase = request.phase, "Recorded request");
        self.requests.push((agent, request.clone()));
    }

    fn send_error(&mut self, agent: AgentId, message: &str) {
        self.errors.push((agent, message.to_string()));
    }
}

/// An event together with its recipients.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedEvent {
    /// The event.
    pub event: MatchEvent,
    /// Sent to agent 1.
    pub to_agent1: bool,
    /// Sent to agent 2.
    pub to_agent2: bool,
}

/// Event sink that records every published event.
#[derive(Debug, Default, Clone)]
pub struct RecordingEvents {
    /// Events in publish order.
    pub events: Vec<PublishedEvent>,
}

impl RecordingEvents {
    /// Number of `STATE` events published so far.
    #[must_use]
    pub fn state_count(&self) -> usize {
        self.events
            .iter()
            .filter(|published| matches!(published.event, MatchEvent::State { .. }))
            .count()
    }

    /// The most recent event.
    #[must_use]
    pub fn last(&self) -> Option<&MatchEvent> {
        self.events.last().map(|published| &published.event)
    }
}

impl EventSink for RecordingEvents {
    fn publish(&mut self, event: &MatchEvent, to_agent1: bool, to_agent2: bool) {
        self.events.push(PublishedEvent {
            event: event.clone(),
            to_agent1,
            to_agent2,
        });
    }
}

/// A match wired to recording collaborators.
pub type TestMatch = Match<RecordingTransport, RecordingEvents>;

/// A new match with the default configuration.
///
/// # Panics
///
/// Panics if the default configuration is rejected.
#[must_use]
pub fn test_match() -> TestMatch {
    test_match_with(MatchConfig::default())
}

/// A new match with `config`.
///
/// # Panics
///
/// Panics if `config` is rejected.
#[must_use]
pub fn test_match_with(config: MatchConfig) -> TestMatch {
    Match::new(
        config,
        RecordingTransport::default(),
        RecordingEvents::default(),
    )
    .expect("test config must be valid")
}

/// A default match already in its kickoff phase.
///
/// # Panics
///
/// Panics if the match cannot be started.
#[must_use]
pub fn started_match(team_kicking_off: TeamNumber) -> (TestMatch, PhaseId) {
    let mut game = test_match();
    let phase = game
        .start(team_kicking_off)
        .expect("fresh match must start");
    (game, phase)
}

/// A kickoff reply placing players as `(number, x, y, direction)`.
#[must_use]
pub fn kickoff_reply(placements: &[(PlayerNumber, f64, f64, f64)]) -> AgentReply {
    let players: Vec<_> = placements
        .iter()
        .map(|&(number, x, y, direction)| {
            json!({
                "playerNumber": number,
                "position": {"x": x, "y": y},
                "direction": direction,
            })
        })
        .collect();
    AgentResponse::new(RequestKind::Kickoff, json!({ "players": players })).into()
}

/// A play reply setting intentions for the listed players.
#[must_use]
pub fn play_reply(actions: &[(PlayerNumber, Intentions)]) -> AgentReply {
    let players: Vec<_> = actions
        .iter()
        .map(|&(number, action)| {
            let mut value = serde_json::to_value(action).unwrap_or_default();
            if let Some(object) = value.as_object_mut() {
                object.insert("playerNumber".to_string(), json!(number));
            }
            value
        })
        .collect();
    AgentResponse::new(RequestKind::Play, json!({ "players": players })).into()
}

/// A reply of the given kind with no players listed.
#[must_use]
pub fn empty_reply(kind: RequestKind) -> AgentReply {
    AgentResponse::new(kind, json!({})).into()
}

/// A `MOVE` intention.
#[must_use]
pub fn move_to(x: f64, y: f64) -> Intentions {
    Intentions::Move {
        destination: Vec2::new(x, y),
    }
}

/// A `TURN` intention.
#[must_use]
pub fn turn_to(direction: f64) -> Intentions {
    Intentions::Turn { direction }
}

/// Deliver both replies to the active phase, agent 1 first.
///
/// Returns the delivery of the second reply.
///
/// # Panics
///
/// Panics if no phase is active.
pub fn complete_phase(game: &mut TestMatch, agent1: AgentReply, agent2: AgentReply) -> Delivery {
    let phase = game.current_phase_id().expect("a phase must be active");
    game.deliver(phase, AgentId::Agent1, agent1);
    game.deliver(phase, AgentId::Agent2, agent2)
}

/// Play `turns` play phases with empty replies from both agents.
///
/// Stops early if the match ends.
pub fn play_empty_turns(game: &mut TestMatch, turns: usize) {
    for _ in 0..turns {
        if game.current_phase_id().is_none() {
            break;
        }
        complete_phase(
            game,
            empty_reply(RequestKind::Play),
            empty_reply(RequestKind::Play),
        );
    }
}
