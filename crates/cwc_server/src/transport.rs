//! Channel-backed implementations of the core's outbound traits.
//!
//! Every message for an agent goes into that agent's outbox as a
//! [`ServerMessage`]; a connection writer task drains the outbox onto the
//! socket. Sends never block the match task.

use cwc_core::protocol::{AgentId, AgentRequest, AgentResponse, MatchEvent, PhaseId};
use cwc_core::transport::{AgentTransport, EventSink};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc};
use tracing::debug;

/// Outbound envelope, one JSON line per message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "messageType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    /// A request the agent must answer.
    Request(AgentRequest),
    /// The agent's last reply was rejected.
    Error {
        /// Human-readable reason.
        message: String,
    },
    /// A match event.
    Event(MatchEvent),
}

/// Inbound envelope: a reply tagged with the phase it answers.
///
/// Only `phase` is required. Whatever sits in `response` is handed to the
/// phase, which reports a bad tag or body to the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Phase id copied from the request.
    pub phase: PhaseId,
    /// The reply itself.
    #[serde(default)]
    pub response: AgentResponse,
}

/// A reply on its way from a connection to the match task.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundReply {
    /// Who sent it.
    pub agent: AgentId,
    /// Phase it answers.
    pub phase: PhaseId,
    /// The reply.
    pub response: AgentResponse,
}

/// Sending half of an agent's outbox.
pub type Outbox = mpsc::UnboundedSender<ServerMessage>;

/// Sends requests and errors into the agents' outboxes.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    outboxes: [Outbox; 2],
}

impl ChannelTransport {
    /// Transport over one outbox per agent, agent 1 first.
    #[must_use]
    pub fn new(outboxes: [Outbox; 2]) -> Self {
        Self { outboxes }
    }

    fn send(&self, agent: AgentId, message: ServerMessage) {
        if self.outboxes[agent.index()].send(message).is_err() {
            debug!(%agent, "Agent outbox closed, dropping message");
        }
    }
}

impl AgentTransport for ChannelTransport {
    fn send_request(&mut self, agent: AgentId, request: &AgentRequest) {
        self.send(agent, ServerMessage::Request(request.clone()));
    }

    fn send_error(&mut self, agent: AgentId, message: &str) {
        self.send(
            agent,
            ServerMessage::Error {
                message: message.to_string(),
            },
        );
    }
}

/// Publishes events into the agents' outboxes and to any spectators.
#[derive(Debug, Clone)]
pub struct ChannelEventSink {
    outboxes: [Outbox; 2],
    spectators: Option<broadcast::Sender<MatchEvent>>,
}

impl ChannelEventSink {
    /// Sink over one outbox per agent, agent 1 first.
    #[must_use]
    pub fn new(outboxes: [Outbox; 2]) -> Self {
        Self {
            outboxes,
            spectators: None,
        }
    }

    /// Also publish every event on `spectators`.
    #[must_use]
    pub fn with_spectators(mut self, spectators: broadcast::Sender<MatchEvent>) -> Self {
        self.set_spectators(spectators);
        self
    }

    /// Publish every event on `spectators` from now on.
    pub fn set_spectators(&mut self, spectators: broadcast::Sender<MatchEvent>) {
        self.spectators = Some(spectators);
    }
}

impl EventSink for ChannelEventSink {
    fn publish(&mut self, event: &MatchEvent, to_agent1: bool, to_agent2: bool) {
        for (agent, wanted) in [(AgentId::Agent1, to_agent1), (AgentId::Agent2, to_agent2)] {
            if wanted
                && self.outboxes[agent.index()]
                    .send(ServerMessage::Event(event.clone()))
                    .is_err()
            {
                debug!(%agent, "Agent outbox closed, dropping event");
            }
        }
        if let Some(spectators) = &self.spectators {
            // No receivers is fine.
            let _ = spectators.send(event.clone());
        }
    }
}
