//! Match phases and the agent synchronization protocol.
//!
//! Every phase follows the same cycle:
//!
//! 1. On entry it may broadcast an event, and it sends one request tagged
//!    with its [`RequestKind`] to each agent.
//! 2. Replies are collected in [`ResponseSlots`] keyed by agent, in any
//!    order.
//! 3. When the second reply arrives the phase is completed exactly once:
//!    each agent's reply is validated and applied to that agent's own team
//!    independently, producing one `Result` per agent.
//! 4. The match moves on to the phase named in the [`PhaseOutcome`], whether
//!    or not the replies were valid.
//!
//! Phases are a closed set ([`PhaseKind`]); each concrete phase only
//! provides its entry payloads and its completion handler.

mod kickoff;
mod play;
mod slots;

pub use kickoff::KickoffPhase;
pub use play::PlayPhase;
pub use slots::{PhaseStatus, ResponseSlots, SlotFill};

use crate::config::MatchConfig;
use crate::error::ResponseError;
use crate::protocol::{AgentId, AgentReply, AgentRequest, MatchEvent, PhaseId, RequestKind};
use crate::team::Team;

/// Read/write access a phase gets to the match when it completes.
#[derive(Debug)]
pub struct PhaseContext<'a> {
    /// Both teams, indexed by [`AgentId::index`].
    pub teams: &'a mut [Team; 2],
    /// Match configuration.
    pub config: &'a MatchConfig,
}

/// What a phase emits when it is entered.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseEntry {
    /// Event broadcast to both agents, if any.
    pub event: Option<MatchEvent>,
    /// Request for each agent, indexed by [`AgentId::index`].
    pub requests: [AgentRequest; 2],
}

/// Phase the match enters after a completed phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextPhase {
    /// Play the next turn and ask for the next actions.
    Play,
}

/// Per-agent results of a completed phase.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseOutcome {
    /// Result of applying each agent's reply, indexed by [`AgentId::index`].
    pub results: [Result<(), ResponseError>; 2],
    /// Where the match goes next.
    pub next: NextPhase,
}

impl PhaseOutcome {
    /// Result for one agent.
    #[must_use]
    pub fn result(&self, agent: AgentId) -> &Result<(), ResponseError> {
        &self.results[agent.index()]
    }
}

/// The closed set of concrete phases.
#[derive(Debug, Clone, PartialEq)]
pub enum PhaseKind {
    /// Kickoff placement.
    Kickoff(KickoffPhase),
    /// Open play.
    Play(PlayPhase),
}

impl PhaseKind {
    /// Request kind this phase sends and expects echoed.
    #[must_use]
    pub fn request_kind(&self) -> RequestKind {
        match self {
            Self::Kickoff(_) => RequestKind::Kickoff,
            Self::Play(_) => RequestKind::Play,
        }
    }

    /// Event and requests emitted on entry.
    #[must_use]
    pub fn entry(&self, id: PhaseId, teams: &[Team; 2]) -> PhaseEntry {
        match self {
            Self::Kickoff(phase) => phase.entry(id, teams),
            Self::Play(phase) => phase.entry(id, teams),
        }
    }

    /// Validate and apply both replies.
    pub fn complete(
        &self,
        ctx: &mut PhaseContext<'_>,
        agent1: &AgentReply,
        agent2: &AgentReply,
    ) -> PhaseOutcome {
        match self {
            Self::Kickoff(phase) => phase.complete(ctx, agent1, agent2),
            Self::Play(phase) => phase.complete(ctx, agent1, agent2),
        }
    }
}

/// A live phase instance: the concrete phase, the requests it sent and its
/// reply slots.
#[derive(Debug, Clone, PartialEq)]
pub struct Phase {
    id: PhaseId,
    kind: PhaseKind,
    requests: [AgentRequest; 2],
    slots: ResponseSlots,
}

impl Phase {
    /// New instance awaiting replies to `requests`, indexed by
    /// [`AgentId::index`].
    #[must_use]
    pub fn new(id: PhaseId, kind: PhaseKind, requests: [AgentRequest; 2]) -> Self {
        Self {
            id,
            kind,
            requests,
            slots: ResponseSlots::new(),
        }
    }

    /// Instance identifier.
    #[must_use]
    pub fn id(&self) -> PhaseId {
        self.id
    }

    /// The concrete phase.
    #[must_use]
    pub fn kind(&self) -> &PhaseKind {
        &self.kind
    }

    /// The outstanding request sent to `agent`.
    #[must_use]
    pub fn request(&self, agent: AgentId) -> &AgentRequest {
        &self.requests[agent.index()]
    }

    /// Synchronization status.
    #[must_use]
    pub fn status(&self) -> PhaseStatus {
        self.slots.status()
    }

    /// Agents whose reply is still outstanding.
    #[must_use]
    pub fn pending_agents(&self) -> Vec<AgentId> {
        self.slots.missing()
    }

    /// Offer a reply; see [`ResponseSlots::fill`].
    pub fn offer(&mut self, agent: AgentId, reply: AgentReply) -> SlotFill {
        self.slots.fill(agent, reply)
    }
}

/// Apply one agent's reply, catching every failure into the result.
///
/// Shared by the concrete phases so each agent is processed in isolation.
fn apply_reply<T, F>(reply: &AgentReply, kind: RequestKind, apply: F) -> Result<(), ResponseError>
where
    T: serde::de::DeserializeOwned,
    F: FnOnce(T) -> Result<(), ResponseError>,
{
    let body = reply.parse::<T>(kind)?;
    apply(body)
}
