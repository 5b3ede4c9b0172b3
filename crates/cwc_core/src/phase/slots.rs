//! Two-slot join over the agents' replies.

use crate::protocol::{AgentId, AgentReply};

/// Where a phase instance is in its request/reply cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseStatus {
    /// Requests sent, at least one reply missing.
    AwaitingResponses,
    /// Both replies arrived and were handed out. Terminal.
    BothReceived,
}

/// Result of offering a reply to [`ResponseSlots::fill`].
#[derive(Debug, Clone, PartialEq)]
pub enum SlotFill {
    /// Stored; still waiting for the other agent.
    Waiting,
    /// This reply completed the pair. Returned exactly once per instance.
    Complete {
        /// Agent 1's reply.
        agent1: AgentReply,
        /// Agent 2's reply.
        agent2: AgentReply,
    },
    /// The agent's slot was already filled. The first reply stands.
    Duplicate,
    /// Both replies were already handed out.
    AlreadyComplete,
}

/// Holds each agent's reply until both are present.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSlots {
    slots: [Option<AgentReply>; 2],
    status: PhaseStatus,
}

impl Default for ResponseSlots {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseSlots {
    /// Empty slots awaiting both agents.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: [None, None],
            status: PhaseStatus::AwaitingResponses,
        }
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> PhaseStatus {
        self.status
    }

    /// True if `agent` has replied.
    #[must_use]
    pub fn has_reply(&self, agent: AgentId) -> bool {
        self.status == PhaseStatus::BothReceived || self.slots[agent.index()].is_some()
    }

    /// Agents that have not replied yet.
    #[must_use]
    pub fn missing(&self) -> Vec<AgentId> {
        AgentId::BOTH
            .into_iter()
            .filter(|agent| !self.has_reply(*agent))
            .collect()
    }

    /// Offer `agent`'s reply.
    ///
    /// Fires [`SlotFill::Complete`] only on the transition where the second
    /// slot becomes filled; every later offer is refused without effect.
    pub fn fill(&mut self, agent: AgentId, reply: AgentReply) -> SlotFill {
        if self.status == PhaseStatus::BothReceived {
            return SlotFill::AlreadyComplete;
        }

        let slot = &mut self.slots[agent.index()];
        if slot.is_some() {
            return SlotFill::Duplicate;
        }
        *slot = Some(reply);

        if self.slots.iter().all(Option::is_some) {
            self.status = PhaseStatus::BothReceived;
            let [agent1, agent2] = std::mem::take(&mut self.slots);
            if let (Some(agent1), Some(agent2)) = (agent1, agent2) {
                return SlotFill::Complete { agent1, agent2 };
            }
        }
        SlotFill::Waiting
    }
}
