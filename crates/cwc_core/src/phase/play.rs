//! Open play phase.
//!
//! Each agent gets its own team in full and the opponent's public state, and
//! answers with new intentions for its own players. Ball and refereeing rules
//! are not modelled here.

use super::{apply_reply, NextPhase, PhaseContext, PhaseEntry, PhaseOutcome};
use crate::protocol::{
    AgentId, AgentReply, AgentRequest, PhaseId, PlayResponse, RequestBody, RequestKind,
};
use crate::team::Team;

/// One turn of open play.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayPhase {
    game_time_seconds: f64,
}

impl PlayPhase {
    /// Turn starting at `game_time_seconds`.
    #[must_use]
    pub fn new(game_time_seconds: f64) -> Self {
        Self { game_time_seconds }
    }

    /// Game time at which the requested actions take effect.
    #[must_use]
    pub fn game_time_seconds(&self) -> f64 {
        self.game_time_seconds
    }

    pub(super) fn entry(&self, id: PhaseId, teams: &[Team; 2]) -> PhaseEntry {
        let request_for = |agent: AgentId| AgentRequest {
            phase: id,
            body: RequestBody::Play {
                game_time_seconds: self.game_time_seconds,
                team: teams[agent.index()].snapshot(false),
                opponent: teams[agent.opponent().index()].snapshot(true),
            },
        };
        PhaseEntry {
            event: None,
            requests: AgentId::BOTH.map(request_for),
        }
    }

    pub(super) fn complete(
        &self,
        ctx: &mut PhaseContext<'_>,
        agent1: &AgentReply,
        agent2: &AgentReply,
    ) -> PhaseOutcome {
        let config = ctx.config;
        let results = [(AgentId::Agent1, agent1), (AgentId::Agent2, agent2)].map(|(agent, reply)| {
            let team = &mut ctx.teams[agent.index()];
            apply_reply(reply, RequestKind::Play, |body: PlayResponse| {
                team.process_play_response(&body, &config.pitch)
            })
        });

        PhaseOutcome {
            results,
            next: NextPhase::Play,
        }
    }
}
