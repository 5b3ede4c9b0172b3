//! Kickoff phase.
//!
//! Announces the kickoff, asks both agents for their placements, then resets
//! both teams to the default formation and applies each agent's placements to
//! its own team only.

use tracing::debug;

use super::{apply_reply, NextPhase, PhaseContext, PhaseEntry, PhaseOutcome};
use crate::protocol::{
    AgentId, AgentReply, AgentRequest, KickoffResponse, MatchEvent, PhaseId, RequestBody,
    RequestKind,
};
use crate::team::{Team, TeamNumber};

/// Kickoff with one side kicking off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KickoffPhase {
    team_kicking_off: TeamNumber,
}

impl KickoffPhase {
    /// Kickoff taken by `team_kicking_off`.
    #[must_use]
    pub fn new(team_kicking_off: TeamNumber) -> Self {
        Self { team_kicking_off }
    }

    /// The side kicking off.
    #[must_use]
    pub fn team_kicking_off(&self) -> TeamNumber {
        self.team_kicking_off
    }

    pub(super) fn entry(&self, id: PhaseId, teams: &[Team; 2]) -> PhaseEntry {
        let event = MatchEvent::Kickoff {
            team1: teams[0].snapshot(true),
            team2: teams[1].snapshot(true),
            team_kicking_off: self.team_kicking_off,
        };
        let request = AgentRequest {
            phase: id,
            body: RequestBody::Kickoff,
        };
        PhaseEntry {
            event: Some(event),
            requests: [request.clone(), request],
        }
    }

    pub(super) fn complete(
        &self,
        ctx: &mut PhaseContext<'_>,
        agent1: &AgentReply,
        agent2: &AgentReply,
    ) -> PhaseOutcome {
        let config = ctx.config;
        let pitch = &config.pitch;
        for team in ctx.teams.iter_mut() {
            team.clear_intentions();
            team.set_default_kickoff_positions(pitch);
        }

        let results = [(AgentId::Agent1, agent1), (AgentId::Agent2, agent2)].map(|(agent, reply)| {
            let team = &mut ctx.teams[agent.index()];
            let is_team_kicking_off = team.number() == self.team_kicking_off;
            debug!(%agent, is_team_kicking_off, "Applying kickoff response");
            apply_reply(reply, RequestKind::Kickoff, |body: KickoffResponse| {
                team.process_kickoff_response(&body, is_team_kicking_off, pitch)
            })
        });

        PhaseOutcome {
            results,
            next: NextPhase::Play,
        }
    }
}
