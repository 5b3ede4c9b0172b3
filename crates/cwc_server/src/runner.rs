//! The match task.
//!
//! [`MatchRunner`] owns the match, feeds it replies from the inbound channel
//! and enforces the per-phase response deadline: when the deadline passes,
//! every agent that has not answered gets a timed-out reply, so the phase
//! completes and the match moves on.

use std::time::Duration;

use cwc_core::config::MatchConfig;
use cwc_core::game::{Match, MatchStatus};
use cwc_core::protocol::{AgentReply, MatchEvent, PhaseId};
use cwc_core::team::{TeamNumber, TeamState};
use tokio::sync::{broadcast, mpsc};
use tokio::time::Instant;
use tracing::{info, warn};

use crate::error::ServerResult;
use crate::transport::{ChannelEventSink, ChannelTransport, InboundReply, Outbox};

/// A match wired to channel collaborators.
pub type ServerMatch = Match<ChannelTransport, ChannelEventSink>;

/// How a match run ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RunOutcome {
    /// The match reached full time.
    Completed {
        /// Final team 1 state.
        team1: TeamState,
        /// Final team 2 state.
        team2: TeamState,
    },
    /// Both agents went away before full time.
    Abandoned {
        /// Game time at which the match was torn down.
        game_time_seconds: f64,
    },
}

/// Drives one match on its own task.
#[derive(Debug)]
pub struct MatchRunner {
    game: ServerMatch,
    inbound: mpsc::UnboundedReceiver<InboundReply>,
    response_timeout: Option<Duration>,
    team_kicking_off: TeamNumber,
}

impl MatchRunner {
    /// Build a runner for a fresh match.
    ///
    /// `outboxes` carry everything sent to agent 1 and agent 2; `inbound`
    /// yields their replies. The run ends as an abandoned match once every
    /// inbound sender is dropped.
    pub fn new(
        config: MatchConfig,
        outboxes: [Outbox; 2],
        inbound: mpsc::UnboundedReceiver<InboundReply>,
        response_timeout: Option<Duration>,
        team_kicking_off: TeamNumber,
    ) -> ServerResult<Self> {
        let game = Match::new(
            config,
            ChannelTransport::new(outboxes.clone()),
            ChannelEventSink::new(outboxes),
        )?;
        Ok(Self {
            game,
            inbound,
            response_timeout,
            team_kicking_off,
        })
    }

    /// Also publish every event on `spectators`.
    #[must_use]
    pub fn with_spectators(mut self, spectators: broadcast::Sender<MatchEvent>) -> Self {
        self.game.events_mut().set_spectators(spectators);
        self
    }

    /// The match being run.
    #[must_use]
    pub fn game(&self) -> &ServerMatch {
        &self.game
    }

    /// Play the match to the end.
    pub async fn run(mut self) -> ServerResult<RunOutcome> {
        let mut armed = self.game.start(self.team_kicking_off)?;
        let mut deadline = self.deadline();

        loop {
            if self.game.status() == MatchStatus::Finished {
                break;
            }
            let Some(current) = self.game.current_phase_id() else {
                break;
            };
            if current != armed {
                armed = current;
                deadline = self.deadline();
            }

            tokio::select! {
                reply = self.inbound.recv() => match reply {
                    Some(reply) => {
                        self.game.deliver(reply.phase, reply.agent, reply.response.into());
                    }
                    None => {
                        info!("All agents disconnected");
                        self.game.abandon();
                        return Ok(RunOutcome::Abandoned {
                            game_time_seconds: self.game.game_time_seconds(),
                        });
                    }
                },
                () = expire(deadline) => self.time_out(current),
            }
        }

        let team1 = *self.game.team(TeamNumber::One).state();
        let team2 = *self.game.team(TeamNumber::Two).state();
        info!(score1 = team1.score, score2 = team2.score, "Match complete");
        Ok(RunOutcome::Completed { team1, team2 })
    }

    fn deadline(&self) -> Option<Instant> {
        self.response_timeout.map(|timeout| Instant::now() + timeout)
    }

    fn time_out(&mut self, phase: PhaseId) {
        for agent in self.game.pending_agents() {
            warn!(phase, %agent, "Agent did not answer in time");
            self.game.deliver(phase, agent, AgentReply::TimedOut);
        }
    }
}

/// Resolves at `deadline`, or never.
async fn expire(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
