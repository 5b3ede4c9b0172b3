//! TCP agent connections.
//!
//! Each agent speaks newline-delimited JSON: [`ServerMessage`] lines out,
//! [`InboundMessage`] lines in. The first connection accepted plays as
//! agent 1.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use cwc_core::protocol::AgentId;

use crate::error::ServerResult;
use crate::runner::{MatchRunner, RunOutcome};
use crate::transport::{InboundMessage, InboundReply, Outbox, ServerMessage};
use crate::ServerConfig;

/// Accept two agent connections, agent 1 first.
pub async fn accept_agents(listener: &TcpListener) -> ServerResult<[TcpStream; 2]> {
    let (first, address) = listener.accept().await?;
    info!(agent = %AgentId::Agent1, %address, "Agent connected");
    let (second, address) = listener.accept().await?;
    info!(agent = %AgentId::Agent2, %address, "Agent connected");
    Ok([first, second])
}

/// Start the reader and writer tasks for one agent.
///
/// Returns the agent's outbox. Parsed replies go to `inbound`; a line that
/// does not parse is answered with an error message and otherwise ignored.
pub fn spawn_agent_io(
    agent: AgentId,
    stream: TcpStream,
    inbound: mpsc::UnboundedSender<InboundReply>,
) -> Outbox {
    let (read_half, write_half) = stream.into_split();
    let (outbox, messages) = mpsc::unbounded_channel();

    tokio::spawn(write_messages(agent, write_half, messages));
    tokio::spawn(read_replies(agent, read_half, inbound, outbox.clone()));

    outbox
}

async fn write_messages(
    agent: AgentId,
    mut socket: OwnedWriteHalf,
    mut messages: mpsc::UnboundedReceiver<ServerMessage>,
) {
    while let Some(message) = messages.recv().await {
        let mut line = match serde_json::to_string(&message) {
            Ok(line) => line,
            Err(e) => {
                warn!(%agent, error = %e, "Failed to encode message");
                continue;
            }
        };
        line.push('\n');
        if let Err(e) = socket.write_all(line.as_bytes()).await {
            debug!(%agent, error = %e, "Write failed, closing connection");
            break;
        }
    }
}

async fn read_replies(
    agent: AgentId,
    socket: OwnedReadHalf,
    inbound: mpsc::UnboundedSender<InboundReply>,
    outbox: Outbox,
) {
    let mut lines = BufReader::new(socket).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                debug!(%agent, error = %e, "Read failed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<InboundMessage>(&line) {
            Ok(message) => {
                let reply = InboundReply {
                    agent,
                    phase: message.phase,
                    response: message.response,
                };
                if inbound.send(reply).is_err() {
                    break;
                }
            }
            Err(e) => {
                warn!(%agent, error = %e, "Malformed line from agent");
                let _ = outbox.send(ServerMessage::Error {
                    message: format!("Could not parse message: {e}"),
                });
            }
        }
    }
    info!(%agent, "Agent disconnected");
}

/// Listen on the configured port, wait for two agents and play one match.
pub async fn serve(config: &ServerConfig) -> ServerResult<RunOutcome> {
    let match_config = config.load_match_config()?;
    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!(port = config.port, "Waiting for agents");
    play_match(&listener, config, match_config).await
}

/// Accept two agents on `listener` and run a match between them.
pub async fn play_match(
    listener: &TcpListener,
    config: &ServerConfig,
    match_config: cwc_core::config::MatchConfig,
) -> ServerResult<RunOutcome> {
    let [first, second] = accept_agents(listener).await?;

    let (inbound_tx, inbound) = mpsc::unbounded_channel();
    let outboxes = [
        spawn_agent_io(AgentId::Agent1, first, inbound_tx.clone()),
        spawn_agent_io(AgentId::Agent2, second, inbound_tx),
    ];

    MatchRunner::new(
        match_config,
        outboxes,
        inbound,
        config.response_timeout(),
        config.team_kicking_off,
    )?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use cwc_core::config::MatchConfig;
    use serde_json::{json, Value};
    use tokio::io::Lines;

    #[derive(Clone, Copy, PartialEq)]
    enum Misbehaviour {
        None,
        GarbageLine,
        UntaggedKickoff,
    }

    struct TestAgent {
        lines: Lines<BufReader<OwnedReadHalf>>,
        writer: OwnedWriteHalf,
    }

    impl TestAgent {
        async fn connect(port: u16) -> Self {
            let stream = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
            let (read_half, writer) = stream.into_split();
            Self {
                lines: BufReader::new(read_half).lines(),
                writer,
            }
        }

        async fn next(&mut self) -> Option<Value> {
            let line = self.lines.next_line().await.unwrap()?;
            Some(serde_json::from_str(&line).unwrap())
        }

        async fn send(&mut self, line: &str) {
            self.writer.write_all(line.as_bytes()).await.unwrap();
            self.writer.write_all(b"\n").await.unwrap();
        }

        /// Answer every request with an empty body until the match ends.
        async fn play(mut self, misbehaviour: Misbehaviour) -> Vec<Value> {
            let mut seen = Vec::new();
            if misbehaviour == Misbehaviour::GarbageLine {
                self.send("this is not json").await;
            }
            while let Some(message) = self.next().await {
                if message["messageType"] == "REQUEST" {
                    let untagged = misbehaviour == Misbehaviour::UntaggedKickoff
                        && message["requestType"] == "KICKOFF";
                    let reply = if untagged {
                        json!({"phase": message["phase"], "response": {"players": []}})
                    } else {
                        json!({
                            "phase": message["phase"],
                            "response": {"requestType": message["requestType"]},
                        })
                    };
                    self.send(&reply.to_string()).await;
                }
                let done = message["eventType"] == "GAME_OVER";
                seen.push(message);
                if done {
                    break;
                }
            }
            seen
        }
    }

    /// Play a short match; returns what each agent saw.
    async fn run_match(
        response_timeout_ms: u64,
        agent1: Misbehaviour,
        agent2: Misbehaviour,
    ) -> (RunOutcome, Vec<Value>, Vec<Value>) {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let config = ServerConfig {
            port,
            response_timeout_ms,
            ..ServerConfig::default()
        };
        let match_config = MatchConfig {
            match_duration_seconds: 0.3,
            ..MatchConfig::default()
        };

        let server =
            tokio::spawn(async move { play_match(&listener, &config, match_config).await });

        let first = TestAgent::connect(port).await;
        let first = tokio::spawn(first.play(agent1));
        // Give the listener time to pair the first connection with agent 1.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        let second = TestAgent::connect(port).await;
        let second = tokio::spawn(second.play(agent2));

        let outcome = tokio::time::timeout(std::time::Duration::from_secs(10), server)
            .await
            .expect("match stalled")
            .unwrap()
            .unwrap();
        (outcome, first.await.unwrap(), second.await.unwrap())
    }

    fn errors(seen: &[Value]) -> Vec<&Value> {
        seen.iter()
            .filter(|m| m["messageType"] == "ERROR")
            .map(|m| &m["message"])
            .collect()
    }

    #[tokio::test]
    async fn test_two_agents_play_a_match() {
        let (outcome, seen1, seen2) =
            run_match(1000, Misbehaviour::GarbageLine, Misbehaviour::None).await;
        assert!(matches!(outcome, RunOutcome::Completed { .. }));

        assert_eq!(errors(&seen1).len(), 1);
        assert!(errors(&seen2).is_empty());

        let first_event = &seen2[0];
        assert_eq!(first_event["messageType"], "EVENT");
        assert_eq!(first_event["eventType"], "KICKOFF");
        assert_eq!(first_event["teamKickingOff"], 1);
    }

    #[tokio::test]
    async fn test_untagged_reply_reported_once_without_waiting() {
        // No deadline: a reply stuck outside the phase would stall the match.
        let (outcome, seen1, seen2) =
            run_match(0, Misbehaviour::UntaggedKickoff, Misbehaviour::None).await;
        assert!(matches!(outcome, RunOutcome::Completed { .. }));

        let errors1 = errors(&seen1);
        assert_eq!(errors1.len(), 1);
        assert_eq!(errors1[0], "Expected a KICKOFF response, got 'no requestType'.");
        assert!(errors(&seen2).is_empty());
    }
}
