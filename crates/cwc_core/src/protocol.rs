//! Request, reply and event payloads exchanged with the agents.
//!
//! Everything here is plain serde data; the wire encoding (JSON lines, in
//! `cwc_server`) is the transport's business.
//!
//! # Flow
//!
//! ```text
//! core  -> agent  {"phase":1,"requestType":"KICKOFF"}
//! agent -> core   {"requestType":"KICKOFF","players":[{"playerNumber":4,"position":{"x":49.0,"y":25.0},"direction":0.0}]}
//! core  -> agent  {"phase":2,"requestType":"PLAY","gameTimeSeconds":0.1,"team":{...},"opponent":{...}}
//! agent -> core   {"requestType":"PLAY","players":[{"playerNumber":4,"action":"MOVE","destination":{"x":60.0,"y":20.0}}]}
//! ```
//!
//! A reply must echo the `requestType` of the request it answers.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ResponseError;
use crate::math::Vec2;
use crate::player::{Intentions, PlayerNumber};
use crate::team::{TeamNumber, TeamSnapshot, TeamState};

/// Identifier of a phase instance, unique within a match.
pub type PhaseId = u64;

/// One of the two agents in a match. Agent 1 controls team 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentId {
    /// Controls team 1.
    Agent1,
    /// Controls team 2.
    Agent2,
}

impl AgentId {
    /// Both agents, in order.
    pub const BOTH: [Self; 2] = [Self::Agent1, Self::Agent2];

    /// Index into per-agent arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Agent1 => 0,
            Self::Agent2 => 1,
        }
    }

    /// The team this agent controls.
    #[must_use]
    pub const fn team(self) -> TeamNumber {
        match self {
            Self::Agent1 => TeamNumber::One,
            Self::Agent2 => TeamNumber::Two,
        }
    }

    /// The other agent.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Agent1 => Self::Agent2,
            Self::Agent2 => Self::Agent1,
        }
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Agent1 => write!(f, "AI1"),
            Self::Agent2 => write!(f, "AI2"),
        }
    }
}

/// Tag identifying what a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestKind {
    /// Kickoff placements.
    Kickoff,
    /// Player actions for the next turn of open play.
    Play,
}

impl RequestKind {
    /// Wire tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Kickoff => "KICKOFF",
            Self::Play => "PLAY",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request sent to one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRequest {
    /// Phase the reply must be delivered to.
    pub phase: PhaseId,
    /// Kind-specific payload.
    #[serde(flatten)]
    pub body: RequestBody,
}

impl AgentRequest {
    /// The request kind tag.
    #[must_use]
    pub fn kind(&self) -> RequestKind {
        match self.body {
            RequestBody::Kickoff => RequestKind::Kickoff,
            RequestBody::Play { .. } => RequestKind::Play,
        }
    }
}

/// Kind-specific request payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "requestType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestBody {
    /// Where do you want your players for the kickoff?
    Kickoff,
    /// What should your players do next?
    #[serde(rename_all = "camelCase")]
    Play {
        /// Game time at which the actions will take effect.
        game_time_seconds: f64,
        /// The agent's own team, including intentions.
        team: TeamSnapshot,
        /// The opposing team, public state only.
        opponent: TeamSnapshot,
    },
}

/// A reply from an agent, before validation.
///
/// Any JSON value deserializes into a response: a missing or non-string
/// `requestType`, or a body that is not an object, is only reported when the
/// phase validates the reply. That keeps a bad reply a per-agent validation
/// failure rather than a transport error.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub struct AgentResponse {
    /// Echo of the request's `requestType`, if the agent sent a string tag.
    pub request_type: Option<String>,
    /// Remaining fields.
    pub body: serde_json::Map<String, serde_json::Value>,
    /// The raw reply when it was not a JSON object.
    pub non_object: Option<serde_json::Value>,
}

impl AgentResponse {
    /// Build a reply from a kind tag and a JSON object body.
    ///
    /// Non-object bodies are treated as empty.
    #[must_use]
    pub fn new(kind: RequestKind, body: serde_json::Value) -> Self {
        Self::tagged(kind.as_str(), body)
    }

    /// Build a reply with an arbitrary tag.
    #[must_use]
    pub fn tagged(tag: impl Into<String>, body: serde_json::Value) -> Self {
        let body = match body {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        Self {
            request_type: Some(tag.into()),
            body,
            non_object: None,
        }
    }

    /// Check the echoed tag against the outstanding request.
    pub fn expect_kind(&self, expected: RequestKind) -> Result<(), ResponseError> {
        match (&self.request_type, &self.non_object) {
            (Some(tag), None) if tag == expected.as_str() => Ok(()),
            (Some(tag), _) => Err(ResponseError::ProtocolMismatch {
                expected,
                received: tag.clone(),
            }),
            (None, Some(raw)) => Err(ResponseError::ProtocolMismatch {
                expected,
                received: raw.to_string(),
            }),
            (None, None) => Err(ResponseError::ProtocolMismatch {
                expected,
                received: String::from("no requestType"),
            }),
        }
    }

    /// Check the tag, then parse the body.
    pub fn parse_body<T: DeserializeOwned>(&self, kind: RequestKind) -> Result<T, ResponseError> {
        self.expect_kind(kind)?;
        serde_json::from_value(serde_json::Value::Object(self.body.clone())).map_err(|e| {
            ResponseError::MalformedBody {
                kind,
                message: e.to_string(),
            }
        })
    }
}

impl From<serde_json::Value> for AgentResponse {
    fn from(value: serde_json::Value) -> Self {
        let mut body = match value {
            serde_json::Value::Object(map) => map,
            other => {
                return Self {
                    non_object: Some(other),
                    ..Self::default()
                }
            }
        };
        let request_type = body.remove("requestType").map(|tag| match tag {
            serde_json::Value::String(tag) => tag,
            other => other.to_string(),
        });
        Self {
            request_type,
            body,
            non_object: None,
        }
    }
}

impl From<AgentResponse> for serde_json::Value {
    fn from(response: AgentResponse) -> Self {
        if let Some(raw) = response.non_object {
            return raw;
        }
        let mut map = response.body;
        if let Some(tag) = response.request_type {
            map.insert(String::from("requestType"), Self::String(tag));
        }
        Self::Object(map)
    }
}

/// What arrived in an agent's slot.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentReply {
    /// The agent answered.
    Response(AgentResponse),
    /// The transport gave up waiting.
    TimedOut,
}

impl AgentReply {
    /// Parse the reply as a `kind` body, turning a timeout into an error.
    pub fn parse<T: DeserializeOwned>(&self, kind: RequestKind) -> Result<T, ResponseError> {
        match self {
            Self::Response(response) => response.parse_body(kind),
            Self::TimedOut => Err(ResponseError::TimedOut(kind)),
        }
    }
}

impl From<AgentResponse> for AgentReply {
    fn from(response: AgentResponse) -> Self {
        Self::Response(response)
    }
}

/// Body of a KICKOFF reply.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KickoffResponse {
    /// Requested placements. Players not listed keep the default formation.
    #[serde(default)]
    pub players: Vec<KickoffPlacement>,
}

/// Kickoff position for one player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KickoffPlacement {
    /// Player to place.
    pub player_number: PlayerNumber,
    /// Position on the pitch.
    pub position: Vec2,
    /// Facing, in degrees.
    pub direction: f64,
}

/// Body of a PLAY reply.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayResponse {
    /// New intentions. Players not listed keep their current intention.
    #[serde(default)]
    pub players: Vec<PlayerAction>,
}

/// New intention for one player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerAction {
    /// Player the action is for.
    pub player_number: PlayerNumber,
    /// The action itself.
    #[serde(flatten)]
    pub action: Intentions,
}

/// Broadcast events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "eventType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchEvent {
    /// A kickoff is about to be taken.
    #[serde(rename_all = "camelCase")]
    Kickoff {
        /// Public state of team 1.
        team1: TeamSnapshot,
        /// Public state of team 2.
        team2: TeamSnapshot,
        /// The side kicking off.
        team_kicking_off: TeamNumber,
    },
    /// Public state after a turn of play.
    #[serde(rename_all = "camelCase")]
    State {
        /// Game time in seconds.
        game_time_seconds: f64,
        /// Public state of team 1.
        team1: TeamSnapshot,
        /// Public state of team 2.
        team2: TeamSnapshot,
    },
    /// The match has ended.
    #[serde(rename_all = "camelCase")]
    GameOver {
        /// Final team 1 state.
        team1: TeamState,
        /// Final team 2 state.
        team2: TeamState,
    },
}
