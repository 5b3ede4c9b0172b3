//! Error types for the match core.
//!
//! [`GameError`] covers failures of the match itself (bad configuration,
//! invalid state). [`ResponseError`] covers a single agent's reply that could
//! not be applied; those are recovered per agent and reported back to the
//! offending agent as a message, never propagated.

use thiserror::Error;

use crate::protocol::RequestKind;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for match setup and state errors.
#[derive(Debug, Error)]
pub enum GameError {
    /// Failed to read or parse a configuration file.
    #[error("Failed to load config '{path}': {message}")]
    ConfigLoad {
        /// Path to the file that failed to load.
        path: String,
        /// Error message.
        message: String,
    },

    /// Configuration was parsed but holds unusable values.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Invalid match state for the requested operation.
    #[error("Invalid match state: {0}")]
    InvalidState(String),
}

/// Why one agent's reply to a phase request was not applied.
///
/// The `Display` text is what the agent receives on its error channel.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResponseError {
    /// The reply's `requestType` tag does not match the outstanding request.
    #[error("Expected a {expected} response, got '{received}'.")]
    ProtocolMismatch {
        /// The request kind the phase sent.
        expected: RequestKind,
        /// The tag the agent echoed.
        received: String,
    },

    /// The reply is correctly tagged but its body does not parse.
    #[error("Malformed {kind} response: {message}")]
    MalformedBody {
        /// The request kind being answered.
        kind: RequestKind,
        /// Parser message.
        message: String,
    },

    /// The reply refers to a player that is not on the agent's team.
    #[error("Player {0} is not in your team.")]
    UnknownPlayer(u32),

    /// The reply mentions the same player more than once.
    #[error("Player {0} appears more than once in the response.")]
    DuplicatePlayer(u32),

    /// A requested position lies outside the allowed area.
    #[error("Player {player}: position ({x}, {y}) is out of bounds: {reason}")]
    OutOfBounds {
        /// Player the position was meant for.
        player: u32,
        /// Requested x.
        x: f64,
        /// Requested y.
        y: f64,
        /// Which area rule was broken.
        reason: &'static str,
    },

    /// A numeric value is not usable (NaN or infinite).
    #[error("Player {player}: invalid {field}.")]
    InvalidValue {
        /// Player the value was meant for.
        player: u32,
        /// Name of the offending field.
        field: &'static str,
    },

    /// No reply arrived before the transport's deadline.
    #[error("No {0} response received in time.")]
    TimedOut(RequestKind),
}
