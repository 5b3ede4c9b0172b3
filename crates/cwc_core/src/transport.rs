//! Outbound collaborators of the match.
//!
//! The match never talks to agents directly. It hands requests and error
//! notices to an [`AgentTransport`] and announcements to an [`EventSink`];
//! both are fire-and-forget. Replies come back through
//! [`Match::deliver`](crate::game::Match::deliver), and any deadline policy
//! belongs to whoever implements these traits.

use crate::protocol::{AgentId, AgentRequest, MatchEvent};

/// Delivers requests and error notices to the agents.
pub trait AgentTransport {
    /// Send `request` to `agent`. The reply is delivered later, tagged with
    /// `request.phase`.
    fn send_request(&mut self, agent: AgentId, request: &AgentRequest);

    /// Tell `agent` that its last reply was rejected.
    fn send_error(&mut self, agent: AgentId, message: &str);
}

/// Publishes match events to agents and spectators.
pub trait EventSink {
    /// Publish `event`, to agent 1 and/or agent 2 as flagged.
    fn publish(&mut self, event: &MatchEvent, to_agent1: bool, to_agent2: bool);
}

impl<T: AgentTransport + ?Sized> AgentTransport for Box<T> {
    fn send_request(&mut self, agent: AgentId, request: &AgentRequest) {
        (**self).send_request(agent, request);
    }

    fn send_error(&mut self, agent: AgentId, message: &str) {
        (**self).send_error(agent, message);
    }
}

impl<E: EventSink + ?Sized> EventSink for Box<E> {
    fn publish(&mut self, event: &MatchEvent, to_agent1: bool, to_agent2: bool) {
        (**self).publish(event, to_agent1, to_agent2);
    }
}
