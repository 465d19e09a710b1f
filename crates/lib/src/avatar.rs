//! # Avatar Sessions
//!
//! The talking-avatar service is driven by callbacks (connected, message,
//! error, closed). [`AvatarSession`] models one conversation as an explicit
//! state machine fed by those callbacks, buffering inbound messages and
//! outbound requests so callers can work with it in request/response style.

use crate::errors::SessionError;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use tracing::debug;

/// Credentials the browser SDK needs to open a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarClientConfig {
    pub client_key: String,
    pub agent_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connecting,
    Connected,
    Error,
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Idle => "idle",
            SessionState::Connecting => "connecting",
            SessionState::Connected => "connected",
            SessionState::Error => "in error",
            SessionState::Closed => "closed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

/// A chat line reported by the avatar service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentMessage {
    pub role: Speaker,
    pub content: String,
}

/// Callback events from the avatar service, plus the local connect request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Connect,
    Connected,
    Failed(String),
    Message(AgentMessage),
    Disconnect,
}

impl SessionEvent {
    fn label(&self) -> &'static str {
        match self {
            SessionEvent::Connect => "connect",
            SessionEvent::Connected => "connected",
            SessionEvent::Failed(_) => "failed",
            SessionEvent::Message(_) => "message",
            SessionEvent::Disconnect => "disconnect",
        }
    }
}

/// Requests waiting to be sent to the avatar service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outgoing {
    /// Have the avatar say this text verbatim.
    Speak(String),
    /// Send this text as a user chat turn.
    Chat(String),
}

#[derive(Debug)]
pub struct AvatarSession {
    state: SessionState,
    inbox: VecDeque<AgentMessage>,
    outbox: VecDeque<Outgoing>,
    last_error: Option<String>,
}

impl Default for AvatarSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AvatarSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            inbox: VecDeque::new(),
            outbox: VecDeque::new(),
            last_error: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Applies one event and returns the new state.
    pub fn handle(&mut self, event: SessionEvent) -> Result<SessionState, SessionError> {
        use SessionState::*;

        let next = match (self.state, &event) {
            (Idle | Error | Closed, SessionEvent::Connect) => {
                self.last_error = None;
                Connecting
            }
            (Connecting, SessionEvent::Connected) => Connected,
            (Connecting | Connected, SessionEvent::Failed(reason)) => {
                self.last_error = Some(reason.clone());
                self.outbox.clear();
                Error
            }
            (Connected, SessionEvent::Message(message)) => {
                self.inbox.push_back(message.clone());
                Connected
            }
            (Idle | Connecting | Connected | Error, SessionEvent::Disconnect) => {
                self.outbox.clear();
                Closed
            }
            (state, event) => {
                return Err(SessionError::InvalidTransition {
                    state: state.to_string(),
                    event: event.label().to_string(),
                })
            }
        };

        debug!("Avatar session {} -> {} on {}", self.state, next, event.label());
        self.state = next;
        Ok(next)
    }

    fn enqueue(&mut self, request: Outgoing) -> Result<(), SessionError> {
        if self.state != SessionState::Connected {
            return Err(SessionError::NotConnected(self.state.to_string()));
        }
        self.outbox.push_back(request);
        Ok(())
    }

    pub fn speak(&mut self, text: impl Into<String>) -> Result<(), SessionError> {
        self.enqueue(Outgoing::Speak(text.into()))
    }

    pub fn chat(&mut self, text: impl Into<String>) -> Result<(), SessionError> {
        self.enqueue(Outgoing::Chat(text.into()))
    }

    /// Takes the requests queued since the last call, oldest first.
    pub fn take_outgoing(&mut self) -> Vec<Outgoing> {
        self.outbox.drain(..).collect()
    }

    /// Takes the messages received since the last call, oldest first.
    pub fn drain_messages(&mut self) -> Vec<AgentMessage> {
        self.inbox.drain(..).collect()
    }
}
