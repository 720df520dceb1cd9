//! JSON wire messages exchanged with a participant's connection.
//!
//! Every frame is one JSON object. Inbound frames carry an `action` tag,
//! outbound frames a `status` tag.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::engine::config::{HEIGHT, WIDTH};

/// Inbound frame as it appears on the wire. Coordinates are unchecked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ClientMessage {
    Place { x: i64, y: i64 },
    Attack { x: i64, y: i64 },
}

impl ClientMessage {
    pub fn place(x: usize, y: usize) -> Self {
        ClientMessage::Place {
            x: x as i64,
            y: y as i64,
        }
    }

    pub fn attack(x: usize, y: usize) -> Self {
        ClientMessage::Attack {
            x: x as i64,
            y: y as i64,
        }
    }
}

/// A validated inbound action with on-grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Place { x: usize, y: usize },
    Attack { x: usize, y: usize },
}

/// Outbound frame sent to one or both participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ServerMessage {
    WaitingStart,
    Match,
    Placed {
        x: usize,
        y: usize,
    },
    Duplicate {
        x: usize,
        y: usize,
    },
    Start {
        #[serde(rename = "yourTurn")]
        your_turn: bool,
    },
    /// `own` is set when the attack landed on the recipient's own board.
    Attack {
        x: usize,
        y: usize,
        hit: bool,
        own: bool,
        end: bool,
    },
    OpponentDisconnected,
    Error {
        message: String,
    },
}

impl ServerMessage {
    pub fn error(message: impl fmt::Display) -> Self {
        ServerMessage::Error {
            message: message.to_string(),
        }
    }
}

/// Inbound frames rejected before they reach a game session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Not JSON, unknown action, or missing/non-integer fields.
    Malformed(String),
    /// Coordinates outside the grid.
    OutOfBounds { x: i64, y: i64 },
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::Malformed(reason) => write!(f, "Malformed message: {}", reason),
            ProtocolError::OutOfBounds { x, y } => write!(
                f,
                "Coordinate ({}, {}) is outside the {}x{} board",
                x, y, WIDTH, HEIGHT
            ),
        }
    }
}

impl std::error::Error for ProtocolError {}

fn on_grid(x: i64, y: i64) -> Result<(usize, usize), ProtocolError> {
    let in_range = |v: i64, max: usize| usize::try_from(v).ok().filter(|v| *v < max);
    match (in_range(x, WIDTH), in_range(y, HEIGHT)) {
        (Some(cx), Some(cy)) => Ok((cx, cy)),
        _ => Err(ProtocolError::OutOfBounds { x, y }),
    }
}

impl TryFrom<ClientMessage> for Action {
    type Error = ProtocolError;

    fn try_from(msg: ClientMessage) -> Result<Self, Self::Error> {
        match msg {
            ClientMessage::Place { x, y } => {
                let (x, y) = on_grid(x, y)?;
                Ok(Action::Place { x, y })
            }
            ClientMessage::Attack { x, y } => {
                let (x, y) = on_grid(x, y)?;
                Ok(Action::Attack { x, y })
            }
        }
    }
}

/// Parse and validate one inbound frame.
pub fn parse_action(frame: &str) -> Result<Action, ProtocolError> {
    let msg: ClientMessage =
        serde_json::from_str(frame).map_err(|e| ProtocolError::Malformed(e.to_string()))?;
    Action::try_from(msg)
}

/// Serialize an outbound message into a single frame.
pub fn encode(msg: &ServerMessage) -> anyhow::Result<String> {
    serde_json::to_string(msg).map_err(|e| anyhow::anyhow!("Serialization error: {}", e))
}

/// Parse an outbound frame (client side).
pub fn decode(frame: &str) -> anyhow::Result<ServerMessage> {
    serde_json::from_str(frame).map_err(|e| anyhow::anyhow!("Deserialization error: {}", e))
}

/// Serialize an inbound message (client side).
pub fn encode_action(msg: &ClientMessage) -> anyhow::Result<String> {
    serde_json::to_string(msg).map_err(|e| anyhow::anyhow!("Serialization error: {}", e))
}
