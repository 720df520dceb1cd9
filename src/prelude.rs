//! Commonly used types and utilities for ease of import.

pub use crate::engine::{
    AttackOutcome, Board, GameError, GameSession, MatchQueue, Phase, PlaceOutcome, Seat, SessionId,
    HEIGHT, PIECE_COUNT, WIDTH,
};

#[cfg(feature = "std")]
pub use crate::{
    init_logging, BotOutcome, Connection, RandomBot, Router, Server, ServerHandle, ServerMessage,
};

#[cfg(feature = "std")]
pub use crate::transport::{in_memory::InMemoryTransport, tcp::TcpTransport, Transport};
