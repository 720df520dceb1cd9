//! Core game engine (no_std compatible)
//!
//! Boards, the session state machine and the waiting queue. Nothing here
//! performs I/O; the router drives these types from transport events.

pub mod bitboard;
pub mod board;
pub mod common;
pub mod config;
pub mod queue;
pub mod session;

pub use bitboard::{BitBoard, BitBoardError};
pub use board::Board;
pub use common::{AttackOutcome, BoardError, GameError, PlaceOutcome, PlaceResult, SessionId};
pub use config::*;
pub use queue::MatchQueue;
pub use session::{GameSession, Phase, Seat};
