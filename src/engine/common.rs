//! Common types for the engine: session identity, call outcomes and errors.

use alloc::string::String;
use core::fmt;

use crate::engine::bitboard::BitBoardError;

/// Opaque identity of one connection, stable for the connection's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        SessionId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        SessionId(String::from(id))
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        SessionId(id)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of placing a piece on a single board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceResult {
    /// The cell was empty and now holds a piece.
    Placed,
    /// The cell already held a piece; nothing changed.
    Duplicate,
}

/// Result of a successful `GameSession::place_piece`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceOutcome {
    Placed,
    Duplicate,
    /// The piece was placed and both sides are now fully placed.
    Start,
}

/// Result of a successful `GameSession::attack`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackOutcome {
    Hit,
    Miss,
    /// The attack struck the opponent's last piece.
    Won,
}

impl AttackOutcome {
    /// Whether the attacked cell held a piece.
    pub fn is_hit(self) -> bool {
        matches!(self, AttackOutcome::Hit | AttackOutcome::Won)
    }
}

/// Errors returned by Board operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// The coordinate is not on the grid.
    OutOfBounds { x: usize, y: usize },
    /// The board already holds every piece it can.
    TooManyPieces,
    /// The cell has already been attacked.
    AlreadyAttacked,
}

impl From<BitBoardError> for BoardError {
    fn from(err: BitBoardError) -> Self {
        match err {
            BitBoardError::IndexOutOfBounds { x, y } => BoardError::OutOfBounds { x, y },
        }
    }
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::OutOfBounds { x, y } => {
                write!(f, "Coordinate ({}, {}) is outside the board", x, y)
            }
            BoardError::TooManyPieces => write!(f, "Maximum number of pieces has been placed"),
            BoardError::AlreadyAttacked => write!(f, "This field has already been attacked"),
        }
    }
}

/// Rejections raised by `GameSession`. A rejected call leaves the session unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// The action is not allowed in the current phase.
    WrongPhase,
    /// The attack phase is active but it is the opponent's turn.
    NotYourTurn,
    /// The participant has already placed every piece.
    TooManyPieces,
    /// The targeted cell has already been attacked.
    AlreadyAttacked,
    /// The id is not one of the session's two participants.
    UnknownParticipant,
    /// The coordinate is not on the grid.
    OutOfBounds { x: usize, y: usize },
}

impl From<BoardError> for GameError {
    fn from(err: BoardError) -> Self {
        match err {
            BoardError::OutOfBounds { x, y } => GameError::OutOfBounds { x, y },
            BoardError::TooManyPieces => GameError::TooManyPieces,
            BoardError::AlreadyAttacked => GameError::AlreadyAttacked,
        }
    }
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::WrongPhase => write!(f, "Action is not allowed in the current phase"),
            GameError::NotYourTurn => write!(f, "It is the opponent's turn"),
            GameError::TooManyPieces => write!(f, "Maximum number of pieces has been placed"),
            GameError::AlreadyAttacked => write!(f, "This field has already been attacked"),
            GameError::UnknownParticipant => write!(f, "Not a participant of this game"),
            GameError::OutOfBounds { x, y } => {
                write!(f, "Coordinate ({}, {}) is outside the board", x, y)
            }
        }
    }
}
