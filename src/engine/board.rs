//! One participant's private grid: piece placement and attack history.

use core::fmt;

use crate::engine::bitboard::BitBoard;
use crate::engine::common::{BoardError, PlaceResult};
use crate::engine::config::{HEIGHT, PIECE_COUNT, WIDTH};

pub(crate) type Grid = BitBoard<u128, WIDTH, HEIGHT>;

const _: () = assert!(WIDTH * HEIGHT <= 128, "board does not fit in a u128 grid");

/// Cell flags are monotonic: nothing ever clears `pieces` or `attacked`.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct Board {
    pieces: Grid,
    attacked: Grid,
    pieces_remaining: usize,
}

impl Board {
    /// Create an empty board (no pieces, no attacks).
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a piece at (x, y). An occupied cell yields `Duplicate` and is left as is.
    ///
    /// A board holds at most `PIECE_COUNT` pieces; once full a new cell fails
    /// with `TooManyPieces`.
    pub fn place_piece(&mut self, x: usize, y: usize) -> Result<PlaceResult, BoardError> {
        if self.pieces.get(x, y)? {
            return Ok(PlaceResult::Duplicate);
        }
        if self.piece_count() >= PIECE_COUNT {
            return Err(BoardError::TooManyPieces);
        }
        self.pieces.set(x, y)?;
        self.pieces_remaining += 1;
        Ok(PlaceResult::Placed)
    }

    /// Attack (x, y), returning `true` on a hit.
    pub fn attack(&mut self, x: usize, y: usize) -> Result<bool, BoardError> {
        if self.attacked.get(x, y)? {
            return Err(BoardError::AlreadyAttacked);
        }
        self.attacked.set(x, y)?;
        let hit = self.pieces.get(x, y)?;
        if hit {
            self.pieces_remaining -= 1;
        }
        Ok(hit)
    }

    /// Pieces placed on this board that have not been hit yet.
    pub fn pieces_remaining(&self) -> usize {
        self.pieces_remaining
    }

    pub fn has_piece(&self, x: usize, y: usize) -> bool {
        self.pieces.get(x, y).unwrap_or(false)
    }

    pub fn was_attacked(&self, x: usize, y: usize) -> bool {
        self.attacked.get(x, y).unwrap_or(false)
    }

    /// Number of cells holding a piece, hit or not.
    pub fn piece_count(&self) -> usize {
        self.pieces.count_ones()
    }

    /// Number of cells attacked so far.
    pub fn attack_count(&self) -> usize {
        self.attacked.count_ones()
    }

    /// Cells holding a piece, as `(x, y)`.
    pub fn pieces(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.pieces.iter_set_bits()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Board {{\n  pieces:\n{}\n  attacked:\n{}\n  remaining: {}\n}}",
            self.pieces, self.attacked, self.pieces_remaining
        )
    }
}
