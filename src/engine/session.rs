//! The two-participant placement-then-attack state machine.

use crate::engine::board::Board;
use crate::engine::common::{AttackOutcome, GameError, PlaceOutcome, PlaceResult, SessionId};
use crate::engine::config::PIECE_COUNT;

/// Position of a participant within its session. `First` joined the queue first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Seat {
    First,
    Second,
}

impl Seat {
    /// The opposing seat.
    pub fn other(self) -> Seat {
        match self {
            Seat::First => Seat::Second,
            Seat::Second => Seat::First,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Seat::First => 0,
            Seat::Second => 1,
        }
    }
}

/// Lifecycle of a session. `Turn` carries the seat that moves next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Placing,
    Turn(Seat),
    Ended,
}

#[derive(Debug, Clone)]
struct Participant {
    id: SessionId,
    board: Board,
    pieces_placed: usize,
}

impl Participant {
    fn new(id: SessionId) -> Self {
        Self {
            id,
            board: Board::new(),
            pieces_placed: 0,
        }
    }

    fn fully_placed(&self) -> bool {
        self.pieces_placed == PIECE_COUNT
    }
}

/// A live pairing of exactly two participants.
///
/// Every operation validates before it mutates, so a call that returns `Err`
/// leaves the session exactly as it was.
#[derive(Debug, Clone)]
pub struct GameSession {
    participants: [Participant; 2],
    phase: Phase,
}

impl GameSession {
    /// `first` moves first once the attack phase begins.
    pub fn new(first: SessionId, second: SessionId) -> Self {
        Self {
            participants: [Participant::new(first), Participant::new(second)],
            phase: Phase::Placing,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_ended(&self) -> bool {
        self.phase == Phase::Ended
    }

    /// Seat held by `id`, if it belongs to this session.
    pub fn seat_of(&self, id: &SessionId) -> Option<Seat> {
        if self.participants[0].id == *id {
            Some(Seat::First)
        } else if self.participants[1].id == *id {
            Some(Seat::Second)
        } else {
            None
        }
    }

    pub fn id_at(&self, seat: Seat) -> &SessionId {
        &self.participants[seat.index()].id
    }

    /// The other participant's id.
    pub fn opponent_of(&self, id: &SessionId) -> Option<&SessionId> {
        self.seat_of(id).map(|seat| self.id_at(seat.other()))
    }

    /// Id of the participant whose turn is active; `None` while placing or after the end.
    pub fn current_turn(&self) -> Option<&SessionId> {
        match self.phase {
            Phase::Turn(seat) => Some(self.id_at(seat)),
            Phase::Placing | Phase::Ended => None,
        }
    }

    /// Read-only view of a participant's own board.
    pub fn board_of(&self, id: &SessionId) -> Option<&Board> {
        self.seat_of(id)
            .map(|seat| &self.participants[seat.index()].board)
    }

    /// Pieces placed so far by `id`.
    pub fn pieces_placed(&self, id: &SessionId) -> Option<usize> {
        self.seat_of(id)
            .map(|seat| self.participants[seat.index()].pieces_placed)
    }

    pub fn place_piece(
        &mut self,
        id: &SessionId,
        x: usize,
        y: usize,
    ) -> Result<PlaceOutcome, GameError> {
        if self.phase != Phase::Placing {
            return Err(GameError::WrongPhase);
        }
        let seat = self.seat_of(id).ok_or(GameError::UnknownParticipant)?;
        let player = &mut self.participants[seat.index()];
        if player.pieces_placed >= PIECE_COUNT {
            return Err(GameError::TooManyPieces);
        }

        if player.board.place_piece(x, y)? == PlaceResult::Duplicate {
            return Ok(PlaceOutcome::Duplicate);
        }
        player.pieces_placed += 1;

        if self.participants.iter().all(Participant::fully_placed) {
            self.phase = Phase::Turn(Seat::First);
            log::debug!("placement complete, {} moves first", self.id_at(Seat::First));
            return Ok(PlaceOutcome::Start);
        }
        Ok(PlaceOutcome::Placed)
    }

    pub fn attack(
        &mut self,
        id: &SessionId,
        x: usize,
        y: usize,
    ) -> Result<AttackOutcome, GameError> {
        let active = match self.phase {
            Phase::Turn(seat) => seat,
            Phase::Placing | Phase::Ended => return Err(GameError::WrongPhase),
        };
        let seat = self.seat_of(id).ok_or(GameError::UnknownParticipant)?;
        if seat != active {
            return Err(GameError::NotYourTurn);
        }

        let opponent = &mut self.participants[seat.other().index()];
        let hit = opponent.board.attack(x, y)?;
        let remaining = opponent.board.pieces_remaining();
        self.phase = Phase::Turn(seat.other());

        if !hit {
            return Ok(AttackOutcome::Miss);
        }
        if remaining == 0 {
            self.phase = Phase::Ended;
            return Ok(AttackOutcome::Won);
        }
        Ok(AttackOutcome::Hit)
    }
}
