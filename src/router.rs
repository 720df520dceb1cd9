//! Routes connection events to paired game sessions.
//!
//! The router owns every process-scoped table: live connections, the waiting
//! queue and the active sessions. It is driven one event at a time and emits
//! all resulting notifications before returning.

use std::collections::HashMap;

use log::{debug, info, warn};

use crate::engine::{AttackOutcome, GameError, GameSession, MatchQueue, PlaceOutcome, SessionId};
use crate::protocol::{parse_action, Action, ServerMessage};

/// Outbound half of one participant's connection.
pub trait Connection {
    /// Queue a message for delivery.
    fn send(&mut self, msg: ServerMessage) -> anyhow::Result<()>;
    /// Close the connection once everything sent before has been delivered.
    fn close(&mut self);
}

type GameKey = u64;

pub struct Router<C: Connection> {
    connections: HashMap<SessionId, C>,
    queue: MatchQueue<SessionId>,
    games: HashMap<GameKey, GameSession>,
    assignments: HashMap<SessionId, GameKey>,
    next_key: GameKey,
}

impl<C: Connection> Router<C> {
    pub fn new() -> Self {
        Self {
            connections: HashMap::new(),
            queue: MatchQueue::new(),
            games: HashMap::new(),
            assignments: HashMap::new(),
            next_key: 0,
        }
    }

    /// Number of ids waiting for an opponent.
    pub fn waiting_len(&self) -> usize {
        self.queue.len()
    }

    /// Number of sessions currently registered, ended ones included until their
    /// participants disconnect.
    pub fn active_games(&self) -> usize {
        self.games.len()
    }

    pub fn is_connected(&self, id: &SessionId) -> bool {
        self.connections.contains_key(id)
    }

    pub fn is_waiting(&self, id: &SessionId) -> bool {
        self.queue.contains(id)
    }

    /// The session `id` is playing in, if any.
    pub fn session_of(&self, id: &SessionId) -> Option<&GameSession> {
        self.assignments.get(id).and_then(|key| self.games.get(key))
    }

    /// Register a new connection and pair it with the longest-waiting id, if any.
    ///
    /// Returns `false` if `id` is already connected; the newcomer is sent an
    /// error and closed, and the existing registration is kept.
    pub fn connect(&mut self, id: SessionId, mut conn: C) -> bool {
        if self.connections.contains_key(&id) {
            warn!("refusing second connection for session {}", id);
            let _ = conn.send(ServerMessage::error("Session is already connected"));
            conn.close();
            return false;
        }
        self.connections.insert(id.clone(), conn);

        let Some(opponent) = self.queue.dequeue() else {
            self.queue.enqueue(id.clone());
            info!("session {} waiting for an opponent", id);
            self.send_to(&id, ServerMessage::WaitingStart);
            return true;
        };

        debug_assert!(
            !self.assignments.contains_key(&opponent),
            "queued id {} is already in a game",
            opponent
        );
        let key = self.next_key;
        self.next_key += 1;
        self.games
            .insert(key, GameSession::new(opponent.clone(), id.clone()));
        self.assignments.insert(opponent.clone(), key);
        self.assignments.insert(id.clone(), key);
        info!("matched {} with {} (game {})", opponent, id, key);

        self.send_to(&id, ServerMessage::Match);
        self.send_to(&opponent, ServerMessage::Match);
        true
    }

    /// Handle one raw inbound frame from `id`.
    pub fn handle_frame(&mut self, id: &SessionId, frame: &str) {
        if !self.assignments.contains_key(id) {
            debug!("ignoring frame from unpaired session {}", id);
            return;
        }
        match parse_action(frame) {
            Ok(action) => self.handle_action(id, action),
            Err(e) => {
                debug!("rejecting frame from {}: {}", id, e);
                self.send_to(id, ServerMessage::error(e));
            }
        }
    }

    /// Apply a validated action from `id` to its session.
    pub fn handle_action(&mut self, id: &SessionId, action: Action) {
        let Some(&key) = self.assignments.get(id) else {
            debug!("ignoring action from unpaired session {}", id);
            return;
        };
        let Some(game) = self.games.get_mut(&key) else {
            warn!("session {} points at missing game {}", id, key);
            return;
        };
        let Some(opponent) = game.opponent_of(id).cloned() else {
            self.reject(id, GameError::UnknownParticipant);
            return;
        };

        match action {
            Action::Place { x, y } => match game.place_piece(id, x, y) {
                Ok(outcome) => {
                    let first_turn = game.current_turn().cloned();
                    self.on_placed(id, &opponent, outcome, x, y, first_turn);
                }
                Err(e) => self.reject(id, e),
            },
            Action::Attack { x, y } => match game.attack(id, x, y) {
                Ok(outcome) => self.on_attack(key, id, &opponent, outcome, x, y),
                Err(e) => self.reject(id, e),
            },
        }
    }

    fn on_placed(
        &mut self,
        id: &SessionId,
        opponent: &SessionId,
        outcome: PlaceOutcome,
        x: usize,
        y: usize,
        first_turn: Option<SessionId>,
    ) {
        match outcome {
            PlaceOutcome::Duplicate => self.send_to(id, ServerMessage::Duplicate { x, y }),
            PlaceOutcome::Placed => self.send_to(id, ServerMessage::Placed { x, y }),
            PlaceOutcome::Start => {
                self.send_to(id, ServerMessage::Placed { x, y });
                let my_turn = first_turn.as_ref() == Some(id);
                info!("game between {} and {} started", id, opponent);
                self.send_to(id, ServerMessage::Start { your_turn: my_turn });
                self.send_to(opponent, ServerMessage::Start { your_turn: !my_turn });
            }
        }
    }

    fn on_attack(
        &mut self,
        key: GameKey,
        id: &SessionId,
        opponent: &SessionId,
        outcome: AttackOutcome,
        x: usize,
        y: usize,
    ) {
        let hit = outcome.is_hit();
        let end = outcome == AttackOutcome::Won;
        let report = |own| ServerMessage::Attack {
            x,
            y,
            hit,
            own,
            end,
        };
        self.send_to(id, report(false));
        self.send_to(opponent, report(true));

        if end {
            info!("game {} won by {}", key, id);
            self.close(id);
            self.close(opponent);
        }
    }

    fn reject(&mut self, id: &SessionId, err: GameError) {
        debug!("rejecting action from {}: {}", id, err);
        self.send_to(id, ServerMessage::error(err));
    }

    /// Tear down everything held for `id` after its transport closed.
    pub fn disconnect(&mut self, id: &SessionId) {
        let was_waiting = self.queue.remove(id);
        debug_assert!(
            !(was_waiting && self.assignments.contains_key(id)),
            "session {} was both queued and playing",
            id
        );

        if was_waiting {
            info!("session {} left the queue", id);
        } else if let Some(key) = self.assignments.remove(id) {
            if let Some(game) = self.games.remove(&key) {
                if let Some(opponent) = game.opponent_of(id).cloned() {
                    self.assignments.remove(&opponent);
                    if game.is_ended() {
                        debug!("game {} closed after finishing", key);
                    } else {
                        info!("session {} left game {}, notifying {}", id, key, opponent);
                        self.send_to(&opponent, ServerMessage::OpponentDisconnected);
                        self.close(&opponent);
                    }
                }
            }
        }

        self.connections.remove(id);
    }

    fn send_to(&mut self, id: &SessionId, msg: ServerMessage) {
        match self.connections.get_mut(id) {
            Some(conn) => {
                if let Err(e) = conn.send(msg) {
                    warn!("failed to send to {}: {}", id, e);
                }
            }
            None => warn!("no connection registered for {}", id),
        }
    }

    fn close(&mut self, id: &SessionId) {
        if let Some(conn) = self.connections.get_mut(id) {
            conn.close();
        }
    }
}

impl<C: Connection> Default for Router<C> {
    fn default() -> Self {
        Self::new()
    }
}
