use std::cell::RefCell;
use std::rc::Rc;

use broadside::{Connection, Phase, Router, ServerMessage, SessionId, PIECE_COUNT};

#[derive(Debug, Default)]
struct Outbox {
    messages: Vec<ServerMessage>,
    closed: bool,
}

/// Connection that records everything the router does to it.
#[derive(Clone, Default)]
struct Recorder(Rc<RefCell<Outbox>>);

impl Recorder {
    fn take(&self) -> Vec<ServerMessage> {
        std::mem::take(&mut self.0.borrow_mut().messages)
    }

    fn closed(&self) -> bool {
        self.0.borrow().closed
    }
}

impl Connection for Recorder {
    fn send(&mut self, msg: ServerMessage) -> anyhow::Result<()> {
        let mut outbox = self.0.borrow_mut();
        if outbox.closed {
            return Err(anyhow::anyhow!("send after close"));
        }
        outbox.messages.push(msg);
        Ok(())
    }

    fn close(&mut self) {
        self.0.borrow_mut().closed = true;
    }
}

fn place(x: usize, y: usize) -> String {
    format!(r#"{{"action":"place","x":{},"y":{}}}"#, x, y)
}

fn attack(x: usize, y: usize) -> String {
    format!(r#"{{"action":"attack","x":{},"y":{}}}"#, x, y)
}

fn is_error(msg: &ServerMessage) -> bool {
    matches!(msg, ServerMessage::Error { .. })
}

fn error_text(msgs: &[ServerMessage]) -> String {
    match msgs {
        [ServerMessage::Error { message }] => message.clone(),
        other => panic!("expected a single error, got {:?}", other),
    }
}

struct Table {
    router: Router<Recorder>,
    p1: SessionId,
    p2: SessionId,
    c1: Recorder,
    c2: Recorder,
}

fn matched() -> Table {
    let mut router = Router::new();
    let (p1, p2) = (SessionId::from("p1"), SessionId::from("p2"));
    let (c1, c2) = (Recorder::default(), Recorder::default());
    router.connect(p1.clone(), c1.clone());
    router.connect(p2.clone(), c2.clone());
    c1.take();
    c2.take();
    Table {
        router,
        p1,
        p2,
        c1,
        c2,
    }
}

/// p1 places row 0, p2 places row 1; both in columns 0..PIECE_COUNT.
fn started() -> Table {
    let mut t = matched();
    for x in 0..PIECE_COUNT {
        t.router.handle_frame(&t.p1, &place(x, 0));
        t.router.handle_frame(&t.p2, &place(x, 1));
    }
    t.c1.take();
    t.c2.take();
    t
}

#[test]
fn test_connect_waits_then_matches() {
    let mut router = Router::new();
    let (c1, c2) = (Recorder::default(), Recorder::default());
    router.connect(SessionId::from("p1"), c1.clone());
    assert_eq!(c1.take(), vec![ServerMessage::WaitingStart]);
    assert_eq!(router.waiting_len(), 1);

    router.connect(SessionId::from("p2"), c2.clone());
    assert_eq!(c1.take(), vec![ServerMessage::Match]);
    assert_eq!(c2.take(), vec![ServerMessage::Match]);
    assert_eq!(router.waiting_len(), 0);
    assert_eq!(router.active_games(), 1);
}

#[test]
fn test_third_connection_waits() {
    let mut t = matched();
    let c3 = Recorder::default();
    t.router.connect(SessionId::from("p3"), c3.clone());
    assert_eq!(c3.take(), vec![ServerMessage::WaitingStart]);
    assert!(t.router.is_waiting(&SessionId::from("p3")));
    assert!(t.c1.take().is_empty());
}

#[test]
fn test_end_to_end_scenario() {
    let mut t = matched();

    // p1 finishes first; the second-to-finish side triggers the start.
    for x in 0..PIECE_COUNT {
        t.router.handle_frame(&t.p1, &place(x, 0));
    }
    let placed = t.c1.take();
    assert_eq!(placed.len(), PIECE_COUNT);
    assert_eq!(placed[0], ServerMessage::Placed { x: 0, y: 0 });
    assert!(t.c2.take().is_empty(), "opponent must not learn placements");

    for x in 0..PIECE_COUNT - 1 {
        t.router.handle_frame(&t.p2, &place(x, 1));
    }
    t.c2.take();
    t.router.handle_frame(&t.p2, &place(9, 9));
    assert_eq!(
        t.c2.take(),
        vec![
            ServerMessage::Placed { x: 9, y: 9 },
            ServerMessage::Start { your_turn: false },
        ]
    );
    assert_eq!(t.c1.take(), vec![ServerMessage::Start { your_turn: true }]);

    // p1 misses
    t.router.handle_frame(&t.p1, &attack(5, 5));
    let miss = |own| ServerMessage::Attack { x: 5, y: 5, hit: false, own, end: false };
    assert_eq!(t.c1.take(), vec![miss(false)]);
    assert_eq!(t.c2.take(), vec![miss(true)]);

    // p2 sinks p1's pieces one by one, p1 missing in between
    for x in 0..PIECE_COUNT {
        t.router.handle_frame(&t.p2, &attack(x, 0));
        let last = x + 1 == PIECE_COUNT;
        let hit = |own| ServerMessage::Attack { x, y: 0, hit: true, own, end: last };
        assert_eq!(t.c2.take(), vec![hit(false)]);
        assert_eq!(t.c1.take(), vec![hit(true)]);
        if !last {
            t.router.handle_frame(&t.p1, &attack(x, 8));
            t.c1.take();
            t.c2.take();
        }
    }
    assert!(t.c1.closed());
    assert!(t.c2.closed());
    assert_eq!(
        t.router.session_of(&t.p1).map(|g| g.phase()),
        Some(Phase::Ended)
    );
}

#[test]
fn test_actions_after_end_are_wrong_phase() {
    let mut t = started();
    // p1 wins by sinking row 1 while p2 misses on row 9
    for x in 0..PIECE_COUNT {
        t.router.handle_frame(&t.p1, &attack(x, 1));
        if x + 1 < PIECE_COUNT {
            t.router.handle_frame(&t.p2, &attack(x, 9));
        }
    }
    assert!(t.c1.closed() && t.c2.closed());

    // closed recorders refuse sends, so reopen to observe the rejection
    t.c1.0.borrow_mut().closed = false;
    t.c2.0.borrow_mut().closed = false;
    t.c1.take();
    t.c2.take();

    t.router.handle_frame(&t.p2, &attack(0, 0));
    assert_eq!(error_text(&t.c2.take()), "Action is not allowed in the current phase");
    t.router.handle_frame(&t.p1, &place(9, 9));
    assert_eq!(error_text(&t.c1.take()), "Action is not allowed in the current phase");
}

#[test]
fn test_errors_only_reach_offender() {
    let mut t = started();

    t.router.handle_frame(&t.p2, &attack(0, 0));
    assert_eq!(error_text(&t.c2.take()), "It is the opponent's turn");
    assert!(t.c1.take().is_empty());

    t.router.handle_frame(&t.p1, &place(3, 3));
    assert_eq!(error_text(&t.c1.take()), "Action is not allowed in the current phase");
    assert!(t.c2.take().is_empty());

    // the rejected calls did not consume p1's turn
    t.router.handle_frame(&t.p1, &attack(0, 1));
    assert_eq!(t.c1.take().len(), 1);
    t.router.handle_frame(&t.p2, &attack(9, 9));
    t.c1.take();
    t.c2.take();

    t.router.handle_frame(&t.p1, &attack(0, 1));
    assert_eq!(error_text(&t.c1.take()), "This field has already been attacked");
    assert!(t.c2.take().is_empty());
}

#[test]
fn test_too_many_pieces_and_duplicate() {
    let mut t = matched();
    t.router.handle_frame(&t.p1, &place(0, 0));
    t.router.handle_frame(&t.p1, &place(0, 0));
    assert_eq!(
        t.c1.take(),
        vec![
            ServerMessage::Placed { x: 0, y: 0 },
            ServerMessage::Duplicate { x: 0, y: 0 },
        ]
    );
    for x in 1..PIECE_COUNT {
        t.router.handle_frame(&t.p1, &place(x, 0));
    }
    t.c1.take();
    t.router.handle_frame(&t.p1, &place(9, 9));
    assert_eq!(error_text(&t.c1.take()), "Maximum number of pieces has been placed");
    assert!(t.c2.take().is_empty());
}

#[test]
fn test_malformed_frames_keep_connection_open() {
    let mut t = matched();
    t.router.handle_frame(&t.p1, "garbage");
    t.router.handle_frame(&t.p1, r#"{"action":"place","x":10,"y":3}"#);
    let msgs = t.c1.take();
    assert_eq!(msgs.len(), 2);
    assert!(msgs.iter().all(is_error));
    assert!(!t.c1.closed());
    assert!(t.c2.take().is_empty());

    // still usable afterwards
    t.router.handle_frame(&t.p1, &place(9, 9));
    assert_eq!(t.c1.take(), vec![ServerMessage::Placed { x: 9, y: 9 }]);
}

#[test]
fn test_unpaired_frames_are_ignored() {
    let mut router = Router::new();
    let c1 = Recorder::default();
    let p1 = SessionId::from("p1");
    router.connect(p1.clone(), c1.clone());
    c1.take();
    router.handle_frame(&p1, &place(0, 0));
    router.handle_frame(&p1, "garbage");
    router.handle_frame(&SessionId::from("ghost"), &place(0, 0));
    assert!(c1.take().is_empty());
}

#[test]
fn test_disconnect_while_waiting() {
    let mut router = Router::new();
    let (c1, c2) = (Recorder::default(), Recorder::default());
    let p1 = SessionId::from("p1");
    router.connect(p1.clone(), c1.clone());
    router.disconnect(&p1);
    assert_eq!(router.waiting_len(), 0);
    assert!(!router.is_connected(&p1));

    // the next arrival waits instead of pairing with the departed id
    router.connect(SessionId::from("p2"), c2.clone());
    assert_eq!(c2.take(), vec![ServerMessage::WaitingStart]);
    assert_eq!(router.active_games(), 0);
}

#[test]
fn test_disconnect_mid_game_notifies_once() {
    let mut t = started();
    t.router.handle_frame(&t.p1, &attack(0, 0));
    t.c1.take();
    t.c2.take();

    t.router.disconnect(&t.p1);
    assert_eq!(t.c2.take(), vec![ServerMessage::OpponentDisconnected]);
    assert!(t.c2.closed());
    assert_eq!(t.router.active_games(), 0);
    assert!(t.router.session_of(&t.p2).is_none());

    // the survivor's own close produces nothing further
    t.router.disconnect(&t.p2);
    assert!(t.c2.take().is_empty());
    assert!(!t.router.is_connected(&t.p2));

    // frames from the survivor before its transport closed are ignored
    let mut t = matched();
    t.router.disconnect(&t.p2);
    assert_eq!(t.c1.take(), vec![ServerMessage::OpponentDisconnected]);
    t.c1.0.borrow_mut().closed = false;
    t.router.handle_frame(&t.p1, &place(0, 0));
    assert!(t.c1.take().is_empty());
}

#[test]
fn test_disconnect_after_end_is_silent() {
    let mut t = started();
    for x in 0..PIECE_COUNT {
        t.router.handle_frame(&t.p1, &attack(x, 1));
        if x + 1 < PIECE_COUNT {
            t.router.handle_frame(&t.p2, &attack(x, 9));
        }
    }
    t.c1.take();
    t.c2.take();
    t.router.disconnect(&t.p1);
    t.router.disconnect(&t.p2);
    assert!(t.c1.take().is_empty());
    assert!(t.c2.take().is_empty());
    assert_eq!(t.router.active_games(), 0);
}

#[test]
fn test_duplicate_connection_refused() {
    let mut t = matched();
    let intruder = Recorder::default();
    t.router.connect(t.p1.clone(), intruder.clone());
    let msgs = intruder.take();
    assert_eq!(msgs.len(), 1);
    assert!(is_error(&msgs[0]));
    assert!(intruder.closed());
    assert!(!t.c1.closed());
    assert_eq!(t.router.active_games(), 1);
}
