use broadside::{Board, BoardError, PlaceResult, HEIGHT, PIECE_COUNT, WIDTH};
use proptest::prelude::*;

fn cell() -> impl Strategy<Value = (usize, usize)> {
    (0..WIDTH, 0..HEIGHT)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn duplicate_placement_changes_nothing(
        pieces in prop::collection::vec(cell(), 1..=PIECE_COUNT),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut board = Board::new();
        for &(x, y) in &pieces {
            board.place_piece(x, y).unwrap();
        }
        let before = board;
        let (x, y) = pieces[pick.index(pieces.len())];
        prop_assert_eq!(board.place_piece(x, y).unwrap(), PlaceResult::Duplicate);
        prop_assert_eq!(board, before);
    }

    #[test]
    fn repeat_attack_is_rejected(
        pieces in prop::collection::vec(cell(), 0..=PIECE_COUNT),
        (x, y) in cell(),
    ) {
        let mut board = Board::new();
        for &(px, py) in &pieces {
            board.place_piece(px, py).unwrap();
        }
        let hit = board.attack(x, y).unwrap();
        prop_assert_eq!(hit, board.has_piece(x, y));
        let after_first = board;
        prop_assert_eq!(board.attack(x, y).unwrap_err(), BoardError::AlreadyAttacked);
        prop_assert_eq!(board, after_first);
    }

    #[test]
    fn remaining_counts_unhit_pieces(
        pieces in prop::collection::vec(cell(), 0..30),
        attacks in prop::collection::vec(cell(), 0..60),
    ) {
        let mut board = Board::new();
        for &(x, y) in &pieces {
            let _ = board.place_piece(x, y);
        }
        prop_assert!(board.piece_count() <= PIECE_COUNT);
        for &(x, y) in &attacks {
            let _ = board.attack(x, y);
        }
        let unhit = board.pieces().filter(|&(x, y)| !board.was_attacked(x, y)).count();
        prop_assert_eq!(board.pieces_remaining(), unhit);
    }
}
