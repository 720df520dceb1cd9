/// Grid columns.
pub const WIDTH: usize = 10;
/// Grid rows.
pub const HEIGHT: usize = 10;
/// Pieces each participant places before the attack phase.
pub const PIECE_COUNT: usize = 8;
