use thiserror::Error;

use super::model::Coords;

/// Rejections raised by `apply_move`. The board is left untouched in every
/// case.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error("square {0} is outside the board")]
    OutOfBoard(Coords),

    #[error("no piece on {0}")]
    EmptySquare(Coords),

    #[error("the piece on {0} does not belong to the side to move")]
    WrongColour(Coords),

    #[error("{from}{to} is not a legal move in this position")]
    IllegalDestination { from: Coords, to: Coords },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("position string must have 6 fields, found {0}")]
    FieldCount(usize),

    #[error("board field must describe 8 ranks, found {0}")]
    RankCount(usize),

    #[error("rank {0} does not describe exactly 8 files")]
    FileCount(usize),

    #[error("invalid piece letter '{0}'")]
    InvalidPiece(char),

    #[error("invalid active colour field '{0}'")]
    InvalidActiveColour(String),

    #[error("invalid en passant field '{0}'")]
    InvalidEnPassant(String),

    #[error("invalid counter field '{0}'")]
    InvalidCounter(String),
}
