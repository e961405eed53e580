pub mod error;
pub mod fen;
pub mod model;
pub mod test_utils;

mod board;
mod move_generation;

pub use board::ChessBoard;
pub use error::{FenError, MoveError};
pub use model::{CheckState, Colour, Coords, GameOutcome, LastMove, Piece, PieceKind};
pub use move_generation::SafeSquares;
