use crate::chess_board::{ChessBoard, Coords, PieceKind};

const PROMOTION_KINDS: [PieceKind; 4] = [
    PieceKind::Queen,
    PieceKind::Rook,
    PieceKind::Bishop,
    PieceKind::Knight,
];

/// Counts legal move paths to the given depth by replaying the legal-move
/// set on board clones. Diagnostic tool for the move generator.
pub fn perft(board: &ChessBoard, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }

    let mut node_count = 0u64;
    for (&from, destinations) in board.legal_moves() {
        for &to in destinations {
            for promotion in promotion_choices(board, from, to) {
                let mut next = board.clone();
                next.apply_move(from, to, promotion)
                    .expect("generated moves must be legal");
                node_count += perft(&next, depth - 1);
            }
        }
    }
    node_count
}

/// A pawn reaching the far rank fans out into the four promotion kinds;
/// every other move carries no promotion parameter.
pub fn promotion_choices(board: &ChessBoard, from: Coords, to: Coords) -> Vec<Option<PieceKind>> {
    match board.piece_at(from) {
        Some(piece) if piece.kind == PieceKind::Pawn && (to.row == 0 || to.row == 7) => {
            PROMOTION_KINDS.iter().map(|&kind| Some(kind)).collect()
        }
        _ => vec![None],
    }
}
