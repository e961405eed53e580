use super::error::MoveError;
use super::model::{CheckState, Colour, Coords, GameOutcome, LastMove, Piece, PieceKind};
use super::move_generation::SafeSquares;

pub type Squares = [[Option<Piece>; 8]; 8];

/// The single placement authority: every mutation goes through `apply_move`,
/// and speculative safety checks run on disposable copies of the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChessBoard {
    pub(crate) squares: Squares,
    pub(crate) side_to_move: Colour,
    pub(crate) last_move: Option<LastMove>,
    pub(crate) check_state: CheckState,
    pub(crate) safe_squares: SafeSquares,
    pub(crate) quiet_plies: u16,
    pub(crate) fullmove_number: u16,
}

impl ChessBoard {
    /// Sets up the standard starting position.
    pub fn new() -> Self {
        let mut squares: Squares = [[None; 8]; 8];
        let back_rank = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        for (col, &kind) in back_rank.iter().enumerate() {
            squares[0][col] = Some(Piece::new(Colour::White, kind));
            squares[7][col] = Some(Piece::new(Colour::Black, kind));
        }
        for col in 0..8 {
            squares[1][col] = Some(Piece::new(Colour::White, PieceKind::Pawn));
            squares[6][col] = Some(Piece::new(Colour::Black, PieceKind::Pawn));
        }
        Self::with_squares(squares, Colour::White)
    }

    pub(crate) fn with_squares(squares: Squares, side_to_move: Colour) -> Self {
        let mut board = Self {
            squares,
            side_to_move,
            last_move: None,
            check_state: CheckState::NotInCheck,
            safe_squares: SafeSquares::new(),
            quiet_plies: 0,
            fullmove_number: 1,
        };
        board.refresh_derived_state();
        board
    }

    /// Recomputes check state and the legal-move set for the side to move.
    /// Called after every mutation; the set is never patched incrementally.
    pub(crate) fn refresh_derived_state(&mut self) {
        self.check_state = match attacked_king(&self.squares, self.side_to_move) {
            Some(king) => CheckState::InCheck(king),
            None => CheckState::NotInCheck,
        };
        self.safe_squares = self.find_safe_squares();
    }

    /// The piece on `coords`, or `None` for empty and out-of-range squares.
    pub fn piece_at(&self, coords: Coords) -> Option<Piece> {
        if !coords.is_valid() {
            return None;
        }
        self.squares[coords.row as usize][coords.col as usize]
    }

    pub fn side_to_move(&self) -> Colour {
        self.side_to_move
    }

    pub fn check_state(&self) -> CheckState {
        self.check_state
    }

    pub fn last_move(&self) -> Option<LastMove> {
        self.last_move
    }

    /// Legal destinations per origin square for the side to move.
    pub fn legal_moves(&self) -> &SafeSquares {
        &self.safe_squares
    }

    /// Fifty-move counter in full-move units, as the serializer expects it.
    pub fn fifty_move_counter(&self) -> u16 {
        self.quiet_plies / 2
    }

    pub fn fullmove_number(&self) -> u16 {
        self.fullmove_number
    }

    /// Read-only snapshot of piece identity letters for rendering.
    pub fn board_view(&self) -> [[Option<char>; 8]; 8] {
        let mut view = [[None; 8]; 8];
        for row in 0..8 {
            for col in 0..8 {
                view[row][col] = self.squares[row][col].map(|piece| piece.to_char());
            }
        }
        view
    }

    /// Classification for the side to move: an empty legal-move set is
    /// checkmate when in check and stalemate otherwise.
    pub fn outcome(&self) -> GameOutcome {
        if !self.safe_squares.is_empty() {
            return GameOutcome::Ongoing;
        }
        if self.check_state.is_in_check() {
            GameOutcome::Checkmate
        } else {
            GameOutcome::Stalemate
        }
    }

    /// Applies a move chosen from the current legal set. On any rejection
    /// the board is left exactly as it was.
    pub fn apply_move(
        &mut self,
        from: Coords,
        to: Coords,
        promotion: Option<PieceKind>,
    ) -> Result<(), MoveError> {
        if !from.is_valid() {
            return Err(MoveError::OutOfBoard(from));
        }
        if !to.is_valid() {
            return Err(MoveError::OutOfBoard(to));
        }
        let mut piece = self.piece_at(from).ok_or(MoveError::EmptySquare(from))?;
        if piece.colour != self.side_to_move {
            return Err(MoveError::WrongColour(from));
        }
        let is_legal = self
            .safe_squares
            .get(&from)
            .is_some_and(|destinations| destinations.contains(&to));
        if !is_legal {
            return Err(MoveError::IllegalDestination { from, to });
        }

        let capture = self.piece_at(to).is_some();
        if matches!(
            piece.kind,
            PieceKind::Pawn | PieceKind::Rook | PieceKind::King
        ) {
            piece.has_moved = true;
        }

        self.handle_special_moves(piece, from, to);

        self.squares[from.row as usize][from.col as usize] = None;
        let placed = match promotion {
            Some(kind) => Piece {
                colour: piece.colour,
                kind,
                has_moved: true,
            },
            None => piece,
        };
        self.squares[to.row as usize][to.col as usize] = Some(placed);

        self.last_move = Some(LastMove {
            piece: placed,
            from,
            to,
        });

        if piece.kind == PieceKind::Pawn || capture {
            self.quiet_plies = 0;
        } else {
            self.quiet_plies += 1;
        }

        self.side_to_move = self.side_to_move.opposite();
        if self.side_to_move == Colour::White {
            self.fullmove_number += 1;
        }
        self.refresh_derived_state();
        Ok(())
    }

    /// Castling relocates the matching rook; an en-passant capture removes
    /// the pawn that double-stepped last ply from its own square.
    fn handle_special_moves(&mut self, piece: Piece, from: Coords, to: Coords) {
        if piece.kind == PieceKind::King && (to.col as i8 - from.col as i8).abs() == 2 {
            let (rook_col, rook_to_col) = if to.col > from.col { (7, 5) } else { (0, 3) };
            if let Some(mut rook) = self.squares[from.row as usize][rook_col].take() {
                rook.has_moved = true;
                self.squares[from.row as usize][rook_to_col] = Some(rook);
            }
        } else if piece.kind == PieceKind::Pawn {
            if let Some(last) = self.last_move {
                if last.piece.kind == PieceKind::Pawn
                    && (last.to.row as i8 - last.from.row as i8).abs() == 2
                    && from.row == last.to.row
                    && to.col == last.to.col
                {
                    self.squares[last.to.row as usize][last.to.col as usize] = None;
                }
            }
        }
    }

    pub(crate) fn render_to_string(&self) -> String {
        let view = self.board_view();
        let mut out = String::new();
        out.push_str("    a   b   c   d   e   f   g   h  \n");
        out.push_str("  ┌───┬───┬───┬───┬───┬───┬───┬───┐\n");
        for row in (0..8).rev() {
            out.push_str(&format!("{} │", row + 1));
            for col in 0..8 {
                out.push_str(&format!(" {} │", view[row][col].unwrap_or(' ')));
            }
            out.push_str(&format!(" {}\n", row + 1));
            if row > 0 {
                out.push_str("  ├───┼───┼───┼───┼───┼───┼───┼───┤\n");
            }
        }
        out.push_str("  └───┴───┴───┴───┴───┴───┴───┴───┘\n");
        out.push_str("    a   b   c   d   e   f   g   h  \n");
        out
    }
}

impl Default for ChessBoard {
    fn default() -> Self {
        Self::new()
    }
}

/// The attack detector. Scans every piece of the other colour and walks its
/// direction vectors (one step for pawn/knight/king, repeatedly for sliders)
/// until `target`'s king is found, an occupied square blocks the walk, or the
/// edge ends it. Pawn forward vectors never threaten.
pub(crate) fn attacked_king(squares: &Squares, target: Colour) -> Option<Coords> {
    let is_target_king = |coords: Coords| {
        matches!(
            squares[coords.row as usize][coords.col as usize],
            Some(p) if p.kind == PieceKind::King && p.colour == target
        )
    };

    for row in 0..8u8 {
        for col in 0..8u8 {
            let origin = Coords::new(row, col);
            let piece = match squares[row as usize][col as usize] {
                Some(piece) if piece.colour != target => piece,
                _ => continue,
            };
            for &(dr, dc) in piece.directions() {
                if piece.kind == PieceKind::Pawn && dc == 0 {
                    continue;
                }
                if piece.kind.is_sliding() {
                    let mut next = origin.offset((dr, dc));
                    while let Some(square) = next {
                        if is_target_king(square) {
                            return Some(square);
                        }
                        if squares[square.row as usize][square.col as usize].is_some() {
                            break;
                        }
                        next = square.offset((dr, dc));
                    }
                } else if let Some(square) = origin.offset((dr, dc)) {
                    if is_target_king(square) {
                        return Some(square);
                    }
                }
            }
        }
    }
    None
}

/// Simulates relocating `piece` from `from` to `to` on a copy of the grid and
/// reports whether the mover's king stays out of check. `vacated` names a
/// square emptied as a side effect: the en-passant victim, which leaves a
/// different square than the mover's destination.
pub(crate) fn is_position_safe_after_move(
    squares: &Squares,
    piece: Piece,
    from: Coords,
    to: Coords,
    vacated: Option<Coords>,
) -> bool {
    let mut copy = *squares;
    if let Some(square) = vacated {
        copy[square.row as usize][square.col as usize] = None;
    }
    copy[from.row as usize][from.col as usize] = None;
    copy[to.row as usize][to.col as usize] = Some(piece);
    attacked_king(&copy, piece.colour).is_none()
}
