use std::collections::BTreeMap;

use super::board::{is_position_safe_after_move, ChessBoard};
use super::model::{Colour, Coords, Piece, PieceKind};

/// Legal destinations keyed by origin square, for the side to move only.
/// Origins without a legal destination are absent.
pub type SafeSquares = BTreeMap<Coords, Vec<Coords>>;

impl ChessBoard {
    /// Generates the full legal-move set: pseudo-legal destinations from the
    /// capability tables, pawn occupancy filters, the king-safety filter, and
    /// the castling / en-passant extras.
    pub(crate) fn find_safe_squares(&self) -> SafeSquares {
        let mut safe_squares = SafeSquares::new();

        for row in 0..8u8 {
            for col in 0..8u8 {
                let origin = Coords::new(row, col);
                let piece = match self.piece_at(origin) {
                    Some(piece) if piece.colour == self.side_to_move => piece,
                    _ => continue,
                };

                let mut destinations = self.piece_destinations(piece, origin);
                if piece.kind == PieceKind::King {
                    if self.can_castle(piece, origin, true) {
                        destinations.push(Coords::new(row, 6));
                    }
                    if self.can_castle(piece, origin, false) {
                        destinations.push(Coords::new(row, 2));
                    }
                } else if piece.kind == PieceKind::Pawn {
                    if let Some(target) = self.en_passant_destination(piece, origin) {
                        destinations.push(target);
                    }
                }

                if !destinations.is_empty() {
                    safe_squares.insert(origin, destinations);
                }
            }
        }

        safe_squares
    }

    fn piece_destinations(&self, piece: Piece, origin: Coords) -> Vec<Coords> {
        let mut destinations = Vec::new();

        for &(dr, dc) in piece.directions() {
            if piece.kind.is_sliding() {
                let mut next = origin.offset((dr, dc));
                while let Some(to) = next {
                    match self.piece_at(to) {
                        Some(p) if p.colour == piece.colour => break,
                        occupant => {
                            if is_position_safe_after_move(&self.squares, piece, origin, to, None)
                            {
                                destinations.push(to);
                            }
                            if occupant.is_some() {
                                break; // stop after a capture
                            }
                            next = to.offset((dr, dc));
                        }
                    }
                }
            } else {
                let to = match origin.offset((dr, dc)) {
                    Some(to) => to,
                    None => continue,
                };
                let occupant = self.piece_at(to);
                if matches!(occupant, Some(p) if p.colour == piece.colour) {
                    continue;
                }
                if piece.kind == PieceKind::Pawn
                    && !self.pawn_vector_allowed(piece, origin, (dr, dc), occupant)
                {
                    continue;
                }
                if is_position_safe_after_move(&self.squares, piece, origin, to, None) {
                    destinations.push(to);
                }
            }
        }

        destinations
    }

    /// Pawn occupancy rules: forward moves need an empty destination, the
    /// double step also needs the un-moved flag and an empty intermediate
    /// square, and diagonals only capture (en passant is handled separately).
    fn pawn_vector_allowed(
        &self,
        piece: Piece,
        origin: Coords,
        (dr, dc): (i8, i8),
        occupant: Option<Piece>,
    ) -> bool {
        if dc == 0 {
            if occupant.is_some() {
                return false;
            }
            if dr.abs() == 2 {
                if piece.has_moved {
                    return false;
                }
                return match origin.offset((dr / 2, 0)) {
                    Some(stepped_over) => self.piece_at(stepped_over).is_none(),
                    None => false,
                };
            }
            true
        } else {
            occupant.is_some()
        }
    }

    /// Castling per side: unmoved king on its home square and not in check,
    /// unmoved rook on the requested corner, empty squares between them
    /// (queenside also the square next to the rook), and both squares the
    /// king crosses independently safe.
    fn can_castle(&self, king: Piece, origin: Coords, king_side: bool) -> bool {
        if king.has_moved || self.check_state.is_in_check() {
            return false;
        }
        let home_row = match king.colour {
            Colour::White => 0,
            Colour::Black => 7,
        };
        if origin != Coords::new(home_row, 4) {
            return false;
        }

        let rook_square = Coords::new(home_row, if king_side { 7 } else { 0 });
        match self.piece_at(rook_square) {
            Some(rook)
                if rook.kind == PieceKind::Rook
                    && rook.colour == king.colour
                    && !rook.has_moved => {}
            _ => return false,
        }

        let step: i8 = if king_side { 1 } else { -1 };
        let one_over = Coords::new(home_row, (4 + step) as u8);
        let two_over = Coords::new(home_row, (4 + 2 * step) as u8);
        if self.piece_at(one_over).is_some() || self.piece_at(two_over).is_some() {
            return false;
        }
        if !king_side && self.piece_at(Coords::new(home_row, 1)).is_some() {
            return false;
        }

        is_position_safe_after_move(&self.squares, king, origin, one_over, None)
            && is_position_safe_after_move(&self.squares, king, origin, two_over, None)
    }

    /// En-passant eligibility: the last ply was an opposing pawn double-step,
    /// this pawn shares its destination rank one file away and stands on its
    /// colour's en-passant rank. Safety is checked with the victim removed
    /// from the board, since it vacates a different square than the mover's
    /// destination.
    fn en_passant_destination(&self, pawn: Piece, origin: Coords) -> Option<Coords> {
        let last = self.last_move?;
        if last.piece.kind != PieceKind::Pawn || last.piece.colour == pawn.colour {
            return None;
        }
        if (last.to.row as i8 - last.from.row as i8).abs() != 2 {
            return None;
        }
        if origin.row != last.to.row || (origin.col as i8 - last.to.col as i8).abs() != 1 {
            return None;
        }
        let en_passant_rank = match pawn.colour {
            Colour::White => 4,
            Colour::Black => 3,
        };
        if origin.row != en_passant_rank {
            return None;
        }

        let forward: i8 = if pawn.colour == Colour::White { 1 } else { -1 };
        let target = Coords::new((origin.row as i8 + forward) as u8, last.to.col);
        if is_position_safe_after_move(&self.squares, pawn, origin, target, Some(last.to)) {
            Some(target)
        } else {
            None
        }
    }
}
