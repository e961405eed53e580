use super::board::{ChessBoard, Squares};
use super::error::FenError;
use super::model::{Colour, Coords, LastMove, Piece, PieceKind};

pub const INITIAL_POSITION: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

impl ChessBoard {
    /// Delegates position-string parsing to the `fen` module.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        from_fen(fen)
    }

    pub fn to_fen(&self) -> String {
        to_fen(self)
    }
}

/// Parses a six-field position string. The has-moved flags are not part of
/// the string: pawns derive theirs from the start rank, kings and rooks count
/// as moved until the castling field clears them.
pub fn from_fen(fen: &str) -> Result<ChessBoard, FenError> {
    let parts: Vec<&str> = fen.split_whitespace().collect();
    if parts.len() != 6 {
        return Err(FenError::FieldCount(parts.len()));
    }

    let ranks: Vec<&str> = parts[0].split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::RankCount(ranks.len()));
    }

    let mut squares: Squares = [[None; 8]; 8];
    for (rank_index, rank) in ranks.iter().enumerate() {
        let row = 7 - rank_index;
        let mut col = 0usize;
        for c in rank.chars() {
            if let Some(count) = c.to_digit(10) {
                col += count as usize;
            } else {
                if col > 7 {
                    return Err(FenError::FileCount(rank_index));
                }
                squares[row][col] = Some(piece_from_letter(c, row as u8)?);
                col += 1;
            }
        }
        if col != 8 {
            return Err(FenError::FileCount(rank_index));
        }
    }

    let side_to_move = match parts[1] {
        "w" => Colour::White,
        "b" => Colour::Black,
        other => return Err(FenError::InvalidActiveColour(other.to_string())),
    };

    apply_castling_rights(&mut squares, parts[2]);
    let last_move = parse_en_passant(&squares, parts[3])?;

    let quiet_plies = parts[4]
        .parse::<u16>()
        .map_err(|_| FenError::InvalidCounter(parts[4].to_string()))?;
    let fullmove_number = parts[5]
        .parse::<u16>()
        .map_err(|_| FenError::InvalidCounter(parts[5].to_string()))?;

    let mut board = ChessBoard::with_squares(squares, side_to_move);
    board.last_move = last_move;
    board.quiet_plies = quiet_plies;
    board.fullmove_number = fullmove_number;
    board.refresh_derived_state();
    Ok(board)
}

fn piece_from_letter(letter: char, row: u8) -> Result<Piece, FenError> {
    let colour = if letter.is_ascii_uppercase() {
        Colour::White
    } else {
        Colour::Black
    };
    let kind = match letter.to_ascii_lowercase() {
        'p' => PieceKind::Pawn,
        'n' => PieceKind::Knight,
        'b' => PieceKind::Bishop,
        'r' => PieceKind::Rook,
        'q' => PieceKind::Queen,
        'k' => PieceKind::King,
        _ => return Err(FenError::InvalidPiece(letter)),
    };
    let start_rank = if colour == Colour::White { 1 } else { 6 };
    let has_moved = match kind {
        PieceKind::Pawn => row != start_rank,
        PieceKind::King | PieceKind::Rook => true,
        _ => false,
    };
    Ok(Piece {
        colour,
        kind,
        has_moved,
    })
}

fn apply_castling_rights(squares: &mut Squares, field: &str) {
    let mut clear_flag = |row: usize, col: usize, kind: PieceKind, colour: Colour| {
        if let Some(piece) = &mut squares[row][col] {
            if piece.kind == kind && piece.colour == colour {
                piece.has_moved = false;
            }
        }
    };
    if field.contains('K') || field.contains('Q') {
        clear_flag(0, 4, PieceKind::King, Colour::White);
    }
    if field.contains('K') {
        clear_flag(0, 7, PieceKind::Rook, Colour::White);
    }
    if field.contains('Q') {
        clear_flag(0, 0, PieceKind::Rook, Colour::White);
    }
    if field.contains('k') || field.contains('q') {
        clear_flag(7, 4, PieceKind::King, Colour::Black);
    }
    if field.contains('k') {
        clear_flag(7, 7, PieceKind::Rook, Colour::Black);
    }
    if field.contains('q') {
        clear_flag(7, 0, PieceKind::Rook, Colour::Black);
    }
}

/// Rebuilds the implied last move from the en-passant target so that capture
/// eligibility survives a round trip through the string form.
fn parse_en_passant(squares: &Squares, field: &str) -> Result<Option<LastMove>, FenError> {
    if field == "-" {
        return Ok(None);
    }
    let invalid = || FenError::InvalidEnPassant(field.to_string());
    let target = Coords::from_algebraic(field).ok_or_else(invalid)?;
    let (colour, pawn_row, from_row) = match target.row {
        2 => (Colour::White, 3u8, 1u8),
        5 => (Colour::Black, 4u8, 6u8),
        _ => return Err(invalid()),
    };
    let pawn = match squares[pawn_row as usize][target.col as usize] {
        Some(p) if p.kind == PieceKind::Pawn && p.colour == colour => p,
        _ => return Err(invalid()),
    };
    Ok(Some(LastMove {
        piece: pawn,
        from: Coords::new(from_row, target.col),
        to: Coords::new(pawn_row, target.col),
    }))
}

/// Renders board and metadata into the position string handed to the
/// advisory service: rank-major board field, active colour, castling rights,
/// en-passant target, halfmove counter doubled, fullmove number.
pub fn to_fen(board: &ChessBoard) -> String {
    let mut board_field = String::new();
    for row in (0..8).rev() {
        let mut empty_run = 0;
        for col in 0..8 {
            match board.squares[row][col] {
                Some(piece) => {
                    if empty_run > 0 {
                        board_field.push_str(&empty_run.to_string());
                        empty_run = 0;
                    }
                    board_field.push(piece.to_char());
                }
                None => empty_run += 1,
            }
        }
        if empty_run > 0 {
            board_field.push_str(&empty_run.to_string());
        }
        if row > 0 {
            board_field.push('/');
        }
    }

    format!(
        "{} {} {} {} {} {}",
        board_field,
        board.side_to_move().fen_letter(),
        castling_field(board),
        en_passant_field(board),
        2 * board.fifty_move_counter(),
        board.fullmove_number(),
    )
}

/// Castling rights are read off the king/rook has-moved flags, not derived
/// from move legality.
fn castling_field(board: &ChessBoard) -> String {
    let mut letters = String::new();
    for colour in [Colour::White, Colour::Black] {
        let home_row = match colour {
            Colour::White => 0,
            Colour::Black => 7,
        };
        let unmoved = |col: u8, kind: PieceKind| {
            matches!(
                board.piece_at(Coords::new(home_row, col)),
                Some(p) if p.kind == kind && p.colour == colour && !p.has_moved
            )
        };
        if !unmoved(4, PieceKind::King) {
            continue;
        }
        let (king_side, queen_side) = match colour {
            Colour::White => ('K', 'Q'),
            Colour::Black => ('k', 'q'),
        };
        if unmoved(7, PieceKind::Rook) {
            letters.push(king_side);
        }
        if unmoved(0, PieceKind::Rook) {
            letters.push(queen_side);
        }
    }
    if letters.is_empty() {
        "-".to_string()
    } else {
        letters
    }
}

fn en_passant_field(board: &ChessBoard) -> String {
    let last = match board.last_move() {
        Some(last) => last,
        None => return "-".to_string(),
    };
    if last.piece.kind != PieceKind::Pawn
        || (last.to.row as i8 - last.from.row as i8).abs() != 2
    {
        return "-".to_string();
    }
    let target_row = match last.piece.colour {
        Colour::White => 2,
        Colour::Black => 5,
    };
    Coords::new(target_row, last.from.col).as_algebraic()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn fen_empty_board() {
        let board = ChessBoard::from_fen("8/8/8/8/8/8/8/8 w - - 0 1").expect("parse failed");
        for row in 0..8 {
            for col in 0..8 {
                assert_eq!(board.piece_at(Coords::new(row, col)), None);
            }
        }
        assert_eq!(board.side_to_move(), Colour::White);
        assert_eq!(board.last_move(), None);
        assert_eq!(board.fifty_move_counter(), 0);
        assert_eq!(board.fullmove_number(), 1);
    }

    #[test]
    fn fen_initial_board() {
        let board = ChessBoard::from_fen(INITIAL_POSITION).expect("parse failed");

        let rook = board.piece_at(Coords::from_algebraic("a1").unwrap()).unwrap();
        assert_eq!((rook.kind, rook.colour), (PieceKind::Rook, Colour::White));
        assert!(!rook.has_moved);

        let king = board.piece_at(Coords::from_algebraic("e8").unwrap()).unwrap();
        assert_eq!((king.kind, king.colour), (PieceKind::King, Colour::Black));
        assert!(!king.has_moved);

        let pawn = board.piece_at(Coords::from_algebraic("d2").unwrap()).unwrap();
        assert!(!pawn.has_moved);

        assert_eq!(board.piece_at(Coords::from_algebraic("e4").unwrap()), None);
        assert_eq!(board.side_to_move(), Colour::White);
    }

    #[test]
    fn fen_matches_new_board() {
        assert_eq!(ChessBoard::new().to_fen(), INITIAL_POSITION);
    }

    #[test]
    fn fen_invalid_inputs() {
        assert!(ChessBoard::from_fen("8/8/8/8/8/8/8/X7 w - - 0 1").is_err());
        assert!(
            ChessBoard::from_fen("rnbqkbnrr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
                .is_err()
        );
        assert!(ChessBoard::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w").is_err());
        assert!(ChessBoard::from_fen("8/8/8/8/8/8/8/8 x - - 0 1").is_err());
        assert!(ChessBoard::from_fen("8/8/8/8/8/8/8/8 w - e9 0 1").is_err());
        assert!(ChessBoard::from_fen("8/8/8/8/8/8/8/8 w - - x 1").is_err());
    }

    #[test]
    fn fen_pawn_off_start_rank_counts_as_moved() {
        let board = ChessBoard::from_fen("8/8/8/8/4P3/8/8/8 w - - 0 1").unwrap();
        assert!(board.piece_at(Coords::from_algebraic("e4").unwrap()).unwrap().has_moved);

        let board = ChessBoard::from_fen("8/4p3/8/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(!board.piece_at(Coords::from_algebraic("e7").unwrap()).unwrap().has_moved);
    }

    #[test]
    fn fen_castling_rights_become_flags() {
        let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w Kq - 0 1";
        let board = ChessBoard::from_fen(fen).unwrap();
        assert!(!board.piece_at(Coords::from_algebraic("h1").unwrap()).unwrap().has_moved);
        assert!(board.piece_at(Coords::from_algebraic("a1").unwrap()).unwrap().has_moved);
        assert!(!board.piece_at(Coords::from_algebraic("a8").unwrap()).unwrap().has_moved);
        assert!(board.piece_at(Coords::from_algebraic("h8").unwrap()).unwrap().has_moved);
        assert_eq!(board.to_fen(), fen);
    }

    #[test]
    fn fen_en_passant_round_trip() {
        let fen = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1";
        let board = ChessBoard::from_fen(fen).unwrap();
        let last = board.last_move().unwrap();
        assert_eq!(last.piece.kind, PieceKind::Pawn);
        assert_eq!(last.from, Coords::from_algebraic("e2").unwrap());
        assert_eq!(last.to, Coords::from_algebraic("e4").unwrap());
        assert_eq!(board.to_fen(), fen);
    }

    #[test]
    fn fen_en_passant_enables_capture_after_parse() {
        let board =
            ChessBoard::from_fen("4k3/pp1p1ppp/8/2pP4/8/8/8/4K3 w - c6 0 2").unwrap();
        let d5 = Coords::from_algebraic("d5").unwrap();
        let destinations = board.legal_moves().get(&d5).cloned().unwrap_or_default();
        assert!(destinations.contains(&Coords::from_algebraic("c6").unwrap()));
    }

    #[test]
    fn fen_round_trip_counters() {
        let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR b - - 12 34";
        let board = ChessBoard::from_fen(fen).unwrap();
        assert_eq!(board.fifty_move_counter(), 6);
        assert_eq!(board.fullmove_number(), 34);
        assert_eq!(board.to_fen(), fen);
    }

    #[test]
    fn fen_halfmove_field_is_doubled() {
        let mut board = ChessBoard::new();
        for mv in ["g1f3", "g8f6", "f3g1"] {
            let from = Coords::from_algebraic(&mv[0..2]).unwrap();
            let to = Coords::from_algebraic(&mv[2..4]).unwrap();
            board.apply_move(from, to, None).unwrap();
        }
        // Three quiet plies serialize as 2: the counter is kept in full-move
        // units and doubled on output.
        assert_eq!(
            board.to_fen(),
            "rnbqkb1r/pppppppp/5n2/8/8/8/PPPPPPPP/RNBQKBNR b KQkq - 2 2"
        );
    }

    #[test]
    fn fen_castling_field_follows_flags_not_shape() {
        // The rook returns home, but the right is gone for good.
        let mut board =
            ChessBoard::from_fen("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1").unwrap();
        let h1 = Coords::from_algebraic("h1").unwrap();
        let g1 = Coords::from_algebraic("g1").unwrap();
        board.apply_move(h1, g1, None).unwrap();
        board
            .apply_move(
                Coords::from_algebraic("a7").unwrap(),
                Coords::from_algebraic("a6").unwrap(),
                None,
            )
            .unwrap();
        board.apply_move(g1, h1, None).unwrap();
        assert!(board.to_fen().contains(" Qkq "));
    }
}
