//! Boundary adapter for the remote best-move advisory service.
//!
//! The service itself stays external: this module only serializes positions
//! outward (via the board's position string) and validates what comes back,
//! so the engine never sees a malformed move.

use thiserror::Error;

use crate::chess_board::{Coords, PieceKind};

mod client;
pub use client::AdvisoryClient;

/// A reply parsed down to the coordinates `apply_move` expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvisoryMove {
    pub from: Coords,
    pub to: Coords,
    pub promotion: Option<PieceKind>,
}

#[derive(Error, Debug)]
pub enum AdvisoryError {
    #[error("advisory reply '{0}' is not a coordinate move")]
    MalformedReply(String),

    #[error("advisory service reported failure")]
    ServiceFailure,

    #[error("advisory request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Parses a coordinate move like `e2e4` or `e7e8q`. Anything else is
/// rejected here, before the engine is involved.
pub fn parse_move(reply: &str) -> Result<AdvisoryMove, AdvisoryError> {
    let malformed = || AdvisoryError::MalformedReply(reply.to_string());
    let bytes = reply.as_bytes();
    if !(4..=5).contains(&bytes.len()) {
        return Err(malformed());
    }

    let from = parse_square(bytes[0], bytes[1]).ok_or_else(malformed)?;
    let to = parse_square(bytes[2], bytes[3]).ok_or_else(malformed)?;
    let promotion = match bytes.get(4) {
        Some(&letter) => {
            Some(PieceKind::from_promotion_letter(letter as char).ok_or_else(malformed)?)
        }
        None => None,
    };

    Ok(AdvisoryMove {
        from,
        to,
        promotion,
    })
}

fn parse_square(file: u8, rank: u8) -> Option<Coords> {
    if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
        return None;
    }
    Some(Coords::new(rank - b'1', file - b'a'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_move() {
        let mv = parse_move("e2e4").unwrap();
        assert_eq!(mv.from, Coords::from_algebraic("e2").unwrap());
        assert_eq!(mv.to, Coords::from_algebraic("e4").unwrap());
        assert_eq!(mv.promotion, None);
    }

    #[test]
    fn test_parse_promotion_move() {
        let mv = parse_move("e7e8q").unwrap();
        assert_eq!(mv.to, Coords::from_algebraic("e8").unwrap());
        assert_eq!(mv.promotion, Some(PieceKind::Queen));

        let mv = parse_move("a2a1n").unwrap();
        assert_eq!(mv.promotion, Some(PieceKind::Knight));
    }

    #[test]
    fn test_rejects_malformed_replies() {
        for reply in ["", "e2", "e2e9", "i2e4", "e2e4x", "e2e4qq", "bestmove"] {
            assert!(
                matches!(parse_move(reply), Err(AdvisoryError::MalformedReply(_))),
                "{:?} should be rejected",
                reply
            );
        }
    }
}
