#[cfg(test)]
use super::model::Coords;
#[cfg(test)]
use super::ChessBoard;

/// Compares the legal destinations of the piece on `origin` against the
/// expected squares, order-insensitively.
#[cfg(test)]
pub fn assert_destinations(board: &ChessBoard, origin: &str, mut expected: Vec<&str>) {
    let origin = Coords::from_algebraic(origin).expect("origin must be a valid square");
    let mut generated: Vec<String> = board
        .legal_moves()
        .get(&origin)
        .cloned()
        .unwrap_or_default()
        .iter()
        .map(|to| to.as_algebraic())
        .collect();
    generated.sort();
    expected.sort();

    assert_eq!(generated, expected, "destinations for {}", origin);
}
