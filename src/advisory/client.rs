use serde::Deserialize;
use tracing::{debug, warn};

use super::{parse_move, AdvisoryError, AdvisoryMove};

const DEFAULT_ENDPOINT: &str = "https://stockfish.online/api/s/v2.php";
const DEFAULT_DEPTH: u8 = 13;

#[derive(Debug, Deserialize)]
struct BestMoveResponse {
    success: bool,
    #[serde(default)]
    bestmove: Option<String>,
}

/// Blocking HTTP client for the stockfish.online v2 endpoint.
pub struct AdvisoryClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    depth: u8,
}

impl AdvisoryClient {
    pub fn new() -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            endpoint: endpoint.into(),
            depth: DEFAULT_DEPTH,
        }
    }

    /// Asks the service for its best move in the given position.
    pub fn best_move(&self, fen: &str) -> Result<AdvisoryMove, AdvisoryError> {
        debug!(%fen, "querying advisory service");
        let depth = self.depth.to_string();
        let response: BestMoveResponse = self
            .http
            .get(&self.endpoint)
            .query(&[("fen", fen), ("depth", depth.as_str()), ("mode", "bestmove")])
            .send()?
            .json()?;

        if !response.success {
            return Err(AdvisoryError::ServiceFailure);
        }
        let raw = response.bestmove.ok_or(AdvisoryError::ServiceFailure)?;

        // The reply reads "bestmove e2e4 ponder e7e5": the move is the
        // second token.
        let token = raw
            .split_whitespace()
            .nth(1)
            .ok_or_else(|| AdvisoryError::MalformedReply(raw.clone()))?;
        let parsed = parse_move(token);
        if parsed.is_err() {
            warn!(reply = %raw, "rejected advisory reply");
        }
        parsed
    }
}

impl Default for AdvisoryClient {
    fn default() -> Self {
        Self::new()
    }
}
