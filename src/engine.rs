//! The facade puts all the pieces together: it translates external requests
//! (a FEN string plus a search depth) into engine calls and renders the
//! result as JSON. [`run_loop`] is the "main loop" that reads one request per
//! line from the input stream and writes one response per line.
//!
//! Anything beyond this interface (HTTP transport, session handling) is the
//! caller's business; the facade only guarantees that equal requests produce
//! equal responses.

use std::io::{BufRead, Write};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::chess::position::Position;
use crate::search::{self, Depth, DEFAULT_DEPTH, MAX_DEPTH};

/// A request to analyze a single position.
#[derive(Clone, Debug, Deserialize)]
pub struct SearchRequest {
    /// Position in Forsyth-Edwards Notation. All six fields are recommended,
    /// but the clock fields may be omitted.
    pub fen: String,
    /// Search depth in plies; defaults to [`DEFAULT_DEPTH`] and is clamped to
    /// `1..=MAX_DEPTH`.
    #[serde(default = "default_depth")]
    pub depth: Depth,
}

const fn default_depth() -> Depth {
    DEFAULT_DEPTH
}

/// The engine's answer for a single position.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SearchResponse {
    /// Best move in coordinate notation (e.g. `e2e4`), or [None] when the
    /// position is already checkmate or stalemate. Promotion to a queen and
    /// castling are implicit in the coordinates.
    #[serde(rename = "move")]
    pub best_move: Option<String>,
    /// Score in centipawns from the perspective of the side to move.
    pub score: i32,
    /// Number of nodes visited by the search.
    pub nodes: u64,
}

/// Parses the request's position, runs the search and packages the result.
///
/// # Errors
///
/// Returns an error when the FEN can not be parsed; no partial state is
/// retained.
pub fn best_move(request: &SearchRequest) -> anyhow::Result<SearchResponse> {
    let position = Position::try_from(request.fen.as_str())
        .with_context(|| format!("invalid position: {}", request.fen))?;
    let depth = request.depth.clamp(1, MAX_DEPTH);
    let result = search::find_best_move(&position, depth);
    log::info!(
        "searched {} to depth {depth}: {} nodes",
        request.fen,
        result.nodes
    );
    Ok(SearchResponse {
        best_move: result.best_move.map(|next_move| next_move.to_string()),
        score: result.score,
        nodes: result.nodes,
    })
}

/// Continuously reads requests from the input stream and answers them until
/// EOF.
///
/// Each line is either a JSON [`SearchRequest`] or a bare FEN string (searched
/// at the default depth). Malformed positions produce an `{"error": ...}`
/// line instead of terminating the loop.
pub fn run_loop(input: &mut impl BufRead, output: &mut impl Write) -> anyhow::Result<()> {
    loop {
        let mut line = String::new();
        match input.read_line(&mut line) {
            // EOF reached.
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => return Err(e).context("reading request"),
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let request = match serde_json::from_str::<SearchRequest>(line) {
            Ok(request) => request,
            // Not JSON: treat the whole line as a FEN string.
            Err(_) => SearchRequest {
                fen: line.to_string(),
                depth: DEFAULT_DEPTH,
            },
        };
        match best_move(&request) {
            Ok(response) => writeln!(output, "{}", serde_json::to_string(&response)?)?,
            Err(e) => {
                log::warn!("rejected request: {e:#}");
                writeln!(output, "{}", serde_json::json!({ "error": format!("{e:#}") }))?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn depth_defaults_when_absent() {
        let request: SearchRequest =
            serde_json::from_str(r#"{"fen": "8/8/8/8/8/8/8/8 w - - 0 1"}"#).unwrap();
        assert_eq!(request.depth, DEFAULT_DEPTH);
        let request: SearchRequest =
            serde_json::from_str(r#"{"fen": "8/8/8/8/8/8/8/8 w - - 0 1", "depth": 2}"#).unwrap();
        assert_eq!(request.depth, 2);
    }

    #[test]
    fn response_shape() {
        let response = SearchResponse {
            best_move: Some("e2e4".to_string()),
            score: 35,
            nodes: 1234,
        };
        assert_eq!(
            serde_json::to_string(&response).unwrap(),
            r#"{"move":"e2e4","score":35,"nodes":1234}"#
        );
        let mated = SearchResponse {
            best_move: None,
            score: 0,
            nodes: 0,
        };
        assert_eq!(
            serde_json::to_string(&mated).unwrap(),
            r#"{"move":null,"score":0,"nodes":0}"#
        );
    }

    #[test]
    fn malformed_fen_is_an_error() {
        let request = SearchRequest {
            fen: "not a position".to_string(),
            depth: 3,
        };
        assert!(best_move(&request).is_err());
    }

    #[test]
    fn loop_answers_requests_and_errors() {
        let input = "{\"fen\": \"rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1\", \"depth\": 1}\n\
                     broken\n";
        let mut output = Vec::new();
        run_loop(&mut input.as_bytes(), &mut output).unwrap();
        let output = String::from_utf8(output).unwrap();
        let mut lines = output.lines();
        let first: serde_json::Value = serde_json::from_str(lines.next().unwrap()).unwrap();
        assert!(first["move"].is_string());
        let second: serde_json::Value = serde_json::from_str(lines.next().unwrap()).unwrap();
        assert!(second["error"].is_string());
        assert_eq!(lines.next(), None);
    }
}
