//! Implementation of [Minimax] search with the [Negamax] formulation,
//! [Alpha-Beta pruning] and iterative deepening.
//!
//! Scores inside the search are always from the perspective of the side to
//! move at the current node; every recursion step negates the child's result.
//!
//! [Minimax]: https://en.wikipedia.org/wiki/Minimax
//! [Negamax]: https://en.wikipedia.org/wiki/Negamax
//! [Alpha-Beta pruning]: https://en.wikipedia.org/wiki/Alpha%E2%80%93beta_pruning

use crate::chess::core::{Move, MoveList, Player};
use crate::chess::position::Position;
use crate::evaluation::evaluate;
use crate::search::transposition::TranspositionTable;
use crate::search::{Depth, MAX_DEPTH};

/// Sentinel score for a checkmated side to move. Larger than any achievable
/// material sum, so mate always dominates positional considerations.
pub const CHECKMATE: i32 = 20_000;

/// Scores within this margin of [`CHECKMATE`] mean a forced mate was found
/// somewhere down the line.
const MATE_THRESHOLD: i32 = CHECKMATE - 1000;

const INFINITY: i32 = 1_000_000;

/// Outcome of a [`find_best_move`] call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchResult {
    /// The best move found, or [None] when the root position is already
    /// checkmate or stalemate.
    pub best_move: Option<Move>,
    /// Score in centipawns from the perspective of the side to move at the
    /// root; values near [`CHECKMATE`] indicate a forced mate.
    pub score: i32,
    /// Number of nodes visited by the search.
    pub nodes: u64,
}

/// State owned by a single search invocation. Keeping the node counter and
/// the transposition table here makes concurrent searches on independent
/// positions safe.
struct SearchContext {
    searched_nodes: u64,
    transpositions: TranspositionTable,
}

/// Runs an iterative-deepening search and returns the best move for the side
/// to move together with its score.
///
/// The result is deterministic for a given (position, depth) pair: root moves
/// are generated and ordered once, and ordering is stable.
#[must_use]
pub fn find_best_move(position: &Position, max_depth: Depth) -> SearchResult {
    let mut context = SearchContext {
        searched_nodes: 0,
        transpositions: TranspositionTable::new(),
    };

    let moves = order_moves(position, position.generate_moves());
    if moves.is_empty() {
        return SearchResult {
            best_move: None,
            score: 0,
            nodes: context.searched_nodes,
        };
    }

    let max_depth = max_depth.clamp(1, MAX_DEPTH);
    let mut best_move = moves[0];
    let mut best_score = 0;

    for depth in 1..=max_depth {
        let mut depth_best_move = moves[0];
        let mut depth_best_score = -INFINITY;
        for next_move in &moves {
            let next = position.apply(*next_move);
            let score = -context.negamax(&next, depth - 1, -INFINITY, INFINITY);
            if score > depth_best_score {
                depth_best_score = score;
                depth_best_move = *next_move;
            }
        }
        best_move = depth_best_move;
        best_score = depth_best_score;
        log::debug!(
            "depth {depth}: best {best_move} score {best_score} nodes {}",
            context.searched_nodes
        );
        // A forced mate does not get better with deeper search.
        if best_score.abs() > MATE_THRESHOLD {
            break;
        }
    }

    SearchResult {
        best_move: Some(best_move),
        score: best_score,
        nodes: context.searched_nodes,
    }
}

impl SearchContext {
    fn negamax(&mut self, position: &Position, depth: Depth, mut alpha: i32, beta: i32) -> i32 {
        self.searched_nodes += 1;

        // A side without a king has been "captured" in a speculative line and
        // has lost; reachable legal positions never trigger this.
        if position.pieces(position.us()).king.is_empty() {
            return -CHECKMATE;
        }

        let key = position.hash();
        if let Some(entry) = self.transpositions.probe(key, depth) {
            return entry.score;
        }

        if depth == 0 {
            let score = side_to_move_score(position);
            self.transpositions.store(key, score, depth);
            return score;
        }

        let moves = order_moves(position, position.generate_moves());
        if moves.is_empty() {
            // The side to move is either checkmated or stalemated.
            return if position.in_check() { -CHECKMATE } else { 0 };
        }

        let mut best_score = -INFINITY;
        for next_move in moves {
            let next = position.apply(next_move);
            let score = -self.negamax(&next, depth - 1, -beta, -alpha);
            if score > best_score {
                best_score = score;
            }
            if score > alpha {
                alpha = score;
            }
            if beta <= alpha {
                break;
            }
        }

        self.transpositions.store(key, best_score, depth);
        best_score
    }
}

/// Leaf evaluation re-oriented from White's perspective towards the side to
/// move, as the negamax convention requires.
fn side_to_move_score(position: &Position) -> i32 {
    match position.us() {
        Player::White => evaluate(position),
        Player::Black => -evaluate(position),
    }
}

/// Orders captures (any move onto an occupied square) before quiet moves,
/// preserving generation order within each group. Simple, deterministic and
/// already responsible for most of the pruning.
fn order_moves(position: &Position, moves: MoveList) -> MoveList {
    let occupied = position.occupied_squares();
    let mut ordered = MoveList::new();
    ordered.extend(moves.iter().copied().filter(|m| occupied.contains(m.to())));
    ordered.extend(moves.iter().copied().filter(|m| !occupied.contains(m.to())));
    ordered
}
