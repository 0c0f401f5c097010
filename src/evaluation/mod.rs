//! This module implements "static" [evaluation], i.e. predicting the relative
//! value of a given position without [`crate::search`].
//!
//! The score is returned in centipawn units from White's perspective; the
//! search is responsible for re-orienting it towards the side to move.
//!
//! [evaluation]: https://www.chessprogramming.org/Evaluation

mod pesto;

pub use pesto::{evaluate, game_phase};
