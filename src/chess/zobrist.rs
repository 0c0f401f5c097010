//! [Zobrist hashing] keys for chess positions. Piece and en passant keys are
//! generated in `build.rs`; side-to-move and castling keys are fixed.
//!
//! Two equal positions always produce equal keys; unequal positions collide
//! with negligible probability.
//!
//! [Zobrist hashing]: https://www.chessprogramming.org/Zobrist_Hashing

use crate::chess::core::{Piece, Square, BOARD_SIZE};

/// Zobrist key is a 64-bit integer.
pub type Key = u64;

pub(crate) const BLACK_TO_MOVE: Key = 0x710A_DCF4_4F5C_9D01;

pub(crate) const WHITE_CAN_CASTLE_SHORT: Key = 0xD153_1AEF_C6B8_1E37;
pub(crate) const WHITE_CAN_CASTLE_LONG: Key = 0x2B0E_94F3_7C15_AD69;

pub(crate) const BLACK_CAN_CASTLE_SHORT: Key = 0x8E6C_23B5_D947_0A8D;
pub(crate) const BLACK_CAN_CASTLE_LONG: Key = 0x5F92_6E01_83AB_74C5;

// NOTE: The following keys are randomly generated in build.rs and are not
// stable between different builds of the same version.
pub(crate) const EN_PASSANT_FILES: [Key; 8] =
    include!(concat!(env!("OUT_DIR"), "/en_passant_zobrist_keys"));

const PIECES_ZOBRIST_KEYS: [Key; 768] = include!(concat!(env!("OUT_DIR"), "/pieces_zobrist_keys"));

pub(crate) fn piece_key(piece: Piece, square: Square) -> Key {
    const NUM_PIECES: usize = 6;
    PIECES_ZOBRIST_KEYS[piece.player as usize * NUM_PIECES * BOARD_SIZE as usize
        + piece.kind as usize * BOARD_SIZE as usize
        + square as usize]
}
