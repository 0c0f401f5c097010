//! Mappings of occupied squares to the attacked squares for each piece. The
//! leaper (knight, king, pawn) attack sets are pre-calculated once at startup;
//! sliding piece attacks are resolved by classical ray walking at query time:
//! from the origin square, walk each ray until the first blocker in the given
//! occupancy, including the blocker square itself.

use once_cell::sync::Lazy;

use crate::chess::bitboard::Bitboard;
use crate::chess::core::{Direction, Player, Square, BOARD_SIZE, BOARD_WIDTH};

/// (file, rank) steps. Positive rank delta is towards rank 8.
type Delta = (i8, i8);

const KNIGHT_DELTAS: [Delta; 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

const BISHOP_DIRECTIONS: [Delta; 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const ROOK_DIRECTIONS: [Delta; 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

static KNIGHT_ATTACKS: Lazy<[Bitboard; BOARD_SIZE as usize]> = Lazy::new(knight_attack_table);
static KING_ATTACKS: Lazy<[Bitboard; BOARD_SIZE as usize]> = Lazy::new(|| {
    single_step_attacks(&[
        Direction::Up,
        Direction::UpRight,
        Direction::Right,
        Direction::DownRight,
        Direction::Down,
        Direction::DownLeft,
        Direction::Left,
        Direction::UpLeft,
    ])
});
static WHITE_PAWN_ATTACKS: Lazy<[Bitboard; BOARD_SIZE as usize]> =
    Lazy::new(|| single_step_attacks(&[Direction::UpLeft, Direction::UpRight]));
static BLACK_PAWN_ATTACKS: Lazy<[Bitboard; BOARD_SIZE as usize]> =
    Lazy::new(|| single_step_attacks(&[Direction::DownLeft, Direction::DownRight]));

const fn is_within_board(file: i8, rank: i8) -> bool {
    0 <= file && file < BOARD_WIDTH as i8 && 0 <= rank && rank < BOARD_WIDTH as i8
}

const fn to_bit(file: i8, rank: i8) -> u64 {
    1u64 << (rank as u8 * BOARD_WIDTH + file as u8)
}

fn single_step_attacks(directions: &[Direction]) -> [Bitboard; BOARD_SIZE as usize] {
    let mut result = [Bitboard::default(); BOARD_SIZE as usize];
    for square in Bitboard::full().iter() {
        for direction in directions {
            if let Some(to) = square.shift(*direction) {
                result[square as usize] |= Bitboard::from(to);
            }
        }
    }
    result
}

fn knight_attack_table() -> [Bitboard; BOARD_SIZE as usize] {
    let mut result = [Bitboard::default(); BOARD_SIZE as usize];
    for square in 0..BOARD_SIZE {
        let (file, rank) = ((square % BOARD_WIDTH) as i8, (square / BOARD_WIDTH) as i8);
        let mut attacks = 0u64;
        for (d_file, d_rank) in &KNIGHT_DELTAS {
            if is_within_board(file + d_file, rank + d_rank) {
                attacks |= to_bit(file + d_file, rank + d_rank);
            }
        }
        result[square as usize] = Bitboard::from_bits(attacks);
    }
    result
}

fn ray_attacks(square: Square, directions: &[Delta; 4], occupancy: Bitboard) -> Bitboard {
    let (source_file, source_rank) = (
        (square as u8 % BOARD_WIDTH) as i8,
        (square as u8 / BOARD_WIDTH) as i8,
    );
    let mut attacks = 0u64;
    for (d_file, d_rank) in directions {
        let (mut file, mut rank) = (source_file + d_file, source_rank + d_rank);
        while is_within_board(file, rank) {
            let attacked = to_bit(file, rank);
            attacks |= attacked;
            if occupancy.bits() & attacked != 0 {
                break;
            }
            file += d_file;
            rank += d_rank;
        }
    }
    Bitboard::from_bits(attacks)
}

pub(crate) fn knight_attacks(square: Square) -> Bitboard {
    KNIGHT_ATTACKS[square as usize]
}

pub(crate) fn king_attacks(square: Square) -> Bitboard {
    KING_ATTACKS[square as usize]
}

/// Squares a pawn of the given player on `square` attacks. Only diagonal
/// capture targets: pushes are not attacks.
pub(crate) fn pawn_attacks(square: Square, player: Player) -> Bitboard {
    match player {
        Player::White => WHITE_PAWN_ATTACKS[square as usize],
        Player::Black => BLACK_PAWN_ATTACKS[square as usize],
    }
}

pub(crate) fn bishop_attacks(square: Square, occupancy: Bitboard) -> Bitboard {
    ray_attacks(square, &BISHOP_DIRECTIONS, occupancy)
}

pub(crate) fn rook_attacks(square: Square, occupancy: Bitboard) -> Bitboard {
    ray_attacks(square, &ROOK_DIRECTIONS, occupancy)
}

pub(crate) fn queen_attacks(square: Square, occupancy: Bitboard) -> Bitboard {
    bishop_attacks(square, occupancy) | rook_attacks(square, occupancy)
}
