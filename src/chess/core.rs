//! Board primitives commonly used within [`crate::chess`].

use std::{fmt, mem};

use anyhow::bail;
use arrayvec::ArrayVec;

#[allow(missing_docs)]
pub const BOARD_WIDTH: u8 = 8;
#[allow(missing_docs)]
pub const BOARD_SIZE: u8 = BOARD_WIDTH * BOARD_WIDTH;

/// Represents a column (vertical row) of the chessboard. In chess notation, it
/// is normally represented with a lowercase letter.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum File {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
}

impl TryFrom<char> for File {
    type Error = anyhow::Error;

    fn try_from(file: char) -> anyhow::Result<Self> {
        match file {
            'a'..='h' => Ok(unsafe { mem::transmute::<u8, Self>(file as u8 - b'a') }),
            _ => bail!("unknown file: expected within 'a'..='h', got '{file}'"),
        }
    }
}

impl TryFrom<u8> for File {
    type Error = anyhow::Error;

    fn try_from(column: u8) -> anyhow::Result<Self> {
        match column {
            0..=7 => Ok(unsafe { mem::transmute::<u8, Self>(column) }),
            _ => bail!("unknown file: expected within 0..BOARD_WIDTH, got {column}"),
        }
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", (b'a' + *self as u8) as char)
    }
}

/// Represents a horizontal row of the chessboard. In chess notation, it is
/// represented with a number. The implementation assumes zero-based values
/// (i.e. rank 1 would be 0).
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum Rank {
    Rank1,
    Rank2,
    Rank3,
    Rank4,
    Rank5,
    Rank6,
    Rank7,
    Rank8,
}

impl Rank {
    /// Returns the rank the given player's pawns start from.
    #[must_use]
    pub const fn pawns_starting(player: Player) -> Self {
        match player {
            Player::White => Self::Rank2,
            Player::Black => Self::Rank7,
        }
    }

    /// Returns the rank the given player's pieces start from.
    #[must_use]
    pub const fn backrank(player: Player) -> Self {
        match player {
            Player::White => Self::Rank1,
            Player::Black => Self::Rank8,
        }
    }
}

impl TryFrom<char> for Rank {
    type Error = anyhow::Error;

    fn try_from(rank: char) -> anyhow::Result<Self> {
        match rank {
            '1'..='8' => Ok(unsafe { mem::transmute::<u8, Self>(rank as u8 - b'1') }),
            _ => bail!("unknown rank: expected within '1'..='8', got '{rank}'"),
        }
    }
}

impl TryFrom<u8> for Rank {
    type Error = anyhow::Error;

    fn try_from(row: u8) -> anyhow::Result<Self> {
        match row {
            0..=7 => Ok(unsafe { mem::transmute::<u8, Self>(row) }),
            _ => bail!("unknown rank: expected within 0..BOARD_WIDTH, got {row}"),
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", *self as u8 + 1)
    }
}

/// Board squares: from left to right, from bottom to the top:
///
/// ```
/// use oribi::chess::core::Square;
///
/// assert_eq!(Square::A1 as u8, 0);
/// assert_eq!(Square::E1 as u8, 4);
/// assert_eq!(Square::H1 as u8, 7);
/// assert_eq!(Square::A4 as u8, 8 * 3);
/// assert_eq!(Square::H8 as u8, 63);
/// ```
///
/// Square is a compact representation using only one byte.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[rustfmt::skip]
#[allow(missing_docs)]
pub enum Square {
    A1, B1, C1, D1, E1, F1, G1, H1,
    A2, B2, C2, D2, E2, F2, G2, H2,
    A3, B3, C3, D3, E3, F3, G3, H3,
    A4, B4, C4, D4, E4, F4, G4, H4,
    A5, B5, C5, D5, E5, F5, G5, H5,
    A6, B6, C6, D6, E6, F6, G6, H6,
    A7, B7, C7, D7, E7, F7, G7, H7,
    A8, B8, C8, D8, E8, F8, G8, H8,
}

impl Square {
    /// Connects file (column) and rank (row) to form a full square.
    #[must_use]
    pub fn new(file: File, rank: Rank) -> Self {
        unsafe { mem::transmute(file as u8 + (rank as u8) * BOARD_WIDTH) }
    }

    /// Returns file (column) on which the square is located.
    #[must_use]
    pub fn file(self) -> File {
        unsafe { mem::transmute(self as u8 % BOARD_WIDTH) }
    }

    /// Returns rank (row) on which the square is located.
    #[must_use]
    pub fn rank(self) -> Rank {
        unsafe { mem::transmute(self as u8 / BOARD_WIDTH) }
    }

    /// Returns the square shifted one step in the given direction, or [None]
    /// if the shift would wrap around the board edge.
    pub(crate) fn shift(self, direction: Direction) -> Option<Self> {
        match direction {
            Direction::UpLeft | Direction::Left | Direction::DownLeft => {
                if self.file() == File::A {
                    return None;
                }
            }
            Direction::UpRight | Direction::Right | Direction::DownRight => {
                if self.file() == File::H {
                    return None;
                }
            }
            Direction::Up | Direction::Down => (),
        }
        let shift: i8 = match direction {
            Direction::UpLeft => BOARD_WIDTH as i8 - 1,
            Direction::Up => BOARD_WIDTH as i8,
            Direction::UpRight => BOARD_WIDTH as i8 + 1,
            Direction::Right => 1,
            Direction::Left => -1,
            Direction::DownLeft => -(BOARD_WIDTH as i8 + 1),
            Direction::Down => -(BOARD_WIDTH as i8),
            Direction::DownRight => -(BOARD_WIDTH as i8 - 1),
        };
        let candidate = self as i8 + shift;
        if candidate < 0 || candidate >= BOARD_SIZE as i8 {
            return None;
        }
        Some(unsafe { mem::transmute(candidate as u8) })
    }
}

impl TryFrom<u8> for Square {
    type Error = anyhow::Error;

    /// Creates a square given its position on the board.
    ///
    /// # Errors
    ///
    /// If given square index is outside 0..[`BOARD_SIZE`] range.
    fn try_from(square_index: u8) -> anyhow::Result<Self> {
        const MAX_INDEX: u8 = BOARD_SIZE - 1;
        match square_index {
            0..=MAX_INDEX => Ok(unsafe { mem::transmute::<u8, Self>(square_index) }),
            _ => bail!("unknown square index: needs to be in 0..BOARD_SIZE, got {square_index}"),
        }
    }
}

impl TryFrom<&str> for Square {
    type Error = anyhow::Error;

    fn try_from(square: &str) -> anyhow::Result<Self> {
        let mut chars = square.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(file), Some(rank), None) => {
                Ok(Self::new(file.try_into()?, rank.try_into()?))
            }
            _ => bail!("unknown square: should be two chars, got '{square}'"),
        }
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.file(), self.rank())
    }
}

/// A standard game of chess is played between two players: White (having the
/// advantage of the first turn) and Black.
#[allow(missing_docs)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Player {
    White,
    Black,
}

impl std::ops::Not for Player {
    type Output = Self;

    /// Returns the opponent of the player.
    fn not(self) -> Self::Output {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }
}

impl TryFrom<&str> for Player {
    type Error = anyhow::Error;

    fn try_from(player: &str) -> anyhow::Result<Self> {
        match player {
            "w" => Ok(Self::White),
            "b" => Ok(Self::Black),
            _ => bail!("unknown player: expected 'w' or 'b', got '{player}'"),
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::White => write!(f, "w"),
            Self::Black => write!(f, "b"),
        }
    }
}

/// Standard [chess pieces].
///
/// [chess pieces]: https://en.wikipedia.org/wiki/Chess_piece
#[allow(missing_docs)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PieceKind {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
}

/// Represents a specific piece owned by a player.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Piece {
    #[allow(missing_docs)]
    pub player: Player,
    #[allow(missing_docs)]
    pub kind: PieceKind,
}

impl Piece {
    /// Algebraic notation symbol used in FEN. Uppercase for white, lowercase
    /// for black.
    pub(in crate::chess) fn algebraic_symbol(&self) -> char {
        let symbol = match &self.kind {
            PieceKind::King => 'k',
            PieceKind::Queen => 'q',
            PieceKind::Rook => 'r',
            PieceKind::Bishop => 'b',
            PieceKind::Knight => 'n',
            PieceKind::Pawn => 'p',
        };
        match &self.player {
            Player::White => symbol.to_ascii_uppercase(),
            Player::Black => symbol,
        }
    }
}

impl TryFrom<char> for Piece {
    type Error = anyhow::Error;

    fn try_from(symbol: char) -> anyhow::Result<Self> {
        let player = if symbol.is_ascii_uppercase() {
            Player::White
        } else {
            Player::Black
        };
        let kind = match symbol.to_ascii_lowercase() {
            'k' => PieceKind::King,
            'q' => PieceKind::Queen,
            'r' => PieceKind::Rook,
            'b' => PieceKind::Bishop,
            'n' => PieceKind::Knight,
            'p' => PieceKind::Pawn,
            _ => bail!("unknown piece symbol: expected within \"KQRBNPkqrbnp\", got '{symbol}'"),
        };
        Ok(Self { player, kind })
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.algebraic_symbol())
    }
}

/// Directions on the board from the perspective of the White player, i.e. "up"
/// is towards rank 8.
#[derive(Copy, Clone, Debug)]
#[allow(missing_docs)]
pub(crate) enum Direction {
    UpLeft,
    Up,
    UpRight,
    Right,
    Left,
    DownLeft,
    Down,
    DownRight,
}

bitflags::bitflags! {
    /// Tracks the ability to [castle] for both players (kingside is often
    /// referred to as O-O, queenside as O-O-O). When the king moves, the
    /// player loses the ability to castle to either side; when a rook moves or
    /// is captured, the player loses the ability to castle to its side.
    ///
    /// [castle]: https://www.chessprogramming.org/Castling
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct CastleRights: u8 {
        #[allow(missing_docs)]
        const WHITE_SHORT = 0b0001;
        #[allow(missing_docs)]
        const WHITE_LONG = 0b0010;
        #[allow(missing_docs)]
        const BLACK_SHORT = 0b0100;
        #[allow(missing_docs)]
        const BLACK_LONG = 0b1000;
        #[allow(missing_docs)]
        const ALL = Self::WHITE_SHORT.bits()
            | Self::WHITE_LONG.bits()
            | Self::BLACK_SHORT.bits()
            | Self::BLACK_LONG.bits();
    }
}

impl TryFrom<&str> for CastleRights {
    type Error = anyhow::Error;

    /// Parses [`CastleRights`] from the FEN format: any subset of "KQkq" in
    /// that order, or "-" for no rights at all.
    fn try_from(fen: &str) -> anyhow::Result<Self> {
        if fen == "-" {
            return Ok(Self::empty());
        }
        if fen.is_empty() || fen.len() > 4 {
            bail!("unknown castling rights: expected 1..=4 symbols, got '{fen}'");
        }
        let mut result = Self::empty();
        for symbol in fen.chars() {
            let right = match symbol {
                'K' => Self::WHITE_SHORT,
                'Q' => Self::WHITE_LONG,
                'k' => Self::BLACK_SHORT,
                'q' => Self::BLACK_LONG,
                _ => bail!("unknown castling rights symbol: got '{symbol}'"),
            };
            if result.contains(right) {
                bail!("duplicate castling rights symbol: '{symbol}'");
            }
            result |= right;
        }
        Ok(result)
    }
}

impl fmt::Display for CastleRights {
    /// Prints castling rights of both players in FEN format.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "-");
        }
        for (right, symbol) in [
            (Self::WHITE_SHORT, 'K'),
            (Self::WHITE_LONG, 'Q'),
            (Self::BLACK_SHORT, 'k'),
            (Self::BLACK_LONG, 'q'),
        ] {
            if self.contains(right) {
                write!(f, "{symbol}")?;
            }
        }
        Ok(())
    }
}

/// A move of a single piece from one square to another. Promotions are not
/// encoded: a pawn arriving at the final rank always becomes a queen, and
/// castling is represented by the king's two-file move alone.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Move {
    from: Square,
    to: Square,
}

impl Move {
    #[allow(missing_docs)]
    #[must_use]
    pub const fn new(from: Square, to: Square) -> Self {
        Self { from, to }
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn from(self) -> Square {
        self.from
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn to(self) -> Square {
        self.to
    }

    /// Parses a move from four-character coordinate notation, e.g. "e2e4".
    pub fn from_uci(input: &str) -> anyhow::Result<Self> {
        if input.len() != 4 || !input.is_ascii() {
            bail!("move should be 4 ASCII chars (from and to squares), got '{input}'");
        }
        let (from, to) = input.split_at(2);
        Ok(Self::new(from.try_into()?, to.try_into()?))
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}

/// Moves generated for a single position. The number of legal moves in
/// reachable positions never gets close to the capacity.
pub type MoveList = ArrayVec<Move, 256>;

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn file() {
        assert_eq!(
            ('a'..='i')
                .filter_map(|ch| File::try_from(ch).ok())
                .collect::<Vec<_>>(),
            vec![
                File::A,
                File::B,
                File::C,
                File::D,
                File::E,
                File::F,
                File::G,
                File::H,
            ]
        );
        assert!(File::try_from('i').is_err());
        assert!(File::try_from(8u8).is_err());
    }

    #[test]
    fn rank() {
        assert_eq!(
            ('1'..='9')
                .filter_map(|ch| Rank::try_from(ch).ok())
                .collect::<Vec<_>>(),
            vec![
                Rank::Rank1,
                Rank::Rank2,
                Rank::Rank3,
                Rank::Rank4,
                Rank::Rank5,
                Rank::Rank6,
                Rank::Rank7,
                Rank::Rank8,
            ]
        );
        assert!(Rank::try_from('0').is_err());
        assert!(Rank::try_from('9').is_err());
    }

    #[test]
    fn square() {
        assert_eq!(Square::new(File::B, Rank::Rank3), Square::B3);
        assert_eq!(Square::new(File::H, Rank::Rank8), Square::H8);
        assert_eq!(Square::E4.file(), File::E);
        assert_eq!(Square::E4.rank(), Rank::Rank4);
        assert_eq!(Square::try_from("c6").unwrap(), Square::C6);
        assert!(Square::try_from("c9").is_err());
        assert!(Square::try_from("x2").is_err());
        assert!(Square::try_from("c66").is_err());
        assert_eq!(Square::try_from(63u8).unwrap(), Square::H8);
        assert!(Square::try_from(64u8).is_err());
        assert_eq!(Square::G5.to_string(), "g5");
    }

    #[test]
    fn square_shifts() {
        assert_eq!(Square::E4.shift(Direction::Up), Some(Square::E5));
        assert_eq!(Square::E4.shift(Direction::DownRight), Some(Square::F3));
        assert_eq!(Square::A1.shift(Direction::Left), None);
        assert_eq!(Square::A1.shift(Direction::Down), None);
        assert_eq!(Square::A1.shift(Direction::UpRight), Some(Square::B2));
        assert_eq!(Square::H8.shift(Direction::Up), None);
        assert_eq!(Square::H8.shift(Direction::Right), None);
        assert_eq!(Square::H8.shift(Direction::DownLeft), Some(Square::G7));
        assert_eq!(Square::H4.shift(Direction::UpRight), None);
        assert_eq!(Square::A4.shift(Direction::DownLeft), None);
    }

    #[test]
    fn pieces() {
        assert_eq!(
            Piece::try_from('N').unwrap(),
            Piece {
                player: Player::White,
                kind: PieceKind::Knight,
            }
        );
        assert_eq!(
            Piece::try_from('q').unwrap(),
            Piece {
                player: Player::Black,
                kind: PieceKind::Queen,
            }
        );
        assert!(Piece::try_from('x').is_err());
        assert_eq!(Piece::try_from('P').unwrap().to_string(), "P");
        assert_eq!(Piece::try_from('b').unwrap().to_string(), "b");
    }

    #[test]
    fn castle_rights() {
        assert_eq!(CastleRights::try_from("-").unwrap(), CastleRights::empty());
        assert_eq!(CastleRights::try_from("KQkq").unwrap(), CastleRights::ALL);
        assert_eq!(
            CastleRights::try_from("Kq").unwrap(),
            CastleRights::WHITE_SHORT | CastleRights::BLACK_LONG
        );
        assert!(CastleRights::try_from("").is_err());
        assert!(CastleRights::try_from("KK").is_err());
        assert!(CastleRights::try_from("KQkqK").is_err());
        assert_eq!(CastleRights::ALL.to_string(), "KQkq");
        assert_eq!(CastleRights::empty().to_string(), "-");
        assert_eq!(
            (CastleRights::BLACK_SHORT | CastleRights::BLACK_LONG).to_string(),
            "kq"
        );
    }

    #[test]
    fn moves() {
        let next_move = Move::from_uci("e2e4").unwrap();
        assert_eq!(next_move.from(), Square::E2);
        assert_eq!(next_move.to(), Square::E4);
        assert_eq!(next_move.to_string(), "e2e4");
        assert!(Move::from_uci("e2e9").is_err());
        assert!(Move::from_uci("e2e4q").is_err());
        assert!(Move::from_uci("e2").is_err());
    }
}
