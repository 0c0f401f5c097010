//! Provides a fully-specified [Chess Position] implementation: stores
//! information about the board, whose turn it is, castling rights, en passant
//! and move clocks.
//!
//! Move generation and move application are also implemented here as the only
//! ways of producing new [`Position`]s.
//!
//! [Chess Position]: https://www.chessprogramming.org/Chess_Position

use std::fmt::{self, Write};

use anyhow::{bail, Context};

use crate::chess::attacks;
use crate::chess::bitboard::{Bitboard, Pieces};
use crate::chess::core::{
    CastleRights, Direction, File, Move, MoveList, Piece, Player, Rank, Square, BOARD_WIDTH,
};
use crate::chess::zobrist;

/// Piece-centric implementation of the chess position, which includes all
/// pieces and their placement, information about the castling rights, side to
/// move, 50 move rule counters etc.
///
/// Positions are values: the only way of progressing the game is
/// [`Position::apply`], which returns a new position and leaves the original
/// untouched. Copying the underlying bitboards is cheap and keeps search code
/// free of undo bookkeeping.
///
/// [`Position::try_from()`] provides a convenient interface for creating a
/// [`Position`]: it cleans up the input (trims whitespace, strips `fen `/`epd `
/// prefixes) and delegates to [`Position::from_fen`].
#[derive(Clone, PartialEq, Eq)]
pub struct Position {
    white_pieces: Pieces,
    black_pieces: Pieces,
    // Derived from the piece bitboards and kept consistent by
    // `recompute_occupancy` after every mutation.
    white_occupancy: Bitboard,
    black_occupancy: Bitboard,
    all_occupancy: Bitboard,
    castling: CastleRights,
    side_to_move: Player,
    /// [Halfmove Clock] keeps track of the number of plies since the last
    /// capture or pawn move.
    ///
    /// [Halfmove Clock]: https://www.chessprogramming.org/Halfmove_Clock
    halfmove_clock: u8,
    fullmove_counter: u16,
    en_passant_square: Option<Square>,
}

impl Position {
    /// Creates the starting position of the standard chess.
    ///
    /// ```
    /// use oribi::chess::position::Position;
    ///
    /// let starting_position = Position::starting();
    /// assert_eq!(
    ///     &starting_position.to_string(),
    ///     "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
    /// );
    /// ```
    #[must_use]
    pub fn starting() -> Self {
        let mut result = Self {
            white_pieces: Pieces::starting(Player::White),
            black_pieces: Pieces::starting(Player::Black),
            white_occupancy: Bitboard::default(),
            black_occupancy: Bitboard::default(),
            all_occupancy: Bitboard::default(),
            castling: CastleRights::ALL,
            side_to_move: Player::White,
            halfmove_clock: 0,
            fullmove_counter: 1,
            en_passant_square: None,
        };
        result.recompute_occupancy();
        result
    }

    /// The player whose turn it is.
    #[must_use]
    pub const fn us(&self) -> Player {
        self.side_to_move
    }

    pub(crate) fn them(&self) -> Player {
        !self.us()
    }

    pub(crate) const fn pieces(&self, player: Player) -> &Pieces {
        match player {
            Player::White => &self.white_pieces,
            Player::Black => &self.black_pieces,
        }
    }

    fn pieces_mut(&mut self, player: Player) -> &mut Pieces {
        match player {
            Player::White => &mut self.white_pieces,
            Player::Black => &mut self.black_pieces,
        }
    }

    pub(crate) const fn occupancy(&self, player: Player) -> Bitboard {
        match player {
            Player::White => self.white_occupancy,
            Player::Black => self.black_occupancy,
        }
    }

    pub(crate) const fn occupied_squares(&self) -> Bitboard {
        self.all_occupancy
    }

    /// Returns the square of the given player's king, or [None] if the king
    /// has been captured in a speculative search line.
    pub(crate) fn king_square(&self, player: Player) -> Option<Square> {
        let king = self.pieces(player).king;
        if king.is_empty() {
            return None;
        }
        Some(king.as_square())
    }

    fn recompute_occupancy(&mut self) {
        self.white_occupancy = self.white_pieces.all();
        self.black_occupancy = self.black_pieces.all();
        self.all_occupancy = self.white_occupancy | self.black_occupancy;
    }

    /// Parses a position from Forsyth-Edwards Notation and checks its
    /// correctness. The parser will accept trimmed full FEN and trimmed FEN
    /// (4 first parts).
    ///
    /// FEN ::=
    ///       Piece Placement
    ///   ' ' Side to move
    ///   ' ' Castling ability
    ///   ' ' En passant target square
    ///   ' ' Halfmove clock
    ///   ' ' Fullmove counter
    ///
    /// The last two parts (together) are optional and default to "0 1".
    /// Technically that is not a full FEN position, but EPD-style strings are
    /// common in public position books and test suites.
    ///
    /// The correctness check employs a small set of heuristics that reject the
    /// most obviously broken positions (missing kings, pawns on backranks,
    /// inconsistent en passant squares). Parsing is the only public way of
    /// creating a [`Position`], so this acts as a filter between untrusted
    /// input and the engine.
    ///
    /// NOTE: This expects properly-formatted input: no extra symbols or
    /// additional whitespace. Use [`Position::try_from`] for cleaning up the
    /// input if it is coming from an untrusted source.
    pub fn from_fen(input: &str) -> anyhow::Result<Self> {
        let mut white_pieces = Pieces::empty();
        let mut black_pieces = Pieces::empty();

        let mut parts = input.split(' ');
        let pieces_placement = match parts.next() {
            Some(placement) => placement,
            None => bail!("missing pieces placement"),
        };
        let ranks = pieces_placement.split('/');
        let mut rank_id = 8;
        for rank_fen in ranks {
            if rank_id == 0 {
                bail!("expected 8 ranks, got {pieces_placement}");
            }
            rank_id -= 1;
            let rank = Rank::try_from(rank_id)?;
            let mut file: u8 = 0;
            for symbol in rank_fen.chars() {
                if file > BOARD_WIDTH {
                    bail!("file exceeded {BOARD_WIDTH}");
                }
                match symbol {
                    '0' => bail!("increment can not be 0"),
                    '1'..='9' => {
                        file += symbol as u8 - b'0';
                        continue;
                    }
                    _ => (),
                }
                let piece = Piece::try_from(symbol)?;
                let pieces = match piece.player {
                    Player::White => &mut white_pieces,
                    Player::Black => &mut black_pieces,
                };
                let square = Square::new(file.try_into()?, rank);
                pieces.bitboard_for_mut(piece.kind).extend(square);
                file += 1;
            }
            if file != BOARD_WIDTH {
                bail!("rank size should be exactly {BOARD_WIDTH}, got {rank_fen} of length {file}");
            }
        }
        if rank_id != 0 {
            bail!("there should be 8 ranks, got {pieces_placement}");
        }
        let side_to_move = match parts.next() {
            Some(value) => value.try_into()?,
            None => bail!("missing side to move"),
        };
        let castling = match parts.next() {
            Some(value) => value.try_into()?,
            None => bail!("missing castling rights"),
        };
        let en_passant_square = match parts.next() {
            Some("-") => None,
            Some(value) => Some(value.try_into()?),
            None => bail!("missing en passant square"),
        };
        let halfmove_clock = match parts.next() {
            Some(value) => Some(
                value
                    .parse::<u8>()
                    .with_context(|| format!("halfmove clock can not be parsed: {value}"))?,
            ),
            None => None,
        };
        let fullmove_counter = match parts.next() {
            Some(value) => match value
                .parse::<u16>()
                .with_context(|| format!("fullmove counter can not be parsed: {value}"))?
            {
                0 => bail!("fullmove counter can not be 0"),
                num => Some(num),
            },
            None => match halfmove_clock {
                Some(_) => bail!("if halfmove clock is present, fullmove counter must be present"),
                // This is a correct EPD position.
                None => None,
            },
        };
        if parts.next().is_some() {
            bail!("trailing symbols");
        }

        let mut result = Self {
            white_pieces,
            black_pieces,
            white_occupancy: Bitboard::default(),
            black_occupancy: Bitboard::default(),
            all_occupancy: Bitboard::default(),
            castling,
            side_to_move,
            halfmove_clock: halfmove_clock.unwrap_or(0),
            fullmove_counter: fullmove_counter.unwrap_or(1),
            en_passant_square,
        };
        result.recompute_occupancy();

        match validate(&result) {
            Ok(()) => Ok(result),
            Err(e) => Err(e.context("illegal position")),
        }
    }

    /// Returns true if 50-move rule draw is in effect.
    #[must_use]
    pub const fn halfmove_clock_expired(&self) -> bool {
        self.halfmove_clock >= 100
    }

    /// Returns true if the side to move is in check.
    #[must_use]
    pub fn in_check(&self) -> bool {
        match self.king_square(self.us()) {
            Some(king) => self.is_attacked(king, self.them()),
            None => false,
        }
    }

    /// Returns true if the given square is attacked by any piece of the given
    /// player under the current occupancy.
    pub(crate) fn is_attacked(&self, square: Square, by: Player) -> bool {
        let their_pieces = self.pieces(by);
        // A pawn of `by` attacks `square` exactly when a pawn of the opposite
        // color standing on `square` would attack the pawn's square.
        if (attacks::pawn_attacks(square, !by) & their_pieces.pawns).has_any() {
            return true;
        }
        if (attacks::knight_attacks(square) & their_pieces.knights).has_any() {
            return true;
        }
        if (attacks::king_attacks(square) & their_pieces.king).has_any() {
            return true;
        }
        let occupancy = self.occupied_squares();
        if (attacks::bishop_attacks(square, occupancy) & (their_pieces.bishops | their_pieces.queens))
            .has_any()
        {
            return true;
        }
        (attacks::rook_attacks(square, occupancy) & (their_pieces.rooks | their_pieces.queens))
            .has_any()
    }

    pub(crate) fn at(&self, square: Square) -> Option<Piece> {
        if let Some(kind) = self.white_pieces.at(square) {
            return Some(Piece {
                player: Player::White,
                kind,
            });
        }
        if let Some(kind) = self.black_pieces.at(square) {
            return Some(Piece {
                player: Player::Black,
                kind,
            });
        }
        None
    }

    /// Calculates a list of legal moves, i.e. the moves that do not leave the
    /// moving side's king attacked.
    ///
    /// Pseudo-legal moves are generated per piece kind and then filtered by
    /// applying each candidate to a scratch position; pins and discovered
    /// checks fall out of the filter without dedicated analysis.
    #[must_use]
    pub fn generate_moves(&self) -> MoveList {
        let (us, them) = (self.us(), self.them());
        let our_pieces = self.pieces(us);
        let their_occupancy = self.occupancy(them);
        let occupied_squares = self.occupied_squares();
        let their_or_empty = !self.occupancy(us);

        let mut moves = MoveList::new();

        let push_direction = pawn_push_direction(us);
        for from in our_pieces.pawns.iter() {
            if let Some(to) = from.shift(push_direction) {
                if !occupied_squares.contains(to) {
                    moves.push(Move::new(from, to));
                    if from.rank() == Rank::pawns_starting(us) {
                        if let Some(double) = to.shift(push_direction) {
                            if !occupied_squares.contains(double) {
                                moves.push(Move::new(from, double));
                            }
                        }
                    }
                }
            }
            for to in (attacks::pawn_attacks(from, us) & their_occupancy).iter() {
                moves.push(Move::new(from, to));
            }
        }
        if let Some(en_passant_square) = self.en_passant_square {
            // Our pawns that could capture on the en passant square stand
            // exactly where an opposite-color pawn on that square would
            // attack.
            for from in (attacks::pawn_attacks(en_passant_square, them) & our_pieces.pawns).iter() {
                moves.push(Move::new(from, en_passant_square));
            }
        }
        for from in our_pieces.knights.iter() {
            for to in (attacks::knight_attacks(from) & their_or_empty).iter() {
                moves.push(Move::new(from, to));
            }
        }
        for from in our_pieces.bishops.iter() {
            for to in (attacks::bishop_attacks(from, occupied_squares) & their_or_empty).iter() {
                moves.push(Move::new(from, to));
            }
        }
        for from in our_pieces.rooks.iter() {
            for to in (attacks::rook_attacks(from, occupied_squares) & their_or_empty).iter() {
                moves.push(Move::new(from, to));
            }
        }
        for from in our_pieces.queens.iter() {
            for to in (attacks::queen_attacks(from, occupied_squares) & their_or_empty).iter() {
                moves.push(Move::new(from, to));
            }
        }
        for from in our_pieces.king.iter() {
            for to in (attacks::king_attacks(from) & their_or_empty).iter() {
                moves.push(Move::new(from, to));
            }
        }
        self.generate_castle_moves(&mut moves);

        // King-safety filter: this is the authoritative legality check.
        moves.retain(|candidate| {
            let next = self.apply(*candidate);
            let king = next
                .king_square(us)
                .expect("the moving side keeps its king");
            !next.is_attacked(king, them)
        });
        moves
    }

    /// Castling moves are encoded by the king leg only; the rook leg is
    /// handled by the executor.
    fn generate_castle_moves(&self, moves: &mut MoveList) {
        let them = self.them();
        let occupied = self.occupied_squares();
        if self.in_check() {
            return;
        }
        match self.us() {
            Player::White => {
                if self.castling.contains(CastleRights::WHITE_SHORT)
                    && !occupied.contains(Square::F1)
                    && !occupied.contains(Square::G1)
                    && !self.is_attacked(Square::F1, them)
                    && !self.is_attacked(Square::G1, them)
                {
                    moves.push(Move::new(Square::E1, Square::G1));
                }
                if self.castling.contains(CastleRights::WHITE_LONG)
                    && !occupied.contains(Square::B1)
                    && !occupied.contains(Square::C1)
                    && !occupied.contains(Square::D1)
                    && !self.is_attacked(Square::C1, them)
                    && !self.is_attacked(Square::D1, them)
                {
                    moves.push(Move::new(Square::E1, Square::C1));
                }
            }
            Player::Black => {
                if self.castling.contains(CastleRights::BLACK_SHORT)
                    && !occupied.contains(Square::F8)
                    && !occupied.contains(Square::G8)
                    && !self.is_attacked(Square::F8, them)
                    && !self.is_attacked(Square::G8, them)
                {
                    moves.push(Move::new(Square::E8, Square::G8));
                }
                if self.castling.contains(CastleRights::BLACK_LONG)
                    && !occupied.contains(Square::B8)
                    && !occupied.contains(Square::C8)
                    && !occupied.contains(Square::D8)
                    && !self.is_attacked(Square::C8, them)
                    && !self.is_attacked(Square::D8, them)
                {
                    moves.push(Move::new(Square::E8, Square::C8));
                }
            }
        }
    }

    /// Produces the position resulting from playing `next_move`. The input is
    /// left untouched; applying the same move to equal positions always yields
    /// equal results.
    ///
    /// Legality of the move is not checked here: the caller is expected to
    /// pick moves from [`Position::generate_moves`].
    #[must_use]
    pub fn apply(&self, next_move: Move) -> Self {
        let mut next = self.clone();
        next.make_move(next_move);
        next
    }

    fn make_move(&mut self, next_move: Move) {
        // Incremented early; reset on captures and pawn moves.
        self.halfmove_clock += 1;

        self.update_castling_rights(next_move);
        self.handle_capture(next_move);
        let moved_pawn = self.make_pawn_move(next_move);
        if !moved_pawn && !self.make_king_move(next_move) {
            self.make_regular_move(next_move);
        }

        if self.side_to_move == Player::Black {
            self.fullmove_counter += 1;
        }
        self.side_to_move = !self.side_to_move;

        self.recompute_occupancy();
    }

    /// A right disappears as soon as the king or the corresponding rook
    /// leaves its home square, or when the rook's home square is captured.
    /// Rights never come back.
    fn update_castling_rights(&mut self, next_move: Move) {
        let squares = [next_move.from(), next_move.to()];
        if squares.contains(&Square::E1) || squares.contains(&Square::H1) {
            self.castling.remove(CastleRights::WHITE_SHORT);
        }
        if squares.contains(&Square::E1) || squares.contains(&Square::A1) {
            self.castling.remove(CastleRights::WHITE_LONG);
        }
        if squares.contains(&Square::E8) || squares.contains(&Square::H8) {
            self.castling.remove(CastleRights::BLACK_SHORT);
        }
        if squares.contains(&Square::E8) || squares.contains(&Square::A8) {
            self.castling.remove(CastleRights::BLACK_LONG);
        }
    }

    fn handle_capture(&mut self, next_move: Move) {
        let them = self.them();
        if !self.occupancy(them).contains(next_move.to()) {
            return;
        }
        self.halfmove_clock = 0;
        let their_pieces = self.pieces_mut(them);
        let square = next_move.to();
        // The king is included: it can only be the target in speculative
        // search lines, and clearing it keeps the bitboards disjoint.
        for bitboard in [
            &mut their_pieces.queens,
            &mut their_pieces.rooks,
            &mut their_pieces.bishops,
            &mut their_pieces.knights,
            &mut their_pieces.pawns,
            &mut their_pieces.king,
        ] {
            if bitboard.contains(square) {
                bitboard.clear(square);
                break;
            }
        }
    }

    /// Handles pawn moves: en passant captures, auto-queen promotions and the
    /// en passant target left behind by double pushes. Returns false if the
    /// moved piece is not a pawn.
    fn make_pawn_move(&mut self, next_move: Move) -> bool {
        let (us, them) = (self.us(), self.them());
        let previous_en_passant = self.en_passant_square;
        // Any move invalidates the target; a double push below sets a new one.
        self.en_passant_square = None;

        let (from, to) = (next_move.from(), next_move.to());
        if !self.pieces(us).pawns.contains(from) {
            return false;
        }
        self.halfmove_clock = 0;

        if previous_en_passant == Some(to) {
            let captured_pawn = Square::new(to.file(), from.rank());
            self.pieces_mut(them).pawns.clear(captured_pawn);
        }

        let our_pieces = self.pieces_mut(us);
        our_pieces.pawns.clear(from);
        match to.rank() {
            // Promotions always yield a queen.
            Rank::Rank1 | Rank::Rank8 => our_pieces.queens.extend(to),
            _ => our_pieces.pawns.extend(to),
        }

        if from.file() == to.file() && from.rank() == Rank::pawns_starting(us) {
            let single_push_square = from
                .shift(pawn_push_direction(us))
                .expect("single push from the starting rank is always on the board");
            if single_push_square != to {
                self.en_passant_square = Some(single_push_square);
            }
        }
        true
    }

    /// Regular king move or castling. Returns false if the moved piece is not
    /// the king.
    fn make_king_move(&mut self, next_move: Move) -> bool {
        let us = self.us();
        let (from, to) = (next_move.from(), next_move.to());
        if !self.pieces(us).king.contains(from) {
            return false;
        }

        // A two-file king move is a castle; relocate the rook as well.
        let backrank = Rank::backrank(us);
        if from == Square::new(File::E, backrank) {
            let rook_legs = match to.file() {
                File::G => Some((File::H, File::F)),
                File::C => Some((File::A, File::D)),
                _ => None,
            };
            if let Some((rook_from, rook_to)) = rook_legs {
                let rooks = &mut self.pieces_mut(us).rooks;
                rooks.clear(Square::new(rook_from, backrank));
                rooks.extend(Square::new(rook_to, backrank));
            }
        }

        let king = &mut self.pieces_mut(us).king;
        king.clear(from);
        king.extend(to);
        true
    }

    fn make_regular_move(&mut self, next_move: Move) {
        let our_pieces = self.pieces_mut(self.side_to_move);
        let (from, to) = (next_move.from(), next_move.to());
        for bitboard in [
            &mut our_pieces.queens,
            &mut our_pieces.rooks,
            &mut our_pieces.bishops,
            &mut our_pieces.knights,
        ] {
            if bitboard.contains(from) {
                bitboard.clear(from);
                bitboard.extend(to);
                return;
            }
        }
    }

    /// Computes the Zobrist key of the position: piece placement, side to
    /// move, castling rights and en passant file all contribute.
    ///
    /// The key is recomputed from scratch on each call; with at most 32
    /// occupied squares this is cheap enough for the search cache.
    #[must_use]
    pub fn hash(&self) -> zobrist::Key {
        let mut key = 0;
        if self.side_to_move == Player::Black {
            key ^= zobrist::BLACK_TO_MOVE;
        }
        if self.castling.contains(CastleRights::WHITE_SHORT) {
            key ^= zobrist::WHITE_CAN_CASTLE_SHORT;
        }
        if self.castling.contains(CastleRights::WHITE_LONG) {
            key ^= zobrist::WHITE_CAN_CASTLE_LONG;
        }
        if self.castling.contains(CastleRights::BLACK_SHORT) {
            key ^= zobrist::BLACK_CAN_CASTLE_SHORT;
        }
        if self.castling.contains(CastleRights::BLACK_LONG) {
            key ^= zobrist::BLACK_CAN_CASTLE_LONG;
        }
        if let Some(en_passant_square) = self.en_passant_square {
            key ^= zobrist::EN_PASSANT_FILES[en_passant_square.file() as usize];
        }
        for square in self.occupied_squares().iter() {
            let piece = self.at(square).expect("occupied square");
            key ^= zobrist::piece_key(piece, square);
        }
        key
    }
}

impl TryFrom<&str> for Position {
    type Error = anyhow::Error;

    fn try_from(input: &str) -> anyhow::Result<Self> {
        let input = input.trim();
        for prefix in ["fen ", "epd "] {
            if let Some(stripped) = input.strip_prefix(prefix) {
                return Self::from_fen(stripped);
            }
        }
        Self::from_fen(input)
    }
}

impl fmt::Display for Position {
    /// Returns the position representation in Forsyth-Edwards Notation (FEN).
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for rank_idx in (0..BOARD_WIDTH).rev() {
            let rank: Rank = rank_idx.try_into().expect("rank index is within 0..8");
            let mut empty_squares = 0;
            for file_idx in 0..BOARD_WIDTH {
                let file: File = file_idx.try_into().expect("file index is within 0..8");
                let square = Square::new(file, rank);
                if let Some(piece) = self.at(square) {
                    if empty_squares != 0 {
                        write!(f, "{empty_squares}")?;
                        empty_squares = 0;
                    }
                    write!(f, "{piece}")?;
                } else {
                    empty_squares += 1;
                }
            }
            if empty_squares != 0 {
                write!(f, "{empty_squares}")?;
            }
            if rank != Rank::Rank1 {
                write!(f, "/")?;
            }
        }
        write!(f, " {} ", &self.side_to_move)?;
        write!(f, "{} ", &self.castling)?;
        match self.en_passant_square {
            Some(square) => write!(f, "{square} "),
            None => write!(f, "- "),
        }?;
        write!(f, "{} ", &self.halfmove_clock)?;
        write!(f, "{}", &self.fullmove_counter)
    }
}

impl fmt::Debug for Position {
    /// Dumps the board in a human readable format ('.' for empty square, FEN
    /// algebraic symbol for piece).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board:")?;
        for rank_idx in (0..BOARD_WIDTH).rev() {
            let rank: Rank = rank_idx.try_into().expect("rank index is within 0..8");
            for file_idx in 0..BOARD_WIDTH {
                let file: File = file_idx.try_into().expect("file index is within 0..8");
                match self.at(Square::new(file, rank)) {
                    Some(piece) => write!(f, "{piece}"),
                    None => f.write_char('.'),
                }?;
                if file != File::H {
                    write!(f, " ")?;
                }
            }
            writeln!(f)?;
        }
        writeln!(f)?;
        writeln!(f, "Player to move: {:?}", &self.side_to_move)?;
        writeln!(f, "Fullmove counter: {:?}", &self.fullmove_counter)?;
        writeln!(f, "En Passant: {:?}", &self.en_passant_square)?;
        writeln!(f, "Castling rights: {}", &self.castling)?;
        writeln!(f, "FEN: {}", &self)
    }
}

/// [Perft] (**per**formance **t**esting) is a technique for checking
/// correctness of move generation by traversing the tree of possible positions
/// and counting the leaf nodes at a certain depth.
///
/// [Perft]: https://www.chessprogramming.org/Perft
#[must_use]
pub fn perft(position: &Position, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = position.generate_moves();
    if depth == 1 {
        return moves.len() as u64;
    }
    let mut nodes = 0;
    for next_move in moves {
        nodes += perft(&position.apply(next_move), depth - 1);
    }
    nodes
}

const fn pawn_push_direction(player: Player) -> Direction {
    match player {
        Player::White => Direction::Up,
        Player::Black => Direction::Down,
    }
}

/// Checks if the position can be reasoned about by the engine. Checking
/// whether the position is truly reachable from the starting position would
/// require retrograde analysis; this check employs a limited number of
/// heuristics that filter out the most obviously broken positions, setting up
/// a barrier between untrusted input and the engine.
fn validate(position: &Position) -> anyhow::Result<()> {
    if position.white_pieces.king.count() != 1 {
        bail!(
            "expected 1 white king, got {}",
            position.white_pieces.king.count()
        )
    }
    if position.black_pieces.king.count() != 1 {
        bail!(
            "expected 1 black king, got {}",
            position.black_pieces.king.count()
        )
    }
    if position.white_pieces.pawns.count() > 8 {
        bail!(
            "expected <= 8 white pawns, got {}",
            position.white_pieces.pawns.count()
        )
    }
    if position.black_pieces.pawns.count() > 8 {
        bail!(
            "expected <= 8 black pawns, got {}",
            position.black_pieces.pawns.count()
        )
    }
    let pawns = position.white_pieces.pawns | position.black_pieces.pawns;
    let backranks = Bitboard::from_bits(0xFF00_0000_0000_00FF);
    if (pawns & backranks).has_any() {
        bail!("pawns can not be placed on backranks")
    }
    if let Some(en_passant_square) = position.en_passant_square {
        let expected_rank = match position.us() {
            Player::White => Rank::Rank6,
            Player::Black => Rank::Rank3,
        };
        if en_passant_square.rank() != expected_rank {
            bail!(
                "expected en passant square to be on rank {}, got {}",
                expected_rank as u8 + 1,
                en_passant_square.rank() as u8 + 1
            )
        }
        // The pawn that was just double-pushed should be in front of the
        // en passant square.
        let pushed_pawn = en_passant_square
            .shift(pawn_push_direction(position.them()))
            .expect("en passant square is never on a backrank");
        if !position.pieces(position.them()).pawns.contains(pushed_pawn) {
            bail!("en passant square is not beyond pushed pawn")
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn setup(input: &str) -> Position {
        Position::try_from(input).expect("parsing legal position: {input}")
    }

    #[test]
    fn starting() {
        let position = Position::starting();
        assert_eq!(
            format!("{position:?}"),
            "Board:\n\
             r n b q k b n r\n\
             p p p p p p p p\n\
             . . . . . . . .\n\
             . . . . . . . .\n\
             . . . . . . . .\n\
             . . . . . . . .\n\
             P P P P P P P P\n\
             R N B Q K B N R\n\
             \n\
             Player to move: White\n\
             Fullmove counter: 1\n\
             En Passant: None\n\
             Castling rights: KQkq\n\
             FEN: rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1\n"
        );
        assert_eq!(
            Position::starting(),
            setup("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
        );
    }

    // The twelve piece bitboards must stay pairwise disjoint with occupancy
    // derived from their union, and each king bitboard must have exactly one
    // bit, in every position reachable through `apply`.
    fn assert_consistent(position: &Position) {
        let mut seen = Bitboard::default();
        for pieces in [&position.white_pieces, &position.black_pieces] {
            for bitboard in [
                pieces.king,
                pieces.queens,
                pieces.rooks,
                pieces.bishops,
                pieces.knights,
                pieces.pawns,
            ] {
                assert!((seen & bitboard).is_empty(), "piece bitboards overlap");
                seen |= bitboard;
            }
        }
        assert_eq!(position.white_occupancy, position.white_pieces.all());
        assert_eq!(position.black_occupancy, position.black_pieces.all());
        assert_eq!(
            position.all_occupancy,
            position.white_occupancy | position.black_occupancy
        );
        assert_eq!(position.white_pieces.king.count(), 1);
        assert_eq!(position.black_pieces.king.count(), 1);
    }

    #[test]
    fn bitboards_stay_consistent() {
        let mut position = Position::starting();
        assert_consistent(&position);
        for uci in ["e2e4", "d7d5", "e4d5", "d8d5", "b1c3", "d5a5", "e1e2"] {
            position = position.apply(Move::from_uci(uci).unwrap());
            assert_consistent(&position);
        }
    }

    #[test]
    fn apply_is_pure() {
        let position = setup("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3");
        let before = position.to_string();
        let next_move = Move::from_uci("f1b5").unwrap();
        let first = position.apply(next_move);
        let second = position.apply(next_move);
        assert_eq!(first, second);
        assert_eq!(position.to_string(), before);
    }

    #[test]
    fn moved_king_is_never_left_attacked() {
        for fen in [
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "6qk/8/8/3Pp3/8/8/K7/8 w - e6 0 1",
        ] {
            let position = setup(fen);
            let us = position.us();
            for next_move in position.generate_moves() {
                let next = position.apply(next_move);
                let king = next.king_square(us).unwrap();
                assert!(
                    !next.is_attacked(king, next.us()),
                    "{next_move} leaves the king attacked in {fen}"
                );
            }
        }
    }

    #[test]
    fn en_passant_capture_removes_pawn() {
        let position = setup("rnbqkbnr/pppp1ppp/8/8/3Pp3/8/PPP1PPPP/RNBQKB1R b KQkq d3 0 2");
        let capture = Move::from_uci("e4d3").unwrap();
        assert!(position.generate_moves().contains(&capture));
        let next = position.apply(capture);
        assert_eq!(
            next.to_string(),
            "rnbqkbnr/pppp1ppp/8/8/8/3p4/PPP1PPPP/RNBQKB1R w KQkq - 0 3"
        );
    }

    #[test]
    fn promotion_yields_queen() {
        let position = setup("5k2/P7/4K3/8/8/8/8/8 w - - 0 1");
        let promotion = Move::from_uci("a7a8").unwrap();
        assert!(position.generate_moves().contains(&promotion));
        assert_eq!(
            position.apply(promotion).to_string(),
            "Q4k2/8/4K3/8/8/8/8/8 b - - 0 1"
        );
        // Capturing into the last rank promotes too.
        let position = setup("1r3k2/P7/4K3/8/8/8/8/8 w - - 0 1");
        let capture = Move::from_uci("a7b8").unwrap();
        assert!(position.generate_moves().contains(&capture));
        assert_eq!(
            position.apply(capture).to_string(),
            "1Q3k2/8/4K3/8/8/8/8/8 b - - 0 1"
        );
    }

    #[test]
    fn castling_moves_the_rook() {
        let position = setup("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1");
        assert_eq!(
            position
                .apply(Move::from_uci("e1g1").unwrap())
                .to_string(),
            "r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R4RK1 b kq - 1 1"
        );
        assert_eq!(
            position
                .apply(Move::from_uci("e1c1").unwrap())
                .to_string(),
            "r3k2r/pppppppp/8/8/8/8/PPPPPPPP/2KR3R b kq - 1 1"
        );
        let position = setup("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R b KQkq - 0 1");
        assert_eq!(
            position
                .apply(Move::from_uci("e8g8").unwrap())
                .to_string(),
            "r4rk1/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQ - 1 2"
        );
        assert_eq!(
            position
                .apply(Move::from_uci("e8c8").unwrap())
                .to_string(),
            "2kr3r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQ - 1 2"
        );
    }

    #[test]
    fn rights_disappear_when_rooks_move_or_fall() {
        let position = setup("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        // Rook move drops one right.
        assert!(position
            .apply(Move::from_uci("h1h2").unwrap())
            .to_string()
            .ends_with("Qkq - 1 1"));
        // Rook capture on the home corner drops both affected rights.
        assert!(position
            .apply(Move::from_uci("a1a8").unwrap())
            .to_string()
            .ends_with("Kk - 0 1"));
        // King move drops both.
        assert!(position
            .apply(Move::from_uci("e1d1").unwrap())
            .to_string()
            .ends_with("kq - 1 1"));
    }

    #[test]
    fn double_push_sets_en_passant_target() {
        let position = Position::starting();
        let next = position.apply(Move::from_uci("e2e4").unwrap());
        assert_eq!(
            next.to_string(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
        );
        // A single push does not.
        let next = position.apply(Move::from_uci("e2e3").unwrap());
        assert_eq!(
            next.to_string(),
            "rnbqkbnr/pppppppp/8/8/8/4P3/PPPP1PPP/RNBQKBNR b KQkq - 0 1"
        );
    }

    #[test]
    fn clocks() {
        let position = setup("4k3/8/8/8/8/8/4P3/4K2R w K - 3 20");
        // Quiet piece move increments the halfmove clock.
        assert!(position
            .apply(Move::from_uci("h1h2").unwrap())
            .to_string()
            .ends_with("- 4 20"));
        // Pawn move resets it.
        assert!(position
            .apply(Move::from_uci("e2e3").unwrap())
            .to_string()
            .ends_with("- 0 20"));
        // Black's move increments the fullmove counter.
        let position = setup("4k3/8/8/8/8/8/4P3/4K2R b - - 3 20");
        assert!(position
            .apply(Move::from_uci("e8e7").unwrap())
            .to_string()
            .ends_with("- 4 21"));
    }

    #[test]
    fn hash_distinguishes_state_beyond_placement() {
        let with_rights = setup("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let without_rights = setup("r3k2r/8/8/8/8/8/8/R3K2R w - - 0 1");
        assert_ne!(with_rights.hash(), without_rights.hash());

        let white_to_move = setup("4k3/8/8/8/8/8/8/4K3 w - - 0 1");
        let black_to_move = setup("4k3/8/8/8/8/8/8/4K3 b - - 0 1");
        assert_ne!(white_to_move.hash(), black_to_move.hash());

        // Transpositions reach the same key: the clocks do not contribute.
        let mut position = Position::starting();
        for uci in ["g1f3", "g8f6", "f3g1", "f6g8"] {
            position = position.apply(Move::from_uci(uci).unwrap());
        }
        assert_eq!(position.hash(), Position::starting().hash());
    }
}
