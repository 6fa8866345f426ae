//! Full position state and legal move generation.

use crate::board::{BISHOP_DIRECTIONS, Board, KING_OFFSETS, KNIGHT_OFFSETS, ROOK_DIRECTIONS};
use crate::error::RulesError;
use crate::types::{Color, Piece, PieceKind, Square};
use serde::{Deserialize, Serialize};

/// FEN of the standard starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Which castling moves each side still has the right to make.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CastlingRights {
    /// White may castle short.
    pub white_kingside: bool,
    /// White may castle long.
    pub white_queenside: bool,
    /// Black may castle short.
    pub black_kingside: bool,
    /// Black may castle long.
    pub black_queenside: bool,
}

impl CastlingRights {
    /// Every right intact.
    pub fn all() -> Self {
        Self {
            white_kingside: true,
            white_queenside: true,
            black_kingside: true,
            black_queenside: true,
        }
    }

    fn kingside(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_kingside,
            Color::Black => self.black_kingside,
        }
    }

    fn queenside(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_queenside,
            Color::Black => self.black_queenside,
        }
    }

    fn revoke(&mut self, color: Color) {
        match color {
            Color::White => {
                self.white_kingside = false;
                self.white_queenside = false;
            }
            Color::Black => {
                self.black_kingside = false;
                self.black_queenside = false;
            }
        }
    }

    /// A rook leaving or being captured on a corner loses that corner's right.
    fn touch(&mut self, square: Square) {
        match (square.file(), square.rank()) {
            (0, 0) => self.white_queenside = false,
            (7, 0) => self.white_kingside = false,
            (0, 7) => self.black_queenside = false,
            (7, 7) => self.black_kingside = false,
            _ => {}
        }
    }

    fn to_fen(self) -> String {
        let mut s = String::new();
        if self.white_kingside {
            s.push('K');
        }
        if self.white_queenside {
            s.push('Q');
        }
        if self.black_kingside {
            s.push('k');
        }
        if self.black_queenside {
            s.push('q');
        }
        if s.is_empty() {
            s.push('-');
        }
        s
    }

    fn from_fen(field: &str) -> Result<Self, RulesError> {
        let mut rights = Self::default();
        if field == "-" {
            return Ok(rights);
        }
        for c in field.chars() {
            match c {
                'K' => rights.white_kingside = true,
                'Q' => rights.white_queenside = true,
                'k' => rights.black_kingside = true,
                'q' => rights.black_queenside = true,
                _ => return Err(RulesError::InvalidFen(format!("bad castling field {field}"))),
            }
        }
        Ok(rights)
    }
}

/// Special handling a move needs beyond relocating one piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MoveKind {
    /// Ordinary move or capture.
    Normal,
    /// Pawn advancing two squares from its starting rank.
    DoublePush,
    /// Pawn capturing en passant.
    EnPassant,
    /// Short castling.
    CastleKingside,
    /// Long castling.
    CastleQueenside,
}

/// A fully resolved move in a specific position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    /// Origin square.
    pub from: Square,
    /// Destination square.
    pub to: Square,
    /// Kind of the moving piece.
    pub piece: PieceKind,
    /// Kind of the captured piece, if any.
    pub captured: Option<PieceKind>,
    /// Promotion piece, if a pawn reaches the last rank.
    pub promotion: Option<PieceKind>,
    /// Special handling.
    pub kind: MoveKind,
}

impl Move {
    /// Long algebraic form, e.g. `e2e4` or `e7e8q`.
    pub fn lan(&self) -> String {
        match self.promotion {
            Some(p) => format!("{}{}{}", self.from, self.to, p.to_char()),
            None => format!("{}{}", self.from, self.to),
        }
    }

    /// Move flags as chess front-ends commonly encode them:
    /// `n` quiet, `b` pawn double push, `e` en passant, `c` capture,
    /// `p` promotion, `k` / `q` castling.
    pub fn flags(&self) -> String {
        let mut flags = String::new();
        match self.kind {
            MoveKind::DoublePush => flags.push('b'),
            MoveKind::EnPassant => flags.push('e'),
            MoveKind::CastleKingside => flags.push('k'),
            MoveKind::CastleQueenside => flags.push('q'),
            MoveKind::Normal => {
                if self.captured.is_some() {
                    flags.push('c');
                }
            }
        }
        if self.promotion.is_some() {
            flags.push('p');
        }
        if flags.is_empty() {
            flags.push('n');
        }
        flags
    }
}

/// Everything a FEN string describes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    board: Board,
    side_to_move: Color,
    castling: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
}

impl Position {
    /// The standard starting position.
    pub fn starting() -> Self {
        Self {
            board: Board::standard(),
            side_to_move: Color::White,
            castling: CastlingRights::all(),
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// Parses a FEN string. The halfmove and fullmove fields may be omitted.
    pub fn from_fen(fen: &str) -> Result<Self, RulesError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < 4 || fields.len() > 6 {
            return Err(RulesError::InvalidFen(format!(
                "expected 4 to 6 fields, found {}",
                fields.len()
            )));
        }

        let board = Board::from_placement(fields[0])?;
        let side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(RulesError::InvalidFen(format!("bad side to move {other}"))),
        };
        let castling = CastlingRights::from_fen(fields[2])?;
        let en_passant = match fields[3] {
            "-" => None,
            sq => Some(
                sq.parse::<Square>()
                    .map_err(|_| RulesError::InvalidFen(format!("bad en passant square {sq}")))?,
            ),
        };
        let halfmove_clock = match fields.get(4) {
            Some(n) => n
                .parse()
                .map_err(|_| RulesError::InvalidFen(format!("bad halfmove clock {n}")))?,
            None => 0,
        };
        let fullmove_number = match fields.get(5) {
            Some(n) => n
                .parse()
                .map_err(|_| RulesError::InvalidFen(format!("bad fullmove number {n}")))?,
            None => 1,
        };

        for color in [Color::White, Color::Black] {
            let kings = board
                .pieces()
                .filter(|(_, p)| p.color == color && p.kind == PieceKind::King)
                .count();
            if kings != 1 {
                return Err(RulesError::InvalidFen(format!("{color} has {kings} kings")));
            }
        }

        Ok(Self {
            board,
            side_to_move,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
        })
    }

    /// Serializes to FEN.
    pub fn to_fen(&self) -> String {
        format!(
            "{} {} {} {} {} {}",
            self.board.placement(),
            self.side_to_move.fen_char(),
            self.castling.to_fen(),
            self.en_passant
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".to_string()),
            self.halfmove_clock,
            self.fullmove_number
        )
    }

    /// Piece placement.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Side whose move it is.
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    /// Remaining castling rights.
    pub fn castling(&self) -> CastlingRights {
        self.castling
    }

    /// Square a pawn may capture onto en passant.
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    /// Plies since the last capture or pawn move.
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    /// Move number, incremented after Black moves.
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// Whether the side to move is in check.
    pub fn in_check(&self) -> bool {
        self.board
            .king_square(self.side_to_move)
            .is_some_and(|k| self.board.is_attacked(k, self.side_to_move.opponent()))
    }

    /// Identity of the position for repetition purposes: placement, side,
    /// castling rights, and the en passant square only when a capture there
    /// is actually available.
    pub fn repetition_key(&self) -> String {
        let ep = self
            .en_passant
            .filter(|ep| {
                let capturer = Piece::new(self.side_to_move, PieceKind::Pawn);
                let behind = -self.side_to_move.forward();
                [-1, 1].iter().any(|&df| {
                    ep.offset(df, behind)
                        .is_some_and(|sq| self.board.get(sq) == Some(capturer))
                })
            })
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        format!(
            "{} {} {} {}",
            self.board.placement(),
            self.side_to_move.fen_char(),
            self.castling.to_fen(),
            ep
        )
    }

    /// All legal moves for the side to move.
    pub fn legal_moves(&self) -> Vec<Move> {
        let us = self.side_to_move;
        self.pseudo_legal_moves()
            .into_iter()
            .filter(|mv| {
                let next = self.make(mv);
                next.board
                    .king_square(us)
                    .is_some_and(|k| !next.board.is_attacked(k, us.opponent()))
            })
            .collect()
    }

    fn pseudo_legal_moves(&self) -> Vec<Move> {
        let us = self.side_to_move;
        let mut moves = Vec::with_capacity(48);
        for (from, piece) in self.board.pieces().filter(|(_, p)| p.color == us) {
            match piece.kind {
                PieceKind::Pawn => self.pawn_moves(from, &mut moves),
                PieceKind::Knight => {
                    self.step_moves(from, piece.kind, &KNIGHT_OFFSETS, &mut moves)
                }
                PieceKind::King => {
                    self.step_moves(from, piece.kind, &KING_OFFSETS, &mut moves);
                    self.castling_moves(from, &mut moves);
                }
                PieceKind::Bishop => {
                    self.slide_moves(from, piece.kind, &BISHOP_DIRECTIONS, &mut moves)
                }
                PieceKind::Rook => self.slide_moves(from, piece.kind, &ROOK_DIRECTIONS, &mut moves),
                PieceKind::Queen => {
                    self.slide_moves(from, piece.kind, &ROOK_DIRECTIONS, &mut moves);
                    self.slide_moves(from, piece.kind, &BISHOP_DIRECTIONS, &mut moves);
                }
            }
        }
        moves
    }

    fn pawn_moves(&self, from: Square, moves: &mut Vec<Move>) {
        let us = self.side_to_move;
        let forward = us.forward();
        let last_rank = us.opponent().back_rank();
        let start_rank = match us {
            Color::White => 1,
            Color::Black => 6,
        };

        let mut push = |to: Square, captured: Option<PieceKind>, kind: MoveKind| {
            if to.rank() == last_rank {
                for promotion in PieceKind::PROMOTIONS {
                    moves.push(Move {
                        from,
                        to,
                        piece: PieceKind::Pawn,
                        captured,
                        promotion: Some(promotion),
                        kind,
                    });
                }
            } else {
                moves.push(Move {
                    from,
                    to,
                    piece: PieceKind::Pawn,
                    captured,
                    promotion: None,
                    kind,
                });
            }
        };

        if let Some(one) = from.offset(0, forward)
            && self.board.get(one).is_none()
        {
            push(one, None, MoveKind::Normal);
            if from.rank() == start_rank
                && let Some(two) = from.offset(0, 2 * forward)
                && self.board.get(two).is_none()
            {
                push(two, None, MoveKind::DoublePush);
            }
        }

        for df in [-1, 1] {
            let Some(to) = from.offset(df, forward) else {
                continue;
            };
            match self.board.get(to) {
                Some(target) if target.color != us => {
                    push(to, Some(target.kind), MoveKind::Normal);
                }
                None if self.en_passant == Some(to) => {
                    push(to, Some(PieceKind::Pawn), MoveKind::EnPassant);
                }
                _ => {}
            }
        }
    }

    fn step_moves(
        &self,
        from: Square,
        piece: PieceKind,
        offsets: &[(i8, i8)],
        moves: &mut Vec<Move>,
    ) {
        for &(df, dr) in offsets {
            let Some(to) = from.offset(df, dr) else {
                continue;
            };
            match self.board.get(to) {
                Some(target) if target.color == self.side_to_move => {}
                target => moves.push(Move {
                    from,
                    to,
                    piece,
                    captured: target.map(|t| t.kind),
                    promotion: None,
                    kind: MoveKind::Normal,
                }),
            }
        }
    }

    fn slide_moves(
        &self,
        from: Square,
        piece: PieceKind,
        directions: &[(i8, i8)],
        moves: &mut Vec<Move>,
    ) {
        for &(df, dr) in directions {
            let mut cursor = from.offset(df, dr);
            while let Some(to) = cursor {
                let target = self.board.get(to);
                if target.is_some_and(|t| t.color == self.side_to_move) {
                    break;
                }
                moves.push(Move {
                    from,
                    to,
                    piece,
                    captured: target.map(|t| t.kind),
                    promotion: None,
                    kind: MoveKind::Normal,
                });
                if target.is_some() {
                    break;
                }
                cursor = to.offset(df, dr);
            }
        }
    }

    fn castling_moves(&self, from: Square, moves: &mut Vec<Move>) {
        let us = self.side_to_move;
        let them = us.opponent();
        let rank = us.back_rank();
        if from != Square::at(4, rank) || self.board.is_attacked(from, them) {
            return;
        }
        let rook = Some(Piece::new(us, PieceKind::Rook));
        let empty = |files: &[u8]| {
            files
                .iter()
                .all(|&f| self.board.get(Square::at(f, rank)).is_none())
        };
        let safe = |files: &[u8]| {
            files
                .iter()
                .all(|&f| !self.board.is_attacked(Square::at(f, rank), them))
        };

        if self.castling.kingside(us)
            && self.board.get(Square::at(7, rank)) == rook
            && empty(&[5, 6])
            && safe(&[5, 6])
        {
            moves.push(Move {
                from,
                to: Square::at(6, rank),
                piece: PieceKind::King,
                captured: None,
                promotion: None,
                kind: MoveKind::CastleKingside,
            });
        }

        if self.castling.queenside(us)
            && self.board.get(Square::at(0, rank)) == rook
            && empty(&[1, 2, 3])
            && safe(&[2, 3])
        {
            moves.push(Move {
                from,
                to: Square::at(2, rank),
                piece: PieceKind::King,
                captured: None,
                promotion: None,
                kind: MoveKind::CastleQueenside,
            });
        }
    }

    /// Plays a pseudo-legal move, returning the successor position.
    pub(crate) fn make(&self, mv: &Move) -> Position {
        let us = self.side_to_move;
        let mut next = self.clone();

        next.board.set(mv.from, None);
        match mv.kind {
            MoveKind::EnPassant => {
                next.board.set(Square::at(mv.to.file(), mv.from.rank()), None);
            }
            MoveKind::CastleKingside => {
                let rank = mv.from.rank();
                next.board.set(Square::at(7, rank), None);
                next.board.set(Square::at(5, rank), Some(Piece::new(us, PieceKind::Rook)));
            }
            MoveKind::CastleQueenside => {
                let rank = mv.from.rank();
                next.board.set(Square::at(0, rank), None);
                next.board.set(Square::at(3, rank), Some(Piece::new(us, PieceKind::Rook)));
            }
            MoveKind::Normal | MoveKind::DoublePush => {}
        }
        let placed = mv.promotion.unwrap_or(mv.piece);
        next.board.set(mv.to, Some(Piece::new(us, placed)));

        if mv.piece == PieceKind::King {
            next.castling.revoke(us);
        }
        next.castling.touch(mv.from);
        next.castling.touch(mv.to);

        next.en_passant = match mv.kind {
            MoveKind::DoublePush => {
                Square::new(mv.from.file(), (mv.from.rank() + mv.to.rank()) / 2)
            }
            _ => None,
        };
        next.halfmove_clock = if mv.piece == PieceKind::Pawn || mv.captured.is_some() {
            0
        } else {
            self.halfmove_clock.saturating_add(1)
        };
        if us == Color::Black {
            next.fullmove_number = next.fullmove_number.saturating_add(1);
        }
        next.side_to_move = us.opponent();
        next
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::starting()
    }
}

/// Counts leaf nodes of the legal move tree to the given depth.
pub fn perft(position: &Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = position.legal_moves();
    if depth == 1 {
        return moves.len() as u64;
    }
    moves
        .iter()
        .map(|mv| perft(&position.make(mv), depth - 1))
        .sum()
}
