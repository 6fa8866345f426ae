//! Piece placement and attack detection.

use crate::error::RulesError;
use crate::types::{Color, Piece, PieceKind, Square};

pub(crate) const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

pub(crate) const KING_OFFSETS: [(i8, i8); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

pub(crate) const ROOK_DIRECTIONS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

pub(crate) const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// 8x8 board, indexed by [`Square`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    squares: [Option<Piece>; 64],
}

impl Board {
    /// Board with no pieces.
    pub fn empty() -> Self {
        Self {
            squares: [None; 64],
        }
    }

    /// The standard starting arrangement.
    pub fn standard() -> Self {
        let mut board = Self::empty();
        for (file, kind) in BACK_RANK.iter().enumerate() {
            let file = file as u8;
            board.set(Square::at(file, 0), Some(Piece::new(Color::White, *kind)));
            board.set(Square::at(file, 1), Some(Piece::new(Color::White, PieceKind::Pawn)));
            board.set(Square::at(file, 6), Some(Piece::new(Color::Black, PieceKind::Pawn)));
            board.set(Square::at(file, 7), Some(Piece::new(Color::Black, *kind)));
        }
        board
    }

    /// Piece on a square, if any.
    pub fn get(&self, square: Square) -> Option<Piece> {
        self.squares[square.index()]
    }

    pub(crate) fn set(&mut self, square: Square, piece: Option<Piece>) {
        self.squares[square.index()] = piece;
    }

    /// All occupied squares with their pieces, `a1` first.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(|sq| self.get(sq).map(|p| (sq, p)))
    }

    /// Where the given side's king stands.
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces()
            .find(|(_, p)| p.color == color && p.kind == PieceKind::King)
            .map(|(sq, _)| sq)
    }

    /// Whether any piece of `by` attacks `target`.
    pub fn is_attacked(&self, target: Square, by: Color) -> bool {
        let holds = |sq: Option<Square>, kinds: &[PieceKind]| {
            sq.and_then(|s| self.get(s))
                .is_some_and(|p| p.color == by && kinds.contains(&p.kind))
        };

        // An attacking pawn sits one rank behind the target from its own side.
        let behind = -by.forward();
        if holds(target.offset(-1, behind), &[PieceKind::Pawn])
            || holds(target.offset(1, behind), &[PieceKind::Pawn])
        {
            return true;
        }

        if KNIGHT_OFFSETS
            .iter()
            .any(|&(df, dr)| holds(target.offset(df, dr), &[PieceKind::Knight]))
        {
            return true;
        }

        if KING_OFFSETS
            .iter()
            .any(|&(df, dr)| holds(target.offset(df, dr), &[PieceKind::King]))
        {
            return true;
        }

        self.slider_hits(target, &ROOK_DIRECTIONS, by, &[PieceKind::Rook, PieceKind::Queen])
            || self.slider_hits(
                target,
                &BISHOP_DIRECTIONS,
                by,
                &[PieceKind::Bishop, PieceKind::Queen],
            )
    }

    fn slider_hits(
        &self,
        target: Square,
        directions: &[(i8, i8)],
        by: Color,
        kinds: &[PieceKind],
    ) -> bool {
        directions.iter().any(|&(df, dr)| {
            let mut cursor = target.offset(df, dr);
            while let Some(sq) = cursor {
                if let Some(piece) = self.get(sq) {
                    return piece.color == by && kinds.contains(&piece.kind);
                }
                cursor = sq.offset(df, dr);
            }
            false
        })
    }

    /// Parses the piece-placement field of a FEN string.
    pub fn from_placement(placement: &str) -> Result<Self, RulesError> {
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(RulesError::InvalidFen(format!(
                "expected 8 ranks, found {}",
                ranks.len()
            )));
        }

        let mut board = Self::empty();
        for (row, text) in ranks.iter().enumerate() {
            let rank = 7 - row as u8;
            let mut file: u8 = 0;
            for c in text.chars() {
                if let Some(skip) = c.to_digit(10) {
                    if !(1..=8).contains(&skip) {
                        return Err(RulesError::InvalidFen(format!("bad empty count {c}")));
                    }
                    file += skip as u8;
                } else {
                    let piece = Piece::from_fen_char(c)
                        .ok_or_else(|| RulesError::InvalidFen(format!("bad piece letter {c}")))?;
                    let square = Square::new(file, rank).ok_or_else(|| {
                        RulesError::InvalidFen(format!("rank {} overflows", rank + 1))
                    })?;
                    board.set(square, Some(piece));
                    file += 1;
                }
                if file > 8 {
                    return Err(RulesError::InvalidFen(format!("rank {} overflows", rank + 1)));
                }
            }
            if file != 8 {
                return Err(RulesError::InvalidFen(format!(
                    "rank {} has {} files",
                    rank + 1,
                    file
                )));
            }
        }
        Ok(board)
    }

    /// Piece-placement field of a FEN string.
    pub fn placement(&self) -> String {
        let mut out = String::with_capacity(72);
        for rank in (0..8u8).rev() {
            let mut gap = 0;
            for file in 0..8u8 {
                match self.get(Square::at(file, rank)) {
                    Some(piece) => {
                        if gap > 0 {
                            out.push_str(&gap.to_string());
                            gap = 0;
                        }
                        out.push(piece.fen_char());
                    }
                    None => gap += 1,
                }
            }
            if gap > 0 {
                out.push_str(&gap.to_string());
            }
            if rank > 0 {
                out.push('/');
            }
        }
        out
    }

    /// True when neither side has enough material to deliver mate:
    /// bare kings, a single minor piece, or only bishops all on one square color.
    pub fn is_insufficient_material(&self) -> bool {
        let mut minors = Vec::new();
        for (sq, piece) in self.pieces() {
            match piece.kind {
                PieceKind::King => {}
                PieceKind::Knight | PieceKind::Bishop => minors.push((sq, piece.kind)),
                PieceKind::Pawn | PieceKind::Rook | PieceKind::Queen => return false,
            }
        }

        match minors.as_slice() {
            [] | [_] => true,
            all => {
                all.iter().all(|(_, kind)| *kind == PieceKind::Bishop)
                    && all.iter().all(|(sq, _)| sq.is_light() == all[0].0.is_light())
            }
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}
