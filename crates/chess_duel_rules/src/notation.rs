//! Standard algebraic notation.

use crate::position::{Move, MoveKind, Position};
use crate::types::PieceKind;

/// SAN for `mv`, which must be one of `legal` in `position`.
pub(crate) fn san(position: &Position, mv: &Move, legal: &[Move]) -> String {
    let mut out = match mv.kind {
        MoveKind::CastleKingside => "O-O".to_string(),
        MoveKind::CastleQueenside => "O-O-O".to_string(),
        _ => body(mv, legal),
    };

    let next = position.make(mv);
    if next.in_check() {
        if next.legal_moves().is_empty() {
            out.push('#');
        } else {
            out.push('+');
        }
    }
    out
}

fn body(mv: &Move, legal: &[Move]) -> String {
    let mut out = String::new();
    if mv.piece == PieceKind::Pawn {
        if mv.captured.is_some() {
            out.push(mv.from.file_char());
            out.push('x');
        }
        out.push_str(&mv.to.to_string());
        if let Some(promotion) = mv.promotion {
            out.push('=');
            out.push(promotion.to_char().to_ascii_uppercase());
        }
        return out;
    }

    out.push(mv.piece.to_char().to_ascii_uppercase());

    let rivals: Vec<&Move> = legal
        .iter()
        .filter(|other| other.piece == mv.piece && other.to == mv.to && other.from != mv.from)
        .collect();
    if !rivals.is_empty() {
        let shares_file = rivals.iter().any(|r| r.from.file() == mv.from.file());
        let shares_rank = rivals.iter().any(|r| r.from.rank() == mv.from.rank());
        if !shares_file {
            out.push(mv.from.file_char());
        } else if !shares_rank {
            out.push(mv.from.rank_char());
        } else {
            out.push_str(&mv.from.to_string());
        }
    }

    if mv.captured.is_some() {
        out.push('x');
    }
    out.push_str(&mv.to.to_string());
    out
}
