//! Move notation (C9): SAN/LAN formatting and parsing, plus the deploy-turn
//! and extended-FEN variants described in spec §4.7/§4.9.
//!
//! Formatting is driven entirely off an already-resolved [`InternalMove`] (or
//! a deploy sequence of them); nothing here decides legality. Parsing goes
//! through a strict pass first — regenerate every legal move's SAN/LAN and
//! compare — falling back to a permissive scan of the string's pieces
//! (piece token, disambiguator, separator, destination) when nothing matches
//! exactly, per spec §4.9's "strict pass ... permissive fallback" policy.

use crate::board::Board;
use crate::error::SanError;
use crate::movegen::{InternalMove, MoveFlags};
use crate::piece::PieceKind;
use crate::square::Square;

fn format_unit(kind: PieceKind, heroic: bool) -> String {
    let mut s = String::new();
    if heroic {
        s.push('+');
    }
    s.push(kind.to_char());
    s
}

/// `<pieceToken>`: a bare unit letter, or `(<carrier><passenger1>...)` when
/// the mover carries passengers.
fn piece_token(kind: PieceKind, heroic: bool, passengers: &[(PieceKind, bool)]) -> String {
    if passengers.is_empty() {
        format_unit(kind, heroic)
    } else {
        let mut s = String::from("(");
        s.push_str(&format_unit(kind, heroic));
        for &(pk, ph) in passengers {
            s.push_str(&format_unit(pk, ph));
        }
        s.push(')');
        s
    }
}

fn file_letter(sq: Square) -> char {
    (b'a' + sq.file() as u8) as char
}

fn rank_digits(sq: Square) -> String {
    (sq.rank() + 1).to_string()
}

/// The mover's notation token: for a deploy sub-move, the single deployed
/// kind; for a standard move, the whole stack as it stood at `from` before
/// the move (carrier first, passengers following).
fn mover_token(mv: &InternalMove, board_before: &Board) -> String {
    if mv.flags.contains(MoveFlags::DEPLOY) {
        piece_token(mv.piece, mv.heroic, &[])
    } else {
        let occupant = board_before
            .get(mv.from)
            .expect("mover square must be occupied in the board the move was generated from");
        let passengers: Vec<(PieceKind, bool)> =
            occupant.carrying.iter().map(|p| (p.kind, p.heroic)).collect();
        piece_token(occupant.kind, occupant.heroic, &passengers)
    }
}

/// Disambiguator for SAN: empty unless another legal move by the same piece
/// kind, same color, ends on the same `to`. Priority per spec §4.9: full
/// origin square if both rank and file are needed, else rank digit, else
/// file letter.
fn disambiguator(mv: &InternalMove, siblings: &[InternalMove]) -> String {
    let conflicts: Vec<&InternalMove> = siblings
        .iter()
        .filter(|m| m.to == mv.to && m.piece == mv.piece && m.color == mv.color && m.from != mv.from)
        .collect();
    if conflicts.is_empty() {
        return String::new();
    }
    let same_file = conflicts.iter().any(|m| m.from.file() == mv.from.file());
    let same_rank = conflicts.iter().any(|m| m.from.rank() == mv.from.rank());
    match (same_file, same_rank) {
        (false, _) => file_letter(mv.from).to_string(),
        (true, false) => rank_digits(mv.from),
        (true, true) => mv.from.to_string(),
    }
}

/// `<pieceToken>[disambig]<sep><toSquare>`.
#[must_use]
pub fn san(mv: &InternalMove, board_before: &Board, siblings: &[InternalMove]) -> String {
    format!(
        "{}{}{}{}",
        mover_token(mv, board_before),
        disambiguator(mv, siblings),
        mv.flags,
        mv.to
    )
}

/// `<pieceToken><fromSquare><sep><toSquare>`.
#[must_use]
pub fn lan(mv: &InternalMove, board_before: &Board) -> String {
    format!("{}{}{}{}", mover_token(mv, board_before), mv.from, mv.flags, mv.to)
}

/// `[<stayPiece>]<san1>,<san2>,...` — the bracketed stay-piece token is
/// omitted entirely when nothing remains at the origin.
#[must_use]
pub fn deploy_san(stay_piece: Option<(PieceKind, bool)>, sub_sans: &[String]) -> String {
    let mut s = String::new();
    if let Some((k, h)) = stay_piece {
        s.push('[');
        s.push_str(&format_unit(k, h));
        s.push(']');
    }
    s.push_str(&sub_sans.join(","));
    s
}

/// `<origin>:<stayPieceOrEmpty>:<san1>,<san2>,...`.
#[must_use]
pub fn deploy_lan(origin: Square, stay_piece: Option<(PieceKind, bool)>, sub_lans: &[String]) -> String {
    let stay = stay_piece.map(|(k, h)| format_unit(k, h)).unwrap_or_default();
    format!("{origin}:{stay}:{}", sub_lans.join(","))
}

/// Parse a SAN string against the current legal-move set. Tries an exact
/// strict match against every legal move's regenerated SAN first, then falls
/// back to a permissive scan of the string's components.
pub fn parse_san(input: &str, board_before: &Board, legal_moves: &[InternalMove]) -> Result<InternalMove, SanError> {
    if input.is_empty() {
        return Err(SanError::Empty);
    }
    for mv in legal_moves {
        if san(mv, board_before, legal_moves) == input {
            return Ok(mv.clone());
        }
    }
    parse_permissive(input, legal_moves)
}

/// Parse a LAN string the same way, against regenerated LAN.
pub fn parse_lan(input: &str, board_before: &Board, legal_moves: &[InternalMove]) -> Result<InternalMove, SanError> {
    if input.is_empty() {
        return Err(SanError::Empty);
    }
    for mv in legal_moves {
        if lan(mv, board_before) == input {
            return Ok(mv.clone());
        }
    }
    parse_permissive(input, legal_moves)
}

/// Strips a trailing check (`#`)/exposure (`^`) marker, an optional leading
/// `(...)` stack-prefix (keeping only the carrier letter inside it for kind
/// matching) and a leading heroic `+`, then splits what remains into
/// `(disambiguator, separator, destination)` and resolves against
/// `legal_moves` by `(kind?, to, separator, disambiguator)`.
fn parse_permissive(input: &str, legal_moves: &[InternalMove]) -> Result<InternalMove, SanError> {
    let trimmed = input.trim_end_matches(['#', '^']);
    let mut chars = trimmed.chars().peekable();

    let in_paren = chars.peek() == Some(&'(');
    if in_paren {
        chars.next();
    }
    if chars.peek() == Some(&'+') {
        chars.next();
    }
    let kind = match chars.peek().copied() {
        Some(c) if PieceKind::from_char(c).is_some() => {
            chars.next();
            PieceKind::from_char(c)
        }
        _ => None,
    };
    if in_paren {
        for c in chars.by_ref() {
            if c == ')' {
                break;
            }
        }
    }
    let rest: String = chars.collect();

    let (head, to_sq) = split_trailing_square(&rest).ok_or_else(|| SanError::InvalidFormat {
        notation: input.to_string(),
    })?;
    let (disambig, sep) = split_trailing_separator(head);

    let candidates: Vec<&InternalMove> = legal_moves
        .iter()
        .filter(|m| kind.map_or(true, |k| m.piece == k))
        .filter(|m| m.to == to_sq)
        .filter(|m| if sep.is_empty() { m.flags == MoveFlags::NORMAL } else { m.flags.to_string() == sep })
        .filter(|m| disambiguator_matches(disambig, m.from))
        .collect();

    match candidates.len() {
        0 => Err(SanError::NoMatchingMove { san: input.to_string() }),
        1 => Ok(candidates[0].clone()),
        _ => Err(SanError::AmbiguousMove { san: input.to_string() }),
    }
}

/// A LAN string carries an explicit `from` square instead of a disambiguator
/// fragment, so the permissive scan for it is the same shape with an exact
/// `from` match rather than a partial one; `parse_permissive` already
/// handles this correctly because a full square disambiguator (the LAN case)
/// is matched exactly by [`disambiguator_matches`].
fn split_trailing_square(s: &str) -> Option<(&str, Square)> {
    for len in [3usize, 2] {
        if s.len() >= len {
            let split_at = s.len() - len;
            if !s.is_char_boundary(split_at) {
                continue;
            }
            let (head, tail) = s.split_at(split_at);
            if let Ok(sq) = tail.parse::<Square>() {
                return Some((head, sq));
            }
        }
    }
    None
}

fn split_trailing_separator(s: &str) -> (&str, &str) {
    if s.ends_with(">x") || s.ends_with(">&") {
        return s.split_at(s.len() - 2);
    }
    if let Some(last) = s.chars().last() {
        if "-x_@&>".contains(last) {
            return s.split_at(s.len() - last.len_utf8());
        }
    }
    (s, "")
}

fn disambiguator_matches(disambig: &str, from: Square) -> bool {
    if disambig.is_empty() {
        return true;
    }
    if let Ok(sq) = disambig.parse::<Square>() {
        return sq == from;
    }
    if disambig.chars().all(|c| c.is_ascii_digit()) {
        return rank_digits(from) == disambig;
    }
    if disambig.len() == 1 {
        return file_letter(from).to_string() == disambig.to_ascii_lowercase();
    }
    false
}
