//! The board: piece storage, commander tracking, and base FEN I/O (C1).

use std::collections::HashMap;
use std::fmt;

use crate::error::{EngineError, FenError};
use crate::piece::{self, Color, Piece, PieceKind};
use crate::square::{Square, FILES, RANKS};
use crate::terrain;

const SLOTS: usize = RANKS * 16;

fn slot(sq: Square) -> usize {
    sq.raw() as usize
}

/// The starting position. CoTuLenh's canonical opening layout is not part of
/// this specification; this is a symmetric, terrain-legal arrangement giving
/// each side exactly one of each of the 11 kinds, frozen here as the
/// reference starting FEN (see DESIGN.md).
pub const STARTING_FEN: &str =
    "n1eahcgsft1/2im7/11/11/11/11/11/11/11/11/2IM7/N1EAHCGSFT1 r - - 0 1";

/// Turn, clocks, and move-count bookkeeping that rides alongside the board.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameStateMetadata {
    pub turn: Color,
    pub half_move_clock: u32,
    pub full_move_number: u32,
}

impl Default for GameStateMetadata {
    fn default() -> Self {
        GameStateMetadata {
            turn: Color::Red,
            half_move_clock: 0,
            full_move_number: 1,
        }
    }
}

/// The 11x12 board: piece storage, per-color commander location, clocks, and
/// the position-count multiset used for threefold repetition.
#[derive(Clone)]
pub struct Board {
    squares: Vec<Option<Piece>>,
    commanders: [Option<Square>; 2],
    pub meta: GameStateMetadata,
    pub position_counts: HashMap<String, u32>,
}

impl Board {
    #[must_use]
    pub fn empty() -> Self {
        Board {
            squares: vec![None; SLOTS],
            commanders: [None, None],
            meta: GameStateMetadata::default(),
            position_counts: HashMap::new(),
        }
    }

    #[must_use]
    pub fn starting_position() -> Self {
        Board::from_fen(STARTING_FEN).expect("STARTING_FEN is well-formed")
    }

    #[must_use]
    pub fn get(&self, sq: Square) -> Option<&Piece> {
        self.squares[slot(sq)].as_ref()
    }

    #[must_use]
    pub fn commander_square(&self, color: Color) -> Option<Square> {
        self.commanders[color.index()]
    }

    /// All occupied squares, in ascending raw-index order (deterministic).
    pub fn occupied(&self) -> impl Iterator<Item = (Square, &Piece)> {
        Square::all().filter_map(move |sq| self.get(sq).map(|p| (sq, p)))
    }

    fn terrain_admits(kind: PieceKind, sq: Square) -> bool {
        if kind == PieceKind::Navy {
            terrain::admits_navy(sq)
        } else {
            terrain::admits_land(sq)
        }
    }

    /// Place `piece` at `sq`. If the square is already occupied and
    /// `allow_combine` is set, the occupant and `piece` are combined via the
    /// blueprint table; otherwise an occupied square is an error. Terrain is
    /// validated against the *final* stored piece's carrier kind.
    pub fn put(&mut self, new_piece: Piece, sq: Square, allow_combine: bool) -> Result<(), EngineError> {
        let existing = self.squares[slot(sq)].take();
        let final_piece = match existing {
            Some(occupant) if allow_combine => {
                let mut loose: Vec<Piece> = vec![occupant];
                loose.push(new_piece);
                let flat = loose.into_iter().flat_map(owned_flatten).collect();
                piece::combine(flat).ok_or_else(|| EngineError::CombinationFailed {
                    reason: format!("no blueprint for combination at {sq}"),
                })?
            }
            Some(occupant) => {
                self.squares[slot(sq)] = Some(occupant);
                return Err(EngineError::MoveInvalidDestination {
                    square: sq.to_string(),
                });
            }
            None => new_piece,
        };

        if !Board::terrain_admits(final_piece.kind, sq) {
            return Err(EngineError::BoardInvalidTerrain {
                square: sq.to_string(),
                kind: terrain_label(final_piece.kind),
            });
        }

        if final_piece.contains_kind(PieceKind::Commander) {
            let idx = final_piece.color.index();
            if let Some(existing_sq) = self.commanders[idx] {
                if existing_sq != sq {
                    return Err(EngineError::CommanderLimitExceeded {
                        color: color_label(final_piece.color),
                    });
                }
            }
            self.commanders[idx] = Some(sq);
        }

        self.squares[slot(sq)] = Some(final_piece);
        Ok(())
    }

    /// Remove either the whole occupant (`target = None`) or a single piece
    /// kind from a stack (`target = Some(kind)`), returning the piece that
    /// was removed.
    pub fn remove(&mut self, sq: Square, target: Option<PieceKind>) -> Result<Piece, EngineError> {
        let occupant = self.squares[slot(sq)]
            .take()
            .ok_or_else(|| EngineError::MovePieceNotFound { square: sq.to_string() })?;

        let (remaining, removed) = match target {
            None => (None, occupant),
            Some(kind) => match piece::remove_from_stack(&occupant, kind) {
                Some(result) => result,
                None => {
                    self.squares[slot(sq)] = Some(occupant);
                    return Err(EngineError::MovePieceNotFound { square: sq.to_string() });
                }
            },
        };

        if removed.contains_kind(PieceKind::Commander) {
            let idx = removed.color.index();
            if self.commanders[idx] == Some(sq) {
                self.commanders[idx] = None;
            }
        }

        self.squares[slot(sq)] = remaining;
        Ok(removed)
    }

    /// Write `piece` at `sq` unconditionally, bypassing terrain/commander
    /// validation. Used only to restore an exact pre-action snapshot during
    /// undo, where the state being written back was valid when first placed.
    pub(crate) fn force_set(&mut self, sq: Square, piece: Option<Piece>) {
        if let Some(old) = &self.squares[slot(sq)] {
            if old.contains_kind(PieceKind::Commander) && self.commanders[old.color.index()] == Some(sq) {
                self.commanders[old.color.index()] = None;
            }
        }
        if let Some(p) = &piece {
            if p.contains_kind(PieceKind::Commander) {
                self.commanders[p.color.index()] = Some(sq);
            }
        }
        self.squares[slot(sq)] = piece;
    }

    pub fn set_heroic(&mut self, sq: Square, kind: PieceKind, value: bool) -> Result<bool, EngineError> {
        let piece = self.squares[slot(sq)]
            .as_mut()
            .ok_or_else(|| EngineError::MovePieceNotFound { square: sq.to_string() })?;
        if piece.kind == kind {
            let prev = piece.heroic;
            piece.heroic = value;
            return Ok(prev);
        }
        if let Some(passenger) = piece.carrying.iter_mut().find(|p| p.kind == kind) {
            let prev = passenger.heroic;
            passenger.heroic = value;
            return Ok(prev);
        }
        Err(EngineError::MovePieceNotFound { square: sq.to_string() })
    }

    /// The base FEN (6 fields): board, turn, `-`, `-`, half-move clock,
    /// full-move number.
    #[must_use]
    pub fn to_fen(&self) -> String {
        let mut ranks = Vec::with_capacity(RANKS);
        for rank in (0..RANKS).rev() {
            ranks.push(self.encode_rank(rank));
        }
        format!(
            "{} {} - - {} {}",
            ranks.join("/"),
            if self.meta.turn == Color::Red { "r" } else { "b" },
            self.meta.half_move_clock,
            self.meta.full_move_number
        )
    }

    /// The repetition key: board placement and side to move, with both
    /// clocks stripped. Threefold repetition is about position recurring,
    /// not about how many moves it took to get there.
    #[must_use]
    pub fn position_key(&self) -> String {
        let mut ranks = Vec::with_capacity(RANKS);
        for rank in (0..RANKS).rev() {
            ranks.push(self.encode_rank(rank));
        }
        format!("{} {} - -", ranks.join("/"), if self.meta.turn == Color::Red { "r" } else { "b" })
    }

    fn encode_rank(&self, rank: usize) -> String {
        let mut out = String::new();
        let mut empties = 0u32;
        for file in 0..FILES {
            let sq = Square::new(rank, file);
            match self.get(sq) {
                None => empties += 1,
                Some(p) => {
                    if empties > 0 {
                        out.push_str(&empties.to_string());
                        empties = 0;
                    }
                    out.push_str(&encode_piece(p));
                }
            }
        }
        if empties > 0 {
            out.push_str(&empties.to_string());
        }
        out
    }

    pub fn from_fen(fen: &str) -> Result<Board, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(FenError::InvalidFormat {
                reason: format!("expected 6 fields, found {}", fields.len()),
            });
        }
        let mut board = Board::empty();
        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != RANKS {
            return Err(FenError::InvalidRankCount { found: ranks.len() });
        }
        for (display_idx, rank_str) in ranks.iter().enumerate() {
            let rank = RANKS - 1 - display_idx;
            board.parse_rank(rank, rank_str)?;
        }

        board.meta.turn = match fields[1] {
            "r" => Color::Red,
            "b" => Color::Blue,
            other => {
                return Err(FenError::InvalidFormat {
                    reason: format!("unknown turn field '{other}'"),
                })
            }
        };
        board.meta.half_move_clock = fields[4].parse().map_err(|_| FenError::InvalidFormat {
            reason: format!("bad half-move clock '{}'", fields[4]),
        })?;
        board.meta.full_move_number = fields[5].parse().map_err(|_| FenError::InvalidFormat {
            reason: format!("bad full-move number '{}'", fields[5]),
        })?;
        Ok(board)
    }

    fn parse_rank(&mut self, rank: usize, rank_str: &str) -> Result<(), FenError> {
        let mut file = 0usize;
        let mut chars = rank_str.chars().peekable();
        while let Some(&c) = chars.peek() {
            if c.is_ascii_digit() {
                let mut digits = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() {
                        digits.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let n: usize = digits.parse().unwrap();
                file += n;
                continue;
            }
            let (piece, consumed) = parse_piece_token(&mut chars, rank + 1)?;
            let _ = consumed;
            if file >= FILES {
                return Err(FenError::InvalidFileCount { rank: rank + 1, files: file + 1 });
            }
            let sq = Square::new(rank, file);
            board_put_during_parse(self, piece, sq)?;
            file += 1;
        }
        if file != FILES {
            return Err(FenError::InvalidFileCount { rank: rank + 1, files: file });
        }
        Ok(())
    }
}

/// `put` during FEN parsing never combines (a FEN stack is already written
/// out in final combined form) and any terrain/commander-limit failure is
/// reported as the corresponding FEN error rather than a bare engine error.
fn board_put_during_parse(board: &mut Board, piece: Piece, sq: Square) -> Result<(), FenError> {
    board.put(piece, sq, false).map_err(|e| FenError::InvalidFormat {
        reason: format!("{e} while placing piece at {sq}"),
    })
}

fn owned_flatten(p: Piece) -> Vec<Piece> {
    let Piece { kind, color, heroic, carrying } = p;
    let mut out = vec![Piece { kind, color, heroic, carrying: Default::default() }];
    out.extend(carrying.into_iter().map(|b| *b));
    out
}

fn parse_piece_token(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    rank_display: usize,
) -> Result<(Piece, usize), FenError> {
    let mut heroic = false;
    if chars.peek() == Some(&'+') {
        heroic = true;
        chars.next();
    }
    let c = chars.next().ok_or(FenError::InvalidFormat {
        reason: "unexpected end of rank".to_string(),
    })?;
    let carrier = piece_from_fen_char(c)?;
    let mut carrier = Piece { heroic, ..carrier };

    if chars.peek() == Some(&'(') {
        chars.next();
        loop {
            match chars.peek() {
                Some(&')') => {
                    chars.next();
                    break;
                }
                Some(_) => {
                    let mut ph = false;
                    if chars.peek() == Some(&'+') {
                        ph = true;
                        chars.next();
                    }
                    let pc = chars.next().ok_or(FenError::MismatchedParentheses { rank: rank_display })?;
                    let passenger = piece_from_fen_char(pc)?;
                    carrier.carrying.push(Box::new(Piece { heroic: ph, ..passenger }));
                }
                None => return Err(FenError::MismatchedParentheses { rank: rank_display }),
            }
        }
    }
    Ok((carrier, 0))
}

fn piece_from_fen_char(c: char) -> Result<Piece, FenError> {
    let color = if c.is_ascii_uppercase() { Color::Red } else { Color::Blue };
    let kind = PieceKind::from_char(c).ok_or(FenError::InvalidPiece { char: c })?;
    Ok(Piece::new(kind, color))
}

fn encode_piece(p: &Piece) -> String {
    let mut out = String::new();
    out.push_str(&encode_single(p));
    if !p.carrying.is_empty() {
        out.push('(');
        for passenger in &p.carrying {
            out.push_str(&encode_single(passenger));
        }
        out.push(')');
    }
    out
}

fn encode_single(p: &Piece) -> String {
    let mut s = String::new();
    if p.heroic {
        s.push('+');
    }
    let c = p.kind.to_char();
    s.push(if p.color == Color::Red { c } else { c.to_ascii_lowercase() });
    s
}

fn terrain_label(kind: PieceKind) -> &'static str {
    if kind == PieceKind::Navy {
        "navy"
    } else {
        "land"
    }
}

fn color_label(color: Color) -> &'static str {
    match color {
        Color::Red => "red",
        Color::Blue => "blue",
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({})", self.to_fen())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_position_round_trips_through_fen() {
        let board = Board::starting_position();
        let fen = board.to_fen();
        assert_eq!(fen, STARTING_FEN);
        let reparsed = Board::from_fen(&fen).unwrap();
        assert_eq!(reparsed.to_fen(), fen);
    }

    #[test]
    fn starting_position_has_one_commander_each() {
        let board = Board::starting_position();
        assert!(board.commander_square(Color::Red).is_some());
        assert!(board.commander_square(Color::Blue).is_some());
    }

    #[test]
    fn put_rejects_navy_on_land_only_square() {
        let mut board = Board::empty();
        let navy = Piece::new(PieceKind::Navy, Color::Red);
        let g1 = "g1".parse().unwrap();
        assert!(board.put(navy, g1, false).is_err());
    }

    #[test]
    fn put_combines_into_a_legal_stack() {
        let mut board = Board::empty();
        let c3 = "c3".parse().unwrap();
        board.put(Piece::new(PieceKind::Navy, Color::Red), c3, false).unwrap();
        board.put(Piece::new(PieceKind::AirForce, Color::Red), c3, true).unwrap();
        let occupant = board.get(c3).unwrap();
        assert_eq!(occupant.kind, PieceKind::Navy);
        assert_eq!(occupant.carrying.len(), 1);
    }

    #[test]
    fn remove_clears_commander_slot() {
        let mut board = Board::starting_position();
        let red_cmd_sq = board.commander_square(Color::Red).unwrap();
        board.remove(red_cmd_sq, None).unwrap();
        assert!(board.commander_square(Color::Red).is_none());
    }

    #[test]
    fn second_commander_of_same_color_is_rejected() {
        let mut board = Board::starting_position();
        let empty_sq: Square = "k1".parse().unwrap();
        let another_commander = Piece::new(PieceKind::Commander, Color::Red);
        assert!(board.put(another_commander, empty_sq, false).is_err());
    }

    #[test]
    fn position_key_ignores_the_move_counters() {
        let mut board = Board::starting_position();
        let key_before = board.position_key();
        let fen_before = board.to_fen();
        board.meta.half_move_clock = 7;
        board.meta.full_move_number = 40;
        assert_eq!(board.position_key(), key_before);
        assert_ne!(board.to_fen(), fen_before);
    }
}
