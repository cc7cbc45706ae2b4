//! Board square addressing.
//!
//! Squares are stored 0x88-style: `rank * 16 + file`. Files run a..k (0..11),
//! ranks run 1..12 (0..12) top-to-bottom in FEN but bottom-to-top (rank 1 is
//! index 0) internally. The stride of 16 leaves five unused file slots per
//! rank so a ray step of +-1 never wraps into the neighboring rank; off-board
//! detection is a pair of bounds checks on the decoded rank/file rather than
//! the classic 8x8 single-mask trick, since this board is 11 wide by 12 tall.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::SquareError;

pub const FILES: usize = 11;
pub const RANKS: usize = 12;

/// A square on the board, stored as a 0x88 index (`rank * 16 + file`).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Square(u8);

impl Square {
    /// Build a square from rank/file (both 0-based). Does not bounds-check.
    #[inline]
    #[must_use]
    pub const fn new(rank: usize, file: usize) -> Self {
        Square((rank * 16 + file) as u8)
    }

    /// Build a square from rank/file, rejecting out-of-range values.
    pub fn try_new(rank: usize, file: usize) -> Result<Self, SquareError> {
        if rank >= RANKS {
            return Err(SquareError::RankOutOfBounds { rank });
        }
        if file >= FILES {
            return Err(SquareError::FileOutOfBounds { file });
        }
        Ok(Square::new(rank, file))
    }

    /// Build a square from a raw 0x88 index, rejecting off-board indices.
    pub fn from_raw(raw: u8) -> Result<Self, SquareError> {
        let sq = Square(raw);
        if sq.is_offboard() {
            return Err(SquareError::RankOutOfBounds {
                rank: sq.rank_raw(),
            });
        }
        Ok(sq)
    }

    #[inline]
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    #[inline]
    fn rank_raw(self) -> usize {
        (self.0 >> 4) as usize
    }

    #[inline]
    fn file_raw(self) -> usize {
        (self.0 & 0x0F) as usize
    }

    /// Rank index, 0-based (0 = rank 1).
    #[inline]
    #[must_use]
    pub const fn rank(self) -> usize {
        (self.0 >> 4) as usize
    }

    /// File index, 0-based (0 = file a).
    #[inline]
    #[must_use]
    pub const fn file(self) -> usize {
        (self.0 & 0x0F) as usize
    }

    #[inline]
    #[must_use]
    pub fn is_offboard(self) -> bool {
        self.rank_raw() >= RANKS || self.file_raw() >= FILES
    }

    /// Step by a (rank, file) delta; returns `None` if the result is off-board.
    #[must_use]
    pub fn step(self, dr: i8, df: i8) -> Option<Square> {
        let r = self.rank() as i8 + dr;
        let f = self.file() as i8 + df;
        if r < 0 || f < 0 {
            return None;
        }
        let sq = Square::new(r as usize, f as usize);
        if sq.is_offboard() {
            None
        } else {
            Some(sq)
        }
    }

    /// Chebyshev distance between two squares (used by AD discs).
    #[must_use]
    pub fn chebyshev(self, other: Square) -> u32 {
        let dr = (self.rank() as i32 - other.rank() as i32).unsigned_abs();
        let df = (self.file() as i32 - other.file() as i32).unsigned_abs();
        dr.max(df)
    }

    pub fn all() -> impl Iterator<Item = Square> {
        (0..RANKS).flat_map(|r| (0..FILES).map(move |f| Square::new(r, f)))
    }
}

fn file_to_index(file: char) -> Option<usize> {
    if ('a'..='k').contains(&file) {
        Some(file as usize - 'a' as usize)
    } else {
        None
    }
}

fn rank_to_index(rank_str: &str) -> Option<usize> {
    let rank: usize = rank_str.parse().ok()?;
    if (1..=RANKS).contains(&rank) {
        Some(rank - 1)
    } else {
        None
    }
}

impl std::str::FromStr for Square {
    type Err = SquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let file_ch = chars.next().ok_or_else(|| SquareError::InvalidNotation {
            notation: s.to_string(),
        })?;
        let file = file_to_index(file_ch).ok_or_else(|| SquareError::InvalidNotation {
            notation: s.to_string(),
        })?;
        let rank_str: String = chars.collect();
        let rank = rank_to_index(&rank_str).ok_or_else(|| SquareError::InvalidNotation {
            notation: s.to_string(),
        })?;
        Ok(Square::new(rank, file))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            (b'a' + self.file() as u8) as char,
            self.rank() + 1
        )
    }
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Square({self})")
    }
}
