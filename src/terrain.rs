//! Static per-square terrain legality (C2).
//!
//! Pure functions over a [`Square`]; nothing here touches board state, so the
//! masks never need rebuilding. `rank` and `file` below are 0-based ([`Square`]
//! indices), unlike the 1-based ranks and `a..k` files used in notation.

use crate::square::Square;

/// Files a, b, c (0-based file < 3).
const NAVY_FILE_LIMIT: usize = 3;

/// Files c..k inclusive admit land pieces (0-based file >= 2).
const LAND_FILE_START: usize = 2;

/// The four river-mouth squares where Navy may sail onto an otherwise
/// land-only file: d5, d6, e5, e6 (0-based file 3/4, rank 4/5).
const RIVER_MOUTH: [(usize, usize); 4] = [(4, 3), (5, 3), (4, 4), (5, 4)];

/// Bridge squares: the sole river crossings for heavy pieces, each given as
/// (rank, file) 0-based. f6/f7/h6/h7 sit either side of the rank 6|7 seam.
const BRIDGES: [(usize, usize); 4] = [(5, 5), (6, 5), (5, 7), (6, 7)];

/// True iff `sq` admits a Navy piece: files a-c, plus the four river-mouth
/// squares.
#[must_use]
pub fn admits_navy(sq: Square) -> bool {
    if sq.file() < NAVY_FILE_LIMIT {
        return true;
    }
    RIVER_MOUTH
        .iter()
        .any(|&(rank, file)| sq.rank() == rank && sq.file() == file)
}

/// True iff `sq` admits a land piece: files c..k. Overlaps `admits_navy` on
/// file c and the river-mouth squares (the mixed zone).
#[must_use]
pub fn admits_land(sq: Square) -> bool {
    sq.file() >= LAND_FILE_START
}

/// True iff `sq` is one of the four bridge squares.
#[must_use]
pub fn is_bridge(sq: Square) -> bool {
    BRIDGES
        .iter()
        .any(|&(rank, file)| sq.rank() == rank && sq.file() == file)
}

/// True iff `rank_a`/`rank_b` (0-based) are the two ranks split by the river,
/// i.e. {5, 6} in either order.
#[must_use]
pub fn is_river_seam(rank_a: usize, rank_b: usize) -> bool {
    let (lo, hi) = if rank_a <= rank_b {
        (rank_a, rank_b)
    } else {
        (rank_b, rank_a)
    };
    lo == 5 && hi == 6
}

/// A heavy piece (Artillery, Anti-Air, Missile) stepping from `from` to `to`
/// across the river seam must land on a bridge square on the same file. Pure
/// diagonal crossings are always illegal for heavy pieces: the file changes
/// during the rank crossing, so it can never coincide with a bridge file at
/// both ends of the step.
#[must_use]
pub fn heavy_crossing_allowed(from: Square, to: Square) -> bool {
    if !is_river_seam(from.rank(), to.rank()) {
        return true;
    }
    from.file() == to.file() && is_bridge(from) && is_bridge(to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn navy_admits_water_files_and_river_mouths() {
        assert!(admits_navy(Square::from_str("a1").unwrap()));
        assert!(admits_navy(Square::from_str("c6").unwrap()));
        assert!(admits_navy(Square::from_str("d5").unwrap()));
        assert!(admits_navy(Square::from_str("e6").unwrap()));
        assert!(!admits_navy(Square::from_str("f1").unwrap()));
    }

    #[test]
    fn land_admits_c_through_k() {
        assert!(!admits_land(Square::from_str("a1").unwrap()));
        assert!(admits_land(Square::from_str("c1").unwrap()));
        assert!(admits_land(Square::from_str("k12").unwrap()));
    }

    #[test]
    fn bridges_are_exactly_four_squares() {
        for s in ["f6", "f7", "h6", "h7"] {
            assert!(is_bridge(Square::from_str(s).unwrap()), "{s} should be a bridge");
        }
        assert!(!is_bridge(Square::from_str("g6").unwrap()));
    }

    #[test]
    fn heavy_piece_must_use_a_bridge_to_cross_the_river() {
        let f6 = Square::from_str("f6").unwrap();
        let f7 = Square::from_str("f7").unwrap();
        assert!(heavy_crossing_allowed(f6, f7));

        let g6 = Square::from_str("g6").unwrap();
        let g7 = Square::from_str("g7").unwrap();
        assert!(!heavy_crossing_allowed(g6, g7));
    }

    #[test]
    fn diagonal_river_crossing_is_always_blocked_for_heavy_pieces() {
        let f6 = Square::from_str("f6").unwrap();
        let g7 = Square::from_str("g7").unwrap();
        assert!(!heavy_crossing_allowed(f6, g7));
    }
}
