//! Air-Defense map (C3): derived per-color coverage of AD-emitting pieces.

use std::collections::HashMap;

use crate::board::Board;
use crate::config::PieceConfig;
use crate::piece::Color;
use crate::square::Square;

/// Per-color map of `square -> origins of that color's AD emitters covering
/// it`. Rebuilt from scratch on demand; see [`AirDefenseMap::rebuild`].
#[derive(Clone, Debug, Default)]
pub struct AirDefenseMap {
    coverage: [HashMap<Square, Vec<Square>>; 2],
}

impl AirDefenseMap {
    #[must_use]
    pub fn rebuild(board: &Board) -> Self {
        let mut map = AirDefenseMap::default();
        for (origin, piece) in board.occupied() {
            let cfg = PieceConfig::for_kind(piece.kind);
            if !cfg.emits_ad {
                continue;
            }
            let radius = u32::from(cfg.ad_radius(piece.heroic));
            let table = &mut map.coverage[piece.color.index()];
            for sq in Square::all() {
                if sq.chebyshev(origin) <= radius {
                    table.entry(sq).or_default().push(origin);
                }
            }
        }
        for table in &mut map.coverage {
            for origins in table.values_mut() {
                origins.sort_by_key(|s| s.raw());
            }
        }
        map
    }

    /// Number of `color`'s AD emitters covering `sq`.
    #[must_use]
    pub fn coverage(&self, sq: Square, color: Color) -> u32 {
        self.coverage[color.index()]
            .get(&sq)
            .map_or(0, |v| v.len() as u32)
    }

    #[must_use]
    pub fn origins(&self, sq: Square, color: Color) -> &[Square] {
        self.coverage[color.index()]
            .get(&sq)
            .map_or(&[], |v| v.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::{Piece, PieceKind};
    use std::str::FromStr;

    #[test]
    fn anti_air_covers_a_chebyshev_disc() {
        let mut board = Board::empty();
        let origin = Square::from_str("e5").unwrap();
        board.put(Piece::new(PieceKind::AntiAir, Color::Red), origin, false).unwrap();
        let map = AirDefenseMap::rebuild(&board);
        assert_eq!(map.coverage(origin, Color::Red), 1);
        let adjacent = Square::from_str("f5").unwrap();
        assert_eq!(map.coverage(adjacent, Color::Red), 1);
        let far = Square::from_str("e1").unwrap();
        assert_eq!(map.coverage(far, Color::Red), 0);
    }

    #[test]
    fn heroic_anti_air_extends_radius_by_one() {
        let mut board = Board::empty();
        let origin = Square::from_str("e5").unwrap();
        let mut aa = Piece::new(PieceKind::AntiAir, Color::Red);
        aa.heroic = true;
        board.put(aa, origin, false).unwrap();
        let map = AirDefenseMap::rebuild(&board);
        let two_away = Square::from_str("e3").unwrap();
        assert_eq!(map.coverage(two_away, Color::Red), 1);
    }

    #[test]
    fn only_emitting_kinds_contribute() {
        let mut board = Board::empty();
        let origin = Square::from_str("e5").unwrap();
        board.put(Piece::new(PieceKind::Infantry, Color::Red), origin, false).unwrap();
        let map = AirDefenseMap::rebuild(&board);
        assert_eq!(map.coverage(origin, Color::Red), 0);
    }
}
