//! Per-piece movement configuration: a const lookup table keyed by
//! [`PieceKind`], read by the move generator and the attacker query so the
//! per-kind rules in spec §4.5 live as data rather than scattered `match`
//! arms.

use crate::piece::PieceKind;

pub const ORTHO_DIRS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
pub const DIAG_DIRS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
pub const EIGHT_DIRS: [(i8, i8); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// A move or capture range: either a fixed number of squares, or unbounded
/// (stopped only by the board edge or a blocking piece) — used only by the
/// Commander.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Range {
    Finite(u8),
    Infinite,
}

impl Range {
    #[must_use]
    pub fn allows(self, distance: u8) -> bool {
        match self {
            Range::Finite(n) => distance <= n,
            Range::Infinite => true,
        }
    }
}

/// Static configuration for one piece kind, covering the whole of spec
/// §4.5's per-piece table. Missile is the one kind whose orthogonal and
/// diagonal ranges differ ("mixed"); every other kind uses `move_range` /
/// `capture_range` uniformly across its direction set.
#[derive(Clone, Copy, Debug)]
pub struct PieceConfig {
    pub directions: &'static [(i8, i8)],
    move_range: u8,
    capture_range: u8,
    diag_move_range: u8,
    diag_capture_range: u8,
    is_infinite_move: bool,
    pub capture_ignores_blocking: bool,
    pub is_heavy: bool,
    pub emits_ad: bool,
    pub ad_base_radius: u8,
    /// Headquarter only: zero range and zero directions unless heroic, at
    /// which point it gains one step in all eight directions.
    pub heroic_unlocks_movement: bool,
}

impl PieceConfig {
    #[must_use]
    pub fn for_kind(kind: PieceKind) -> &'static PieceConfig {
        &PIECE_CONFIGS[kind.index()]
    }

    /// Movement range in the given direction, `heroic` applied. Headquarter
    /// returns `Finite(0)` with an empty direction set unless heroic.
    #[must_use]
    pub fn move_range(&self, heroic: bool, diagonal: bool) -> Range {
        if self.is_infinite_move {
            return Range::Infinite;
        }
        let base = if diagonal { self.diag_move_range } else { self.move_range };
        Range::Finite(base + u8::from(heroic))
    }

    #[must_use]
    pub fn capture_range(&self, heroic: bool, diagonal: bool) -> Range {
        let base = if diagonal {
            self.diag_capture_range
        } else {
            self.capture_range
        };
        Range::Finite(base + u8::from(heroic))
    }

    /// Directions this piece may move/capture in, given heroic status.
    #[must_use]
    pub fn directions(&self, heroic: bool) -> &'static [(i8, i8)] {
        if self.heroic_unlocks_movement {
            if heroic {
                &EIGHT_DIRS
            } else {
                &[]
            }
        } else {
            self.directions
        }
    }

    #[must_use]
    pub fn ad_radius(&self, heroic: bool) -> u8 {
        self.ad_base_radius + u8::from(heroic)
    }
}

const fn cfg(
    directions: &'static [(i8, i8)],
    move_range: u8,
    capture_range: u8,
) -> PieceConfig {
    PieceConfig {
        directions,
        move_range,
        capture_range,
        diag_move_range: move_range,
        diag_capture_range: capture_range,
        is_infinite_move: false,
        capture_ignores_blocking: false,
        is_heavy: false,
        emits_ad: false,
        ad_base_radius: 0,
        heroic_unlocks_movement: false,
    }
}

/// Indexed by `PieceKind::index()`, in the declaration order of
/// [`crate::piece::ALL_KINDS`].
static PIECE_CONFIGS: [PieceConfig; 11] = [
    // Commander: infinite ray move, adjacent capture only, no blocking-ignore.
    PieceConfig {
        is_infinite_move: true,
        ..cfg(&EIGHT_DIRS, 0, 1)
    },
    // Infantry
    cfg(&ORTHO_DIRS, 1, 1),
    // Militia
    cfg(&EIGHT_DIRS, 1, 1),
    // Tank
    PieceConfig {
        capture_ignores_blocking: true,
        ..cfg(&ORTHO_DIRS, 2, 2)
    },
    // Engineer
    cfg(&ORTHO_DIRS, 1, 1),
    // Artillery (heavy)
    PieceConfig {
        capture_ignores_blocking: true,
        is_heavy: true,
        ..cfg(&EIGHT_DIRS, 3, 3)
    },
    // Anti-Air (heavy, emits AD)
    PieceConfig {
        is_heavy: true,
        emits_ad: true,
        ad_base_radius: 1,
        ..cfg(&ORTHO_DIRS, 1, 1)
    },
    // Missile (heavy, mixed ranges: orth 2/3 heroic, diag 1/2 heroic)
    PieceConfig {
        directions: &EIGHT_DIRS,
        move_range: 2,
        capture_range: 2,
        diag_move_range: 1,
        diag_capture_range: 1,
        is_infinite_move: false,
        capture_ignores_blocking: true,
        is_heavy: true,
        emits_ad: false,
        ad_base_radius: 0,
        heroic_unlocks_movement: false,
    },
    // Air Force (ignores terrain, subject to AD pressure, handled in movegen)
    PieceConfig {
        capture_ignores_blocking: true,
        ..cfg(&EIGHT_DIRS, 4, 4)
    },
    // Navy (water/mixed-only move; land capture handled as stay-capture in movegen)
    PieceConfig {
        capture_ignores_blocking: true,
        ..cfg(&EIGHT_DIRS, 4, 4)
    },
    // Headquarter: no movement unless heroic
    PieceConfig {
        heroic_unlocks_movement: true,
        ..cfg(&[], 0, 0)
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::PieceKind;

    #[test]
    fn commander_move_range_is_infinite_but_capture_is_not() {
        let cfg = PieceConfig::for_kind(PieceKind::Commander);
        assert_eq!(cfg.move_range(false, false), Range::Infinite);
        assert_eq!(cfg.capture_range(false, false), Range::Finite(1));
        assert_eq!(cfg.capture_range(true, false), Range::Finite(2));
    }

    #[test]
    fn missile_has_distinct_orthogonal_and_diagonal_ranges() {
        let cfg = PieceConfig::for_kind(PieceKind::Missile);
        assert_eq!(cfg.move_range(false, false), Range::Finite(2));
        assert_eq!(cfg.move_range(false, true), Range::Finite(1));
        assert_eq!(cfg.move_range(true, true), Range::Finite(2));
    }

    #[test]
    fn headquarter_gains_movement_only_when_heroic() {
        let cfg = PieceConfig::for_kind(PieceKind::Headquarter);
        assert!(cfg.directions(false).is_empty());
        assert_eq!(cfg.directions(true).len(), 8);
        assert_eq!(cfg.move_range(true, false), Range::Finite(1));
    }

    #[test]
    fn anti_air_emits_ad_with_heroic_bonus() {
        let cfg = PieceConfig::for_kind(PieceKind::AntiAir);
        assert!(cfg.emits_ad);
        assert_eq!(cfg.ad_radius(false), 1);
        assert_eq!(cfg.ad_radius(true), 2);
    }
}
