//! Attacker query (C4): enumerate enemy pieces that could capture at a
//! square under the current position, the basis for check detection and
//! heroic-promotion triggers.

use crate::air_defense::AirDefenseMap;
use crate::board::Board;
use crate::config::{PieceConfig, Range};
use crate::piece::{Color, Piece, PieceKind};
use crate::rays::walk;
use crate::square::Square;
use crate::terrain;

/// One attacking piece: the square of the stack it sits in (not necessarily
/// its own square — a stack has one square) and which kind within that stack
/// is doing the attacking.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Attacker {
    pub origin: Square,
    pub kind: PieceKind,
    pub heroic: bool,
}

/// Every enemy (relative to `sq`'s defender, i.e. every piece of
/// `attacker_color`) piece — including passengers inside a stack — that
/// could capture at `sq` right now.
#[must_use]
pub fn attackers_of(board: &Board, ad_map: &AirDefenseMap, sq: Square, attacker_color: Color) -> Vec<Attacker> {
    let mut out = Vec::new();
    for (origin, stack) in board.occupied() {
        if stack.color != attacker_color {
            continue;
        }
        for sub in stack.flatten() {
            if can_attack(board, ad_map, origin, sub, sq) {
                out.push(Attacker {
                    origin,
                    kind: sub.kind,
                    heroic: sub.heroic,
                });
            }
        }
    }
    out
}

fn can_attack(board: &Board, ad_map: &AirDefenseMap, origin: Square, sub: &Piece, target: Square) -> bool {
    if origin == target {
        return false;
    }
    let dr = target.rank() as i32 - origin.rank() as i32;
    let df = target.file() as i32 - origin.file() as i32;
    let (adr, adf) = (dr.unsigned_abs(), df.unsigned_abs());
    if adr != 0 && adf != 0 && adr != adf {
        return false;
    }
    let distance = adr.max(adf) as u8;
    let dir = (dr.signum() as i8, df.signum() as i8);
    let diagonal = dir.0 != 0 && dir.1 != 0;

    let cfg = PieceConfig::for_kind(sub.kind);
    if !cfg.directions(sub.heroic).contains(&dir) {
        return false;
    }

    let mut capture_range = cfg.capture_range(sub.heroic, diagonal);
    if sub.kind == PieceKind::Navy && !terrain::admits_navy(target) {
        capture_range = match capture_range {
            Range::Finite(n) => Range::Finite(n.saturating_sub(1)),
            Range::Infinite => Range::Infinite,
        };
    }
    if !capture_range.allows(distance) {
        return false;
    }

    if !cfg.capture_ignores_blocking {
        for (d, step_sq) in walk(origin, dir) {
            if d >= distance {
                break;
            }
            if board.get(step_sq).is_some() {
                return false;
            }
        }
    }

    if cfg.is_heavy {
        // Heavy pieces need an explicit bridge at the river seam; walk the
        // whole path checking each consecutive pair.
        let mut prev = origin;
        for (d, step_sq) in walk(origin, dir) {
            if !crate::terrain::heavy_crossing_allowed(prev, step_sq) {
                return false;
            }
            prev = step_sq;
            if d >= distance {
                break;
            }
        }
    }

    if sub.kind == PieceKind::AirForce {
        let mut pressure = 0u32;
        for (d, step_sq) in walk(origin, dir) {
            pressure += ad_map.coverage(step_sq, sub.color.opposite());
            if pressure >= 2 {
                return false;
            }
            if d >= distance {
                break;
            }
        }
    }

    true
}
