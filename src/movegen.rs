//! Pseudo-legal move generation (C5).
//!
//! Every CoTuLenh piece's movement reduces to the same shape — step along a
//! direction for up to N squares, subject to range/blocking/terrain/AD rules
//! — so generation for every kind is driven by the single [`moves_from`]
//! walker parameterized by [`PieceConfig`], rather than a family of
//! per-category generators.

use crate::air_defense::AirDefenseMap;
use crate::board::Board;
use crate::config::{PieceConfig, Range};
use crate::piece::{self, Color, Piece, PieceKind};
use crate::rays::walk;
use crate::square::Square;
use crate::terrain;

/// A single Air Force suicide-capture trigger: both pieces are removed
/// rather than only the target. Recorded as data (per spec §9's open
/// question) so a future pair can be added without touching the generator.
pub const SUICIDE_PAIRS: &[(PieceKind, PieceKind)] = &[(PieceKind::AirForce, PieceKind::AirForce)];

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct MoveFlags(u8);

impl MoveFlags {
    pub const NORMAL: MoveFlags = MoveFlags(0);
    pub const CAPTURE: MoveFlags = MoveFlags(1 << 0);
    pub const STAY_CAPTURE: MoveFlags = MoveFlags(1 << 1);
    pub const SUICIDE_CAPTURE: MoveFlags = MoveFlags(1 << 2);
    pub const COMBINATION: MoveFlags = MoveFlags(1 << 3);
    pub const DEPLOY: MoveFlags = MoveFlags(1 << 4);

    #[must_use]
    pub const fn contains(self, other: MoveFlags) -> bool {
        self.0 & other.0 == other.0
    }

    #[must_use]
    pub const fn with(self, other: MoveFlags) -> MoveFlags {
        MoveFlags(self.0 | other.0)
    }

    #[must_use]
    pub fn is_capture(self) -> bool {
        self.contains(MoveFlags::CAPTURE)
            || self.contains(MoveFlags::STAY_CAPTURE)
            || self.contains(MoveFlags::SUICIDE_CAPTURE)
    }
}

impl std::fmt::Display for MoveFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = String::new();
        if self.contains(MoveFlags::DEPLOY) {
            s.push('>');
        }
        if self.contains(MoveFlags::STAY_CAPTURE) {
            s.push('_');
        }
        if self.contains(MoveFlags::CAPTURE) {
            s.push('x');
        }
        if self.contains(MoveFlags::SUICIDE_CAPTURE) {
            s.push('@');
        }
        if self.contains(MoveFlags::COMBINATION) {
            s.push('&');
        }
        if s.is_empty() {
            s.push('-');
        }
        write!(f, "{s}")
    }
}

/// A pseudo-legal move. `to` is the destination for normal/combination moves
/// and the target square (distinct from the mover's resting square) for
/// stay-captures.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InternalMove {
    pub color: Color,
    pub from: Square,
    pub to: Square,
    pub piece: PieceKind,
    pub heroic: bool,
    pub captured: Option<PieceKind>,
    pub flags: MoveFlags,
}

#[derive(Clone, Copy, Default)]
pub struct MoveFilter {
    pub square: Option<Square>,
    pub kind: Option<PieceKind>,
}

/// Standard (non-deploy) pseudo-legal moves: one mover per occupied square,
/// keyed by the square's carrier kind — passengers ride along and are not
/// separately addressable outside a deploy session.
#[must_use]
pub fn generate_moves(board: &Board, ad_map: &AirDefenseMap, color: Color, filter: MoveFilter) -> Vec<InternalMove> {
    let mut out = Vec::new();
    for (origin, stack) in board.occupied() {
        if stack.color != color {
            continue;
        }
        if let Some(sq) = filter.square {
            if sq != origin {
                continue;
            }
        }
        if let Some(kind) = filter.kind {
            if kind != stack.kind {
                continue;
            }
        }
        moves_from(board, ad_map, origin, stack.kind, stack.heroic, color, MoveFlags::NORMAL, &mut out);
    }
    // The Commander's own relocating moves are restricted at generation time
    // (spec §4.5); stay-captures leave it on its own square so they don't
    // need this check, and the legality filter omits "exposed" for Commander
    // movers on the assumption this pass already ruled those out.
    out.retain(|m| {
        if m.piece == PieceKind::Commander && !m.flags.contains(MoveFlags::STAY_CAPTURE) {
            !would_cause_face_off_after_commander_move(board, m)
        } else {
            true
        }
    });
    out.sort_by_key(|m| (m.from.raw(), m.piece.index(), m.to.raw()));
    out
}

fn would_cause_face_off_after_commander_move(board: &Board, mv: &InternalMove) -> bool {
    let mut sim = board.clone();
    let mover = sim.get(mv.from).cloned();
    sim.force_set(mv.from, None);
    sim.force_set(mv.to, mover);
    commander_face_off(&sim)
}

/// Deploy-mode moves: one set per residual piece still present in the stack
/// at `stack_square`, each generated "as if it were the sole occupant."
/// Recombine targets fall naturally out of the normal combination-move path
/// when the destination already holds a friendly piece placed earlier this
/// deploy turn.
#[must_use]
pub fn generate_deploy_moves(
    board: &Board,
    ad_map: &AirDefenseMap,
    stack_square: Square,
    residual: &Piece,
) -> Vec<InternalMove> {
    let mut out = Vec::new();
    for sub in residual.flatten() {
        moves_from(
            board,
            ad_map,
            stack_square,
            sub.kind,
            sub.heroic,
            residual.color,
            MoveFlags::DEPLOY,
            &mut out,
        );
    }
    out.sort_by_key(|m| (m.piece.index(), m.to.raw()));
    out
}

pub(crate) fn lands_ok(kind: PieceKind, sq: Square) -> bool {
    if kind == PieceKind::AirForce {
        true
    } else if kind == PieceKind::Navy {
        terrain::admits_navy(sq)
    } else {
        terrain::admits_land(sq)
    }
}

fn is_suicide_pair(attacker: PieceKind, defender: PieceKind) -> bool {
    SUICIDE_PAIRS.iter().any(|&(a, d)| a == attacker && d == defender)
}

/// True iff the two commanders share a rank or file with nothing between
/// them ("flying general"/face-off). Used both to restrict the Commander's
/// own candidate destinations and, via trial-execution, to reject any move
/// that would expose this state in the legality filter.
#[must_use]
pub fn commander_face_off(board: &Board) -> bool {
    let (Some(red), Some(blue)) = (board.commander_square(Color::Red), board.commander_square(Color::Blue)) else {
        return false;
    };
    if red == blue {
        return false;
    }
    let dr = blue.rank() as i32 - red.rank() as i32;
    let df = blue.file() as i32 - red.file() as i32;
    if dr != 0 && df != 0 {
        return false;
    }
    let dir = (dr.signum() as i8, df.signum() as i8);
    let distance = dr.unsigned_abs().max(df.unsigned_abs()) as u8;
    for (d, sq) in walk(red, dir) {
        if d >= distance {
            break;
        }
        if board.get(sq).is_some() {
            return false;
        }
    }
    true
}

#[allow(clippy::too_many_arguments)]
fn moves_from(
    board: &Board,
    ad_map: &AirDefenseMap,
    origin: Square,
    kind: PieceKind,
    heroic: bool,
    color: Color,
    base_flags: MoveFlags,
    out: &mut Vec<InternalMove>,
) {
    let cfg = PieceConfig::for_kind(kind);
    for &dir in cfg.directions(heroic) {
        walk_direction(board, ad_map, origin, kind, heroic, color, dir, cfg, base_flags, out);
    }
}

#[allow(clippy::too_many_arguments)]
fn walk_direction(
    board: &Board,
    ad_map: &AirDefenseMap,
    origin: Square,
    kind: PieceKind,
    heroic: bool,
    color: Color,
    dir: (i8, i8),
    cfg: &PieceConfig,
    base_flags: MoveFlags,
    out: &mut Vec<InternalMove>,
) {
    let diagonal = dir.0 != 0 && dir.1 != 0;
    let move_range = cfg.move_range(heroic, diagonal);
    let capture_range = cfg.capture_range(heroic, diagonal);
    let max_range = match (move_range, capture_range) {
        (Range::Infinite, _) | (_, Range::Infinite) => None,
        (Range::Finite(a), Range::Finite(b)) => Some(a.max(b)),
    };

    let mut first_block_dist: Option<u8> = None;
    let mut ad_pressure = 0u32;
    let mut prev = origin;

    for (dist, sq) in walk(origin, dir) {
        if let Some(max) = max_range {
            if dist > max {
                break;
            }
        }
        if cfg.is_heavy && !terrain::heavy_crossing_allowed(prev, sq) {
            break;
        }
        prev = sq;

        if kind == PieceKind::AirForce {
            ad_pressure += ad_map.coverage(sq, color.opposite());
        }

        match board.get(sq) {
            None => {
                if first_block_dist.is_none() && move_range.allows(dist) && lands_ok(kind, sq) {
                    out.push(InternalMove {
                        color,
                        from: origin,
                        to: sq,
                        piece: kind,
                        heroic,
                        captured: None,
                        flags: base_flags,
                    });
                }
            }
            Some(occupant) if occupant.color == color => {
                if first_block_dist.is_none() && move_range.allows(dist) {
                    let mover = Piece { kind, color, heroic, carrying: Default::default() };
                    let combined = piece::combine(vec![occupant.clone(), mover]);
                    if let Some(combined) = combined {
                        if lands_ok(combined.kind, sq) {
                            out.push(InternalMove {
                                color,
                                from: origin,
                                to: sq,
                                piece: kind,
                                heroic,
                                captured: None,
                                flags: base_flags.with(MoveFlags::COMBINATION),
                            });
                        }
                    }
                }
                first_block_dist.get_or_insert(dist);
            }
            Some(occupant) => {
                let mut effective_capture_range = capture_range;
                if kind == PieceKind::Navy && !terrain::admits_navy(sq) {
                    effective_capture_range = match effective_capture_range {
                        Range::Finite(n) => Range::Finite(n.saturating_sub(1)),
                        Range::Infinite => Range::Infinite,
                    };
                }
                let reachable = if cfg.capture_ignores_blocking {
                    effective_capture_range.allows(dist)
                } else {
                    first_block_dist.is_none() && effective_capture_range.allows(dist)
                };
                if reachable {
                    let suicide = is_suicide_pair(kind, occupant.kind);
                    let lands = lands_ok(kind, sq) && move_range.allows(dist);
                    let flags = if suicide && lands {
                        base_flags.with(MoveFlags::SUICIDE_CAPTURE)
                    } else if lands {
                        base_flags.with(MoveFlags::CAPTURE)
                    } else {
                        base_flags.with(MoveFlags::STAY_CAPTURE)
                    };
                    out.push(InternalMove {
                        color,
                        from: origin,
                        to: sq,
                        piece: kind,
                        heroic,
                        captured: Some(occupant.kind),
                        flags,
                    });
                }
                first_block_dist.get_or_insert(dist);
            }
        }

        if kind == PieceKind::AirForce && ad_pressure >= 2 {
            break;
        }
    }
}
