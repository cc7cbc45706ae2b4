//! Piece kinds, colors, and the stack (carrier/passenger) algebra.

use smallvec::SmallVec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A side in the game. RED moves first.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Color {
    Red,
    Blue,
}

impl Color {
    #[must_use]
    pub const fn opposite(self) -> Color {
        match self {
            Color::Red => Color::Blue,
            Color::Blue => Color::Red,
        }
    }

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Color::Red => 0,
            Color::Blue => 1,
        }
    }
}

/// The eleven piece kinds, tagged with their one-letter FEN/SAN symbol.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PieceKind {
    Commander,
    Infantry,
    Militia,
    Tank,
    Engineer,
    Artillery,
    AntiAir,
    Missile,
    AirForce,
    Navy,
    Headquarter,
}

pub const ALL_KINDS: [PieceKind; 11] = [
    PieceKind::Commander,
    PieceKind::Infantry,
    PieceKind::Militia,
    PieceKind::Tank,
    PieceKind::Engineer,
    PieceKind::Artillery,
    PieceKind::AntiAir,
    PieceKind::Missile,
    PieceKind::AirForce,
    PieceKind::Navy,
    PieceKind::Headquarter,
];

impl PieceKind {
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            PieceKind::Commander => 0,
            PieceKind::Infantry => 1,
            PieceKind::Militia => 2,
            PieceKind::Tank => 3,
            PieceKind::Engineer => 4,
            PieceKind::Artillery => 5,
            PieceKind::AntiAir => 6,
            PieceKind::Missile => 7,
            PieceKind::AirForce => 8,
            PieceKind::Navy => 9,
            PieceKind::Headquarter => 10,
        }
    }

    #[must_use]
    pub const fn to_char(self) -> char {
        match self {
            PieceKind::Commander => 'C',
            PieceKind::Infantry => 'I',
            PieceKind::Militia => 'M',
            PieceKind::Tank => 'T',
            PieceKind::Engineer => 'E',
            PieceKind::Artillery => 'A',
            PieceKind::AntiAir => 'G',
            PieceKind::Missile => 'S',
            PieceKind::AirForce => 'F',
            PieceKind::Navy => 'N',
            PieceKind::Headquarter => 'H',
        }
    }

    #[must_use]
    pub fn from_char(c: char) -> Option<PieceKind> {
        Some(match c.to_ascii_uppercase() {
            'C' => PieceKind::Commander,
            'I' => PieceKind::Infantry,
            'M' => PieceKind::Militia,
            'T' => PieceKind::Tank,
            'E' => PieceKind::Engineer,
            'A' => PieceKind::Artillery,
            'G' => PieceKind::AntiAir,
            'S' => PieceKind::Missile,
            'F' => PieceKind::AirForce,
            'N' => PieceKind::Navy,
            'H' => PieceKind::Headquarter,
            _ => return None,
        })
    }

    /// Whether this kind is heavy (Artillery, Anti-Air, Missile): the river
    /// is only crossable at a bridge square for these.
    #[must_use]
    pub const fn is_heavy(self) -> bool {
        matches!(
            self,
            PieceKind::Artillery | PieceKind::AntiAir | PieceKind::Missile
        )
    }

    /// Whether this kind's movement is restricted to the Navy terrain mask.
    #[must_use]
    pub const fn is_navy(self) -> bool {
        matches!(self, PieceKind::Navy)
    }

    /// Whether this kind ignores terrain entirely (flies over everything).
    #[must_use]
    pub const fn is_air(self) -> bool {
        matches!(self, PieceKind::AirForce)
    }
}

/// A piece, possibly carrying passengers. Stacks are flat: a carrier holds
/// zero, one, or two passengers directly (per the blueprint table); a
/// passenger never itself carries further.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
    pub heroic: bool,
    pub carrying: SmallVec<[Box<Piece>; 2]>,
}

impl Piece {
    #[must_use]
    pub fn new(kind: PieceKind, color: Color) -> Self {
        Piece {
            kind,
            color,
            heroic: false,
            carrying: SmallVec::new(),
        }
    }

    #[must_use]
    pub fn is_stack(&self) -> bool {
        !self.carrying.is_empty()
    }

    /// Every piece in this stack, carrier first, in canonical order.
    pub fn flatten(&self) -> Vec<&Piece> {
        let mut out = vec![self];
        out.extend(self.carrying.iter().map(|b| b.as_ref()));
        out
    }

    #[must_use]
    pub fn contains_kind(&self, kind: PieceKind) -> bool {
        self.kind == kind || self.carrying.iter().any(|p| p.kind == kind)
    }
}

/// Returns the set of passenger kinds a given carrier kind may legally carry,
/// expressed as independent optional "slots" (each slot holds at most one of
/// the listed kinds). An empty outer vec means the kind cannot carry at all.
fn carrier_slots(carrier: PieceKind) -> &'static [&'static [PieceKind]] {
    use PieceKind::*;
    match carrier {
        Navy => &[&[AirForce], &[Commander, Infantry, Militia, Tank]],
        Tank => &[&[Commander, Infantry, Militia]],
        Engineer => &[&[Artillery, AntiAir, Missile]],
        AirForce => &[&[Tank], &[Commander, Infantry, Militia]],
        Headquarter => &[&[Commander]],
        _ => &[],
    }
}

/// Carrier priority when more than one candidate in a loose set could serve
/// as carrier (should not happen for well-formed inputs, but resolved
/// deterministically rather than left to iteration order).
const CARRIER_PRIORITY: [PieceKind; 5] = [
    PieceKind::Navy,
    PieceKind::AirForce,
    PieceKind::Tank,
    PieceKind::Engineer,
    PieceKind::Headquarter,
];

/// Checks whether `carrier` may carry exactly the multiset `passengers`.
fn blueprint_matches(carrier: PieceKind, passengers: &[PieceKind]) -> bool {
    if passengers.is_empty() {
        return true;
    }
    let slots = carrier_slots(carrier);
    if passengers.len() > slots.len() {
        return false;
    }
    // Each passenger must fit a distinct slot; with at most 2 slots/passengers
    // a direct assignment search is cheap and exhaustive.
    fn assign(passengers: &[PieceKind], slots: &[&[PieceKind]], used: &mut Vec<bool>) -> bool {
        if passengers.is_empty() {
            return true;
        }
        let (first, rest) = passengers.split_first().unwrap();
        for (i, slot) in slots.iter().enumerate() {
            if !used[i] && slot.contains(first) {
                used[i] = true;
                if assign(rest, slots, used) {
                    return true;
                }
                used[i] = false;
            }
        }
        false
    }
    let mut used = vec![false; slots.len()];
    assign(passengers, slots, &mut used)
}

/// Combine a loose set of pieces (no pre-existing stacks) into the unique
/// canonical carrier+passengers arrangement, or `None` if no blueprint
/// matches. All pieces must share a color.
#[must_use]
pub fn combine(pieces: Vec<Piece>) -> Option<Piece> {
    if pieces.is_empty() {
        return None;
    }
    if pieces.len() == 1 {
        let mut p = pieces.into_iter().next().unwrap();
        p.carrying.clear();
        return Some(p);
    }
    let color = pieces[0].color;
    if pieces.iter().any(|p| p.color != color) {
        return None;
    }

    let mut candidates: Vec<usize> = (0..pieces.len()).collect();
    candidates.sort_by_key(|&i| {
        CARRIER_PRIORITY
            .iter()
            .position(|k| *k == pieces[i].kind)
            .unwrap_or(CARRIER_PRIORITY.len())
    });

    for carrier_idx in candidates {
        let carrier_kind = pieces[carrier_idx].kind;
        let passenger_kinds: Vec<PieceKind> = pieces
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != carrier_idx)
            .map(|(_, p)| p.kind)
            .collect();
        if blueprint_matches(carrier_kind, &passenger_kinds) {
            let mut carrier = pieces[carrier_idx].clone();
            carrier.heroic = pieces[carrier_idx].heroic;
            carrier.carrying = pieces
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != carrier_idx)
                .map(|(_, p)| Box::new(p.clone()))
                .collect();
            return Some(carrier);
        }
    }
    None
}

/// Extract `target` (matched by kind) from a stack, promoting the first
/// remaining passenger to carrier if the carrier itself is removed. Returns
/// `(remaining_stack, removed_piece)`, or `None` if no piece of that kind is
/// present.
#[must_use]
pub fn remove_from_stack(stack: &Piece, target: PieceKind) -> Option<(Option<Piece>, Piece)> {
    if stack.kind == target {
        let mut remaining: Vec<Piece> = stack.carrying.iter().map(|b| (**b).clone()).collect();
        if remaining.is_empty() {
            return Some((None, without_passengers(stack)));
        }
        let new_carrier = remaining.remove(0);
        let mut new_carrier = new_carrier;
        new_carrier.carrying = remaining.into_iter().map(Box::new).collect();
        return Some((Some(new_carrier), without_passengers(stack)));
    }
    if let Some(pos) = stack.carrying.iter().position(|p| p.kind == target) {
        let removed = (*stack.carrying[pos]).clone();
        let mut remaining = stack.clone();
        remaining.carrying.remove(pos);
        return Some((Some(remaining), removed));
    }
    None
}

fn without_passengers(p: &Piece) -> Piece {
    Piece {
        kind: p.kind,
        color: p.color,
        heroic: p.heroic,
        carrying: SmallVec::new(),
    }
}
