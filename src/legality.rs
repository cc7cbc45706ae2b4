//! Legality filter (C8): narrows the move generator's pseudo-legal output to
//! legal moves by trial-executing each one and inspecting the result.

use crate::actions::command_for;
use crate::air_defense::AirDefenseMap;
use crate::attackers::attackers_of;
use crate::board::Board;
use crate::movegen::{self, InternalMove, MoveFlags};

/// Filters `moves` down to the legal subset for `board`, given whether a
/// deploy session is already open (any `DEPLOY` move is accepted
/// unconditionally in that case, deferring real legality to commit time —
/// this is what allows multi-step check-escapes within one deploy turn).
#[must_use]
pub fn filter_legal(board: &Board, moves: Vec<InternalMove>, session_open: bool) -> Vec<InternalMove> {
    moves
        .into_iter()
        .filter(|mv| is_legal(board, mv, session_open))
        .collect()
}

#[must_use]
pub fn is_legal(board: &Board, mv: &InternalMove, session_open: bool) -> bool {
    if mv.flags.contains(MoveFlags::DEPLOY) {
        let stack_has_commander = board
            .get(mv.from)
            .is_some_and(|p| p.contains_kind(crate::piece::PieceKind::Commander));
        if session_open || stack_has_commander {
            return true;
        }
    }

    let mut sim = board.clone();
    let mut command = command_for(&sim, mv, true);
    if let Err(_e) = command.execute(&mut sim) {
        #[cfg(feature = "logging")]
        log::debug!("trial execution failed for move {mv:?}: {_e}");
        return false;
    }

    let legal = if mv.piece == crate::piece::PieceKind::Commander {
        commander_not_attacked(&sim, mv.color)
    } else {
        commander_not_attacked(&sim, mv.color) && !movegen::commander_face_off(&sim)
    };

    command.undo(&mut sim);
    if !legal {
        #[cfg(feature = "logging")]
        log::debug!("rejected move {mv:?}: leaves mover's commander unsafe");
    }
    legal
}

fn commander_not_attacked(board: &Board, mover_color: crate::piece::Color) -> bool {
    let Some(commander_sq) = board.commander_square(mover_color) else {
        return false;
    };
    let ad_map = AirDefenseMap::rebuild(board);
    attackers_of(board, &ad_map, commander_sq, mover_color.opposite()).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movegen::{InternalMove, MoveFlags};
    use crate::piece::{Color, Piece, PieceKind};
    use crate::square::Square;
    use std::str::FromStr;

    #[test]
    fn move_that_leaves_own_commander_in_check_is_illegal() {
        let mut board = Board::empty();
        let commander_sq = Square::from_str("d5").unwrap();
        let shield_sq = Square::from_str("c4").unwrap();
        let attacker_sq = Square::from_str("b3").unwrap();
        board.put(Piece::new(PieceKind::Commander, Color::Red), commander_sq, false).unwrap();
        board.put(Piece::new(PieceKind::Infantry, Color::Red), shield_sq, false).unwrap();
        let mut blue_commander = Piece::new(PieceKind::Commander, Color::Blue);
        blue_commander.heroic = true;
        board.put(blue_commander, attacker_sq, false).unwrap();

        // Moving the shield off the diagonal exposes the commander to the
        // heroic enemy Commander's (non-blocking-ignoring) range-2 capture.
        let mv = InternalMove {
            color: Color::Red,
            from: shield_sq,
            to: Square::from_str("c5").unwrap(),
            piece: PieceKind::Infantry,
            heroic: false,
            captured: None,
            flags: MoveFlags::NORMAL,
        };
        assert!(!is_legal(&board, &mv, false));
    }

    #[test]
    fn ordinary_move_with_no_exposure_is_legal() {
        let mut board = Board::empty();
        board.put(Piece::new(PieceKind::Commander, Color::Red), Square::from_str("a1").unwrap(), false).unwrap();
        board.put(Piece::new(PieceKind::Commander, Color::Blue), Square::from_str("k12").unwrap(), false).unwrap();
        let from = Square::from_str("e5").unwrap();
        let to = Square::from_str("e6").unwrap();
        board.put(Piece::new(PieceKind::Infantry, Color::Red), from, false).unwrap();
        let mv = InternalMove {
            color: Color::Red,
            from,
            to,
            piece: PieceKind::Infantry,
            heroic: false,
            captured: None,
            flags: MoveFlags::NORMAL,
        };
        assert!(is_legal(&board, &mv, false));
    }

    #[test]
    fn deploy_move_from_a_commander_stack_is_accepted_unconditionally() {
        let mut board = Board::empty();
        let stack_sq = Square::from_str("e5").unwrap();
        let commander = Piece::new(PieceKind::Commander, Color::Red);
        let tank_with_commander = crate::piece::combine(vec![Piece::new(PieceKind::Tank, Color::Red), commander])
            .expect("tank may carry commander");
        board.put(tank_with_commander, stack_sq, false).unwrap();
        let mv = InternalMove {
            color: Color::Red,
            from: stack_sq,
            to: Square::from_str("e1").unwrap(),
            piece: PieceKind::Commander,
            heroic: false,
            captured: None,
            flags: MoveFlags::DEPLOY,
        };
        assert!(is_legal(&board, &mv, false));
    }
}
