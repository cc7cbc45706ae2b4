//! Move session state machine (C7): accumulates the commands of a single
//! logical turn (a standard move or a deploy sequence) so it can be
//! committed as one history entry or cancelled as one unit.

use crate::actions::{command_for, Command, StateUpdate};
use crate::air_defense::AirDefenseMap;
use crate::attackers::attackers_of;
use crate::board::Board;
use crate::error::EngineError;
use crate::movegen::{self, InternalMove, MoveFlags};
use crate::notation;
use crate::options::GameOptions;
use crate::piece::{Piece, PieceKind};
use crate::square::Square;

/// An in-progress turn. `NoSession` is represented by `Option<Session>` being
/// `None` in the owning `Game`; `Committed` is not a state this type holds —
/// committing consumes the session and hands its commands to history.
pub struct Session {
    pub origin: Square,
    pub is_deploy: bool,
    pub original_piece: Piece,
    pub base_fen: String,
    commands: Vec<Command>,
    moves: Vec<InternalMove>,
    options: GameOptions,
}

impl Session {
    /// Creates a fresh session anchored at `mv.from`, snapshotting the board
    /// as it stood before `mv` (the first sub-move) is applied.
    #[must_use]
    pub fn new(board: &Board, mv: &InternalMove, options: GameOptions) -> Self {
        Session {
            origin: mv.from,
            is_deploy: mv.flags.contains(MoveFlags::DEPLOY),
            original_piece: board.get(mv.from).cloned().expect("session origin must be occupied"),
            base_fen: board.to_fen(),
            commands: Vec::new(),
            moves: Vec::new(),
            options,
        }
    }

    #[must_use]
    pub fn move_count(&self) -> usize {
        self.moves.len()
    }

    #[must_use]
    pub fn moves(&self) -> &[InternalMove] {
        &self.moves
    }

    /// Builds and executes the command for `mv`, appending it to the
    /// session. Invalidates nothing cached here — the move-list cache lives
    /// on `Game`, which is responsible for clearing it.
    pub fn add_move(&mut self, board: &mut Board, mv: InternalMove) -> Result<(), EngineError> {
        let mut command = command_for(board, &mv, self.options.last_guard_promotion);
        command.execute(board)?;
        self.commands.push(command);
        self.moves.push(mv);
        Ok(())
    }

    /// Pops and undoes the last command. Returns `true` if the session is
    /// now empty (the caller should clear its session reference).
    pub fn undo_last_move(&mut self, board: &mut Board) -> bool {
        if let Some(mut command) = self.commands.pop() {
            command.undo(board);
            self.moves.pop();
        }
        self.commands.is_empty()
    }

    /// Deploy only: true iff no piece remaining in the stack at `origin` has
    /// any legal move, so the deploy turn naturally has nothing left to do.
    #[must_use]
    pub fn is_complete(&self, board: &Board, ad_map: &AirDefenseMap) -> bool {
        if !self.is_deploy {
            return true;
        }
        match board.get(self.origin) {
            None => true,
            Some(residual) => movegen::generate_deploy_moves(board, ad_map, self.origin, residual).is_empty(),
        }
    }

    /// (a) For deploy, the residual stack (if any piece remains at `origin`)
    /// must legally occupy that square's terrain. (b) After the sequence so
    /// far, the mover's commander must not be in danger.
    #[must_use]
    pub fn can_commit(&self, board: &Board) -> bool {
        let Some(first) = self.moves.first() else {
            return false;
        };
        if self.is_deploy {
            if let Some(residual) = board.get(self.origin) {
                if !movegen::lands_ok(residual.kind, self.origin) {
                    return false;
                }
            }
        }
        let mover_color = first.color;
        let Some(commander_sq) = board.commander_square(mover_color) else {
            return false;
        };
        let ad_map = AirDefenseMap::rebuild(board);
        if !attackers_of(board, &ad_map, commander_sq, mover_color.opposite()).is_empty() {
            return false;
        }
        if movegen::commander_face_off(board) {
            return false;
        }
        true
    }

    /// Asserts `can_commit`, attaches the turn-level `StateUpdate` (keyed on
    /// the first move's color), and returns whether any sub-move captured.
    pub fn commit(mut self, board: &mut Board) -> Result<(Vec<Command>, bool), EngineError> {
        if !self.can_commit(board) {
            return Err(EngineError::SessionInvalidOperation {
                reason: "commit attempted while commander is in danger or stack terrain is illegal".to_string(),
            });
        }
        let first = self.moves.first().expect("can_commit guarantees at least one move");
        let has_capture = self.moves.iter().any(|m| m.flags.is_capture());
        let mut state_update = Command::new(vec![Box::new(StateUpdate::new(first.color, has_capture))]);
        state_update.execute(board)?;
        self.commands.push(state_update);
        Ok((self.commands, has_capture))
    }

    /// Undoes every command in reverse and discards the session.
    pub fn cancel(mut self, board: &mut Board) {
        for command in self.commands.iter_mut().rev() {
            command.undo(board);
        }
    }

    /// Retargets the earlier sub-move that landed on `target_square` so its
    /// destination piece becomes the combination of what's already there and
    /// `piece_kind`, a residual piece still waiting at the deploy origin.
    ///
    /// Spec §4.7 describes this as "cancel in place, replay from the
    /// original FEN with the modified list." Mechanically that list edit and
    /// this crate's append are the same board mutation: removing
    /// `piece_kind` from the origin and combining it onto the square an
    /// earlier sub-move already vacated into. Appending the combine as one
    /// more deploy sub-move reuses [`Session::add_move`] (and its existing
    /// all-or-nothing `Command` rollback) instead of re-deriving the whole
    /// sequence from `base_fen`, and ends at the identical board state.
    pub fn recombine(&mut self, board: &mut Board, target_square: Square, piece_kind: PieceKind) -> Result<(), EngineError> {
        if !self.is_deploy {
            return Err(EngineError::SessionInvalidOperation {
                reason: "recombine is only valid inside a deploy session".to_string(),
            });
        }
        if !self.moves.iter().any(|m| m.to == target_square) {
            return Err(EngineError::SessionInvalidOperation {
                reason: format!("no deployed piece at {target_square} to recombine with"),
            });
        }
        let residual = board.get(self.origin).cloned().ok_or_else(|| EngineError::SessionInvalidOperation {
            reason: "no residual stack remains at the deploy origin".to_string(),
        })?;
        if !residual.contains_kind(piece_kind) {
            return Err(EngineError::SessionInvalidOperation {
                reason: format!("{piece_kind:?} is not part of the residual stack at the deploy origin"),
            });
        }
        let heroic = if residual.kind == piece_kind {
            residual.heroic
        } else {
            residual
                .carrying
                .iter()
                .find(|p| p.kind == piece_kind)
                .map(|p| p.heroic)
                .unwrap_or(false)
        };

        let mv = InternalMove {
            color: residual.color,
            from: self.origin,
            to: target_square,
            piece: piece_kind,
            heroic,
            captured: None,
            flags: MoveFlags::DEPLOY.with(MoveFlags::COMBINATION),
        };
        self.add_move(board, mv)
    }

    /// The extended FEN for an in-progress deploy turn (spec §4.7): the base
    /// FEN as of session start, followed by the origin, the heroic-tagged
    /// stay-piece token (empty if nothing remains), and the comma-separated
    /// SAN of every sub-move so far. A trailing `...` marks that pieces still
    /// remain at the origin.
    #[must_use]
    pub fn extended_fen(&self, board: &Board) -> String {
        let stay_occupant = board.get(self.origin);
        let stay = stay_occupant
            .map(|p| {
                let mut s = String::new();
                if p.heroic {
                    s.push('+');
                }
                s.push(p.kind.to_char());
                s
            })
            .unwrap_or_default();
        let sans: Vec<String> = self.moves.iter().map(|m| notation::san(m, board, &self.moves)).collect();
        let suffix = if stay_occupant.is_some() { "..." } else { "" };
        format!("{} {}:{}:{}{}", self.base_fen, self.origin, stay, sans.join(","), suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::{Color, Piece, PieceKind};
    use std::str::FromStr;

    fn sample_move(color: Color, from: Square, to: Square, piece: crate::piece::PieceKind) -> InternalMove {
        InternalMove { color, from, to, piece, heroic: false, captured: None, flags: MoveFlags::NORMAL }
    }

    #[test]
    fn standard_session_commits_and_switches_turn() {
        let mut board = Board::empty();
        let from = Square::from_str("e5").unwrap();
        let to = Square::from_str("e6").unwrap();
        board.put(Piece::new(PieceKind::Infantry, Color::Red), from, false).unwrap();
        board.put(Piece::new(PieceKind::Commander, Color::Red), Square::from_str("a1").unwrap(), false).unwrap();
        board.put(Piece::new(PieceKind::Commander, Color::Blue), Square::from_str("k12").unwrap(), false).unwrap();

        let mv = sample_move(Color::Red, from, to, PieceKind::Infantry);
        let mut session = Session::new(&board, &mv, GameOptions::default());
        session.add_move(&mut board, mv).unwrap();
        assert!(session.can_commit(&board));
        let (_commands, has_capture) = session.commit(&mut board).unwrap();
        assert!(!has_capture);
        assert_eq!(board.meta.turn, Color::Blue);
    }

    #[test]
    fn cancel_undoes_every_submove() {
        let mut board = Board::empty();
        let from = Square::from_str("e5").unwrap();
        let to = Square::from_str("e6").unwrap();
        board.put(Piece::new(PieceKind::Infantry, Color::Red), from, false).unwrap();
        let mv = sample_move(Color::Red, from, to, PieceKind::Infantry);
        let mut session = Session::new(&board, &mv, GameOptions::default());
        session.add_move(&mut board, mv).unwrap();
        session.cancel(&mut board);
        assert_eq!(board.get(from).unwrap().kind, PieceKind::Infantry);
        assert!(board.get(to).is_none());
    }

    #[test]
    fn commit_fails_when_commander_left_in_check() {
        let mut board = Board::empty();
        let from = Square::from_str("e5").unwrap();
        let to = Square::from_str("e6").unwrap();
        board.put(Piece::new(PieceKind::Infantry, Color::Red), from, false).unwrap();
        board.put(Piece::new(PieceKind::Commander, Color::Red), Square::from_str("d5").unwrap(), false).unwrap();
        board.put(Piece::new(PieceKind::Commander, Color::Blue), Square::from_str("k12").unwrap(), false).unwrap();
        board.put(Piece::new(PieceKind::Tank, Color::Blue), Square::from_str("d4").unwrap(), false).unwrap();

        let mv = sample_move(Color::Red, from, to, PieceKind::Infantry);
        let mut session = Session::new(&board, &mv, GameOptions::default());
        session.add_move(&mut board, mv).unwrap();
        assert!(!session.can_commit(&board));
    }

    /// Mirrors seed scenario S4: a Commander riding inside an Air Force stack
    /// escapes check by deploying the Air Force alone, then recombining the
    /// Commander onto its destination once clear.
    #[test]
    fn recombine_lets_a_carried_commander_rejoin_a_deployed_piece() {
        let mut board = Board::empty();
        let origin = Square::from_str("g2").unwrap();
        let stack = crate::piece::combine(vec![
            Piece::new(PieceKind::AirForce, Color::Red),
            Piece::new(PieceKind::Commander, Color::Red),
        ])
        .unwrap();
        board.put(stack, origin, false).unwrap();
        board.put(Piece::new(PieceKind::Tank, Color::Blue), Square::from_str("g4").unwrap(), false).unwrap();
        board.put(Piece::new(PieceKind::Commander, Color::Blue), Square::from_str("k12").unwrap(), false).unwrap();

        let deploy_mv = InternalMove {
            color: Color::Red,
            from: origin,
            to: Square::from_str("j5").unwrap(),
            piece: PieceKind::AirForce,
            heroic: false,
            captured: None,
            flags: MoveFlags::DEPLOY,
        };
        let mut session = Session::new(&board, &deploy_mv, GameOptions::default());
        session.add_move(&mut board, deploy_mv).unwrap();
        assert_eq!(board.get(origin).unwrap().kind, PieceKind::Commander);

        // j5 is off both the tank's file (g) and rank (4), so it sits outside
        // the tank's orthogonal-only capture range and the commander is safe
        // to recombine there.
        session.recombine(&mut board, Square::from_str("j5").unwrap(), PieceKind::Commander).unwrap();
        assert!(board.get(origin).is_none());
        let combined = board.get(Square::from_str("j5").unwrap()).unwrap();
        assert_eq!(combined.kind, PieceKind::AirForce);
        assert!(combined.contains_kind(PieceKind::Commander));
        assert!(session.can_commit(&board));
    }
}
