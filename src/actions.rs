//! Move commands and atomic actions (C6): every board mutation is an
//! `execute`/`undo` pair, composed into a `Command` whose own execute rolls
//! back already-applied siblings on failure, so a command never leaves the
//! board partially mutated.

use std::collections::HashSet;

use crate::air_defense::AirDefenseMap;
use crate::attackers::attackers_of;
use crate::board::{Board, GameStateMetadata};
use crate::error::EngineError;
use crate::movegen::{InternalMove, MoveFlags};
use crate::piece::{Color, Piece, PieceKind};
use crate::square::Square;

/// An atomic, undoable board mutation.
pub trait Action: std::fmt::Debug {
    fn execute(&mut self, board: &mut Board) -> Result<(), EngineError>;
    fn undo(&mut self, board: &mut Board);
}

#[derive(Debug)]
pub struct RemovePiece {
    sq: Square,
    target: Option<PieceKind>,
    prior: Option<Piece>,
}

impl RemovePiece {
    #[must_use]
    pub fn new(sq: Square, target: Option<PieceKind>) -> Self {
        RemovePiece { sq, target, prior: None }
    }
}

impl Action for RemovePiece {
    fn execute(&mut self, board: &mut Board) -> Result<(), EngineError> {
        self.prior = board.get(self.sq).cloned();
        board.remove(self.sq, self.target)?;
        Ok(())
    }

    fn undo(&mut self, board: &mut Board) {
        board.force_set(self.sq, self.prior.take());
    }
}

#[derive(Debug)]
pub struct PlacePiece {
    sq: Square,
    piece: Piece,
    allow_combine: bool,
    prior: Option<Piece>,
}

impl PlacePiece {
    #[must_use]
    pub fn new(sq: Square, piece: Piece, allow_combine: bool) -> Self {
        PlacePiece { sq, piece, allow_combine, prior: None }
    }
}

impl Action for PlacePiece {
    fn execute(&mut self, board: &mut Board) -> Result<(), EngineError> {
        self.prior = board.get(self.sq).cloned();
        board.put(self.piece.clone(), self.sq, self.allow_combine)?;
        Ok(())
    }

    fn undo(&mut self, board: &mut Board) {
        board.force_set(self.sq, self.prior.take());
    }
}

#[derive(Debug)]
pub struct SetHeroic {
    sq: Square,
    kind: PieceKind,
    value: bool,
    prior: Option<bool>,
}

impl SetHeroic {
    #[must_use]
    pub fn new(sq: Square, kind: PieceKind, value: bool) -> Self {
        SetHeroic { sq, kind, value, prior: None }
    }
}

impl Action for SetHeroic {
    fn execute(&mut self, board: &mut Board) -> Result<(), EngineError> {
        self.prior = Some(board.set_heroic(self.sq, self.kind, self.value)?);
        Ok(())
    }

    fn undo(&mut self, board: &mut Board) {
        if let Some(prior) = self.prior.take() {
            let _ = board.set_heroic(self.sq, self.kind, prior);
        }
    }
}

/// Turn/clock/move-count bookkeeping, attached at commit time by the session
/// rather than to each individual deploy sub-move.
#[derive(Debug)]
pub struct StateUpdate {
    color: Color,
    is_capture: bool,
    prior_meta: Option<GameStateMetadata>,
    touched_key: Option<String>,
}

impl StateUpdate {
    #[must_use]
    pub fn new(color: Color, is_capture: bool) -> Self {
        StateUpdate { color, is_capture, prior_meta: None, touched_key: None }
    }
}

impl Action for StateUpdate {
    fn execute(&mut self, board: &mut Board) -> Result<(), EngineError> {
        self.prior_meta = Some(board.meta.clone());
        if self.is_capture {
            board.meta.half_move_clock = 0;
        } else {
            board.meta.half_move_clock += 1;
        }
        board.meta.turn = self.color.opposite();
        if self.color == Color::Blue {
            board.meta.full_move_number += 1;
        }
        let key = board.position_key();
        *board.position_counts.entry(key.clone()).or_insert(0) += 1;
        self.touched_key = Some(key);
        Ok(())
    }

    fn undo(&mut self, board: &mut Board) {
        if let Some(fen) = self.touched_key.take() {
            if let Some(count) = board.position_counts.get_mut(&fen) {
                *count -= 1;
                if *count == 0 {
                    board.position_counts.remove(&fen);
                }
            }
        }
        if let Some(meta) = self.prior_meta.take() {
            board.meta = meta;
        }
    }
}

/// Defers building its child actions until first executed — used for
/// post-move effects whose shape depends on the board state *after* the
/// triggering move has already landed.
pub struct LazyAction {
    factory: Option<Box<dyn FnOnce(&Board) -> Vec<Box<dyn Action>>>>,
    children: Option<Vec<Box<dyn Action>>>,
}

impl std::fmt::Debug for LazyAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LazyAction(executed={})", self.children.is_some())
    }
}

impl LazyAction {
    #[must_use]
    pub fn new(factory: impl FnOnce(&Board) -> Vec<Box<dyn Action>> + 'static) -> Self {
        LazyAction { factory: Some(Box::new(factory)), children: None }
    }
}

impl Action for LazyAction {
    fn execute(&mut self, board: &mut Board) -> Result<(), EngineError> {
        let factory = self.factory.take().expect("LazyAction executed twice");
        let mut children = factory(board);
        for (i, child) in children.iter_mut().enumerate() {
            if let Err(e) = child.execute(board) {
                for earlier in children[..i].iter_mut().rev() {
                    earlier.undo(board);
                }
                return Err(e);
            }
        }
        self.children = Some(children);
        Ok(())
    }

    fn undo(&mut self, board: &mut Board) {
        if let Some(mut children) = self.children.take() {
            for child in children.iter_mut().rev() {
                child.undo(board);
            }
        }
    }
}

/// An ordered, all-or-nothing sequence of atomic actions. Execution rolls
/// back already-applied actions and propagates the error if a later one
/// fails; `undo` reverses exactly the actions that executed.
#[derive(Default)]
pub struct Command {
    actions: Vec<Box<dyn Action>>,
    executed: usize,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Command(len={}, executed={})", self.actions.len(), self.executed)
    }
}

impl Command {
    #[must_use]
    pub fn new(actions: Vec<Box<dyn Action>>) -> Self {
        Command { actions, executed: 0 }
    }

    pub fn push(&mut self, action: Box<dyn Action>) {
        self.actions.push(action);
    }

    pub fn execute(&mut self, board: &mut Board) -> Result<(), EngineError> {
        for (i, action) in self.actions.iter_mut().enumerate() {
            match action.execute(board) {
                Ok(()) => self.executed = i + 1,
                Err(e) => {
                    for earlier in self.actions[..i].iter_mut().rev() {
                        earlier.undo(board);
                    }
                    self.executed = 0;
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    pub fn undo(&mut self, board: &mut Board) {
        for action in self.actions[..self.executed].iter_mut().rev() {
            action.undo(board);
        }
        self.executed = 0;
    }
}

/// Wraps the ordered commands produced by a deploy session so the whole
/// sequence can be undone (in reverse) as a single unit.
#[derive(Default, Debug)]
pub struct DeployMoveSequenceCommand {
    pub commands: Vec<Command>,
}

impl DeployMoveSequenceCommand {
    pub fn undo(&mut self, board: &mut Board) {
        for command in self.commands.iter_mut().rev() {
            command.undo(board);
        }
    }
}

fn heroic_promotion_effect(mover_color: Color) -> LazyAction {
    LazyAction::new(move |board| {
        let ad_map = AirDefenseMap::rebuild(board);
        let opposing = mover_color.opposite();
        let Some(cmd_sq) = board.commander_square(opposing) else {
            return Vec::new();
        };
        let attackers = attackers_of(board, &ad_map, cmd_sq, mover_color);
        let mut seen = HashSet::new();
        let mut children: Vec<Box<dyn Action>> = Vec::new();
        for attacker in attackers {
            if !attacker.heroic && seen.insert((attacker.origin, attacker.kind)) {
                children.push(Box::new(SetHeroic::new(attacker.origin, attacker.kind, true)));
            }
        }
        children
    })
}

fn last_guard_candidate(board: &Board, color: Color) -> Option<Square> {
    let mut candidates = board
        .occupied()
        .filter(|(_, p)| p.color == color && p.kind != PieceKind::Commander);
    let (sq, piece) = candidates.next()?;
    if candidates.next().is_some() {
        return None;
    }
    if piece.carrying.is_empty() && !piece.heroic {
        Some(sq)
    } else {
        None
    }
}

fn last_guard_promotion_effect() -> LazyAction {
    LazyAction::new(move |board| {
        let mut children: Vec<Box<dyn Action>> = Vec::new();
        for color in [Color::Red, Color::Blue] {
            if let Some(sq) = last_guard_candidate(board, color) {
                let kind = board.get(sq).expect("candidate square occupied").kind;
                children.push(Box::new(SetHeroic::new(sq, kind, true)));
            }
        }
        children
    })
}

fn with_post_move_effects(mut command: Command, mover_color: Color, last_guard_promotion: bool) -> Command {
    command.push(Box::new(heroic_promotion_effect(mover_color)));
    if last_guard_promotion {
        command.push(Box::new(last_guard_promotion_effect()));
    }
    command
}

/// In standard mode the whole stack at `from` relocates as one unit, so the
/// mover is the full occupant (carrier and passengers). In deploy mode only
/// the single residual piece named by the move leaves the stack; the rest
/// stays behind, so the mover is reconstructed bare from the move's own
/// `piece`/`heroic` fields rather than read off the board.
fn mover_piece(board: &Board, mv: &InternalMove) -> Piece {
    if mv.flags.contains(MoveFlags::DEPLOY) {
        Piece { kind: mv.piece, color: mv.color, heroic: mv.heroic, carrying: Default::default() }
    } else {
        board.get(mv.from).cloned().unwrap_or_else(|| Piece::new(mv.piece, mv.color))
    }
}

/// What a move's origin square loses: the whole occupant for a standard
/// move, or just the one deployed piece kind when a stack remains behind.
fn origin_removal_target(mv: &InternalMove) -> Option<PieceKind> {
    if mv.flags.contains(MoveFlags::DEPLOY) {
        Some(mv.piece)
    } else {
        None
    }
}

fn bare_command_for(board: &Board, mv: &InternalMove) -> Command {
    if mv.flags.contains(MoveFlags::SUICIDE_CAPTURE) {
        Command::new(vec![
            Box::new(RemovePiece::new(mv.from, origin_removal_target(mv))),
            Box::new(RemovePiece::new(mv.to, None)),
        ])
    } else if mv.flags.contains(MoveFlags::STAY_CAPTURE) {
        Command::new(vec![Box::new(RemovePiece::new(mv.to, None))])
    } else if mv.flags.contains(MoveFlags::COMBINATION) {
        let mover = mover_piece(board, mv);
        Command::new(vec![
            Box::new(RemovePiece::new(mv.from, origin_removal_target(mv))),
            Box::new(PlacePiece::new(mv.to, mover, true)),
        ])
    } else if mv.flags.contains(MoveFlags::CAPTURE) {
        let mover = mover_piece(board, mv);
        Command::new(vec![
            Box::new(RemovePiece::new(mv.from, origin_removal_target(mv))),
            Box::new(RemovePiece::new(mv.to, None)),
            Box::new(PlacePiece::new(mv.to, mover, false)),
        ])
    } else {
        let mover = mover_piece(board, mv);
        Command::new(vec![
            Box::new(RemovePiece::new(mv.from, origin_removal_target(mv))),
            Box::new(PlacePiece::new(mv.to, mover, false)),
        ])
    }
}

/// Builds the full command for a pseudo-legal move, including the
/// heroic-promotion and (unless disabled) Last-Guard post-move effects.
#[must_use]
pub fn command_for(board: &Board, mv: &InternalMove, last_guard_promotion: bool) -> Command {
    let command = bare_command_for(board, mv);
    with_post_move_effects(command, mv.color, last_guard_promotion)
}
