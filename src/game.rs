//! Game facade (C10): turn tracking, history, draw/repetition rules, and the
//! single public entry point a caller drives — everything below this module
//! is reached only through [`Game`].

use std::fmt;

use crate::actions::Command;
use crate::air_defense::AirDefenseMap;
use crate::attackers::attackers_of;
use crate::board::Board;
use crate::error::{EngineError, SanError};
use crate::legality;
use crate::movegen::{self, InternalMove, MoveFilter, MoveFlags};
use crate::notation;
use crate::options::GameOptions;
use crate::piece::{Color, PieceKind};
use crate::session::Session;
use crate::square::Square;

/// Wraps the two failure domains a caller can see: malformed move text, or a
/// rule violation surfaced by the engine's closed error set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    San(SanError),
    Engine(EngineError),
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::San(e) => write!(f, "{e}"),
            GameError::Engine(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for GameError {}

impl From<SanError> for GameError {
    fn from(e: SanError) -> Self {
        GameError::San(e)
    }
}

impl From<EngineError> for GameError {
    fn from(e: EngineError) -> Self {
        GameError::Engine(e)
    }
}

/// How a caller identifies the move they want played.
pub enum MoveInput {
    San(String),
    Lan(String),
    Internal(InternalMove),
    /// A structured object: endpoints plus optional disambiguators. `deploy`
    /// selects a deploy sub-move over a whole-stack relocation when a stack
    /// sits at `from`.
    Structured {
        from: Square,
        to: Square,
        piece: Option<PieceKind>,
        deploy: bool,
    },
}

/// One resolved move's outcome, mirroring spec §6's `MoveResult`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveResult {
    pub color: Color,
    pub from: Square,
    pub to: Square,
    pub piece: PieceKind,
    pub captured: Option<PieceKind>,
    pub flags: String,
    pub before: String,
    pub after: String,
    pub san: String,
    pub lan: String,
    /// False for an intermediate deploy sub-move; true once the turn has
    /// actually committed to history.
    pub completed: bool,
}

/// A single top-level history entry: either a standard move or a whole
/// deploy sequence, recorded as the commands needed to undo it plus enough
/// to rebuild its SAN on demand.
struct HistoryEntry {
    commands: Vec<Command>,
    moves: Vec<InternalMove>,
    before_fen: String,
    after_fen: String,
    is_deploy: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryRecord {
    pub is_deploy: bool,
    pub before: String,
    pub after: String,
    pub sans: Vec<String>,
    /// Present only when `history(verbose: true)` was requested.
    pub moves: Option<Vec<InternalMove>>,
}

pub enum MoveListEntry {
    San(String),
    Detailed(InternalMove),
}

/// The public engine instance: one board, one optional in-progress session,
/// and the committed history. Single-threaded and synchronous (spec §5) —
/// nothing here yields or reenters.
pub struct Game {
    board: Board,
    options: GameOptions,
    session: Option<Session>,
    history: Vec<HistoryEntry>,
}

impl Default for Game {
    fn default() -> Self {
        Game::new()
    }
}

impl Game {
    #[must_use]
    pub fn new() -> Self {
        Game::from_board(Board::starting_position(), GameOptions::default())
    }

    #[must_use]
    pub fn with_options(options: GameOptions) -> Self {
        Game::from_board(Board::starting_position(), options)
    }

    pub fn load(fen: &str) -> Result<Self, EngineError> {
        let board = Board::from_fen(fen)?;
        Ok(Game::from_board(board, GameOptions::default()))
    }

    fn from_board(board: Board, options: GameOptions) -> Self {
        Game { board, options, session: None, history: Vec::new() }
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn options(&self) -> GameOptions {
        self.options
    }

    /// The current position's FEN: the extended deploy-session form while a
    /// session is open, the base FEN otherwise.
    #[must_use]
    pub fn fen(&self) -> String {
        match &self.session {
            Some(session) => session.extended_fen(&self.board),
            None => self.board.to_fen(),
        }
    }

    #[must_use]
    pub fn turn(&self) -> Color {
        self.board.meta.turn
    }

    /// Legal moves available right now: deploy sub-moves only while a
    /// session is open, otherwise every standard move plus every deploy
    /// sub-move a stacked square could open a session with.
    #[must_use]
    pub fn legal_moves(&self, filter: MoveFilter) -> Vec<InternalMove> {
        let ad_map = AirDefenseMap::rebuild(&self.board);
        if let Some(session) = &self.session {
            let Some(residual) = self.board.get(session.origin).cloned() else {
                return Vec::new();
            };
            let mut moves = movegen::generate_deploy_moves(&self.board, &ad_map, session.origin, &residual);
            if let Some(sq) = filter.square {
                moves.retain(|m| m.from == sq);
            }
            if let Some(kind) = filter.kind {
                moves.retain(|m| m.piece == kind);
            }
            return legality::filter_legal(&self.board, moves, true);
        }

        let mut moves = movegen::generate_moves(&self.board, &ad_map, self.board.meta.turn, filter);
        for (origin, stack) in self.board.occupied() {
            if stack.color != self.board.meta.turn || stack.carrying.is_empty() {
                continue;
            }
            if filter.square.is_some_and(|sq| sq != origin) {
                continue;
            }
            moves.extend(movegen::generate_deploy_moves(&self.board, &ad_map, origin, stack));
        }
        if let Some(kind) = filter.kind {
            moves.retain(|m| m.piece == kind);
        }
        legality::filter_legal(&self.board, moves, false)
    }

    #[must_use]
    pub fn moves(&self, filter: MoveFilter, verbose: bool) -> Vec<MoveListEntry> {
        let all = self.legal_moves(MoveFilter::default());
        all.iter()
            .filter(|m| filter.square.map_or(true, |sq| sq == m.from))
            .filter(|m| filter.kind.map_or(true, |kind| kind == m.piece))
            .map(|m| {
                if verbose {
                    MoveListEntry::Detailed(m.clone())
                } else {
                    MoveListEntry::San(notation::san(m, &self.board, &all))
                }
            })
            .collect()
    }

    fn resolve(&self, input: MoveInput, candidates: &[InternalMove]) -> Result<InternalMove, GameError> {
        match input {
            MoveInput::San(text) => Ok(notation::parse_san(&text, &self.board, candidates)?),
            MoveInput::Lan(text) => Ok(notation::parse_lan(&text, &self.board, candidates)?),
            MoveInput::Internal(mv) => candidates
                .iter()
                .find(|m| **m == mv)
                .cloned()
                .ok_or(GameError::Engine(EngineError::MoveInvalidDestination { square: mv.to.to_string() })),
            MoveInput::Structured { from, to, piece, deploy } => candidates
                .iter()
                .find(|m| {
                    m.from == from
                        && m.to == to
                        && piece.map_or(true, |kind| kind == m.piece)
                        && m.flags.contains(MoveFlags::DEPLOY) == deploy
                })
                .cloned()
                .ok_or(GameError::Engine(EngineError::MoveInvalidDestination { square: to.to_string() })),
        }
    }

    /// Resolves `input` against the legal moves available right now, plays
    /// it, and (for a standard move) commits immediately. A deploy sub-move
    /// leaves the session open; the caller drives it onward with further
    /// `make_move` calls, [`Game::commit_session`], or [`Game::recombine`].
    pub fn make_move(&mut self, input: MoveInput) -> Result<MoveResult, GameError> {
        let candidates = self.legal_moves(MoveFilter::default());
        let mv = self.resolve(input, &candidates)?;

        let before = self.fen();
        let board_before = self.board.clone();
        let is_deploy_mv = mv.flags.contains(MoveFlags::DEPLOY);

        if self.session.is_none() {
            self.session = Some(Session::new(&self.board, &mv, self.options));
        }
        self.session
            .as_mut()
            .expect("session was just ensured")
            .add_move(&mut self.board, mv.clone())
            .map_err(GameError::Engine)?;

        let completed = if is_deploy_mv {
            false
        } else {
            self.commit_open_session()?;
            true
        };

        let after = self.fen();
        Ok(MoveResult {
            color: mv.color,
            from: mv.from,
            to: mv.to,
            piece: mv.piece,
            captured: mv.captured,
            flags: mv.flags.to_string(),
            before,
            after,
            san: notation::san(&mv, &board_before, &candidates),
            lan: notation::lan(&mv, &board_before),
            completed,
        })
    }

    fn commit_open_session(&mut self) -> Result<bool, GameError> {
        let session = self.session.take().expect("commit requires an open session");
        let moves = session.moves().to_vec();
        let before_fen = session.base_fen.clone();
        let is_deploy = session.is_deploy;
        let (commands, has_capture) = session.commit(&mut self.board)?;
        let after_fen = self.board.to_fen();
        self.history.push(HistoryEntry { commands, moves, before_fen, after_fen, is_deploy });
        Ok(has_capture)
    }

    /// Commits an open deploy session explicitly (spec §4.7's `commit`).
    pub fn commit_session(&mut self) -> Result<MoveResult, GameError> {
        let session = self
            .session
            .as_ref()
            .ok_or_else(|| EngineError::SessionInvalidOperation { reason: "no session is open".to_string() })?;
        let last = session
            .moves()
            .last()
            .cloned()
            .ok_or_else(|| EngineError::SessionInvalidOperation { reason: "session has no moves to commit".to_string() })?;
        let origin = session.origin;
        let stay_piece = self.board.get(origin).map(|p| (p.kind, p.heroic));
        let all_moves = session.moves().to_vec();
        let sans: Vec<String> = all_moves.iter().map(|m| notation::san(m, &self.board, &all_moves)).collect();
        let lans: Vec<String> = all_moves.iter().map(|m| notation::lan(m, &self.board)).collect();
        let before = self.fen();

        self.commit_open_session()?;

        let after = self.fen();
        Ok(MoveResult {
            color: last.color,
            from: last.from,
            to: last.to,
            piece: last.piece,
            captured: last.captured,
            flags: last.flags.to_string(),
            before,
            after,
            san: notation::deploy_san(stay_piece, &sans),
            lan: notation::deploy_lan(origin, stay_piece, &lans),
            completed: true,
        })
    }

    #[must_use]
    pub fn can_commit_session(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.can_commit(&self.board))
    }

    pub fn cancel_session(&mut self) -> Result<(), GameError> {
        let session = self
            .session
            .take()
            .ok_or_else(|| EngineError::SessionInvalidOperation { reason: "no session is open".to_string() })?;
        session.cancel(&mut self.board);
        Ok(())
    }

    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn recombine(&mut self, target_square: Square, piece_kind: PieceKind) -> Result<(), GameError> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| EngineError::SessionInvalidOperation { reason: "no session is open".to_string() })?;
        session.recombine(&mut self.board, target_square, piece_kind)?;
        Ok(())
    }

    /// Undoes the session's last sub-move if one is open, otherwise pops and
    /// undoes the last committed history entry. Returns `false` if there was
    /// nothing to undo.
    pub fn undo(&mut self) -> bool {
        if let Some(session) = self.session.as_mut() {
            if session.undo_last_move(&mut self.board) {
                self.session = None;
            }
            return true;
        }
        let Some(mut entry) = self.history.pop() else {
            return false;
        };
        for command in entry.commands.iter_mut().rev() {
            command.undo(&mut self.board);
        }
        true
    }

    #[must_use]
    pub fn is_check(&self) -> bool {
        let Some(sq) = self.board.commander_square(self.board.meta.turn) else {
            return false;
        };
        let ad_map = AirDefenseMap::rebuild(&self.board);
        !attackers_of(&self.board, &ad_map, sq, self.board.meta.turn.opposite()).is_empty()
    }

    #[must_use]
    pub fn is_checkmate(&self) -> bool {
        self.session.is_none() && self.is_check() && self.legal_moves(MoveFilter::default()).is_empty()
    }

    #[must_use]
    pub fn is_stalemate(&self) -> bool {
        self.session.is_none() && !self.is_check() && self.legal_moves(MoveFilter::default()).is_empty()
    }

    #[must_use]
    pub fn is_draw_by_fifty_moves(&self) -> bool {
        self.board.meta.half_move_clock >= 100
    }

    #[must_use]
    pub fn is_threefold_repetition(&self) -> bool {
        self.board.position_counts.get(&self.board.position_key()).copied().unwrap_or(0) >= 3
    }

    #[must_use]
    pub fn is_commander_captured(&self) -> bool {
        self.board.commander_square(Color::Red).is_none() || self.board.commander_square(Color::Blue).is_none()
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        if self.session.is_some() {
            return false;
        }
        self.is_checkmate()
            || self.is_stalemate()
            || self.is_draw_by_fifty_moves()
            || self.is_threefold_repetition()
            || self.is_commander_captured()
    }

    /// Rebuilds the move history for display. SAN is regenerated from the
    /// FEN recorded at the start of each entry; since every deploy sub-move's
    /// notation is independent of board contents (spec §4.9), that single
    /// snapshot is sufficient even for multi-submove deploy entries.
    #[must_use]
    pub fn history(&self, verbose: bool) -> Vec<HistoryRecord> {
        self.history
            .iter()
            .map(|entry| {
                let board_before = Board::from_fen(&entry.before_fen).expect("recorded history FEN is well-formed");
                let sans = entry.moves.iter().map(|m| notation::san(m, &board_before, &entry.moves)).collect();
                HistoryRecord {
                    is_deploy: entry.is_deploy,
                    before: entry.before_fen.clone(),
                    after: entry.after_fen.clone(),
                    sans,
                    moves: if verbose { Some(entry.moves.clone()) } else { None },
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_game_starts_with_red_to_move_and_no_history() {
        let game = Game::new();
        assert_eq!(game.turn(), Color::Red);
        assert!(game.history(false).is_empty());
        assert!(!game.is_game_over());
    }

    #[test]
    fn load_round_trips_through_fen() {
        let fen = Board::starting_position().to_fen();
        let game = Game::load(&fen).unwrap();
        assert_eq!(game.fen(), fen);
    }

    #[test]
    fn standard_move_auto_commits_and_switches_turn() {
        let mut game = Game::new();
        let from: Square = "c2".parse().unwrap();
        let to: Square = "c3".parse().unwrap();
        let result = game
            .make_move(MoveInput::Structured { from, to, piece: None, deploy: false })
            .unwrap();
        assert!(result.completed);
        assert_eq!(game.turn(), Color::Blue);
        assert_eq!(game.history(false).len(), 1);
        assert!(game.session().is_none());
    }

    #[test]
    fn undo_after_auto_committed_move_restores_turn_and_clears_history() {
        let mut game = Game::new();
        let from: Square = "c2".parse().unwrap();
        let to: Square = "c3".parse().unwrap();
        game.make_move(MoveInput::Structured { from, to, piece: None, deploy: false }).unwrap();
        assert!(game.undo());
        assert_eq!(game.turn(), Color::Red);
        assert!(game.history(false).is_empty());
    }

    #[test]
    fn deploy_sub_move_leaves_a_session_open_until_commit() {
        let mut board = Board::empty();
        let origin: Square = "g2".parse().unwrap();
        let stack = crate::piece::combine(vec![
            crate::piece::Piece::new(PieceKind::AirForce, Color::Red),
            crate::piece::Piece::new(PieceKind::Commander, Color::Red),
        ])
        .unwrap();
        board.put(stack, origin, false).unwrap();
        board.put(crate::piece::Piece::new(PieceKind::Commander, Color::Blue), "k12".parse().unwrap(), false).unwrap();
        let mut game = Game::load(&board.to_fen()).unwrap();

        let to: Square = "g5".parse().unwrap();
        let result = game
            .make_move(MoveInput::Structured { from: origin, to, piece: Some(PieceKind::AirForce), deploy: true })
            .unwrap();
        assert!(!result.completed);
        assert!(game.session().is_some());
        assert!(!game.is_game_over());

        assert!(game.can_commit_session());
        let commit_result = game.commit_session().unwrap();
        assert!(commit_result.completed);
        assert!(game.session().is_none());
        assert_eq!(game.turn(), Color::Blue);
        assert_eq!(game.history(false).len(), 1);
    }

    #[test]
    fn draw_by_fifty_moves_is_detected_from_the_half_move_clock() {
        let mut board = Board::starting_position();
        board.meta.half_move_clock = 100;
        let game = Game::load(&board.to_fen()).unwrap();
        assert!(game.is_draw_by_fifty_moves());
    }

    #[test]
    fn commander_captured_ends_the_game() {
        let mut board = Board::empty();
        board.put(crate::piece::Piece::new(PieceKind::Commander, Color::Red), "a1".parse().unwrap(), false).unwrap();
        let game = Game::load(&board.to_fen()).unwrap();
        assert!(game.is_commander_captured());
        assert!(game.is_game_over());
    }
}
