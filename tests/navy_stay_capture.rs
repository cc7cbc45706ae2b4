//! Seed scenario: a Navy stay-capture against a land piece, played through
//! the public facade via its SAN (`N_d3`). The Navy itself never leaves the
//! water square it captured from.

use cotulenh_core::board::Board;
use cotulenh_core::game::{Game, MoveInput};
use cotulenh_core::piece::{Color, Piece, PieceKind};
use cotulenh_core::square::Square;

#[test]
fn navy_stay_capture_removes_the_target_and_keeps_the_navy_in_place() {
    let mut board = Board::empty();
    let navy_sq: Square = "c3".parse().unwrap();
    let target_sq: Square = "d3".parse().unwrap();
    board.put(Piece::new(PieceKind::Navy, Color::Red), navy_sq, false).unwrap();
    board.put(Piece::new(PieceKind::Tank, Color::Blue), target_sq, false).unwrap();
    board.put(Piece::new(PieceKind::Commander, Color::Red), "a1".parse().unwrap(), false).unwrap();
    board.put(Piece::new(PieceKind::Commander, Color::Blue), "k12".parse().unwrap(), false).unwrap();
    let mut game = Game::load(&board.to_fen()).unwrap();

    let result = game.make_move(MoveInput::San("N_d3".to_string())).unwrap();

    assert_eq!(result.san, "N_d3");
    assert_eq!(result.captured, Some(PieceKind::Tank));
    assert!(result.completed);
    assert_eq!(game.turn(), Color::Blue);
    let navy = game.board().get(navy_sq).unwrap();
    assert_eq!(navy.kind, PieceKind::Navy);
    // The Navy is Red's sole remaining non-Commander piece once the Tank is
    // gone, so Last-Guard promotion (on by default) makes it heroic.
    assert!(navy.heroic);
    assert!(game.board().get(target_sq).is_none());
}

#[test]
fn navy_stay_capture_undoes_cleanly() {
    let mut board = Board::empty();
    let navy_sq: Square = "c3".parse().unwrap();
    let target_sq: Square = "d3".parse().unwrap();
    board.put(Piece::new(PieceKind::Navy, Color::Red), navy_sq, false).unwrap();
    board.put(Piece::new(PieceKind::Tank, Color::Blue), target_sq, false).unwrap();
    board.put(Piece::new(PieceKind::Commander, Color::Red), "a1".parse().unwrap(), false).unwrap();
    board.put(Piece::new(PieceKind::Commander, Color::Blue), "k12".parse().unwrap(), false).unwrap();
    let mut game = Game::load(&board.to_fen()).unwrap();

    game.make_move(MoveInput::San("N_d3".to_string())).unwrap();
    assert!(game.undo());

    assert_eq!(game.turn(), Color::Red);
    assert_eq!(game.board().get(target_sq).unwrap().kind, PieceKind::Tank);
    let navy = game.board().get(navy_sq).unwrap();
    assert_eq!(navy.kind, PieceKind::Navy);
    assert!(!navy.heroic);
}
