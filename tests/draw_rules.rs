//! Seed scenario S6: threefold repetition. Shuttling two pieces back and
//! forth for three full four-ply cycles returns to the identical FEN (modulo
//! clocks) each time; `is_threefold_repetition()` only flips on the third
//! recurrence, not the first or second.

use cotulenh_core::board::Board;
use cotulenh_core::game::{Game, MoveInput};
use cotulenh_core::piece::{Color, Piece, PieceKind};
use cotulenh_core::square::Square;

fn shuttle_cycle(game: &mut Game) {
    let moves = [
        ("e5", "e6", false),
        ("f8", "f7", true),
        ("e6", "e5", false),
        ("f7", "f8", true),
    ];
    for (from, to, _blue) in moves {
        let from: Square = from.parse().unwrap();
        let to: Square = to.parse().unwrap();
        game.make_move(MoveInput::Structured { from, to, piece: None, deploy: false }).unwrap();
    }
}

#[test]
fn threefold_repetition_is_detected_on_the_third_recurrence() {
    let mut board = Board::empty();
    board.put(Piece::new(PieceKind::Commander, Color::Red), "a1".parse().unwrap(), false).unwrap();
    board.put(Piece::new(PieceKind::Commander, Color::Blue), "k12".parse().unwrap(), false).unwrap();
    board.put(Piece::new(PieceKind::Infantry, Color::Red), "e5".parse().unwrap(), false).unwrap();
    board.put(Piece::new(PieceKind::Infantry, Color::Blue), "f8".parse().unwrap(), false).unwrap();
    let mut game = Game::load(&board.to_fen()).unwrap();

    assert!(!game.is_threefold_repetition());

    shuttle_cycle(&mut game);
    assert!(!game.is_threefold_repetition(), "first recurrence is not yet a threefold");

    shuttle_cycle(&mut game);
    assert!(!game.is_threefold_repetition(), "second recurrence is not yet a threefold");

    shuttle_cycle(&mut game);
    assert!(game.is_threefold_repetition(), "third recurrence must trigger threefold repetition");
}

#[test]
fn half_move_clock_resets_on_capture_and_accumulates_otherwise() {
    let mut board = Board::empty();
    board.put(Piece::new(PieceKind::Commander, Color::Red), "a1".parse().unwrap(), false).unwrap();
    board.put(Piece::new(PieceKind::Commander, Color::Blue), "k12".parse().unwrap(), false).unwrap();
    board.put(Piece::new(PieceKind::Tank, Color::Red), "d4".parse().unwrap(), false).unwrap();
    board.put(Piece::new(PieceKind::Infantry, Color::Blue), "d6".parse().unwrap(), false).unwrap();
    let mut game = Game::load(&board.to_fen()).unwrap();

    let from: Square = "d4".parse().unwrap();
    let to: Square = "d6".parse().unwrap();
    let result = game.make_move(MoveInput::Structured { from, to, piece: None, deploy: false }).unwrap();
    assert!(result.captured.is_some());
    assert_eq!(game.board().meta.half_move_clock, 0);
}
