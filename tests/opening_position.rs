//! Starting-position sanity: the frozen opening layout (see `board.rs`'s
//! `STARTING_FEN` doc comment) is built to be mirror-symmetric, so Red's and
//! Blue's legal move counts from the same physical board must match.

use cotulenh_core::board::Board;
use cotulenh_core::game::Game;
use cotulenh_core::movegen::MoveFilter;
use cotulenh_core::piece::Color;

#[test]
fn starting_position_has_legal_moves_for_the_side_to_move() {
    let game = Game::new();
    assert_eq!(game.turn(), Color::Red);
    let moves = game.legal_moves(MoveFilter::default());
    assert!(!moves.is_empty());
}

#[test]
fn starting_position_is_symmetric_between_red_and_blue() {
    let red_game = Game::new();
    let red_moves = red_game.legal_moves(MoveFilter::default());

    let mut blue_board = Board::starting_position();
    blue_board.meta.turn = Color::Blue;
    let blue_game = Game::load(&blue_board.to_fen()).unwrap();
    let blue_moves = blue_game.legal_moves(MoveFilter::default());

    assert_eq!(red_moves.len(), blue_moves.len());
}

#[test]
fn neither_side_starts_in_check_or_game_over() {
    let game = Game::new();
    assert!(!game.is_check());
    assert!(!game.is_game_over());
}
