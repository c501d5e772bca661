//! Tests for the play session built on the grid engine
//!
//! Test categories:
//! - Starting a game
//! - Scoring and best score
//! - Game over detection
//! - Restarting

use twenty48::game::{Game, GameEvent, GameState};
use twenty48::grid::{test_helpers::*, Direction, GridError};
use twenty48::spawn::{RandomSpawner, SequenceSpawner};

fn scripted(grid: twenty48::grid::Grid) -> Game {
    Game::with_grid(grid, Box::new(SequenceSpawner::first_empty()))
}

fn one_move_from_the_end() -> twenty48::grid::Grid {
    grid(&[
        2, 4, 2, 4, //
        4, 2, 4, 2, //
        2, 4, 2, 4, //
        0, 8, 16, 32,
    ])
}

// ============================================================================
// Starting Tests
// ============================================================================

mod starting {
    use super::*;

    #[test]
    fn new_game_starts_playing() {
        let game = Game::new(4).unwrap();

        assert_eq!(game.state, GameState::Playing);
        assert_eq!(game.score, 0);
        assert_eq!(game.moves, 0);
        assert_eq!(game.grid.count_empty(), 14);
    }

    #[test]
    fn bad_size_is_reported() {
        assert!(matches!(
            Game::new(1),
            Err(GridError::UnsupportedSize { size: 1 })
        ));
    }

    #[test]
    fn seeded_games_match() {
        let a = Game::with_spawner(4, Box::new(RandomSpawner::seeded(8))).unwrap();
        let b = Game::with_spawner(4, Box::new(RandomSpawner::seeded(8))).unwrap();
        assert_eq!(a.grid, b.grid);
    }

    #[test]
    fn terminal_board_starts_as_game_over() {
        let game = scripted(checkerboard());
        assert!(game.is_game_over());
    }
}

// ============================================================================
// Scoring Tests
// ============================================================================

mod scoring {
    use super::*;

    #[test]
    fn merge_points_add_to_score() {
        let mut game = scripted(grid_with_row([2, 2, 4, 4]));

        let result = game.play(Direction::Left);

        assert_eq!(result.points, 12);
        assert_eq!(game.score, 12);
        assert_eq!(game.moves, 1);
    }

    #[test]
    fn score_accumulates_across_moves() {
        let mut game = scripted(grid_with_row([2, 2, 4, 0]));

        game.play(Direction::Left); // [4, 4, 0, 0] + spawn -> [4, 4, 2, 0]
        game.play(Direction::Left); // [8, 2, 0, 0]

        assert_eq!(game.score, 4 + 8);
        assert_eq!(game.moves, 2);
    }

    #[test]
    fn events_for_a_merging_move() {
        let mut game = scripted(grid_with_row([2, 2, 0, 0]));
        game.take_events();

        game.play(Direction::Left);

        assert_eq!(
            game.take_events(),
            vec![
                GameEvent::TilesMoved,
                GameEvent::TilesMerged(4),
                GameEvent::NewBestScore(4),
            ]
        );
    }

    #[test]
    fn slide_without_merge_scores_nothing() {
        let mut game = scripted(grid_with_row([0, 0, 0, 2]));

        game.play(Direction::Left);

        assert_eq!(game.score, 0);
        assert_eq!(game.take_events(), vec![GameEvent::TilesMoved]);
    }

    #[test]
    fn noop_move_changes_nothing() {
        let mut game = scripted(grid_with_row([2, 4, 8, 16]));
        let before = game.grid.clone();

        let result = game.play(Direction::Left);

        assert!(!result.moved);
        assert_eq!(game.grid, before);
        assert_eq!(game.moves, 0);
        assert!(game.take_events().is_empty());
    }

    #[test]
    fn best_score_carries_over() {
        let mut game = scripted(grid_with_row([2, 2, 0, 0])).with_best_score(100);

        game.play(Direction::Left);

        assert_eq!(game.score, 4);
        assert_eq!(game.best_score, 100);
        assert!(!game.take_events().contains(&GameEvent::NewBestScore(4)));
    }

    #[test]
    fn best_score_event_fires_once_per_game() {
        let mut game = scripted(grid_with_row([2, 2, 4, 0]));

        game.play(Direction::Left);
        game.play(Direction::Left);

        let best_events = game
            .take_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::NewBestScore(_)))
            .count();
        assert_eq!(best_events, 1);
        assert_eq!(game.best_score, game.score);
    }
}

// ============================================================================
// Game Over Tests
// ============================================================================

mod game_over {
    use super::*;

    #[test]
    fn last_gap_filled_ends_game() {
        let mut game = scripted(one_move_from_the_end());
        game.take_events();

        let result = game.play(Direction::Left);

        assert!(result.terminal);
        assert!(game.is_game_over());
        assert!(game.take_events().contains(&GameEvent::GameOver));
    }

    #[test]
    fn no_moves_after_game_over() {
        let mut game = scripted(one_move_from_the_end());
        game.play(Direction::Left);
        let board = game.grid.clone();
        let moves = game.moves;

        for direction in Direction::ALL {
            let result = game.play(direction);
            assert!(!result.moved);
            assert!(result.terminal);
        }

        assert_eq!(game.grid, board);
        assert_eq!(game.moves, moves);
    }

    #[test]
    fn random_game_reaches_game_over() {
        let mut game = Game::with_spawner(4, Box::new(RandomSpawner::seeded(2024))).unwrap();

        for step in 0..100_000 {
            if game.is_game_over() {
                break;
            }
            let moves = game.grid.legal_moves();
            game.play(moves[step % moves.len()]);
        }

        assert!(game.is_game_over());
        assert!(game.score > 0);
        assert!(game.grid.is_terminal());
    }
}

// ============================================================================
// Restart Tests
// ============================================================================

mod restart {
    use super::*;

    #[test]
    fn restart_resets_board_and_score() {
        let mut game = scripted(one_move_from_the_end());
        game.play(Direction::Left);

        game.restart();

        assert_eq!(game.state, GameState::Playing);
        assert_eq!(game.score, 0);
        assert_eq!(game.moves, 0);
        assert_eq!(game.grid.count_empty(), 14);
        assert_eq!(game.take_events(), vec![GameEvent::GameRestarted]);
    }

    #[test]
    fn restart_keeps_best_score() {
        let mut game = scripted(grid_with_row([2, 2, 0, 0]));
        game.play(Direction::Left);

        game.restart();

        assert_eq!(game.best_score, 4);
    }

    #[test]
    fn new_best_can_fire_again_after_restart() {
        let mut game = scripted(grid_with_row([2, 2, 0, 0]));
        game.play(Direction::Left);
        game.restart();
        game.take_events();

        // first_empty spawner opens with 2s in cells 0 and 1
        assert_eq!(game.grid.row(0), &[2, 2, 0, 0]);
        game.grid = grid_with_row([4, 4, 0, 0]);
        game.play(Direction::Left);

        assert_eq!(game.best_score, 8);
        assert!(game.take_events().contains(&GameEvent::NewBestScore(8)));
    }
}
