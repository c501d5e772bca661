use log::info;

use crate::grid::{Direction, Grid, GridError, MoveResult};
use crate::spawn::{RandomSpawner, TileSpawner};

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameState {
    Playing,
    GameOver,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum GameEvent {
    TilesMoved,
    TilesMerged(u64),
    NewBestScore(u64),
    GameOver,
    GameRestarted,
}

// ============================================================================
// Game
// ============================================================================

/// One play session: the grid plus the score keeping the engine leaves to
/// its caller.
pub struct Game {
    pub grid: Grid,
    pub score: u64,
    pub best_score: u64,
    pub moves: u32,
    pub state: GameState,
    spawner: Box<dyn TileSpawner>,
    events: Vec<GameEvent>,
    best_beaten: bool,
}

impl Game {
    pub fn new(size: usize) -> Result<Self, GridError> {
        Self::with_spawner(size, Box::new(RandomSpawner::new()))
    }

    pub fn with_spawner(size: usize, mut spawner: Box<dyn TileSpawner>) -> Result<Self, GridError> {
        let grid = Grid::new(size, spawner.as_mut())?;
        Ok(Self::with_grid(grid, spawner))
    }

    /// Resumes from an existing board; a terminal board starts out as game over.
    pub fn with_grid(grid: Grid, spawner: Box<dyn TileSpawner>) -> Self {
        let state = if grid.is_terminal() {
            GameState::GameOver
        } else {
            GameState::Playing
        };

        Self {
            grid,
            score: 0,
            best_score: 0,
            moves: 0,
            state,
            spawner,
            events: Vec::new(),
            best_beaten: false,
        }
    }

    /// Carries a best score over from an earlier session.
    pub fn with_best_score(mut self, best_score: u64) -> Self {
        self.best_score = best_score;
        self
    }

    pub fn play(&mut self, direction: Direction) -> MoveResult {
        if self.state == GameState::GameOver {
            return MoveResult {
                points: 0,
                moved: false,
                terminal: true,
            };
        }

        let result = self.grid.apply_move(direction, self.spawner.as_mut());
        if !result.moved {
            return result;
        }

        self.moves += 1;
        self.events.push(GameEvent::TilesMoved);
        if result.points > 0 {
            self.score = self.score.saturating_add(result.points);
            self.events.push(GameEvent::TilesMerged(result.points));
        }

        if self.score > self.best_score {
            self.best_score = self.score;
            if !self.best_beaten {
                self.best_beaten = true;
                self.events.push(GameEvent::NewBestScore(self.score));
            }
        }

        if result.terminal {
            self.state = GameState::GameOver;
            self.events.push(GameEvent::GameOver);
            info!(
                "game over: score {} after {} moves, max tile {}",
                self.score,
                self.moves,
                self.grid.max_tile()
            );
        }

        result
    }

    pub fn restart(&mut self) {
        self.grid.reset(self.spawner.as_mut());
        self.score = 0;
        self.moves = 0;
        self.best_beaten = false;
        self.state = GameState::Playing;
        self.events.clear();
        self.events.push(GameEvent::GameRestarted);
    }

    /// Takes and clears all pending events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_game_over(&self) -> bool {
        self.state == GameState::GameOver
    }
}
