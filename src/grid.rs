use std::fmt;

use log::debug;

use crate::spawn::TileSpawner;

// ============================================================================
// Configuration
// ============================================================================

pub const DEFAULT_SIZE: usize = 4;
pub const MIN_SIZE: usize = 2;
pub const MAX_SIZE: usize = 8;
/// Largest tile a `u32` cell can hold. Two of these never merge.
pub const MAX_TILE: u32 = 1 << 31;
pub const INITIAL_TILES: usize = 2;

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GridError {
    /// Edge length outside `MIN_SIZE..=MAX_SIZE`.
    UnsupportedSize { size: usize },
    WrongLength { expected: usize, actual: usize },
    InvalidTile { index: usize, value: u32 },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::UnsupportedSize { size } => {
                write!(f, "unsupported grid size {size}: must be {MIN_SIZE} to {MAX_SIZE}")
            }
            GridError::WrongLength { expected, actual } => {
                write!(f, "expected {expected} cells, got {actual}")
            }
            GridError::InvalidTile { index, value } => {
                write!(f, "cell {index} holds {value}, which is not 0 or a power of two >= 2")
            }
        }
    }
}

impl std::error::Error for GridError {}

/// Outcome of one `apply_move`. The grid itself is updated in place.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct MoveResult {
    pub points: u64,
    pub moved: bool,
    pub terminal: bool,
}

/// An N x N board stored row-major. 0 is an empty cell.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Grid {
    size: usize,
    cells: Vec<u32>,
}

fn is_tile_value(value: u32) -> bool {
    value >= 2 && value.is_power_of_two()
}

/// Equal neighbours merge unless their sum would not fit in a cell.
fn can_merge(a: u32, b: u32) -> bool {
    a == b && a < MAX_TILE
}

/// Slide then merge one line whose head is the edge tiles move toward.
///
/// Returns the new line (same length) and the points scored by merges.
/// A merged tile is pushed and skipped over, so it cannot merge again.
fn merge_line(line: &[u32]) -> (Vec<u32>, u64) {
    let tiles: Vec<u32> = line.iter().copied().filter(|&v| v != 0).collect();
    let mut merged = Vec::with_capacity(line.len());
    let mut points = 0;

    let mut i = 0;
    while i < tiles.len() {
        if i + 1 < tiles.len() && can_merge(tiles[i], tiles[i + 1]) {
            let value = tiles[i] << 1;
            merged.push(value);
            points += u64::from(value);
            i += 2;
        } else {
            merged.push(tiles[i]);
            i += 1;
        }
    }

    merged.resize(line.len(), 0);
    (merged, points)
}

// ============================================================================
// Grid Logic
// ============================================================================

impl Grid {
    /// Fresh board with two spawned tiles.
    pub fn new<S: TileSpawner + ?Sized>(size: usize, spawner: &mut S) -> Result<Self, GridError> {
        let mut grid = Self::blank(size)?;
        grid.reset(spawner);
        Ok(grid)
    }

    /// Clears the board and spawns the opening tiles again, keeping the size.
    pub fn reset<S: TileSpawner + ?Sized>(&mut self, spawner: &mut S) {
        self.cells.fill(0);
        for _ in 0..INITIAL_TILES {
            self.spawn_tile(spawner);
        }
    }

    fn cell_count(size: usize) -> Result<usize, GridError> {
        if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
            return Err(GridError::UnsupportedSize { size });
        }
        Ok(size * size)
    }

    fn blank(size: usize) -> Result<Self, GridError> {
        Ok(Self {
            size,
            cells: vec![0; Self::cell_count(size)?],
        })
    }

    /// Builds a grid from caller-supplied cells, rejecting anything the engine
    /// could not have produced itself.
    pub fn from_cells(size: usize, cells: Vec<u32>) -> Result<Self, GridError> {
        let expected = Self::cell_count(size)?;
        if cells.len() != expected {
            return Err(GridError::WrongLength {
                expected,
                actual: cells.len(),
            });
        }
        if let Some((index, &value)) = cells
            .iter()
            .enumerate()
            .find(|&(_, &v)| v != 0 && !is_tile_value(v))
        {
            return Err(GridError::InvalidTile { index, value });
        }
        Ok(Self { size, cells })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn cells(&self) -> &[u32] {
        &self.cells
    }

    pub fn get(&self, row: usize, col: usize) -> u32 {
        self.cells[row * self.size + col]
    }

    pub fn row(&self, row: usize) -> &[u32] {
        &self.cells[row * self.size..(row + 1) * self.size]
    }

    /// Row-major indices of the empty cells.
    pub fn empty_cells(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v == 0)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn count_empty(&self) -> usize {
        self.cells.iter().filter(|&&v| v == 0).count()
    }

    pub fn max_tile(&self) -> u32 {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    /// Cell indices of one line, head first: the head is the edge that
    /// tiles move toward, so Right and Down walk their line backwards.
    fn line_indices(&self, direction: Direction, line: usize) -> Vec<usize> {
        let n = self.size;
        (0..n)
            .map(|i| match direction {
                Direction::Left => line * n + i,
                Direction::Right => line * n + (n - 1 - i),
                Direction::Up => i * n + line,
                Direction::Down => (n - 1 - i) * n + line,
            })
            .collect()
    }

    /// Slide and merge every line toward `direction` without spawning.
    ///
    /// Returns the points scored and whether any cell changed.
    pub fn shift(&mut self, direction: Direction) -> (u64, bool) {
        let mut points = 0;
        let mut moved = false;

        for line in 0..self.size {
            let indices = self.line_indices(direction, line);
            let values: Vec<u32> = indices.iter().map(|&i| self.cells[i]).collect();
            let (merged, line_points) = merge_line(&values);

            if merged != values {
                moved = true;
                for (&index, &value) in indices.iter().zip(&merged) {
                    self.cells[index] = value;
                }
            }
            points += line_points;
        }

        (points, moved)
    }

    /// Whether `direction` would change the board. Does not mutate.
    pub fn can_move(&self, direction: Direction) -> bool {
        (0..self.size).any(|line| {
            let values: Vec<u32> = self
                .line_indices(direction, line)
                .iter()
                .map(|&i| self.cells[i])
                .collect();
            merge_line(&values).0 != values
        })
    }

    pub fn legal_moves(&self) -> Vec<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|&d| self.can_move(d))
            .collect()
    }

    /// Places one tile in an empty cell. Returns the cell index, or `None`
    /// when the board is full.
    pub fn spawn_tile<S: TileSpawner + ?Sized>(&mut self, spawner: &mut S) -> Option<usize> {
        let empty = self.empty_cells();
        if empty.is_empty() {
            return None;
        }

        let spawn = spawner.next_spawn(empty.len());
        assert!(
            spawn.slot < empty.len(),
            "spawner chose slot {} of {} empty cells",
            spawn.slot,
            empty.len()
        );
        assert!(is_tile_value(spawn.value), "spawner produced tile {}", spawn.value);

        let index = empty[spawn.slot];
        self.cells[index] = spawn.value;
        debug!("spawned {} at cell {}", spawn.value, index);
        Some(index)
    }

    /// Slide, merge and, if anything changed, spawn one tile.
    ///
    /// A terminal board is left untouched and the spawner is not consulted.
    pub fn apply_move<S: TileSpawner + ?Sized>(
        &mut self,
        direction: Direction,
        spawner: &mut S,
    ) -> MoveResult {
        if self.is_terminal() {
            return MoveResult {
                points: 0,
                moved: false,
                terminal: true,
            };
        }

        let (points, moved) = self.shift(direction);
        if moved {
            debug!("moved {:?} for {} points", direction, points);
            self.spawn_tile(spawner);
        }
        debug_assert!(self.cells.iter().all(|&v| v == 0 || is_tile_value(v)));

        MoveResult {
            points,
            moved,
            terminal: self.is_terminal(),
        }
    }

    /// No empty cell and no horizontally or vertically adjacent equal pair.
    /// A pair of `MAX_TILE`s cannot merge, so it does not count.
    pub fn is_terminal(&self) -> bool {
        if self.cells.contains(&0) {
            return false;
        }

        let n = self.size;
        for row in 0..n {
            for col in 0..n {
                let value = self.get(row, col);
                if col + 1 < n && can_merge(self.get(row, col + 1), value) {
                    return false;
                }
                if row + 1 < n && can_merge(self.get(row + 1, col), value) {
                    return false;
                }
            }
        }
        true
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.size {
            for (col, value) in self.row(row).iter().enumerate() {
                if col > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{value:>5}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

pub mod test_helpers {
    use super::*;

    /// A `DEFAULT_SIZE` grid from row-major cells. Panics on bad input.
    pub fn grid(cells: &[u32]) -> Grid {
        Grid::from_cells(DEFAULT_SIZE, cells.to_vec()).expect("valid fixture")
    }

    /// A grid whose first row is `row` and is otherwise empty.
    pub fn grid_with_row(row: [u32; DEFAULT_SIZE]) -> Grid {
        let mut cells = vec![0; DEFAULT_SIZE * DEFAULT_SIZE];
        cells[..DEFAULT_SIZE].copy_from_slice(&row);
        grid(&cells)
    }

    /// Full board with no equal neighbours.
    pub fn checkerboard() -> Grid {
        grid(&[
            2, 4, 2, 4, //
            4, 2, 4, 2, //
            2, 4, 2, 4, //
            4, 2, 4, 2,
        ])
    }

    /// Sorted non-zero values, for comparing tile multisets.
    pub fn tiles(grid: &Grid) -> Vec<u32> {
        let mut tiles: Vec<u32> = grid.cells().iter().copied().filter(|&v| v != 0).collect();
        tiles.sort_unstable();
        tiles
    }
}
