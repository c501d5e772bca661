use rand::rngs::{StdRng, ThreadRng};
use rand::{Rng, SeedableRng};

// ============================================================================
// Configuration
// ============================================================================

/// Chance that a spawned tile is a 4 instead of a 2.
pub const SPAWN_FOUR_PROBABILITY: f64 = 0.1;

// ============================================================================
// Types
// ============================================================================

/// Where a new tile goes and what it is worth.
///
/// `slot` is an ordinal into the grid's empty cells (in row-major order),
/// not a raw cell index, so a spawner can never target an occupied cell.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Spawn {
    pub slot: usize,
    pub value: u32,
}

// ============================================================================
// Tile Spawner Trait
// ============================================================================

pub trait TileSpawner {
    /// Called only when `empty_count > 0`; the returned slot must be below it.
    fn next_spawn(&mut self, empty_count: usize) -> Spawn;
}

/// Uniform slot, 2 with probability 0.9 and 4 with probability 0.1.
pub struct RandomSpawner<R: Rng = ThreadRng> {
    rng: R,
}

impl RandomSpawner<ThreadRng> {
    pub fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }
}

impl Default for RandomSpawner<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSpawner<StdRng> {
    /// Deterministic spawner; the same seed replays the same game.
    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomSpawner<R> {
    pub fn from_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> TileSpawner for RandomSpawner<R> {
    fn next_spawn(&mut self, empty_count: usize) -> Spawn {
        let slot = self.rng.gen_range(0..empty_count);
        let value = if self.rng.gen_bool(SPAWN_FOUR_PROBABILITY) {
            4
        } else {
            2
        };
        Spawn { slot, value }
    }
}

/// Replays a fixed list of spawns, cycling when exhausted.
///
/// Slots wrap modulo the current empty count, so a script written for a
/// fresh board stays valid as the board fills up.
pub struct SequenceSpawner {
    spawns: Vec<Spawn>,
    index: usize,
}

impl SequenceSpawner {
    pub fn new(spawns: Vec<Spawn>) -> Self {
        assert!(!spawns.is_empty(), "SequenceSpawner needs at least one spawn");
        Self { spawns, index: 0 }
    }

    /// Always places a 2 in the first empty cell.
    pub fn first_empty() -> Self {
        Self::new(vec![Spawn { slot: 0, value: 2 }])
    }

    /// Number of spawns handed out so far.
    pub fn draws(&self) -> usize {
        self.index
    }
}

impl TileSpawner for SequenceSpawner {
    fn next_spawn(&mut self, empty_count: usize) -> Spawn {
        let spawn = self.spawns[self.index % self.spawns.len()];
        self.index += 1;
        Spawn {
            slot: spawn.slot % empty_count,
            value: spawn.value,
        }
    }
}
