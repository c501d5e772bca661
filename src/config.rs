use std::path::PathBuf;

use clap::builder::RangedU64ValueParser;
use clap::Parser;

use crate::grid::{DEFAULT_SIZE, MAX_SIZE, MIN_SIZE};
use crate::spawn::{RandomSpawner, TileSpawner};
use crate::stats::DEFAULT_STATS_FILE;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Slide and merge tiles until the board locks up")]
pub struct Settings {
    /// Board edge length (the board has size x size cells).
    #[arg(
        long,
        default_value_t = DEFAULT_SIZE,
        value_parser = RangedU64ValueParser::<usize>::new().range(MIN_SIZE as u64..=MAX_SIZE as u64)
    )]
    pub size: usize,

    /// Seed for tile placement; omit for a fresh random game.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// JSON file holding per-player best scores and totals.
    #[arg(long, value_name = "FILE", default_value = DEFAULT_STATS_FILE)]
    pub stats_file: PathBuf,

    /// Name finished games are recorded under.
    #[arg(long, default_value = "player")]
    pub player: String,

    /// Write logs here (RUST_LOG filter, default "info"). Logging is off without it.
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

impl Settings {
    pub fn spawner(&self) -> Box<dyn TileSpawner> {
        match self.seed {
            Some(seed) => Box::new(RandomSpawner::seeded(seed)),
            None => Box::new(RandomSpawner::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;

    #[test]
    fn defaults() {
        let settings = Settings::try_parse_from(["twenty48"]).unwrap();

        assert_eq!(settings.size, DEFAULT_SIZE);
        assert_eq!(settings.seed, None);
        assert_eq!(settings.stats_file, PathBuf::from(DEFAULT_STATS_FILE));
        assert_eq!(settings.player, "player");
        assert!(settings.log_file.is_none());
    }

    #[test]
    fn seed_makes_spawner_deterministic() {
        let settings =
            Settings::try_parse_from(["twenty48", "--size", "5", "--seed", "17"]).unwrap();

        let a = Grid::new(settings.size, settings.spawner().as_mut()).unwrap();
        let b = Grid::new(settings.size, settings.spawner().as_mut()).unwrap();

        assert_eq!(a.size(), 5);
        assert_eq!(a, b);
    }

    #[test]
    fn size_bounds_are_enforced() {
        for size in [MIN_SIZE, MAX_SIZE] {
            let arg = size.to_string();
            let settings = Settings::try_parse_from(["twenty48", "--size", arg.as_str()]).unwrap();
            assert_eq!(settings.size, size);
        }
        for size in [0, 1, MAX_SIZE + 1, 9363] {
            let arg = size.to_string();
            assert!(Settings::try_parse_from(["twenty48", "--size", arg.as_str()]).is_err());
        }
    }

    #[test]
    fn rejects_non_numeric_size() {
        assert!(Settings::try_parse_from(["twenty48", "--size", "big"]).is_err());
    }
}
