//! Tile-merging puzzle engine.
//!
//! [`grid`] holds the board and its move/merge/spawn rules, [`spawn`] is the
//! randomness it is driven by, and [`game`] layers score keeping on top.
//! Persistence ([`stats`]) and the command line ([`config`]) belong to the
//! caller; the engine itself never touches either.

pub mod config;
pub mod game;
pub mod grid;
pub mod spawn;
pub mod stats;
