use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};

pub const DEFAULT_STATS_FILE: &str = "twenty48_stats.json";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub high_score: u64,
    pub games_played: u32,
    pub total_score: u64,
}

/// Per-player results of finished games, kept on disk as JSON.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsStore {
    pub players: BTreeMap<String, PlayerStats>,
}

impl StatsStore {
    /// A missing file is an empty store.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let store: Self = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(store)
    }

    /// Like `load`, but an unreadable file is logged and replaced by an empty store.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|err| {
            warn!("ignoring stats file: {:#}", err);
            Self::default()
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn record_game(&mut self, player: &str, score: u64) -> PlayerStats {
        let stats = self.players.entry(player.to_string()).or_default();
        stats.games_played += 1;
        stats.total_score = stats.total_score.saturating_add(score);
        stats.high_score = stats.high_score.max(score);
        *stats
    }

    pub fn player(&self, name: &str) -> Option<&PlayerStats> {
        self.players.get(name)
    }

    pub fn best_overall(&self) -> u64 {
        self.players.values().map(|s| s.high_score).max().unwrap_or(0)
    }

    /// Highest scores first; equal scores fall back to name order.
    pub fn top(&self, k: usize) -> Vec<(&str, &PlayerStats)> {
        let mut entries: Vec<(&str, &PlayerStats)> = self
            .players
            .iter()
            .map(|(name, stats)| (name.as_str(), stats))
            .collect();
        // BTreeMap iteration is already name-ordered and the sort is stable
        entries.sort_by(|a, b| b.1.high_score.cmp(&a.1.high_score));
        entries.truncate(k);
        entries
    }
}
