//! Search results and run metadata

use crate::errors::Result;
use crate::reduce::DuplicatesMap;
use crate::types::{DataSource, Poem, Stanza};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Facts about one run, reported alongside the results
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunMeta {
    /// Milliseconds since the Unix epoch
    pub started_at_ms: u64,
    pub finished_at_ms: u64,
    pub data_source: DataSource,
    pub seed_budget: usize,
    pub seeds_used: usize,
    /// Seeds the corpus was short of the budget
    pub seed_shortfall: usize,
    /// Records before reduction (0 when a cached corpus carries no count)
    pub input_lines: usize,
    pub reduced_lines: usize,
    pub seed_pairs_searched: usize,
    pub stanza_groups_searched: usize,
    /// Work units dropped under the skip-and-log failure policy
    pub failed_units: usize,
    /// True when some work units were dropped
    pub incomplete: bool,
}

impl RunMeta {
    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.finished_at_ms.saturating_sub(self.started_at_ms))
    }
}

/// Everything a paradelle search produced
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchResults {
    /// Canonical, sorted, duplicate-free stanzas
    pub stanzas: Vec<Stanza>,
    /// Canonical, sorted, duplicate-free poems
    pub poems: Vec<Poem>,
    /// Surviving representative → removed duplicate lines
    pub duplicates: DuplicatesMap,
    pub meta: RunMeta,
}

impl SearchResults {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch
pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
