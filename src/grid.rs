// 🔢 Grid Builder - Lo-Shu style digit frequency tally
// Nine buckets (1-9). Zero has no slot and is never counted.

use crate::date_metrics::date_digits;
use crate::reducer::reduce;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// GRID
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    /// Occurrences per digit; always holds all nine keys
    pub counts: BTreeMap<u8, u32>,

    /// Digits with a zero count, ascending
    pub missing: Vec<u8>,
}

impl Grid {
    fn from_buckets(buckets: [u32; 9]) -> Self {
        let counts: BTreeMap<u8, u32> = (1u8..=9)
            .zip(buckets.iter().copied())
            .collect();
        let missing = counts
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(digit, _)| *digit)
            .collect();

        Grid { counts, missing }
    }

    /// Count for a digit; 0 for anything outside 1..=9
    pub fn count(&self, digit: u8) -> u32 {
        self.counts.get(&digit).copied().unwrap_or(0)
    }

    pub fn is_missing(&self, digit: u8) -> bool {
        self.missing.contains(&digit)
    }

    /// Sum of all bucket counts
    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }
}

impl Default for Grid {
    fn default() -> Self {
        Grid::from_buckets([0; 9])
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Tally the date's digits, then optionally fold in one name-derived number.
///
/// The folded number goes through `reduce(n, false)` first, so a chain that
/// lands on a master value (e.g. 29 → 11) falls outside 1..=9 and is skipped.
pub fn build_grid(date: &str, folded: Option<u32>) -> Grid {
    let mut buckets = [0u32; 9];

    for digit in date_digits(date) {
        if (1..=9).contains(&digit) {
            buckets[(digit - 1) as usize] += 1;
        }
    }

    if let Some(n) = folded {
        let single = reduce(n, false);
        if (1..=9).contains(&single) {
            buckets[(single - 1) as usize] += 1;
        }
    }

    Grid::from_buckets(buckets)
}

// ============================================================================
// TESTS
// ============================================================================
