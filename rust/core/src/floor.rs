// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The floor ladder: the fixed, ordered sequence of floor Z levels.
//!
//! The ladder is configuration, not discovered data. Adjacent levels are
//! at least 2.72 m apart in the reference building, so matching a Z value
//! to its level with a 20 mm tolerance is unambiguous.

use serde::{Deserialize, Serialize};

/// Ordered floor Z levels with span helpers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FloorLadder {
    levels: Vec<f64>,
}

impl FloorLadder {
    /// Builds a ladder from arbitrary levels; sorts and removes duplicates.
    pub fn new(mut levels: Vec<f64>) -> Self {
        levels.retain(|z| z.is_finite());
        levels.sort_by(|a, b| a.partial_cmp(b).expect("finite levels"));
        levels.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
        Self { levels }
    }

    /// The 11 floor levels of the reference building.
    pub fn reference() -> Self {
        Self::new(vec![
            -4.44, -1.56, 2.12, 5.48, 8.20, 13.32, 17.96, 22.12, 26.28, 29.64, 32.36,
        ])
    }

    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Topmost level (the roof), if any.
    pub fn top(&self) -> Option<f64> {
        self.levels.last().copied()
    }

    /// Matches a Z value to the nearest ladder level within `tolerance`.
    pub fn match_level(&self, z: f64, tolerance: f64) -> Option<f64> {
        let best = self
            .levels
            .iter()
            .copied()
            .min_by(|a, b| (a - z).abs().partial_cmp(&(b - z).abs()).unwrap())?;
        ((z - best).abs() <= tolerance).then_some(best)
    }

    /// Next ladder level strictly above `z` (with a small slack so a vertex
    /// sitting on a level does not match the level itself).
    pub fn next_above(&self, z: f64) -> Option<f64> {
        self.levels.iter().copied().find(|&fz| fz > z + 0.01)
    }

    /// Adjacent (bottom, top) level pairs, bottom-up.
    pub fn spans(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.levels.windows(2).map(|w| (w[0], w[1]))
    }
}
