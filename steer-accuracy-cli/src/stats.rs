//! Grouped running statistics
//!
//! Tallies tracking error per (speed group, angle bucket). Cells are created
//! on first write and only ever incremented.

use crate::speed_groups::SpeedGroup;
use std::collections::{BTreeMap, HashMap};

/// Where the actual angle ended up relative to the commanded one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Exact,
    Overshoot,
    Undershoot,
}

/// Running tally for one angle bucket
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatCell {
    pub error_sum: f64,
    pub count: u64,
    pub saturated_count: u64,
    pub exact_count: u64,
    pub overshoot_count: u64,
    pub undershoot_count: u64,
}

impl StatCell {
    fn record(&mut self, error: f64, saturated: bool, direction: Direction) {
        self.error_sum += error;
        self.count += 1;
        if saturated {
            self.saturated_count += 1;
        }
        match direction {
            Direction::Exact => self.exact_count += 1,
            Direction::Overshoot => self.overshoot_count += 1,
            Direction::Undershoot => self.undershoot_count += 1,
        }
    }

    /// Average absolute error in degrees
    pub fn mean_error(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.error_sum / self.count as f64
        }
    }

    pub fn exact_pct(&self) -> u64 {
        self.percent(self.exact_count)
    }

    pub fn overshoot_pct(&self) -> u64 {
        self.percent(self.overshoot_count)
    }

    pub fn undershoot_pct(&self) -> u64 {
        self.percent(self.undershoot_count)
    }

    // Truncating integer percentage
    fn percent(&self, part: u64) -> u64 {
        if self.count == 0 {
            0
        } else {
            part * 100 / self.count
        }
    }
}

/// Statistics for every speed group, keyed by angle bucket
#[derive(Debug, Default)]
pub struct StatAccumulator {
    groups: HashMap<SpeedGroup, BTreeMap<u32, StatCell>>,
}

impl StatAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one sample to a single cell
    pub fn record(
        &mut self,
        group: SpeedGroup,
        bucket: u32,
        error: f64,
        saturated: bool,
        direction: Direction,
    ) {
        self.groups
            .entry(group)
            .or_default()
            .entry(bucket)
            .or_default()
            .record(error, saturated, direction);
    }

    /// Buckets of a group, ascending by angle
    pub fn buckets(&self, group: SpeedGroup) -> impl Iterator<Item = (u32, &StatCell)> + '_ {
        self.groups
            .get(&group)
            .into_iter()
            .flat_map(|buckets| buckets.iter().map(|(angle, cell)| (*angle, cell)))
    }

    #[cfg(test)]
    pub fn cell(&self, group: SpeedGroup, bucket: u32) -> Option<&StatCell> {
        self.groups.get(&group)?.get(&bucket)
    }

    pub fn is_empty(&self, group: SpeedGroup) -> bool {
        self.groups.get(&group).map_or(true, |buckets| buckets.is_empty())
    }

    /// Samples recorded across all groups
    pub fn total_samples(&self) -> u64 {
        self.groups
            .values()
            .flat_map(|buckets| buckets.values())
            .map(|cell| cell.count)
            .sum()
    }
}
