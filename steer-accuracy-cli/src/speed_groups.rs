//! Speed band table
//!
//! Six fixed bands, ordered from the highest threshold down so the first
//! match is the fastest band a speed qualifies for.

use std::fmt;
use std::str::FromStr;

/// A named vehicle speed band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SpeedGroup {
    Germany,
    VeryFast,
    Fast,
    Medium,
    Slow,
    Crawl,
}

impl SpeedGroup {
    /// All groups, highest threshold first
    pub const ALL: [SpeedGroup; 6] = [
        SpeedGroup::Germany,
        SpeedGroup::VeryFast,
        SpeedGroup::Fast,
        SpeedGroup::Medium,
        SpeedGroup::Slow,
        SpeedGroup::Crawl,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SpeedGroup::Germany => "germany",
            SpeedGroup::VeryFast => "veryfast",
            SpeedGroup::Fast => "fast",
            SpeedGroup::Medium => "medium",
            SpeedGroup::Slow => "slow",
            SpeedGroup::Crawl => "crawl",
        }
    }

    /// Speed (m/s) that must be exceeded to fall into this band
    pub fn min_speed_mps(&self) -> f64 {
        match self {
            SpeedGroup::Germany => 45.0,
            SpeedGroup::VeryFast => 35.0,
            SpeedGroup::Fast => 25.0,
            SpeedGroup::Medium => 15.0,
            SpeedGroup::Slow => 5.0,
            SpeedGroup::Crawl => 0.0,
        }
    }

    /// Band description in m/s, mph and km/h
    pub fn label(&self) -> &'static str {
        match self {
            SpeedGroup::Germany => "45 - up m/s  |  101 -  up mph  |  162 -  up km/h",
            SpeedGroup::VeryFast => "35 - 45 m/s  |   78 - 101 mph  |  126 - 162 km/h",
            SpeedGroup::Fast => "25 - 35 m/s  |   56 -  78 mph  |   90 - 126 km/h",
            SpeedGroup::Medium => "15 - 25 m/s  |   34 -  56 mph  |   54 -  90 km/h",
            SpeedGroup::Slow => " 5 - 15 m/s  |   11 -  34 mph  |   18 -  54 km/h",
            SpeedGroup::Crawl => " 0 -  5 m/s  |    0 -  11 mph  |    0 -  18 km/h",
        }
    }

    /// Highest band whose threshold `speed` strictly exceeds
    pub fn first_match(speed: f64) -> Option<SpeedGroup> {
        SpeedGroup::ALL
            .into_iter()
            .find(|group| speed > group.min_speed_mps())
    }
}

impl fmt::Display for SpeedGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for an unknown `--group` value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid speed group '{0}', expected one of [crawl|slow|medium|fast|veryfast|germany|all]")]
pub struct UnknownSpeedGroup(pub String);

impl FromStr for SpeedGroup {
    type Err = UnknownSpeedGroup;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SpeedGroup::ALL
            .into_iter()
            .find(|group| group.name() == s)
            .ok_or_else(|| UnknownSpeedGroup(s.to_string()))
    }
}

/// Which groups the display shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupSelection {
    All,
    Only(SpeedGroup),
}

impl GroupSelection {
    /// Selected groups in display order
    pub fn groups(&self) -> Vec<SpeedGroup> {
        match self {
            GroupSelection::All => SpeedGroup::ALL.to_vec(),
            GroupSelection::Only(group) => vec![*group],
        }
    }
}

impl FromStr for GroupSelection {
    type Err = UnknownSpeedGroup;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            Ok(GroupSelection::All)
        } else {
            s.parse().map(GroupSelection::Only)
        }
    }
}
