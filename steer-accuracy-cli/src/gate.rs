//! Engagement gate
//!
//! Samples only count once the controller has been engaged, moving, and
//! free of driver override for a settle period. Any disqualifying sample
//! restarts the settle period.

use std::fmt;

/// Settle period in samples (about 5 s at 100 Hz)
pub const DEFAULT_SETTLE_SAMPLES: u32 = 500;

/// Why samples are not being collected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisableReason {
    NotActive,
    Standstill,
    SteerOverride,
}

impl fmt::Display for DisableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisableReason::NotActive => write!(f, "not active"),
            DisableReason::Standstill => write!(f, "standstill"),
            DisableReason::SteerOverride => write!(f, "steer override"),
        }
    }
}

/// Gate state after the most recent sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Disabled(DisableReason),
    /// Engaged, waiting out the settle period
    Settling { samples: u32, required: u32 },
    Collecting,
}

/// Debounces engagement before samples are trusted
#[derive(Debug)]
pub struct EngagementGate {
    settle_samples: u32,
    consecutive: u32,
    state: GateState,
}

impl EngagementGate {
    pub fn new(settle_samples: u32) -> Self {
        Self {
            settle_samples,
            consecutive: 0,
            state: GateState::Disabled(DisableReason::NotActive),
        }
    }

    /// Feed one sample; returns true if it should be counted
    pub fn update(&mut self, active: bool, standstill: bool, steering_pressed: bool) -> bool {
        let reason = if !active {
            Some(DisableReason::NotActive)
        } else if standstill {
            Some(DisableReason::Standstill)
        } else if steering_pressed {
            Some(DisableReason::SteerOverride)
        } else {
            None
        };

        if let Some(reason) = reason {
            if self.consecutive > 0 {
                log::debug!("Gate reset after {} samples: {}", self.consecutive, reason);
            }
            self.consecutive = 0;
            self.state = GateState::Disabled(reason);
            return false;
        }

        self.consecutive = self.consecutive.saturating_add(1);
        if self.consecutive >= self.settle_samples {
            if self.state != GateState::Collecting {
                log::debug!("Gate settled after {} samples", self.consecutive);
            }
            self.state = GateState::Collecting;
            true
        } else {
            self.state = GateState::Settling {
                samples: self.consecutive,
                required: self.settle_samples,
            };
            false
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    /// Qualifying samples since the last reset
    #[cfg(test)]
    pub fn consecutive(&self) -> u32 {
        self.consecutive
    }
}

impl Default for EngagementGate {
    fn default() -> Self {
        Self::new(DEFAULT_SETTLE_SAMPLES)
    }
}
