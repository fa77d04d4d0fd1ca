//! Sample classification
//!
//! Turns one countable sample into an error value, an angle bucket and a
//! direction, and files it under the fastest speed group it qualifies for.

use crate::speed_groups::SpeedGroup;
use crate::stats::{Direction, StatAccumulator};
use steer_telemetry::{LateralState, Snapshot};

/// Inputs the classifier needs from one snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub speed: f64,
    pub desired_angle: f64,
    pub actual_angle: f64,
    pub saturated: bool,
}

impl Sample {
    pub fn from_snapshot(snapshot: &Snapshot<'_>, controller: &LateralState) -> Self {
        Self {
            speed: snapshot.speed,
            desired_angle: controller.steering_angle_desired_deg,
            actual_angle: controller.steering_angle_deg,
            saturated: controller.saturated,
        }
    }
}

/// How a sample was filed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    /// None when the speed does not exceed any threshold
    pub group: Option<SpeedGroup>,
    pub bucket: u32,
    /// Absolute error, rounded to 2 decimals
    pub error: f64,
    pub direction: Direction,
}

/// Round to `decimals` places, ties to even on the exact binary value
fn round_to(value: f64, decimals: usize) -> f64 {
    format!("{:.*}", decimals, value).parse().unwrap_or(value)
}

/// Classify a sample without recording it
pub fn classify(sample: &Sample) -> Classification {
    // Error is taken before rounding the angles
    let error = round_to((sample.desired_angle - sample.actual_angle).abs(), 2);
    let actual = round_to(sample.actual_angle, 1);
    let desired = round_to(sample.desired_angle, 1);
    let bucket = desired.round_ties_even().abs() as u32;

    let direction = if actual == desired {
        Direction::Exact
    } else if desired == 0.0 {
        // Any motion away from a zero target is overshoot
        Direction::Overshoot
    } else if (desired > 0.0 && actual > desired) || (desired < 0.0 && actual < desired) {
        Direction::Overshoot
    } else {
        Direction::Undershoot
    };

    Classification {
        group: SpeedGroup::first_match(sample.speed),
        bucket,
        error,
        direction,
    }
}

/// Classify a sample and add it to exactly one cell (or none)
pub fn record(accumulator: &mut StatAccumulator, sample: &Sample) -> Classification {
    let classification = classify(sample);
    match classification.group {
        Some(group) => accumulator.record(
            group,
            classification.bucket,
            classification.error,
            sample.saturated,
            classification.direction,
        ),
        None => log::trace!("Speed {:.2} m/s below every group, sample dropped", sample.speed),
    }
    classification
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(desired: f64, actual: f64) -> Sample {
        Sample {
            speed: 20.0,
            desired_angle: desired,
            actual_angle: actual,
            saturated: false,
        }
    }

    #[test]
    fn test_direction_table() {
        let cases = [
            (10.0, 10.0, Direction::Exact),
            (10.0, 12.0, Direction::Overshoot),
            (10.0, 8.0, Direction::Undershoot),
            (0.0, 0.3, Direction::Overshoot),
            (0.0, -0.3, Direction::Overshoot),
            (-10.0, -12.0, Direction::Overshoot),
            (-10.0, -8.0, Direction::Undershoot),
            (10.0, 10.04, Direction::Exact),
        ];

        for (desired, actual, expected) in cases {
            assert_eq!(
                classify(&sample(desired, actual)).direction,
                expected,
                "desired={} actual={}",
                desired,
                actual
            );
        }
    }

    #[test]
    fn test_error_and_bucket() {
        let c = classify(&sample(-7.64, -7.2));
        assert!((c.error - 0.44).abs() < 1e-9);
        assert_eq!(c.bucket, 8);

        let c = classify(&sample(0.2, 0.2));
        assert_eq!(c.bucket, 0);
        assert_eq!(c.error, 0.0);
    }

    #[test]
    fn test_ties_round_to_even() {
        // (desired, actual, bucket, error, direction)
        let cases = [
            (2.5, 2.5, 2, 0.0, Direction::Exact),
            (-0.5, 0.0, 0, 0.5, Direction::Undershoot),
            (0.5, 0.3, 0, 0.2, Direction::Undershoot),
            (6.54, 6.5, 6, 0.04, Direction::Exact),
            (0.25, 0.3, 0, 0.05, Direction::Overshoot),
            (0.125, 0.0, 0, 0.12, Direction::Undershoot),
            (-2.5, -2.45, 2, 0.05, Direction::Exact),
            (1.35, 1.3, 1, 0.05, Direction::Undershoot),
        ];

        for (desired, actual, bucket, error, direction) in cases {
            let c = classify(&sample(desired, actual));
            let context = format!("desired={} actual={}", desired, actual);
            assert_eq!(c.bucket, bucket, "bucket for {}", context);
            assert!((c.error - error).abs() < 1e-12, "error {} for {}", c.error, context);
            assert_eq!(c.direction, direction, "direction for {}", context);
        }
    }

    #[test]
    fn test_round_to_matches_decimal_rounding() {
        assert_eq!(round_to(0.25, 1), 0.2);
        assert_eq!(round_to(0.35, 1), 0.3);
        assert_eq!(round_to(0.125, 2), 0.12);
        assert_eq!(round_to(2.675, 2), 2.67);
        assert_eq!(round_to(-7.64, 1), -7.6);
    }

    #[test]
    fn test_single_group_assignment() {
        let mut acc = StatAccumulator::new();
        let s = Sample {
            speed: 50.0,
            desired_angle: 5.0,
            actual_angle: 5.0,
            saturated: true,
        };

        let c = record(&mut acc, &s);
        assert_eq!(c.group, Some(SpeedGroup::Germany));

        let cell = acc.cell(SpeedGroup::Germany, 5).unwrap();
        assert_eq!(cell.count, 1);
        assert_eq!(cell.saturated_count, 1);
        for group in &SpeedGroup::ALL[1..] {
            assert!(acc.is_empty(*group), "{} should be empty", group);
        }
    }

    #[test]
    fn test_no_qualifying_group() {
        let mut acc = StatAccumulator::new();
        let s = Sample {
            speed: 0.0,
            ..sample(3.0, 2.0)
        };
        assert_eq!(record(&mut acc, &s).group, None);
        assert_eq!(acc.total_samples(), 0);
    }
}
