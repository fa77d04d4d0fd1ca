//! Core types for the telemetry bus client
//!
//! This module defines the typed topic messages the subscriber deserializes,
//! the control law selector, and the library error type. The client is
//! stateless with respect to statistics - it only exposes the latest value
//! of each subscribed topic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Timestamp type used throughout the client
pub type Timestamp = DateTime<Utc>;

/// Result type for bus client operations
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Errors that can occur while subscribing to the telemetry bus
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Frame of {size} bytes exceeds limit of {limit} bytes")]
    FrameTooLarge { size: usize, limit: usize },

    #[error("Failed to decode {topic} message: {source}")]
    DecodeError {
        topic: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(#[source] serde_json::Error),

    #[error("controlsState has no {0} lateral state")]
    MissingControlState(ControlLaw),

    #[error("Unsupported endpoint: {0}")]
    UnsupportedEndpoint(String),
}

/// Error returned when parsing an unknown control law name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid lateral control type '{0}', expected one of [pid|indi|lqr|angle]")]
pub struct UnknownControlLaw(pub String);

/// Lateral control law variants the controller can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlLaw {
    Pid,
    Indi,
    Lqr,
    Angle,
}

impl ControlLaw {
    /// All supported control laws
    pub const ALL: [ControlLaw; 4] = [
        ControlLaw::Pid,
        ControlLaw::Indi,
        ControlLaw::Lqr,
        ControlLaw::Angle,
    ];

    /// Name used on the command line
    pub fn name(&self) -> &'static str {
        match self {
            ControlLaw::Pid => "pid",
            ControlLaw::Indi => "indi",
            ControlLaw::Lqr => "lqr",
            ControlLaw::Angle => "angle",
        }
    }
}

impl fmt::Display for ControlLaw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ControlLaw {
    type Err = UnknownControlLaw;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ControlLaw::ALL
            .into_iter()
            .find(|law| law.name() == s)
            .ok_or_else(|| UnknownControlLaw(s.to_string()))
    }
}

/// Topic names the monitor subscribes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    CarState,
    CarControl,
    ControlsState,
}

impl Topic {
    /// All subscribed topics
    pub const ALL: [Topic; 3] = [Topic::CarState, Topic::CarControl, Topic::ControlsState];

    /// Wire name of the topic
    pub fn name(&self) -> &'static str {
        match self {
            Topic::CarState => "carState",
            Topic::CarControl => "carControl",
            Topic::ControlsState => "controlsState",
        }
    }

    /// Look up a topic by its wire name
    pub fn from_name(name: &str) -> Option<Topic> {
        Topic::ALL.into_iter().find(|t| t.name() == name)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Vehicle state published by the car interface
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarState {
    /// Ego speed in m/s
    pub v_ego: f64,
    /// True when the vehicle is stopped
    pub standstill: bool,
    /// True when the driver is applying torque to the wheel
    pub steering_pressed: bool,
}

/// Control output - only used as a rate-limiting heartbeat
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarControl {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub lat_active: bool,
}

/// Controller internal state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlsState {
    /// True when the controller is engaged
    pub active: bool,
    pub lateral_control_state: LateralControlState,
}

/// Per control law lateral state; only the running law is populated
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LateralControlState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid_state: Option<LateralState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indi_state: Option<LateralState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lqr_state: Option<LateralState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle_state: Option<LateralState>,
}

impl LateralControlState {
    /// Select the state for a control law
    pub fn get(&self, law: ControlLaw) -> Option<&LateralState> {
        match law {
            ControlLaw::Pid => self.pid_state.as_ref(),
            ControlLaw::Indi => self.indi_state.as_ref(),
            ControlLaw::Lqr => self.lqr_state.as_ref(),
            ControlLaw::Angle => self.angle_state.as_ref(),
        }
    }
}

/// Steering angles reported by a lateral controller
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LateralState {
    pub steering_angle_deg: f64,
    pub steering_angle_desired_deg: f64,
    /// Output hit an actuation limit
    pub saturated: bool,
}

/// A decoded bus message
#[derive(Debug, Clone, PartialEq)]
pub enum TopicMessage {
    CarState(CarState),
    CarControl(CarControl),
    ControlsState(ControlsState),
}

impl TopicMessage {
    /// Topic this message was published on
    pub fn topic(&self) -> Topic {
        match self {
            TopicMessage::CarState(_) => Topic::CarState,
            TopicMessage::CarControl(_) => Topic::CarControl,
            TopicMessage::ControlsState(_) => Topic::ControlsState,
        }
    }
}

/// Convert a monotonic log time in nanoseconds to a timestamp
pub fn timestamp_from_nanos(nanos: u64) -> Timestamp {
    let secs = (nanos / 1_000_000_000) as i64;
    let nsecs = (nanos % 1_000_000_000) as u32;
    DateTime::from_timestamp(secs, nsecs).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_law_parsing() {
        assert_eq!("pid".parse::<ControlLaw>(), Ok(ControlLaw::Pid));
        assert_eq!("angle".parse::<ControlLaw>(), Ok(ControlLaw::Angle));
        assert_eq!(
            "torque".parse::<ControlLaw>(),
            Err(UnknownControlLaw("torque".to_string()))
        );
        assert!("PID".parse::<ControlLaw>().is_err());
    }

    #[test]
    fn test_lateral_state_selection() {
        let lateral: LateralControlState = serde_json::from_str(
            r#"{"lqrState": {"steeringAngleDeg": 1.5, "steeringAngleDesiredDeg": 2.0, "saturated": true}}"#,
        )
        .unwrap();

        assert!(lateral.get(ControlLaw::Pid).is_none());
        let lqr = lateral.get(ControlLaw::Lqr).unwrap();
        assert_eq!(lqr.steering_angle_deg, 1.5);
        assert_eq!(lqr.steering_angle_desired_deg, 2.0);
        assert!(lqr.saturated);
    }

    #[test]
    fn test_car_state_requires_fields() {
        let result: std::result::Result<CarState, _> =
            serde_json::from_str(r#"{"vEgo": 10.0, "standstill": false}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_timestamp_from_nanos() {
        let ts = timestamp_from_nanos(1_500_000_000);
        assert_eq!(ts.timestamp(), 1);
        assert_eq!(ts.timestamp_subsec_nanos(), 500_000_000);
    }
}
