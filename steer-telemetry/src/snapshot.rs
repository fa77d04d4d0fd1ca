//! Typed per-sample view over the latest topic values

use crate::types::{ControlLaw, LateralControlState, LateralState, Result, TelemetryError};

/// One heartbeat's worth of telemetry, projected for a control law
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<'a> {
    /// Ego speed in m/s
    pub speed: f64,
    /// Controller engaged
    pub active: bool,
    /// Vehicle stopped
    pub standstill: bool,
    /// Driver override on the steering wheel
    pub steering_pressed: bool,
    law: ControlLaw,
    lateral: &'a LateralControlState,
}

impl<'a> Snapshot<'a> {
    pub(crate) fn new(
        speed: f64,
        active: bool,
        standstill: bool,
        steering_pressed: bool,
        law: ControlLaw,
        lateral: &'a LateralControlState,
    ) -> Self {
        Self {
            speed,
            active,
            standstill,
            steering_pressed,
            law,
            lateral,
        }
    }

    /// Control law this snapshot reads angles from
    pub fn law(&self) -> ControlLaw {
        self.law
    }

    /// Angles and saturation of the selected lateral controller.
    ///
    /// Fails if `controlsState` carries no state for the selected law.
    pub fn controller(&self) -> Result<LateralState> {
        self.lateral
            .get(self.law)
            .copied()
            .ok_or(TelemetryError::MissingControlState(self.law))
    }
}
