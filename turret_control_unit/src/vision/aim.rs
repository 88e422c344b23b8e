//! Angular aim offsets and their conversion to encoder setpoints.

use serde::{Deserialize, Serialize};

/// Camera field of view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldOfView {
    /// Horizontal view angle across 32 columns [deg].
    pub width_degrees: f64,
    /// Vertical view angle across 24 rows [deg].
    pub height_degrees: f64,
}

impl FieldOfView {
    pub const fn new(width_degrees: f64, height_degrees: f64) -> Self {
        Self {
            width_degrees,
            height_degrees,
        }
    }
}

impl Default for FieldOfView {
    fn default() -> Self {
        Self::new(55.0, 35.0)
    }
}

/// Angular offset of the target from the boresight [deg].
///
/// Positive yaw is to the right of centre, positive pitch above centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimAngles {
    pub yaw_degrees: f64,
    pub pitch_degrees: f64,
}

/// Geometry linking an axis angle to encoder ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisMount {
    /// Encoder ticks per output revolution.
    pub ticks_per_rev: f64,
    /// Fixed camera → barrel correction [ticks], subtracted from the setpoint.
    pub mount_offset: i64,
}

impl AxisMount {
    pub const fn new(ticks_per_rev: f64, mount_offset: i64) -> Self {
        Self {
            ticks_per_rev,
            mount_offset,
        }
    }

    /// Relative setpoint for `degrees`: `round(deg · tpr / 360) − offset`.
    ///
    /// Halfway cases round to even.
    #[inline]
    pub fn setpoint_ticks(&self, degrees: f64) -> i64 {
        (degrees * self.ticks_per_rev / 360.0).round_ties_even() as i64 - self.mount_offset
    }
}
