//! Sequencer state enum and per-axis containers.
//!
//! `TurretState` uses `#[repr(u8)]`; its code follows the sequence order. `AxisPair` carries any per-axis quantity for the two axes.

use serde::{Deserialize, Serialize};

/// Firing sequence state.
///
/// Exactly one instance exists per run, advanced only by the sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TurretState {
    /// Drive to the calibration pose.
    Init = 0,
    /// Settle, capture a frame, look for a target.
    Acquire = 1,
    /// Drive to the target setpoints.
    Aim = 2,
    /// Servo sweep and post-fire hold.
    Fire = 3,
    /// Drive back to the calibration pose.
    Reset = 4,
    /// Reload delay.
    Pause = 5,
}

impl Default for TurretState {
    fn default() -> Self {
        Self::Init
    }
}

impl std::fmt::Display for TurretState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Init => "INIT",
            Self::Acquire => "ACQUIRE",
            Self::Aim => "AIM",
            Self::Fire => "FIRE",
            Self::Reset => "RESET",
            Self::Pause => "PAUSE",
        };
        f.write_str(name)
    }
}

/// Rotational degree of freedom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Yaw,
    Pitch,
}

impl Axis {
    /// Fixed per-tick update order.
    pub const ORDER: [Axis; 2] = [Axis::Yaw, Axis::Pitch];
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Yaw => f.write_str("yaw"),
            Self::Pitch => f.write_str("pitch"),
        }
    }
}

/// One value per axis.
///
/// Deserialising fills a missing axis from `T::default()`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, bound(deserialize = "T: Deserialize<'de> + Default"))]
pub struct AxisPair<T> {
    pub yaw: T,
    pub pitch: T,
}

impl<T> AxisPair<T> {
    pub const fn new(yaw: T, pitch: T) -> Self {
        Self { yaw, pitch }
    }

    #[inline]
    pub fn get(&self, axis: Axis) -> &T {
        match axis {
            Axis::Yaw => &self.yaw,
            Axis::Pitch => &self.pitch,
        }
    }

    #[inline]
    pub fn get_mut(&mut self, axis: Axis) -> &mut T {
        match axis {
            Axis::Yaw => &mut self.yaw,
            Axis::Pitch => &mut self.pitch,
        }
    }

    /// Apply `f` to both values, yaw first.
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> AxisPair<U> {
        let yaw = f(self.yaw);
        let pitch = f(self.pitch);
        AxisPair { yaw, pitch }
    }
}

impl<T: Copy> AxisPair<T> {
    /// Same value on both axes.
    pub const fn splat(value: T) -> Self {
        Self {
            yaw: value,
            pitch: value,
        }
    }
}

impl<T: Copy + std::ops::Neg<Output = T>> std::ops::Neg for AxisPair<T> {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            yaw: -self.yaw,
            pitch: -self.pitch,
        }
    }
}
