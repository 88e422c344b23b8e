//! Controller error types and fault bookkeeping.
//!
//! A sensor miss is not an error (the locator returns `None`). Every
//! hardware failure is fatal: the motors are stopped and the error leaves
//! `run_step` as [`TurretError::Hal`].

use bitflags::bitflags;
use thiserror::Error;

use turret_common::config::ConfigError;
use turret_common::hal::driver::HalError;

/// Top-level controller error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TurretError {
    #[error(transparent)]
    Hal(#[from] HalError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

bitflags! {
    /// Devices that have reported a failure since start-up.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FaultFlags: u8 {
        const ENCODER = 1 << 0;
        const MOTOR   = 1 << 1;
        const SENSOR  = 1 << 2;
        const SERVO   = 1 << 3;
        /// Bus-level failure with no single device to blame.
        const BUS     = 1 << 4;
    }
}

impl FaultFlags {
    /// Device class responsible for `err`.
    pub fn from_hal(err: &HalError) -> Self {
        match err {
            HalError::Encoder(_) => Self::ENCODER,
            HalError::Motor(_) => Self::MOTOR,
            HalError::Sensor(_) => Self::SENSOR,
            HalError::Servo(_) => Self::SERVO,
            HalError::Communication(_) => Self::BUS,
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
