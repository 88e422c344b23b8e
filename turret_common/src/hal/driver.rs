//! HAL driver traits and error types.
//!
//! This module defines:
//! - `HalError` enum - Error types for hardware operations
//! - `AxisDriver` trait - Quadrature counter + motor drive for one axis
//! - `ThermalSensor` trait - Synchronous 32×24 frame capture
//! - `FiringServo` trait - Absolute-position servo for the trigger
//!
//! The control unit owns one `AxisDriver` per axis and never shares a driver
//! between two code paths.
//!
//! # Timing Contracts
//!
//! | Operation | Max Duration | RT Constraint |
//! |-----------|--------------|---------------|
//! | `read_counter()` | µs | **HARD** |
//! | `set_duty()` | µs | **HARD** |
//! | `capture()` | one sensor refresh | Soft (may block on readiness) |
//! | `set_position()` | µs | **HARD** |

use thiserror::Error;

use crate::frame::ThermalFrame;

/// Error types for hardware operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HalError {
    /// Quadrature counter could not be read or reset
    #[error("Encoder error: {0}")]
    Encoder(String),

    /// Motor drive rejected a duty command
    #[error("Motor drive error: {0}")]
    Motor(String),

    /// Thermal sensor did not deliver a frame
    #[error("Thermal sensor error: {0}")]
    Sensor(String),

    /// Servo rejected a position command
    #[error("Servo error: {0}")]
    Servo(String),

    /// Bus-level communication failure
    #[error("Hardware communication error: {0}")]
    Communication(String),
}

/// One rotational axis: free-running quadrature counter plus motor drive.
pub trait AxisDriver {
    /// Returns the driver's identifier (e.g., "simulation").
    fn name(&self) -> &'static str;

    /// Read the wrapping 16-bit hardware counter.
    fn read_counter(&mut self) -> Result<u16, HalError>;

    /// Reset the hardware counter to zero.
    fn reset_counter(&mut self) -> Result<(), HalError>;

    /// Command a signed duty in `[-100, 100]`.
    ///
    /// 0 de-energises the drive; the sign selects direction.
    fn set_duty(&mut self, duty: f64) -> Result<(), HalError>;
}

/// Thermal imaging sensor producing one 768-sample frame per capture.
pub trait ThermalSensor {
    fn name(&self) -> &'static str;

    /// Capture one complete frame. May block briefly while the sensor
    /// finishes a refresh.
    fn capture(&mut self) -> Result<ThermalFrame, HalError>;
}

/// Firing actuator: holds an absolute angular position.
pub trait FiringServo {
    fn name(&self) -> &'static str;

    /// Move to `degrees` and hold.
    fn set_position(&mut self, degrees: f64) -> Result<(), HalError>;
}
