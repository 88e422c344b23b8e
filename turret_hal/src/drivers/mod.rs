//! HAL driver implementations.
//!
//! - [`simulation`] - Software simulation drivers for development and testing
//!
//! # Adding New Drivers
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement `AxisDriver`, `ThermalSensor` and `FiringServo` from
//!    `turret_common::hal::driver`
//! 3. Add export and documentation

pub mod simulation;
