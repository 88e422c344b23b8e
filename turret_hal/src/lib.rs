//! # Turret HAL Library
//!
//! Driver implementations for the hardware traits defined in
//! `turret_common::hal::driver`.
//!
//! # Module Structure
//!
//! - [`drivers`] - HAL driver implementations
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                   turret_hal (single crate)                    │
//! │                                                                │
//! │   SimulationRig ──► SimAxis (yaw)    : AxisDriver              │
//! │                 ──► SimAxis (pitch)  : AxisDriver              │
//! │                 ──► SimThermalSensor : ThermalSensor           │
//! │                 ──► SimServo         : FiringServo             │
//! └────────────────────────────────────────────────────────────────┘
//! ```

#![deny(missing_docs)]

pub mod drivers;

// Re-export key types for convenience
pub use crate::drivers::simulation::{
    AxisPlantConfig, HotSpot, SERVO_HISTORY_LEN, SimAxis, SimServo, SimThermalSensor,
    SimulationConfig, SimulationRig, ThermalSceneConfig,
};
