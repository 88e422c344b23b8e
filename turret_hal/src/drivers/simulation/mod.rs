//! Simulation driver module.
//!
//! Software stand-ins for the turret hardware: two motor/encoder axes, a
//! thermal scene and a firing servo. Everything is deterministic so control
//! sequences can be replayed exactly in tests.

mod driver;
mod physics;
mod servo;
mod thermal;

pub use driver::{SimulationConfig, SimulationRig};
pub use physics::{AxisPlantConfig, SimAxis};
pub use servo::{SERVO_HISTORY_LEN, SimServo};
pub use thermal::{HotSpot, SimThermalSensor, ThermalSceneConfig};
