//! Physics simulation module.
//!
//! DC gear-motor plant with a wrapping 16-bit quadrature counter.

mod axis;

pub use axis::{AxisPlantConfig, SimAxis};
