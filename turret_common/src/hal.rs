//! Hardware abstraction layer.
//!
//! Driver traits the control unit is written against, plus pure helpers that
//! describe how commands map onto the motor shield and the firing servo.

pub mod driver;
pub mod types;
