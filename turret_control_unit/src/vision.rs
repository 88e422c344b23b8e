//! Vision root.
//!
//! Thermal frame → hot-spot centroid → angular offset → encoder setpoint.

pub mod aim;
pub mod centroid;
