//! Control engine root.
//!
//! Per-axis position loop: encoder tracking → PID → effort clamp.
//! Integral and derivative action are disabled by setting their gains to zero.

pub mod encoder;
pub mod output;
pub mod pid;
