//! Safety root.
//!
//! Motor stop on cancellation and on hardware faults.

pub mod stop;
