//! # Turret Control Unit Library
//!
//! Closed-loop aiming controller for a two-axis thermal turret. Each control
//! tick reads both quadrature encoders, runs one PID step per axis and
//! drives the motors; a thermal frame is turned into an angular setpoint and
//! a state machine sequences calibration, acquisition, aiming and firing.
//!
//! ## Layers
//!
//! 1. **control**: wrap-safe encoder tracking, PID law, effort clamp
//! 2. **vision**: background-subtracted centroid, pixel → angle → ticks
//! 3. **state**: `TurretStateMachine` with resumable motion phases
//! 4. **cycle**: fixed-period pacing and cycle statistics
//!
//! ## Single Thread
//!
//! Everything runs on one thread. Cancellation is a shared `AtomicBool`
//! polled at the top of every tick.

pub mod config;
pub mod control;
pub mod cycle;
pub mod error;
pub mod safety;
pub mod state;
pub mod vision;
