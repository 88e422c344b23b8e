//! Turret Common Library
//!
//! Shared constants, frame and state types, hardware driver traits, and
//! configuration loading utilities for all turret workspace crates.
//!
//! # Module Structure
//!
//! - [`consts`] - Frame geometry and encoder constants
//! - [`frame`] - Fixed-size thermal frame
//! - [`state`] - Sequencer state enum and per-axis pairs
//! - [`hal`] - Hardware driver traits and pure driver helpers
//! - [`config`] - Configuration loading traits and types
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use turret_common::prelude::*;
//!
//! let frame = ThermalFrame::uniform(0);
//! assert_eq!(frame.as_slice().len(), FRAME_PIXELS);
//! ```

pub mod config;
pub mod consts;
pub mod frame;
pub mod hal;
pub mod prelude;
pub mod state;
