//! System-wide constants for the turret workspace.
//!
//! Single source of truth for frame geometry and counter limits.
//! Imported by all crates; do not duplicate them elsewhere.

use static_assertions::const_assert_eq;

/// Thermal sensor columns.
pub const FRAME_WIDTH: usize = 32;

/// Thermal sensor rows.
pub const FRAME_HEIGHT: usize = 24;

/// Samples per thermal frame (row-major, top-left origin).
pub const FRAME_PIXELS: usize = 768;

const_assert_eq!(FRAME_PIXELS, FRAME_WIDTH * FRAME_HEIGHT);

/// Modulus of the 16-bit hardware quadrature counter.
pub const COUNTER_MODULUS: i32 = 65_536;

/// Largest per-update move the wrap correction can resolve.
pub const COUNTER_HALF_RANGE: i32 = 32_768;

const_assert_eq!(COUNTER_HALF_RANGE * 2, COUNTER_MODULUS);
const_assert_eq!(COUNTER_MODULUS, u16::MAX as i32 + 1);

/// Motor duty command limit [%]. 0 de-energises the drive.
pub const MAX_DUTY: f64 = 100.0;

/// Default control tick period [ms].
pub const DEFAULT_TICK_PERIOD_MS: u64 = 20;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "config/turret.toml";
