//! Prelude module for common re-exports.
//!
//! ```rust
//! use turret_common::prelude::*;
//! ```

// ─── Logging ────────────────────────────────────────────────────────
pub use crate::config::{LogLevel, LoggingConfig};

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{FRAME_HEIGHT, FRAME_PIXELS, FRAME_WIDTH, MAX_DUTY};

// ─── Frames & State ─────────────────────────────────────────────────
pub use crate::frame::{FrameSizeError, ThermalFrame};
pub use crate::state::{Axis, AxisPair, TurretState};

// ─── Hardware ───────────────────────────────────────────────────────
pub use crate::hal::driver::{AxisDriver, FiringServo, HalError, ThermalSensor};
pub use crate::hal::types::{HBridgeCommand, servo_pulse_percent};
