//! Effort limiting and per-axis control state.
//!
//! The PID law is unbounded; this stage clamps the effort to the axis'
//! current phase limit before it reaches the motor drive.

use turret_common::consts::MAX_DUTY;
use turret_common::hal::driver::{AxisDriver, HalError};

use super::encoder::QuadratureTracker;
use super::pid::{PidController, PidGains};

/// Symmetric effort limit `[-max, max]` in duty percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffortLimit {
    max: f64,
}

impl EffortLimit {
    /// Limit clamped into `[0, 100]`. NaN becomes 0.
    pub fn new(max: f64) -> Self {
        let max = if max.is_nan() { 0.0 } else { max.clamp(0.0, MAX_DUTY) };
        Self { max }
    }

    pub const FULL: Self = Self { max: MAX_DUTY };

    #[inline]
    pub const fn max(&self) -> f64 {
        self.max
    }

    /// Clamp a raw effort into the limit. NaN maps to 0.
    #[inline]
    pub fn clamp(&self, effort: f64) -> f64 {
        if effort.is_nan() {
            return 0.0;
        }
        effort.clamp(-self.max, self.max)
    }
}

impl Default for EffortLimit {
    fn default() -> Self {
        Self::FULL
    }
}

/// Result of one closed-loop step on an axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisStep {
    /// Tracked position after the encoder update [ticks].
    pub position: i64,
    /// `position − setpoint` [ticks].
    pub error: f64,
    /// Raw PID output.
    pub raw_effort: f64,
    /// Effort actually commanded.
    pub applied: f64,
}

/// Everything one axis needs to close its loop: driver, tracker, PID, limit.
#[derive(Debug)]
pub struct AxisControl<D> {
    pub driver: D,
    pub tracker: QuadratureTracker,
    pub pid: PidController,
    pub limit: EffortLimit,
}

impl<D: AxisDriver> AxisControl<D> {
    /// Take ownership of the driver and start tracking from its current count.
    pub fn new(mut driver: D) -> Result<Self, HalError> {
        let tracker = QuadratureTracker::attach(&mut driver)?;
        Ok(Self {
            driver,
            tracker,
            pid: PidController::new(PidGains::default()),
            limit: EffortLimit::FULL,
        })
    }

    /// Load a phase: gains, limit and setpoint, with the PID accumulators
    /// cleared.
    pub fn configure(&mut self, gains: PidGains, limit: EffortLimit, setpoint: f64) {
        self.pid.set_gains(gains);
        self.pid.set_setpoint(setpoint);
        self.pid.reset();
        self.limit = limit;
    }

    /// Encoder sampling → PID → clamp → motor command.
    pub fn step(&mut self) -> Result<AxisStep, HalError> {
        let position = self.tracker.tick(&mut self.driver)?;
        let raw_effort = self.pid.run(position as f64);
        let applied = self.limit.clamp(raw_effort);
        self.driver.set_duty(applied)?;
        Ok(AxisStep {
            position,
            error: self.pid.error(),
            raw_effort,
            applied,
        })
    }

    /// De-energise the motor.
    #[inline]
    pub fn halt(&mut self) -> Result<(), HalError> {
        self.driver.set_duty(0.0)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
