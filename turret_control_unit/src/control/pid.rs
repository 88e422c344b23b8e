//! Discrete PID over a position error stream.
//!
//! One call per control tick, no time scaling: the integral is the running
//! sum of errors and the derivative is the difference between successive
//! errors. The output is never clamped here; the caller clamps it to the
//! actuator range (see [`super::output`]).
//!
//! The error sign is `position − setpoint`, so a positive effort pushes the
//! position down.

use serde::{Deserialize, Serialize};

/// PID gains.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PidGains {
    /// Proportional gain.
    pub kp: f64,
    /// Integral gain (0 = disabled).
    #[serde(default)]
    pub ki: f64,
    /// Derivative gain (0 = disabled).
    #[serde(default)]
    pub kd: f64,
}

impl PidGains {
    pub const fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self { kp, ki, kd }
    }

    /// Proportional-only gains.
    pub const fn p(kp: f64) -> Self {
        Self::new(kp, 0.0, 0.0)
    }
}

/// Dynamic PID state carried between ticks.
///
/// Must be reset (via [`PidState::reset`]) when a new motion phase starts.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PidState {
    /// Error from the latest call.
    pub error: f64,
    /// Running sum of every error seen since the last reset (no anti-windup).
    pub integral: f64,
    /// Error from the previous call.
    pub last_error: f64,
    /// Raw law output from the latest call.
    pub output: f64,
}

impl PidState {
    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Compute one PID step for `error` and fold it into `state`.
///
/// Returns the raw (unclamped) effort.
#[inline]
pub fn pid_compute(state: &mut PidState, gains: &PidGains, error: f64) -> f64 {
    state.error = error;
    state.integral += error;
    let derivative = error - state.last_error;
    state.last_error = error;

    state.output = gains.kp * error + gains.ki * state.integral + gains.kd * derivative;
    state.output
}

/// PID controller for one axis: gains, setpoint and state together.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PidController {
    gains: PidGains,
    setpoint: f64,
    state: PidState,
}

impl PidController {
    pub fn new(gains: PidGains) -> Self {
        Self {
            gains,
            setpoint: 0.0,
            state: PidState::default(),
        }
    }

    /// One control step at `position`. Returns the raw effort.
    #[inline]
    pub fn run(&mut self, position: f64) -> f64 {
        pid_compute(&mut self.state, &self.gains, position - self.setpoint)
    }

    /// Zero error, integral, last error and output. Gains and setpoint stay.
    pub fn reset(&mut self) {
        self.state.reset();
    }

    pub fn set_setpoint(&mut self, setpoint: f64) {
        self.setpoint = setpoint;
    }

    pub fn set_kp(&mut self, kp: f64) {
        self.gains.kp = kp;
    }

    pub fn set_ki(&mut self, ki: f64) {
        self.gains.ki = ki;
    }

    pub fn set_kd(&mut self, kd: f64) {
        self.gains.kd = kd;
    }

    pub fn set_gains(&mut self, gains: PidGains) {
        self.gains = gains;
    }

    #[inline]
    pub const fn setpoint(&self) -> f64 {
        self.setpoint
    }

    #[inline]
    pub const fn gains(&self) -> PidGains {
        self.gains
    }

    #[inline]
    pub const fn state(&self) -> PidState {
        self.state
    }

    /// Error from the latest step.
    #[inline]
    pub const fn error(&self) -> f64 {
        self.state.error
    }

    /// Raw effort from the latest step.
    #[inline]
    pub const fn output(&self) -> f64 {
        self.state.output
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
