//! Simulated firing servo.

use tracing::debug;

use turret_common::hal::driver::{FiringServo, HalError};
use turret_common::hal::types::servo_pulse_percent;

/// Number of recent positions kept by [`SimServo::history`].
pub const SERVO_HISTORY_LEN: usize = 64;

/// Servo that records recent commanded positions.
#[derive(Debug, Clone, Default)]
pub struct SimServo {
    position: Option<f64>,
    history: Vec<f64>,
    moves: u64,
    fail_moves: u32,
}

impl SimServo {
    /// Servo with no position commanded yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Last commanded position [deg].
    pub fn position(&self) -> Option<f64> {
        self.position
    }

    /// The last [`SERVO_HISTORY_LEN`] commanded positions, oldest first [deg].
    pub fn history(&self) -> &[f64] {
        &self.history
    }

    /// Successful position commands since creation.
    pub fn moves(&self) -> u64 {
        self.moves
    }

    /// PWM duty [%] for the current position.
    pub fn pulse_percent(&self) -> Option<f64> {
        self.position.map(servo_pulse_percent)
    }

    /// Fail the next `n` position commands.
    pub fn fail_next_moves(&mut self, n: u32) {
        self.fail_moves = n;
    }
}

impl FiringServo for SimServo {
    fn name(&self) -> &'static str {
        "simulation"
    }

    fn set_position(&mut self, degrees: f64) -> Result<(), HalError> {
        if self.fail_moves > 0 {
            self.fail_moves -= 1;
            return Err(HalError::Servo("simulated servo stall".to_string()));
        }
        debug!(
            "Servo -> {:.1}° (pulse {:.3}%)",
            degrees,
            servo_pulse_percent(degrees)
        );
        self.position = Some(degrees);
        if self.history.len() == SERVO_HISTORY_LEN {
            self.history.remove(0);
        }
        self.history.push(degrees);
        self.moves += 1;
        Ok(())
    }
}
