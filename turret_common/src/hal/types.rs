//! Pure command mappings for the motor shield and the firing servo.
//!
//! - `HBridgeCommand` - signed duty → enable pin + two PWM channels
//! - `servo_pulse_percent` - servo angle → 50 Hz PWM duty

use crate::consts::MAX_DUTY;

/// PWM frequency of the hobby servo [Hz].
pub const SERVO_PWM_HZ: f64 = 50.0;

/// Pulse width at 0° [ms].
pub const SERVO_MIN_PULSE_MS: f64 = 0.5;

/// Pulse width span over 180° [ms].
pub const SERVO_PULSE_SPAN_MS: f64 = 1.5;

/// Pin-level command for one H-bridge channel pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HBridgeCommand {
    /// Enable pin state.
    pub enable: bool,
    /// Channel A pulse width [%] (reverse).
    pub channel_a: f64,
    /// Channel B pulse width [%] (forward).
    pub channel_b: f64,
}

impl HBridgeCommand {
    /// Map a signed duty onto the bridge. Duty is clamped to `[-100, 100]`.
    ///
    /// Positive drives channel B, negative drives channel A with the
    /// magnitude, zero pulls enable low with both channels idle.
    pub fn from_duty(level: f64) -> Self {
        let level = if level.is_nan() {
            0.0
        } else {
            level.clamp(-MAX_DUTY, MAX_DUTY)
        };
        if level > 0.0 {
            Self {
                enable: true,
                channel_a: 0.0,
                channel_b: level,
            }
        } else if level < 0.0 {
            Self {
                enable: true,
                channel_a: -level,
                channel_b: 0.0,
            }
        } else {
            Self::OFF
        }
    }

    pub const OFF: Self = Self {
        enable: false,
        channel_a: 0.0,
        channel_b: 0.0,
    };

    /// Signed duty this command represents.
    #[inline]
    pub fn duty(&self) -> f64 {
        if self.enable {
            self.channel_b - self.channel_a
        } else {
            0.0
        }
    }
}

/// Servo angle → PWM duty percent at 50 Hz.
///
/// `((deg / 180) * 1.5 ms + 0.5 ms) / 20 ms * 100`.
#[inline]
pub fn servo_pulse_percent(degrees: f64) -> f64 {
    let period_ms = 1000.0 / SERVO_PWM_HZ;
    let pulse_ms = degrees / 180.0 * SERVO_PULSE_SPAN_MS + SERVO_MIN_PULSE_MS;
    pulse_ms / period_ms * 100.0
}
