//! Axis physics simulator.
//!
//! `SimAxis` models one gear-motor axis driven through an H-bridge and read
//! back through a 16-bit quadrature counter that wraps like the real timer.
//!
//! The plant integrates exactly one control tick per duty command: the
//! commanded duty is held for `tick_s` seconds and the resulting motion is
//! visible on the next counter read. This keeps simulated runs independent
//! of wall-clock time.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use turret_common::consts::{COUNTER_MODULUS, MAX_DUTY};
use turret_common::hal::driver::{AxisDriver, HalError};
use turret_common::hal::types::HBridgeCommand;

/// Plant parameters for one simulated axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AxisPlantConfig {
    /// Steady-state speed per percent duty [ticks/s/%].
    pub speed_per_duty: f64,
    /// Acceleration limit [ticks/s²]. 0 = velocity follows duty instantly.
    pub max_accel: f64,
    /// Counter direction for positive duty. The turret's motors are wired so
    /// that positive duty counts down.
    pub polarity: f64,
    /// Duty magnitude below which static friction holds the shaft [%].
    pub stiction: f64,
    /// Control tick the plant integrates per duty command [s].
    pub tick_s: f64,
    /// Counter value at power-up.
    pub initial_count: u16,
}

impl Default for AxisPlantConfig {
    fn default() -> Self {
        Self {
            speed_per_duty: 40.0,
            max_accel: 40_000.0,
            polarity: -1.0,
            stiction: 0.0,
            tick_s: 0.02,
            initial_count: 0,
        }
    }
}

/// Simulated motor + encoder implementing [`AxisDriver`].
#[derive(Debug, Clone)]
pub struct SimAxis {
    name: &'static str,
    config: AxisPlantConfig,
    /// Shaft position [ticks], unbounded.
    position: f64,
    /// Shaft velocity [ticks/s].
    velocity: f64,
    /// Shaft position that maps to counter value 0.
    counter_origin: f64,
    /// Last pin-level bridge command.
    bridge: HBridgeCommand,
    duty_commands: u64,
    fail_reads: u32,
    fail_writes: u32,
}

impl SimAxis {
    /// Create a simulated axis at rest.
    pub fn new(name: &'static str, config: AxisPlantConfig) -> Self {
        Self {
            name,
            config,
            position: 0.0,
            velocity: 0.0,
            counter_origin: -(config.initial_count as f64),
            bridge: HBridgeCommand::OFF,
            duty_commands: 0,
            fail_reads: 0,
            fail_writes: 0,
        }
    }

    /// Axis label used in logs.
    pub fn label(&self) -> &'static str {
        self.name
    }

    /// True shaft position [ticks] since power-up.
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Shaft velocity [ticks/s].
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Last applied signed duty [%].
    pub fn duty(&self) -> f64 {
        self.bridge.duty()
    }

    /// Last pin-level bridge command.
    pub fn bridge(&self) -> HBridgeCommand {
        self.bridge
    }

    /// Whether the drive is currently energised.
    pub fn is_energised(&self) -> bool {
        self.bridge.enable
    }

    /// Number of duty commands received (one per control tick).
    pub fn duty_commands(&self) -> u64 {
        self.duty_commands
    }

    /// Fail the next `n` counter reads.
    pub fn fail_next_reads(&mut self, n: u32) {
        self.fail_reads = n;
    }

    /// Fail the next `n` duty commands.
    pub fn fail_next_writes(&mut self, n: u32) {
        self.fail_writes = n;
    }

    /// Move the shaft by hand (disturbance injection).
    pub fn nudge(&mut self, ticks: f64) {
        self.position += ticks;
    }

    /// Integrate one tick at the current bridge command.
    fn integrate(&mut self) {
        let duty = self.bridge.duty();
        let driven = duty.abs() > self.config.stiction;
        let target_velocity = if driven {
            self.config.polarity * duty * self.config.speed_per_duty
        } else {
            0.0
        };

        let dt = self.config.tick_s;
        if self.config.max_accel > 0.0 {
            let max_change = self.config.max_accel * dt;
            let change = (target_velocity - self.velocity).clamp(-max_change, max_change);
            self.velocity += change;
        } else {
            self.velocity = target_velocity;
        }
        self.position += self.velocity * dt;

        trace!(
            "Axis {}: duty={:.2}, vel={:.1}, pos={:.1}",
            self.name, duty, self.velocity, self.position
        );
    }

    fn counter_value(&self) -> u16 {
        let ticks = (self.position - self.counter_origin).round() as i64;
        ticks.rem_euclid(COUNTER_MODULUS as i64) as u16
    }
}

impl AxisDriver for SimAxis {
    fn name(&self) -> &'static str {
        "simulation"
    }

    fn read_counter(&mut self) -> Result<u16, HalError> {
        if self.fail_reads > 0 {
            self.fail_reads -= 1;
            return Err(HalError::Encoder(format!(
                "{}: simulated counter read failure",
                self.name
            )));
        }
        Ok(self.counter_value())
    }

    fn reset_counter(&mut self) -> Result<(), HalError> {
        self.counter_origin = self.position.round();
        debug!("Axis {} counter reset at {:.1}", self.name, self.position);
        Ok(())
    }

    fn set_duty(&mut self, duty: f64) -> Result<(), HalError> {
        if self.fail_writes > 0 {
            self.fail_writes -= 1;
            return Err(HalError::Motor(format!(
                "{}: simulated drive fault",
                self.name
            )));
        }
        if duty.abs() > MAX_DUTY {
            debug!("Axis {}: duty {:.1} clamped by bridge", self.name, duty);
        }
        self.bridge = HBridgeCommand::from_duty(duty);
        self.duty_commands += 1;
        self.integrate();
        Ok(())
    }
}
