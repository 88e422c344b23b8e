//! Trigger pull: servo to the fire position, dwell, release, hold.

use tracing::{debug, info};

use turret_common::hal::driver::{FiringServo, HalError};

use super::delay::TickDelay;

/// Servo positions and tick-counted timing of one shot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FirePlan {
    /// Trigger pulled [deg].
    pub fire_position: f64,
    /// Trigger released [deg].
    pub rest_position: f64,
    pub dwell_ticks: u64,
    pub post_fire_ticks: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FireStage {
    /// Trigger held.
    Dwell(TickDelay),
    /// Trigger released, waiting before the return move.
    Hold(TickDelay),
    Done,
}

/// Resumable firing sequence.
#[derive(Debug, Clone)]
pub struct FireSequence {
    plan: FirePlan,
    stage: FireStage,
}

impl FireSequence {
    /// Pull the trigger and start the dwell.
    pub fn begin<F: FiringServo>(servo: &mut F, plan: FirePlan) -> Result<Self, HalError> {
        servo.set_position(plan.fire_position)?;
        info!("FIRE: trigger at {:.1}°", plan.fire_position);
        Ok(Self {
            plan,
            stage: FireStage::Dwell(TickDelay::new(plan.dwell_ticks)),
        })
    }

    /// Advance one tick. Returns `true` when the sequence has finished.
    pub fn step<F: FiringServo>(&mut self, servo: &mut F) -> Result<bool, HalError> {
        match &mut self.stage {
            FireStage::Dwell(delay) => {
                if delay.tick() {
                    servo.set_position(self.plan.rest_position)?;
                    debug!("Trigger released at {:.1}°", self.plan.rest_position);
                    self.stage = FireStage::Hold(TickDelay::new(self.plan.post_fire_ticks));
                }
                Ok(false)
            }
            FireStage::Hold(delay) => {
                if delay.tick() {
                    self.stage = FireStage::Done;
                    return Ok(true);
                }
                Ok(false)
            }
            FireStage::Done => Ok(true),
        }
    }

    /// Whether the trigger is currently pulled.
    pub fn trigger_held(&self) -> bool {
        matches!(self.stage, FireStage::Dwell(_))
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
