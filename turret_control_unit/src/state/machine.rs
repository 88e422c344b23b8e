//! Top-level turret sequence.
//!
//! ```text
//! INIT ──converged──► ACQUIRE ──target──► AIM ──converged──► FIRE
//!                        ▲                                     │
//!                        │                                  released
//!                      PAUSE ◄──converged── RESET ◄────────────┘
//! ```
//!
//! INIT drives to the calibration pose and zeroes the encoders there. AIM
//! and RESET are relative moves: RESET returns by the negated AIM setpoints.
//! ACQUIRE waits the settle delay once per entry and then captures a frame
//! every tick until a target is found.
//!
//! Every [`TurretStateMachine::run_step`] is one control tick. Cancellation
//! is checked first; a hardware error stops both motors before it is
//! returned. After either, the machine is terminated for good. A stop the
//! drives refuse is itself returned as an error.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, error, info, warn};

use turret_common::frame::ThermalFrame;
use turret_common::hal::driver::{AxisDriver, FiringServo, HalError, ThermalSensor};
use turret_common::state::{Axis, AxisPair, TurretState};

use crate::config::TurretConfig;
use crate::control::output::AxisControl;
use crate::error::{FaultFlags, TurretError};
use crate::safety::stop::{StopReason, halt_axes};
use crate::vision::aim::{AimAngles, AxisMount};
use crate::vision::centroid::CentroidLocator;

use super::delay::TickDelay;
use super::fire::{FirePlan, FireSequence};
use super::motion::{MotionPhase, MotionPlan, MotionStatus};

/// The devices the controller drives.
#[derive(Debug)]
pub struct TurretHardware<A, S, F> {
    pub axes: AxisPair<A>,
    pub sensor: S,
    pub servo: F,
}

/// Everything the sequence operates on.
#[derive(Debug)]
pub struct TurretContext<A, S, F> {
    pub axes: AxisPair<AxisControl<A>>,
    pub sensor: S,
    pub servo: F,
    /// Background captured at start-up.
    pub reference: ThermalFrame,
    pub locator: CentroidLocator,
}

/// Per-phase tuning and tick-counted delays, resolved once from config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequencePlan {
    pub calibration: MotionPlan,
    pub calibration_setpoints: AxisPair<i64>,
    pub aim: MotionPlan,
    pub mounts: AxisPair<AxisMount>,
    pub fire: FirePlan,
    pub settle_ticks: u64,
    pub reload_ticks: u64,
}

impl SequencePlan {
    pub fn from_config(config: &TurretConfig) -> Self {
        let axes = config.axes.pair();
        let cycle = &config.cycle;
        let seq = &config.sequence;
        Self {
            calibration: MotionPlan {
                gains: axes.map(|a| a.calibration.gains()),
                limits: axes.map(|a| a.calibration.limit()),
                tolerance: axes.map(|a| a.calibration.tolerance),
                relative: false,
            },
            calibration_setpoints: config.calibration.setpoints(),
            aim: MotionPlan {
                gains: axes.map(|a| a.aim.gains()),
                limits: axes.map(|a| a.aim.limit()),
                tolerance: axes.map(|a| a.aim.tolerance),
                relative: true,
            },
            mounts: axes.map(|a| a.mount()),
            fire: FirePlan {
                fire_position: seq.fire_position,
                rest_position: seq.rest_position,
                dwell_ticks: cycle.ticks_for(seq.fire_dwell_ms),
                post_fire_ticks: cycle.ticks_for(seq.post_fire_ms),
            },
            settle_ticks: cycle.ticks_for(seq.settle_ms),
            reload_ticks: cycle.ticks_for(seq.reload_ms),
        }
    }

    /// Relative tick setpoints that point the barrel at `angles`.
    pub fn aim_setpoints(&self, angles: AimAngles) -> AxisPair<i64> {
        AxisPair::new(
            self.mounts.yaw.setpoint_ticks(angles.yaw_degrees),
            self.mounts.pitch.setpoint_ticks(angles.pitch_degrees),
        )
    }
}

/// Result of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    /// Cancelled or faulted; motors are stopped.
    Terminated,
}

/// Work in progress for the current state.
#[derive(Debug, Clone)]
enum Stage {
    Init(MotionPhase),
    Acquire { settle: TickDelay, misses: u64 },
    Aim(MotionPhase),
    Fire(FireSequence),
    Reset(MotionPhase),
    Pause(TickDelay),
}

impl Stage {
    fn state(&self) -> TurretState {
        match self {
            Self::Init(_) => TurretState::Init,
            Self::Acquire { .. } => TurretState::Acquire,
            Self::Aim(_) => TurretState::Aim,
            Self::Fire(_) => TurretState::Fire,
            Self::Reset(_) => TurretState::Reset,
            Self::Pause(_) => TurretState::Pause,
        }
    }
}

fn acquire_stage(settle_ticks: u64) -> Stage {
    Stage::Acquire {
        settle: TickDelay::new(settle_ticks),
        misses: 0,
    }
}

/// Turret sequence over an owned hardware context.
#[derive(Debug)]
pub struct TurretStateMachine<A, S, F> {
    ctx: TurretContext<A, S, F>,
    plan: SequencePlan,
    stage: Stage,
    /// Setpoints of the last aim move; the return move negates them.
    aim_setpoints: AxisPair<i64>,
    shots_fired: u64,
    ticks: u64,
    faults: FaultFlags,
    terminated: bool,
}

impl<A, S, F> TurretStateMachine<A, S, F>
where
    A: AxisDriver,
    S: ThermalSensor,
    F: FiringServo,
{
    /// Capture the reference frame and start in INIT.
    ///
    /// The scene must be free of targets at this point.
    pub fn new(config: &TurretConfig, mut hardware: TurretHardware<A, S, F>) -> Result<Self, TurretError> {
        let reference = hardware.sensor.capture()?;
        info!("Reference frame captured ({:?})", reference);
        Self::with_reference(config, hardware, reference)
    }

    /// Start in INIT with an explicit reference frame.
    ///
    /// Fails with [`TurretError::Config`] before touching the motors if
    /// `config` does not validate.
    pub fn with_reference(
        config: &TurretConfig,
        hardware: TurretHardware<A, S, F>,
        reference: ThermalFrame,
    ) -> Result<Self, TurretError> {
        config.validate()?;
        let TurretHardware { axes, sensor, servo } = hardware;
        let axes = AxisPair::new(AxisControl::new(axes.yaw)?, AxisControl::new(axes.pitch)?);
        let mut ctx = TurretContext {
            axes,
            sensor,
            servo,
            reference,
            locator: config.camera.locator(),
        };
        let plan = SequencePlan::from_config(config);
        let init = MotionPhase::begin(&mut ctx.axes, &plan.calibration, plan.calibration_setpoints)?;
        info!(
            "State -> {} (calibration pose yaw={}, pitch={})",
            TurretState::Init,
            plan.calibration_setpoints.yaw,
            plan.calibration_setpoints.pitch
        );

        Ok(Self {
            ctx,
            plan,
            stage: Stage::Init(init),
            aim_setpoints: AxisPair::default(),
            shots_fired: 0,
            ticks: 0,
            faults: FaultFlags::empty(),
            terminated: false,
        })
    }

    /// Perform exactly one control tick.
    ///
    /// A motor that refuses the stop command is reported as an error, also
    /// on cancellation and after termination.
    pub fn run_step(&mut self, cancel: &AtomicBool) -> Result<StepOutcome, TurretError> {
        if self.terminated {
            self.stop(StopReason::Terminated)?;
            return Ok(StepOutcome::Terminated);
        }
        if cancel.load(Ordering::SeqCst) {
            info!("Cancellation in {} after {} ticks", self.state(), self.ticks);
            self.terminated = true;
            self.stop(StopReason::Cancelled)?;
            return Ok(StepOutcome::Terminated);
        }

        self.ticks += 1;
        match self.advance() {
            Ok(()) => Ok(StepOutcome::Continue),
            Err(e) => {
                self.faults |= FaultFlags::from_hal(&e);
                error!("Hardware fault in {}: {e}", self.state());
                self.terminated = true;
                // Stop failures are recorded; the original error is what
                // the caller sees.
                if let Err(stop_err) = self.stop(StopReason::Fault) {
                    debug!("Stop after fault also failed: {stop_err}");
                }
                Err(e.into())
            }
        }
    }

    /// Zero both motors, recording every refusal in the fault flags.
    fn stop(&mut self, reason: StopReason) -> Result<(), HalError> {
        let report = halt_axes(&mut self.ctx.axes, reason);
        for err in [&report.failed.yaw, &report.failed.pitch].into_iter().flatten() {
            self.faults |= FaultFlags::from_hal(err);
        }
        report.into_result()
    }

    fn advance(&mut self) -> Result<(), HalError> {
        let next = match &mut self.stage {
            Stage::Init(phase) => match phase.step(&mut self.ctx.axes)? {
                MotionStatus::Moving => None,
                MotionStatus::Converged => {
                    for axis in Axis::ORDER {
                        let ctl = self.ctx.axes.get_mut(axis);
                        ctl.tracker.zero(&mut ctl.driver)?;
                    }
                    info!("Calibration pose reached, encoders zeroed");
                    Some(acquire_stage(self.plan.settle_ticks))
                }
            },

            Stage::Acquire { settle, misses } => {
                if !settle.tick() {
                    return Ok(());
                }
                let frame = self.ctx.sensor.capture()?;
                let centroid = self.ctx.locator.locate(&self.ctx.reference, &frame);
                match self.ctx.locator.to_angles(centroid) {
                    None => {
                        *misses += 1;
                        if *misses == 1 {
                            warn!("No target in view, retrying every tick");
                        } else {
                            debug!("No target (miss #{})", misses);
                        }
                        None
                    }
                    Some(angles) => {
                        let setpoints = self.plan.aim_setpoints(angles);
                        info!(
                            "Target at yaw {:.2}°, pitch {:.2}° ({} px) -> setpoints yaw={}, pitch={}",
                            angles.yaw_degrees,
                            angles.pitch_degrees,
                            centroid.map_or(0, |c| c.pixel_count),
                            setpoints.yaw,
                            setpoints.pitch
                        );
                        self.aim_setpoints = setpoints;
                        Some(Stage::Aim(MotionPhase::begin(
                            &mut self.ctx.axes,
                            &self.plan.aim,
                            setpoints,
                        )?))
                    }
                }
            }

            Stage::Aim(phase) => match phase.step(&mut self.ctx.axes)? {
                MotionStatus::Moving => None,
                MotionStatus::Converged => {
                    let seq = FireSequence::begin(&mut self.ctx.servo, self.plan.fire)?;
                    self.shots_fired += 1;
                    Some(Stage::Fire(seq))
                }
            },

            Stage::Fire(seq) => {
                if seq.step(&mut self.ctx.servo)? {
                    Some(Stage::Reset(MotionPhase::begin(
                        &mut self.ctx.axes,
                        &self.plan.aim,
                        -self.aim_setpoints,
                    )?))
                } else {
                    None
                }
            }

            Stage::Reset(phase) => match phase.step(&mut self.ctx.axes)? {
                MotionStatus::Moving => None,
                MotionStatus::Converged => Some(Stage::Pause(TickDelay::new(self.plan.reload_ticks))),
            },

            Stage::Pause(delay) => {
                if delay.tick() {
                    Some(acquire_stage(self.plan.settle_ticks))
                } else {
                    None
                }
            }
        };

        if let Some(stage) = next {
            info!("State {} -> {}", self.stage.state(), stage.state());
            self.stage = stage;
        }
        Ok(())
    }

    #[inline]
    pub fn state(&self) -> TurretState {
        self.stage.state()
    }

    #[inline]
    pub const fn shots_fired(&self) -> u64 {
        self.shots_fired
    }

    /// Ticks executed (cancellation checks excluded).
    #[inline]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    #[inline]
    pub const fn faults(&self) -> FaultFlags {
        self.faults
    }

    #[inline]
    pub const fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Setpoints of the most recent aim move.
    #[inline]
    pub const fn aim_setpoints(&self) -> AxisPair<i64> {
        self.aim_setpoints
    }

    #[inline]
    pub const fn plan(&self) -> &SequencePlan {
        &self.plan
    }

    #[inline]
    pub const fn context(&self) -> &TurretContext<A, S, F> {
        &self.ctx
    }

    #[inline]
    pub fn context_mut(&mut self) -> &mut TurretContext<A, S, F> {
        &mut self.ctx
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
