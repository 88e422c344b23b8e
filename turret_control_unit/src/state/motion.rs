//! Closed-loop move of both axes to a setpoint pair.
//!
//! A `MotionPhase` is started once (gains, limits and setpoints loaded, PID
//! accumulators cleared, optionally the trackers rebased for a relative
//! move) and then stepped once per control tick until both axes are within
//! tolerance in the same tick. On that tick both motors are stopped.

use tracing::{debug, trace};

use turret_common::hal::driver::{AxisDriver, HalError};
use turret_common::state::{Axis, AxisPair};

use crate::control::output::{AxisControl, AxisStep, EffortLimit};
use crate::control::pid::PidGains;

/// Tuning of one motion phase, both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionPlan {
    pub gains: AxisPair<PidGains>,
    pub limits: AxisPair<EffortLimit>,
    /// Maximum |error| counted as on target [ticks].
    pub tolerance: AxisPair<f64>,
    /// Rebase the trackers on start so setpoints are relative to the
    /// current pose.
    pub relative: bool,
}

/// Outcome of one motion step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionStatus {
    Moving,
    /// Both axes within tolerance; motors stopped.
    Converged,
}

/// Resumable two-axis move.
#[derive(Debug, Clone)]
pub struct MotionPhase {
    tolerance: AxisPair<f64>,
    setpoints: AxisPair<i64>,
    ticks: u64,
    last: AxisPair<Option<AxisStep>>,
}

impl MotionPhase {
    /// Load the plan into both axes and start the move.
    pub fn begin<D: AxisDriver>(
        axes: &mut AxisPair<AxisControl<D>>,
        plan: &MotionPlan,
        setpoints: AxisPair<i64>,
    ) -> Result<Self, HalError> {
        for axis in Axis::ORDER {
            let ctl = axes.get_mut(axis);
            if plan.relative {
                ctl.tracker.rebase(&mut ctl.driver)?;
            }
            ctl.configure(
                *plan.gains.get(axis),
                *plan.limits.get(axis),
                *setpoints.get(axis) as f64,
            );
        }
        debug!(
            "Motion start: yaw -> {}, pitch -> {} ({})",
            setpoints.yaw,
            setpoints.pitch,
            if plan.relative { "relative" } else { "absolute" }
        );
        Ok(Self {
            tolerance: plan.tolerance,
            setpoints,
            ticks: 0,
            last: AxisPair::default(),
        })
    }

    /// One tick: yaw then pitch, sample → PID → clamp → drive.
    pub fn step<D: AxisDriver>(
        &mut self,
        axes: &mut AxisPair<AxisControl<D>>,
    ) -> Result<MotionStatus, HalError> {
        self.ticks += 1;
        let mut on_target = true;
        for axis in Axis::ORDER {
            let s = axes.get_mut(axis).step()?;
            trace!(
                "{axis}: pos={} err={:.1} effort={:.2} applied={:.2}",
                s.position, s.error, s.raw_effort, s.applied
            );
            on_target &= s.error.abs() <= *self.tolerance.get(axis);
            *self.last.get_mut(axis) = Some(s);
        }

        if !on_target {
            return Ok(MotionStatus::Moving);
        }

        for axis in Axis::ORDER {
            axes.get_mut(axis).halt()?;
        }
        debug!(
            "Motion converged after {} ticks (yaw err {:.0}, pitch err {:.0})",
            self.ticks,
            self.last.yaw.map_or(0.0, |s| s.error),
            self.last.pitch.map_or(0.0, |s| s.error)
        );
        Ok(MotionStatus::Converged)
    }

    #[inline]
    pub const fn setpoints(&self) -> AxisPair<i64> {
        self.setpoints
    }

    /// Ticks stepped so far.
    #[inline]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Per-axis result of the latest step.
    #[inline]
    pub const fn last_step(&self) -> AxisPair<Option<AxisStep>> {
        self.last
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
