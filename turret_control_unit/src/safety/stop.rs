//! Motor stop.
//!
//! Both drives are always commanded to 0, even if the first one fails, so a
//! single bad channel never leaves the other motor running.

use tracing::{error, warn};

use turret_common::hal::driver::{AxisDriver, HalError};
use turret_common::state::{Axis, AxisPair};

use crate::control::output::AxisControl;

/// Why the motors are being stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Operator cancellation.
    Cancelled,
    /// Hardware failure during a tick.
    Fault,
    /// Already terminated; re-asserting the stop.
    Terminated,
}

/// Result of a stop attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct StopReport {
    /// Axes whose drive refused the zero command.
    pub failed: AxisPair<Option<HalError>>,
}

impl StopReport {
    /// Both drives accepted the stop.
    pub fn is_clean(&self) -> bool {
        self.failed.yaw.is_none() && self.failed.pitch.is_none()
    }

    /// First failure, yaw before pitch.
    pub fn into_result(self) -> Result<(), HalError> {
        match (self.failed.yaw, self.failed.pitch) {
            (Some(e), _) | (None, Some(e)) => Err(e),
            (None, None) => Ok(()),
        }
    }
}

/// Command 0 duty on both axes, continuing past failures.
pub fn halt_axes<D: AxisDriver>(
    axes: &mut AxisPair<AxisControl<D>>,
    reason: StopReason,
) -> StopReport {
    let mut failed = AxisPair::new(None, None);
    for axis in Axis::ORDER {
        if let Err(e) = axes.get_mut(axis).halt() {
            error!("{axis}: stop ({reason:?}) failed: {e}");
            *failed.get_mut(axis) = Some(e);
        }
    }
    let report = StopReport { failed };
    if reason == StopReason::Cancelled && report.is_clean() {
        warn!("Motors stopped: operator cancellation");
    }
    report
}

// ─── Tests ──────────────────────────────────────────────────────────
