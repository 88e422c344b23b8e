//! Fixed-period control loop.
//!
//! `CycleRunner` calls [`TurretStateMachine::run_step`] once per tick,
//! sleeps the rest of the period and records timing statistics. Overruns
//! are counted and logged, never fatal. The loop ends on termination, on a
//! hardware error or when the optional cycle limit is reached.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info, warn};

use turret_common::hal::driver::{AxisDriver, FiringServo, ThermalSensor};
use turret_common::state::TurretState;

use crate::error::{FaultFlags, TurretError};
use crate::state::machine::{StepOutcome, TurretStateMachine};

// ─── Cycle Statistics ───────────────────────────────────────────────

/// O(1) per-cycle timing statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleStats {
    /// Total cycles executed.
    pub cycle_count: u64,
    /// Last cycle duration [ns].
    pub last_cycle_ns: u64,
    /// Minimum cycle duration [ns].
    pub min_cycle_ns: u64,
    /// Maximum cycle duration [ns].
    pub max_cycle_ns: u64,
    /// Running sum for average computation.
    pub sum_cycle_ns: u128,
    /// Cycles whose body took longer than the period.
    pub overruns: u64,
}

impl CycleStats {
    pub const fn new() -> Self {
        Self {
            cycle_count: 0,
            last_cycle_ns: 0,
            min_cycle_ns: u64::MAX,
            max_cycle_ns: 0,
            sum_cycle_ns: 0,
            overruns: 0,
        }
    }

    /// Record a cycle duration.
    #[inline]
    pub fn record(&mut self, duration_ns: u64) {
        self.cycle_count += 1;
        self.last_cycle_ns = duration_ns;
        self.min_cycle_ns = self.min_cycle_ns.min(duration_ns);
        self.max_cycle_ns = self.max_cycle_ns.max(duration_ns);
        self.sum_cycle_ns += duration_ns as u128;
    }

    /// Average cycle time [ns] (0 if no cycles).
    #[inline]
    pub fn avg_cycle_ns(&self) -> u64 {
        if self.cycle_count == 0 {
            0
        } else {
            (self.sum_cycle_ns / self.cycle_count as u128) as u64
        }
    }
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Errors & Summary ───────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum CycleError {
    #[error("tick period must be non-zero")]
    InvalidPeriod,

    #[error("control step failed after {cycles} cycles: {source}")]
    Step {
        cycles: u64,
        #[source]
        source: TurretError,
    },
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopCause {
    Terminated,
    CycleLimit,
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub cycles: u64,
    pub shots_fired: u64,
    pub final_state: TurretState,
    pub faults: FaultFlags,
    pub cause: StopCause,
    pub stats: CycleStats,
}

// ─── Runner ─────────────────────────────────────────────────────────

/// Sleep between ticks, or run back-to-back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    RealTime,
    /// No sleeping; used for simulation replays and tests.
    FreeRunning,
}

/// Drives a state machine at a fixed period.
pub struct CycleRunner<A, S, F> {
    machine: TurretStateMachine<A, S, F>,
    period: Duration,
    pacing: Pacing,
    max_cycles: Option<u64>,
    cancel: Arc<AtomicBool>,
    stats: CycleStats,
}

impl<A, S, F> CycleRunner<A, S, F>
where
    A: AxisDriver,
    S: ThermalSensor,
    F: FiringServo,
{
    pub fn new(
        machine: TurretStateMachine<A, S, F>,
        period: Duration,
        cancel: Arc<AtomicBool>,
    ) -> Result<Self, CycleError> {
        if period.is_zero() {
            return Err(CycleError::InvalidPeriod);
        }
        Ok(Self {
            machine,
            period,
            pacing: Pacing::RealTime,
            max_cycles: None,
            cancel,
            stats: CycleStats::new(),
        })
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Stop after `limit` cycles (`None` = run until terminated).
    pub fn with_max_cycles(mut self, limit: Option<u64>) -> Self {
        self.max_cycles = limit;
        self
    }

    /// Run until termination, failure or the cycle limit.
    pub fn run(&mut self) -> Result<RunSummary, CycleError> {
        info!(
            "Cycle loop start: period={:?}, pacing={:?}, limit={:?}",
            self.period, self.pacing, self.max_cycles
        );
        let mut last_state = self.machine.state();

        let cause = loop {
            if self.max_cycles.is_some_and(|max| self.stats.cycle_count >= max) {
                break StopCause::CycleLimit;
            }

            let cycle_start = Instant::now();
            let outcome = self.machine.run_step(&self.cancel).map_err(|source| {
                CycleError::Step {
                    cycles: self.stats.cycle_count,
                    source,
                }
            })?;
            let elapsed = cycle_start.elapsed();
            self.stats.record(elapsed.as_nanos() as u64);

            if elapsed > self.period {
                self.stats.overruns += 1;
                warn!(
                    "Cycle overrun: {:?} > {:?} (#{})",
                    elapsed, self.period, self.stats.overruns
                );
            }

            let state = self.machine.state();
            if state != last_state {
                debug!("cycle {}: {} -> {}", self.stats.cycle_count, last_state, state);
                last_state = state;
            }

            if outcome == StepOutcome::Terminated {
                break StopCause::Terminated;
            }

            if self.pacing == Pacing::RealTime {
                if let Some(remaining) = self.period.checked_sub(elapsed) {
                    std::thread::sleep(remaining);
                }
            }
        };

        let summary = self.summary(cause);
        info!(
            "Cycle loop stop ({:?}): {} cycles, {} shots, state {}, avg {} ns, max {} ns, {} overruns",
            summary.cause,
            summary.cycles,
            summary.shots_fired,
            summary.final_state,
            summary.stats.avg_cycle_ns(),
            summary.stats.max_cycle_ns,
            summary.stats.overruns
        );
        Ok(summary)
    }

    fn summary(&self, cause: StopCause) -> RunSummary {
        RunSummary {
            cycles: self.stats.cycle_count,
            shots_fired: self.machine.shots_fired(),
            final_state: self.machine.state(),
            faults: self.machine.faults(),
            cause,
            stats: self.stats.clone(),
        }
    }

    #[inline]
    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    #[inline]
    pub fn machine(&self) -> &TurretStateMachine<A, S, F> {
        &self.machine
    }

    #[inline]
    pub fn machine_mut(&mut self) -> &mut TurretStateMachine<A, S, F> {
        &mut self.machine
    }

    /// Give the machine back.
    pub fn into_machine(self) -> TurretStateMachine<A, S, F> {
        self.machine
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
