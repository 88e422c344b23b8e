//! Operator cancellation in every state.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use turret_common::hal::driver::HalError;
use turret_common::state::TurretState;
use turret_control_unit::cycle::{CycleError, CycleRunner, Pacing, StopCause};
use turret_control_unit::error::{FaultFlags, TurretError};
use turret_control_unit::state::machine::StepOutcome;
use turret_hal::HotSpot;

use super::common::{SimMachine, fast_config, run_until, sim_machine};

fn assert_motors_off(m: &SimMachine) {
    let axes = &m.context().axes;
    assert!(!axes.yaw.driver.is_energised(), "yaw still driven");
    assert!(!axes.pitch.driver.is_energised(), "pitch still driven");
    assert_eq!(axes.yaw.driver.duty(), 0.0);
    assert_eq!(axes.pitch.driver.duty(), 0.0);
}

fn cancel_in(state: TurretState) {
    let mut m = sim_machine(&fast_config(), Some(HotSpot::at(23.0, 6.0)));
    run_until(&mut m, state, 3_000);
    // One more tick so moves are under way.
    let cancel = AtomicBool::new(false);
    m.run_step(&cancel).unwrap();
    let shots = m.shots_fired();

    cancel.store(true, Ordering::SeqCst);
    assert_eq!(m.run_step(&cancel).unwrap(), StepOutcome::Terminated);
    assert!(m.is_terminated());
    assert_motors_off(&m);
    assert!(m.faults().is_empty());

    cancel.store(false, Ordering::SeqCst);
    let ticks = m.ticks();
    assert_eq!(m.run_step(&cancel).unwrap(), StepOutcome::Terminated);
    assert_eq!(m.ticks(), ticks);
    assert_eq!(m.shots_fired(), shots);
    assert_motors_off(&m);
}

#[test]
fn cancel_during_init() {
    cancel_in(TurretState::Init);
}

#[test]
fn cancel_during_acquire() {
    cancel_in(TurretState::Acquire);
}

#[test]
fn cancel_during_aim() {
    cancel_in(TurretState::Aim);
}

#[test]
fn cancel_during_fire() {
    cancel_in(TurretState::Fire);
}

#[test]
fn cancel_during_reset() {
    cancel_in(TurretState::Reset);
}

#[test]
fn cancel_during_pause() {
    cancel_in(TurretState::Pause);
}

#[test]
fn cancel_does_not_move_the_servo() {
    let mut m = sim_machine(&fast_config(), Some(HotSpot::at(23.0, 6.0)));
    run_until(&mut m, TurretState::Fire, 3_000);
    let cancel = AtomicBool::new(true);
    m.run_step(&cancel).unwrap();
    assert_eq!(m.context().servo.history(), &[-10.0]);
}

#[test]
fn runner_stops_when_flag_is_raised() {
    let m = sim_machine(&fast_config(), None);
    let cancel = Arc::new(AtomicBool::new(true));
    let mut runner = CycleRunner::new(m, Duration::from_millis(20), cancel)
        .unwrap()
        .with_pacing(Pacing::FreeRunning);
    let summary = runner.run().unwrap();
    assert_eq!(summary.cause, StopCause::Terminated);
    assert_eq!(summary.final_state, TurretState::Init);
    assert_eq!(summary.shots_fired, 0);
    assert_motors_off(runner.machine());
}

#[test]
fn runner_cancelled_from_another_thread() {
    let m = sim_machine(&fast_config(), None);
    let cancel = Arc::new(AtomicBool::new(false));
    let mut runner = CycleRunner::new(m, Duration::from_millis(1), cancel.clone()).unwrap();

    let trigger = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(50));
        cancel.store(true, Ordering::SeqCst);
    });
    let summary = runner.run().unwrap();
    trigger.join().unwrap();

    assert_eq!(summary.cause, StopCause::Terminated);
    assert!(summary.cycles > 1);
    assert_motors_off(runner.machine());
}

#[test]
fn cancel_while_yaw_stop_write_fails() {
    let mut m = sim_machine(&fast_config(), None);
    let cancel = AtomicBool::new(false);
    for _ in 0..5 {
        m.run_step(&cancel).unwrap();
    }
    assert!(m.context().axes.yaw.driver.is_energised());
    m.context_mut().axes.yaw.driver.fail_next_writes(1);

    cancel.store(true, Ordering::SeqCst);
    let err = m.run_step(&cancel).unwrap_err();
    assert!(matches!(err, TurretError::Hal(HalError::Motor(_))));
    assert_eq!(m.faults(), FaultFlags::MOTOR);
    assert!(m.is_terminated());
    // Pitch is stopped even though yaw refused.
    assert!(!m.context().axes.pitch.driver.is_energised());
    assert!(m.context().axes.yaw.driver.is_energised());

    // The next call re-asserts the stop, which now succeeds.
    assert_eq!(m.run_step(&cancel).unwrap(), StepOutcome::Terminated);
    assert_motors_off(&m);
    assert_eq!(m.faults(), FaultFlags::MOTOR);
}

#[test]
fn runner_surfaces_refused_cancel_stop() {
    let mut m = sim_machine(&fast_config(), None);
    let idle = AtomicBool::new(false);
    for _ in 0..5 {
        m.run_step(&idle).unwrap();
    }
    m.context_mut().axes.yaw.driver.fail_next_writes(1);

    let cancel = Arc::new(AtomicBool::new(true));
    let mut runner = CycleRunner::new(m, Duration::from_millis(20), cancel)
        .unwrap()
        .with_pacing(Pacing::FreeRunning);
    match runner.run() {
        Err(CycleError::Step { cycles, source }) => {
            // Fails on the first cycle, before it is counted.
            assert_eq!(cycles, 0);
            assert!(matches!(source, TurretError::Hal(HalError::Motor(_))));
        }
        other => panic!("expected a step error, got {other:?}"),
    }
    assert!(runner.machine().is_terminated());
    assert!(runner.machine().faults().contains(FaultFlags::MOTOR));
}
