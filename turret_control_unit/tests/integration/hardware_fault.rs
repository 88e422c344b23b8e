//! Hardware failures: motors stopped, error surfaced, machine terminated.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use turret_common::hal::driver::HalError;
use turret_common::state::TurretState;
use turret_control_unit::cycle::{CycleError, CycleRunner, Pacing};
use turret_control_unit::error::{FaultFlags, TurretError};
use turret_control_unit::state::machine::{StepOutcome, TurretHardware, TurretStateMachine};
use turret_hal::{HotSpot, SimulationRig};

use super::common::{SimMachine, fast_config, run_until, sim_machine};

fn assert_halted_and_terminated(m: &mut SimMachine) {
    let axes = &m.context().axes;
    assert!(!axes.yaw.driver.is_energised());
    assert!(!axes.pitch.driver.is_energised());
    assert!(m.is_terminated());
    let cancel = AtomicBool::new(false);
    assert_eq!(m.run_step(&cancel).unwrap(), StepOutcome::Terminated);
}

#[test]
fn encoder_fault_during_aim() {
    let mut m = sim_machine(&fast_config(), Some(HotSpot::at(23.0, 6.0)));
    run_until(&mut m, TurretState::Aim, 2_000);
    m.context_mut().axes.yaw.driver.fail_next_reads(1);

    let err = m.run_step(&AtomicBool::new(false)).unwrap_err();
    assert!(matches!(err, TurretError::Hal(HalError::Encoder(_))));
    assert_eq!(m.faults(), FaultFlags::ENCODER);
    assert_eq!(m.state(), TurretState::Aim);
    assert_halted_and_terminated(&mut m);
}

#[test]
fn motor_fault_during_init() {
    let mut m = sim_machine(&fast_config(), None);
    let cancel = AtomicBool::new(false);
    for _ in 0..10 {
        m.run_step(&cancel).unwrap();
    }
    // Rejects the drive command and the first stop attempt.
    m.context_mut().axes.pitch.driver.fail_next_writes(2);

    let err = m.run_step(&cancel).unwrap_err();
    assert!(matches!(err, TurretError::Hal(HalError::Motor(_))));
    assert!(m.faults().contains(FaultFlags::MOTOR));
    // Yaw is stopped even though pitch refused.
    assert!(!m.context().axes.yaw.driver.is_energised());
    assert!(m.is_terminated());

    // The next tick re-asserts the stop, which now succeeds.
    assert_eq!(m.run_step(&cancel).unwrap(), StepOutcome::Terminated);
    assert_halted_and_terminated(&mut m);
}

#[test]
fn sensor_fault_during_acquire() {
    let mut m = sim_machine(&fast_config(), None);
    run_until(&mut m, TurretState::Acquire, 2_000);
    m.context_mut().sensor.fail_next_captures(1);

    let cancel = AtomicBool::new(false);
    let err = loop {
        match m.run_step(&cancel) {
            Ok(_) => assert_eq!(m.state(), TurretState::Acquire),
            Err(e) => break e,
        }
    };
    assert!(matches!(err, TurretError::Hal(HalError::Sensor(_))));
    assert_eq!(m.faults(), FaultFlags::SENSOR);
    assert_halted_and_terminated(&mut m);
}

#[test]
fn servo_fault_on_trigger_pull() {
    let mut m = sim_machine(&fast_config(), Some(HotSpot::at(23.0, 6.0)));
    run_until(&mut m, TurretState::Aim, 2_000);
    m.context_mut().servo.fail_next_moves(1);

    let cancel = AtomicBool::new(false);
    let err = loop {
        match m.run_step(&cancel) {
            Ok(_) => assert_eq!(m.state(), TurretState::Aim),
            Err(e) => break e,
        }
    };
    assert!(matches!(err, TurretError::Hal(HalError::Servo(_))));
    assert_eq!(m.shots_fired(), 0);
    assert!(m.context().servo.history().is_empty());
    assert_halted_and_terminated(&mut m);
}

#[test]
fn missing_reference_frame_fails_start() {
    let cfg = fast_config();
    let mut rig = SimulationRig::new(&cfg.simulation_params().unwrap());
    rig.sensor.fail_next_captures(1);
    let hw = TurretHardware {
        axes: rig.axes,
        sensor: rig.sensor,
        servo: rig.servo,
    };
    let err = TurretStateMachine::new(&cfg, hw).unwrap_err();
    assert!(matches!(err, TurretError::Hal(HalError::Sensor(_))));
}

#[test]
fn runner_reports_fault_with_cycle_count() {
    let mut m = sim_machine(&fast_config(), None);
    run_until(&mut m, TurretState::Acquire, 2_000);
    m.context_mut().sensor.fail_next_captures(1);

    let cancel = Arc::new(AtomicBool::new(false));
    let mut runner = CycleRunner::new(m, Duration::from_millis(20), cancel)
        .unwrap()
        .with_pacing(Pacing::FreeRunning);
    match runner.run() {
        Err(CycleError::Step { cycles, source }) => {
            // settle delay, then the failing capture
            assert!(cycles >= 3, "failed after {cycles} cycles");
            assert!(matches!(source, TurretError::Hal(HalError::Sensor(_))));
        }
        other => panic!("expected a step error, got {other:?}"),
    }
    assert!(runner.machine().is_terminated());
    assert_eq!(runner.machine().faults(), FaultFlags::SENSOR);
}
