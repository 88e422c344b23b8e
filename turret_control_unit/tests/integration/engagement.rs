//! End-to-end engagement on the simulated rig.

use std::sync::atomic::AtomicBool;

use turret_common::state::{AxisPair, TurretState};
use turret_control_unit::state::machine::StepOutcome;
use turret_hal::HotSpot;

use super::common::{SimMachine, fast_config, run_until, sim_machine};

fn drive_positions(m: &SimMachine) -> AxisPair<f64> {
    let axes = &m.context().axes;
    AxisPair::new(axes.yaw.driver.position(), axes.pitch.driver.position())
}

#[test]
fn full_cycle_fires_once_and_returns() {
    let cfg = fast_config();
    let mut m = sim_machine(&cfg, Some(HotSpot::at(23.0, 6.0)));

    run_until(&mut m, TurretState::Acquire, 2_000);
    let home = drive_positions(&m);

    run_until(&mut m, TurretState::Aim, 100);
    assert_eq!(m.aim_setpoints(), AxisPair::new(270, 138));
    assert_eq!(m.shots_fired(), 0);

    run_until(&mut m, TurretState::Fire, 500);
    assert_eq!(m.shots_fired(), 1);
    assert_eq!(m.context().servo.position(), Some(-10.0));
    assert!(!m.context().axes.yaw.driver.is_energised());
    assert!(!m.context().axes.pitch.driver.is_energised());

    run_until(&mut m, TurretState::Reset, 500);
    assert_eq!(m.context().servo.history(), &[-10.0, 20.0]);

    run_until(&mut m, TurretState::Pause, 500);
    assert!(!m.context().axes.yaw.driver.is_energised());
    assert!(!m.context().axes.pitch.driver.is_energised());
    let back = drive_positions(&m);
    assert!((back.yaw - home.yaw).abs() <= 15.0, "yaw {} vs {}", back.yaw, home.yaw);
    assert!((back.pitch - home.pitch).abs() <= 10.0, "pitch {} vs {}", back.pitch, home.pitch);

    run_until(&mut m, TurretState::Acquire, 100);
    assert_eq!(m.shots_fired(), 1);
    assert!(m.faults().is_empty());
}

#[test]
fn target_still_present_is_engaged_again() {
    let mut m = sim_machine(&fast_config(), Some(HotSpot::at(23.0, 6.0)));
    run_until(&mut m, TurretState::Pause, 3_000);
    run_until(&mut m, TurretState::Fire, 1_000);
    assert_eq!(m.shots_fired(), 2);
    assert_eq!(m.aim_setpoints(), AxisPair::new(270, 138));
}

#[test]
fn init_exits_only_when_both_axes_are_on_target() {
    let mut m = sim_machine(&fast_config(), None);
    let cancel = AtomicBool::new(false);
    for _ in 0..2_000 {
        assert_eq!(m.run_step(&cancel).unwrap(), StepOutcome::Continue);
        let axes = &m.context().axes;
        let yaw_ok = axes.yaw.pid.error().abs() <= 5.0;
        let pitch_ok = axes.pitch.pid.error().abs() <= 10.0;
        match m.state() {
            TurretState::Init => assert!(!(yaw_ok && pitch_ok)),
            TurretState::Acquire => {
                assert!(yaw_ok && pitch_ok);
                assert_eq!(axes.yaw.tracker.position(), 0);
                assert_eq!(axes.pitch.tracker.position(), 0);
                return;
            }
            other => panic!("unexpected state {other}"),
        }
    }
    panic!("calibration pose never reached");
}

#[test]
fn centred_target_moves_by_mount_offset_only() {
    let mut m = sim_machine(&fast_config(), Some(HotSpot::at(15.0, 12.0)));
    run_until(&mut m, TurretState::Aim, 2_000);
    assert_eq!(m.aim_setpoints(), AxisPair::new(40, 50));
}

#[test]
fn mirrored_camera_flips_yaw() {
    let mut cfg = fast_config();
    cfg.camera.mirror_x = true;
    let mut m = sim_machine(&cfg, Some(HotSpot::at(23.0, 6.0)));
    run_until(&mut m, TurretState::Aim, 2_000);
    assert_eq!(m.aim_setpoints(), AxisPair::new(-190, 138));
}

#[test]
fn late_target_is_picked_up() {
    let mut m = sim_machine(&fast_config(), None);
    run_until(&mut m, TurretState::Acquire, 2_000);

    let cancel = AtomicBool::new(false);
    for _ in 0..30 {
        m.run_step(&cancel).unwrap();
    }
    assert_eq!(m.state(), TurretState::Acquire);
    let captures = m.context().sensor.captures();
    assert!(captures >= 25, "only {captures} captures while searching");

    m.context_mut().sensor.set_target(Some(HotSpot::at(8.0, 18.0)));
    let ticks = run_until(&mut m, TurretState::Aim, 5);
    assert_eq!(ticks, 1);
    assert!(m.aim_setpoints().yaw < 0);
    assert!(m.aim_setpoints().pitch < 50);
}
