//! Shared helpers: a short-delay configuration and a simulated machine.

use std::sync::atomic::AtomicBool;

use turret_common::state::TurretState;
use turret_control_unit::config::TurretConfig;
use turret_control_unit::state::machine::{StepOutcome, TurretHardware, TurretStateMachine};
use turret_hal::{HotSpot, SimAxis, SimServo, SimThermalSensor, SimulationRig};

pub type SimMachine = TurretStateMachine<SimAxis, SimThermalSensor, SimServo>;

/// Default tuning with delays shortened to a few ticks.
pub fn fast_config() -> TurretConfig {
    let mut cfg = TurretConfig::default();
    cfg.sequence.settle_ms = 60;
    cfg.sequence.fire_dwell_ms = 100;
    cfg.sequence.post_fire_ms = 60;
    cfg.sequence.reload_ms = 60;
    cfg
}

/// Machine on a fresh rig; the reference is captured before `target` is placed.
pub fn sim_machine(cfg: &TurretConfig, target: Option<HotSpot>) -> SimMachine {
    let rig = SimulationRig::new(&cfg.simulation_params().unwrap());
    let hw = TurretHardware {
        axes: rig.axes,
        sensor: rig.sensor,
        servo: rig.servo,
    };
    let mut m = TurretStateMachine::new(cfg, hw).expect("machine start");
    m.context_mut().sensor.set_target(target);
    m
}

/// Step until `state` is entered. Returns the number of ticks taken.
pub fn run_until(m: &mut SimMachine, state: TurretState, limit: u64) -> u64 {
    let cancel = AtomicBool::new(false);
    for n in 0..limit {
        if m.state() == state {
            return n;
        }
        let outcome = m.run_step(&cancel).expect("step");
        assert_eq!(outcome, StepOutcome::Continue);
    }
    panic!("{state} not reached within {limit} ticks (in {})", m.state());
}
