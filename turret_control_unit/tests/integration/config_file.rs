//! Loading the shipped configuration and rejecting broken files.

use std::io::Write;
use std::path::PathBuf;

use tempfile::NamedTempFile;

use turret_common::config::{ConfigError, LogLevel};
use turret_common::state::{AxisPair, TurretState};
use turret_control_unit::config::{AxesConfig, TurretConfig};
use turret_control_unit::state::machine::SequencePlan;
use turret_hal::{HotSpot, SimulationConfig};

use super::common::{run_until, sim_machine};

fn shipped_config() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../config/turret.toml")
}

fn temp_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn shipped_file_matches_defaults() {
    let cfg = TurretConfig::load_validated(&shipped_config()).unwrap();
    let defaults = TurretConfig::default();
    assert_eq!(cfg.logging.level, LogLevel::Info);
    assert_eq!(cfg.cycle, defaults.cycle);
    assert_eq!(cfg.camera, defaults.camera);
    assert_eq!(cfg.sequence, defaults.sequence);
    assert_eq!(cfg.calibration, defaults.calibration);
    assert_eq!(cfg.axes, AxesConfig::default());
    let sim: SimulationConfig = cfg.simulation_params().unwrap();
    assert_eq!(sim, SimulationConfig::default());
}

#[test]
fn shipped_file_resolves_tick_delays() {
    let cfg = TurretConfig::load_validated(&shipped_config()).unwrap();
    let plan = SequencePlan::from_config(&cfg);
    assert_eq!(plan.settle_ticks, 275);
    assert_eq!(plan.fire.dwell_ticks, 5);
    assert_eq!(plan.reload_ticks, 500);
    assert_eq!(plan.calibration_setpoints, AxisPair::new(-3_008, 500));
}

#[test]
fn loaded_overrides_drive_the_machine() {
    let file = temp_config(
        r#"
        [sequence]
        settle_ms = 40
        reload_ms = 40
        post_fire_ms = 40

        [camera]
        mirror_x = true
        "#,
    );
    let cfg = TurretConfig::load_validated(file.path()).unwrap();
    let mut m = sim_machine(&cfg, Some(HotSpot::at(23.0, 6.0)));
    run_until(&mut m, TurretState::Aim, 2_000);
    assert_eq!(m.aim_setpoints(), AxisPair::new(-190, 138));
}

#[test]
fn syntax_error_is_a_parse_error() {
    let file = temp_config("[cycle\ntick_period_ms = 20\n");
    let err = TurretConfig::load_validated(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError(_)));
}

#[test]
fn wrong_type_is_a_parse_error() {
    let file = temp_config("[camera]\nthreshold = \"hot\"\n");
    let err = TurretConfig::load_validated(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError(_)));
}

#[test]
fn unknown_section_is_rejected() {
    let file = temp_config("[network]\nport = 8080\n");
    assert!(TurretConfig::load_validated(file.path()).is_err());
}

#[test]
fn out_of_range_values_fail_validation() {
    for content in [
        "[cycle]\ntick_period_ms = 0\n",
        "[camera]\nfov_height_degrees = 0.0\n",
        "[axes.yaw]\nticks_per_rev = -1.0\nmount_offset = 0\n\
         calibration = { kp = 0.1, effort_limit = 50.0, tolerance = 3.0 }\n\
         aim = { kp = 0.4, effort_limit = 60.0, tolerance = 8.0 }\n",
    ] {
        let file = temp_config(content);
        let err = TurretConfig::load_validated(file.path()).unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError(_)),
            "{content:?} gave {err:?}"
        );
    }
}
