//! TOML configuration with validation.
//!
//! One file, every field defaulted to the turret's calibrated values, so an
//! empty file is a valid configuration. Loaded through the blanket
//! [`ConfigLoader`] impl and checked with [`TurretConfig::validate`].
//!
//! ```toml
//! [cycle]
//! tick_period_ms = 20
//!
//! [camera]
//! threshold = 100
//!
//! [axes.yaw]
//! ticks_per_rev = 6016.0
//! mount_offset = -40
//! calibration = { kp = 0.15, ki = 0.0002, kd = 0.03, effort_limit = 100.0, tolerance = 5.0 }
//! aim = { kp = 0.57, effort_limit = 100.0, tolerance = 15.0 }
//! ```

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use turret_common::config::{ConfigError, ConfigLoader, LoggingConfig};
use turret_common::consts::{DEFAULT_TICK_PERIOD_MS, MAX_DUTY};
use turret_common::state::{Axis, AxisPair};

use crate::control::output::EffortLimit;
use crate::control::pid::PidGains;
use crate::vision::aim::{AxisMount, FieldOfView};
use crate::vision::centroid::{CentroidLocator, DEFAULT_THRESHOLD};

// ─── Sections ───────────────────────────────────────────────────────

/// `[cycle]`: control loop pacing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CycleConfig {
    /// Control tick period [ms].
    pub tick_period_ms: u64,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: DEFAULT_TICK_PERIOD_MS,
        }
    }
}

impl CycleConfig {
    /// Number of ticks that covers `ms`, rounded up.
    ///
    /// Returns 0 for a zero tick period; `validate` rejects that.
    #[inline]
    pub const fn ticks_for(&self, ms: u64) -> u64 {
        if self.tick_period_ms == 0 {
            return 0;
        }
        ms.div_ceil(self.tick_period_ms)
    }

    #[inline]
    pub fn period(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_period_ms)
    }
}

/// `[camera]`: hot-spot detection and field of view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    /// Corrected level a pixel must exceed to count as hot.
    pub threshold: i32,
    /// Added to each reference sample before subtraction. `-255` gives
    /// full-scale references.
    pub reference_offset: i32,
    /// Horizontal view angle [deg].
    pub fov_width_degrees: f64,
    /// Vertical view angle [deg].
    pub fov_height_degrees: f64,
    /// Flip the horizontal axis.
    pub mirror_x: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        let fov = FieldOfView::default();
        Self {
            threshold: DEFAULT_THRESHOLD,
            reference_offset: 0,
            fov_width_degrees: fov.width_degrees,
            fov_height_degrees: fov.height_degrees,
            mirror_x: false,
        }
    }
}

impl CameraConfig {
    pub fn locator(&self) -> CentroidLocator {
        CentroidLocator::new(self.threshold)
            .with_reference_offset(self.reference_offset)
            .with_fov(FieldOfView::new(
                self.fov_width_degrees,
                self.fov_height_degrees,
            ))
            .with_mirror_x(self.mirror_x)
    }
}

/// `[sequence]`: delays and servo positions of the firing cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SequenceConfig {
    /// Wait on every entry to acquisition [ms].
    pub settle_ms: u64,
    /// Servo position that pulls the trigger [deg].
    pub fire_position: f64,
    /// Time the trigger is held [ms].
    pub fire_dwell_ms: u64,
    /// Servo position with the trigger released [deg].
    pub rest_position: f64,
    /// Hold after releasing the trigger [ms].
    pub post_fire_ms: u64,
    /// Pause after returning, before the next acquisition [ms].
    pub reload_ms: u64,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            settle_ms: 5_500,
            fire_position: -10.0,
            fire_dwell_ms: 100,
            rest_position: 20.0,
            post_fire_ms: 5_000,
            reload_ms: 10_000,
        }
    }
}

/// `[calibration]`: absolute pose driven to at start-up [ticks].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CalibrationConfig {
    /// 180° turnaround on the yaw axis.
    pub yaw_setpoint: i64,
    pub pitch_setpoint: i64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            yaw_setpoint: -3_008,
            pitch_setpoint: 500,
        }
    }
}

impl CalibrationConfig {
    pub fn setpoints(&self) -> AxisPair<i64> {
        AxisPair::new(self.yaw_setpoint, self.pitch_setpoint)
    }
}

/// Gains, effort limit and convergence tolerance of one axis in one phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhaseTuning {
    pub kp: f64,
    #[serde(default)]
    pub ki: f64,
    #[serde(default)]
    pub kd: f64,
    /// Symmetric duty clamp [%].
    pub effort_limit: f64,
    /// Maximum |error| counted as on target [ticks].
    pub tolerance: f64,
}

impl PhaseTuning {
    pub const fn gains(&self) -> PidGains {
        PidGains::new(self.kp, self.ki, self.kd)
    }

    pub fn limit(&self) -> EffortLimit {
        EffortLimit::new(self.effort_limit)
    }
}

/// `[axes.<name>]`: one axis. All keys are required once the table exists.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AxisConfig {
    pub ticks_per_rev: f64,
    /// Camera → barrel correction [ticks], subtracted from aim setpoints.
    pub mount_offset: i64,
    /// Start-up drive to the calibration pose.
    pub calibration: PhaseTuning,
    /// Aim and return moves.
    pub aim: PhaseTuning,
}

impl AxisConfig {
    pub fn yaw_defaults() -> Self {
        Self {
            ticks_per_rev: 6_016.0,
            mount_offset: -40,
            calibration: CALIBRATION_TUNING,
            aim: PhaseTuning {
                kp: 0.57,
                ki: 0.0,
                kd: 0.0,
                effort_limit: 100.0,
                tolerance: 15.0,
            },
        }
    }

    pub fn pitch_defaults() -> Self {
        Self {
            ticks_per_rev: 3_609.6,
            mount_offset: -50,
            calibration: PhaseTuning {
                tolerance: 10.0,
                ..CALIBRATION_TUNING
            },
            aim: PhaseTuning {
                kp: 0.5,
                ki: 0.0007,
                kd: 0.0,
                effort_limit: 80.0,
                tolerance: 10.0,
            },
        }
    }

    pub fn mount(&self) -> AxisMount {
        AxisMount::new(self.ticks_per_rev, self.mount_offset)
    }
}

const CALIBRATION_TUNING: PhaseTuning = PhaseTuning {
    kp: 0.15,
    ki: 0.0002,
    kd: 0.03,
    effort_limit: 100.0,
    tolerance: 5.0,
};

/// `[axes]`: a missing axis table takes that axis' defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AxesConfig {
    #[serde(default = "AxisConfig::yaw_defaults")]
    pub yaw: AxisConfig,
    #[serde(default = "AxisConfig::pitch_defaults")]
    pub pitch: AxisConfig,
}

impl Default for AxesConfig {
    fn default() -> Self {
        Self {
            yaw: AxisConfig::yaw_defaults(),
            pitch: AxisConfig::pitch_defaults(),
        }
    }
}

impl AxesConfig {
    pub fn pair(&self) -> AxisPair<AxisConfig> {
        AxisPair::new(self.yaw, self.pitch)
    }
}

// ─── Root ───────────────────────────────────────────────────────────

/// Complete controller configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TurretConfig {
    pub logging: LoggingConfig,
    pub cycle: CycleConfig,
    pub camera: CameraConfig,
    pub sequence: SequenceConfig,
    pub calibration: CalibrationConfig,
    pub axes: AxesConfig,
    /// `[simulation]`, kept raw: only the binary knows the simulated
    /// hardware's parameter types. See [`TurretConfig::simulation_params`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simulation: Option<toml::Table>,
}

impl TurretConfig {
    /// Read, parse and validate a configuration file.
    pub fn load_validated(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::load(path)?;
        config.validate()?;
        debug!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Decode the `[simulation]` table; a missing table gives `T::default()`.
    pub fn simulation_params<T: DeserializeOwned + Default>(&self) -> Result<T, ConfigError> {
        match &self.simulation {
            Some(table) => toml::Value::Table(table.clone())
                .try_into()
                .map_err(|e| ConfigError::ParseError(format!("simulation: {e}"))),
            None => Ok(T::default()),
        }
    }

    /// Check parameter bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cycle.tick_period_ms == 0 {
            return Err(invalid("cycle.tick_period_ms must be > 0".into()));
        }

        if self.camera.threshold < 0 {
            return Err(invalid(format!(
                "camera.threshold must be >= 0, got {}",
                self.camera.threshold
            )));
        }
        check_fov("camera.fov_width_degrees", self.camera.fov_width_degrees)?;
        check_fov("camera.fov_height_degrees", self.camera.fov_height_degrees)?;

        for (name, deg) in [
            ("sequence.fire_position", self.sequence.fire_position),
            ("sequence.rest_position", self.sequence.rest_position),
        ] {
            if !deg.is_finite() {
                return Err(invalid(format!("{name} must be finite")));
            }
        }

        for axis in Axis::ORDER {
            let cfg = *self.axes.pair().get(axis);
            if !(cfg.ticks_per_rev.is_finite() && cfg.ticks_per_rev > 0.0) {
                return Err(invalid(format!(
                    "axes.{axis}.ticks_per_rev must be > 0, got {}",
                    cfg.ticks_per_rev
                )));
            }
            check_phase(axis, "calibration", &cfg.calibration)?;
            check_phase(axis, "aim", &cfg.aim)?;
        }

        Ok(())
    }
}

fn invalid(msg: String) -> ConfigError {
    ConfigError::ValidationError(msg)
}

fn check_fov(name: &str, deg: f64) -> Result<(), ConfigError> {
    if deg.is_finite() && deg > 0.0 && deg < 180.0 {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be in (0, 180), got {deg}")))
    }
}

fn check_phase(axis: Axis, phase: &str, t: &PhaseTuning) -> Result<(), ConfigError> {
    if !(t.effort_limit > 0.0 && t.effort_limit <= MAX_DUTY) {
        return Err(invalid(format!(
            "axes.{axis}.{phase}.effort_limit must be in (0, {MAX_DUTY}], got {}",
            t.effort_limit
        )));
    }
    if !(t.tolerance.is_finite() && t.tolerance >= 0.0) {
        return Err(invalid(format!(
            "axes.{axis}.{phase}.tolerance must be >= 0, got {}",
            t.tolerance
        )));
    }
    if ![t.kp, t.ki, t.kd].iter().all(|g| g.is_finite()) {
        return Err(invalid(format!("axes.{axis}.{phase} gains must be finite")));
    }
    Ok(())
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn empty_file_is_default() {
        let cfg = TurretConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.cycle.tick_period_ms, 20);
        assert_eq!(cfg.camera.threshold, 100);
        assert_eq!(cfg.calibration.setpoints(), AxisPair::new(-3_008, 500));
        assert_eq!(cfg.axes.yaw.mount_offset, -40);
        assert_eq!(cfg.axes.pitch.ticks_per_rev, 3_609.6);
        assert_eq!(cfg.axes.pitch.aim.effort_limit, 80.0);
        assert_eq!(cfg.axes.pitch.calibration.tolerance, 10.0);
        assert_eq!(cfg.axes.yaw.calibration.tolerance, 5.0);
        cfg.validate().unwrap();
    }

    #[test]
    fn ticks_round_up() {
        let c = CycleConfig { tick_period_ms: 20 };
        assert_eq!(c.ticks_for(100), 5);
        assert_eq!(c.ticks_for(5_500), 275);
        assert_eq!(c.ticks_for(101), 6);
        assert_eq!(c.ticks_for(0), 0);
        assert_eq!(CycleConfig { tick_period_ms: 0 }.ticks_for(100), 0);
    }

    #[test]
    fn partial_axis_table_is_rejected() {
        let err = TurretConfig::from_toml_str("[axes.yaw]\nmount_offset = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn missing_axis_keeps_its_own_defaults() {
        let toml = r#"
            [axes.yaw]
            ticks_per_rev = 4000.0
            mount_offset = 0
            calibration = { kp = 0.1, effort_limit = 50.0, tolerance = 3.0 }
            aim = { kp = 0.4, effort_limit = 60.0, tolerance = 8.0 }
        "#;
        let cfg = TurretConfig::from_toml_str(toml).unwrap();
        assert_eq!(cfg.axes.yaw.ticks_per_rev, 4000.0);
        assert_eq!(cfg.axes.yaw.calibration.ki, 0.0);
        assert_eq!(cfg.axes.pitch, AxisConfig::pitch_defaults());
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert!(TurretConfig::from_toml_str("[camera]\nthreshhold = 3\n").is_err());
    }

    #[test]
    fn validation_catches_bad_values() {
        let mut cfg = TurretConfig::default();
        cfg.cycle.tick_period_ms = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = TurretConfig::default();
        cfg.camera.threshold = -1;
        assert!(cfg.validate().is_err());

        let mut cfg = TurretConfig::default();
        cfg.camera.fov_width_degrees = 180.0;
        assert!(cfg.validate().is_err());

        let mut cfg = TurretConfig::default();
        cfg.axes.pitch.aim.effort_limit = 120.0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("axes.pitch.aim.effort_limit"));

        let mut cfg = TurretConfig::default();
        cfg.axes.yaw.calibration.tolerance = -1.0;
        assert!(cfg.validate().is_err());

        let mut cfg = TurretConfig::default();
        cfg.axes.yaw.ticks_per_rev = 0.0;
        assert!(cfg.validate().is_err());
    }

    #[derive(Debug, Default, PartialEq, Deserialize)]
    #[serde(default, deny_unknown_fields)]
    struct Plant {
        gain: f64,
        seed: u64,
    }

    #[test]
    fn simulation_table_decodes_on_demand() {
        let cfg = TurretConfig::from_toml_str("").unwrap();
        assert!(cfg.simulation.is_none());
        assert_eq!(cfg.simulation_params::<Plant>().unwrap(), Plant::default());

        let cfg = TurretConfig::from_toml_str("[simulation]
gain = 2.5
seed = 9
").unwrap();
        assert_eq!(
            cfg.simulation_params::<Plant>().unwrap(),
            Plant { gain: 2.5, seed: 9 }
        );

        let cfg = TurretConfig::from_toml_str("[simulation]
gian = 2.5
").unwrap();
        let err = cfg.simulation_params::<Plant>().unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(ref m) if m.starts_with("simulation")));
    }

    #[test]
    fn locator_follows_camera_section() {
        let cfg = CameraConfig {
            threshold: 42,
            fov_width_degrees: 60.0,
            ..Default::default()
        };
        let loc = cfg.locator();
        assert_eq!(loc.threshold(), 42);
        assert_eq!(loc.fov().width_degrees, 60.0);
    }

    #[test]
    fn load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[cycle]\ntick_period_ms = 10\n[sequence]\nreload_ms = 2000").unwrap();
        let cfg = TurretConfig::load_validated(file.path()).unwrap();
        assert_eq!(cfg.cycle.tick_period_ms, 10);
        assert_eq!(cfg.sequence.reload_ms, 2_000);
        assert_eq!(cfg.sequence.settle_ms, 5_500);
    }

    #[test]
    fn load_missing_file() {
        let err = TurretConfig::load_validated(Path::new("/nonexistent/turret.toml")).unwrap_err();
        assert_eq!(err, ConfigError::FileNotFound);
    }

    #[test]
    fn load_rejects_invalid_values() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[cycle]\ntick_period_ms = 0").unwrap();
        let err = TurretConfig::load_validated(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }
}
