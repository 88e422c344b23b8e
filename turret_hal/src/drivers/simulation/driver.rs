//! Simulation rig.
//!
//! `SimulationRig` bundles one simulated driver per hardware trait in the
//! shape the control unit consumes: a yaw/pitch pair of axes, the thermal
//! sensor and the firing servo.

use serde::{Deserialize, Serialize};
use tracing::info;

use turret_common::state::AxisPair;

use super::physics::{AxisPlantConfig, SimAxis};
use super::servo::SimServo;
use super::thermal::{SimThermalSensor, ThermalSceneConfig};

/// Parameters for every simulated device.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Plant parameters per axis.
    pub axes: AxisPair<AxisPlantConfig>,
    /// Thermal scene parameters.
    pub scene: ThermalSceneConfig,
}

impl SimulationConfig {
    /// Set the plant integration step on both axes.
    pub fn with_tick_period(mut self, tick_s: f64) -> Self {
        self.axes.yaw.tick_s = tick_s;
        self.axes.pitch.tick_s = tick_s;
        self
    }
}

/// One complete set of simulated turret hardware.
#[derive(Debug, Clone)]
pub struct SimulationRig {
    /// Yaw and pitch axes.
    pub axes: AxisPair<SimAxis>,
    /// Thermal imaging sensor.
    pub sensor: SimThermalSensor,
    /// Firing servo.
    pub servo: SimServo,
}

impl SimulationRig {
    /// Build the rig with an empty scene.
    pub fn new(config: &SimulationConfig) -> Self {
        info!(
            "Simulation rig: yaw {:.0} ticks/s/%, pitch {:.0} ticks/s/%, tick {:.3}s",
            config.axes.yaw.speed_per_duty,
            config.axes.pitch.speed_per_duty,
            config.axes.yaw.tick_s
        );
        Self {
            axes: AxisPair::new(
                SimAxis::new("yaw", config.axes.yaw),
                SimAxis::new("pitch", config.axes.pitch),
            ),
            sensor: SimThermalSensor::new(config.scene),
            servo: SimServo::new(),
        }
    }
}

impl Default for SimulationRig {
    fn default() -> Self {
        Self::new(&SimulationConfig::default())
    }
}
