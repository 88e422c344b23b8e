//! Simulated thermal scene.
//!
//! A static background (base level plus a fixed per-pixel pattern), optional
//! frame-to-frame noise and at most one disc-shaped hot spot. The scene is
//! rendered as raw samples centred on zero and quantised into bytes the same
//! way a real sensor read is. Pattern and noise come from seeded `StdRng`s,
//! so captures are reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use turret_common::consts::{FRAME_HEIGHT, FRAME_PIXELS, FRAME_WIDTH};
use turret_common::frame::{DEFAULT_QUANTISE_OFFSET, DEFAULT_QUANTISE_SCALE, ThermalFrame};
use turret_common::hal::driver::{HalError, ThermalSensor};

/// Static scene parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThermalSceneConfig {
    /// Mean background level.
    pub background: u8,
    /// Peak amplitude of the fixed background pattern.
    pub pattern_amplitude: u8,
    /// Peak amplitude of per-capture noise.
    pub noise_amplitude: u8,
    /// Noise generator seed.
    pub seed: u64,
}

impl Default for ThermalSceneConfig {
    fn default() -> Self {
        Self {
            background: 60,
            pattern_amplitude: 12,
            noise_amplitude: 4,
            seed: 0x5EED_7A26,
        }
    }
}

/// A warm object in the field of view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HotSpot {
    /// Centre column (0-based, left to right).
    pub col: f64,
    /// Centre row (0-based, top to bottom).
    pub row: f64,
    /// Disc radius [pixels].
    pub radius: f64,
    /// Level added above the background inside the disc.
    pub intensity: u8,
}

impl HotSpot {
    /// Hot spot centred on pixel `(col, row)`.
    pub fn at(col: f64, row: f64) -> Self {
        Self {
            col,
            row,
            radius: 1.5,
            intensity: 180,
        }
    }

    /// Whether pixel `(col, row)` lies inside the disc.
    pub fn covers(&self, col: usize, row: usize) -> bool {
        let dx = col as f64 - self.col;
        let dy = row as f64 - self.row;
        dx * dx + dy * dy <= self.radius * self.radius
    }
}

/// Simulated 32×24 thermal sensor implementing [`ThermalSensor`].
#[derive(Debug, Clone)]
pub struct SimThermalSensor {
    config: ThermalSceneConfig,
    /// Raw background samples, centred on zero.
    background: [f32; FRAME_PIXELS],
    target: Option<HotSpot>,
    noise: StdRng,
    captures: u64,
    fail_captures: u32,
}

impl SimThermalSensor {
    /// Build the scene. The fixed pattern is derived from the seed.
    pub fn new(config: ThermalSceneConfig) -> Self {
        let mut pattern = StdRng::seed_from_u64(config.seed ^ PATTERN_SEED_MIX);
        let base = config.background as f32 - DEFAULT_QUANTISE_OFFSET;
        let amplitude = config.pattern_amplitude as i32;
        let mut background = [0.0f32; FRAME_PIXELS];
        for px in background.iter_mut() {
            *px = base + pattern.random_range(-amplitude..=amplitude) as f32;
        }
        Self {
            config,
            background,
            target: None,
            noise: StdRng::seed_from_u64(config.seed),
            captures: 0,
            fail_captures: 0,
        }
    }

    /// Place (or remove) the hot spot.
    pub fn set_target(&mut self, target: Option<HotSpot>) {
        debug!("Thermal scene target: {:?}", target);
        self.target = target;
    }

    /// Current hot spot.
    pub fn target(&self) -> Option<HotSpot> {
        self.target
    }

    /// Number of successful captures.
    pub fn captures(&self) -> u64 {
        self.captures
    }

    /// Fail the next `n` captures.
    pub fn fail_next_captures(&mut self, n: u32) {
        self.fail_captures = n;
    }

    /// Raw samples of the next frame: background, noise and hot spot.
    fn sample(&mut self) -> [f32; FRAME_PIXELS] {
        let amplitude = self.config.noise_amplitude as i32;
        let mut raw = self.background;
        for row in 0..FRAME_HEIGHT {
            for col in 0..FRAME_WIDTH {
                let px = &mut raw[row * FRAME_WIDTH + col];
                *px += self.noise.random_range(-amplitude..=amplitude) as f32;
                if let Some(spot) = self.target.filter(|s| s.covers(col, row)) {
                    *px += spot.intensity as f32;
                }
            }
        }
        raw
    }
}

impl ThermalSensor for SimThermalSensor {
    fn name(&self) -> &'static str {
        "simulation"
    }

    fn capture(&mut self) -> Result<ThermalFrame, HalError> {
        if self.fail_captures > 0 {
            self.fail_captures -= 1;
            return Err(HalError::Sensor("simulated frame timeout".to_string()));
        }
        let raw = self.sample();
        let frame = ThermalFrame::from_raw(&raw, DEFAULT_QUANTISE_SCALE, DEFAULT_QUANTISE_OFFSET)
            .map_err(|e| HalError::Sensor(e.to_string()))?;
        self.captures += 1;
        trace!("Thermal capture #{}", self.captures);
        Ok(frame)
    }
}

/// Decorrelates the pattern generator from the noise generator.
const PATTERN_SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;
