//! Fixed-size thermal frame.
//!
//! One frame is 768 intensity bytes, 32 columns × 24 rows, row-major with the
//! origin at the top-left pixel. Frames are immutable snapshots once built.

use thiserror::Error;

use crate::consts::{FRAME_HEIGHT, FRAME_PIXELS, FRAME_WIDTH};

/// Default offset applied when quantising raw sensor samples (raw values
/// arrive centred on zero).
pub const DEFAULT_QUANTISE_OFFSET: f32 = 128.0;

/// Default scale applied when quantising raw sensor samples.
pub const DEFAULT_QUANTISE_SCALE: f32 = 1.0;

/// Error building a frame from a sample buffer of the wrong length.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("thermal frame needs {expected} samples, got {actual}")]
pub struct FrameSizeError {
    pub expected: usize,
    pub actual: usize,
}

/// 32×24 thermal intensity snapshot.
#[derive(Clone, PartialEq, Eq)]
pub struct ThermalFrame {
    pixels: [u8; FRAME_PIXELS],
}

impl ThermalFrame {
    /// Frame with every pixel at `level`.
    pub const fn uniform(level: u8) -> Self {
        Self {
            pixels: [level; FRAME_PIXELS],
        }
    }

    /// Wrap an owned pixel buffer.
    pub const fn from_pixels(pixels: [u8; FRAME_PIXELS]) -> Self {
        Self { pixels }
    }

    /// Copy a byte slice into a frame.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FrameSizeError> {
        let pixels: [u8; FRAME_PIXELS] = bytes.try_into().map_err(|_| FrameSizeError {
            expected: FRAME_PIXELS,
            actual: bytes.len(),
        })?;
        Ok(Self { pixels })
    }

    /// Quantise raw sensor samples into bytes: `raw * scale + offset`,
    /// saturated into `[0, 255]`.
    pub fn from_raw(raw: &[f32], scale: f32, offset: f32) -> Result<Self, FrameSizeError> {
        if raw.len() != FRAME_PIXELS {
            return Err(FrameSizeError {
                expected: FRAME_PIXELS,
                actual: raw.len(),
            });
        }
        let mut pixels = [0u8; FRAME_PIXELS];
        for (dst, &sample) in pixels.iter_mut().zip(raw) {
            // `as` saturates float → int and maps NaN to 0.
            *dst = (sample * scale + offset) as u8;
        }
        Ok(Self { pixels })
    }

    /// Sample at row-major index `i`.
    #[inline]
    pub fn get(&self, i: usize) -> Option<u8> {
        self.pixels.get(i).copied()
    }

    /// Sample at zero-based column/row (row 0 is the top row).
    #[inline]
    pub fn at(&self, col: usize, row: usize) -> Option<u8> {
        if col >= FRAME_WIDTH || row >= FRAME_HEIGHT {
            return None;
        }
        self.get(row * FRAME_WIDTH + col)
    }

    /// Replace the sample at zero-based column/row. Out-of-range is ignored.
    pub fn set(&mut self, col: usize, row: usize, level: u8) {
        if col < FRAME_WIDTH && row < FRAME_HEIGHT {
            self.pixels[row * FRAME_WIDTH + col] = level;
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.pixels
    }

    #[inline]
    pub fn pixels(&self) -> &[u8; FRAME_PIXELS] {
        &self.pixels
    }
}

impl Default for ThermalFrame {
    fn default() -> Self {
        Self::uniform(0)
    }
}

impl std::fmt::Debug for ThermalFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (min, max) = self
            .pixels
            .iter()
            .fold((u8::MAX, u8::MIN), |(lo, hi), &p| (lo.min(p), hi.max(p)));
        f.debug_struct("ThermalFrame")
            .field("min", &min)
            .field("max", &max)
            .finish()
    }
}
