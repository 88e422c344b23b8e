//! Background-subtracted hot-spot centroid.
//!
//! Each sample is corrected against the reference frame, negative values are
//! floored at 0, and every pixel whose corrected value exceeds the threshold
//! votes with its 1-based pixel coordinate. The centroid is the mean vote.
//!
//! Pixel coordinates: `x = col + 1` (1 at the left edge), `y = 24 − row`
//! (24 on the top row, 1 on the bottom row).

use turret_common::consts::{FRAME_HEIGHT, FRAME_WIDTH};
use turret_common::frame::ThermalFrame;

use super::aim::{AimAngles, FieldOfView};

/// Default detection threshold above background.
pub const DEFAULT_THRESHOLD: i32 = 100;

/// Mean pixel position of the hot pixels in one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Centroid {
    /// Mean x in `[1, 32]`.
    pub pixel_x: f64,
    /// Mean y in `[1, 24]`.
    pub pixel_y: f64,
    /// Number of pixels above threshold.
    pub pixel_count: usize,
}

/// Frame-centre pixel coordinate used as the zero-angle reference.
pub const FRAME_CENTRE: (f64, f64) = ((FRAME_WIDTH / 2) as f64, (FRAME_HEIGHT / 2) as f64);

/// Centroid extraction and pixel → angle conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CentroidLocator {
    threshold: i32,
    reference_offset: i32,
    fov: FieldOfView,
    mirror_x: bool,
}

impl Default for CentroidLocator {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl CentroidLocator {
    pub fn new(threshold: i32) -> Self {
        Self {
            threshold,
            reference_offset: 0,
            fov: FieldOfView::default(),
            mirror_x: false,
        }
    }

    /// Offset added to every reference sample before subtraction.
    pub fn with_reference_offset(mut self, offset: i32) -> Self {
        self.reference_offset = offset;
        self
    }

    pub fn with_fov(mut self, fov: FieldOfView) -> Self {
        self.fov = fov;
        self
    }

    /// Flip the horizontal axis (camera mounted upside down or mirrored).
    pub fn with_mirror_x(mut self, mirror_x: bool) -> Self {
        self.mirror_x = mirror_x;
        self
    }

    #[inline]
    pub const fn threshold(&self) -> i32 {
        self.threshold
    }

    #[inline]
    pub const fn fov(&self) -> FieldOfView {
        self.fov
    }

    /// Background-corrected sample, floored at 0.
    #[inline]
    fn corrected(&self, reference: u8, sample: u8) -> i32 {
        let baseline = reference as i32 + self.reference_offset;
        (sample as i32 - baseline).max(0)
    }

    /// Centroid of pixels hotter than the threshold, or `None`.
    pub fn locate(&self, reference: &ThermalFrame, sample: &ThermalFrame) -> Option<Centroid> {
        let mut sum_x = 0usize;
        let mut sum_y = 0usize;
        let mut count = 0usize;

        let pairs = reference.pixels().iter().zip(sample.pixels().iter());
        for (i, (&r, &s)) in pairs.enumerate() {
            if self.corrected(r, s) > self.threshold {
                sum_x += i % FRAME_WIDTH + 1;
                sum_y += FRAME_HEIGHT - i / FRAME_WIDTH;
                count += 1;
            }
        }

        if count == 0 {
            return None;
        }
        Some(Centroid {
            pixel_x: sum_x as f64 / count as f64,
            pixel_y: sum_y as f64 / count as f64,
            pixel_count: count,
        })
    }

    /// Angular offset of a centroid from the frame centre. Linear, no lens
    /// correction.
    pub fn to_angles(&self, centroid: Option<Centroid>) -> Option<AimAngles> {
        let c = centroid?;
        let (cx, cy) = FRAME_CENTRE;
        let dx = if self.mirror_x { cx - c.pixel_x } else { c.pixel_x - cx };
        let dy = c.pixel_y - cy;
        Some(AimAngles {
            yaw_degrees: dx * self.fov.width_degrees / FRAME_WIDTH as f64,
            pitch_degrees: dy * self.fov.height_degrees / FRAME_HEIGHT as f64,
        })
    }

    /// `locate` then `to_angles`.
    pub fn find_angles(&self, reference: &ThermalFrame, sample: &ThermalFrame) -> Option<AimAngles> {
        self.to_angles(self.locate(reference, sample))
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
