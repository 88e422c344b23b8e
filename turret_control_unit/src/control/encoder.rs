//! Quadrature position tracking over a wrapping 16-bit counter.
//!
//! The hardware timer counts modulo 65536. Between two reads the shaft must
//! move less than half the counter range; under that assumption the shortest
//! signed distance between the readings is the true motion, and summing those
//! distances gives an unbounded absolute position.

use static_assertions::const_assert_eq;
use tracing::{debug, trace};

use turret_common::consts::{COUNTER_HALF_RANGE, COUNTER_MODULUS};
use turret_common::hal::driver::{AxisDriver, HalError};

const_assert_eq!(COUNTER_HALF_RANGE * 2, COUNTER_MODULUS);
const_assert_eq!(COUNTER_MODULUS, u16::MAX as i32 + 1);

/// Wrap-corrected signed distance from `last` to `new` [ticks].
///
/// Result lies in `[-32768, 32768]`.
#[inline]
pub const fn wrap_delta(last: u16, new: u16) -> i32 {
    let delta = new as i32 - last as i32;
    if delta > COUNTER_HALF_RANGE {
        delta - COUNTER_MODULUS
    } else if delta < -COUNTER_HALF_RANGE {
        delta + COUNTER_MODULUS
    } else {
        delta
    }
}

/// Last raw counter reading and the absolute position derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncoderState {
    /// Raw hardware counter at the last update.
    pub raw_counter: u16,
    /// Accumulated position [ticks].
    pub absolute_position: i64,
}

impl EncoderState {
    /// Fold one new raw reading into the state.
    #[inline]
    pub const fn advance(self, new_raw: u16) -> Self {
        Self {
            raw_counter: new_raw,
            absolute_position: self.absolute_position + wrap_delta(self.raw_counter, new_raw) as i64,
        }
    }
}

/// Absolute position tracker for one axis.
///
/// Holds only the bookkeeping; the counter itself is read through the
/// axis driver passed into each call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuadratureTracker {
    state: EncoderState,
}

impl QuadratureTracker {
    /// Start tracking from the counter's current value at position 0.
    pub fn attach<D: AxisDriver + ?Sized>(driver: &mut D) -> Result<Self, HalError> {
        let raw = driver.read_counter()?;
        Ok(Self {
            state: EncoderState {
                raw_counter: raw,
                absolute_position: 0,
            },
        })
    }

    /// Raw counter pass-through.
    #[inline]
    pub fn read<D: AxisDriver + ?Sized>(driver: &mut D) -> Result<u16, HalError> {
        driver.read_counter()
    }

    /// Read the counter and extend `(last_raw, last_absolute)` by the
    /// wrap-corrected delta.
    pub fn update<D: AxisDriver + ?Sized>(
        driver: &mut D,
        last_raw: u16,
        last_absolute: i64,
    ) -> Result<(u16, i64), HalError> {
        let new_raw = driver.read_counter()?;
        let next = EncoderState {
            raw_counter: last_raw,
            absolute_position: last_absolute,
        }
        .advance(new_raw);
        Ok((next.raw_counter, next.absolute_position))
    }

    /// Update against the tracker's own state. Returns the new position.
    pub fn tick<D: AxisDriver + ?Sized>(&mut self, driver: &mut D) -> Result<i64, HalError> {
        let (raw, abs) =
            Self::update(driver, self.state.raw_counter, self.state.absolute_position)?;
        trace!("encoder raw={} abs={}", raw, abs);
        self.state = EncoderState {
            raw_counter: raw,
            absolute_position: abs,
        };
        Ok(abs)
    }

    /// Reset the hardware counter and the tracked position to 0.
    pub fn zero<D: AxisDriver + ?Sized>(&mut self, driver: &mut D) -> Result<(), HalError> {
        driver.reset_counter()?;
        self.state = EncoderState::default();
        debug!("encoder zeroed");
        Ok(())
    }

    /// Make the current shaft position the new 0 without touching the
    /// hardware counter.
    pub fn rebase<D: AxisDriver + ?Sized>(&mut self, driver: &mut D) -> Result<(), HalError> {
        let raw = driver.read_counter()?;
        debug!(
            "encoder rebased at raw={} (was abs={})",
            raw, self.state.absolute_position
        );
        self.state = EncoderState {
            raw_counter: raw,
            absolute_position: 0,
        };
        Ok(())
    }

    /// Tracked position [ticks].
    #[inline]
    pub const fn position(&self) -> i64 {
        self.state.absolute_position
    }

    #[inline]
    pub const fn state(&self) -> EncoderState {
        self.state
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
