//! Tick-counted delays.

/// Countdown over control ticks.
///
/// A delay of `n` ticks reports pending on `n` calls to [`TickDelay::tick`]
/// and elapsed from the next call on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickDelay {
    remaining: u64,
}

impl TickDelay {
    pub const fn new(ticks: u64) -> Self {
        Self { remaining: ticks }
    }

    /// Consume one tick. Returns `true` once the delay has elapsed.
    #[inline]
    pub fn tick(&mut self) -> bool {
        if self.remaining == 0 {
            return true;
        }
        self.remaining -= 1;
        false
    }

    #[inline]
    pub const fn remaining(&self) -> u64 {
        self.remaining
    }
}
