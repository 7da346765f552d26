//! Simulation time model.
//!
//! Time is represented as a monotonically increasing `Tick` counter. Wall-clock
//! pacing is a separate concern ([`TickClock`]): the tick loop advances logical
//! time unconditionally and only *sleeps* to keep real time roughly in step,
//! so tests can drive thousands of ticks with zero wall-clock cost by never
//! calling [`TickClock::sleep_until_next`].

use std::fmt;
use std::time::{Duration, Instant};

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }

    /// The tick `n` steps before `self`, saturating at zero.
    #[inline]
    pub fn saturating_sub(self, n: u64) -> Tick {
        Tick(self.0.saturating_sub(n))
    }

    /// Ticks elapsed from `earlier` to `self`.
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl std::ops::Sub for Tick {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Tick) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── TickClock ─────────────────────────────────────────────────────────────────

/// Advances `current_tick` and paces the loop against wall-clock time.
///
/// Each tick is meant to occupy `tick_period_ms` of wall time. If a tick's
/// work (planning, rendering) takes longer than the period, the next sleep is
/// simply skipped rather than accumulating a backlog — the simulation never
/// tries to "catch up" by running extra ticks back to back.
#[derive(Debug)]
pub struct TickClock {
    pub tick_period: Duration,
    pub current_tick: Tick,
    last_boundary: Instant,
}

impl TickClock {
    pub fn new(tick_period_ms: u64) -> Self {
        Self {
            tick_period: Duration::from_millis(tick_period_ms),
            current_tick: Tick::ZERO,
            last_boundary: Instant::now(),
        }
    }

    /// Advance to the next tick.
    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = self.current_tick.offset(1);
    }

    /// Sleep out the remainder of the current tick's wall-clock period, then
    /// reset the boundary for the next tick.
    pub fn sleep_until_next(&mut self) {
        let elapsed = self.last_boundary.elapsed();
        if let Some(remaining) = self.tick_period.checked_sub(elapsed) {
            std::thread::sleep(remaining);
        }
        self.last_boundary = Instant::now();
    }
}
