//! # Clock Source
//!
//! A free-running millisecond counter advanced only from the timer
//! interrupt (SysTick at `TICK_HZ`). Every other context treats it as
//! read-only.
//!
//! ## Concurrency
//!
//! The counter is a single 32-bit word. The interrupt handler is the only
//! writer, so it never needs a read-modify-write instruction: it loads,
//! increments and stores with `Release`. Readers load with `Acquire`. A
//! 32-bit aligned access is a single bus transaction on Cortex-M, so a read
//! can never observe a torn value and no critical section is required.
//!
//! ## Wraparound
//!
//! The counter wraps after roughly 49.7 days. All due-time comparisons go
//! through [`is_due`], which subtracts with wrapping semantics. Never
//! compare `now > last_run + period`.

use core::sync::atomic::{AtomicU32, Ordering};

/// Millisecond counter shared between the tick interrupt and the kernel.
///
/// Typically lives in a `static` so the SysTick handler can reach it:
///
/// ```ignore
/// static CLOCK: Clock = Clock::new();
///
/// #[exception]
/// fn SysTick() {
///     CLOCK.tick();
/// }
/// ```
#[derive(Debug)]
pub struct Clock {
    millis: AtomicU32,
}

impl Clock {
    /// A clock reading zero.
    pub const fn new() -> Self {
        Self::starting_at(0)
    }

    /// A clock reading `ms`. Useful for exercising counter wraparound.
    pub const fn starting_at(ms: u32) -> Self {
        Self {
            millis: AtomicU32::new(ms),
        }
    }

    /// Advance by one millisecond. Interrupt context only.
    #[inline]
    pub fn tick(&self) {
        self.advance(1);
    }

    /// Advance by `ms` milliseconds, wrapping at `u32::MAX`.
    ///
    /// Must only be called by the single writer (the tick interrupt, or a
    /// simulation standing in for it).
    #[inline]
    pub fn advance(&self, ms: u32) {
        let current = self.millis.load(Ordering::Relaxed);
        self.millis.store(current.wrapping_add(ms), Ordering::Release);
    }

    /// Milliseconds since the clock started, modulo 2³².
    #[inline]
    pub fn now(&self) -> u32 {
        self.millis.load(Ordering::Acquire)
    }

    /// Milliseconds elapsed since `start`, correct across one wrap.
    #[inline]
    pub fn elapsed_since(&self, start: u32) -> u32 {
        self.now().wrapping_sub(start)
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

/// Wraparound-safe due test: true once at least `period` milliseconds have
/// passed between `last_run` and `now`.
#[inline]
pub const fn is_due(now: u32, last_run: u32, period: u32) -> bool {
    now.wrapping_sub(last_run) >= period
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_and_advance() {
        let clock = Clock::new();
        assert_eq!(clock.now(), 0);

        clock.tick();
        clock.tick();
        assert_eq!(clock.now(), 2);

        clock.advance(998);
        assert_eq!(clock.now(), 1000);
    }

    #[test]
    fn test_counter_wraps() {
        let clock = Clock::starting_at(u32::MAX - 1);
        clock.tick();
        assert_eq!(clock.now(), u32::MAX);
        clock.tick();
        assert_eq!(clock.now(), 0);
        assert_eq!(clock.elapsed_since(u32::MAX - 1), 2);
    }

    #[test]
    fn test_is_due_boundary() {
        assert!(is_due(1000, 0, 1000));
        assert!(!is_due(999, 0, 1000));
        assert!(is_due(1001, 0, 1000));
    }

    #[test]
    fn test_is_due_across_wrap() {
        let last_run = u32::MAX - 499;

        // 499 ms elapsed, counter has not wrapped yet
        assert!(!is_due(u32::MAX, last_run, 1000));
        // 999 ms elapsed, counter wrapped
        assert!(!is_due(499, last_run, 1000));
        // exactly 1000 ms elapsed across the wrap
        assert!(is_due(500, last_run, 1000));

        // The naive comparison gets this wrong: last_run + period overflows
        // to 500, so it fires long before the period has elapsed.
        let naive_due = |now: u32| now >= last_run.wrapping_add(1000);
        assert!(naive_due(u32::MAX));
        assert!(!is_due(u32::MAX, last_run, 1000));
    }
}
