//! # Liveness Guard
//!
//! An independently clocked hardware countdown. Once started, the host loop
//! must [`feed`](Watchdog::feed) it on every iteration; if a task body never
//! returns, the countdown expires and the hardware resets the board. This is
//! the only recovery path from a runaway task in a cooperative kernel.

/// Hardware watchdog contract.
pub trait Watchdog {
    /// Arm the countdown with the given timeout.
    fn start(&mut self, timeout_ms: u32);

    /// Restart the countdown.
    fn feed(&mut self);

    /// Keep the countdown from firing while the emergency dump is written.
    ///
    /// Hardware that cannot be stopped once started may instead grant one
    /// final full timeout window.
    fn suspend(&mut self);
}
