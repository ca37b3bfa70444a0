//! # Architecture Abstraction Layer
//!
//! Platform capabilities the kernel needs but cannot provide itself:
//! a diagnostic sink, the liveness guard, interrupt masking and a hard
//! reset. The scheduler is generic over [`Port`], so host tests can swap
//! in a recording implementation.

use core::fmt;

use crate::watchdog::Watchdog;

#[cfg(target_arch = "arm")]
pub mod cortex_m4;

/// Services injected into the scheduler by the platform.
///
/// The port itself is the line-oriented diagnostic sink used by the
/// emergency dump.
pub trait Port: fmt::Write {
    type Watchdog: Watchdog;

    /// The board's liveness guard.
    fn watchdog(&mut self) -> &mut Self::Watchdog;

    /// Mask all maskable interrupts. The kernel never unmasks them again.
    fn disable_interrupts(&mut self);

    /// Restart the processor from its reset vector.
    fn hard_reset(&mut self) -> !;
}
