//! # Synchronization Primitives
//!
//! The kernel itself needs no locks: the task table and semaphore pool are
//! only touched from the single cooperative context, and the clock is an
//! atomic word. Anything else shared with an interrupt handler (such as the
//! ITM port used by the logger) goes through [`critical_section`].

use cortex_m::interrupt;

/// Execute a closure with interrupts disabled, restoring the previous
/// state on exit.
///
/// ```ignore
/// sync::critical_section(|_cs| {
///     // touch state shared with an ISR
/// });
/// ```
///
/// Keep the closure short; it delays the SysTick that feeds the clock.
#[inline]
pub fn critical_section<F, R>(f: F) -> R
where
    F: FnOnce(&interrupt::CriticalSection) -> R,
{
    interrupt::free(f)
}
