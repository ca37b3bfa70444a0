//! # Kernel
//!
//! The host loop that drives TickOS. It alternates one dispatch pass with
//! one liveness-guard reset, forever.
//!
//! ## Startup Sequence
//!
//! ```text
//! reset_handler (cortex-m-rt)
//!   └─► main()
//!         ├─► configure_systick()     ← SysTick feeds the Clock
//!         ├─► Scheduler::new()        ← Port, clock, app state
//!         ├─► add_task() (×N)         ← Register periodic tasks
//!         └─► kernel::start()         ← Arm watchdog (no return)
//!               └─► loop {
//!                     scheduler.run()
//!                     scheduler.feed_watchdog()
//!                   }
//! ```
//!
//! A task body that never returns stops the feeding, and the watchdog
//! resets the board after `WATCHDOG_TIMEOUT_MS`.

use crate::arch::Port;
use crate::scheduler::Scheduler;

/// One iteration of the host loop: a dispatch pass, then a guard reset.
#[inline]
pub fn spin_once<P: Port, S>(scheduler: &mut Scheduler<P, S>) {
    scheduler.run();
    scheduler.feed_watchdog();
}

/// Arm the liveness guard and run the host loop. **Does not return.**
pub fn start<P: Port, S>(scheduler: &mut Scheduler<P, S>) -> ! {
    scheduler.start();
    loop {
        spin_once(scheduler);
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------
