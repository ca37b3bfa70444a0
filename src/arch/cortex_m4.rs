//! # Cortex-M4 Port Layer
//!
//! Hardware-specific code for an STM32F4-class ARM Cortex-M4:
//!
//! - **SysTick** drives the millisecond [`Clock`](crate::clock::Clock)
//! - **IWDG** (independent watchdog, clocked by the ~32 kHz LSI) is the
//!   liveness guard
//! - **ITM** stimulus port 0 is the diagnostic sink for emergency dumps
//!   (stimulus port 1 carries `log` output, see [`crate::logger`])
//! - **SCB** system reset request performs the hard reset
//!
//! There is no context switching: tasks run to completion on the main stack.

use core::fmt;
use core::ptr;

use cortex_m::peripheral::itm::Stim;
use cortex_m::peripheral::syst::SystClkSource;
use cortex_m::peripheral::{ITM, SCB, SYST};

use crate::arch::Port;
use crate::config::{DUMP_FLUSH_CYCLES, SYSTEM_CLOCK_HZ, TICK_HZ};
use crate::watchdog::Watchdog;

// ---------------------------------------------------------------------------
// SysTick configuration
// ---------------------------------------------------------------------------

/// Configure SysTick to fire at `TICK_HZ` from the processor clock.
///
/// The `SysTick` exception handler must call `Clock::tick()`.
pub fn configure_systick(syst: &mut SYST) {
    let reload = SYSTEM_CLOCK_HZ / TICK_HZ - 1;
    syst.set_reload(reload);
    syst.clear_current();
    syst.set_clock_source(SystClkSource::Core);
    syst.enable_counter();
    syst.enable_interrupt();
}

// ---------------------------------------------------------------------------
// Independent watchdog
// ---------------------------------------------------------------------------

const IWDG_BASE: usize = 0x4000_3000;
const IWDG_KR: *mut u32 = IWDG_BASE as *mut u32;
const IWDG_PR: *mut u32 = (IWDG_BASE + 0x04) as *mut u32;
const IWDG_RLR: *mut u32 = (IWDG_BASE + 0x08) as *mut u32;
const IWDG_SR: *const u32 = (IWDG_BASE + 0x0C) as *const u32;

const KEY_RELOAD: u32 = 0xAAAA;
const KEY_UNLOCK: u32 = 0x5555;
const KEY_START: u32 = 0xCCCC;

/// LSI / 32 ≈ 1 kHz, so one reload count is about one millisecond.
const PRESCALER_DIV32: u32 = 0b011;
const MAX_RELOAD: u32 = 0x0FFF;

/// STM32 independent watchdog.
///
/// Once started the IWDG cannot be stopped by software, so
/// [`suspend`](Watchdog::suspend) reloads it one last time instead.
pub struct Iwdg {
    _private: (),
}

impl Iwdg {
    /// # Safety
    /// The caller must be the only owner of the IWDG registers.
    pub const unsafe fn steal() -> Self {
        Self { _private: () }
    }
}

impl Watchdog for Iwdg {
    fn start(&mut self, timeout_ms: u32) {
        let reload = timeout_ms.clamp(1, MAX_RELOAD + 1) - 1;
        unsafe {
            ptr::write_volatile(IWDG_KR, KEY_START);
            ptr::write_volatile(IWDG_KR, KEY_UNLOCK);
            ptr::write_volatile(IWDG_PR, PRESCALER_DIV32);
            ptr::write_volatile(IWDG_RLR, reload);
            // PVU/RVU clear once the LSI domain has latched the new values
            while ptr::read_volatile(IWDG_SR) & 0b11 != 0 {}
            ptr::write_volatile(IWDG_KR, KEY_RELOAD);
        }
    }

    #[inline]
    fn feed(&mut self) {
        unsafe { ptr::write_volatile(IWDG_KR, KEY_RELOAD) }
    }

    fn suspend(&mut self) {
        self.feed();
    }
}

// ---------------------------------------------------------------------------
// ITM sink
// ---------------------------------------------------------------------------

/// `fmt::Write` adapter over one ITM stimulus port.
pub struct StimWriter<'a>(pub &'a mut Stim);

impl fmt::Write for StimWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        cortex_m::itm::write_str(self.0, s);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Port
// ---------------------------------------------------------------------------

/// The Cortex-M4 platform port handed to the scheduler.
pub struct CortexM4 {
    itm: ITM,
    iwdg: Iwdg,
}

impl CortexM4 {
    pub fn new(itm: ITM, iwdg: Iwdg) -> Self {
        Self { itm, iwdg }
    }
}

impl fmt::Write for CortexM4 {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        StimWriter(&mut self.itm.stim[0]).write_str(s)
    }
}

impl Port for CortexM4 {
    type Watchdog = Iwdg;

    fn watchdog(&mut self) -> &mut Iwdg {
        &mut self.iwdg
    }

    fn disable_interrupts(&mut self) {
        cortex_m::interrupt::disable();
    }

    fn hard_reset(&mut self) -> ! {
        // Let the trace FIFO drain before the core goes down.
        cortex_m::asm::delay(DUMP_FLUSH_CYCLES);
        SCB::sys_reset()
    }
}
