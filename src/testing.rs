//! Host-side stand-ins for the platform port.

use std::boxed::Box;
use std::string::String;

use core::fmt;

use crate::arch::Port;
use crate::clock::Clock;
use crate::watchdog::Watchdog;

/// A `'static` clock for one test. Leaked so tests can run in parallel
/// without sharing a counter.
pub fn leak_clock(ms: u32) -> &'static Clock {
    Box::leak(Box::new(Clock::starting_at(ms)))
}

#[derive(Debug, Default)]
pub struct MockWatchdog {
    pub timeout_ms: Option<u32>,
    pub feeds: u32,
    pub suspended: bool,
}

impl Watchdog for MockWatchdog {
    fn start(&mut self, timeout_ms: u32) {
        self.timeout_ms = Some(timeout_ms);
    }

    fn feed(&mut self) {
        self.feeds += 1;
    }

    fn suspend(&mut self) {
        self.suspended = true;
    }
}

/// Records everything the kernel asks of the platform. `hard_reset`
/// panics, standing in for a reset that never returns.
#[derive(Debug, Default)]
pub struct MockPort {
    pub output: String,
    pub watchdog: MockWatchdog,
    pub interrupts_disabled: bool,
    pub resets: u32,
}

impl fmt::Write for MockPort {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.output.push_str(s);
        Ok(())
    }
}

impl Port for MockPort {
    type Watchdog = MockWatchdog;

    fn watchdog(&mut self) -> &mut MockWatchdog {
        &mut self.watchdog
    }

    fn disable_interrupts(&mut self) {
        self.interrupts_disabled = true;
    }

    fn hard_reset(&mut self) -> ! {
        self.resets += 1;
        panic!("hard reset");
    }
}
