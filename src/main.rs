//! # TickOS Example Firmware
//!
//! Four periodic tasks sharing a small in-memory file store:
//!
//! | Task | Period | Priority | Behavior |
//! |------|--------|----------|----------|
//! | `counter_task` | 1 s | 0 | Bumps a counter and persists it to `counter.txt` |
//! | `status_task` | 2 s | 2 | Logs the counter, warns if it stopped moving |
//! | `monitor_task` | 10 s | 3 | Reports system info and overruns, dumps on a corrupt store |
//! | `config_watch_task` | 4 s | 4 | Restores `counter.txt` if missing, echoes `config.txt` |
//!
//! Output goes to the ITM: stimulus port 1 carries `log` records, port 0
//! carries the emergency dump. Status and config events are also journaled
//! into `log.txt` in the file store.

#![no_std]
#![no_main]

use core::fmt::{self, Write};

use cortex_m_rt::{entry, exception};
use heapless::String;
use log::{error, info, warn};
use panic_halt as _;

use tickos::arch::cortex_m4::{configure_systick, CortexM4, Iwdg};
use tickos::clock::Clock;
use tickos::config::LOG_FILE;
use tickos::fs::FileStore;
use tickos::logger::{self, ItmLogger};
use tickos::scheduler::Scheduler;
use tickos::{kernel, syscalls};

static CLOCK: Clock = Clock::new();
static LOGGER: ItmLogger = ItmLogger::new(&CLOCK);

#[exception]
fn SysTick() {
    CLOCK.tick();
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

struct App {
    counter: u32,
    last_reported: u32,
    fs: FileStore,
}

type Kernel = Scheduler<CortexM4, App>;

/// Log `message` and keep a copy in the journal.
fn journal(k: &mut Kernel, message: fmt::Arguments<'_>) {
    info!("{}", message);
    let now = k.now();
    if logger::append_entry(&mut k.app_mut().fs, now, message).is_err() {
        error!("journal: write failed");
    }
}

// ---------------------------------------------------------------------------
// Task entry points
// ---------------------------------------------------------------------------

fn counter_task(k: &mut Kernel) {
    let app = k.app_mut();
    app.counter = app.counter.wrapping_add(1);

    let mut text: String<10> = String::new();
    let _ = write!(text, "{}", app.counter);
    if !syscalls::file_write(&mut app.fs, "counter.txt", &text) {
        error!("counter: write failed");
    }
}

fn status_task(k: &mut Kernel) {
    let app = k.app_mut();
    let counter = app.counter;
    let stalled = counter == app.last_reported;
    app.last_reported = counter;

    if stalled {
        warn!("status: counter stalled at {}", counter);
    } else {
        journal(k, format_args!("status: counter = {}", counter));
    }
}

fn monitor_task(k: &mut Kernel) {
    if !k.app().fs.verify() {
        k.emergency_dump("FS corrupted");
    }

    let report = syscalls::sys_info(k, &k.app().fs);
    for line in report.lines() {
        info!("monitor: {}", line);
    }

    let overruns = k.check_timings();
    if overruns > 0 {
        warn!("monitor: {} task(s) overran their period", overruns);
    }
}

fn config_watch_task(k: &mut Kernel) {
    let fs = &mut k.app_mut().fs;
    if !syscalls::file_exists(fs, "counter.txt") {
        let _ = syscalls::file_write(fs, "counter.txt", "0");
        journal(k, format_args!("config: counter.txt missing, recreated"));
    }
    match k.app().fs.read_file("config.txt") {
        Some(config) => info!("config: {}", config),
        None => warn!("config: config.txt unreadable"),
    }
}

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

/// Firmware entry point. Sets up the clock, logger and file store, registers
/// the tasks and hands control to the kernel. Does not return.
#[entry]
fn main() -> ! {
    let Some(mut cp) = cortex_m::Peripherals::take() else {
        panic!("core peripherals already taken");
    };

    configure_systick(&mut cp.SYST);
    // Nothing useful to do without a sink; keep booting.
    let _ = logger::init(&LOGGER);
    info!("TickOS booting");

    let mut fs = FileStore::new();
    let _ = fs.create_file("counter.txt", "0");
    let _ = fs.create_file("config.txt", "interval=1000");
    let _ = fs.create_file(LOG_FILE, "");

    // SAFETY: the IWDG is touched nowhere else.
    let port = CortexM4::new(cp.ITM, unsafe { Iwdg::steal() });
    let app = App {
        counter: 0,
        last_reported: 0,
        fs,
    };
    let mut sched = Scheduler::new(&CLOCK, port, app);

    let tasks: [(fn(&mut Kernel), u32, u8); 4] = [
        (counter_task, 1000, 0),
        (status_task, 2000, 2),
        (monitor_task, 10_000, 3),
        (config_watch_task, 4000, 4),
    ];
    for (entry, period, priority) in tasks {
        if sched.add_task(entry, period, priority).is_err() {
            sched.emergency_dump("task registration failed");
        }
    }

    kernel::start(&mut sched)
}
