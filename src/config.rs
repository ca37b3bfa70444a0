//! # TickOS Configuration
//!
//! Compile-time constants governing the kernel and its collaborators.
//! All limits are fixed at compile time; nothing is allocated dynamically.

use log::LevelFilter;

/// Maximum number of tasks in the task table. Also bounds each
/// semaphore's wait queue, since a task can wait on at most one
/// semaphore at a time.
pub const MAX_TASKS: usize = 8;

/// Size of the semaphore pool.
pub const MAX_SEMAPHORES: usize = 5;

/// Initial count used by the convenience layer's `sem_create`.
pub const DEFAULT_SEM_COUNT: i32 = 1;

/// SysTick frequency in Hz. One tick advances the clock by one millisecond.
pub const TICK_HZ: u32 = 1000;

/// System clock frequency in Hz (default for STM32F4 at 16 MHz HSI).
pub const SYSTEM_CLOCK_HZ: u32 = 16_000_000;

/// Liveness guard timeout. The host loop must feed the watchdog at least
/// this often or the board resets.
pub const WATCHDOG_TIMEOUT_MS: u32 = 2000;

/// Core cycles burned after an emergency dump so the diagnostic sink can
/// drain before the reset (about 100 ms at `SYSTEM_CLOCK_HZ`).
pub const DUMP_FLUSH_CYCLES: u32 = SYSTEM_CLOCK_HZ / 10;

/// Maximum level passed through the `log` facade.
pub const LOG_LEVEL: LevelFilter = LevelFilter::Info;

/// Number of files the in-memory store can hold.
pub const MAX_FILES: usize = 5;

/// Maximum payload of a single file, in bytes.
pub const MAX_FILE_SIZE: usize = 512;

/// Maximum file name length, in bytes.
pub const MAX_FILENAME_LEN: usize = 16;

/// File the persistent log journal is kept in. Bounded by `MAX_FILE_SIZE`.
pub const LOG_FILE: &str = "log.txt";

/// Banner reported by `syscalls::sys_info`.
pub const SYS_INFO_VERSION: &str = "TickOS v1.0";
