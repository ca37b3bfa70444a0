//! # TickOS
//!
//! A minimal cooperative real-time kernel for single-core ARM Cortex-M4
//! microcontrollers.
//!
//! ## Overview
//!
//! TickOS runs periodic, run-to-completion tasks from a single execution
//! context. There is no preemption and no per-task stack: a host loop calls
//! [`Scheduler::run`](scheduler::Scheduler::run) over and over, and each
//! pass invokes every task whose period has elapsed, in priority order.
//!
//! - **Static priorities**: 0 is highest, ties run in registration order
//! - **Counting semaphores**: blocking is logical (the task is disabled and
//!   queued), so a pass is never stalled
//! - **Millisecond clock**: advanced only by SysTick, compared with
//!   wraparound-safe arithmetic
//! - **Liveness guard**: a hardware watchdog fed by the host loop resets the
//!   board if a task body never returns
//! - **Emergency dump**: a terminal diagnostic report followed by a reset
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                   Application Tasks                     │
//! ├────────────────────────────────────────────────────────┤
//! │          Syscalls (syscalls.rs) · File store (fs.rs)    │
//! ├────────────────────────────────────────────────────────┤
//! │                 Host loop (kernel.rs)                   │
//! │             start() · spin_once()                       │
//! ├──────────────┬─────────────────┬───────────────────────┤
//! │  Scheduler   │   Semaphores    │  Task Table           │
//! │  scheduler.rs│   semaphore.rs  │  task.rs              │
//! │  ─ run()     │   ─ wait()      │  ─ insert()           │
//! │  ─ delay()   │   ─ signal()    │  ─ remove()           │
//! │  ─ dump()    │   ─ delete()    │  ─ set_priority()     │
//! ├──────────────┴─────────────────┴───────────────────────┤
//! │   Clock (clock.rs) · Watchdog (watchdog.rs) · log       │
//! ├────────────────────────────────────────────────────────┤
//! │            Arch Port (arch/cortex_m4.rs)                │
//! │        SysTick · IWDG · ITM · System reset              │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Memory Model
//!
//! - **No heap**: all state lives in fixed-capacity `heapless` containers
//! - **No globals in the kernel**: the scheduler is an owned value passed to
//!   each task body as its context handle
//! - **One shared word**: the clock counter, written by SysTick and read with
//!   atomic loads everywhere else

#![cfg_attr(not(test), no_std)]

pub mod arch;
pub mod clock;
pub mod config;
pub mod error;
pub mod fs;
pub mod kernel;
pub mod logger;
pub mod scheduler;
pub mod semaphore;
pub mod sync;
pub mod syscalls;
pub mod task;
pub mod watchdog;

#[cfg(test)]
mod testing;

pub use error::{KernelError, Result};
pub use scheduler::{Scheduler, TaskFn};
