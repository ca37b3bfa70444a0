//! # Task Table
//!
//! Defines the task model for TickOS. A task is a periodic, run-to-completion
//! job identified by its entry point. The scheduler keeps every registered
//! task in a [`TaskTable`]: a fixed-capacity array sorted by ascending
//! priority (0 = highest), equal priorities kept in insertion order.
//!
//! ## Task state
//!
//! ```text
//!   ┌──────────┐   sem_wait() blocks it    ┌──────────┐
//!   │ Enabled  │ ────────────────────────► │ Disabled │
//!   └──────────┘                           └──────────┘
//!        ▲        sem_signal() / enable_task()   │
//!        └───────────────────────────────────────┘
//! ```
//!
//! An enabled task runs whenever its period has elapsed. A disabled task is
//! skipped by the dispatch pass until something re-enables it.

use heapless::Vec;

use crate::clock;
use crate::config::MAX_TASKS;
use crate::error::{KernelError, Result};

// ---------------------------------------------------------------------------
// Task identity
// ---------------------------------------------------------------------------

/// Stable identity of a registered task: the address of its entry point.
///
/// Two distinct functions with byte-identical bodies may be folded into one
/// by the linker and would then share a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(usize);

impl TaskHandle {
    /// Handle for the entry point located at `addr`.
    #[inline]
    pub const fn from_addr(addr: usize) -> Self {
        Self(addr)
    }

    /// The entry point address.
    #[inline]
    pub const fn addr(&self) -> usize {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

/// One registered periodic job.
///
/// `F` is the entry point type; the scheduler uses a function pointer that
/// receives the scheduler itself as context.
#[derive(Clone, Copy)]
pub struct Task<F> {
    /// Entry point, invoked once per due pass.
    pub entry: F,

    /// Identity used for lookups and semaphore wait queues.
    pub handle: TaskHandle,

    /// Minimum interval between invocations, in milliseconds. Never zero.
    pub period: u32,

    /// Clock value when the last invocation started, or when a semaphore
    /// signal last woke the task. Zero until then, so a task registered at
    /// boot first runs once `period` has elapsed on the clock.
    pub last_run: u32,

    /// `false` while blocked on a semaphore or administratively disabled.
    pub enabled: bool,

    /// Static priority. 0 is dispatched first.
    pub priority: u8,

    /// Number of invocations started.
    pub run_count: u32,

    /// Duration of the most recent invocation, in milliseconds.
    pub last_run_time: u32,

    /// Longest invocation observed, in milliseconds.
    pub max_run_time: u32,
}

impl<F> Task<F> {
    /// A fresh, enabled task with `last_run` at zero.
    pub fn new(entry: F, handle: TaskHandle, period: u32, priority: u8) -> Self {
        Self {
            entry,
            handle,
            period,
            last_run: 0,
            enabled: true,
            priority,
            run_count: 0,
            last_run_time: 0,
            max_run_time: 0,
        }
    }

    /// True if the task is enabled and its period has elapsed at `now`.
    #[inline]
    pub fn is_due(&self, now: u32) -> bool {
        self.enabled && clock::is_due(now, self.last_run, self.period)
    }

    /// Restart the period window at `now`.
    #[inline]
    pub fn stamp(&mut self, now: u32) {
        self.last_run = now;
    }

    /// Mark the start of an invocation at `now`.
    pub fn record_start(&mut self, now: u32) {
        self.stamp(now);
        self.run_count = self.run_count.wrapping_add(1);
    }

    /// Record how long the invocation took.
    pub fn record_run_time(&mut self, elapsed: u32) {
        self.last_run_time = elapsed;
        if elapsed > self.max_run_time {
            self.max_run_time = elapsed;
        }
    }

    /// True if some invocation took longer than the task's period.
    #[inline]
    pub fn has_overrun(&self) -> bool {
        self.max_run_time > self.period
    }

    /// Diagnostic snapshot.
    pub fn stats(&self) -> TaskStats {
        TaskStats {
            handle: self.handle,
            priority: self.priority,
            period: self.period,
            enabled: self.enabled,
            last_run: self.last_run,
            run_count: self.run_count,
            last_run_time: self.last_run_time,
            max_run_time: self.max_run_time,
        }
    }
}

/// Copy of a task's bookkeeping, detached from its entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskStats {
    pub handle: TaskHandle,
    pub priority: u8,
    pub period: u32,
    pub enabled: bool,
    pub last_run: u32,
    pub run_count: u32,
    pub last_run_time: u32,
    pub max_run_time: u32,
}

// ---------------------------------------------------------------------------
// Task table
// ---------------------------------------------------------------------------

/// Fixed-capacity task list, always sorted by ascending priority with ties
/// in insertion order. No two entries share a handle.
pub struct TaskTable<F> {
    tasks: Vec<Task<F>, MAX_TASKS>,
}

impl<F> TaskTable<F> {
    /// An empty table.
    pub const fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Number of live entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Register `task`, keeping the table sorted.
    ///
    /// Fails if the table is full, the period is zero, or the handle is
    /// already present. The table is unchanged on failure.
    pub fn insert(&mut self, task: Task<F>) -> Result<()> {
        if self.tasks.is_full() {
            return Err(KernelError::TaskTableFull);
        }
        if task.period == 0 {
            return Err(KernelError::ZeroPeriod);
        }
        if self.position(task.handle).is_some() {
            return Err(KernelError::DuplicateTask);
        }

        self.tasks
            .push(task)
            .map_err(|_| KernelError::TaskTableFull)?;
        self.sort_by_priority();
        Ok(())
    }

    /// Remove the task with `handle`, shifting later entries down.
    ///
    /// Removal cannot break the ordering, so no re-sort is needed.
    pub fn remove(&mut self, handle: TaskHandle) -> Result<Task<F>> {
        let index = self.position(handle).ok_or(KernelError::UnknownTask)?;
        Ok(self.tasks.remove(index))
    }

    /// Index of the task with `handle` in dispatch order.
    pub fn position(&self, handle: TaskHandle) -> Option<usize> {
        self.tasks.iter().position(|t| t.handle == handle)
    }

    pub fn get(&self, handle: TaskHandle) -> Option<&Task<F>> {
        self.tasks.iter().find(|t| t.handle == handle)
    }

    pub fn get_mut(&mut self, handle: TaskHandle) -> Option<&mut Task<F>> {
        self.tasks.iter_mut().find(|t| t.handle == handle)
    }

    /// Entry at `index` in dispatch order.
    #[inline]
    pub fn at(&self, index: usize) -> Option<&Task<F>> {
        self.tasks.get(index)
    }

    #[inline]
    pub fn at_mut(&mut self, index: usize) -> Option<&mut Task<F>> {
        self.tasks.get_mut(index)
    }

    /// First enabled task in dispatch order.
    pub fn first_enabled_mut(&mut self) -> Option<&mut Task<F>> {
        self.tasks.iter_mut().find(|t| t.enabled)
    }

    /// Change a task's priority and restore the ordering.
    pub fn set_priority(&mut self, handle: TaskHandle, priority: u8) -> Result<()> {
        let task = self.get_mut(handle).ok_or(KernelError::UnknownTask)?;
        task.priority = priority;
        self.sort_by_priority();
        Ok(())
    }

    /// Entries in dispatch order.
    pub fn iter(&self) -> impl Iterator<Item = &Task<F>> {
        self.tasks.iter()
    }

    /// Stable insertion sort by priority. `core` has no allocation-free
    /// stable sort, and the table never holds more than `MAX_TASKS` entries.
    fn sort_by_priority(&mut self) {
        for i in 1..self.tasks.len() {
            let mut j = i;
            while j > 0 && self.tasks[j - 1].priority > self.tasks[j].priority {
                self.tasks.swap(j - 1, j);
                j -= 1;
            }
        }
    }
}

impl<F> Default for TaskTable<F> {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------
