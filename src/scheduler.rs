//! # Scheduler
//!
//! Core of TickOS: a cooperative, run-to-completion dispatcher over a
//! fixed, priority-sorted task table, plus the counting-semaphore API and
//! the emergency dump path.
//!
//! ## Dispatch pass
//!
//! Each call to [`Scheduler::run`]:
//! 1. Reads the clock **once**, so every task in the pass sees the same time
//! 2. Walks the table in priority order
//! 3. Runs each enabled task whose period has elapsed (wraparound-safe),
//!    stamping `last_run` before the call and measuring the run time after it
//!
//! Tasks never yield mid-body. A task that wants to block calls
//! [`sem_wait`](Scheduler::sem_wait) and returns; the pass continues with
//! the next entry. A task that overruns its period simply becomes due again
//! on a later pass.
//!
//! ## Context handle
//!
//! Task bodies receive `&mut Scheduler`. Through it they reach the clock,
//! the semaphore API, [`delay`](Scheduler::delay) and the application state
//! `S`. There is no global kernel instance.

use core::fmt::Write;

use log::{info, warn};

use crate::arch::Port;
use crate::clock::Clock;
use crate::config::WATCHDOG_TIMEOUT_MS;
use crate::error::{KernelError, Result};
use crate::semaphore::{Semaphore, SemaphoreId, SemaphorePool, WaitOutcome};
use crate::task::{Task, TaskHandle, TaskStats, TaskTable};
use crate::watchdog::Watchdog;

/// A task entry point. It receives the scheduler as its context handle.
///
/// A task is identified by the address of its entry point. Optimised builds
/// may merge functions whose machine code is identical, giving them one
/// address, so every registered entry needs a body of its own; two such
/// entries would otherwise collide as [`KernelError::DuplicateTask`].
pub type TaskFn<P, S> = fn(&mut Scheduler<P, S>);

// ---------------------------------------------------------------------------
// Scheduler struct
// ---------------------------------------------------------------------------

/// The kernel: task table, semaphore pool, clock and platform port.
///
/// `P` supplies the platform capabilities, `S` is application state shared
/// by the task bodies.
pub struct Scheduler<P: Port, S = ()> {
    clock: &'static Clock,
    port: P,
    tasks: TaskTable<TaskFn<P, S>>,
    semaphores: SemaphorePool,
    app: S,
}

impl<P: Port, S> Scheduler<P, S> {
    /// Create a kernel with no tasks and no semaphores.
    pub fn new(clock: &'static Clock, port: P, app: S) -> Self {
        Self {
            clock,
            port,
            tasks: TaskTable::new(),
            semaphores: SemaphorePool::new(),
            app,
        }
    }

    /// Identity of an entry point, as used in wait queues and stats.
    #[inline]
    pub fn handle_of(entry: TaskFn<P, S>) -> TaskHandle {
        TaskHandle::from_addr(entry as usize)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    #[inline]
    pub fn clock(&self) -> &'static Clock {
        self.clock
    }

    /// Milliseconds since the kernel clock started.
    #[inline]
    pub fn now(&self) -> u32 {
        self.clock.now()
    }

    #[inline]
    pub fn app(&self) -> &S {
        &self.app
    }

    #[inline]
    pub fn app_mut(&mut self) -> &mut S {
        &mut self.app
    }

    #[inline]
    pub fn port(&self) -> &P {
        &self.port
    }

    #[inline]
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    // -----------------------------------------------------------------------
    // Liveness guard
    // -----------------------------------------------------------------------

    /// Arm the liveness guard with `WATCHDOG_TIMEOUT_MS`.
    pub fn start(&mut self) {
        self.port.watchdog().start(WATCHDOG_TIMEOUT_MS);
        info!("kernel started: {} tasks, watchdog {} ms", self.tasks.len(), WATCHDOG_TIMEOUT_MS);
    }

    /// Reset the liveness guard. Call once per host loop iteration.
    #[inline]
    pub fn feed_watchdog(&mut self) {
        self.port.watchdog().feed();
    }

    // -----------------------------------------------------------------------
    // Task management
    // -----------------------------------------------------------------------

    /// Register a periodic task. Priority 0 is dispatched first; equal
    /// priorities run in registration order.
    ///
    /// Fails if the table is full, `period` is zero, or `entry` is already
    /// registered.
    pub fn add_task(&mut self, entry: TaskFn<P, S>, period: u32, priority: u8) -> Result<()> {
        let handle = Self::handle_of(entry);
        self.tasks
            .insert(Task::new(entry, handle, period, priority))
            .inspect_err(|e| warn!("can't add task {:#x}: {}", handle.addr(), e))
    }

    /// Unregister a task. Later entries shift down; ordering is preserved.
    pub fn remove_task(&mut self, entry: TaskFn<P, S>) -> Result<()> {
        self.tasks.remove(Self::handle_of(entry)).map(|_| ())
    }

    /// Administratively enable or disable a task.
    pub fn enable_task(&mut self, entry: TaskFn<P, S>, enabled: bool) -> Result<()> {
        self.task_mut(entry)?.enabled = enabled;
        Ok(())
    }

    /// Change a task's period. Zero is rejected.
    pub fn set_period(&mut self, entry: TaskFn<P, S>, period: u32) -> Result<()> {
        if period == 0 {
            return Err(KernelError::ZeroPeriod);
        }
        self.task_mut(entry)?.period = period;
        Ok(())
    }

    /// Change a task's priority and re-sort the table (stable).
    pub fn set_priority(&mut self, entry: TaskFn<P, S>, priority: u8) -> Result<()> {
        self.tasks.set_priority(Self::handle_of(entry), priority)
    }

    /// Current priority of a registered task.
    pub fn priority(&self, entry: TaskFn<P, S>) -> Option<u8> {
        self.tasks.get(Self::handle_of(entry)).map(|t| t.priority)
    }

    /// Number of registered tasks.
    #[inline]
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Bookkeeping for one task.
    pub fn task_stats(&self, entry: TaskFn<P, S>) -> Option<TaskStats> {
        self.tasks.get(Self::handle_of(entry)).map(Task::stats)
    }

    /// Bookkeeping for every task, in dispatch order.
    pub fn stats(&self) -> impl Iterator<Item = TaskStats> + '_ {
        self.tasks.iter().map(Task::stats)
    }

    /// Warn about every task whose longest run exceeded its period.
    /// Returns how many there were.
    pub fn check_timings(&self) -> usize {
        let mut overruns = 0;
        for task in self.tasks.iter().filter(|t| t.has_overrun()) {
            warn!(
                "task {:#x} overran: max {} ms, period {} ms",
                task.handle.addr(),
                task.max_run_time,
                task.period
            );
            overruns += 1;
        }
        overruns
    }

    fn task_mut(&mut self, entry: TaskFn<P, S>) -> Result<&mut Task<TaskFn<P, S>>> {
        self.tasks
            .get_mut(Self::handle_of(entry))
            .ok_or(KernelError::UnknownTask)
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    /// One dispatch pass over the task table.
    ///
    /// The table is walked by index, so a body that adds, removes or
    /// re-prioritises tasks affects which entries the rest of this pass
    /// visits.
    pub fn run(&mut self) {
        let now = self.clock.now();

        let mut index = 0;
        while let Some(task) = self.tasks.at_mut(index) {
            if task.is_due(now) {
                task.record_start(now);
                let entry = task.entry;
                let handle = task.handle;

                entry(self);

                let elapsed = self.clock.elapsed_since(now);
                // The body may have moved or removed itself.
                if let Some(task) = self.tasks.get_mut(handle) {
                    task.record_run_time(elapsed);
                }
            }
            index += 1;
        }
    }

    /// Busy-wait for `ms` milliseconds, running dispatch passes meanwhile so
    /// other tasks keep being served.
    pub fn delay(&mut self, ms: u32) {
        let start = self.clock.now();
        while self.clock.elapsed_since(start) < ms {
            self.run();
        }
    }

    // -----------------------------------------------------------------------
    // Semaphores
    // -----------------------------------------------------------------------

    /// Allocate a counting semaphore.
    pub fn sem_create(&mut self, initial_count: i32) -> Result<SemaphoreId> {
        self.semaphores.create(initial_count)
    }

    /// Try to take one unit from a semaphore.
    ///
    /// If the count is positive it is decremented and the call succeeds.
    /// Otherwise the **first enabled task in the table** (not necessarily
    /// the caller) is disabled and appended to the wait queue. Fails with
    /// `WaitQueueFull` without blocking anything when the queue is full.
    pub fn sem_wait(&mut self, id: SemaphoreId) -> Result<WaitOutcome> {
        let sem = self.semaphores.get_mut(id)?;
        if sem.try_acquire() {
            return Ok(WaitOutcome::Acquired);
        }
        if sem.is_queue_full() {
            return Err(KernelError::WaitQueueFull);
        }

        let Some(task) = self.tasks.first_enabled_mut() else {
            return Ok(WaitOutcome::Unavailable);
        };
        sem.enqueue(task.handle)?;
        task.enabled = false;
        Ok(WaitOutcome::Blocked(task.handle))
    }

    /// Release one unit.
    ///
    /// With waiters queued, the head is re-enabled and its `last_run` is set
    /// to now; otherwise the count is incremented. Returns the woken task.
    pub fn sem_signal(&mut self, id: SemaphoreId) -> Result<Option<TaskHandle>> {
        let now = self.clock.now();
        let woken = self.semaphores.get_mut(id)?.release();
        if let Some(task) = woken.and_then(|h| self.tasks.get_mut(h)) {
            task.enabled = true;
            task.stamp(now);
        }
        Ok(woken)
    }

    /// Delete a semaphore and compact the pool.
    ///
    /// Tasks still queued on it are **not** re-enabled, and the ids of all
    /// later semaphores shift down by one.
    pub fn sem_delete(&mut self, id: SemaphoreId) -> Result<()> {
        let deleted = self.semaphores.delete(id)?;
        if deleted.waiter_count() > 0 {
            warn!(
                "semaphore {} deleted with {} blocked tasks",
                id.index(),
                deleted.waiter_count()
            );
        }
        Ok(())
    }

    /// Inspect a semaphore.
    pub fn semaphore(&self, id: SemaphoreId) -> Option<&Semaphore> {
        self.semaphores.get(id).ok()
    }

    /// Number of live semaphores.
    #[inline]
    pub fn semaphore_count(&self) -> usize {
        self.semaphores.len()
    }

    // -----------------------------------------------------------------------
    // Emergency path
    // -----------------------------------------------------------------------

    /// Terminal diagnostic path. **Does not return.**
    ///
    /// Suspends the liveness guard, masks interrupts, writes a report to
    /// the port's diagnostic sink and hard-resets the board:
    ///
    /// ```text
    /// === SYSTEM DUMP ===
    /// Reason: OOM
    /// Uptime: 61234 ms
    /// Tasks: 2
    /// Task 0: runs=61
    /// Task 1: runs=30
    /// Rebooting...
    /// ```
    pub fn emergency_dump(&mut self, reason: &str) -> ! {
        self.port.watchdog().suspend();
        self.port.disable_interrupts();

        // Nothing useful can be done if the sink fails; reboot regardless.
        let _ = self.write_dump(reason);

        self.port.hard_reset()
    }

    fn write_dump(&mut self, reason: &str) -> core::fmt::Result {
        let uptime = self.clock.now();
        let port = &mut self.port;

        writeln!(port)?;
        writeln!(port, "=== SYSTEM DUMP ===")?;
        writeln!(port, "Reason: {}", reason)?;
        writeln!(port, "Uptime: {} ms", uptime)?;
        writeln!(port, "Tasks: {}", self.tasks.len())?;
        for (i, task) in self.tasks.iter().enumerate() {
            writeln!(port, "Task {}: runs={}", i, task.run_count)?;
        }
        writeln!(port, "Rebooting...")
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------
