//! # Counting Semaphores
//!
//! A fixed pool of counting semaphores, each with a bounded FIFO of blocked
//! task handles. Blocking is purely logical: the scheduler disables the
//! blocked task and records its handle here; the dispatch loop keeps running.
//!
//! Identifiers are pool indexes. Deleting a semaphore compacts the pool, so
//! the ids of every later semaphore shift down by one, and any tasks still
//! queued on the deleted semaphore stay disabled forever.

use heapless::{Deque, Vec};

use crate::config::{MAX_SEMAPHORES, MAX_TASKS};
use crate::error::{KernelError, Result};
use crate::task::TaskHandle;

/// Opaque semaphore identifier (pool index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SemaphoreId(usize);

impl SemaphoreId {
    #[inline]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    #[inline]
    pub const fn index(&self) -> usize {
        self.0
    }
}

/// Result of a `sem_wait` call that did not fail outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The count was positive and has been decremented.
    Acquired,
    /// Nothing was available; the named task was disabled and queued.
    Blocked(TaskHandle),
    /// Nothing was available and no enabled task existed to block.
    Unavailable,
}

impl WaitOutcome {
    #[inline]
    pub fn acquired(&self) -> bool {
        matches!(self, WaitOutcome::Acquired)
    }
}

/// One counting semaphore.
#[derive(Debug, Clone)]
pub struct Semaphore {
    count: i32,
    waiting: Deque<TaskHandle, MAX_TASKS>,
}

impl Semaphore {
    pub const fn new(initial_count: i32) -> Self {
        Self {
            count: initial_count,
            waiting: Deque::new(),
        }
    }

    /// Available resources.
    #[inline]
    pub fn count(&self) -> i32 {
        self.count
    }

    /// Blocked tasks, head first.
    pub fn waiters(&self) -> impl Iterator<Item = &TaskHandle> {
        self.waiting.iter()
    }

    #[inline]
    pub fn waiter_count(&self) -> usize {
        self.waiting.len()
    }

    #[inline]
    pub fn is_queue_full(&self) -> bool {
        self.waiting.is_full()
    }

    /// Non-blocking fast path: take one unit if any is available.
    pub fn try_acquire(&mut self) -> bool {
        if self.count > 0 {
            self.count -= 1;
            true
        } else {
            false
        }
    }

    /// Append a blocked task to the tail of the wait queue.
    pub fn enqueue(&mut self, handle: TaskHandle) -> Result<()> {
        self.waiting
            .push_back(handle)
            .map_err(|_| KernelError::WaitQueueFull)
    }

    /// Hand one unit to the head waiter, or bank it in the count when
    /// nobody is waiting. Returns the task to wake.
    pub fn release(&mut self) -> Option<TaskHandle> {
        let woken = self.waiting.pop_front();
        if woken.is_none() {
            self.count = self.count.saturating_add(1);
        }
        woken
    }
}

/// Fixed pool of semaphores addressed by [`SemaphoreId`].
#[derive(Debug, Default)]
pub struct SemaphorePool {
    semaphores: Vec<Semaphore, MAX_SEMAPHORES>,
}

impl SemaphorePool {
    pub const fn new() -> Self {
        Self {
            semaphores: Vec::new(),
        }
    }

    /// Number of live semaphores.
    #[inline]
    pub fn len(&self) -> usize {
        self.semaphores.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.semaphores.is_empty()
    }

    /// Allocate the next slot.
    pub fn create(&mut self, initial_count: i32) -> Result<SemaphoreId> {
        let id = SemaphoreId(self.semaphores.len());
        self.semaphores
            .push(Semaphore::new(initial_count))
            .map_err(|_| KernelError::SemaphorePoolFull)?;
        Ok(id)
    }

    pub fn get(&self, id: SemaphoreId) -> Result<&Semaphore> {
        self.semaphores
            .get(id.0)
            .ok_or(KernelError::UnknownSemaphore(id.0))
    }

    pub fn get_mut(&mut self, id: SemaphoreId) -> Result<&mut Semaphore> {
        self.semaphores
            .get_mut(id.0)
            .ok_or(KernelError::UnknownSemaphore(id.0))
    }

    /// Remove a semaphore and compact the pool. Waiters are dropped
    /// without being woken.
    pub fn delete(&mut self, id: SemaphoreId) -> Result<Semaphore> {
        if id.0 >= self.semaphores.len() {
            return Err(KernelError::UnknownSemaphore(id.0));
        }
        Ok(self.semaphores.remove(id.0))
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------
