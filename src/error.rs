//! # Kernel Errors
//!
//! Every fallible kernel operation reports failure through its own return
//! value. Nothing here is fatal: capacity exhaustion and bad arguments are
//! left to the caller, which decides whether to retry, log, or escalate to
//! [`Scheduler::emergency_dump`](crate::scheduler::Scheduler::emergency_dump).

use thiserror::Error;

/// Non-fatal kernel failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum KernelError {
    /// The task table already holds `MAX_TASKS` entries.
    #[error("task table is full")]
    TaskTableFull,

    /// A task period of zero was requested.
    #[error("task period must be non-zero")]
    ZeroPeriod,

    /// The entry point is already registered.
    #[error("task is already registered")]
    DuplicateTask,

    /// No task with the given entry point is registered.
    #[error("task is not registered")]
    UnknownTask,

    /// The semaphore pool already holds `MAX_SEMAPHORES` entries.
    #[error("semaphore pool is full")]
    SemaphorePoolFull,

    /// The identifier does not name a live semaphore.
    #[error("no semaphore with id {0}")]
    UnknownSemaphore(usize),

    /// The semaphore's wait queue is at capacity.
    #[error("semaphore wait queue is full")]
    WaitQueueFull,
}

/// Kernel result alias.
pub type Result<T> = core::result::Result<T, KernelError>;
