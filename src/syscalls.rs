//! # Syscalls
//!
//! Convenience layer over the scheduler and the file store for application
//! tasks. Defaults are filled in (priority 0, semaphore count 1) and
//! results are collapsed to `bool`/`Option`; failures are already logged by
//! the layer underneath.

use core::fmt::Write;

use heapless::String;

use crate::arch::Port;
use crate::config::{DEFAULT_SEM_COUNT, SYS_INFO_VERSION};
use crate::fs::FileStore;
use crate::scheduler::{Scheduler, TaskFn};
use crate::semaphore::SemaphoreId;

// --- tasks -----------------------------------------------------------------

/// Register `entry` at the highest priority.
pub fn task_create<P: Port, S>(s: &mut Scheduler<P, S>, entry: TaskFn<P, S>, period: u32) -> bool {
    s.add_task(entry, period, 0).is_ok()
}

pub fn task_delete<P: Port, S>(s: &mut Scheduler<P, S>, entry: TaskFn<P, S>) -> bool {
    s.remove_task(entry).is_ok()
}

/// Cooperative sleep; other tasks keep running.
pub fn task_delay<P: Port, S>(s: &mut Scheduler<P, S>, ms: u32) {
    s.delay(ms);
}

// --- semaphores ------------------------------------------------------------

/// Binary-style semaphore with `DEFAULT_SEM_COUNT` units.
pub fn sem_create<P: Port, S>(s: &mut Scheduler<P, S>) -> Option<SemaphoreId> {
    sem_create_with(s, DEFAULT_SEM_COUNT)
}

pub fn sem_create_with<P: Port, S>(s: &mut Scheduler<P, S>, initial_count: i32) -> Option<SemaphoreId> {
    s.sem_create(initial_count).ok()
}

/// True only if a unit was taken.
pub fn sem_wait<P: Port, S>(s: &mut Scheduler<P, S>, id: SemaphoreId) -> bool {
    matches!(s.sem_wait(id), Ok(outcome) if outcome.acquired())
}

pub fn sem_signal<P: Port, S>(s: &mut Scheduler<P, S>, id: SemaphoreId) -> bool {
    s.sem_signal(id).is_ok()
}

pub fn sem_delete<P: Port, S>(s: &mut Scheduler<P, S>, id: SemaphoreId) -> bool {
    s.sem_delete(id).is_ok()
}

// --- files -----------------------------------------------------------------

pub fn file_exists(fs: &FileStore, name: &str) -> bool {
    fs.file_exists(name)
}

/// Text contents, or `""` if the file is missing or binary.
pub fn file_read<'a>(fs: &'a FileStore, name: &str) -> &'a str {
    fs.read_file(name).unwrap_or("")
}

pub fn file_write(fs: &mut FileStore, name: &str, content: &str) -> bool {
    fs.write_file(name, content).is_ok()
}

pub fn file_delete(fs: &mut FileStore, name: &str) -> bool {
    fs.delete_file(name).is_ok()
}

// --- system ----------------------------------------------------------------

/// Restart immediately, without a diagnostic dump.
pub fn sys_reboot<P: Port, S>(s: &mut Scheduler<P, S>) -> ! {
    s.port_mut().hard_reset()
}

/// Short status report: version, task count, file count.
pub fn sys_info<P: Port, S>(s: &Scheduler<P, S>, fs: &FileStore) -> String<64> {
    let mut info = String::new();
    // 64 bytes always fits the banner and two counts.
    let _ = write!(
        info,
        "{}\nTasks: {}\nFiles: {}",
        SYS_INFO_VERSION,
        s.task_count(),
        fs.file_count()
    );
    info
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::panic::{self, AssertUnwindSafe};

    use super::*;
    use crate::testing::{leak_clock, MockPort};

    type Kernel = Scheduler<MockPort, u32>;

    fn kernel() -> Kernel {
        Scheduler::new(leak_clock(0), MockPort::default(), 0)
    }

    fn bump(k: &mut Kernel) {
        *k.app_mut() += 1;
    }

    fn bump_twice(k: &mut Kernel) {
        *k.app_mut() += 2;
    }

    #[test]
    fn test_task_create_uses_top_priority() {
        let mut k = kernel();
        assert!(task_create(&mut k, bump, 100));
        assert!(!task_create(&mut k, bump, 100));
        assert!(!task_create(&mut k, bump_twice, 0));
        assert_eq!(k.priority(bump), Some(0));

        assert!(task_delete(&mut k, bump));
        assert!(!task_delete(&mut k, bump));
        assert_eq!(k.task_count(), 0);
    }

    #[test]
    fn test_task_delay_runs_other_tasks() {
        fn tick_clock(k: &mut Kernel) {
            k.clock().tick();
            *k.app_mut() += 1;
        }

        let mut k = Scheduler::new(leak_clock(1), MockPort::default(), 0);
        k.add_task(tick_clock, 1, 0).unwrap();
        task_delay(&mut k, 3);
        assert_eq!(k.now(), 4);
        assert_eq!(*k.app(), 3);
    }

    #[test]
    fn test_semaphore_defaults() {
        let mut k = kernel();
        k.add_task(bump, 10, 0).unwrap();

        let id = sem_create(&mut k).unwrap();
        assert_eq!(k.semaphore(id).unwrap().count(), DEFAULT_SEM_COUNT);

        assert!(sem_wait(&mut k, id));
        assert!(!sem_wait(&mut k, id));
        assert!(!k.task_stats(bump).unwrap().enabled);

        assert!(sem_signal(&mut k, id));
        assert!(k.task_stats(bump).unwrap().enabled);

        assert!(sem_delete(&mut k, id));
        assert!(!sem_delete(&mut k, id));
        assert!(!sem_signal(&mut k, id));
        assert!(!sem_wait(&mut k, id));
    }

    #[test]
    fn test_sem_create_with_pool_exhaustion() {
        let mut k = kernel();
        for _ in 0..crate::config::MAX_SEMAPHORES {
            assert!(sem_create_with(&mut k, 0).is_some());
        }
        assert!(sem_create_with(&mut k, 0).is_none());
    }

    #[test]
    fn test_file_calls() {
        let mut fs = FileStore::new();
        assert!(!file_exists(&fs, "counter.txt"));
        assert_eq!(file_read(&fs, "counter.txt"), "");

        assert!(file_write(&mut fs, "counter.txt", "41"));
        assert!(file_exists(&fs, "counter.txt"));
        assert_eq!(file_read(&fs, "counter.txt"), "41");

        assert!(file_delete(&mut fs, "counter.txt"));
        assert!(!file_delete(&mut fs, "counter.txt"));
    }

    #[test]
    fn test_sys_info() {
        let mut k = kernel();
        k.add_task(bump, 10, 0).unwrap();
        k.add_task(bump_twice, 10, 0).unwrap();
        let mut fs = FileStore::new();
        fs.create_file("log.txt", "").unwrap();

        assert_eq!(sys_info(&k, &fs), "TickOS v1.0\nTasks: 2\nFiles: 1");
    }

    #[test]
    fn test_sys_reboot_skips_dump() {
        let mut k = kernel();
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            sys_reboot(&mut k);
        }));
        assert!(result.is_err());
        assert_eq!(k.port().resets, 1);
        assert!(k.port().output.is_empty());
        assert!(!k.port().watchdog.suspended);
    }
}
