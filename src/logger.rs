//! # Logger
//!
//! Backend for the `log` facade. Each record becomes one line prefixed
//! with the kernel uptime:
//!
//! ```text
//! [12000 ms] WARN  task exists
//! ```
//!
//! On the target, [`ItmLogger`] writes these lines to ITM stimulus port 1,
//! leaving port 0 to the emergency dump.
//!
//! Messages worth keeping across the session can also be journaled into
//! `LOG_FILE` in the [`FileStore`] with [`append_entry`]. The journal is a
//! rolling window: once it would outgrow `MAX_FILE_SIZE`, whole lines are
//! dropped from the front.

use core::fmt::{self, Write};

use heapless::String;
use log::Record;

use crate::config::{LOG_FILE, MAX_FILE_SIZE};
use crate::fs::{FileStore, FsError};

/// Format `record` as a single timestamped line.
pub fn write_record<W: fmt::Write>(w: &mut W, now_ms: u32, record: &Record<'_>) -> fmt::Result {
    writeln!(w, "[{} ms] {:<5} {}", now_ms, record.level(), record.args())
}

// ---------------------------------------------------------------------------
// Persistent journal
// ---------------------------------------------------------------------------

/// Append `[<ms> ms] <message>` to the journal, creating it if needed.
///
/// An entry longer than `MAX_FILE_SIZE` is cut short. A journal that is
/// missing or holds binary data is started afresh.
pub fn append_entry(fs: &mut FileStore, now_ms: u32, message: fmt::Arguments<'_>) -> Result<(), FsError> {
    let mut entry: String<MAX_FILE_SIZE> = String::new();
    // Overflow leaves the prefix that fit.
    let _ = write!(Truncating(&mut entry), "[{} ms] {}", now_ms, message);
    if entry.len() == MAX_FILE_SIZE {
        entry.pop();
    }
    let _ = entry.push('\n');

    let old = fs.read_file(LOG_FILE).unwrap_or("");
    let keep = &old[trim_point(old, entry.len())..];

    let mut journal: String<MAX_FILE_SIZE> = String::new();
    // Both fit: trim_point leaves exactly enough room.
    let _ = journal.push_str(keep);
    let _ = journal.push_str(&entry);
    fs.write_file(LOG_FILE, &journal)
}

/// Journal the message of a `log` record.
pub fn append_record(fs: &mut FileStore, now_ms: u32, record: &Record<'_>) -> Result<(), FsError> {
    append_entry(fs, now_ms, *record.args())
}

/// Writer that keeps as much of the output as fits.
struct Truncating<'a, const N: usize>(&'a mut String<N>);

impl<const N: usize> fmt::Write for Truncating<'_, N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            self.0.push(c).map_err(|_| fmt::Error)?;
        }
        Ok(())
    }
}

/// Offset of the first line of `old` to keep so that `incoming` more bytes
/// fit in `MAX_FILE_SIZE`.
fn trim_point(old: &str, incoming: usize) -> usize {
    let excess = (old.len() + incoming).saturating_sub(MAX_FILE_SIZE);
    if excess == 0 {
        return 0;
    }
    // First line starting at or after `excess`.
    match old.as_bytes()[excess - 1..].iter().position(|&b| b == b'\n') {
        Some(i) => excess + i,
        None => old.len(),
    }
}

#[cfg(target_arch = "arm")]
pub use self::itm::{init, ItmLogger};

#[cfg(target_arch = "arm")]
mod itm {
    use cortex_m::peripheral::{itm::RegisterBlock, ITM};
    use log::{Log, Metadata, Record, SetLoggerError};

    use super::write_record;
    use crate::arch::cortex_m4::StimWriter;
    use crate::clock::Clock;
    use crate::config::LOG_LEVEL;
    use crate::sync;

    const LOG_STIM_PORT: usize = 1;

    /// `log` backend writing to the ITM.
    pub struct ItmLogger {
        clock: &'static Clock,
    }

    impl ItmLogger {
        pub const fn new(clock: &'static Clock) -> Self {
            Self { clock }
        }
    }

    impl Log for ItmLogger {
        fn enabled(&self, metadata: &Metadata<'_>) -> bool {
            metadata.level() <= LOG_LEVEL
        }

        fn log(&self, record: &Record<'_>) {
            if !self.enabled(record.metadata()) {
                return;
            }
            let now = self.clock.now();
            sync::critical_section(|_cs| {
                // SAFETY: interrupts are masked and the port owns only stimulus 0.
                let itm = unsafe { &mut *(ITM::PTR as *mut RegisterBlock) };
                let _ = write_record(&mut StimWriter(&mut itm.stim[LOG_STIM_PORT]), now, record);
            });
        }

        fn flush(&self) {}
    }

    /// Install `logger` as the global `log` backend.
    pub fn init(logger: &'static ItmLogger) -> Result<(), SetLoggerError> {
        log::set_logger(logger)?;
        log::set_max_level(LOG_LEVEL);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    fn journal(fs: &FileStore) -> &str {
        fs.read_file(LOG_FILE).unwrap()
    }

    #[test]
    fn test_record_format() {
        let mut out = std::string::String::new();
        write_record(
            &mut out,
            12_000,
            &Record::builder()
                .level(Level::Warn)
                .args(format_args!("task exists"))
                .build(),
        )
        .unwrap();
        assert_eq!(out, "[12000 ms] WARN  task exists\n");
    }

    #[test]
    fn test_record_format_interpolates_args() {
        let mut out = std::string::String::new();
        let count = 3;
        write_record(
            &mut out,
            7,
            &Record::builder()
                .level(Level::Info)
                .args(format_args!("counter={}", count))
                .build(),
        )
        .unwrap();
        assert_eq!(out, "[7 ms] INFO  counter=3\n");
    }

    #[test]
    fn test_journal_created_then_appended() {
        let mut fs = FileStore::new();
        append_entry(&mut fs, 5, format_args!("boot")).unwrap();
        assert_eq!(journal(&fs), "[5 ms] boot\n");

        append_entry(&mut fs, 1005, format_args!("counter={}", 1)).unwrap();
        assert_eq!(journal(&fs), "[5 ms] boot\n[1005 ms] counter=1\n");
        assert_eq!(fs.file_count(), 1);
    }

    #[test]
    fn test_journal_takes_record_message_without_level() {
        let mut fs = FileStore::new();
        append_record(
            &mut fs,
            3,
            &Record::builder()
                .level(Level::Warn)
                .args(format_args!("counter={}", 3))
                .build(),
        )
        .unwrap();
        assert_eq!(journal(&fs), "[3 ms] counter=3\n");
    }

    #[test]
    fn test_journal_drops_oldest_lines() {
        let mut fs = FileStore::new();
        let filler = "x".repeat(90);

        // "[100N ms] " + 90 + "\n" = 101 bytes; five fit in 512
        for now in 1000..1005 {
            append_entry(&mut fs, now, format_args!("{}", filler)).unwrap();
        }
        assert_eq!(journal(&fs).len(), 505);
        assert!(journal(&fs).starts_with("[1000 ms] "));

        append_entry(&mut fs, 1005, format_args!("{}", filler)).unwrap();
        let log = journal(&fs);
        assert_eq!(log.len(), 505);
        assert!(log.starts_with("[1001 ms] "));
        assert!(log.ends_with(&format!("[1005 ms] {}\n", filler)));
        assert_eq!(log.lines().count(), 5);
    }

    #[test]
    fn test_journal_oversize_entry_is_cut_and_replaces_all() {
        let mut fs = FileStore::new();
        append_entry(&mut fs, 1, format_args!("boot")).unwrap();

        let huge = "y".repeat(MAX_FILE_SIZE + 100);
        append_entry(&mut fs, 2, format_args!("{}", huge)).unwrap();
        let log = journal(&fs);
        assert_eq!(log.len(), MAX_FILE_SIZE);
        assert!(log.starts_with("[2 ms] yyy"));
        assert!(log.ends_with("y\n"));
    }

    #[test]
    fn test_journal_restarts_over_binary_file() {
        let mut fs = FileStore::new();
        fs.create_binary_file(LOG_FILE, &[0xFF, 0x00]).unwrap();
        append_entry(&mut fs, 9, format_args!("fresh")).unwrap();
        assert_eq!(journal(&fs), "[9 ms] fresh\n");
    }
}
