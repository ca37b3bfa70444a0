//! # In-Memory File Store
//!
//! A small key-value byte store keyed by short names, used by application
//! tasks layered above the kernel. The kernel itself never touches it.
//!
//! All storage is inline (`heapless`): `MAX_FILES` slots of up to
//! `MAX_FILE_SIZE` bytes each. Files are tagged text or binary; text reads
//! refuse binary files and vice versa. Deleting a file compacts the store,
//! preserving the order of the remaining files.

use core::fmt;

use heapless::{String, Vec};
use log::warn;
use thiserror::Error;

use crate::config::{MAX_FILENAME_LEN, MAX_FILES, MAX_FILE_SIZE};

/// File store failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FsError {
    #[error("invalid file name")]
    InvalidName,
    #[error("file too big")]
    TooLarge,
    #[error("max files reached")]
    StoreFull,
    #[error("file exists")]
    AlreadyExists,
    #[error("file not found")]
    NotFound,
    #[error("file has the wrong kind")]
    WrongKind,
    #[error("buffer too small")]
    BufferTooSmall,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Text,
    Binary,
}

impl FileKind {
    fn as_str(&self) -> &'static str {
        match self {
            FileKind::Text => "text",
            FileKind::Binary => "binary",
        }
    }
}

#[derive(Debug, Clone)]
struct File {
    name: String<MAX_FILENAME_LEN>,
    kind: FileKind,
    data: Vec<u8, MAX_FILE_SIZE>,
}

impl File {
    fn new(name: &str, kind: FileKind, data: &[u8]) -> Result<Self, FsError> {
        let mut file = File {
            name: String::new(),
            kind,
            data: Vec::new(),
        };
        file.name.push_str(name).map_err(|_| FsError::InvalidName)?;
        file.replace(kind, data)?;
        Ok(file)
    }

    fn replace(&mut self, kind: FileKind, data: &[u8]) -> Result<(), FsError> {
        let data = Vec::from_slice(data).map_err(|_| FsError::TooLarge)?;
        self.kind = kind;
        self.data = data;
        Ok(())
    }
}

/// Fixed-capacity file store.
#[derive(Debug, Default)]
pub struct FileStore {
    files: Vec<File, MAX_FILES>,
}

impl FileStore {
    pub const fn new() -> Self {
        Self { files: Vec::new() }
    }

    /// Number of files.
    #[inline]
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn file_exists(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Create a text file. Fails if `name` exists.
    pub fn create_file(&mut self, name: &str, content: &str) -> Result<(), FsError> {
        self.create(name, FileKind::Text, content.as_bytes())
    }

    /// Create a binary file. Fails if `name` exists.
    pub fn create_binary_file(&mut self, name: &str, data: &[u8]) -> Result<(), FsError> {
        self.create(name, FileKind::Binary, data)
    }

    /// Contents of a text file, or `None` if it is missing or binary.
    pub fn read_file(&self, name: &str) -> Option<&str> {
        let file = &self.files[self.find(name)?];
        match file.kind {
            FileKind::Text => core::str::from_utf8(&file.data).ok(),
            FileKind::Binary => None,
        }
    }

    /// Copy a binary file into `buf`, returning its length.
    pub fn read_binary_file(&self, name: &str, buf: &mut [u8]) -> Result<usize, FsError> {
        let file = &self.files[self.find(name).ok_or(FsError::NotFound)?];
        if file.kind != FileKind::Binary {
            return Err(FsError::WrongKind);
        }
        let dst = buf
            .get_mut(..file.data.len())
            .ok_or(FsError::BufferTooSmall)?;
        dst.copy_from_slice(&file.data);
        Ok(file.data.len())
    }

    /// Replace a file's contents with text, creating it if missing.
    pub fn write_file(&mut self, name: &str, content: &str) -> Result<(), FsError> {
        self.write(name, FileKind::Text, content.as_bytes())
    }

    /// Replace a file's contents with bytes, creating it if missing.
    pub fn write_binary_file(&mut self, name: &str, data: &[u8]) -> Result<(), FsError> {
        self.write(name, FileKind::Binary, data)
    }

    /// Remove a file, shifting later files down.
    pub fn delete_file(&mut self, name: &str) -> Result<(), FsError> {
        let Some(index) = self.find(name) else {
            warn!("fs: file not found: {}", name);
            return Err(FsError::NotFound);
        };
        self.files.remove(index);
        Ok(())
    }

    /// One line per file: `  <name> (<kind>, <size> bytes)`.
    pub fn list_files<W: fmt::Write>(&self, w: &mut W) -> fmt::Result {
        for file in &self.files {
            writeln!(w, "  {} ({}, {} bytes)", file.name, file.kind.as_str(), file.data.len())?;
        }
        Ok(())
    }

    /// Check every entry still has a valid name and size.
    pub fn verify(&self) -> bool {
        self.files
            .iter()
            .all(|f| valid_name(&f.name) && f.data.len() <= MAX_FILE_SIZE)
    }

    fn find(&self, name: &str) -> Option<usize> {
        self.files.iter().position(|f| f.name == name)
    }

    fn create(&mut self, name: &str, kind: FileKind, data: &[u8]) -> Result<(), FsError> {
        self.try_create(name, kind, data)
            .inspect_err(|e| warn!("fs: can't create {}: {}", name, e))
    }

    fn try_create(&mut self, name: &str, kind: FileKind, data: &[u8]) -> Result<(), FsError> {
        if !valid_name(name) {
            return Err(FsError::InvalidName);
        }
        if data.len() > MAX_FILE_SIZE {
            return Err(FsError::TooLarge);
        }
        if self.files.is_full() {
            return Err(FsError::StoreFull);
        }
        if self.find(name).is_some() {
            return Err(FsError::AlreadyExists);
        }
        let file = File::new(name, kind, data)?;
        self.files.push(file).map_err(|_| FsError::StoreFull)
    }

    fn write(&mut self, name: &str, kind: FileKind, data: &[u8]) -> Result<(), FsError> {
        match self.find(name) {
            Some(index) => self.files[index]
                .replace(kind, data)
                .inspect_err(|e| warn!("fs: can't write {}: {}", name, e)),
            None => self.create(name, kind, data),
        }
    }
}

fn valid_name(name: &str) -> bool {
    !name.is_empty() && name.len() <= MAX_FILENAME_LEN && !name.contains('/')
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------
