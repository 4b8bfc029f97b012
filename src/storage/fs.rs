// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Filesystem-backed resource store.
//!
//! One file per resource under [`StoragePaths`]. Parent directories are
//! created on demand. Non-owner creations open the target with
//! `create_new`, so an existing file is never replaced by them, even when
//! two creations race.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::Path;

use crate::resource::{ResourcePath, UserId};

use super::{ResourceStore, StoragePaths, WriteMode};

/// Error type for resource store operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),
    /// Resource exists and the write may not replace it
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    /// Storage not initialized
    #[error("Storage not initialized")]
    NotInitialized,
    /// Health probe read back different bytes
    #[error("Integrity violation: {0}")]
    IntegrityViolation(String),
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    Io(#[source] io::Error),
}

impl StorageError {
    fn at(path: &Path, e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::NotFound => StorageError::NotFound(path.display().to_string()),
            io::ErrorKind::AlreadyExists => StorageError::AlreadyExists(path.display().to_string()),
            _ => StorageError::Io(e),
        }
    }
}

impl From<io::Error> for StorageError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::NotFound => StorageError::NotFound(e.to_string()),
            io::ErrorKind::AlreadyExists => StorageError::AlreadyExists(e.to_string()),
            _ => StorageError::Io(e),
        }
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Resource store over the local filesystem.
#[derive(Debug, Clone)]
pub struct FsResourceStore {
    paths: StoragePaths,
    initialized: bool,
}

impl FsResourceStore {
    /// Create a new store.
    ///
    /// Does NOT create the directory structure. Call `initialize()` first.
    pub fn new(paths: StoragePaths) -> Self {
        Self {
            paths,
            initialized: false,
        }
    }

    /// Get the storage paths.
    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    /// Create the top-level directories. Idempotent.
    pub fn initialize(&mut self) -> StorageResult<()> {
        let dirs = [
            self.paths.pubkeys_dir(),
            self.paths.totp_keys_dir(),
            self.paths.files_dir(),
        ];

        for dir in dirs {
            fs::create_dir_all(&dir)?;
        }

        self.initialized = true;
        Ok(())
    }

    fn ensure_initialized(&self) -> StorageResult<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(StorageError::NotInitialized)
        }
    }
}

impl ResourceStore for FsResourceStore {
    fn put(&self, path: &ResourcePath, data: &[u8], mode: WriteMode) -> StorageResult<()> {
        self.ensure_initialized()?;

        let target = self.paths.resolve(path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut options = OpenOptions::new();
        options.write(true);
        match mode {
            WriteMode::Overwrite => options.create(true).truncate(true),
            WriteMode::CreateNew => options.create_new(true),
        };

        let file = options.open(&target).map_err(|e| StorageError::at(&target, e))?;
        match mode {
            WriteMode::Overwrite => fill(file, data)?,
            WriteMode::CreateNew => fill_new(&target, file, data)?,
        }
        Ok(())
    }

    fn get(&self, path: &ResourcePath) -> StorageResult<Vec<u8>> {
        self.ensure_initialized()?;

        let target = self.paths.resolve(path);
        if !target.is_file() {
            return Err(StorageError::NotFound(target.display().to_string()));
        }

        let mut file = File::open(&target).map_err(|e| StorageError::at(&target, e))?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        Ok(data)
    }

    fn list(&self, user: &UserId) -> StorageResult<Vec<String>> {
        self.ensure_initialized()?;

        let dir = self.paths.user_files_dir(user);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Write-read-delete probe under the root.
    fn health_check(&self) -> StorageResult<()> {
        self.ensure_initialized()?;

        let test_file = self.paths.root().join(".health_check");
        let test_data = b"health_check_data";

        fs::write(&test_file, test_data)?;
        let read_data = fs::read(&test_file)?;
        fs::remove_file(&test_file)?;

        if read_data != test_data {
            return Err(StorageError::IntegrityViolation(
                "Health check data mismatch".to_string(),
            ));
        }

        Ok(())
    }
}

fn fill(mut sink: impl Write, data: &[u8]) -> io::Result<()> {
    sink.write_all(data)?;
    sink.flush()
}

/// Fill a file opened with `create_new`. A failed write removes the file
/// again, leaving the name free for the next creation.
fn fill_new(target: &Path, sink: impl Write, data: &[u8]) -> io::Result<()> {
    let result = fill(sink, data);
    if result.is_err() {
        if let Err(e) = fs::remove_file(target) {
            tracing::warn!(
                path = %target.display(),
                error = %e,
                "Failed to remove partially written resource"
            );
        }
    }
    result
}
