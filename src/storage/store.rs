// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The resource store seam used by the request pipeline.

use crate::resource::{ResourcePath, UserId};

use super::StorageResult;

/// How a write treats an existing blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Replace any existing content.
    Overwrite,
    /// Fail with `AlreadyExists` if the blob exists.
    CreateNew,
}

impl WriteMode {
    pub fn from_overwrite(overwrite: bool) -> Self {
        if overwrite {
            WriteMode::Overwrite
        } else {
            WriteMode::CreateNew
        }
    }
}

/// Byte storage addressed by [`ResourcePath`].
///
/// Implementations perform no authorization; callers must have passed the
/// access policy before calling in.
pub trait ResourceStore: Send + Sync {
    /// Store `data` at `path`.
    fn put(&self, path: &ResourcePath, data: &[u8], mode: WriteMode) -> StorageResult<()>;

    /// Read the blob at `path`.
    fn get(&self, path: &ResourcePath) -> StorageResult<Vec<u8>>;

    /// Names of the files stored for `user`, sorted. Empty if none.
    fn list(&self, user: &UserId) -> StorageResult<Vec<String>>;

    /// Verify that the store is usable.
    fn health_check(&self) -> StorageResult<()>;
}
