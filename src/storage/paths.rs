// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path constants and utilities for the resource store layout.

use std::path::{Path, PathBuf};

use crate::config::DEFAULT_RESOURCE_DIR;
use crate::resource::{ResourcePath, UserId};

/// Storage path utilities for the resource tree.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl Default for StoragePaths {
    fn default() -> Self {
        Self::new(DEFAULT_RESOURCE_DIR)
    }
}

impl StoragePaths {
    /// Create a new StoragePaths with a custom root (useful for testing).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory for all resources.
    pub fn root(&self) -> &Path {
        &self.root
    }

    // ========== Singleton Resources ==========

    /// Directory holding one public key per user.
    pub fn pubkeys_dir(&self) -> PathBuf {
        self.root.join("pubkeys")
    }

    /// Directory holding one TOTP key per user.
    pub fn totp_keys_dir(&self) -> PathBuf {
        self.root.join("keys")
    }

    // ========== Files ==========

    /// Directory containing every user's file directory.
    pub fn files_dir(&self) -> PathBuf {
        self.root.join("files")
    }

    /// Directory for a specific user's files.
    pub fn user_files_dir(&self, user: &UserId) -> PathBuf {
        self.files_dir().join(user.as_str())
    }

    /// On-disk location of a resource.
    pub fn resolve(&self, resource: &ResourcePath) -> PathBuf {
        match resource {
            ResourcePath::PublicKey(user) => self.pubkeys_dir().join(user.as_str()),
            ResourcePath::TotpKey(user) => self.totp_keys_dir().join(user.as_str()),
            ResourcePath::File(user, name) => self.user_files_dir(user).join(name.as_str()),
        }
    }
}
