// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Resource Storage Module
//!
//! Raw byte storage for public keys, TOTP keys and files.
//!
//! ## Storage Layout
//!
//! ```text
//! resources/
//!   pubkeys/
//!     {user_id}            # public key
//!   keys/
//!     {user_id}            # TOTP secret
//!   files/
//!     {user_id}/
//!       {filename}
//! ```
//!
//! ## Important Notes
//!
//! - The store performs no authorization; every call is made after the
//!   access policy allowed the operation
//! - Resources are never deleted
//! - Owner overwrites are last-writer-wins; non-owner creations are
//!   exclusive

pub mod fs;
pub mod paths;
pub mod store;

pub use fs::{FsResourceStore, StorageError, StorageResult};
pub use paths::StoragePaths;
pub use store::{ResourceStore, WriteMode};
