// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies of the resource endpoints. All types derive
//! `Serialize`, `Deserialize`, and `ToSchema` for JSON handling and OpenAPI
//! documentation.
//!
//! Payloads are carried as JSON strings and stored as their UTF-8 bytes; the
//! upload token's `filehash` is the SHA-256 of those bytes.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of every `PUT` request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct UploadRequest {
    /// JWT issued by the token authority. Must carry `filehash`.
    pub token: String,
    /// Payload to store.
    pub file: String,
}

/// Response for public key and TOTP key reads.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct KeyResponse {
    pub key: String,
}

/// Response for file reads.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct FileResponse {
    pub file: String,
}
