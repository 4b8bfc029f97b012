// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! resc - Identity-Gated Resource Store
//!
//! Serves per-user public keys, TOTP secrets and files. Every request must
//! arrive over mutually authenticated TLS and carry a token signed by the
//! external authority; uploads are bound to their token by a SHA-256 claim.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Channel trust and token verification
//! - `policy` - Claim-based access decisions
//! - `orchestrator` - Per-request pipeline
//! - `storage` - Filesystem resource store
//! - `tls` - Server TLS configuration and acceptor

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod integrity;
pub mod logging;
pub mod models;
pub mod orchestrator;
pub mod policy;
pub mod redirect;
pub mod resource;
pub mod state;
pub mod storage;
pub mod tls;

#[cfg(test)]
pub(crate) mod testing;
