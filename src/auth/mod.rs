// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Channel and token authentication for the resource store.
//!
//! ## Auth Flow
//!
//! 1. Client connects over TLS, presenting a certificate issued by the
//!    configured CA (checked by rustls, reported by [`ChannelAuthenticator`])
//! 2. Client sends a token signed by the external authority:
//!    - reads: `Authorization: Bearer <JWT>`
//!    - writes: `{"token": <JWT>, "file": <payload>}` body
//! 3. [`TokenVerifier`] checks signature, expiry, issuer, audience and, where
//!    the resource requires it, the subject
//!
//! ## Security
//!
//! - The token key is loaded once at startup from a PEM file
//! - Only asymmetric algorithms matching the key family are accepted
//! - Zero clock-skew leeway
//! - Unverified decoding is a separate operation returning a separate type

pub mod channel;
pub mod claims;
pub mod error;
pub mod extractor;
pub mod keys;
pub mod verifier;

pub use channel::{Channel, ChannelAuthenticator, ChannelTrust, TlsConnectionInfo};
pub use claims::{ClaimSet, UnverifiedClaims};
pub use error::AuthError;
pub use extractor::BearerToken;
pub use keys::{KeyFamily, VerifyingKey};
pub use verifier::{ExpectedClaims, TokenVerifier};
