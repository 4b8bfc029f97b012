// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token authority public key.
//!
//! The key is read from a PEM file once at startup. Its family (RSA, EC or
//! Ed25519) fixes the set of signature algorithms a token may declare, so a
//! token cannot downgrade verification to `none` or to an HMAC keyed with
//! the public key bytes.

use std::fs;
use std::path::Path;

use jsonwebtoken::{Algorithm, DecodingKey};

use super::error::AuthError;

/// Asymmetric key families accepted for token signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFamily {
    Rsa,
    EllipticCurve,
    Ed25519,
}

impl KeyFamily {
    /// Algorithms a token header may declare for this family.
    pub fn algorithms(self) -> &'static [Algorithm] {
        match self {
            KeyFamily::Rsa => &[
                Algorithm::RS256,
                Algorithm::RS384,
                Algorithm::RS512,
                Algorithm::PS256,
                Algorithm::PS384,
                Algorithm::PS512,
            ],
            KeyFamily::EllipticCurve => &[Algorithm::ES256, Algorithm::ES384],
            KeyFamily::Ed25519 => &[Algorithm::EdDSA],
        }
    }

    pub fn accepts(self, alg: Algorithm) -> bool {
        self.algorithms().contains(&alg)
    }
}

/// Public key used to verify token signatures.
#[derive(Clone)]
pub struct VerifyingKey {
    key: DecodingKey,
    family: KeyFamily,
}

impl std::fmt::Debug for VerifyingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerifyingKey")
            .field("family", &self.family)
            .finish_non_exhaustive()
    }
}

impl VerifyingKey {
    pub fn new(key: DecodingKey, family: KeyFamily) -> Self {
        Self { key, family }
    }

    /// Parse a PEM encoded public key, detecting its family.
    pub fn from_pem(pem: &[u8]) -> Result<Self, AuthError> {
        if let Ok(key) = DecodingKey::from_rsa_pem(pem) {
            return Ok(Self::new(key, KeyFamily::Rsa));
        }
        if let Ok(key) = DecodingKey::from_ec_pem(pem) {
            return Ok(Self::new(key, KeyFamily::EllipticCurve));
        }
        if let Ok(key) = DecodingKey::from_ed_pem(pem) {
            return Ok(Self::new(key, KeyFamily::Ed25519));
        }
        Err(AuthError::KeyLoad(
            "not an RSA, EC or Ed25519 public key".to_string(),
        ))
    }

    /// Load a PEM public key from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AuthError> {
        let path = path.as_ref();
        let pem = fs::read(path)
            .map_err(|e| AuthError::KeyLoad(format!("{}: {e}", path.display())))?;
        Self::from_pem(&pem)
    }

    pub fn family(&self) -> KeyFamily {
        self.family
    }

    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        &self.key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestAuthority;

    #[test]
    fn ed25519_pem_is_detected() {
        let authority = TestAuthority::generate();
        let key = VerifyingKey::from_pem(authority.public_key_pem().as_bytes()).unwrap();
        assert_eq!(key.family(), KeyFamily::Ed25519);
    }

    #[test]
    fn garbage_is_rejected() {
        let err = VerifyingKey::from_pem(b"-----BEGIN NONSENSE-----\n-----END NONSENSE-----\n")
            .unwrap_err();
        assert!(matches!(err, AuthError::KeyLoad(_)));
    }

    #[test]
    fn missing_file_is_a_key_load_error() {
        let err = VerifyingKey::load("/nonexistent/auth.acme.com.pub.pem").unwrap_err();
        assert!(matches!(err, AuthError::KeyLoad(_)));
    }

    #[test]
    fn families_never_accept_hmac() {
        for family in [KeyFamily::Rsa, KeyFamily::EllipticCurve, KeyFamily::Ed25519] {
            assert!(!family.accepts(Algorithm::HS256));
            assert!(!family.accepts(Algorithm::HS512));
        }
        assert!(KeyFamily::Rsa.accepts(Algorithm::PS256));
        assert!(!KeyFamily::Ed25519.accepts(Algorithm::ES256));
    }
}
