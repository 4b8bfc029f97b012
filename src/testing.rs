// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared test fixtures: a token authority with a throwaway Ed25519 key and
//! a ready-to-use application state over a temporary resource root.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{encode, Algorithm, DecodingKey, EncodingKey, Header};
use ring::rand::SystemRandom;
use ring::signature::{Ed25519KeyPair, KeyPair};
use rustls::pki_types::CertificateDer;
use rustls::RootCertStore;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::auth::{ChannelAuthenticator, KeyFamily, TlsConnectionInfo, TokenVerifier, VerifyingKey};
use crate::orchestrator::RequestOrchestrator;
use crate::state::AppState;
use crate::storage::{FsResourceStore, StoragePaths};

pub const ISSUER: &str = "auth.acme.com";
pub const AUDIENCE: &str = "resc.acme.com";

/// DER prefix of an Ed25519 SubjectPublicKeyInfo, followed by the 32 key bytes.
const ED25519_SPKI_PREFIX: [u8; 12] = [
    0x30, 0x2a, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x03, 0x21, 0x00,
];

pub fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_secs()
}

/// Stand-in for the external token authority.
pub struct TestAuthority {
    encoding_key: EncodingKey,
    public_key: Vec<u8>,
}

impl TestAuthority {
    pub fn generate() -> Self {
        let pkcs8 = Ed25519KeyPair::generate_pkcs8(&SystemRandom::new()).expect("keygen");
        let pair = Ed25519KeyPair::from_pkcs8(pkcs8.as_ref()).expect("parse pkcs8");
        Self {
            encoding_key: EncodingKey::from_ed_der(pkcs8.as_ref()),
            public_key: pair.public_key().as_ref().to_vec(),
        }
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        VerifyingKey::new(DecodingKey::from_ed_der(&self.public_key), KeyFamily::Ed25519)
    }

    /// The public key as it would be deployed: PEM encoded SPKI.
    pub fn public_key_pem(&self) -> String {
        let mut der = ED25519_SPKI_PREFIX.to_vec();
        der.extend_from_slice(&self.public_key);
        pem::encode(&pem::Pem::new("PUBLIC KEY", der))
    }

    pub fn sign(&self, claims: &Value) -> String {
        encode(&Header::new(Algorithm::EdDSA), claims, &self.encoding_key).expect("sign token")
    }

    /// A token for `sub`, valid for five minutes.
    pub fn token_for(&self, sub: &str, filehash: Option<&str>) -> String {
        let mut claims = json!({
            "iss": ISSUER,
            "aud": AUDIENCE,
            "sub": sub,
            "exp": now() + 300,
        });
        if let Some(hash) = filehash {
            claims["filehash"] = json!(hash);
        }
        self.sign(&claims)
    }
}

/// Connection info as the acceptor records it for a client with a
/// verified certificate.
pub fn trusted_connection() -> TlsConnectionInfo {
    let cert = CertificateDer::from(vec![0x30, 0x03, 0x02, 0x01, 0x01]);
    TlsConnectionInfo::new(Some(&[cert]))
}

/// Application state over a fresh temporary resource root.
pub fn test_state() -> (AppState, TestAuthority, TempDir) {
    test_state_with(ChannelAuthenticator::new(RootCertStore::empty()))
}

pub fn test_state_with(channel: ChannelAuthenticator) -> (AppState, TestAuthority, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut store = FsResourceStore::new(StoragePaths::new(dir.path()));
    store.initialize().expect("Failed to initialize test store");

    let authority = TestAuthority::generate();
    let orchestrator = RequestOrchestrator::new(
        TokenVerifier::new(authority.verifying_key()),
        Arc::new(store),
        ISSUER,
        AUDIENCE,
    );
    let state = AppState::new(channel, orchestrator);
    (state, authority, dir)
}
