// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token claims.
//!
//! Two distinct types come out of a token:
//!
//! - [`ClaimSet`] is produced only by [`super::TokenVerifier::verify`] after the
//!   signature, time window, issuer, audience and (optional) subject checks
//!   have all passed. It has no public constructor.
//! - [`UnverifiedClaims`] is what [`super::TokenVerifier::decode`] returns. It
//!   may be used to pick which verification to run next and nothing else.

use serde::Deserialize;

/// `aud` may be a single string or an array of strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum Audience {
    One(String),
    Many(Vec<String>),
}

impl Audience {
    fn into_vec(self) -> Vec<String> {
        match self {
            Audience::One(aud) => vec![aud],
            Audience::Many(auds) => auds,
        }
    }
}

/// Claims as they appear in the token payload.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawClaims {
    #[serde(default)]
    pub iss: Option<String>,
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub aud: Option<Audience>,
    #[serde(default)]
    pub exp: Option<u64>,
    /// SHA-256 (hex) of the payload an upload token authorizes
    #[serde(default)]
    pub filehash: Option<String>,
}

/// A verified claim set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimSet {
    issuer: String,
    audience: Vec<String>,
    subject: Option<String>,
    expires_at: u64,
    filehash: Option<String>,
}

impl ClaimSet {
    pub(super) fn from_verified(raw: RawClaims) -> Self {
        Self {
            issuer: raw.iss.unwrap_or_default(),
            audience: raw.aud.map(Audience::into_vec).unwrap_or_default(),
            subject: raw.sub,
            expires_at: raw.exp.unwrap_or_default(),
            filehash: raw.filehash,
        }
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn audience(&self) -> &[String] {
        &self.audience
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// Expiry as a Unix timestamp.
    pub fn expires_at(&self) -> u64 {
        self.expires_at
    }

    pub fn filehash(&self) -> Option<&str> {
        self.filehash.as_deref()
    }

    /// Whether the verified subject is exactly `user_id`.
    pub fn is_subject(&self, user_id: &str) -> bool {
        self.subject() == Some(user_id)
    }

    #[cfg(test)]
    pub(crate) fn for_tests(subject: Option<&str>, filehash: Option<&str>) -> Self {
        Self {
            issuer: crate::testing::ISSUER.to_string(),
            audience: vec![crate::testing::AUDIENCE.to_string()],
            subject: subject.map(str::to_string),
            expires_at: u64::MAX,
            filehash: filehash.map(str::to_string),
        }
    }
}

/// Claims read without verifying the token.
///
/// Not authorization evidence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnverifiedClaims {
    subject: Option<String>,
}

impl UnverifiedClaims {
    pub(super) fn from_raw(raw: RawClaims) -> Self {
        Self { subject: raw.sub }
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// Whether the token claims to be issued to `user_id`.
    pub fn claims_subject(&self, user_id: &str) -> bool {
        self.subject() == Some(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audience_accepts_string_or_array() {
        let one: RawClaims = serde_json::from_str(r#"{"aud":"resc.acme.com"}"#).unwrap();
        let many: RawClaims =
            serde_json::from_str(r#"{"aud":["other","resc.acme.com"]}"#).unwrap();

        assert_eq!(
            ClaimSet::from_verified(one).audience(),
            ["resc.acme.com".to_string()]
        );
        assert_eq!(ClaimSet::from_verified(many).audience().len(), 2);
    }

    #[test]
    fn subject_comparison_is_exact() {
        let claims = ClaimSet::for_tests(Some("alice"), None);
        assert!(claims.is_subject("alice"));
        assert!(!claims.is_subject("Alice"));
        assert!(!claims.is_subject("alice "));

        let anonymous = ClaimSet::for_tests(None, None);
        assert!(!anonymous.is_subject(""));
    }

    #[test]
    fn unverified_claims_only_expose_subject() {
        let raw: RawClaims =
            serde_json::from_str(r#"{"sub":"bob","filehash":"00","iss":"x"}"#).unwrap();
        let decoded = UnverifiedClaims::from_raw(raw);
        assert!(decoded.claims_subject("bob"));
        assert!(!decoded.claims_subject("alice"));
    }
}
