// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token verification.
//!
//! ## Checks (all-or-nothing)
//!
//! 1. Token decomposes into header, claims and signature
//! 2. Header algorithm belongs to the configured key family
//! 3. Signature verifies against the configured public key
//! 4. `exp` and `nbf` hold against the current time, zero leeway
//! 5. `iss` equals the configured issuer
//! 6. `aud` equals or contains this service's hostname
//! 7. `sub` equals the expected subject, when one is required

use jsonwebtoken::{decode, decode_header, Validation};

use super::claims::{ClaimSet, RawClaims, UnverifiedClaims};
use super::error::AuthError;
use super::keys::VerifyingKey;

/// Claims a token must carry for one particular request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpectedClaims<'a> {
    pub issuer: &'a str,
    pub audience: &'a str,
    pub subject: Option<&'a str>,
}

impl<'a> ExpectedClaims<'a> {
    pub fn new(issuer: &'a str, audience: &'a str) -> Self {
        Self {
            issuer,
            audience,
            subject: None,
        }
    }

    /// Additionally require `sub` to equal `subject`.
    pub fn with_subject(mut self, subject: &'a str) -> Self {
        self.subject = Some(subject);
        self
    }
}

/// Verifies tokens signed by the external authority.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    key: VerifyingKey,
}

impl TokenVerifier {
    pub fn new(key: VerifyingKey) -> Self {
        Self { key }
    }

    /// Verify `token` and return its claims.
    pub fn verify(&self, token: &str, expected: &ExpectedClaims<'_>) -> Result<ClaimSet, AuthError> {
        let header = decode_header(token).map_err(|_| AuthError::MalformedToken)?;

        let family = self.key.family();
        if !family.accepts(header.alg) {
            return Err(AuthError::UnsupportedAlgorithm);
        }

        let mut validation = Validation::new(header.alg);
        validation.algorithms = family.algorithms().to_vec();
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.set_issuer(&[expected.issuer]);
        validation.set_audience(&[expected.audience]);

        let mut required = vec!["exp", "iss", "aud"];
        if let Some(subject) = expected.subject {
            validation.sub = Some(subject.to_string());
            required.push("sub");
        }
        validation.set_required_spec_claims(&required);

        let data = decode::<RawClaims>(token, self.key.decoding_key(), &validation)?;
        Ok(ClaimSet::from_verified(data.claims))
    }

    /// Read claims without verifying anything.
    ///
    /// Only for choosing which [`verify`](Self::verify) call to make.
    pub fn decode(&self, token: &str) -> Result<UnverifiedClaims, AuthError> {
        let data = jsonwebtoken::dangerous::insecure_decode::<RawClaims>(token)
            .map_err(|_| AuthError::MalformedToken)?;
        Ok(UnverifiedClaims::from_raw(data.claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{now, TestAuthority, AUDIENCE, ISSUER};
    use serde_json::json;

    fn expected() -> ExpectedClaims<'static> {
        ExpectedClaims::new(ISSUER, AUDIENCE)
    }

    fn setup() -> (TestAuthority, TokenVerifier) {
        let authority = TestAuthority::generate();
        let verifier = TokenVerifier::new(authority.verifying_key());
        (authority, verifier)
    }

    #[test]
    fn valid_token_yields_claims() {
        let (authority, verifier) = setup();
        let token = authority.token_for("alice", Some("abc"));

        let claims = verifier.verify(&token, &expected()).unwrap();
        assert_eq!(claims.subject(), Some("alice"));
        assert_eq!(claims.issuer(), ISSUER);
        assert_eq!(claims.filehash(), Some("abc"));
    }

    #[test]
    fn token_from_other_key_is_bad_signature() {
        let (_, verifier) = setup();
        let impostor = TestAuthority::generate();
        let token = impostor.token_for("alice", None);

        assert_eq!(verifier.verify(&token, &expected()), Err(AuthError::BadSignature));
    }

    #[test]
    fn expired_token_is_rejected_despite_valid_signature() {
        let (authority, verifier) = setup();
        let token = authority.sign(&json!({
            "iss": ISSUER,
            "aud": AUDIENCE,
            "sub": "alice",
            "exp": now() - 5,
        }));

        assert_eq!(verifier.verify(&token, &expected()), Err(AuthError::TokenExpired));
    }

    #[test]
    fn future_nbf_is_not_yet_valid() {
        let (authority, verifier) = setup();
        let token = authority.sign(&json!({
            "iss": ISSUER,
            "aud": AUDIENCE,
            "exp": now() + 600,
            "nbf": now() + 300,
        }));

        assert_eq!(
            verifier.verify(&token, &expected()),
            Err(AuthError::TokenNotYetValid)
        );
    }

    #[test]
    fn wrong_issuer_and_audience() {
        let (authority, verifier) = setup();
        let wrong_iss = authority.sign(&json!({
            "iss": "auth.evil.com",
            "aud": AUDIENCE,
            "exp": now() + 60,
        }));
        let wrong_aud = authority.sign(&json!({
            "iss": ISSUER,
            "aud": "other.acme.com",
            "exp": now() + 60,
        }));
        let no_aud = authority.sign(&json!({
            "iss": ISSUER,
            "exp": now() + 60,
        }));

        assert_eq!(verifier.verify(&wrong_iss, &expected()), Err(AuthError::IssuerMismatch));
        assert_eq!(verifier.verify(&wrong_aud, &expected()), Err(AuthError::AudienceMismatch));
        assert_eq!(verifier.verify(&no_aud, &expected()), Err(AuthError::AudienceMismatch));
    }

    #[test]
    fn audience_array_containing_hostname_is_accepted() {
        let (authority, verifier) = setup();
        let token = authority.sign(&json!({
            "iss": ISSUER,
            "aud": ["other.acme.com", AUDIENCE],
            "exp": now() + 60,
        }));

        assert!(verifier.verify(&token, &expected()).is_ok());
    }

    #[test]
    fn subject_is_checked_only_when_required() {
        let (authority, verifier) = setup();
        let token = authority.token_for("alice", None);

        assert!(verifier.verify(&token, &expected()).is_ok());
        assert!(verifier
            .verify(&token, &expected().with_subject("alice"))
            .is_ok());
        assert_eq!(
            verifier.verify(&token, &expected().with_subject("bob")),
            Err(AuthError::SubjectMismatch)
        );
    }

    #[test]
    fn missing_subject_fails_subject_check() {
        let (authority, verifier) = setup();
        let token = authority.sign(&json!({
            "iss": ISSUER,
            "aud": AUDIENCE,
            "exp": now() + 60,
        }));

        assert_eq!(
            verifier.verify(&token, &expected().with_subject("alice")),
            Err(AuthError::SubjectMismatch)
        );
    }

    #[test]
    fn garbage_is_malformed() {
        let (_, verifier) = setup();
        assert_eq!(verifier.verify("not-a-token", &expected()), Err(AuthError::MalformedToken));
        assert_eq!(verifier.decode("a.b"), Err(AuthError::MalformedToken));
    }

    #[test]
    fn alg_none_is_rejected() {
        use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

        let (_, verifier) = setup();
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let claims = URL_SAFE_NO_PAD.encode(
            format!(r#"{{"iss":"{ISSUER}","aud":"{AUDIENCE}","exp":{}}}"#, now() + 60).as_bytes(),
        );
        let token = format!("{header}.{claims}.");

        assert_eq!(verifier.verify(&token, &expected()), Err(AuthError::MalformedToken));
    }

    #[test]
    fn hmac_token_is_an_unsupported_algorithm() {
        use jsonwebtoken::{encode, EncodingKey, Header};

        let (_, verifier) = setup();
        let token = encode(
            &Header::new(jsonwebtoken::Algorithm::HS256),
            &json!({"iss": ISSUER, "aud": AUDIENCE, "exp": now() + 60}),
            &EncodingKey::from_secret(b"public key bytes"),
        )
        .unwrap();

        assert_eq!(
            verifier.verify(&token, &expected()),
            Err(AuthError::UnsupportedAlgorithm)
        );
    }

    #[test]
    fn decode_reads_subject_without_verifying() {
        let (_, verifier) = setup();
        let impostor = TestAuthority::generate();
        let token = impostor.token_for("mallory", None);

        let decoded = verifier.decode(&token).unwrap();
        assert_eq!(decoded.subject(), Some("mallory"));
        assert_eq!(verifier.verify(&token, &expected()), Err(AuthError::BadSignature));
    }
}
