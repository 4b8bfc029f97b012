// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use jsonwebtoken::errors::{Error as JwtError, ErrorKind};

/// Token and key errors.
///
/// The `Display` text is the short reason returned to clients, so it must
/// never include token contents or key material.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No bearer token on a read request
    #[error("Missing token")]
    MissingToken,
    /// Authorization header present but not `Bearer <token>`
    #[error("Invalid authorization header")]
    InvalidAuthHeader,
    /// Token does not decompose into header, claims and signature
    #[error("Malformed token")]
    MalformedToken,
    /// Header algorithm is not accepted for the configured key
    #[error("Unsupported token algorithm")]
    UnsupportedAlgorithm,
    /// Signature does not verify against the configured key
    #[error("Invalid signature")]
    BadSignature,
    /// `exp` is in the past
    #[error("Token expired")]
    TokenExpired,
    /// `nbf` is in the future
    #[error("Token not yet valid")]
    TokenNotYetValid,
    /// `iss` missing or different from the configured issuer
    #[error("Invalid issuer")]
    IssuerMismatch,
    /// `aud` missing or not naming this service
    #[error("Invalid audience")]
    AudienceMismatch,
    /// `sub` missing or different from the required subject
    #[error("Invalid subject")]
    SubjectMismatch,
    /// The token authority's public key could not be loaded
    #[error("Failed to load public key: {0}")]
    KeyLoad(String),
}

impl AuthError {
    /// Stable machine-readable code used in log events.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "missing_token",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::MalformedToken => "token_malformed",
            AuthError::UnsupportedAlgorithm => "token_unsupported_algorithm",
            AuthError::BadSignature => "token_bad_signature",
            AuthError::TokenExpired => "token_expired",
            AuthError::TokenNotYetValid => "token_not_yet_valid",
            AuthError::IssuerMismatch => "token_issuer_mismatch",
            AuthError::AudienceMismatch => "token_audience_mismatch",
            AuthError::SubjectMismatch => "token_subject_mismatch",
            AuthError::KeyLoad(_) => "key_load",
        }
    }
}

impl From<JwtError> for AuthError {
    fn from(e: JwtError) -> Self {
        match e.kind() {
            ErrorKind::InvalidSignature => AuthError::BadSignature,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                AuthError::UnsupportedAlgorithm
            }
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            ErrorKind::ImmatureSignature => AuthError::TokenNotYetValid,
            ErrorKind::InvalidIssuer => AuthError::IssuerMismatch,
            ErrorKind::InvalidAudience => AuthError::AudienceMismatch,
            ErrorKind::InvalidSubject => AuthError::SubjectMismatch,
            ErrorKind::MissingRequiredClaim(claim) => match claim.as_str() {
                "iss" => AuthError::IssuerMismatch,
                "aud" => AuthError::AudienceMismatch,
                "sub" => AuthError::SubjectMismatch,
                _ => AuthError::MalformedToken,
            },
            _ => AuthError::MalformedToken,
        }
    }
}
