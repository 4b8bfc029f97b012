// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Request Orchestrator
//!
//! Runs every resource request through the same gates:
//!
//! ```text
//! Received -> ChannelChecked -> TokenVerified -> DigestChecked
//!          -> PolicyDecided -> StoreApplied
//! ```
//!
//! The first failing gate ends the request. The rejection records the last
//! stage that was passed, and one `warn` event is logged per rejection.
//!
//! ## Write routing
//!
//! Upload tokens are decoded without verification only to pick the route:
//!
//! - a file whose decoded `sub` equals the path user: verify with the subject
//!   required, overwrite allowed
//! - any other file: verify without a subject, create only
//!
//! Singleton kinds skip the decode: they are verified without a subject and
//! always replaced, so a foreign subject is refused by the policy as
//! `Forbidden`. The policy runs on the verified claims in every case.

use std::fmt;
use std::sync::Arc;

use crate::auth::{AuthError, ChannelTrust, ClaimSet, ExpectedClaims, TokenVerifier};
use crate::error::{ApiError, RequestError};
use crate::integrity;
use crate::models::UploadRequest;
use crate::policy::{authorize, Operation};
use crate::resource::{InvalidSegment, OwnerRule, Resolved, Target};
use crate::storage::{ResourceStore, WriteMode};

/// Pipeline stages, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Received,
    ChannelChecked,
    TokenVerified,
    DigestChecked,
    PolicyDecided,
    StoreApplied,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Received => "received",
            Stage::ChannelChecked => "channel_checked",
            Stage::TokenVerified => "token_verified",
            Stage::DigestChecked => "digest_checked",
            Stage::PolicyDecided => "policy_decided",
            Stage::StoreApplied => "store_applied",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A refused request and the last stage it passed.
#[derive(Debug)]
pub struct Rejection {
    pub reached: Stage,
    pub error: RequestError,
}

impl From<Rejection> for ApiError {
    fn from(rejection: Rejection) -> Self {
        rejection.error.into()
    }
}

trait AtStage<T> {
    fn at(self, stage: Stage) -> Result<T, Rejection>;
}

impl<T, E: Into<RequestError>> AtStage<T> for Result<T, E> {
    fn at(self, stage: Stage) -> Result<T, Rejection> {
        self.map_err(|e| Rejection {
            reached: stage,
            error: e.into(),
        })
    }
}

/// Successful read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Blob(Vec<u8>),
    Listing(Vec<String>),
}

/// Sequences channel, token, digest, policy and store for each request.
pub struct RequestOrchestrator {
    verifier: TokenVerifier,
    store: Arc<dyn ResourceStore>,
    issuer: String,
    audience: String,
}

impl RequestOrchestrator {
    pub fn new(
        verifier: TokenVerifier,
        store: Arc<dyn ResourceStore>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Self {
        Self {
            verifier,
            store,
            issuer: issuer.into(),
            audience: audience.into(),
        }
    }

    pub fn store(&self) -> &Arc<dyn ResourceStore> {
        &self.store
    }

    fn expected(&self) -> ExpectedClaims<'_> {
        ExpectedClaims::new(&self.issuer, &self.audience)
    }

    /// Read a resource, or list a user's files.
    pub fn read(
        &self,
        channel: ChannelTrust,
        bearer: Result<String, AuthError>,
        target: Target<'_>,
    ) -> Result<ReadOutcome, Rejection> {
        let result = self.run_read(channel, bearer, target);
        if let Err(rejection) = &result {
            log_rejection(rejection, "read", target);
        }
        result
    }

    /// Store an uploaded payload.
    pub fn write(
        &self,
        channel: ChannelTrust,
        body: Result<UploadRequest, RequestError>,
        target: Target<'_>,
    ) -> Result<(), Rejection> {
        let result = self.run_write(channel, body, target);
        match &result {
            Ok(()) => tracing::info!(
                kind = %target.kind,
                user = target.user,
                "Resource stored"
            ),
            Err(rejection) => log_rejection(rejection, "write", target),
        }
        result
    }

    fn run_read(
        &self,
        channel: ChannelTrust,
        bearer: Result<String, AuthError>,
        target: Target<'_>,
    ) -> Result<ReadOutcome, Rejection> {
        check_channel(channel)?;
        let resolved = target.resolve().at(Stage::ChannelChecked)?;
        let user = resolved.user();

        let token = bearer.at(Stage::ChannelChecked)?;
        let mut expected = self.expected();
        if target.kind.read_rule() == OwnerRule::OwnerOnly {
            expected = expected.with_subject(user.as_str());
        }
        let claims = self
            .verifier
            .verify(&token, &expected)
            .at(Stage::ChannelChecked)?;

        authorize(Operation::read(target.kind), channel, Some(&claims), user)
            .into_result()
            .at(Stage::TokenVerified)?;

        let outcome = match &resolved {
            Resolved::One(path) => self.store.get(path).map(ReadOutcome::Blob),
            Resolved::Listing(user) => self.store.list(user).map(ReadOutcome::Listing),
        };
        outcome.at(Stage::PolicyDecided)
    }

    fn run_write(
        &self,
        channel: ChannelTrust,
        body: Result<UploadRequest, RequestError>,
        target: Target<'_>,
    ) -> Result<(), Rejection> {
        check_channel(channel)?;
        let upload = body.at(Stage::ChannelChecked)?;
        let path = match target.resolve().at(Stage::ChannelChecked)? {
            Resolved::One(path) => path,
            Resolved::Listing(user) => {
                return Err(InvalidSegment(user.to_string())).at(Stage::ChannelChecked);
            }
        };
        let user = path.user();

        // Singletons are always replaced; the policy alone decides who may.
        let (overwrite, require_subject) = if target.kind.is_singleton() {
            (true, false)
        } else {
            let owner = self
                .verifier
                .decode(&upload.token)
                .at(Stage::ChannelChecked)?
                .claims_subject(user.as_str());
            (owner, owner)
        };

        let mut expected = self.expected();
        if require_subject {
            expected = expected.with_subject(user.as_str());
        }
        let claims = self
            .verifier
            .verify(&upload.token, &expected)
            .at(Stage::ChannelChecked)?;

        let payload = upload.file.as_bytes();
        check_digest(&claims, payload).at(Stage::TokenVerified)?;

        authorize(
            Operation::write(target.kind, overwrite),
            channel,
            Some(&claims),
            user,
        )
        .into_result()
        .at(Stage::DigestChecked)?;

        self.store
            .put(&path, payload, WriteMode::from_overwrite(overwrite))
            .at(Stage::PolicyDecided)
    }
}

fn check_channel(channel: ChannelTrust) -> Result<(), Rejection> {
    if channel.is_trusted() {
        Ok(())
    } else {
        Err(RequestError::ChannelUntrusted).at(Stage::Received)
    }
}

fn check_digest(claims: &ClaimSet, payload: &[u8]) -> Result<(), RequestError> {
    match claims.filehash() {
        Some(expected) if integrity::matches(expected, payload) => Ok(()),
        _ => Err(RequestError::DigestMismatch),
    }
}

fn log_rejection(rejection: &Rejection, access: &'static str, target: Target<'_>) {
    let kind = target.kind;
    if let RequestError::Store(e) = &rejection.error {
        tracing::error!(
            stage = %rejection.reached,
            access,
            kind = %kind,
            user = target.user,
            error = %e,
            "Resource store failure"
        );
    }
    tracing::warn!(
        stage = %rejection.reached,
        code = rejection.error.code(),
        access,
        kind = %kind,
        user = target.user,
        "Request rejected"
    );
}
