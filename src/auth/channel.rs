// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Channel (mutual TLS) authentication.
//!
//! rustls validates any client certificate against the configured CA during
//! the handshake. Anonymous clients are let through the handshake so that
//! they can be answered with `Unauthorized`; the TLS acceptor records the
//! peer chain on every request as a [`TlsConnectionInfo`] extension and the
//! [`ChannelAuthenticator`] turns it into a yes/no fact. The fact says
//! nothing about which user is acting.

use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use rustls::pki_types::CertificateDer;
use rustls::server::danger::ClientCertVerifier;
use rustls::server::{VerifierBuilderError, WebPkiClientVerifier};
use rustls::RootCertStore;

use crate::state::AppState;

/// Per-connection TLS facts attached to each request by the acceptor.
#[derive(Debug, Clone, Default)]
pub struct TlsConnectionInfo {
    peer_certificates: Option<Arc<Vec<CertificateDer<'static>>>>,
}

impl TlsConnectionInfo {
    /// Build from the verified peer chain, if the client presented one.
    pub fn new(peer_certificates: Option<&[CertificateDer<'static>]>) -> Self {
        Self {
            peer_certificates: peer_certificates.map(|chain| Arc::new(chain.to_vec())),
        }
    }

    /// A connection where the client did not present a certificate.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn peer_certificates(&self) -> Option<&[CertificateDer<'static>]> {
        self.peer_certificates.as_deref().map(Vec::as_slice)
    }
}

/// Outcome of the channel check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelTrust {
    Trusted,
    Untrusted,
}

impl ChannelTrust {
    pub fn is_trusted(self) -> bool {
        self == ChannelTrust::Trusted
    }
}

/// Decides whether a connection is mutually authenticated.
#[derive(Debug, Clone)]
pub struct ChannelAuthenticator {
    roots: Arc<RootCertStore>,
}

impl ChannelAuthenticator {
    /// Create an authenticator anchored on `roots` (the client CA bundle).
    pub fn new(roots: RootCertStore) -> Self {
        Self {
            roots: Arc::new(roots),
        }
    }

    /// Client certificate verifier for the TLS server configuration.
    ///
    /// Presented certificates must chain to the configured roots; clients
    /// without a certificate complete the handshake as untrusted.
    pub fn client_verifier(&self) -> Result<Arc<dyn ClientCertVerifier>, VerifierBuilderError> {
        WebPkiClientVerifier::builder_with_provider(
            self.roots.clone(),
            Arc::new(rustls::crypto::ring::default_provider()),
        )
        .allow_unauthenticated()
        .build()
    }

    /// True iff the client presented a certificate that passed verification.
    pub fn is_channel_trusted(&self, connection: Option<&TlsConnectionInfo>) -> bool {
        connection
            .and_then(TlsConnectionInfo::peer_certificates)
            .is_some_and(|chain| !chain.is_empty())
    }

    pub fn trust(&self, connection: Option<&TlsConnectionInfo>) -> ChannelTrust {
        if self.is_channel_trusted(connection) {
            ChannelTrust::Trusted
        } else {
            ChannelTrust::Untrusted
        }
    }
}

/// Extractor yielding the channel trust of the current request.
///
/// Never rejects: an untrusted channel is reported, not refused, so the
/// request pipeline can decide on the response.
pub struct Channel(pub ChannelTrust);

impl FromRequestParts<AppState> for Channel {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let info = parts.extensions.get::<TlsConnectionInfo>();
        Ok(Channel(state.channel.trust(info)))
    }
}
