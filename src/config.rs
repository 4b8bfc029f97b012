// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, their default values and
//! the [`AppConfig`] loaded from them once at startup. Nothing reads the
//! environment after [`AppConfig::from_env`] returns; the loaded value is
//! passed by reference into the components that need it.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `127.0.1.2` |
//! | `HTTP_PORT` | Plaintext port (redirects to HTTPS) | `3000` |
//! | `HTTPS_PORT` | TLS port | `3443` |
//! | `KEY_DIR` | Directory holding certificates and keys | `keys` |
//! | `CRT_NAME` | Server certificate file | `resc.acme.com.crt` |
//! | `KEY_NAME` | Server private key file | `resc.acme.com.pem` |
//! | `CA_CRT_NAME` | CA bundle used to verify client certificates | `ca.crt` |
//! | `TOKEN_PUBKEY_NAME` | Public key of the token authority | `auth.acme.com.pub.pem` |
//! | `TOKEN_ISSUER` | Expected `iss` claim | `auth.acme.com` |
//! | `PUBLIC_HOSTNAME` | Expected `aud` claim and redirect host | `resc.acme.com` |
//! | `RESOURCE_DIR` | Root directory of the resource store | `resources` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

pub const HOST_ENV: &str = "HOST";
pub const HTTP_PORT_ENV: &str = "HTTP_PORT";
pub const HTTPS_PORT_ENV: &str = "HTTPS_PORT";
pub const KEY_DIR_ENV: &str = "KEY_DIR";
pub const CRT_NAME_ENV: &str = "CRT_NAME";
pub const KEY_NAME_ENV: &str = "KEY_NAME";
pub const CA_CRT_NAME_ENV: &str = "CA_CRT_NAME";
pub const TOKEN_PUBKEY_NAME_ENV: &str = "TOKEN_PUBKEY_NAME";
pub const TOKEN_ISSUER_ENV: &str = "TOKEN_ISSUER";
pub const PUBLIC_HOSTNAME_ENV: &str = "PUBLIC_HOSTNAME";

/// Environment variable name for the resource store root.
///
/// The directory tree below it is `pubkeys/`, `keys/` and `files/{user}/`.
///
/// # Default
/// `resources` (relative to the working directory)
pub const RESOURCE_DIR_ENV: &str = "RESOURCE_DIR";

pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "127.0.1.2";
pub const DEFAULT_HTTP_PORT: u16 = 3000;
pub const DEFAULT_HTTPS_PORT: u16 = 3443;
pub const DEFAULT_KEY_DIR: &str = "keys";
pub const DEFAULT_CRT_NAME: &str = "resc.acme.com.crt";
pub const DEFAULT_KEY_NAME: &str = "resc.acme.com.pem";
pub const DEFAULT_CA_CRT_NAME: &str = "ca.crt";
pub const DEFAULT_TOKEN_PUBKEY_NAME: &str = "auth.acme.com.pub.pem";
pub const DEFAULT_TOKEN_ISSUER: &str = "auth.acme.com";
pub const DEFAULT_PUBLIC_HOSTNAME: &str = "resc.acme.com";
pub const DEFAULT_RESOURCE_DIR: &str = "resources";
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Configuration errors raised while reading the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} is not a valid port: {value}")]
    InvalidPort { var: &'static str, value: String },

    #[error("{var} is not a valid IP address: {value}")]
    InvalidHost { var: &'static str, value: String },
}

/// File locations of the TLS material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
    pub ca_bundle: PathBuf,
}

/// What a bearer token must carry to be accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPolicy {
    /// Path to the PEM public key of the token authority.
    pub public_key: PathBuf,
    /// Expected `iss` claim.
    pub issuer: String,
    /// Expected `aud` claim; this service's public hostname.
    pub audience: String,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Complete service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: IpAddr,
    pub http_port: u16,
    pub https_port: u16,
    pub tls: TlsPaths,
    pub token: TokenPolicy,
    /// Public hostname used in plaintext-to-HTTPS redirects.
    pub hostname: String,
    pub resource_dir: PathBuf,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let host_value = var(HOST_ENV, DEFAULT_HOST);
        let host = host_value.parse().map_err(|_| ConfigError::InvalidHost {
            var: HOST_ENV,
            value: host_value.clone(),
        })?;

        let http_port = parse_port(&lookup, HTTP_PORT_ENV, DEFAULT_HTTP_PORT)?;
        let https_port = parse_port(&lookup, HTTPS_PORT_ENV, DEFAULT_HTTPS_PORT)?;

        let key_dir = PathBuf::from(var(KEY_DIR_ENV, DEFAULT_KEY_DIR));
        let hostname = var(PUBLIC_HOSTNAME_ENV, DEFAULT_PUBLIC_HOSTNAME);

        Ok(Self {
            host,
            http_port,
            https_port,
            tls: TlsPaths {
                cert: key_dir.join(var(CRT_NAME_ENV, DEFAULT_CRT_NAME)),
                key: key_dir.join(var(KEY_NAME_ENV, DEFAULT_KEY_NAME)),
                ca_bundle: key_dir.join(var(CA_CRT_NAME_ENV, DEFAULT_CA_CRT_NAME)),
            },
            token: TokenPolicy {
                public_key: key_dir.join(var(TOKEN_PUBKEY_NAME_ENV, DEFAULT_TOKEN_PUBKEY_NAME)),
                issuer: var(TOKEN_ISSUER_ENV, DEFAULT_TOKEN_ISSUER),
                audience: hostname.clone(),
            },
            hostname,
            resource_dir: PathBuf::from(var(RESOURCE_DIR_ENV, DEFAULT_RESOURCE_DIR)),
            log_format: lookup(LOG_FORMAT_ENV)
                .map(|v| LogFormat::parse(&v))
                .unwrap_or_default(),
        })
    }

    pub fn https_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.https_port)
    }

    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.http_port)
    }
}

fn parse_port<F>(lookup: &F, var: &'static str, default: u16) -> Result<u16, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidPort { var, value }),
    }
}
