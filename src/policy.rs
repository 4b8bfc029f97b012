// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Access policy.
//!
//! Decides whether an operation on a resource is authorized. Rules are
//! evaluated in order and the first denial wins:
//!
//! | # | Condition | Decision |
//! |---|-----------|----------|
//! | 1 | channel not trusted | Deny `Unauthorized` |
//! | 2 | token not verified | Deny `InvalidToken` |
//! | 3 | read `pubkey` / `file` | Allow |
//! | 4 | read `totp-key` | owner only, else Deny `Forbidden` |
//! | 5 | write `pubkey` / `totp-key` | owner only, else Deny `Forbidden` |
//! | 6 | write `file`, overwrite | owner only, else Deny `Forbidden` |
//! | 7 | write `file`, create | Allow |
//!
//! Anyone holding a valid token may create a new file under any user; only
//! the owner may replace it or touch the singleton key resources. Rules 3-7
//! are encoded by [`ResourceKind::read_rule`] and [`ResourceKind::write_rule`].

use std::fmt;

use crate::auth::{ChannelTrust, ClaimSet};
use crate::resource::{OwnerRule, ResourceKind, UserId};

/// How a resource is accessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    /// `overwrite` is true when the write may replace an existing blob.
    Write { overwrite: bool },
}

/// An operation subject to authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    pub kind: ResourceKind,
    pub access: Access,
}

impl Operation {
    pub fn read(kind: ResourceKind) -> Self {
        Self {
            kind,
            access: Access::Read,
        }
    }

    pub fn write(kind: ResourceKind, overwrite: bool) -> Self {
        Self {
            kind,
            access: Access::Write { overwrite },
        }
    }

    pub fn rule(&self) -> OwnerRule {
        match self.access {
            Access::Read => self.kind.read_rule(),
            Access::Write { overwrite } => self.kind.write_rule(overwrite),
        }
    }
}

/// Why an operation was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    Unauthorized,
    InvalidToken,
    Forbidden,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenyReason::Unauthorized => write!(f, "Unauthorized"),
            DenyReason::InvalidToken => write!(f, "Invalid Token"),
            DenyReason::Forbidden => write!(f, "Forbidden"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn into_result(self) -> Result<(), DenyReason> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(reason),
        }
    }
}

/// Authorize `op` on a resource belonging to `path_user`.
///
/// `verified` is `None` when token verification failed upstream. Only a
/// verified claim set is accepted here; decoded-only claims have a different
/// type and cannot reach this function.
pub fn authorize(
    op: Operation,
    channel: ChannelTrust,
    verified: Option<&ClaimSet>,
    path_user: &UserId,
) -> Decision {
    if !channel.is_trusted() {
        return Decision::Deny(DenyReason::Unauthorized);
    }
    let Some(claims) = verified else {
        return Decision::Deny(DenyReason::InvalidToken);
    };

    match op.rule() {
        OwnerRule::AnyVerified => Decision::Allow,
        OwnerRule::OwnerOnly if claims.is_subject(path_user.as_str()) => Decision::Allow,
        OwnerRule::OwnerOnly => Decision::Deny(DenyReason::Forbidden),
    }
}
