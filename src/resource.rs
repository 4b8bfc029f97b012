// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Resource addressing.
//!
//! A resource is a byte blob addressed by `(kind, user, [filename])`. Public
//! keys and TOTP keys are singletons (one blob per user); files are
//! multi-valued under a per-user directory. Each kind carries its own
//! ownership rule, consulted by [`crate::policy`].

use std::fmt;

/// Kinds of stored resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// A user's public key (`/{user}/pubkey`).
    PublicKey,
    /// A user's TOTP secret (`/{user}/key`).
    TotpKey,
    /// Arbitrary named files (`/{user}/files/{name}`).
    File,
}

/// Who may perform an access on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerRule {
    /// Any holder of a verified token.
    AnyVerified,
    /// Only the verified subject equal to the path's user.
    OwnerOnly,
}

impl ResourceKind {
    /// Whether there is exactly one blob of this kind per user.
    pub fn is_singleton(self) -> bool {
        !matches!(self, ResourceKind::File)
    }

    /// Rule for reading (or listing) this kind.
    pub fn read_rule(self) -> OwnerRule {
        match self {
            ResourceKind::TotpKey => OwnerRule::OwnerOnly,
            ResourceKind::PublicKey | ResourceKind::File => OwnerRule::AnyVerified,
        }
    }

    /// Rule for writing this kind.
    ///
    /// Anyone may create a new file; replacing an existing one, or touching a
    /// singleton key, is reserved to the owner.
    pub fn write_rule(self, overwrite: bool) -> OwnerRule {
        match self {
            ResourceKind::PublicKey | ResourceKind::TotpKey => OwnerRule::OwnerOnly,
            ResourceKind::File if overwrite => OwnerRule::OwnerOnly,
            ResourceKind::File => OwnerRule::AnyVerified,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::PublicKey => "pubkey",
            ResourceKind::TotpKey => "totp-key",
            ResourceKind::File => "file",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A path segment that cannot be used as a file or directory name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid path segment: {0:?}")]
pub struct InvalidSegment(pub String);

fn check_segment(raw: &str) -> Result<(), InvalidSegment> {
    let bad = raw.is_empty()
        || raw == "."
        || raw == ".."
        || raw.contains(['/', '\\', '\0']);
    if bad {
        Err(InvalidSegment(raw.to_string()))
    } else {
        Ok(())
    }
}

/// A user identifier taken from the request path.
///
/// It is only a label: compared against the token subject and used as a
/// directory or file name. It never implies that the caller *is* this user.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    pub fn parse(raw: &str) -> Result<Self, InvalidSegment> {
        check_segment(raw)?;
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of a file resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileName(String);

impl FileName {
    pub fn parse(raw: &str) -> Result<Self, InvalidSegment> {
        check_segment(raw)?;
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Fully resolved location of one blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourcePath {
    PublicKey(UserId),
    TotpKey(UserId),
    File(UserId, FileName),
}

impl ResourcePath {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourcePath::PublicKey(_) => ResourceKind::PublicKey,
            ResourcePath::TotpKey(_) => ResourceKind::TotpKey,
            ResourcePath::File(..) => ResourceKind::File,
        }
    }

    pub fn user(&self) -> &UserId {
        match self {
            ResourcePath::PublicKey(user)
            | ResourcePath::TotpKey(user)
            | ResourcePath::File(user, _) => user,
        }
    }
}

/// Unvalidated request target as it arrives from the router.
///
/// A `File` target without a filename addresses the user's file listing.
#[derive(Debug, Clone, Copy)]
pub struct Target<'a> {
    pub kind: ResourceKind,
    pub user: &'a str,
    pub filename: Option<&'a str>,
}

/// A validated target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    One(ResourcePath),
    Listing(UserId),
}

impl Resolved {
    pub fn user(&self) -> &UserId {
        match self {
            Resolved::One(path) => path.user(),
            Resolved::Listing(user) => user,
        }
    }
}

impl Target<'_> {
    pub fn resolve(&self) -> Result<Resolved, InvalidSegment> {
        let user = UserId::parse(self.user)?;
        Ok(match (self.kind, self.filename) {
            (ResourceKind::PublicKey, _) => Resolved::One(ResourcePath::PublicKey(user)),
            (ResourceKind::TotpKey, _) => Resolved::One(ResourcePath::TotpKey(user)),
            (ResourceKind::File, Some(name)) => {
                Resolved::One(ResourcePath::File(user, FileName::parse(name)?))
            }
            (ResourceKind::File, None) => Resolved::Listing(user),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singleton_kinds() {
        assert!(ResourceKind::PublicKey.is_singleton());
        assert!(ResourceKind::TotpKey.is_singleton());
        assert!(!ResourceKind::File.is_singleton());
    }

    #[test]
    fn owner_rules_per_kind() {
        assert_eq!(ResourceKind::PublicKey.read_rule(), OwnerRule::AnyVerified);
        assert_eq!(ResourceKind::File.read_rule(), OwnerRule::AnyVerified);
        assert_eq!(ResourceKind::TotpKey.read_rule(), OwnerRule::OwnerOnly);

        assert_eq!(ResourceKind::PublicKey.write_rule(false), OwnerRule::OwnerOnly);
        assert_eq!(ResourceKind::TotpKey.write_rule(false), OwnerRule::OwnerOnly);
        assert_eq!(ResourceKind::File.write_rule(true), OwnerRule::OwnerOnly);
        assert_eq!(ResourceKind::File.write_rule(false), OwnerRule::AnyVerified);
    }

    #[test]
    fn traversal_segments_are_rejected() {
        for raw in ["", ".", "..", "a/b", "..\\etc", "nul\0byte"] {
            assert!(UserId::parse(raw).is_err(), "{raw:?} should be rejected");
            assert!(FileName::parse(raw).is_err(), "{raw:?} should be rejected");
        }
        assert!(FileName::parse("report.csv").is_ok());
        assert!(UserId::parse("alice").is_ok());
    }

    #[test]
    fn file_target_without_name_is_a_listing() {
        let target = Target {
            kind: ResourceKind::File,
            user: "alice",
            filename: None,
        };
        assert_eq!(
            target.resolve().unwrap(),
            Resolved::Listing(UserId::parse("alice").unwrap())
        );
    }

    #[test]
    fn file_target_with_bad_name_fails() {
        let target = Target {
            kind: ResourceKind::File,
            user: "alice",
            filename: Some(".."),
        };
        assert_eq!(target.resolve().unwrap_err(), InvalidSegment("..".to_string()));
    }
}
