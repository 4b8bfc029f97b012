// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Payload integrity.
//!
//! An upload token carries `filehash`, the hex SHA-256 of the exact bytes
//! it authorizes.

use sha2::{Digest, Sha256};

/// Length in bytes of a payload digest.
pub const DIGEST_LEN: usize = 32;

/// SHA-256 of `payload`.
pub fn digest(payload: &[u8]) -> [u8; DIGEST_LEN] {
    Sha256::digest(payload).into()
}

/// Lowercase hex SHA-256 of `payload`.
pub fn digest_hex(payload: &[u8]) -> String {
    hex::encode(digest(payload))
}

/// Whether `expected_hex` is the digest of `payload`.
///
/// Hex case and surrounding whitespace are ignored. Anything other than 64
/// hex digits never matches.
pub fn matches(expected_hex: &str, payload: &[u8]) -> bool {
    let mut expected = [0u8; DIGEST_LEN];
    if hex::decode_to_slice(expected_hex.trim(), &mut expected).is_err() {
        return false;
    }
    expected == digest(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &[u8] = b"a,b,c\n1,2,3\n";

    #[test]
    fn digest_of_empty_payload() {
        assert_eq!(
            digest_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn payload_matches_its_own_digest() {
        assert!(matches(&digest_hex(REPORT), REPORT));
    }

    #[test]
    fn different_payload_does_not_match() {
        assert!(!matches(&digest_hex(REPORT), b"a,b,c\n1,2,4\n"));
        assert!(!matches(&digest_hex(REPORT), b""));
    }

    #[test]
    fn hex_case_and_whitespace_are_normalized() {
        let upper = digest_hex(REPORT).to_uppercase();
        assert!(matches(&upper, REPORT));
        assert!(matches(&format!(" {}\n", digest_hex(REPORT)), REPORT));
    }

    #[test]
    fn malformed_digests_never_match() {
        let full = digest_hex(REPORT);
        assert!(!matches("", REPORT));
        assert!(!matches(&full[..62], REPORT));
        assert!(!matches(&format!("{full}00"), REPORT));
        assert!(!matches(&full.replace(|c: char| c.is_ascii_digit(), "g"), REPORT));
    }
}
