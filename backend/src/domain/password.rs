//! Password digests.
//!
//! Stored accounts carry the lowercase hex SHA-256 of the password. The
//! format is unsalted so existing data files keep authenticating.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 digest of a password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Digest a raw password.
    ///
    /// # Examples
    /// ```
    /// use recordkeeper::domain::PasswordDigest;
    ///
    /// let digest = PasswordDigest::of("admin123");
    /// assert!(digest.matches("admin123"));
    /// assert!(!digest.matches("admin124"));
    /// ```
    #[must_use]
    pub fn of(password: &str) -> Self {
        Self(hex::encode(Sha256::digest(password.as_bytes())))
    }

    /// Whether `password` hashes to this digest.
    #[must_use]
    pub fn matches(&self, password: &str) -> bool {
        let candidate = Self::of(password);
        self.0.eq_ignore_ascii_case(&candidate.0)
    }
}

impl AsRef<str> for PasswordDigest {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(
        "admin123",
        "240be518fabd2724ddb6f04eeb1da5967448d7e831c08c8fa822809f74c720a9"
    )]
    #[case(
        "",
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    )]
    fn digests_are_lowercase_hex_sha256(#[case] password: &str, #[case] expected: &str) {
        assert_eq!(PasswordDigest::of(password).as_ref(), expected);
    }

    #[rstest]
    fn matching_tolerates_uppercase_stored_digests() {
        let stored: PasswordDigest = serde_json::from_str(
            "\"240BE518FABD2724DDB6F04EEB1DA5967448D7E831C08C8FA822809F74C720A9\"",
        )
        .expect("digest");
        assert!(stored.matches("admin123"));
    }
}
