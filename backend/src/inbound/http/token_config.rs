//! Token secret resolution and validation.
//!
//! Centralises the rules for where the signing secret comes from so they are
//! applied consistently at startup and can be tested in isolation.

use std::io;
use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use tracing::warn;
use zeroize::Zeroize;

use crate::domain::TokenSecret;

/// Minimum secret length accepted by release builds.
pub const TOKEN_SECRET_MIN_LEN: usize = 32;

/// Build mode for secret validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate short or missing secrets with warnings.
    Debug,
    /// Release builds require a readable secret of sufficient length.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use recordkeeper::inbound::http::token_config::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// if cfg!(debug_assertions) {
    ///     assert_eq!(mode, BuildMode::Debug);
    /// } else {
    ///     assert_eq!(mode, BuildMode::Release);
    /// }
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Errors raised while resolving the token secret.
#[derive(thiserror::Error, Debug)]
pub enum TokenSecretError {
    /// No secret file was configured and ephemeral secrets are not allowed.
    #[error("no token secret file configured and ephemeral secrets are disabled")]
    NotConfigured,
    /// Reading the secret file failed.
    #[error("failed to read token secret at {path}: {source}")]
    Read {
        /// Configured secret file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The secret is shorter than release builds accept.
    #[error("token secret at {path} too short: need >= {min_len} bytes, got {length}")]
    TooShort {
        /// Configured secret file.
        path: PathBuf,
        /// Bytes found in the file.
        length: usize,
        /// Minimum accepted length.
        min_len: usize,
    },
}

/// Resolve the signing secret.
///
/// A configured, readable file wins. Otherwise debug builds, or any build with
/// `allow_ephemeral` set, fall back to a random per-process secret; tokens
/// minted with it do not survive a restart.
///
/// # Examples
///
/// ```rust
/// use recordkeeper::inbound::http::token_config::{BuildMode, resolve_token_secret};
///
/// let secret = resolve_token_secret(None, true, BuildMode::Release).expect("ephemeral");
/// assert!(!secret.is_empty());
/// ```
pub fn resolve_token_secret(
    path: Option<&Path>,
    allow_ephemeral: bool,
    mode: BuildMode,
) -> Result<TokenSecret, TokenSecretError> {
    let fallback_allowed = mode.is_debug() || allow_ephemeral;
    let Some(path) = path else {
        if fallback_allowed {
            warn!("no token secret file configured; using ephemeral secret (dev only)");
            return Ok(TokenSecret::generate());
        }
        return Err(TokenSecretError::NotConfigured);
    };

    match read_secret(path) {
        Ok(mut bytes) => {
            let length = bytes.len();
            if length < TOKEN_SECRET_MIN_LEN {
                if mode.is_debug() && length > 0 {
                    warn!(
                        path = %path.display(),
                        length,
                        "token secret shorter than recommended"
                    );
                } else {
                    bytes.zeroize();
                    return Err(TokenSecretError::TooShort {
                        path: path.to_path_buf(),
                        length,
                        min_len: TOKEN_SECRET_MIN_LEN,
                    });
                }
            }
            Ok(TokenSecret::new(bytes))
        }
        Err(error) if fallback_allowed => {
            warn!(
                path = %path.display(),
                error = %error,
                "using ephemeral token secret (dev only)"
            );
            Ok(TokenSecret::generate())
        }
        Err(error) => Err(TokenSecretError::Read {
            path: path.to_path_buf(),
            source: error,
        }),
    }
}

fn read_secret(path: &Path) -> io::Result<Vec<u8>> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority())?;
    let mut bytes = dir.read(name)?;
    // Trailing newlines from `echo secret > file` are not key material.
    while bytes.last().is_some_and(|byte| *byte == b'\n' || *byte == b'\r') {
        bytes.pop();
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::cap_fs::write_file;
    use crate::test_support::temp_data_dir;
    use rstest::rstest;

    #[rstest]
    #[case(BuildMode::Debug, false, true)]
    #[case(BuildMode::Release, true, true)]
    #[case(BuildMode::Release, false, false)]
    fn missing_configuration_falls_back_only_when_allowed(
        #[case] mode: BuildMode,
        #[case] allow_ephemeral: bool,
        #[case] expect_ok: bool,
    ) {
        let result = resolve_token_secret(None, allow_ephemeral, mode);
        assert_eq!(result.is_ok(), expect_ok);
    }

    #[rstest]
    fn release_reads_long_enough_secret() {
        let dir = temp_data_dir();
        let path = dir.path().join("token_secret");
        write_file(&path, vec![b'k'; TOKEN_SECRET_MIN_LEN]).expect("write secret");

        let secret = resolve_token_secret(Some(&path), false, BuildMode::Release)
            .expect("secret loads");
        assert_eq!(secret.len(), TOKEN_SECRET_MIN_LEN);
        assert_eq!(
            secret.fingerprint(),
            TokenSecret::new(vec![b'k'; TOKEN_SECRET_MIN_LEN]).fingerprint()
        );
    }

    #[rstest]
    fn trailing_newline_is_stripped() {
        let dir = temp_data_dir();
        let path = dir.path().join("token_secret");
        let mut contents = vec![b'k'; TOKEN_SECRET_MIN_LEN];
        contents.push(b'\n');
        write_file(&path, contents).expect("write secret");

        let secret = resolve_token_secret(Some(&path), false, BuildMode::Release)
            .expect("secret loads");
        assert_eq!(secret.len(), TOKEN_SECRET_MIN_LEN);
    }

    #[rstest]
    #[case(BuildMode::Release, false)]
    #[case(BuildMode::Debug, true)]
    fn short_secrets_fail_in_release(#[case] mode: BuildMode, #[case] expect_ok: bool) {
        let dir = temp_data_dir();
        let path = dir.path().join("token_secret");
        write_file(&path, b"short").expect("write secret");

        let result = resolve_token_secret(Some(&path), false, mode);
        match (expect_ok, result) {
            (true, Ok(secret)) => assert_eq!(secret.len(), 5),
            (false, Err(TokenSecretError::TooShort { length, .. })) => assert_eq!(length, 5),
            (_, other) => panic!("unexpected result: {other:?}"),
        }
    }

    #[rstest]
    fn unreadable_file_fails_release_without_ephemeral() {
        let dir = temp_data_dir();
        let path = dir.path().join("absent");
        let err = resolve_token_secret(Some(&path), false, BuildMode::Release)
            .expect_err("read fails");
        assert!(matches!(err, TokenSecretError::Read { .. }));

        let secret = resolve_token_secret(Some(&path), true, BuildMode::Release)
            .expect("ephemeral fallback");
        assert!(!secret.is_empty());
    }
}
