//! Signed session tokens.
//!
//! Tokens are compact HS256 JSON Web Tokens carrying the user id, username,
//! role and an expiry in seconds since the Unix epoch. Verification checks the
//! signature before anything inside the payload is trusted.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, TimeDelta, Utc};
use hmac::{Hmac, Mac};
use rand::RngCore;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::{Role, User};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "HS256";
const TOKEN_TYPE: &str = "JWT";
const GENERATED_SECRET_LEN: usize = 64;
const FINGERPRINT_LEN: usize = 8;

/// Default token lifetime.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Failures minting or verifying a token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// The token is not three base64url segments with a JSON header/payload.
    #[error("invalid token")]
    Malformed,
    /// The signature does not match the payload.
    #[error("invalid token")]
    BadSignature,
    /// The signature is valid but the expiry has passed.
    #[error("token expired")]
    Expired,
    /// Claims could not be encoded or the key was rejected.
    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Secret key material for token signatures.
///
/// The bytes are zeroised on drop and never printed.
#[derive(Clone)]
pub struct TokenSecret(Zeroizing<Vec<u8>>);

impl TokenSecret {
    /// Wrap existing key material.
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Random key material for development runs.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = vec![0_u8; GENERATED_SECRET_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self::new(bytes)
    }

    /// Length of the key in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the key is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Short non-reversible identifier for logs: the first eight bytes of the
    /// key's SHA-256, hex encoded.
    ///
    /// # Examples
    /// ```
    /// use recordkeeper::domain::TokenSecret;
    ///
    /// let fingerprint = TokenSecret::new(b"abc".to_vec()).fingerprint();
    /// assert_eq!(fingerprint, "ba7816bf8f01cfea");
    /// ```
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0.as_slice());
        hex::encode(&digest[..FINGERPRINT_LEN])
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.as_slice()
    }
}

impl fmt::Debug for TokenSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TokenSecret")
            .field(&self.fingerprint())
            .finish()
    }
}

/// Claims embedded in a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Identifier of the authenticated user.
    pub user_id: String,
    /// Username at the time of login.
    pub username: String,
    /// Role at the time of login.
    pub role: Role,
    /// Expiry in seconds since the Unix epoch.
    pub exp: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenHeader {
    alg: String,
    typ: Option<String>,
}

/// Mints and verifies session tokens with one secret and lifetime.
#[derive(Debug, Clone)]
pub struct TokenSigner {
    secret: TokenSecret,
    ttl: TimeDelta,
}

impl TokenSigner {
    /// Create a signer with the given secret and token lifetime.
    #[must_use]
    pub fn new(secret: TokenSecret, ttl: TimeDelta) -> Self {
        Self { secret, ttl }
    }

    /// Token lifetime.
    #[must_use]
    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    /// Mint a token for `user`, expiring one lifetime after `now`.
    pub fn mint(&self, user: &User, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = SessionClaims {
            user_id: user.id().to_string(),
            username: user.username().to_owned(),
            role: user.role(),
            exp: (now + self.ttl).timestamp(),
        };
        self.sign(&claims)
    }

    /// Encode and sign arbitrary claims.
    pub fn sign(&self, claims: &SessionClaims) -> Result<String, TokenError> {
        let header = TokenHeader {
            alg: ALGORITHM.to_owned(),
            typ: Some(TOKEN_TYPE.to_owned()),
        };
        let header = encode_segment(&header)?;
        let payload = encode_segment(claims)?;
        let signing_input = format!("{header}.{payload}");
        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        Ok(format!("{signing_input}.{signature}"))
    }

    /// Verify the signature and expiry, returning the embedded claims.
    ///
    /// A token is expired once `now` reaches its `exp`.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError> {
        let mut segments = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(TokenError::Malformed);
        };

        let parsed: TokenHeader = decode_segment(header)?;
        if parsed.alg != ALGORITHM {
            return Err(TokenError::Malformed);
        }
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::Malformed)?;

        let mut mac = self.mac()?;
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let claims: SessionClaims = decode_segment(payload)?;
        if now.timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|err| TokenError::Signing(err.to_string()))
    }
}

fn encode_segment<T: Serialize>(value: &T) -> Result<String, TokenError> {
    let json = serde_json::to_vec(value).map_err(|err| TokenError::Signing(err.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

fn decode_segment<T: DeserializeOwned>(segment: &str) -> Result<T, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| TokenError::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)
}
