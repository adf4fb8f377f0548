//! Login, bearer-token authentication and the admin role check.
//!
//! Tokens are verified against the signer first; the embedded user id must
//! then still resolve to a stored user, and the identity carries that user's
//! current role rather than the role recorded in the token.

use std::sync::Arc;

use mockable::Clock;
use tracing::{info, warn};

use super::coordinator::DocumentCoordinator;
use super::{
    Error, LoginCredentials, Role, TokenError, TokenSigner, User, UserId, format_timestamp,
};

const BEARER_SCHEME: &str = "Bearer";

/// Message for a missing or blank authorization header.
pub const MISSING_TOKEN_MESSAGE: &str = "missing token";
/// Message for an expired token.
pub const EXPIRED_TOKEN_MESSAGE: &str = "token expired";
/// Message for a token that fails to parse or verify.
pub const INVALID_TOKEN_MESSAGE: &str = "invalid token";
/// Message for a valid token whose user no longer exists.
pub const UNKNOWN_USER_MESSAGE: &str = "user not found";
/// Message for wrong credentials. Unknown users and wrong passwords share it.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "invalid credentials";
/// Message for a non-admin calling an admin operation.
pub const FORBIDDEN_MESSAGE: &str = "insufficient permissions";

/// The authenticated caller as resolved from the current document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    user_id: UserId,
    username: String,
    role: Role,
}

impl Identity {
    /// Identifier of the caller; stamped into `createdBy`/`updatedBy`.
    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Username of the caller.
    #[must_use]
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Current role of the caller.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id().clone(),
            username: user.username().to_owned(),
            role: user.role(),
        }
    }
}

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    /// Signed bearer token.
    pub token: String,
    /// The user that logged in.
    pub identity: Identity,
}

/// Authentication boundary shared by every protected operation.
#[derive(Clone)]
pub struct AuthGate {
    documents: Arc<DocumentCoordinator>,
    signer: TokenSigner,
    clock: Arc<dyn Clock>,
}

impl AuthGate {
    /// Create a gate reading users through `documents`.
    #[must_use]
    pub fn new(
        documents: Arc<DocumentCoordinator>,
        signer: TokenSigner,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            documents,
            signer,
            clock,
        }
    }

    /// Check credentials, stamp `lastLogin` and mint a token.
    ///
    /// Failing to persist the `lastLogin` stamp is logged and does not fail
    /// the login.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<LoginOutcome, Error> {
        let user = self
            .documents
            .read(|document| {
                document
                    .user_by_username(credentials.username())
                    .filter(|user| user.password_digest().matches(credentials.password()))
                    .cloned()
            })
            .await
            .ok_or_else(|| Error::unauthorized(INVALID_CREDENTIALS_MESSAGE))?;

        let now = self.clock.utc();
        let token = self.signer.mint(&user, now).map_err(|err| {
            warn!(error = %err, "token signing failed");
            Error::internal("failed to issue token")
        })?;

        let user_id = user.id().clone();
        let stamp = format_timestamp(now);
        let recorded = self
            .documents
            .mutate(|document| {
                if let Some(stored) = document.user_mut(&user_id) {
                    stored.record_login(stamp);
                }
                Ok(())
            })
            .await;
        if let Err(err) = recorded {
            warn!(user_id = %user_id, error = %err, "failed to record last login");
        }

        info!(user_id = %user_id, "user logged in");
        Ok(LoginOutcome {
            token,
            identity: Identity::from(&user),
        })
    }

    /// Resolve the caller from an `Authorization` header value.
    ///
    /// The value may carry a `Bearer ` prefix or be the bare token.
    pub async fn authenticate(&self, authorization: Option<&str>) -> Result<Identity, Error> {
        let token = authorization
            .map(bearer_token)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| Error::unauthorized(MISSING_TOKEN_MESSAGE))?;

        let claims = self
            .signer
            .verify(token, self.clock.utc())
            .map_err(|err| match err {
                TokenError::Expired => Error::unauthorized(EXPIRED_TOKEN_MESSAGE),
                TokenError::Malformed | TokenError::BadSignature | TokenError::Signing(_) => {
                    Error::unauthorized(INVALID_TOKEN_MESSAGE)
                }
            })?;
        let user_id = UserId::new(claims.user_id)
            .map_err(|_| Error::unauthorized(INVALID_TOKEN_MESSAGE))?;

        self.documents
            .read(|document| document.user(&user_id).map(Identity::from))
            .await
            .ok_or_else(|| Error::unauthorized(UNKNOWN_USER_MESSAGE))
    }

    /// Succeeds only for administrators.
    pub fn require_admin(identity: &Identity) -> Result<(), Error> {
        match identity.role() {
            Role::Admin => Ok(()),
            Role::User => Err(Error::forbidden(FORBIDDEN_MESSAGE)),
        }
    }

    /// Signer used for tokens; exposed for wiring and tests.
    #[must_use]
    pub fn signer(&self) -> &TokenSigner {
        &self.signer
    }
}

/// Strip an optional `Bearer` scheme (any case) from a header value.
fn bearer_token(header: &str) -> &str {
    let value = header.trim();
    match value.split_once(char::is_whitespace) {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case(BEARER_SCHEME) => rest.trim(),
        None if value.eq_ignore_ascii_case(BEARER_SCHEME) => "",
        _ => value,
    }
}

#[cfg(test)]
mod tests;
