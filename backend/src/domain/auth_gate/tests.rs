//! Tests for login, token authentication and the admin check.

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::FixtureDocumentStore;
use crate::test_support::{CLERK, MutableClock, document_with_clerk, fixed_now, test_signer};
use chrono::TimeDelta;
use rstest::{fixture, rstest};

struct Harness {
    gate: AuthGate,
    store: Arc<FixtureDocumentStore>,
    clock: Arc<MutableClock>,
}

#[fixture]
fn harness() -> Harness {
    let store = Arc::new(FixtureDocumentStore::new(document_with_clerk(fixed_now())));
    let clock = Arc::new(MutableClock::new(fixed_now()));
    let documents = Arc::new(DocumentCoordinator::new(store.clone()));
    let gate = AuthGate::new(documents, test_signer(), clock.clone());
    Harness { gate, store, clock }
}

fn credentials(username: &str, password: &str) -> LoginCredentials {
    LoginCredentials::try_from_parts(username, password).expect("credential shape")
}

#[rstest]
#[tokio::test]
async fn login_mints_token_and_stamps_last_login(harness: Harness) {
    let outcome = harness
        .gate
        .login(&credentials("admin", "admin123"))
        .await
        .expect("login succeeds");

    assert_eq!(outcome.identity.username(), "admin");
    assert_eq!(outcome.identity.role(), Role::Admin);
    let claims = harness
        .gate
        .signer()
        .verify(&outcome.token, fixed_now())
        .expect("token verifies");
    assert_eq!(claims.user_id, "admin");
    assert_eq!(claims.exp, (fixed_now() + TimeDelta::hours(24)).timestamp());

    let document = harness.store.snapshot();
    let admin = document
        .user_by_username("admin")
        .expect("admin exists");
    assert_eq!(admin.last_login(), Some(format_timestamp(fixed_now()).as_str()));
}

#[rstest]
#[case("admin", "wrong")]
#[case("ghost", "admin123")]
#[case("Admin", "admin123")]
#[tokio::test]
async fn login_rejects_bad_credentials_uniformly(
    harness: Harness,
    #[case] username: &str,
    #[case] password: &str,
) {
    let err = harness
        .gate
        .login(&credentials(username, password))
        .await
        .expect_err("login fails");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
    assert_eq!(err.message(), INVALID_CREDENTIALS_MESSAGE);
    assert_eq!(harness.store.persist_count(), 0);
}

#[rstest]
#[tokio::test]
async fn login_survives_last_login_persist_failure(harness: Harness) {
    harness.store.set_fail_persist(true);
    let outcome = harness
        .gate
        .login(&credentials("admin", "admin123"))
        .await
        .expect("login still succeeds");
    assert!(!outcome.token.is_empty());
}

#[rstest]
#[tokio::test]
async fn authenticate_accepts_bearer_and_bare_tokens(harness: Harness) {
    let outcome = harness
        .gate
        .login(&credentials(CLERK.0, CLERK.1))
        .await
        .expect("login");

    let with_prefix = format!("Bearer {}", outcome.token);
    let identity = harness
        .gate
        .authenticate(Some(&with_prefix))
        .await
        .expect("bearer token");
    assert_eq!(identity.username(), CLERK.0);
    assert_eq!(identity.role(), Role::User);

    let bare = harness
        .gate
        .authenticate(Some(&outcome.token))
        .await
        .expect("bare token");
    assert_eq!(bare, identity);

    let lowercase = format!("bearer  {}", outcome.token);
    let relaxed = harness
        .gate
        .authenticate(Some(&lowercase))
        .await
        .expect("lowercase scheme");
    assert_eq!(relaxed, identity);
}

#[rstest]
#[case(None, MISSING_TOKEN_MESSAGE)]
#[case(Some(""), MISSING_TOKEN_MESSAGE)]
#[case(Some("Bearer "), MISSING_TOKEN_MESSAGE)]
#[case(Some("Bearer"), MISSING_TOKEN_MESSAGE)]
#[case(Some("  bearer   "), MISSING_TOKEN_MESSAGE)]
#[case(Some("Bearer not-a-token"), INVALID_TOKEN_MESSAGE)]
#[tokio::test]
async fn authenticate_rejects_missing_or_garbled_tokens(
    harness: Harness,
    #[case] header: Option<&str>,
    #[case] expected: &str,
) {
    let err = harness
        .gate
        .authenticate(header)
        .await
        .expect_err("authentication fails");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
    assert_eq!(err.message(), expected);
}

#[rstest]
#[tokio::test]
async fn authenticate_rejects_expired_tokens(harness: Harness) {
    let outcome = harness
        .gate
        .login(&credentials("admin", "admin123"))
        .await
        .expect("login");
    harness.clock.advance(TimeDelta::hours(25));

    let err = harness
        .gate
        .authenticate(Some(&outcome.token))
        .await
        .expect_err("expired");
    assert_eq!(err.message(), EXPIRED_TOKEN_MESSAGE);
}

#[rstest]
#[tokio::test]
async fn authenticate_rejects_tokens_for_vanished_users(harness: Harness) {
    let ghost = User::new(
        UserId::new("ghost").expect("id"),
        "ghost",
        crate::domain::PasswordDigest::of("pw"),
        Role::Admin,
        "2024-01-01T00:00:00+00:00",
    )
    .expect("user");
    let token = harness
        .gate
        .signer()
        .mint(&ghost, fixed_now())
        .expect("mint");

    let err = harness
        .gate
        .authenticate(Some(&token))
        .await
        .expect_err("unknown user");
    assert_eq!(err.message(), UNKNOWN_USER_MESSAGE);
}

#[rstest]
#[tokio::test]
async fn identity_role_comes_from_stored_user(harness: Harness) {
    let clerk = harness
        .store
        .snapshot()
        .user_by_username(CLERK.0)
        .cloned()
        .expect("clerk exists");
    let claims = crate::domain::SessionClaims {
        user_id: clerk.id().to_string(),
        username: clerk.username().to_owned(),
        role: Role::Admin,
        exp: (fixed_now() + TimeDelta::hours(1)).timestamp(),
    };
    let token = harness.gate.signer().sign(&claims).expect("sign");

    let identity = harness
        .gate
        .authenticate(Some(&token))
        .await
        .expect("valid token");
    assert_eq!(identity.role(), Role::User);
    let err = AuthGate::require_admin(&identity).expect_err("not admin");
    assert_eq!(err.code(), ErrorCode::Forbidden);
    assert_eq!(err.message(), FORBIDDEN_MESSAGE);
}
