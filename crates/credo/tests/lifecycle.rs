// End-to-end lifecycle tests over the in-memory store.

use std::sync::Arc;

use chrono::{Duration, Utc};

use credo::ops::register::RegisterRequest;
use credo::ops::reset::ResetPasswordRequest;
use credo::ops;
use credo::{token, AuthContext, AuthError, AuthOptions};
use credo_core::model::{SecretChange, StoredOtp, UserPatch};
use credo_core::{ExternalIdentity, Role, UserStore};
use credo_memory::{CaptureNotifier, MemoryStore, StaticIdentityVerifier};

const SECRET: &str = "integration-test-secret";

struct Harness {
    ctx: Arc<AuthContext>,
    store: MemoryStore,
    notifier: CaptureNotifier,
}

fn harness() -> Harness {
    let store = MemoryStore::new();
    let notifier = CaptureNotifier::new();
    let ctx = AuthContext::new(
        Arc::new(store.clone()),
        Arc::new(notifier.clone()),
        AuthOptions::new(SECRET),
    );
    Harness {
        ctx: Arc::new(ctx),
        store,
        notifier,
    }
}

fn harness_with_identity(verifier: StaticIdentityVerifier) -> Harness {
    let store = MemoryStore::new();
    let notifier = CaptureNotifier::new();
    let ctx = AuthContext::new(
        Arc::new(store.clone()),
        Arc::new(notifier.clone()),
        AuthOptions::new(SECRET),
    )
    .with_identity_verifier(Arc::new(verifier));
    Harness {
        ctx: Arc::new(ctx),
        store,
        notifier,
    }
}

fn alice() -> RegisterRequest {
    RegisterRequest {
        username: "alice".into(),
        email: "alice@example.com".into(),
        password: "correct horse battery".into(),
    }
}

async fn register_and_verify(h: &Harness) -> credo_core::UserRecord {
    let user = ops::register(&h.ctx, alice()).await.unwrap();
    let code = h.notifier.last_code().await.unwrap();
    ops::verify_email(&h.ctx, "alice@example.com", &code)
        .await
        .unwrap();
    user
}

#[tokio::test]
async fn register_creates_pending_account() {
    let h = harness();
    let user = ops::register(&h.ctx, alice()).await.unwrap();

    assert!(!user.email_verified);
    assert_eq!(user.role, Role::User);
    assert_eq!(user.email, "alice@example.com");
    assert!(user.password_hash.is_none()); // stripped from the return

    // The code went out exactly once and was sealed at rest.
    let sent = h.notifier.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "alice@example.com");
    let code = h.notifier.last_code().await.unwrap();
    let raw = h.store.raw(&user.id).await.unwrap();
    let pair = raw.email_otp.unwrap();
    assert!(!pair.sealed.contains(&code));

    // Unverified accounts cannot sign in.
    let err = ops::login(&h.ctx, "alice@example.com", "correct horse battery")
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::EmailNotVerified);
}

#[tokio::test]
async fn register_normalizes_and_validates_input() {
    let h = harness();
    let user = ops::register(
        &h.ctx,
        RegisterRequest {
            username: "  alice  ".into(),
            email: " Alice@Example.COM ".into(),
            password: "long enough".into(),
        },
    )
    .await
    .unwrap();
    assert_eq!(user.email, "alice@example.com");
    assert_eq!(user.username, "alice");

    let short_pw = ops::register(
        &h.ctx,
        RegisterRequest {
            username: "bob".into(),
            email: "bob@example.com".into(),
            password: "short".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(short_pw, AuthError::Validation(_)));

    let dup = ops::register(&h.ctx, alice()).await.unwrap_err();
    assert_eq!(dup, AuthError::DuplicateEmail);
}

#[tokio::test]
async fn verify_then_login_round_trip() {
    let h = harness();
    let user = register_and_verify(&h).await;

    // Pair cleared, so a second confirmation has nothing to match.
    let again = ops::verify_email(&h.ctx, "alice@example.com", "000000")
        .await
        .unwrap_err();
    assert_eq!(again, AuthError::ExpiredOrMissingOtp);

    let signin = ops::login(&h.ctx, "alice@example.com", "correct horse battery")
        .await
        .unwrap();
    let claims = token::verify_session(SECRET, &signin.token).unwrap();
    assert_eq!(claims.sub, user.id);
    assert_eq!(claims.exp - claims.iat, 3600);
}

#[tokio::test]
async fn wrong_code_keeps_the_pair_for_retry() {
    let h = harness();
    ops::register(&h.ctx, alice()).await.unwrap();
    let code = h.notifier.last_code().await.unwrap();
    let wrong = if code == "111111" { "222222" } else { "111111" };

    let err = ops::verify_email(&h.ctx, "alice@example.com", wrong)
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::InvalidOtp);

    // Same code still works afterwards.
    let user = ops::verify_email(&h.ctx, "alice@example.com", &code)
        .await
        .unwrap();
    assert!(user.email_verified);
}

#[tokio::test]
async fn expired_code_is_rejected_lazily() {
    let h = harness();
    let user = ops::register(&h.ctx, alice()).await.unwrap();

    // Install a pair sealed over a known code with an expiry just past.
    let sealed = credo::otp::seal(SECRET, "654321").unwrap();
    h.store
        .update(
            &user.id,
            UserPatch {
                email_otp: Some(SecretChange::Set(StoredOtp {
                    sealed: sealed.clone(),
                    expires_at: Utc::now() - Duration::milliseconds(1),
                })),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let err = ops::verify_email(&h.ctx, "alice@example.com", "654321")
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::ExpiredOrMissingOtp);

    // Same code, expiry still ahead of the clock: accepted.
    h.store
        .update(
            &user.id,
            UserPatch {
                email_otp: Some(SecretChange::Set(StoredOtp {
                    sealed,
                    expires_at: Utc::now() + Duration::seconds(30),
                })),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let verified = ops::verify_email(&h.ctx, "alice@example.com", "654321")
        .await
        .unwrap();
    assert!(verified.email_verified);
}

#[tokio::test]
async fn resend_invalidates_the_previous_code() {
    let h = harness();
    ops::register(&h.ctx, alice()).await.unwrap();
    let code_a = h.notifier.last_code().await.unwrap();

    // Resend until the fresh code differs, so the stale-code assertion
    // always runs (a collision is a 1-in-10^6 repeat at most).
    let code_b = loop {
        ops::resend_verification(&h.ctx, "alice@example.com")
            .await
            .unwrap();
        let code = h.notifier.last_code().await.unwrap();
        if code != code_a {
            break code;
        }
    };

    let err = ops::verify_email(&h.ctx, "alice@example.com", &code_a)
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::InvalidOtp);

    let user = ops::verify_email(&h.ctx, "alice@example.com", &code_b)
        .await
        .unwrap();
    assert!(user.email_verified);
}

#[tokio::test]
async fn login_misses_collapse_to_one_error() {
    let h = harness();
    register_and_verify(&h).await;

    let unknown = ops::login(&h.ctx, "nobody@example.com", "whatever pw")
        .await
        .unwrap_err();
    let wrong_pw = ops::login(&h.ctx, "alice@example.com", "not the password")
        .await
        .unwrap_err();
    assert_eq!(unknown, AuthError::InvalidCredentials);
    assert_eq!(wrong_pw, AuthError::InvalidCredentials);
    assert_eq!(unknown.to_string(), wrong_pw.to_string());
}

#[tokio::test]
async fn soft_delete_blocks_login_until_restore() {
    let h = harness();
    let user = register_and_verify(&h).await;

    ops::soft_delete(&h.ctx, &user.id).await.unwrap();
    let err = ops::login(&h.ctx, "alice@example.com", "correct horse battery")
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::InvalidCredentials);

    ops::restore(&h.ctx, &user.id).await.unwrap();
    assert!(
        ops::login(&h.ctx, "alice@example.com", "correct horse battery")
            .await
            .is_ok()
    );

    // Restoring a live record is an input error.
    let err = ops::restore(&h.ctx, &user.id).await.unwrap_err();
    assert!(matches!(err, AuthError::Validation(_)));
}

#[tokio::test]
async fn restore_refuses_when_the_email_was_reclaimed() {
    let h = harness();
    let first = register_and_verify(&h).await;
    ops::soft_delete(&h.ctx, &first.id).await.unwrap();

    // The email is free again while the record sits deleted.
    let second = ops::register(&h.ctx, alice()).await.unwrap();

    // Restoring now would put two live records behind one email.
    let err = ops::restore(&h.ctx, &first.id).await.unwrap_err();
    assert_eq!(err, AuthError::DuplicateEmail);
    assert!(h.store.raw(&first.id).await.unwrap().is_deleted);

    // Once the claimant is gone the restore goes through.
    ops::soft_delete(&h.ctx, &second.id).await.unwrap();
    let restored = ops::restore(&h.ctx, &first.id).await.unwrap();
    assert!(!restored.is_deleted);
}

#[tokio::test]
async fn password_reset_round_trip() {
    let h = harness();
    register_and_verify(&h).await;

    let unknown = ops::request_password_reset(&h.ctx, "nobody@example.com")
        .await
        .unwrap_err();
    assert_eq!(unknown, AuthError::NotFound);

    ops::request_password_reset(&h.ctx, "alice@example.com")
        .await
        .unwrap();
    let code = h.notifier.last_code().await.unwrap();
    let wrong = if code == "111111" { "222222" } else { "111111" };

    let err = ops::reset_password(
        &h.ctx,
        ResetPasswordRequest {
            email: "alice@example.com".into(),
            code: wrong.into(),
            new_password: "a fresh password".into(),
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err, AuthError::InvalidOtp);

    ops::reset_password(
        &h.ctx,
        ResetPasswordRequest {
            email: "alice@example.com".into(),
            code: code.clone(),
            new_password: "a fresh password".into(),
        },
    )
    .await
    .unwrap();

    // Old password is dead, new one works, and the code is single-use.
    let old = ops::login(&h.ctx, "alice@example.com", "correct horse battery")
        .await
        .unwrap_err();
    assert_eq!(old, AuthError::InvalidCredentials);
    assert!(
        ops::login(&h.ctx, "alice@example.com", "a fresh password")
            .await
            .is_ok()
    );
    let reuse = ops::reset_password(
        &h.ctx,
        ResetPasswordRequest {
            email: "alice@example.com".into(),
            code,
            new_password: "yet another password".into(),
        },
    )
    .await
    .unwrap_err();
    assert_eq!(reuse, AuthError::ExpiredOrMissingOtp);
}

#[tokio::test]
async fn notification_failure_does_not_roll_back() {
    let h = harness();
    h.notifier.set_failing(true).await;

    let user = ops::register(&h.ctx, alice()).await.unwrap();
    // Account and sealed pair persisted despite the failed send.
    let raw = h.store.raw(&user.id).await.unwrap();
    assert!(raw.email_otp.is_some());
    assert!(h.notifier.sent().await.is_empty());

    // A later resend recovers.
    h.notifier.set_failing(false).await;
    ops::resend_verification(&h.ctx, "alice@example.com")
        .await
        .unwrap();
    assert!(h.notifier.last_code().await.is_some());
}

fn ada_identity() -> ExternalIdentity {
    ExternalIdentity {
        external_id: "prov-sub-1".into(),
        email: "ada@example.com".into(),
        email_verified: true,
        display_name: Some("Ada Lovelace".into()),
        avatar_url: Some("https://img.example.com/ada.png".into()),
    }
}

#[tokio::test]
async fn federated_sign_in_requires_the_capability() {
    let h = harness();
    let err = ops::federated_sign_in(&h.ctx, "any-token").await.unwrap_err();
    assert!(matches!(err, AuthError::Validation(_)));
}

#[tokio::test]
async fn federated_sign_in_creates_and_reuses_accounts() {
    let verifier = StaticIdentityVerifier::new().accept("good-token", ada_identity());
    let h = harness_with_identity(verifier);

    let bad = ops::federated_sign_in(&h.ctx, "bad-token").await.unwrap_err();
    assert_eq!(bad, AuthError::InvalidExternalToken);

    let first = ops::federated_sign_in(&h.ctx, "good-token").await.unwrap();
    assert!(first.user.email_verified);
    assert!(first.user.username.starts_with("adalovelace"));
    assert_eq!(first.user.external_id.as_deref(), Some("prov-sub-1"));
    let claims = token::verify_session(SECRET, &first.token).unwrap();
    assert_eq!(claims.sub, first.user.id);

    // No password was set, so the local path stays closed.
    let err = ops::login(&h.ctx, "ada@example.com", "anything at all")
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::InvalidCredentials);

    // Second sign-in reuses the record.
    let second = ops::federated_sign_in(&h.ctx, "good-token").await.unwrap();
    assert_eq!(second.user.id, first.user.id);
    assert_eq!(h.store.count().await, 1);
}

#[tokio::test]
async fn federated_sign_in_links_an_existing_local_account() {
    let verifier = StaticIdentityVerifier::new().accept(
        "good-token",
        ExternalIdentity {
            email: "alice@example.com".into(),
            ..ada_identity()
        },
    );
    let h = harness_with_identity(verifier);
    let local = register_and_verify(&h).await;

    let signin = ops::federated_sign_in(&h.ctx, "good-token").await.unwrap();
    assert_eq!(signin.user.id, local.id);
    assert_eq!(signin.user.external_id.as_deref(), Some("prov-sub-1"));
    // Profile freshened, local credentials untouched.
    assert_eq!(signin.user.display_name.as_deref(), Some("Ada Lovelace"));
    assert!(
        ops::login(&h.ctx, "alice@example.com", "correct horse battery")
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn federated_sign_in_rejects_deleted_accounts() {
    let verifier = StaticIdentityVerifier::new().accept(
        "good-token",
        ExternalIdentity {
            email: "alice@example.com".into(),
            ..ada_identity()
        },
    );
    let h = harness_with_identity(verifier);
    let local = register_and_verify(&h).await;
    ops::soft_delete(&h.ctx, &local.id).await.unwrap();

    let err = ops::federated_sign_in(&h.ctx, "good-token").await.unwrap_err();
    assert_eq!(err, AuthError::InvalidCredentials);
}

#[tokio::test]
async fn admin_role_changes_use_the_closed_set() {
    let h = harness();
    let user = register_and_verify(&h).await;

    let updated = ops::change_role(&h.ctx, &user.id, "moderator").await.unwrap();
    assert_eq!(updated.role, Role::Moderator);

    let err = ops::change_role(&h.ctx, &user.id, "superuser")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Validation(_)));

    let missing = ops::soft_delete(&h.ctx, "no-such-id").await.unwrap_err();
    assert_eq!(missing, AuthError::NotFound);
}
