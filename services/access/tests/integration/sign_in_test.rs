use std::sync::atomic::Ordering;

use rahala_access::domain::types::{ProviderErrorCode, RetryPolicy};
use rahala_access::error::AccessServiceError;
use rahala_access::usecase::generation::GenerationToken;
use rahala_access::usecase::sign_in::{SignInInput, SignInUseCase, SignOutReason};
use rahala_domain::permission;
use rahala_domain::role::Role;
use rahala_testing::profile::ProfileFixture;

use crate::helpers::{
    ADMIN_EMAIL, ADMIN_SECRET, ADMIN_UID, MockIdentityProvider, MockProfileRepo, test_admin,
};

fn input(identifier: &str, secret: &str) -> SignInInput {
    SignInInput {
        identifier: identifier.to_owned(),
        secret: secret.to_owned(),
    }
}

async fn sign_in(
    provider: &MockIdentityProvider,
    profiles: &MockProfileRepo,
    identifier: &str,
    secret: &str,
) -> Result<rahala_domain::profile::Identity, AccessServiceError> {
    let admin = test_admin();
    let reason = SignOutReason::default();
    SignInUseCase {
        provider,
        profiles,
        admin: &admin,
        provisioning: RetryPolicy::provision_confirm(),
        reason: &reason,
    }
    .execute(input(identifier, secret), &GenerationToken::detached())
    .await
}

// ── Input validation ─────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_empty_identifier_before_any_call() {
    let provider = MockIdentityProvider::empty();
    let profiles = MockProfileRepo::empty();

    let result = sign_in(&provider, &profiles, "   ", "secret").await;

    assert!(matches!(result, Err(AccessServiceError::EmptyIdentifier)));
    assert_eq!(provider.sign_ins.load(Ordering::SeqCst), 0);
    assert_eq!(profiles.reads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn should_reject_empty_secret() {
    let provider = MockIdentityProvider::empty();
    let profiles = MockProfileRepo::empty();

    let result = sign_in(&provider, &profiles, "someone@example.com", "").await;

    assert!(matches!(result, Err(AccessServiceError::EmptySecret)));
    assert_eq!(provider.sign_ins.load(Ordering::SeqCst), 0);
}

// ── Administrator aliases ────────────────────────────────────────────────────

#[tokio::test]
async fn should_resolve_every_alias_to_the_administrator() {
    let provider = MockIdentityProvider::empty();
    let profiles = MockProfileRepo::new(vec![
        ProfileFixture::admin(ADMIN_UID).email(ADMIN_EMAIL).build(),
    ]);

    for alias in ["admin", "1000", "1001", ADMIN_EMAIL] {
        let identity = sign_in(&provider, &profiles, alias, ADMIN_SECRET)
            .await
            .unwrap_or_else(|e| panic!("alias {alias} failed: {e}"));
        assert_eq!(identity.role(), &Role::Admin, "alias {alias}");
        assert!(identity.is_admin);
    }
    assert_eq!(provider.sign_ins.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn should_reject_alias_with_wrong_secret() {
    let provider = MockIdentityProvider::empty();
    let profiles = MockProfileRepo::empty();

    let result = sign_in(&provider, &profiles, "1000", "guess").await;

    assert!(matches!(
        result,
        Err(AccessServiceError::InvalidAdminCredential)
    ));
    assert_eq!(provider.sign_ins.load(Ordering::SeqCst), 0);
    assert_eq!(profiles.reads.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn should_provision_administrator_on_first_alias_sign_in() {
    let provider = MockIdentityProvider::empty();
    let profiles = MockProfileRepo::empty().visibility_lag(3);
    let stored = profiles.profiles_handle();

    let identity = sign_in(&provider, &profiles, "1000", ADMIN_SECRET)
        .await
        .unwrap();

    assert!(identity.is_admin);
    assert_eq!(identity.profile.id, ADMIN_UID);
    let stored = stored.lock().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].role, Role::Admin);
    assert!(stored[0].permissions.contains("all"));
    assert!(stored[0].active);
}

#[tokio::test(start_paused = true)]
async fn should_fail_when_provisioned_profile_never_becomes_visible() {
    let provider = MockIdentityProvider::empty();
    let profiles = MockProfileRepo::empty().visibility_lag(u32::MAX);

    let result = sign_in(&provider, &profiles, "admin", ADMIN_SECRET).await;

    assert!(matches!(
        result,
        Err(AccessServiceError::ProvisioningUnconfirmed)
    ));
}

// ── Provider sign-in ─────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_disabled_account_and_revoke_provider_session() {
    let provider = MockIdentityProvider::with_account("someone@example.com", "pw", "u-1");
    let profiles = MockProfileRepo::new(vec![
        ProfileFixture::new("u-1")
            .email("someone@example.com")
            .inactive()
            .build(),
    ]);

    let result = sign_in(&provider, &profiles, "someone@example.com", "pw").await;

    let err = result.unwrap_err();
    assert!(matches!(err, AccessServiceError::AccountDisabled));
    assert_eq!(err.to_string(), "account disabled");
    assert_eq!(provider.sign_outs.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn should_record_failure_message_before_revoking() {
    let provider = MockIdentityProvider::with_account("someone@example.com", "pw", "u-1");
    let profiles = MockProfileRepo::new(vec![
        ProfileFixture::new("u-1")
            .email("someone@example.com")
            .inactive()
            .build(),
    ]);
    let admin = test_admin();
    let reason = SignOutReason::default();

    let err = SignInUseCase {
        provider: &provider,
        profiles: &profiles,
        admin: &admin,
        provisioning: RetryPolicy::provision_confirm(),
        reason: &reason,
    }
    .execute(
        input("someone@example.com", "pw"),
        &GenerationToken::detached(),
    )
    .await
    .unwrap_err();

    assert_eq!(reason.take().await.as_deref(), Some(err.user_message()));
    assert_eq!(reason.take().await, None);
}

#[test]
fn should_reject_blank_fields_on_validation() {
    assert!(matches!(
        input("  ", "pw").validate(),
        Err(AccessServiceError::EmptyIdentifier)
    ));
    assert!(matches!(
        input("admin", " \t").validate(),
        Err(AccessServiceError::EmptySecret)
    ));
    assert!(input("admin", " pw ").validate().is_ok());
}

#[tokio::test]
async fn should_accept_legacy_active_status_on_inactive_flag() {
    let provider = MockIdentityProvider::with_account("legacy@example.com", "pw", "u-2");
    let mut profile = ProfileFixture::new("u-2")
        .email("legacy@example.com")
        .inactive()
        .build();
    profile.status = Some("active".into());
    let profiles = MockProfileRepo::new(vec![profile]);

    let identity = sign_in(&provider, &profiles, "legacy@example.com", "pw")
        .await
        .unwrap();

    assert_eq!(identity.profile.id, "u-2");
    assert_eq!(provider.sign_outs.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn should_prefer_employee_number_over_credential_id() {
    let provider = MockIdentityProvider::with_account("4521", "pw", "u-new");
    let profiles = MockProfileRepo::new(vec![
        ProfileFixture::new("legacy-9").employee_number("4521").build(),
        ProfileFixture::new("u-new").build(),
    ]);

    let identity = sign_in(&provider, &profiles, " 4521 ", "pw").await.unwrap();

    assert_eq!(identity.profile.id, "legacy-9");
}

#[tokio::test]
async fn should_skip_employee_number_lookup_for_email_identifiers() {
    let provider = MockIdentityProvider::with_account("agent@example.com", "pw", "u-3");
    let profiles = MockProfileRepo::new(vec![
        ProfileFixture::new("other")
            .email("other@example.com")
            .employee_number("agent@example.com")
            .build(),
        ProfileFixture::new("u-3")
            .email("u-3-primary@example.com")
            .permissions([permission::VIEW_BOOKINGS])
            .build(),
    ]);

    let identity = sign_in(&provider, &profiles, "agent@example.com", "pw")
        .await
        .unwrap();

    assert_eq!(identity.profile.id, "u-3");
    assert!(identity.check_permission(permission::VIEW_BOOKINGS));
}

#[tokio::test]
async fn should_revoke_when_no_profile_matches() {
    let provider = MockIdentityProvider::with_account("ghost@example.com", "pw", "u-ghost");
    let profiles = MockProfileRepo::empty();

    let result = sign_in(&provider, &profiles, "ghost@example.com", "pw").await;

    assert!(matches!(result, Err(AccessServiceError::AccountNotFound)));
    assert_eq!(provider.sign_outs.load(Ordering::SeqCst), 1);
    assert!(profiles.profiles_handle().lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_propagate_classified_provider_errors() {
    let provider = MockIdentityProvider::failing(ProviderErrorCode::WrongPassword);
    let profiles = MockProfileRepo::empty();

    let result = sign_in(&provider, &profiles, "someone@example.com", "pw").await;

    match result {
        Err(AccessServiceError::Provider(code)) => {
            assert_eq!(code, ProviderErrorCode::WrongPassword);
            assert_eq!(code.user_message(), "كلمة المرور غير صحيحة");
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(provider.sign_outs.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn should_fall_back_to_administrator_when_provider_key_expired() {
    let provider = MockIdentityProvider::failing(ProviderErrorCode::InvalidApiKey);
    let profiles = MockProfileRepo::new(vec![ProfileFixture::admin(ADMIN_UID).build()]);

    let identity = sign_in(&provider, &profiles, "ADMIN@agency.test", ADMIN_SECRET)
        .await
        .unwrap();

    assert_eq!(provider.sign_ins.load(Ordering::SeqCst), 1);
    assert_eq!(identity.profile.id, ADMIN_UID);
    assert!(identity.is_admin);
}

#[tokio::test]
async fn should_not_fall_back_for_other_accounts_when_provider_key_expired() {
    let provider = MockIdentityProvider::failing(ProviderErrorCode::InvalidApiKey);
    let profiles = MockProfileRepo::empty();

    let result = sign_in(&provider, &profiles, "someone@example.com", ADMIN_SECRET).await;

    assert!(matches!(
        result,
        Err(AccessServiceError::Provider(ProviderErrorCode::InvalidApiKey))
    ));
}
