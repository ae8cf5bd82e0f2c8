use rahala_access::error::AccessServiceError;
use rahala_access::usecase::profile::{CreateProfileInput, CreateProfileUseCase};
use rahala_domain::role::Role;
use rahala_testing::profile::ProfileFixture;

use crate::helpers::{ADMIN_UID, MockProfileRepo};

fn input(name: &str, role: Role) -> CreateProfileInput {
    serde_json::from_value(serde_json::json!({ "name": name, "role": role.as_str() })).unwrap()
}

#[tokio::test]
async fn should_reject_singleton_holder_caught_only_at_insert() {
    let profiles =
        MockProfileRepo::new(vec![ProfileFixture::admin(ADMIN_UID).build()]).racing_role_check();
    let handle = profiles.profiles_handle();

    let err = CreateProfileUseCase {
        profiles: &profiles,
    }
    .execute(input("Second", Role::Admin))
    .await
    .unwrap_err();

    assert!(matches!(err, AccessServiceError::SingletonRoleTaken(Role::Admin)));
    assert_eq!(handle.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_create_non_singleton_roles_regardless_of_holders() {
    let profiles = MockProfileRepo::new(vec![
        ProfileFixture::new("u-1").role(Role::BookingAgent).build(),
    ])
    .racing_role_check();

    let profile = CreateProfileUseCase {
        profiles: &profiles,
    }
    .execute(input("Agent Two", Role::BookingAgent))
    .await
    .unwrap();

    assert_eq!(profile.role, Role::BookingAgent);
    assert!(profile.active);
}

#[tokio::test]
async fn should_require_a_name() {
    let profiles = MockProfileRepo::empty();

    let err = CreateProfileUseCase {
        profiles: &profiles,
    }
    .execute(input("   ", Role::Employee))
    .await
    .unwrap_err();

    assert!(matches!(err, AccessServiceError::MissingData));
}
