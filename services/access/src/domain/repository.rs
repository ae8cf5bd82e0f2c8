use std::future::Future;

use tokio::sync::broadcast;

use rahala_domain::profile::{Identity, Profile};
use rahala_domain::role::Role;

use crate::domain::types::{ProviderCredential, ProviderEvent, ProviderUser};
use crate::error::AccessServiceError;

// Ports return `Send` futures so the session store can resolve provider
// events on spawned tasks.

/// Port for the external identity provider.
pub trait IdentityProvider: Send + Sync {
    /// Password sign-in. Provider rejections come back as
    /// [`AccessServiceError::Provider`].
    fn sign_in_with_password(
        &self,
        email: &str,
        secret: &str,
    ) -> impl Future<Output = Result<ProviderCredential, AccessServiceError>> + Send;

    /// Revoke the provider session, if any.
    fn sign_out(&self) -> impl Future<Output = Result<(), AccessServiceError>> + Send;

    /// The provider's signed-in user right now.
    fn current_user(&self) -> impl Future<Output = Option<ProviderUser>> + Send;

    /// Identity-change notifications, in provider order.
    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent>;
}

/// Repository for staff profile records.
pub trait ProfileRepository: Send + Sync {
    fn find_by_id(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<Profile>, AccessServiceError>> + Send;

    /// Exact match on the stored email field.
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<Profile>, AccessServiceError>> + Send;

    fn find_by_employee_number(
        &self,
        number: &str,
    ) -> impl Future<Output = Result<Option<Profile>, AccessServiceError>> + Send;

    fn find_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Option<Profile>, AccessServiceError>> + Send;

    /// Whether an active profile already holds `role`.
    fn exists_active_with_role(
        &self,
        role: &Role,
    ) -> impl Future<Output = Result<bool, AccessServiceError>> + Send;

    fn create(
        &self,
        profile: &Profile,
    ) -> impl Future<Output = Result<(), AccessServiceError>> + Send;
}

/// Local durable mirror of the current identity, used for warm start only.
pub trait SessionCache: Send + Sync {
    fn load(&self) -> impl Future<Output = Result<Option<Identity>, AccessServiceError>> + Send;

    fn store(
        &self,
        identity: &Identity,
    ) -> impl Future<Output = Result<(), AccessServiceError>> + Send;

    fn clear(&self) -> impl Future<Output = Result<(), AccessServiceError>> + Send;
}
