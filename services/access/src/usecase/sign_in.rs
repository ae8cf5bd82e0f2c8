use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use rahala_domain::profile::{Identity, Profile};

use crate::config::AdminConfig;
use crate::domain::repository::{IdentityProvider, ProfileRepository};
use crate::domain::types::{ProviderCredential, ProviderErrorCode, RetryPolicy};
use crate::error::AccessServiceError;
use crate::usecase::generation::GenerationToken;
use crate::usecase::provision::ProvisionAdminUseCase;

pub struct SignInInput {
    /// Email, employee number, username, or an administrator alias.
    pub identifier: String,
    pub secret: String,
}

impl SignInInput {
    /// Rejects blank fields without any external call.
    pub fn validate(&self) -> Result<(), AccessServiceError> {
        if self.identifier.trim().is_empty() {
            return Err(AccessServiceError::EmptyIdentifier);
        }
        if self.secret.trim().is_empty() {
            return Err(AccessServiceError::EmptySecret);
        }
        Ok(())
    }
}

/// Message of the failure that forced a provider sign-out.
///
/// Recorded before the provider session is revoked, so the `SignedOut` event
/// that follows can report it even when it supersedes the failed transition.
#[derive(Debug, Default)]
pub struct SignOutReason(Mutex<Option<String>>);

impl SignOutReason {
    pub async fn record(&self, message: &str) {
        *self.0.lock().await = Some(message.to_owned());
    }

    pub async fn take(&self) -> Option<String> {
        self.0.lock().await.take()
    }
}

/// Resolves an identifier plus secret into an [`Identity`].
///
/// Never commits session state; the caller commits the result.
pub struct SignInUseCase<'a, P: IdentityProvider, R: ProfileRepository> {
    pub provider: &'a P,
    pub profiles: &'a R,
    pub admin: &'a AdminConfig,
    pub provisioning: RetryPolicy,
    pub reason: &'a SignOutReason,
}

impl<P: IdentityProvider, R: ProfileRepository> SignInUseCase<'_, P, R> {
    pub async fn execute(
        &self,
        input: SignInInput,
        token: &GenerationToken,
    ) -> Result<Identity, AccessServiceError> {
        input.validate()?;
        let identifier = input.identifier.trim();

        let credential = self.credential(identifier, &input.secret).await?;

        match self.resolve(identifier, &credential, token).await {
            Ok(identity) => {
                info!(uid = %identity.profile.id, role = %identity.role(), "sign-in resolved");
                Ok(identity)
            }
            // A newer transition owns the provider session now.
            Err(AccessServiceError::Superseded) => Err(AccessServiceError::Superseded),
            Err(e) => {
                self.revoke(&credential, &e).await;
                Err(e)
            }
        }
    }

    async fn credential(
        &self,
        identifier: &str,
        secret: &str,
    ) -> Result<ProviderCredential, AccessServiceError> {
        if self.admin.is_alias(identifier) {
            if self.admin.secret_matches(secret) {
                info!("administrator alias sign-in");
                return Ok(self.admin.credential());
            }
            warn!("administrator alias sign-in with wrong secret");
            return Err(AccessServiceError::InvalidAdminCredential);
        }

        match self.provider.sign_in_with_password(identifier, secret).await {
            Ok(credential) => Ok(credential),
            Err(AccessServiceError::Provider(ProviderErrorCode::InvalidApiKey))
                if self.admin.is_admin_email(identifier) && self.admin.secret_matches(secret) =>
            {
                warn!("provider rejected its api key, using administrator fallback");
                Ok(self.admin.credential())
            }
            Err(e) => Err(e),
        }
    }

    async fn resolve(
        &self,
        identifier: &str,
        credential: &ProviderCredential,
        token: &GenerationToken,
    ) -> Result<Identity, AccessServiceError> {
        let profile = match self.lookup(identifier, credential).await? {
            Some(profile) => profile,
            None if credential.synthesized || self.admin.is_admin_email(identifier) => {
                ProvisionAdminUseCase {
                    profiles: self.profiles,
                    admin: self.admin,
                    policy: self.provisioning,
                }
                .execute(&credential.uid, token)
                .await?
            }
            None => return Err(AccessServiceError::AccountNotFound),
        };

        if !profile.is_enabled() {
            return Err(AccessServiceError::AccountDisabled);
        }
        Ok(Identity::from(profile))
    }

    /// Email, then employee number and username for non-email identifiers,
    /// then the credential's external id. First match wins.
    async fn lookup(
        &self,
        identifier: &str,
        credential: &ProviderCredential,
    ) -> Result<Option<Profile>, AccessServiceError> {
        if let Some(profile) = self.profiles.find_by_email(identifier).await? {
            return Ok(Some(profile));
        }
        if !identifier.contains('@') {
            if let Some(profile) = self.profiles.find_by_employee_number(identifier).await? {
                return Ok(Some(profile));
            }
            if let Some(profile) = self.profiles.find_by_username(identifier).await? {
                return Ok(Some(profile));
            }
        }
        self.profiles.find_by_id(&credential.uid).await
    }

    async fn revoke(&self, credential: &ProviderCredential, cause: &AccessServiceError) {
        if credential.synthesized {
            debug!("synthesized credential, no provider session to revoke");
            return;
        }
        self.reason.record(cause.user_message()).await;
        if let Err(e) = self.provider.sign_out().await {
            warn!(error = %e, "failed to revoke provider session");
            self.reason.take().await;
        }
    }
}
