use chrono::Utc;
use tracing::{debug, error, info, warn};

use rahala_domain::permission::Permissions;
use rahala_domain::profile::{ACTIVE_STATUS, Profile, SYSTEM_ADMIN_JOB_TITLE};
use rahala_domain::role::Role;

use crate::config::AdminConfig;
use crate::domain::repository::ProfileRepository;
use crate::domain::types::RetryPolicy;
use crate::error::AccessServiceError;
use crate::usecase::generation::GenerationToken;

/// Display name of a just-in-time administrator profile.
pub const ADMIN_DISPLAY_NAME: &str = "مدير النظام";

/// Just-in-time creation of the administrator profile.
///
/// Writes the profile keyed by `uid`, then polls until the record reads back.
pub struct ProvisionAdminUseCase<'a, R: ProfileRepository> {
    pub profiles: &'a R,
    pub admin: &'a AdminConfig,
    pub policy: RetryPolicy,
}

impl<R: ProfileRepository> ProvisionAdminUseCase<'_, R> {
    pub async fn execute(
        &self,
        uid: &str,
        token: &GenerationToken,
    ) -> Result<Profile, AccessServiceError> {
        let profile = self.admin_profile(uid);
        info!(uid, "provisioning administrator profile");
        self.profiles.create(&profile).await.map_err(|e| match e {
            AccessServiceError::StorePermissionDenied => e,
            other => {
                error!(uid, error = %other, "administrator profile write failed");
                AccessServiceError::ProvisioningUnconfirmed
            }
        })?;

        for attempt in 1..=self.policy.attempts {
            if !token.is_current() {
                return Err(AccessServiceError::Superseded);
            }
            match self.profiles.find_by_id(uid).await {
                Ok(Some(stored)) => {
                    info!(uid, attempt, "administrator profile confirmed");
                    return Ok(stored);
                }
                Ok(None) => debug!(uid, attempt, "administrator profile not visible yet"),
                Err(e) => warn!(uid, attempt, error = %e, "administrator profile read failed"),
            }
            if attempt < self.policy.attempts && !token.pause(self.policy.delay).await {
                return Err(AccessServiceError::Superseded);
            }
        }

        warn!(uid, attempts = self.policy.attempts, "administrator profile never became visible");
        Err(AccessServiceError::ProvisioningUnconfirmed)
    }

    fn admin_profile(&self, uid: &str) -> Profile {
        let now = Utc::now();
        Profile {
            id: uid.to_owned(),
            auth_uid: Some(uid.to_owned()),
            name: ADMIN_DISPLAY_NAME.to_owned(),
            email: Some(self.admin.email.clone()),
            role: Role::Admin,
            job_title: Some(SYSTEM_ADMIN_JOB_TITLE.to_owned()),
            permissions: Permissions::all(),
            active: true,
            status: Some(ACTIVE_STATUS.to_owned()),
            employee_number: None,
            username: None,
            phone: None,
            created_at: now,
            updated_at: now,
            migrated_from: None,
            migrated_at: None,
        }
    }
}
