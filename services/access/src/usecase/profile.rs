use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use rahala_domain::permission::Permissions;
use rahala_domain::profile::{ACTIVE_STATUS, Profile};
use rahala_domain::role::Role;

use crate::domain::repository::ProfileRepository;
use crate::error::AccessServiceError;

// ── CreateProfile ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProfileInput {
    /// External auth uid; a fresh id is generated when absent.
    #[serde(default)]
    pub auth_uid: Option<String>,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub permissions: Permissions,
    #[serde(default)]
    pub employee_number: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

pub struct CreateProfileUseCase<'a, R: ProfileRepository> {
    pub profiles: &'a R,
}

impl<R: ProfileRepository> CreateProfileUseCase<'_, R> {
    pub async fn execute(&self, input: CreateProfileInput) -> Result<Profile, AccessServiceError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(AccessServiceError::MissingData);
        }

        if input.role.is_singleton() && self.profiles.exists_active_with_role(&input.role).await? {
            warn!(role = %input.role, "rejected second holder of a singleton role");
            return Err(AccessServiceError::SingletonRoleTaken(input.role));
        }

        let id = input
            .auth_uid
            .clone()
            .filter(|uid| !uid.trim().is_empty())
            .unwrap_or_else(|| Uuid::now_v7().to_string());
        let now = Utc::now();
        let profile = Profile {
            id: id.clone(),
            auth_uid: input.auth_uid.filter(|uid| !uid.trim().is_empty()),
            name: name.to_owned(),
            email: input.email,
            role: input.role,
            job_title: input.job_title,
            permissions: input.permissions,
            active: true,
            status: Some(ACTIVE_STATUS.to_owned()),
            employee_number: input.employee_number,
            username: input.username,
            phone: input.phone,
            created_at: now,
            updated_at: now,
            migrated_from: None,
            migrated_at: None,
        };

        self.profiles.create(&profile).await?;
        info!(id = %profile.id, role = %profile.role, "profile created");
        Ok(profile)
    }
}
