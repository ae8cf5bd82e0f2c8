//! Staff profile and the resolved identity built from it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::permission::Permissions;
use crate::role::Role;
use crate::section::Section;

/// Job title that marks a profile as administrator independent of its role.
pub const SYSTEM_ADMIN_JOB_TITLE: &str = "System Administrator";

/// Legacy status value that counts as enabled even when `active` is false.
pub const ACTIVE_STATUS: &str = "active";

/// Stored staff profile record.
///
/// Keyed by `id`, which equals the external auth uid for every profile created
/// after sign-up; migrated legacy employee records keep their old identifier
/// and carry `migrated_from` / `migrated_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
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
    pub active: bool,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub employee_number: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migrated_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migrated_at: Option<DateTime<Utc>>,
}

impl Profile {
    /// Disabled profiles have `active == false` and no legacy `"active"` status.
    pub fn is_enabled(&self) -> bool {
        self.active || self.status.as_deref() == Some(ACTIVE_STATUS)
    }

    /// Administrator by role or by the sentinel job title.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin || self.job_title.as_deref() == Some(SYSTEM_ADMIN_JOB_TITLE)
    }
}

/// The authenticated principal: a profile plus its computed administrator flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(flatten)]
    pub profile: Profile,
    pub is_admin: bool,
}

impl From<Profile> for Identity {
    fn from(profile: Profile) -> Self {
        let is_admin = profile.is_admin();
        Self { profile, is_admin }
    }
}

impl Identity {
    pub fn role(&self) -> &Role {
        &self.profile.role
    }

    pub fn check_permission(&self, permission: &str) -> bool {
        self.profile.permissions.contains(permission)
    }

    /// Section access for this identity.
    ///
    /// Order: administrator bypass, then the finance-role widening for the
    /// accounting family, then the generic table. Unknown keys are denied
    /// unless the administrator bypass applies.
    pub fn can_access_section(&self, key: &str) -> bool {
        if self.is_admin || self.profile.role == Role::Admin {
            return true;
        }
        let Some(section) = Section::from_key(key) else {
            return false;
        };
        if section.is_finance() && self.profile.role.is_finance() {
            return true;
        }
        section
            .permissions()
            .iter()
            .any(|p| self.check_permission(p))
    }
}

/// Permission check over an optional identity. No identity means no access.
pub fn check_permission(identity: Option<&Identity>, permission: &str) -> bool {
    identity.is_some_and(|i| i.check_permission(permission))
}

/// Section check over an optional identity. No identity means no access.
pub fn can_access_section(identity: Option<&Identity>, key: &str) -> bool {
    identity.is_some_and(|i| i.can_access_section(key))
}
