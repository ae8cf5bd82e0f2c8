//! Profile fixtures.
//!
//! ```
//! use rahala_domain::role::Role;
//! use rahala_testing::profile::ProfileFixture;
//!
//! let identity = ProfileFixture::new("uid-7")
//!     .role(Role::Accountant)
//!     .permissions(["view_invoices"])
//!     .identity();
//! assert!(identity.can_access_section("invoices"));
//! assert!(!identity.is_admin);
//! ```

use chrono::Utc;

use rahala_domain::permission::Permissions;
use rahala_domain::profile::{Identity, Profile, SYSTEM_ADMIN_JOB_TITLE};
use rahala_domain::role::Role;

/// Builder for [`Profile`] records with sensible defaults: an active
/// `employee` with no permissions, keyed and authenticated by the given uid.
#[derive(Debug, Clone)]
pub struct ProfileFixture {
    profile: Profile,
}

impl ProfileFixture {
    pub fn new(uid: &str) -> Self {
        let now = Utc::now();
        Self {
            profile: Profile {
                id: uid.to_owned(),
                auth_uid: Some(uid.to_owned()),
                name: format!("Staff {uid}"),
                email: Some(format!("{uid}@agency.test")),
                role: Role::Employee,
                job_title: None,
                permissions: Permissions::default(),
                active: true,
                status: None,
                employee_number: None,
                username: None,
                phone: None,
                created_at: now,
                updated_at: now,
                migrated_from: None,
                migrated_at: None,
            },
        }
    }

    /// Administrator profile as created by just-in-time provisioning.
    pub fn admin(uid: &str) -> Self {
        Self::new(uid)
            .role(Role::Admin)
            .permissions(["all"])
            .job_title(SYSTEM_ADMIN_JOB_TITLE)
    }

    pub fn role(mut self, role: Role) -> Self {
        self.profile.role = role;
        self
    }

    pub fn permissions<const N: usize>(mut self, permissions: [&str; N]) -> Self {
        self.profile.permissions = Permissions::new(permissions);
        self
    }

    pub fn email(mut self, email: &str) -> Self {
        self.profile.email = Some(email.to_owned());
        self
    }

    pub fn job_title(mut self, title: &str) -> Self {
        self.profile.job_title = Some(title.to_owned());
        self
    }

    pub fn employee_number(mut self, number: &str) -> Self {
        self.profile.employee_number = Some(number.to_owned());
        self
    }

    pub fn username(mut self, username: &str) -> Self {
        self.profile.username = Some(username.to_owned());
        self
    }

    /// Store the record under a key other than the auth uid (legacy records).
    pub fn keyed_by(mut self, id: &str) -> Self {
        self.profile.id = id.to_owned();
        self
    }

    pub fn inactive(mut self) -> Self {
        self.profile.active = false;
        self.profile.status = Some("inactive".to_owned());
        self
    }

    pub fn build(self) -> Profile {
        self.profile
    }

    pub fn identity(self) -> Identity {
        Identity::from(self.profile)
    }
}
