use anyhow::Context as _;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter,
};

use rahala_access_schema::profiles::{self, SINGLETON_ROLE_INDEX};
use rahala_domain::permission::Permissions;
use rahala_domain::profile::{ACTIVE_STATUS, Profile};
use rahala_domain::role::Role;

use crate::domain::repository::ProfileRepository;
use crate::error::AccessServiceError;

// ── Profile repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbProfileRepository {
    pub db: DatabaseConnection,
}

impl DbProfileRepository {
    async fn find_one(
        &self,
        column: profiles::Column,
        value: &str,
        context: &'static str,
    ) -> Result<Option<Profile>, AccessServiceError> {
        let model = profiles::Entity::find()
            .filter(column.eq(value))
            .one(&self.db)
            .await
            .map_err(|e| store_err(e, context))?;
        Ok(model.map(profile_from_model))
    }
}

impl ProfileRepository for DbProfileRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Profile>, AccessServiceError> {
        let model = profiles::Entity::find_by_id(id.to_owned())
            .one(&self.db)
            .await
            .map_err(|e| store_err(e, "find profile by id"))?;
        Ok(model.map(profile_from_model))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Profile>, AccessServiceError> {
        self.find_one(profiles::Column::Email, email, "find profile by email")
            .await
    }

    async fn find_by_employee_number(
        &self,
        number: &str,
    ) -> Result<Option<Profile>, AccessServiceError> {
        self.find_one(
            profiles::Column::EmployeeNumber,
            number,
            "find profile by employee number",
        )
        .await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Profile>, AccessServiceError> {
        self.find_one(profiles::Column::Username, username, "find profile by username")
            .await
    }

    async fn exists_active_with_role(&self, role: &Role) -> Result<bool, AccessServiceError> {
        let count = profiles::Entity::find()
            .filter(profiles::Column::Role.eq(role.as_str()))
            .filter(
                Condition::any()
                    .add(profiles::Column::Active.eq(true))
                    .add(profiles::Column::Status.eq(ACTIVE_STATUS)),
            )
            .count(&self.db)
            .await
            .map_err(|e| store_err(e, "count active profiles by role"))?;
        Ok(count > 0)
    }

    async fn create(&self, profile: &Profile) -> Result<(), AccessServiceError> {
        let permissions = serde_json::to_value(&profile.permissions)
            .context("serialize profile permissions")?;
        profiles::ActiveModel {
            id: Set(profile.id.clone()),
            auth_uid: Set(profile.auth_uid.clone()),
            name: Set(profile.name.clone()),
            email: Set(profile.email.clone()),
            role: Set(profile.role.as_str().to_owned()),
            job_title: Set(profile.job_title.clone()),
            permissions: Set(permissions),
            active: Set(profile.active),
            status: Set(profile.status.clone()),
            employee_number: Set(profile.employee_number.clone()),
            username: Set(profile.username.clone()),
            phone: Set(profile.phone.clone()),
            created_at: Set(profile.created_at),
            updated_at: Set(profile.updated_at),
            migrated_from: Set(profile.migrated_from.clone()),
            migrated_at: Set(profile.migrated_at),
        }
        .insert(&self.db)
        .await
        .map_err(|e| {
            if is_singleton_violation(&e) {
                AccessServiceError::SingletonRoleTaken(profile.role.clone())
            } else {
                store_err(e, "insert profile")
            }
        })?;
        Ok(())
    }
}

/// Row-level security rejections are terminal for a session; everything else
/// is an internal error.
fn store_err(e: DbErr, context: &'static str) -> AccessServiceError {
    if e.to_string().to_lowercase().contains("permission denied") {
        return AccessServiceError::StorePermissionDenied;
    }
    AccessServiceError::Internal(anyhow::Error::new(e).context(context))
}

/// A concurrent insert won the singleton-role index.
fn is_singleton_violation(e: &DbErr) -> bool {
    e.to_string().contains(SINGLETON_ROLE_INDEX)
}

fn profile_from_model(m: profiles::Model) -> Profile {
    let permissions = serde_json::from_value::<Permissions>(m.permissions).unwrap_or_else(|e| {
        tracing::warn!(id = %m.id, error = %e, "unreadable permissions, treating as none");
        Permissions::default()
    });
    Profile {
        id: m.id,
        auth_uid: m.auth_uid,
        name: m.name,
        email: m.email,
        role: Role::from(m.role),
        job_title: m.job_title,
        permissions,
        active: m.active,
        status: m.status,
        employee_number: m.employee_number,
        username: m.username,
        phone: m.phone,
        created_at: m.created_at,
        updated_at: m.updated_at,
        migrated_from: m.migrated_from,
        migrated_at: m.migrated_at,
    }
}
