use sea_orm::entity::prelude::*;

/// Partial unique index allowing one enabled holder per singleton role.
pub const SINGLETON_ROLE_INDEX: &str = "idx_profiles_singleton_role";

/// Staff profile record, keyed by the external auth uid (or the legacy
/// employee identifier for migrated records).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub auth_uid: Option<String>,
    pub name: String,
    pub email: Option<String>,
    pub role: String,
    pub job_title: Option<String>,
    /// JSON array of permission strings; legacy rows may hold a bare string.
    pub permissions: Json,
    pub active: bool,
    pub status: Option<String>,
    pub employee_number: Option<String>,
    pub username: Option<String>,
    pub phone: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub migrated_from: Option<String>,
    pub migrated_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
