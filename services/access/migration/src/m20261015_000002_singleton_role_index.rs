use rahala_access_schema::profiles::SINGLETON_ROLE_INDEX;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // At most one enabled holder per singleton role; "enabled" matches the
        // legacy status column as well as the active flag.
        manager
            .get_connection()
            .execute_unprepared(&format!(
                "CREATE UNIQUE INDEX IF NOT EXISTS {SINGLETON_ROLE_INDEX} ON profiles (role) \
                 WHERE role IN ('admin', 'general_manager', 'executive_manager') \
                 AND (active OR status = 'active')"
            ))
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(&format!("DROP INDEX IF EXISTS {SINGLETON_ROLE_INDEX}"))
            .await?;
        Ok(())
    }
}
