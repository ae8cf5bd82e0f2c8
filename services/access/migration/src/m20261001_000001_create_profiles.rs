use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Profiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Profiles::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Profiles::AuthUid).string())
                    .col(ColumnDef::new(Profiles::Name).string().not_null())
                    .col(ColumnDef::new(Profiles::Email).string())
                    .col(ColumnDef::new(Profiles::Role).string().not_null())
                    .col(ColumnDef::new(Profiles::JobTitle).string())
                    .col(
                        ColumnDef::new(Profiles::Permissions)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(Profiles::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Profiles::Status).string())
                    .col(ColumnDef::new(Profiles::EmployeeNumber).string())
                    .col(ColumnDef::new(Profiles::Username).string())
                    .col(ColumnDef::new(Profiles::Phone).string())
                    .col(
                        ColumnDef::new(Profiles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Profiles::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Profiles::MigratedFrom).string())
                    .col(ColumnDef::new(Profiles::MigratedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Fallback sign-in lookups and the singleton-role check.
        for (name, column) in [
            ("idx_profiles_email", Profiles::Email),
            ("idx_profiles_employee_number", Profiles::EmployeeNumber),
            ("idx_profiles_username", Profiles::Username),
            ("idx_profiles_role", Profiles::Role),
        ] {
            manager
                .create_index(
                    Index::create()
                        .table(Profiles::Table)
                        .col(column)
                        .name(name)
                        .to_owned(),
                )
                .await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Profiles::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Profiles {
    Table,
    Id,
    AuthUid,
    Name,
    Email,
    Role,
    JobTitle,
    Permissions,
    Active,
    Status,
    EmployeeNumber,
    Username,
    Phone,
    CreatedAt,
    UpdatedAt,
    MigratedFrom,
    MigratedAt,
}
