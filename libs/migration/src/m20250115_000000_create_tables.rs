use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

fn big_pk<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .big_integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Companies
        manager
            .create_table(
                Table::create()
                    .table(Companies::Table)
                    .if_not_exists()
                    .col(big_pk(Companies::Id))
                    .col(string(Companies::Name))
                    .col(text_null(Companies::Description))
                    .col(string_null(Companies::Address))
                    .col(string_null(Companies::Logo))
                    .col(timestamp_with_time_zone(Companies::CreatedAt))
                    .col(timestamp_with_time_zone_null(Companies::UpdatedAt))
                    .col(string_null(Companies::CreatedBy))
                    .col(string_null(Companies::UpdatedBy))
                    .to_owned(),
            )
            .await?;

        // Roles
        manager
            .create_table(
                Table::create()
                    .table(Roles::Table)
                    .if_not_exists()
                    .col(big_pk(Roles::Id))
                    .col(string_uniq(Roles::Name))
                    .col(text_null(Roles::Description))
                    .col(boolean(Roles::Active))
                    .col(timestamp_with_time_zone(Roles::CreatedAt))
                    .col(timestamp_with_time_zone_null(Roles::UpdatedAt))
                    .col(string_null(Roles::CreatedBy))
                    .col(string_null(Roles::UpdatedBy))
                    .to_owned(),
            )
            .await?;

        // Permissions
        manager
            .create_table(
                Table::create()
                    .table(Permissions::Table)
                    .if_not_exists()
                    .col(big_pk(Permissions::Id))
                    .col(string(Permissions::Name))
                    .col(string(Permissions::ApiPath))
                    .col(string(Permissions::Method))
                    .col(string(Permissions::Module))
                    .col(timestamp_with_time_zone(Permissions::CreatedAt))
                    .col(timestamp_with_time_zone_null(Permissions::UpdatedAt))
                    .col(string_null(Permissions::CreatedBy))
                    .col(string_null(Permissions::UpdatedBy))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_permissions_path_method_module")
                    .table(Permissions::Table)
                    .col(Permissions::ApiPath)
                    .col(Permissions::Method)
                    .col(Permissions::Module)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Role <-> Permission join
        manager
            .create_table(
                Table::create()
                    .table(PermissionRole::Table)
                    .if_not_exists()
                    .col(big_integer(PermissionRole::RoleId))
                    .col(big_integer(PermissionRole::PermissionId))
                    .primary_key(
                        Index::create()
                            .col(PermissionRole::RoleId)
                            .col(PermissionRole::PermissionId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_permission_role_role")
                            .from(PermissionRole::Table, PermissionRole::RoleId)
                            .to(Roles::Table, Roles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_permission_role_permission")
                            .from(PermissionRole::Table, PermissionRole::PermissionId)
                            .to(Permissions::Table, Permissions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Users. Removing a company removes its users with it.
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(big_pk(Users::Id))
                    .col(string(Users::Name))
                    .col(string_uniq(Users::Email))
                    .col(string(Users::Password))
                    .col(integer_null(Users::Age))
                    .col(string_null(Users::Gender))
                    .col(text_null(Users::Address))
                    .col(text_null(Users::RefreshToken))
                    .col(big_integer_null(Users::CompanyId))
                    .col(big_integer_null(Users::RoleId))
                    .col(timestamp_with_time_zone(Users::CreatedAt))
                    .col(timestamp_with_time_zone_null(Users::UpdatedAt))
                    .col(string_null(Users::CreatedBy))
                    .col(string_null(Users::UpdatedBy))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_company")
                            .from(Users::Table, Users::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_role")
                            .from(Users::Table, Users::RoleId)
                            .to(Roles::Table, Roles::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Skills
        manager
            .create_table(
                Table::create()
                    .table(Skills::Table)
                    .if_not_exists()
                    .col(big_pk(Skills::Id))
                    .col(string_uniq(Skills::Name))
                    .col(timestamp_with_time_zone(Skills::CreatedAt))
                    .col(timestamp_with_time_zone_null(Skills::UpdatedAt))
                    .col(string_null(Skills::CreatedBy))
                    .col(string_null(Skills::UpdatedBy))
                    .to_owned(),
            )
            .await?;

        // Jobs
        manager
            .create_table(
                Table::create()
                    .table(Jobs::Table)
                    .if_not_exists()
                    .col(big_pk(Jobs::Id))
                    .col(string(Jobs::Name))
                    .col(string_null(Jobs::Location))
                    .col(double_null(Jobs::Salary))
                    .col(integer_null(Jobs::Quantity))
                    .col(string_null(Jobs::Level))
                    .col(text_null(Jobs::Description))
                    .col(timestamp_with_time_zone_null(Jobs::StartDate))
                    .col(timestamp_with_time_zone_null(Jobs::EndDate))
                    .col(boolean(Jobs::Active))
                    .col(big_integer_null(Jobs::CompanyId))
                    .col(timestamp_with_time_zone(Jobs::CreatedAt))
                    .col(timestamp_with_time_zone_null(Jobs::UpdatedAt))
                    .col(string_null(Jobs::CreatedBy))
                    .col(string_null(Jobs::UpdatedBy))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_jobs_company")
                            .from(Jobs::Table, Jobs::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Job <-> Skill join
        manager
            .create_table(
                Table::create()
                    .table(JobSkill::Table)
                    .if_not_exists()
                    .col(big_integer(JobSkill::JobId))
                    .col(big_integer(JobSkill::SkillId))
                    .primary_key(
                        Index::create()
                            .col(JobSkill::JobId)
                            .col(JobSkill::SkillId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_job_skill_job")
                            .from(JobSkill::Table, JobSkill::JobId)
                            .to(Jobs::Table, Jobs::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_job_skill_skill")
                            .from(JobSkill::Table, JobSkill::SkillId)
                            .to(Skills::Table, Skills::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Resumes
        manager
            .create_table(
                Table::create()
                    .table(Resumes::Table)
                    .if_not_exists()
                    .col(big_pk(Resumes::Id))
                    .col(string(Resumes::Email))
                    .col(text(Resumes::Url))
                    .col(string(Resumes::Status))
                    .col(big_integer(Resumes::UserId))
                    .col(big_integer(Resumes::JobId))
                    .col(timestamp_with_time_zone(Resumes::CreatedAt))
                    .col(timestamp_with_time_zone_null(Resumes::UpdatedAt))
                    .col(string_null(Resumes::CreatedBy))
                    .col(string_null(Resumes::UpdatedBy))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_resumes_user")
                            .from(Resumes::Table, Resumes::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_resumes_job")
                            .from(Resumes::Table, Resumes::JobId)
                            .to(Jobs::Table, Jobs::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Subscribers
        manager
            .create_table(
                Table::create()
                    .table(Subscribers::Table)
                    .if_not_exists()
                    .col(big_pk(Subscribers::Id))
                    .col(string_uniq(Subscribers::Email))
                    .col(string(Subscribers::Name))
                    .col(timestamp_with_time_zone(Subscribers::CreatedAt))
                    .col(timestamp_with_time_zone_null(Subscribers::UpdatedAt))
                    .col(string_null(Subscribers::CreatedBy))
                    .col(string_null(Subscribers::UpdatedBy))
                    .to_owned(),
            )
            .await?;

        // Skill <-> Subscriber join
        manager
            .create_table(
                Table::create()
                    .table(SkillSubscriber::Table)
                    .if_not_exists()
                    .col(big_integer(SkillSubscriber::SubscriberId))
                    .col(big_integer(SkillSubscriber::SkillId))
                    .primary_key(
                        Index::create()
                            .col(SkillSubscriber::SubscriberId)
                            .col(SkillSubscriber::SkillId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_skill_subscriber_subscriber")
                            .from(SkillSubscriber::Table, SkillSubscriber::SubscriberId)
                            .to(Subscribers::Table, Subscribers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_skill_subscriber_skill")
                            .from(SkillSubscriber::Table, SkillSubscriber::SkillId)
                            .to(Skills::Table, Skills::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Listing indexes
        manager
            .create_index(
                Index::create()
                    .name("idx_users_company_id")
                    .table(Users::Table)
                    .col(Users::CompanyId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_jobs_company_id")
                    .table(Jobs::Table)
                    .col(Jobs::CompanyId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_resumes_user_id")
                    .table(Resumes::Table)
                    .col(Resumes::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_resumes_job_id")
                    .table(Resumes::Table)
                    .col(Resumes::JobId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of foreign key dependencies
        manager
            .drop_table(Table::drop().table(SkillSubscriber::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Subscribers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Resumes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(JobSkill::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Jobs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Skills::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PermissionRole::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Permissions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Roles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Companies::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Companies {
    Table,
    Id,
    Name,
    Description,
    Address,
    Logo,
    CreatedAt,
    UpdatedAt,
    CreatedBy,
    UpdatedBy,
}

#[derive(DeriveIden)]
enum Roles {
    Table,
    Id,
    Name,
    Description,
    Active,
    CreatedAt,
    UpdatedAt,
    CreatedBy,
    UpdatedBy,
}

#[derive(DeriveIden)]
enum Permissions {
    Table,
    Id,
    Name,
    ApiPath,
    Method,
    Module,
    CreatedAt,
    UpdatedAt,
    CreatedBy,
    UpdatedBy,
}

#[derive(DeriveIden)]
enum PermissionRole {
    Table,
    RoleId,
    PermissionId,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    Password,
    Age,
    Gender,
    Address,
    RefreshToken,
    CompanyId,
    RoleId,
    CreatedAt,
    UpdatedAt,
    CreatedBy,
    UpdatedBy,
}

#[derive(DeriveIden)]
enum Skills {
    Table,
    Id,
    Name,
    CreatedAt,
    UpdatedAt,
    CreatedBy,
    UpdatedBy,
}

#[derive(DeriveIden)]
enum Jobs {
    Table,
    Id,
    Name,
    Location,
    Salary,
    Quantity,
    Level,
    Description,
    StartDate,
    EndDate,
    Active,
    CompanyId,
    CreatedAt,
    UpdatedAt,
    CreatedBy,
    UpdatedBy,
}

#[derive(DeriveIden)]
enum JobSkill {
    Table,
    JobId,
    SkillId,
}

#[derive(DeriveIden)]
enum Resumes {
    Table,
    Id,
    Email,
    Url,
    Status,
    UserId,
    JobId,
    CreatedAt,
    UpdatedAt,
    CreatedBy,
    UpdatedBy,
}

#[derive(DeriveIden)]
enum Subscribers {
    Table,
    Id,
    Email,
    Name,
    CreatedAt,
    UpdatedAt,
    CreatedBy,
    UpdatedBy,
}

#[derive(DeriveIden)]
enum SkillSubscriber {
    Table,
    SubscriberId,
    SkillId,
}
