use argon2::password_hash::{rand_core::OsRng, PasswordHasher, SaltString};
use argon2::Argon2;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const SUPER_ADMIN_ROLE: &str = "SUPER_ADMIN";
const ADMIN_EMAIL: &str = "admin@gmail.com";
const ADMIN_PASSWORD: &str = "123456";

/// The resource modules guarded by permissions, with their base paths.
const MODULES: &[(&str, &str, &str)] = &[
    ("COMPANIES", "company", "/api/v1/companies"),
    ("JOBS", "job", "/api/v1/jobs"),
    ("PERMISSIONS", "permission", "/api/v1/permissions"),
    ("RESUMES", "resume", "/api/v1/resumes"),
    ("ROLES", "role", "/api/v1/roles"),
    ("SKILLS", "skill", "/api/v1/skills"),
    ("SUBSCRIBERS", "subscriber", "/api/v1/subscribers"),
    ("USERS", "user", "/api/v1/users"),
];

/// Full permission catalogue: CRUD per module plus the extra operations.
fn permission_rows() -> Vec<(String, String, String, String)> {
    let mut rows = Vec::new();

    // String::from instead of to_string: the prelude glob pulls in
    // sea-query's Iden impl for &str, making to_string ambiguous
    for (module, singular, path) in MODULES {
        rows.push((
            format!("Create a {}", singular),
            String::from(*path),
            String::from("POST"),
            String::from(*module),
        ));
        rows.push((
            format!("Update a {}", singular),
            format!("{}/{{id}}", path),
            String::from("PUT"),
            String::from(*module),
        ));
        rows.push((
            format!("Delete a {}", singular),
            format!("{}/{{id}}", path),
            String::from("DELETE"),
            String::from(*module),
        ));
        rows.push((
            format!("Get a {} by id", singular),
            format!("{}/{{id}}", path),
            String::from("GET"),
            String::from(*module),
        ));
        rows.push((
            format!("Get {}s with pagination", singular),
            String::from(*path),
            String::from("GET"),
            String::from(*module),
        ));
    }

    rows.push((
        String::from("Get resumes by user"),
        String::from("/api/v1/resumes/by-user"),
        String::from("POST"),
        String::from("RESUMES"),
    ));
    rows.push((
        String::from("Get subscriber's skills"),
        String::from("/api/v1/subscribers/skills"),
        String::from("POST"),
        String::from("SUBSCRIBERS"),
    ));
    rows.push((
        String::from("Send digest emails"),
        String::from("/api/v1/email"),
        String::from("POST"),
        String::from("EMAILS"),
    ));

    rows
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        let values: Vec<String> = permission_rows()
            .into_iter()
            .map(|(name, api_path, method, module)| {
                format!(
                    "('{}', '{}', '{}', '{}', NOW(), 'seed')",
                    name.replace('\'', "''"),
                    api_path,
                    method,
                    module
                )
            })
            .collect();

        conn.execute_unprepared(&format!(
            "INSERT IGNORE INTO permissions (name, api_path, method, module, created_at, created_by) VALUES {}",
            values.join(", ")
        ))
        .await?;

        conn.execute_unprepared(&format!(
            "INSERT IGNORE INTO roles (name, description, active, created_at, created_by) \
             VALUES ('{}', 'Full access to every endpoint', true, NOW(), 'seed')",
            SUPER_ADMIN_ROLE
        ))
        .await?;

        conn.execute_unprepared(&format!(
            "INSERT IGNORE INTO permission_role (role_id, permission_id) \
             SELECT r.id, p.id FROM roles r CROSS JOIN permissions p WHERE r.name = '{}'",
            SUPER_ADMIN_ROLE
        ))
        .await?;

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(ADMIN_PASSWORD.as_bytes(), &salt)
            .map_err(|e| DbErr::Migration(format!("Failed to hash admin password: {}", e)))?
            .to_string();

        conn.execute_unprepared(&format!(
            "INSERT IGNORE INTO users (name, email, password, role_id, created_at, created_by) \
             SELECT 'Super Admin', '{}', '{}', r.id, NOW(), 'seed' \
             FROM roles r WHERE r.name = '{}'",
            ADMIN_EMAIL, password_hash, SUPER_ADMIN_ROLE
        ))
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        // Delete in reverse order of foreign key dependencies
        conn.execute_unprepared(&format!(
            "DELETE FROM users WHERE email = '{}'",
            ADMIN_EMAIL
        ))
        .await?;

        conn.execute_unprepared(&format!(
            "DELETE pr FROM permission_role pr \
             JOIN roles r ON r.id = pr.role_id WHERE r.name = '{}'",
            SUPER_ADMIN_ROLE
        ))
        .await?;

        conn.execute_unprepared(&format!(
            "DELETE FROM roles WHERE name = '{}'",
            SUPER_ADMIN_ROLE
        ))
        .await?;

        conn.execute_unprepared("DELETE FROM permissions WHERE created_by = 'seed'")
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_covers_every_module() {
        let rows = permission_rows();

        for (module, _, path) in MODULES {
            let count = rows.iter().filter(|(_, _, _, m)| m == module).count();
            assert!(count >= 5, "module {} is missing permissions", module);
            assert!(rows.iter().any(|(_, p, _, _)| p == path));
        }

        assert!(rows
            .iter()
            .any(|(_, p, m, _)| p == "/api/v1/email" && m == "POST"));
    }
}
