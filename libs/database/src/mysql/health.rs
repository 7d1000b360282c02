use sea_orm::{ConnectionTrait, DatabaseConnection};

use crate::common::{DatabaseError, DatabaseResult};

/// Check MySQL connectivity by issuing a trivial query.
///
/// Used by the `/ready` endpoint to report database health.
pub async fn check_health(db: &DatabaseConnection) -> DatabaseResult<()> {
    db.execute_unprepared("SELECT 1")
        .await
        .map_err(|e| DatabaseError::HealthCheckFailed(e.to_string()))?;

    Ok(())
}
