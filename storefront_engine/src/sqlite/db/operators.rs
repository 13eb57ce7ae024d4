use chrono::{DateTime, Utc};
use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{ActorId, Permission, ProviderId},
    traits::AccountApiError,
};

pub async fn fetch_permissions(
    provider_id: &ProviderId,
    actor_id: &ActorId,
    conn: &mut SqliteConnection,
) -> Result<Vec<Permission>, AccountApiError> {
    let permissions = sqlx::query_scalar::<_, Permission>(
        "SELECT permission FROM provider_operators WHERE provider_id = $1 AND actor_id = $2",
    )
    .bind(provider_id)
    .bind(actor_id)
    .fetch_all(conn)
    .await?;
    Ok(permissions)
}

pub async fn grant_permission(
    provider_id: &ProviderId,
    actor_id: &ActorId,
    permission: Permission,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<(), AccountApiError> {
    sqlx::query(
        r#"INSERT INTO provider_operators (provider_id, actor_id, permission, created_at) VALUES ($1, $2, $3, $4)
        ON CONFLICT DO NOTHING"#,
    )
    .bind(provider_id)
    .bind(actor_id)
    .bind(permission)
    .bind(now)
    .execute(conn)
    .await?;
    debug!("🗃️ {actor_id} granted {permission} on provider {provider_id}");
    Ok(())
}
