use chrono::{DateTime, Utc};
use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{ActorId, PayoutAccount},
    traits::AccountApiError,
};

pub async fn fetch_payout_account(
    actor_id: &ActorId,
    conn: &mut SqliteConnection,
) -> Result<Option<PayoutAccount>, AccountApiError> {
    let account = sqlx::query_as::<_, PayoutAccount>(
        "SELECT actor_id, external_account_id, created_at, updated_at FROM payout_accounts WHERE actor_id = $1",
    )
    .bind(actor_id)
    .fetch_optional(conn)
    .await?;
    Ok(account)
}

pub async fn upsert_payout_account(
    actor_id: &ActorId,
    external_account_id: &str,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<PayoutAccount, AccountApiError> {
    let account = sqlx::query_as::<_, PayoutAccount>(
        r#"INSERT INTO payout_accounts (actor_id, external_account_id, created_at, updated_at) VALUES ($1, $2, $3, $4)
        ON CONFLICT (actor_id) DO UPDATE SET external_account_id = excluded.external_account_id,
        updated_at = excluded.updated_at
        RETURNING actor_id, external_account_id, created_at, updated_at"#,
    )
    .bind(actor_id)
    .bind(external_account_id)
    .bind(now)
    .bind(now)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Payout account for {actor_id} is now {external_account_id}");
    Ok(account)
}
