//! Transaction-aware tag resolution primitives.
//!
//! These `_tx` helpers accept an external transaction so that ingestion and
//! manual edit can compose find-or-create resolution and association changes
//! into a single all-or-nothing transaction. The pool-facing [`PgTagStore`]
//! methods and the ibit repository both build on them.
//!
//! [`PgTagStore`]: crate::tags::PgTagStore

use chrono::Utc;
use sqlx::{Postgres, Row, Transaction};
use uuid::Uuid;

use knowledger_core::{new_v7, Error, Result, TagHandle, TagKind};

/// Vocabulary table, value column, association table, and association column
/// for a tag kind.
pub(crate) fn tables_for(kind: TagKind) -> (&'static str, &'static str, &'static str, &'static str)
{
    match kind {
        TagKind::Category => ("category", "name", "ibit_category", "category_id"),
        TagKind::Entity => ("entity", "name", "ibit_entity", "entity_id"),
        TagKind::Date => ("date_tag", "value", "ibit_date", "date_id"),
    }
}

/// Find or create a vocabulary row for `(tenant, kind, value)` within a
/// transaction.
///
/// The value is normalized per kind first. The unique constraint on
/// `(tenant_id, value)` plus `ON CONFLICT DO NOTHING` makes this idempotent
/// and race-free: concurrent callers converge on one row.
///
/// Returns `InvalidInput` if the value is empty after normalization.
pub async fn resolve_or_create_tx(
    tx: &mut Transaction<'_, Postgres>,
    tenant_id: Uuid,
    kind: TagKind,
    value: &str,
) -> Result<TagHandle> {
    let normalized = kind.normalize(value);
    if normalized.is_empty() {
        return Err(Error::InvalidInput(format!(
            "empty {} value after normalization",
            kind
        )));
    }

    let (table, col, _, _) = tables_for(kind);

    sqlx::query(&format!(
        "INSERT INTO {table} (id, tenant_id, {col}, created_at_utc) VALUES ($1, $2, $3, $4)
         ON CONFLICT (tenant_id, {col}) DO NOTHING"
    ))
    .bind(new_v7())
    .bind(tenant_id)
    .bind(&normalized)
    .bind(Utc::now())
    .execute(&mut **tx)
    .await
    .map_err(Error::Database)?;

    let row = sqlx::query(&format!(
        "SELECT id, {col} AS value FROM {table} WHERE tenant_id = $1 AND {col} = $2"
    ))
    .bind(tenant_id)
    .bind(&normalized)
    .fetch_one(&mut **tx)
    .await
    .map_err(Error::Database)?;

    Ok(TagHandle {
        id: row.get("id"),
        value: row.get("value"),
    })
}

/// Link a tag to an ibit within a transaction.
///
/// Returns `true` if a new association row was created, `false` if the pair
/// was already linked.
pub async fn attach_tx(
    tx: &mut Transaction<'_, Postgres>,
    kind: TagKind,
    ibit_id: Uuid,
    tag_id: Uuid,
) -> Result<bool> {
    let (_, _, assoc, assoc_col) = tables_for(kind);

    let result = sqlx::query(&format!(
        "INSERT INTO {assoc} (ibit_id, {assoc_col}) VALUES ($1, $2) ON CONFLICT DO NOTHING"
    ))
    .bind(ibit_id)
    .bind(tag_id)
    .execute(&mut **tx)
    .await
    .map_err(Error::Database)?;

    Ok(result.rows_affected() > 0)
}

/// Detach every association of one kind from an ibit within a transaction.
///
/// The vocabulary rows themselves are left untouched.
pub async fn detach_all_tx(
    tx: &mut Transaction<'_, Postgres>,
    kind: TagKind,
    ibit_id: Uuid,
) -> Result<()> {
    let (_, _, assoc, _) = tables_for(kind);

    sqlx::query(&format!("DELETE FROM {assoc} WHERE ibit_id = $1"))
        .bind(ibit_id)
        .execute(&mut **tx)
        .await
        .map_err(Error::Database)?;

    Ok(())
}

/// Resolve each raw candidate and attach it to the ibit, skipping values that
/// are empty after normalization. Duplicate candidates collapse onto one
/// association via the conflict-free attach.
pub async fn reconcile_candidates_tx(
    tx: &mut Transaction<'_, Postgres>,
    tenant_id: Uuid,
    ibit_id: Uuid,
    kind: TagKind,
    candidates: &[String],
) -> Result<()> {
    for candidate in candidates {
        if candidate.trim().is_empty() {
            continue;
        }
        let handle = resolve_or_create_tx(tx, tenant_id, kind, candidate).await?;
        attach_tx(tx, kind, ibit_id, handle.id).await?;
    }
    Ok(())
}
