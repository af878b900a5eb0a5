//! Tag store implementation.
//!
//! Owns the normalized per-tenant vocabulary of categories, entities, and
//! dates and resolves find-or-create semantics. Uniqueness is enforced by
//! the `(tenant_id, value)` constraints; resolution upserts against them so
//! concurrent ingestion for the same tenant cannot produce duplicate rows.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use tracing::debug;
use uuid::Uuid;

use knowledger_core::{Error, Result, TagHandle, TagKind, TagStore};

use crate::tags_tx::{attach_tx, detach_all_tx, resolve_or_create_tx, tables_for};

/// PostgreSQL implementation of TagStore.
pub struct PgTagStore {
    pool: Pool<Postgres>,
}

impl PgTagStore {
    /// Create a new PgTagStore with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TagStore for PgTagStore {
    async fn resolve_or_create(
        &self,
        tenant_id: Uuid,
        kind: TagKind,
        value: &str,
    ) -> Result<TagHandle> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let handle = resolve_or_create_tx(&mut tx, tenant_id, kind, value).await?;
        tx.commit().await.map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "tag_store",
            op = "resolve_or_create",
            tenant_id = %tenant_id,
            tag_kind = %kind,
            "Resolved tag '{}'",
            handle.value
        );
        Ok(handle)
    }

    async fn list(&self, tenant_id: Uuid, kind: TagKind) -> Result<Vec<TagHandle>> {
        let (table, col, _, _) = tables_for(kind);

        // Alias entities are redirect markers, not canonical vocabulary.
        let query = match kind {
            TagKind::Entity => format!(
                "SELECT t.id, t.{col} AS value FROM {table} t
                 WHERE t.tenant_id = $1
                   AND NOT EXISTS (SELECT 1 FROM entity_alias ea WHERE ea.entity_id = t.id)
                 ORDER BY t.{col}"
            ),
            _ => format!(
                "SELECT t.id, t.{col} AS value FROM {table} t
                 WHERE t.tenant_id = $1 ORDER BY t.{col}"
            ),
        };

        let rows = sqlx::query(&query)
            .bind(tenant_id)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|row| TagHandle {
                id: row.get("id"),
                value: row.get("value"),
            })
            .collect())
    }

    async fn add_to_ibit(
        &self,
        tenant_id: Uuid,
        ibit_id: Uuid,
        kind: TagKind,
        value: &str,
    ) -> Result<bool> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        ensure_ibit_owned(&mut tx, tenant_id, ibit_id).await?;
        let handle = resolve_or_create_tx(&mut tx, tenant_id, kind, value).await?;
        let created = attach_tx(&mut tx, kind, ibit_id, handle.id).await?;

        tx.commit().await.map_err(Error::Database)?;
        Ok(created)
    }

    async fn set_for_ibit(
        &self,
        tenant_id: Uuid,
        ibit_id: Uuid,
        kind: TagKind,
        values: Vec<String>,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        ensure_ibit_owned(&mut tx, tenant_id, ibit_id).await?;
        detach_all_tx(&mut tx, kind, ibit_id).await?;
        for value in &values {
            if value.trim().is_empty() {
                continue;
            }
            let handle = resolve_or_create_tx(&mut tx, tenant_id, kind, value).await?;
            attach_tx(&mut tx, kind, ibit_id, handle.id).await?;
        }

        tx.commit().await.map_err(Error::Database)?;
        Ok(())
    }

    async fn get_for_ibit(
        &self,
        tenant_id: Uuid,
        ibit_id: Uuid,
        kind: TagKind,
    ) -> Result<Vec<String>> {
        let (table, col, assoc, assoc_col) = tables_for(kind);

        let rows = sqlx::query(&format!(
            "SELECT t.{col} AS value FROM {table} t
             JOIN {assoc} a ON a.{assoc_col} = t.id
             WHERE a.ibit_id = $1 AND t.tenant_id = $2
             ORDER BY t.{col}"
        ))
        .bind(ibit_id)
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(|row| row.get("value")).collect())
    }
}

/// Verify an ibit exists and belongs to the tenant before touching its
/// associations. Cross-tenant association is a consistency violation.
pub(crate) async fn ensure_ibit_owned(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    tenant_id: Uuid,
    ibit_id: Uuid,
) -> Result<()> {
    let row = sqlx::query("SELECT 1 AS one FROM ibit WHERE id = $1 AND tenant_id = $2")
        .bind(ibit_id)
        .bind(tenant_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(Error::Database)?;

    if row.is_none() {
        return Err(Error::IbitNotFound(ibit_id));
    }
    Ok(())
}
