//! Ibit repository implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use tracing::{debug, info};
use uuid::Uuid;

use knowledger_core::{
    new_v7, CreateIbitRequest, Error, Ibit, IbitFull, IbitRepository, ReplaceIbitRequest, Result,
    TagKind,
};

use crate::tags::ensure_ibit_owned;
use crate::tags_tx::{detach_all_tx, reconcile_candidates_tx, tables_for};

/// PostgreSQL implementation of IbitRepository.
pub struct PgIbitRepository {
    pool: Pool<Postgres>,
}

impl PgIbitRepository {
    /// Create a new PgIbitRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Load attached tag values of one kind for a batch of ibits.
    async fn tags_for_ibits(
        &self,
        ids: &[Uuid],
        kind: TagKind,
    ) -> Result<HashMap<Uuid, Vec<String>>> {
        let (table, col, assoc, assoc_col) = tables_for(kind);

        let rows = sqlx::query(&format!(
            "SELECT a.ibit_id, t.{col} AS value FROM {assoc} a
             JOIN {table} t ON t.id = a.{assoc_col}
             WHERE a.ibit_id = ANY($1)
             ORDER BY t.{col}"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let mut by_ibit: HashMap<Uuid, Vec<String>> = HashMap::new();
        for row in rows {
            by_ibit
                .entry(row.get("ibit_id"))
                .or_default()
                .push(row.get("value"));
        }
        Ok(by_ibit)
    }

    /// Attach tag values to a batch of bare ibit rows.
    async fn hydrate(&self, ibits: Vec<Ibit>) -> Result<Vec<IbitFull>> {
        let ids: Vec<Uuid> = ibits.iter().map(|i| i.id).collect();

        let mut categories = self.tags_for_ibits(&ids, TagKind::Category).await?;
        let mut entities = self.tags_for_ibits(&ids, TagKind::Entity).await?;
        let mut dates = self.tags_for_ibits(&ids, TagKind::Date).await?;

        Ok(ibits
            .into_iter()
            .map(|ibit| {
                let id = ibit.id;
                IbitFull {
                    ibit,
                    categories: categories.remove(&id).unwrap_or_default(),
                    entities: entities.remove(&id).unwrap_or_default(),
                    dates: dates.remove(&id).unwrap_or_default(),
                }
            })
            .collect())
    }
}

fn ibit_from_row(row: &sqlx::postgres::PgRow) -> Ibit {
    Ibit {
        id: row.get("id"),
        tenant_id: row.get("tenant_id"),
        text: row.get("text"),
        source: row.get("source"),
        created_at_utc: row.get("created_at_utc"),
    }
}

#[async_trait]
impl IbitRepository for PgIbitRepository {
    async fn insert(&self, req: CreateIbitRequest) -> Result<Ibit> {
        let id = new_v7();
        let now = Utc::now();

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        sqlx::query(
            "INSERT INTO ibit (id, tenant_id, text, source, created_at_utc)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(id)
        .bind(req.tenant_id)
        .bind(&req.text)
        .bind(&req.source)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;

        reconcile_candidates_tx(&mut tx, req.tenant_id, id, TagKind::Category, &req.categories)
            .await?;
        reconcile_candidates_tx(&mut tx, req.tenant_id, id, TagKind::Entity, &req.entities)
            .await?;
        reconcile_candidates_tx(&mut tx, req.tenant_id, id, TagKind::Date, &req.dates).await?;

        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "ibits",
            op = "insert",
            tenant_id = %req.tenant_id,
            ibit_id = %id,
            candidate_count =
                req.categories.len() + req.entities.len() + req.dates.len(),
            "Ibit stored"
        );

        Ok(Ibit {
            id,
            tenant_id: req.tenant_id,
            text: req.text,
            source: req.source,
            created_at_utc: now,
        })
    }

    async fn fetch(&self, tenant_id: Uuid, id: Uuid) -> Result<IbitFull> {
        let row = sqlx::query(
            "SELECT id, tenant_id, text, source, created_at_utc
             FROM ibit WHERE id = $1 AND tenant_id = $2",
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .ok_or(Error::IbitNotFound(id))?;

        let mut full = self.hydrate(vec![ibit_from_row(&row)]).await?;
        Ok(full.remove(0))
    }

    async fn list(&self, tenant_id: Uuid) -> Result<Vec<IbitFull>> {
        let rows = sqlx::query(
            "SELECT id, tenant_id, text, source, created_at_utc
             FROM ibit WHERE tenant_id = $1
             ORDER BY created_at_utc DESC",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let ibits = rows.iter().map(ibit_from_row).collect();
        self.hydrate(ibits).await
    }

    async fn list_ids(&self, tenant_id: Uuid) -> Result<Vec<Uuid>> {
        let rows = sqlx::query("SELECT id FROM ibit WHERE tenant_id = $1")
            .bind(tenant_id)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(rows.into_iter().map(|row| row.get("id")).collect())
    }

    async fn update_text(&self, tenant_id: Uuid, id: Uuid, text: &str) -> Result<()> {
        let result = sqlx::query("UPDATE ibit SET text = $1 WHERE id = $2 AND tenant_id = $3")
            .bind(text)
            .bind(id)
            .bind(tenant_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::IbitNotFound(id));
        }
        Ok(())
    }

    async fn replace(&self, tenant_id: Uuid, id: Uuid, req: ReplaceIbitRequest) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        ensure_ibit_owned(&mut tx, tenant_id, id).await?;

        sqlx::query("UPDATE ibit SET text = $1, source = $2 WHERE id = $3")
            .bind(req.text.trim())
            .bind(req.source.as_deref().map(str::trim).filter(|s| !s.is_empty()))
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        // Replace-all semantics: detach everything, then reattach. Vocabulary
        // rows detached here survive as orphans.
        for kind in [TagKind::Category, TagKind::Entity, TagKind::Date] {
            detach_all_tx(&mut tx, kind, id).await?;
        }
        reconcile_candidates_tx(&mut tx, tenant_id, id, TagKind::Category, &req.categories)
            .await?;
        reconcile_candidates_tx(&mut tx, tenant_id, id, TagKind::Entity, &req.entities).await?;
        reconcile_candidates_tx(&mut tx, tenant_id, id, TagKind::Date, &req.dates).await?;

        tx.commit().await.map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "ibits",
            op = "replace",
            tenant_id = %tenant_id,
            ibit_id = %id,
            "Ibit replaced"
        );
        Ok(())
    }

    async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM ibit WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::IbitNotFound(id));
        }

        info!(
            subsystem = "db",
            component = "ibits",
            op = "delete",
            tenant_id = %tenant_id,
            ibit_id = %id,
            "Ibit deleted"
        );
        Ok(())
    }

    async fn filter_by_entity(&self, tenant_id: Uuid, entity_name: &str) -> Result<Vec<IbitFull>> {
        let name = TagKind::Entity.normalize(entity_name);

        let entity = sqlx::query("SELECT id FROM entity WHERE tenant_id = $1 AND name = $2")
            .bind(tenant_id)
            .bind(&name)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or_else(|| Error::EntityNotFound(name.clone()))?;

        let entity_id: Uuid = entity.get("id");

        let rows = sqlx::query(
            "SELECT i.id, i.tenant_id, i.text, i.source, i.created_at_utc
             FROM ibit i
             JOIN ibit_entity ie ON ie.ibit_id = i.id
             WHERE ie.entity_id = $1 AND i.tenant_id = $2
             ORDER BY i.created_at_utc DESC",
        )
        .bind(entity_id)
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let ibits = rows.iter().map(ibit_from_row).collect();
        self.hydrate(ibits).await
    }
}
