//! Entity alias graph implementation.
//!
//! A thin redirect layer over the entity vocabulary. Merging entity A into
//! entity B re-points every ibit association from A to B and records A as an
//! alias of B in `entity_alias`. A's row persists so historical references
//! keep resolving.
//!
//! Chained merges are rejected outright: a merge fails if the source is
//! already an alias or if the target is itself an alias. Merging a canonical
//! that has aliases of its own re-points those aliases to the new canonical.
//! The redirect relation stays single-hop and cycle-free by construction.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row, Transaction};
use tracing::info;
use uuid::Uuid;

use knowledger_core::{EntityAliasGraph, Error, Result, TagKind};

/// PostgreSQL implementation of EntityAliasGraph.
pub struct PgEntityAliasGraph {
    pool: Pool<Postgres>,
}

impl PgEntityAliasGraph {
    /// Create a new PgEntityAliasGraph with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

async fn entity_id_by_name(
    tx: &mut Transaction<'_, Postgres>,
    tenant_id: Uuid,
    name: &str,
) -> Result<Uuid> {
    let row = sqlx::query("SELECT id FROM entity WHERE tenant_id = $1 AND name = $2")
        .bind(tenant_id)
        .bind(name)
        .fetch_optional(&mut **tx)
        .await
        .map_err(Error::Database)?
        .ok_or_else(|| Error::EntityNotFound(name.to_string()))?;

    Ok(row.get("id"))
}

async fn is_alias(tx: &mut Transaction<'_, Postgres>, entity_id: Uuid) -> Result<bool> {
    let row = sqlx::query("SELECT 1 AS one FROM entity_alias WHERE entity_id = $1")
        .bind(entity_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(Error::Database)?;
    Ok(row.is_some())
}

#[async_trait]
impl EntityAliasGraph for PgEntityAliasGraph {
    async fn merge(&self, tenant_id: Uuid, source_name: &str, target_name: &str) -> Result<()> {
        let source_name = TagKind::Entity.normalize(source_name);
        let target_name = TagKind::Entity.normalize(target_name);

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let source_id = entity_id_by_name(&mut tx, tenant_id, &source_name).await?;
        let target_id = entity_id_by_name(&mut tx, tenant_id, &target_name).await?;

        if source_id == target_id {
            return Err(Error::SelfMerge(source_name));
        }
        if is_alias(&mut tx, source_id).await? {
            return Err(Error::AliasChain(format!(
                "source '{}' is already an alias",
                source_name
            )));
        }
        if is_alias(&mut tx, target_id).await? {
            return Err(Error::AliasChain(format!(
                "target '{}' is already an alias",
                target_name
            )));
        }

        // Re-point associations, skipping ibits already linked to the target.
        sqlx::query(
            "INSERT INTO ibit_entity (ibit_id, entity_id)
             SELECT ibit_id, $1 FROM ibit_entity WHERE entity_id = $2
             ON CONFLICT DO NOTHING",
        )
        .bind(target_id)
        .bind(source_id)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;

        sqlx::query("DELETE FROM ibit_entity WHERE entity_id = $1")
            .bind(source_id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        // Aliases already pointing at the source follow it to the new
        // canonical, keeping every redirect single-hop.
        sqlx::query("UPDATE entity_alias SET canonical_id = $1 WHERE canonical_id = $2")
            .bind(target_id)
            .bind(source_id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        sqlx::query(
            "INSERT INTO entity_alias (entity_id, canonical_id, created_at_utc)
             VALUES ($1, $2, $3)",
        )
        .bind(source_id)
        .bind(target_id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "alias_graph",
            op = "merge",
            tenant_id = %tenant_id,
            "Merged entity '{}' into '{}'",
            source_name,
            target_name
        );
        Ok(())
    }

    async fn canonical_of(&self, tenant_id: Uuid, entity_name: &str) -> Result<Option<String>> {
        let name = TagKind::Entity.normalize(entity_name);

        let row = sqlx::query(
            "SELECT c.name FROM entity e
             JOIN entity_alias ea ON ea.entity_id = e.id
             JOIN entity c ON c.id = ea.canonical_id
             WHERE e.tenant_id = $1 AND e.name = $2",
        )
        .bind(tenant_id)
        .bind(&name)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(|r| r.get("name")))
    }

    async fn aliases_of(&self, tenant_id: Uuid, entity_name: &str) -> Result<Vec<String>> {
        let name = TagKind::Entity.normalize(entity_name);

        let rows = sqlx::query(
            "SELECT a.name FROM entity c
             JOIN entity_alias ea ON ea.canonical_id = c.id
             JOIN entity a ON a.id = ea.entity_id
             WHERE c.tenant_id = $1 AND c.name = $2
             ORDER BY a.name",
        )
        .bind(tenant_id)
        .bind(&name)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(|r| r.get("name")).collect())
    }
}
