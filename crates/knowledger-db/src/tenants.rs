//! Tenant repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use tracing::info;
use uuid::Uuid;

use knowledger_core::{new_v7, Error, Result, Tenant, TenantRepository};

/// PostgreSQL implementation of TenantRepository.
pub struct PgTenantRepository {
    pool: Pool<Postgres>,
}

impl PgTenantRepository {
    /// Create a new PgTenantRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantRepository for PgTenantRepository {
    async fn create(&self, display_name: &str) -> Result<Uuid> {
        let id = new_v7();

        sqlx::query("INSERT INTO tenant (id, display_name, created_at_utc) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(display_name)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "tenants",
            op = "create",
            tenant_id = %id,
            "Tenant created"
        );
        Ok(id)
    }

    async fn get(&self, id: Uuid) -> Result<Tenant> {
        let row = sqlx::query("SELECT id, display_name, created_at_utc FROM tenant WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or(Error::TenantNotFound(id))?;

        Ok(Tenant {
            id: row.get("id"),
            display_name: row.get("display_name"),
            created_at_utc: row.get("created_at_utc"),
        })
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        // ON DELETE CASCADE takes everything the tenant owns with it.
        let result = sqlx::query("DELETE FROM tenant WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::TenantNotFound(id));
        }

        info!(
            subsystem = "db",
            component = "tenants",
            op = "delete",
            tenant_id = %id,
            "Tenant deleted"
        );
        Ok(())
    }
}
