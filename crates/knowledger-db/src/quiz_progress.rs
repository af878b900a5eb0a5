//! Quiz rotation state repository.
//!
//! Stores the per-tenant set of ibit ids already shown since the last full
//! cycle as a proper set-valued column (`UUID[]`). Stale ids left behind by
//! deleted ibits are tolerated; the quiz generator subtracts the set from a
//! freshly computed pool on every draw.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use knowledger_core::{Error, QuizProgressRepository, Result};

/// PostgreSQL implementation of QuizProgressRepository.
pub struct PgQuizProgressRepository {
    pool: Pool<Postgres>,
}

impl PgQuizProgressRepository {
    /// Create a new PgQuizProgressRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuizProgressRepository for PgQuizProgressRepository {
    async fn used_ids(&self, tenant_id: Uuid) -> Result<Vec<Uuid>> {
        let row = sqlx::query("SELECT used_ibit_ids FROM quiz_progress WHERE tenant_id = $1")
            .bind(tenant_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row
            .map(|r| r.get::<Vec<Uuid>, _>("used_ibit_ids"))
            .unwrap_or_default())
    }

    async fn record_shown(&self, tenant_id: Uuid, ibit_id: Uuid) -> Result<()> {
        sqlx::query(
            "INSERT INTO quiz_progress (tenant_id, used_ibit_ids, updated_at_utc)
             VALUES ($1, ARRAY[$2]::uuid[], $3)
             ON CONFLICT (tenant_id) DO UPDATE
             SET used_ibit_ids = array_append(quiz_progress.used_ibit_ids, $2),
                 updated_at_utc = $3
             WHERE NOT quiz_progress.used_ibit_ids @> ARRAY[$2]::uuid[]",
        )
        .bind(tenant_id)
        .bind(ibit_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(())
    }

    async fn reset(&self, tenant_id: Uuid) -> Result<()> {
        sqlx::query(
            "UPDATE quiz_progress SET used_ibit_ids = '{}', updated_at_utc = $2
             WHERE tenant_id = $1",
        )
        .bind(tenant_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(())
    }
}
