//! # knowledger-db
//!
//! PostgreSQL database layer for knowledger.
//!
//! This crate provides:
//! - Connection pool management and migrations
//! - Repository implementations for tenants, ibits, and the three
//!   tag vocabularies (categories, entities, dates)
//! - Find-or-create tag resolution closed against duplicate-row races via
//!   unique constraints plus upsert
//! - The entity alias graph (merge with chain rejection)
//! - Quiz rotation state
//!
//! ## Example
//!
//! ```rust,ignore
//! use knowledger_core::{CreateIbitRequest, IbitRepository};
//! use knowledger_db::{create_pool, PgIbitRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool("postgres://localhost/knowledger").await?;
//!     let ibits = PgIbitRepository::new(pool);
//!
//!     let ibit = ibits.insert(CreateIbitRequest {
//!         tenant_id,
//!         text: "Met Alice in Berlin on 2024-03-01, via NYT".to_string(),
//!         source: Some("NYT".to_string()),
//!         categories: vec!["travel".to_string()],
//!         entities: vec!["Alice".to_string(), "Berlin".to_string()],
//!         dates: vec!["2024-03-01".to_string()],
//!     }).await?;
//!
//!     println!("Created ibit: {}", ibit.id);
//!     Ok(())
//! }
//! ```

pub mod aliases;
pub mod ibits;
pub mod pool;
pub mod quiz_progress;
pub mod tags;
mod tags_tx;
pub mod tenants;

// Test fixtures for integration tests.
// Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL.
pub mod test_fixtures;

// Re-export core types
pub use knowledger_core::*;

// Re-export repository implementations
pub use aliases::PgEntityAliasGraph;
pub use ibits::PgIbitRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, run_migrations, PoolConfig};
pub use quiz_progress::PgQuizProgressRepository;
pub use tags::PgTagStore;
pub use tags_tx::{attach_tx, detach_all_tx, reconcile_candidates_tx, resolve_or_create_tx};
pub use tenants::PgTenantRepository;
