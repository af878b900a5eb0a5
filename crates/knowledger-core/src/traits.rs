//! Core traits for knowledger abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends and testability. Every
//! repository method is scoped to a tenant id; implementations must never
//! return or mutate rows belonging to another tenant.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// TENANT REPOSITORY
// =============================================================================

/// Repository for tenant lifecycle.
#[async_trait]
pub trait TenantRepository: Send + Sync {
    /// Create a new tenant namespace.
    async fn create(&self, display_name: &str) -> Result<Uuid>;

    /// Fetch a tenant by id.
    async fn get(&self, id: Uuid) -> Result<Tenant>;

    /// Delete a tenant and everything it owns (ibits, vocabulary,
    /// associations, quiz progress).
    async fn delete(&self, id: Uuid) -> Result<()>;
}

// =============================================================================
// IBIT REPOSITORY
// =============================================================================

/// Request for creating a new ibit with its reconciled tag candidates.
///
/// Candidate strings are raw; the repository trims, drops empty values, and
/// applies per-kind normalization before find-or-create resolution. The whole
/// insert (ibit row plus all associations) is one transaction.
#[derive(Debug, Clone, Default)]
pub struct CreateIbitRequest {
    pub tenant_id: Uuid,
    pub text: String,
    pub source: Option<String>,
    pub categories: Vec<String>,
    pub entities: Vec<String>,
    pub dates: Vec<String>,
}

/// Request for replacing an ibit's text, source, and full tag sets.
///
/// Used by the manual-edit path. Replaced associations are detached; the
/// vocabulary rows themselves are never deleted.
#[derive(Debug, Clone, Default)]
pub struct ReplaceIbitRequest {
    pub text: String,
    pub source: Option<String>,
    pub categories: Vec<String>,
    pub entities: Vec<String>,
    pub dates: Vec<String>,
}

/// Repository for ibit CRUD operations.
#[async_trait]
pub trait IbitRepository: Send + Sync {
    /// Insert a new ibit and attach its tags, all-or-nothing.
    async fn insert(&self, req: CreateIbitRequest) -> Result<Ibit>;

    /// Fetch an ibit with its attached tag values.
    async fn fetch(&self, tenant_id: Uuid, id: Uuid) -> Result<IbitFull>;

    /// List all ibits for a tenant, newest first, with attached tag values.
    async fn list(&self, tenant_id: Uuid) -> Result<Vec<IbitFull>>;

    /// List all ibit ids for a tenant (quiz rotation pool).
    async fn list_ids(&self, tenant_id: Uuid) -> Result<Vec<Uuid>>;

    /// Update the text of an ibit.
    async fn update_text(&self, tenant_id: Uuid, id: Uuid, text: &str) -> Result<()>;

    /// Replace text, source, and all three tag sets in one transaction.
    async fn replace(&self, tenant_id: Uuid, id: Uuid, req: ReplaceIbitRequest) -> Result<()>;

    /// Delete an ibit. Cascades its associations; tag rows survive.
    async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<()>;

    /// List ibits associated with a canonical entity name.
    async fn filter_by_entity(&self, tenant_id: Uuid, entity_name: &str) -> Result<Vec<IbitFull>>;
}

// =============================================================================
// TAG STORE
// =============================================================================

/// Store for the normalized per-tenant vocabulary of categories, entities,
/// and dates.
#[async_trait]
pub trait TagStore: Send + Sync {
    /// Find or create the vocabulary row for a value, idempotently.
    ///
    /// The value is normalized per kind before lookup. Calling twice with the
    /// same tenant and value returns the same handle and creates at most one
    /// row (closed with a unique constraint plus upsert).
    async fn resolve_or_create(
        &self,
        tenant_id: Uuid,
        kind: TagKind,
        value: &str,
    ) -> Result<TagHandle>;

    /// List the vocabulary for a tenant, ordered by value.
    ///
    /// Entity listings are canonical only: alias rows are excluded.
    async fn list(&self, tenant_id: Uuid, kind: TagKind) -> Result<Vec<TagHandle>>;

    /// Attach a tag value to an ibit, creating the vocabulary row if needed.
    ///
    /// Returns `true` if a new association was created, `false` if the ibit
    /// was already linked to the value.
    async fn add_to_ibit(
        &self,
        tenant_id: Uuid,
        ibit_id: Uuid,
        kind: TagKind,
        value: &str,
    ) -> Result<bool>;

    /// Replace all associations of one kind for an ibit.
    ///
    /// Detached vocabulary rows are not deleted; they may remain orphaned.
    async fn set_for_ibit(
        &self,
        tenant_id: Uuid,
        ibit_id: Uuid,
        kind: TagKind,
        values: Vec<String>,
    ) -> Result<()>;

    /// Get the tag values of one kind attached to an ibit, ordered by value.
    async fn get_for_ibit(&self, tenant_id: Uuid, ibit_id: Uuid, kind: TagKind)
        -> Result<Vec<String>>;
}

// =============================================================================
// ENTITY ALIAS GRAPH
// =============================================================================

/// Redirect layer over the entity vocabulary.
///
/// Merging `source` into `target` re-points every ibit association from
/// source to target (deduplicated) and records source as an alias of target.
/// The source row persists as a redirect marker. Merges are rejected when
/// they would create an alias chain: neither source nor target may already
/// be an alias. Aliases of the source follow it to the new canonical.
#[async_trait]
pub trait EntityAliasGraph: Send + Sync {
    /// Merge one entity into another.
    async fn merge(&self, tenant_id: Uuid, source_name: &str, target_name: &str) -> Result<()>;

    /// Resolve the canonical name an entity redirects to, if it is an alias.
    async fn canonical_of(&self, tenant_id: Uuid, entity_name: &str) -> Result<Option<String>>;

    /// List the alias names redirecting to a canonical entity.
    async fn aliases_of(&self, tenant_id: Uuid, entity_name: &str) -> Result<Vec<String>>;
}

// =============================================================================
// QUIZ PROGRESS
// =============================================================================

/// Per-tenant quiz rotation state: the set of ibit ids already shown since
/// the last full cycle.
#[async_trait]
pub trait QuizProgressRepository: Send + Sync {
    /// Get the set of already-shown ibit ids. Stale ids (deleted ibits) may
    /// be present and are harmless; callers subtract them from a recomputed
    /// full pool.
    async fn used_ids(&self, tenant_id: Uuid) -> Result<Vec<Uuid>>;

    /// Record that an ibit was shown.
    async fn record_shown(&self, tenant_id: Uuid, ibit_id: Uuid) -> Result<()>;

    /// Reset the rotation (start a new full cycle).
    async fn reset(&self, tenant_id: Uuid) -> Result<()>;
}

// =============================================================================
// INFERENCE
// =============================================================================

/// Backend for text generation (LLM).
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate a completion for the given prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate with an explicit system prompt.
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}
