//! Integration tests for entity merging and the redirect relation.

use knowledger_core::{
    CreateIbitRequest, EntityAliasGraph, Error, IbitRepository, TagKind, TagStore,
};
use knowledger_db::test_fixtures::TestDatabase;
use uuid::Uuid;

async fn ingest_with_entities(test_db: &TestDatabase, tenant: Uuid, text: &str, entities: &[&str]) {
    test_db
        .ibits
        .insert(CreateIbitRequest {
            tenant_id: tenant,
            text: text.to_string(),
            entities: entities.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        })
        .await
        .unwrap();
}

#[tokio::test]
#[ignore] // Requires database connection
async fn test_merge_preserves_coverage_without_duplicates() {
    let test_db = TestDatabase::new().await;
    let tenant = test_db.create_tenant("alice").await;

    ingest_with_entities(&test_db, tenant, "only NYC", &["NYC"]).await;
    ingest_with_entities(&test_db, tenant, "only New York", &["New York"]).await;
    ingest_with_entities(&test_db, tenant, "both", &["NYC", "New York"]).await;

    test_db.aliases.merge(tenant, "NYC", "New York").await.unwrap();

    // Every ibit formerly linked to NYC is now linked to New York.
    let linked = test_db
        .ibits
        .filter_by_entity(tenant, "New York")
        .await
        .unwrap();
    assert_eq!(linked.len(), 3);
    for full in &linked {
        // Duplicate-free association set.
        assert_eq!(
            full.entities.iter().filter(|e| *e == "New York").count(),
            1
        );
        assert!(!full.entities.contains(&"NYC".to_string()));
    }

    // Source persists only as a redirect marker.
    let canonical = test_db.aliases.canonical_of(tenant, "NYC").await.unwrap();
    assert_eq!(canonical.as_deref(), Some("New York"));
    let aliases = test_db.aliases.aliases_of(tenant, "New York").await.unwrap();
    assert_eq!(aliases, vec!["NYC".to_string()]);

    // Alias rows are excluded from canonical listings.
    let listing = test_db.tags.list(tenant, TagKind::Entity).await.unwrap();
    assert!(listing.iter().all(|h| h.value != "NYC"));
    assert!(listing.iter().any(|h| h.value == "New York"));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires database connection
async fn test_merge_rejects_self_merge() {
    let test_db = TestDatabase::new().await;
    let tenant = test_db.create_tenant("alice").await;

    ingest_with_entities(&test_db, tenant, "note", &["Berlin"]).await;

    let result = test_db.aliases.merge(tenant, "Berlin", " Berlin ").await;
    assert!(matches!(result, Err(Error::SelfMerge(_))));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires database connection
async fn test_merge_rejects_unknown_entity() {
    let test_db = TestDatabase::new().await;
    let tenant = test_db.create_tenant("alice").await;

    ingest_with_entities(&test_db, tenant, "note", &["Berlin"]).await;

    let result = test_db.aliases.merge(tenant, "Berlin", "Munich").await;
    assert!(matches!(result, Err(Error::EntityNotFound(_))));

    let result = test_db.aliases.merge(tenant, "Hamburg", "Berlin").await;
    assert!(matches!(result, Err(Error::EntityNotFound(_))));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires database connection
async fn test_merge_rejects_alias_chains() {
    let test_db = TestDatabase::new().await;
    let tenant = test_db.create_tenant("alice").await;

    ingest_with_entities(&test_db, tenant, "note", &["A", "B", "C"]).await;

    test_db.aliases.merge(tenant, "A", "B").await.unwrap();

    // A is already an alias: it can be neither source nor target again.
    let result = test_db.aliases.merge(tenant, "A", "C").await;
    assert!(matches!(result, Err(Error::AliasChain(_))));
    let result = test_db.aliases.merge(tenant, "C", "A").await;
    assert!(matches!(result, Err(Error::AliasChain(_))));

    // B stays mergeable as a source; its own aliases follow it, so the
    // graph remains single-hop.
    test_db.aliases.merge(tenant, "B", "C").await.unwrap();
    let canonical = test_db.aliases.canonical_of(tenant, "B").await.unwrap();
    assert_eq!(canonical.as_deref(), Some("C"));
    let canonical = test_db.aliases.canonical_of(tenant, "A").await.unwrap();
    assert_eq!(canonical.as_deref(), Some("C"));

    let mut aliases = test_db.aliases.aliases_of(tenant, "C").await.unwrap();
    aliases.sort();
    assert_eq!(aliases, vec!["A".to_string(), "B".to_string()]);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires database connection
async fn test_merge_is_tenant_scoped() {
    let test_db = TestDatabase::new().await;
    let t1 = test_db.create_tenant("alice").await;
    let t2 = test_db.create_tenant("bob").await;

    ingest_with_entities(&test_db, t1, "note", &["Alice"]).await;
    ingest_with_entities(&test_db, t2, "note", &["Alice", "Bob"]).await;

    // t2's merge does not see or touch t1's vocabulary.
    test_db.aliases.merge(t2, "Alice", "Bob").await.unwrap();

    let t1_listing = test_db.tags.list(t1, TagKind::Entity).await.unwrap();
    assert!(t1_listing.iter().any(|h| h.value == "Alice"));

    test_db.cleanup().await;
}
