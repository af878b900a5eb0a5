//! Integration tests for ibit persistence and manual tag editing.

use knowledger_core::{
    CreateIbitRequest, Error, IbitRepository, ReplaceIbitRequest, TagKind, TagStore,
};
use knowledger_db::test_fixtures::TestDatabase;

#[tokio::test]
#[ignore] // Requires database connection
async fn test_insert_reconciles_and_deduplicates_candidates() {
    let test_db = TestDatabase::new().await;
    let tenant = test_db.create_tenant("alice").await;

    let ibit = test_db
        .ibits
        .insert(CreateIbitRequest {
            tenant_id: tenant,
            text: "Met Alice in Berlin on 2024-03-01, via NYT".to_string(),
            source: Some("NYT".to_string()),
            categories: vec!["Travel ".to_string(), "travel".to_string()],
            entities: vec!["Alice".to_string(), "Berlin".to_string(), "  ".to_string()],
            dates: vec!["2024-03-01".to_string()],
        })
        .await
        .unwrap();

    let full = test_db.ibits.fetch(tenant, ibit.id).await.unwrap();
    assert_eq!(full.ibit.source.as_deref(), Some("NYT"));
    // Both casings of "travel" normalize onto one category; the blank
    // entity candidate is skipped.
    assert_eq!(full.categories, vec!["travel".to_string()]);
    assert_eq!(
        full.entities,
        vec!["Alice".to_string(), "Berlin".to_string()]
    );
    assert_eq!(full.dates, vec!["2024-03-01".to_string()]);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires database connection
async fn test_repeat_ingestion_creates_no_duplicate_vocabulary() {
    let test_db = TestDatabase::new().await;
    let tenant = test_db.create_tenant("alice").await;

    for _ in 0..2 {
        test_db
            .ibits
            .insert(CreateIbitRequest {
                tenant_id: tenant,
                text: "Met Alice in Berlin on 2024-03-01, via NYT".to_string(),
                source: Some("NYT".to_string()),
                categories: vec!["travel".to_string()],
                entities: vec!["Alice".to_string(), "Berlin".to_string()],
                dates: vec!["2024-03-01".to_string()],
            })
            .await
            .unwrap();
    }

    assert_eq!(test_db.tags.list(tenant, TagKind::Category).await.unwrap().len(), 1);
    assert_eq!(test_db.tags.list(tenant, TagKind::Entity).await.unwrap().len(), 2);
    assert_eq!(test_db.tags.list(tenant, TagKind::Date).await.unwrap().len(), 1);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires database connection
async fn test_manual_tag_edit_detaches_but_never_deletes() {
    let test_db = TestDatabase::new().await;
    let tenant = test_db.create_tenant("alice").await;

    let ibit = test_db
        .ibits
        .insert(CreateIbitRequest {
            tenant_id: tenant,
            text: "note".to_string(),
            categories: vec!["c".to_string()],
            ..Default::default()
        })
        .await
        .unwrap();

    test_db
        .tags
        .set_for_ibit(
            tenant,
            ibit.id,
            TagKind::Category,
            vec!["a".to_string(), "b".to_string()],
        )
        .await
        .unwrap();

    let attached = test_db
        .tags
        .get_for_ibit(tenant, ibit.id, TagKind::Category)
        .await
        .unwrap();
    assert_eq!(attached, vec!["a".to_string(), "b".to_string()]);

    // "c" is detached but survives in the vocabulary.
    let vocabulary = test_db.tags.list(tenant, TagKind::Category).await.unwrap();
    let names: Vec<&str> = vocabulary.iter().map(|h| h.value.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires database connection
async fn test_replace_updates_text_source_and_all_tag_sets() {
    let test_db = TestDatabase::new().await;
    let tenant = test_db.create_tenant("alice").await;

    let ibit = test_db
        .ibits
        .insert(CreateIbitRequest {
            tenant_id: tenant,
            text: "old".to_string(),
            source: Some("old source".to_string()),
            entities: vec!["Old Entity".to_string()],
            ..Default::default()
        })
        .await
        .unwrap();

    test_db
        .ibits
        .replace(
            tenant,
            ibit.id,
            ReplaceIbitRequest {
                text: " new text ".to_string(),
                source: Some("  ".to_string()),
                categories: vec!["fresh".to_string()],
                entities: vec![],
                dates: vec!["2020".to_string()],
            },
        )
        .await
        .unwrap();

    let full = test_db.ibits.fetch(tenant, ibit.id).await.unwrap();
    assert_eq!(full.ibit.text, "new text");
    // Blank source collapses to none.
    assert_eq!(full.ibit.source, None);
    assert_eq!(full.categories, vec!["fresh".to_string()]);
    assert!(full.entities.is_empty());
    assert_eq!(full.dates, vec!["2020".to_string()]);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires database connection
async fn test_delete_cascades_associations_not_tag_rows() {
    let test_db = TestDatabase::new().await;
    let tenant = test_db.create_tenant("alice").await;

    let ibit = test_db
        .ibits
        .insert(CreateIbitRequest {
            tenant_id: tenant,
            text: "note".to_string(),
            categories: vec!["keep".to_string()],
            ..Default::default()
        })
        .await
        .unwrap();

    test_db.ibits.delete(tenant, ibit.id).await.unwrap();

    assert!(matches!(
        test_db.ibits.fetch(tenant, ibit.id).await,
        Err(Error::IbitNotFound(_))
    ));
    // The category row is orphaned, not purged.
    let vocabulary = test_db.tags.list(tenant, TagKind::Category).await.unwrap();
    assert_eq!(vocabulary.len(), 1);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires database connection
async fn test_fetch_is_tenant_scoped() {
    let test_db = TestDatabase::new().await;
    let t1 = test_db.create_tenant("alice").await;
    let t2 = test_db.create_tenant("bob").await;

    let ibit = test_db
        .ibits
        .insert(CreateIbitRequest {
            tenant_id: t1,
            text: "private".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    assert!(matches!(
        test_db.ibits.fetch(t2, ibit.id).await,
        Err(Error::IbitNotFound(_))
    ));

    test_db.cleanup().await;
}
