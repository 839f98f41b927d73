use chrono::NaiveDate;
use sea_orm::{Database, DatabaseConnection, EntityTrait, PaginatorTrait};
use uuid::Uuid;

use engine::{BudgetItem, Engine, EngineError, Grant, GrantDraft, TransactionRecord};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn grant_with_item(engine: &Engine) -> (Grant, BudgetItem) {
    let grant = engine
        .create_grant(GrantDraft {
            name: "地域活性化助成".to_string(),
            ..GrantDraft::default()
        })
        .await
        .unwrap();
    let item = engine
        .create_budget_item(grant.id, "人件費", Some("運営"), Some(500_000), None)
        .await
        .unwrap();
    (grant, item)
}

fn record(detail_id: i64) -> TransactionRecord {
    TransactionRecord {
        detail_id,
        free_deal_id: detail_id / 10,
        journal_number: detail_id / 10,
        journal_line_number: 1,
        date: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
        amount: 3000,
        description: None,
        account: "雑費".to_string(),
        supplier: None,
        memo_tags: None,
    }
}

#[tokio::test]
async fn create_rejects_zero_amount_and_missing_budget_item() {
    let (engine, _db) = engine_with_db().await;
    let (_grant, item) = grant_with_item(&engine).await;

    let err = engine
        .create_allocation(item.id, 0, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = engine
        .create_allocation(Uuid::new_v4(), 1000, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn unknown_detail_id_is_allowed_at_creation() {
    let (engine, _db) = engine_with_db().await;
    let (_grant, item) = grant_with_item(&engine).await;

    // No transaction bears 12345; the weak reference is stored anyway.
    let split = engine
        .create_allocation(item.id, 1000, Some(12345), Some("前倒し入力"))
        .await
        .unwrap();
    assert_eq!(split.detail_id, Some(12345));
    assert_eq!(engine.allocations_for_detail(12345).await.unwrap(), vec![split]);
}

#[tokio::test]
async fn orphans_are_listed_and_rebindable() {
    let (engine, _db) = engine_with_db().await;
    let (_grant, item) = grant_with_item(&engine).await;

    engine.upsert_transaction(&record(9001)).await.unwrap();
    let orphan = engine
        .create_allocation(item.id, 2000, None, None)
        .await
        .unwrap();
    let bound = engine
        .create_allocation(item.id, 1000, Some(9001), None)
        .await
        .unwrap();

    let orphans = engine.list_orphaned_allocations().await.unwrap();
    assert_eq!(orphans, vec![orphan.clone()]);
    assert!(!orphans.contains(&bound));

    let rebound = engine.rebind_allocation(orphan.id, 9001).await.unwrap();
    assert_eq!(rebound.detail_id, Some(9001));
    assert!(engine.list_orphaned_allocations().await.unwrap().is_empty());
    assert_eq!(engine.allocations_for_detail(9001).await.unwrap().len(), 2);
}

#[tokio::test]
async fn failed_rebind_leaves_previous_binding_untouched() {
    let (engine, _db) = engine_with_db().await;
    let (_grant, item) = grant_with_item(&engine).await;

    engine.upsert_transaction(&record(9001)).await.unwrap();
    let split = engine
        .create_allocation(item.id, 1000, Some(9001), None)
        .await
        .unwrap();

    let err = engine.rebind_allocation(split.id, 77777).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let kept = engine.allocations_for_detail(9001).await.unwrap();
    assert_eq!(kept, vec![split]);
}

#[tokio::test]
async fn rebind_of_unknown_allocation_fails() {
    let (engine, _db) = engine_with_db().await;

    engine.upsert_transaction(&record(9001)).await.unwrap();
    let err = engine
        .rebind_allocation(Uuid::new_v4(), 9001)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn update_changes_amount_note_and_target_item() {
    let (engine, _db) = engine_with_db().await;
    let (grant, item) = grant_with_item(&engine).await;
    let other = engine
        .create_budget_item(grant.id, "旅費", None, None, None)
        .await
        .unwrap();

    let split = engine
        .create_allocation(item.id, 1000, None, Some("first"))
        .await
        .unwrap();
    let updated = engine
        .update_allocation(split.id, 2500, Some("second"), other.id)
        .await
        .unwrap();
    assert_eq!(updated.amount, 2500);
    assert_eq!(updated.note.as_deref(), Some("second"));
    assert_eq!(updated.budget_item_id, other.id);
}

#[tokio::test]
async fn delete_removes_split_once() {
    let (engine, _db) = engine_with_db().await;
    let (_grant, item) = grant_with_item(&engine).await;

    let split = engine
        .create_allocation(item.id, 1000, None, None)
        .await
        .unwrap();
    engine.delete_allocation(split.id).await.unwrap();
    let err = engine.delete_allocation(split.id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn reset_requires_confirmation_and_wipes_both_tables() {
    let (engine, db) = engine_with_db().await;
    let (_grant, item) = grant_with_item(&engine).await;

    engine.upsert_transaction(&record(9001)).await.unwrap();
    engine.upsert_transaction(&record(9002)).await.unwrap();
    engine
        .create_allocation(item.id, 1000, Some(9001), None)
        .await
        .unwrap();

    let err = engine.reset_all_transactions(false).await.unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let summary = engine.reset_all_transactions(true).await.unwrap();
    assert_eq!(summary.transactions_deleted, 2);
    assert_eq!(summary.allocations_deleted, 1);

    let transactions = engine::transactions::Entity::find().count(&db).await.unwrap();
    let allocations = engine::allocation_splits::Entity::find()
        .count(&db)
        .await
        .unwrap();
    assert_eq!(transactions, 0);
    assert_eq!(allocations, 0);

    // Budget structure is untouched by a reset.
    assert_eq!(engine.list_grants().await.unwrap().len(), 1);
}

#[tokio::test]
async fn budget_items_keep_insertion_order_until_reordered() {
    let (engine, _db) = engine_with_db().await;
    let grant = engine
        .create_grant(GrantDraft {
            name: "設備整備補助".to_string(),
            ..GrantDraft::default()
        })
        .await
        .unwrap();

    let a = engine
        .create_budget_item(grant.id, "A", None, None, None)
        .await
        .unwrap();
    let b = engine
        .create_budget_item(grant.id, "B", None, None, None)
        .await
        .unwrap();
    let c = engine
        .create_budget_item(grant.id, "C", None, None, None)
        .await
        .unwrap();
    assert_eq!(
        engine
            .list_budget_items(grant.id)
            .await
            .unwrap()
            .iter()
            .map(|i| i.id)
            .collect::<Vec<_>>(),
        vec![a.id, b.id, c.id]
    );

    engine
        .reorder_budget_items(grant.id, &[c.id, a.id, b.id])
        .await
        .unwrap();
    assert_eq!(
        engine
            .list_budget_items(grant.id)
            .await
            .unwrap()
            .iter()
            .map(|i| i.id)
            .collect::<Vec<_>>(),
        vec![c.id, a.id, b.id]
    );
}

#[tokio::test]
async fn partial_reorder_is_rejected_and_changes_nothing() {
    let (engine, _db) = engine_with_db().await;
    let grant = engine
        .create_grant(GrantDraft {
            name: "設備整備補助".to_string(),
            ..GrantDraft::default()
        })
        .await
        .unwrap();
    let a = engine
        .create_budget_item(grant.id, "A", None, None, None)
        .await
        .unwrap();
    let b = engine
        .create_budget_item(grant.id, "B", None, None, None)
        .await
        .unwrap();

    let err = engine
        .reorder_budget_items(grant.id, &[b.id])
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = engine
        .reorder_budget_items(grant.id, &[b.id, Uuid::new_v4()])
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    assert_eq!(
        engine
            .list_budget_items(grant.id)
            .await
            .unwrap()
            .iter()
            .map(|i| i.id)
            .collect::<Vec<_>>(),
        vec![a.id, b.id]
    );
}
