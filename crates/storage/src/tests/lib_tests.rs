use super::*;

#[tokio::test]
async fn inserts_and_lists_expenses_in_id_order() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let coffee = storage
        .insert_expense("Coffee", 4.5, "Food")
        .await
        .expect("coffee");
    let bus = storage
        .insert_expense("Bus", 2.0, "Travel")
        .await
        .expect("bus");
    assert!(bus > coffee);

    let expenses = storage.list_expenses().await.expect("list");
    assert_eq!(expenses.len(), 2);
    assert_eq!(expenses[0].id, coffee);
    assert_eq!(expenses[0].title, "Coffee");
    assert_eq!(expenses[0].amount, 4.5);
    assert_eq!(expenses[1].category, "Travel");
}

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.health_check().await.expect("health check");
}

#[tokio::test]
async fn creates_database_file_when_missing() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("nested").join("expenses.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let storage = Storage::new(&database_url).await.expect("db");
    drop(storage);

    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );
}

#[tokio::test]
async fn updates_existing_expense() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let id = storage
        .insert_expense("Lunch", 12.0, "Food")
        .await
        .expect("insert");

    let updated = storage
        .update_expense(id, "Dinner", 20.0, "Food")
        .await
        .expect("update");
    assert!(updated);

    let stored = storage.get_expense(id).await.expect("get").expect("exists");
    assert_eq!(stored.title, "Dinner");
    assert_eq!(stored.amount, 20.0);
}

#[tokio::test]
async fn update_and_delete_report_missing_ids() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let missing = ExpenseId(99);
    assert!(!storage
        .update_expense(missing, "x", 1.0, "Food")
        .await
        .expect("update"));
    assert!(!storage.delete_expense(missing).await.expect("delete"));
}

#[tokio::test]
async fn delete_removes_only_the_target() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let first = storage
        .insert_expense("Coffee", 4.5, "Food")
        .await
        .expect("first");
    let second = storage
        .insert_expense("Bus", 2.0, "Travel")
        .await
        .expect("second");

    assert!(storage.delete_expense(second).await.expect("delete"));

    let remaining = storage.list_expenses().await.expect("list");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, first);
    assert!(storage.get_expense(second).await.expect("get").is_none());
}

#[test]
fn memory_url_has_no_parent_dir() {
    assert!(sqlite_path("sqlite::memory:").is_none());
    assert_eq!(
        sqlite_path("sqlite://./data/expenses.db?mode=rwc"),
        Some(PathBuf::from("./data/expenses.db"))
    );
}
