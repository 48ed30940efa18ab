use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{DEFAULT_GROUP_ID, Engine, EngineError, NewExpense};
use migration::MigratorTrait;

const EPSILON: f64 = 1e-9;

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

fn names(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn new_expense(group_id: Option<&str>, amount: f64, paid_by: &str, participants: &[&str]) -> NewExpense {
    NewExpense {
        group_id: group_id.map(ToString::to_string),
        description: "Dinner".to_string(),
        amount,
        paid_by: paid_by.to_string(),
        participants: names(participants),
    }
}

async fn balance_of(engine: &Engine, username: &str) -> Option<f64> {
    engine
        .running_balance(username)
        .await
        .unwrap()
        .map(|entry| entry.balance)
}

async fn balance_rows(db: &DatabaseConnection) -> i64 {
    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_string(
            backend,
            "SELECT COUNT(*) AS n FROM user_balances",
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get("", "n").unwrap()
}

#[tokio::test]
async fn record_expense_posts_running_totals() {
    let (engine, _db) = engine_with_db().await;

    let expense = engine
        .record_expense(new_expense(None, 100.0, "John", &["John", "Jane"]))
        .await
        .unwrap();

    assert_eq!(expense.group_id, DEFAULT_GROUP_ID);
    assert_eq!(balance_of(&engine, "John").await, Some(50.0));
    assert_eq!(balance_of(&engine, "Jane").await, Some(-50.0));

    let stored = engine.expense(&expense.id.to_string()).await.unwrap();
    assert_eq!(stored.participants, names(&["John", "Jane"]));
    assert_eq!(stored.amount, 100.0);
    assert_eq!(stored.paid_by, "John");
}

#[tokio::test]
async fn running_totals_accumulate_in_place() {
    let (engine, _db) = engine_with_db().await;

    engine
        .record_expense(new_expense(None, 100.0, "John", &["John", "Jane"]))
        .await
        .unwrap();
    engine
        .record_expense(new_expense(None, 30.0, "Jane", &["John", "Jane", "Jim"]))
        .await
        .unwrap();

    let john = balance_of(&engine, "John").await.unwrap();
    let jane = balance_of(&engine, "Jane").await.unwrap();
    let jim = balance_of(&engine, "Jim").await.unwrap();
    assert!((john - 40.0).abs() < EPSILON);
    assert!((jane + 30.0).abs() < EPSILON);
    assert!((jim + 10.0).abs() < EPSILON);
    assert!((john + jane + jim).abs() < EPSILON);

    let all = engine.running_balances().await.unwrap();
    let usernames: Vec<&str> = all.iter().map(|e| e.username.as_str()).collect();
    assert_eq!(usernames, vec!["Jane", "Jim", "John"]);
}

#[tokio::test]
async fn delete_keeps_running_totals() {
    let (engine, _db) = engine_with_db().await;

    let expense = engine
        .record_expense(new_expense(Some("trip"), 100.0, "John", &["John", "Jane"]))
        .await
        .unwrap();
    engine.delete_expense(&expense.id.to_string()).await.unwrap();

    assert_eq!(balance_of(&engine, "John").await, Some(50.0));
    assert_eq!(balance_of(&engine, "Jane").await, Some(-50.0));
    assert!(engine.list_group_expenses("trip").await.unwrap().is_empty());

    let err = engine.expense(&expense.id.to_string()).await.unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("expense not exists".to_string()));
}

#[tokio::test]
async fn delete_missing_expense_is_not_found() {
    let (engine, _db) = engine_with_db().await;

    for id in ["not-a-uuid", "0191f0b8-5d1c-7c3a-9f00-000000000000"] {
        let err = engine.delete_expense(id).await.unwrap_err();
        assert_eq!(err, EngineError::KeyNotFound("expense not exists".to_string()));
    }
}

#[tokio::test]
async fn invalid_expense_touches_nothing() {
    let (engine, db) = engine_with_db().await;

    let err = engine
        .record_expense(new_expense(None, 100.0, "John", &[]))
        .await
        .unwrap_err();
    assert!(err.is_validation());

    let err = engine
        .record_expense(new_expense(None, f64::NAN, "John", &["John"]))
        .await
        .unwrap_err();
    assert!(err.is_validation());

    assert_eq!(balance_rows(&db).await, 0);
    assert!(
        engine
            .list_group_expenses(DEFAULT_GROUP_ID)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn contribution_is_applied_once() {
    let (engine, _db) = engine_with_db().await;

    let expense = engine
        .record_expense(new_expense(None, 100.0, "John", &["John", "Jane"]))
        .await
        .unwrap();

    let applied = engine
        .apply_contribution(&expense.id.to_string())
        .await
        .unwrap();
    assert!(!applied);
    assert_eq!(balance_of(&engine, "John").await, Some(50.0));

    let err = engine.apply_contribution("missing").await.unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("expense not exists".to_string()));
}

#[tokio::test]
async fn group_balances_divide_by_roster() {
    let (engine, _db) = engine_with_db().await;

    let group = engine
        .create_group("Trip", &names(&["A", "B", "C"]))
        .await
        .unwrap();
    let group_id = group.id.to_string();

    engine
        .record_expense(new_expense(Some(&group_id), 90.0, "A", &["A", "B"]))
        .await
        .unwrap();

    let balances = engine.group_balances(&group_id).await.unwrap();
    assert_eq!(balances.len(), 3);
    assert!((balances["A"] - 60.0).abs() < EPSILON);
    assert!((balances["B"] + 30.0).abs() < EPSILON);
    assert!((balances["C"] + 30.0).abs() < EPSILON);

    // The running totals used the expense's own participant count.
    assert_eq!(balance_of(&engine, "A").await, Some(45.0));
    assert_eq!(balance_of(&engine, "B").await, Some(-45.0));
    assert_eq!(balance_of(&engine, "C").await, None);
}

#[tokio::test]
async fn group_balances_only_count_the_group() {
    let (engine, _db) = engine_with_db().await;

    let trip = engine
        .create_group("Trip", &names(&["A", "B"]))
        .await
        .unwrap();
    let flat = engine
        .create_group("Flat", &names(&["A", "B"]))
        .await
        .unwrap();

    engine
        .record_expense(new_expense(Some(&trip.id.to_string()), 10.0, "A", &["A", "B"]))
        .await
        .unwrap();
    engine
        .record_expense(new_expense(Some(&flat.id.to_string()), 40.0, "B", &["A", "B"]))
        .await
        .unwrap();

    let balances = engine.group_balances(&trip.id.to_string()).await.unwrap();
    assert!((balances["A"] - 5.0).abs() < EPSILON);
    assert!((balances["B"] + 5.0).abs() < EPSILON);

    // Running totals are keyed by username only and mix both groups.
    assert_eq!(balance_of(&engine, "A").await, Some(-15.0));
    assert_eq!(balance_of(&engine, "B").await, Some(15.0));
}

#[tokio::test]
async fn group_balances_for_missing_group() {
    let (engine, _db) = engine_with_db().await;

    engine
        .record_expense(new_expense(Some("ghost"), 10.0, "A", &["A"]))
        .await
        .unwrap();

    let err = engine.group_balances("ghost").await.unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("group not exists".to_string()));
}

#[tokio::test]
async fn expense_members_checked_against_roster() {
    let (engine, db) = engine_with_db().await;

    let group = engine
        .create_group("Trip", &names(&["A", "B"]))
        .await
        .unwrap();
    let group_id = group.id.to_string();

    let err = engine
        .record_expense(new_expense(Some(&group_id), 10.0, "Z", &["A", "B"]))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidParticipants(_)));

    let err = engine
        .record_expense(new_expense(Some(&group_id), 10.0, "A", &["A", "Q"]))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidParticipants(_)));

    assert_eq!(balance_rows(&db).await, 0);
    assert!(engine.list_group_expenses(&group_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn list_group_expenses_keeps_order() {
    let (engine, _db) = engine_with_db().await;

    let first = engine
        .record_expense(new_expense(Some("trip"), 10.0, "A", &["B", "A"]))
        .await
        .unwrap();
    let second = engine
        .record_expense(new_expense(Some("trip"), 20.0, "B", &["A", "B", "C"]))
        .await
        .unwrap();
    engine
        .record_expense(new_expense(Some("other"), 5.0, "A", &["A"]))
        .await
        .unwrap();

    let listed = engine.list_group_expenses("trip").await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, first.id);
    assert_eq!(listed[0].participants, names(&["B", "A"]));
    assert_eq!(listed[1].id, second.id);
    assert_eq!(listed[1].participants, names(&["A", "B", "C"]));
}

#[tokio::test]
async fn groups_round_trip() {
    let (engine, _db) = engine_with_db().await;

    let trip = engine
        .create_group("Trip", &names(&["C", "A", "B"]))
        .await
        .unwrap();
    engine
        .create_group("Flat", &names(&["A"]))
        .await
        .unwrap();

    let loaded = engine.group(&trip.id.to_string()).await.unwrap();
    assert_eq!(loaded.name, "Trip");
    assert_eq!(loaded.participants, names(&["C", "A", "B"]));

    let all = engine.list_groups().await.unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().any(|g| g.name == "Flat" && g.participants == names(&["A"])));

    let err = engine.group("missing").await.unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("group not exists".to_string()));

    let err = engine
        .create_group("Dup", &names(&["A", "A"]))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("A".to_string()));
}

#[tokio::test]
async fn users_authenticate() {
    let (engine, _db) = engine_with_db().await;

    engine.upsert_user("alice", "secret").await.unwrap();
    assert!(engine.authenticate("alice", "secret").await.unwrap());
    assert!(!engine.authenticate("alice", "wrong").await.unwrap());
    assert!(!engine.authenticate("", "").await.unwrap());

    engine.upsert_user("alice", "changed").await.unwrap();
    assert!(!engine.authenticate("alice", "secret").await.unwrap());
    assert!(engine.authenticate("alice", "changed").await.unwrap());
}

#[tokio::test]
async fn readiness() {
    let (engine, _db) = engine_with_db().await;
    assert!(engine.is_ready().await);
    assert_eq!(engine.backend_name(), "sqlite");
}

#[tokio::test]
async fn registered_user_is_unique() {
    let (engine, _db) = engine_with_db().await;

    let username = engine.create_user(" bob ", "hunter2").await.unwrap();
    assert_eq!(username, "bob");
    assert!(engine.authenticate("bob", "hunter2").await.unwrap());

    let err = engine.create_user("bob", "other").await.unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("bob".to_string()));
    assert!(engine.authenticate("bob", "hunter2").await.unwrap());

    let err = engine.create_user("carol", "").await.unwrap_err();
    assert!(err.is_validation());
}
