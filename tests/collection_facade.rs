//! Collection Facade Tests
//!
//! Runs facade calls against a RecordingExecutor:
//! - Statement shapes and parameter order
//! - Reported counts (`1`, `"unknown"`)
//! - Row decoding (field names, JSON-text columns)
//! - Error propagation

use std::sync::Arc;

use docshim::collection::{AffectedCount, Database};
use docshim::pool::RecordingExecutor;
use docshim::query::{SortOrder, SqlParam};
use docshim::ErrorCode;
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup() -> (Arc<RecordingExecutor>, Database) {
    let executor = Arc::new(RecordingExecutor::new());
    let db = Database::new(executor.clone());
    (executor, db)
}

// =============================================================================
// Read Tests
// =============================================================================

#[tokio::test]
async fn test_find_one_decodes_row() {
    let (executor, db) = setup();
    executor.push_json_rows(json!([{
        "id": 3,
        "user_id": 5,
        "media_urls": "[\"a.png\",\"b.png\"]",
        "likes": "not json",
        "is_archived": false
    }]));

    let doc = db
        .posts()
        .find_one(&json!({"authorId": "5"}))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(doc["images"], json!(["a.png", "b.png"]));
    assert_eq!(doc["likes"], json!("not json"));
    assert_eq!(doc["userId"], json!(5));
    assert_eq!(doc["isArchived"], json!(false));

    let statement = executor.last_statement().unwrap();
    assert_eq!(statement.sql, "SELECT * FROM posts WHERE user_id = $1 LIMIT 1");
    assert_eq!(statement.params, vec![SqlParam::Int(5)]);
}

#[tokio::test]
async fn test_find_one_without_match() {
    let (_executor, db) = setup();
    assert!(db.users().find_one(&json!({"username": "nobody"})).await.unwrap().is_none());
}

#[tokio::test]
async fn test_cursor_runs_nothing_until_to_list() {
    let (executor, db) = setup();
    let cursor = db
        .stories()
        .find(json!({"viewedBy": {"$ne": "[]"}}))
        .sort("expiresAt", SortOrder::Descending)
        .limit(5)
        .skip(10);

    assert!(executor.statements().is_empty());
    assert_eq!(
        cursor.to_sql().unwrap(),
        "SELECT * FROM stories WHERE viewers != $1 ORDER BY expires_at DESC LIMIT 5 OFFSET 10"
    );

    executor.push_json_rows(json!([{"id": 1, "viewers": "[\"4\"]"}]));
    let docs = cursor.to_list().await.unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0]["viewedBy"], json!(["4"]));
    assert_eq!(executor.statements().len(), 1);
}

#[tokio::test]
async fn test_sort_on_unusable_field_is_rejected() {
    let (_executor, db) = setup();
    let err = db
        .posts()
        .find(json!({}))
        .sort("created_at; DROP TABLE posts", SortOrder::Ascending)
        .to_list()
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidField);
}

#[tokio::test]
async fn test_count_documents() {
    let (executor, db) = setup();
    executor.push_json_rows(json!([{"count": 12}]));

    let count = db
        .notifications()
        .count_documents(&json!({"userId": "2", "read": false}))
        .await
        .unwrap();

    assert_eq!(count, 12);
    assert_eq!(
        executor.last_statement().unwrap().sql,
        "SELECT COUNT(*) AS count FROM notifications WHERE user_id = $1 AND is_read = $2"
    );
}

// =============================================================================
// Write Tests
// =============================================================================

#[tokio::test]
async fn test_insert_one_returns_generated_id() {
    let (executor, db) = setup();
    executor.push_json_rows(json!([{"id": 77}]));

    let result = db
        .users()
        .insert_one(&json!({
            "id": 1,
            "username": "ana",
            "password_hash": "x",
            "city": "Lima",
            "followers": ["2"]
        }))
        .await
        .unwrap();

    assert_eq!(result.inserted_id, json!(77));
    let statement = executor.last_statement().unwrap();
    // `city` only reaches `location` on update
    assert_eq!(
        statement.sql,
        "INSERT INTO users (username, password, followers) VALUES ($1, $2, $3) RETURNING id"
    );
    assert_eq!(statement.params[2], SqlParam::Text("[\"2\"]".to_string()));
}

#[tokio::test]
async fn test_insert_one_without_surviving_fields() {
    let (executor, db) = setup();
    executor.push_json_rows(json!([{"id": 1}]));

    db.notifications()
        .insert_one(&json!({"read": false}))
        .await
        .unwrap();
    assert_eq!(
        executor.last_statement().unwrap().sql,
        "INSERT INTO notifications DEFAULT VALUES RETURNING id"
    );
}

#[tokio::test]
async fn test_insert_one_missing_id() {
    let (_executor, db) = setup();
    let err = db.posts().insert_one(&json!({"content": "hi"})).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::MissingInsertedId);
}

#[tokio::test]
async fn test_update_one_params_precede_filter_params() {
    let (executor, db) = setup();

    let result = db
        .users()
        .update_one(&json!({"id": "9"}), &json!({"$set": {"city": "Quito", "bio": "hi"}}))
        .await
        .unwrap();

    assert_eq!(result.modified_count, AffectedCount::Exact(1));
    let statement = executor.last_statement().unwrap();
    assert_eq!(
        statement.sql,
        "UPDATE users SET location = $1, bio = $2 WHERE id = (SELECT id FROM users WHERE id = $3 LIMIT 1)"
    );
    assert_eq!(
        statement.params,
        vec![
            SqlParam::Text("Quito".to_string()),
            SqlParam::Text("hi".to_string()),
            SqlParam::Int(9),
        ]
    );
}

#[tokio::test]
async fn test_update_many_reports_unknown() {
    let (executor, db) = setup();
    executor.push_affected(40);

    let result = db
        .notifications()
        .update_many(&json!({"userId": 2}), &json!({"read": true}))
        .await
        .unwrap();

    assert!(result.modified_count.is_unknown());
    assert_eq!(
        serde_json::to_value(result).unwrap(),
        json!({"modified_count": "unknown"})
    );
    assert_eq!(
        executor.last_statement().unwrap().sql,
        "UPDATE notifications SET is_read = $1 WHERE user_id = $2"
    );
}

#[tokio::test]
async fn test_empty_update_issues_no_statement() {
    let (executor, db) = setup();

    let result = db
        .posts()
        .update_one(&json!({"id": 1}), &json!({"$set": {}, "$inc": {"views": 1}}))
        .await
        .unwrap();

    assert_eq!(result.modified_count, AffectedCount::Exact(1));
    assert!(executor.statements().is_empty());
}

#[tokio::test]
async fn test_empty_update_many_reports_unknown() {
    let (executor, db) = setup();

    let result = db
        .users()
        .update_many(&json!({"isPrivate": true}), &json!({"$rename": {"bio": "about"}}))
        .await
        .unwrap();

    assert_eq!(result.modified_count, AffectedCount::Unknown);
    assert!(executor.statements().is_empty());
}

#[tokio::test]
async fn test_update_sets_datetime_and_null() {
    let (executor, db) = setup();

    db.posts()
        .update_one(
            &json!({"createdAt": {"$ne": "2024-01-01T00:00:00Z"}}),
            &json!({"$set": {"updatedAt": "2024-05-01T12:30:00Z", "isArchived": null}}),
        )
        .await
        .unwrap();

    let statement = executor.last_statement().unwrap();
    assert_eq!(
        statement.sql,
        "UPDATE posts SET updated_at = $1::timestamptz, is_archived = $2::boolean \
         WHERE id = (SELECT id FROM posts WHERE created_at != $3::timestamptz LIMIT 1)"
    );
    assert_eq!(statement.params[1], SqlParam::Null);
    assert_eq!(statement.placeholder_count(), statement.params.len());
}

#[tokio::test]
async fn test_push_like_is_single_statement() {
    let (executor, db) = setup();

    db.posts()
        .update_one(&json!({"id": 4}), &json!({"$addToSet": {"likes": "5"}}))
        .await
        .unwrap();

    let statements = executor.statements();
    assert_eq!(statements.len(), 1);
    assert!(statements[0].sql.starts_with("UPDATE posts SET likes = (SELECT CASE"));
    assert_eq!(
        statements[0].params,
        vec![SqlParam::Json(json!("5")), SqlParam::Int(4)]
    );
    assert_eq!(statements[0].placeholder_count(), 2);
}

#[tokio::test]
async fn test_delete_counts() {
    let (executor, db) = setup();

    let one = db.stories().delete_one(&json!({"id": 3})).await.unwrap();
    let many = db
        .stories()
        .delete_many(&json!({"expiresAt": {"$in": ["2024-01-01T00:00:00Z"]}}))
        .await
        .unwrap();

    assert_eq!(one.deleted_count, AffectedCount::Exact(1));
    assert_eq!(many.deleted_count, AffectedCount::Unknown);

    let statements = executor.statements();
    assert_eq!(
        statements[0].sql,
        "DELETE FROM stories WHERE id = (SELECT id FROM stories WHERE id = $1 LIMIT 1)"
    );
    assert_eq!(
        statements[1].sql,
        "DELETE FROM stories WHERE expires_at IN ($1::timestamptz)"
    );
}

// =============================================================================
// Error Tests
// =============================================================================

#[tokio::test]
async fn test_executor_errors_propagate() {
    let (executor, db) = setup();
    executor.push_error("duplicate key value violates unique constraint");

    let err = db
        .users()
        .insert_one(&json!({"username": "ana"}))
        .await
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::QueryFailed);
    assert!(err.to_string().contains("duplicate key"));
    assert_eq!(executor.statements().len(), 1);
}

#[tokio::test]
async fn test_unknown_collection() {
    let (_executor, db) = setup();
    let err = db.collection_by_name("reels").unwrap_err();
    assert_eq!(err.code(), ErrorCode::UnknownCollection);
    assert!(db.collection_by_name("posts").is_ok());
}

#[tokio::test]
async fn test_non_object_filter_is_rejected() {
    let (executor, db) = setup();
    let err = db.posts().count_documents(&json!(["userId"])).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidDocument);
    assert!(executor.statements().is_empty());
}
