//! Filter and Update Compilation Invariant Tests
//!
//! - Placeholder count equals parameter count
//! - Numbering is contiguous from the caller-supplied offset
//! - Empty `$in` / `$nin` never produce `IN ()`
//! - Identifier coercion never raises
//! - Unknown operators are ignored
//! - Text on typed columns carries a cast

use docshim::query::{placeholders, DocumentMutator, FilterCompiler, SqlParam, Statement};
use docshim::schema::Table;
use serde_json::{json, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn compile(table: Table, filter: Value, offset: usize) -> (String, Vec<SqlParam>) {
    let compiled = FilterCompiler::new(table)
        .compile_value(&filter, offset)
        .unwrap();
    (compiled.predicate, compiled.params)
}

fn assert_contiguous(sql: &str, params: &[SqlParam], offset: usize) {
    let found = placeholders(sql);
    let expected: Vec<usize> = (offset..offset + params.len()).collect();
    assert_eq!(found, expected, "placeholders in {:?}", sql);
}

// =============================================================================
// Placeholder Tests
// =============================================================================

#[test]
fn test_placeholders_contiguous_across_nesting() {
    let filter = json!({
        "userId": "5",
        "$or": [
            {"visibility": "public"},
            {"$and": [{"visibility": "friends"}, {"likes": {"$in": ["1", "2"]}}]}
        ],
        "content": {"$regex": "^hello", "$ne": "spam"}
    });

    for offset in [1, 2, 7] {
        let (sql, params) = compile(Table::Posts, filter.clone(), offset);
        assert_eq!(params.len(), 7);
        assert_contiguous(&sql, &params, offset);
    }
}

#[test]
fn test_offset_shifts_numbering_only() {
    let (first, params_first) = compile(Table::Posts, json!({"userId": 3, "isArchived": false}), 1);
    let (shifted, params_shifted) = compile(Table::Posts, json!({"userId": 3, "isArchived": false}), 4);

    assert_eq!(first, "user_id = $1 AND is_archived = $2");
    assert_eq!(shifted, "user_id = $4 AND is_archived = $5");
    assert_eq!(params_first, params_shifted);
}

#[test]
fn test_statement_placeholder_count_matches_params() {
    let filter = FilterCompiler::new(Table::Users)
        .compile_value(&json!({"username": {"$in": ["a", "b", "c"]}}), 1)
        .unwrap();
    let statement = Statement {
        sql: format!("SELECT * FROM users WHERE {}", filter.predicate),
        params: filter.params,
    };
    assert_eq!(statement.placeholder_count(), statement.params.len());
}

// =============================================================================
// Operator Tests
// =============================================================================

#[test]
fn test_empty_membership_lists_contribute_nothing() {
    let (sql, params) = compile(
        Table::Posts,
        json!({"likes": {"$in": []}, "comments": {"$nin": []}, "content": "x"}),
        1,
    );
    assert_eq!(sql, "content = $1");
    assert_eq!(params, vec![SqlParam::Text("x".to_string())]);
    assert!(!sql.contains("IN ()"));

    let (sql, params) = compile(Table::Posts, json!({"likes": {"$nin": []}}), 1);
    assert_eq!(sql, "TRUE");
    assert!(params.is_empty());
}

#[test]
fn test_nin_compiles_to_not_in() {
    let (sql, params) = compile(Table::Users, json!({"id": {"$nin": ["1", "x"]}}), 1);
    assert_eq!(sql, "id NOT IN ($1, $2::bigint)");
    assert_eq!(
        params,
        vec![SqlParam::Int(1), SqlParam::Text("x".to_string())]
    );
}

#[test]
fn test_unknown_operators_are_ignored() {
    let (sql, params) = compile(
        Table::Posts,
        json!({"likes": {"$size": 3, "$ne": "[]"}, "$where": "1=1", "$text": {"$search": "x"}}),
        1,
    );
    assert_eq!(sql, "likes != $1");
    assert_eq!(params.len(), 1);
}

#[test]
fn test_or_of_two_users() {
    let (sql, params) = compile(Table::Posts, json!({"$or": [{"userId": 5}, {"userId": 6}]}), 1);
    assert_eq!(sql, "((user_id = $1) OR (user_id = $2))");
    assert_eq!(params, vec![SqlParam::Int(5), SqlParam::Int(6)]);
}

// =============================================================================
// Coercion Tests
// =============================================================================

#[test]
fn test_identifier_coercion_never_raises() {
    let (sql, params) = compile(
        Table::Notifications,
        json!({"userId": " 42 ", "id": "not-a-number", "postId": "9"}),
        1,
    );
    assert_eq!(sql, "user_id = $1 AND id = $2::bigint AND post_id = $3::bigint");
    assert_eq!(
        params,
        vec![
            SqlParam::Int(42),
            SqlParam::Text("not-a-number".to_string()),
            // only id and user_id are identifier columns
            SqlParam::Text("9".to_string()),
        ]
    );
}

#[test]
fn test_casts_keep_numbering_contiguous() {
    let (sql, params) = compile(
        Table::Stories,
        json!({
            "expiresAt": {"$in": ["2024-01-01T00:00:00Z", "2024-01-02T00:00:00Z"]},
            "createdAt": {"$ne": null},
            "userId": "3"
        }),
        5,
    );
    assert_eq!(
        sql,
        "expires_at IN ($5::timestamptz, $6::timestamptz) AND created_at != $7::timestamptz AND user_id = $8"
    );
    assert_contiguous(&sql, &params, 5);
}

// =============================================================================
// Update Tests
// =============================================================================

#[test]
fn test_array_operators_bind_one_placeholder_each() {
    let compiled = DocumentMutator::new(Table::Users)
        .compile_update_value(
            &json!({
                "$push": {"followers": "7"},
                "$addToSet": {"following": "8"},
                "$pull": {"blockedUsers": "9"}
            }),
            None,
            3,
        )
        .unwrap();

    assert_eq!(compiled.assignments.len(), 3);
    for (assignment, expected) in compiled.assignments.iter().zip(["$3", "$4", "$5"]) {
        assert_eq!(placeholders(assignment).len(), 1, "{}", assignment);
        assert!(assignment.contains(expected), "{}", assignment);
    }
    assert!(compiled.assignments[2].starts_with("blocked_users = "));
    assert_eq!(compiled.params[0], SqlParam::Json(json!("7")));
}

#[test]
fn test_update_allow_list_drops_unknown_columns() {
    let compiled = DocumentMutator::new(Table::Posts)
        .compile_update_value(
            &json!({"content": "a", "mood": "b"}),
            Some(Table::Posts.columns()),
            1,
        )
        .unwrap();
    assert_eq!(compiled.set_clause(), "content = $1");
}
