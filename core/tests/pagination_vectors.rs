//! Verify listing-parameter validation and CQL rendering against the JSON
//! vectors in `test-vectors/list.json`, plus cursor walks over a simulated
//! token-ordered table.

use todo_core::{
    partition_token, BindValue, CreateTodo, ListParams, PageLimits, PageQuery, StatusPolicy, Todo,
    TodoPage,
};
use uuid::Uuid;

/// Parse a `["kind", value]` pair from the vectors into a `BindValue`.
fn parse_value(pair: &serde_json::Value) -> BindValue {
    let arr = pair.as_array().unwrap();
    match arr[0].as_str().unwrap() {
        "text" => BindValue::Text(arr[1].as_str().unwrap().to_string()),
        "uuid" => BindValue::Uuid(Uuid::parse_str(arr[1].as_str().unwrap()).unwrap()),
        "int" => BindValue::Int(arr[1].as_i64().unwrap() as i32),
        other => panic!("unknown bind kind: {other}"),
    }
}

#[test]
fn list_test_vectors() {
    let raw = include_str!("../../test-vectors/list.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let params: ListParams = serde_json::from_value(case["params"].clone()).unwrap();
        let result = PageQuery::from_params(&params, &PageLimits::default(), &StatusPolicy::FreeForm);

        if let Some(expected) = case.get("expected_error") {
            let err = result.expect_err(name);
            assert_eq!(err.to_string(), expected.as_str().unwrap(), "{name}: error");
            continue;
        }

        let stmt = result.unwrap().to_cql();
        assert_eq!(stmt.text, case["expected_cql"].as_str().unwrap(), "{name}: cql");
        let expected_values: Vec<BindValue> = case["expected_values"]
            .as_array()
            .unwrap()
            .iter()
            .map(parse_value)
            .collect();
        assert_eq!(stmt.values, expected_values, "{name}: values");
    }
}

// ---------------------------------------------------------------------------
// Cursor walks
// ---------------------------------------------------------------------------

/// Execute a query against rows the way the store does: filter, order by
/// token, then apply the limit.
fn run(table: &[Todo], query: &PageQuery) -> TodoPage {
    let mut rows: Vec<Todo> = table.iter().filter(|t| query.admits(t)).cloned().collect();
    rows.sort_by_key(|t| partition_token(t.id));
    rows.truncate(query.limit());
    TodoPage::from_rows(rows, query.page_size)
}

fn table(owner: &str, n: usize) -> Vec<Todo> {
    (0..n)
        .map(|i| {
            Todo::new(
                CreateTodo {
                    user_id: owner.to_string(),
                    title: format!("task {i}"),
                    ..CreateTodo::default()
                },
                chrono::Utc::now(),
            )
        })
        .collect()
}

fn query(user_id: &str, page_size: &str, page_token: &str) -> PageQuery {
    let params = ListParams {
        user_id: Some(user_id.to_string()),
        page_size: Some(page_size.to_string()),
        page_token: Some(page_token.to_string()),
        ..ListParams::default()
    };
    PageQuery::from_params(&params, &PageLimits::default(), &StatusPolicy::FreeForm).unwrap()
}

#[test]
fn forward_walk_visits_every_row_once() {
    let mut rows = table("alice", 23);
    rows.extend(table("bob", 5));

    let mut seen = Vec::new();
    let mut token = String::new();
    let mut pages = 0;
    loop {
        let page = run(&rows, &query("alice", "5", &token));
        assert!(page.current_page_size <= 5);
        if page.todos.is_empty() {
            break;
        }
        seen.extend(page.todos.iter().map(|t| t.id));
        token = page.next_page_token;
        pages += 1;
    }

    assert_eq!(pages, 5);
    let mut expected: Vec<Uuid> = rows
        .iter()
        .filter(|t| t.user_id == "alice")
        .map(|t| t.id)
        .collect();
    expected.sort_by_key(|id| partition_token(*id));
    assert_eq!(seen, expected);
}

#[test]
fn last_partial_page_has_no_prev_token() {
    let rows = table("alice", 7);
    let first = run(&rows, &query("alice", "5", ""));
    assert!(!first.prev_page_token.is_empty());
    let second = run(&rows, &query("alice", "5", &first.next_page_token));
    assert_eq!(second.current_page_size, 2);
    assert!(second.prev_page_token.is_empty());
    assert!(!second.next_page_token.is_empty());
}
