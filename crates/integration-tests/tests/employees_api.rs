//! Integration tests for the employee API.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//!   (cargo run -p staffdesk-cli -- migrate)
//! - The server running (cargo run -p staffdesk-server)
//!
//! Run with: cargo test -p staffdesk-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL for the API (configurable via environment).
fn base_url() -> String {
    std::env::var("STAFFDESK_BASE_URL").unwrap_or_else(|_| "http://localhost:5000".to_string())
}

/// A unique email so test runs never collide.
fn unique_email(tag: &str) -> String {
    format!("{tag}.{}@staffdesk.test", Uuid::new_v4().simple())
}

/// Test helper: create an employee and return the response body.
async fn create_employee(client: &Client, email: &str, extra: Value) -> Value {
    let mut body = json!({
        "firstName": "Ann",
        "lastName": "Lee",
        "email": email,
        "salary": 50000,
        "date": "2024-01-01"
    });
    if let (Some(base), Some(patch)) = (body.as_object_mut(), extra.as_object()) {
        for (k, v) in patch {
            base.insert(k.clone(), v.clone());
        }
    }

    let resp = client
        .post(format!("{}/api/employees", base_url()))
        .json(&body)
        .send()
        .await
        .expect("Failed to create employee");
    assert_eq!(resp.status(), StatusCode::CREATED);
    resp.json().await.expect("Failed to parse response")
}

/// Test helper: delete an employee by id, ignoring failures.
async fn delete_employee(client: &Client, id: &str) {
    let _ = client
        .delete(format!("{}/api/employees/{id}", base_url()))
        .send()
        .await;
}

// ============================================================================
// Create & Email Normalization Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_create_lowercases_email() {
    let client = Client::new();
    let email = unique_email("Case.MIXED");

    let body = create_employee(&client, &email, json!({})).await;
    let stored = body["employee"]["email"].as_str().expect("email present");
    assert_eq!(stored, email.to_lowercase());

    let id = body["employee"]["id"].as_str().expect("id present");
    delete_employee(&client, id).await;
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_duplicate_email_differing_only_by_case_rejected() {
    let client = Client::new();
    let email = unique_email("dup");

    let body = create_employee(&client, &email, json!({})).await;
    let id = body["employee"]["id"].as_str().expect("id present").to_string();

    let resp = client
        .post(format!("{}/api/employees", base_url()))
        .json(&json!({
            "firstName": "Bob",
            "lastName": "Lee",
            "email": email.to_uppercase(),
            "salary": 40000
        }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let err: Value = resp.json().await.expect("error body");
    assert_eq!(err["message"], "Employee with this email already exists");

    delete_employee(&client, &id).await;
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_validation_errors_are_field_level() {
    let client = Client::new();

    let resp = client
        .post(format!("{}/api/employees", base_url()))
        .json(&json!({ "salary": -1 }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let err: Value = resp.json().await.expect("error body");
    assert_eq!(err["message"], "Validation failed");
    let fields: Vec<&str> = err["errors"]
        .as_array()
        .expect("errors array")
        .iter()
        .filter_map(|e| e["field"].as_str())
        .collect();
    assert!(fields.contains(&"firstName"));
    assert!(fields.contains(&"salary"));
}

// ============================================================================
// List, Search & Pagination Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_list_respects_limit_and_total_pages() {
    let client = Client::new();

    let resp = client
        .get(format!("{}/api/employees?page=1&limit=3", base_url()))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("list body");
    let employees = body["employees"].as_array().expect("employees array");
    let total = body["total"].as_i64().expect("total");
    let total_pages = body["totalPages"].as_i64().expect("totalPages");

    assert!(employees.len() <= 3);
    assert_eq!(total_pages, (total + 2) / 3);
    assert_eq!(body["currentPage"], 1);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_search_is_case_insensitive_substring() {
    let client = Client::new();
    let email = unique_email("searchable");
    let body = create_employee(
        &client,
        &email,
        json!({ "lastName": "Searchstone", "department": "Quality" }),
    )
    .await;
    let id = body["employee"]["id"].as_str().expect("id present").to_string();

    // Substring of lastName, wrong case on purpose
    let resp = client
        .get(format!("{}/api/employees?search=SEARCHST", base_url()))
        .send()
        .await
        .expect("request failed");
    let listing: Value = resp.json().await.expect("list body");
    let found = listing["employees"]
        .as_array()
        .expect("employees array")
        .iter()
        .any(|e| e["id"] == id.as_str());
    assert!(found, "employee should match case-insensitive substring search");

    // Department is searchable too
    let resp = client
        .get(format!("{}/api/employees?search=quality", base_url()))
        .send()
        .await
        .expect("request failed");
    let listing: Value = resp.json().await.expect("list body");
    let found = listing["employees"]
        .as_array()
        .expect("employees array")
        .iter()
        .any(|e| e["id"] == id.as_str());
    assert!(found, "employee should match on department");

    delete_employee(&client, &id).await;
}

// ============================================================================
// Update Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_update_without_email_keeps_email() {
    let client = Client::new();
    let email = unique_email("keepmail");
    let body = create_employee(&client, &email, json!({})).await;
    let id = body["employee"]["id"].as_str().expect("id present").to_string();

    let resp = client
        .put(format!("{}/api/employees/{id}", base_url()))
        .json(&json!({ "firstName": "Anna" }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let updated: Value = resp.json().await.expect("update body");
    assert_eq!(updated["employee"]["firstName"], "Anna");
    assert_eq!(updated["employee"]["email"], email.to_lowercase());

    delete_employee(&client, &id).await;
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_update_malformed_id_is_bad_request() {
    let client = Client::new();

    let resp = client
        .put(format!("{}/api/employees/not-a-uuid", base_url()))
        .json(&json!({ "firstName": "Anna" }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let err: Value = resp.json().await.expect("error body");
    assert_eq!(err["message"], "Invalid employee ID");
}

// ============================================================================
// Delete Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_delete_then_get_returns_not_found() {
    let client = Client::new();
    let email = unique_email("deleteme");
    let body = create_employee(&client, &email, json!({})).await;
    let id = body["employee"]["id"].as_str().expect("id present").to_string();

    let resp = client
        .delete(format!("{}/api/employees/{id}", base_url()))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let confirmation: Value = resp.json().await.expect("delete body");
    assert_eq!(confirmation["message"], "Employee deleted successfully");
    assert_eq!(confirmation["employee"]["id"], id.as_str());
    assert_eq!(confirmation["employee"]["firstName"], "Ann");

    let resp = client
        .get(format!("{}/api/employees/{id}", base_url()))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_delete_nonexistent_id_returns_not_found() {
    let client = Client::new();
    let missing = Uuid::new_v4();

    let resp = client
        .delete(format!("{}/api/employees/{missing}", base_url()))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Statistics Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_stats_reflect_created_employee() {
    let client = Client::new();
    let email = unique_email("stats");
    let body = create_employee(
        &client,
        &email,
        json!({ "department": "Statistics" }),
    )
    .await;
    let id = body["employee"]["id"].as_str().expect("id present").to_string();

    let resp = client
        .get(format!("{}/api/employees/stats/summary", base_url()))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let stats: Value = resp.json().await.expect("stats body");
    assert!(stats["totalEmployees"].as_i64().expect("count") >= 1);
    assert!(stats["averageSalary"].is_number());
    let departments = stats["departmentStats"].as_array().expect("departmentStats");
    assert!(
        departments
            .iter()
            .any(|d| d["department"] == "Statistics" && d["count"].as_i64().unwrap_or(0) >= 1)
    );

    // Counts are sorted descending
    let counts: Vec<i64> = departments
        .iter()
        .filter_map(|d| d["count"].as_i64())
        .collect();
    assert!(counts.windows(2).all(|w| w[0] >= w[1]));

    delete_employee(&client, &id).await;
}
