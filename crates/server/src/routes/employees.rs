//! Employee API handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};

use staffdesk_core::EmployeeId;

use crate::db::employees::{
    DeletedEmployee, EmployeePage, EmployeeRepository, EmployeeStats, ListParams, SortKey,
    SortOrder,
};
use crate::error::AppError;
use crate::models::{Employee, EmployeeInput};
use crate::state::AppState;

/// Build the employees router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/employees", get(list).post(create))
        .route("/api/employees/stats/summary", get(stats_summary))
        .route(
            "/api/employees/{id}",
            get(get_one).put(update).delete(delete),
        )
}

/// Query string for the listing endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl ListQuery {
    fn into_params(self) -> ListParams {
        ListParams {
            page: self.page.unwrap_or(1).max(1),
            limit: self.limit.unwrap_or(10).max(1),
            search: self.search,
            sort_by: self.sort_by.as_deref().map_or_else(SortKey::default, SortKey::from_api),
            sort_order: self
                .sort_order
                .as_deref()
                .map_or_else(SortOrder::default, SortOrder::from_api),
        }
    }
}

/// Listing response: one page plus pagination metadata.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub employees: Vec<Employee>,
    pub total_pages: i64,
    pub current_page: u32,
    pub total: i64,
}

/// Response wrapper for mutations, matching the client's expectations.
#[derive(Debug, Serialize)]
pub struct EmployeeResponse {
    pub message: String,
    pub employee: Employee,
}

/// Confirmation payload for deletes.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub employee: DeletedEmployee,
}

/// `ceil(total / limit)` without floating point.
const fn total_pages(total: i64, limit: i64) -> i64 {
    if limit <= 0 {
        return 0;
    }
    (total + limit - 1) / limit
}

/// Parse the path id, mapping malformed input to a 400.
fn parse_id(raw: &str) -> Result<EmployeeId, AppError> {
    EmployeeId::parse(raw).map_err(|_| AppError::MalformedId)
}

/// `GET /api/employees` - Paginated, searchable, sorted listing.
///
/// # Errors
///
/// Returns a 500 only on store failure.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>, AppError> {
    let params = query.into_params();
    let repo = EmployeeRepository::new(state.pool());
    let EmployeePage { employees, total } = repo.list(&params).await?;

    Ok(Json(ListResponse {
        employees,
        total_pages: total_pages(total, i64::from(params.limit)),
        current_page: params.page,
        total,
    }))
}

/// `GET /api/employees/{id}` - Single employee.
///
/// # Errors
///
/// Returns 400 for a malformed id, 404 when the id matches no record.
pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Employee>, AppError> {
    let id = parse_id(&id)?;
    let repo = EmployeeRepository::new(state.pool());

    let employee = repo.get(id).await?.ok_or(AppError::NotFound)?;
    Ok(Json(employee))
}

/// `POST /api/employees` - Create employee.
///
/// The email pre-check produces the friendly duplicate message; the unique
/// index in the store is the authoritative guard and maps to the same error
/// when a concurrent writer gets there first.
///
/// # Errors
///
/// Returns 400 with field detail on validation failure or duplicate email.
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<EmployeeInput>,
) -> Result<(StatusCode, Json<EmployeeResponse>), AppError> {
    let new = input.into_new().map_err(AppError::Validation)?;
    let repo = EmployeeRepository::new(state.pool());

    if repo.email_exists(&new.email, None).await? {
        return Err(AppError::DuplicateEmail);
    }

    let employee = repo.insert(&new).await?;
    tracing::info!(id = %employee.id, "employee created");

    Ok((
        StatusCode::CREATED,
        Json(EmployeeResponse {
            message: "Employee created successfully".to_string(),
            employee,
        }),
    ))
}

/// `PUT /api/employees/{id}` - Update employee.
///
/// Supplied fields are merged over the existing record and the result is
/// re-validated; the uniqueness check excludes the record's own id so a
/// record may keep its email.
///
/// # Errors
///
/// Returns 400 for a malformed id, validation failure, or duplicate email;
/// 404 when the id matches no record.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<EmployeeInput>,
) -> Result<Json<EmployeeResponse>, AppError> {
    let id = parse_id(&id)?;
    let repo = EmployeeRepository::new(state.pool());

    let existing = repo.get(id).await?.ok_or(AppError::NotFound)?;
    let merged = input.merge_into(&existing).map_err(AppError::Validation)?;

    if merged.email != existing.email && repo.email_exists(&merged.email, Some(id)).await? {
        return Err(AppError::DuplicateEmail);
    }

    let employee = repo.update(id, &merged).await?.ok_or(AppError::NotFound)?;
    tracing::info!(id = %employee.id, "employee updated");

    Ok(Json(EmployeeResponse {
        message: "Employee updated successfully".to_string(),
        employee,
    }))
}

/// `DELETE /api/employees/{id}` - Delete employee (hard delete).
///
/// # Errors
///
/// Returns 400 for a malformed id, 404 when the id matches no record.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    let id = parse_id(&id)?;
    let repo = EmployeeRepository::new(state.pool());

    let deleted = repo.delete(id).await?.ok_or(AppError::NotFound)?;
    tracing::info!(id = %deleted.id, "employee deleted");

    Ok(Json(DeleteResponse {
        message: "Employee deleted successfully".to_string(),
        employee: deleted,
    }))
}

/// `GET /api/employees/stats/summary` - Aggregate statistics.
///
/// # Errors
///
/// Returns a 500 only on store failure.
pub async fn stats_summary(
    State(state): State<AppState>,
) -> Result<Json<EmployeeStats>, AppError> {
    let repo = EmployeeRepository::new(state.pool());
    Ok(Json(repo.stats().await?))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(25, 10), 3);
        assert_eq!(total_pages(5, 1), 5);
    }

    #[test]
    fn test_list_query_defaults() {
        let params = ListQuery::default().into_params();
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, 10);
        assert_eq!(params.sort_by, SortKey::CreatedAt);
        assert_eq!(params.sort_order, SortOrder::Desc);
        assert!(params.search.is_none());
    }

    #[test]
    fn test_list_query_clamps_and_maps() {
        let params = ListQuery {
            page: Some(0),
            limit: Some(0),
            sort_by: Some("lastName".to_string()),
            sort_order: Some("asc".to_string()),
            search: Some("lee".to_string()),
        }
        .into_params();

        assert_eq!(params.page, 1);
        assert_eq!(params.limit, 1);
        assert_eq!(params.sort_by, SortKey::LastName);
        assert_eq!(params.sort_order, SortOrder::Asc);
    }

    #[test]
    fn test_parse_id_rejects_non_uuid() {
        assert!(matches!(parse_id("stats"), Err(AppError::MalformedId)));
        assert!(parse_id("00000000-0000-0000-0000-000000000000").is_ok());
    }
}
