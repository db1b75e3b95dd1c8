//! Employee repository for database operations.
//!
//! The listing query is assembled with [`sqlx::QueryBuilder`] because the
//! search filter, sort column, and pagination window are request-driven and
//! cannot be expressed with the compile-time query macros. The sort column is
//! restricted to a whitelist; only the search pattern and window values are
//! bound.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use staffdesk_core::{Email, EmployeeId, Phone};

use super::RepositoryError;
use crate::models::employee::{Address, Employee, NewEmployee};

/// Columns selected for a full employee record.
const EMPLOYEE_COLUMNS: &str = "id, first_name, last_name, email, salary, hired_on, \
     department, position, phone, street, city, state, zip_code, country, \
     created_at, updated_at";

/// The five fields the search term is matched against.
const SEARCH_COLUMNS: [&str; 5] = ["first_name", "last_name", "email", "department", "position"];

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` employee queries.
#[derive(Debug, sqlx::FromRow)]
struct EmployeeRow {
    id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    salary: Decimal,
    hired_on: DateTime<Utc>,
    department: Option<String>,
    position: Option<String>,
    phone: Option<String>,
    street: Option<String>,
    city: Option<String>,
    state: Option<String>,
    zip_code: Option<String>,
    country: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<EmployeeRow> for Employee {
    type Error = RepositoryError;

    fn try_from(row: EmployeeRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        let phone = row
            .phone
            .as_deref()
            .map(Phone::parse)
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid phone in database: {e}"))
            })?;

        let address = Address {
            street: row.street,
            city: row.city,
            state: row.state,
            zip_code: row.zip_code,
            country: row.country,
        };
        let address = if address.is_empty() { None } else { Some(address) };

        Ok(Self {
            id: EmployeeId::from_uuid(row.id),
            first_name: row.first_name,
            last_name: row.last_name,
            email,
            salary: row.salary,
            hired_on: row.hired_on,
            department: row.department,
            position: row.position,
            phone,
            address,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// =============================================================================
// Listing parameters
// =============================================================================

/// Whitelisted sort columns for the listing query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    FirstName,
    LastName,
    Email,
    Salary,
    HiredOn,
    Department,
    Position,
    #[default]
    CreatedAt,
    UpdatedAt,
}

impl SortKey {
    /// Map an API-level field name to a sort column. Unknown names fall back
    /// to `createdAt`, matching the tolerance of the listing contract.
    #[must_use]
    pub fn from_api(name: &str) -> Self {
        match name {
            "firstName" => Self::FirstName,
            "lastName" => Self::LastName,
            "email" => Self::Email,
            "salary" => Self::Salary,
            "date" => Self::HiredOn,
            "department" => Self::Department,
            "position" => Self::Position,
            "updatedAt" => Self::UpdatedAt,
            _ => Self::CreatedAt,
        }
    }

    /// The SQL column this key sorts on.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::Email => "email",
            Self::Salary => "salary",
            Self::HiredOn => "hired_on",
            Self::Department => "department",
            Self::Position => "position",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Parse an API-level direction; anything other than `asc` sorts
    /// descending (the default).
    #[must_use]
    pub fn from_api(name: &str) -> Self {
        if name.eq_ignore_ascii_case("asc") {
            Self::Asc
        } else {
            Self::Desc
        }
    }

    const fn sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Parameters for the paginated listing query.
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    /// 1-based page number (values below 1 are clamped).
    pub page: u32,
    /// Page size (values below 1 are clamped).
    pub limit: u32,
    /// Case-insensitive substring filter; empty/absent matches everything.
    pub search: Option<String>,
    pub sort_by: SortKey,
    pub sort_order: SortOrder,
}

impl ListParams {
    fn page(&self) -> i64 {
        i64::from(self.page.max(1))
    }

    fn limit(&self) -> i64 {
        i64::from(self.limit.max(1))
    }

    fn offset(&self) -> i64 {
        // page and limit are unbounded client input; an absurd window must
        // clamp, not overflow
        (self.page() - 1).saturating_mul(self.limit())
    }

    fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// One page of employees plus the total count of matching records.
#[derive(Debug)]
pub struct EmployeePage {
    pub employees: Vec<Employee>,
    pub total: i64,
}

/// Confirmation data returned by a delete.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedEmployee {
    pub id: EmployeeId,
    pub first_name: String,
    pub last_name: String,
}

/// Aggregate statistics over the whole collection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeStats {
    pub total_employees: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub average_salary: Decimal,
    pub department_stats: Vec<DepartmentCount>,
}

/// Employee count for one department.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DepartmentCount {
    pub department: String,
    pub count: i64,
}

/// Escape `%`, `_`, and `\` so a search term matches literally inside LIKE.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

/// Append `WHERE <five columns ILIKE pattern>` when a search term is present.
fn push_search_filter(builder: &mut QueryBuilder<'_, Postgres>, term: Option<&str>) {
    let Some(term) = term else { return };
    let pattern = format!("%{}%", escape_like(term));

    builder.push(" WHERE ");
    for (i, column) in SEARCH_COLUMNS.iter().enumerate() {
        if i > 0 {
            builder.push(" OR ");
        }
        builder.push(*column);
        builder.push(" ILIKE ");
        builder.push_bind(pattern.clone());
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for employee database operations. The only mutator of the
/// `employee` table.
pub struct EmployeeRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> EmployeeRepository<'a> {
    /// Create a new employee repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List employees with search, sort, and offset pagination.
    ///
    /// The total is counted in a second query with the same filter; a record
    /// written between the two queries (or between pages) may shift results.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn list(&self, params: &ListParams) -> Result<EmployeePage, RepositoryError> {
        let mut query = QueryBuilder::new(format!("SELECT {EMPLOYEE_COLUMNS} FROM employee"));
        push_search_filter(&mut query, params.search_term());
        query.push(" ORDER BY ");
        query.push(params.sort_by.column());
        query.push(" ");
        query.push(params.sort_order.sql());
        query.push(" LIMIT ");
        query.push_bind(params.limit());
        query.push(" OFFSET ");
        query.push_bind(params.offset());

        let rows: Vec<EmployeeRow> = query
            .build_query_as()
            .fetch_all(self.pool)
            .await?;

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM employee");
        push_search_filter(&mut count, params.search_term());
        let total: i64 = count.build().fetch_one(self.pool).await?.try_get(0)?;

        let employees = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<_, _>>()?;

        Ok(EmployeePage { employees, total })
    }

    /// Get an employee by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get(&self, id: EmployeeId) -> Result<Option<Employee>, RepositoryError> {
        let row: Option<EmployeeRow> = sqlx::query_as(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employee WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Check whether an email is already taken, optionally excluding one
    /// record (used by update so a record may keep its own email).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn email_exists(
        &self,
        email: &Email,
        exclude: Option<EmployeeId>,
    ) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(
                 SELECT 1 FROM employee
                 WHERE email = $1 AND ($2::uuid IS NULL OR id <> $2)
             )",
        )
        .bind(email.as_str())
        .bind(exclude.map(|id| id.as_uuid()))
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// Insert a new employee and return the persisted record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` when the unique email index
    /// rejects the row (the backstop for concurrent writers that pass the
    /// [`Self::email_exists`] pre-check).
    /// Returns `RepositoryError::Database` for other failures.
    pub async fn insert(&self, new: &NewEmployee) -> Result<Employee, RepositoryError> {
        let address = new.address.clone().unwrap_or_default();

        let row: EmployeeRow = sqlx::query_as(&format!(
            "INSERT INTO employee
                 (first_name, last_name, email, salary, hired_on,
                  department, position, phone, street, city, state, zip_code, country)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
             RETURNING {EMPLOYEE_COLUMNS}"
        ))
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(new.email.as_str())
        .bind(new.salary)
        .bind(new.hired_on)
        .bind(&new.department)
        .bind(&new.position)
        .bind(new.phone.as_ref().map(Phone::as_str))
        .bind(&address.street)
        .bind(&address.city)
        .bind(&address.state)
        .bind(&address.zip_code)
        .bind(&address.country)
        .fetch_one(self.pool)
        .await
        .map_err(map_unique_violation)?;

        row.try_into()
    }

    /// Replace an employee's fields with an already-merged, validated record.
    /// Returns `None` when the id does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on a unique email violation.
    /// Returns `RepositoryError::Database` for other failures.
    pub async fn update(
        &self,
        id: EmployeeId,
        new: &NewEmployee,
    ) -> Result<Option<Employee>, RepositoryError> {
        let address = new.address.clone().unwrap_or_default();

        let row: Option<EmployeeRow> = sqlx::query_as(&format!(
            "UPDATE employee SET
                 first_name = $2, last_name = $3, email = $4, salary = $5,
                 hired_on = $6, department = $7, position = $8, phone = $9,
                 street = $10, city = $11, state = $12, zip_code = $13,
                 country = $14, updated_at = now()
             WHERE id = $1
             RETURNING {EMPLOYEE_COLUMNS}"
        ))
        .bind(id.as_uuid())
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(new.email.as_str())
        .bind(new.salary)
        .bind(new.hired_on)
        .bind(&new.department)
        .bind(&new.position)
        .bind(new.phone.as_ref().map(Phone::as_str))
        .bind(&address.street)
        .bind(&address.city)
        .bind(&address.state)
        .bind(&address.zip_code)
        .bind(&address.country)
        .fetch_optional(self.pool)
        .await
        .map_err(map_unique_violation)?;

        row.map(TryInto::try_into).transpose()
    }

    /// Hard-delete an employee, returning confirmation data, or `None` when
    /// the id does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: EmployeeId) -> Result<Option<DeletedEmployee>, RepositoryError> {
        let row = sqlx::query(
            "DELETE FROM employee WHERE id = $1 RETURNING id, first_name, last_name",
        )
        .bind(id.as_uuid())
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| {
            Ok(DeletedEmployee {
                id: EmployeeId::from_uuid(r.try_get("id")?),
                first_name: r.try_get("first_name")?,
                last_name: r.try_get("last_name")?,
            })
        })
        .transpose()
    }

    /// Compute collection-wide statistics: total count, average salary, and
    /// per-department counts sorted by count descending.
    ///
    /// Three independent full-collection aggregate passes; fine at
    /// internal-tool scale, not built for high QPS.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn stats(&self) -> Result<EmployeeStats, RepositoryError> {
        let total_employees: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM employee")
            .fetch_one(self.pool)
            .await?;

        let average_salary: Option<Decimal> = sqlx::query_scalar("SELECT AVG(salary) FROM employee")
            .fetch_one(self.pool)
            .await?;

        let department_stats: Vec<DepartmentCount> = sqlx::query_as(
            "SELECT COALESCE(department, 'unassigned') AS department, COUNT(*) AS count
             FROM employee
             GROUP BY department
             ORDER BY count DESC",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(EmployeeStats {
            total_employees,
            average_salary: average_salary.unwrap_or_default(),
            department_stats,
        })
    }
}

/// Map a unique-index violation to `Conflict`, passing other errors through.
fn map_unique_violation(err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepositoryError::Conflict("employee email already in use".to_string())
        }
        other => RepositoryError::Database(other),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_key_from_api() {
        assert_eq!(SortKey::from_api("firstName"), SortKey::FirstName);
        assert_eq!(SortKey::from_api("salary"), SortKey::Salary);
        assert_eq!(SortKey::from_api("date"), SortKey::HiredOn);
        // Unknown keys fall back to the default ordering
        assert_eq!(SortKey::from_api("createdAt"), SortKey::CreatedAt);
        assert_eq!(SortKey::from_api("__proto__"), SortKey::CreatedAt);
        assert_eq!(SortKey::from_api(""), SortKey::CreatedAt);
    }

    #[test]
    fn test_sort_key_columns_are_whitelisted() {
        // Every column is a fixed identifier, never client input
        for key in [
            SortKey::FirstName,
            SortKey::LastName,
            SortKey::Email,
            SortKey::Salary,
            SortKey::HiredOn,
            SortKey::Department,
            SortKey::Position,
            SortKey::CreatedAt,
            SortKey::UpdatedAt,
        ] {
            assert!(key.column().chars().all(|c| c.is_ascii_lowercase() || c == '_'));
        }
    }

    #[test]
    fn test_sort_order_from_api() {
        assert_eq!(SortOrder::from_api("asc"), SortOrder::Asc);
        assert_eq!(SortOrder::from_api("ASC"), SortOrder::Asc);
        assert_eq!(SortOrder::from_api("desc"), SortOrder::Desc);
        assert_eq!(SortOrder::from_api("sideways"), SortOrder::Desc);
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_list_params_window() {
        let params = ListParams {
            page: 3,
            limit: 10,
            ..ListParams::default()
        };
        assert_eq!(params.offset(), 20);
        assert_eq!(params.limit(), 10);
    }

    #[test]
    fn test_list_params_clamp_below_one() {
        let params = ListParams {
            page: 0,
            limit: 0,
            ..ListParams::default()
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), 1);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_list_params_window_never_overflows() {
        let params = ListParams {
            page: u32::MAX,
            limit: u32::MAX,
            ..ListParams::default()
        };
        // (page-1)*limit exceeds i64; the window must clamp instead
        assert_eq!(params.offset(), i64::MAX);
        assert!(params.offset() >= 0);
        assert_eq!(params.limit(), i64::from(u32::MAX));
    }

    #[test]
    fn test_search_term_ignores_blank() {
        let params = ListParams {
            search: Some("   ".to_string()),
            ..ListParams::default()
        };
        assert_eq!(params.search_term(), None);

        let params = ListParams {
            search: Some("  lee ".to_string()),
            ..ListParams::default()
        };
        assert_eq!(params.search_term(), Some("lee"));
    }

    #[test]
    fn test_search_filter_sql_shape() {
        let mut query = QueryBuilder::new("SELECT COUNT(*) FROM employee");
        push_search_filter(&mut query, Some("lee"));
        let sql = query.sql();
        assert!(sql.contains("WHERE first_name ILIKE $1"));
        assert!(sql.contains("OR position ILIKE $5"));
    }

    #[test]
    fn test_search_filter_absent_when_no_term() {
        let mut query = QueryBuilder::new("SELECT COUNT(*) FROM employee");
        push_search_filter(&mut query, None);
        assert_eq!(query.sql(), "SELECT COUNT(*) FROM employee");
    }
}
