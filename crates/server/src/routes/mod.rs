//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /api/employees                 - Paginated, searchable, sorted listing
//! POST   /api/employees                 - Create employee
//! GET    /api/employees/{id}            - Single employee
//! PUT    /api/employees/{id}            - Update employee (partial merge)
//! DELETE /api/employees/{id}            - Delete employee
//! GET    /api/employees/stats/summary   - Aggregate statistics
//! ```
//!
//! Health endpoints (`/health`, `/health/ready`) are wired directly in
//! `main.rs`.

pub mod employees;

use axum::Router;

use crate::state::AppState;

/// Build the API router.
pub fn routes() -> Router<AppState> {
    Router::new().merge(employees::router())
}
