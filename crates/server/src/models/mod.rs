//! Domain models for the staffdesk server.

pub mod employee;

pub use employee::{Address, Employee, EmployeeInput, FieldError, NewEmployee};
