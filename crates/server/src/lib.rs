//! Staffdesk server library.
//!
//! This crate provides the employee-records API as a library, allowing it to
//! be tested and reused (the CLI uses it for seeding).

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
