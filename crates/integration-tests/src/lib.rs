//! Integration tests for Staffdesk.
//!
//! # Running Tests
//!
//! ```bash
//! # Start PostgreSQL and run migrations
//! cargo run -p staffdesk-cli -- migrate
//!
//! # Start the server
//! cargo run -p staffdesk-server
//!
//! # Run the (ignored-by-default) integration tests
//! cargo test -p staffdesk-integration-tests -- --ignored
//! ```
//!
//! The tests live under `tests/` and talk to a running server over HTTP;
//! they are `#[ignore]`-gated so a plain `cargo test` stays self-contained.
