//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! staffdesk-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `STAFFDESK_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)

use secrecy::SecretString;

use staffdesk_server::db;

/// Run the server crate's migrations against the configured database.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails,
/// or a migration fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = database_url()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}

/// Resolve the database URL, preferring the staffdesk-specific variable.
pub fn database_url() -> Result<SecretString, Box<dyn std::error::Error>> {
    std::env::var("STAFFDESK_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| "STAFFDESK_DATABASE_URL not set".into())
}
