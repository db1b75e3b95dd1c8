//! Seed the database with sample employees for local development.
//!
//! Seeding is idempotent per email: an employee whose generated email is
//! already present is skipped, so re-running the command never duplicates
//! records (the unique index would reject them anyway).

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use tracing::info;

use staffdesk_core::Email;
use staffdesk_server::db::{self, EmployeeRepository};
use staffdesk_server::models::NewEmployee;

use super::migrate::database_url;

const FIRST_NAMES: [&str; 10] = [
    "Ann", "Ben", "Carla", "Dmitri", "Elena", "Farid", "Grace", "Hector", "Iris", "Jonas",
];
const LAST_NAMES: [&str; 10] = [
    "Lee", "Okafor", "Smith", "Ivanova", "Garcia", "Nguyen", "Muller", "Rossi", "Tanaka", "Brown",
];
const DEPARTMENTS: [Option<&str>; 5] = [
    Some("Engineering"),
    Some("Sales"),
    Some("Finance"),
    Some("Operations"),
    None,
];
const POSITIONS: [Option<&str>; 4] = [
    Some("Analyst"),
    Some("Manager"),
    Some("Engineer"),
    None,
];

/// Insert `count` sample employees.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails,
/// or a write fails.
pub async fn run(count: usize) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = database_url()?;

    info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;
    let repo = EmployeeRepository::new(&pool);

    let mut inserted = 0usize;
    for i in 0..count {
        let first = FIRST_NAMES[i % FIRST_NAMES.len()];
        let last = LAST_NAMES[(i / FIRST_NAMES.len() + i) % LAST_NAMES.len()];
        let email = Email::parse(&format!(
            "{}.{}{}@staffdesk.test",
            first.to_lowercase(),
            last.to_lowercase(),
            i
        ))?;

        if repo.email_exists(&email, None).await? {
            continue;
        }

        let new = NewEmployee {
            first_name: first.to_string(),
            last_name: last.to_string(),
            email,
            salary: Decimal::from(45_000 + 2_500 * (i as i64 % 20)),
            hired_on: Utc::now() - Duration::days(30 * i as i64),
            department: DEPARTMENTS[i % DEPARTMENTS.len()].map(str::to_string),
            position: POSITIONS[i % POSITIONS.len()].map(str::to_string),
            phone: None,
            address: None,
        };

        repo.insert(&new).await?;
        inserted += 1;
    }

    info!(inserted, requested = count, "Seeding complete");
    Ok(())
}
