//! Inspect and repair the administrator account
//!
//! Looks up the well-known administrator row by DNI and makes sure it exists
//! with a valid bcrypt password hash. The password is supplied through
//! ADMIN_PASSWORD; it is deliberately not a source literal and is never
//! logged.

use anyhow::Result;
use common::{connect, init_logging, ConfigExt, DbConfig};
use maintenance::admin::{bootstrap_admin, AdminOutcome, DEFAULT_ADMIN_DNI};
use tracing::{error, info};

async fn run() -> Result<()> {
    let dni = String::env_or("ADMIN_DNI", DEFAULT_ADMIN_DNI);
    let password = String::env_required("ADMIN_PASSWORD")?;

    let config = DbConfig::from_env();
    info!(url = %config.display_url(), "Connecting");
    let pool = connect(&config).await?;

    match bootstrap_admin(&pool, &dni, &password).await? {
        AdminOutcome::Created => {
            info!(dni = %dni, "Administrator created; log in with the supplied password");
        }
        AdminOutcome::AlreadyValid => {
            info!(dni = %dni, "Administrator password is already correct; no changes made");
        }
        AdminOutcome::PasswordSet => {
            info!(dni = %dni, "Administrator had no password; hash set");
        }
        AdminOutcome::PasswordUpdated => {
            info!(dni = %dni, "Administrator password hash updated");
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let _guard = init_logging("verify-admin");

    if let Err(e) = run().await {
        error!(error = %format!("{:#}", e), "verify-admin failed");
        std::process::exit(1);
    }
}
