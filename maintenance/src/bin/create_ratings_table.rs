//! Create the mayor-ratings table
//!
//! Operator-run, idempotent: safe to re-run when the table already exists.

use anyhow::Result;
use common::{connect, init_logging, DbConfig};
use maintenance::ratings::{ensure_ratings_table, TableOutcome};
use tracing::{error, info};

async fn run() -> Result<()> {
    let config = DbConfig::from_env();
    info!(url = %config.display_url(), "Connecting");
    let pool = connect(&config).await?;

    match ensure_ratings_table(&pool, &config.database).await? {
        TableOutcome::Created => info!("Ratings table created successfully"),
        TableOutcome::AlreadyExists => info!("Ratings table already existed, no changes made"),
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let _guard = init_logging("create-ratings-table");

    if let Err(e) = run().await {
        error!(error = %format!("{:#}", e), "create-ratings-table failed");
        std::process::exit(1);
    }
}
