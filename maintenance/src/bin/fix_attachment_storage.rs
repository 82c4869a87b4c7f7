//! Repair MySQL configuration and column types for large file attachments
//!
//! Reports `max_allowed_packet`, applies best-effort runtime tuning, and
//! upgrades the attachment columns on `tramites` to LONGTEXT. Privilege
//! failures are warnings; the pass reports what it could change and what
//! still needs a config-file edit plus server restart.

use anyhow::Result;
use common::{connect, init_logging, DbConfig};
use maintenance::attachments::repair_attachment_storage;
use tracing::{error, info, warn};

async fn run() -> Result<()> {
    let config = DbConfig::from_env();
    info!(url = %config.display_url(), "Connecting");
    let pool = connect(&config).await?;

    let report = repair_attachment_storage(&pool, &config.database).await?;

    info!(
        tuned = report.tuned_variables.len(),
        upgraded = report.upgraded_columns.len(),
        "Repair pass finished"
    );

    match report.packet {
        Some(status) if status.sufficient => {
            info!("Server is ready for large attachments");
            info!("Restart the backend and retry an upload with attachments");
        }
        _ => {
            warn!("Server still needs a persistent max_allowed_packet change");
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let _guard = init_logging("fix-attachment-storage");

    if let Err(e) = run().await {
        error!(error = %format!("{:#}", e), "fix-attachment-storage failed");
        std::process::exit(1);
    }
}
