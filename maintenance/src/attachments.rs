//! MySQL repair pass for large file attachments
//!
//! The public trámite form serializes uploaded documents into text columns
//! on `tramites`. Stock server defaults cap uploads well below what the
//! municipality needs: `max_allowed_packet` rejects big statements and the
//! TEXT column type truncates the payload. This pass reports the current
//! server configuration, applies best-effort runtime tuning, and upgrades
//! the attachment columns to LONGTEXT.

use anyhow::{Context, Result};
use common::db::{self, ColumnInfo};
use sqlx::MySqlPool;
use tracing::{info, warn};

/// Minimum usable `max_allowed_packet` for attachment uploads: 256 MiB.
pub const MIN_PACKET_BYTES: u64 = 268435456;

/// Table holding citizen requests and their serialized attachments.
pub const ATTACHMENTS_TABLE: &str = "tramites";

/// Columns holding serialized attachment payloads.
pub const ATTACHMENT_COLUMNS: [&str; 2] = ["documentos_adjuntos", "documentos_admin"];

/// Runtime variables worth raising for large uploads, with target values.
/// `SET GLOBAL` does not survive a server restart; persistent values must
/// go into the server config file.
const GLOBAL_TUNING: [(&str, &str); 5] = [
    ("max_allowed_packet", "268435456"),
    ("net_read_timeout", "600"),
    ("net_write_timeout", "600"),
    ("wait_timeout", "28800"),
    ("interactive_timeout", "28800"),
];

/// Current `max_allowed_packet` reading.
#[derive(Debug, Clone, Copy)]
pub struct PacketStatus {
    pub bytes: u64,
    pub sufficient: bool,
}

/// Summary of a repair run.
#[derive(Debug, Default)]
pub struct RepairReport {
    /// Variables successfully raised at runtime.
    pub tuned_variables: Vec<String>,
    /// Columns altered to LONGTEXT in this run.
    pub upgraded_columns: Vec<String>,
    /// Packet size after the pass, if the server reported one.
    pub packet: Option<PacketStatus>,
}

/// Whether a packet size is big enough for attachment uploads.
pub fn packet_sufficient(bytes: u64) -> bool {
    bytes >= MIN_PACKET_BYTES
}

/// Columns whose type still needs the LONGTEXT upgrade.
///
/// Columns already `longtext` are left alone, which keeps re-runs free of
/// writes.
pub fn columns_needing_upgrade(columns: &[ColumnInfo]) -> Vec<String> {
    columns
        .iter()
        .filter(|column| !column.data_type.eq_ignore_ascii_case("longtext"))
        .map(|column| column.name.clone())
        .collect()
}

fn bytes_to_mib(bytes: u64) -> u64 {
    bytes / (1024 * 1024)
}

async fn packet_status(pool: &MySqlPool) -> Result<Option<PacketStatus>> {
    let Some(raw) = db::server_variable(pool, "max_allowed_packet").await? else {
        return Ok(None);
    };

    let bytes: u64 = raw
        .parse()
        .context(format!("Unexpected max_allowed_packet value: {}", raw))?;

    Ok(Some(PacketStatus {
        bytes,
        sufficient: packet_sufficient(bytes),
    }))
}

fn log_column_types(columns: &[ColumnInfo]) {
    for column in columns {
        if column.data_type.eq_ignore_ascii_case("longtext") {
            info!(column = %column.name, "Column is LONGTEXT");
        } else {
            warn!(
                column = %column.name,
                data_type = %column.data_type,
                max_length = ?column.max_length,
                "Column needs upgrade to LONGTEXT"
            );
        }
    }
}

fn log_persistence_instructions() {
    warn!("max_allowed_packet is below 256 MiB and the runtime change did not stick");
    warn!("Add under [mysqld] in the server config file (my.cnf / my.ini):");
    warn!("  max_allowed_packet=256M");
    warn!("  net_read_timeout=600");
    warn!("  net_write_timeout=600");
    warn!("Then restart MySQL and re-run this tool to verify");
}

/// Run the full repair pass against the application schema.
///
/// Privilege failures on `SET GLOBAL` and per-column ALTER failures are
/// warnings; the pass keeps going and reports what it could do.
pub async fn repair_attachment_storage(pool: &MySqlPool, schema: &str) -> Result<RepairReport> {
    let mut report = RepairReport::default();

    // Current server configuration
    match packet_status(pool).await? {
        Some(status) => {
            info!(
                mib = bytes_to_mib(status.bytes),
                sufficient = status.sufficient,
                "Current max_allowed_packet"
            );
            if !status.sufficient {
                warn!("max_allowed_packet is too small for large attachments");
            }
        }
        None => warn!("Server did not report max_allowed_packet"),
    }

    // Best-effort runtime tuning
    for (name, value) in GLOBAL_TUNING {
        match db::set_global_variable(pool, name, value).await {
            Ok(()) => {
                info!(variable = name, value, "Runtime variable set");
                report.tuned_variables.push(name.to_string());
            }
            Err(e) => {
                warn!(
                    variable = name,
                    error = %e,
                    "Could not set variable (requires SUPER or SYSTEM_VARIABLES_ADMIN)"
                );
            }
        }
    }

    // Column inspection
    info!(table = ATTACHMENTS_TABLE, "Inspecting attachment columns");
    let columns = db::column_types(pool, schema, ATTACHMENTS_TABLE, &ATTACHMENT_COLUMNS).await?;
    log_column_types(&columns);

    // Column upgrades
    let pending = columns_needing_upgrade(&columns);
    if pending.is_empty() {
        info!("All attachment columns are already LONGTEXT");
    }
    for name in &pending {
        let sql = format!(
            "ALTER TABLE {} MODIFY COLUMN {} LONGTEXT",
            ATTACHMENTS_TABLE, name
        );
        match sqlx::query(&sql).execute(pool).await {
            Ok(_) => {
                info!(column = %name, "Column upgraded to LONGTEXT");
                report.upgraded_columns.push(name.clone());
            }
            Err(e) => {
                warn!(column = %name, error = %e, "Failed to upgrade column");
            }
        }
    }

    // Final verification
    let packet = packet_status(pool).await?;
    match packet {
        Some(status) if status.sufficient => {
            info!(
                mib = bytes_to_mib(status.bytes),
                "max_allowed_packet is sufficient for large attachments"
            );
        }
        Some(_) => log_persistence_instructions(),
        None => {}
    }
    report.packet = packet;

    let final_columns =
        db::column_types(pool, schema, ATTACHMENTS_TABLE, &ATTACHMENT_COLUMNS).await?;
    log_column_types(&final_columns);

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, data_type: &str) -> ColumnInfo {
        ColumnInfo {
            name: name.to_string(),
            data_type: data_type.to_string(),
            max_length: None,
        }
    }

    #[test]
    fn test_packet_threshold() {
        assert!(packet_sufficient(268435456));
        assert!(packet_sufficient(1073741824));
        assert!(!packet_sufficient(268435455));
        assert!(!packet_sufficient(67108864));
    }

    #[test]
    fn test_longtext_columns_are_left_alone() {
        let columns = vec![
            column("documentos_adjuntos", "longtext"),
            column("documentos_admin", "longtext"),
        ];
        assert!(columns_needing_upgrade(&columns).is_empty());
    }

    #[test]
    fn test_text_columns_are_flagged() {
        let columns = vec![
            column("documentos_adjuntos", "text"),
            column("documentos_admin", "longtext"),
        ];
        assert_eq!(
            columns_needing_upgrade(&columns),
            vec!["documentos_adjuntos".to_string()]
        );
    }

    #[test]
    fn test_type_comparison_ignores_case() {
        let columns = vec![column("documentos_adjuntos", "LONGTEXT")];
        assert!(columns_needing_upgrade(&columns).is_empty());
    }
}
