//! Administrator account inspection and repair
//!
//! Ensures the well-known administrator row in `usuarios` exists and holds a
//! bcrypt hash of the operator-supplied password. Hashes are produced with
//! the `bcrypt` crate and stay interoperable with the `$2b$` hashes the web
//! application already stores.

use anyhow::{Context, Result};
use bcrypt::{hash, verify, DEFAULT_COST};
use sqlx::MySqlPool;
use tracing::{info, warn};

/// DNI of the well-known administrator account.
pub const DEFAULT_ADMIN_DNI: &str = "12345678";

const ADMIN_NOMBRES: &str = "Administrador";
const ADMIN_APELLIDOS: &str = "Municipal";
const ADMIN_EMAIL: &str = "alcalde@municipalidad-yau.gob.pe";
const ADMIN_ROLE: &str = "administrador";
const ADMIN_BIRTH_DATE: &str = "1980-01-01";
const ADMIN_PHONE: &str = "999999999";
const ADMIN_ADDRESS: &str = "Municipalidad Provincial de Yau";

/// Administrator row as stored in `usuarios`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdminRecord {
    pub id: i32,
    pub dni: String,
    pub nombres: String,
    pub apellidos: String,
    pub email: String,
    pub tipo_usuario: String,
    pub password_hash: Option<String>,
}

/// What `bootstrap_admin` did to the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminOutcome {
    /// No row existed; a full administrator row was inserted.
    Created,
    /// The stored hash verifies against the supplied password; no writes.
    AlreadyValid,
    /// The row had no usable hash; one was set.
    PasswordSet,
    /// The stored hash did not match (or was not bcrypt); it was replaced.
    PasswordUpdated,
}

/// State of a stored credential relative to the supplied password.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialState {
    Valid,
    Missing,
    Mismatch,
    Unreadable,
}

/// Classify a stored hash against the supplied password.
pub fn classify_credential(stored_hash: Option<&str>, password: &str) -> CredentialState {
    let Some(stored) = stored_hash else {
        return CredentialState::Missing;
    };
    if stored.trim().is_empty() {
        return CredentialState::Missing;
    }
    match verify(password, stored) {
        Ok(true) => CredentialState::Valid,
        Ok(false) => CredentialState::Mismatch,
        Err(_) => CredentialState::Unreadable,
    }
}

async fn set_password(pool: &MySqlPool, dni: &str, password: &str) -> Result<()> {
    let password_hash = hash(password, DEFAULT_COST).context("Failed to hash password")?;

    sqlx::query("UPDATE usuarios SET password_hash = ? WHERE dni = ?")
        .bind(&password_hash)
        .bind(dni)
        .execute(pool)
        .await
        .context("Failed to update administrator password hash")?;

    Ok(())
}

async fn create_admin(pool: &MySqlPool, dni: &str, password: &str) -> Result<()> {
    let password_hash = hash(password, DEFAULT_COST).context("Failed to hash password")?;

    sqlx::query(
        "INSERT INTO usuarios (dni, nombres, apellidos, email, password_hash, \
         tipo_usuario, fecha_nacimiento, telefono, direccion) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(dni)
    .bind(ADMIN_NOMBRES)
    .bind(ADMIN_APELLIDOS)
    .bind(ADMIN_EMAIL)
    .bind(&password_hash)
    .bind(ADMIN_ROLE)
    .bind(ADMIN_BIRTH_DATE)
    .bind(ADMIN_PHONE)
    .bind(ADMIN_ADDRESS)
    .execute(pool)
    .await
    .context("Failed to insert administrator account")?;

    Ok(())
}

/// Ensure the administrator account exists with a usable password hash.
///
/// Looks up the row by DNI, then creates it, leaves it untouched, or resets
/// its hash depending on what is stored. The password itself is never logged.
pub async fn bootstrap_admin(pool: &MySqlPool, dni: &str, password: &str) -> Result<AdminOutcome> {
    let admin: Option<AdminRecord> = sqlx::query_as(
        "SELECT id, dni, nombres, apellidos, email, tipo_usuario, password_hash \
         FROM usuarios WHERE dni = ?",
    )
    .bind(dni)
    .fetch_optional(pool)
    .await
    .context("Failed to look up administrator account")?;

    let Some(admin) = admin else {
        info!(dni, "Administrator account missing, creating it");
        create_admin(pool, dni, password).await?;
        info!(dni, email = ADMIN_EMAIL, "Administrator account created");
        return Ok(AdminOutcome::Created);
    };

    info!(
        dni = %admin.dni,
        nombres = %admin.nombres,
        apellidos = %admin.apellidos,
        email = %admin.email,
        role = %admin.tipo_usuario,
        "Administrator account exists"
    );

    match classify_credential(admin.password_hash.as_deref(), password) {
        CredentialState::Valid => {
            info!("Stored password hash verifies, nothing to do");
            Ok(AdminOutcome::AlreadyValid)
        }
        CredentialState::Missing => {
            warn!("Account has no password hash, setting one");
            set_password(pool, dni, password).await?;
            info!("Password hash set");
            Ok(AdminOutcome::PasswordSet)
        }
        CredentialState::Mismatch => {
            warn!("Stored hash does not match the supplied password, resetting");
            set_password(pool, dni, password).await?;
            info!("Password hash updated");
            Ok(AdminOutcome::PasswordUpdated)
        }
        CredentialState::Unreadable => {
            warn!("Stored hash is not a readable bcrypt hash, resetting");
            set_password(pool, dni, password).await?;
            info!("Password hash updated");
            Ok(AdminOutcome::PasswordUpdated)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Cost 4 is the bcrypt minimum; enough for tests and much faster than
    // DEFAULT_COST.
    const TEST_COST: u32 = 4;

    #[test]
    fn test_missing_hash() {
        assert_eq!(
            classify_credential(None, "Admin2024!"),
            CredentialState::Missing
        );
        assert_eq!(
            classify_credential(Some(""), "Admin2024!"),
            CredentialState::Missing
        );
        assert_eq!(
            classify_credential(Some("   "), "Admin2024!"),
            CredentialState::Missing
        );
    }

    #[test]
    fn test_matching_hash_is_valid() {
        let hashed = hash("Admin2024!", TEST_COST).unwrap();
        assert_eq!(
            classify_credential(Some(&hashed), "Admin2024!"),
            CredentialState::Valid
        );
    }

    #[test]
    fn test_wrong_password_is_mismatch() {
        let hashed = hash("Admin2024!", TEST_COST).unwrap();
        assert_eq!(
            classify_credential(Some(&hashed), "not-the-password"),
            CredentialState::Mismatch
        );
    }

    #[test]
    fn test_non_bcrypt_hash_is_unreadable() {
        assert_eq!(
            classify_credential(Some("plaintext-password"), "Admin2024!"),
            CredentialState::Unreadable
        );
    }
}
