//! Environment variable parsing helpers
//!
//! Provides ergonomic helpers for reading configuration from environment variables.

use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

/// Extension trait for parsing environment variables.
///
/// Provides convenient methods for reading env vars with defaults, required values,
/// and type parsing.
pub trait ConfigExt {
    /// Get an environment variable with a default value.
    ///
    /// # Example
    /// ```ignore
    /// let host = String::env_or("DB_HOST", "localhost");
    /// ```
    fn env_or(name: &str, default: &str) -> String {
        env::var(name).unwrap_or_else(|_| default.to_string())
    }

    /// Get a required environment variable, returning an error if not set.
    ///
    /// # Example
    /// ```ignore
    /// let password = String::env_required("ADMIN_PASSWORD")?;
    /// ```
    fn env_required(name: &str) -> Result<String> {
        env::var(name).context(format!("{} must be set", name))
    }

    /// Get an environment variable as a boolean.
    ///
    /// Returns `true` if the value is "true" (case-insensitive), otherwise `default`.
    fn env_bool(name: &str, default: bool) -> bool {
        env::var(name)
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(default)
    }

    /// Get an environment variable parsed as a specific type.
    ///
    /// Returns `default` if the variable is not set or fails to parse.
    ///
    /// # Example
    /// ```ignore
    /// let port: u16 = u16::env_parse("DB_PORT", 3306);
    /// ```
    fn env_parse<T: FromStr>(name: &str, default: T) -> T {
        env::var(name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }
}

// Blanket implementation for all types
impl<T> ConfigExt for T {}

/// Connection settings for the municipal application database.
///
/// Every field has a default matching the local development setup, so the
/// tools run against a stock XAMPP-style MySQL without any environment set.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl DbConfig {
    /// Load connection settings from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: String::env_or("DB_HOST", "localhost"),
            port: u16::env_parse("DB_PORT", 3306),
            user: String::env_or("DB_USER", "root"),
            password: String::env_or("DB_PASSWORD", ""),
            database: String::env_or("DB_NAME", "municipalidad_yau"),
        }
    }

    /// Connection URL for log output. The password is never included.
    pub fn display_url(&self) -> String {
        format!(
            "mysql://{}@{}:{}/{}",
            self.user, self.host, self.port, self.database
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_url_omits_password() {
        let config = DbConfig {
            host: "localhost".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: "secret".to_string(),
            database: "municipalidad_yau".to_string(),
        };
        assert_eq!(
            config.display_url(),
            "mysql://root@localhost:3306/municipalidad_yau"
        );
        assert!(!config.display_url().contains("secret"));
    }

    #[test]
    fn test_display_url_with_empty_password() {
        let config = DbConfig {
            host: "localhost".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: String::new(),
            database: "municipalidad_yau".to_string(),
        };
        assert_eq!(
            config.display_url(),
            "mysql://root@localhost:3306/municipalidad_yau"
        );
    }
}
