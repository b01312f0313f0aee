//! Application settings
//!
//! Settings come from environment variables with sensible defaults. An
//! optional `.env` file in the working directory is exported into the
//! process environment first, so local runs can keep credentials out of the
//! shell profile.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::client::{Language, Region};

/// Application environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[value(alias = "dev")]
    Development,
    #[value(alias = "prod")]
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::Development
    }
}

impl std::str::FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            _ => anyhow::bail!("Invalid environment: {}. Expected: development or production", s),
        }
    }
}

/// Main application settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    // App settings
    pub app_name: String,
    pub app_version: String,
    pub environment: Environment,
    pub log_level: String,

    // Server settings
    pub host: String,
    pub port: u16,

    // Game account
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,

    // Game connection
    pub region: Region,
    pub language: Language,
    /// Overrides the region's default game server endpoint
    pub server_addr: Option<String>,
}

impl Settings {
    /// Load settings from environment variables with defaults
    pub fn load() -> Result<Self> {
        // Export the optional .env file before reading the environment
        load_env_file(Path::new(".env"));

        let settings = Self {
            // App settings
            app_name: env_or_default("APP_NAME", "spiral-knights-api"),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            environment: env_or_default("ENVIRONMENT", "development")
                .parse()
                .unwrap_or_default(),
            log_level: env_or_default("LOG_LEVEL", "info"),

            // Server settings
            host: env_or_default("HOST", "0.0.0.0"),
            port: env_or_default("PORT", "8080")
                .parse()
                .context("Invalid PORT value")?,

            // Game account
            username: env::var("SPIRAL_KNIGHTS_USERNAME").unwrap_or_default(),
            password: env::var("SPIRAL_KNIGHTS_PASSWORD").unwrap_or_default(),

            // Game connection
            region: env_or_default("SK_REGION", "eu-west")
                .parse()
                .context("Invalid SK_REGION value")?,
            language: env_or_default("SK_LANGUAGE", "english")
                .parse()
                .context("Invalid SK_LANGUAGE value")?,
            server_addr: env::var("SK_SERVER_ADDR").ok(),
        };

        settings.validate()?;

        Ok(settings)
    }

    /// Validate settings
    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("Port cannot be 0");
        }
        if self.username.is_empty() {
            anyhow::bail!("SPIRAL_KNIGHTS_USERNAME must be set");
        }
        if self.password.is_empty() {
            anyhow::bail!("SPIRAL_KNIGHTS_PASSWORD must be set");
        }

        Ok(())
    }

    /// Check if running in development mode
    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    /// Get the server address string
    pub fn server_bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: "spiral-knights-api".to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            environment: Environment::Development,
            log_level: "info".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8080,
            username: String::new(),
            password: String::new(),
            region: Region::EuWest,
            language: Language::English,
            server_addr: None,
        }
    }
}

/// Export `KEY=VALUE` lines from an environment file into the process
/// environment.
///
/// A missing file is fine. Lines are parsed independently: `#` comments and
/// lines that do not parse as `KEY=VALUE` are skipped, already-set
/// variables are left alone, and the value after the first `=` is taken
/// verbatim.
pub fn load_env_file(path: &Path) {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable environment file");
            return;
        }
    };

    for (number, line) in contents.lines().enumerate() {
        if let Err(e) = dotenvy::from_read(line.as_bytes()) {
            tracing::debug!(
                path = %path.display(),
                line = number + 1,
                error = %e,
                "Skipping environment file line"
            );
        }
    }

    tracing::debug!(path = %path.display(), "Loaded environment file");
}

/// Helper function to get environment variable with default
fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_env(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.app_name, "spiral-knights-api");
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.region, Region::EuWest);
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!(
            "development".parse::<Environment>().unwrap(),
            Environment::Development
        );
        assert_eq!("dev".parse::<Environment>().unwrap(), Environment::Development);
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Production);
        assert!("quality-assurance".parse::<Environment>().is_err());
    }

    #[test]
    fn test_validate_requires_credentials() {
        let settings = Settings::default();
        assert!(settings.validate().is_err());

        let settings = Settings {
            username: "knight".to_string(),
            password: "hunter2".to_string(),
            ..Settings::default()
        };
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_server_bind_addr() {
        let settings = Settings::default();
        assert_eq!(settings.server_bind_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_env_file_exports_key_value_pairs() {
        let (_dir, path) = write_env("SKA_TEST_PLAIN=bar\n");

        load_env_file(&path);
        assert_eq!(env::var("SKA_TEST_PLAIN").unwrap(), "bar");
    }

    #[test]
    fn test_env_file_skips_comments() {
        let (_dir, path) = write_env("#SKA_TEST_COMMENTED=bar\n");

        load_env_file(&path);
        assert!(env::var("SKA_TEST_COMMENTED").is_err());
    }

    #[test]
    fn test_env_file_value_keeps_everything_after_first_equals() {
        let (_dir, path) = write_env("SKA_TEST_MULTI=a=b=c\n");

        load_env_file(&path);
        assert_eq!(env::var("SKA_TEST_MULTI").unwrap(), "a=b=c");
    }

    #[test]
    fn test_env_file_line_without_equals_sets_nothing() {
        let (_dir, path) = write_env("SKA_TEST_NO_EQUALS\n");

        load_env_file(&path);
        assert!(env::var("SKA_TEST_NO_EQUALS").is_err());
    }

    #[test]
    fn test_env_file_skips_malformed_lines_individually() {
        let (_dir, path) = write_env(
            "this line has no equals\nSKA_TEST_MIXED=bar\nanother bad line\nSKA_TEST_MIXED_TAIL=baz\n",
        );

        load_env_file(&path);
        assert_eq!(env::var("SKA_TEST_MIXED").unwrap(), "bar");
        assert_eq!(env::var("SKA_TEST_MIXED_TAIL").unwrap(), "baz");
    }

    #[test]
    fn test_missing_env_file_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");

        let missing = fs::metadata(&path).map(|_| ()).unwrap_err();
        assert_eq!(missing.kind(), ErrorKind::NotFound);
        // Must not panic or warn-exit; nothing to assert beyond that
        load_env_file(&path);
    }
}
