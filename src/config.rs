//! Gatekeeper configuration management

use crate::error::{Error, Result};
use crate::store::FileStoreProvider;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main Gatekeeper configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatekeeperConfig {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Registry storage configuration
    pub storage: StorageConfig,

    /// Vault backend configuration
    pub vault: VaultConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl GatekeeperConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Reject settings the server cannot start with
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(Error::Config("server.host must not be empty".to_string()));
        }
        if self.server.request_timeout_secs == 0 {
            return Err(Error::Config(
                "server.request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.vault.backend == VaultBackend::Http {
            if self.vault.url.trim().is_empty() {
                return Err(Error::Config(
                    "vault.url is required for the http backend".to_string(),
                ));
            }
            if self.vault.timeout_secs == 0 {
                return Err(Error::Config(
                    "vault.timeout_secs must be greater than 0".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Allowed CORS origins (empty = any)
    pub cors_origins: Vec<String>,

    /// Deadline for a single protect call
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            cors_origins: Vec::new(),
            request_timeout_secs: 30,
        }
    }
}

/// Registry storage backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    File,
}

/// Registry storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,

    /// Base directory for the file backend
    pub base_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            base_dir: FileStoreProvider::default_dir(),
        }
    }
}

/// Vault backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VaultBackend {
    /// In-process vault, contents are lost on restart
    Memory,
    Http,
}

/// Vault configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    pub backend: VaultBackend,

    /// Base URL of the document vault service
    pub url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl VaultConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            backend: VaultBackend::Memory,
            url: "http://127.0.0.1:9099".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable output
    pub json: bool,

    /// Default filter when RUST_LOG is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            json: false,
            level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = GatekeeperConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert!(config.storage.base_dir.ends_with(".gatekeeper/data"));
        assert_eq!(config.vault.backend, VaultBackend::Memory);
        assert!(!config.logging.json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = GatekeeperConfig::from_toml(
            r#"
            [server]
            port = 9000

            [vault]
            backend = "http"
            url = "http://vault.internal:9099"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.vault.backend, VaultBackend::Http);
        assert_eq!(config.vault.url, "http://vault.internal:9099");
        assert_eq!(config.vault.timeout_secs, 10);
        assert_eq!(config.storage.backend, StorageBackend::File);
    }

    #[test]
    fn test_unknown_backend_is_config_error() {
        let err = GatekeeperConfig::from_toml("[storage]\nbackend = \"redis\"\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = GatekeeperConfig::default();
        config.server.request_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = GatekeeperConfig::default();
        config.vault.backend = VaultBackend::Http;
        config.vault.url = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[storage]\nbackend = \"memory\"\n\n[logging]\njson = true"
        )
        .unwrap();

        let config = GatekeeperConfig::load(file.path()).unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert!(config.logging.json);
    }

    #[test]
    fn test_load_missing_file() {
        let err = GatekeeperConfig::load(Path::new("/nonexistent/gatekeeper.toml")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_serialize_roundtrip_through_toml() {
        let config = GatekeeperConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed = GatekeeperConfig::from_toml(&text).unwrap();
        assert_eq!(parsed.server.port, config.server.port);
        assert_eq!(parsed.storage.base_dir, config.storage.base_dir);
    }
}
