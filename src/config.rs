//! Configuration management for the clinic client
//!
//! Configuration is resolved in layers: YAML file (or built-in defaults when
//! the file is absent), then `CLINIC_*` environment variables, then CLI
//! flags. [`Config::validate`] runs last.
//!
//! The backend location is always injected from here; nothing in the library
//! guesses it from the runtime environment.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ClinicError, Result};
use crate::models::Language;
use crate::session::store::{FileSessionStore, KeyringSessionStore, MemorySessionStore, SessionStore};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend location and HTTP behaviour
    #[serde(default)]
    pub api: ApiConfig,

    /// Where session entries are persisted
    #[serde(default)]
    pub session: SessionConfig,

    /// Language for exports and text direction
    #[serde(default)]
    pub language: Language,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the API, without the version segment
    ///
    /// The login endpoint lives directly under it (`{base_url}/auth/login`);
    /// resources live under `{base_url}/{version}`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Version segment for resource paths
    #[serde(default = "default_api_version")]
    pub version: String,

    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080/api".to_string()
}

fn default_api_version() -> String {
    "v1".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            version: default_api_version(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl ApiConfig {
    /// Creates a configuration for `base_url` with default version and timeout.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Base URL with any trailing slash removed.
    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Root of the versioned resource collection, e.g. `http://host/api/v1`.
    pub fn versioned_base(&self) -> String {
        let version = self.version.trim_matches('/');
        if version.is_empty() {
            self.base().to_string()
        } else {
            format!("{}/{}", self.base(), version)
        }
    }

    /// Login endpoint, outside the versioned prefix.
    pub fn login_url(&self) -> String {
        format!("{}/auth/login", self.base())
    }

    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Session persistence backend
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    /// Nothing survives the process
    Memory,
    /// JSON file in the data directory
    #[default]
    File,
    /// OS credential store
    Keyring,
}

/// Session persistence configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Backend used to persist the token and user entries
    #[serde(default)]
    pub store: StoreKind,

    /// Overrides the file location for [`StoreKind::File`]
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Overrides the keyring service for [`StoreKind::Keyring`]
    #[serde(default)]
    pub keyring_service: Option<String>,
}

impl SessionConfig {
    /// Opens the configured store.
    ///
    /// # Errors
    ///
    /// Returns an error when the default file location cannot be determined.
    pub fn open_store(&self) -> Result<Arc<dyn SessionStore>> {
        let store: Arc<dyn SessionStore> = match self.store {
            StoreKind::Memory => Arc::new(MemorySessionStore::new()),
            StoreKind::File => match &self.file {
                Some(path) => Arc::new(FileSessionStore::with_path(path)),
                None => Arc::new(FileSessionStore::new()?),
            },
            StoreKind::Keyring => match &self.keyring_service {
                Some(service) => Arc::new(KeyringSessionStore::with_service(service)),
                None => Arc::new(KeyringSessionStore::new()),
            },
        };
        tracing::debug!("Using {:?} session store", self.store);
        Ok(store)
    }
}

/// Log output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ClinicError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| ClinicError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(url) = std::env::var("CLINIC_API_URL") {
            self.api.base_url = url;
        }

        if let Ok(version) = std::env::var("CLINIC_API_VERSION") {
            self.api.version = version;
        }

        if let Ok(timeout) = std::env::var("CLINIC_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.api.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid CLINIC_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(store) = std::env::var("CLINIC_SESSION_STORE") {
            self.session.store = match store.to_lowercase().as_str() {
                "memory" => StoreKind::Memory,
                "file" => StoreKind::File,
                "keyring" => StoreKind::Keyring,
                _ => {
                    tracing::warn!("Invalid session store: {}, keeping {:?}", store, self.session.store);
                    self.session.store
                }
            };
        }

        if let Ok(file) = std::env::var("CLINIC_SESSION_FILE") {
            self.session.file = Some(PathBuf::from(file));
        }

        if let Ok(lang) = std::env::var("CLINIC_LANGUAGE") {
            match Language::from_code(&lang) {
                Some(language) => self.language = language,
                None => tracing::warn!("Unsupported CLINIC_LANGUAGE: {}", lang),
            }
        }

        if let Ok(json_logs) = std::env::var("CLINIC_LOG_JSON") {
            match json_logs.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.logging.json = true,
                "0" | "false" | "no" => self.logging.json = false,
                _ => tracing::warn!("Invalid CLINIC_LOG_JSON: {}", json_logs),
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(url) = &cli.api_url {
            self.api.base_url = url.clone();
        }
        if let Some(store) = cli.store {
            self.session.store = store;
        }
        if let Some(lang) = cli.lang {
            self.language = lang;
        }
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns [`ClinicError::Config`] when the API URL is not an absolute
    /// http(s) URL or the timeout is zero.
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(ClinicError::Config("api.base_url cannot be empty".to_string()).into());
        }

        let url = url::Url::parse(self.api.base()).map_err(|e| {
            ClinicError::Config(format!("Invalid api.base_url {}: {}", self.api.base_url, e))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClinicError::Config(format!(
                "api.base_url must use http or https, got {}",
                url.scheme()
            ))
            .into());
        }

        if self.api.timeout_seconds == 0 {
            return Err(
                ClinicError::Config("api.timeout_seconds must be greater than 0".to_string())
                    .into(),
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use serial_test::serial;

    fn bare_cli() -> Cli {
        Cli {
            config: "config/clinic.yaml".to_string(),
            verbose: false,
            api_url: None,
            store: None,
            lang: None,
            command: Commands::Whoami,
        }
    }

    fn clear_env() {
        for key in [
            "CLINIC_API_URL",
            "CLINIC_API_VERSION",
            "CLINIC_TIMEOUT_SECONDS",
            "CLINIC_SESSION_STORE",
            "CLINIC_SESSION_FILE",
            "CLINIC_LANGUAGE",
            "CLINIC_LOG_JSON",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_api_config_defaults() {
        let api = ApiConfig::default();
        assert_eq!(api.base_url, "http://127.0.0.1:8080/api");
        assert_eq!(api.versioned_base(), "http://127.0.0.1:8080/api/v1");
        assert_eq!(api.login_url(), "http://127.0.0.1:8080/api/auth/login");
        assert_eq!(api.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_trailing_slashes_are_normalized() {
        let api = ApiConfig {
            base_url: "https://clinic.example/api/".into(),
            version: "/v2/".into(),
            timeout_seconds: 5,
        };
        assert_eq!(api.versioned_base(), "https://clinic.example/api/v2");
        assert_eq!(api.login_url(), "https://clinic.example/api/auth/login");
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
api:
  base_url: https://clinic.example/api
  timeout_seconds: 10
session:
  store: keyring
  keyring_service: clinic-staging
language: he
logging:
  json: true
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.api.base_url, "https://clinic.example/api");
        assert_eq!(config.api.version, "v1");
        assert_eq!(config.api.timeout_seconds, 10);
        assert_eq!(config.session.store, StoreKind::Keyring);
        assert_eq!(config.session.keyring_service.as_deref(), Some("clinic-staging"));
        assert_eq!(config.language, Language::He);
        assert!(config.logging.json);
    }

    #[test]
    #[serial]
    fn test_load_nonexistent_file_uses_defaults() {
        clear_env();
        let config = Config::load("nonexistent.yaml", &bare_cli()).unwrap();
        assert_eq!(config.api.base_url, "http://127.0.0.1:8080/api");
        assert_eq!(config.session.store, StoreKind::File);
        assert_eq!(config.language, Language::En);
    }

    #[test]
    #[serial]
    fn test_env_overrides_file_and_cli_overrides_env() {
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clinic.yaml");
        std::fs::write(&path, "api:\n  base_url: http://file.example/api\n").unwrap();

        std::env::set_var("CLINIC_API_URL", "http://env.example/api");
        std::env::set_var("CLINIC_TIMEOUT_SECONDS", "7");
        std::env::set_var("CLINIC_SESSION_STORE", "memory");
        std::env::set_var("CLINIC_LANGUAGE", "he-IL");

        let config = Config::load(path.to_str().unwrap(), &bare_cli()).unwrap();
        assert_eq!(config.api.base_url, "http://env.example/api");
        assert_eq!(config.api.timeout_seconds, 7);
        assert_eq!(config.session.store, StoreKind::Memory);
        assert_eq!(config.language, Language::He);

        let mut cli = bare_cli();
        cli.api_url = Some("http://cli.example/api".into());
        cli.store = Some(StoreKind::File);
        let config = Config::load(path.to_str().unwrap(), &cli).unwrap();
        assert_eq!(config.api.base_url, "http://cli.example/api");
        assert_eq!(config.session.store, StoreKind::File);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_env_values_are_ignored() {
        clear_env();
        std::env::set_var("CLINIC_TIMEOUT_SECONDS", "soon");
        std::env::set_var("CLINIC_SESSION_STORE", "cloud");
        std::env::set_var("CLINIC_LANGUAGE", "fr");

        let config = Config::load("nonexistent.yaml", &bare_cli()).unwrap();
        assert_eq!(config.api.timeout_seconds, 30);
        assert_eq!(config.session.store, StoreKind::File);
        assert_eq!(config.language, Language::En);

        clear_env();
    }

    #[test]
    fn test_invalid_yaml_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clinic.yaml");
        std::fs::write(&path, "api: [unclosed").unwrap();

        let err = Config::from_file(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ClinicError>(),
            Some(ClinicError::Config(_))
        ));
    }

    #[test]
    fn test_validate_default_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_urls_and_zero_timeout() {
        let mut config = Config::default();
        config.api.base_url = "not a url".into();
        assert!(config.validate().is_err());

        config.api.base_url = "ftp://clinic.example/api".into();
        assert!(config.validate().is_err());

        config.api.base_url = "https://clinic.example/api".into();
        config.api.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_memory_store_kind_opens_without_filesystem() {
        let session = SessionConfig {
            store: StoreKind::Memory,
            ..Default::default()
        };
        let store = session.open_store().unwrap();
        assert!(store.get("token").unwrap().is_none());
    }
}
