//! Configuration management for the Vysyamala admin dashboards

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::types::CurrentUser;

/// Base name of the optional configuration file (`vysyamala-admin.toml` etc.)
pub const CONFIG_FILE_STEM: &str = "vysyamala-admin";

/// Environment variable prefix, e.g. `VYSYAMALA__API__BASE_URL`
pub const ENV_PREFIX: &str = "VYSYAMALA";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Back-office API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Identity of the operator using the dashboards
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Spreadsheet export configuration
    #[serde(default)]
    pub export: ExportConfig,
}

/// API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the admin REST API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Optional key sent as the `X-API-Key` header
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds; unset keeps the HTTP client's default
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

/// Operator identity injected into every dashboard
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Operator id, also used as the default profile owner
    #[serde(default)]
    pub user_id: String,

    /// Role id; `7` is the privileged super-admin role
    #[serde(default)]
    pub role_id: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json or pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory downloaded reports are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_base_url() -> String {
    "http://localhost:8000/".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            request_timeout_secs: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

impl ApiConfig {
    /// Configured request timeout, if any
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

impl LoggingConfig {
    /// Whether JSON output was requested
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Config {
    /// Load configuration from `vysyamala-admin.*` in the working directory and
    /// `VYSYAMALA__*` environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or parsed.
    pub fn load() -> crate::Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, optionally from an explicit file path
    ///
    /// # Errors
    ///
    /// Returns an error if the explicit file is missing, or the merged
    /// configuration cannot be parsed or fails validation.
    pub fn load_from(path: Option<&Path>) -> crate::Result<Self> {
        debug!(path = ?path, "loading configuration");
        let file_source = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(CONFIG_FILE_STEM).required(false),
        };

        let config: Self = config::Config::builder()
            .add_source(file_source)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        debug!(
            base_url = %config.api.base_url,
            user_id = %config.identity.user_id,
            "configuration loaded"
        );
        Ok(config)
    }

    /// Check the values that cannot be defaulted sensibly
    ///
    /// # Errors
    ///
    /// Returns a validation error when the API base URL is empty or not http(s).
    pub fn validate(&self) -> crate::Result<()> {
        let base = self.api.base_url.trim();
        if base.is_empty() {
            return Err(crate::Error::validation("api.base_url", "must not be empty"));
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(crate::Error::validation(
                "api.base_url",
                format!("unsupported scheme in '{base}'"),
            ));
        }
        Ok(())
    }

    /// The operator identity as an injectable context
    #[must_use]
    pub fn current_user(&self) -> CurrentUser {
        CurrentUser::new(&self.identity.user_id, &self.identity.role_id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.api.base_url, "http://localhost:8000/");
        assert!(config.api.api_key.is_none());
        assert!(config.api.request_timeout().is_none());

        assert_eq!(config.identity.user_id, "");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "pretty");
        assert!(!config.logging.is_json());
        assert_eq!(config.export.output_dir, PathBuf::from("."));

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_base_url() {
        let mut config = Config::default();
        config.api.base_url = "  ".to_string();
        assert!(config.validate().is_err());

        config.api.base_url = "ftp://example.com".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("api.base_url"));
    }

    #[test]
    fn test_load_from_toml_file() {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();

        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp file");
        writeln!(
            file,
            r#"
[api]
base_url = "https://admin.example.com/"
request_timeout_secs = 15

[identity]
user_id = "42"
role_id = "7"

[logging]
format = "json"
"#
        )
        .unwrap();

        let config = Config::load_from(Some(file.path())).unwrap();
        assert_eq!(config.api.base_url, "https://admin.example.com/");
        assert_eq!(config.api.request_timeout(), Some(Duration::from_secs(15)));
        assert!(config.logging.is_json());
        assert_eq!(config.logging.level, "info");

        let user = config.current_user();
        assert_eq!(user.id(), "42");
        assert!(user.is_privileged());
    }

    #[test]
    fn test_load_from_missing_file_fails() {
        let result = Config::load_from(Some(Path::new("/nonexistent/vysyamala-admin.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_config_roundtrips_through_json() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back.api.base_url, config.api.base_url);
        assert_eq!(back.logging.format, config.logging.format);
    }
}
