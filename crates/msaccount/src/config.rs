//! Client credential configuration.
//!
//! Credentials live in a `msaccount.toml` file:
//!
//! ```toml
//! client_id = "00000000-0000-0000-0000-000000000000"
//! client_secret = "..."
//! # Optional; tests point this at a mock server.
//! token_endpoint = "https://login.microsoftonline.com/common/oauth2/v2.0/token"
//! ```
//!
//! Resolution order:
//!
//! 1. `MSACCOUNT_CREDENTIALS_PATH` environment variable
//! 2. XDG config directory (`~/.config/msaccount/msaccount.toml`)
//!
//! Missing files are not errors; `load_resolved` returns `None` so the host
//! can report "integration not configured" rather than failing its own flows.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

/// Default Microsoft identity platform v2 token endpoint.
const DEFAULT_TOKEN_ENDPOINT: &str = "https://login.microsoftonline.com/common/oauth2/v2.0/token";

/// Errors that can occur during configuration loading.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// I/O error when reading the credentials file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error when the credentials file is malformed.
    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// Credentials file not found at an explicitly given path.
    #[error("credentials file not found: {0}")]
    NotFound(PathBuf),

    /// Credentials file was parsed but a required field is unusable.
    #[error("invalid credentials: {0}")]
    Invalid(String),
}

/// OAuth client credentials, immutable after load.
#[derive(Debug, Clone, Deserialize)]
pub struct MsAccountConfig {
    /// Application (client) id registered with the provider.
    pub client_id: String,

    /// Client secret for the registered application.
    pub client_secret: String,

    /// Token endpoint used for the refresh-token grant.
    #[serde(default = "default_token_endpoint")]
    pub token_endpoint: String,
}

fn default_token_endpoint() -> String {
    DEFAULT_TOKEN_ENDPOINT.to_string()
}

impl MsAccountConfig {
    /// Creates a config from explicit values, using the default token
    /// endpoint.
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token_endpoint: default_token_endpoint(),
        }
    }

    /// Loads and validates credentials from an explicit path.
    ///
    /// # Errors
    ///
    /// Returns `Err(ConfigError)` if the file is missing, cannot be parsed as
    /// TOML, or contains an empty `client_id`/`client_secret`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::Io(err)
            }
        })?;

        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads credentials using the resolution order documented on this
    /// module.
    ///
    /// Returns `Ok(None)` when no credentials file exists anywhere in the
    /// search path.
    ///
    /// # Errors
    ///
    /// Returns `Err(ConfigError)` if a file was found but could not be read,
    /// parsed, or validated.
    pub fn load_resolved() -> Result<Option<Self>, ConfigError> {
        if let Ok(path) = std::env::var("MSACCOUNT_CREDENTIALS_PATH") {
            return Self::load(PathBuf::from(path)).map(Some);
        }

        if let Some(path) = xdg_credentials_path()
            && path.exists()
        {
            return Self::load(path).map(Some);
        }

        Ok(None)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.client_id.trim().is_empty() {
            return Err(ConfigError::Invalid("client_id must not be empty".into()));
        }
        if self.client_secret.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "client_secret must not be empty".into(),
            ));
        }
        if self.token_endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "token_endpoint must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Gets the XDG config path for the credentials file.
fn xdg_credentials_path() -> Option<PathBuf> {
    let config_dir = dirs::config_dir()?;
    Some(config_dir.join("msaccount/msaccount.toml"))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_load_reads_all_fields() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("msaccount.toml");
        fs::write(
            &path,
            r#"client_id = "app-123"
client_secret = "s3cret"
token_endpoint = "https://example.com/token"
"#,
        )
        .unwrap();

        let config = MsAccountConfig::load(&path).unwrap();
        assert_eq!(config.client_id, "app-123");
        assert_eq!(config.client_secret, "s3cret");
        assert_eq!(config.token_endpoint, "https://example.com/token");
    }

    #[test]
    fn test_load_defaults_token_endpoint() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("msaccount.toml");
        fs::write(
            &path,
            r#"client_id = "app-123"
client_secret = "s3cret"
"#,
        )
        .unwrap();

        let config = MsAccountConfig::load(&path).unwrap();
        assert_eq!(config.token_endpoint, DEFAULT_TOKEN_ENDPOINT);
    }

    #[test]
    fn test_load_missing_file_returns_not_found() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nope.toml");

        let err = MsAccountConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(p) if p == path));
    }

    #[test]
    fn test_load_rejects_empty_client_id() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("msaccount.toml");
        fs::write(
            &path,
            r#"client_id = "  "
client_secret = "s3cret"
"#,
        )
        .unwrap();

        let err = MsAccountConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("client_id")));
    }

    #[test]
    fn test_load_rejects_malformed_toml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("msaccount.toml");
        fs::write(&path, "client_id = [broken").unwrap();

        let err = MsAccountConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_new_uses_default_endpoint() {
        let config = MsAccountConfig::new("app", "secret");
        assert_eq!(config.token_endpoint, DEFAULT_TOKEN_ENDPOINT);
    }
}
