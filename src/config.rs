use std::path::{Path, PathBuf};
use std::time::Duration;

use color_eyre::eyre::{OptionExt, Result, WrapErr};
use serde::{Deserialize, Serialize};

use crate::transfer::TransferOptions;

const DEFAULT_CONFIG: &str = r#"# playlist-transfer configuration

[youtube]
# Either an access token...
# access_token = ""
# ...or OAuth client credentials plus a refresh token.
# client_id = ""
# client_secret = ""
# refresh_token = ""

[spotify]
# access_token = ""
# client_id = ""
# client_secret = ""
# refresh_token = ""

[transfer]
# Pause after every search, in milliseconds
match_delay_ms = 300
# Pause between playlist append batches, in milliseconds
batch_delay_ms = 500
"#;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub youtube: ServiceCredentials,
    #[serde(default)]
    pub spotify: ServiceCredentials,
    #[serde(default)]
    pub transfer: TransferConfig,
}

/// Credentials for one catalog. Either `access_token` is set, or all of
/// `client_id`, `client_secret` and `refresh_token` are.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceCredentials {
    pub access_token: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    #[serde(default = "default_match_delay_ms")]
    pub match_delay_ms: u64,
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,
}

fn default_match_delay_ms() -> u64 {
    300
}

fn default_batch_delay_ms() -> u64 {
    500
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            match_delay_ms: default_match_delay_ms(),
            batch_delay_ms: default_batch_delay_ms(),
        }
    }
}

impl TransferConfig {
    pub fn options(&self) -> TransferOptions {
        TransferOptions {
            match_delay: Duration::from_millis(self.match_delay_ms),
            batch_delay: Duration::from_millis(self.batch_delay_ms),
        }
    }
}

/// How a session handle should be obtained for one service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    AccessToken(String),
    Refresh {
        client_id: String,
        client_secret: String,
        refresh_token: String,
    },
}

impl ServiceCredentials {
    /// An explicit access token wins over refresh credentials.
    pub fn token_source(&self, service: &str) -> Result<TokenSource> {
        if let Some(token) = self.access_token.as_ref().filter(|t| !t.is_empty()) {
            return Ok(TokenSource::AccessToken(token.clone()));
        }

        match (&self.client_id, &self.client_secret, &self.refresh_token) {
            (Some(client_id), Some(client_secret), Some(refresh_token)) => {
                Ok(TokenSource::Refresh {
                    client_id: client_id.clone(),
                    client_secret: client_secret.clone(),
                    refresh_token: refresh_token.clone(),
                })
            }
            _ => Err(color_eyre::eyre::eyre!(
                "No {} credentials configured. Set an access token or client_id, client_secret and refresh_token.",
                service
            )),
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .wrap_err(format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&contents)
            .wrap_err(format!("Failed to parse config file: {}", path.display()))
    }

    fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        Ok(config)
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|path| path.join("playlist-transfer").join("config.toml"))
    }

    /// Load the default config file, falling back to an empty config when it
    /// does not exist (credentials may come from the command line).
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => {
                log::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Write the default config template, unless a config already exists.
    pub fn create_default() -> Result<PathBuf> {
        let path = Self::config_path().ok_or_eyre("No config directory available")?;
        Self::write_default(&path)?;
        Ok(path)
    }

    fn write_default(path: &Path) -> Result<()> {
        if path.exists() {
            log::info!("Config already exists at {}", path.display());
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .wrap_err(format!("Failed to create config directory: {}", parent.display()))?;
        }
        std::fs::write(path, DEFAULT_CONFIG)
            .wrap_err(format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }
}
