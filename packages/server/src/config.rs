use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

/// Upload directory settings.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory receiving uploaded files. Default: "uploads".
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: PathBuf,
    /// Largest accepted upload in bytes. Default: 128 MiB.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: u64,
}

fn default_uploads_dir() -> PathBuf {
    PathBuf::from("uploads")
}
fn default_max_upload_size() -> u64 {
    128 * 1024 * 1024
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            uploads_dir: default_uploads_dir(),
            max_upload_size: default_max_upload_size(),
        }
    }
}

/// Static asset settings for the upload form and chat widget.
#[derive(Debug, Deserialize, Clone)]
pub struct WebConfig {
    /// Directory served at `/`. Default: "public".
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("public")
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            public_dir: default_public_dir(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub web: WebConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("database.url", "sqlite://files.db?mode=rwc")?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., FILEBOT__SERVER__PORT)
            .add_source(Environment::with_prefix("FILEBOT").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    /// Body limit for upload requests: the file limit plus room for multipart framing.
    pub fn upload_body_limit(&self) -> usize {
        usize::try_from(self.storage.max_upload_size)
            .unwrap_or(usize::MAX)
            .saturating_add(64 * 1024)
    }
}
