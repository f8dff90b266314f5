use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_BODY_LIMIT_MB: usize = 50;

/// Contents of `vertex.toml`. Every field is optional; missing ones fall
/// back to the environment and then to built-in defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct VertexConfig {
    pub port: Option<u16>,
    pub database: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub body_limit_mb: Option<usize>,
    /// `*` or absent allows any origin
    pub cors_origin: Option<String>,
}

/// Fully resolved server settings
#[derive(Debug, Clone, PartialEq)]
pub struct ServerSettings {
    pub port: u16,
    pub database: PathBuf,
    pub request_timeout: Duration,
    pub body_limit: usize,
    pub cors_origin: Option<String>,
}

impl VertexConfig {
    /// Built-in defaults, as written by `vertex init`
    pub fn with_defaults() -> Self {
        Self {
            port: Some(DEFAULT_PORT),
            database: Some(default_database_path().to_string_lossy().to_string()),
            request_timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
            body_limit_mb: Some(DEFAULT_BODY_LIMIT_MB),
            cors_origin: Some("*".to_string()),
        }
    }

    /// Override fields from process environment variables
    pub fn apply_env(&mut self) -> anyhow::Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(port) = lookup("PORT") {
            self.port = Some(parse_env("PORT", &port)?);
        }
        if let Some(database) = lookup("DATABASE_PATH") {
            self.database = Some(database);
        }
        if let Some(secs) = lookup("REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = Some(parse_env("REQUEST_TIMEOUT_SECS", &secs)?);
        }
        if let Some(mb) = lookup("BODY_LIMIT_MB") {
            self.body_limit_mb = Some(parse_env("BODY_LIMIT_MB", &mb)?);
        }
        if let Some(origin) = lookup("CORS_ORIGIN") {
            self.cors_origin = Some(origin);
        }
        Ok(())
    }

    pub fn resolve(&self) -> ServerSettings {
        ServerSettings {
            port: self.port.unwrap_or(DEFAULT_PORT),
            database: self
                .database
                .as_ref()
                .map(PathBuf::from)
                .unwrap_or_else(default_database_path),
            request_timeout: Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
            body_limit: self.body_limit_mb.unwrap_or(DEFAULT_BODY_LIMIT_MB) * 1024 * 1024,
            cors_origin: self.cors_origin.clone().filter(|origin| origin != "*"),
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> anyhow::Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid {}={}: {}", key, value, e))
}

impl Default for ServerSettings {
    fn default() -> Self {
        VertexConfig::default().resolve()
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("vertex.toml")
}

pub fn default_database_path() -> PathBuf {
    PathBuf::from(".vertex").join("vertex.db")
}

/// Load `.env` into the process environment if present
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!("Ignoring unreadable .env: {}", e),
    }
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<VertexConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: VertexConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &VertexConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
