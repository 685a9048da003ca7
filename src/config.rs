use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// File name of the sqlite database inside `data_dir`.
pub const DATABASE_FILE_NAME: &str = "data.db";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,

    // Storage
    pub data_dir: PathBuf,
    pub db_max_connections: u32,

    // Routing, already normalized (no surrounding slashes or whitespace)
    pub api_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9090,
            data_dir: PathBuf::from("./data"),
            db_max_connections: 5,
            api_prefix: "api".to_string(),
        }
    }
}

impl Config {
    /// Reads the process environment. `main` loads `.env` before calling this.
    pub fn from_env() -> Result<Self, String> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source, starting from the defaults.
    pub fn from_vars<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(host) = lookup("REGISTRY_HOST") {
            config.host = host;
        }

        if let Some(port) = lookup("REGISTRY_PORT") {
            config.port = port
                .trim()
                .parse()
                .map_err(|e| format!("Invalid port: {}", e))?;
        }

        if let Some(dir) = lookup("REGISTRY_DATA_DIR") {
            if dir.trim().is_empty() {
                return Err("Invalid data_dir: must not be empty".to_string());
            }
            config.data_dir = PathBuf::from(dir);
        }

        if let Some(max) = lookup("REGISTRY_DB_MAX_CONNECTIONS") {
            config.db_max_connections = max
                .trim()
                .parse()
                .map_err(|e| format!("Invalid db_max_connections: {}", e))?;
            if config.db_max_connections == 0 {
                return Err("Invalid db_max_connections: must be at least 1".to_string());
            }
        }

        if let Some(prefix) = lookup("REGISTRY_API_PREFIX") {
            config.api_prefix = normalize_prefix(&prefix);
        }

        Ok(config)
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE_NAME)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Strips whitespace and slashes from both ends, so `" /api/ "` becomes `"api"`.
pub fn normalize_prefix(raw: &str) -> String {
    raw.trim_matches(|c: char| c.is_whitespace() || c == '/')
        .to_string()
}
