//! Configuration module for the exam portal.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::errors::AppError;
use crate::models::Category;

/// How pages read a category's records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// Direct reads from the content store
    Store,
    /// Read API of a (possibly remote) portal instance
    RemoteApi,
    /// Bundled JSON file fetched over HTTP
    StaticAsset,
    /// Bundled JSON file read from the local static directory
    Filesystem,
}

impl Binding {
    pub fn default_for(category: Category) -> Self {
        if category.api_segment().is_some() {
            Binding::Store
        } else {
            Binding::Filesystem
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Binding::Store => "store",
            Binding::RemoteApi => "remote-api",
            Binding::StaticAsset => "static-asset",
            Binding::Filesystem => "filesystem",
        }
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Binding {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "store" => Ok(Binding::Store),
            "remote-api" | "api" => Ok(Binding::RemoteApi),
            "static-asset" | "static" => Ok(Binding::StaticAsset),
            "filesystem" | "fs" => Ok(Binding::Filesystem),
            other => Err(AppError::Config(format!("Unknown binding '{}'", other))),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the SQLite file backing the content store
    pub db_path: PathBuf,
    /// Directory holding the bundled `*Data.json` files
    pub static_dir: PathBuf,
    /// Directory of `{collection}.json` seed files loaded at startup
    pub seed_dir: Option<PathBuf>,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Origin used by the remote bindings for same-origin fetches
    pub base_url: String,
    /// Public origin used for canonical and Open Graph URLs
    pub site_url: String,
    /// Site name appended to page titles
    pub site_name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit JSON log lines instead of human-readable ones
    pub log_json: bool,
    /// Per-category read binding for pages
    pub bindings: HashMap<Category, Binding>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = lookup("PORTAL_DB_PATH")
            .unwrap_or_else(|| "./data/portal.sqlite".to_string())
            .into();

        let static_dir = lookup("PORTAL_STATIC_DIR")
            .unwrap_or_else(|| "./public".to_string())
            .into();

        let seed_dir = lookup("PORTAL_SEED_DIR")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let bind_addr: SocketAddr = lookup("PORTAL_BIND_ADDR")
            .unwrap_or_else(|| "127.0.0.1:8080".to_string())
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid PORTAL_BIND_ADDR: {}", e)))?;

        let base_url = lookup("PORTAL_BASE_URL")
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("http://{}", bind_addr));

        let site_url = lookup("PORTAL_SITE_URL")
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or_else(|| "http://localhost:8080".to_string());

        let site_name =
            lookup("PORTAL_SITE_NAME").unwrap_or_else(|| "Sarkari Exam Portal".to_string());

        let log_level = lookup("PORTAL_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let log_json = lookup("PORTAL_LOG_FORMAT")
            .map(|f| f.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let mut bindings = HashMap::new();
        for category in Category::ALL {
            let binding = match lookup(&format!("PORTAL_BINDING_{}", category.env_key())) {
                Some(value) => value.parse()?,
                None => Binding::default_for(category),
            };
            bindings.insert(category, binding);
        }

        Ok(Self {
            db_path,
            static_dir,
            seed_dir,
            bind_addr,
            base_url,
            site_url,
            site_name,
            log_level,
            log_json,
            bindings,
        })
    }

    /// Configured binding for a category.
    pub fn binding(&self, category: Category) -> Binding {
        self.bindings
            .get(&category)
            .copied()
            .unwrap_or_else(|| Binding::default_for(category))
    }
}
