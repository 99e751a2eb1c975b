//! Dev server configuration loaded from environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;

use crate::error::AppResult;
use crate::services::generator::GeneratorConfig;
use crate::services::versioning::cache_name_for_dir;

/// Server and generator settings loaded from `.env` and environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g. `0.0.0.0:8080`).
    pub server_addr: SocketAddr,
    /// Directory holding the built PWA (index.html, assets).
    pub static_dir: PathBuf,
    /// Path the generated worker is served at. Determines its max scope.
    pub sw_path: String,
    /// JSON `GeneratorConfig` file; when set, the generator fields below are ignored.
    pub sw_config: Option<PathBuf>,
    /// Where to persist the generated worker at startup, if anywhere.
    pub sw_output: Option<PathBuf>,
    /// Explicit cache name. Derived from precached contents when absent.
    pub cache_name: Option<String>,
    pub cache_prefix: String,
    pub precache_urls: Vec<String>,
    pub navigation_fallback: String,
    pub network_first_prefixes: Vec<String>,
    pub network_only_prefixes: Vec<String>,
    /// Log level: `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment. Call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self, ConfigLoadError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigLoadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_addr = lookup("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string());
        let server_addr: SocketAddr = server_addr
            .parse()
            .map_err(|_| ConfigLoadError::InvalidServerAddr)?;

        let static_dir = PathBuf::from(lookup("STATIC_DIR").unwrap_or_else(|| "public".to_string()));
        let sw_path = lookup("SW_PATH").unwrap_or_else(|| "/sw.js".to_string());
        if !sw_path.starts_with('/') || sw_path.len() < 2 {
            return Err(ConfigLoadError::InvalidSwPath(sw_path));
        }

        let sw_config = lookup("SW_CONFIG").filter(|s| !s.is_empty()).map(PathBuf::from);
        let sw_output = lookup("SW_OUTPUT").filter(|s| !s.is_empty()).map(PathBuf::from);
        let cache_name = lookup("CACHE_NAME").filter(|s| !s.trim().is_empty());
        let cache_prefix = lookup("CACHE_PREFIX").unwrap_or_else(|| "app".to_string());

        let precache_urls = lookup("PRECACHE_URLS")
            .map(|v| split_list(&v))
            .unwrap_or_else(|| vec!["/".to_string()]);
        let navigation_fallback =
            lookup("NAVIGATION_FALLBACK").unwrap_or_else(|| "/".to_string());
        let network_first_prefixes = lookup("NETWORK_FIRST_PREFIXES")
            .map(|v| split_list(&v))
            .unwrap_or_default();
        let network_only_prefixes = lookup("NETWORK_ONLY_PREFIXES")
            .map(|v| split_list(&v))
            .unwrap_or_default();
        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        Ok(Self {
            server_addr,
            static_dir,
            sw_path,
            sw_config,
            sw_output,
            cache_name,
            cache_prefix,
            precache_urls,
            navigation_fallback,
            network_first_prefixes,
            network_only_prefixes,
            log_level,
        })
    }
}

impl Config {
    /// Generator input: the `SW_CONFIG` file if set, otherwise the env fields
    /// with a cache name derived from the static directory when none is given.
    pub fn generator_config(&self) -> AppResult<GeneratorConfig> {
        if let Some(path) = &self.sw_config {
            let raw = std::fs::read_to_string(path)?;
            info!(path = %path.display(), "loaded generator config");
            return Ok(GeneratorConfig::from_json(&raw)?);
        }

        let cache_name = match &self.cache_name {
            Some(name) => name.clone(),
            None => cache_name_for_dir(&self.cache_prefix, &self.static_dir, &self.precache_urls),
        };
        Ok(GeneratorConfig::new(cache_name, self.precache_urls.clone())
            .with_navigation_fallback(self.navigation_fallback.clone())
            .with_network_first(self.network_first_prefixes.clone())
            .with_network_only(self.network_only_prefixes.clone()))
    }
}

/// Comma-separated list; blanks dropped, order kept.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Invalid SERVER_ADDR")]
    InvalidServerAddr,
    #[error("Invalid SW_PATH {0:?}: must be an absolute path to a script")]
    InvalidSwPath(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigLoadError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.server_addr.port(), 8080);
        assert_eq!(config.static_dir, PathBuf::from("public"));
        assert_eq!(config.sw_path, "/sw.js");
        assert_eq!(config.precache_urls, vec!["/"]);
        assert_eq!(config.navigation_fallback, "/");
        assert!(config.cache_name.is_none());
        assert!(config.network_first_prefixes.is_empty());
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn lists_keep_order_and_drop_blanks() {
        let config = load(&[
            ("PRECACHE_URLS", "/, /app.js ,,/style.css"),
            ("NETWORK_FIRST_PREFIXES", "/api/,/feed/"),
            ("NETWORK_ONLY_PREFIXES", " /auth/ "),
        ])
        .unwrap();
        assert_eq!(config.precache_urls, vec!["/", "/app.js", "/style.css"]);
        assert_eq!(config.network_first_prefixes, vec!["/api/", "/feed/"]);
        assert_eq!(config.network_only_prefixes, vec!["/auth/"]);
    }

    #[test]
    fn blank_cache_name_means_derived() {
        let config = load(&[("CACHE_NAME", "  ")]).unwrap();
        assert!(config.cache_name.is_none());
    }

    #[test]
    fn explicit_cache_name_is_used_verbatim() {
        let config = load(&[("CACHE_NAME", "release-42"), ("NETWORK_ONLY_PREFIXES", "/auth/")])
            .unwrap()
            .generator_config()
            .unwrap();
        assert_eq!(config.cache_name, "release-42");
        assert_eq!(config.network_only_prefixes, vec!["/auth/"]);
    }

    #[test]
    fn derived_cache_name_uses_prefix() {
        let config = load(&[("CACHE_PREFIX", "shop"), ("STATIC_DIR", "/nonexistent-pwa-kit")])
            .unwrap()
            .generator_config()
            .unwrap();
        assert!(config.cache_name.starts_with("shop-"));
    }

    #[test]
    fn invalid_values() {
        assert!(matches!(
            load(&[("SERVER_ADDR", "nope")]),
            Err(ConfigLoadError::InvalidServerAddr)
        ));
        assert!(matches!(
            load(&[("SW_PATH", "sw.js")]),
            Err(ConfigLoadError::InvalidSwPath(_))
        ));
    }
}
