//! Configuration module for the admin core.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL the per-resource API paths are joined to
    pub api_base: String,
    /// Static file host; attachment paths stored on records are relative to it
    pub asset_base: String,
    /// Optional API key forwarded as `x-api-key` on every request
    pub api_key: Option<String>,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let api_base = env::var("LEMARC_API_BASE")
            .unwrap_or_else(|_| "http://localhost:9000/api/v1".to_string());

        let asset_base =
            env::var("LEMARC_ASSET_BASE").unwrap_or_else(|_| "http://localhost:9000".to_string());

        let api_key = env::var("LEMARC_API_KEY").ok();

        let log_level = env::var("LEMARC_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Self {
            api_base,
            asset_base,
            api_key,
            log_level,
        }
    }

    /// Resolve a record-held relative attachment path against the asset host.
    ///
    /// Display-only: the core never mutates these paths, it only replaces the
    /// whole attachment set through a new create/update request.
    pub fn asset_url(&self, relative: &str) -> String {
        let base = self.asset_base.trim_end_matches('/');
        if relative.starts_with('/') {
            format!("{}{}", base, relative)
        } else {
            format!("{}/{}", base, relative)
        }
    }
}

/// Initialize logging for hosts that have no subscriber of their own.
pub fn init_tracing(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        env::remove_var("LEMARC_API_BASE");
        env::remove_var("LEMARC_ASSET_BASE");
        env::remove_var("LEMARC_API_KEY");
        env::remove_var("LEMARC_LOG_LEVEL");

        let config = Config::from_env();

        assert_eq!(config.api_base, "http://localhost:9000/api/v1");
        assert_eq!(config.asset_base, "http://localhost:9000");
        assert!(config.api_key.is_none());
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_asset_url_joins_paths() {
        let config = Config {
            api_base: "http://localhost:9000/api/v1".to_string(),
            asset_base: "http://localhost:9000".to_string(),
            api_key: None,
            log_level: "info".to_string(),
        };

        assert_eq!(
            config.asset_url("/uploads/news/a.png"),
            "http://localhost:9000/uploads/news/a.png"
        );
        assert_eq!(
            config.asset_url("uploads/products/b.pdf"),
            "http://localhost:9000/uploads/products/b.pdf"
        );
    }
}
