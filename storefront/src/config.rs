//! Configuration management for the storefront.
//!
//! Loads configuration from environment variables with sensible defaults.

use std::env;
use std::path::PathBuf;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Base URL of the marketplace API
    pub api_base_url: String,
    /// Path of the durable client-state cache file
    pub cache_path: PathBuf,
}

impl StorefrontConfig {
    /// Load configuration from the environment (and `.env`, when present)
    ///
    /// - `STOREFRONT_API_URL` - defaults to `http://localhost:3333`
    /// - `STOREFRONT_CACHE_PATH` - defaults to `.storefront/cache.json`
    #[must_use]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            api_base_url: env::var("STOREFRONT_API_URL")
                .unwrap_or_else(|_| "http://localhost:3333".to_string()),
            cache_path: env::var("STOREFRONT_CACHE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".storefront/cache.json")),
        }
    }
}
