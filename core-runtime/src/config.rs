//! # Catalog Configuration Module
//!
//! Provides configuration management for the catalog content store.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a
//! `CatalogConfig`. Validation is fail-fast: `build()` rejects values the
//! rest of the core could not run with, and reports which setter to fix.
//!
//! ## Remote Backend
//!
//! The remote REST backend is optional. It is considered configured only
//! when both the endpoint base URL and the access key are present and
//! non-empty; anything less routes every read and write to local storage.
//!
//! ## Usage
//!
//! ```
//! use core_runtime::config::CatalogConfig;
//! use std::time::Duration;
//!
//! let config = CatalogConfig::builder()
//!     .remote_endpoint("https://project.supabase.co")
//!     .remote_access_key("anon-key")
//!     .poll_interval(Duration::from_secs(10))
//!     .build()
//!     .unwrap();
//!
//! assert!(config.remote.is_configured());
//! ```
//!
//! ### From the Environment
//!
//! ```no_run
//! use core_runtime::config::CatalogConfig;
//!
//! // SUPABASE_URL, SUPABASE_ANON_KEY, CATALOG_POLL_INTERVAL_MS,
//! // CATALOG_STORAGE_KEY, CATALOG_DATABASE_PATH
//! let config = CatalogConfig::from_env().unwrap();
//! ```

use crate::error::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Storage key used for the local snapshot when none is configured
pub const DEFAULT_STORAGE_KEY: &str = "novaStream_content";

/// Default polling interval (5 seconds)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);

/// Default capacity of the event bus
pub const DEFAULT_EVENT_BUFFER: usize = 100;

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);
const MAX_POLL_INTERVAL: Duration = Duration::from_secs(3600);

pub const ENV_REMOTE_URL: &str = "SUPABASE_URL";
pub const ENV_REMOTE_KEY: &str = "SUPABASE_ANON_KEY";
pub const ENV_POLL_INTERVAL_MS: &str = "CATALOG_POLL_INTERVAL_MS";
pub const ENV_STORAGE_KEY: &str = "CATALOG_STORAGE_KEY";
pub const ENV_DATABASE_PATH: &str = "CATALOG_DATABASE_PATH";

/// Connection settings for the remote content table.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RemoteSettings {
    /// Base URL of the backend, e.g. `https://xyz.supabase.co`
    pub endpoint: Option<String>,

    /// Public access key, sent as `apikey` and as bearer credential
    pub access_key: Option<String>,
}

impl RemoteSettings {
    pub fn new(endpoint: impl Into<String>, access_key: impl Into<String>) -> Self {
        Self {
            endpoint: Some(endpoint.into()),
            access_key: Some(access_key.into()),
        }
    }

    /// Settings with no remote backend
    pub fn unconfigured() -> Self {
        Self::default()
    }

    /// Read `SUPABASE_URL` / `SUPABASE_ANON_KEY`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            endpoint: lookup(ENV_REMOTE_URL),
            access_key: lookup(ENV_REMOTE_KEY),
        }
    }

    /// True when both values are present and non-blank.
    pub fn is_configured(&self) -> bool {
        let present = |value: &Option<String>| {
            value
                .as_deref()
                .map(|v| !v.trim().is_empty())
                .unwrap_or(false)
        };
        present(&self.endpoint) && present(&self.access_key)
    }

    /// Endpoint without trailing slashes, when configured
    pub fn base_url(&self) -> Option<&str> {
        if !self.is_configured() {
            return None;
        }
        self.endpoint.as_deref().map(|e| e.trim().trim_end_matches('/'))
    }
}

impl std::fmt::Debug for RemoteSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteSettings")
            .field("endpoint", &self.endpoint)
            .field(
                "access_key",
                &self.access_key.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// Catalog configuration.
///
/// Use [`CatalogConfigBuilder`] to construct instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub remote: RemoteSettings,

    /// Key of the single local storage entry holding the whole cache
    pub storage_key: String,

    /// Interval between polling refreshes
    pub poll_interval: Duration,

    /// Capacity of the event bus broadcast channel
    pub event_buffer_size: usize,

    /// Subscribe to the push change feed when a remote is configured
    pub enable_realtime: bool,

    /// SQLite file backing the desktop key-value store
    pub database_path: Option<PathBuf>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            remote: RemoteSettings::default(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            event_buffer_size: DEFAULT_EVENT_BUFFER,
            enable_realtime: true,
            database_path: None,
        }
    }
}

impl CatalogConfig {
    pub fn builder() -> CatalogConfigBuilder {
        CatalogConfigBuilder::default()
    }

    /// Build a configuration from process environment variables.
    ///
    /// Unset variables keep their defaults. A malformed
    /// `CATALOG_POLL_INTERVAL_MS` is a configuration error.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::builder().remote(RemoteSettings::from_lookup(&lookup));

        if let Some(raw) = lookup(ENV_POLL_INTERVAL_MS) {
            let millis: u64 = raw.trim().parse().map_err(|_| {
                Error::Config(format!(
                    "{} must be a whole number of milliseconds, got '{}'",
                    ENV_POLL_INTERVAL_MS, raw
                ))
            })?;
            builder = builder.poll_interval(Duration::from_millis(millis));
        }

        if let Some(key) = lookup(ENV_STORAGE_KEY) {
            builder = builder.storage_key(key);
        }

        if let Some(path) = lookup(ENV_DATABASE_PATH) {
            builder = builder.database_path(path);
        }

        builder.build()
    }

    /// Validates the configuration.
    ///
    /// This checks:
    /// - Storage key is not blank
    /// - Poll interval is between 100ms and 1 hour
    /// - Event buffer holds at least one event
    /// - A configured endpoint is an http(s) URL
    pub fn validate(&self) -> Result<()> {
        if self.storage_key.trim().is_empty() {
            return Err(Error::Config("Storage key cannot be empty".to_string()));
        }

        if self.poll_interval < MIN_POLL_INTERVAL {
            return Err(Error::Config(format!(
                "Poll interval must be at least {}ms",
                MIN_POLL_INTERVAL.as_millis()
            )));
        }

        if self.poll_interval > MAX_POLL_INTERVAL {
            return Err(Error::Config(
                "Poll interval exceeds maximum of 1 hour".to_string(),
            ));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        if let Some(base) = self.remote.base_url() {
            if !(base.starts_with("https://") || base.starts_with("http://")) {
                return Err(Error::Config(format!(
                    "Remote endpoint must be an http(s) URL, got '{}'",
                    base
                )));
            }
        }

        if let Some(path) = &self.database_path {
            if path.as_os_str().is_empty() {
                return Err(Error::Config("Database path cannot be empty".to_string()));
            }
        }

        Ok(())
    }
}

/// Builder for constructing [`CatalogConfig`] instances.
#[derive(Default)]
pub struct CatalogConfigBuilder {
    remote: RemoteSettings,
    storage_key: Option<String>,
    poll_interval: Option<Duration>,
    event_buffer_size: Option<usize>,
    enable_realtime: Option<bool>,
    database_path: Option<PathBuf>,
}

impl CatalogConfigBuilder {
    /// Sets both remote connection values at once.
    pub fn remote(mut self, remote: RemoteSettings) -> Self {
        self.remote = remote;
        self
    }

    /// Sets the remote endpoint base URL.
    pub fn remote_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.remote.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the remote access key.
    pub fn remote_access_key(mut self, key: impl Into<String>) -> Self {
        self.remote.access_key = Some(key.into());
        self
    }

    /// Sets the local storage key.
    ///
    /// Default: `novaStream_content`
    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = Some(key.into());
        self
    }

    /// Sets the polling interval.
    ///
    /// Default: 5000ms
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    /// Sets the event bus capacity.
    ///
    /// Default: 100
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Enables or disables the push change feed.
    ///
    /// Default: true (only used when a remote is configured)
    pub fn enable_realtime(mut self, enabled: bool) -> Self {
        self.enable_realtime = Some(enabled);
        self
    }

    /// Sets the database file for the desktop key-value store.
    pub fn database_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.database_path = Some(path.into());
        self
    }

    /// Builds and validates the final `CatalogConfig`.
    pub fn build(self) -> Result<CatalogConfig> {
        let defaults = CatalogConfig::default();

        let config = CatalogConfig {
            remote: self.remote,
            storage_key: self.storage_key.unwrap_or(defaults.storage_key),
            poll_interval: self.poll_interval.unwrap_or(defaults.poll_interval),
            event_buffer_size: self.event_buffer_size.unwrap_or(defaults.event_buffer_size),
            enable_realtime: self.enable_realtime.unwrap_or(defaults.enable_realtime),
            database_path: self.database_path,
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = CatalogConfig::builder().build().unwrap();

        assert_eq!(config.storage_key, "novaStream_content");
        assert_eq!(config.poll_interval, Duration::from_millis(5000));
        assert_eq!(config.event_buffer_size, 100);
        assert!(config.enable_realtime);
        assert!(!config.remote.is_configured());
        assert!(config.database_path.is_none());
    }

    #[test]
    fn test_remote_requires_both_values() {
        let endpoint_only = RemoteSettings {
            endpoint: Some("https://x.supabase.co".into()),
            access_key: None,
        };
        assert!(!endpoint_only.is_configured());

        let blank_key = RemoteSettings::new("https://x.supabase.co", "   ");
        assert!(!blank_key.is_configured());

        let full = RemoteSettings::new("https://x.supabase.co", "anon");
        assert!(full.is_configured());
    }

    #[test]
    fn test_base_url_trims_trailing_slash() {
        let remote = RemoteSettings::new("https://x.supabase.co//", "anon");
        assert_eq!(remote.base_url(), Some("https://x.supabase.co"));

        assert_eq!(RemoteSettings::unconfigured().base_url(), None);
    }

    #[test]
    fn test_debug_redacts_access_key() {
        let remote = RemoteSettings::new("https://x.supabase.co", "super-secret");
        let debug = format!("{:?}", remote);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_validate_rejects_short_interval() {
        let result = CatalogConfig::builder()
            .poll_interval(Duration::from_millis(10))
            .build();

        assert!(result.unwrap_err().to_string().contains("at least 100ms"));
    }

    #[test]
    fn test_validate_rejects_long_interval() {
        let result = CatalogConfig::builder()
            .poll_interval(Duration::from_secs(7200))
            .build();

        assert!(result.unwrap_err().to_string().contains("exceeds maximum"));
    }

    #[test]
    fn test_validate_rejects_empty_storage_key() {
        let result = CatalogConfig::builder().storage_key("  ").build();
        assert!(result.unwrap_err().to_string().contains("Storage key"));
    }

    #[test]
    fn test_validate_rejects_zero_buffer() {
        let result = CatalogConfig::builder().event_buffer_size(0).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_non_http_endpoint() {
        let result = CatalogConfig::builder()
            .remote_endpoint("ftp://x")
            .remote_access_key("anon")
            .build();

        assert!(result.unwrap_err().to_string().contains("http(s)"));
    }

    #[test]
    fn test_from_lookup_reads_all_variables() {
        let config = CatalogConfig::from_lookup(lookup_from(&[
            (ENV_REMOTE_URL, "https://x.supabase.co"),
            (ENV_REMOTE_KEY, "anon"),
            (ENV_POLL_INTERVAL_MS, "2500"),
            (ENV_STORAGE_KEY, "custom_key"),
            (ENV_DATABASE_PATH, "/tmp/catalog.db"),
        ]))
        .unwrap();

        assert!(config.remote.is_configured());
        assert_eq!(config.poll_interval, Duration::from_millis(2500));
        assert_eq!(config.storage_key, "custom_key");
        assert_eq!(config.database_path, Some(PathBuf::from("/tmp/catalog.db")));
    }

    #[test]
    fn test_from_lookup_with_nothing_set() {
        let config = CatalogConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, CatalogConfig::default());
    }

    #[test]
    fn test_from_lookup_rejects_bad_interval() {
        let result = CatalogConfig::from_lookup(lookup_from(&[(ENV_POLL_INTERVAL_MS, "soon")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
