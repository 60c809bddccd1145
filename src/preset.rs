//! Preset registry: named bundles of configuration mutations.
//!
//! A preset is a stateless, idempotent mutation applied to the store as
//! a unit. Built-ins cover the production/development split plus the
//! strict query-caching policy and the local development environment.
//! Applications can register their own presets alongside the built-ins.

use crate::error::ConfigError;
use crate::store::ConfigStore;
use std::collections::BTreeMap;
use std::fmt;
use toml::value::Table;
use toml::Value;

/// Environment variable carrying the SMTP catcher address in local
/// development environments (`host` or `host:port`).
pub const SMTP_ADDR_ENV_VAR: &str = "STRATA_SMTP_ADDR";

const DEFAULT_SMTP_CATCHER: &str = "localhost:1025";
const DEFAULT_PROCESSOR_PATH: &str = "/usr/bin/";

/// A named configuration mutation.
pub type PresetFn = Box<dyn Fn(&mut ConfigStore) -> Result<(), ConfigError> + Send + Sync>;

/// Registry mapping preset names to mutations. Iteration order is the
/// name's lexical order (BTreeMap), so listings are deterministic.
pub struct PresetRegistry {
    presets: BTreeMap<String, PresetFn>,
}

impl PresetRegistry {
    /// Registry without any presets.
    pub fn empty() -> Self {
        Self {
            presets: BTreeMap::new(),
        }
    }

    /// Registry pre-populated with the built-in presets.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register("production", apply_production);
        registry.register("development", apply_development);
        registry.register("strict-query-caching", apply_strict_query_caching);
        registry.register("local-dev", apply_local_dev);
        registry
    }

    /// Register a preset, replacing any existing one with the same name.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        preset: impl Fn(&mut ConfigStore) -> Result<(), ConfigError> + Send + Sync + 'static,
    ) {
        self.presets.insert(name.into(), Box::new(preset));
    }

    /// Whether a preset with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.presets.contains_key(name)
    }

    /// Registered preset names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.presets.keys().map(String::as_str).collect()
    }

    /// Apply a preset by name. Unknown names fail with
    /// [`ConfigError::UnknownPreset`] and leave the store untouched.
    pub fn apply(&self, store: &mut ConfigStore, name: &str) -> Result<(), ConfigError> {
        let preset = self
            .presets
            .get(name)
            .ok_or_else(|| ConfigError::UnknownPreset(name.to_string()))?;
        tracing::debug!(preset = name, "applying preset");
        preset(store)
    }
}

impl Default for PresetRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for PresetRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PresetRegistry")
            .field("presets", &self.names())
            .finish()
    }
}

/// Production: debug off, errors hidden, trusted hosts locked down.
pub fn apply_production(store: &mut ConfigStore) -> Result<(), ConfigError> {
    store.set("backend.debug", false)?;
    store.set("frontend.debug", false)?;
    store.set("system.dev_ip_mask", "")?;
    store.set("system.display_errors", -1)?;
    store.set("system.trusted_hosts_pattern", "SERVER_NAME")?;
    Ok(())
}

/// Development: debug on, errors visible, trusted hosts open,
/// deprecation logging enabled.
pub fn apply_development(store: &mut ConfigStore) -> Result<(), ConfigError> {
    store.set("backend.debug", true)?;
    store.set("frontend.debug", true)?;
    store.set("system.dev_ip_mask", "*")?;
    store.set("system.display_errors", 1)?;
    store.set("system.trusted_hosts_pattern", ".*")?;
    set_deprecation_logging(store, true)?;
    Ok(())
}

/// Forbid cache-busting query parameters: the no-cache parameter is
/// ignored and an invalid cache-hash parameter renders a 404.
pub fn apply_strict_query_caching(store: &mut ConfigStore) -> Result<(), ConfigError> {
    store.set("frontend.disable_no_cache_parameter", true)?;
    store.set("frontend.page_not_found_on_invalid_cache_hash", true)?;
    Ok(())
}

/// Local development environment: backfill database credentials for the
/// containerized default connection, route mail to the SMTP catcher,
/// and point image processing at ImageMagick.
pub fn apply_local_dev(store: &mut ConfigStore) -> Result<(), ConfigError> {
    let mut options = Table::new();
    options.insert("dbname".to_string(), Value::from("db"));
    options.insert("host".to_string(), Value::from("db"));
    options.insert("password".to_string(), Value::from("db"));
    options.insert("port".to_string(), Value::from(3306));
    options.insert("user".to_string(), Value::from("db"));
    backfill_database_connection(store, "default", options)?;

    set_image_magick(store, DEFAULT_PROCESSOR_PATH)?;

    let addr =
        std::env::var(SMTP_ADDR_ENV_VAR).unwrap_or_else(|_| DEFAULT_SMTP_CATCHER.to_string());
    set_smtp_catcher(store, &addr)?;
    Ok(())
}

/// Backfill connection options: values already present in the store win
/// over the supplied defaults.
pub fn backfill_database_connection(
    store: &mut ConfigStore,
    connection: &str,
    options: Table,
) -> Result<(), ConfigError> {
    let path = format!("database.connections.{}", connection);
    store.merge_defaults(&path, Value::Table(options))
}

/// Use ImageMagick binaries found under the given path.
pub fn set_image_magick(store: &mut ConfigStore, path: &str) -> Result<(), ConfigError> {
    set_graphics_processor(store, "ImageMagick", path)
}

/// Use GraphicsMagick binaries found under the given path.
pub fn set_graphics_magick(store: &mut ConfigStore, path: &str) -> Result<(), ConfigError> {
    set_graphics_processor(store, "GraphicsMagick", path)
}

fn set_graphics_processor(
    store: &mut ConfigStore,
    processor: &str,
    path: &str,
) -> Result<(), ConfigError> {
    store.set("graphics.processor", processor)?;
    store.set("graphics.processor_path", path)?;
    store.set("graphics.processor_path_lzw", path)?;
    Ok(())
}

/// Route outgoing mail through an unauthenticated SMTP catcher.
pub fn set_smtp_catcher(store: &mut ConfigStore, server: &str) -> Result<(), ConfigError> {
    store.set("mail.transport", "smtp")?;
    store.set("mail.smtp_encrypt", "")?;
    store.set("mail.smtp_password", "")?;
    store.set("mail.smtp_server", server)?;
    store.set("mail.smtp_username", "")?;
    Ok(())
}

/// Toggle the deprecation log writer.
pub fn set_deprecation_logging(store: &mut ConfigStore, enabled: bool) -> Result<(), ConfigError> {
    store.set("log.deprecations.enabled", enabled)
}
