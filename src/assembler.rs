//! Assembly pipeline: context resolution, presets, fragment layers,
//! explicit overrides.
//!
//! The embedding application builds an [`Assembler`], chains whatever
//! it needs, and receives an [`Assembly`] snapshot from `assemble()`.
//! Nothing is written to ambient global state; the caller owns the
//! result. Pipeline order is fixed: automatic context defaults, then
//! layered fragments (root-to-leaf), then queued builder calls, and
//! finally the context label on the site name.

use crate::context::Context;
use crate::error::ConfigError;
use crate::layers;
use crate::preset::{self, PresetRegistry};
use crate::store::ConfigStore;
use std::path::PathBuf;
use toml::value::Table;
use toml::Value;
use tracing::debug;

const THIRTY_DAYS: i64 = 86400 * 30;

/// Redis cache backend settings. `caches` maps cache name to default
/// lifetime in seconds; each cache gets its own database index counted
/// up from `start_db`.
#[derive(Debug, Clone)]
pub struct RedisCaching {
    pub host: String,
    pub port: i64,
    pub start_db: i64,
    pub caches: Vec<(String, i64)>,
}

impl Default for RedisCaching {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6379,
            start_db: 0,
            caches: vec![
                ("pages".to_string(), THIRTY_DAYS),
                ("page_sections".to_string(), THIRTY_DAYS),
                ("hash".to_string(), THIRTY_DAYS),
                ("rootline".to_string(), THIRTY_DAYS),
            ],
        }
    }
}

/// Default cache names for [`Assembler::cache_directory`].
const DEFAULT_DIRECTORY_CACHES: [&str; 4] = ["core", "templates", "assets", "l10n"];

/// The assembled configuration: resolved context plus populated store.
/// Read-only by convention from here on.
#[derive(Debug, Clone)]
pub struct Assembly {
    pub context: Context,
    pub store: ConfigStore,
}

enum Op {
    Preset(String),
    Mutate(Box<dyn FnOnce(&mut ConfigStore) -> Result<(), ConfigError>>),
}

/// Builder for the assembly pipeline.
pub struct Assembler {
    context: Option<Context>,
    base_path: Option<PathBuf>,
    automatic_defaults: bool,
    registry: PresetRegistry,
    ops: Vec<Op>,
}

impl Assembler {
    /// Assembler that resolves the context from the environment.
    pub fn new() -> Self {
        Self {
            context: None,
            base_path: None,
            automatic_defaults: true,
            registry: PresetRegistry::with_builtins(),
            ops: Vec::new(),
        }
    }

    /// Assembler pinned to an explicit context.
    pub fn for_context(context: Context) -> Self {
        let mut assembler = Self::new();
        assembler.context = Some(context);
        assembler
    }

    /// Directory holding context fragment files. Layering is skipped
    /// entirely when no base path is set.
    pub fn base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Toggle the automatic context defaults (on unless disabled):
    /// strict query caching, the development or production preset, the
    /// local-dev preset when the environment flag is set, and the
    /// context label on the site name.
    pub fn automatic_defaults(mut self, enabled: bool) -> Self {
        self.automatic_defaults = enabled;
        self
    }

    /// Replace the preset registry (e.g. one without built-ins).
    pub fn registry(mut self, registry: PresetRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Register an application-defined preset alongside the built-ins.
    pub fn register_preset(
        mut self,
        name: impl Into<String>,
        f: impl Fn(&mut ConfigStore) -> Result<(), ConfigError> + Send + Sync + 'static,
    ) -> Self {
        self.registry.register(name, f);
        self
    }

    /// Queue a preset by name, applied after the fragment layers.
    pub fn preset(mut self, name: impl Into<String>) -> Self {
        self.ops.push(Op::Preset(name.into()));
        self
    }

    /// Queue a raw write. Escape hatch for keys the named methods do
    /// not cover.
    pub fn set(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        let path = path.into();
        let value = value.into();
        self.ops
            .push(Op::Mutate(Box::new(move |store| store.set(&path, value))));
        self
    }

    /// Backfill options for a named database connection; values the
    /// fragments or earlier calls already set take precedence.
    pub fn database_connection(mut self, name: impl Into<String>, options: Table) -> Self {
        let name = name.into();
        self.ops.push(Op::Mutate(Box::new(move |store| {
            preset::backfill_database_connection(store, &name, options)
        })));
        self
    }

    /// Use ImageMagick binaries under the given path.
    pub fn image_magick(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.ops.push(Op::Mutate(Box::new(move |store| {
            preset::set_image_magick(store, &path)
        })));
        self
    }

    /// Use GraphicsMagick binaries under the given path.
    pub fn graphics_magick(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.ops.push(Op::Mutate(Box::new(move |store| {
            preset::set_graphics_magick(store, &path)
        })));
        self
    }

    /// Route outgoing mail through an SMTP catcher at `host[:port]`.
    pub fn smtp_catcher(mut self, host: impl Into<String>, port: Option<u16>) -> Self {
        let host = host.into();
        self.ops.push(Op::Mutate(Box::new(move |store| {
            let server = match port {
                Some(port) => format!("{}:{}", host, port),
                None => host.clone(),
            };
            preset::set_smtp_catcher(store, &server)
        })));
        self
    }

    /// Honor the no-cache query parameter.
    pub fn allow_no_cache_parameter(self) -> Self {
        self.set("frontend.disable_no_cache_parameter", false)
    }

    /// Ignore the no-cache query parameter.
    pub fn forbid_no_cache_parameter(self) -> Self {
        self.set("frontend.disable_no_cache_parameter", true)
    }

    /// Serve pages despite an invalid cache-hash query parameter.
    pub fn allow_invalid_cache_hash(self) -> Self {
        self.set("frontend.page_not_found_on_invalid_cache_hash", false)
    }

    /// Render a 404 on an invalid cache-hash query parameter.
    pub fn forbid_invalid_cache_hash(self) -> Self {
        self.set("frontend.page_not_found_on_invalid_cache_hash", true)
    }

    /// Exclude a query parameter from cache-hash calculation.
    pub fn exclude_cache_hash_parameter(mut self, parameter: impl Into<String>) -> Self {
        let parameter = parameter.into();
        self.ops.push(Op::Mutate(Box::new(move |store| {
            store.append("frontend.cache_hash.excluded_parameters", parameter)
        })));
        self
    }

    /// Toggle the deprecation log writer.
    pub fn deprecation_logging(mut self, enabled: bool) -> Self {
        self.ops.push(Op::Mutate(Box::new(move |store| {
            preset::set_deprecation_logging(store, enabled)
        })));
        self
    }

    /// Back the named caches with Redis, one database index per cache.
    pub fn redis_caches(mut self, caching: RedisCaching) -> Self {
        self.ops.push(Op::Mutate(Box::new(move |store| {
            let mut database = caching.start_db;
            for (cache, lifetime) in &caching.caches {
                let prefix = format!("caches.{}", cache);
                store.set(format!("{}.backend", prefix).as_str(), "redis")?;
                store.set(format!("{}.options.database", prefix).as_str(), database)?;
                store.set(
                    format!("{}.options.hostname", prefix).as_str(),
                    caching.host.as_str(),
                )?;
                store.set(format!("{}.options.port", prefix).as_str(), caching.port)?;
                store.set(
                    format!("{}.options.default_lifetime", prefix).as_str(),
                    *lifetime,
                )?;
                database += 1;
            }
            Ok(())
        })));
        self
    }

    /// Relocate the default set of file-backed caches.
    pub fn cache_directory(self, path: impl Into<String>) -> Self {
        let caches = DEFAULT_DIRECTORY_CACHES
            .iter()
            .map(|s| (*s).to_string())
            .collect();
        self.cache_directory_for(path, caches)
    }

    /// Relocate specific file-backed caches.
    pub fn cache_directory_for(
        mut self,
        path: impl Into<String>,
        cache_names: Vec<String>,
    ) -> Self {
        let path = path.into();
        self.ops.push(Op::Mutate(Box::new(move |store| {
            for cache in &cache_names {
                store.set(
                    format!("caches.{}.options.directory", cache).as_str(),
                    path.as_str(),
                )?;
            }
            Ok(())
        })));
        self
    }

    /// Configure the exception handler identifiers used outside and
    /// inside debug mode.
    pub fn exception_handlers(
        self,
        production_handler: impl Into<String>,
        debug_handler: impl Into<String>,
    ) -> Self {
        self.set("system.production_exception_handler", production_handler.into())
            .set("system.debug_exception_handler", debug_handler.into())
    }

    /// Run the pipeline and return the assembled configuration.
    pub fn assemble(self) -> Result<Assembly, ConfigError> {
        let context = match self.context {
            Some(context) => context,
            None => Context::resolve()?,
        };
        debug!(context = %context, "assembling configuration");

        let mut store = ConfigStore::new();

        if self.automatic_defaults {
            self.registry.apply(&mut store, "strict-query-caching")?;
            if context.is_development() {
                self.registry.apply(&mut store, "development")?;
                if Context::local_dev_environment() {
                    self.registry.apply(&mut store, "local-dev")?;
                }
            } else if context.is_production() {
                self.registry.apply(&mut store, "production")?;
            }
        }

        if let Some(base_path) = &self.base_path {
            let base_path = dunce::canonicalize(base_path).unwrap_or_else(|_| base_path.clone());
            layers::load_layers(&mut store, &context, &base_path)?;
        }

        for op in self.ops {
            match op {
                Op::Preset(name) => self.registry.apply(&mut store, &name)?,
                Op::Mutate(f) => f(&mut store)?,
            }
        }

        // The label goes on last so fragments cannot clobber it.
        if self.automatic_defaults && !context.is_production() {
            append_context_label(&mut store, &context)?;
        }

        Ok(Assembly { context, store })
    }
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new()
    }
}

/// Suffix the site name with the context so non-production instances
/// are recognizable at a glance.
fn append_context_label(store: &mut ConfigStore, context: &Context) -> Result<(), ConfigError> {
    let label = match store.get_str("site.name") {
        Ok(name) => format!("{} - {}", name, context),
        // Only an absent name takes the bare-context fallback; a
        // non-string name is a real misconfiguration.
        Err(ConfigError::KeyNotFound(_)) => context.to_string(),
        Err(e) => return Err(e),
    };
    store.set("site.name", label)
}
