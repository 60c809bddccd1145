//! Deployment context resolution.
//!
//! A context is an ordered chain of name segments, e.g. `Production/Qa`.
//! The root segment must come from a small allow-list; sub-segments are
//! free-form and let one root context carry several flavors (Qa,
//! Staging, a developer's machine). The chain drives which presets are
//! applied and which fragment files are loaded.

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// Environment variable that overrides the active context.
pub const CONTEXT_ENV_VAR: &str = "STRATA_CONTEXT";

/// Environment variable marking a local development environment
/// (containerized dev setups export this).
pub const LOCAL_DEV_ENV_VAR: &str = "STRATA_LOCAL_DEV";

/// Fallback context when no override is present.
const DEFAULT_CONTEXT: &str = "Production";

/// Allow-listed root context names, canonical casing.
const ALLOWED_ROOTS: [&str; 3] = ["Development", "Testing", "Production"];

/// Resolved deployment context: a finite root-to-leaf segment chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Context {
    segments: Vec<String>,
}

impl Context {
    /// Parse a context name like `Production/Qa`. The root segment is
    /// matched case-insensitively against the allow-list and stored in
    /// canonical casing; sub-segments are kept as given.
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ConfigError::InvalidContext(name.to_string()));
        }

        let mut segments: Vec<String> = Vec::new();
        for segment in name.split('/') {
            if segment.is_empty() {
                return Err(ConfigError::InvalidContext(name.to_string()));
            }
            segments.push(segment.to_string());
        }

        let canonical_root = ALLOWED_ROOTS
            .iter()
            .find(|root| root.eq_ignore_ascii_case(&segments[0]))
            .ok_or_else(|| ConfigError::InvalidContext(name.to_string()))?;
        segments[0] = (*canonical_root).to_string();

        Ok(Self { segments })
    }

    /// Resolve the active context from `STRATA_CONTEXT`, falling back
    /// to `Production` when unset or blank.
    pub fn resolve() -> Result<Self, ConfigError> {
        match std::env::var(CONTEXT_ENV_VAR) {
            Ok(value) if !value.trim().is_empty() => Self::parse(&value),
            _ => Self::parse(DEFAULT_CONTEXT),
        }
    }

    /// Whether the process runs inside a local development environment
    /// (`STRATA_LOCAL_DEV` set to a truthy value).
    pub fn local_dev_environment() -> bool {
        matches!(
            std::env::var(LOCAL_DEV_ENV_VAR).as_deref(),
            Ok(v) if v.eq_ignore_ascii_case("true") || v == "1"
        )
    }

    /// The root segment (`Production` for `Production/Qa`).
    pub fn root(&self) -> &str {
        &self.segments[0]
    }

    /// The most specific segment (`Qa` for `Production/Qa`).
    pub fn leaf(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }

    /// All segments, root first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The parent context, or `None` at the root.
    pub fn parent(&self) -> Option<Context> {
        if self.segments.len() <= 1 {
            None
        } else {
            Some(Context {
                segments: self.segments[..self.segments.len() - 1].to_vec(),
            })
        }
    }

    /// Ancestor chain from root to this context, most general first:
    /// `Production/Qa` yields `[Production, Production/Qa]`.
    pub fn ancestors(&self) -> Vec<Context> {
        (1..=self.segments.len())
            .map(|len| Context {
                segments: self.segments[..len].to_vec(),
            })
            .collect()
    }

    pub fn is_development(&self) -> bool {
        self.root() == "Development"
    }

    pub fn is_testing(&self) -> bool {
        self.root() == "Testing"
    }

    pub fn is_production(&self) -> bool {
        self.root() == "Production"
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

impl FromStr for Context {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
