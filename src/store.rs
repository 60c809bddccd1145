//! Configuration store: a key-path tree populated once during assembly.
//!
//! The store is mutated only by the assembly pipeline (presets, fragment
//! layers, explicit builder calls) and is handed to the embedding
//! application as a read-only snapshot afterwards. Two merge strategies
//! exist: override merge (later writer wins, used by fragment layering)
//! and backfill merge (existing values win, defaults only fill gaps).

use crate::error::ConfigError;
use toml::value::Table;
use toml::Value;

/// Split a dotted key path into segments, rejecting empty paths and
/// empty segments (`"a..b"`, `".a"`).
fn parse_key_path(path: &str) -> Result<Vec<&str>, ConfigError> {
    if path.is_empty() {
        return Err(ConfigError::InvalidKeyPath(path.to_string()));
    }
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(ConfigError::InvalidKeyPath(path.to_string()));
    }
    Ok(segments)
}

/// Mutable configuration tree keyed by dotted paths.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigStore {
    root: Table,
}

impl ConfigStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing table (e.g. a parsed fragment) as a store.
    pub fn from_table(root: Table) -> Self {
        Self { root }
    }

    /// Borrow the underlying table.
    pub fn as_table(&self) -> &Table {
        &self.root
    }

    /// Consume the store, returning the underlying table.
    pub fn into_table(self) -> Table {
        self.root
    }

    /// Set a value at a dotted path, creating intermediate tables as
    /// needed. Last writer wins; a non-table intermediate is replaced.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> Result<(), ConfigError> {
        let segments = parse_key_path(path)?;
        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| ConfigError::InvalidKeyPath(path.to_string()))?;

        let mut current = &mut self.root;
        for segment in parents {
            let entry = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Table(Table::new()));
            if !entry.is_table() {
                *entry = Value::Table(Table::new());
            }
            current = entry
                .as_table_mut()
                .ok_or_else(|| ConfigError::InvalidKeyPath(path.to_string()))?;
        }
        current.insert(last.to_string(), value.into());
        Ok(())
    }

    /// Read the value at a dotted path.
    pub fn get(&self, path: &str) -> Result<&Value, ConfigError> {
        let segments = parse_key_path(path)?;
        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| ConfigError::InvalidKeyPath(path.to_string()))?;

        let mut current = &self.root;
        for segment in parents {
            current = current
                .get(*segment)
                .and_then(Value::as_table)
                .ok_or_else(|| ConfigError::KeyNotFound(path.to_string()))?;
        }
        current
            .get(*last)
            .ok_or_else(|| ConfigError::KeyNotFound(path.to_string()))
    }

    /// Whether a value exists at the given path.
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_ok()
    }

    /// Append a value to the array at the given path, creating the
    /// array if absent.
    pub fn append(&mut self, path: &str, value: impl Into<Value>) -> Result<(), ConfigError> {
        let segments = parse_key_path(path)?;
        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| ConfigError::InvalidKeyPath(path.to_string()))?;

        let mut current = &mut self.root;
        for segment in parents {
            let entry = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Table(Table::new()));
            if !entry.is_table() {
                *entry = Value::Table(Table::new());
            }
            current = entry
                .as_table_mut()
                .ok_or_else(|| ConfigError::InvalidKeyPath(path.to_string()))?;
        }

        let entry = current
            .entry(last.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        match entry {
            Value::Array(items) => {
                items.push(value.into());
                Ok(())
            }
            _ => Err(ConfigError::TypeMismatch {
                path: path.to_string(),
                expected: "array".to_string(),
            }),
        }
    }

    /// Backfill merge: defaults only fill keys that are absent, at any
    /// depth. Pre-existing values are never overwritten.
    pub fn merge_defaults(&mut self, path: &str, defaults: Value) -> Result<(), ConfigError> {
        if !self.contains(path) {
            return self.set(path, defaults);
        }
        let slot = self.get_mut(path)?;
        backfill(slot, defaults);
        Ok(())
    }

    /// Override merge: supplied values win, tables merge recursively.
    pub fn merge_overrides(&mut self, path: &str, value: Value) -> Result<(), ConfigError> {
        if !self.contains(path) {
            return self.set(path, value);
        }
        let slot = self.get_mut(path)?;
        override_merge(slot, value);
        Ok(())
    }

    /// Override-merge a whole table into the store root. Used by the
    /// layered file loader, so later fragments win over earlier ones.
    pub fn merge_table(&mut self, table: Table) {
        for (key, value) in table {
            match self.root.get_mut(&key) {
                Some(slot) => override_merge(slot, value),
                None => {
                    self.root.insert(key, value);
                }
            }
        }
    }

    /// Read a boolean at the given path.
    pub fn get_bool(&self, path: &str) -> Result<bool, ConfigError> {
        self.get(path)?
            .as_bool()
            .ok_or_else(|| ConfigError::TypeMismatch {
                path: path.to_string(),
                expected: "boolean".to_string(),
            })
    }

    /// Read a string at the given path.
    pub fn get_str(&self, path: &str) -> Result<&str, ConfigError> {
        self.get(path)?
            .as_str()
            .ok_or_else(|| ConfigError::TypeMismatch {
                path: path.to_string(),
                expected: "string".to_string(),
            })
    }

    /// Read an integer at the given path.
    pub fn get_int(&self, path: &str) -> Result<i64, ConfigError> {
        self.get(path)?
            .as_integer()
            .ok_or_else(|| ConfigError::TypeMismatch {
                path: path.to_string(),
                expected: "integer".to_string(),
            })
    }

    /// Render the tree as pretty TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(&self.root).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Render the tree as pretty JSON.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(&self.root).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    fn get_mut(&mut self, path: &str) -> Result<&mut Value, ConfigError> {
        let segments = parse_key_path(path)?;
        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| ConfigError::InvalidKeyPath(path.to_string()))?;

        let mut current = &mut self.root;
        for segment in parents {
            current = current
                .get_mut(*segment)
                .and_then(Value::as_table_mut)
                .ok_or_else(|| ConfigError::KeyNotFound(path.to_string()))?;
        }
        current
            .get_mut(*last)
            .ok_or_else(|| ConfigError::KeyNotFound(path.to_string()))
    }
}

/// Recursive backfill: existing values win, defaults fill absent keys.
/// A scalar/table mismatch keeps the existing value untouched.
fn backfill(existing: &mut Value, defaults: Value) {
    if let (Value::Table(current), Value::Table(defaults)) = (existing, defaults) {
        for (key, value) in defaults {
            match current.get_mut(&key) {
                Some(slot) => backfill(slot, value),
                None => {
                    current.insert(key, value);
                }
            }
        }
    }
}

/// Recursive override: tables merge key-by-key, anything else is
/// replaced by the incoming value.
fn override_merge(existing: &mut Value, incoming: Value) {
    match (existing, incoming) {
        (Value::Table(current), Value::Table(incoming)) => {
            for (key, value) in incoming {
                match current.get_mut(&key) {
                    Some(slot) => override_merge(slot, value),
                    None => {
                        current.insert(key, value);
                    }
                }
            }
        }
        (existing, incoming) => *existing = incoming,
    }
}
