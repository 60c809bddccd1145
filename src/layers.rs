//! Layered fragment loading.
//!
//! For every ancestor of the resolved context, most general first, a
//! TOML fragment named after the lowercased context chain is looked up
//! under the base path and merged into the store with override
//! semantics. A more specific layer therefore always wins over a more
//! general one for the same key. Missing fragments are not an error:
//! they just mean "no override for this layer".

use crate::context::Context;
use crate::error::ConfigError;
use crate::store::ConfigStore;
use std::path::{Path, PathBuf};
use toml::value::Table;
use tracing::debug;

/// Fragment file extension.
pub const FRAGMENT_EXTENSION: &str = "toml";

/// Relative fragment path for a context: lowercased segments joined as
/// directories, e.g. `Production/Qa` → `production/qa.toml`.
pub fn fragment_relative_path(context: &Context) -> PathBuf {
    let mut path = PathBuf::new();
    let segments = context.segments();
    for segment in &segments[..segments.len() - 1] {
        path.push(segment.to_lowercase());
    }
    // The extension is appended by hand: set_extension would treat a
    // dot inside a free-form leaf segment as an extension boundary and
    // drop everything after it.
    if let Some(leaf) = segments.last() {
        path.push(format!("{}.{}", leaf.to_lowercase(), FRAGMENT_EXTENSION));
    }
    path
}

/// Apply the context's fragment files under `base_path` in
/// root-to-leaf order. Returns the fragment paths that were applied.
pub fn load_layers(
    store: &mut ConfigStore,
    context: &Context,
    base_path: &Path,
) -> Result<Vec<PathBuf>, ConfigError> {
    let mut applied = Vec::new();
    for ancestor in context.ancestors() {
        let fragment_path = base_path.join(fragment_relative_path(&ancestor));
        if !fragment_path.is_file() {
            debug!(
                fragment = %fragment_path.display(),
                context = %ancestor,
                "no fragment for this layer, skipping"
            );
            continue;
        }
        let table = read_fragment(&fragment_path)?;
        store.merge_table(table);
        debug!(
            fragment = %fragment_path.display(),
            context = %ancestor,
            "fragment applied"
        );
        applied.push(fragment_path);
    }
    Ok(applied)
}

/// Read and parse a fragment that is known to exist. Read or parse
/// failures on a present fragment are fatal, never swallowed.
fn read_fragment(path: &Path) -> Result<Table, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::FragmentLoad {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    toml::from_str(&raw).map_err(|e| ConfigError::FragmentLoad {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
