//! Shared helpers for integration tests.

use std::path::Path;
use std::sync::Mutex;

/// Serializes access to process environment variables. Tests that set
/// STRATA_CONTEXT or STRATA_LOCAL_DEV must hold this lock; cargo runs
/// tests in the same binary in parallel.
pub static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Write a fragment file below `base`, creating parent directories.
pub fn write_fragment(base: &Path, rel: &str, contents: &str) {
    let path = base.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

/// Run `f` with an env var set, restoring the previous state after.
/// Caller must hold [`ENV_MUTEX`].
pub fn with_env_var<T>(key: &str, value: Option<&str>, f: impl FnOnce() -> T) -> T {
    let original = std::env::var(key).ok();
    match value {
        Some(value) => std::env::set_var(key, value),
        None => std::env::remove_var(key),
    }
    let result = f();
    match original {
        Some(original) => std::env::set_var(key, original),
        None => std::env::remove_var(key),
    }
    result
}
