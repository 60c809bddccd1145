//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::ConfigError;

/// Map domain errors to a string for CLI output.
/// Keeps route handlers thin; extend with stable categories if needed.
pub fn map_error(e: &ConfigError) -> String {
    e.to_string()
}
