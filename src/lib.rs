//! Strata: Environment-Layered Configuration Assembly
//!
//! Assembles an application's configuration tree once at startup from
//! three layered inputs: presets selected by the resolved deployment
//! context, context-dependent TOML fragment files applied root-to-leaf,
//! and explicit builder calls. The result is an owned snapshot handed
//! to the caller; there is no ambient global state.

pub mod assembler;
pub mod cli;
pub mod context;
pub mod error;
pub mod layers;
pub mod logging;
pub mod preset;
pub mod store;

pub use assembler::{Assembler, Assembly, RedisCaching};
pub use context::Context;
pub use error::ConfigError;
pub use preset::PresetRegistry;
pub use store::ConfigStore;
