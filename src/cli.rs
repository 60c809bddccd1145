//! CLI domain: parse, route, and output only. No assembly logic here;
//! the route table dispatches into the library.

mod output;
mod parse;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands};
pub use route::run;
