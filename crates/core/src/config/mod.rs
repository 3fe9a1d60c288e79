//! Configuration loading and schema definitions
//!
//! Settings shared by the backend client and the CLI, read from `infraplan.toml`.

mod loader;
mod schema;

pub use loader::{parse, Config};
pub use schema::*;
