//! Configuration for kubedump
//!
//! A single YAML file supplies dump defaults; environment variables and
//! command line flags override it.

pub mod loader;
pub mod paths;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::Config;
