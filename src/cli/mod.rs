//! CLI command handling module
//!
//! Handles all CLI subcommands and logging setup.

mod commands;
mod logging;

pub use commands::{Connection, ConfigSubcommand, DumpArgs, handle_config_command, handle_dump_command};
pub use logging::init_logging;
