//! kubedump - dump Kubernetes objects as re-appliable YAML manifests
//!
//! Dumps the whole cluster, one namespace, or a single object together with
//! everything it owns.

mod cli;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use cli::{ConfigSubcommand, Connection, DumpArgs};

/// kubedump - dump Kubernetes objects as re-appliable YAML manifests
#[derive(Parser, Debug)]
#[command(name = "kubedump", version)]
#[command(about = "Dump Kubernetes objects as re-appliable YAML manifests", long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(long, short = 'd', global = true)]
    debug: bool,

    /// Path to the kubeconfig file
    #[arg(long, global = true)]
    kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to use
    #[arg(long, global = true)]
    context: Option<String>,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Main commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Dump objects from the cluster
    Dump(DumpArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    cli::init_logging(args.debug);

    let connection = Connection {
        kubeconfig: args.kubeconfig,
        context: args.context,
    };

    match args.command {
        Command::Dump(dump) => {
            cli::handle_dump_command(dump, &connection, args.config.as_deref()).await
        }
        Command::Config { subcommand } => {
            cli::handle_config_command(subcommand, args.config.as_deref())
        }
    }
}
