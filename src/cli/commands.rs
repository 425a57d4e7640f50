//! CLI command handlers

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};

use kubedump::cluster::ClusterApi;
use kubedump::config::{Config, ConfigLoader, paths};
use kubedump::dump::{DumpReport, Dumper};
use kubedump::kube::{KubeCluster, create_client};
use kubedump::models::{KIND_NAMESPACE, TargetSpec};
use kubedump::storage::{FileWriter, clear_dir};

/// Cluster connection flags shared by every command
#[derive(Debug, Clone, Default)]
pub struct Connection {
    pub kubeconfig: Option<PathBuf>,
    pub context: Option<String>,
}

/// Arguments of the `dump` command
#[derive(Args, Debug, Default, Clone)]
pub struct DumpArgs {
    /// Kind of the object to dump; leave empty for the whole cluster, `Namespace` for one namespace
    #[arg(long, default_value = "")]
    pub kind: String,

    /// Name of the object (or namespace) to dump
    #[arg(long, default_value = "")]
    pub name: String,

    /// API version of the object, e.g. `apps/v1`
    #[arg(long, default_value = "v1")]
    pub api_version: String,

    /// Namespace of the object
    #[arg(long, short = 'n')]
    pub namespace: Option<String>,

    /// Directory to write manifests into
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Write objects exactly as the cluster returns them
    #[arg(long)]
    pub no_sanitize: bool,

    /// Only dump objects matching this label selector
    #[arg(long, short = 'l')]
    pub label_selector: Option<String>,

    /// Also dump everything the object owns
    #[arg(long)]
    pub include_dependants: bool,

    /// Resource types to skip, as `Kind.group` (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub ignore_groupkinds: Vec<String>,

    /// Give up after this many seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Empty the data directory first
    #[arg(long)]
    pub clean: bool,

    /// Print the full dump report as YAML
    #[arg(long)]
    pub report: bool,
}

/// Configuration management subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Show configuration file path
    Path,
    /// Print the effective configuration
    Show,
    /// Validate configuration
    Validate,
}

/// Run one dump against the live cluster
pub async fn handle_dump_command(
    args: DumpArgs,
    connection: &Connection,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = ConfigLoader::load(config_path).context("Failed to load configuration")?;
    apply_dump_args(&args, &mut config);
    let options = config.to_dump_options().context("Invalid dump options")?;
    let target = target_from_args(&args)?;

    if config.clean_data_dir {
        clear_dir(&options.data_dir)
            .with_context(|| format!("Failed to clean {}", options.data_dir.display()))?;
    }

    let client = create_client(connection.kubeconfig.as_deref(), connection.context.as_deref())
        .await
        .context("Failed to connect to the cluster")?;
    let cluster = KubeCluster::new(client);

    let report = run_dump(&cluster, options, &target).await?;
    print_summary(&report, args.report)
}

async fn run_dump(
    cluster: &dyn ClusterApi,
    options: kubedump::dump::DumpOptions,
    target: &TargetSpec,
) -> Result<DumpReport> {
    let storage = FileWriter::new();
    Dumper::new(cluster, &storage, options)
        .dump(target)
        .await
        .with_context(|| format!("Failed to dump {}", target))
}

/// Command line flags take precedence over the loaded configuration
fn apply_dump_args(args: &DumpArgs, config: &mut Config) {
    if let Some(data_dir) = &args.data_dir {
        config.data_dir = data_dir.clone();
    }
    if args.no_sanitize {
        config.sanitize = false;
    }
    if let Some(selector) = &args.label_selector {
        config.label_selector = Some(selector.clone());
    }
    if args.include_dependants {
        config.include_dependants = true;
    }
    config
        .ignore_group_kinds
        .extend(args.ignore_groupkinds.iter().filter(|s| !s.is_empty()).cloned());
    if let Some(timeout) = args.timeout {
        config.timeout_seconds = Some(timeout);
    }
    if args.clean {
        config.clean_data_dir = true;
    }
}

fn target_from_args(args: &DumpArgs) -> Result<TargetSpec> {
    match args.kind.as_str() {
        "" => Ok(TargetSpec::cluster()),
        KIND_NAMESPACE => {
            let name = if args.name.is_empty() {
                args.namespace.clone().unwrap_or_default()
            } else {
                args.name.clone()
            };
            if name.is_empty() {
                bail!("--name (or --namespace) is required to dump a namespace");
            }
            Ok(TargetSpec::namespace(name))
        }
        kind => {
            if args.name.is_empty() {
                bail!("--name is required to dump a {}", kind);
            }
            Ok(TargetSpec::object(
                args.api_version.as_str(),
                kind,
                args.name.as_str(),
                args.namespace.clone(),
            ))
        }
    }
}

fn print_summary(report: &DumpReport, full: bool) -> Result<()> {
    if full {
        let yaml = serde_yaml::to_string(report).context("Failed to serialize dump report")?;
        print!("{}", yaml);
        return Ok(());
    }

    println!("Wrote {} files ({} mode)", report.written.len(), report.mode);
    if !report.skipped.is_empty() {
        println!("Skipped {} objects:", report.skipped.len());
        for skipped in &report.skipped {
            match &skipped.namespace {
                Some(ns) => println!("  {} {}/{}: {}", skipped.kind, ns, skipped.name, skipped.reason),
                None => println!("  {} {}: {}", skipped.kind, skipped.name, skipped.reason),
            }
        }
    }
    if report.cycles_broken > 0 {
        println!("Broke {} owner-reference cycles", report.cycles_broken);
    }
    Ok(())
}

/// Handle configuration subcommands
pub fn handle_config_command(cmd: ConfigSubcommand, config_path: Option<&Path>) -> Result<()> {
    match cmd {
        ConfigSubcommand::Path => {
            let path = config_path
                .map(Path::to_path_buf)
                .unwrap_or_else(paths::root_config_path);
            println!("{}", path.display());
        }
        ConfigSubcommand::Show => {
            let config = ConfigLoader::load(config_path).context("Failed to load configuration")?;
            let yaml = serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
            print!("{}", yaml);
        }
        ConfigSubcommand::Validate => {
            ConfigLoader::validate(config_path).context("Configuration validation failed")?;
            println!("Configuration is valid");
        }
    }

    Ok(())
}
