//! Dump orchestration
//!
//! `Dumper` selects a traversal from the target:
//!
//! - empty kind: whole-cluster flat dump
//! - `Namespace`: flat dump of one namespace's namespaced objects
//! - anything else: the object itself, optionally with everything it owns,
//!   written as a directory tree
//!
//! The returned `DumpReport` lists what was written and what was skipped.

pub mod enumerator;
pub mod flat;
pub mod graph;
pub mod manifest;
pub mod tree;

pub use enumerator::{DEFAULT_PAGE_SIZE, ItemProcessor, ResourceEnumerator};
pub use flat::{FlatDumper, flat_path};
pub use graph::DependencyGraph;
pub use manifest::render_manifest;
pub use tree::TreeMaterializer;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cluster::{ClusterApi, ClusterError, resolve_resource_type};
use crate::models::{GroupKind, KIND_NAMESPACE, ResourceIdentity, TargetSpec};
use crate::sanitize::SanitizeError;
use crate::storage::StorageWriter;

/// Errors that abort a dump
#[derive(Debug, thiserror::Error)]
pub enum DumpError {
    #[error(transparent)]
    Cluster(#[from] ClusterError),

    #[error("failed to sanitize {kind} {name}")]
    Sanitize {
        kind: String,
        name: String,
        #[source]
        source: SanitizeError,
    },

    #[error("failed to serialize {kind} {name}")]
    Serialize {
        kind: String,
        name: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("the cluster serves no resource type {group_kind} (apiVersion {api_version})")]
    UnknownResourceType {
        group_kind: GroupKind,
        api_version: String,
    },

    #[error("{kind} {name} is namespaced, but no namespace was given")]
    NamespaceRequired { kind: String, name: String },

    #[error("dump did not finish within {0:?}")]
    DeadlineExceeded(Duration),

    #[error("invalid dump options: {0}")]
    InvalidOptions(String),
}

/// What to do when an object disappears between enumeration and fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingObjectPolicy {
    /// Log it, record it in the report and carry on with its siblings
    #[default]
    Skip,
    /// Abort the dump
    Fail,
}

/// Traversal chosen for a target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DumpMode {
    Cluster,
    Namespace(String),
    Object,
}

impl DumpMode {
    pub fn select(target: &TargetSpec) -> Self {
        match target.kind.as_str() {
            "" => DumpMode::Cluster,
            KIND_NAMESPACE => DumpMode::Namespace(target.name.clone()),
            _ => DumpMode::Object,
        }
    }
}

impl fmt::Display for DumpMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DumpMode::Cluster => write!(f, "cluster"),
            DumpMode::Namespace(ns) => write!(f, "namespace {ns}"),
            DumpMode::Object => write!(f, "object"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DumpOptions {
    pub data_dir: PathBuf,
    pub sanitize: bool,
    pub label_selector: Option<String>,
    /// Also dump everything the target owns, directly or transitively
    pub include_dependants: bool,
    pub ignore_group_kinds: Vec<GroupKind>,
    pub page_size: u32,
    pub missing_objects: MissingObjectPolicy,
    /// Upper bound for the whole dump
    pub timeout: Option<Duration>,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("kubedump"),
            sanitize: true,
            label_selector: None,
            include_dependants: false,
            ignore_group_kinds: Vec::new(),
            page_size: DEFAULT_PAGE_SIZE,
            missing_objects: MissingObjectPolicy::Skip,
            timeout: None,
        }
    }
}

/// An object that was not dumped, and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedObject {
    pub kind: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub reason: String,
}

impl SkippedObject {
    pub fn new(identity: &ResourceIdentity, reason: impl Into<String>) -> Self {
        Self {
            kind: identity.kind.clone(),
            name: identity.name.clone(),
            namespace: identity.namespace.clone(),
            reason: reason.into(),
        }
    }
}

/// Outcome of a successful dump
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DumpReport {
    pub mode: String,
    pub written: Vec<PathBuf>,
    pub skipped: Vec<SkippedObject>,
    pub cycles_broken: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl DumpReport {
    fn start(mode: &DumpMode) -> Self {
        Self {
            mode: mode.to_string(),
            started_at: Utc::now(),
            ..Self::default()
        }
    }
}

/// Runs dumps against one cluster and one storage writer
pub struct Dumper<'a> {
    cluster: &'a dyn ClusterApi,
    storage: &'a dyn StorageWriter,
    options: DumpOptions,
}

impl<'a> Dumper<'a> {
    pub fn new(cluster: &'a dyn ClusterApi, storage: &'a dyn StorageWriter, options: DumpOptions) -> Self {
        Self {
            cluster,
            storage,
            options,
        }
    }

    /// Dump `target`, bounded by the configured timeout
    ///
    /// On error the data directory may be incomplete; files already written
    /// are left in place.
    pub async fn dump(&self, target: &TargetSpec) -> Result<DumpReport, DumpError> {
        if self.options.page_size == 0 {
            return Err(DumpError::InvalidOptions("page size must be positive".to_string()));
        }

        let mode = DumpMode::select(target);
        tracing::info!("Dumping {} ({} mode) into {}", target, mode, self.options.data_dir.display());

        let run = self.run(target, &mode);
        let mut report = match self.options.timeout {
            Some(limit) => tokio::time::timeout(limit, run)
                .await
                .map_err(|_| DumpError::DeadlineExceeded(limit))??,
            None => run.await?,
        };
        report.finished_at = Some(Utc::now());

        tracing::info!(
            "Wrote {} objects, skipped {}",
            report.written.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    async fn run(&self, target: &TargetSpec, mode: &DumpMode) -> Result<DumpReport, DumpError> {
        let mut report = DumpReport::start(mode);
        match mode {
            DumpMode::Cluster => self.dump_flat(None, &mut report).await?,
            DumpMode::Namespace(ns) => self.dump_flat(Some(ns.clone()), &mut report).await?,
            DumpMode::Object => self.dump_object(target, &mut report).await?,
        }
        Ok(report)
    }

    fn enumerator(&self, namespace: Option<String>) -> ResourceEnumerator<'a> {
        ResourceEnumerator::new(self.cluster)
            .namespace(namespace)
            .label_selector(self.options.label_selector.clone())
            .ignore_group_kinds(self.options.ignore_group_kinds.clone())
            .page_size(self.options.page_size)
    }

    async fn dump_flat(&self, namespace: Option<String>, report: &mut DumpReport) -> Result<(), DumpError> {
        let mut dumper = FlatDumper::new(self.storage, &self.options.data_dir, self.options.sanitize);
        self.enumerator(namespace).enumerate(&mut dumper).await?;
        report.written.extend(dumper.into_written());
        Ok(())
    }

    async fn dump_object(&self, target: &TargetSpec, report: &mut DumpReport) -> Result<(), DumpError> {
        let types = self.cluster.discover().await?;
        let (_, version) = target.group_version();
        let group_kind = target.group_kind();
        let resource = resolve_resource_type(&types, &group_kind, version)
            .cloned()
            .map(Arc::new)
            .ok_or_else(|| DumpError::UnknownResourceType {
                group_kind: group_kind.clone(),
                api_version: target.api_version.clone(),
            })?;

        if self.options.ignore_group_kinds.contains(&resource.group_kind()) {
            return Err(DumpError::InvalidOptions(format!(
                "target type {} is on the ignore list",
                resource.group_kind()
            )));
        }

        let namespace = if resource.namespaced {
            match &target.namespace {
                Some(ns) => Some(ns.as_str()),
                None => {
                    return Err(DumpError::NamespaceRequired {
                        kind: target.kind.clone(),
                        name: target.name.clone(),
                    });
                }
            }
        } else {
            None
        };

        let root_obj = self.cluster.get(&resource, namespace, &target.name).await?;
        let root = ResourceIdentity::from_object(&resource, &root_obj).unwrap_or_else(|| {
            ResourceIdentity::new(resource.clone(), target.name.as_str(), namespace.map(str::to_string))
        });

        let mut graph = DependencyGraph::rooted_at(root.clone());
        if self.options.include_dependants {
            let scope = root.request_namespace().map(str::to_string);
            let listed = self.enumerator(scope).enumerate_types(&types, &mut graph).await?;
            tracing::debug!(
                "Dependency graph: {} objects listed, {} owners, {} edges",
                listed,
                graph.owner_count(),
                graph.edge_count()
            );
        }

        TreeMaterializer::new(
            self.cluster,
            self.storage,
            &self.options.data_dir,
            self.options.sanitize,
            self.options.missing_objects,
        )
        .materialize(&graph, report)
        .await
    }
}
