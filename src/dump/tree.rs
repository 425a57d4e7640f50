//! Tree materializer
//!
//! Walks a `DependencyGraph` from its root key, fetching each object live,
//! and writes it at a path that mirrors its ownership chain:
//!
//! ```text
//! <dataDir>/coredns.yaml                                   root
//! <dataDir>/ReplicaSet/coredns-5d78/coredns-5d78.yaml      owned by root
//! <dataDir>/ReplicaSet/coredns-5d78/Pod/coredns-5d78-x/coredns-5d78-x.yaml
//! ```
//!
//! The walk keeps its own stack instead of recursing, and refuses to enter
//! an owner that is already on the current path.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::manifest::store_manifest;
use super::{DumpError, DumpReport, MissingObjectPolicy, SkippedObject};
use crate::cluster::ClusterApi;
use crate::models::{OwnerKey, ResourceIdentity, object_kind, object_uid};
use crate::storage::StorageWriter;

use super::graph::DependencyGraph;

pub struct TreeMaterializer<'a> {
    cluster: &'a dyn ClusterApi,
    storage: &'a dyn StorageWriter,
    data_dir: &'a Path,
    sanitize: bool,
    missing_objects: MissingObjectPolicy,
}

/// One owner whose children are being written
struct Frame<'g> {
    owner: OwnerKey,
    prefix: PathBuf,
    children: std::slice::Iter<'g, ResourceIdentity>,
}

/// What the walk needs to know about a written object
struct Written {
    uid: Option<String>,
    kind: String,
}

impl<'a> TreeMaterializer<'a> {
    pub fn new(
        cluster: &'a dyn ClusterApi,
        storage: &'a dyn StorageWriter,
        data_dir: &'a Path,
        sanitize: bool,
        missing_objects: MissingObjectPolicy,
    ) -> Self {
        Self {
            cluster,
            storage,
            data_dir,
            sanitize,
            missing_objects,
        }
    }

    /// Write every object reachable from the graph's root key
    pub async fn materialize(
        &self,
        graph: &DependencyGraph,
        report: &mut DumpReport,
    ) -> Result<(), DumpError> {
        let mut active: HashSet<OwnerKey> = HashSet::from([OwnerKey::Root]);
        let mut stack = vec![Frame {
            owner: OwnerKey::Root,
            prefix: self.data_dir.to_path_buf(),
            children: graph.children(&OwnerKey::Root).iter(),
        }];

        while let Some(frame) = stack.last_mut() {
            let Some(child) = frame.children.next() else {
                if let Some(done) = stack.pop() {
                    active.remove(&done.owner);
                }
                continue;
            };
            let at_root = frame.owner.is_root();
            let prefix = frame.prefix.clone();

            let Some(written) = self.write_object(child, &prefix, at_root, report).await? else {
                continue;
            };
            let Some(uid) = written.uid else {
                continue;
            };

            let key = OwnerKey::Uid(uid);
            if active.contains(&key) {
                tracing::warn!("Owner cycle at {}, not descending again", child);
                report.cycles_broken += 1;
                continue;
            }

            let child_prefix = if at_root {
                prefix
            } else {
                prefix.join(&written.kind).join(&child.name)
            };
            stack.push(Frame {
                children: graph.children(&key).iter(),
                owner: key.clone(),
                prefix: child_prefix,
            });
            active.insert(key);
        }

        Ok(())
    }

    /// Fetch one object and write it under `prefix`
    ///
    /// Returns `None` when the object vanished and the policy allows skipping it.
    async fn write_object(
        &self,
        identity: &ResourceIdentity,
        prefix: &Path,
        at_root: bool,
        report: &mut DumpReport,
    ) -> Result<Option<Written>, DumpError> {
        let obj = match self
            .cluster
            .get(&identity.resource, identity.request_namespace(), &identity.name)
            .await
        {
            Ok(obj) => obj,
            Err(e) if e.is_not_found() && self.missing_objects == MissingObjectPolicy::Skip => {
                tracing::warn!("Skipping {}: {}", identity, e);
                report.skipped.push(SkippedObject::new(identity, e.to_string()));
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let uid = object_uid(&obj).map(str::to_string);
        let kind = object_kind(&obj).unwrap_or(&identity.kind).to_string();
        let path = object_path(prefix, &kind, &identity.name, at_root);

        store_manifest(self.storage, &path, obj, &kind, &identity.name, self.sanitize)?;
        report.written.push(path);

        Ok(Some(Written { uid, kind }))
    }
}

/// `<prefix>/<name>.yaml` for the root, `<prefix>/<Kind>/<name>/<name>.yaml` below it
fn object_path(prefix: &Path, kind: &str, name: &str, at_root: bool) -> PathBuf {
    let file = format!("{name}.yaml");
    if at_root {
        prefix.join(file)
    } else {
        prefix.join(kind).join(name).join(file)
    }
}
