//! Flat dumps for whole-cluster and namespace modes
//!
//! Every listed object is written to
//! `global/<Kind>/<Name>.yaml` (cluster-scoped types) or
//! `namespaces/<Namespace>/<Kind>/<Name>.yaml` (namespaced types).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::DumpError;
use super::enumerator::ItemProcessor;
use super::manifest::store_manifest;
use crate::models::{ResourceIdentity, ResourceTypeDescriptor};
use crate::storage::StorageWriter;

const GLOBAL_DIR: &str = "global";
const NAMESPACES_DIR: &str = "namespaces";

/// Output path of an object in a flat dump
pub fn flat_path(data_dir: &Path, identity: &ResourceIdentity) -> PathBuf {
    let base = match identity.request_namespace() {
        Some(ns) => data_dir.join(NAMESPACES_DIR).join(ns),
        None => data_dir.join(GLOBAL_DIR),
    };
    base.join(&identity.kind).join(format!("{}.yaml", identity.name))
}

pub struct FlatDumper<'a> {
    storage: &'a dyn StorageWriter,
    data_dir: &'a Path,
    sanitize: bool,
    written: Vec<PathBuf>,
}

impl<'a> FlatDumper<'a> {
    pub fn new(storage: &'a dyn StorageWriter, data_dir: &'a Path, sanitize: bool) -> Self {
        Self {
            storage,
            data_dir,
            sanitize,
            written: Vec::new(),
        }
    }

    /// Paths written so far, in write order
    pub fn into_written(self) -> Vec<PathBuf> {
        self.written
    }
}

#[async_trait]
impl<'a> ItemProcessor for FlatDumper<'a> {
    async fn process(
        &mut self,
        resource: &Arc<ResourceTypeDescriptor>,
        items: Vec<Value>,
    ) -> Result<(), DumpError> {
        for obj in items {
            let Some(identity) = ResourceIdentity::from_object(resource, &obj) else {
                tracing::warn!("Skipping unnamed {} object", resource);
                continue;
            };
            let path = flat_path(self.data_dir, &identity);
            store_manifest(
                self.storage,
                &path,
                obj,
                &identity.kind,
                &identity.name,
                self.sanitize,
            )?;
            self.written.push(path);
        }
        Ok(())
    }
}
