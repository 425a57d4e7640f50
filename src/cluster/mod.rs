//! Cluster connection abstraction
//!
//! The dump pipeline only needs three capabilities from a cluster:
//! discovering resource types, listing one page of a type, and fetching a
//! single object. `ClusterApi` captures exactly that so the pipeline can run
//! against a live API server (`crate::kube::KubeCluster`) or an in-memory
//! object set (`memory::InMemoryCluster`).

pub mod memory;

pub use memory::InMemoryCluster;

use async_trait::async_trait;
use serde_json::Value;

use crate::models::{GroupKind, ResourceTypeDescriptor};

/// Errors reported by a cluster backend
#[derive(Debug, thiserror::Error)]
pub enum ClusterError {
    #[error("{resource} {name:?} not found")]
    NotFound { resource: String, name: String },

    #[error("kubernetes API request failed")]
    Api(#[source] kube::Error),

    #[error("cluster unavailable: {0}")]
    Unavailable(String),
}

impl ClusterError {
    pub fn not_found(resource: &ResourceTypeDescriptor, name: &str) -> Self {
        ClusterError::NotFound {
            resource: resource.to_string(),
            name: name.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClusterError::NotFound { .. })
    }
}

/// Parameters of one paginated list request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageRequest {
    pub limit: u32,
    /// Empty on the first request
    pub continue_token: Option<String>,
    pub label_selector: Option<String>,
}

/// One page of a list response
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub items: Vec<Value>,
    /// `None` (or empty) once the last page has been returned
    pub continue_token: Option<String>,
}

impl Page {
    pub fn next_token(&self) -> Option<&str> {
        self.continue_token.as_deref().filter(|t| !t.is_empty())
    }
}

/// Read access to a cluster
#[async_trait]
pub trait ClusterApi: Send + Sync {
    /// Resource types the cluster serves, one preferred version per group
    async fn discover(&self) -> Result<Vec<ResourceTypeDescriptor>, ClusterError>;

    /// List one page of objects of `resource`
    ///
    /// `namespace` restricts the listing for namespaced types; `None` lists
    /// across all namespaces.
    async fn list(
        &self,
        resource: &ResourceTypeDescriptor,
        namespace: Option<&str>,
        page: &PageRequest,
    ) -> Result<Page, ClusterError>;

    /// Fetch one object
    async fn get(
        &self,
        resource: &ResourceTypeDescriptor,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<Value, ClusterError>;
}

/// Find the discovered type serving `group_kind`
///
/// An exact version match wins; otherwise the preferred version reported by
/// discovery is used.
pub fn resolve_resource_type<'a>(
    types: &'a [ResourceTypeDescriptor],
    group_kind: &GroupKind,
    version: &str,
) -> Option<&'a ResourceTypeDescriptor> {
    let mut candidates = types
        .iter()
        .filter(|t| !t.is_subresource())
        .filter(|t| t.group == group_kind.group && t.kind == group_kind.kind)
        .peekable();
    let first = *candidates.peek()?;
    Some(
        candidates
            .find(|t| t.version == version)
            .unwrap_or(first),
    )
}
