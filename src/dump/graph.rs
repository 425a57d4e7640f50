//! Owner-reference dependency graph
//!
//! Maps each owner UID to the objects that name it in their
//! `ownerReferences`. An object with several owners is recorded once per
//! owner, so the graph is a forest rather than a tree and may even contain
//! cycles if the references are malformed.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::DumpError;
use super::enumerator::ItemProcessor;
use crate::models::{OwnerKey, ResourceIdentity, ResourceTypeDescriptor, owner_uids};

#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    children: HashMap<OwnerKey, Vec<ResourceIdentity>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Graph whose root key points at `root`
    pub fn rooted_at(root: ResourceIdentity) -> Self {
        let mut graph = Self::new();
        graph.insert(OwnerKey::Root, root);
        graph
    }

    pub fn insert(&mut self, owner: OwnerKey, child: ResourceIdentity) {
        self.children.entry(owner).or_default().push(child);
    }

    /// Record `obj` under every owner it references
    ///
    /// Returns the number of edges added.
    pub fn add_object(&mut self, resource: &Arc<ResourceTypeDescriptor>, obj: &Value) -> usize {
        let owners = owner_uids(obj);
        if owners.is_empty() {
            return 0;
        }
        let Some(identity) = ResourceIdentity::from_object(resource, obj) else {
            return 0;
        };
        for uid in &owners {
            self.insert(OwnerKey::uid(uid.as_str()), identity.clone());
        }
        owners.len()
    }

    /// Children recorded under `owner`, in insertion order
    pub fn children(&self, owner: &OwnerKey) -> &[ResourceIdentity] {
        self.children.get(owner).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of owner keys with at least one child
    pub fn owner_count(&self) -> usize {
        self.children.len()
    }

    pub fn edge_count(&self) -> usize {
        self.children.values().map(Vec::len).sum()
    }
}

#[async_trait]
impl ItemProcessor for DependencyGraph {
    async fn process(
        &mut self,
        resource: &Arc<ResourceTypeDescriptor>,
        items: Vec<Value>,
    ) -> Result<(), DumpError> {
        for obj in &items {
            self.add_object(resource, obj);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pods() -> Arc<ResourceTypeDescriptor> {
        Arc::new(ResourceTypeDescriptor::new("", "v1", "pods", "Pod", true))
    }

    #[test]
    fn test_unowned_objects_are_not_children() {
        let mut graph = DependencyGraph::new();
        let added = graph.add_object(&pods(), &json!({"kind": "Pod", "metadata": {"name": "solo", "namespace": "a"}}));

        assert_eq!(added, 0);
        assert_eq!(graph.owner_count(), 0);
    }

    #[test]
    fn test_multi_owner_fan_out() {
        let mut graph = DependencyGraph::new();
        let obj = json!({
            "kind": "Pod",
            "metadata": {
                "name": "shared",
                "namespace": "a",
                "ownerReferences": [{"uid": "owner-1"}, {"uid": "owner-2"}]
            }
        });

        assert_eq!(graph.add_object(&pods(), &obj), 2);
        assert_eq!(graph.children(&OwnerKey::uid("owner-1"))[0].name, "shared");
        assert_eq!(graph.children(&OwnerKey::uid("owner-2"))[0].name, "shared");
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.children(&OwnerKey::Root).is_empty());
    }

    #[tokio::test]
    async fn test_process_preserves_order() {
        let mut graph = DependencyGraph::new();
        let items = (0..3)
            .map(|i| {
                json!({
                    "kind": "Pod",
                    "metadata": {"name": format!("pod-{i}"), "namespace": "a", "ownerReferences": [{"uid": "rs"}]}
                })
            })
            .collect();

        graph.process(&pods(), items).await.unwrap();

        let names: Vec<_> = graph
            .children(&OwnerKey::uid("rs"))
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["pod-0", "pod-1", "pod-2"]);
    }
}
