//! In-memory cluster backend
//!
//! Serves a fixed set of resource types and objects through `ClusterApi`,
//! including paginated listing and equality-based label selectors. Used to
//! exercise the dump pipeline in tests.

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::{ClusterApi, ClusterError, Page, PageRequest};
use crate::models::{GroupKind, ResourceTypeDescriptor, object_kind, object_name, object_namespace};

/// A cluster whose state lives entirely in memory
#[derive(Debug, Default)]
pub struct InMemoryCluster {
    types: Vec<ResourceTypeDescriptor>,
    objects: BTreeMap<GroupKind, Vec<Value>>,
    /// Types that are registered but have no storage behind them
    unbacked: HashSet<GroupKind>,
    /// Types whose list calls fail outright
    broken: HashSet<GroupKind>,
    /// Objects that are listed but gone by the time they are fetched
    vanished: HashSet<(String, Option<String>, String)>,
    list_log: Mutex<Vec<(GroupKind, PageRequest)>>,
}

impl InMemoryCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource type
    pub fn with_type(mut self, resource: ResourceTypeDescriptor) -> Self {
        self.objects.entry(resource.group_kind()).or_default();
        self.types.push(resource);
        self
    }

    /// Add an object; its `apiVersion` and `kind` select the type it belongs to
    pub fn with_object(mut self, obj: Value) -> Self {
        let api_version = obj.get("apiVersion").and_then(|v| v.as_str()).unwrap_or("v1");
        let group = api_version.rsplit_once('/').map(|(g, _)| g).unwrap_or("");
        let kind = object_kind(&obj).unwrap_or_default();
        self.objects
            .entry(GroupKind::new(group, kind))
            .or_default()
            .push(obj);
        self
    }

    /// Make list calls for a type report "not found"
    pub fn with_unbacked_type(mut self, group_kind: GroupKind) -> Self {
        self.unbacked.insert(group_kind);
        self
    }

    /// Make list calls for a type fail with a non-recoverable error
    pub fn with_broken_type(mut self, group_kind: GroupKind) -> Self {
        self.broken.insert(group_kind);
        self
    }

    /// Keep an object in listings but report it missing on `get`
    pub fn with_vanished_object(mut self, kind: &str, namespace: Option<&str>, name: &str) -> Self {
        self.vanished.insert((
            kind.to_string(),
            namespace.map(str::to_string),
            name.to_string(),
        ));
        self
    }

    /// Every list request served so far, in order
    pub fn list_requests(&self) -> Vec<(GroupKind, PageRequest)> {
        self.list_log
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    fn objects_of(&self, resource: &ResourceTypeDescriptor) -> &[Value] {
        self.objects
            .get(&resource.group_kind())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

#[async_trait]
impl ClusterApi for InMemoryCluster {
    async fn discover(&self) -> Result<Vec<ResourceTypeDescriptor>, ClusterError> {
        Ok(self.types.clone())
    }

    async fn list(
        &self,
        resource: &ResourceTypeDescriptor,
        namespace: Option<&str>,
        page: &PageRequest,
    ) -> Result<Page, ClusterError> {
        let group_kind = resource.group_kind();
        if let Ok(mut log) = self.list_log.lock() {
            log.push((group_kind.clone(), page.clone()));
        }
        if self.broken.contains(&group_kind) {
            return Err(ClusterError::Unavailable(format!("listing {} failed", resource)));
        }
        if self.unbacked.contains(&group_kind) {
            return Err(ClusterError::not_found(resource, ""));
        }

        let matching: Vec<&Value> = self
            .objects_of(resource)
            .iter()
            .filter(|obj| match namespace {
                Some(ns) if resource.namespaced => object_namespace(obj).as_deref() == Some(ns),
                _ => true,
            })
            .filter(|obj| {
                page.label_selector
                    .as_deref()
                    .is_none_or(|selector| matches_selector(obj, selector))
            })
            .collect();

        let offset = match page.continue_token.as_deref() {
            Some(token) if !token.is_empty() => token
                .parse::<usize>()
                .map_err(|_| ClusterError::Unavailable(format!("invalid continue token {token:?}")))?,
            _ => 0,
        };
        let limit = if page.limit == 0 {
            matching.len()
        } else {
            page.limit as usize
        };
        let end = (offset + limit).min(matching.len());
        let items = matching
            .get(offset..end)
            .unwrap_or_default()
            .iter()
            .map(|obj| (*obj).clone())
            .collect();
        let continue_token = (end < matching.len()).then(|| end.to_string());

        Ok(Page {
            items,
            continue_token,
        })
    }

    async fn get(
        &self,
        resource: &ResourceTypeDescriptor,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<Value, ClusterError> {
        let key = (
            resource.kind.clone(),
            namespace.map(str::to_string),
            name.to_string(),
        );
        if self.vanished.contains(&key) {
            return Err(ClusterError::not_found(resource, name));
        }

        self.objects_of(resource)
            .iter()
            .find(|obj| {
                object_name(obj) == Some(name)
                    && (!resource.namespaced || object_namespace(obj).as_deref() == namespace)
            })
            .cloned()
            .ok_or_else(|| ClusterError::not_found(resource, name))
    }
}

/// Match `key=value`, `key==value`, `key!=value` and bare `key` terms
fn matches_selector(obj: &Value, selector: &str) -> bool {
    let labels = obj.get("metadata").and_then(|m| m.get("labels"));
    let label = |key: &str| {
        labels
            .and_then(|l| l.get(key.trim()))
            .and_then(|v| v.as_str())
    };

    selector
        .split(',')
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .all(|term| {
            if let Some((key, value)) = term.split_once("!=") {
                label(key) != Some(value.trim())
            } else if let Some((key, value)) = term.split_once("==").or_else(|| term.split_once('=')) {
                label(key) == Some(value.trim())
            } else {
                label(term).is_some()
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn configmaps() -> ResourceTypeDescriptor {
        ResourceTypeDescriptor::new("", "v1", "configmaps", "ConfigMap", true)
    }

    fn configmap(ns: &str, name: &str, app: &str) -> Value {
        json!({
            "apiVersion": "v1",
            "kind": "ConfigMap",
            "metadata": {"name": name, "namespace": ns, "labels": {"app": app}}
        })
    }

    #[tokio::test]
    async fn test_list_filters_namespace_and_labels() {
        let cluster = InMemoryCluster::new()
            .with_type(configmaps())
            .with_object(configmap("a", "one", "web"))
            .with_object(configmap("a", "two", "db"))
            .with_object(configmap("b", "three", "web"));

        let page = PageRequest {
            limit: 10,
            continue_token: None,
            label_selector: Some("app=web".to_string()),
        };
        let all = cluster.list(&configmaps(), None, &page).await.unwrap();
        assert_eq!(all.items.len(), 2);

        let scoped = cluster.list(&configmaps(), Some("a"), &page).await.unwrap();
        assert_eq!(scoped.items.len(), 1);
        assert_eq!(object_name(&scoped.items[0]), Some("one"));
    }

    #[tokio::test]
    async fn test_list_pages_with_continue_token() {
        let cluster = InMemoryCluster::new()
            .with_type(configmaps())
            .with_object(configmap("a", "one", "web"))
            .with_object(configmap("a", "two", "web"))
            .with_object(configmap("a", "three", "web"));

        let mut request = PageRequest {
            limit: 2,
            ..Default::default()
        };
        let first = cluster.list(&configmaps(), None, &request).await.unwrap();
        assert_eq!(first.items.len(), 2);
        assert_eq!(first.next_token(), Some("2"));

        request.continue_token = first.continue_token.clone();
        let second = cluster.list(&configmaps(), None, &request).await.unwrap();
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.next_token(), None);
    }

    #[tokio::test]
    async fn test_get_reports_not_found() {
        let cluster = InMemoryCluster::new()
            .with_type(configmaps())
            .with_object(configmap("a", "one", "web"))
            .with_vanished_object("ConfigMap", Some("a"), "one");

        let err = cluster.get(&configmaps(), Some("a"), "one").await.unwrap_err();
        assert!(err.is_not_found());
        let err = cluster.get(&configmaps(), Some("a"), "missing").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_selector_terms() {
        let obj = configmap("a", "one", "web");
        assert!(matches_selector(&obj, "app=web"));
        assert!(matches_selector(&obj, "app==web, app"));
        assert!(matches_selector(&obj, "app!=db"));
        assert!(!matches_selector(&obj, "tier"));
        assert!(!matches_selector(&obj, "app=web,tier=frontend"));
    }
}
