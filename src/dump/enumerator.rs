//! Resource enumeration
//!
//! Walks every dumpable resource type the cluster serves and lists its
//! instances page by page, handing each page to an `ItemProcessor`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::DumpError;
use crate::cluster::{ClusterApi, PageRequest};
use crate::models::{GroupKind, ResourceTypeDescriptor};

/// Page size used for list requests unless configured otherwise
pub const DEFAULT_PAGE_SIZE: u32 = 250;

/// Consumer of enumerated objects
#[async_trait]
pub trait ItemProcessor: Send {
    /// Handle one page of objects of `resource`
    async fn process(
        &mut self,
        resource: &Arc<ResourceTypeDescriptor>,
        items: Vec<Value>,
    ) -> Result<(), DumpError>;
}

/// Lists the instances of every resource type in scope
pub struct ResourceEnumerator<'a> {
    cluster: &'a dyn ClusterApi,
    namespace: Option<String>,
    label_selector: Option<String>,
    ignore_group_kinds: Vec<GroupKind>,
    page_size: u32,
}

impl<'a> ResourceEnumerator<'a> {
    pub fn new(cluster: &'a dyn ClusterApi) -> Self {
        Self {
            cluster,
            namespace: None,
            label_selector: None,
            ignore_group_kinds: Vec::new(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Restrict enumeration to one namespace; cluster-scoped types are skipped
    pub fn namespace(mut self, namespace: Option<String>) -> Self {
        self.namespace = namespace.filter(|ns| !ns.is_empty());
        self
    }

    pub fn label_selector(mut self, selector: Option<String>) -> Self {
        self.label_selector = selector.filter(|s| !s.is_empty());
        self
    }

    pub fn ignore_group_kinds(mut self, group_kinds: Vec<GroupKind>) -> Self {
        self.ignore_group_kinds = group_kinds;
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Whether instances of `resource` are enumerated at all
    pub fn in_scope(&self, resource: &ResourceTypeDescriptor) -> bool {
        if !resource.is_dumpable() {
            return false;
        }
        if !resource.namespaced && self.namespace.is_some() {
            return false;
        }
        !self.ignore_group_kinds.contains(&resource.group_kind())
    }

    /// Discover the cluster's types and enumerate the ones in scope
    pub async fn enumerate<P>(&self, processor: &mut P) -> Result<usize, DumpError>
    where
        P: ItemProcessor + ?Sized,
    {
        let types = self.cluster.discover().await?;
        self.enumerate_types(&types, processor).await
    }

    /// Enumerate instances of the in-scope entries of an already discovered catalogue
    ///
    /// Returns the number of objects handed to the processor.
    pub async fn enumerate_types<P>(
        &self,
        types: &[ResourceTypeDescriptor],
        processor: &mut P,
    ) -> Result<usize, DumpError>
    where
        P: ItemProcessor + ?Sized,
    {
        let mut total = 0;
        for resource in types.iter().filter(|t| self.in_scope(t)) {
            let resource = Arc::new(resource.clone());
            total += self.list_instances(&resource, processor).await?;
        }
        Ok(total)
    }

    /// List every instance of one type, following continue tokens until exhausted
    ///
    /// A type that is registered but has no backing storage reports "not found";
    /// that counts as zero instances.
    pub async fn list_instances<P>(
        &self,
        resource: &Arc<ResourceTypeDescriptor>,
        processor: &mut P,
    ) -> Result<usize, DumpError>
    where
        P: ItemProcessor + ?Sized,
    {
        tracing::debug!("Processing {}", resource);

        let mut request = PageRequest {
            limit: self.page_size,
            continue_token: None,
            label_selector: self.label_selector.clone(),
        };
        let mut count = 0;

        loop {
            let page = match self
                .cluster
                .list(resource, self.namespace.as_deref(), &request)
                .await
            {
                Ok(page) => page,
                Err(e) if e.is_not_found() => {
                    tracing::debug!("No storage behind {}, treating as empty", resource);
                    return Ok(count);
                }
                Err(e) => return Err(e.into()),
            };

            let next = page.next_token().map(str::to_string);
            let mut items = page.items;
            for item in &mut items {
                fill_type_meta(resource, item);
            }
            count += items.len();
            processor.process(resource, items).await?;

            match next {
                Some(token) => request.continue_token = Some(token),
                None => break,
            }
        }

        Ok(count)
    }
}

/// List responses may omit `apiVersion`/`kind` on their items
fn fill_type_meta(resource: &ResourceTypeDescriptor, item: &mut Value) {
    let Some(obj) = item.as_object_mut() else {
        return;
    };
    for (field, value) in [("apiVersion", resource.api_version()), ("kind", resource.kind.clone())] {
        let missing = obj
            .get(field)
            .and_then(Value::as_str)
            .is_none_or(str::is_empty);
        if missing {
            obj.insert(field.to_string(), Value::String(value));
        }
    }
}
