//! `ClusterApi` over a live API server

use async_trait::async_trait;
use kube::api::ListParams;
use kube::core::{ApiResource, DynamicObject, TypeMeta};
use kube::discovery::{Discovery, Scope};
use kube::{Api, Client};
use serde_json::Value;

use crate::cluster::{ClusterApi, ClusterError, Page, PageRequest};
use crate::models::ResourceTypeDescriptor;

/// Cluster access through a kube-rs client
#[derive(Clone)]
pub struct KubeCluster {
    client: Client,
}

impl KubeCluster {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self, resource: &ResourceTypeDescriptor, namespace: Option<&str>) -> Api<DynamicObject> {
        let api_resource = to_api_resource(resource);
        match namespace {
            Some(ns) if resource.namespaced => {
                Api::namespaced_with(self.client.clone(), ns, &api_resource)
            }
            _ => Api::all_with(self.client.clone(), &api_resource),
        }
    }
}

#[async_trait]
impl ClusterApi for KubeCluster {
    async fn discover(&self) -> Result<Vec<ResourceTypeDescriptor>, ClusterError> {
        let discovery = Discovery::new(self.client.clone())
            .run()
            .await
            .map_err(ClusterError::Api)?;

        let mut types = Vec::new();
        for group in discovery.groups() {
            for (ar, caps) in group.recommended_resources() {
                types.push(ResourceTypeDescriptor {
                    group: ar.group,
                    version: ar.version,
                    plural: ar.plural,
                    kind: ar.kind,
                    namespaced: matches!(caps.scope, Scope::Namespaced),
                    verbs: caps.operations,
                });
            }
        }

        tracing::debug!("Discovered {} resource types", types.len());
        Ok(types)
    }

    async fn list(
        &self,
        resource: &ResourceTypeDescriptor,
        namespace: Option<&str>,
        page: &PageRequest,
    ) -> Result<Page, ClusterError> {
        let mut params = ListParams::default().limit(page.limit);
        if let Some(token) = page.continue_token.as_deref().filter(|t| !t.is_empty()) {
            params = params.continue_token(token);
        }
        if let Some(selector) = page.label_selector.as_deref().filter(|s| !s.is_empty()) {
            params = params.labels(selector);
        }

        let list = self
            .api(resource, namespace)
            .list(&params)
            .await
            .map_err(|e| map_kube_error(e, resource, ""))?;

        let items = list
            .items
            .into_iter()
            .map(|obj| to_value(obj, resource))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page {
            items,
            continue_token: list.metadata.continue_,
        })
    }

    async fn get(
        &self,
        resource: &ResourceTypeDescriptor,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<Value, ClusterError> {
        let obj = self
            .api(resource, namespace)
            .get(name)
            .await
            .map_err(|e| map_kube_error(e, resource, name))?;
        to_value(obj, resource)
    }
}

fn to_api_resource(resource: &ResourceTypeDescriptor) -> ApiResource {
    ApiResource {
        group: resource.group.clone(),
        version: resource.version.clone(),
        api_version: resource.api_version(),
        kind: resource.kind.clone(),
        plural: resource.plural.clone(),
    }
}

/// Serialize an object, restoring type metadata that list responses omit
fn to_value(mut obj: DynamicObject, resource: &ResourceTypeDescriptor) -> Result<Value, ClusterError> {
    if obj.types.is_none() {
        obj.types = Some(TypeMeta {
            api_version: resource.api_version(),
            kind: resource.kind.clone(),
        });
    }
    serde_json::to_value(&obj)
        .map_err(|e| ClusterError::Unavailable(format!("failed to decode {}: {}", resource, e)))
}

fn map_kube_error(err: kube::Error, resource: &ResourceTypeDescriptor, name: &str) -> ClusterError {
    match err {
        kube::Error::Api(response) if response.code == 404 => ClusterError::not_found(resource, name),
        other => ClusterError::Api(other),
    }
}
