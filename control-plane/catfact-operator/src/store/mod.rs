//! Storage seams used by the reconcile flows.
//!
//! The flows only ever talk to these traits; `k8s` holds the implementations
//! backed by the Kubernetes API.

pub mod k8s;
pub mod platform;

use std::fmt;

use async_trait::async_trait;
use kube::core::{DynamicObject, GroupVersionKind};
use kube::discovery::ApiResource;

use crate::crd::CatFact;

pub use k8s::{KubeRecordStore, KubeResourceStore};
pub use platform::ClusterVersionSource;

/// Object kinds the operator reads or writes through [`ResourceStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// `apps/v1` Deployment serving the plugin bundle
    Workload,
    /// `v1` Service in front of the workload
    Endpoint,
    /// `console.openshift.io/v1alpha1` ConsolePlugin
    PluginRegistration,
    /// `config.openshift.io/v1` ClusterVersion, read-only
    ClusterVersion,
}

impl ResourceKind {
    pub fn gvk(&self) -> GroupVersionKind {
        match self {
            ResourceKind::Workload => {
                GroupVersionKind::gvk("apps", "v1", "Deployment")
            }
            ResourceKind::Endpoint => GroupVersionKind::gvk("", "v1", "Service"),
            ResourceKind::PluginRegistration => GroupVersionKind::gvk(
                "console.openshift.io",
                "v1alpha1",
                "ConsolePlugin",
            ),
            ResourceKind::ClusterVersion => GroupVersionKind::gvk(
                "config.openshift.io",
                "v1",
                "ClusterVersion",
            ),
        }
    }

    pub fn api_resource(&self) -> ApiResource {
        ApiResource::from_gvk(&self.gvk())
    }

    pub fn is_namespaced(&self) -> bool {
        matches!(self, ResourceKind::Workload | ResourceKind::Endpoint)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.gvk().kind)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("kube api error: {0}")]
    Api(#[from] kube::Error),

    #[error("{op} timed out after {secs}s")]
    Timeout { op: &'static str, secs: u64 },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("object not found: {0}")]
    Missing(String),

    #[error("invalid object: {0}")]
    Invalid(String),
}

impl StoreError {
    /// Whether re-driving the same request later can succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, StoreError::Serialization(_) | StoreError::Invalid(_))
    }
}

/// Generic object store for the managed console plugin resources.
///
/// `namespace` is ignored for cluster-scoped kinds and required otherwise.
/// A missing object is `Ok(None)`, never an error.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    async fn get(
        &self,
        kind: ResourceKind,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<Option<DynamicObject>, StoreError>;

    async fn create(
        &self,
        kind: ResourceKind,
        obj: &DynamicObject,
    ) -> Result<DynamicObject, StoreError>;

    async fn update(
        &self,
        kind: ResourceKind,
        obj: &DynamicObject,
    ) -> Result<DynamicObject, StoreError>;

    /// All objects of `kind`; `None` lists across namespaces.
    async fn list(
        &self,
        kind: ResourceKind,
        namespace: Option<&str>,
    ) -> Result<Vec<DynamicObject>, StoreError>;
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<CatFact>, StoreError>;

    async fn update(&self, record: &CatFact) -> Result<CatFact, StoreError>;
}

/// Reports the running platform's version string, e.g. `4.14.3`.
#[async_trait]
pub trait PlatformVersionSource: Send + Sync {
    async fn current_version(&self) -> Result<String, StoreError>;
}
