use std::sync::Arc;

use async_trait::async_trait;

use super::{PlatformVersionSource, ResourceKind, ResourceStore, StoreError};

/// Name of the cluster-wide `ClusterVersion` singleton.
pub const CLUSTER_VERSION_NAME: &str = "version";

/// Reads `status.desired.version` from the `ClusterVersion` singleton.
///
/// The desired version is what the cluster runs (or is upgrading to).
#[derive(Clone)]
pub struct ClusterVersionSource {
    store: Arc<dyn ResourceStore>,
}

impl ClusterVersionSource {
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl PlatformVersionSource for ClusterVersionSource {
    async fn current_version(&self) -> Result<String, StoreError> {
        let obj = self
            .store
            .get(ResourceKind::ClusterVersion, None, CLUSTER_VERSION_NAME)
            .await?
            .ok_or_else(|| {
                StoreError::Missing(format!(
                    "ClusterVersion/{CLUSTER_VERSION_NAME}"
                ))
            })?;
        obj.data
            .pointer("/status/desired/version")
            .and_then(|v| v.as_str())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                StoreError::Invalid(
                    "ClusterVersion has no status.desired.version".into(),
                )
            })
    }
}
