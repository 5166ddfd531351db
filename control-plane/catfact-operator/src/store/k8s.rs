use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use kube::Client;
use kube::api::{Api, ListParams, PostParams};
use kube::core::DynamicObject;
use tracing::trace;

use super::{RecordStore, ResourceKind, ResourceStore, StoreError};
use crate::crd::CatFact;

/// Runs a kube call under `timeout`; an expired deadline is a retryable
/// [`StoreError::Timeout`].
async fn with_deadline<T, F>(
    op: &'static str,
    timeout: Duration,
    fut: F,
) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, kube::Error>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(res) => res.map_err(StoreError::from),
        Err(_) => Err(StoreError::Timeout {
            op,
            secs: timeout.as_secs(),
        }),
    }
}

fn object_name(obj: &DynamicObject) -> Result<&str, StoreError> {
    obj.metadata
        .name
        .as_deref()
        .ok_or_else(|| StoreError::Invalid("object has no name".into()))
}

#[derive(Clone)]
pub struct KubeResourceStore {
    client: Client,
    timeout: Duration,
}

impl KubeResourceStore {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    fn api(
        &self,
        kind: ResourceKind,
        namespace: Option<&str>,
    ) -> Result<Api<DynamicObject>, StoreError> {
        let ar = kind.api_resource();
        match (kind.is_namespaced(), namespace) {
            (true, Some(ns)) => {
                Ok(Api::namespaced_with(self.client.clone(), ns, &ar))
            }
            (true, None) => {
                Err(StoreError::Invalid(format!("{kind} requires a namespace")))
            }
            (false, _) => Ok(Api::all_with(self.client.clone(), &ar)),
        }
    }
}

#[async_trait]
impl ResourceStore for KubeResourceStore {
    async fn get(
        &self,
        kind: ResourceKind,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<Option<DynamicObject>, StoreError> {
        trace!(%kind, ?namespace, %name, "store: get");
        let api = self.api(kind, namespace)?;
        with_deadline("get", self.timeout, api.get_opt(name)).await
    }

    async fn create(
        &self,
        kind: ResourceKind,
        obj: &DynamicObject,
    ) -> Result<DynamicObject, StoreError> {
        trace!(%kind, name = ?obj.metadata.name, "store: create");
        let api = self.api(kind, obj.metadata.namespace.as_deref())?;
        with_deadline("create", self.timeout, api.create(&PostParams::default(), obj))
            .await
    }

    async fn update(
        &self,
        kind: ResourceKind,
        obj: &DynamicObject,
    ) -> Result<DynamicObject, StoreError> {
        let name = object_name(obj)?;
        trace!(%kind, %name, "store: replace");
        let api = self.api(kind, obj.metadata.namespace.as_deref())?;
        with_deadline(
            "update",
            self.timeout,
            api.replace(name, &PostParams::default(), obj),
        )
        .await
    }

    async fn list(
        &self,
        kind: ResourceKind,
        namespace: Option<&str>,
    ) -> Result<Vec<DynamicObject>, StoreError> {
        trace!(%kind, ?namespace, "store: list");
        let ar = kind.api_resource();
        let api: Api<DynamicObject> = match namespace {
            Some(ns) if kind.is_namespaced() => {
                Api::namespaced_with(self.client.clone(), ns, &ar)
            }
            _ => Api::all_with(self.client.clone(), &ar),
        };
        let list =
            with_deadline("list", self.timeout, api.list(&ListParams::default()))
                .await?;
        Ok(list.items)
    }
}

#[derive(Clone)]
pub struct KubeRecordStore {
    client: Client,
    timeout: Duration,
}

impl KubeRecordStore {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl RecordStore for KubeRecordStore {
    async fn get(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<CatFact>, StoreError> {
        let api: Api<CatFact> = Api::namespaced(self.client.clone(), namespace);
        with_deadline("get", self.timeout, api.get_opt(name)).await
    }

    async fn update(&self, record: &CatFact) -> Result<CatFact, StoreError> {
        let name = record
            .metadata
            .name
            .as_deref()
            .ok_or_else(|| StoreError::Invalid("record has no name".into()))?;
        let namespace = record.metadata.namespace.as_deref().ok_or_else(|| {
            StoreError::Invalid(format!("record {name} has no namespace"))
        })?;
        let api: Api<CatFact> = Api::namespaced(self.client.clone(), namespace);
        with_deadline(
            "update",
            self.timeout,
            api.replace(name, &PostParams::default(), record),
        )
        .await
    }
}
