//! In-memory fakes for the storage and fact seams.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use kube::core::DynamicObject;

use crate::crd::{CatFact, CatFactSpec};
use crate::fact::{FactError, FactSource};
use crate::store::{
    PlatformVersionSource, RecordStore, ResourceKind, ResourceStore, StoreError,
};

type ObjectKey = (ResourceKind, Option<String>, String);

fn key_of(kind: ResourceKind, obj: &DynamicObject) -> ObjectKey {
    let ns = if kind.is_namespaced() {
        obj.metadata.namespace.clone()
    } else {
        None
    };
    (kind, ns, obj.metadata.name.clone().unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Get(ResourceKind, String),
    Create(ResourceKind, String),
    Update(ResourceKind, String),
    List(ResourceKind),
}

/// Resource store over a map. Bumps `resourceVersion` on every write, the
/// way the API server does.
#[derive(Default)]
pub struct MemoryResourceStore {
    objects: Mutex<HashMap<ObjectKey, DynamicObject>>,
    calls: Mutex<Vec<StoreCall>>,
    fail_on: Mutex<Option<ResourceKind>>,
    revision: AtomicUsize,
}

impl MemoryResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call touching `kind` fails with a retryable timeout.
    pub fn fail_on(&self, kind: ResourceKind) {
        *self.fail_on.lock().unwrap() = Some(kind);
    }

    pub fn insert(&self, kind: ResourceKind, obj: DynamicObject) {
        self.objects.lock().unwrap().insert(key_of(kind, &obj), obj);
    }

    pub fn object(
        &self,
        kind: ResourceKind,
        namespace: Option<&str>,
        name: &str,
    ) -> Option<DynamicObject> {
        let key = (kind, namespace.map(str::to_string), name.to_string());
        self.objects.lock().unwrap().get(&key).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn writes(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, StoreCall::Create(..) | StoreCall::Update(..)))
            .count()
    }

    fn record(&self, call: StoreCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, kind: ResourceKind, op: &'static str) -> Result<(), StoreError> {
        if *self.fail_on.lock().unwrap() == Some(kind) {
            return Err(StoreError::Timeout { op, secs: 0 });
        }
        Ok(())
    }

    fn stamp(&self, obj: &DynamicObject) -> DynamicObject {
        let rev = self.revision.fetch_add(1, Ordering::SeqCst) + 1;
        let mut obj = obj.clone();
        obj.metadata.resource_version = Some(rev.to_string());
        obj
    }
}

#[async_trait]
impl ResourceStore for MemoryResourceStore {
    async fn get(
        &self,
        kind: ResourceKind,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<Option<DynamicObject>, StoreError> {
        self.record(StoreCall::Get(kind, name.to_string()));
        self.check(kind, "get")?;
        let ns = if kind.is_namespaced() { namespace } else { None };
        Ok(self.object(kind, ns, name))
    }

    async fn create(
        &self,
        kind: ResourceKind,
        obj: &DynamicObject,
    ) -> Result<DynamicObject, StoreError> {
        let key = key_of(kind, obj);
        self.record(StoreCall::Create(kind, key.2.clone()));
        self.check(kind, "create")?;
        let mut objects = self.objects.lock().unwrap();
        if objects.contains_key(&key) {
            return Err(StoreError::Invalid(format!("{kind}/{} exists", key.2)));
        }
        let stored = self.stamp(obj);
        objects.insert(key, stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        kind: ResourceKind,
        obj: &DynamicObject,
    ) -> Result<DynamicObject, StoreError> {
        let key = key_of(kind, obj);
        self.record(StoreCall::Update(kind, key.2.clone()));
        self.check(kind, "update")?;
        let mut objects = self.objects.lock().unwrap();
        let Some(current) = objects.get(&key) else {
            return Err(StoreError::Missing(format!("{kind}/{}", key.2)));
        };
        if current.metadata.resource_version != obj.metadata.resource_version {
            return Err(StoreError::Invalid("resourceVersion conflict".into()));
        }
        let stored = self.stamp(obj);
        objects.insert(key, stored.clone());
        Ok(stored)
    }

    async fn list(
        &self,
        kind: ResourceKind,
        namespace: Option<&str>,
    ) -> Result<Vec<DynamicObject>, StoreError> {
        self.record(StoreCall::List(kind));
        self.check(kind, "list")?;
        Ok(self
            .objects
            .lock()
            .unwrap()
            .iter()
            .filter(|((k, ns, _), _)| {
                *k == kind && (namespace.is_none() || ns.as_deref() == namespace)
            })
            .map(|(_, obj)| obj.clone())
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryRecordStore {
    records: Mutex<BTreeMap<(String, String), CatFact>>,
    pub updates: AtomicUsize,
}

impl MemoryRecordStore {
    pub fn with(namespace: &str, name: &str, spec: CatFactSpec) -> Self {
        let store = Self::default();
        let mut record = CatFact::new(name, spec);
        record.metadata.namespace = Some(namespace.to_string());
        store
            .records
            .lock()
            .unwrap()
            .insert((namespace.to_string(), name.to_string()), record);
        store
    }

    pub fn spec(&self, namespace: &str, name: &str) -> Option<CatFactSpec> {
        self.records
            .lock()
            .unwrap()
            .get(&(namespace.to_string(), name.to_string()))
            .map(|r| r.spec.clone())
    }

    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn get(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<CatFact>, StoreError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .get(&(namespace.to_string(), name.to_string()))
            .cloned())
    }

    async fn update(&self, record: &CatFact) -> Result<CatFact, StoreError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        let key = (
            record.metadata.namespace.clone().unwrap_or_default(),
            record.metadata.name.clone().unwrap_or_default(),
        );
        self.records.lock().unwrap().insert(key, record.clone());
        Ok(record.clone())
    }
}

/// Always returns the same fact.
pub struct StaticFactSource {
    fact: String,
    calls: AtomicUsize,
}

impl StaticFactSource {
    pub fn new(fact: &str) -> Self {
        Self {
            fact: fact.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FactSource for StaticFactSource {
    async fn fetch(&self) -> Result<String, FactError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.fact.clone())
    }
}

/// Fails every fetch, like an unreachable fact API.
#[derive(Default)]
pub struct FailingFactSource {
    calls: AtomicUsize,
}

impl FailingFactSource {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FactSource for FailingFactSource {
    async fn fetch(&self) -> Result<String, FactError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(FactError::Empty)
    }
}

/// Reports a fixed version, or none at all.
pub struct StaticVersionSource(pub Option<String>);

impl StaticVersionSource {
    pub fn of(version: &str) -> Self {
        Self(Some(version.to_string()))
    }

    pub fn unavailable() -> Self {
        Self(None)
    }
}

#[async_trait]
impl PlatformVersionSource for StaticVersionSource {
    async fn current_version(&self) -> Result<String, StoreError> {
        self.0
            .clone()
            .ok_or_else(|| StoreError::Missing("ClusterVersion/version".into()))
    }
}
