use std::collections::BTreeMap;
use std::sync::Arc;

use kube::core::DynamicObject;
use tracing::{info, instrument};

use super::types::Outcome;
use crate::store::{ResourceStore, StoreError};
use crate::templates::ManagedResourceDescriptor;

/// Spec fields the API server assigns and will not let a client change.
const SERVER_ASSIGNED_SPEC_FIELDS: &[&str] = &["clusterIP", "clusterIPs"];

/// Create-or-update of a single managed resource.
#[derive(Clone)]
pub struct ResourceReconciler {
    store: Arc<dyn ResourceStore>,
}

impl ResourceReconciler {
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self { store }
    }

    /// Creates the resource when absent, otherwise replaces it with the
    /// desired shape carrying over only what the server owns.
    #[instrument(skip_all, fields(kind = %desc.kind, name = %desc.name, ns = ?desc.namespace))]
    pub async fn ensure(
        &self,
        desc: &ManagedResourceDescriptor,
    ) -> Result<Outcome, StoreError> {
        let existing = self
            .store
            .get(desc.kind, desc.namespace.as_deref(), &desc.name)
            .await?;

        match existing {
            None => {
                self.store.create(desc.kind, &desc.desired).await?;
                info!("created");
                Ok(Outcome::Created)
            }
            Some(current) => {
                let merged = overlay(&current, &desc.desired);
                self.store.update(desc.kind, &merged).await?;
                info!("updated");
                Ok(Outcome::Updated)
            }
        }
    }
}

/// Builds the replacement object from `desired`. From `current` it keeps
/// server-managed metadata, `status`, server-assigned spec fields, and
/// labels/annotations the desired shape does not name. Everything else in
/// `current` is dropped.
pub fn overlay(current: &DynamicObject, desired: &DynamicObject) -> DynamicObject {
    let mut merged = desired.clone();

    let live = &current.metadata;
    let meta = &mut merged.metadata;
    meta.resource_version = live.resource_version.clone();
    meta.uid = live.uid.clone();
    meta.creation_timestamp = live.creation_timestamp.clone();
    meta.generation = live.generation;
    meta.labels = merge_string_maps(&live.labels, &meta.labels);
    meta.annotations = merge_string_maps(&live.annotations, &meta.annotations);

    if let Some(obj) = merged.data.as_object_mut() {
        if let Some(status) = current.data.get("status") {
            obj.insert("status".into(), status.clone());
        }
        let live_spec = current.data.get("spec").and_then(|s| s.as_object());
        let spec = obj.get_mut("spec").and_then(|s| s.as_object_mut());
        if let (Some(live_spec), Some(spec)) = (live_spec, spec) {
            for field in SERVER_ASSIGNED_SPEC_FIELDS {
                if spec.contains_key(*field) {
                    continue;
                }
                if let Some(v) = live_spec.get(*field) {
                    spec.insert((*field).to_string(), v.clone());
                }
            }
        }
    }

    merged
}

fn merge_string_maps(
    live: &Option<BTreeMap<String, String>>,
    desired: &Option<BTreeMap<String, String>>,
) -> Option<BTreeMap<String, String>> {
    if live.is_none() && desired.is_none() {
        return None;
    }
    let mut out = live.clone().unwrap_or_default();
    out.extend(desired.clone().unwrap_or_default());
    Some(out)
}
