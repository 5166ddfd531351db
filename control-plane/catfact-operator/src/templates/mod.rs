pub mod console_plugin;

use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Service;
use kube::core::DynamicObject;

use crate::store::ResourceKind;

pub use console_plugin::{PluginContext, plugin_descriptors};

#[derive(Clone, Debug)]
pub enum RenderedResource {
    Deployment(Deployment),
    Service(Service),
    /// Kinds without typed bindings in k8s-openapi (e.g. ConsolePlugin)
    Other {
        api_version: String,
        kind: String,
        manifest: serde_json::Value,
    },
}

impl RenderedResource {
    pub fn into_dynamic(self) -> Result<DynamicObject, serde_json::Error> {
        let value = match self {
            RenderedResource::Deployment(dep) => serde_json::to_value(&dep)?,
            RenderedResource::Service(svc) => serde_json::to_value(&svc)?,
            RenderedResource::Other {
                api_version,
                kind,
                mut manifest,
            } => {
                if let Some(obj) = manifest.as_object_mut() {
                    obj.insert("apiVersion".into(), api_version.into());
                    obj.insert("kind".into(), kind.into());
                }
                manifest
            }
        };
        serde_json::from_value(value)
    }
}

/// Desired state of one managed resource, recomputed every cycle.
#[derive(Clone, Debug)]
pub struct ManagedResourceDescriptor {
    pub kind: ResourceKind,
    pub name: String,
    /// `None` for cluster-scoped kinds
    pub namespace: Option<String>,
    pub desired: DynamicObject,
}

/// Per-kind adapter: which store kind a shape lands in, and how to build it.
#[derive(Clone, Copy)]
pub struct KindAdapter {
    pub kind: ResourceKind,
    pub render: fn(&PluginContext<'_>) -> RenderedResource,
}

impl KindAdapter {
    pub fn describe(
        &self,
        ctx: &PluginContext<'_>,
    ) -> Result<ManagedResourceDescriptor, serde_json::Error> {
        let desired = (self.render)(ctx).into_dynamic()?;
        let namespace = if self.kind.is_namespaced() {
            Some(ctx.namespace.to_string())
        } else {
            None
        };
        Ok(ManagedResourceDescriptor {
            kind: self.kind,
            name: ctx.resource_name(),
            namespace,
            desired,
        })
    }
}
