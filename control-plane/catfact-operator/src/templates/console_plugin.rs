//! Desired shapes of the OpenShift dynamic console plugin.
//!
//! A console plugin needs three resources sharing one name: a Deployment
//! serving the plugin bundle over TLS, a Service fronting it (its serving
//! certificate is minted by the service-ca operator through an annotation),
//! and a cluster-scoped ConsolePlugin pointing the console at that Service.

use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{
    Capabilities, Container, ContainerPort, PodSecurityContext, PodSpec,
    PodTemplateSpec, SeccompProfile, SecretVolumeSource, SecurityContext,
    Service, ServicePort, ServiceSpec, Volume, VolumeMount,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{
    LabelSelector, ObjectMeta,
};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use serde_json::json;

use super::{KindAdapter, ManagedResourceDescriptor, RenderedResource};
use crate::store::ResourceKind;

pub const PLUGIN_PORT: i32 = 9443;
pub const CERT_MOUNT_PATH: &str = "/var/cert";
pub const PLUGIN_BASE_PATH: &str = "/";
pub const PLUGIN_DISPLAY_NAME: &str =
    "OpenShift console plugin for all you cool cats and kittens";
pub const SERVING_CERT_ANNOTATION: &str =
    "service.beta.openshift.io/serving-cert-secret-name";
const CERT_VOLUME_MODE: i32 = 0o644;

#[derive(Clone, Copy, Debug)]
pub struct PluginContext<'a> {
    pub operator_name: &'a str,
    pub version: &'a str,
    /// Repository without a tag; `version` becomes the tag
    pub image_repository: &'a str,
    pub namespace: &'a str,
}

impl PluginContext<'_> {
    pub fn resource_name(&self) -> String {
        format!("{}-console-plugin", self.operator_name)
    }

    pub fn cert_secret_name(&self) -> String {
        format!("{}-cert", self.resource_name())
    }

    pub fn image(&self) -> String {
        format!("{}:{}", self.image_repository, self.version)
    }

    fn labels(&self) -> BTreeMap<String, String> {
        BTreeMap::from([("app".to_string(), self.resource_name())])
    }
}

/// Order matters: the Service selects the Deployment's pods and the
/// ConsolePlugin points at the Service.
pub static PLUGIN_ADAPTERS: &[KindAdapter] = &[
    KindAdapter {
        kind: ResourceKind::Workload,
        render: render_workload,
    },
    KindAdapter {
        kind: ResourceKind::Endpoint,
        render: render_endpoint,
    },
    KindAdapter {
        kind: ResourceKind::PluginRegistration,
        render: render_plugin_registration,
    },
];

pub fn plugin_descriptors(
    ctx: &PluginContext<'_>,
) -> Result<Vec<ManagedResourceDescriptor>, serde_json::Error> {
    PLUGIN_ADAPTERS.iter().map(|a| a.describe(ctx)).collect()
}

fn render_workload(ctx: &PluginContext<'_>) -> RenderedResource {
    RenderedResource::Deployment(workload(ctx))
}

fn render_endpoint(ctx: &PluginContext<'_>) -> RenderedResource {
    RenderedResource::Service(endpoint(ctx))
}

fn render_plugin_registration(ctx: &PluginContext<'_>) -> RenderedResource {
    RenderedResource::Other {
        api_version: "console.openshift.io/v1alpha1".into(),
        kind: "ConsolePlugin".into(),
        manifest: plugin_registration(ctx),
    }
}

pub fn workload(ctx: &PluginContext<'_>) -> Deployment {
    let name = ctx.resource_name();
    let cert = ctx.cert_secret_name();
    let labels = Some(ctx.labels());

    let container = Container {
        name: name.clone(),
        image: Some(ctx.image()),
        image_pull_policy: Some("Always".into()),
        ports: Some(vec![ContainerPort {
            container_port: PLUGIN_PORT,
            protocol: Some("TCP".into()),
            ..Default::default()
        }]),
        volume_mounts: Some(vec![VolumeMount {
            name: cert.clone(),
            read_only: Some(true),
            mount_path: CERT_MOUNT_PATH.into(),
            ..Default::default()
        }]),
        security_context: Some(SecurityContext {
            capabilities: Some(Capabilities {
                drop: Some(vec!["ALL".into()]),
                ..Default::default()
            }),
            allow_privilege_escalation: Some(false),
            ..Default::default()
        }),
        ..Default::default()
    };

    Deployment {
        metadata: ObjectMeta {
            name: Some(name),
            namespace: Some(ctx.namespace.to_string()),
            labels: labels.clone(),
            ..Default::default()
        },
        spec: Some(DeploymentSpec {
            replicas: Some(1),
            selector: LabelSelector {
                match_labels: labels.clone(),
                ..Default::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels,
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    containers: vec![container],
                    volumes: Some(vec![Volume {
                        name: cert.clone(),
                        secret: Some(SecretVolumeSource {
                            secret_name: Some(cert),
                            default_mode: Some(CERT_VOLUME_MODE),
                            ..Default::default()
                        }),
                        ..Default::default()
                    }]),
                    restart_policy: Some("Always".into()),
                    dns_policy: Some("ClusterFirst".into()),
                    security_context: Some(PodSecurityContext {
                        run_as_non_root: Some(true),
                        seccomp_profile: Some(SeccompProfile {
                            type_: "RuntimeDefault".into(),
                            ..Default::default()
                        }),
                        ..Default::default()
                    }),
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn endpoint(ctx: &PluginContext<'_>) -> Service {
    let labels = Some(ctx.labels());
    Service {
        metadata: ObjectMeta {
            name: Some(ctx.resource_name()),
            namespace: Some(ctx.namespace.to_string()),
            labels: labels.clone(),
            annotations: Some(BTreeMap::from([(
                SERVING_CERT_ANNOTATION.to_string(),
                ctx.cert_secret_name(),
            )])),
            ..Default::default()
        },
        spec: Some(ServiceSpec {
            ports: Some(vec![ServicePort {
                name: Some(format!("{PLUGIN_PORT}-tcp")),
                protocol: Some("TCP".into()),
                port: PLUGIN_PORT,
                target_port: Some(IntOrString::Int(PLUGIN_PORT)),
                ..Default::default()
            }]),
            selector: labels,
            type_: Some("ClusterIP".into()),
            session_affinity: Some("None".into()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// ConsolePlugin manifest; cluster-scoped, so no namespace in metadata.
pub fn plugin_registration(ctx: &PluginContext<'_>) -> serde_json::Value {
    let name = ctx.resource_name();
    json!({
        "metadata": {
            "name": name,
            "labels": ctx.labels(),
        },
        "spec": {
            "displayName": PLUGIN_DISPLAY_NAME,
            "service": {
                "name": name,
                "namespace": ctx.namespace,
                "port": PLUGIN_PORT,
                "basePath": PLUGIN_BASE_PATH,
            }
        }
    })
}
