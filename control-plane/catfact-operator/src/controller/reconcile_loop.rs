use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use super::ReconcileErr;
use super::namespace::NamespaceResolver;
use super::reconciler::ResourceReconciler;
use super::types::{Outcome, ReconcileResult};
use crate::completer::RecordCompleter;
use crate::config::OperatorConfig;
use crate::store::{PlatformVersionSource, RecordStore, ResourceStore, StoreError};
use crate::templates::{PluginContext, plugin_descriptors};
use crate::version::meets_minimum;

pub const REASON_VERSION_UNAVAILABLE: &str = "VersionUnavailable";
pub const REASON_VERSION_TOO_OLD: &str = "PlatformVersionBelowMinimum";
pub const REASON_VERSION_UNPARSEABLE: &str = "VersionUnparseable";

/// Inputs of the console plugin shapes that do not depend on the cluster.
#[derive(Clone, Debug)]
pub struct PluginSettings {
    pub operator_name: String,
    pub version: String,
    pub image_repository: String,
    pub min_platform_version: String,
}

impl PluginSettings {
    pub fn from_config(cfg: &OperatorConfig) -> Self {
        Self {
            operator_name: cfg.operator_name.clone(),
            version: cfg.operator_version.clone(),
            image_repository: cfg.console_plugin_image.clone(),
            min_platform_version: cfg.min_platform_version.clone(),
        }
    }

    pub fn context<'a>(&'a self, namespace: &'a str) -> PluginContext<'a> {
        PluginContext {
            operator_name: &self.operator_name,
            version: &self.version,
            image_repository: &self.image_repository,
            namespace,
        }
    }
}

/// Drives both flows: completing `CatFact` records and provisioning the
/// console plugin.
pub struct ReconcileLoop {
    records: Arc<dyn RecordStore>,
    completer: RecordCompleter,
    versions: Arc<dyn PlatformVersionSource>,
    reconciler: ResourceReconciler,
    namespaces: NamespaceResolver,
    plugin: PluginSettings,
}

impl ReconcileLoop {
    pub fn new(
        records: Arc<dyn RecordStore>,
        completer: RecordCompleter,
        versions: Arc<dyn PlatformVersionSource>,
        resources: Arc<dyn ResourceStore>,
        namespaces: NamespaceResolver,
        plugin: PluginSettings,
    ) -> Self {
        Self {
            records,
            completer,
            versions,
            reconciler: ResourceReconciler::new(resources),
            namespaces,
            plugin,
        }
    }

    /// Fills in the record's empty fields and persists it when that changed
    /// anything. A record that no longer exists is a no-op.
    #[instrument(skip(self))]
    pub async fn reconcile_record(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<ReconcileResult, ReconcileErr> {
        let Some(record) = self.records.get(namespace, name).await? else {
            debug!("record gone");
            return Ok(ReconcileResult::with_reason(Outcome::NoOp, "NotFound"));
        };

        let completed = self.completer.complete(record.spec.clone()).await?;
        if completed == record.spec {
            debug!("record already complete");
            return Ok(ReconcileResult::new(Outcome::NoOp));
        }

        let mut updated = record;
        updated.spec = completed;
        self.records.update(&updated).await?;
        info!(icon = %updated.spec.icon_name, "record completed");
        Ok(ReconcileResult::new(Outcome::Updated))
    }

    /// Ensures the console plugin resources, in dependency order, when the
    /// platform is new enough to host them.
    #[instrument(skip(self))]
    pub async fn provision(&self) -> Result<ReconcileResult, ReconcileErr> {
        let minimum = &self.plugin.min_platform_version;
        let current = match self.versions.current_version().await {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "platform version unavailable; skipping console plugin");
                return Ok(ReconcileResult::with_reason(
                    Outcome::Skipped,
                    REASON_VERSION_UNAVAILABLE,
                ));
            }
        };
        match meets_minimum(&current, minimum) {
            Ok(true) => {}
            Ok(false) => {
                info!(%current, %minimum, "platform too old for console plugin");
                return Ok(ReconcileResult::with_reason(
                    Outcome::Skipped,
                    REASON_VERSION_TOO_OLD,
                ));
            }
            Err(e) => {
                warn!(error = %e, "platform version unparseable; skipping console plugin");
                return Ok(ReconcileResult::with_reason(
                    Outcome::Skipped,
                    REASON_VERSION_UNPARSEABLE,
                ));
            }
        }

        let namespace = self
            .namespaces
            .resolve()
            .await
            .ok_or(ReconcileErr::NamespaceUndeterminable)?;
        let descriptors = plugin_descriptors(&self.plugin.context(&namespace))
            .map_err(StoreError::from)?;

        let mut created = false;
        for desc in &descriptors {
            let outcome = self.reconciler.ensure(desc).await?;
            created |= outcome == Outcome::Created;
        }

        let outcome = if created {
            Outcome::Created
        } else {
            Outcome::Updated
        };
        info!(%namespace, %outcome, "console plugin provisioned");
        Ok(ReconcileResult::new(outcome))
    }
}
