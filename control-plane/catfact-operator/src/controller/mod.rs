pub mod events;
pub mod namespace;
pub mod reconcile_loop;
pub mod reconciler;
pub mod types;

#[cfg(test)]
mod reconciler_tests;

use std::sync::Arc;

use futures_util::StreamExt;
use kube::{
    Api, Client, ResourceExt,
    runtime::{
        Controller,
        controller::{Action, Error as ControllerError},
        events::{EventType, Recorder, Reporter},
        watcher::Config,
    },
};
use tokio::time::Duration;
use tracing::{debug, error, info, warn};

use crate::completer::{InvalidIconName, RecordCompleter};
use crate::config::OperatorConfig;
use crate::crd::CatFact;
use crate::fact::HttpFactSource;
use crate::store::{
    ClusterVersionSource, KubeRecordStore, KubeResourceStore, StoreError,
};

use events::{REASON_COMPLETED, REASON_INVALID_ICON, emit_event};
use namespace::NamespaceResolver;
pub use reconcile_loop::{PluginSettings, ReconcileLoop};
pub use types::{Outcome, ReconcileResult};

pub const CONTROLLER_NAME: &str = "catfact-operator";
const RETRY_AFTER: Duration = Duration::from_secs(30);

#[derive(thiserror::Error, Debug)]
pub enum ReconcileErr {
    #[error(transparent)]
    InvalidIconName(#[from] InvalidIconName),

    #[error("cannot determine the operator namespace")]
    NamespaceUndeterminable,

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ReconcileErr {
    /// Bad input waits for the next edit; everything else is re-driven.
    pub fn is_retryable(&self) -> bool {
        match self {
            ReconcileErr::InvalidIconName(_) => false,
            ReconcileErr::Store(e) => e.is_retryable(),
            ReconcileErr::NamespaceUndeterminable | ReconcileErr::Internal(_) => {
                true
            }
        }
    }
}

#[derive(Clone)]
pub struct ControllerContext {
    pub client: Client,
    pub cfg: OperatorConfig,
    pub reconcile_loop: Arc<ReconcileLoop>,
    pub event_recorder: Option<Recorder>,
}

impl ControllerContext {
    pub fn new(client: Client, cfg: OperatorConfig) -> anyhow::Result<Self> {
        let timeout = cfg.store_timeout();
        let resources = Arc::new(KubeResourceStore::new(client.clone(), timeout));
        let records = Arc::new(KubeRecordStore::new(client.clone(), timeout));
        let versions = Arc::new(ClusterVersionSource::new(resources.clone()));
        let facts = Arc::new(HttpFactSource::new(
            cfg.fact_url.clone(),
            cfg.fact_timeout(),
        )?);

        let reconcile_loop = ReconcileLoop::new(
            records,
            RecordCompleter::new(facts),
            versions,
            resources,
            NamespaceResolver::from_config(&cfg),
            PluginSettings::from_config(&cfg),
        );

        let event_recorder = cfg.events_enabled().then(|| {
            Recorder::new(
                client.clone(),
                Reporter {
                    controller: CONTROLLER_NAME.into(),
                    instance: std::env::var("POD_NAME").ok(),
                },
            )
        });

        Ok(Self {
            client,
            cfg,
            reconcile_loop: Arc::new(reconcile_loop),
            event_recorder,
        })
    }
}

pub async fn run_controller(ctx: Arc<ControllerContext>) -> anyhow::Result<()> {
    let api: Api<CatFact> = Api::all(ctx.client.clone());

    Controller::new(api, Config::default())
        .run(reconcile, error_policy, ctx)
        .for_each(|res| async move {
            match res {
                Ok((obj_ref, action)) => {
                    info!(name = %obj_ref.name, "reconciled: requeue={:?}", action)
                }
                Err(e) if logged_by_error_policy(&e) => {
                    debug!(error = ?e, "reconcile failed")
                }
                Err(e) => error!(error = ?e, "reconcile error"),
            }
        })
        .await;

    Ok(())
}

async fn reconcile(
    obj: Arc<CatFact>,
    ctx: Arc<ControllerContext>,
) -> Result<Action, ReconcileErr> {
    let ns = obj
        .namespace()
        .ok_or_else(|| into_internal("CatFact without namespace"))?;
    let name = obj.name_any();

    match ctx.reconcile_loop.reconcile_record(&ns, &name).await {
        Ok(res) => {
            if res.outcome == Outcome::Updated {
                if let Some(recorder) = &ctx.event_recorder {
                    emit_event(
                        recorder,
                        &obj,
                        EventType::Normal,
                        REASON_COMPLETED,
                        "Complete",
                        Some("Filled in fact and iconName".into()),
                    )
                    .await;
                }
            }
            Ok(Action::await_change())
        }
        Err(ReconcileErr::InvalidIconName(e)) => {
            if let Some(recorder) = &ctx.event_recorder {
                emit_event(
                    recorder,
                    &obj,
                    EventType::Warning,
                    REASON_INVALID_ICON,
                    "Validate",
                    Some(e.to_string()),
                )
                .await;
            }
            Err(ReconcileErr::InvalidIconName(e))
        }
        Err(e) => Err(e),
    }
}

/// Reconciler failures pass through `error_policy`, which logs them.
fn logged_by_error_policy<Q>(err: &ControllerError<ReconcileErr, Q>) -> bool {
    matches!(err, ControllerError::ReconcilerFailed(..))
}

fn error_policy(
    obj: Arc<CatFact>,
    err: &ReconcileErr,
    _ctx: Arc<ControllerContext>,
) -> Action {
    if err.is_retryable() {
        warn!(name = %obj.name_any(), error = %err, "reconcile failed; requeueing");
        Action::requeue(RETRY_AFTER)
    } else {
        warn!(name = %obj.name_any(), error = %err, "record rejected");
        Action::await_change()
    }
}

/// Re-drives console plugin provisioning until the process exits.
pub async fn provision_loop(ctx: Arc<ControllerContext>) -> anyhow::Result<()> {
    if !ctx.cfg.console_plugin_enabled() {
        info!("console plugin provisioning disabled");
        return Ok(());
    }
    let mut ticker = tokio::time::interval(ctx.cfg.provision_interval());
    loop {
        ticker.tick().await;
        let result = match ctx.reconcile_loop.provision().await {
            Ok(res) => res,
            Err(e) => {
                error!(error = %e, "console plugin provisioning failed");
                ReconcileResult::failed(&e)
            }
        };
        info!(%result, "provisioning cycle finished");
    }
}

fn into_internal<E: std::fmt::Display>(e: E) -> ReconcileErr {
    ReconcileErr::Internal(e.to_string())
}
