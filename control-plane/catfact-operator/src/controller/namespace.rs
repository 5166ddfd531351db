use std::path::PathBuf;

use tracing::debug;

use crate::config::OperatorConfig;

/// Where the service account's namespace is mounted inside a pod.
pub const SERVICE_ACCOUNT_NAMESPACE_FILE: &str =
    "/var/run/secrets/kubernetes.io/serviceaccount/namespace";

/// Finds the namespace the operator runs in: an explicit override first,
/// then the mounted service-account file.
#[derive(Clone, Debug)]
pub struct NamespaceResolver {
    env_value: Option<String>,
    file_path: PathBuf,
}

impl NamespaceResolver {
    pub fn new(env_value: Option<String>, file_path: impl Into<PathBuf>) -> Self {
        Self {
            env_value,
            file_path: file_path.into(),
        }
    }

    pub fn from_config(cfg: &OperatorConfig) -> Self {
        Self::new(cfg.controller_namespace.clone(), &cfg.namespace_file)
    }

    /// `None` when neither source yields a non-blank value.
    pub async fn resolve(&self) -> Option<String> {
        if let Some(ns) = self
            .env_value
            .as_deref()
            .map(str::trim)
            .filter(|ns| !ns.is_empty())
        {
            return Some(ns.to_string());
        }
        match tokio::fs::read_to_string(&self.file_path).await {
            Ok(content) => {
                let ns = content.trim();
                (!ns.is_empty()).then(|| ns.to_string())
            }
            Err(e) => {
                debug!(path = %self.file_path.display(), error = %e, "namespace file unreadable");
                None
            }
        }
    }
}
