use std::time::Duration;

use envconfig::Envconfig;

#[derive(Envconfig, Clone, Debug)]
pub struct OperatorConfig {
    /// `openshift` (default) or `dev` / `kubernetes`
    #[envconfig(from = "CATFACT_PROFILE", default = "openshift")]
    pub profile: String,

    #[envconfig(from = "HTTP_PORT", default = "8081")]
    pub http_port: u16,

    /// Prefix of every console plugin resource name
    #[envconfig(from = "CATFACT_OPERATOR_NAME", default = "cat-facts-operator")]
    pub operator_name: String,

    /// Doubles as the console plugin image tag
    #[envconfig(from = "CATFACT_OPERATOR_VERSION", default = "v0.0.9")]
    pub operator_version: String,

    #[envconfig(
        from = "CATFACT_CONSOLE_PLUGIN_IMAGE",
        default = "quay.io/rymiller/cat-facts-operator-console-plugin"
    )]
    pub console_plugin_image: String,

    #[envconfig(from = "CATFACT_MIN_PLATFORM_VERSION", default = "4.10")]
    pub min_platform_version: String,

    /// Env: CONTROLLER_NAMESPACE; blank is treated as unset
    #[envconfig(from = "CONTROLLER_NAMESPACE")]
    pub controller_namespace: Option<String>,

    #[envconfig(
        from = "CATFACT_NAMESPACE_FILE",
        default = "/var/run/secrets/kubernetes.io/serviceaccount/namespace"
    )]
    pub namespace_file: String,

    #[envconfig(from = "CATFACT_FACT_URL", default = "https://catfact.ninja/fact")]
    pub fact_url: String,

    #[envconfig(from = "CATFACT_FACT_TIMEOUT_SECS", default = "5")]
    pub fact_timeout_secs: u64,

    /// Deadline for each Kubernetes API call
    #[envconfig(from = "CATFACT_STORE_TIMEOUT_SECS", default = "10")]
    pub store_timeout_secs: u64,

    #[envconfig(from = "CATFACT_PROVISION_INTERVAL_SECS", default = "300")]
    pub provision_interval_secs: u64,

    #[envconfig(nested)]
    pub features: FeaturesConfig,
}

#[derive(Envconfig, Clone, Debug, Default)]
pub struct FeaturesConfig {
    /// If Some, env explicitly set; otherwise, profile defaults apply
    #[envconfig(from = "CATFACT_FEATURES_CONSOLE_PLUGIN")]
    pub console_plugin: Option<bool>,
    #[envconfig(from = "CATFACT_FEATURES_EVENTS")]
    pub events: Option<bool>,
}

impl OperatorConfig {
    /// Apply profile → defaults mapping, while respecting explicit env overrides.
    ///
    /// - openshift: console_plugin=true, events=true
    /// - dev / kubernetes: console_plugin=false, events=true
    pub fn apply_profile_defaults(mut self) -> Self {
        let (def_plugin, def_events) = match self.profile.as_str() {
            "dev" | "kubernetes" | "k8s" => (false, true),
            _ /* openshift */ => (true, true),
        };

        if self.features.console_plugin.is_none() {
            self.features.console_plugin = Some(def_plugin);
        }
        if self.features.events.is_none() {
            self.features.events = Some(def_events);
        }

        self
    }

    pub fn console_plugin_enabled(&self) -> bool {
        self.features.console_plugin.unwrap_or(false)
    }

    pub fn events_enabled(&self) -> bool {
        self.features.events.unwrap_or(false)
    }

    pub fn fact_timeout(&self) -> Duration {
        Duration::from_secs(self.fact_timeout_secs)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_secs)
    }

    pub fn provision_interval(&self) -> Duration {
        Duration::from_secs(self.provision_interval_secs.max(1))
    }
}
