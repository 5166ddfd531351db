use catfact_operator::{config::OperatorConfig, init_tracing, runtime};
use envconfig::Envconfig;
use kube::Client;
use tracing::info;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    init_tracing("info");

    // kube and reqwest both build on rustls; pin the aws-lc-rs provider.
    if let Err(e) = rustls::crypto::CryptoProvider::install_default(
        rustls::crypto::aws_lc_rs::default_provider(),
    ) {
        tracing::debug!(?e, "CryptoProvider already installed; proceeding");
    }

    let cfg = OperatorConfig::init_from_env()?.apply_profile_defaults();
    info!(?cfg, "Starting catfact-operator");

    let client = Client::try_default().await?;
    runtime::run_all(client, cfg).await
}
