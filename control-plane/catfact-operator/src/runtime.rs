use std::net::SocketAddr;
use std::sync::Arc;

use kube::Client;
use tokio::{task::JoinHandle, try_join};

use crate::{
    config::OperatorConfig,
    controller::{ControllerContext, provision_loop, run_controller},
    web::run_http_server,
};

/// Compute the HTTP bind address based on config.
pub fn compute_http_addr(cfg: &OperatorConfig) -> SocketAddr {
    ([0, 0, 0, 0], cfg.http_port).into()
}

/// Spawn the `CatFact` controller.
pub fn spawn_controller(
    ctx: Arc<ControllerContext>,
) -> JoinHandle<anyhow::Result<()>> {
    tokio::spawn(async move { run_controller(ctx).await })
}

/// Spawn the console plugin provisioning loop; returns at once when the
/// feature is off.
pub fn spawn_provisioner(
    ctx: Arc<ControllerContext>,
) -> JoinHandle<anyhow::Result<()>> {
    tokio::spawn(async move { provision_loop(ctx).await })
}

pub fn spawn_http(addr: SocketAddr) -> JoinHandle<anyhow::Result<()>> {
    tokio::spawn(async move { run_http_server(addr).await })
}

/// Start controller, provisioner and probes; wait until all finish or one fails.
pub async fn run_all(client: Client, cfg: OperatorConfig) -> anyhow::Result<()> {
    let http_addr = compute_http_addr(&cfg);
    let ctx = Arc::new(ControllerContext::new(client, cfg)?);

    let controller = spawn_controller(ctx.clone());
    let provisioner = spawn_provisioner(ctx);
    let http = spawn_http(http_addr);

    let (c_res, p_res, h_res) = try_join!(controller, provisioner, http)?;
    c_res?;
    p_res?;
    h_res?;
    Ok(())
}
