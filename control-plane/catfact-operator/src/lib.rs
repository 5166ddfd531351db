pub mod completer;
pub mod config;
pub mod controller;
pub mod crd;
pub mod fact;
pub mod icons;
pub mod runtime;
pub mod store;
pub mod templates;
pub mod version;
pub mod web;

#[cfg(test)]
mod testing;

use tracing_subscriber::{
    EnvFilter, filter::Directive, layer::SubscriberExt,
    util::SubscriberInitExt,
};

pub fn init_tracing(default_env: &str) {
    let mut filter = EnvFilter::builder()
        .with_env_var("RUST_LOG")
        .from_env_lossy();
    if let Ok(directive) = default_env
        .parse::<Directive>()
        .or_else(|_| "info".parse::<Directive>())
    {
        filter = filter.add_directive(directive);
    }

    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .try_init();
}
