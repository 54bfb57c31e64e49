use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use reachbox::api::{self, ApiState};
use reachbox::config::load_config;
use reachbox::error::report;
use reachbox::probe::prelude::HostResolver;
use reachbox::tester::ConnectivityTester;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(err) = run().await {
        error!("{}", report(err.as_ref()));
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;

    let resolver = HostResolver::from_dns_hosts(&config.dns_hosts)?;
    let tester = Arc::new(ConnectivityTester::new(resolver));
    let state = ApiState::new(tester, Duration::from_secs(config.default_timeout_seconds));

    info!("Default probe timeout: {}s", config.default_timeout_seconds);
    api::serve(config.listen_addr, state).await?;
    Ok(())
}
