//! ptpwatch - PTP fleet monitoring daemon.
//!
//! Polls a fleet of switches over their RESTCONF management API and
//! aggregates PTP clock-synchronization statistics, exposed over HTTP and
//! as a periodic console report.

mod config;
mod gather;
mod report;
mod restconf;
mod stats;
mod web;

use config::ServerConfig;
use gather::Aggregator;
use web::Server;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ptpwatch=info".parse()?),
        )
        .init();

    // Load configuration
    let cfg = ServerConfig::load();
    tracing::info!("Starting ptpwatch on port {}...", cfg.http_port);

    let targets = config::load_switches(cfg.switches_file.as_deref())?;
    tracing::info!("Loaded {} switch targets", targets.len());

    // Bootstrap: fetch every switch's identity. Failure here is fatal.
    let aggregator = Aggregator::bootstrap(&cfg, targets).await?;
    let table = aggregator.table();
    let ready = aggregator.ready_rx();

    // Start the poll loop and the console reporter
    report::spawn_reporter(table.clone(), ready.clone(), cfg.report_interval);
    tokio::spawn(aggregator.run());

    // Serve metrics and health endpoints
    let server = Server::new(&cfg, table, ready);
    server.start().await?;

    Ok(())
}
