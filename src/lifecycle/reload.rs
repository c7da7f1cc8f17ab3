//! Route table reload on configuration change.
//!
//! # Responsibilities
//! - Receive validated configurations from the watcher
//! - Rebuild the router and swap it into the shared route table
//! - Keep the current table when a rebuild fails

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};

use crate::config::schema::RouterConfig;
use crate::lifecycle::startup::StartupError;
use crate::observability::metrics;
use crate::routing::{RouteTable, Router};

/// Rebuild and publish the router for one configuration.
pub fn apply_config<F>(table: &RouteTable, build: &F, config: &RouterConfig) -> Result<(), StartupError>
where
    F: Fn(&RouterConfig) -> Result<Router, StartupError>,
{
    match build(config) {
        Ok(router) => {
            table.replace(router);
            metrics::record_reload("applied");
            Ok(())
        }
        Err(e) => {
            metrics::record_reload("failed");
            tracing::error!(error = %e, "Failed to rebuild router, keeping current route table");
            Err(e)
        }
    }
}

/// Apply configuration updates until the channel closes or shutdown is signalled.
pub async fn run_reload_loop<F>(
    table: Arc<RouteTable>,
    build: F,
    mut updates: mpsc::UnboundedReceiver<RouterConfig>,
    mut shutdown: broadcast::Receiver<()>,
) where
    F: Fn(&RouterConfig) -> Result<Router, StartupError>,
{
    tracing::info!("Route table reload loop starting");
    loop {
        tokio::select! {
            update = updates.recv() => {
                let Some(config) = update else {
                    tracing::info!("Config update channel closed");
                    break;
                };
                // Failures are logged inside; the loop keeps serving the old table.
                let _ = apply_config(&table, &build, &config);
            }
            _ = shutdown.recv() => {
                tracing::info!("Reload loop received shutdown signal, exiting loop");
                break;
            }
        }
    }
}
