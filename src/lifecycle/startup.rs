//! Startup orchestration.
//!
//! # Responsibilities
//! - Turn a validated configuration into a populated `Router`
//! - Resolve handler names through the handler registry
//! - Apply the default entry point path and the removable limit
//!
//! # Design Decisions
//! - Fail fast: an unknown handler or a duplicate resource aborts the build
//! - Entry points register in file order, so later ones shadow earlier ones
//! - Building is pure; publishing is up to the caller (`RouteTable`)

use std::sync::Arc;

use thiserror::Error;

use crate::config::schema::{EntryPointConfig, EntryPointKindConfig, RouterConfig};
use crate::routing::table::{prepend_default_path, RouteTable};
use crate::routing::{EntryPoint, EntryPointKind, Handler, HandlerRegistry, RouteError, Router};

/// Errors while building the route table from configuration.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("entry point '{path}': no {kind} handler named '{name}' is registered")]
    UnknownHandler {
        path: String,
        kind: EntryPointKind,
        name: String,
    },

    #[error(transparent)]
    Route(#[from] RouteError),
}

/// Build a router holding every configured entry point.
pub fn build_router(config: &RouterConfig, registry: &HandlerRegistry) -> Result<Router, StartupError> {
    let mut router = Router::new();
    router.set_removable_limit(config.routing.removable_limit());

    for entry in &config.entry_points {
        let ep = build_entry_point(config, entry, registry)?;
        if ep.kind() == EntryPointKind::StaticResource {
            let path = ep.path().to_string();
            if !router.try_add_resource(ep) {
                return Err(RouteError::DuplicateResource(path).into());
            }
        } else {
            router.add_entry_point(ep);
        }
    }

    tracing::info!(
        entry_points = router.len(),
        default_entry_point = %config.routing.default_entry_point,
        "Router built from configuration"
    );
    Ok(router)
}

/// Build the router and wrap it in a shareable route table.
pub fn build_route_table(
    config: &RouterConfig,
    registry: &HandlerRegistry,
) -> Result<Arc<RouteTable>, StartupError> {
    let router = build_router(config, registry)?;
    Ok(Arc::new(RouteTable::with_default_path(
        router,
        config.routing.default_entry_point.clone(),
    )))
}

fn build_entry_point(
    config: &RouterConfig,
    entry: &EntryPointConfig,
    registry: &HandlerRegistry,
) -> Result<EntryPoint, StartupError> {
    let path = prepend_default_path(&config.routing.default_entry_point, &entry.path);
    let kind = EntryPointKind::from(entry.kind);

    let handler = match entry.kind {
        EntryPointKindConfig::StaticResource => registry
            .resource(&entry.handler)
            .cloned()
            .map(Handler::Resource),
        EntryPointKindConfig::Application | EntryPointKindConfig::WidgetSet => registry
            .application(&entry.handler)
            .cloned()
            .map(Handler::Application),
    };
    let handler = handler.ok_or_else(|| StartupError::UnknownHandler {
        path: path.clone(),
        kind,
        name: entry.handler.clone(),
    })?;

    let mut ep = EntryPoint::new(kind, path, handler)?;
    if let Some(favicon) = &entry.favicon {
        ep = ep.with_favicon(favicon.clone());
    }
    if entry.removable {
        ep = ep.removable();
    }
    Ok(ep)
}
