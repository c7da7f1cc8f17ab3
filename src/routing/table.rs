//! Shared, concurrently readable route table.
//!
//! # Responsibilities
//! - Own the process-wide `Router` for a server instance
//! - Serve lookups without locking
//! - Serialize writers and publish each change atomically
//! - Resolve deployment paths against the default entry point
//!
//! # Design Decisions
//! - Copy-on-write: writers clone the router, mutate the clone, swap it in
//! - Readers hold an `Arc` snapshot, so a swap never invalidates a lookup in flight
//! - A write costs a clone of the router; writes are rare next to lookups

use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;

use crate::observability::metrics;
use crate::routing::entry_point::{EntryPoint, EntryPointKind, RouteError};
use crate::routing::handler::{ApplicationFactory, Handler, Resource};
use crate::routing::matcher::EntryPointMatch;
use crate::routing::router::Router;

/// Resolve a deployment path against the default entry point path.
///
/// Empty paths deploy at the default path, relative paths below it, and
/// absolute paths as given.
pub fn prepend_default_path(default_path: &str, path: &str) -> String {
    if path.is_empty() {
        default_path.to_string()
    } else if path.starts_with('/') {
        path.to_string()
    } else if default_path.ends_with('/') {
        format!("{default_path}{path}")
    } else {
        format!("{default_path}/{path}")
    }
}

/// The route table shared by all request handlers.
#[derive(Debug)]
pub struct RouteTable {
    current: ArcSwap<Router>,
    writer: Mutex<()>,
    default_path: String,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new(Router::new())
    }
}

impl RouteTable {
    /// Wrap a router. The default entry point path is `/`.
    pub fn new(router: Router) -> Self {
        Self::with_default_path(router, "/")
    }

    pub fn with_default_path(router: Router, default_path: impl Into<String>) -> Self {
        metrics::record_entry_points(router.len());
        Self {
            current: ArcSwap::from_pointee(router),
            writer: Mutex::new(()),
            default_path: default_path.into(),
        }
    }

    pub fn default_path(&self) -> &str {
        &self.default_path
    }

    /// Current router snapshot.
    pub fn snapshot(&self) -> Arc<Router> {
        self.current.load_full()
    }

    pub fn len(&self) -> usize {
        self.current.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.load().is_empty()
    }

    /// Match a request. Never blocks.
    pub fn match_entry_point(
        &self,
        script_name: &str,
        path: &str,
        match_after_slash: bool,
    ) -> EntryPointMatch {
        let result = self
            .current
            .load()
            .match_entry_point(script_name, path, match_after_slash);
        metrics::record_match(&result);
        result
    }

    /// Apply a change under the writer lock and publish the result.
    pub fn update<F, R>(&self, change: F) -> R
    where
        F: FnOnce(&mut Router) -> R,
    {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = Router::clone(&self.current.load());
        let result = change(&mut next);
        metrics::record_entry_points(next.len());
        self.current.store(Arc::new(next));
        result
    }

    /// Swap in a fully built router, e.g. after a configuration reload.
    pub fn replace(&self, router: Router) {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        tracing::info!(entry_points = router.len(), "Route table replaced");
        metrics::record_entry_points(router.len());
        self.current.store(Arc::new(router));
    }

    pub fn add_entry_point(&self, ep: impl Into<Arc<EntryPoint>>) {
        let ep = ep.into();
        self.update(|router| router.add_entry_point(ep));
    }

    pub fn try_add_resource(&self, ep: impl Into<Arc<EntryPoint>>) -> bool {
        let ep = ep.into();
        self.update(|router| router.try_add_resource(ep))
    }

    pub fn remove_entry_point(&self, path: &str) {
        self.update(|router| router.remove_entry_point(path));
    }

    pub fn remove_resource(&self, resource: &Arc<dyn Resource>) {
        self.update(|router| router.remove_resource(resource));
    }

    /// Deploy an application or widget set, resolving `path` against the default path.
    pub fn deploy_application(
        &self,
        kind: EntryPointKind,
        path: &str,
        factory: ApplicationFactory,
        favicon: Option<&str>,
    ) -> Result<(), RouteError> {
        let path = prepend_default_path(&self.default_path, path);
        let mut ep = EntryPoint::new(kind, path, Handler::Application(factory))?;
        if let Some(favicon) = favicon {
            ep = ep.with_favicon(favicon);
        }
        self.add_entry_point(ep);
        Ok(())
    }

    /// Deploy a static resource, failing if its path is taken.
    pub fn deploy_resource(&self, path: &str, resource: Arc<dyn Resource>) -> Result<(), RouteError> {
        let path = prepend_default_path(&self.default_path, path);
        let ep = EntryPoint::resource(path.clone(), resource)?;
        if self.try_add_resource(ep) {
            Ok(())
        } else {
            Err(RouteError::DuplicateResource(path))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::handler::NamedResource;

    #[test]
    fn test_prepend_default_path() {
        assert_eq!(prepend_default_path("/", ""), "/");
        assert_eq!(prepend_default_path("/", "app"), "/app");
        assert_eq!(prepend_default_path("/base", "app"), "/base/app");
        assert_eq!(prepend_default_path("/base/", "app"), "/base/app");
        assert_eq!(prepend_default_path("/base", "/abs"), "/abs");
    }

    #[test]
    fn test_deploy_resource_twice_fails() {
        let table = RouteTable::with_default_path(Router::new(), "/static");
        let css: Arc<dyn Resource> = Arc::new(NamedResource::new("css"));

        table.deploy_resource("site.css", css.clone()).unwrap();
        let err = table.deploy_resource("site.css", css).unwrap_err();
        assert_eq!(err, RouteError::DuplicateResource("/static/site.css".into()));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_snapshot_survives_update() {
        let table = RouteTable::default();
        table
            .deploy_application(
                EntryPointKind::Application,
                "",
                ApplicationFactory::placeholder("home"),
                Some("/favicon.ico"),
            )
            .unwrap();

        let before = table.snapshot();
        table.remove_entry_point("/");

        assert_eq!(before.len(), 1);
        assert!(table.is_empty());
        assert!(before.match_entry_point("", "/", false).is_match());
        assert!(!table.match_entry_point("", "/", false).is_match());
    }
}
