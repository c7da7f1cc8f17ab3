//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use entrypoint_router::routing::segment::SegmentTree;
use entrypoint_router::routing::{
    ApplicationFactory, EntryPoint, EntryPointMatch, NamedResource, Resource, Router,
};

/// An application entry point with a placeholder factory.
pub fn app(path: &str) -> EntryPoint {
    EntryPoint::application(path, ApplicationFactory::placeholder(path)).unwrap()
}

/// A fresh resource handle; every call yields a distinct identity.
pub fn resource_handle(name: &str) -> Arc<dyn Resource> {
    Arc::new(NamedResource::new(name))
}

pub fn resource(path: &str, handle: &Arc<dyn Resource>) -> EntryPoint {
    EntryPoint::resource(path, handle.clone()).unwrap()
}

/// Router with one application per path, registered in order.
pub fn router_with(paths: &[&str]) -> Router {
    let mut router = Router::new();
    for path in paths {
        router.add_entry_point(app(path));
    }
    router
}

/// Path of the matched entry point, if any.
pub fn matched(m: &EntryPointMatch) -> Option<&str> {
    m.entry_point.as_ref().map(|ep| ep.path())
}

/// The incrementally maintained tree must equal a rebuild from the flat list.
pub fn assert_consistent(router: &Router) {
    let rebuilt = SegmentTree::from_entry_points(router.entry_points());
    assert_eq!(router.tree().shape(), rebuilt.shape());
    router.tree().check_invariants().unwrap();
}
