//! Handlers bound to entry points.
//!
//! # Responsibilities
//! - Represent what an entry point dispatches to (application factory or resource)
//! - Provide identity comparison for resource-based removal
//! - Resolve configured handler names to handler values
//!
//! # Design Decisions
//! - The router never calls into a handler; it only stores and compares them
//! - Identity is pointer identity of the shared allocation, never name equality

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::config::schema::{EntryPointConfig, EntryPointKindConfig, RouterConfig};

type CreateFn = dyn Fn() -> Box<dyn Any + Send> + Send + Sync;

/// Callback that creates a new application instance for a matched request.
#[derive(Clone)]
pub struct ApplicationFactory {
    name: String,
    create: Arc<CreateFn>,
}

impl ApplicationFactory {
    /// Wrap a constructor closure.
    pub fn new<F, A>(name: impl Into<String>, create: F) -> Self
    where
        F: Fn() -> A + Send + Sync + 'static,
        A: Any + Send,
    {
        Self {
            name: name.into(),
            create: Arc::new(move || Box::new(create()) as Box<dyn Any + Send>),
        }
    }

    /// A factory that creates nothing useful. Used for dry runs.
    pub fn placeholder(name: impl Into<String>) -> Self {
        Self::new(name, || ())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the constructor. Called by the transport layer, not by the router.
    pub fn create(&self) -> Box<dyn Any + Send> {
        (self.create)()
    }

    /// Returns true if both factories share the same constructor allocation.
    pub fn same(&self, other: &ApplicationFactory) -> bool {
        Arc::ptr_eq(&self.create, &other.create)
    }
}

impl fmt::Debug for ApplicationFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplicationFactory")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// A path-addressed resource, e.g. a static file or a generated download.
pub trait Resource: fmt::Debug + Send + Sync {
    /// Human readable name, used in logs and reports.
    fn name(&self) -> &str;
}

/// A resource that only carries a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedResource {
    name: String,
}

impl NamedResource {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Resource for NamedResource {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Returns true if both handles point at the very same resource.
pub fn same_resource(a: &Arc<dyn Resource>, b: &Arc<dyn Resource>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// What an entry point dispatches to.
#[derive(Clone, Debug)]
pub enum Handler {
    Application(ApplicationFactory),
    Resource(Arc<dyn Resource>),
}

impl Handler {
    pub fn name(&self) -> &str {
        match self {
            Handler::Application(factory) => factory.name(),
            Handler::Resource(resource) => resource.name(),
        }
    }

    pub fn resource(&self) -> Option<&Arc<dyn Resource>> {
        match self {
            Handler::Resource(resource) => Some(resource),
            Handler::Application(_) => None,
        }
    }

    pub fn application(&self) -> Option<&ApplicationFactory> {
        match self {
            Handler::Application(factory) => Some(factory),
            Handler::Resource(_) => None,
        }
    }

    /// Identity comparison.
    pub fn same(&self, other: &Handler) -> bool {
        match (self, other) {
            (Handler::Application(a), Handler::Application(b)) => a.same(b),
            (Handler::Resource(a), Handler::Resource(b)) => same_resource(a, b),
            _ => false,
        }
    }
}

/// Maps configured handler names to handler values.
#[derive(Debug, Clone, Default)]
pub struct HandlerRegistry {
    applications: HashMap<String, ApplicationFactory>,
    resources: HashMap<String, Arc<dyn Resource>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry of no-op handlers for every name the config mentions.
    pub fn placeholders(config: &RouterConfig) -> Self {
        let mut registry = Self::new();
        for entry in &config.entry_points {
            registry.insert_placeholder(entry);
        }
        registry
    }

    fn insert_placeholder(&mut self, entry: &EntryPointConfig) {
        match entry.kind {
            EntryPointKindConfig::StaticResource => {
                self.resources
                    .entry(entry.handler.clone())
                    .or_insert_with(|| Arc::new(NamedResource::new(entry.handler.clone())));
            }
            EntryPointKindConfig::Application | EntryPointKindConfig::WidgetSet => {
                self.applications
                    .entry(entry.handler.clone())
                    .or_insert_with(|| ApplicationFactory::placeholder(entry.handler.clone()));
            }
        }
    }

    pub fn register_application(&mut self, factory: ApplicationFactory) {
        self.applications.insert(factory.name().to_string(), factory);
    }

    pub fn register_resource(&mut self, resource: Arc<dyn Resource>) {
        self.resources.insert(resource.name().to_string(), resource);
    }

    pub fn application(&self, name: &str) -> Option<&ApplicationFactory> {
        self.applications.get(name)
    }

    pub fn resource(&self, name: &str) -> Option<&Arc<dyn Resource>> {
        self.resources.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_identity() {
        let a = ApplicationFactory::new("app", || 42u32);
        let b = a.clone();
        let c = ApplicationFactory::new("app", || 42u32);

        assert!(a.same(&b));
        assert!(!a.same(&c));

        let created = a.create();
        assert_eq!(created.downcast_ref::<u32>(), Some(&42));
    }

    #[test]
    fn test_resource_identity() {
        let r1: Arc<dyn Resource> = Arc::new(NamedResource::new("logo"));
        let r2: Arc<dyn Resource> = Arc::new(NamedResource::new("logo"));

        assert!(same_resource(&r1, &r1.clone()));
        assert!(!same_resource(&r1, &r2)); // equal names, distinct resources

        let h1 = Handler::Resource(r1.clone());
        assert!(h1.same(&Handler::Resource(r1)));
        assert!(!h1.same(&Handler::Application(ApplicationFactory::placeholder("logo"))));
    }

    #[test]
    fn test_registry_lookup() {
        let mut registry = HandlerRegistry::new();
        registry.register_application(ApplicationFactory::placeholder("home"));
        registry.register_resource(Arc::new(NamedResource::new("styles")));

        assert_eq!(registry.application("home").map(|f| f.name()), Some("home"));
        assert_eq!(registry.resource("styles").map(|r| r.name()), Some("styles"));
        assert!(registry.application("styles").is_none());
    }
}
