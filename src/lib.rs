//! Entry point routing library.
//!
//! Maps request paths, with optional `${name}` placeholders, onto registered
//! entry points and keeps the route table live while entry points come and go.

pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::schema::RouterConfig;
pub use lifecycle::Shutdown;
pub use routing::{EntryPoint, EntryPointMatch, RouteTable, Router};
