//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (script name, path info)
//!     → table.rs (lock-free snapshot of the router)
//!     → router.rs (script-name match vs path-only match)
//!     → matcher.rs (descend segment tree, backtrack, capture params)
//!     → Return: EntryPointMatch (entry point or none, params, extra path)
//!
//! Registration (startup, or rarely at runtime):
//!     EntryPoint (validated pattern + handler)
//!     → table.rs (writer lock, clone router)
//!     → router.rs (flat list + segment.rs tree)
//!     → Publish new router atomically
//! ```
//!
//! # Design Decisions
//! - Static segments beat `${name}` placeholders at every level
//! - The nearest ancestor with an entry point wins when the full path has none
//! - Readers never lock; writers are serialized and copy-on-write
//! - No match is an ordinary result; the transport layer turns it into a 404

pub mod entry_point;
pub mod handler;
pub mod matcher;
pub mod router;
pub mod segment;
pub mod table;

pub use entry_point::{EntryPoint, EntryPointKind, RouteError};
pub use handler::{ApplicationFactory, Handler, HandlerRegistry, NamedResource, Resource};
pub use matcher::EntryPointMatch;
pub use router::{RemovableLimit, Router};
pub use table::RouteTable;
