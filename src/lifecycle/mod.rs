//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Resolve handlers → Build Router → RouteTable
//!
//! Reload (reload.rs):
//!     Watcher update → Build Router → Swap into RouteTable
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     Ctrl+C → Broadcast → Background loops exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then handlers, then the table
//! - A failed reload never takes down the running table

pub mod reload;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
