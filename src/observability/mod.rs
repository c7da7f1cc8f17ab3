//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → Log aggregation (stderr)
//!     → Whatever metrics recorder the embedding server installs
//! ```
//!
//! # Design Decisions
//! - Structured logging via tracing
//! - Metrics are cheap (no recorder, no cost)

pub mod logging;
pub mod metrics;
