//! Routing metrics.
//!
//! # Metrics
//! - `router_matches_total` (counter): lookups by outcome and entry point kind
//! - `router_entry_points` (gauge): registered entry points
//! - `router_reloads_total` (counter): config reloads by outcome
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - Labels stay low-cardinality: no paths, no parameter values

use crate::routing::matcher::EntryPointMatch;

/// Record the outcome of a lookup.
pub fn record_match(result: &EntryPointMatch) {
    let (outcome, kind) = match &result.entry_point {
        Some(ep) if result.url_params.is_empty() => ("static", ep.kind().to_string()),
        Some(ep) => ("dynamic", ep.kind().to_string()),
        None => ("none", "none".to_string()),
    };
    metrics::counter!("router_matches_total", "outcome" => outcome, "kind" => kind).increment(1);
}

/// Record the size of the route table.
pub fn record_entry_points(count: usize) {
    metrics::gauge!("router_entry_points").set(count as f64);
}

/// Record a configuration reload attempt.
pub fn record_reload(outcome: &'static str) {
    metrics::counter!("router_reloads_total", "outcome" => outcome).increment(1);
}
