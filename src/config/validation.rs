//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check entry point patterns before anything is registered
//! - Detect conflicting static resources
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use thiserror::Error;

use crate::config::schema::{EntryPointKindConfig, RouterConfig};
use crate::routing::entry_point::{validate_pattern, RouteError};
use crate::routing::table::prepend_default_path;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A semantic problem in a configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("default entry point '{0}' must start with '/'")]
    DefaultEntryPoint(String),

    #[error("entry point #{index}: {source}")]
    Pattern {
        index: usize,
        #[source]
        source: RouteError,
    },

    #[error("entry point #{index} ('{path}') has no handler")]
    MissingHandler { index: usize, path: String },

    #[error("entry point #{index}: static resource '{path}' cannot have a favicon")]
    ResourceFavicon { index: usize, path: String },

    #[error("entry point #{index}: static resource already deployed on '{path}'")]
    DuplicateResource { index: usize, path: String },

    #[error("unknown log level '{0}'")]
    LogLevel(String),
}

/// Check a configuration for semantic errors.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let default_path = &config.routing.default_entry_point;
    if !default_path.starts_with('/') {
        errors.push(ValidationError::DefaultEntryPoint(default_path.clone()));
    }

    if !LOG_LEVELS.contains(&config.observability.log_level.to_lowercase().as_str()) {
        errors.push(ValidationError::LogLevel(config.observability.log_level.clone()));
    }

    let mut paths = HashSet::new();
    for (index, entry) in config.entry_points.iter().enumerate() {
        let path = prepend_default_path(default_path, &entry.path);

        if let Err(source) = validate_pattern(&path) {
            errors.push(ValidationError::Pattern { index, source });
        }

        if entry.handler.trim().is_empty() {
            errors.push(ValidationError::MissingHandler {
                index,
                path: path.clone(),
            });
        }

        let first_on_path = paths.insert(path.clone());
        if entry.kind == EntryPointKindConfig::StaticResource {
            if entry.favicon.is_some() {
                errors.push(ValidationError::ResourceFavicon {
                    index,
                    path: path.clone(),
                });
            }
            if !first_on_path {
                errors.push(ValidationError::DuplicateResource { index, path });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
