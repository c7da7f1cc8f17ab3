//! Entry point (route) definitions and pattern validation.
//!
//! # Responsibilities
//! - Describe one routable destination: kind, path pattern, handler
//! - Validate path patterns at registration time
//! - Split patterns into static and placeholder segments
//!
//! # Design Decisions
//! - Entry points are immutable once built; the router shares them via `Arc`
//! - Malformed patterns are rejected here, never tolerated at match time

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::routing::handler::{ApplicationFactory, Handler, Resource};

/// Errors raised while building or registering entry points.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// Path is neither empty nor absolute.
    #[error("entry point path '{0}' must be empty or start with '/'")]
    RelativePath(String),

    /// A `${}` segment without a name.
    #[error("entry point path '{0}' contains a placeholder without a name")]
    EmptyPlaceholder(String),

    /// A segment starting with `${` that is not closed by `}`.
    #[error("entry point path '{path}' contains a malformed placeholder '{segment}'")]
    MalformedPlaceholder { path: String, segment: String },

    /// The same placeholder name used twice in one pattern.
    #[error("entry point path '{path}' uses placeholder '{name}' more than once")]
    DuplicatePlaceholder { path: String, name: String },

    /// Handler does not fit the entry point kind.
    #[error("{kind} entry points cannot be bound to {handler} handlers")]
    KindMismatch {
        kind: EntryPointKind,
        handler: &'static str,
    },

    /// A static resource is already deployed on this path.
    #[error("a static resource was already deployed on path '{0}'")]
    DuplicateResource(String),
}

/// Kind of destination an entry point routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryPointKind {
    /// A full-page application.
    Application,
    /// An application embedded as widgets into a foreign page.
    WidgetSet,
    /// A resource served at a fixed path.
    StaticResource,
}

impl fmt::Display for EntryPointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntryPointKind::Application => "application",
            EntryPointKind::WidgetSet => "widget-set",
            EntryPointKind::StaticResource => "static-resource",
        };
        f.write_str(name)
    }
}

/// One segment of a path pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternSegment<'a> {
    /// Matched by exact text. May be empty (trailing slash).
    Static(&'a str),
    /// `${name}`: matches any single non-empty segment.
    Placeholder(&'a str),
}

impl<'a> PatternSegment<'a> {
    pub fn parse(segment: &'a str) -> Self {
        match placeholder_name(segment) {
            Some(name) => PatternSegment::Placeholder(name),
            None => PatternSegment::Static(segment),
        }
    }
}

/// Returns the variable name if `segment` is written `${name}`.
pub fn placeholder_name(segment: &str) -> Option<&str> {
    segment
        .strip_prefix("${")
        .and_then(|rest| rest.strip_suffix('}'))
}

/// Split an absolute path into its segments, dropping the leading `/`.
///
/// Yields `(offset, segment)` pairs where `offset` is the byte index of the
/// segment inside `path`. An empty path yields nothing; `"/"` yields one empty
/// segment.
pub fn split_segments(path: &str) -> impl Iterator<Item = (usize, &str)> {
    let rest = path.strip_prefix('/');
    rest.into_iter().flat_map(|rest| {
        rest.split('/').scan(1usize, |offset, segment| {
            let start = *offset;
            *offset += segment.len() + 1;
            Some((start, segment))
        })
    })
}

/// Validate a path pattern.
pub fn validate_pattern(path: &str) -> Result<(), RouteError> {
    if path.is_empty() {
        return Ok(());
    }
    if !path.starts_with('/') {
        return Err(RouteError::RelativePath(path.to_string()));
    }

    let mut names = HashSet::new();
    for (_, segment) in split_segments(path) {
        if !segment.starts_with("${") {
            continue;
        }
        let name = placeholder_name(segment).ok_or_else(|| RouteError::MalformedPlaceholder {
            path: path.to_string(),
            segment: segment.to_string(),
        })?;
        if name.is_empty() {
            return Err(RouteError::EmptyPlaceholder(path.to_string()));
        }
        if !names.insert(name) {
            return Err(RouteError::DuplicatePlaceholder {
                path: path.to_string(),
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

/// A registered, routable destination.
#[derive(Debug, Clone)]
pub struct EntryPoint {
    kind: EntryPointKind,
    path: String,
    handler: Handler,
    favicon: Option<String>,
    removable: bool,
}

impl EntryPoint {
    /// Build an entry point, validating the pattern and the kind/handler pair.
    pub fn new(
        kind: EntryPointKind,
        path: impl Into<String>,
        handler: Handler,
    ) -> Result<Self, RouteError> {
        let path = path.into();
        validate_pattern(&path)?;

        match (kind, &handler) {
            (EntryPointKind::StaticResource, Handler::Resource(_))
            | (EntryPointKind::Application, Handler::Application(_))
            | (EntryPointKind::WidgetSet, Handler::Application(_)) => {}
            (kind, Handler::Resource(_)) => {
                return Err(RouteError::KindMismatch { kind, handler: "resource" });
            }
            (kind, Handler::Application(_)) => {
                return Err(RouteError::KindMismatch { kind, handler: "application" });
            }
        }

        Ok(Self {
            kind,
            path,
            handler,
            favicon: None,
            removable: false,
        })
    }

    /// An application entry point.
    pub fn application(
        path: impl Into<String>,
        factory: ApplicationFactory,
    ) -> Result<Self, RouteError> {
        Self::new(EntryPointKind::Application, path, Handler::Application(factory))
    }

    /// A widget-set entry point.
    pub fn widget_set(
        path: impl Into<String>,
        factory: ApplicationFactory,
    ) -> Result<Self, RouteError> {
        Self::new(EntryPointKind::WidgetSet, path, Handler::Application(factory))
    }

    /// A static resource entry point.
    pub fn resource(
        path: impl Into<String>,
        resource: Arc<dyn Resource>,
    ) -> Result<Self, RouteError> {
        Self::new(EntryPointKind::StaticResource, path, Handler::Resource(resource))
    }

    pub fn with_favicon(mut self, favicon: impl Into<String>) -> Self {
        self.favicon = Some(favicon.into());
        self
    }

    /// Mark the entry point as removable, subject to the router's removable limit.
    pub fn removable(mut self) -> Self {
        self.removable = true;
        self
    }

    pub fn kind(&self) -> EntryPointKind {
        self.kind
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    pub fn favicon(&self) -> Option<&str> {
        self.favicon.as_deref()
    }

    pub fn is_removable(&self) -> bool {
        self.removable
    }

    /// Number of segments the pattern spans.
    pub fn depth(&self) -> usize {
        self.path.bytes().filter(|b| *b == b'/').count()
    }

    /// Iterate over the parsed pattern segments.
    pub fn segments(&self) -> impl Iterator<Item = PatternSegment<'_>> {
        split_segments(&self.path).map(|(_, segment)| PatternSegment::parse(segment))
    }
}
