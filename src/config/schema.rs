//! Configuration schema definitions.
//!
//! This module defines the configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::routing::{EntryPointKind, RemovableLimit};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Routing settings.
    pub routing: RoutingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Entry points, registered in file order.
    pub entry_points: Vec<EntryPointConfig>,
}

/// Routing settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Path used for entry points deployed with an empty or relative path.
    pub default_entry_point: String,

    /// Removable entry point limit: 0 disables them, a negative value means
    /// no limit.
    pub max_removable_entry_points: i64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            default_entry_point: "/".to_string(),
            max_removable_entry_points: 0,
        }
    }
}

impl RoutingConfig {
    pub fn removable_limit(&self) -> RemovableLimit {
        RemovableLimit::from(self.max_removable_entry_points)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Entry point kind as written in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryPointKindConfig {
    Application,
    WidgetSet,
    StaticResource,
}

impl From<EntryPointKindConfig> for EntryPointKind {
    fn from(kind: EntryPointKindConfig) -> Self {
        match kind {
            EntryPointKindConfig::Application => EntryPointKind::Application,
            EntryPointKindConfig::WidgetSet => EntryPointKind::WidgetSet,
            EntryPointKindConfig::StaticResource => EntryPointKind::StaticResource,
        }
    }
}

/// One configured entry point.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EntryPointConfig {
    /// Path pattern, e.g. "/users/${user}". Relative paths are resolved
    /// against `routing.default_entry_point`.
    #[serde(default)]
    pub path: String,

    /// What the entry point dispatches to.
    #[serde(default = "default_kind")]
    pub kind: EntryPointKindConfig,

    /// Name of the handler, resolved through the handler registry.
    pub handler: String,

    /// Favicon URL for applications.
    #[serde(default)]
    pub favicon: Option<String>,

    /// Subject to the removable entry point limit.
    #[serde(default)]
    pub removable: bool,
}

fn default_kind() -> EntryPointKindConfig {
    EntryPointKindConfig::Application
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RouterConfig::default();
        assert_eq!(config.routing.default_entry_point, "/");
        assert_eq!(config.routing.removable_limit(), RemovableLimit::Disabled);
        assert_eq!(config.observability.log_level, "info");
        assert!(config.entry_points.is_empty());
    }

    #[test]
    fn test_parse_entry_points() {
        let config: RouterConfig = toml::from_str(
            r#"
            [routing]
            max_removable_entry_points = -1

            [[entry_points]]
            path = "/users/${user}"
            handler = "users"

            [[entry_points]]
            path = "/style.css"
            kind = "static-resource"
            handler = "css"
            removable = true
            "#,
        )
        .unwrap();

        assert_eq!(config.routing.default_entry_point, "/");
        assert_eq!(config.routing.removable_limit(), RemovableLimit::Unbounded);
        assert_eq!(config.entry_points.len(), 2);
        assert_eq!(config.entry_points[0].kind, EntryPointKindConfig::Application);
        assert_eq!(config.entry_points[1].kind, EntryPointKindConfig::StaticResource);
        assert!(config.entry_points[1].removable);
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let result: Result<RouterConfig, _> = toml::from_str(
            r#"
            [[entry_points]]
            path = "/"
            kind = "servlet"
            handler = "x"
            "#,
        );
        assert!(result.is_err());
    }
}
