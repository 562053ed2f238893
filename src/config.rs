use crate::analysis::{ExtensionPoints, RuleSet};
use crate::fs::{FileSystem, default_fs};
use crate::model::{Marker, MarkerSet, ModuleDefinition, PublishMethod};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = ".modbound.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Package whose direct sub-packages are the application modules.
    pub base_package: Option<String>,
    pub markers: MarkerSet,
    pub extension_points: ExtensionPoints,
    pub rules: RuleSet,
    /// Per-module overrides keyed by module name.
    pub modules: HashMap<String, ModuleDefinition>,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    base_package: Option<String>,
    publish_methods: Option<Vec<String>>,
    extension_points: Option<Vec<String>>,
    markers: Option<RawMarkers>,
    rules: Option<RuleSet>,
    modules: Option<HashMap<String, RawModule>>,
}

#[derive(Debug, Deserialize)]
struct RawMarkers {
    aggregate_root: Option<RawMarker>,
    domain_event: Option<RawMarker>,
    component: Option<RawMarker>,
    exposed: Option<RawMarker>,
    extension_point: Option<RawMarker>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawMarker {
    annotations: Vec<String>,
    supertypes: Vec<String>,
    types: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawModule {
    display_name: Option<String>,
    allowed_dependencies: Option<Vec<String>>,
}

impl From<RawMarker> for Marker {
    fn from(raw: RawMarker) -> Self {
        Marker::new()
            .annotated(raw.annotations)
            .implementing(raw.supertypes)
            .named(raw.types)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_package: None,
            markers: default_markers(),
            extension_points: ExtensionPoints::default(),
            rules: RuleSet::default(),
            modules: HashMap::new(),
        }
    }
}

/// jMolecules stereotypes, Spring components and Spring event publication.
pub fn default_markers() -> MarkerSet {
    MarkerSet {
        aggregate_root: Marker::new()
            .annotated(["org.jmolecules.ddd.annotation.AggregateRoot"])
            .implementing(["org.jmolecules.ddd.types.AggregateRoot"]),
        domain_event: Marker::new()
            .annotated(["org.jmolecules.event.annotation.DomainEvent"])
            .implementing(["org.jmolecules.event.types.DomainEvent"]),
        component: Marker::new().annotated([
            "org.springframework.stereotype.Component",
            "org.springframework.stereotype.Service",
            "org.springframework.stereotype.Repository",
            "org.springframework.stereotype.Controller",
            "org.springframework.context.annotation.Configuration",
        ]),
        exposed: Marker::new().annotated(["org.springframework.modulith.NamedInterface"]),
        publish_methods: DEFAULT_PUBLISH_METHODS
            .iter()
            .map(|m| PublishMethod::parse(m))
            .collect(),
    }
}

const DEFAULT_PUBLISH_METHODS: &[&str] = &[
    "org.springframework.context.ApplicationEventPublisher#publishEvent",
    "registerEvent",
];

impl Config {
    pub fn load(project_path: &Path) -> Result<Self, ConfigError> {
        Self::load_with_fs(project_path, default_fs())
    }

    pub fn load_with_fs(project_path: &Path, fs: &dyn FileSystem) -> Result<Self, ConfigError> {
        let config_path = project_path.join(CONFIG_FILE_NAME);

        if !fs.exists(&config_path) {
            return Ok(Self::default());
        }

        let content = fs.read_to_string(&config_path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content)?;
        let mut config = Self::default();

        if let Some(base_package) = raw.base_package {
            config.base_package = Some(base_package);
        }

        if let Some(methods) = raw.publish_methods {
            config.markers.publish_methods =
                methods.iter().map(|m| PublishMethod::parse(m)).collect();
        }

        if let Some(markers) = raw.markers {
            let slots = [
                (markers.aggregate_root, &mut config.markers.aggregate_root),
                (markers.domain_event, &mut config.markers.domain_event),
                (markers.component, &mut config.markers.component),
                (markers.exposed, &mut config.markers.exposed),
                (
                    markers.extension_point,
                    &mut config.extension_points.marker,
                ),
            ];
            for (raw_marker, slot) in slots {
                if let Some(raw_marker) = raw_marker {
                    *slot = raw_marker.into();
                }
            }
        }

        if let Some(patterns) = raw.extension_points {
            config.extension_points.patterns = patterns;
        }

        if let Some(rules) = raw.rules {
            config.rules = rules;
        }

        if let Some(modules) = raw.modules {
            config.modules = modules
                .into_iter()
                .map(|(name, raw_module)| {
                    let definition = ModuleDefinition {
                        base_package: String::new(),
                        display_name: raw_module.display_name,
                        allowed_dependencies: raw_module.allowed_dependencies,
                    };
                    (name, definition)
                })
                .collect();
        }

        Ok(config)
    }
}

pub fn generate_config_template() -> String {
    r#"# modbound configuration

# Package whose direct sub-packages are the application modules
# base_package = "com.acme"

# Calls treated as event publication: "method" or "Owner#method"
publish_methods = [
    "org.springframework.context.ApplicationEventPublisher#publishEvent",
    "registerEvent",
]

# Types other modules may use even though they are not exposed
extension_points = []

[markers.aggregate_root]
annotations = ["org.jmolecules.ddd.annotation.AggregateRoot"]
supertypes = ["org.jmolecules.ddd.types.AggregateRoot"]

[markers.domain_event]
annotations = ["org.jmolecules.event.annotation.DomainEvent"]
supertypes = ["org.jmolecules.event.types.DomainEvent"]

[markers.component]
annotations = [
    "org.springframework.stereotype.Component",
    "org.springframework.stereotype.Service",
    "org.springframework.stereotype.Repository",
    "org.springframework.stereotype.Controller",
    "org.springframework.context.annotation.Configuration",
]
# types = ["javax.sql.DataSource"]

[markers.exposed]
annotations = ["org.springframework.modulith.NamedInterface"]

[rules]
cycles = true
undeclared_dependencies = true
internal_access = true

# [modules.order]
# display_name = "Orders"
# allowed_dependencies = ["inventory"]
"#
    .to_string()
}
