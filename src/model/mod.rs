mod class;
mod classes;
mod marker;
mod module;
mod violation;

pub use class::{
    CallSite, ClassDescriptor, Visibility, is_in_package, is_valid_package, package_of,
};
pub use classes::{ClassGraph, ClassGraphError};
pub use marker::{ClassPredicate, Marker, MarkerSet, PublishMethod};
pub use module::{ApplicationModule, Bean, EventType, ModuleDefinition, ModuleError};
pub use violation::{RuleId, Violation, Violations};

use petgraph::graph::DiGraph;
use serde::Serialize;

/// Owned outcome of one verification run.
#[derive(Debug)]
pub struct AnalysisResult {
    pub project_name: String,
    pub base_package: String,
    pub modules: Vec<ModuleSummary>,
    pub violations: Violations,
    /// Module dependency graph; edge weights count class-level references.
    pub dependency_graph: DiGraph<String, usize>,
}

/// Snapshot of one module's derived views, detached from the class graph.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleSummary {
    pub name: String,
    pub display_name: String,
    pub base_package: String,
    pub class_count: usize,
    pub exposed_types: Vec<String>,
    pub aggregate_roots: Vec<String>,
    pub published_events: Vec<PublishedEventSummary>,
    pub beans: Vec<String>,
    pub dependencies: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublishedEventSummary {
    pub event_type: String,
    pub sources: Vec<String>,
}

impl ModuleSummary {
    pub fn of(module: &ApplicationModule<'_>, dependencies: Vec<String>) -> Self {
        let names = |classes: &[&ClassDescriptor]| -> Vec<String> {
            classes.iter().map(|c| c.name.clone()).collect()
        };

        Self {
            name: module.name().to_string(),
            display_name: module.display_name(),
            base_package: module.base_package().to_string(),
            class_count: module.classes().len(),
            exposed_types: names(module.exposed_types()),
            aggregate_roots: names(module.aggregate_roots()),
            published_events: module
                .published_events()
                .iter()
                .map(|e| PublishedEventSummary {
                    event_type: e.event_type().name.clone(),
                    sources: names(e.sources()),
                })
                .collect(),
            beans: module
                .beans()
                .iter()
                .map(|b| b.fully_qualified_type_name().to_string())
                .collect(),
            dependencies,
        }
    }
}
