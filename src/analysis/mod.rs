mod boundary;
mod circular;
mod dependencies;
mod graph;

pub use boundary::{ExtensionPoints, detect_internal_access, type_glob_match};
pub use circular::detect_cycles;
pub use dependencies::detect_undeclared_dependencies;
pub use graph::{ClassDependency, ModuleGraph};

use crate::config::Config;
use crate::model::{AnalysisResult, ClassGraph, ModuleError, ModuleSummary, RuleId, Violations};
use serde::Deserialize;

/// Which rules a verification run applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    pub cycles: bool,
    pub undeclared_dependencies: bool,
    pub internal_access: bool,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            cycles: true,
            undeclared_dependencies: true,
            internal_access: true,
        }
    }
}

impl RuleSet {
    /// Only the given rules enabled.
    pub fn only(rules: &[RuleId]) -> Self {
        Self {
            cycles: rules.contains(&RuleId::Cycle),
            undeclared_dependencies: rules.contains(&RuleId::UndeclaredDependency),
            internal_access: rules.contains(&RuleId::InternalAccess),
        }
    }

    pub fn is_enabled(&self, rule: RuleId) -> bool {
        match rule {
            RuleId::Cycle => self.cycles,
            RuleId::UndeclaredDependency => self.undeclared_dependencies,
            RuleId::InternalAccess => self.internal_access,
        }
    }
}

/// Applies the enabled architecture rules to a module graph.
#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    rules: RuleSet,
    extension_points: ExtensionPoints,
}

impl RuleEngine {
    pub fn new(rules: RuleSet, extension_points: ExtensionPoints) -> Self {
        Self {
            rules,
            extension_points,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.rules, config.extension_points.clone())
    }

    pub fn rules(&self) -> RuleSet {
        self.rules
    }

    /// Run every enabled rule. An empty report means the graph is compliant.
    pub fn verify(&self, graph: &ModuleGraph<'_>) -> Violations {
        let mut found = Vec::new();

        if self.rules.cycles {
            found.extend(detect_cycles(graph));
        }
        if self.rules.undeclared_dependencies {
            found.extend(detect_undeclared_dependencies(graph));
        }
        if self.rules.internal_access {
            found.extend(detect_internal_access(graph, &self.extension_points));
        }

        let violations = Violations::new(found);
        tracing::info!(
            modules = graph.modules().len(),
            violations = violations.len(),
            "verification finished"
        );
        violations
    }
}

/// Discover the modules under `base_package`, verify them, and detach the
/// outcome from the class graph.
pub fn analyze(
    project_name: &str,
    classes: &ClassGraph,
    base_package: &str,
    config: &Config,
) -> Result<AnalysisResult, ModuleError> {
    let graph = ModuleGraph::discover(
        classes,
        base_package,
        &config.markers,
        &config.modules,
        false,
    )?;

    let violations = RuleEngine::from_config(config).verify(&graph);

    let modules = graph
        .modules()
        .iter()
        .map(|module| {
            let dependencies = graph
                .dependencies_of(module.name())
                .iter()
                .map(|d| d.name().to_string())
                .collect();
            ModuleSummary::of(module, dependencies)
        })
        .collect();

    Ok(AnalysisResult {
        project_name: project_name.to_string(),
        base_package: base_package.to_string(),
        modules,
        violations,
        dependency_graph: graph.to_named_graph(),
    })
}
