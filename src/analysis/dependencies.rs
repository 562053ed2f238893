use crate::analysis::ModuleGraph;
use crate::model::Violation;

/// Flag module edges missing from the depending module's allowed-dependency
/// list. Modules without such a list are unrestricted.
pub fn detect_undeclared_dependencies(graph: &ModuleGraph<'_>) -> Vec<Violation> {
    let modules = graph.modules();
    let mut violations = Vec::new();

    for (from, to, _) in graph.edges() {
        let (module, dependency) = (&modules[from], &modules[to]);
        if module.allows_dependency_on(dependency) {
            continue;
        }

        let mut crossings = graph.class_dependencies_between(from, to);
        crossings.sort_by_key(|d| (d.source, d.target));

        if let Some(first) = crossings.first() {
            violations.push(Violation::undeclared_dependency(
                module.name(),
                dependency.name(),
                first.source,
                first.target,
                crossings.len(),
            ));
        }
    }

    violations
}
