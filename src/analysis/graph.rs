use crate::model::{
    ApplicationModule, ClassGraph, ClassGraphError, MarkerSet, ModuleDefinition, ModuleError,
};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeSet, HashMap};

/// A reference from a class in one module to a class in another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassDependency<'g> {
    pub source: &'g str,
    pub target: &'g str,
    pub source_module: usize,
    pub target_module: usize,
}

/// All modules under a base package plus the dependency relation between them.
///
/// Module A depends on module B iff some class owned by A references a class
/// owned by B. Edges are computed once at construction.
#[derive(Debug)]
pub struct ModuleGraph<'g> {
    classes: &'g ClassGraph,
    modules: Vec<ApplicationModule<'g>>,
    graph: DiGraph<usize, usize>,
    node_indices: Vec<NodeIndex>,
    owners: HashMap<&'g str, usize>,
    class_dependencies: Vec<ClassDependency<'g>>,
}

impl<'g> ModuleGraph<'g> {
    /// One module per direct sub-package of `base_package`, in ascending
    /// package order. Definitions in `overrides` are keyed by module name.
    pub fn discover(
        classes: &'g ClassGraph,
        base_package: &str,
        markers: &'g MarkerSet,
        overrides: &HashMap<String, ModuleDefinition>,
        eager: bool,
    ) -> Result<Self, ModuleError> {
        let candidates = match classes.classes_in(base_package) {
            Ok(candidates) => candidates,
            Err(ClassGraphError::NotFound(package)) => {
                return Err(ModuleError::EmptyModule(package));
            }
            Err(e) => return Err(e.into()),
        };

        let packages: BTreeSet<String> = candidates
            .iter()
            .filter_map(|c| {
                let rest = c.package.strip_prefix(base_package)?.strip_prefix('.')?;
                let segment = rest.split('.').next()?;
                Some(format!("{}.{}", base_package, segment))
            })
            .collect();

        let mut modules = Vec::with_capacity(packages.len());
        for package in packages {
            let name = package.rsplit('.').next().unwrap_or(&package);
            let definition = match overrides.get(name) {
                Some(o) => ModuleDefinition {
                    base_package: package.clone(),
                    ..o.clone()
                },
                None => ModuleDefinition::new(package.clone()),
            };
            modules.push(ApplicationModule::new(classes, definition, markers, eager)?);
        }

        tracing::debug!(
            base_package,
            modules = modules.len(),
            "discovered application modules"
        );

        Self::new(classes, modules)
    }

    /// Build the graph over explicit modules. Module names must be unique.
    pub fn new(
        classes: &'g ClassGraph,
        modules: Vec<ApplicationModule<'g>>,
    ) -> Result<Self, ModuleError> {
        let mut names: HashMap<&str, &str> = HashMap::with_capacity(modules.len());
        for module in &modules {
            if let Some(first) = names.insert(module.name(), module.base_package()) {
                return Err(ModuleError::DuplicateName {
                    name: module.name().to_string(),
                    first: first.to_string(),
                    second: module.base_package().to_string(),
                });
            }
        }

        let mut graph = DiGraph::new();
        let node_indices: Vec<NodeIndex> = (0..modules.len()).map(|i| graph.add_node(i)).collect();

        let by_package: HashMap<&str, usize> = modules
            .iter()
            .enumerate()
            .map(|(i, m)| (m.base_package(), i))
            .collect();

        // Walking up from the class package finds the most specific module first
        let mut owners = HashMap::with_capacity(classes.len());
        for class in classes.iter() {
            let mut package = class.package.as_str();
            loop {
                if let Some(&owner) = by_package.get(package) {
                    owners.insert(class.name.as_str(), owner);
                    break;
                }
                match package.rsplit_once('.') {
                    Some((parent, _)) => package = parent,
                    None => break,
                }
            }
        }

        let mut class_dependencies = Vec::new();
        for class in classes.iter() {
            let Some(&source_module) = owners.get(class.name.as_str()) else {
                continue;
            };

            for reference in &class.references {
                let Some((&target, &target_module)) = owners.get_key_value(reference.as_str())
                else {
                    continue;
                };
                if target_module == source_module {
                    continue;
                }

                class_dependencies.push(ClassDependency {
                    source: class.name.as_str(),
                    target,
                    source_module,
                    target_module,
                });

                let (from, to) = (node_indices[source_module], node_indices[target_module]);
                match graph.find_edge(from, to) {
                    Some(edge) => graph[edge] += 1,
                    None => {
                        graph.add_edge(from, to, 1);
                    }
                }
            }
        }

        tracing::debug!(
            modules = modules.len(),
            edges = graph.edge_count(),
            class_dependencies = class_dependencies.len(),
            "computed module dependencies"
        );

        Ok(Self {
            classes,
            modules,
            graph,
            node_indices,
            owners,
            class_dependencies,
        })
    }

    /// The class graph snapshot the modules were built from.
    pub fn classes(&self) -> &'g ClassGraph {
        self.classes
    }

    pub fn modules(&self) -> &[ApplicationModule<'g>] {
        &self.modules
    }

    pub fn module(&self, name: &str) -> Option<&ApplicationModule<'g>> {
        self.modules.iter().find(|m| m.name() == name)
    }

    /// Module owning `class_name`, if any.
    pub fn module_of(&self, class_name: &str) -> Option<&ApplicationModule<'g>> {
        self.owners.get(class_name).map(|&i| &self.modules[i])
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.modules.iter().position(|m| m.name() == name)
    }

    /// Modules `name` depends on, in module order.
    pub fn dependencies_of(&self, name: &str) -> Vec<&ApplicationModule<'g>> {
        let Some(idx) = self.index_of(name) else {
            return Vec::new();
        };

        let mut targets: Vec<usize> = self
            .graph
            .neighbors_directed(self.node_indices[idx], Direction::Outgoing)
            .map(|n| self.graph[n])
            .collect();
        targets.sort_unstable();
        targets.into_iter().map(|i| &self.modules[i]).collect()
    }

    pub fn depends_on(&self, from: &str, to: &str) -> bool {
        match (self.index_of(from), self.index_of(to)) {
            (Some(a), Some(b)) => self
                .graph
                .find_edge(self.node_indices[a], self.node_indices[b])
                .is_some(),
            _ => false,
        }
    }

    /// Module-level edges as `(source, target, reference count)` index triples.
    pub fn edges(&self) -> Vec<(usize, usize, usize)> {
        let mut edges: Vec<_> = self
            .graph
            .edge_indices()
            .filter_map(|e| {
                let (a, b) = self.graph.edge_endpoints(e)?;
                Some((self.graph[a], self.graph[b], self.graph[e]))
            })
            .collect();
        edges.sort_unstable();
        edges
    }

    pub fn class_dependencies(&self) -> &[ClassDependency<'g>] {
        &self.class_dependencies
    }

    /// Class dependencies crossing from module `from` into module `to`.
    pub fn class_dependencies_between(&self, from: usize, to: usize) -> Vec<&ClassDependency<'g>> {
        self.class_dependencies
            .iter()
            .filter(|d| d.source_module == from && d.target_module == to)
            .collect()
    }

    /// Underlying graph; node weights are indices into [`Self::modules`].
    pub fn graph(&self) -> &DiGraph<usize, usize> {
        &self.graph
    }

    /// Copy of the graph labelled with module names.
    pub fn to_named_graph(&self) -> DiGraph<String, usize> {
        self.graph
            .map(|_, &i| self.modules[i].name().to_string(), |_, &w| w)
    }
}
