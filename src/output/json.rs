use crate::model::{AnalysisResult, ModuleSummary, Violation};
use crate::output::OutputFormatter;
use petgraph::visit::EdgeRef;
use serde::Serialize;
use std::io::Write;

pub struct JsonOutput;

impl JsonOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct JsonResult<'a> {
    project_name: &'a str,
    base_package: &'a str,
    compliant: bool,
    modules: &'a [ModuleSummary],
    dependencies: Vec<JsonDependency<'a>>,
    violations: Vec<&'a Violation>,
}

#[derive(Serialize)]
struct JsonDependency<'a> {
    from: &'a str,
    to: &'a str,
    references: usize,
}

impl OutputFormatter for JsonOutput {
    fn format<W: Write>(&self, result: &AnalysisResult, writer: &mut W) -> std::io::Result<()> {
        let graph = &result.dependency_graph;
        let mut dependencies: Vec<_> = graph
            .edge_references()
            .map(|e| JsonDependency {
                from: &graph[e.source()],
                to: &graph[e.target()],
                references: *e.weight(),
            })
            .collect();
        dependencies.sort_by(|a, b| (a.from, a.to).cmp(&(b.from, b.to)));

        let json_result = JsonResult {
            project_name: &result.project_name,
            base_package: &result.base_package,
            compliant: result.violations.is_empty(),
            modules: &result.modules,
            dependencies,
            violations: result.violations.iter().collect(),
        };

        let json = serde_json::to_string_pretty(&json_result).map_err(std::io::Error::other)?;

        writeln!(writer, "{}", json)
    }
}
