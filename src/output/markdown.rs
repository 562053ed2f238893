use crate::model::{AnalysisResult, RuleId, Violation};
use crate::output::OutputFormatter;
use std::io::Write;

pub struct MarkdownOutput {
    /// Include exposed types, beans and events per module.
    pub detailed: bool,
}

impl MarkdownOutput {
    pub fn new(detailed: bool) -> Self {
        Self { detailed }
    }
}

impl Default for MarkdownOutput {
    fn default() -> Self {
        Self::new(true)
    }
}

fn code_list(items: &[String]) -> String {
    items
        .iter()
        .map(|i| format!("`{}`", i))
        .collect::<Vec<_>>()
        .join(", ")
}

fn rule_heading(rule: RuleId) -> &'static str {
    match rule {
        RuleId::Cycle => "### 🔴 Dependency Cycles",
        RuleId::UndeclaredDependency => "### 🟡 Undeclared Dependencies",
        RuleId::InternalAccess => "### 🟡 Internal Access",
    }
}

fn write_violation<W: Write>(writer: &mut W, violation: &Violation) -> std::io::Result<()> {
    writeln!(writer, "- {}", violation.message)?;
    if let (Some(source), Some(target)) = (&violation.source, &violation.target) {
        writeln!(writer, "  → `{}` → `{}`", source, target)?;
    }
    Ok(())
}

impl OutputFormatter for MarkdownOutput {
    fn format<W: Write>(&self, result: &AnalysisResult, writer: &mut W) -> std::io::Result<()> {
        writeln!(
            writer,
            "# Module Verification: {} (`{}`)\n",
            result.project_name, result.base_package
        )?;

        writeln!(writer, "## Modules\n")?;
        for module in &result.modules {
            if module.dependencies.is_empty() {
                writeln!(
                    writer,
                    "- **{}** `{}` ({} classes, no dependencies)",
                    module.display_name, module.base_package, module.class_count
                )?;
            } else {
                writeln!(
                    writer,
                    "- **{}** `{}` ({} classes) → depends on: [{}]",
                    module.display_name,
                    module.base_package,
                    module.class_count,
                    code_list(&module.dependencies)
                )?;
            }

            if !self.detailed {
                continue;
            }
            if !module.exposed_types.is_empty() {
                writeln!(writer, "  - Exposes: {}", code_list(&module.exposed_types))?;
            }
            if !module.aggregate_roots.is_empty() {
                writeln!(
                    writer,
                    "  - Aggregate roots: {}",
                    code_list(&module.aggregate_roots)
                )?;
            }
            for event in &module.published_events {
                writeln!(
                    writer,
                    "  - Publishes `{}` from {}",
                    event.event_type,
                    code_list(&event.sources)
                )?;
            }
            if !module.beans.is_empty() {
                writeln!(writer, "  - Beans: {}", code_list(&module.beans))?;
            }
        }

        if result.violations.is_empty() {
            writeln!(writer, "\n## No Violations Found\n")?;
            writeln!(writer, "All modules comply with the architecture rules.")?;
            return Ok(());
        }

        writeln!(
            writer,
            "\n## Violations Found ({})\n",
            result.violations.len()
        )?;

        for rule in [
            RuleId::Cycle,
            RuleId::UndeclaredDependency,
            RuleId::InternalAccess,
        ] {
            let mut violations = result.violations.of_rule(rule).peekable();
            if violations.peek().is_none() {
                continue;
            }

            writeln!(writer, "{}\n", rule_heading(rule))?;
            for violation in violations {
                write_violation(writer, violation)?;
            }
            writeln!(writer)?;
        }

        Ok(())
    }
}
