use serde::{Deserialize, Serialize};
use std::fmt;

/// Architectural rules, declared in report priority order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum RuleId {
    Cycle,
    UndeclaredDependency,
    InternalAccess,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Violation {
    pub rule: RuleId,
    /// Offending module names. For cycles, in cycle order.
    pub modules: Vec<String>,
    pub source: Option<String>,
    pub target: Option<String>,
    pub message: String,
}

impl Violation {
    pub fn cycle(cycle: Vec<String>) -> Self {
        let mut path = cycle.clone();
        if let Some(first) = cycle.first() {
            path.push(first.clone());
        }

        Self {
            rule: RuleId::Cycle,
            message: format!("Cycle detected: {}", path.join(" -> ")),
            modules: cycle,
            source: None,
            target: None,
        }
    }

    pub fn undeclared_dependency(
        module: &str,
        dependency: &str,
        source: &str,
        target: &str,
        occurrences: usize,
    ) -> Self {
        Self {
            rule: RuleId::UndeclaredDependency,
            modules: vec![module.to_string(), dependency.to_string()],
            source: Some(source.to_string()),
            target: Some(target.to_string()),
            message: format!(
                "Module '{}' depends on non-allowed module '{}' ({} references, e.g. {} -> {})",
                module, dependency, occurrences, source, target
            ),
        }
    }

    pub fn internal_access(module: &str, dependency: &str, source: &str, target: &str) -> Self {
        Self {
            rule: RuleId::InternalAccess,
            modules: vec![module.to_string(), dependency.to_string()],
            source: Some(source.to_string()),
            target: Some(target.to_string()),
            message: format!(
                "Module '{}' accesses non-exposed type {} of module '{}' from {}",
                module, target, dependency, source
            ),
        }
    }

    fn sort_key(&self) -> (RuleId, &str, &str, &str, &str) {
        (
            self.rule,
            self.modules.first().map(String::as_str).unwrap_or(""),
            self.source.as_deref().unwrap_or(""),
            self.target.as_deref().unwrap_or(""),
            &self.message,
        )
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.rule, self.message)
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleId::Cycle => write!(f, "cycle"),
            RuleId::UndeclaredDependency => write!(f, "undeclared-dependency"),
            RuleId::InternalAccess => write!(f, "internal-access"),
        }
    }
}

impl std::str::FromStr for RuleId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "cycle" | "cycles" => Ok(RuleId::Cycle),
            "undeclared-dependency" | "undeclared-dependencies" => {
                Ok(RuleId::UndeclaredDependency)
            }
            "internal-access" => Ok(RuleId::InternalAccess),
            _ => Err(format!("Unknown rule: {}", s)),
        }
    }
}

/// Ordered violations report. Empty means compliant.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Violations {
    entries: Vec<Violation>,
}

impl Violations {
    /// Builds a report in canonical order: rule priority, module, classes.
    pub fn new(mut entries: Vec<Violation>) -> Self {
        entries.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        entries.dedup();
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.entries.iter()
    }

    pub fn of_rule(&self, rule: RuleId) -> impl Iterator<Item = &Violation> {
        self.entries.iter().filter(move |v| v.rule == rule)
    }

    /// `Err(self)` when the report is not empty.
    pub fn into_result(self) -> Result<(), Violations> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl<'a> IntoIterator for &'a Violations {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "- {}", violation)?;
        }
        Ok(())
    }
}

impl std::error::Error for Violations {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_closes_the_loop() {
        let v = Violation::cycle(vec!["a".into(), "b".into(), "c".into()]);
        assert_eq!(v.message, "Cycle detected: a -> b -> c -> a");
        assert_eq!(v.modules, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_report_ordering() {
        let report = Violations::new(vec![
            Violation::internal_access("b", "a", "b.X", "a.internal.Y"),
            Violation::internal_access("a", "b", "a.Z", "b.internal.W"),
            Violation::undeclared_dependency("c", "a", "c.Q", "a.P", 1),
            Violation::cycle(vec!["a".into(), "b".into()]),
        ]);

        let order: Vec<_> = report
            .iter()
            .map(|v| (v.rule, v.modules[0].as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                (RuleId::Cycle, "a"),
                (RuleId::UndeclaredDependency, "c"),
                (RuleId::InternalAccess, "a"),
                (RuleId::InternalAccess, "b"),
            ]
        );
    }

    #[test]
    fn test_into_result() {
        assert!(Violations::default().into_result().is_ok());

        let report = Violations::new(vec![Violation::cycle(vec!["a".into(), "b".into()])]);
        let err = report.into_result().unwrap_err();
        assert!(err.to_string().contains("[cycle] Cycle detected: a -> b -> a"));
    }

    #[test]
    fn test_rule_id_parsing() {
        assert_eq!("cycles".parse::<RuleId>().unwrap(), RuleId::Cycle);
        assert_eq!(
            "internal_access".parse::<RuleId>().unwrap(),
            RuleId::InternalAccess
        );
        assert!("bogus".parse::<RuleId>().is_err());
    }
}
