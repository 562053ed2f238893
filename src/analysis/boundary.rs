use crate::analysis::{ClassDependency, ModuleGraph};
use crate::model::{ClassGraph, Marker, Violation};
use rayon::prelude::*;

/// Accessed types exempt from internal access checks.
#[derive(Debug, Clone, Default)]
pub struct ExtensionPoints {
    /// Type globs: `*` matches within one package segment, `**` across segments.
    pub patterns: Vec<String>,
    pub marker: Marker,
}

impl ExtensionPoints {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
            marker: Marker::default(),
        }
    }

    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.marker = marker;
        self
    }

    pub fn is_extension_point(&self, type_name: &str, classes: &ClassGraph) -> bool {
        self.patterns.iter().any(|p| type_glob_match(p, type_name))
            || classes
                .get(type_name)
                .is_some_and(|c| self.marker.matches(c, classes))
    }
}

/// Flag references into another module's non-exposed types.
pub fn detect_internal_access(
    graph: &ModuleGraph<'_>,
    extension_points: &ExtensionPoints,
) -> Vec<Violation> {
    let modules = graph.modules();
    let classes = graph.classes();

    graph
        .class_dependencies()
        .par_iter()
        .filter(|d| !modules[d.target_module].is_exposed(d.target))
        .filter(|d| !extension_points.is_extension_point(d.target, classes))
        .map(|d: &ClassDependency<'_>| {
            Violation::internal_access(
                modules[d.source_module].name(),
                modules[d.target_module].name(),
                d.source,
                d.target,
            )
        })
        .collect()
}

/// Glob matching over dotted type names, segments separated by `.`.
pub fn type_glob_match(pattern: &str, type_name: &str) -> bool {
    glob_match_recursive(&pattern.replace('.', "/"), &type_name.replace('.', "/"))
}

fn glob_match_recursive(pattern: &str, path: &str) -> bool {
    // Handle ** (match any path segments)
    if let Some(pos) = pattern.find("**") {
        let prefix = &pattern[..pos];
        let suffix = &pattern[pos + 2..];
        let suffix = suffix.strip_prefix('/').unwrap_or(suffix);

        if !prefix.is_empty() && !path.starts_with(prefix) {
            return false;
        }

        let remaining = &path[prefix.len()..];

        if suffix.is_empty() {
            return true;
        }

        // Only resume matching at segment boundaries
        for (i, _) in remaining.char_indices() {
            let at_boundary = i == 0 || remaining[..i].ends_with('/');
            if at_boundary && glob_match_recursive(suffix, &remaining[i..]) {
                return true;
            }
        }
        glob_match_recursive(suffix, "")
    } else if let Some(pos) = pattern.find('*') {
        // Single * never crosses a segment separator
        let prefix = &pattern[..pos];
        let suffix = &pattern[pos + 1..];

        if !path.starts_with(prefix) {
            return false;
        }

        let remaining = &path[prefix.len()..];

        for (i, c) in remaining.char_indices() {
            if c == '/' {
                return glob_match_recursive(suffix, &remaining[i..]);
            }
            if glob_match_recursive(suffix, &remaining[i..]) {
                return true;
            }
        }
        glob_match_recursive(suffix, "")
    } else {
        pattern == path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClassDescriptor, MarkerSet, RuleId, Visibility};
    use std::collections::HashMap;

    #[test]
    fn test_type_glob_match() {
        assert!(type_glob_match("org.springframework.**", "org.springframework.context.Event"));
        assert!(type_glob_match("**.spi.*", "com.acme.order.spi.Hook"));
        assert!(!type_glob_match("**.spi.*", "com.acme.order.nospi.Hook"));
        assert!(type_glob_match("com.acme.*.Api", "com.acme.order.Api"));
        assert!(!type_glob_match("com.acme.*.Api", "com.acme.order.internal.Api"));
        assert!(type_glob_match("com.acme.order.Order", "com.acme.order.Order"));
        assert!(!type_glob_match("com.acme.order.Order", "com.acme.order.OrderLine"));
    }

    fn classes() -> ClassGraph {
        ClassGraph::new(vec![
            ClassDescriptor::new("com.acme.order.Order")
                .with_reference("com.acme.inventory.Stock")
                .with_reference("com.acme.inventory.internal.Levels")
                .with_reference("com.acme.inventory.spi.Hook")
                .with_reference("com.acme.inventory.Hidden"),
            ClassDescriptor::new("com.acme.inventory.Stock"),
            ClassDescriptor::new("com.acme.inventory.Hidden").with_visibility(Visibility::Package),
            ClassDescriptor::new("com.acme.inventory.internal.Levels"),
            ClassDescriptor::new("com.acme.inventory.spi.Hook"),
        ])
        .unwrap()
    }

    #[test]
    fn test_flags_non_exposed_targets() {
        let classes = classes();
        let markers = MarkerSet::default();
        let graph =
            ModuleGraph::discover(&classes, "com.acme", &markers, &HashMap::new(), false).unwrap();

        let mut targets: Vec<_> =
            detect_internal_access(&graph, &ExtensionPoints::default())
                .into_iter()
                .inspect(|v| assert_eq!(v.rule, RuleId::InternalAccess))
                .filter_map(|v| v.target)
                .collect();
        targets.sort();

        assert_eq!(
            targets,
            vec![
                "com.acme.inventory.Hidden",
                "com.acme.inventory.internal.Levels",
                "com.acme.inventory.spi.Hook",
            ]
        );
    }

    #[test]
    fn test_extension_points_are_exempt() {
        let classes = classes();
        let markers = MarkerSet::default();
        let graph =
            ModuleGraph::discover(&classes, "com.acme", &markers, &HashMap::new(), false).unwrap();
        let extension_points = ExtensionPoints::new(["**.spi.*"])
            .with_marker(Marker::new().named(["com.acme.inventory.Hidden"]));

        let violations = detect_internal_access(&graph, &extension_points);
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].target.as_deref(),
            Some("com.acme.inventory.internal.Levels")
        );
        assert_eq!(violations[0].modules, vec!["order", "inventory"]);
    }
}
