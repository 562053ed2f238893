use super::class::{ClassDescriptor, is_valid_package};
use super::classes::{ClassGraph, ClassGraphError};
use super::marker::MarkerSet;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("Module base package {0} does not contain any classes")]
    EmptyModule(String),
    #[error("Invalid module base package: '{0}'")]
    InvalidBasePackage(String),
    #[error("Duplicate module name {name} ({first} and {second})")]
    DuplicateName {
        name: String,
        first: String,
        second: String,
    },
    #[error(transparent)]
    Classes(#[from] ClassGraphError),
}

/// Construction input for an [`ApplicationModule`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDefinition {
    pub base_package: String,
    #[serde(default)]
    pub display_name: Option<String>,
    /// Modules this one may depend on. `None` means unrestricted.
    #[serde(default)]
    pub allowed_dependencies: Option<Vec<String>>,
}

impl ModuleDefinition {
    pub fn new(base_package: impl Into<String>) -> Self {
        Self {
            base_package: base_package.into(),
            display_name: None,
            allowed_dependencies: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_allowed_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_dependencies = Some(dependencies.into_iter().map(Into::into).collect());
        self
    }
}

/// A domain event type published by a module, with the classes publishing it.
#[derive(Debug, Clone)]
pub struct EventType<'g> {
    event: &'g ClassDescriptor,
    sources: Vec<&'g ClassDescriptor>,
}

impl<'g> EventType<'g> {
    pub fn event_type(&self) -> &'g ClassDescriptor {
        self.event
    }

    /// Distinct publishing classes, in encounter order.
    pub fn sources(&self) -> &[&'g ClassDescriptor] {
        &self.sources
    }
}

/// A bean-like component used by a module.
#[derive(Debug, Clone, Copy)]
pub struct Bean<'g> {
    name: &'g str,
    descriptor: Option<&'g ClassDescriptor>,
    external: bool,
}

impl<'g> Bean<'g> {
    /// `None` for beans provided from outside the analyzed classes.
    pub fn descriptor(&self) -> Option<&'g ClassDescriptor> {
        self.descriptor
    }

    pub fn fully_qualified_type_name(&self) -> &'g str {
        self.name
    }

    /// Defined outside the module but referenced from within it.
    pub fn is_external(&self) -> bool {
        self.external
    }
}

/// One bounded module: a base package and every class underneath it.
///
/// Derived views are computed on first access and memoized; with `eager`
/// construction they are computed up front.
#[derive(Debug)]
pub struct ApplicationModule<'g> {
    classes: &'g ClassGraph,
    markers: &'g MarkerSet,
    definition: ModuleDefinition,
    name: String,
    members: Vec<&'g ClassDescriptor>,
    member_names: HashSet<&'g str>,
    exposed: OnceLock<Vec<&'g ClassDescriptor>>,
    aggregate_roots: OnceLock<Vec<&'g ClassDescriptor>>,
    published_events: OnceLock<Vec<EventType<'g>>>,
    beans: OnceLock<Vec<Bean<'g>>>,
}

impl<'g> ApplicationModule<'g> {
    pub fn new(
        classes: &'g ClassGraph,
        definition: ModuleDefinition,
        markers: &'g MarkerSet,
        eager: bool,
    ) -> Result<Self, ModuleError> {
        let base = definition.base_package.as_str();
        if !is_valid_package(base) {
            return Err(ModuleError::InvalidBasePackage(base.to_string()));
        }

        let members = match classes.classes_in(base) {
            Ok(members) => members,
            Err(ClassGraphError::NotFound(package)) => {
                return Err(ModuleError::EmptyModule(package));
            }
            Err(e) => return Err(e.into()),
        };

        let name = base.rsplit('.').next().unwrap_or(base).to_string();
        let member_names = members.iter().map(|c| c.name.as_str()).collect();

        let module = Self {
            classes,
            markers,
            definition,
            name,
            members,
            member_names,
            exposed: OnceLock::new(),
            aggregate_roots: OnceLock::new(),
            published_events: OnceLock::new(),
            beans: OnceLock::new(),
        };

        if eager {
            module.exposed_types();
            module.aggregate_roots();
            module.published_events();
            module.beans();
        }

        Ok(module)
    }

    /// Last segment of the base package.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_package(&self) -> &str {
        &self.definition.base_package
    }

    pub fn definition(&self) -> &ModuleDefinition {
        &self.definition
    }

    pub fn display_name(&self) -> String {
        match &self.definition.display_name {
            Some(name) => name.clone(),
            None => capitalize(&self.name),
        }
    }

    pub fn allowed_dependencies(&self) -> Option<&[String]> {
        self.definition.allowed_dependencies.as_deref()
    }

    /// Whether `other` appears in this module's allowed-dependency list,
    /// by module name or base package. Unrestricted modules allow everything.
    pub fn allows_dependency_on(&self, other: &ApplicationModule<'_>) -> bool {
        match self.allowed_dependencies() {
            None => true,
            Some(allowed) => allowed
                .iter()
                .any(|a| a == other.name() || a == other.base_package()),
        }
    }

    pub fn classes(&self) -> &[&'g ClassDescriptor] {
        &self.members
    }

    pub fn contains(&self, class_name: &str) -> bool {
        self.member_names.contains(class_name)
    }

    /// Public members living directly in the base package, carrying the
    /// exposed marker, or being components.
    pub fn exposed_types(&self) -> &[&'g ClassDescriptor] {
        self.exposed.get_or_init(|| {
            self.members
                .iter()
                .copied()
                .filter(|c| c.is_public())
                .filter(|c| {
                    c.package == self.definition.base_package
                        || self.markers.exposed.matches(c, self.classes)
                        || self.markers.component.matches(c, self.classes)
                })
                .collect()
        })
    }

    pub fn is_exposed(&self, class_name: &str) -> bool {
        self.exposed_types().iter().any(|c| c.name == class_name)
    }

    pub fn aggregate_roots(&self) -> &[&'g ClassDescriptor] {
        self.aggregate_roots.get_or_init(|| {
            self.members
                .iter()
                .copied()
                .filter(|c| self.markers.aggregate_root.matches(c, self.classes))
                .collect()
        })
    }

    pub fn published_events(&self) -> &[EventType<'g>] {
        self.published_events
            .get_or_init(|| self.detect_published_events())
    }

    pub fn beans(&self) -> &[Bean<'g>] {
        self.beans.get_or_init(|| self.detect_beans())
    }

    fn detect_published_events(&self) -> Vec<EventType<'g>> {
        let mut events: Vec<EventType<'g>> = Vec::new();

        for &source in &self.members {
            let published = source
                .calls
                .iter()
                .filter(|call| self.markers.is_publish_call(call))
                .flat_map(|call| call.argument_types.iter())
                .filter_map(|arg| self.classes.get(arg))
                .filter(|arg| self.markers.domain_event.matches(arg, self.classes));

            for event in published {
                match events.iter_mut().find(|e| e.event.name == event.name) {
                    Some(existing) => {
                        if !existing.sources.iter().any(|s| s.name == source.name) {
                            existing.sources.push(source);
                        }
                    }
                    None => events.push(EventType {
                        event,
                        sources: vec![source],
                    }),
                }
            }
        }

        events
    }

    fn detect_beans(&self) -> Vec<Bean<'g>> {
        let component = &self.markers.component;
        let mut seen = HashSet::new();
        let mut beans = Vec::new();

        for &class in &self.members {
            if component.matches(class, self.classes) && seen.insert(class.name.as_str()) {
                beans.push(Bean {
                    name: class.name.as_str(),
                    descriptor: Some(class),
                    external: false,
                });
            }
        }

        for class in &self.members {
            for referenced in class.references.iter().filter(|r| !self.contains(r)) {
                let descriptor = self.classes.get(referenced);
                let is_bean = match descriptor {
                    Some(target) => component.matches(target, self.classes),
                    // Unresolved references can only be named explicitly
                    None => component.names(referenced),
                };
                if is_bean && seen.insert(referenced.as_str()) {
                    beans.push(Bean {
                        name: referenced.as_str(),
                        descriptor,
                        external: true,
                    });
                }
            }
        }

        beans
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().chain(chars).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Marker, PublishMethod};

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("withatbean"), "Withatbean");
        assert_eq!(capitalize("oRDER"), "ORDER");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_rejects_empty_module() {
        let classes = ClassGraph::new(vec![ClassDescriptor::new("com.acme.order.Order")]).unwrap();
        let markers = MarkerSet::default();

        let result =
            ApplicationModule::new(&classes, ModuleDefinition::new("com.acme.billing"), &markers, false);
        assert!(matches!(result, Err(ModuleError::EmptyModule(p)) if p == "com.acme.billing"));

        let result = ApplicationModule::new(&classes, ModuleDefinition::new(""), &markers, false);
        assert!(matches!(result, Err(ModuleError::InvalidBasePackage(_))));
    }

    #[test]
    fn test_display_name_override() {
        let classes = ClassGraph::new(vec![ClassDescriptor::new("com.acme.order.Order")]).unwrap();
        let markers = MarkerSet::default();
        let module = ApplicationModule::new(
            &classes,
            ModuleDefinition::new("com.acme.order").with_display_name("Orders"),
            &markers,
            true,
        )
        .unwrap();

        assert_eq!(module.name(), "order");
        assert_eq!(module.display_name(), "Orders");
    }

    #[test]
    fn test_exposed_types() {
        let classes = ClassGraph::new(vec![
            ClassDescriptor::new("com.acme.order.OrderApi"),
            ClassDescriptor::new("com.acme.order.Hidden").with_visibility(crate::model::Visibility::Package),
            ClassDescriptor::new("com.acme.order.internal.Impl"),
            ClassDescriptor::new("com.acme.order.internal.Service").with_annotation("x.Component"),
            ClassDescriptor::new("com.acme.order.spi.Hook").with_annotation("x.NamedInterface"),
        ])
        .unwrap();
        let markers = MarkerSet {
            component: Marker::new().annotated(["x.Component"]),
            exposed: Marker::new().annotated(["x.NamedInterface"]),
            ..Default::default()
        };
        let module =
            ApplicationModule::new(&classes, ModuleDefinition::new("com.acme.order"), &markers, false)
                .unwrap();

        assert!(module.is_exposed("com.acme.order.OrderApi"));
        assert!(!module.is_exposed("com.acme.order.Hidden"));
        assert!(!module.is_exposed("com.acme.order.internal.Impl"));
        assert!(module.is_exposed("com.acme.order.internal.Service"));
        assert!(module.is_exposed("com.acme.order.spi.Hook"));
    }

    #[test]
    fn test_published_events_deduplicate_sources() {
        let classes = ClassGraph::new(vec![
            ClassDescriptor::new("com.acme.order.Created").with_annotation("x.DomainEvent"),
            ClassDescriptor::new("com.acme.order.Service")
                .with_call("x.Publisher", "publish", &["com.acme.order.Created"])
                .with_call("x.Publisher", "publish", &["com.acme.order.Created"]),
            ClassDescriptor::new("com.acme.order.Other")
                .with_call("x.Publisher", "log", &["com.acme.order.Created"]),
        ])
        .unwrap();
        let markers = MarkerSet {
            domain_event: Marker::new().annotated(["x.DomainEvent"]),
            publish_methods: vec![PublishMethod::parse("publish")],
            ..Default::default()
        };
        let module =
            ApplicationModule::new(&classes, ModuleDefinition::new("com.acme.order"), &markers, false)
                .unwrap();

        let events = module.published_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type().name, "com.acme.order.Created");
        assert_eq!(events[0].sources().len(), 1);
        assert_eq!(events[0].sources()[0].name, "com.acme.order.Service");
    }

    #[test]
    fn test_external_beans_include_unresolved_named_types() {
        let classes = ClassGraph::new(vec![
            ClassDescriptor::new("com.acme.order.OrderService")
                .with_reference("javax.sql.DataSource")
                .with_reference("java.util.List")
                .with_reference("com.acme.shared.Clock"),
            ClassDescriptor::new("com.acme.shared.Clock").with_annotation("x.Component"),
        ])
        .unwrap();
        let markers = MarkerSet {
            component: Marker::new()
                .annotated(["x.Component"])
                .named(["javax.sql.DataSource"]),
            ..Default::default()
        };
        let module =
            ApplicationModule::new(&classes, ModuleDefinition::new("com.acme.order"), &markers, false)
                .unwrap();

        let beans: Vec<_> = module
            .beans()
            .iter()
            .map(|b| (b.fully_qualified_type_name(), b.is_external(), b.descriptor().is_some()))
            .collect();
        assert_eq!(
            beans,
            vec![
                ("com.acme.shared.Clock", true, true),
                ("javax.sql.DataSource", true, false),
            ]
        );
    }

    #[test]
    fn test_aggregate_roots_exclude_marked_classes_of_other_modules() {
        let classes = ClassGraph::new(vec![
            ClassDescriptor::new("com.acme.order.Order").with_interface("x.AggregateRoot"),
            ClassDescriptor::new("com.acme.order.OrderLine"),
            ClassDescriptor::new("com.acme.inventory.Stock").with_interface("x.AggregateRoot"),
        ])
        .unwrap();
        let markers = MarkerSet {
            aggregate_root: Marker::new().implementing(["x.AggregateRoot"]),
            ..Default::default()
        };
        let module =
            ApplicationModule::new(&classes, ModuleDefinition::new("com.acme.order"), &markers, false)
                .unwrap();

        let roots: Vec<_> = module.aggregate_roots().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(roots, vec!["com.acme.order.Order"]);
    }

    #[test]
    fn test_allowed_dependencies_match_name_or_package() {
        let classes = ClassGraph::new(vec![
            ClassDescriptor::new("com.acme.order.Order"),
            ClassDescriptor::new("com.acme.inventory.Stock"),
            ClassDescriptor::new("com.acme.billing.Invoice"),
        ])
        .unwrap();
        let markers = MarkerSet::default();
        let module = |def: ModuleDefinition| {
            ApplicationModule::new(&classes, def, &markers, false).unwrap()
        };

        let order = module(
            ModuleDefinition::new("com.acme.order")
                .with_allowed_dependencies(["inventory", "com.acme.billing"]),
        );
        let inventory = module(ModuleDefinition::new("com.acme.inventory"));
        let billing = module(ModuleDefinition::new("com.acme.billing"));
        let restricted = module(
            ModuleDefinition::new("com.acme.billing").with_allowed_dependencies(Vec::<String>::new()),
        );

        assert!(order.allows_dependency_on(&inventory));
        assert!(order.allows_dependency_on(&billing));
        assert!(inventory.allows_dependency_on(&order));
        assert!(!restricted.allows_dependency_on(&order));
    }
}
