//! Module model behavior on a jMolecules/Spring style package.

use modbound::config::default_markers;
use modbound::model::{
    ApplicationModule, ClassDescriptor, ClassGraph, Marker, MarkerSet, ModuleDefinition,
    ModuleError,
};

const PACKAGE: &str = "com.acme.withatbean";

fn classes() -> ClassGraph {
    ClassGraph::new(vec![
        ClassDescriptor::new("com.acme.withatbean.SampleAggregate")
            .with_interface("org.jmolecules.ddd.types.AggregateRoot")
            .with_call(
                "com.acme.withatbean.SampleAggregate",
                "registerEvent",
                &["com.acme.withatbean.TestEvents$JMoleculesAnnotated"],
            ),
        ClassDescriptor::new("com.acme.withatbean.SampleComponent")
            .with_annotation("org.springframework.stereotype.Component")
            .with_reference("javax.sql.DataSource")
            .with_call(
                "org.springframework.context.ApplicationEventPublisher",
                "publishEvent",
                &[
                    "com.acme.withatbean.TestEvents$JMoleculesImplementing",
                    "java.lang.String",
                ],
            )
            .with_call(
                "org.springframework.context.ApplicationEventPublisher",
                "publishEvent",
                &["com.acme.withatbean.TestEvents$JMoleculesAnnotated"],
            ),
        ClassDescriptor::new("com.acme.withatbean.TestEvents$JMoleculesAnnotated")
            .with_annotation("org.jmolecules.event.annotation.DomainEvent"),
        ClassDescriptor::new("com.acme.withatbean.TestEvents$JMoleculesImplementing")
            .with_interface("org.jmolecules.event.types.DomainEvent"),
        ClassDescriptor::new("com.acme.withatbean.TestEvents$NotAnEvent"),
    ])
    .unwrap()
}

fn markers() -> MarkerSet {
    let mut markers = default_markers();
    markers.component = markers.component.named(["javax.sql.DataSource"]);
    markers
}

#[test]
fn test_considers_external_beans() {
    let classes = classes();
    let markers = markers();
    let module =
        ApplicationModule::new(&classes, ModuleDefinition::new(PACKAGE), &markers, false).unwrap();

    let beans: Vec<_> = module
        .beans()
        .iter()
        .map(|b| (b.fully_qualified_type_name(), b.is_external()))
        .collect();

    assert!(beans.contains(&("javax.sql.DataSource", true)), "{:?}", beans);
    assert!(classes.get("javax.sql.DataSource").is_none());
    assert!(beans.contains(&("com.acme.withatbean.SampleComponent", false)));
}

#[test]
fn test_discovers_published_events() {
    let classes = classes();
    let markers = markers();
    let module =
        ApplicationModule::new(&classes, ModuleDefinition::new(PACKAGE), &markers, true).unwrap();

    let mut events: Vec<_> = module
        .published_events()
        .iter()
        .map(|e| e.event_type().name.as_str())
        .collect();
    events.sort();
    assert_eq!(
        events,
        vec![
            "com.acme.withatbean.TestEvents$JMoleculesAnnotated",
            "com.acme.withatbean.TestEvents$JMoleculesImplementing",
        ]
    );

    let annotated = module
        .published_events()
        .iter()
        .find(|e| e.event_type().simple_name() == "TestEvents$JMoleculesAnnotated")
        .unwrap();
    assert_eq!(annotated.sources().len(), 2);
}

#[test]
fn test_uses_capitalized_name_as_display_name() {
    let classes = classes();
    let markers = markers();
    let module =
        ApplicationModule::new(&classes, ModuleDefinition::new(PACKAGE), &markers, false).unwrap();

    assert_eq!(module.name(), "withatbean");
    assert_eq!(module.display_name(), "Withatbean");
}

#[test]
fn test_detects_aggregates() {
    let classes = classes();
    let markers = markers();
    let module =
        ApplicationModule::new(&classes, ModuleDefinition::new(PACKAGE), &markers, false).unwrap();

    let roots: Vec<_> = module.aggregate_roots().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(roots, vec!["com.acme.withatbean.SampleAggregate"]);
}

#[test]
fn test_lazy_and_eager_views_agree() {
    let classes = classes();
    let markers = markers();
    let lazy =
        ApplicationModule::new(&classes, ModuleDefinition::new(PACKAGE), &markers, false).unwrap();
    let eager =
        ApplicationModule::new(&classes, ModuleDefinition::new(PACKAGE), &markers, true).unwrap();

    let names = |m: &ApplicationModule<'_>| -> Vec<String> {
        m.exposed_types().iter().map(|c| c.name.clone()).collect()
    };
    assert_eq!(names(&lazy), names(&eager));
    assert_eq!(lazy.beans().len(), eager.beans().len());
}

#[test]
fn test_custom_predicate_marker() {
    let classes = classes();
    let mut markers = MarkerSet::default();
    markers.aggregate_root = Marker::new().with_predicate(|c| c.simple_name().starts_with("Sample"));

    let module =
        ApplicationModule::new(&classes, ModuleDefinition::new(PACKAGE), &markers, false).unwrap();
    assert_eq!(module.aggregate_roots().len(), 2);
    assert!(module.published_events().is_empty());
}

#[test]
fn test_empty_and_invalid_packages() {
    let classes = classes();
    let markers = markers();

    assert!(matches!(
        ApplicationModule::new(&classes, ModuleDefinition::new("com.acme.missing"), &markers, false),
        Err(ModuleError::EmptyModule(_))
    ));
    assert!(matches!(
        ApplicationModule::new(&classes, ModuleDefinition::new("com..acme"), &markers, false),
        Err(ModuleError::InvalidBasePackage(_))
    ));
}
