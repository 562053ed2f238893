use super::class::{CallSite, ClassDescriptor};
use super::classes::ClassGraph;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Custom class predicate registered on a [`Marker`].
pub type ClassPredicate = Arc<dyn Fn(&ClassDescriptor) -> bool + Send + Sync>;

/// A capability check over a class descriptor.
///
/// A class carries the marker when any of the following holds:
/// - it is one of the explicitly named `types`
/// - it carries one of the `annotations`
/// - it is assignable to one of the `supertypes` (checked transitively
///   through the class graph)
/// - one of the registered predicates accepts it
///
/// An empty marker matches nothing.
#[derive(Clone, Default)]
pub struct Marker {
    annotations: BTreeSet<String>,
    supertypes: BTreeSet<String>,
    types: BTreeSet<String>,
    predicates: Vec<ClassPredicate>,
}

impl Marker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn annotated<I, S>(mut self, annotations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.annotations
            .extend(annotations.into_iter().map(Into::into));
        self
    }

    pub fn implementing<I, S>(mut self, supertypes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supertypes.extend(supertypes.into_iter().map(Into::into));
        self
    }

    pub fn named<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types.extend(types.into_iter().map(Into::into));
        self
    }

    pub fn with_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&ClassDescriptor) -> bool + Send + Sync + 'static,
    {
        self.predicates.push(Arc::new(predicate));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
            && self.supertypes.is_empty()
            && self.types.is_empty()
            && self.predicates.is_empty()
    }

    /// Whether `name` is one of the explicitly named types. The only check
    /// available for types outside the class graph.
    pub fn names(&self, name: &str) -> bool {
        self.types.contains(name)
    }

    pub fn matches(&self, class: &ClassDescriptor, classes: &ClassGraph) -> bool {
        self.types.contains(&class.name)
            || class
                .annotations
                .iter()
                .any(|a| self.annotations.contains(a))
            || self
                .supertypes
                .iter()
                .any(|s| classes.is_assignable_to(class, s))
            || self.predicates.iter().any(|p| p(class))
    }
}

impl fmt::Debug for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Marker")
            .field("annotations", &self.annotations)
            .field("supertypes", &self.supertypes)
            .field("types", &self.types)
            .field("predicates", &self.predicates.len())
            .finish()
    }
}

/// A publish-style operation, written `method` or `owner#method`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishMethod {
    pub owner: Option<String>,
    pub method: String,
}

impl PublishMethod {
    pub fn parse(spec: &str) -> Self {
        match spec.split_once('#') {
            Some((owner, method)) => Self {
                owner: Some(owner.to_string()),
                method: method.to_string(),
            },
            None => Self {
                owner: None,
                method: spec.to_string(),
            },
        }
    }

    pub fn matches(&self, call: &CallSite) -> bool {
        call.method == self.method
            && self
                .owner
                .as_deref()
                .is_none_or(|owner| owner == call.owner)
    }
}

/// All markers the module model consults.
#[derive(Debug, Clone, Default)]
pub struct MarkerSet {
    pub aggregate_root: Marker,
    pub domain_event: Marker,
    /// Bean-like components, exposed by definition.
    pub component: Marker,
    /// Explicit public API (named interface) marker.
    pub exposed: Marker,
    pub publish_methods: Vec<PublishMethod>,
}

impl MarkerSet {
    pub fn is_publish_call(&self, call: &CallSite) -> bool {
        self.publish_methods.iter().any(|p| p.matches(call))
    }
}
