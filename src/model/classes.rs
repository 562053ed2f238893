use super::class::{ClassDescriptor, is_in_package, is_valid_package, package_of};
use super::marker::Marker;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClassGraphError {
    #[error("No classes found in package {0}")]
    NotFound(String),
    #[error("Unknown class: {0}")]
    UnknownClass(String),
    #[error("Invalid package name: '{0}'")]
    InvalidPackage(String),
    #[error("Duplicate class descriptor: {0}")]
    DuplicateClass(String),
    #[error("Failed to parse class metadata: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Immutable, queryable index over all classes of an analyzed codebase.
///
/// Enumeration order is the order the descriptors were handed in.
#[derive(Debug, Clone, Default)]
pub struct ClassGraph {
    classes: Vec<ClassDescriptor>,
    by_name: HashMap<String, usize>,
}

impl ClassGraph {
    pub fn new(mut classes: Vec<ClassDescriptor>) -> Result<Self, ClassGraphError> {
        let mut by_name = HashMap::with_capacity(classes.len());

        for (idx, class) in classes.iter_mut().enumerate() {
            if class.package.is_empty() {
                class.package = package_of(&class.name).to_string();
            }
            if by_name.insert(class.name.clone(), idx).is_some() {
                return Err(ClassGraphError::DuplicateClass(class.name.clone()));
            }
        }

        Ok(Self { classes, by_name })
    }

    /// Parse a JSON array of class descriptors.
    pub fn from_json(json: &str) -> Result<Self, ClassGraphError> {
        let classes: Vec<ClassDescriptor> = serde_json::from_str(json)?;
        Self::new(classes)
    }

    pub fn get(&self, name: &str) -> Option<&ClassDescriptor> {
        self.by_name.get(name).map(|idx| &self.classes[*idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassDescriptor> {
        self.classes.iter()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// All classes in `prefix` or its sub-packages.
    ///
    /// An empty match is reported as `NotFound`; callers doing optional
    /// lookups should treat that as an empty result.
    pub fn classes_in(&self, prefix: &str) -> Result<Vec<&ClassDescriptor>, ClassGraphError> {
        if !is_valid_package(prefix) {
            return Err(ClassGraphError::InvalidPackage(prefix.to_string()));
        }

        let matches: Vec<_> = self
            .classes
            .iter()
            .filter(|c| is_in_package(&c.package, prefix))
            .collect();

        if matches.is_empty() {
            return Err(ClassGraphError::NotFound(prefix.to_string()));
        }

        Ok(matches)
    }

    /// Referenced classes of `name` that resolve inside the graph.
    pub fn references_of(&self, name: &str) -> Result<Vec<&ClassDescriptor>, ClassGraphError> {
        let class = self
            .get(name)
            .ok_or_else(|| ClassGraphError::UnknownClass(name.to_string()))?;

        Ok(class
            .references
            .iter()
            .filter(|r| *r != name)
            .filter_map(|r| self.get(r))
            .collect())
    }

    /// Referenced names of `name` that are outside the analysis scope.
    pub fn external_references_of(&self, name: &str) -> Result<Vec<&str>, ClassGraphError> {
        let class = self
            .get(name)
            .ok_or_else(|| ClassGraphError::UnknownClass(name.to_string()))?;

        Ok(class
            .references
            .iter()
            .filter(|r| !self.contains(r))
            .map(String::as_str)
            .collect())
    }

    pub fn annotated_with(&self, annotation: &str) -> Vec<&ClassDescriptor> {
        self.classes
            .iter()
            .filter(|c| c.annotations.contains(annotation))
            .collect()
    }

    /// Classes extending or implementing `supertype`, transitively.
    pub fn assignable_to(&self, supertype: &str) -> Vec<&ClassDescriptor> {
        self.classes
            .iter()
            .filter(|c| self.is_assignable_to(c, supertype))
            .collect()
    }

    pub fn matching(&self, marker: &Marker) -> Vec<&ClassDescriptor> {
        self.classes
            .iter()
            .filter(|c| marker.matches(c, self))
            .collect()
    }

    /// Whether `class` extends or implements `supertype`, directly or through
    /// supertypes known to the graph. Unresolved supertypes end the walk.
    pub fn is_assignable_to(&self, class: &ClassDescriptor, supertype: &str) -> bool {
        let mut pending: Vec<&str> = class.supertypes().collect();
        let mut seen = HashSet::new();

        while let Some(current) = pending.pop() {
            if current == supertype {
                return true;
            }
            if !seen.insert(current) {
                continue;
            }
            if let Some(parent) = self.get(current) {
                pending.extend(parent.supertypes());
            }
        }

        false
    }
}
