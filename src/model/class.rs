use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Pre-extracted metadata of one class, as produced by an external
/// bytecode or source analyzer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassDescriptor {
    /// Fully-qualified name, e.g. `com.acme.order.Order`.
    pub name: String,
    /// Derived from `name` when absent.
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub annotations: BTreeSet<String>,
    #[serde(default)]
    pub superclass: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    /// Names of all classes this class refers to directly.
    #[serde(default)]
    pub references: BTreeSet<String>,
    #[serde(default)]
    pub visibility: Visibility,
    /// Method calls made from this class's methods and constructors.
    #[serde(default)]
    pub calls: Vec<CallSite>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CallSite {
    /// Class declaring the invoked method.
    pub owner: String,
    pub method: String,
    /// Static types of the arguments handed to the call.
    #[serde(default)]
    pub argument_types: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Package,
    Private,
}

impl ClassDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let package = package_of(&name).to_string();

        Self {
            name,
            package,
            annotations: BTreeSet::new(),
            superclass: None,
            interfaces: Vec::new(),
            references: BTreeSet::new(),
            visibility: Visibility::Public,
            calls: Vec::new(),
        }
    }

    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotations.insert(annotation.into());
        self
    }

    pub fn with_superclass(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn with_reference(mut self, target: impl Into<String>) -> Self {
        self.references.insert(target.into());
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Records a call site. Argument types are also recorded as references.
    pub fn with_call(mut self, owner: &str, method: &str, argument_types: &[&str]) -> Self {
        self.references.insert(owner.to_string());
        for arg in argument_types {
            self.references.insert(arg.to_string());
        }
        self.calls.push(CallSite {
            owner: owner.to_string(),
            method: method.to_string(),
            argument_types: argument_types.iter().map(|s| s.to_string()).collect(),
        });
        self
    }

    /// Name without the package, nested classes keep their `$` separator.
    pub fn simple_name(&self) -> &str {
        self.name
            .strip_prefix(&self.package)
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(&self.name)
    }

    /// Direct supertypes: superclass first, then interfaces in declaration order.
    pub fn supertypes(&self) -> impl Iterator<Item = &str> {
        self.superclass
            .iter()
            .map(String::as_str)
            .chain(self.interfaces.iter().map(String::as_str))
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    /// Whether the class lives in `package` or one of its sub-packages.
    pub fn resides_in(&self, package: &str) -> bool {
        is_in_package(&self.package, package)
    }
}

/// Package part of a fully-qualified class name.
pub fn package_of(name: &str) -> &str {
    name.rfind('.').map(|pos| &name[..pos]).unwrap_or("")
}

/// `candidate` equals `package` or is one of its sub-packages.
pub fn is_in_package(candidate: &str, package: &str) -> bool {
    candidate == package
        || (candidate.starts_with(package) && candidate[package.len()..].starts_with('.'))
}

/// A package name is well formed when it is non-empty and has no empty segments.
pub fn is_valid_package(package: &str) -> bool {
    !package.is_empty() && package.split('.').all(|segment| !segment.is_empty())
}
