//! Name → reference registry for built entry points.

use std::collections::BTreeMap;
use tracing::warn;

/// Registry of entry-point names and the references that launch them.
///
/// Registering a name twice replaces the earlier reference.
///
/// # Example
///
/// ```
/// use entrypoint::Registry;
///
/// let mut registry = Registry::new();
/// registry.register("example", "demos:example.invoke");
/// registry.register("example", "demos:other.invoke");
///
/// assert_eq!(registry.len(), 1);
/// assert_eq!(registry.get("example"), Some("demos:other.invoke"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Registry {
    entries: BTreeMap<String, String>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `name → reference`, returning the reference it replaced
    pub fn register(
        &mut self,
        name: impl Into<String>,
        reference: impl Into<String>,
    ) -> Option<String> {
        let name = name.into();
        let reference = reference.into();
        let previous = self.entries.insert(name.clone(), reference.clone());
        if let Some(old) = &previous {
            if *old != reference {
                warn!(name = %name, old = %old, new = %reference, "entry point re-registered");
            }
        }
        previous
    }

    /// Reference registered under `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Whether `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Iterate over `(name, reference)` pairs in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of registered names
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>, R: Into<String>> FromIterator<(N, R)> for Registry {
    fn from_iter<T: IntoIterator<Item = (N, R)>>(iter: T) -> Self {
        let mut registry = Self::new();
        for (name, reference) in iter {
            registry.register(name, reference);
        }
        registry
    }
}
