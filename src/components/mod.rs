//! Components - named renderables that content documents can embed
//!
//! A document written as `<Alert type="warning">Careful</Alert>` asks the
//! active [`Registry`] for `Alert` and hands it the props and the rendered
//! children. Components come from two scopes: global (built-ins plus the
//! site's `components/` directory) and local (the article's own
//! `components/` directory).

mod builtin;
mod registry;
mod template;

pub use builtin::{builtin_components, Alert, CodeBlock, Details, Tweet, YouTube};
pub use registry::{MissingComponent, Registry, Scope};
pub use template::{load_template_dir, TemplateComponent};

use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Props passed to a component, in source order
pub type Props = IndexMap<String, String>;

/// Shared handle to a component
pub type ComponentRef = Arc<dyn Component>;

/// Something a document can embed by name
pub trait Component: fmt::Debug + Send + Sync {
    /// Render to HTML. `children` is already-rendered HTML.
    fn render(&self, props: &Props, children: &str) -> String;
}

/// A name → component mapping for one scope
#[derive(Debug, Clone, Default)]
pub struct ComponentSet {
    entries: IndexMap<String, ComponentRef>,
}

impl ComponentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component, replacing any previous one of the same name
    pub fn insert(&mut self, name: impl Into<String>, component: ComponentRef) {
        self.entries.insert(name.into(), component);
    }

    /// Builder-style [`ComponentSet::insert`]
    pub fn with(mut self, name: impl Into<String>, component: ComponentRef) -> Self {
        self.insert(name, component);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ComponentRef> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ComponentRef)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy every entry of `other` on top of this set
    pub fn extend_from(&mut self, other: &ComponentSet) {
        for (name, component) in other.iter() {
            self.insert(name, Arc::clone(component));
        }
    }
}

/// Sets are equal when they bind the same names to the same component instances
impl PartialEq for ComponentSet {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self.entries.iter().all(|(name, component)| {
                other
                    .entries
                    .get(name)
                    .is_some_and(|c| Arc::ptr_eq(c, component))
            })
    }
}
