//! Extension registry
//!
//! The registry maps extension keys to descriptors. The built-in registry is
//! assembled from an explicit registration table once per process and then
//! shared; tests build their own.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use super::descriptor::ExtensionDescriptor;
use crate::builtin;
use crate::hooks::HookPoint;

/// Registry of known extensions, in registration order
#[derive(Debug, Default)]
pub struct ExtensionRegistry {
    descriptors: Vec<ExtensionDescriptor>,
    index: HashMap<&'static str, usize>,
}

impl ExtensionRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared registry of built-in extensions.
    pub fn builtin() -> Arc<ExtensionRegistry> {
        static BUILTIN: OnceLock<Arc<ExtensionRegistry>> = OnceLock::new();
        BUILTIN
            .get_or_init(|| {
                let mut registry = Self::new();
                builtin::register_all(&mut registry);
                tracing::trace!(extensions = registry.len(), "Built extension registry");
                Arc::new(registry)
            })
            .clone()
    }

    /// Register an extension, replacing any with the same key.
    pub fn register(&mut self, descriptor: ExtensionDescriptor) {
        match self.index.get(descriptor.key()) {
            Some(&position) => self.descriptors[position] = descriptor,
            None => {
                self.index.insert(descriptor.key(), self.descriptors.len());
                self.descriptors.push(descriptor);
            }
        }
    }

    /// Look up an extension by key.
    pub fn get(&self, key: &str) -> Option<&ExtensionDescriptor> {
        self.index.get(key).map(|&position| &self.descriptors[position])
    }

    /// Check if an extension is known.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Whether extension `key` has a handler for `hook`.
    pub fn handles(&self, key: &str, hook: HookPoint) -> bool {
        self.get(key).is_some_and(|descriptor| descriptor.handles(hook))
    }

    /// All extension keys, in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.descriptors.iter().map(ExtensionDescriptor::key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExtensionDescriptor> {
        self.descriptors.iter()
    }

    /// Number of registered extensions.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
