//! Lookup of effect descriptors by type id.

use std::collections::HashMap;

use lazy_static::lazy_static;

use super::builtins;
use crate::descriptor::{EffectDescriptor, EffectId};

lazy_static! {
    static ref BUILTIN: EffectRegistry = EffectRegistry::with_builtins();
}

/// Registry of effect descriptors.
///
/// Tracks which effect types can be constructed by id, e.g. through
/// [`Effect::create`](crate::effect::Effect::create) or when a backend needs
/// the defaults of a native effect type.
#[derive(Debug, Default)]
pub struct EffectRegistry {
    descriptors: HashMap<EffectId, &'static EffectDescriptor>,
}

impl EffectRegistry {
    /// Creates a new empty effect registry.
    pub fn new() -> Self {
        Self {
            descriptors: HashMap::new(),
        }
    }

    /// Creates a registry holding every built-in effect type.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for &descriptor in builtins::ALL {
            registry.register(descriptor);
        }
        registry
    }

    /// The shared registry of built-in effect types.
    pub fn builtin() -> &'static EffectRegistry {
        &BUILTIN
    }

    /// Registers an effect type.
    ///
    /// Multiple calls with the same effect type are ignored; returns `false`
    /// if the id was already taken.
    pub fn register(&mut self, descriptor: &'static EffectDescriptor) -> bool {
        if self.descriptors.contains_key(&descriptor.id) {
            return false;
        }

        self.descriptors.insert(descriptor.id, descriptor);
        true
    }

    /// Checks if an effect type has been registered.
    pub fn is_registered(&self, id: EffectId) -> bool {
        self.descriptors.contains_key(&id)
    }

    /// Removes an effect type, returning its descriptor.
    pub fn unregister(&mut self, id: EffectId) -> Option<&'static EffectDescriptor> {
        self.descriptors.remove(&id)
    }

    pub fn clear(&mut self) {
        self.descriptors.clear();
    }

    pub fn get(&self, id: EffectId) -> Option<&'static EffectDescriptor> {
        self.descriptors.get(&id).copied()
    }

    /// Finds a descriptor by its display name, ignoring ASCII case.
    pub fn find_by_name(&self, name: &str) -> Option<&'static EffectDescriptor> {
        self.descriptors
            .values()
            .copied()
            .find(|descriptor| descriptor.name.eq_ignore_ascii_case(name))
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static EffectDescriptor> + '_ {
        self.descriptors.values().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{CrossFade, GaussianBlur};

    #[test]
    fn builtin_registry_knows_every_builtin() {
        let registry = EffectRegistry::builtin();
        assert_eq!(registry.len(), builtins::ALL.len());
        assert!(registry.is_registered(GaussianBlur::ID));
        assert_eq!(
            registry.find_by_name("crossfade").map(|d| d.id),
            Some(CrossFade::ID)
        );
    }

    #[test]
    fn duplicate_registration_is_ignored() {
        let mut registry = EffectRegistry::new();
        assert!(registry.register(GaussianBlur::descriptor()));
        assert!(!registry.register(GaussianBlur::descriptor()));
        assert_eq!(registry.len(), 1);

        assert!(registry.unregister(GaussianBlur::ID).is_some());
        assert!(registry.is_empty());
    }

    #[test]
    fn builtin_ids_are_unique() {
        let mut ids: Vec<_> = builtins::ALL.iter().map(|d| d.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), builtins::ALL.len());
    }
}
