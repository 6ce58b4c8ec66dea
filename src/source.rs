//! Effect inputs.

use std::fmt;
use std::rc::Rc;

use crate::backend::{DeviceContext, ImageSource, RealizedEffectNode};
use crate::descriptor::SourceArity;
use crate::effect::Effect;
use crate::error::{EffectError, Result};

/// A reference to one effect input: another effect (a graph edge) or an
/// external image (a leaf).
pub enum EffectSource<C: DeviceContext> {
    Effect(Effect<C>),
    Image(Rc<dyn ImageSource<C>>),
}

impl<C: DeviceContext> EffectSource<C> {
    /// Wraps an external image.
    pub fn image(image: impl ImageSource<C> + 'static) -> Self {
        EffectSource::Image(Rc::new(image))
    }

    pub fn as_effect(&self) -> Option<&Effect<C>> {
        match self {
            EffectSource::Effect(effect) => Some(effect),
            EffectSource::Image(_) => None,
        }
    }

    /// Identity comparison: the same effect or the same image allocation.
    pub fn ptr_eq(&self, other: &EffectSource<C>) -> bool {
        match (self, other) {
            (EffectSource::Effect(a), EffectSource::Effect(b)) => a.ptr_eq(b),
            (EffectSource::Image(a), EffectSource::Image(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub(crate) fn realize(&self, ctx: &C, target_dpi: f32) -> Result<RealizedEffectNode<C::Image>> {
        match self {
            EffectSource::Effect(effect) => effect.realize(ctx, target_dpi),
            EffectSource::Image(image) => image.realize(ctx, target_dpi),
        }
    }
}

impl<C: DeviceContext> Clone for EffectSource<C> {
    fn clone(&self) -> Self {
        match self {
            EffectSource::Effect(effect) => EffectSource::Effect(effect.clone()),
            EffectSource::Image(image) => EffectSource::Image(Rc::clone(image)),
        }
    }
}

impl<C: DeviceContext> fmt::Debug for EffectSource<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EffectSource::Effect(effect) => f.debug_tuple("Effect").field(effect).finish(),
            EffectSource::Image(image) => f
                .debug_tuple("Image")
                .field(&Rc::as_ptr(image).cast::<()>())
                .finish(),
        }
    }
}

impl<C: DeviceContext> From<Effect<C>> for EffectSource<C> {
    fn from(effect: Effect<C>) -> Self {
        EffectSource::Effect(effect)
    }
}

impl<C: DeviceContext> From<&Effect<C>> for EffectSource<C> {
    fn from(effect: &Effect<C>) -> Self {
        EffectSource::Effect(effect.clone())
    }
}

/// Ordered effect inputs with fixed or growable length.
///
/// Empty slots are `None`. `changed` records whether the list was modified
/// since the last successful realization bound it.
#[derive(Debug, Clone)]
pub struct SourceList<S> {
    entries: Vec<Option<S>>,
    fixed: bool,
    changed: bool,
}

impl<S> SourceList<S> {
    pub fn new(arity: SourceArity) -> Self {
        let (len, fixed) = match arity {
            SourceArity::Fixed(count) => (count as usize, true),
            SourceArity::Variable => (0, false),
        };

        Self {
            entries: std::iter::repeat_with(|| None).take(len).collect(),
            fixed,
            changed: true,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    pub fn get(&self, index: u32) -> Result<Option<&S>> {
        self.entries
            .get(index as usize)
            .map(Option::as_ref)
            .ok_or(self.out_of_bounds(index))
    }

    /// Sets or clears slot `index`. On a variable list, `index == len`
    /// appends.
    pub fn set(&mut self, index: u32, source: Option<S>) -> Result<()> {
        let slot = index as usize;
        if slot < self.entries.len() {
            self.entries[slot] = source;
        } else if slot == self.entries.len() && !self.fixed {
            self.entries.push(source);
        } else {
            return Err(self.out_of_bounds(index));
        }

        self.changed = true;
        Ok(())
    }

    pub fn push(&mut self, source: Option<S>) -> Result<()> {
        self.ensure_growable()?;
        self.entries.push(source);
        self.changed = true;
        Ok(())
    }

    pub fn remove(&mut self, index: u32) -> Result<Option<S>> {
        self.ensure_growable()?;
        if index as usize >= self.entries.len() {
            return Err(self.out_of_bounds(index));
        }

        self.changed = true;
        Ok(self.entries.remove(index as usize))
    }

    /// Empties a variable list.
    pub fn clear(&mut self) -> Result<()> {
        self.ensure_growable()?;
        self.entries.clear();
        self.changed = true;
        Ok(())
    }

    /// Drops every reference. Fixed lists keep their length.
    pub(crate) fn release_all(&mut self) {
        if self.fixed {
            self.entries.iter_mut().for_each(|entry| *entry = None);
        } else {
            self.entries.clear();
        }
        self.changed = true;
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&S>> {
        self.entries.iter().map(Option::as_ref)
    }

    pub(crate) fn is_changed(&self) -> bool {
        self.changed
    }

    pub(crate) fn clear_changed(&mut self) {
        self.changed = false;
    }

    fn ensure_growable(&self) -> Result<()> {
        if self.fixed {
            Err(EffectError::invalid_argument(
                "source list has a fixed size",
            ))
        } else {
            Ok(())
        }
    }

    fn out_of_bounds(&self, index: u32) -> EffectError {
        EffectError::OutOfBounds {
            index: index as usize,
            len: self.entries.len(),
        }
    }
}

impl<S: Clone> SourceList<S> {
    pub fn snapshot(&self) -> Vec<Option<S>> {
        self.entries.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_list_rejects_out_of_range() {
        let mut list = SourceList::<u32>::new(SourceArity::Fixed(2));
        assert_eq!(list.len(), 2);
        list.set(1, Some(7)).unwrap();
        assert_eq!(list.get(1).unwrap(), Some(&7));

        for index in [2, 3, 100] {
            let err = list.set(index, Some(1)).unwrap_err();
            assert!(matches!(err, EffectError::OutOfBounds { len: 2, .. }));
        }
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn variable_list_appends_at_len() {
        let mut list = SourceList::<u32>::new(SourceArity::Variable);
        assert!(list.is_empty());

        for expected in 1..=3 {
            let len = list.len() as u32;
            list.set(len, Some(len)).unwrap();
            assert_eq!(list.len(), expected);
        }

        assert!(list.set(5, Some(5)).is_err());
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn clearing_a_slot_keeps_length() {
        let mut list = SourceList::<u32>::new(SourceArity::Variable);
        list.push(Some(1)).unwrap();
        list.push(Some(2)).unwrap();
        list.set(0, None).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.get(0).unwrap(), None);
    }

    #[test]
    fn get_out_of_range_fails() {
        let list = SourceList::<u32>::new(SourceArity::Fixed(1));
        assert!(matches!(
            list.get(1),
            Err(EffectError::OutOfBounds { index: 1, len: 1 })
        ));
    }

    #[test]
    fn fixed_list_cannot_be_resized() {
        let mut list = SourceList::<u32>::new(SourceArity::Fixed(1));
        assert!(matches!(list.push(Some(1)), Err(EffectError::InvalidArgument(_))));
        assert!(matches!(list.remove(0), Err(EffectError::InvalidArgument(_))));
        assert!(matches!(list.clear(), Err(EffectError::InvalidArgument(_))));
    }

    #[test]
    fn mutations_set_changed() {
        let mut list = SourceList::<u32>::new(SourceArity::Variable);
        list.clear_changed();
        list.push(None).unwrap();
        assert!(list.is_changed());

        list.clear_changed();
        assert!(list.set(3, Some(1)).is_err());
        assert!(!list.is_changed());

        assert_eq!(list.remove(0).unwrap(), None);
        assert!(list.is_changed());
    }
}
