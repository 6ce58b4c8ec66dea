//! The effect node: identity, properties, sources and realization cache.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use log::{trace, warn};
use smol_str::SmolStr;

use crate::backend::DeviceContext;
use crate::boxed::{Boxing, BoxedValue};
use crate::descriptor::{EffectDescriptor, EffectId, SourceArity};
use crate::effects::EffectRegistry;
use crate::error::{EffectError, Result};
use crate::mapping::PropertyMapping;
use crate::property::{ArrayPropertyKey, PropertyKey, PropertyStore};
use crate::source::{EffectSource, SourceList};

/// Where an effect is in its realization lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RealizationState {
    /// Never realized, closed, or the last attempt failed.
    Unrealized,
    /// A realization pass is running for this node.
    Realizing,
    /// The native instance matches the node's properties and sources.
    Realized,
    /// Realized, but a property or source has changed since.
    Stale,
}

/// A cached DPI-compensation stage for one source slot.
#[derive(Clone)]
pub(crate) struct DpiCompensator<E> {
    pub(crate) effect: E,
    pub(crate) input_dpi: f32,
}

/// Native state produced by the last successful realization.
pub(crate) struct RealizationCache<C: DeviceContext> {
    pub(crate) resource: Option<C::Effect>,
    pub(crate) device: Option<C::Device>,
    pub(crate) source_realization_ids: Vec<u64>,
    /// DPI each source was compensated from, per slot.
    pub(crate) compensation_dpis: Vec<Option<f32>>,
    pub(crate) dpi_compensators: Vec<Option<DpiCompensator<C::Effect>>>,
    pub(crate) realization_id: u64,
    /// Cleared when a pass fails part-way, forcing the next pass to rebind
    /// and re-push everything.
    pub(crate) valid: bool,
}

impl<C: DeviceContext> RealizationCache<C> {
    fn empty() -> Self {
        Self {
            resource: None,
            device: None,
            source_realization_ids: Vec::new(),
            compensation_dpis: Vec::new(),
            dpi_compensators: Vec::new(),
            realization_id: 0,
            valid: false,
        }
    }

    fn release(&mut self) {
        self.resource = None;
        self.device = None;
        self.source_realization_ids.clear();
        self.compensation_dpis.clear();
        self.dpi_compensators.clear();
        self.valid = false;
    }
}

pub(crate) struct EffectNode<C: DeviceContext> {
    pub(crate) descriptor: &'static EffectDescriptor,
    pub(crate) name: SmolStr,
    pub(crate) properties: PropertyStore,
    pub(crate) sources: SourceList<EffectSource<C>>,
    pub(crate) closed: bool,
    pub(crate) state: RealizationState,
    pub(crate) cache: RealizationCache<C>,
}

impl<C: DeviceContext> EffectNode<C> {
    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(EffectError::Disposed)
        } else {
            Ok(())
        }
    }

    /// Name used in diagnostics; falls back to the effect type name.
    pub(crate) fn label(&self) -> SmolStr {
        if self.name.is_empty() {
            SmolStr::new_static(self.descriptor.name)
        } else {
            self.name.clone()
        }
    }

    fn mark_stale(&mut self) {
        if self.state == RealizationState::Realized {
            self.state = RealizationState::Stale;
        }
    }
}

/// A node in an effect graph.
///
/// `Effect` is a cheap, reference-counted handle: cloning it shares the same
/// node, which is how one effect feeds several parents. It is intended for
/// use from a single thread.
pub struct Effect<C: DeviceContext> {
    inner: Rc<RefCell<EffectNode<C>>>,
}

impl<C: DeviceContext> Clone for Effect<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<C: DeviceContext> fmt::Debug for Effect<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_borrow() {
            Ok(node) => f
                .debug_struct("Effect")
                .field("type", &node.descriptor.name)
                .field("name", &node.name)
                .field("state", &node.state)
                .field("closed", &node.closed)
                .finish(),
            Err(_) => f.debug_struct("Effect").finish_non_exhaustive(),
        }
    }
}

impl<C: DeviceContext> Effect<C> {
    /// Creates an effect with the descriptor's default property values.
    pub fn new(descriptor: &'static EffectDescriptor) -> Self {
        Self::from_parts(descriptor, PropertyStore::with_defaults(descriptor.properties))
    }

    /// Creates a built-in effect by its type id.
    pub fn create(id: EffectId) -> Result<Self> {
        let descriptor = EffectRegistry::builtin()
            .get(id)
            .ok_or_else(|| EffectError::NotFound(SmolStr::new(id.to_string())))?;
        Ok(Self::new(descriptor))
    }

    /// Wraps an existing native instance. Property values are read back from
    /// it and the instance is reused on the next realization against the same
    /// device.
    pub fn from_native(
        descriptor: &'static EffectDescriptor,
        ctx: &C,
        native: C::Effect,
    ) -> Result<Self> {
        let values = descriptor
            .properties
            .iter()
            .enumerate()
            .map(|(index, property)| {
                ctx.get_value(&native, index as u32, property.property_type)
                    .map_err(|err| {
                        warn!(
                            "Failed to read {}.{} from native effect: {err}",
                            descriptor.name, property.name
                        );
                        EffectError::from(err)
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let properties = PropertyStore::from_values(descriptor.properties, values)?;
        let effect = Self::from_parts(descriptor, properties);

        if descriptor.sources == SourceArity::Variable {
            let count = ctx.input_count(&native);
            let mut node = effect.inner.borrow_mut();
            for _ in 0..count {
                node.sources.push(None)?;
            }
        }

        {
            let mut node = effect.inner.borrow_mut();
            node.cache.device = Some(ctx.device()?);
            node.cache.resource = Some(native);
        }

        Ok(effect)
    }

    fn from_parts(descriptor: &'static EffectDescriptor, properties: PropertyStore) -> Self {
        let node = EffectNode {
            descriptor,
            name: SmolStr::default(),
            properties,
            sources: SourceList::new(descriptor.sources),
            closed: false,
            state: RealizationState::Unrealized,
            cache: RealizationCache::empty(),
        };

        Self {
            inner: Rc::new(RefCell::new(node)),
        }
    }

    pub(crate) fn node(&self) -> Ref<'_, EffectNode<C>> {
        self.inner.borrow()
    }

    pub(crate) fn node_mut(&self) -> RefMut<'_, EffectNode<C>> {
        self.inner.borrow_mut()
    }

    fn open(&self) -> Result<Ref<'_, EffectNode<C>>> {
        let node = self.node();
        node.ensure_open()?;
        Ok(node)
    }

    fn open_mut(&self) -> Result<RefMut<'_, EffectNode<C>>> {
        let node = self.node_mut();
        node.ensure_open()?;
        Ok(node)
    }

    /// Whether both handles refer to the same node.
    pub fn ptr_eq(&self, other: &Effect<C>) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn descriptor(&self) -> &'static EffectDescriptor {
        self.node().descriptor
    }

    pub fn effect_id(&self) -> Result<EffectId> {
        Ok(self.open()?.descriptor.id)
    }

    pub fn name(&self) -> Result<SmolStr> {
        Ok(self.open()?.name.clone())
    }

    /// Sets the display label. It has no effect on realization.
    pub fn set_name(&self, name: impl Into<SmolStr>) -> Result<()> {
        self.open_mut()?.name = name.into();
        Ok(())
    }

    pub fn property_count(&self) -> Result<u32> {
        Ok(self.open()?.properties.len() as u32)
    }

    /// Reads a property by index, for reflection.
    pub fn property(&self, index: u32) -> Result<BoxedValue> {
        Ok(self.open()?.properties.get(index)?.clone())
    }

    /// Writes a property by index, for reflection. The value is checked
    /// against the property's kind, length and domain.
    pub fn set_property(&self, index: u32, value: BoxedValue) -> Result<()> {
        let mut node = self.open_mut()?;
        node.properties.try_set(index, value)?;
        node.mark_stale();
        Ok(())
    }

    /// Reads a typed property. A key declared for another effect type fails
    /// with `OutOfBounds` or `InvalidArgument` when its slot does not exist
    /// here or holds a different kind.
    pub fn get<T, B: Boxing<T>>(&self, key: PropertyKey<T, B>) -> Result<T> {
        B::unbox(self.open()?.properties.get(key.index())?)
    }

    /// Writes a typed property. Values outside the representable domain,
    /// rejected by the property's validator, or of the wrong kind for the
    /// slot leave the effect unchanged.
    pub fn set<T, B: Boxing<T>>(&self, key: PropertyKey<T, B>, value: T) -> Result<()> {
        let mut node = self.open_mut()?;
        let boxed = B::box_value(&value)?;
        node.properties.try_set(key.index(), boxed)?;
        node.mark_stale();
        Ok(())
    }

    pub fn get_array(&self, key: ArrayPropertyKey) -> Result<Vec<f32>> {
        Ok(self.open()?.properties.get_array(key.index())?.to_vec())
    }

    pub fn set_array(&self, key: ArrayPropertyKey, values: &[f32]) -> Result<()> {
        let mut node = self.open_mut()?;
        node.properties
            .set_array(key.index(), values.len() as u32, Some(values))?;
        node.mark_stale();
        Ok(())
    }

    /// Resolves a public property name to its index and mapping.
    pub fn named_property_mapping(&self, name: &str) -> Result<(u32, PropertyMapping)> {
        self.open()?.descriptor.named_property_mapping(name)
    }

    pub fn source_count(&self) -> Result<u32> {
        Ok(self.open()?.sources.len() as u32)
    }

    pub fn source(&self, index: u32) -> Result<Option<EffectSource<C>>> {
        Ok(self.open()?.sources.get(index)?.cloned())
    }

    pub fn sources(&self) -> Result<Vec<Option<EffectSource<C>>>> {
        Ok(self.open()?.sources.snapshot())
    }

    /// Sets or clears input `index`. On effects with a variable source count,
    /// `index == source_count()` appends. An effect cannot be its own source.
    pub fn set_source(&self, index: u32, source: Option<EffectSource<C>>) -> Result<()> {
        self.reject_self_reference(source.as_ref())?;
        let mut node = self.open_mut()?;
        node.sources.set(index, source)?;
        node.mark_stale();
        Ok(())
    }

    /// Appends an input to an effect with a variable source count.
    pub fn push_source(&self, source: Option<EffectSource<C>>) -> Result<()> {
        self.reject_self_reference(source.as_ref())?;
        let mut node = self.open_mut()?;
        node.sources.push(source)?;
        node.mark_stale();
        Ok(())
    }

    pub fn remove_source(&self, index: u32) -> Result<Option<EffectSource<C>>> {
        let mut node = self.open_mut()?;
        let removed = node.sources.remove(index)?;
        node.mark_stale();
        Ok(removed)
    }

    pub fn clear_sources(&self) -> Result<()> {
        let mut node = self.open_mut()?;
        node.sources.clear()?;
        node.mark_stale();
        Ok(())
    }

    fn reject_self_reference(&self, source: Option<&EffectSource<C>>) -> Result<()> {
        match source.and_then(EffectSource::as_effect) {
            Some(effect) if effect.ptr_eq(self) => {
                Err(EffectError::Cycle(self.open()?.label()))
            }
            _ => Ok(()),
        }
    }

    pub fn realization_state(&self) -> RealizationState {
        self.node().state
    }

    /// Generation id of the last successful realization (0 if none).
    pub fn realization_id(&self) -> u64 {
        self.node().cache.realization_id
    }

    pub fn is_closed(&self) -> bool {
        self.node().closed
    }

    /// Releases the native instance and all source references. Every other
    /// operation fails with [`EffectError::Disposed`] afterwards. Closing
    /// twice is a no-op.
    pub fn close(&self) {
        let (released, sources) = {
            let mut node = self.node_mut();
            if node.closed {
                return;
            }

            trace!("Closing {} effect '{}'", node.descriptor.name, node.name);
            node.closed = true;
            node.state = RealizationState::Unrealized;

            let cache = std::mem::replace(&mut node.cache, RealizationCache::empty());
            let sources = node.sources.snapshot();
            node.sources.release_all();
            (cache, sources)
        };

        // Native handles and source nodes are dropped outside the borrow;
        // dropping a source may run arbitrary teardown.
        let mut released = released;
        released.release();
        drop(sources);
    }
}
