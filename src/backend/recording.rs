//! An in-memory [`DeviceContext`] that records native calls.
//!
//! Native effects live in a slot map owned by the context. Handles are
//! reference counted; the record is removed when the last handle goes away,
//! so [`RecordingContext::live_effects`] reflects exactly what the effect
//! graph is still holding on to.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use canvas_effects_core::{Matrix3x2, Rect};
use slotmap::{SlotMap, new_key_type};

use super::{BackendError, BackendResult, DeviceContext, ImageSource, RealizedEffectNode};
use crate::boxed::BoxedValue;
use crate::descriptor::{EffectId, SourceArity};
use crate::effects::EffectRegistry;
use crate::error::Result;
use crate::property::PropertyType;

const DEFAULT_DPI: f32 = 96.0;

static NEXT_DEVICE: AtomicU64 = AtomicU64::new(1);
static NEXT_BITMAP: AtomicU64 = AtomicU64::new(1);

new_key_type! {
    struct NativeEffectKey;
}

/// Identity of a recording device. A new one is minted by
/// [`RecordingContext::lose_device`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordingDevice(u64);

/// Call counters, reset with [`RecordingContext::reset_stats`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RecordingStats {
    pub effects_created: usize,
    pub input_counts_set: usize,
    pub inputs_bound: usize,
    pub values_set: usize,
}

struct NativeEffectRecord {
    id: EffectId,
    device: RecordingDevice,
    property_count: Option<usize>,
    values: Vec<Option<BoxedValue>>,
    inputs: Vec<Option<RecordedImage>>,
}

struct RecordingState {
    effects: SlotMap<NativeEffectKey, NativeEffectRecord>,
    stats: RecordingStats,
    failing: Option<EffectId>,
}

struct NativeEffectHandle {
    key: NativeEffectKey,
    state: Weak<RefCell<RecordingState>>,
}

impl Drop for NativeEffectHandle {
    fn drop(&mut self) {
        let Some(state) = self.state.upgrade() else {
            return;
        };

        // The record owns input images, which may hold the last handle to
        // other records; let them go after the borrow ends.
        let removed = state.borrow_mut().effects.remove(self.key);
        drop(removed);
    }
}

/// A native effect created by a [`RecordingContext`].
#[derive(Clone)]
pub struct NativeEffect(Rc<NativeEffectHandle>);

impl NativeEffect {
    pub fn ptr_eq(&self, other: &NativeEffect) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    fn key(&self) -> NativeEffectKey {
        self.0.key
    }
}

impl fmt::Debug for NativeEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NativeEffect").field(&self.0.key).finish()
    }
}

impl PartialEq for NativeEffect {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

/// A native image: a bitmap leaf or the output of a native effect.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedImage {
    Bitmap { id: u64, bounds: Rect },
    Effect(NativeEffect),
}

/// A bitmap with a fixed size and DPI, usable as an effect source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordingBitmap {
    id: u64,
    bounds: Rect,
    dpi: f32,
}

impl RecordingBitmap {
    pub fn new(bounds: Rect, dpi: f32) -> Self {
        Self {
            id: NEXT_BITMAP.fetch_add(1, Ordering::Relaxed),
            bounds,
            dpi,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn dpi(&self) -> f32 {
        self.dpi
    }

    pub fn image(&self) -> RecordedImage {
        RecordedImage::Bitmap {
            id: self.id,
            bounds: self.bounds,
        }
    }
}

impl ImageSource<RecordingContext> for RecordingBitmap {
    fn realize(
        &self,
        _ctx: &RecordingContext,
        _target_dpi: f32,
    ) -> Result<RealizedEffectNode<RecordedImage>> {
        Ok(RealizedEffectNode {
            image: self.image(),
            dpi: self.dpi,
            realization_id: 0,
        })
    }
}

/// A headless device context.
///
/// ```ignore
/// let ctx = RecordingContext::new().with_dpi(144.0);
/// let blur = GaussianBlur::new::<RecordingContext>();
/// blur.set_source(0, Some(EffectSource::image(RecordingBitmap::new(rect, 96.0))))?;
/// let realized = blur.realize(&ctx, ctx.dpi())?;
/// assert_eq!(ctx.stats().effects_created, 2); // blur + DPI compensation
/// ```
pub struct RecordingContext {
    state: Rc<RefCell<RecordingState>>,
    device: Cell<RecordingDevice>,
    dpi: f32,
}

impl Default for RecordingContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RecordingContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingContext")
            .field("device", &self.device.get())
            .field("dpi", &self.dpi)
            .field("live_effects", &self.live_effects())
            .finish()
    }
}

impl RecordingContext {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(RecordingState {
                effects: SlotMap::with_key(),
                stats: RecordingStats::default(),
                failing: None,
            })),
            device: Cell::new(next_device()),
            dpi: DEFAULT_DPI,
        }
    }

    pub fn with_dpi(mut self, dpi: f32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Simulates device loss: the context moves to a fresh device and every
    /// native effect created so far becomes unusable.
    pub fn lose_device(&self) {
        self.device.set(next_device());
    }

    /// Makes `create_effect` fail for effects of type `id`.
    pub fn fail_creation_of(&self, id: Option<EffectId>) {
        self.state.borrow_mut().failing = id;
    }

    pub fn stats(&self) -> RecordingStats {
        self.state.borrow().stats
    }

    pub fn reset_stats(&self) {
        self.state.borrow_mut().stats = RecordingStats::default();
    }

    /// Number of native effects still referenced.
    pub fn live_effects(&self) -> usize {
        self.state.borrow().effects.len()
    }

    /// Type of a native effect, or `None` once it has been released.
    pub fn effect_type(&self, effect: &NativeEffect) -> Option<EffectId> {
        self.state
            .borrow()
            .effects
            .get(effect.key())
            .map(|record| record.id)
    }

    /// Last value written to property `index`.
    pub fn value(&self, effect: &NativeEffect, index: u32) -> Option<BoxedValue> {
        self.state
            .borrow()
            .effects
            .get(effect.key())
            .and_then(|record| record.values.get(index as usize).cloned().flatten())
    }

    /// Currently bound inputs.
    pub fn inputs(&self, effect: &NativeEffect) -> Vec<Option<RecordedImage>> {
        self.state
            .borrow()
            .effects
            .get(effect.key())
            .map(|record| record.inputs.clone())
            .unwrap_or_default()
    }

    /// The native effect behind an effect output image.
    pub fn effect_of(image: &RecordedImage) -> Option<&NativeEffect> {
        match image {
            RecordedImage::Effect(effect) => Some(effect),
            RecordedImage::Bitmap { .. } => None,
        }
    }

    fn with_record<T>(
        &self,
        effect: &NativeEffect,
        f: impl FnOnce(&mut NativeEffectRecord, &mut RecordingStats) -> BackendResult<T>,
    ) -> BackendResult<T> {
        let mut state = self.state.borrow_mut();
        let RecordingState { effects, stats, .. } = &mut *state;
        match effects.get_mut(effect.key()) {
            Some(record) if record.device == self.device.get() => f(record, stats),
            _ => Err(BackendError::Released),
        }
    }
}

fn next_device() -> RecordingDevice {
    RecordingDevice(NEXT_DEVICE.fetch_add(1, Ordering::Relaxed))
}

impl DeviceContext for RecordingContext {
    type Device = RecordingDevice;
    type Effect = NativeEffect;
    type Image = RecordedImage;

    fn device(&self) -> BackendResult<RecordingDevice> {
        Ok(self.device.get())
    }

    fn dpi(&self) -> f32 {
        self.dpi
    }

    fn create_effect(&self, id: EffectId) -> BackendResult<NativeEffect> {
        let mut state = self.state.borrow_mut();
        if state.failing == Some(id) {
            return Err(BackendError::EffectCreationFailed(id));
        }

        let descriptor = EffectRegistry::builtin().get(id);
        let values: Vec<Option<BoxedValue>> = descriptor
            .map(|d| d.properties.iter().map(|p| Some(p.default.to_boxed())).collect())
            .unwrap_or_default();
        let input_count = match descriptor.map(|d| d.sources) {
            Some(SourceArity::Fixed(count)) => count as usize,
            _ => 0,
        };

        let key = state.effects.insert(NativeEffectRecord {
            id,
            device: self.device.get(),
            property_count: descriptor.map(|d| d.properties.len()),
            values,
            inputs: vec![None; input_count],
        });
        state.stats.effects_created += 1;

        Ok(NativeEffect(Rc::new(NativeEffectHandle {
            key,
            state: Rc::downgrade(&self.state),
        })))
    }

    fn effect_output(&self, effect: &NativeEffect) -> BackendResult<RecordedImage> {
        self.with_record(effect, |_, _| Ok(RecordedImage::Effect(effect.clone())))
    }

    fn input_count(&self, effect: &NativeEffect) -> u32 {
        self.with_record(effect, |record, _| Ok(record.inputs.len() as u32))
            .unwrap_or(0)
    }

    fn set_input_count(&self, effect: &NativeEffect, count: u32) -> BackendResult<()> {
        let removed = self.with_record(effect, |record, stats| {
            stats.input_counts_set += 1;
            let count = count as usize;
            if count <= record.inputs.len() {
                Ok(record.inputs.split_off(count))
            } else {
                record.inputs.resize(count, None);
                Ok(Vec::new())
            }
        })?;
        drop(removed);
        Ok(())
    }

    fn set_input(
        &self,
        effect: &NativeEffect,
        index: u32,
        image: Option<&RecordedImage>,
    ) -> BackendResult<()> {
        let previous = self.with_record(effect, |record, stats| {
            let slot = record
                .inputs
                .get_mut(index as usize)
                .ok_or(BackendError::UnknownInput(index))?;
            stats.inputs_bound += 1;
            Ok(std::mem::replace(slot, image.cloned()))
        })?;
        drop(previous);
        Ok(())
    }

    fn set_value(
        &self,
        effect: &NativeEffect,
        index: u32,
        value: &BoxedValue,
    ) -> BackendResult<()> {
        self.with_record(effect, |record, stats| {
            let index = index as usize;
            if record.property_count.is_some_and(|count| index >= count) {
                return Err(BackendError::UnknownProperty(index as u32));
            }
            if index >= record.values.len() {
                record.values.resize(index + 1, None);
            }

            record.values[index] = Some(value.clone());
            stats.values_set += 1;
            Ok(())
        })
    }

    fn get_value(
        &self,
        effect: &NativeEffect,
        index: u32,
        property_type: PropertyType,
    ) -> BackendResult<BoxedValue> {
        self.with_record(effect, |record, _| {
            let value = record
                .values
                .get(index as usize)
                .cloned()
                .flatten()
                .ok_or(BackendError::UnknownProperty(index))?;

            if value.matches(property_type) {
                Ok(value)
            } else {
                Err(BackendError::Other(format!(
                    "property #{index} holds a {} value, not {}",
                    value.kind_name(),
                    property_type.as_str()
                )))
            }
        })
    }

    fn image_bounds(
        &self,
        image: &RecordedImage,
        transform: Option<&Matrix3x2>,
    ) -> BackendResult<Rect> {
        let state = self.state.borrow();
        let bounds = local_bounds(&state, image)?;
        Ok(match transform {
            Some(transform) => bounds.transform_bounds(transform),
            None => bounds,
        })
    }
}

/// Bitmaps report their own bounds; effect outputs the union of their inputs.
fn local_bounds(state: &RecordingState, image: &RecordedImage) -> BackendResult<Rect> {
    match image {
        RecordedImage::Bitmap { bounds, .. } => Ok(*bounds),
        RecordedImage::Effect(effect) => {
            let record = state
                .effects
                .get(effect.key())
                .ok_or(BackendError::Released)?;

            record
                .inputs
                .iter()
                .flatten()
                .try_fold(Rect::default(), |acc, input| {
                    Ok(acc.union(&local_bounds(state, input)?))
                })
        }
    }
}
