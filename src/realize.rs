//! Lazy realization of effect graphs against a [`DeviceContext`].
//!
//! Realizing an effect walks its sources bottom-up, then creates or reuses
//! the native instance for the effect itself. A node that is already
//! realized against the same device, whose sources report the same
//! realization ids and whose properties and source list have not changed,
//! is returned as-is without touching the native instance.

use canvas_effects_core::{Matrix3x2, Rect, Vector2};
use log::{debug, trace};

use crate::backend::{DeviceContext, ImageSource, RealizedEffectNode};
use crate::boxed::{AsFloatArray, Boxing};
use crate::effect::{DpiCompensator, Effect, EffectNode, RealizationState};
use crate::effects::DpiCompensation;
use crate::error::{EffectError, Result};

/// Marks a node as `Realizing` for the duration of a pass.
///
/// Dropping the guard without calling [`finish`](Self::finish) puts the node
/// back into `Unrealized` and invalidates its cache, so a failed pass can be
/// retried once the caller fixes the cause.
struct RealizingGuard<'a, C: DeviceContext> {
    effect: &'a Effect<C>,
    armed: bool,
}

impl<'a, C: DeviceContext> RealizingGuard<'a, C> {
    fn enter(effect: &'a Effect<C>) -> Result<Self> {
        let mut node = effect.node_mut();
        if node.closed {
            return Err(EffectError::Disposed);
        }
        if node.state == RealizationState::Realizing {
            return Err(EffectError::Cycle(node.label()));
        }

        node.state = RealizationState::Realizing;
        Ok(Self {
            effect,
            armed: true,
        })
    }

    fn finish(mut self, node: &mut EffectNode<C>) {
        node.state = RealizationState::Realized;
        self.armed = false;
    }
}

impl<C: DeviceContext> Drop for RealizingGuard<'_, C> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        let mut node = self.effect.node_mut();
        node.state = RealizationState::Unrealized;
        node.cache.valid = false;
    }
}

/// Freshly realized inputs of one node.
struct RealizedInputs<I> {
    images: Vec<I>,
    realization_ids: Vec<u64>,
    /// Source DPI for slots that need compensation.
    compensation_dpis: Vec<Option<f32>>,
}

impl<C: DeviceContext> Effect<C> {
    /// Realizes this effect and everything it depends on.
    ///
    /// # Errors
    ///
    /// * [`EffectError::Disposed`] if the effect was closed;
    /// * [`EffectError::Cycle`] if the effect is reachable from its own sources;
    /// * [`EffectError::MissingSource`] if an input slot is empty;
    /// * [`EffectError::Backend`] for failures reported by `ctx`.
    ///
    /// On any error the effect is left `Unrealized`.
    pub fn realize(&self, ctx: &C, target_dpi: f32) -> Result<RealizedEffectNode<C::Image>> {
        let guard = RealizingGuard::enter(self)?;

        let inputs = self.realize_sources(ctx, target_dpi)?;
        let device = ctx.device()?;

        let mut node = self.node_mut();

        let reusable = is_current(&node, &device, &inputs)
            .then(|| node.cache.resource.clone())
            .flatten();

        if let Some(resource) = reusable {
            let image = ctx.effect_output(&resource)?;
            let realization_id = node.cache.realization_id;
            trace!(
                "Reusing {} effect '{}' (realization {realization_id})",
                node.descriptor.name, node.name
            );
            guard.finish(&mut node);
            return Ok(RealizedEffectNode {
                image,
                dpi: 0.0,
                realization_id,
            });
        }

        let image = rebuild(&mut node, ctx, device, inputs, target_dpi)?;
        let realization_id = node.cache.realization_id;
        guard.finish(&mut node);

        Ok(RealizedEffectNode {
            image,
            dpi: 0.0,
            realization_id,
        })
    }

    /// The realized output image at the context's DPI.
    pub fn image(&self, ctx: &C) -> Result<C::Image> {
        Ok(self.realize(ctx, ctx.dpi())?.image)
    }

    /// Local bounds of the effect output, in DIPs.
    pub fn bounds(&self, ctx: &C) -> Result<Rect> {
        let image = self.image(ctx)?;
        Ok(ctx.image_bounds(&image, None)?)
    }

    /// Bounds of the effect output after `transform`, in DIPs.
    pub fn bounds_with_transform(&self, ctx: &C, transform: &Matrix3x2) -> Result<Rect> {
        let image = self.image(ctx)?;
        Ok(ctx.image_bounds(&image, Some(transform))?)
    }

    fn realize_sources(&self, ctx: &C, target_dpi: f32) -> Result<RealizedInputs<C::Image>> {
        // The node must not stay borrowed while sources realize: a cycle
        // leads back here and has to observe the `Realizing` state.
        let (sources, compensate) = {
            let node = self.node();
            (node.sources.snapshot(), node.descriptor.compensate_input_dpi)
        };

        let mut inputs = RealizedInputs {
            images: Vec::with_capacity(sources.len()),
            realization_ids: Vec::with_capacity(sources.len()),
            compensation_dpis: Vec::with_capacity(sources.len()),
        };

        for (index, source) in sources.iter().enumerate() {
            let source = source
                .as_ref()
                .ok_or(EffectError::MissingSource(index as u32))?;
            let realized = source.realize(ctx, target_dpi)?;

            let needs_compensation =
                compensate && realized.dpi != 0.0 && realized.dpi != target_dpi;

            inputs.images.push(realized.image);
            inputs.realization_ids.push(realized.realization_id);
            inputs
                .compensation_dpis
                .push(needs_compensation.then_some(realized.dpi));
        }

        Ok(inputs)
    }
}

impl<C: DeviceContext> ImageSource<C> for Effect<C> {
    fn realize(&self, ctx: &C, target_dpi: f32) -> Result<RealizedEffectNode<C::Image>> {
        Effect::realize(self, ctx, target_dpi)
    }
}

fn is_current<C: DeviceContext>(
    node: &EffectNode<C>,
    device: &C::Device,
    inputs: &RealizedInputs<C::Image>,
) -> bool {
    let cache = &node.cache;
    cache.valid
        && cache.device.as_ref() == Some(device)
        && cache.source_realization_ids == inputs.realization_ids
        && cache.compensation_dpis == inputs.compensation_dpis
        && !node.sources.is_changed()
        && !node.properties.is_dirty()
}

/// Binds every input and pushes every property, then commits the cache.
///
/// Nothing is written to `node` until all native calls have succeeded.
fn rebuild<C: DeviceContext>(
    node: &mut EffectNode<C>,
    ctx: &C,
    device: C::Device,
    inputs: RealizedInputs<C::Image>,
    target_dpi: f32,
) -> Result<C::Image> {
    let same_device = node.cache.device.as_ref() == Some(&device);

    let resource = match &node.cache.resource {
        Some(resource) if same_device => resource.clone(),
        previous => {
            if previous.is_some() {
                debug!(
                    "Device changed, recreating {} effect '{}'",
                    node.descriptor.name, node.name
                );
            } else {
                debug!(
                    "Creating native {} effect '{}' at {target_dpi} dpi",
                    node.descriptor.name, node.name
                );
            }
            ctx.create_effect(node.descriptor.id)?
        }
    };

    let mut compensators = Vec::with_capacity(inputs.images.len());
    let mut bound_images = Vec::with_capacity(inputs.images.len());

    for (slot, (image, dpi)) in inputs
        .images
        .into_iter()
        .zip(&inputs.compensation_dpis)
        .enumerate()
    {
        let Some(input_dpi) = *dpi else {
            compensators.push(None);
            bound_images.push(image);
            continue;
        };

        let cached = if same_device {
            node.cache.dpi_compensators.get(slot).cloned().flatten()
        } else {
            None
        };

        let compensator = match cached {
            Some(compensator) => compensator,
            None => {
                debug!(
                    "Inserting DPI compensation for source #{slot} of '{}' ({input_dpi} -> {target_dpi} dpi)",
                    node.label()
                );
                DpiCompensator {
                    effect: ctx.create_effect(DpiCompensation::ID)?,
                    input_dpi: f32::NAN,
                }
            }
        };

        let compensator = configure_compensator(ctx, compensator, &image, input_dpi)?;
        bound_images.push(ctx.effect_output(&compensator.effect)?);
        compensators.push(Some(compensator));
    }

    ctx.set_input_count(&resource, bound_images.len() as u32)?;
    for (index, image) in bound_images.iter().enumerate() {
        ctx.set_input(&resource, index as u32, Some(image))?;
    }

    for (index, value) in node.properties.iter() {
        ctx.set_value(&resource, index, value)?;
    }

    let output = ctx.effect_output(&resource)?;

    let cache = &mut node.cache;
    cache.resource = Some(resource);
    cache.device = Some(device);
    cache.source_realization_ids = inputs.realization_ids;
    cache.compensation_dpis = inputs.compensation_dpis;
    cache.dpi_compensators = compensators;
    cache.realization_id += 1;
    cache.valid = true;

    node.properties.clear_dirty();
    node.sources.clear_changed();

    Ok(output)
}

fn configure_compensator<C: DeviceContext>(
    ctx: &C,
    mut compensator: DpiCompensator<C::Effect>,
    source: &C::Image,
    input_dpi: f32,
) -> Result<DpiCompensator<C::Effect>> {
    ctx.set_input(&compensator.effect, 0, Some(source))?;

    if compensator.input_dpi != input_dpi {
        let value = AsFloatArray::box_value(&Vector2::new(input_dpi, input_dpi))?;
        ctx.set_value(
            &compensator.effect,
            DpiCompensation::INPUT_DPI.index(),
            &value,
        )?;
        compensator.input_dpi = input_dpi;
    }

    Ok(compensator)
}
