//! The rendering backend seen by the realization engine.
//!
//! A [`DeviceContext`] is the only thing the engine talks to when it turns an
//! effect graph into native state. Two implementations ship with the crate:
//!
//! * [`recording::RecordingContext`], a portable in-memory device that records
//!   every native call; useful for headless use and for tests;
//! * `d2d::D2DContext` (Windows only), backed by an `ID2D1DeviceContext`.

use std::fmt;

use canvas_effects_core::{Matrix3x2, Rect};
use thiserror::Error;

use crate::boxed::BoxedValue;
use crate::descriptor::EffectId;
use crate::error::Result;
use crate::property::PropertyType;

#[cfg(windows)]
pub mod d2d;
pub mod recording;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Failed to create native effect {0}")]
    EffectCreationFailed(EffectId),

    #[error("Native effect has no property #{0}")]
    UnknownProperty(u32),

    #[error("Native effect has no input #{0}")]
    UnknownInput(u32),

    #[error("Native effect was released")]
    Released,

    #[error("{0}")]
    Other(String),

    #[cfg(windows)]
    #[error("Windows API error: {0}")]
    WindowsApi(#[from] windows_core::Error),
}

pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// A rendering device context that can host native effect instances.
///
/// All methods take `&self`; native APIs of this kind use interior
/// mutability and so do the shipped implementations.
pub trait DeviceContext {
    /// Identity of the device behind this context. Two contexts on the same
    /// device compare equal, and a recreated device compares unequal.
    type Device: Clone + PartialEq + fmt::Debug;
    /// A native effect instance.
    type Effect: Clone;
    /// A native image (an effect output or a bitmap).
    type Image: Clone;

    fn device(&self) -> BackendResult<Self::Device>;

    /// DPI the context draws at.
    fn dpi(&self) -> f32;

    fn create_effect(&self, id: EffectId) -> BackendResult<Self::Effect>;

    fn effect_output(&self, effect: &Self::Effect) -> BackendResult<Self::Image>;

    fn input_count(&self, effect: &Self::Effect) -> u32;

    fn set_input_count(&self, effect: &Self::Effect, count: u32) -> BackendResult<()>;

    fn set_input(
        &self,
        effect: &Self::Effect,
        index: u32,
        image: Option<&Self::Image>,
    ) -> BackendResult<()>;

    fn set_value(
        &self,
        effect: &Self::Effect,
        index: u32,
        value: &BoxedValue,
    ) -> BackendResult<()>;

    /// Reads a property back from a native instance.
    fn get_value(
        &self,
        effect: &Self::Effect,
        index: u32,
        property_type: PropertyType,
    ) -> BackendResult<BoxedValue>;

    /// Bounds of `image` in DIPs, optionally after `transform`.
    fn image_bounds(
        &self,
        image: &Self::Image,
        transform: Option<&Matrix3x2>,
    ) -> BackendResult<Rect>;
}

/// The outcome of realizing an image source.
#[derive(Debug, Clone)]
pub struct RealizedEffectNode<I> {
    pub image: I,
    /// DPI of the image, or 0 when it is resolution independent.
    pub dpi: f32,
    /// Changes whenever the realized state of the source changes.
    pub realization_id: u64,
}

/// Anything that can be bound as an effect input.
///
/// Effects implement this through the realization engine; backends implement
/// it for their bitmap types.
pub trait ImageSource<C: DeviceContext> {
    fn realize(&self, ctx: &C, target_dpi: f32) -> Result<RealizedEffectNode<C::Image>>;
}
