//! Strongly typed image-effect graphs over a pluggable rendering backend.
//!
//! Effects store their parameters as boxed values described by static
//! descriptors, take other effects or images as sources, and are realized
//! lazily into native effect instances through a [`DeviceContext`].

pub mod backend;
pub mod boxed;
pub mod descriptor;
pub mod effect;
pub mod effects;
pub mod error;
pub mod mapping;
pub mod property;
mod realize;
pub mod source;
pub mod util;

pub use canvas_effects_core::{
    AlphaMode, Color, FloatComponents, Matrix3x2, Matrix4x4, Matrix5x4, Rect, Vector2, Vector3,
    Vector4,
};

pub use backend::{BackendError, DeviceContext, ImageSource, RealizedEffectNode};
pub use boxed::{BoxedValue, Boxing, EffectEnum};
pub use descriptor::{EffectDescriptor, EffectId, SourceArity};
pub use effect::{Effect, RealizationState};
pub use error::{EffectError, Result};
pub use mapping::{PropertyMapping, PropertyNameMapping};
pub use property::{ArrayPropertyKey, PropertyKey, PropertyStore, PropertyType};
pub use source::{EffectSource, SourceList};
