//! Built-in effect types.
//!
//! Each effect type is a static [`EffectDescriptor`](crate::descriptor::EffectDescriptor)
//! plus a namespace struct carrying its type id and typed property keys.
//! The shared [`Effect`](crate::effect::Effect) node interprets the
//! descriptor; nothing here is per-instance state.
//!
//! # Example
//!
//! ```ignore
//! let blur = GaussianBlur::new::<RecordingContext>();
//! blur.set(GaussianBlur::STANDARD_DEVIATION, 6.0)?;
//! blur.set(GaussianBlur::BORDER_MODE, BorderMode::Hard)?;
//!
//! let tint = ColorMatrix::new::<RecordingContext>();
//! tint.set_source(0, Some(blur.clone().into()))?;
//! tint.set(ColorMatrix::ALPHA_MODE, AlphaMode::Straight)?;
//!
//! // Or look a type up by id
//! let blur = Effect::<RecordingContext>::create(GaussianBlur::ID)?;
//! ```

mod builtins;
mod enums;
mod registry;

pub use builtins::{
    ArithmeticComposite, ColorMatrix, Composite, Crop, CrossFade, DiscreteTransfer,
    DpiCompensation, GaussianBlur, HueRotation, LuminanceToAlpha, PointDiffuse, Transform2D,
};
pub use enums::{BlurOptimization, BorderMode, CompositeMode, InterpolationMode};
pub use registry::EffectRegistry;
