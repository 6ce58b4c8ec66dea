//! Uniform boxed representation of effect property values.
//!
//! Every effect property is stored as a [`BoxedValue`]: one of four scalar
//! kinds or a float array. Richer public types (enums, vectors, matrices,
//! colors, rectangles, angles, alpha modes) are converted to and from the
//! boxed form by the marker types in this module, each of which implements
//! [`Boxing`] for the public types it supports. A typed property key names its
//! converter, so the conversion is fixed when the key is declared rather than
//! discovered at runtime.

use canvas_effects_core::{AlphaMode, Color, FloatComponents, Rect, Vector3, Vector4};

use crate::error::{EffectError, Result};
use crate::property::PropertyType;

#[derive(Debug, Clone, PartialEq)]
pub enum BoxedValue {
    Float(f32),
    Int(i32),
    UInt(u32),
    Bool(bool),
    FloatArray(Vec<f32>),
}

impl BoxedValue {
    /// Short name of the stored kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            BoxedValue::Float(_) => "float",
            BoxedValue::Int(_) => "int32",
            BoxedValue::UInt(_) => "uint32",
            BoxedValue::Bool(_) => "bool",
            BoxedValue::FloatArray(_) => "float array",
        }
    }

    /// Whether this value has the shape `ty` requires, including the element
    /// count of fixed-length arrays.
    pub fn matches(&self, ty: PropertyType) -> bool {
        match (self, ty) {
            (BoxedValue::Float(_), PropertyType::Float)
            | (BoxedValue::Int(_), PropertyType::Int)
            | (BoxedValue::UInt(_), PropertyType::UInt)
            | (BoxedValue::Bool(_), PropertyType::Bool)
            | (BoxedValue::FloatArray(_), PropertyType::VarArray) => true,
            (BoxedValue::FloatArray(values), PropertyType::Array(len)) => values.len() == len,
            _ => false,
        }
    }

    pub fn as_f32(&self) -> Result<f32> {
        match self {
            BoxedValue::Float(v) => Ok(*v),
            other => Err(mismatch("float", other)),
        }
    }

    pub fn as_i32(&self) -> Result<i32> {
        match self {
            BoxedValue::Int(v) => Ok(*v),
            other => Err(mismatch("int32", other)),
        }
    }

    pub fn as_u32(&self) -> Result<u32> {
        match self {
            BoxedValue::UInt(v) => Ok(*v),
            other => Err(mismatch("uint32", other)),
        }
    }

    pub fn as_bool(&self) -> Result<bool> {
        match self {
            BoxedValue::Bool(v) => Ok(*v),
            other => Err(mismatch("bool", other)),
        }
    }

    pub fn as_f32_slice(&self) -> Result<&[f32]> {
        match self {
            BoxedValue::FloatArray(v) => Ok(v),
            other => Err(mismatch("float array", other)),
        }
    }
}

fn mismatch(expected: &str, found: &BoxedValue) -> EffectError {
    EffectError::invalid_argument(format!(
        "expected a {expected} value, found {}",
        found.kind_name()
    ))
}

/// An enum that is stored as its `u32` discriminant.
///
/// Implemented by [`effect_enum!`](crate::effect_enum).
pub trait EffectEnum: Copy {
    fn to_u32(self) -> u32;
    fn from_u32(value: u32) -> Option<Self>;
}

/// Converts between a public value type `T` and its boxed form.
///
/// `box_value` fails with [`EffectError::InvalidArgument`] for values outside
/// the representable domain. `unbox` fails with a bounds error when a stored
/// array has the wrong element count, and with `InvalidArgument` when the
/// stored kind is not the one this converter produces.
pub trait Boxing<T> {
    fn box_value(value: &T) -> Result<BoxedValue>;
    fn unbox(value: &BoxedValue) -> Result<T>;
}

/// Scalars stored as themselves.
#[derive(Debug, Clone, Copy)]
pub struct Direct;

/// Enums stored as `u32`.
#[derive(Debug, Clone, Copy)]
pub struct AsUInt;

/// Vectors and matrices stored as float arrays.
#[derive(Debug, Clone, Copy)]
pub struct AsFloatArray;

/// Colors stored as `[r, g, b, a]`.
#[derive(Debug, Clone, Copy)]
pub struct ColorAsVector4;

/// Colors stored as `[r, g, b]`; alpha reads back as 1.0.
#[derive(Debug, Clone, Copy)]
pub struct ColorAsVector3;

/// Rectangles stored as `[left, top, right, bottom]`.
#[derive(Debug, Clone, Copy)]
pub struct RectAsVector4;

/// Angles exposed in radians and stored in degrees.
#[derive(Debug, Clone, Copy)]
pub struct RadiansAsDegrees;

/// [`AlphaMode`] stored as the native alpha-mode value.
#[derive(Debug, Clone, Copy)]
pub struct AlphaModeAsUInt;

impl Boxing<f32> for Direct {
    fn box_value(value: &f32) -> Result<BoxedValue> {
        Ok(BoxedValue::Float(*value))
    }

    fn unbox(value: &BoxedValue) -> Result<f32> {
        value.as_f32()
    }
}

impl Boxing<i32> for Direct {
    fn box_value(value: &i32) -> Result<BoxedValue> {
        Ok(BoxedValue::Int(*value))
    }

    fn unbox(value: &BoxedValue) -> Result<i32> {
        value.as_i32()
    }
}

impl Boxing<u32> for Direct {
    fn box_value(value: &u32) -> Result<BoxedValue> {
        Ok(BoxedValue::UInt(*value))
    }

    fn unbox(value: &BoxedValue) -> Result<u32> {
        value.as_u32()
    }
}

impl Boxing<bool> for Direct {
    fn box_value(value: &bool) -> Result<BoxedValue> {
        Ok(BoxedValue::Bool(*value))
    }

    fn unbox(value: &BoxedValue) -> Result<bool> {
        value.as_bool()
    }
}

impl<E: EffectEnum> Boxing<E> for AsUInt {
    fn box_value(value: &E) -> Result<BoxedValue> {
        Ok(BoxedValue::UInt(value.to_u32()))
    }

    fn unbox(value: &BoxedValue) -> Result<E> {
        let raw = value.as_u32()?;
        E::from_u32(raw).ok_or_else(|| {
            EffectError::invalid_argument(format!("{raw} is not a valid enum value"))
        })
    }
}

impl<T: FloatComponents> Boxing<T> for AsFloatArray {
    fn box_value(value: &T) -> Result<BoxedValue> {
        Ok(BoxedValue::FloatArray(value.to_components()))
    }

    fn unbox(value: &BoxedValue) -> Result<T> {
        let components = value.as_f32_slice()?;
        T::from_components(components).ok_or(EffectError::ArraySizeMismatch {
            expected: T::COUNT,
            actual: components.len(),
        })
    }
}

impl Boxing<Color> for ColorAsVector4 {
    fn box_value(value: &Color) -> Result<BoxedValue> {
        AsFloatArray::box_value(&value.to_vector4())
    }

    fn unbox(value: &BoxedValue) -> Result<Color> {
        let v: Vector4 = AsFloatArray::unbox(value)?;
        Ok(Color::from_vector4(v))
    }
}

impl Boxing<Color> for ColorAsVector3 {
    fn box_value(value: &Color) -> Result<BoxedValue> {
        AsFloatArray::box_value(&value.to_vector3())
    }

    fn unbox(value: &BoxedValue) -> Result<Color> {
        let v: Vector3 = AsFloatArray::unbox(value)?;
        Ok(Color::from_vector3(v))
    }
}

impl Boxing<Rect> for RectAsVector4 {
    fn box_value(value: &Rect) -> Result<BoxedValue> {
        Ok(BoxedValue::FloatArray(value.to_ltrb().to_vec()))
    }

    fn unbox(value: &BoxedValue) -> Result<Rect> {
        let v: Vector4 = AsFloatArray::unbox(value)?;
        Ok(Rect::from_ltrb([v.x, v.y, v.z, v.w]))
    }
}

impl Boxing<f32> for RadiansAsDegrees {
    fn box_value(value: &f32) -> Result<BoxedValue> {
        Ok(BoxedValue::Float(value.to_degrees()))
    }

    fn unbox(value: &BoxedValue) -> Result<f32> {
        Ok(value.as_f32()?.to_radians())
    }
}

// Native values: D2D1_ALPHA_MODE_PREMULTIPLIED = 1, D2D1_ALPHA_MODE_STRAIGHT = 2.
// The color-matrix alpha mode enum uses the same numbering.
const NATIVE_ALPHA_PREMULTIPLIED: u32 = 1;
const NATIVE_ALPHA_STRAIGHT: u32 = 2;

impl Boxing<AlphaMode> for AlphaModeAsUInt {
    fn box_value(value: &AlphaMode) -> Result<BoxedValue> {
        match value {
            AlphaMode::Premultiplied => Ok(BoxedValue::UInt(NATIVE_ALPHA_PREMULTIPLIED)),
            AlphaMode::Straight => Ok(BoxedValue::UInt(NATIVE_ALPHA_STRAIGHT)),
            AlphaMode::Ignore => Err(EffectError::invalid_argument(
                "AlphaMode::Ignore cannot be used for effect properties",
            )),
        }
    }

    fn unbox(value: &BoxedValue) -> Result<AlphaMode> {
        match value.as_u32()? {
            NATIVE_ALPHA_PREMULTIPLIED => Ok(AlphaMode::Premultiplied),
            NATIVE_ALPHA_STRAIGHT => Ok(AlphaMode::Straight),
            other => Err(EffectError::invalid_argument(format!(
                "{other} is not a valid alpha mode"
            ))),
        }
    }
}
