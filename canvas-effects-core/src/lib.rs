//! Plain value types shared by effect properties.
//!
//! These are the "public" shapes of effect parameters. The effect graph stores
//! them internally as boxed scalars and float arrays; see the
//! [`FloatComponents`] trait for the array layout of each type.

mod color;
mod numerics;
mod rect;

pub use color::{AlphaMode, Color};
pub use numerics::{Matrix3x2, Matrix4x4, Matrix5x4, Vector2, Vector3, Vector4};
pub use rect::Rect;

/// A value that is stored as a fixed-length array of `f32` components.
///
/// The component order is the row-major field order of the type, which is
/// also the memory layout Direct2D expects for vector and matrix properties.
pub trait FloatComponents: Copy {
    /// Number of components in the array form.
    const COUNT: usize;

    /// Returns the components in storage order.
    fn to_components(&self) -> Vec<f32>;

    /// Rebuilds the value from its components.
    ///
    /// Returns `None` if `components.len() != Self::COUNT`.
    fn from_components(components: &[f32]) -> Option<Self>;
}

macro_rules! impl_float_components {
    ($ty:ty => [$($field:ident),+ $(,)?]) => {
        impl FloatComponents for $ty {
            const COUNT: usize = [$(stringify!($field)),+].len();

            fn to_components(&self) -> Vec<f32> {
                vec![$(self.$field),+]
            }

            fn from_components(components: &[f32]) -> Option<Self> {
                if components.len() != Self::COUNT {
                    return None;
                }

                let mut iter = components.iter().copied();
                Some(Self {
                    $($field: iter.next()?),+
                })
            }
        }
    };
}

impl_float_components!(Vector2 => [x, y]);
impl_float_components!(Vector3 => [x, y, z]);
impl_float_components!(Vector4 => [x, y, z, w]);
impl_float_components!(Matrix3x2 => [m11, m12, m21, m22, m31, m32]);
impl_float_components!(Matrix4x4 => [
    m11, m12, m13, m14,
    m21, m22, m23, m24,
    m31, m32, m33, m34,
    m41, m42, m43, m44,
]);
impl_float_components!(Matrix5x4 => [
    m11, m12, m13, m14,
    m21, m22, m23, m24,
    m31, m32, m33, m34,
    m41, m42, m43, m44,
    m51, m52, m53, m54,
]);
