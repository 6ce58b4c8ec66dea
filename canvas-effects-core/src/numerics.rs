#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Vector4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vector2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Vector3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl Vector4 {
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }
}

/// A 2D affine transform. The third row holds the translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix3x2 {
    pub m11: f32,
    pub m12: f32,
    pub m21: f32,
    pub m22: f32,
    pub m31: f32,
    pub m32: f32,
}

impl Matrix3x2 {
    pub const IDENTITY: Matrix3x2 = Matrix3x2 {
        m11: 1.0,
        m12: 0.0,
        m21: 0.0,
        m22: 1.0,
        m31: 0.0,
        m32: 0.0,
    };

    pub const fn translation(x: f32, y: f32) -> Self {
        Self {
            m31: x,
            m32: y,
            ..Self::IDENTITY
        }
    }

    pub const fn scale(x: f32, y: f32) -> Self {
        Self {
            m11: x,
            m22: y,
            ..Self::IDENTITY
        }
    }

    pub fn transform_point(&self, point: Vector2) -> Vector2 {
        Vector2 {
            x: point.x * self.m11 + point.y * self.m21 + self.m31,
            y: point.x * self.m12 + point.y * self.m22 + self.m32,
        }
    }
}

impl Default for Matrix3x2 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix4x4 {
    pub m11: f32,
    pub m12: f32,
    pub m13: f32,
    pub m14: f32,
    pub m21: f32,
    pub m22: f32,
    pub m23: f32,
    pub m24: f32,
    pub m31: f32,
    pub m32: f32,
    pub m33: f32,
    pub m34: f32,
    pub m41: f32,
    pub m42: f32,
    pub m43: f32,
    pub m44: f32,
}

impl Matrix4x4 {
    pub const IDENTITY: Matrix4x4 = Matrix4x4 {
        m11: 1.0,
        m12: 0.0,
        m13: 0.0,
        m14: 0.0,
        m21: 0.0,
        m22: 1.0,
        m23: 0.0,
        m24: 0.0,
        m31: 0.0,
        m32: 0.0,
        m33: 1.0,
        m34: 0.0,
        m41: 0.0,
        m42: 0.0,
        m43: 0.0,
        m44: 1.0,
    };
}

impl Default for Matrix4x4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A color transform: the 4x4 part multiplies RGBA, the fifth row is an offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix5x4 {
    pub m11: f32,
    pub m12: f32,
    pub m13: f32,
    pub m14: f32,
    pub m21: f32,
    pub m22: f32,
    pub m23: f32,
    pub m24: f32,
    pub m31: f32,
    pub m32: f32,
    pub m33: f32,
    pub m34: f32,
    pub m41: f32,
    pub m42: f32,
    pub m43: f32,
    pub m44: f32,
    pub m51: f32,
    pub m52: f32,
    pub m53: f32,
    pub m54: f32,
}

impl Matrix5x4 {
    pub const IDENTITY: Matrix5x4 = Matrix5x4 {
        m11: 1.0,
        m12: 0.0,
        m13: 0.0,
        m14: 0.0,
        m21: 0.0,
        m22: 1.0,
        m23: 0.0,
        m24: 0.0,
        m31: 0.0,
        m32: 0.0,
        m33: 1.0,
        m34: 0.0,
        m41: 0.0,
        m42: 0.0,
        m43: 0.0,
        m44: 1.0,
        m51: 0.0,
        m52: 0.0,
        m53: 0.0,
        m54: 0.0,
    };
}

impl Default for Matrix5x4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(windows)]
mod windows_interop {
    use super::{Matrix3x2, Vector2};

    impl From<Matrix3x2> for windows_numerics::Matrix3x2 {
        fn from(m: Matrix3x2) -> Self {
            windows_numerics::Matrix3x2 {
                M11: m.m11,
                M12: m.m12,
                M21: m.m21,
                M22: m.m22,
                M31: m.m31,
                M32: m.m32,
            }
        }
    }

    impl From<windows_numerics::Matrix3x2> for Matrix3x2 {
        fn from(m: windows_numerics::Matrix3x2) -> Self {
            Matrix3x2 {
                m11: m.M11,
                m12: m.M12,
                m21: m.M21,
                m22: m.M22,
                m31: m.M31,
                m32: m.M32,
            }
        }
    }

    impl From<Vector2> for windows_numerics::Vector2 {
        fn from(v: Vector2) -> Self {
            windows_numerics::Vector2 { X: v.x, Y: v.y }
        }
    }
}
