/*

Copyright 2019 Héctor Ramón, Iced contributors

Permission is hereby granted, free of charge, to any person obtaining a copy of
this software and associated documentation files (the "Software"), to deal in
the Software without restriction, including without limitation the rights to
use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of
the Software, and to permit persons to whom the Software is furnished to do so,
subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS
FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR
COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER
IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

*/

use crate::{Vector3, Vector4};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };

    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    pub const TRANSPARENT: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    /// Creates a [`Color`] from a `0xRRGGBBAA` value.
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: (0xFF & (hex >> 24)) as f32 / 255.0,
            g: (0xFF & (hex >> 16)) as f32 / 255.0,
            b: (0xFF & (hex >> 8)) as f32 / 255.0,
            a: (0xFF & hex) as f32 / 255.0,
        }
    }

    pub const fn from_rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque [`Color`].
    pub const fn from_rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// The color as an `(r, g, b, a)` vector.
    pub const fn to_vector4(self) -> Vector4 {
        Vector4::new(self.r, self.g, self.b, self.a)
    }

    /// The color as an `(r, g, b)` vector. Alpha is dropped.
    pub const fn to_vector3(self) -> Vector3 {
        Vector3::new(self.r, self.g, self.b)
    }

    pub const fn from_vector4(v: Vector4) -> Self {
        Self::from_rgba(v.x, v.y, v.z, v.w)
    }

    /// Inverse of [`Color::to_vector3`]; the result is opaque.
    pub const fn from_vector3(v: Vector3) -> Self {
        Self::from_rgb(v.x, v.y, v.z)
    }
}

impl From<u32> for Color {
    fn from(color: u32) -> Self {
        Color::from_hex(color)
    }
}

/// How the alpha channel of an image is interpreted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AlphaMode {
    #[default]
    Premultiplied,
    Straight,
    /// Alpha is ignored and the image is treated as opaque. Effect properties
    /// cannot represent this mode.
    Ignore,
}
