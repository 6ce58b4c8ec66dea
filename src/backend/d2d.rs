//! Direct2D backend.
//!
//! Effects realize into `ID2D1Effect` instances created on an
//! `ID2D1DeviceContext`; effect ids are the Direct2D effect CLSIDs.

use canvas_effects_core::{Matrix3x2, Rect};
use windows::Win32::Graphics::Direct2D::Common::D2D_RECT_F;
use windows::Win32::Graphics::Direct2D::{
    D2D1_PROPERTY_TYPE, D2D1_PROPERTY_TYPE_BOOL, D2D1_PROPERTY_TYPE_FLOAT,
    D2D1_PROPERTY_TYPE_INT32, D2D1_PROPERTY_TYPE_UINT32, D2D1_PROPERTY_TYPE_UNKNOWN,
    ID2D1Bitmap1, ID2D1Device, ID2D1DeviceContext, ID2D1Effect, ID2D1Image,
};
use windows::core::GUID;
use windows_core::Interface;

use super::{BackendError, BackendResult, DeviceContext, ImageSource, RealizedEffectNode};
use crate::boxed::BoxedValue;
use crate::descriptor::EffectId;
use crate::error::Result;
use crate::property::PropertyType;

/// A [`DeviceContext`] backed by an `ID2D1DeviceContext`.
#[derive(Debug, Clone)]
pub struct D2DContext {
    context: ID2D1DeviceContext,
}

impl D2DContext {
    pub fn new(context: ID2D1DeviceContext) -> Self {
        Self { context }
    }

    /// Returns a reference to the underlying device context.
    pub fn as_raw(&self) -> &ID2D1DeviceContext {
        &self.context
    }
}

/// Encodes a boxed value the way `ID2D1Properties::SetValue` expects it.
///
/// Float arrays are passed untyped: the same boxed shape backs vectors,
/// matrices and variable-length blobs, and the native property knows which
/// one it is.
fn encode(value: &BoxedValue) -> (D2D1_PROPERTY_TYPE, Vec<u8>) {
    match value {
        BoxedValue::Float(v) => (D2D1_PROPERTY_TYPE_FLOAT, v.to_ne_bytes().to_vec()),
        BoxedValue::Int(v) => (D2D1_PROPERTY_TYPE_INT32, v.to_ne_bytes().to_vec()),
        BoxedValue::UInt(v) => (D2D1_PROPERTY_TYPE_UINT32, v.to_ne_bytes().to_vec()),
        BoxedValue::Bool(v) => (
            D2D1_PROPERTY_TYPE_BOOL,
            i32::from(*v).to_ne_bytes().to_vec(),
        ),
        BoxedValue::FloatArray(values) => (
            D2D1_PROPERTY_TYPE_UNKNOWN,
            values.iter().flat_map(|v| v.to_ne_bytes()).collect(),
        ),
    }
}

fn decode(property_type: PropertyType, bytes: &[u8]) -> BackendResult<BoxedValue> {
    let word = |bytes: &[u8]| -> BackendResult<[u8; 4]> {
        bytes
            .try_into()
            .map_err(|_| BackendError::Other(format!("expected 4 bytes, got {}", bytes.len())))
    };

    Ok(match property_type {
        PropertyType::Float => BoxedValue::Float(f32::from_ne_bytes(word(bytes)?)),
        PropertyType::Int => BoxedValue::Int(i32::from_ne_bytes(word(bytes)?)),
        PropertyType::UInt => BoxedValue::UInt(u32::from_ne_bytes(word(bytes)?)),
        PropertyType::Bool => BoxedValue::Bool(i32::from_ne_bytes(word(bytes)?) != 0),
        PropertyType::Array(_) | PropertyType::VarArray => BoxedValue::FloatArray(
            bytes
                .chunks(4)
                .map(|chunk| word(chunk).map(f32::from_ne_bytes))
                .collect::<BackendResult<_>>()?,
        ),
    })
}

fn value_size(effect: &ID2D1Effect, index: u32, property_type: PropertyType) -> usize {
    match property_type {
        PropertyType::Array(len) => len * 4,
        // SAFETY: querying the size of a property has no preconditions.
        PropertyType::VarArray => unsafe { effect.GetValueSize(index) as usize },
        _ => 4,
    }
}

impl DeviceContext for D2DContext {
    type Device = ID2D1Device;
    type Effect = ID2D1Effect;
    type Image = ID2D1Image;

    fn device(&self) -> BackendResult<ID2D1Device> {
        let mut device = None;
        unsafe { self.context.GetDevice(&mut device) };
        device.ok_or(BackendError::Released)
    }

    fn dpi(&self) -> f32 {
        let (mut dpi_x, mut dpi_y) = (0.0, 0.0);
        unsafe { self.context.GetDpi(&mut dpi_x, &mut dpi_y) };
        dpi_x
    }

    fn create_effect(&self, id: EffectId) -> BackendResult<ID2D1Effect> {
        let clsid = GUID::from_u128(id.to_u128());
        Ok(unsafe { self.context.CreateEffect(&clsid)? })
    }

    fn effect_output(&self, effect: &ID2D1Effect) -> BackendResult<ID2D1Image> {
        Ok(unsafe { effect.GetOutput()? })
    }

    fn input_count(&self, effect: &ID2D1Effect) -> u32 {
        unsafe { effect.GetInputCount() }
    }

    fn set_input_count(&self, effect: &ID2D1Effect, count: u32) -> BackendResult<()> {
        // Fixed-input effects reject SetInputCount even for their own count.
        if self.input_count(effect) == count {
            return Ok(());
        }

        unsafe { effect.SetInputCount(count)? };
        Ok(())
    }

    fn set_input(
        &self,
        effect: &ID2D1Effect,
        index: u32,
        image: Option<&ID2D1Image>,
    ) -> BackendResult<()> {
        if index >= self.input_count(effect) {
            return Err(BackendError::UnknownInput(index));
        }

        unsafe { effect.SetInput(index, image, false) };
        Ok(())
    }

    fn set_value(
        &self,
        effect: &ID2D1Effect,
        index: u32,
        value: &BoxedValue,
    ) -> BackendResult<()> {
        let (property_type, bytes) = encode(value);
        unsafe { effect.SetValue(index, property_type, &bytes)? };
        Ok(())
    }

    fn get_value(
        &self,
        effect: &ID2D1Effect,
        index: u32,
        property_type: PropertyType,
    ) -> BackendResult<BoxedValue> {
        let mut bytes = vec![0u8; value_size(effect, index, property_type)];
        unsafe { effect.GetValue(index, D2D1_PROPERTY_TYPE_UNKNOWN, &mut bytes)? };
        decode(property_type, &bytes)
    }

    fn image_bounds(
        &self,
        image: &ID2D1Image,
        transform: Option<&Matrix3x2>,
    ) -> BackendResult<Rect> {
        let mut bounds = D2D_RECT_F::default();

        unsafe {
            match transform {
                None => self.context.GetImageLocalBounds(image, &mut bounds)?,
                Some(transform) => {
                    // World bounds use the context transform; swap it in and
                    // restore it even if the query fails.
                    let mut previous = windows_numerics::Matrix3x2::default();
                    self.context.GetTransform(&mut previous);
                    self.context
                        .SetTransform(&windows_numerics::Matrix3x2::from(*transform));
                    let result = self.context.GetImageWorldBounds(image, &mut bounds);
                    self.context.SetTransform(&previous);
                    result?;
                }
            }
        }

        Ok(Rect::from_ltrb([
            bounds.left,
            bounds.top,
            bounds.right,
            bounds.bottom,
        ]))
    }
}

/// A Direct2D bitmap used as an effect source.
#[derive(Debug, Clone)]
pub struct D2DBitmap {
    bitmap: ID2D1Bitmap1,
}

impl D2DBitmap {
    pub fn new(bitmap: ID2D1Bitmap1) -> Self {
        Self { bitmap }
    }

    pub fn as_raw(&self) -> &ID2D1Bitmap1 {
        &self.bitmap
    }
}

impl ImageSource<D2DContext> for D2DBitmap {
    fn realize(&self, _ctx: &D2DContext, _target_dpi: f32) -> Result<RealizedEffectNode<ID2D1Image>> {
        let (mut dpi_x, mut dpi_y) = (0.0, 0.0);
        unsafe { self.bitmap.GetDpi(&mut dpi_x, &mut dpi_y) };

        let image = self.bitmap.cast::<ID2D1Image>().map_err(BackendError::from)?;

        Ok(RealizedEffectNode {
            image,
            dpi: dpi_x,
            realization_id: 0,
        })
    }
}
