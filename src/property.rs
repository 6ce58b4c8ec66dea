//! Property descriptors, typed property keys and the per-effect property store.

use std::marker::PhantomData;

use crate::boxed::{Boxing, BoxedValue};
use crate::error::{EffectError, Result};

/// Storage kind of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
    Float,
    Int,
    UInt,
    Bool,
    /// Float array with a fixed element count (vectors, matrices, colors, rects).
    Array(usize),
    /// Float array whose length may change (lookup tables, kernels).
    VarArray,
}

impl PropertyType {
    /// Returns the D2D type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Float => "float",
            PropertyType::Int => "int32",
            PropertyType::UInt => "uint32",
            PropertyType::Bool => "bool",
            PropertyType::Array(2) => "vector2",
            PropertyType::Array(3) => "vector3",
            PropertyType::Array(4) => "vector4",
            PropertyType::Array(6) => "matrix3x2",
            PropertyType::Array(16) => "matrix4x4",
            PropertyType::Array(20) => "matrix5x4",
            PropertyType::Array(_) | PropertyType::VarArray => "blob",
        }
    }
}

/// Default value of a property, in boxed form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyDefault {
    Float(f32),
    Int(i32),
    UInt(u32),
    Bool(bool),
    Array(&'static [f32]),
}

impl PropertyDefault {
    pub fn to_boxed(&self) -> BoxedValue {
        match *self {
            PropertyDefault::Float(v) => BoxedValue::Float(v),
            PropertyDefault::Int(v) => BoxedValue::Int(v),
            PropertyDefault::UInt(v) => BoxedValue::UInt(v),
            PropertyDefault::Bool(v) => BoxedValue::Bool(v),
            PropertyDefault::Array(v) => BoxedValue::FloatArray(v.to_vec()),
        }
    }
}

/// Domain check applied before a property write is accepted.
pub type Validator = fn(&BoxedValue) -> bool;

/// Static description of one effect property.
#[derive(Debug, Clone, Copy)]
pub struct PropertyDescriptor {
    /// Name of the native property.
    pub name: &'static str,
    pub property_type: PropertyType,
    pub default: PropertyDefault,
    pub validate: Option<Validator>,
}

impl PropertyDescriptor {
    pub const fn new(
        name: &'static str,
        property_type: PropertyType,
        default: PropertyDefault,
    ) -> Self {
        Self {
            name,
            property_type,
            default,
            validate: None,
        }
    }

    pub const fn validated(mut self, validate: Validator) -> Self {
        self.validate = Some(validate);
        self
    }

    fn accepts(&self, value: &BoxedValue) -> bool {
        self.validate.is_none_or(|validate| validate(value))
    }
}

/// A typed handle to the property at `index`, converted with `B`.
///
/// Keys are declared next to each effect descriptor, e.g.
/// `pub const BLUR_AMOUNT: PropertyKey<f32, Direct> = PropertyKey::new(0);`.
pub struct PropertyKey<T, B> {
    index: u32,
    _marker: PhantomData<fn() -> (T, B)>,
}

impl<T, B: Boxing<T>> PropertyKey<T, B> {
    pub const fn new(index: u32) -> Self {
        Self {
            index,
            _marker: PhantomData,
        }
    }
}

impl<T, B> PropertyKey<T, B> {
    pub const fn index(&self) -> u32 {
        self.index
    }
}

impl<T, B> Clone for PropertyKey<T, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, B> Copy for PropertyKey<T, B> {}

impl<T, B> std::fmt::Debug for PropertyKey<T, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PropertyKey").field(&self.index).finish()
    }
}

/// A handle to a float-array property accessed as a plain slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayPropertyKey {
    index: u32,
}

impl ArrayPropertyKey {
    pub const fn new(index: u32) -> Self {
        Self { index }
    }

    pub const fn index(&self) -> u32 {
        self.index
    }
}

/// The boxed property values of one effect plus a dirty flag.
///
/// The length is fixed by the descriptor table it was built from, and every
/// slot keeps the kind its descriptor declares.
#[derive(Debug, Clone)]
pub struct PropertyStore {
    descriptors: &'static [PropertyDescriptor],
    values: Vec<BoxedValue>,
    dirty: bool,
}

impl PropertyStore {
    /// Creates a store holding each property's default value.
    pub fn with_defaults(descriptors: &'static [PropertyDescriptor]) -> Self {
        Self {
            descriptors,
            values: descriptors.iter().map(|d| d.default.to_boxed()).collect(),
            dirty: true,
        }
    }

    /// Creates a store from values read elsewhere (e.g. a native instance).
    pub fn from_values(
        descriptors: &'static [PropertyDescriptor],
        values: Vec<BoxedValue>,
    ) -> Result<Self> {
        if values.len() != descriptors.len() {
            return Err(EffectError::ArraySizeMismatch {
                expected: descriptors.len(),
                actual: values.len(),
            });
        }

        for (descriptor, value) in descriptors.iter().zip(&values) {
            check_shape(descriptor, value)?;
        }

        Ok(Self {
            descriptors,
            values,
            dirty: true,
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn descriptors(&self) -> &'static [PropertyDescriptor] {
        self.descriptors
    }

    pub fn get(&self, index: u32) -> Result<&BoxedValue> {
        self.values
            .get(index as usize)
            .ok_or(self.out_of_bounds(index))
    }

    /// Overwrites a value after checking the index and the value's shape.
    /// Validators are not consulted.
    pub fn set(&mut self, index: u32, value: BoxedValue) -> Result<()> {
        self.set_with_validation(index, value, |_| true)
    }

    /// Like [`set`](Self::set), but also fails with `InvalidArgument` if
    /// `predicate` rejects the value. A failed write leaves the store
    /// untouched.
    pub fn set_with_validation(
        &mut self,
        index: u32,
        value: BoxedValue,
        predicate: impl FnOnce(&BoxedValue) -> bool,
    ) -> Result<()> {
        let descriptor = self.descriptor(index)?;
        check_shape(descriptor, &value)?;
        if !predicate(&value) {
            return Err(EffectError::invalid_argument(format!(
                "value {value:?} rejected for property {}",
                descriptor.name
            )));
        }

        self.values[index as usize] = value;
        self.dirty = true;
        Ok(())
    }

    /// Writes a value checked against the index, the property's kind, a
    /// fixed array length and the descriptor's validator.
    pub fn try_set(&mut self, index: u32, value: BoxedValue) -> Result<()> {
        let descriptor = *self.descriptor(index)?;
        self.set_with_validation(index, value, |v| descriptor.accepts(v))
    }

    pub fn get_array(&self, index: u32) -> Result<&[f32]> {
        self.get(index)?.as_f32_slice()
    }

    /// Replaces an array property with `count` elements.
    ///
    /// `elements` may only be `None` when `count` is zero.
    pub fn set_array(&mut self, index: u32, count: u32, elements: Option<&[f32]>) -> Result<()> {
        let count = count as usize;
        let elements: &[f32] = match elements {
            Some(elements) if elements.len() == count => elements,
            Some(elements) => {
                return Err(EffectError::invalid_argument(format!(
                    "element count {count} does not match buffer length {}",
                    elements.len()
                )));
            }
            None if count == 0 => &[],
            None => return Err(EffectError::invalid_argument("missing element buffer")),
        };

        self.try_set(index, BoxedValue::FloatArray(elements.to_vec()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &BoxedValue)> {
        self.values
            .iter()
            .enumerate()
            .map(|(index, value)| (index as u32, value))
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    fn descriptor(&self, index: u32) -> Result<&'static PropertyDescriptor> {
        self.descriptors
            .get(index as usize)
            .ok_or(self.out_of_bounds(index))
    }

    fn out_of_bounds(&self, index: u32) -> EffectError {
        EffectError::OutOfBounds {
            index: index as usize,
            len: self.descriptors.len(),
        }
    }
}

fn check_shape(descriptor: &PropertyDescriptor, value: &BoxedValue) -> Result<()> {
    if value.matches(descriptor.property_type) {
        return Ok(());
    }

    match (descriptor.property_type, value) {
        (PropertyType::Array(expected), BoxedValue::FloatArray(values)) => {
            Err(EffectError::ArraySizeMismatch {
                expected,
                actual: values.len(),
            })
        }
        (ty, value) => Err(EffectError::invalid_argument(format!(
            "property {} expects {}, found {}",
            descriptor.name,
            ty.as_str(),
            value.kind_name()
        ))),
    }
}
