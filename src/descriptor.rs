//! Static descriptions of concrete effect types.

use std::fmt;

use crate::error::Result;
use crate::mapping::{self, PropertyMapping, PropertyNameMapping};
use crate::property::PropertyDescriptor;

/// Identity of a native effect type (a CLSID on Direct2D).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EffectId(u128);

impl EffectId {
    pub const fn from_u128(value: u128) -> Self {
        Self(value)
    }

    pub const fn to_u128(self) -> u128 {
        self.0
    }
}

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.0;
        write!(
            f,
            "{:08X}-{:04X}-{:04X}-{:04X}-{:012X}",
            (v >> 96) as u32,
            (v >> 80) as u16,
            (v >> 64) as u16,
            (v >> 48) as u16,
            v & 0xFFFF_FFFF_FFFF
        )
    }
}

impl fmt::Debug for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EffectId({self})")
    }
}

/// How many sources an effect takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceArity {
    /// Exactly this many slots; the list never grows or shrinks.
    Fixed(u32),
    /// Starts empty and grows as sources are appended.
    Variable,
}

/// Everything the shared engine needs to know about one effect type.
#[derive(Debug)]
pub struct EffectDescriptor {
    /// Display name of the effect type.
    pub name: &'static str,
    pub id: EffectId,
    pub properties: &'static [PropertyDescriptor],
    pub sources: SourceArity,
    /// Generated name → index table.
    pub mappings: &'static [PropertyNameMapping],
    /// Overrides consulted before `mappings`.
    pub hand_coded_mappings: &'static [PropertyNameMapping],
    /// Insert DPI compensation for sources whose DPI differs from the target.
    pub compensate_input_dpi: bool,
}

impl EffectDescriptor {
    pub fn property_count(&self) -> u32 {
        self.properties.len() as u32
    }

    /// Resolves a public property name to its index and mapping.
    pub fn named_property_mapping(&self, name: &str) -> Result<(u32, PropertyMapping)> {
        mapping::lookup(self.hand_coded_mappings, self.mappings, name)
    }
}
