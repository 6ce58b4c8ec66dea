//! Name-based property lookup for reflection across the API boundary.

use smol_str::SmolStr;

use crate::error::{EffectError, Result};

/// How a public property maps onto its native storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyMapping {
    Unknown,
    Direct,
    /// The public value is one component of a native vector property.
    VectorX,
    VectorY,
    VectorZ,
    VectorW,
    RectToVector4,
    RadiansToDegrees,
    ColorMatrixAlphaMode,
    ColorToVector3,
    ColorToVector4,
}

/// One row of a mapping table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyNameMapping {
    pub name: &'static str,
    pub index: u32,
    pub mapping: PropertyMapping,
}

impl PropertyNameMapping {
    pub const fn new(name: &'static str, index: u32, mapping: PropertyMapping) -> Self {
        Self {
            name,
            index,
            mapping,
        }
    }
}

/// Looks `name` up in the hand-coded table first, then the standard one.
///
/// Names compare ASCII case-insensitively.
pub fn lookup(
    hand_coded: &[PropertyNameMapping],
    standard: &[PropertyNameMapping],
    name: &str,
) -> Result<(u32, PropertyMapping)> {
    hand_coded
        .iter()
        .chain(standard)
        .find(|entry| entry.name.eq_ignore_ascii_case(name))
        .map(|entry| (entry.index, entry.mapping))
        .ok_or_else(|| EffectError::NotFound(SmolStr::new(name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const STANDARD: &[PropertyNameMapping] = &[
        PropertyNameMapping::new("Coefficients", 0, PropertyMapping::Direct),
        PropertyNameMapping::new("ClampOutput", 1, PropertyMapping::Direct),
    ];

    const HAND_CODED: &[PropertyNameMapping] = &[
        PropertyNameMapping::new("MultiplyAmount", 0, PropertyMapping::VectorX),
        PropertyNameMapping::new("ClampOutput", 1, PropertyMapping::Unknown),
    ];

    #[test]
    fn hand_coded_entries_win() {
        assert_eq!(
            lookup(HAND_CODED, STANDARD, "ClampOutput").unwrap(),
            (1, PropertyMapping::Unknown)
        );
        assert_eq!(
            lookup(HAND_CODED, STANDARD, "MultiplyAmount").unwrap(),
            (0, PropertyMapping::VectorX)
        );
    }

    #[test]
    fn falls_back_to_standard_table() {
        assert_eq!(
            lookup(HAND_CODED, STANDARD, "coefficients").unwrap(),
            (0, PropertyMapping::Direct)
        );
    }

    #[test]
    fn miss_is_not_found() {
        let err = lookup(HAND_CODED, STANDARD, "Radius").unwrap_err();
        assert!(matches!(err, EffectError::NotFound(name) if name == "Radius"));
    }
}
