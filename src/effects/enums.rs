//! Enumerated property values, numbered as the native API numbers them.

use crate::effect_enum;

effect_enum! {
    /// How an effect samples outside the bounds of its input.
    #[derive(Default)]
    pub enum BorderMode {
        /// Edges fade to transparent.
        #[default]
        Soft = 0,
        /// Edge pixels are clamped.
        Hard = 1,
    }
}

effect_enum! {
    /// Trade-off between blur speed and quality.
    #[derive(Default)]
    pub enum BlurOptimization {
        Speed = 0,
        #[default]
        Balanced = 1,
        Quality = 2,
    }
}

effect_enum! {
    /// Porter-Duff and related blend modes.
    #[derive(Default)]
    pub enum CompositeMode {
        #[default]
        SourceOver = 0,
        DestinationOver = 1,
        SourceIn = 2,
        DestinationIn = 3,
        SourceOut = 4,
        DestinationOut = 5,
        SourceAtop = 6,
        DestinationAtop = 7,
        Xor = 8,
        Plus = 9,
        SourceCopy = 10,
        BoundedSourceCopy = 11,
        MaskInvert = 12,
    }
}

effect_enum! {
    /// Resampling filter used by transforms, DPI compensation and lighting
    /// scale modes.
    #[derive(Default)]
    pub enum InterpolationMode {
        NearestNeighbor = 0,
        #[default]
        Linear = 1,
        Cubic = 2,
        MultiSampleLinear = 3,
        Anisotropic = 4,
        HighQualityCubic = 5,
    }
}
