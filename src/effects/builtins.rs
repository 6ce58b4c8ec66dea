//! Descriptors for the built-in effect types.
//!
//! Property indices, defaults and type ids follow the Direct2D built-in
//! effects, so the same tables drive both the recording backend and a real
//! `ID2D1Effect`.

use canvas_effects_core::{AlphaMode, Color, Matrix3x2, Matrix5x4, Rect, Vector2, Vector3, Vector4};

use super::enums::{BlurOptimization, BorderMode, CompositeMode, InterpolationMode};
use crate::backend::DeviceContext;
use crate::boxed::{
    AlphaModeAsUInt, AsFloatArray, AsUInt, BoxedValue, ColorAsVector3, Direct, RadiansAsDegrees,
    RectAsVector4,
};
use crate::descriptor::{EffectDescriptor, EffectId, SourceArity};
use crate::effect::Effect;
use crate::mapping::{PropertyMapping, PropertyNameMapping};
use crate::property::{
    ArrayPropertyKey, PropertyDefault, PropertyDescriptor, PropertyKey, PropertyType,
};

/// Every built-in descriptor, for registry construction.
pub(crate) static ALL: &[&EffectDescriptor] = &[
    &GAUSSIAN_BLUR,
    &COLOR_MATRIX,
    &COMPOSITE,
    &CROP,
    &HUE_ROTATION,
    &ARITHMETIC_COMPOSITE,
    &CROSS_FADE,
    &DISCRETE_TRANSFER,
    &TRANSFORM_2D,
    &LUMINANCE_TO_ALPHA,
    &POINT_DIFFUSE,
    &DPI_COMPENSATION,
];

macro_rules! builtin_effect {
    ($ty:ident => $descriptor:ident) => {
        impl $ty {
            pub fn descriptor() -> &'static EffectDescriptor {
                &$descriptor
            }

            /// Creates an effect of this type with default property values.
            pub fn new<C: DeviceContext>() -> Effect<C> {
                Effect::new(&$descriptor)
            }
        }
    };
}

fn non_negative(value: &BoxedValue) -> bool {
    matches!(value, BoxedValue::Float(v) if *v >= 0.0)
}

fn unit_interval(value: &BoxedValue) -> bool {
    matches!(value, BoxedValue::Float(v) if (0.0..=1.0).contains(v))
}

const fn float(name: &'static str, default: f32) -> PropertyDescriptor {
    PropertyDescriptor::new(name, PropertyType::Float, PropertyDefault::Float(default))
}

const fn uint(name: &'static str, default: u32) -> PropertyDescriptor {
    PropertyDescriptor::new(name, PropertyType::UInt, PropertyDefault::UInt(default))
}

const fn boolean(name: &'static str, default: bool) -> PropertyDescriptor {
    PropertyDescriptor::new(name, PropertyType::Bool, PropertyDefault::Bool(default))
}

const fn array(name: &'static str, default: &'static [f32]) -> PropertyDescriptor {
    PropertyDescriptor::new(
        name,
        PropertyType::Array(default.len()),
        PropertyDefault::Array(default),
    )
}

const fn var_array(name: &'static str, default: &'static [f32]) -> PropertyDescriptor {
    PropertyDescriptor::new(name, PropertyType::VarArray, PropertyDefault::Array(default))
}

/// Blurs an image with a Gaussian kernel.
///
/// # Properties
///
/// * `STANDARD_DEVIATION` - Blur amount in DIPs, non-negative (default 3.0)
/// * `OPTIMIZATION` - Speed/quality trade-off
/// * `BORDER_MODE` - Edge handling
pub struct GaussianBlur;

impl GaussianBlur {
    pub const ID: EffectId = EffectId::from_u128(0x1feb6d69_2fe6_4ac9_8c58_1d7f93e7a6a5);

    pub const STANDARD_DEVIATION: PropertyKey<f32, Direct> = PropertyKey::new(0);
    pub const OPTIMIZATION: PropertyKey<BlurOptimization, AsUInt> = PropertyKey::new(1);
    pub const BORDER_MODE: PropertyKey<BorderMode, AsUInt> = PropertyKey::new(2);
}

builtin_effect!(GaussianBlur => GAUSSIAN_BLUR);

static GAUSSIAN_BLUR: EffectDescriptor = EffectDescriptor {
    name: "GaussianBlur",
    id: GaussianBlur::ID,
    properties: &[
        float("StandardDeviation", 3.0).validated(non_negative),
        uint("Optimization", 1),
        uint("BorderMode", 0),
    ],
    sources: SourceArity::Fixed(1),
    mappings: &[
        PropertyNameMapping::new("BlurAmount", 0, PropertyMapping::Direct),
        PropertyNameMapping::new("Optimization", 1, PropertyMapping::Direct),
        PropertyNameMapping::new("BorderMode", 2, PropertyMapping::Direct),
    ],
    hand_coded_mappings: &[],
    compensate_input_dpi: true,
};

/// Multiplies each pixel by a 5x4 color matrix.
pub struct ColorMatrix;

impl ColorMatrix {
    pub const ID: EffectId = EffectId::from_u128(0x921f03d6_641c_47df_852d_b4bb6153ae11);

    pub const COLOR_MATRIX: PropertyKey<Matrix5x4, AsFloatArray> = PropertyKey::new(0);
    /// `AlphaMode::Ignore` is rejected.
    pub const ALPHA_MODE: PropertyKey<AlphaMode, AlphaModeAsUInt> = PropertyKey::new(1);
    pub const CLAMP_OUTPUT: PropertyKey<bool, Direct> = PropertyKey::new(2);
}

builtin_effect!(ColorMatrix => COLOR_MATRIX);

#[rustfmt::skip]
const IDENTITY_5X4: [f32; 20] = [
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 1.0, 0.0,
    0.0, 0.0, 0.0, 1.0,
    0.0, 0.0, 0.0, 0.0,
];

static COLOR_MATRIX: EffectDescriptor = EffectDescriptor {
    name: "ColorMatrix",
    id: ColorMatrix::ID,
    properties: &[
        array("ColorMatrix", &IDENTITY_5X4),
        uint("AlphaMode", 1),
        boolean("ClampOutput", false),
    ],
    sources: SourceArity::Fixed(1),
    mappings: &[
        PropertyNameMapping::new("ColorMatrix", 0, PropertyMapping::Direct),
        PropertyNameMapping::new("ClampOutput", 2, PropertyMapping::Direct),
    ],
    hand_coded_mappings: &[PropertyNameMapping::new(
        "AlphaMode",
        1,
        PropertyMapping::ColorMatrixAlphaMode,
    )],
    compensate_input_dpi: true,
};

/// Blends any number of inputs, in order, with one composite mode.
pub struct Composite;

impl Composite {
    pub const ID: EffectId = EffectId::from_u128(0x48fc9f51_f6ac_48f1_8b58_3b28ac46f76d);

    pub const MODE: PropertyKey<CompositeMode, AsUInt> = PropertyKey::new(0);
}

builtin_effect!(Composite => COMPOSITE);

static COMPOSITE: EffectDescriptor = EffectDescriptor {
    name: "Composite",
    id: Composite::ID,
    properties: &[uint("Mode", 0)],
    sources: SourceArity::Variable,
    mappings: &[PropertyNameMapping::new("Mode", 0, PropertyMapping::Direct)],
    hand_coded_mappings: &[],
    compensate_input_dpi: true,
};

/// Restricts its input to a rectangle.
pub struct Crop;

impl Crop {
    pub const ID: EffectId = EffectId::from_u128(0xe23f7110_0e9a_4324_af47_6a2c0c46f35b);

    /// The default is the unbounded rectangle `[-MAX, -MAX, MAX, MAX]`. Its
    /// width and height overflow to infinity when read as a [`Rect`], so
    /// writing the read value back stores `[-MAX, -MAX, inf, inf]` rather
    /// than the default. Use [`Effect::set_property`](crate::Effect::set_property)
    /// with the raw vector to restore it exactly.
    pub const SOURCE_RECTANGLE: PropertyKey<Rect, RectAsVector4> = PropertyKey::new(0);
    pub const BORDER_MODE: PropertyKey<BorderMode, AsUInt> = PropertyKey::new(1);
}

builtin_effect!(Crop => CROP);

static CROP: EffectDescriptor = EffectDescriptor {
    name: "Crop",
    id: Crop::ID,
    properties: &[
        array("Rect", &[-f32::MAX, -f32::MAX, f32::MAX, f32::MAX]),
        uint("BorderMode", 0),
    ],
    sources: SourceArity::Fixed(1),
    mappings: &[
        PropertyNameMapping::new("SourceRectangle", 0, PropertyMapping::RectToVector4),
        PropertyNameMapping::new("BorderMode", 1, PropertyMapping::Direct),
    ],
    hand_coded_mappings: &[],
    compensate_input_dpi: true,
};

/// Rotates hue. The angle is public in radians and stored in degrees.
pub struct HueRotation;

impl HueRotation {
    pub const ID: EffectId = EffectId::from_u128(0x0f4458ec_4b32_491b_9e85_bd73f44d3eb6);

    pub const ANGLE: PropertyKey<f32, RadiansAsDegrees> = PropertyKey::new(0);
}

builtin_effect!(HueRotation => HUE_ROTATION);

static HUE_ROTATION: EffectDescriptor = EffectDescriptor {
    name: "HueRotation",
    id: HueRotation::ID,
    properties: &[float("Angle", 0.0)],
    sources: SourceArity::Fixed(1),
    mappings: &[PropertyNameMapping::new("Angle", 0, PropertyMapping::RadiansToDegrees)],
    hand_coded_mappings: &[],
    compensate_input_dpi: true,
};

/// Combines two inputs as `k1*a*b + k2*a + k3*b + k4`.
///
/// The four coefficients live in one vector property; the public names
/// address its components.
pub struct ArithmeticComposite;

impl ArithmeticComposite {
    pub const ID: EffectId = EffectId::from_u128(0xfc151437_049a_4784_a24a_f1c4daf20987);

    pub const COEFFICIENTS: PropertyKey<Vector4, AsFloatArray> = PropertyKey::new(0);
    pub const CLAMP_OUTPUT: PropertyKey<bool, Direct> = PropertyKey::new(1);
}

builtin_effect!(ArithmeticComposite => ARITHMETIC_COMPOSITE);

static ARITHMETIC_COMPOSITE: EffectDescriptor = EffectDescriptor {
    name: "ArithmeticComposite",
    id: ArithmeticComposite::ID,
    properties: &[
        array("Coefficients", &[1.0, 0.0, 0.0, 0.0]),
        boolean("ClampOutput", false),
    ],
    sources: SourceArity::Fixed(2),
    mappings: &[PropertyNameMapping::new("ClampOutput", 1, PropertyMapping::Direct)],
    hand_coded_mappings: &[
        PropertyNameMapping::new("MultiplyAmount", 0, PropertyMapping::VectorX),
        PropertyNameMapping::new("Source1Amount", 0, PropertyMapping::VectorY),
        PropertyNameMapping::new("Source2Amount", 0, PropertyMapping::VectorZ),
        PropertyNameMapping::new("Offset", 0, PropertyMapping::VectorW),
    ],
    compensate_input_dpi: true,
};

/// Linear blend of two inputs.
pub struct CrossFade;

impl CrossFade {
    pub const ID: EffectId = EffectId::from_u128(0x12f575e8_4db1_485f_9a84_03a07dd3829f);

    /// Weight of the first input, in `0.0..=1.0`.
    pub const WEIGHT: PropertyKey<f32, Direct> = PropertyKey::new(0);
}

builtin_effect!(CrossFade => CROSS_FADE);

static CROSS_FADE: EffectDescriptor = EffectDescriptor {
    name: "CrossFade",
    id: CrossFade::ID,
    properties: &[float("Weight", 0.5).validated(unit_interval)],
    sources: SourceArity::Fixed(2),
    mappings: &[PropertyNameMapping::new("Weight", 0, PropertyMapping::Direct)],
    hand_coded_mappings: &[PropertyNameMapping::new(
        "CrossFade",
        0,
        PropertyMapping::Direct,
    )],
    compensate_input_dpi: true,
};

/// Per-channel step-function lookup tables.
pub struct DiscreteTransfer;

impl DiscreteTransfer {
    pub const ID: EffectId = EffectId::from_u128(0x90866fcd_488e_454b_af06_e5041b66c36c);

    pub const RED_TABLE: ArrayPropertyKey = ArrayPropertyKey::new(0);
    pub const RED_DISABLE: PropertyKey<bool, Direct> = PropertyKey::new(1);
    pub const GREEN_TABLE: ArrayPropertyKey = ArrayPropertyKey::new(2);
    pub const GREEN_DISABLE: PropertyKey<bool, Direct> = PropertyKey::new(3);
    pub const BLUE_TABLE: ArrayPropertyKey = ArrayPropertyKey::new(4);
    pub const BLUE_DISABLE: PropertyKey<bool, Direct> = PropertyKey::new(5);
    pub const ALPHA_TABLE: ArrayPropertyKey = ArrayPropertyKey::new(6);
    pub const ALPHA_DISABLE: PropertyKey<bool, Direct> = PropertyKey::new(7);
    pub const CLAMP_OUTPUT: PropertyKey<bool, Direct> = PropertyKey::new(8);
}

builtin_effect!(DiscreteTransfer => DISCRETE_TRANSFER);

const IDENTITY_TABLE: &[f32] = &[0.0, 1.0];

static DISCRETE_TRANSFER: EffectDescriptor = EffectDescriptor {
    name: "DiscreteTransfer",
    id: DiscreteTransfer::ID,
    properties: &[
        var_array("RedTable", IDENTITY_TABLE),
        boolean("RedDisable", false),
        var_array("GreenTable", IDENTITY_TABLE),
        boolean("GreenDisable", false),
        var_array("BlueTable", IDENTITY_TABLE),
        boolean("BlueDisable", false),
        var_array("AlphaTable", IDENTITY_TABLE),
        boolean("AlphaDisable", false),
        boolean("ClampOutput", false),
    ],
    sources: SourceArity::Fixed(1),
    mappings: &[
        PropertyNameMapping::new("RedTable", 0, PropertyMapping::Direct),
        PropertyNameMapping::new("RedDisable", 1, PropertyMapping::Direct),
        PropertyNameMapping::new("GreenTable", 2, PropertyMapping::Direct),
        PropertyNameMapping::new("GreenDisable", 3, PropertyMapping::Direct),
        PropertyNameMapping::new("BlueTable", 4, PropertyMapping::Direct),
        PropertyNameMapping::new("BlueDisable", 5, PropertyMapping::Direct),
        PropertyNameMapping::new("AlphaTable", 6, PropertyMapping::Direct),
        PropertyNameMapping::new("AlphaDisable", 7, PropertyMapping::Direct),
        PropertyNameMapping::new("ClampOutput", 8, PropertyMapping::Direct),
    ],
    hand_coded_mappings: &[],
    compensate_input_dpi: true,
};

/// Applies a 2D affine transform.
pub struct Transform2D;

impl Transform2D {
    pub const ID: EffectId = EffectId::from_u128(0x6aa97485_6354_4cfc_908c_e4a74f62c96c);

    pub const INTERPOLATION_MODE: PropertyKey<InterpolationMode, AsUInt> = PropertyKey::new(0);
    pub const BORDER_MODE: PropertyKey<BorderMode, AsUInt> = PropertyKey::new(1);
    pub const TRANSFORM_MATRIX: PropertyKey<Matrix3x2, AsFloatArray> = PropertyKey::new(2);
    pub const SHARPNESS: PropertyKey<f32, Direct> = PropertyKey::new(3);
}

builtin_effect!(Transform2D => TRANSFORM_2D);

static TRANSFORM_2D: EffectDescriptor = EffectDescriptor {
    name: "Transform2D",
    id: Transform2D::ID,
    properties: &[
        uint("InterpolationMode", 1),
        uint("BorderMode", 0),
        array("TransformMatrix", &[1.0, 0.0, 0.0, 1.0, 0.0, 0.0]),
        float("Sharpness", 0.0).validated(unit_interval),
    ],
    sources: SourceArity::Fixed(1),
    mappings: &[
        PropertyNameMapping::new("InterpolationMode", 0, PropertyMapping::Direct),
        PropertyNameMapping::new("BorderMode", 1, PropertyMapping::Direct),
        PropertyNameMapping::new("TransformMatrix", 2, PropertyMapping::Direct),
        PropertyNameMapping::new("Sharpness", 3, PropertyMapping::Direct),
    ],
    hand_coded_mappings: &[],
    compensate_input_dpi: true,
};

/// Converts luminance into alpha.
pub struct LuminanceToAlpha;

builtin_effect!(LuminanceToAlpha => LUMINANCE_TO_ALPHA);

impl LuminanceToAlpha {
    pub const ID: EffectId = EffectId::from_u128(0x41251ab7_0beb_46f8_9da7_59e93fcce5de);
}

static LUMINANCE_TO_ALPHA: EffectDescriptor = EffectDescriptor {
    name: "LuminanceToAlpha",
    id: LuminanceToAlpha::ID,
    properties: &[],
    sources: SourceArity::Fixed(1),
    mappings: &[],
    hand_coded_mappings: &[],
    compensate_input_dpi: true,
};

/// Diffuse lighting from a point light, using the input alpha as a height map.
pub struct PointDiffuse;

impl PointDiffuse {
    pub const ID: EffectId = EffectId::from_u128(0xb9e303c3_c08c_4f91_8b7b_38656bc48c20);

    pub const LIGHT_POSITION: PropertyKey<Vector3, AsFloatArray> = PropertyKey::new(0);
    pub const DIFFUSE_AMOUNT: PropertyKey<f32, Direct> = PropertyKey::new(1);
    pub const HEIGHT_MAP_SCALE: PropertyKey<f32, Direct> = PropertyKey::new(2);
    pub const LIGHT_COLOR: PropertyKey<Color, ColorAsVector3> = PropertyKey::new(3);
    pub const HEIGHT_MAP_KERNEL_SIZE: PropertyKey<Vector2, AsFloatArray> = PropertyKey::new(4);
    pub const HEIGHT_MAP_INTERPOLATION_MODE: PropertyKey<InterpolationMode, AsUInt> =
        PropertyKey::new(5);
}

builtin_effect!(PointDiffuse => POINT_DIFFUSE);

static POINT_DIFFUSE: EffectDescriptor = EffectDescriptor {
    name: "PointDiffuse",
    id: PointDiffuse::ID,
    properties: &[
        array("LightPosition", &[0.0, 0.0, 0.0]),
        float("DiffuseConstant", 1.0).validated(non_negative),
        float("SurfaceScale", 1.0),
        array("Color", &[1.0, 1.0, 1.0]),
        array("KernelUnitLength", &[1.0, 1.0]),
        uint("ScaleMode", 1),
    ],
    sources: SourceArity::Fixed(1),
    mappings: &[
        PropertyNameMapping::new("LightPosition", 0, PropertyMapping::Direct),
        PropertyNameMapping::new("DiffuseAmount", 1, PropertyMapping::Direct),
        PropertyNameMapping::new("HeightMapScale", 2, PropertyMapping::Direct),
        PropertyNameMapping::new("LightColor", 3, PropertyMapping::ColorToVector3),
        PropertyNameMapping::new("HeightMapKernelSize", 4, PropertyMapping::Direct),
        PropertyNameMapping::new("HeightMapInterpolationMode", 5, PropertyMapping::Direct),
    ],
    hand_coded_mappings: &[],
    compensate_input_dpi: true,
};

/// Rescales an input from one DPI to the DPI of the effect consuming it.
///
/// The realization engine inserts these stages on its own; there is rarely a
/// reason to create one by hand.
pub struct DpiCompensation;

impl DpiCompensation {
    pub const ID: EffectId = EffectId::from_u128(0x6c26c5c7_34e0_46fc_9cfd_e5823706e2e9);

    pub const INTERPOLATION_MODE: PropertyKey<InterpolationMode, AsUInt> = PropertyKey::new(0);
    pub const BORDER_MODE: PropertyKey<BorderMode, AsUInt> = PropertyKey::new(1);
    pub const INPUT_DPI: PropertyKey<Vector2, AsFloatArray> = PropertyKey::new(2);
}

builtin_effect!(DpiCompensation => DPI_COMPENSATION);

static DPI_COMPENSATION: EffectDescriptor = EffectDescriptor {
    name: "DpiCompensation",
    id: DpiCompensation::ID,
    properties: &[
        uint("InterpolationMode", 1),
        uint("BorderMode", 0),
        array("InputDpi", &[96.0, 96.0]),
    ],
    sources: SourceArity::Fixed(1),
    mappings: &[
        PropertyNameMapping::new("InterpolationMode", 0, PropertyMapping::Direct),
        PropertyNameMapping::new("BorderMode", 1, PropertyMapping::Direct),
        PropertyNameMapping::new("InputDpi", 2, PropertyMapping::Direct),
    ],
    hand_coded_mappings: &[],
    compensate_input_dpi: false,
};
