use std::f32::consts::FRAC_PI_2;

use canvas_effects::backend::recording::{RecordingBitmap, RecordingContext};
use canvas_effects::effects::{
    ArithmeticComposite, BorderMode, ColorMatrix, Composite, CrossFade, DiscreteTransfer,
    GaussianBlur, HueRotation, PointDiffuse, Transform2D,
};
use canvas_effects::{
    AlphaMode, BoxedValue, Color, Effect, EffectError, EffectId, EffectSource, Matrix5x4,
    PropertyMapping, RealizationState, Rect, Vector4,
};

type TestEffect = Effect<RecordingContext>;

#[test]
fn defaults_come_from_the_descriptor() {
    let blur: TestEffect = GaussianBlur::new();
    assert_eq!(blur.property_count().unwrap(), 3);
    assert_eq!(blur.get(GaussianBlur::STANDARD_DEVIATION).unwrap(), 3.0);
    assert_eq!(blur.get(GaussianBlur::BORDER_MODE).unwrap(), BorderMode::Soft);
    assert_eq!(blur.name().unwrap(), "");
}

#[test]
fn angles_are_stored_in_degrees() {
    let hue: TestEffect = HueRotation::new();
    hue.set(HueRotation::ANGLE, FRAC_PI_2).unwrap();

    match hue.property(0).unwrap() {
        BoxedValue::Float(degrees) => assert!((degrees - 90.0).abs() < 1e-4),
        other => panic!("unexpected {other:?}"),
    }
    assert!((hue.get(HueRotation::ANGLE).unwrap() - FRAC_PI_2).abs() < 1e-6);
}

#[test]
fn colors_drop_alpha_in_vector3_properties() {
    let light: TestEffect = PointDiffuse::new();
    light
        .set(PointDiffuse::LIGHT_COLOR, Color::from_rgba(0.25, 0.5, 0.75, 0.1))
        .unwrap();

    assert_eq!(
        light.property(3).unwrap(),
        BoxedValue::FloatArray(vec![0.25, 0.5, 0.75])
    );
    assert_eq!(
        light.get(PointDiffuse::LIGHT_COLOR).unwrap(),
        Color::from_rgb(0.25, 0.5, 0.75)
    );
}

#[test]
fn ignore_alpha_mode_is_rejected_without_side_effects() {
    let ctx = RecordingContext::new();
    let matrix: TestEffect = ColorMatrix::new();
    matrix
        .set_source(
            0,
            Some(EffectSource::image(RecordingBitmap::new(
                Rect::new(0.0, 0.0, 1.0, 1.0),
                96.0,
            ))),
        )
        .unwrap();
    matrix.set(ColorMatrix::ALPHA_MODE, AlphaMode::Straight).unwrap();
    matrix.realize(&ctx, 96.0).unwrap();

    let err = matrix
        .set(ColorMatrix::ALPHA_MODE, AlphaMode::Ignore)
        .unwrap_err();
    assert!(matches!(err, EffectError::InvalidArgument(_)));
    assert_eq!(
        matrix.get(ColorMatrix::ALPHA_MODE).unwrap(),
        AlphaMode::Straight
    );
    assert_eq!(matrix.property(1).unwrap(), BoxedValue::UInt(2));
    assert_eq!(matrix.realization_state(), RealizationState::Realized);
}

#[test]
fn validators_guard_property_domains() {
    let fade: TestEffect = CrossFade::new();
    assert!(matches!(
        fade.set(CrossFade::WEIGHT, 1.5),
        Err(EffectError::InvalidArgument(_))
    ));
    assert!(matches!(
        fade.set_property(0, BoxedValue::Float(-0.1)),
        Err(EffectError::InvalidArgument(_))
    ));
    assert_eq!(fade.get(CrossFade::WEIGHT).unwrap(), 0.5);

    fade.set(CrossFade::WEIGHT, 1.0).unwrap();
    assert_eq!(fade.get(CrossFade::WEIGHT).unwrap(), 1.0);

    let blur: TestEffect = GaussianBlur::new();
    assert!(blur.set(GaussianBlur::STANDARD_DEVIATION, -1.0).is_err());
}

#[test]
fn wrong_array_length_keeps_previous_value() {
    let matrix: TestEffect = ColorMatrix::new();
    let err = matrix
        .set_property(0, BoxedValue::FloatArray(vec![0.0; 19]))
        .unwrap_err();
    assert!(matches!(
        err,
        EffectError::ArraySizeMismatch {
            expected: 20,
            actual: 19
        }
    ));
    assert!(err.is_out_of_bounds());
    assert_eq!(
        matrix.get(ColorMatrix::COLOR_MATRIX).unwrap(),
        Matrix5x4::IDENTITY
    );
}

#[test]
fn reflection_checks_kind_and_index() {
    let blur: TestEffect = GaussianBlur::new();
    assert!(matches!(
        blur.set_property(0, BoxedValue::UInt(3)),
        Err(EffectError::InvalidArgument(_))
    ));
    assert!(matches!(
        blur.property(3),
        Err(EffectError::OutOfBounds { index: 3, len: 3 })
    ));
    assert!(matches!(
        blur.set_property(7, BoxedValue::Float(1.0)),
        Err(EffectError::OutOfBounds { .. })
    ));

    blur.set_property(2, BoxedValue::UInt(1)).unwrap();
    assert_eq!(blur.get(GaussianBlur::BORDER_MODE).unwrap(), BorderMode::Hard);
}

#[test]
fn keys_of_other_effect_types_are_rejected() {
    let ctx = RecordingContext::new();
    let blur: TestEffect = GaussianBlur::new();
    blur.set_source(
        0,
        Some(EffectSource::image(RecordingBitmap::new(
            Rect::new(0.0, 0.0, 1.0, 1.0),
            96.0,
        ))),
    )
    .unwrap();
    blur.realize(&ctx, 96.0).unwrap();

    // Past the end of the blur's properties.
    assert!(matches!(
        blur.set(Transform2D::SHARPNESS, 0.5),
        Err(EffectError::OutOfBounds { index: 3, len: 3 })
    ));
    assert!(matches!(
        blur.get(Transform2D::SHARPNESS),
        Err(EffectError::OutOfBounds { index: 3, len: 3 })
    ));
    assert!(matches!(
        blur.get_array(DiscreteTransfer::ALPHA_TABLE),
        Err(EffectError::OutOfBounds { index: 6, len: 3 })
    ));

    // In range, but the slot holds another kind.
    assert!(matches!(
        blur.set(ColorMatrix::CLAMP_OUTPUT, true),
        Err(EffectError::InvalidArgument(_))
    ));
    assert!(matches!(
        blur.set_array(DiscreteTransfer::RED_TABLE, &[0.0, 1.0]),
        Err(EffectError::InvalidArgument(_))
    ));
    assert!(matches!(
        blur.get_array(DiscreteTransfer::RED_TABLE),
        Err(EffectError::InvalidArgument(_))
    ));

    assert_eq!(blur.property(2).unwrap(), BoxedValue::UInt(0));
    assert_eq!(blur.get(GaussianBlur::BORDER_MODE).unwrap(), BorderMode::Soft);
    assert_eq!(blur.property(0).unwrap(), BoxedValue::Float(3.0));
    assert_eq!(blur.realization_state(), RealizationState::Realized);
}

#[test]
fn unknown_enum_values_fail_to_unbox() {
    let blur: TestEffect = GaussianBlur::new();
    blur.set_property(1, BoxedValue::UInt(42)).unwrap();
    assert!(matches!(
        blur.get(GaussianBlur::OPTIMIZATION),
        Err(EffectError::InvalidArgument(_))
    ));
}

#[test]
fn variable_length_tables() {
    let transfer: TestEffect = DiscreteTransfer::new();
    assert_eq!(
        transfer.get_array(DiscreteTransfer::RED_TABLE).unwrap(),
        vec![0.0, 1.0]
    );

    transfer
        .set_array(DiscreteTransfer::RED_TABLE, &[0.0, 0.25, 0.5, 1.0])
        .unwrap();
    assert_eq!(
        transfer.get_array(DiscreteTransfer::RED_TABLE).unwrap().len(),
        4
    );
    assert_eq!(
        transfer.get_array(DiscreteTransfer::GREEN_TABLE).unwrap(),
        vec![0.0, 1.0]
    );
}

#[test]
fn named_properties_resolve_through_both_tables() {
    let matrix: TestEffect = ColorMatrix::new();
    assert_eq!(
        matrix.named_property_mapping("alphaMode").unwrap(),
        (1, PropertyMapping::ColorMatrixAlphaMode)
    );

    let arithmetic: TestEffect = ArithmeticComposite::new();
    assert_eq!(
        arithmetic.named_property_mapping("Offset").unwrap(),
        (0, PropertyMapping::VectorW)
    );
    arithmetic
        .set(
            ArithmeticComposite::COEFFICIENTS,
            Vector4::new(0.0, 1.0, 1.0, 0.5),
        )
        .unwrap();
    assert_eq!(
        arithmetic.property(0).unwrap(),
        BoxedValue::FloatArray(vec![0.0, 1.0, 1.0, 0.5])
    );

    let err = matrix.named_property_mapping("Radius").unwrap_err();
    assert!(matches!(err, EffectError::NotFound(name) if name == "Radius"));
}

#[test]
fn create_by_id_uses_builtin_registry() {
    let blur = TestEffect::create(GaussianBlur::ID).unwrap();
    assert_eq!(blur.effect_id().unwrap(), GaussianBlur::ID);

    let unknown = TestEffect::create(EffectId::from_u128(1));
    assert!(matches!(unknown, Err(EffectError::NotFound(_))));
}

#[test]
fn fixed_source_lists_do_not_grow() {
    let blur: TestEffect = GaussianBlur::new();
    assert_eq!(blur.source_count().unwrap(), 1);

    let image = EffectSource::image(RecordingBitmap::new(Rect::new(0.0, 0.0, 1.0, 1.0), 96.0));
    assert!(matches!(
        blur.set_source(1, Some(image.clone())),
        Err(EffectError::OutOfBounds { index: 1, len: 1 })
    ));
    assert!(matches!(
        blur.push_source(Some(image)),
        Err(EffectError::InvalidArgument(_))
    ));
    assert_eq!(blur.source_count().unwrap(), 1);
}

#[test]
fn variable_source_lists_append_at_the_end() {
    let composite: TestEffect = Composite::new();
    let image = EffectSource::image(RecordingBitmap::new(Rect::new(0.0, 0.0, 1.0, 1.0), 96.0));

    composite.set_source(0, Some(image.clone())).unwrap();
    composite.set_source(1, None).unwrap();
    assert_eq!(composite.source_count().unwrap(), 2);
    assert!(composite.source(1).unwrap().is_none());

    assert!(composite.set_source(3, Some(image.clone())).is_err());
    assert_eq!(composite.source_count().unwrap(), 2);

    let sources = composite.sources().unwrap();
    assert!(sources[0].as_ref().is_some_and(|s| s.ptr_eq(&image)));
}

#[test]
fn name_is_a_free_form_label() {
    let ctx = RecordingContext::new();
    let blur: TestEffect = GaussianBlur::new();
    blur.set_source(
        0,
        Some(EffectSource::image(RecordingBitmap::new(
            Rect::new(0.0, 0.0, 1.0, 1.0),
            96.0,
        ))),
    )
    .unwrap();
    blur.realize(&ctx, 96.0).unwrap();

    blur.set_name("background blur").unwrap();
    assert_eq!(blur.name().unwrap(), "background blur");
    assert_eq!(blur.realization_state(), RealizationState::Realized);
}
