use canvas_effects::backend::recording::{
    RecordedImage, RecordingBitmap, RecordingContext, RecordingStats,
};
use canvas_effects::effects::{ColorMatrix, Composite, DpiCompensation, GaussianBlur};
use canvas_effects::property::{PropertyDefault, PropertyDescriptor};
use canvas_effects::{
    BackendError, BoxedValue, DeviceContext, Effect, EffectDescriptor, EffectError, EffectId,
    EffectSource, Matrix3x2, PropertyKey, PropertyType, RealizationState, Rect, SourceArity,
    boxed::Direct,
};

type TestEffect = Effect<RecordingContext>;

static TWO_FLOATS: EffectDescriptor = EffectDescriptor {
    name: "TwoFloats",
    id: EffectId::from_u128(0x5d7c_0f4e_2b1a_4c39_9e8d_7a6b_5c4d_3e2f),
    properties: &[
        PropertyDescriptor::new("First", PropertyType::Float, PropertyDefault::Float(0.0)),
        PropertyDescriptor::new("Second", PropertyType::Float, PropertyDefault::Float(1.0)),
    ],
    sources: SourceArity::Fixed(1),
    mappings: &[],
    hand_coded_mappings: &[],
    compensate_input_dpi: false,
};

const FIRST: PropertyKey<f32, Direct> = PropertyKey::new(0);
const SECOND: PropertyKey<f32, Direct> = PropertyKey::new(1);

fn bitmap(dpi: f32) -> EffectSource<RecordingContext> {
    EffectSource::image(RecordingBitmap::new(Rect::new(0.0, 0.0, 10.0, 20.0), dpi))
}

fn blur_over_bitmap(dpi: f32) -> TestEffect {
    let blur = GaussianBlur::new();
    blur.set_source(0, Some(bitmap(dpi))).unwrap();
    blur
}

fn native_of(image: &RecordedImage) -> canvas_effects::backend::recording::NativeEffect {
    RecordingContext::effect_of(image)
        .cloned()
        .expect("effect output")
}

#[test]
fn unchanged_effect_takes_fast_path() {
    let ctx = RecordingContext::new();
    let effect = TestEffect::new(&TWO_FLOATS);
    effect.set(FIRST, 0.5).unwrap();
    effect.set_source(0, Some(bitmap(96.0))).unwrap();

    let first = effect.realize(&ctx, 96.0).unwrap();
    let after_first = ctx.stats();
    assert_eq!(
        after_first,
        RecordingStats {
            effects_created: 1,
            input_counts_set: 1,
            inputs_bound: 1,
            values_set: 2,
        }
    );

    let second = effect.realize(&ctx, 96.0).unwrap();
    assert_eq!(second.realization_id, first.realization_id);
    assert_eq!(ctx.stats(), after_first);

    effect.set(SECOND, 2.0).unwrap();
    let third = effect.realize(&ctx, 96.0).unwrap();
    assert_eq!(third.realization_id, second.realization_id + 1);

    let after_third = ctx.stats();
    assert_eq!(after_third.effects_created, 1);
    assert_eq!(after_third.values_set, after_first.values_set + 2);

    let native = native_of(&third.image);
    assert_eq!(ctx.value(&native, 0), Some(BoxedValue::Float(0.5)));
    assert_eq!(ctx.value(&native, 1), Some(BoxedValue::Float(2.0)));
}

#[test]
fn effects_report_resolution_independent_output() {
    let ctx = RecordingContext::new();
    let realized = blur_over_bitmap(96.0).realize(&ctx, 96.0).unwrap();
    assert_eq!(realized.dpi, 0.0);
    assert_eq!(realized.realization_id, 1);
}

#[test]
fn parent_change_does_not_rebuild_sources() {
    let ctx = RecordingContext::new();
    let blur = blur_over_bitmap(96.0);
    let tint: TestEffect = ColorMatrix::new();
    tint.set_source(0, Some(blur.clone().into())).unwrap();

    tint.realize(&ctx, 96.0).unwrap();
    let blur_id = blur.realization_id();
    let created = ctx.stats().effects_created;

    tint.set(ColorMatrix::CLAMP_OUTPUT, true).unwrap();
    let tint_id = tint.realization_id();
    tint.realize(&ctx, 96.0).unwrap();

    assert_eq!(blur.realization_id(), blur_id);
    assert_eq!(tint.realization_id(), tint_id + 1);
    assert_eq!(ctx.stats().effects_created, created);
}

#[test]
fn source_change_propagates_to_parent() {
    let ctx = RecordingContext::new();
    let blur = blur_over_bitmap(96.0);
    let tint: TestEffect = ColorMatrix::new();
    tint.set_source(0, Some((&blur).into())).unwrap();
    tint.realize(&ctx, 96.0).unwrap();

    blur.set(GaussianBlur::STANDARD_DEVIATION, 8.0).unwrap();
    assert_eq!(tint.realization_state(), RealizationState::Realized);

    let realized = tint.realize(&ctx, 96.0).unwrap();
    assert_eq!(realized.realization_id, 2);
    assert_eq!(blur.realization_id(), 2);

    let native = native_of(&realized.image);
    let blur_native = native_of(&blur.image(&ctx).unwrap());
    assert_eq!(
        ctx.inputs(&native),
        vec![Some(RecordedImage::Effect(blur_native))]
    );
}

#[test]
fn state_follows_property_changes() {
    let ctx = RecordingContext::new();
    let blur = blur_over_bitmap(96.0);
    assert_eq!(blur.realization_state(), RealizationState::Unrealized);

    blur.realize(&ctx, 96.0).unwrap();
    assert_eq!(blur.realization_state(), RealizationState::Realized);

    blur.set(GaussianBlur::STANDARD_DEVIATION, 1.0).unwrap();
    assert_eq!(blur.realization_state(), RealizationState::Stale);

    blur.realize(&ctx, 96.0).unwrap();
    assert_eq!(blur.realization_state(), RealizationState::Realized);
}

#[test]
fn self_source_is_a_cycle() {
    let blur: TestEffect = GaussianBlur::new();
    blur.set_name("loop").unwrap();

    let err = blur.set_source(0, Some(blur.clone().into())).unwrap_err();
    assert!(matches!(err, EffectError::Cycle(name) if name == "loop"));
    assert!(blur.source(0).unwrap().is_none());
}

#[test]
fn longer_cycles_fail_realization() {
    let ctx = RecordingContext::new();
    let a: TestEffect = GaussianBlur::new();
    let b: TestEffect = GaussianBlur::new();
    a.set_source(0, Some((&b).into())).unwrap();
    b.set_source(0, Some((&a).into())).unwrap();

    let err = a.realize(&ctx, 96.0).unwrap_err();
    assert!(matches!(err, EffectError::Cycle(_)));
    assert_eq!(a.realization_state(), RealizationState::Unrealized);
    assert_eq!(b.realization_state(), RealizationState::Unrealized);
    assert_eq!(ctx.live_effects(), 0);

    // Break the reference cycle.
    a.close();
    b.close();
}

#[test]
fn missing_source_can_be_fixed_and_retried() {
    let ctx = RecordingContext::new();
    let blur: TestEffect = GaussianBlur::new();

    let err = blur.realize(&ctx, 96.0).unwrap_err();
    assert!(matches!(err, EffectError::MissingSource(0)));
    assert_eq!(blur.realization_state(), RealizationState::Unrealized);

    blur.set_source(0, Some(bitmap(96.0))).unwrap();
    assert!(blur.realize(&ctx, 96.0).is_ok());
    assert_eq!(blur.realization_state(), RealizationState::Realized);
}

#[test]
fn backend_failure_resets_state() {
    let ctx = RecordingContext::new();
    let blur = blur_over_bitmap(96.0);

    ctx.fail_creation_of(Some(GaussianBlur::ID));
    let err = blur.realize(&ctx, 96.0).unwrap_err();
    assert!(matches!(
        err,
        EffectError::Backend(BackendError::EffectCreationFailed(id)) if id == GaussianBlur::ID
    ));
    assert_eq!(blur.realization_state(), RealizationState::Unrealized);
    assert_eq!(blur.realization_id(), 0);

    ctx.fail_creation_of(None);
    assert_eq!(blur.realize(&ctx, 96.0).unwrap().realization_id, 1);
}

#[test]
fn failed_pass_forces_full_rebuild() {
    let ctx = RecordingContext::new();
    let blur = blur_over_bitmap(96.0);
    let tint: TestEffect = ColorMatrix::new();
    tint.set_source(0, Some((&blur).into())).unwrap();
    tint.realize(&ctx, 96.0).unwrap();

    // A failing source aborts the parent's pass; both recover once it is
    // fixed, reusing their native instances.
    blur.set_source(0, None).unwrap();
    assert!(tint.realize(&ctx, 96.0).is_err());
    blur.set_source(0, Some(bitmap(96.0))).unwrap();

    ctx.reset_stats();
    let realized = tint.realize(&ctx, 96.0).unwrap();
    assert_eq!(realized.realization_id, 2);
    assert_eq!(ctx.stats().effects_created, 0);
    assert!(ctx.stats().values_set > 0);
}

#[test]
fn device_loss_recreates_native_effects() {
    let ctx = RecordingContext::new();
    let blur = blur_over_bitmap(96.0);
    let first = blur.realize(&ctx, 96.0).unwrap();
    let first_native = native_of(&first.image);
    drop(first);

    ctx.lose_device();
    let second = blur.realize(&ctx, 96.0).unwrap();
    assert_eq!(second.realization_id, 2);
    assert_eq!(ctx.stats().effects_created, 2);
    assert!(!native_of(&second.image).ptr_eq(&first_native));

    drop(first_native);
    assert_eq!(ctx.live_effects(), 1);
}

#[test]
fn mismatched_dpi_inserts_compensation() {
    let ctx = RecordingContext::new();
    let blur = blur_over_bitmap(192.0);

    let realized = blur.realize(&ctx, 96.0).unwrap();
    assert_eq!(ctx.stats().effects_created, 2);

    let native = native_of(&realized.image);
    let inputs = ctx.inputs(&native);
    let compensator = match &inputs[0] {
        Some(RecordedImage::Effect(effect)) => effect.clone(),
        other => panic!("expected a compensation stage, got {other:?}"),
    };
    assert_eq!(ctx.effect_type(&compensator), Some(DpiCompensation::ID));
    assert_eq!(
        ctx.value(&compensator, DpiCompensation::INPUT_DPI.index()),
        Some(BoxedValue::FloatArray(vec![192.0, 192.0]))
    );
    assert!(matches!(
        ctx.inputs(&compensator)[0],
        Some(RecordedImage::Bitmap { .. })
    ));

    // Cached stage, nothing recreated.
    let again = blur.realize(&ctx, 96.0).unwrap();
    assert_eq!(again.realization_id, realized.realization_id);
    assert_eq!(ctx.stats().effects_created, 2);

    drop((realized, again, native, inputs, compensator));

    // At the bitmap's own DPI the stage is dropped.
    let native_dpi = blur.realize(&ctx, 192.0).unwrap();
    assert_eq!(native_dpi.realization_id, 2);
    assert!(matches!(
        ctx.inputs(&native_of(&native_dpi.image))[0],
        Some(RecordedImage::Bitmap { .. })
    ));
    assert_eq!(ctx.live_effects(), 1);
}

fn compensator_of(
    ctx: &RecordingContext,
    image: &RecordedImage,
) -> canvas_effects::backend::recording::NativeEffect {
    match &ctx.inputs(&native_of(image))[0] {
        Some(RecordedImage::Effect(effect)) => effect.clone(),
        other => panic!("expected a compensation stage, got {other:?}"),
    }
}

#[test]
fn compensation_stage_is_reconfigured_for_a_new_source_dpi() {
    let ctx = RecordingContext::new();
    let blur = blur_over_bitmap(192.0);

    let first = blur.realize(&ctx, 96.0).unwrap();
    let compensator = compensator_of(&ctx, &first.image);
    assert_eq!(ctx.stats().effects_created, 2);

    blur.set_source(0, Some(bitmap(144.0))).unwrap();
    let second = blur.realize(&ctx, 96.0).unwrap();

    assert_eq!(second.realization_id, first.realization_id + 1);
    assert_eq!(ctx.stats().effects_created, 2);

    let reused = compensator_of(&ctx, &second.image);
    assert!(reused.ptr_eq(&compensator));
    assert_eq!(
        ctx.value(&reused, DpiCompensation::INPUT_DPI.index()),
        Some(BoxedValue::FloatArray(vec![144.0, 144.0]))
    );
    match &ctx.inputs(&reused)[0] {
        Some(RecordedImage::Bitmap { bounds, .. }) => {
            assert_eq!(*bounds, Rect::new(0.0, 0.0, 10.0, 20.0))
        }
        other => panic!("expected the new bitmap, got {other:?}"),
    }
}

#[test]
fn compensation_stage_is_recreated_after_device_loss() {
    let ctx = RecordingContext::new();
    let blur = blur_over_bitmap(192.0);

    let first = blur.realize(&ctx, 96.0).unwrap();
    let old_native = native_of(&first.image);
    let old_compensator = compensator_of(&ctx, &first.image);
    assert_eq!(ctx.stats().effects_created, 2);

    ctx.lose_device();
    let second = blur.realize(&ctx, 96.0).unwrap();

    assert_eq!(second.realization_id, 2);
    assert_eq!(ctx.stats().effects_created, 4);

    let new_native = native_of(&second.image);
    let new_compensator = compensator_of(&ctx, &second.image);
    assert!(!new_native.ptr_eq(&old_native));
    assert!(!new_compensator.ptr_eq(&old_compensator));
    assert_eq!(ctx.effect_type(&new_compensator), Some(DpiCompensation::ID));
    assert_eq!(
        ctx.value(&new_compensator, DpiCompensation::INPUT_DPI.index()),
        Some(BoxedValue::FloatArray(vec![192.0, 192.0]))
    );

    drop((first, old_native, old_compensator));
    assert_eq!(ctx.live_effects(), 2);
}

#[test]
fn effect_sources_are_never_compensated() {
    let ctx = RecordingContext::new().with_dpi(144.0);
    let blur = blur_over_bitmap(144.0);
    let tint: TestEffect = ColorMatrix::new();
    tint.set_source(0, Some((&blur).into())).unwrap();

    tint.image(&ctx).unwrap();
    assert_eq!(ctx.stats().effects_created, 2);
}

#[test]
fn bounds_come_from_the_realized_graph() {
    let ctx = RecordingContext::new();
    let blur = blur_over_bitmap(96.0);

    assert_eq!(blur.bounds(&ctx).unwrap(), Rect::new(0.0, 0.0, 10.0, 20.0));
    assert_eq!(
        blur.bounds_with_transform(&ctx, &Matrix3x2::scale(2.0, 0.5))
            .unwrap(),
        Rect::new(0.0, 0.0, 20.0, 10.0)
    );
}

#[test]
fn bounds_detect_cycles() {
    let ctx = RecordingContext::new();
    let a: TestEffect = ColorMatrix::new();
    let b: TestEffect = ColorMatrix::new();
    a.set_source(0, Some((&b).into())).unwrap();
    b.set_source(0, Some((&a).into())).unwrap();

    assert!(matches!(a.bounds(&ctx), Err(EffectError::Cycle(_))));

    a.close();
    b.close();
}

#[test]
fn close_releases_everything() {
    let ctx = RecordingContext::new();
    let blur = blur_over_bitmap(192.0);
    blur.realize(&ctx, 96.0).unwrap();
    assert_eq!(ctx.live_effects(), 2);

    blur.close();
    assert!(blur.is_closed());
    assert_eq!(blur.realization_state(), RealizationState::Unrealized);
    assert_eq!(ctx.live_effects(), 0);

    assert!(matches!(blur.realize(&ctx, 96.0), Err(EffectError::Disposed)));
    assert!(matches!(blur.property_count(), Err(EffectError::Disposed)));
    assert!(matches!(blur.source(0), Err(EffectError::Disposed)));
    assert!(matches!(
        blur.set(GaussianBlur::STANDARD_DEVIATION, 1.0),
        Err(EffectError::Disposed)
    ));
    assert!(matches!(blur.name(), Err(EffectError::Disposed)));

    blur.close();
    assert!(blur.is_closed());
}

#[test]
fn closed_source_fails_parent_realization() {
    let ctx = RecordingContext::new();
    let blur = blur_over_bitmap(96.0);
    let tint: TestEffect = ColorMatrix::new();
    tint.set_source(0, Some((&blur).into())).unwrap();

    blur.close();
    assert!(matches!(tint.realize(&ctx, 96.0), Err(EffectError::Disposed)));
    assert_eq!(tint.realization_state(), RealizationState::Unrealized);
}

#[test]
fn from_native_reuses_the_instance() {
    let ctx = RecordingContext::new();
    let native = ctx.create_effect(GaussianBlur::ID).unwrap();
    ctx.set_value(&native, 0, &BoxedValue::Float(7.0)).unwrap();

    let blur = TestEffect::from_native(GaussianBlur::descriptor(), &ctx, native.clone()).unwrap();
    assert_eq!(blur.get(GaussianBlur::STANDARD_DEVIATION).unwrap(), 7.0);

    blur.set_source(0, Some(bitmap(96.0))).unwrap();
    let realized = blur.realize(&ctx, 96.0).unwrap();
    assert!(native_of(&realized.image).ptr_eq(&native));
    assert_eq!(ctx.stats().effects_created, 1);
}

#[test]
fn from_native_on_another_device_recreates() {
    let ctx = RecordingContext::new();
    let native = ctx.create_effect(GaussianBlur::ID).unwrap();
    let blur = TestEffect::from_native(GaussianBlur::descriptor(), &ctx, native).unwrap();
    blur.set_source(0, Some(bitmap(96.0))).unwrap();

    ctx.lose_device();
    blur.realize(&ctx, 96.0).unwrap();
    assert_eq!(ctx.stats().effects_created, 2);
    assert_eq!(ctx.live_effects(), 1);
}

#[test]
fn variable_sources_resize_native_inputs() {
    let ctx = RecordingContext::new();
    let composite: TestEffect = Composite::new();
    composite.push_source(Some(bitmap(96.0))).unwrap();
    composite
        .push_source(Some(EffectSource::image(RecordingBitmap::new(
            Rect::new(30.0, 0.0, 10.0, 10.0),
            96.0,
        ))))
        .unwrap();

    let realized = composite.realize(&ctx, 96.0).unwrap();
    assert_eq!(ctx.input_count(&native_of(&realized.image)), 2);
    assert_eq!(
        composite.bounds(&ctx).unwrap(),
        Rect::new(0.0, 0.0, 40.0, 20.0)
    );

    composite.remove_source(0).unwrap();
    let shrunk = composite.realize(&ctx, 96.0).unwrap();
    assert_eq!(shrunk.realization_id, realized.realization_id + 1);
    assert_eq!(ctx.input_count(&native_of(&shrunk.image)), 1);

    composite.clear_sources().unwrap();
    assert_eq!(composite.source_count().unwrap(), 0);
    let empty = composite.realize(&ctx, 96.0).unwrap();
    assert_eq!(ctx.input_count(&native_of(&empty.image)), 0);
}

#[test]
fn shared_sources_are_realized_once_per_change() {
    let ctx = RecordingContext::new();
    let blur = blur_over_bitmap(96.0);

    let left: TestEffect = Composite::new();
    let right: TestEffect = Composite::new();
    left.push_source(Some((&blur).into())).unwrap();
    right.push_source(Some((&blur).into())).unwrap();

    left.realize(&ctx, 96.0).unwrap();
    right.realize(&ctx, 96.0).unwrap();
    assert_eq!(ctx.stats().effects_created, 3);
    assert_eq!(blur.realization_id(), 1);

    let root: TestEffect = Composite::new();
    root.push_source(Some(left.into())).unwrap();
    root.push_source(Some(right.into())).unwrap();
    root.realize(&ctx, 96.0).unwrap();
    assert_eq!(blur.realization_id(), 1);
    assert_eq!(ctx.stats().effects_created, 4);
}
