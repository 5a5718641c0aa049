//! Animation Tests
//!
//! Tests for:
//! - AnimCurve linear sampling, clamping and exact-key hits
//! - Seconds overload rounding
//! - Key flag sub-fields
//! - AnimNode local transform evaluation and static channel detection
//! - TimeMode frame grids

use glam::Vec3;

use slimfbx::animation::key::{AnimCurveKey, DataIndex, Interpolation, KeyFlags, SideMode, TangentMode};
use slimfbx::animation::time::{TICKS_PER_SECOND, TimeMode, TimeSpan, seconds_to_ticks};
use slimfbx::animation::{AnimCurve, AnimCurve3, AnimLayer, AnimNode, AnimStack};
use slimfbx::errors::PoseError;
use slimfbx::scene::node::Node;
use slimfbx::scene::transform::LocalTransform;

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn ramp() -> AnimCurve {
    AnimCurve::linear(&[(0, 0.0), (10, 10.0)]).unwrap()
}

// ============================================================================
// AnimCurve: sampling
// ============================================================================

#[test]
fn curve_samples_two_key_ramp() {
    let curve = ramp();
    assert_eq!(curve.sample(5), 5.0);
    assert_eq!(curve.sample(-1), 0.0);
    assert_eq!(curve.sample(11), 10.0);
    assert_eq!(curve.sample(0), 0.0);
    assert_eq!(curve.sample(10), 10.0);
}

#[test]
fn curve_exact_key_returns_key_value() {
    let values = [0.1_f32, 7.3, -2.9, 1e-3, 42.42, 0.333_333];
    let points: Vec<(i64, f32)> = values
        .iter()
        .enumerate()
        .map(|(i, &v)| (i as i64 * 1_000_003, v))
        .collect();
    let curve = AnimCurve::linear(&points).unwrap();

    for &(time, value) in &points {
        assert_eq!(curve.sample(time), value, "key at {time}");
    }
}

#[test]
fn curve_interpolates_in_correct_segment() {
    let curve = AnimCurve::linear(&[(0, 0.0), (100, 1.0), (200, 5.0), (300, 2.0), (400, 0.0)]).unwrap();
    assert!(approx(curve.sample(50), 0.5));
    assert!(approx(curve.sample(150), 3.0));
    assert!(approx(curve.sample(275), 2.75));
    assert!(approx(curve.sample(350), 1.0));
}

#[test]
fn curve_single_key_is_constant() {
    let curve = AnimCurve::constant(3.5);
    assert_eq!(curve.sample(i64::MIN), 3.5);
    assert_eq!(curve.sample(0), 3.5);
    assert_eq!(curve.sample(i64::MAX), 3.5);
}

#[test]
fn curve_interpolation_factor_uses_double_precision() {
    // Tick spans beyond f32's integer precision still interpolate exactly.
    let span = TICKS_PER_SECOND * 3600;
    let curve = AnimCurve::linear(&[(0, 0.0), (span, 1.0)]).unwrap();
    assert!(approx(curve.sample(span / 4), 0.25));
    assert!(approx(curve.sample(span - 1), 1.0));
}

#[test]
fn curve_blend_keeps_large_values_exact() {
    // Values near 2^24 lose their low bits if the blend runs in f32.
    let curve = AnimCurve::linear(&[(0, 16_777_216.0), (3, 16_777_220.0)]).unwrap();
    assert_eq!(curve.sample(1), 16_777_218.0);
}

#[test]
fn curve_cubic_keys_sample_linearly() {
    let mut k0 = AnimCurveKey::new(0, 0.0);
    k0.flags.set_interpolation(Interpolation::Cubic);
    k0.set_data_float(DataIndex::RightSlope, 100.0);
    let curve = AnimCurve::new(vec![k0, AnimCurveKey::new(10, 10.0)]).unwrap();
    assert!(approx(curve.sample(3), 3.0));
}

#[test]
fn curve_seconds_overload_rounds_to_tick() {
    let curve = AnimCurve::linear(&[(0, 0.0), (TICKS_PER_SECOND, 1.0)]).unwrap();
    assert!(approx(curve.sample_seconds(0.5), 0.5));
    assert_eq!(curve.sample_seconds(2.0), 1.0);
    assert_eq!(curve.sample_seconds(-1.0), 0.0);

    let tick = 1.0 / TICKS_PER_SECOND as f64;
    assert_eq!(seconds_to_ticks(tick * 1.6), 2);
    assert_eq!(seconds_to_ticks(tick * 1.4), 1);
}

#[test]
fn curve3_samples_each_axis() {
    let curve = AnimCurve3::new(
        ramp(),
        AnimCurve::constant(2.0),
        AnimCurve::linear(&[(0, 10.0), (10, 0.0)]).unwrap(),
    );
    assert!(curve.sample(5).abs_diff_eq(Vec3::new(5.0, 2.0, 5.0), EPSILON));
    assert_eq!(curve.time_span(), TimeSpan::new(0, 10));
}

#[test]
fn curve_scale_values_leaves_tangents() {
    let mut key = AnimCurveKey::new(0, 2.0);
    key.set_data_float(DataIndex::RightSlope, 4.0);
    let mut curve = AnimCurve::new(vec![key, AnimCurveKey::new(10, 6.0)]).unwrap();
    curve.scale_values(0.5);

    assert_eq!(curve.keys()[0].value, 1.0);
    assert_eq!(curve.keys()[1].value, 3.0);
    assert_eq!(curve.keys()[0].data_float(DataIndex::RightSlope), 4.0);
}

// ============================================================================
// AnimCurve: construction
// ============================================================================

#[test]
fn curve_rejects_out_of_order_keys() {
    let err = AnimCurve::linear(&[(0, 0.0), (20, 1.0), (10, 2.0)]).unwrap_err();
    match err {
        PoseError::UnsortedKeyframes { index, previous, current } => {
            assert_eq!((index, previous, current), (2, 20, 10));
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn curve_from_unsorted_sorts() {
    let curve = AnimCurve::from_unsorted(vec![
        AnimCurveKey::new(10, 10.0),
        AnimCurveKey::new(0, 0.0),
        AnimCurveKey::new(5, 1.0),
    ])
    .unwrap();
    let times: Vec<i64> = curve.keys().iter().map(|k| k.time).collect();
    assert_eq!(times, vec![0, 5, 10]);
    assert!(approx(curve.sample(7), 1.0 + 9.0 * 0.4));
}

// ============================================================================
// Key flags
// ============================================================================

#[test]
fn key_flags_round_trip_raw_bits() {
    for raw in [0x0000_0004_u32, 0x0100_0408, 0x3030_0c02, 0xFFFF_FFFF, 0x0000_6008] {
        let flags = KeyFlags::from_bits_retain(raw);
        assert_eq!(flags.bits(), raw);
    }
}

#[test]
fn key_flags_named_fields() {
    let mut flags = KeyFlags::empty();
    flags.set_interpolation(Interpolation::Cubic);
    flags.set_tangent_mode(TangentMode::GenericClampProgressive);
    flags.set_velocity_mode(SideMode::Right);

    assert_eq!(flags.bits(), 0x1000_6008);
    assert_eq!(flags.interpolation(), Some(Interpolation::Cubic));
    assert_eq!(flags.tangent_mode(), Some(TangentMode::GenericClampProgressive));
    assert_eq!(flags.velocity_mode(), SideMode::Right);
    assert_eq!(flags.weighted_mode(), SideMode::None);
}

// ============================================================================
// AnimNode
// ============================================================================

fn static_node() -> Node {
    Node::new().with_local(LocalTransform::from_trs(Vec3::new(9.0, 9.0, 9.0), Vec3::ZERO, Vec3::ONE))
}

fn anim_for(node: usize) -> AnimNode {
    AnimNode::new(
        node,
        AnimCurve3::constant(Vec3::ONE),
        AnimCurve3::new(AnimCurve::constant(0.0), AnimCurve::constant(0.0), ramp()),
        AnimCurve3::constant(Vec3::ZERO),
    )
}

#[test]
fn anim_node_keeps_node_pivots() {
    let mut node = static_node();
    node.local.rotation_pivot = Vec3::new(1.0, 2.0, 3.0);
    node.local.pre_rotation = Vec3::new(0.0, 90.0, 0.0);

    let local = anim_for(0).evaluate_local_transform(&node, 5);
    assert_eq!(local.rotation, Vec3::new(0.0, 0.0, 5.0));
    assert_eq!(local.translation, Vec3::ZERO, "translation comes from the curves");
    assert_eq!(local.rotation_pivot, node.local.rotation_pivot);
    assert_eq!(local.pre_rotation, node.local.pre_rotation);

    let by_seconds = anim_for(0).evaluate_local_transform_seconds(&node, 5.0 / TICKS_PER_SECOND as f64);
    assert_eq!(by_seconds, local);
}

#[test]
fn anim_node_default_channels() {
    let node = static_node();
    let anim = anim_for(0);
    assert!(anim.is_default_scaling(&node));
    assert!(anim.is_default_translation(&node));
    assert!(!anim.is_default_rotation(&node), "rotation z ramps");
}

#[test]
fn anim_node_pivots_make_channels_non_default() {
    let mut node = static_node();
    node.local.scaling_offset = Vec3::new(0.0, 0.0, 0.01);
    let anim = anim_for(0);
    assert!(!anim.is_default_scaling(&node));
    assert!(!anim.is_default_translation(&node));
}

#[test]
fn layer_lookup_first_wins() {
    let mut second = anim_for(3);
    second.translation = AnimCurve3::constant(Vec3::X);
    let layer = AnimLayer::new(Some("Base".into()), vec![anim_for(1), anim_for(3), second]);

    assert!(layer.find(2).is_none());
    assert_eq!(layer.find(3).unwrap().translation, AnimCurve3::constant(Vec3::ZERO));
    let map = layer.node_map();
    assert_eq!(map.len(), 2);
    assert_eq!(map[&3], 1);
    assert_eq!(layer.time_span(), Some(TimeSpan::new(0, 10)));
}

// ============================================================================
// Time grids
// ============================================================================

#[test]
fn stack_sample_times_cover_span_inclusively() {
    let step = TimeMode::Frames30.ticks_per_frame().unwrap();
    let stack = AnimStack::new(Some("Take 001".into()), TimeSpan::new(0, step * 3));
    assert_eq!(stack.sample_times(TimeMode::Frames30).unwrap(), vec![0, step, step * 2, step * 3]);

    let ragged = AnimStack::new(None, TimeSpan::new(10, 10 + step * 2 - 1));
    assert_eq!(ragged.sample_times(TimeMode::Frames30).unwrap(), vec![10, 10 + step]);
}

#[test]
fn frame_lengths_match_rates() {
    assert_eq!(TimeMode::Frames30.ticks_per_frame(), Some(TICKS_PER_SECOND / 30));
    assert_eq!(TimeMode::Frames24.ticks_per_frame(), Some(TICKS_PER_SECOND / 24));
    assert_eq!(TimeMode::Frames120.ticks_per_frame(), Some(TICKS_PER_SECOND / 120));
    assert_eq!(TimeMode::Frames1000.ticks_per_frame(), Some(TICKS_PER_SECOND / 1000));
    let ntsc = TimeMode::NtscFullFrame.frames_per_second().unwrap();
    assert!((ntsc - 29.97).abs() < 1e-2);
}

#[test]
fn drop_frame_alias_has_no_grid() {
    let span = TimeSpan::new(0, TICKS_PER_SECOND);
    assert!(matches!(
        span.sample_times(TimeMode::Frames30Drop),
        Err(PoseError::NoFixedFrameRate(TimeMode::Frames30Drop))
    ));
}
