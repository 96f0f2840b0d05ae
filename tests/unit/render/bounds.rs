use super::*;
use crate::foundation::core::DVec3;
use crate::foundation::math::{centered_rect, is_overflow_rect};
use crate::render::device::InterpolationMode;

fn white() -> Rgba8Premul {
    Rgba8Premul::from_straight_rgba(255, 255, 255, 255)
}

fn transform(dev: &mut BoundsDevice, input: NodeId, matrix: DMat4) -> NodeId {
    let t = dev.create_node(NodeKind::Transform3d).unwrap();
    dev.set_input(t, 0, Some(input.output())).unwrap();
    dev.set_param(
        t,
        NodeParam::Transform3d {
            matrix,
            interpolation: InterpolationMode::Linear,
        },
    )
    .unwrap();
    t
}

#[test]
fn flood_and_crop_bounds() {
    let mut dev = BoundsDevice::default();
    let flood = dev.flood(centered_rect(100.0, 50.0), white()).unwrap();
    let crop = dev.create_node(NodeKind::Crop).unwrap();
    dev.set_input(crop, 0, Some(flood.output())).unwrap();
    dev.set_param(crop, NodeParam::Crop(Rect::new(0.0, 0.0, 500.0, 500.0)))
        .unwrap();
    assert_eq!(
        dev.image_bounds(crop.output()).unwrap(),
        Rect::new(0.0, 0.0, 100.0, 50.0)
    );
}

#[test]
fn composite_unions_unless_copy() {
    let mut dev = BoundsDevice::default();
    let a = dev.flood(Rect::new(0.0, 0.0, 10.0, 10.0), white()).unwrap();
    let b = dev.flood(Rect::new(20.0, 0.0, 30.0, 10.0), white()).unwrap();
    let c = dev.create_node(NodeKind::Composite).unwrap();
    dev.set_input(c, 0, Some(a.output())).unwrap();
    dev.set_input(c, 1, Some(b.output())).unwrap();
    assert_eq!(
        dev.image_bounds(c.output()).unwrap(),
        Rect::new(0.0, 0.0, 30.0, 10.0)
    );
    dev.set_param(c, NodeParam::Composite(CompositeMode::SourceCopy))
        .unwrap();
    assert_eq!(
        dev.image_bounds(c.output()).unwrap(),
        Rect::new(0.0, 0.0, 10.0, 10.0)
    );
}

#[test]
fn alpha_mask_limits_to_mask_bounds() {
    let mut dev = BoundsDevice::default();
    let content = dev.flood(centered_rect(100.0, 100.0), white()).unwrap();
    let mask = dev.flood(centered_rect(10.0, 20.0), white()).unwrap();
    let m = dev.create_node(NodeKind::AlphaMask).unwrap();
    dev.set_input(m, 0, Some(content.output())).unwrap();
    dev.set_input(m, 1, Some(mask.output())).unwrap();
    assert_eq!(
        dev.image_bounds(m.output()).unwrap(),
        centered_rect(10.0, 20.0)
    );
}

#[test]
fn transform3d_scales_bounds() {
    let mut dev = BoundsDevice::default();
    let flood = dev.flood(centered_rect(10.0, 10.0), white()).unwrap();
    let t = transform(
        &mut dev,
        flood,
        DMat4::from_scale(DVec3::new(3.0, 2.0, 1.0)),
    );
    assert_eq!(
        dev.image_bounds(t.output()).unwrap(),
        centered_rect(30.0, 20.0)
    );
}

#[test]
fn transform3d_reports_sentinel_past_limits() {
    let mut dev = BoundsDevice::default();
    let flood = dev.flood(centered_rect(1000.0, 1000.0), white()).unwrap();

    let huge = transform(
        &mut dev,
        flood,
        DMat4::from_scale(DVec3::new(1.0e5, 1.0e5, 1.0)),
    );
    assert!(is_overflow_rect(dev.image_bounds(huge.output()).unwrap()));

    let mut p = DMat4::IDENTITY;
    p.z_axis.w = -1.0 / 1000.0;
    let behind = transform(
        &mut dev,
        flood,
        p * DMat4::from_translation(DVec3::new(0.0, 0.0, 1500.0)),
    );
    assert!(is_overflow_rect(dev.image_bounds(behind.output()).unwrap()));

    let wide = dev.flood(centered_rect(50_000.0, 50_000.0), white()).unwrap();
    let dense = transform(
        &mut dev,
        wide,
        DMat4::from_scale(DVec3::new(1.0e-6, 1.0e-6, 1.0)),
    );
    assert!(is_overflow_rect(dev.image_bounds(dense.output()).unwrap()));

    assert_eq!(dev.stats().overflow_reports, 3);
}

#[test]
fn wiring_errors_are_reported() {
    let mut dev = BoundsDevice::default();
    let flood = dev.flood(centered_rect(1.0, 1.0), white()).unwrap();
    let op = dev.create_node(NodeKind::Opacity).unwrap();
    assert!(dev.set_input(op, 1, Some(flood.output())).is_err());
    assert!(dev.set_input(op, 0, Some(NodeId(999).output())).is_err());
    assert!(dev.set_param(op, NodeParam::Crop(Rect::ZERO)).is_err());
    assert!(dev.image_bounds(NodeId(999).output()).is_err());
}

#[test]
fn disposed_inputs_evaluate_as_empty() {
    let mut dev = BoundsDevice::default();
    let flood = dev.flood(centered_rect(5.0, 5.0), white()).unwrap();
    let op = dev.create_node(NodeKind::Opacity).unwrap();
    dev.set_input(op, 0, Some(flood.output())).unwrap();
    dev.dispose_node(flood);
    assert_eq!(dev.image_bounds(op.output()).unwrap(), Rect::ZERO);
}

#[test]
fn disposal_is_counted_once() {
    let mut dev = BoundsDevice::default();
    let n = dev.create_node(NodeKind::Empty).unwrap();
    dev.dispose_node(n);
    dev.dispose_node(n);
    let st = dev.stats();
    assert_eq!(st.created, 1);
    assert_eq!(st.disposed, 1);
    assert_eq!(st.invalid_disposals, 1);
    assert_eq!(dev.live_nodes(), 0);
}

#[test]
fn node_limit_fails_creation() {
    let mut dev = BoundsDevice::new(BoundsDeviceOpts {
        max_live_nodes: Some(1),
        ..BoundsDeviceOpts::default()
    });
    dev.create_node(NodeKind::Empty).unwrap();
    assert!(dev.create_node(NodeKind::Empty).is_err());
}
