use super::*;
use crate::foundation::core::{DMat4, DVec3, Rgba8Premul};
use crate::foundation::math::overflow_rect;
use crate::render::bounds::BoundsDevice;
use crate::render::device::{InterpolationMode, NodeKind};

struct Rig {
    dev: BoundsDevice,
    transform: NodeId,
    crop: NodeId,
    image: ImageRef,
}

fn rig(half: f64, matrix: DMat4) -> Rig {
    let mut dev = BoundsDevice::default();
    let image = dev
        .flood(centered_rect(half, half), Rgba8Premul::from_straight_rgba(0, 0, 0, 0))
        .unwrap()
        .output();
    let transform = dev.create_node(NodeKind::Transform3d).unwrap();
    let crop = dev.create_node(NodeKind::Crop).unwrap();
    dev.set_param(
        transform,
        NodeParam::Transform3d {
            matrix,
            interpolation: InterpolationMode::Linear,
        },
    )
    .unwrap();
    Rig {
        dev,
        transform,
        crop,
        image,
    }
}

#[test]
fn representable_bounds_skip_the_crop() {
    let mut r = rig(100.0, DMat4::from_scale(DVec3::new(2.0, 2.0, 1.0)));
    let res = apply(&mut r.dev, r.transform, r.crop, r.image, 2048.0).unwrap();
    assert_eq!(res.outcome, GuardOutcome::NotNeeded);
    assert_eq!(res.bounds, centered_rect(200.0, 200.0));
    assert_eq!(r.dev.inputs(r.transform).unwrap(), &[Some(r.image)]);
    assert_eq!(r.dev.inputs(r.crop).unwrap(), &[None]);
}

#[test]
fn dense_minification_is_clamped_to_safe_rect() {
    let mut r = rig(
        50_000.0,
        DMat4::from_scale(DVec3::new(1e-6, 1e-6, 1.0)),
    );
    r.dev.set_input(r.transform, 0, Some(r.image)).unwrap();
    assert_eq!(r.dev.image_bounds(r.transform.output()).unwrap(), overflow_rect());

    let res = apply(&mut r.dev, r.transform, r.crop, r.image, 2048.0).unwrap();
    assert_eq!(res.outcome, GuardOutcome::Clamped);
    assert_eq!(r.dev.inputs(r.transform).unwrap(), &[Some(r.crop.output())]);
    assert_eq!(
        r.dev.image_bounds(r.crop.output()).unwrap(),
        centered_rect(2048.0, 2048.0)
    );
    assert!(res.bounds.width() < 1.0);
}

#[test]
fn geometry_behind_the_camera_is_dropped() {
    let mut m = DMat4::IDENTITY;
    m.w_axis.w = -1.0;
    let mut r = rig(10.0, m);
    let res = apply(&mut r.dev, r.transform, r.crop, r.image, 2048.0).unwrap();
    assert_eq!(res.outcome, GuardOutcome::Dropped);
}
