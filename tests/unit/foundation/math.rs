use super::*;
use crate::foundation::core::DVec3;

#[test]
fn overflow_rect_is_detected() {
    assert!(is_overflow_rect(overflow_rect()));
    assert!(!is_overflow_rect(centered_rect(2048.0, 2048.0)));

    let mut r = centered_rect(10.0, 10.0);
    r.x1 = OVERFLOW_SENTINEL;
    assert!(is_overflow_rect(r));
    r.x1 = f64::INFINITY;
    assert!(is_overflow_rect(r));
}

#[test]
fn union_and_intersection_skip_empty_operands() {
    let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    let b = Rect::new(20.0, 20.0, 30.0, 30.0);
    assert_eq!(union_nonempty(a, Rect::ZERO), a);
    assert_eq!(union_nonempty(Rect::ZERO, b), b);
    assert_eq!(union_nonempty(a, b), Rect::new(0.0, 0.0, 30.0, 30.0));
    assert_eq!(intersect_nonempty(a, b), Rect::ZERO);
    assert_eq!(
        intersect_nonempty(a, Rect::new(5.0, 5.0, 15.0, 15.0)),
        Rect::new(5.0, 5.0, 10.0, 10.0)
    );
}

#[test]
fn identity_projection_keeps_bounds() {
    let r = Rect::new(-50.0, -25.0, 50.0, 25.0);
    assert_eq!(project_rect_bbox(&DMat4::IDENTITY, r), Some(r));
}

#[test]
fn projection_behind_camera_fails() {
    let mut m = DMat4::from_translation(DVec3::new(0.0, 0.0, 2000.0));
    let mut p = DMat4::IDENTITY;
    p.z_axis.w = -1.0 / 1000.0;
    m = p * m;
    assert!(project_point(&m, 0.0, 0.0).is_none());
    assert!(project_rect_bbox(&m, Rect::new(-1.0, -1.0, 1.0, 1.0)).is_none());
}

#[test]
fn perspective_shrinks_points_pushed_away() {
    let mut p = DMat4::IDENTITY;
    p.z_axis.w = -1.0 / 1000.0;
    let m = p * DMat4::from_translation(DVec3::new(0.0, 0.0, -1000.0));
    let (x, y) = project_point(&m, 100.0, 50.0).unwrap();
    assert!((x - 50.0).abs() < 1e-9);
    assert!((y - 25.0).abs() < 1e-9);
}
