use crate::foundation::core::{DMat4, DVec4, Point, Rect};

/// Value a rasterizer reports on every side of an image whose bounds cannot be represented.
pub const OVERFLOW_SENTINEL: f64 = i32::MAX as f64;

/// `w` below this after projection means the point sits on or behind the camera plane.
pub(crate) const MIN_PROJECTED_W: f64 = 1e-6;

/// Bounds rectangle a device returns when a transform overflows.
pub fn overflow_rect() -> Rect {
    Rect::new(
        -OVERFLOW_SENTINEL,
        -OVERFLOW_SENTINEL,
        OVERFLOW_SENTINEL,
        OVERFLOW_SENTINEL,
    )
}

/// Return `true` when any side of `r` reached the overflow sentinel.
pub fn is_overflow_rect(r: Rect) -> bool {
    [r.x0, r.y0, r.x1, r.y1]
        .iter()
        .any(|v| !v.is_finite() || v.abs() >= OVERFLOW_SENTINEL)
}

/// Symmetric rectangle `[-half, half]` on both axes.
pub fn centered_rect(half_w: f64, half_h: f64) -> Rect {
    Rect::new(-half_w, -half_h, half_w, half_h)
}

/// Bounds that contain nothing.
pub fn is_empty_rect(r: Rect) -> bool {
    !(r.width() > 0.0 && r.height() > 0.0)
}

/// Union that ignores empty operands.
pub fn union_nonempty(a: Rect, b: Rect) -> Rect {
    match (is_empty_rect(a), is_empty_rect(b)) {
        (true, true) => Rect::ZERO,
        (true, false) => b,
        (false, true) => a,
        (false, false) => a.union(b),
    }
}

/// Intersection that collapses to [`Rect::ZERO`] when the operands do not overlap.
pub fn intersect_nonempty(a: Rect, b: Rect) -> Rect {
    let r = a.intersect(b);
    if is_empty_rect(r) { Rect::ZERO } else { r }
}

/// Project a `z = 0` point through a column-vector 4x4 matrix with perspective divide.
///
/// Returns `None` when the point lands on or behind the camera plane.
pub fn project_point(m: &DMat4, x: f64, y: f64) -> Option<(f64, f64)> {
    let p = *m * DVec4::new(x, y, 0.0, 1.0);
    if p.w < MIN_PROJECTED_W {
        return None;
    }
    Some((p.x / p.w, p.y / p.w))
}

/// Axis-aligned bounds of `r` after projection, or `None` when any corner fails to project.
pub fn project_rect_bbox(m: &DMat4, r: Rect) -> Option<Rect> {
    let corners = [(r.x0, r.y0), (r.x1, r.y0), (r.x1, r.y1), (r.x0, r.y1)];
    let mut out: Option<Rect> = None;
    for (x, y) in corners {
        let (px, py) = project_point(m, x, y)?;
        out = Some(match out {
            None => Rect::new(px, py, px, py),
            Some(acc) => acc.union_pt(Point::new(px, py)),
        });
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
