//! Placement of the shape inside the background.
//!
//! Each axis is resolved independently: the natural extent of the shape (rendered bounds times
//! zoom) gives two edges around the center, and a pinned edge replaces its natural position with
//! the background edge moved inwards by the margin. The axis scale maps the shape's rendered
//! extent onto the span between the resolved edges; the translation is their midpoint.

use crate::animation::anim::AnimatedScalar;
use crate::animation::param::ScalarParam;
use crate::effects::draw::FrameContext;
use crate::foundation::core::{DMat4, DVec2, DVec3, Rect};
use crate::layer::model::{EdgePins, ShapeLayer};

/// Animated layer scalars evaluated for one frame, with percentages turned into factors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutParams {
    /// Shape center.
    pub position: DVec3,
    /// Rotation in degrees.
    pub rotation: DVec3,
    /// Uniform zoom factor, never below the configured minimum.
    pub zoom: f64,
    /// Per-axis zoom factors.
    pub axis_zoom: DVec2,
    /// Opacity factor in `[0, 1]`.
    pub opacity: f64,
    /// Margins `[left, right, top, bottom]`.
    pub margins: [f64; 4],
    /// Pinned edges.
    pub pins: EdgePins,
    /// Horizontal mirroring.
    pub invert_x: bool,
    /// Vertical mirroring.
    pub invert_y: bool,
}

impl LayoutParams {
    /// Evaluate every layer scalar at `ctx`.
    pub fn evaluate(layer: &ShapeLayer, ctx: &FrameContext, min_zoom: f64) -> Self {
        let at = |p: &ScalarParam| p.evaluate(ctx.frame, ctx.length, ctx.fps);
        Self {
            position: DVec3::new(at(&layer.x), at(&layer.y), at(&layer.z)),
            rotation: DVec3::new(
                at(&layer.rotation_x),
                at(&layer.rotation_y),
                at(&layer.rotation_z),
            ),
            zoom: (at(&layer.zoom) / 100.0).max(min_zoom),
            axis_zoom: DVec2::new(at(&layer.zoom_x) / 100.0, at(&layer.zoom_y) / 100.0),
            opacity: (at(&layer.opacity) / 100.0).clamp(0.0, 1.0),
            margins: [
                at(&layer.margin_left),
                at(&layer.margin_right),
                at(&layer.margin_top),
                at(&layer.margin_bottom),
            ],
            pins: layer.pins,
            invert_x: layer.invert_x,
            invert_y: layer.invert_y,
        }
    }
}

/// Resolved placement along one axis.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct AxisPlacement {
    /// Left or top edge.
    pub near: f64,
    /// Right or bottom edge.
    pub far: f64,
    /// Unsigned scale from rendered extent to `far - near`.
    pub scale: f64,
    /// Midpoint of the edges.
    pub offset: f64,
}

/// Resolve one axis.
///
/// `near_pin` / `far_pin` carry the margin of a pinned edge.
pub fn resolve_axis(
    center: f64,
    shape_extent: f64,
    zoom: f64,
    background_extent: f64,
    near_pin: Option<f64>,
    far_pin: Option<f64>,
) -> AxisPlacement {
    let half = shape_extent / 2.0 * zoom;
    let half_bg = background_extent / 2.0;
    let near = near_pin.map_or(center - half, |m| -half_bg + m);
    let far = far_pin.map_or(center + half, |m| half_bg - m);
    let scale = if shape_extent > 0.0 {
        (far - near) / shape_extent
    } else {
        0.0
    };
    AxisPlacement {
        near,
        far,
        scale,
        offset: (near + far) / 2.0,
    }
}

/// Full placement of the shape for one frame.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Placement {
    /// Horizontal axis.
    pub x: AxisPlacement,
    /// Vertical axis.
    pub y: AxisPlacement,
    /// Depth translation.
    pub z: f64,
    /// Rotation in degrees.
    pub rotation: DVec3,
    /// Scale including mirroring.
    pub scale: DVec2,
    /// Opacity factor.
    pub opacity: f64,
}

impl Placement {
    /// Place a shape whose rendered bounds are `shape` over a background with bounds
    /// `background`.
    pub fn resolve(params: &LayoutParams, shape: Rect, background: Rect) -> Self {
        let shape_w = shape.width().max(1.0);
        let shape_h = shape.height().max(1.0);
        let [left, right, top, bottom] = params.margins;
        let pins = params.pins;

        let x = resolve_axis(
            params.position.x,
            shape_w,
            params.axis_zoom.x * params.zoom,
            background.width(),
            pins.left.then_some(left),
            pins.right.then_some(right),
        );
        let y = resolve_axis(
            params.position.y,
            shape_h,
            params.axis_zoom.y * params.zoom,
            background.height(),
            pins.top.then_some(top),
            pins.bottom.then_some(bottom),
        );
        let sign = |invert: bool| if invert { -1.0 } else { 1.0 };

        Self {
            x,
            y,
            z: params.position.z,
            rotation: params.rotation,
            scale: DVec2::new(x.scale * sign(params.invert_x), y.scale * sign(params.invert_y)),
            opacity: params.opacity,
        }
    }

    /// Column-vector matrix: scale, then rotate X, Y, Z, then translate, then perspective.
    pub fn matrix(&self, camera_distance: f64) -> DMat4 {
        let scale = DMat4::from_scale(DVec3::new(self.scale.x, self.scale.y, 1.0));
        let rx = DMat4::from_rotation_x(self.rotation.x.to_radians());
        let ry = DMat4::from_rotation_y(self.rotation.y.to_radians());
        let rz = DMat4::from_rotation_z(self.rotation.z.to_radians());
        let translate = DMat4::from_translation(DVec3::new(self.x.offset, self.y.offset, self.z));
        perspective(camera_distance) * translate * rz * ry * rx * scale
    }
}

/// One-point perspective with the camera `distance` units in front of the `z = 0` plane.
pub fn perspective(distance: f64) -> DMat4 {
    let mut p = DMat4::IDENTITY;
    p.z_axis.w = -1.0 / distance;
    p
}

#[cfg(test)]
#[path = "../../tests/unit/compositor/layout.rs"]
mod tests;
