//! Crop guard against transforms whose bounds the rasterizer cannot represent.

use crate::foundation::core::Rect;
use crate::foundation::error::ShapeFxResult;
use crate::foundation::math::{centered_rect, is_overflow_rect};
use crate::render::device::{ImageRef, NodeId, NodeParam, RenderDevice};

/// What the guard did on the last frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardOutcome {
    /// Transform bounds were representable.
    NotNeeded,
    /// The pre-transform image was cropped to the safe rectangle.
    Clamped,
    /// Even the cropped image overflowed; the shape is dropped for this frame.
    Dropped,
}

/// Result of [`apply`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GuardResult {
    /// Outcome.
    pub outcome: GuardOutcome,
    /// Transform output bounds after the guard.
    pub bounds: Rect,
}

/// Wire `image` into `transform`, cropping it through `crop` when the transformed bounds hit
/// the overflow sentinel.
///
/// The transform parameter must already be set.
pub fn apply(
    dev: &mut dyn RenderDevice,
    transform: NodeId,
    crop: NodeId,
    image: ImageRef,
    half_extent: f64,
) -> ShapeFxResult<GuardResult> {
    dev.set_input(transform, 0, Some(image))?;
    let bounds = dev.image_bounds(transform.output())?;
    if !is_overflow_rect(bounds) {
        dev.set_input(crop, 0, None)?;
        return Ok(GuardResult {
            outcome: GuardOutcome::NotNeeded,
            bounds,
        });
    }

    dev.set_param(crop, NodeParam::Crop(centered_rect(half_extent, half_extent)))?;
    dev.set_input(crop, 0, Some(image))?;
    dev.set_input(transform, 0, Some(crop.output()))?;
    let bounds = dev.image_bounds(transform.output())?;

    if is_overflow_rect(bounds) {
        tracing::warn!(half_extent, "shape transform overflows even after cropping; shape dropped");
        Ok(GuardResult {
            outcome: GuardOutcome::Dropped,
            bounds,
        })
    } else {
        tracing::warn!(half_extent, "shape transform overflowed; input cropped");
        Ok(GuardResult {
            outcome: GuardOutcome::Clamped,
            bounds,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compositor/guard.rs"]
mod tests;
