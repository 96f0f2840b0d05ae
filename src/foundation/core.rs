use crate::foundation::error::{ShapeFxError, ShapeFxResult};

pub use glam::{DMat4, DVec2, DVec3, DVec4};
pub use kurbo::{Affine, Point, Rect, Vec2};

/// 0-based frame index, local to the item that owns the shape layer.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Half-open frame range `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    /// Inclusive range start.
    pub start: FrameIndex,
    /// Exclusive range end.
    pub end: FrameIndex,
}

impl FrameRange {
    /// Create a validated range with `start <= end`.
    pub fn new(start: FrameIndex, end: FrameIndex) -> ShapeFxResult<Self> {
        if start.0 > end.0 {
            return Err(ShapeFxError::validation("FrameRange start must be <= end"));
        }
        Ok(Self { start, end })
    }

    /// Parse `"A..B"` (half-open) into a range.
    pub fn parse(s: &str) -> ShapeFxResult<Self> {
        let (a, b) = s
            .split_once("..")
            .ok_or_else(|| ShapeFxError::validation(format!("frame range '{s}' must be A..B")))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<u64>()
                .map_err(|_| ShapeFxError::validation(format!("invalid frame number '{v}'")))
        };
        Self::new(FrameIndex(parse(a)?), FrameIndex(parse(b)?))
    }

    /// Iterate all frames in the range in playback order.
    pub fn frames(self) -> impl Iterator<Item = FrameIndex> {
        (self.start.0..self.end.0).map(FrameIndex)
    }
}

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> ShapeFxResult<Self> {
        if den == 0 {
            return Err(ShapeFxError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(ShapeFxError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert a frame count to seconds.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * f64::from(self.den) / f64::from(self.num)
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red channel premultiplied by alpha.
    pub r: u8,
    /// Green channel premultiplied by alpha.
    pub g: u8,
    /// Blue channel premultiplied by alpha.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Convert straight-alpha RGBA8 into premultiplied RGBA8.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
