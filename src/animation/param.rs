use crate::{
    animation::anim::{Anim, AnimatedScalar},
    foundation::core::{FrameIndex, Fps},
    foundation::error::{ShapeFxError, ShapeFxResult},
};

/// Largest magnitude the editing layer accepts for positions, rotations and margins.
pub const POSITION_LIMIT: f64 = 100_000.0;

/// An animated value clamped to the range the editing layer allows.
#[derive(Clone, Debug, PartialEq)]
pub struct ScalarParam {
    /// Animation curve.
    pub anim: Anim,
    /// Inclusive lower bound.
    pub min: f64,
    /// Inclusive upper bound.
    pub max: f64,
}

impl ScalarParam {
    /// Build a parameter with an explicit range.
    pub fn new(anim: Anim, min: f64, max: f64) -> ShapeFxResult<Self> {
        if !(min.is_finite() && max.is_finite()) || min > max {
            return Err(ShapeFxError::validation(format!(
                "invalid parameter range [{min}, {max}]"
            )));
        }
        anim.validate()?;
        Ok(Self { anim, min, max })
    }

    /// Positions, rotations in degrees and margins.
    pub fn signed(anim: Anim) -> ShapeFxResult<Self> {
        Self::new(anim, -POSITION_LIMIT, POSITION_LIMIT)
    }

    /// Opacity in percent.
    pub fn percent(anim: Anim) -> ShapeFxResult<Self> {
        Self::new(anim, 0.0, 100.0)
    }

    /// Zoom factors in percent.
    pub fn zoom(anim: Anim) -> ShapeFxResult<Self> {
        Self::new(anim, 0.0, POSITION_LIMIT)
    }

    /// Constant value with the signed range. Infallible for finite inputs.
    pub fn fixed(value: f64) -> Self {
        Self {
            anim: Anim::Constant(value),
            min: -POSITION_LIMIT,
            max: POSITION_LIMIT,
        }
    }
}

impl AnimatedScalar for ScalarParam {
    fn evaluate(&self, frame: FrameIndex, length: u64, fps: Fps) -> f64 {
        self.anim.sample(frame, length, fps).clamp(self.min, self.max)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/param.rs"]
mod tests;
