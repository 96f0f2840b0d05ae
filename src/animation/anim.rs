use crate::{
    animation::ease::Ease,
    foundation::core::{FrameIndex, Fps},
    foundation::error::{ShapeFxError, ShapeFxResult},
};

/// A numeric parameter that can be evaluated for a frame of an item.
///
/// `frame` is local to the item, `length` is the item duration in frames.
pub trait AnimatedScalar {
    /// Evaluate the value at `frame`.
    fn evaluate(&self, frame: FrameIndex, length: u64, fps: Fps) -> f64;
}

/// Animated `f64` value.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Anim {
    /// Same value on every frame.
    Constant(f64),
    /// Explicit keyframes.
    Keyframes(Keyframes),
    /// Moves from `from` on the first frame to `to` on the last frame of the item.
    Ramp {
        /// Value at the first frame.
        from: f64,
        /// Value at the last frame.
        to: f64,
        /// Curve applied across the item length.
        #[serde(default)]
        ease: Ease,
    },
    /// `offset + amp * sin(2π (freq_hz * t + phase))`, `t` in seconds.
    Sine {
        /// Center value.
        #[serde(default)]
        offset: f64,
        /// Amplitude.
        amp: f64,
        /// Frequency in Hz.
        freq_hz: f64,
        /// Phase in cycles.
        #[serde(default)]
        phase: f64,
    },
}

impl Default for Anim {
    fn default() -> Self {
        Self::Constant(0.0)
    }
}

impl Anim {
    /// Shorthand for [`Anim::Constant`].
    pub fn constant(value: f64) -> Self {
        Self::Constant(value)
    }

    /// Check that sampling cannot produce non-finite values.
    pub fn validate(&self) -> ShapeFxResult<()> {
        match self {
            Self::Constant(v) => finite("Constant", *v),
            Self::Keyframes(kf) => kf.validate(),
            Self::Ramp { from, to, ease: _ } => {
                finite("Ramp.from", *from)?;
                finite("Ramp.to", *to)
            }
            Self::Sine {
                offset,
                amp,
                freq_hz,
                phase,
            } => {
                finite("Sine.offset", *offset)?;
                finite("Sine.amp", *amp)?;
                finite("Sine.phase", *phase)?;
                finite("Sine.freq_hz", *freq_hz)?;
                if *freq_hz < 0.0 {
                    return Err(ShapeFxError::animation("Sine.freq_hz must be >= 0"));
                }
                Ok(())
            }
        }
    }

    /// Sample the value at `frame`.
    pub fn sample(&self, frame: FrameIndex, length: u64, fps: Fps) -> f64 {
        match self {
            Self::Constant(v) => *v,
            Self::Keyframes(kf) => kf.sample(frame),
            Self::Ramp { from, to, ease } => {
                let last = length.saturating_sub(1);
                let t = if last == 0 {
                    0.0
                } else {
                    (frame.0.min(last) as f64) / (last as f64)
                };
                from + (to - from) * ease.apply(t)
            }
            Self::Sine {
                offset,
                amp,
                freq_hz,
                phase,
            } => {
                let t = fps.frames_to_secs(frame.0);
                offset + amp * (std::f64::consts::TAU * (freq_hz * t + phase)).sin()
            }
        }
    }
}

impl AnimatedScalar for Anim {
    fn evaluate(&self, frame: FrameIndex, length: u64, fps: Fps) -> f64 {
        self.sample(frame, length, fps)
    }
}

/// Keyframe track sorted by frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Keyframes {
    /// Keys sorted by frame.
    pub keys: Vec<Keyframe>,
    /// Interpolation between neighbouring keys.
    pub mode: InterpMode,
}

impl Keyframes {
    /// Check ordering and values.
    pub fn validate(&self) -> ShapeFxResult<()> {
        if self.keys.is_empty() {
            return Err(ShapeFxError::animation("Keyframes must have at least one key"));
        }
        if !self.keys.windows(2).all(|w| w[0].frame.0 <= w[1].frame.0) {
            return Err(ShapeFxError::animation(
                "Keyframes keys must be sorted by frame",
            ));
        }
        for k in &self.keys {
            finite("Keyframe.value", k.value)?;
        }
        Ok(())
    }

    /// Sample at `frame`. Frames outside the keyed span hold the nearest key.
    pub fn sample(&self, frame: FrameIndex) -> f64 {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return 0.0;
        };

        let f = frame.0;
        let idx = self.keys.partition_point(|k| k.frame.0 <= f);
        if idx == 0 {
            return first.value;
        }
        if idx >= self.keys.len() {
            return last.value;
        }

        let a = &self.keys[idx - 1];
        let b = &self.keys[idx];
        let denom = b.frame.0.saturating_sub(a.frame.0);
        if denom == 0 {
            return a.value;
        }

        match self.mode {
            InterpMode::Hold => a.value,
            InterpMode::Linear => {
                let t = ((f - a.frame.0) as f64) / (denom as f64);
                a.value + (b.value - a.value) * a.ease.apply(t)
            }
        }
    }
}

/// One keyed value.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Keyframe {
    /// Item-local frame.
    pub frame: FrameIndex,
    /// Value at `frame`.
    pub value: f64,
    /// Ease applied toward the next key.
    #[serde(default)]
    pub ease: Ease,
}

/// Interpolation mode between keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum InterpMode {
    /// Keep the previous key's value until the next key.
    Hold,
    /// Interpolate toward the next key.
    Linear,
}

fn finite(what: &str, v: f64) -> ShapeFxResult<()> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(ShapeFxError::animation(format!("{what} must be finite")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/anim.rs"]
mod tests;
