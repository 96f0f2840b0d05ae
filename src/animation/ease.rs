/// Shaping curve applied between two keyframes.
///
/// The `Out` and `InOut` variants are derived from the cubic `In` curve by reflection, so
/// every curve maps `0 -> 0` and `1 -> 1` exactly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Ease {
    /// Identity.
    #[default]
    Linear,
    /// Slow start (cubic).
    In,
    /// Slow stop (cubic).
    Out,
    /// Slow start and stop (cubic halves).
    InOut,
    /// Hermite smoothstep, `3t^2 - 2t^3`.
    Smooth,
}

impl Ease {
    /// Map `t` through the curve. Input is clamped to `[0, 1]`.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        let cubic_in = |x: f64| x * x * x;
        match self {
            Self::Linear => t,
            Self::In => cubic_in(t),
            Self::Out => 1.0 - cubic_in(1.0 - t),
            Self::InOut if t < 0.5 => 0.5 * cubic_in(2.0 * t),
            Self::InOut => 1.0 - 0.5 * cubic_in(2.0 - 2.0 * t),
            Self::Smooth => t * t * (3.0 - 2.0 * t),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
