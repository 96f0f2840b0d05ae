use crate::foundation::core::{DMat4, DVec2, DVec3, FrameIndex, Fps};

/// Placement state accumulated by the layers and effects that ran before the current one.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct DrawDescription {
    /// Draw position.
    pub draw: DVec3,
    /// Zoom factors (1.0 = 100%).
    pub zoom: DVec2,
    /// Rotation about each axis in degrees.
    pub rotation: DVec3,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// Horizontal mirroring.
    pub invert: bool,
    /// Camera matrix supplied by the host.
    pub camera: DMat4,
}

impl Default for DrawDescription {
    fn default() -> Self {
        Self {
            draw: DVec3::ZERO,
            zoom: DVec2::ONE,
            rotation: DVec3::ZERO,
            opacity: 1.0,
            invert: false,
            camera: DMat4::IDENTITY,
        }
    }
}

/// Per-frame input from the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameContext {
    /// Item-local frame.
    pub frame: FrameIndex,
    /// Item duration in frames.
    pub length: u64,
    /// Project frame rate.
    pub fps: Fps,
    /// Descriptor handed to this layer.
    pub draw: DrawDescription,
}

impl FrameContext {
    /// Build a context with a default descriptor.
    pub fn new(frame: FrameIndex, length: u64, fps: Fps) -> Self {
        Self {
            frame,
            length,
            fps,
            draw: DrawDescription::default(),
        }
    }

    /// Same frame, different descriptor.
    pub fn with_draw(&self, draw: DrawDescription) -> Self {
        Self { draw, ..*self }
    }
}
