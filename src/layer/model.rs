//! Shape layer configuration: the serde-facing [`ShapeLayerSpec`] and the runtime
//! [`ShapeLayer`] the compositor reads every frame.

use crate::{
    animation::{
        anim::Anim,
        param::{POSITION_LIMIT, ScalarParam},
    },
    effects::{builtin::BuiltinEffect, processor::EffectHandle},
    foundation::core::Rgba8Premul,
    foundation::error::{ShapeFxError, ShapeFxResult},
    shape::{builtin::RectangleShape, source::ShapeHandle},
};

/// One sub-effect record.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EffectInstance {
    /// Effect kind, case-insensitive (`opacity_mul`, `offset`, `zoom_mul`, `transform_post`, `blur`).
    pub kind: String,
    /// Kind-specific parameters.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub params: serde_json::Value,
    /// Disabled effects keep their processor but are bypassed.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

/// Shape kinds that can be described in a layer file.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapeSpec {
    /// Solid rectangle centered on the layer origin.
    Rectangle {
        /// Width in pixels.
        #[serde(default = "default_side")]
        width: Anim,
        /// Height in pixels.
        #[serde(default = "default_side")]
        height: Anim,
        /// Straight-alpha RGBA8 fill.
        #[serde(default = "default_color")]
        color: [u8; 4],
    },
}

fn default_side() -> Anim {
    Anim::Constant(100.0)
}

fn default_color() -> [u8; 4] {
    [255, 255, 255, 255]
}

impl Default for ShapeSpec {
    fn default() -> Self {
        Self::Rectangle {
            width: default_side(),
            height: default_side(),
            color: default_color(),
        }
    }
}

impl ShapeSpec {
    /// Build the shape parameter under a fresh identity.
    pub fn build(&self) -> ShapeFxResult<ShapeHandle> {
        match self {
            Self::Rectangle {
                width,
                height,
                color,
            } => {
                let [r, g, b, a] = *color;
                let side = |anim: &Anim| ScalarParam::new(anim.clone(), 0.0, POSITION_LIMIT);
                Ok(ShapeHandle::new(RectangleShape {
                    width: side(width)?,
                    height: side(height)?,
                    color: Rgba8Premul::from_straight_rgba(r, g, b, a),
                }))
            }
        }
    }
}

/// Serializable shape layer settings.
///
/// Percent-valued fields (`opacity`, `zoom*`) use the editing layer's units: `100` means 100%.
/// Missing fields take their defaults; `"shape": null` means the layer has no shape.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ShapeLayerSpec {
    /// Horizontal position of the shape center.
    pub x: Anim,
    /// Vertical position of the shape center.
    pub y: Anim,
    /// Depth; positive values move toward the camera.
    pub z: Anim,
    /// Opacity in percent.
    pub opacity: Anim,
    /// Uniform zoom in percent.
    pub zoom: Anim,
    /// Horizontal zoom in percent.
    pub zoom_x: Anim,
    /// Vertical zoom in percent.
    pub zoom_y: Anim,
    /// Rotation about the X axis in degrees.
    pub rotation_x: Anim,
    /// Rotation about the Y axis in degrees.
    pub rotation_y: Anim,
    /// Rotation about the Z axis in degrees.
    pub rotation_z: Anim,
    /// Distance from the left background edge when pinned left.
    pub margin_left: Anim,
    /// Distance from the right background edge when pinned right.
    pub margin_right: Anim,
    /// Distance from the top background edge when pinned top.
    pub margin_top: Anim,
    /// Distance from the bottom background edge when pinned bottom.
    pub margin_bottom: Anim,
    /// Anchor the left edge to the background.
    pub pin_left: bool,
    /// Anchor the right edge to the background.
    pub pin_right: bool,
    /// Anchor the top edge to the background.
    pub pin_top: bool,
    /// Anchor the bottom edge to the background.
    pub pin_bottom: bool,
    /// Mirror horizontally.
    pub invert_x: bool,
    /// Mirror vertically.
    pub invert_y: bool,
    /// Mask the shape by the background's alpha.
    pub clipping: bool,
    /// Draw the shape behind the background instead of over it.
    pub draw_behind: bool,
    /// Nearest-neighbour resampling for the placement transform.
    pub pixelated: bool,
    /// Shape to draw; `None` draws nothing.
    pub shape: Option<ShapeSpec>,
    /// Sub-effects in application order.
    pub effects: Vec<EffectInstance>,
}

impl Default for ShapeLayerSpec {
    fn default() -> Self {
        let hundred = || Anim::Constant(100.0);
        Self {
            x: Anim::default(),
            y: Anim::default(),
            z: Anim::default(),
            opacity: hundred(),
            zoom: hundred(),
            zoom_x: hundred(),
            zoom_y: hundred(),
            rotation_x: Anim::default(),
            rotation_y: Anim::default(),
            rotation_z: Anim::default(),
            margin_left: Anim::default(),
            margin_right: Anim::default(),
            margin_top: Anim::default(),
            margin_bottom: Anim::default(),
            pin_left: false,
            pin_right: false,
            pin_top: false,
            pin_bottom: false,
            invert_x: false,
            invert_y: false,
            clipping: false,
            draw_behind: false,
            pixelated: false,
            shape: Some(ShapeSpec::default()),
            effects: Vec::new(),
        }
    }
}

impl ShapeLayerSpec {
    /// Parse a layer from JSON.
    pub fn from_json(s: &str) -> ShapeFxResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Check every field without building runtime objects.
    pub fn validate(&self) -> ShapeFxResult<()> {
        ShapeLayer::from_spec(self).map(|_| ())
    }
}

/// Which background edges the shape is anchored to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct EdgePins {
    /// Left edge.
    pub left: bool,
    /// Right edge.
    pub right: bool,
    /// Top edge.
    pub top: bool,
    /// Bottom edge.
    pub bottom: bool,
}

/// Runtime shape layer configuration.
///
/// Cloning keeps the identities of the shape parameter and the effects, so a clone drives the
/// compositor the same way as the layer it was cloned from.
#[derive(Clone, Debug)]
pub struct ShapeLayer {
    /// Horizontal position of the shape center.
    pub x: ScalarParam,
    /// Vertical position of the shape center.
    pub y: ScalarParam,
    /// Depth; positive values move toward the camera.
    pub z: ScalarParam,
    /// Opacity in percent.
    pub opacity: ScalarParam,
    /// Uniform zoom in percent.
    pub zoom: ScalarParam,
    /// Horizontal zoom in percent.
    pub zoom_x: ScalarParam,
    /// Vertical zoom in percent.
    pub zoom_y: ScalarParam,
    /// Rotation about the X axis in degrees.
    pub rotation_x: ScalarParam,
    /// Rotation about the Y axis in degrees.
    pub rotation_y: ScalarParam,
    /// Rotation about the Z axis in degrees.
    pub rotation_z: ScalarParam,
    /// Distance from the left background edge when pinned left.
    pub margin_left: ScalarParam,
    /// Distance from the right background edge when pinned right.
    pub margin_right: ScalarParam,
    /// Distance from the top background edge when pinned top.
    pub margin_top: ScalarParam,
    /// Distance from the bottom background edge when pinned bottom.
    pub margin_bottom: ScalarParam,
    /// Edge anchoring.
    pub pins: EdgePins,
    /// Mirror horizontally.
    pub invert_x: bool,
    /// Mirror vertically.
    pub invert_y: bool,
    /// Mask the shape by the background's alpha.
    pub clipping: bool,
    /// Draw the shape behind the background.
    pub draw_behind: bool,
    /// Nearest-neighbour resampling for the placement transform.
    pub pixelated: bool,
    /// `None` renders no shape; the background passes through unchanged.
    pub shape: Option<ShapeHandle>,
    /// Sub-effects in application order.
    pub effects: Vec<EffectHandle>,
}

impl ShapeLayer {
    /// Validate `spec` and build the runtime layer.
    pub fn from_spec(spec: &ShapeLayerSpec) -> ShapeFxResult<Self> {
        let signed = |name: &str, anim: &Anim| {
            ScalarParam::signed(anim.clone())
                .map_err(|e| ShapeFxError::validation(format!("{name}: {e}")))
        };
        let zoom = |name: &str, anim: &Anim| {
            ScalarParam::zoom(anim.clone())
                .map_err(|e| ShapeFxError::validation(format!("{name}: {e}")))
        };

        let shape = spec.shape.as_ref().map(ShapeSpec::build).transpose()?;
        let effects = spec
            .effects
            .iter()
            .enumerate()
            .map(|(i, inst)| {
                BuiltinEffect::from_instance(inst)
                    .map(EffectHandle::new)
                    .map_err(|e| ShapeFxError::validation(format!("effects[{i}]: {e}")))
            })
            .collect::<ShapeFxResult<Vec<_>>>()?;

        Ok(Self {
            x: signed("x", &spec.x)?,
            y: signed("y", &spec.y)?,
            z: signed("z", &spec.z)?,
            opacity: ScalarParam::percent(spec.opacity.clone())
                .map_err(|e| ShapeFxError::validation(format!("opacity: {e}")))?,
            zoom: zoom("zoom", &spec.zoom)?,
            zoom_x: zoom("zoom_x", &spec.zoom_x)?,
            zoom_y: zoom("zoom_y", &spec.zoom_y)?,
            rotation_x: signed("rotation_x", &spec.rotation_x)?,
            rotation_y: signed("rotation_y", &spec.rotation_y)?,
            rotation_z: signed("rotation_z", &spec.rotation_z)?,
            margin_left: signed("margin_left", &spec.margin_left)?,
            margin_right: signed("margin_right", &spec.margin_right)?,
            margin_top: signed("margin_top", &spec.margin_top)?,
            margin_bottom: signed("margin_bottom", &spec.margin_bottom)?,
            pins: EdgePins {
                left: spec.pin_left,
                right: spec.pin_right,
                top: spec.pin_top,
                bottom: spec.pin_bottom,
            },
            invert_x: spec.invert_x,
            invert_y: spec.invert_y,
            clipping: spec.clipping,
            draw_behind: spec.draw_behind,
            pixelated: spec.pixelated,
            shape,
            effects,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layer/model.rs"]
mod tests;
