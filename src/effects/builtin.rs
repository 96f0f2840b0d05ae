//! Effects shipped with the crate, parsed from [`EffectInstance`] records.

use std::cell::Cell;

use crate::effects::draw::{DrawDescription, FrameContext};
use crate::effects::processor::{EffectProcessor, VideoEffect};
use crate::foundation::core::{Affine, DVec3};
use crate::foundation::error::{ShapeFxError, ShapeFxResult};
use crate::layer::model::EffectInstance;
use crate::render::device::{ImageRef, NodeId, NodeKind, NodeParam, RenderDevice};

/// Parsed built-in effect.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Multiplies the descriptor opacity.
    OpacityMul {
        /// Factor, `>= 0`.
        value: f64,
    },
    /// Moves the descriptor draw position.
    Offset {
        /// X offset.
        x: f64,
        /// Y offset.
        y: f64,
        /// Z offset.
        z: f64,
    },
    /// Multiplies both descriptor zoom factors.
    ZoomMul {
        /// Factor, `>= 0`.
        value: f64,
    },
    /// 2D affine applied to the image itself.
    TransformPost {
        /// Image-space affine.
        value: Affine,
    },
    /// Gaussian blur of the image.
    Blur {
        /// Standard deviation in pixels.
        sigma: f64,
    },
}

impl Effect {
    /// Stable lowercase name.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::OpacityMul { .. } => "opacity_mul",
            Self::Offset { .. } => "offset",
            Self::ZoomMul { .. } => "zoom_mul",
            Self::TransformPost { .. } => "transform_post",
            Self::Blur { .. } => "blur",
        }
    }

    /// Apply this effect to a descriptor.
    pub fn fold(&self, mut d: DrawDescription) -> DrawDescription {
        match *self {
            Self::OpacityMul { value } => d.opacity = (d.opacity * value).clamp(0.0, 1.0),
            Self::Offset { x, y, z } => d.draw += DVec3::new(x, y, z),
            Self::ZoomMul { value } => d.zoom *= value,
            Self::TransformPost { .. } | Self::Blur { .. } => {}
        }
        d
    }
}

/// Parse one effect record.
pub fn parse_effect(inst: &EffectInstance) -> ShapeFxResult<Effect> {
    let kind = inst.kind.trim().to_ascii_lowercase();
    if kind.is_empty() {
        return Err(ShapeFxError::validation("effect kind must be non-empty"));
    }

    match kind.as_str() {
        "opacitymul" | "opacity_mul" | "opacity-mul" => {
            let value = get_f64(&inst.params, "value")?;
            if value < 0.0 {
                return Err(ShapeFxError::validation("OpacityMul.value must be >= 0"));
            }
            Ok(Effect::OpacityMul { value })
        }
        "offset" => Ok(Effect::Offset {
            x: get_f64_or(&inst.params, "x", 0.0)?,
            y: get_f64_or(&inst.params, "y", 0.0)?,
            z: get_f64_or(&inst.params, "z", 0.0)?,
        }),
        "zoommul" | "zoom_mul" | "zoom-mul" => {
            let value = get_f64(&inst.params, "value")?;
            if value < 0.0 {
                return Err(ShapeFxError::validation("ZoomMul.value must be >= 0"));
            }
            Ok(Effect::ZoomMul { value })
        }
        "transformpost" | "transform_post" | "transform-post" => {
            let value = parse_affine(&inst.params)?;
            Ok(Effect::TransformPost { value })
        }
        "blur" => {
            let sigma = get_f64(&inst.params, "sigma")?;
            if sigma < 0.0 {
                return Err(ShapeFxError::validation("Blur.sigma must be >= 0"));
            }
            Ok(Effect::Blur { sigma })
        }
        _ => Err(ShapeFxError::validation(format!(
            "unknown effect kind '{kind}'"
        ))),
    }
}

fn get_f64(obj: &serde_json::Value, key: &str) -> ShapeFxResult<f64> {
    let Some(v) = obj.get(key) else {
        return Err(ShapeFxError::validation(format!(
            "missing effect param '{key}'"
        )));
    };
    number(v, key)
}

fn get_f64_or(obj: &serde_json::Value, key: &str, default: f64) -> ShapeFxResult<f64> {
    match obj.get(key) {
        Some(v) => number(v, key),
        None => Ok(default),
    }
}

fn number(v: &serde_json::Value, key: &str) -> ShapeFxResult<f64> {
    let Some(n) = v.as_f64() else {
        return Err(ShapeFxError::validation(format!(
            "effect param '{key}' must be a number"
        )));
    };
    if !n.is_finite() {
        return Err(ShapeFxError::validation(format!(
            "effect param '{key}' must be finite"
        )));
    }
    Ok(n)
}

fn pair(params: &serde_json::Value, key: &str) -> ShapeFxResult<Option<(f64, f64)>> {
    let Some(v) = params.get(key) else {
        return Ok(None);
    };
    let arr = v
        .as_array()
        .filter(|a| a.len() == 2)
        .ok_or_else(|| ShapeFxError::validation(format!("transform_post.{key} must be [a,b]")))?;
    Ok(Some((number(&arr[0], key)?, number(&arr[1], key)?)))
}

fn parse_affine(params: &serde_json::Value) -> ShapeFxResult<Affine> {
    if let Some(a) = params.get("affine") {
        let Some(arr) = a.as_array() else {
            return Err(ShapeFxError::validation(
                "transform_post.affine must be an array",
            ));
        };
        if arr.len() != 6 {
            return Err(ShapeFxError::validation(
                "transform_post.affine must have length 6",
            ));
        }
        let mut coeffs = [0.0f64; 6];
        for (slot, v) in coeffs.iter_mut().zip(arr) {
            *slot = number(v, "affine")?;
        }
        return Ok(Affine::new(coeffs));
    }

    let t = pair(params, "translate")?.map_or(Affine::IDENTITY, |(x, y)| Affine::translate((x, y)));
    let rot = match params.get("rotate_deg") {
        Some(v) => Affine::rotate(number(v, "rotate_deg")?.to_radians()),
        None => Affine::IDENTITY,
    };
    let scale = pair(params, "scale")?
        .map_or(Affine::IDENTITY, |(sx, sy)| Affine::scale_non_uniform(sx, sy));

    Ok(t * rot * scale)
}

/// [`VideoEffect`] backed by a parsed [`Effect`].
///
/// The enabled flag is interior-mutable so a host can toggle an effect without changing its
/// identity in the chain.
#[derive(Debug)]
pub struct BuiltinEffect {
    effect: Effect,
    enabled: Cell<bool>,
}

impl BuiltinEffect {
    /// Enabled effect.
    pub fn new(effect: Effect) -> Self {
        Self {
            effect,
            enabled: Cell::new(true),
        }
    }

    /// Parse and wrap an effect record.
    pub fn from_instance(inst: &EffectInstance) -> ShapeFxResult<Self> {
        let effect = Self::new(parse_effect(inst)?);
        effect.set_enabled(inst.enabled);
        Ok(effect)
    }

    /// The parsed effect.
    pub fn effect(&self) -> &Effect {
        &self.effect
    }

    /// Toggle bypass.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
    }
}

impl VideoEffect for BuiltinEffect {
    fn label(&self) -> &str {
        self.effect.kind_name()
    }

    fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    fn create_processor(
        &self,
        dev: &mut dyn RenderDevice,
    ) -> ShapeFxResult<Box<dyn EffectProcessor>> {
        let (kind, param) = match self.effect {
            Effect::Blur { sigma } => (NodeKind::GaussianBlur, NodeParam::GaussianBlur { sigma }),
            Effect::TransformPost { value } => (NodeKind::Transform2d, NodeParam::Transform2d(value)),
            _ => (NodeKind::Transform2d, NodeParam::Transform2d(Affine::IDENTITY)),
        };
        let node = dev.create_node(kind)?;
        if let Err(err) = dev.set_param(node, param) {
            dev.dispose_node(node);
            return Err(err);
        }
        Ok(Box::new(BuiltinProcessor {
            effect: self.effect.clone(),
            node,
        }))
    }
}

struct BuiltinProcessor {
    effect: Effect,
    node: NodeId,
}

impl EffectProcessor for BuiltinProcessor {
    fn set_input(
        &mut self,
        dev: &mut dyn RenderDevice,
        input: Option<ImageRef>,
    ) -> ShapeFxResult<()> {
        dev.set_input(self.node, 0, input)
    }

    fn output(&self) -> ImageRef {
        self.node.output()
    }

    fn update(
        &mut self,
        _dev: &mut dyn RenderDevice,
        ctx: &FrameContext,
    ) -> ShapeFxResult<DrawDescription> {
        Ok(self.effect.fold(ctx.draw))
    }

    fn clear_input(&mut self, dev: &mut dyn RenderDevice) -> ShapeFxResult<()> {
        dev.set_input(self.node, 0, None)
    }

    fn dispose(self: Box<Self>, dev: &mut dyn RenderDevice) {
        dev.dispose_node(self.node);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/builtin.rs"]
mod tests;
