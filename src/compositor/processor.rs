//! Per-frame shape compositing.
//!
//! ```text
//! shape source -> effect chain -> [crop guard] -> transform3d -> opacity -> [alpha mask] -+
//!                                                                                        composite
//! background ---------------------------------------------------------> passthrough ---+
//! ```
//!
//! The nodes are created once and rewired every frame from the current layer state.

use crate::compositor::guard::{self, GuardOutcome};
use crate::compositor::layout::{LayoutParams, Placement};
use crate::effects::chain::EffectChain;
use crate::effects::draw::{DrawDescription, FrameContext};
use crate::effects::processor::EffectHandle;
use crate::foundation::core::{DMat4, FrameIndex, Rect};
use crate::foundation::error::{ShapeFxError, ShapeFxResult};
use crate::layer::model::ShapeLayer;
use crate::render::device::{
    CompositeMode, ImageRef, InterpolationMode, NodeId, NodeKind, NodeParam, RenderDevice,
};
use crate::render::dispose::DisposeCollector;
use crate::shape::source::{ShapeHandle, ShapeSource};

/// Compositor tuning.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CompositorOpts {
    /// Distance from the camera to the `z = 0` plane.
    pub camera_distance: f64,
    /// Half side of the safe rectangle the overflow guard crops to.
    pub guard_half_extent: f64,
    /// Floor applied to the uniform zoom factor.
    pub min_zoom: f64,
}

impl Default for CompositorOpts {
    fn default() -> Self {
        Self {
            camera_distance: 1000.0,
            guard_half_extent: 2048.0,
            min_zoom: 0.0001,
        }
    }
}

impl CompositorOpts {
    /// Reject non-positive or non-finite values.
    pub fn validate(&self) -> ShapeFxResult<()> {
        let positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(ShapeFxError::validation(format!(
                    "{name} must be finite and > 0"
                )))
            }
        };
        positive("camera_distance", self.camera_distance)?;
        positive("guard_half_extent", self.guard_half_extent)?;
        positive("min_zoom", self.min_zoom)
    }
}

/// Fixed nodes owned by a [`ShapeCompositor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompositeNodes {
    /// 3D placement of the post-chain shape.
    pub transform: NodeId,
    /// Layer opacity.
    pub opacity: NodeId,
    /// Background passthrough.
    pub passthrough: NodeId,
    /// Clipping of the shape by the background alpha.
    pub alpha_mask: NodeId,
    /// Final blend.
    pub composite: NodeId,
    /// Overflow guard crop.
    pub crop: NodeId,
}

/// Which path the last [`ShapeCompositor::update`] took.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositorState {
    /// No background; nothing was wired.
    NoInput,
    /// Background only; the composite copies it.
    InputNoShape,
    /// Shape composited with the background.
    InputWithShape,
}

/// Summary of one frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct FrameReport {
    /// Frame that was evaluated.
    pub frame: FrameIndex,
    /// Path taken.
    pub state: CompositorState,
    /// Shape placement, when a shape was rendered.
    pub placement: Option<Placement>,
    /// Overflow guard outcome, when a shape was rendered.
    pub guard: Option<GuardOutcome>,
    /// Bounds of the composite output, when a background was present.
    pub output_bounds: Option<Rect>,
}

/// Renders one shape layer over (or under) a background image.
pub struct ShapeCompositor {
    opts: CompositorOpts,
    disposer: DisposeCollector,
    nodes: CompositeNodes,
    chain: EffectChain,
    input: Option<ImageRef>,
    fresh: bool,
    shape_param: Option<ShapeHandle>,
    source: Option<Box<dyn ShapeSource>>,
    effects: Option<Vec<EffectHandle>>,
    last_report: Option<FrameReport>,
}

impl ShapeCompositor {
    /// Allocate every node the compositor needs.
    pub fn new(dev: &mut dyn RenderDevice, opts: CompositorOpts) -> ShapeFxResult<Self> {
        opts.validate()?;
        let (mut disposer, nodes) = DisposeCollector::build_with(dev, |c, dev| {
            let nodes = CompositeNodes {
                transform: c.create(dev, NodeKind::Transform3d)?,
                opacity: c.create(dev, NodeKind::Opacity)?,
                passthrough: c.create(dev, NodeKind::Transform3d)?,
                alpha_mask: c.create(dev, NodeKind::AlphaMask)?,
                composite: c.create(dev, NodeKind::Composite)?,
                crop: c.create(dev, NodeKind::Crop)?,
            };
            dev.set_param(
                nodes.passthrough,
                NodeParam::Transform3d {
                    matrix: DMat4::IDENTITY,
                    interpolation: InterpolationMode::Linear,
                },
            )?;
            dev.set_param(nodes.composite, NodeParam::Composite(CompositeMode::SourceCopy))?;
            Ok(nodes)
        })?;
        let chain = match EffectChain::new(dev) {
            Ok(chain) => chain,
            Err(err) => {
                disposer.dispose_all(dev);
                return Err(err);
            }
        };
        tracing::debug!(composite = nodes.composite.0, "created shape compositor");

        Ok(Self {
            opts,
            disposer,
            nodes,
            chain,
            input: None,
            fresh: true,
            shape_param: None,
            source: None,
            effects: None,
            last_report: None,
        })
    }

    /// Final image.
    pub fn output(&self) -> ImageRef {
        self.nodes.composite.output()
    }

    /// Node ids, for inspection.
    pub fn nodes(&self) -> CompositeNodes {
        self.nodes
    }

    /// Options in effect.
    pub fn opts(&self) -> &CompositorOpts {
        &self.opts
    }

    /// The sub-effect chain.
    pub fn chain(&self) -> &EffectChain {
        &self.chain
    }

    /// Summary of the last [`update`](Self::update).
    pub fn last_report(&self) -> Option<&FrameReport> {
        self.last_report.as_ref()
    }

    /// Attach (or with `None`, detach) the background image.
    pub fn set_input(
        &mut self,
        dev: &mut dyn RenderDevice,
        input: Option<ImageRef>,
    ) -> ShapeFxResult<()> {
        self.input = input;
        dev.set_input(self.nodes.passthrough, 0, input)
    }

    /// Evaluate `layer` at `ctx` and rewire the graph. Returns the descriptor after the
    /// sub-effects.
    #[tracing::instrument(level = "debug", skip_all, fields(frame = ctx.frame.0))]
    pub fn update(
        &mut self,
        dev: &mut dyn RenderDevice,
        layer: &ShapeLayer,
        ctx: &FrameContext,
    ) -> ShapeFxResult<DrawDescription> {
        let Some(background) = self.input else {
            self.last_report = Some(FrameReport {
                frame: ctx.frame,
                state: CompositorState::NoInput,
                placement: None,
                guard: None,
                output_bounds: None,
            });
            return Ok(ctx.draw);
        };

        if self.effects.as_deref() != Some(layer.effects.as_slice()) {
            self.chain.reconcile(dev, &layer.effects)?;
            self.effects = Some(layer.effects.clone());
        }

        let shape_image = self.refresh_shape(dev, layer, ctx)?;

        let n = self.nodes;
        let mut placement = None;
        let mut guard_outcome = None;
        let (desc, shaded) = match shape_image {
            Some(image) => {
                self.chain.set_input(dev, Some(image))?;
                let desc = self.chain.update_output_and_description(dev, ctx)?;
                let after_chain = self.chain.output();

                let shape_bounds = dev.image_bounds(after_chain)?;
                let background_bounds = dev.image_bounds(background)?;
                let params = LayoutParams::evaluate(layer, ctx, self.opts.min_zoom);
                let p = Placement::resolve(&params, shape_bounds, background_bounds);
                let interpolation = if layer.pixelated {
                    InterpolationMode::NearestNeighbor
                } else {
                    InterpolationMode::Linear
                };
                dev.set_param(
                    n.transform,
                    NodeParam::Transform3d {
                        matrix: p.matrix(self.opts.camera_distance),
                        interpolation,
                    },
                )?;
                let g = guard::apply(
                    dev,
                    n.transform,
                    n.crop,
                    after_chain,
                    self.opts.guard_half_extent,
                )?;
                placement = Some(p);
                guard_outcome = Some(g.outcome);

                dev.set_param(n.opacity, NodeParam::Opacity(p.opacity))?;
                if g.outcome == GuardOutcome::Dropped {
                    dev.set_input(n.opacity, 0, None)?;
                    (desc, None)
                } else {
                    dev.set_input(n.opacity, 0, Some(n.transform.output()))?;
                    (desc, Some(n.opacity.output()))
                }
            }
            None => {
                self.chain.set_input(dev, None)?;
                dev.set_input(n.crop, 0, None)?;
                dev.set_input(n.transform, 0, None)?;
                dev.set_input(n.opacity, 0, None)?;
                (ctx.draw, None)
            }
        };

        let mut top = shaded;
        match top {
            Some(image) if layer.clipping => {
                dev.set_input(n.alpha_mask, 0, Some(image))?;
                dev.set_input(n.alpha_mask, 1, Some(n.passthrough.output()))?;
                top = Some(n.alpha_mask.output());
            }
            _ => {
                dev.set_input(n.alpha_mask, 0, None)?;
                dev.set_input(n.alpha_mask, 1, None)?;
            }
        }

        let bg = Some(n.passthrough.output());
        match top {
            Some(image) => {
                let (dst, src) = if layer.draw_behind {
                    (Some(image), bg)
                } else {
                    (bg, Some(image))
                };
                dev.set_input(n.composite, 0, dst)?;
                dev.set_input(n.composite, 1, src)?;
                dev.set_param(n.composite, NodeParam::Composite(CompositeMode::SourceOver))?;
            }
            None => {
                dev.set_input(n.composite, 0, bg)?;
                dev.set_input(n.composite, 1, None)?;
                dev.set_param(n.composite, NodeParam::Composite(CompositeMode::SourceCopy))?;
            }
        }

        self.last_report = Some(FrameReport {
            frame: ctx.frame,
            state: if self.source.is_some() {
                CompositorState::InputWithShape
            } else {
                CompositorState::InputNoShape
            },
            placement,
            guard: guard_outcome,
            output_bounds: Some(dev.image_bounds(self.output())?),
        });
        Ok(desc)
    }

    fn refresh_shape(
        &mut self,
        dev: &mut dyn RenderDevice,
        layer: &ShapeLayer,
        ctx: &FrameContext,
    ) -> ShapeFxResult<Option<ImageRef>> {
        if self.fresh || self.shape_param != layer.shape {
            if let Some(source) = self.source.take() {
                source.dispose(dev);
            }
            self.source = match &layer.shape {
                Some(param) => {
                    tracing::debug!(kind = param.parameter().kind(), "creating shape source");
                    Some(param.parameter().create_source(dev)?)
                }
                None => None,
            };
            self.shape_param = layer.shape.clone();
            self.fresh = false;
        }

        match self.source.as_mut() {
            Some(source) => {
                source.update(dev, ctx)?;
                Ok(Some(source.output()))
            }
            None => Ok(None),
        }
    }

    /// Detach everything, release the shape source and sub-effects, and start over on the next
    /// [`update`](Self::update).
    pub fn clear_input(&mut self, dev: &mut dyn RenderDevice) -> ShapeFxResult<()> {
        let n = self.nodes;
        self.input = None;
        dev.set_input(n.composite, 0, None)?;
        dev.set_input(n.composite, 1, None)?;
        dev.set_input(n.passthrough, 0, None)?;
        dev.set_input(n.transform, 0, None)?;
        dev.set_input(n.opacity, 0, None)?;
        dev.set_input(n.alpha_mask, 0, None)?;
        dev.set_input(n.alpha_mask, 1, None)?;
        dev.set_input(n.crop, 0, None)?;
        if let Some(source) = self.source.take() {
            source.dispose(dev);
        }
        self.fresh = true;
        self.shape_param = None;
        self.effects = None;
        self.last_report = None;
        self.chain.clear_input(dev)
    }

    /// Release every node, the shape source and every sub-effect processor.
    pub fn dispose(mut self, dev: &mut dyn RenderDevice) {
        if let Some(source) = self.source.take() {
            source.dispose(dev);
        }
        self.chain.dispose(dev);
        self.disposer.dispose_all(dev);
        tracing::debug!("disposed shape compositor");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compositor/processor.rs"]
mod tests;
