//! Analytic [`RenderDevice`] that tracks the node graph and evaluates image bounds.
//!
//! No pixels are produced. Bounds follow the geometry of each primitive, and 3D transforms are
//! checked against rasterizer limits the same way a GPU backend would reject them, which makes
//! this device suitable for dry-run planning and for exercising the compositor in tests.

use std::collections::HashMap;

use crate::foundation::core::{Affine, DMat4, Rect, Rgba8Premul};
use crate::foundation::error::{ShapeFxError, ShapeFxResult};
use crate::foundation::math::{
    intersect_nonempty, is_empty_rect, is_overflow_rect, overflow_rect, project_rect_bbox,
    union_nonempty,
};
use crate::render::device::{
    CompositeMode, ImageRef, NodeId, NodeKind, NodeParam, RenderDevice,
};

const MAX_GRAPH_DEPTH: usize = 256;

/// Rasterizer limits emulated by [`BoundsDevice`].
#[derive(Clone, Copy, Debug)]
pub struct BoundsDeviceOpts {
    /// Largest coordinate magnitude a transformed image may reach.
    pub max_output_extent: f64,
    /// Largest ratio of input extent to output extent along one axis.
    pub max_input_per_output_pixel: f64,
    /// Fail `create_node` once this many nodes are live.
    pub max_live_nodes: Option<usize>,
}

impl Default for BoundsDeviceOpts {
    fn default() -> Self {
        Self {
            max_output_extent: 16_777_216.0,
            max_input_per_output_pixel: 65_536.0,
            max_live_nodes: None,
        }
    }
}

/// Counters kept by [`BoundsDevice`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BoundsDeviceStats {
    /// Nodes created.
    pub created: u64,
    /// Nodes disposed.
    pub disposed: u64,
    /// `dispose_node` calls for unknown or already-disposed nodes.
    pub invalid_disposals: u64,
    /// Bounds queries answered with the overflow sentinel.
    pub overflow_reports: u64,
}

#[derive(Clone, Debug)]
struct NodeSlot {
    kind: NodeKind,
    inputs: Vec<Option<ImageRef>>,
    param: Option<NodeParam>,
}

/// See the module docs.
#[derive(Debug)]
pub struct BoundsDevice {
    opts: BoundsDeviceOpts,
    next_id: u32,
    nodes: HashMap<NodeId, NodeSlot>,
    stats: BoundsDeviceStats,
}

impl Default for BoundsDevice {
    fn default() -> Self {
        Self::new(BoundsDeviceOpts::default())
    }
}

impl BoundsDevice {
    /// Create an empty device.
    pub fn new(opts: BoundsDeviceOpts) -> Self {
        Self {
            opts,
            next_id: 0,
            nodes: HashMap::new(),
            stats: BoundsDeviceStats::default(),
        }
    }

    /// Convenience: a flood node covering `rect`.
    pub fn flood(&mut self, rect: Rect, color: Rgba8Premul) -> ShapeFxResult<NodeId> {
        let node = self.create_node(NodeKind::Flood)?;
        self.set_param(node, NodeParam::Flood { rect, color })?;
        Ok(node)
    }

    /// Counters since creation.
    pub fn stats(&self) -> BoundsDeviceStats {
        self.stats.clone()
    }

    /// Number of nodes created and not yet disposed.
    pub fn live_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// `true` when `node` exists.
    pub fn is_live(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    /// Kind of a live node.
    pub fn kind(&self, node: NodeId) -> Option<NodeKind> {
        self.nodes.get(&node).map(|s| s.kind)
    }

    /// Current input wiring of a live node.
    pub fn inputs(&self, node: NodeId) -> Option<&[Option<ImageRef>]> {
        self.nodes.get(&node).map(|s| s.inputs.as_slice())
    }

    /// Current parameter of a live node, if one was set.
    pub fn param(&self, node: NodeId) -> Option<NodeParam> {
        self.nodes.get(&node).and_then(|s| s.param)
    }

    fn slot(&self, node: NodeId) -> ShapeFxResult<&NodeSlot> {
        self.nodes
            .get(&node)
            .ok_or_else(|| ShapeFxError::device(format!("unknown node {}", node.0)))
    }

    fn slot_mut(&mut self, node: NodeId) -> ShapeFxResult<&mut NodeSlot> {
        self.nodes
            .get_mut(&node)
            .ok_or_else(|| ShapeFxError::device(format!("unknown node {}", node.0)))
    }

    fn input_bounds(&mut self, slot: &NodeSlot, port: usize, depth: usize) -> ShapeFxResult<Rect> {
        match slot.inputs.get(port).copied().flatten() {
            None => Ok(Rect::ZERO),
            Some(image) if !self.nodes.contains_key(&image.node()) => {
                tracing::debug!(node = image.node().0, "input refers to a disposed node");
                Ok(Rect::ZERO)
            }
            Some(image) => self.eval_bounds(image.node(), depth + 1),
        }
    }

    fn eval_bounds(&mut self, node: NodeId, depth: usize) -> ShapeFxResult<Rect> {
        if depth > MAX_GRAPH_DEPTH {
            return Err(ShapeFxError::device("node graph is too deep or cyclic"));
        }
        let slot = self.slot(node)?.clone();

        let bounds = match slot.kind {
            NodeKind::Empty => Rect::ZERO,
            NodeKind::Flood => match slot.param {
                Some(NodeParam::Flood { rect, .. }) => rect,
                _ => Rect::ZERO,
            },
            NodeKind::Opacity => self.input_bounds(&slot, 0, depth)?,
            NodeKind::Crop => {
                let input = self.input_bounds(&slot, 0, depth)?;
                match slot.param {
                    Some(NodeParam::Crop(rect)) => intersect_nonempty(input, rect),
                    _ => input,
                }
            }
            NodeKind::Transform2d => {
                let input = self.input_bounds(&slot, 0, depth)?;
                let affine = match slot.param {
                    Some(NodeParam::Transform2d(a)) => a,
                    _ => Affine::IDENTITY,
                };
                if is_empty_rect(input) {
                    Rect::ZERO
                } else {
                    affine.transform_rect_bbox(input)
                }
            }
            NodeKind::GaussianBlur => {
                let input = self.input_bounds(&slot, 0, depth)?;
                let sigma = match slot.param {
                    Some(NodeParam::GaussianBlur { sigma }) => sigma.max(0.0),
                    _ => 0.0,
                };
                if is_empty_rect(input) {
                    Rect::ZERO
                } else {
                    input.inflate(3.0 * sigma, 3.0 * sigma)
                }
            }
            NodeKind::AlphaMask => {
                let content = self.input_bounds(&slot, 0, depth)?;
                let mask = self.input_bounds(&slot, 1, depth)?;
                intersect_nonempty(content, mask)
            }
            NodeKind::Composite => {
                let dst = self.input_bounds(&slot, 0, depth)?;
                match slot.param {
                    Some(NodeParam::Composite(CompositeMode::SourceCopy)) => dst,
                    _ => {
                        let src = self.input_bounds(&slot, 1, depth)?;
                        union_nonempty(dst, src)
                    }
                }
            }
            NodeKind::Transform3d => {
                let input = self.input_bounds(&slot, 0, depth)?;
                let matrix = match slot.param {
                    Some(NodeParam::Transform3d { matrix, .. }) => matrix,
                    _ => DMat4::IDENTITY,
                };
                self.transform3d_bounds(&matrix, input)
            }
        };
        Ok(bounds)
    }

    fn transform3d_bounds(&mut self, matrix: &DMat4, input: Rect) -> Rect {
        if is_empty_rect(input) {
            return Rect::ZERO;
        }
        if is_overflow_rect(input) {
            self.stats.overflow_reports += 1;
            return overflow_rect();
        }
        let Some(out) = project_rect_bbox(matrix, input) else {
            self.stats.overflow_reports += 1;
            return overflow_rect();
        };

        let limit = self.opts.max_output_extent;
        let too_far = [out.x0, out.y0, out.x1, out.y1]
            .iter()
            .any(|v| !v.is_finite() || v.abs() > limit);
        let ratio_x = input.width() / out.width().max(1.0);
        let ratio_y = input.height() / out.height().max(1.0);
        let too_dense = ratio_x.max(ratio_y) > self.opts.max_input_per_output_pixel;

        if too_far || too_dense {
            self.stats.overflow_reports += 1;
            return overflow_rect();
        }
        out
    }
}

impl RenderDevice for BoundsDevice {
    fn create_node(&mut self, kind: NodeKind) -> ShapeFxResult<NodeId> {
        if let Some(max) = self.opts.max_live_nodes
            && self.nodes.len() >= max
        {
            return Err(ShapeFxError::device(format!(
                "node limit of {max} reached while creating {kind:?}"
            )));
        }
        let id = NodeId(self.next_id);
        self.next_id = self
            .next_id
            .checked_add(1)
            .ok_or_else(|| ShapeFxError::device("node ids exhausted"))?;
        self.nodes.insert(
            id,
            NodeSlot {
                kind,
                inputs: vec![None; kind.input_count()],
                param: None,
            },
        );
        self.stats.created += 1;
        Ok(id)
    }

    fn set_input(
        &mut self,
        node: NodeId,
        port: usize,
        image: Option<ImageRef>,
    ) -> ShapeFxResult<()> {
        if let Some(image) = image
            && !self.nodes.contains_key(&image.node())
        {
            return Err(ShapeFxError::device(format!(
                "input image of node {} refers to unknown node {}",
                node.0,
                image.node().0
            )));
        }
        let slot = self.slot_mut(node)?;
        let kind = slot.kind;
        let Some(input) = slot.inputs.get_mut(port) else {
            return Err(ShapeFxError::device(format!(
                "{kind:?} node {} has no input port {port}",
                node.0
            )));
        };
        *input = image;
        Ok(())
    }

    fn set_param(&mut self, node: NodeId, param: NodeParam) -> ShapeFxResult<()> {
        let slot = self.slot_mut(node)?;
        if param.kind() != slot.kind {
            return Err(ShapeFxError::device(format!(
                "{:?} parameter applied to {:?} node {}",
                param.kind(),
                slot.kind,
                node.0
            )));
        }
        slot.param = Some(param);
        Ok(())
    }

    fn image_bounds(&mut self, image: ImageRef) -> ShapeFxResult<Rect> {
        self.eval_bounds(image.node(), 0)
    }

    fn dispose_node(&mut self, node: NodeId) {
        if self.nodes.remove(&node).is_some() {
            self.stats.disposed += 1;
        } else {
            self.stats.invalid_disposals += 1;
            tracing::warn!(node = node.0, "dispose of unknown node");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/bounds.rs"]
mod tests;
