use crate::animation::anim::AnimatedScalar;
use crate::animation::param::ScalarParam;
use crate::effects::draw::FrameContext;
use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::ShapeFxResult;
use crate::foundation::math::centered_rect;
use crate::render::device::{ImageRef, NodeId, NodeKind, NodeParam, RenderDevice};
use crate::shape::source::{ShapeParameter, ShapeSource};

/// Solid rectangle centered on the origin.
#[derive(Clone, Debug, PartialEq)]
pub struct RectangleShape {
    /// Width in pixels.
    pub width: ScalarParam,
    /// Height in pixels.
    pub height: ScalarParam,
    /// Fill color.
    pub color: Rgba8Premul,
}

impl ShapeParameter for RectangleShape {
    fn kind(&self) -> &str {
        "rectangle"
    }

    fn create_source(&self, dev: &mut dyn RenderDevice) -> ShapeFxResult<Box<dyn ShapeSource>> {
        let node = dev.create_node(NodeKind::Flood)?;
        tracing::debug!(node = node.0, "created rectangle source");
        Ok(Box::new(RectangleSource {
            shape: self.clone(),
            node,
        }))
    }
}

struct RectangleSource {
    shape: RectangleShape,
    node: NodeId,
}

impl ShapeSource for RectangleSource {
    fn update(&mut self, dev: &mut dyn RenderDevice, ctx: &FrameContext) -> ShapeFxResult<()> {
        let w = self.shape.width.evaluate(ctx.frame, ctx.length, ctx.fps);
        let h = self.shape.height.evaluate(ctx.frame, ctx.length, ctx.fps);
        dev.set_param(
            self.node,
            NodeParam::Flood {
                rect: centered_rect(w / 2.0, h / 2.0),
                color: self.shape.color,
            },
        )
    }

    fn output(&self) -> ImageRef {
        self.node.output()
    }

    fn dispose(self: Box<Self>, dev: &mut dyn RenderDevice) {
        tracing::debug!(node = self.node.0, "disposed rectangle source");
        dev.dispose_node(self.node);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/shape/builtin.rs"]
mod tests;
