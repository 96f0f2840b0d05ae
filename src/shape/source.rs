use std::fmt;
use std::rc::Rc;

use crate::effects::draw::FrameContext;
use crate::foundation::error::ShapeFxResult;
use crate::render::device::{ImageRef, RenderDevice};

/// Declarative shape description supplied by the editing layer.
pub trait ShapeParameter {
    /// Short name of the shape kind, for logs.
    fn kind(&self) -> &str;

    /// Build the live source that renders this shape.
    fn create_source(&self, dev: &mut dyn RenderDevice) -> ShapeFxResult<Box<dyn ShapeSource>>;
}

/// Live renderer for one [`ShapeParameter`].
///
/// The output image is expected to be centered on the origin.
pub trait ShapeSource {
    /// Refresh the rendered image for `ctx`.
    fn update(&mut self, dev: &mut dyn RenderDevice, ctx: &FrameContext) -> ShapeFxResult<()>;

    /// Rendered image.
    fn output(&self) -> ImageRef;

    /// Release every device resource.
    fn dispose(self: Box<Self>, dev: &mut dyn RenderDevice);
}

/// Shared reference to a [`ShapeParameter`], compared by identity.
#[derive(Clone)]
pub struct ShapeHandle(Rc<dyn ShapeParameter>);

impl ShapeHandle {
    /// Wrap a parameter in a new identity.
    pub fn new(param: impl ShapeParameter + 'static) -> Self {
        Self(Rc::new(param))
    }

    /// Wrap an existing shared parameter without changing its identity.
    pub fn from_rc(param: Rc<dyn ShapeParameter>) -> Self {
        Self(param)
    }

    /// The parameter.
    pub fn parameter(&self) -> &dyn ShapeParameter {
        &*self.0
    }
}

impl PartialEq for ShapeHandle {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }
}

impl Eq for ShapeHandle {}

impl fmt::Debug for ShapeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ShapeHandle").field(&self.0.kind()).finish()
    }
}
