use std::fmt;
use std::rc::Rc;

use crate::effects::draw::{DrawDescription, FrameContext};
use crate::foundation::error::ShapeFxResult;
use crate::render::device::{ImageRef, RenderDevice};

/// Declarative description of one sub-effect.
///
/// Specs are shared immutably between the editing layer and the chain; two specs denote the same
/// effect instance only when they are the same allocation (see [`EffectHandle`]).
pub trait VideoEffect {
    /// Human-readable name for logs.
    fn label(&self) -> &str;

    /// Disabled effects stay in the chain but are bypassed.
    fn is_enabled(&self) -> bool;

    /// Instantiate the live processor for this effect.
    fn create_processor(&self, dev: &mut dyn RenderDevice)
    -> ShapeFxResult<Box<dyn EffectProcessor>>;
}

/// Live, stateful resource that applies one effect to an image every frame.
pub trait EffectProcessor {
    /// Connect the image to process.
    fn set_input(&mut self, dev: &mut dyn RenderDevice, input: Option<ImageRef>)
    -> ShapeFxResult<()>;

    /// Processed image.
    fn output(&self) -> ImageRef;

    /// Refresh parameters for `ctx` and return the descriptor after this effect.
    fn update(
        &mut self,
        dev: &mut dyn RenderDevice,
        ctx: &FrameContext,
    ) -> ShapeFxResult<DrawDescription>;

    /// Disconnect the input image.
    fn clear_input(&mut self, dev: &mut dyn RenderDevice) -> ShapeFxResult<()>;

    /// Release every device resource.
    fn dispose(self: Box<Self>, dev: &mut dyn RenderDevice);
}

/// Stable identity of an [`EffectHandle`] while it is alive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EffectKey(usize);

/// Shared reference to a [`VideoEffect`], compared by identity.
#[derive(Clone)]
pub struct EffectHandle(Rc<dyn VideoEffect>);

impl EffectHandle {
    /// Wrap a spec in a new identity.
    pub fn new(effect: impl VideoEffect + 'static) -> Self {
        Self(Rc::new(effect))
    }

    /// Wrap an existing shared spec without changing its identity.
    pub fn from_rc(effect: Rc<dyn VideoEffect>) -> Self {
        Self(effect)
    }

    /// Identity key.
    pub fn key(&self) -> EffectKey {
        EffectKey(Rc::as_ptr(&self.0).cast::<()>() as usize)
    }

    /// `true` when both handles point at the same spec.
    pub fn same(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }

    /// The spec.
    pub fn effect(&self) -> &dyn VideoEffect {
        &*self.0
    }
}

impl PartialEq for EffectHandle {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl Eq for EffectHandle {}

impl fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectHandle")
            .field("label", &self.0.label())
            .field("key", &self.key())
            .finish()
    }
}
