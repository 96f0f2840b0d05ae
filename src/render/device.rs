//! Image-processing node graph exposed by the host renderer.
//!
//! Nodes are long-lived, reusable GPU resources: they are created once, rewired every frame via
//! [`RenderDevice::set_input`] / [`RenderDevice::set_param`], and released exactly once via
//! [`RenderDevice::dispose_node`]. Each node has a single output image.

use crate::foundation::core::{Affine, DMat4, Rect, Rgba8Premul};
use crate::foundation::error::ShapeFxResult;

/// Device-assigned node handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The image produced by this node.
    pub fn output(self) -> ImageRef {
        ImageRef(self)
    }
}

/// Reference to the output image of a node.
///
/// Valid until the producing node is disposed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct ImageRef(pub NodeId);

impl ImageRef {
    /// Node that produces this image.
    pub fn node(self) -> NodeId {
        self.0
    }
}

/// Primitive node kinds a device must provide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Projects input 0 through a 4x4 matrix.
    Transform3d,
    /// Maps input 0 through a 2D affine.
    Transform2d,
    /// Multiplies input 0 alpha.
    Opacity,
    /// Input 0 masked by the alpha of input 1.
    AlphaMask,
    /// Blends input 1 onto input 0.
    Composite,
    /// Restricts input 0 to a rectangle.
    Crop,
    /// Solid color filling a rectangle. No inputs.
    Flood,
    /// Gaussian blur of input 0.
    GaussianBlur,
    /// Always-empty image. No inputs.
    Empty,
}

impl NodeKind {
    /// Number of input ports.
    pub fn input_count(self) -> usize {
        match self {
            Self::Flood | Self::Empty => 0,
            Self::AlphaMask | Self::Composite => 2,
            Self::Transform3d
            | Self::Transform2d
            | Self::Opacity
            | Self::Crop
            | Self::GaussianBlur => 1,
        }
    }
}

/// Resampling used by [`NodeKind::Transform3d`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub enum InterpolationMode {
    /// Bilinear filtering.
    #[default]
    Linear,
    /// Pixel-art friendly nearest neighbour.
    NearestNeighbor,
}

/// Blend used by [`NodeKind::Composite`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub enum CompositeMode {
    /// Porter-Duff source-over: input 1 drawn over input 0.
    #[default]
    SourceOver,
    /// Output is input 0 only.
    SourceCopy,
}

/// Typed node parameter. Each variant applies to exactly one [`NodeKind`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NodeParam {
    /// [`NodeKind::Transform3d`] matrix (column-vector convention) and resampling.
    Transform3d {
        /// Projection applied to `z = 0` input points.
        matrix: DMat4,
        /// Resampling filter.
        interpolation: InterpolationMode,
    },
    /// [`NodeKind::Transform2d`] affine.
    Transform2d(Affine),
    /// [`NodeKind::Opacity`] factor in `[0, 1]`.
    Opacity(f64),
    /// [`NodeKind::Composite`] mode.
    Composite(CompositeMode),
    /// [`NodeKind::Crop`] rectangle.
    Crop(Rect),
    /// [`NodeKind::Flood`] rectangle and color.
    Flood {
        /// Covered area.
        rect: Rect,
        /// Fill color.
        color: Rgba8Premul,
    },
    /// [`NodeKind::GaussianBlur`] standard deviation in pixels.
    GaussianBlur {
        /// Standard deviation.
        sigma: f64,
    },
}

impl NodeParam {
    /// Node kind this parameter targets.
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Transform3d { .. } => NodeKind::Transform3d,
            Self::Transform2d(_) => NodeKind::Transform2d,
            Self::Opacity(_) => NodeKind::Opacity,
            Self::Composite(_) => NodeKind::Composite,
            Self::Crop(_) => NodeKind::Crop,
            Self::Flood { .. } => NodeKind::Flood,
            Self::GaussianBlur { .. } => NodeKind::GaussianBlur,
        }
    }
}

/// Host rendering device.
///
/// All calls happen on the render thread, strictly sequentially.
pub trait RenderDevice {
    /// Allocate a node of `kind` with default parameters and unconnected inputs.
    fn create_node(&mut self, kind: NodeKind) -> ShapeFxResult<NodeId>;

    /// Connect (or with `None`, disconnect) input `port` of `node`.
    fn set_input(&mut self, node: NodeId, port: usize, image: Option<ImageRef>)
    -> ShapeFxResult<()>;

    /// Replace the parameter of `node`.
    fn set_param(&mut self, node: NodeId, param: NodeParam) -> ShapeFxResult<()>;

    /// Local-space bounds of `image`.
    ///
    /// Images whose bounds exceed the rasterizer's limits report
    /// [`OVERFLOW_SENTINEL`](crate::OVERFLOW_SENTINEL) on every side.
    fn image_bounds(&mut self, image: ImageRef) -> ShapeFxResult<Rect>;

    /// Release `node`. Called exactly once per created node.
    fn dispose_node(&mut self, node: NodeId);
}
