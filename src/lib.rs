//! shapefx composites a positionable, transformable shape layer into a host render-node graph.
//!
//! Every frame the [`ShapeCompositor`]:
//!
//! - refreshes the shape source when the layer's shape parameter changes
//! - runs the shape through an [`EffectChain`] that reuses live processors across edits
//! - resolves pin/margin layout and builds a perspective placement transform
//! - guards against transforms the rasterizer cannot represent
//! - clips and composites the result over or under the background
//!
//! Devices implement [`RenderDevice`]; [`BoundsDevice`] is an analytic implementation used for
//! dry-run planning and tests.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod compositor;
pub(crate) mod effects;
pub(crate) mod layer;
pub(crate) mod render;
pub(crate) mod shape;

pub use crate::foundation::core::{
    Affine, DMat4, DVec2, DVec3, Fps, FrameIndex, FrameRange, Point, Rect, Rgba8Premul, Vec2,
};
pub use crate::foundation::error::{ShapeFxError, ShapeFxResult};
pub use crate::foundation::math::{OVERFLOW_SENTINEL, centered_rect, is_overflow_rect};

pub use crate::animation::anim::{Anim, AnimatedScalar, InterpMode, Keyframe, Keyframes};
pub use crate::animation::ease::Ease;
pub use crate::animation::param::{POSITION_LIMIT, ScalarParam};

pub use crate::render::bounds::{BoundsDevice, BoundsDeviceOpts, BoundsDeviceStats};
pub use crate::render::device::{
    CompositeMode, ImageRef, InterpolationMode, NodeId, NodeKind, NodeParam, RenderDevice,
};
pub use crate::render::dispose::DisposeCollector;

pub use crate::effects::builtin::{BuiltinEffect, Effect, parse_effect};
pub use crate::effects::chain::EffectChain;
pub use crate::effects::draw::{DrawDescription, FrameContext};
pub use crate::effects::processor::{EffectHandle, EffectKey, EffectProcessor, VideoEffect};

pub use crate::shape::builtin::RectangleShape;
pub use crate::shape::source::{ShapeHandle, ShapeParameter, ShapeSource};

pub use crate::layer::model::{EdgePins, EffectInstance, ShapeLayer, ShapeLayerSpec, ShapeSpec};

pub use crate::compositor::guard::GuardOutcome;
pub use crate::compositor::layout::{AxisPlacement, LayoutParams, Placement};
pub use crate::compositor::processor::{
    CompositeNodes, CompositorOpts, CompositorState, FrameReport, ShapeCompositor,
};
