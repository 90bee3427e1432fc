// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Rasterizer, blend, depth and stencil state.
//!
//! A [`RenderStateDescriptor`] is a full snapshot: applying one replaces every
//! piece of fixed-function state it covers. Render-state items are never
//! cached or diffed, they are re-applied each time the executor reaches them.

use crate::math::LinearRgba;
use serde::{Deserialize, Serialize};

/// Defines how vertices are connected to form a geometric primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PrimitiveTopology {
    /// Vertices are rendered as a list of isolated points.
    PointList,
    /// Every two vertices form a line.
    LineList,
    /// Vertices are rendered as a connected line strip.
    LineStrip,
    /// Every three vertices form a triangle.
    #[default]
    TriangleList,
    /// Vertices are rendered as a connected triangle strip.
    TriangleStrip,
}

/// Defines which face of a triangle to cull.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CullMode {
    /// Cull front-facing triangles.
    Front,
    /// Cull back-facing triangles.
    #[default]
    Back,
    /// Cull both faces.
    FrontAndBack,
}

/// Defines which vertex winding order considers a triangle to be "front-facing".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FrontFace {
    /// Counter-clockwise winding order is the front face.
    #[default]
    Ccw,
    /// Clockwise winding order is the front face.
    Cw,
}

/// Defines how polygons are rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PolygonMode {
    /// Polygons are filled.
    #[default]
    Fill,
    /// Polygons are rendered as outlines (wireframe).
    Line,
    /// Polygon vertices are rendered as points.
    Point,
}

/// The comparison function used for depth and stencil testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CompareFunction {
    /// The test never passes.
    Never,
    /// Passes if the new value is less than the existing value.
    #[default]
    Less,
    /// Passes if the values are equal.
    Equal,
    /// Passes if the new value is less than or equal to the existing value.
    LessEqual,
    /// Passes if the new value is greater than the existing value.
    Greater,
    /// Passes if the values differ.
    NotEqual,
    /// Passes if the new value is greater than or equal to the existing value.
    GreaterEqual,
    /// The test always passes.
    Always,
}

/// An operation to perform on a stencil buffer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StencilOperation {
    /// Keep the existing stencil value.
    #[default]
    Keep,
    /// Set the stencil value to 0.
    Zero,
    /// Replace the stencil value with the reference value.
    Replace,
    /// Bitwise invert the stencil value.
    Invert,
    /// Increment, clamping at the maximum value.
    IncrementClamp,
    /// Decrement, clamping at 0.
    DecrementClamp,
    /// Increment, wrapping to 0 on overflow.
    IncrementWrap,
    /// Decrement, wrapping to the maximum value on underflow.
    DecrementWrap,
}

/// A factor in a blend equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlendFactor {
    /// `0.0`
    Zero,
    /// `1.0`
    One,
    /// `src.rgb`
    SrcColor,
    /// `1.0 - src.rgb`
    OneMinusSrcColor,
    /// `src.a`
    SrcAlpha,
    /// `1.0 - src.a`
    OneMinusSrcAlpha,
    /// `dst.rgb`
    DstColor,
    /// `1.0 - dst.rgb`
    OneMinusDstColor,
    /// `dst.a`
    DstAlpha,
    /// `1.0 - dst.a`
    OneMinusDstAlpha,
    /// The constant blend color.
    Constant,
    /// `1.0 -` the constant blend color.
    OneMinusConstant,
}

/// The operation used to combine source and destination colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BlendOperation {
    /// `source + destination`
    #[default]
    Add,
    /// `source - destination`
    Subtract,
    /// `destination - source`
    ReverseSubtract,
    /// `min(source, destination)`
    Min,
    /// `max(source, destination)`
    Max,
}

/// A complete blend equation for one group of components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlendComponentDescriptor {
    /// The blend factor for the source color.
    pub src_factor: BlendFactor,
    /// The blend factor for the destination color.
    pub dst_factor: BlendFactor,
    /// The operation combining both terms.
    pub operation: BlendOperation,
}

impl Default for BlendComponentDescriptor {
    fn default() -> Self {
        Self {
            src_factor: BlendFactor::SrcAlpha,
            dst_factor: BlendFactor::OneMinusSrcAlpha,
            operation: BlendOperation::Add,
        }
    }
}

/// Blending configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BlendStateDescriptor {
    /// Equation for the RGB components.
    pub color: BlendComponentDescriptor,
    /// Equation for the alpha component.
    pub alpha: BlendComponentDescriptor,
    /// Constant used by [`BlendFactor::Constant`].
    pub constant: LinearRgba,
    /// Enables alpha-to-coverage.
    pub alpha_to_coverage: bool,
}

/// Stencil test and operations for a single face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct StencilFaceState {
    /// The comparison function used for the stencil test.
    pub compare: CompareFunction,
    /// Operation when the stencil test fails.
    pub fail_op: StencilOperation,
    /// Operation when the stencil test passes but the depth test fails.
    pub depth_fail_op: StencilOperation,
    /// Operation when both tests pass.
    pub pass_op: StencilOperation,
}

/// Stencil configuration shared by both faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StencilStateDescriptor {
    /// Front-facing primitives.
    pub front: StencilFaceState,
    /// Back-facing primitives.
    pub back: StencilFaceState,
    /// Reference value for comparisons and `Replace`.
    pub reference: u32,
    /// Write mask.
    pub write_mask: u32,
}

impl Default for StencilStateDescriptor {
    fn default() -> Self {
        Self {
            front: StencilFaceState::default(),
            back: StencilFaceState::default(),
            reference: 0,
            write_mask: 0xFF,
        }
    }
}

/// Depth test configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthStateDescriptor {
    /// Whether fragments are tested against the depth buffer.
    pub test_enabled: bool,
    /// Whether depth values are written.
    pub write_enabled: bool,
    /// The comparison used by the test.
    pub compare: CompareFunction,
    /// Constant depth bias (polygon offset units).
    pub bias: f32,
    /// Clamps depth instead of clipping.
    pub clamp: bool,
}

impl Default for DepthStateDescriptor {
    fn default() -> Self {
        Self {
            test_enabled: true,
            write_enabled: true,
            compare: CompareFunction::Less,
            bias: 0.0,
            clamp: false,
        }
    }
}

/// A full fixed-function state snapshot.
///
/// `None` for `cull_mode`, `blend` or `stencil` disables that stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderStateDescriptor {
    /// Fill mode.
    pub polygon_mode: PolygonMode,
    /// Face culling; `None` disables culling.
    pub cull_mode: Option<CullMode>,
    /// Winding of front faces.
    pub front_face: FrontFace,
    /// Blending; `None` disables blending.
    pub blend: Option<BlendStateDescriptor>,
    /// Depth test and write configuration.
    pub depth: DepthStateDescriptor,
    /// Stencil test; `None` disables it.
    pub stencil: Option<StencilStateDescriptor>,
}

impl Default for RenderStateDescriptor {
    /// The baseline every shader pass starts from.
    fn default() -> Self {
        Self {
            polygon_mode: PolygonMode::Fill,
            cull_mode: Some(CullMode::Back),
            front_face: FrontFace::Ccw,
            blend: None,
            depth: DepthStateDescriptor::default(),
            stencil: None,
        }
    }
}
