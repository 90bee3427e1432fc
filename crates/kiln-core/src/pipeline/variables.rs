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

//! Shader variables and per-item overrides.

use super::ItemKey;
use crate::context::FrameContext;
use crate::renderer::UniformValue;

/// Engine-provided values a variable can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemSemantic {
    /// Size of the target being rendered, in pixels.
    ViewportSize,
    /// Frames rendered while not paused.
    FrameIndex,
    /// Seconds elapsed on the engine clock.
    Time,
    /// Camera view matrix.
    View,
    /// Camera projection matrix.
    Projection,
    /// `projection * view`.
    ViewProjection,
    /// Pixel-space orthographic projection of the current target.
    Orthographic,
    /// World transform of the item being drawn.
    GeometryTransform,
    /// Whether the item being drawn is selected.
    IsPicked,
    /// Camera world-space position.
    CameraPosition,
}

/// A named uniform owned by a pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderVariable {
    /// Uniform name in the shader.
    pub name: String,
    /// User value, used when no system semantic is attached.
    pub value: UniformValue,
    /// Engine-provided source of the value.
    pub system: Option<SystemSemantic>,
}

impl ShaderVariable {
    /// A user-valued variable.
    pub fn new(name: impl Into<String>, value: UniformValue) -> Self {
        Self {
            name: name.into(),
            value,
            system: None,
        }
    }

    /// A variable fed by the engine.
    pub fn system(name: impl Into<String>, semantic: SystemSemantic) -> Self {
        Self {
            name: name.into(),
            value: UniformValue::Float(0.0),
            system: Some(semantic),
        }
    }

    /// The value to upload for the current draw.
    pub fn resolve(&self, ctx: &FrameContext) -> UniformValue {
        let Some(semantic) = self.system else {
            return self.value;
        };
        match semantic {
            SystemSemantic::ViewportSize => UniformValue::Vec2(ctx.viewport),
            SystemSemantic::FrameIndex => UniformValue::Int(ctx.frame_index as i32),
            SystemSemantic::Time => UniformValue::Float(ctx.time),
            SystemSemantic::View => UniformValue::Mat4(ctx.camera.view),
            SystemSemantic::Projection => UniformValue::Mat4(ctx.camera.projection),
            SystemSemantic::ViewProjection => UniformValue::Mat4(ctx.camera.view_projection()),
            SystemSemantic::Orthographic => UniformValue::Mat4(ctx.orthographic()),
            SystemSemantic::GeometryTransform => UniformValue::Mat4(ctx.geometry_transform),
            SystemSemantic::IsPicked => UniformValue::Bool(ctx.picked),
            SystemSemantic::CameraPosition => UniformValue::Vec3(ctx.camera.position),
        }
    }
}

/// Overrides one pass variable while a specific child item is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemVariableValue {
    /// The child item the override applies to.
    pub item: ItemKey,
    /// Name of the overridden pass variable.
    pub variable: String,
    /// Value used for that item only.
    pub value: UniformValue,
}

/// Resolves every variable for one draw, applying overrides meant for `item`.
///
/// Overrides never replace a system semantic: those always reflect the
/// current frame.
pub fn resolve_variables<'a>(
    variables: &'a [ShaderVariable],
    overrides: &'a [ItemVariableValue],
    item: Option<ItemKey>,
    ctx: &'a FrameContext,
) -> impl Iterator<Item = (&'a str, UniformValue)> + 'a {
    variables.iter().map(move |var| {
        let overridden = item.and_then(|key| {
            overrides
                .iter()
                .find(|o| o.item == key && o.variable == var.name && var.system.is_none())
        });
        let value = overridden.map_or_else(|| var.resolve(ctx), |o| o.value);
        (var.name.as_str(), value)
    })
}
