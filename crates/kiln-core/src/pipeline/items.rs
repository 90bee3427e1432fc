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

//! Payloads of the pipeline item variants.

use super::{ItemKey, ItemVariableValue, ShaderVariable};
use crate::audio::AudioStream;
use crate::math::{yaw_pitch_roll, Aabb, Mat4, Vec3};
use crate::plugin::{PluginCapability, PluginData};
use crate::renderer::{DrawCall, DrawableId, PrimitiveTopology, ShaderMacro, TextureId};
use std::sync::Arc;

/// Maximum number of color targets a shader pass can write.
pub const MAX_RENDER_TARGETS: usize = 16;

/// A color target of a shader pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderTarget {
    /// The implicit window target owned by the engine.
    Window,
    /// A render texture, identified by its color texture.
    Texture(TextureId),
}

/// Path and entry point of one shader stage.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShaderStageSource {
    /// Project-relative source path. Empty when the stage is not set.
    pub path: String,
    /// Entry point name.
    pub entry: String,
}

impl ShaderStageSource {
    /// Creates a stage source.
    pub fn new(path: impl Into<String>, entry: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            entry: entry.into(),
        }
    }

    /// Whether both a path and an entry point are set.
    pub fn is_set(&self) -> bool {
        !self.path.is_empty() && !self.entry.is_empty()
    }
}

/// A pass drawing its children into up to [`MAX_RENDER_TARGETS`] targets.
#[derive(Debug, Clone)]
pub struct ShaderPass {
    /// Inactive passes are skipped entirely.
    pub active: bool,
    /// Geometry, models, render states and plugin items, in draw order.
    pub children: Vec<ItemKey>,
    /// Color targets. Only the first `rt_count` entries are considered.
    pub render_targets: [Option<RenderTarget>; MAX_RENDER_TARGETS],
    /// Number of active color targets; authoritative over `render_targets`.
    pub rt_count: usize,
    /// Vertex stage.
    pub vertex: ShaderStageSource,
    /// Pixel stage.
    pub pixel: ShaderStageSource,
    /// Geometry stage, only compiled when `gs_used` is set.
    pub geometry: ShaderStageSource,
    /// Whether the pass uses a geometry stage.
    pub gs_used: bool,
    /// Preprocessor definitions injected into every stage.
    pub macros: Vec<ShaderMacro>,
    /// Uniforms uploaded before each child draw.
    pub variables: Vec<ShaderVariable>,
    /// Per-item overrides of `variables`.
    pub item_values: Vec<ItemVariableValue>,
}

impl ShaderPass {
    /// Creates an active pass drawing to the window.
    pub fn new(vertex: ShaderStageSource, pixel: ShaderStageSource) -> Self {
        let mut render_targets = [None; MAX_RENDER_TARGETS];
        render_targets[0] = Some(RenderTarget::Window);
        Self {
            active: true,
            children: Vec::new(),
            render_targets,
            rt_count: 1,
            vertex,
            pixel,
            geometry: ShaderStageSource::default(),
            gs_used: false,
            macros: Vec::new(),
            variables: Vec::new(),
            item_values: Vec::new(),
        }
    }

    /// Replaces the color targets. Extra entries beyond [`MAX_RENDER_TARGETS`] are dropped.
    pub fn set_render_targets(&mut self, targets: &[RenderTarget]) {
        self.render_targets = [None; MAX_RENDER_TARGETS];
        let count = targets.len().min(MAX_RENDER_TARGETS);
        for (slot, target) in self.render_targets.iter_mut().zip(&targets[..count]) {
            *slot = Some(*target);
        }
        self.rt_count = count;
    }

    /// The targets actually in use: the first `rt_count` entries, up to the first gap.
    pub fn active_targets(&self) -> Vec<RenderTarget> {
        self.render_targets
            .iter()
            .take(self.rt_count.min(MAX_RENDER_TARGETS))
            .map_while(|t| *t)
            .collect()
    }

    /// Whether `target` is one of the active targets.
    pub fn writes_to(&self, target: RenderTarget) -> bool {
        self.active_targets().contains(&target)
    }
}

/// A compute dispatch.
#[derive(Debug, Clone)]
pub struct ComputePass {
    /// The compute stage.
    pub source: ShaderStageSource,
    /// Preprocessor definitions.
    pub macros: Vec<ShaderMacro>,
    /// Uniforms uploaded before the dispatch.
    pub variables: Vec<ShaderVariable>,
    /// Work group counts along x, y and z.
    pub work_groups: [u32; 3],
}

impl ComputePass {
    /// Creates a compute pass dispatching `work_groups`.
    pub fn new(source: ShaderStageSource, work_groups: [u32; 3]) -> Self {
        Self {
            source,
            macros: Vec::new(),
            variables: Vec::new(),
            work_groups,
        }
    }
}

/// A pass rendering an audio stream from a shader.
#[derive(Debug, Clone)]
pub struct AudioPass {
    /// Project-relative shader path.
    pub path: String,
    /// Preprocessor definitions.
    pub macros: Vec<ShaderMacro>,
    /// Uniforms uploaded before rendering audio.
    pub variables: Vec<ShaderVariable>,
    /// The stream that owns the compiled audio program.
    pub stream: Arc<dyn AudioStream>,
}

impl AudioPass {
    /// Creates an audio pass.
    pub fn new(path: impl Into<String>, stream: Arc<dyn AudioStream>) -> Self {
        Self {
            path: path.into(),
            macros: Vec::new(),
            variables: Vec::new(),
            stream,
        }
    }
}

/// Built-in primitive shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryShape {
    /// An axis-aligned box.
    Cube,
    /// A screen-space rectangle, positioned in target-relative units.
    Rectangle,
    /// A flat disc in the XY plane.
    Circle,
    /// An equilateral triangle in the XY plane.
    Triangle,
    /// A sphere.
    Sphere,
    /// A flat quad in the XY plane.
    Plane,
    /// A quad already in normalized device coordinates.
    ScreenQuadNdc,
}

impl GeometryShape {
    /// Vertex count of the shape's default tessellation.
    pub fn default_vertex_count(&self) -> u32 {
        match self {
            GeometryShape::Cube => 36,
            GeometryShape::Rectangle | GeometryShape::Plane | GeometryShape::ScreenQuadNdc => 6,
            GeometryShape::Circle => 63,
            GeometryShape::Triangle => 3,
            GeometryShape::Sphere => 2880,
        }
    }
}

/// A primitive shape draw.
#[derive(Debug, Clone)]
pub struct Geometry {
    /// The shape; decides the pick test and the transform variant.
    pub shape: GeometryShape,
    /// Shape dimensions before scaling.
    pub size: Vec3,
    /// Translation.
    pub position: Vec3,
    /// Euler rotation in radians, stored as `(pitch, yaw, roll)`.
    pub rotation: Vec3,
    /// Non-uniform scale.
    pub scale: Vec3,
    /// Uploaded vertex data.
    pub drawable: DrawableId,
    /// Primitive assembly.
    pub topology: PrimitiveTopology,
    /// Number of vertices to draw.
    pub vertex_count: u32,
    /// Instance count when instanced.
    pub instances: Option<u32>,
}

impl Geometry {
    /// Creates a unit-sized shape at the origin.
    pub fn new(shape: GeometryShape, drawable: DrawableId) -> Self {
        Self {
            shape,
            size: Vec3::ONE,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            drawable,
            topology: PrimitiveTopology::TriangleList,
            vertex_count: shape.default_vertex_count(),
            instances: None,
        }
    }

    /// The draw parameters of this shape.
    pub fn draw_call(&self) -> DrawCall {
        DrawCall {
            topology: self.topology,
            first_vertex: 0,
            vertex_count: self.vertex_count,
            instance_count: self.instances.unwrap_or(1),
        }
    }

    /// Transform uploaded to shaders, scale included.
    ///
    /// Rectangles are positioned in target pixels: `target` is the size of
    /// the render target being drawn to.
    pub fn render_transform(&self, target: (f32, f32)) -> Mat4 {
        if self.shape == GeometryShape::Rectangle {
            let scale = Vec3::new(self.scale.x * target.0, self.scale.y * target.1, 1.0);
            let position = Vec3::new(
                (self.position.x + 0.5) * target.0,
                (self.position.y + 0.5) * target.1,
                -1000.0,
            );
            return Mat4::from_translation(position) * Mat4::from_scale(scale) * yaw_pitch_roll(self.rotation);
        }
        Mat4::from_translation(self.position) * Mat4::from_scale(self.scale) * yaw_pitch_roll(self.rotation)
    }

    /// Transform used for picking. Scale is folded into the analytic shape
    /// extents instead, so it is left out here.
    pub fn pick_transform(&self) -> Mat4 {
        Mat4::from_translation(self.position) * yaw_pitch_roll(self.rotation)
    }
}

/// One drawable piece of a mesh with its CPU-side triangle list.
#[derive(Debug, Clone)]
pub struct SubMesh {
    /// Uploaded vertex data.
    pub drawable: DrawableId,
    /// Object-space vertex positions, three per triangle.
    pub positions: Vec<Vec3>,
}

/// Geometry of a loaded mesh.
#[derive(Debug, Clone)]
pub struct MeshGeometry {
    /// Object-space bounds of every sub-mesh.
    pub bounds: Aabb,
    /// The pieces of the mesh.
    pub sub_meshes: Vec<SubMesh>,
}

impl MeshGeometry {
    /// Builds a mesh and computes its bounds.
    pub fn new(sub_meshes: Vec<SubMesh>) -> Self {
        let bounds = sub_meshes
            .iter()
            .flat_map(|m| m.positions.iter())
            .fold(Aabb::INVALID, |acc, p| acc.merged_with_point(*p));
        Self { bounds, sub_meshes }
    }
}

/// A mesh draw.
#[derive(Debug, Clone)]
pub struct Model {
    /// The mesh being drawn.
    pub mesh: Arc<MeshGeometry>,
    /// Translation.
    pub position: Vec3,
    /// Euler rotation in radians, stored as `(pitch, yaw, roll)`.
    pub rotation: Vec3,
    /// Non-uniform scale.
    pub scale: Vec3,
    /// Instance count when instanced.
    pub instances: Option<u32>,
}

impl Model {
    /// Places a mesh at the origin.
    pub fn new(mesh: Arc<MeshGeometry>) -> Self {
        Self {
            mesh,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            instances: None,
        }
    }

    /// Transform uploaded to shaders.
    pub fn render_transform(&self) -> Mat4 {
        Mat4::from_translation(self.position) * Mat4::from_scale(self.scale) * yaw_pitch_roll(self.rotation)
    }

    /// Transform used for picking against the unscaled mesh data.
    pub fn pick_transform(&self) -> Mat4 {
        self.render_transform()
    }
}

/// An item owned by a plugin.
#[derive(Debug, Clone)]
pub struct PluginItem {
    /// The plugin that binds, draws and intersects this item.
    pub owner: Arc<dyn PluginCapability>,
    /// Plugin-defined item type name.
    pub item_type: String,
    /// Opaque plugin payload.
    pub data: PluginData,
    /// Items the plugin executes when this item runs at top level.
    pub children: Vec<ItemKey>,
}

impl PluginItem {
    /// Creates a plugin item.
    pub fn new(owner: Arc<dyn PluginCapability>, item_type: impl Into<String>, data: PluginData) -> Self {
        Self {
            owner,
            item_type: item_type.into(),
            data,
            children: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_targets_respects_count_and_gaps() {
        let mut pass = ShaderPass::new(ShaderStageSource::default(), ShaderStageSource::default());
        pass.set_render_targets(&[RenderTarget::Window, RenderTarget::Texture(TextureId(4))]);
        assert_eq!(pass.active_targets().len(), 2);

        pass.rt_count = 1;
        assert_eq!(pass.active_targets(), vec![RenderTarget::Window]);

        pass.rt_count = 3;
        assert_eq!(pass.active_targets().len(), 2, "a gap ends the target list");

        pass.rt_count = 0;
        assert!(pass.active_targets().is_empty());
    }

    #[test]
    fn test_rectangle_transform_is_in_target_pixels() {
        let mut rect = Geometry::new(GeometryShape::Rectangle, DrawableId(0));
        rect.scale = Vec3::new(0.5, 0.5, 1.0);
        let m = rect.render_transform((200.0, 100.0));
        let center = m.transform_point3(Vec3::ZERO);
        assert_eq!(center, Vec3::new(100.0, 50.0, -1000.0));
    }

    #[test]
    fn test_mesh_bounds_cover_all_sub_meshes() {
        let mesh = MeshGeometry::new(vec![
            SubMesh {
                drawable: DrawableId(0),
                positions: vec![Vec3::new(-1.0, 0.0, 0.0), Vec3::new(0.0, 2.0, 0.0), Vec3::ZERO],
            },
            SubMesh {
                drawable: DrawableId(1),
                positions: vec![Vec3::new(0.0, 0.0, 3.0), Vec3::ZERO, Vec3::ZERO],
            },
        ]);
        assert_eq!(mesh.bounds.min, Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(mesh.bounds.max, Vec3::new(0.0, 2.0, 3.0));
    }
}
