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

//! Project-side collaborators: objects, render textures and shader sources.
//!
//! The executor never owns textures, buffers or files. It asks an
//! [`ObjectQuery`] what a pass binds and how render textures are sized,
//! and a [`ShaderSource`] for shader text.

use crate::math::{LinearRgba, UVec2, Vec2};
use crate::pipeline::ItemKey;
use crate::plugin::PluginObject;
use crate::renderer::{
    BufferId, ObjectId, ShaderError, ShaderLanguage, ShaderMacro, ShaderStage, TextureId,
};
use std::fmt::Debug;

/// What a project object is, as far as binding is concerned.
#[derive(Debug, Clone)]
pub enum ResourceKind {
    /// A 2D texture, including render textures and audio textures.
    Texture(TextureId),
    /// A cube map.
    CubeMap(TextureId),
    /// A writable 2D image.
    Image(TextureId),
    /// A writable 3D image.
    Image3D(TextureId),
    /// A buffer object.
    Buffer(BufferId),
    /// An object owned by a plugin.
    Plugin(PluginObject),
}

impl ResourceKind {
    /// The backing texture, for texture-like objects.
    pub fn texture(&self) -> Option<TextureId> {
        match self {
            ResourceKind::Texture(id)
            | ResourceKind::CubeMap(id)
            | ResourceKind::Image(id)
            | ResourceKind::Image3D(id) => Some(*id),
            ResourceKind::Buffer(_) | ResourceKind::Plugin(_) => None,
        }
    }

    /// The backing buffer, for buffer objects.
    pub fn buffer(&self) -> Option<BufferId> {
        match self {
            ResourceKind::Buffer(id) => Some(*id),
            _ => None,
        }
    }
}

/// How a render texture is sized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderTextureSize {
    /// A fixed size in pixels.
    Fixed(UVec2),
    /// A fraction of the window size.
    Relative(Vec2),
}

/// An offscreen render target, as described by the project.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderTextureInfo {
    /// Display name, reported by pixel debugging.
    pub name: String,
    /// Single-sample color texture. Also the target's identity in passes.
    pub color: TextureId,
    /// Multisample color texture, resolved into `color`.
    pub color_ms: TextureId,
    /// Depth/stencil texture used when this is a pass's last target.
    pub depth_stencil: TextureId,
    /// Multisample depth/stencil texture.
    pub depth_stencil_ms: TextureId,
    /// Size policy.
    pub size: RenderTextureSize,
    /// Whether the target is cleared when a pass starts writing it.
    pub clear: bool,
    /// Clear color for normal renders.
    pub clear_color: LinearRgba,
}

impl RenderTextureInfo {
    /// Pixel size of the target for a given window size.
    ///
    /// Relative sizes never collapse below one pixel.
    pub fn calculate_size(&self, window: UVec2) -> UVec2 {
        match self.size {
            RenderTextureSize::Fixed(size) => size,
            RenderTextureSize::Relative(ratio) => {
                let w = (window.x as f32 * ratio.x) as u32;
                let h = (window.y as f32 * ratio.y) as u32;
                UVec2::new(w.max(1), h.max(1))
            }
        }
    }
}

/// Read access to the project's objects.
pub trait ObjectQuery: Send + Sync + Debug {
    /// Objects bound as textures for a pass, in unit order.
    fn bind_list(&self, pass: ItemKey) -> Vec<ObjectId>;

    /// Objects bound as uniform buffers (shader passes) or as images and
    /// storage buffers (compute and audio passes), in slot order.
    fn uniform_bind_list(&self, pass: ItemKey) -> Vec<ObjectId>;

    /// Classifies an object. `None` for objects that no longer exist.
    fn resource_kind(&self, object: ObjectId) -> Option<ResourceKind>;

    /// Whether the object is a cube map.
    fn is_cube_map(&self, object: ObjectId) -> bool {
        matches!(self.resource_kind(object), Some(ResourceKind::CubeMap(_)))
    }

    /// Whether the object is a 3D image.
    fn is_image_3d(&self, object: ObjectId) -> bool {
        matches!(self.resource_kind(object), Some(ResourceKind::Image3D(_)))
    }

    /// Whether the object is a 2D image.
    fn is_image(&self, object: ObjectId) -> bool {
        matches!(self.resource_kind(object), Some(ResourceKind::Image(_)))
    }

    /// Whether the object is a buffer.
    fn is_buffer(&self, object: ObjectId) -> bool {
        matches!(self.resource_kind(object), Some(ResourceKind::Buffer(_)))
    }

    /// Whether the object belongs to a plugin.
    fn is_plugin_object(&self, object: ObjectId) -> bool {
        matches!(self.resource_kind(object), Some(ResourceKind::Plugin(_)))
    }

    /// The plugin object behind an id.
    fn plugin_object(&self, object: ObjectId) -> Option<PluginObject> {
        match self.resource_kind(object) {
            Some(ResourceKind::Plugin(obj)) => Some(obj),
            _ => None,
        }
    }

    /// The render texture whose color texture is `color`.
    fn render_texture(&self, color: TextureId) -> Option<RenderTextureInfo>;

    /// Every render texture in the project.
    fn render_textures(&self) -> Vec<RenderTextureInfo>;

    /// Reallocates every window-relative render texture for a new window size.
    fn resize_relative_render_textures(&self, width: u32, height: u32);
}

/// A request to translate a non-native shader into device GLSL.
#[derive(Debug, Clone, Copy)]
pub struct TranscompileRequest<'a> {
    /// Source language.
    pub language: ShaderLanguage,
    /// Absolute path of the source file.
    pub path: &'a str,
    /// Stage to translate.
    pub stage: ShaderStage,
    /// Entry point.
    pub entry: &'a str,
    /// Macros to define while translating.
    pub macros: &'a [ShaderMacro],
    /// Whether the pass also uses a geometry stage.
    pub gs_used: bool,
}

/// Access to shader text on behalf of the project.
pub trait ShaderSource: Send + Sync + Debug {
    /// Loads a project-relative or absolute file.
    /// ## Errors
    /// * `ShaderError::LoadError` - If the file cannot be read.
    fn load_project_file(&self, path: &str) -> Result<String, ShaderError>;

    /// Whether a file exists.
    fn file_exists(&self, path: &str) -> bool;

    /// Resolves a project-relative path to an absolute one.
    fn project_path(&self, path: &str) -> String;

    /// Source language of a file.
    fn language_of(&self, path: &str) -> ShaderLanguage {
        language_from_extension(path)
    }

    /// Translates a non-native source to GLSL.
    /// ## Errors
    /// * `ShaderError::CompilationError` - If translation fails.
    fn transcompile(&self, request: &TranscompileRequest<'_>) -> Result<String, ShaderError>;
}

/// Guesses a shader language from a file extension.
///
/// `.hlsl` and `.fx` are HLSL, `.vk` and `.vkglsl` are Vulkan GLSL,
/// everything else is GLSL.
pub fn language_from_extension(path: &str) -> ShaderLanguage {
    let ext = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "hlsl" | "fx" => ShaderLanguage::Hlsl,
        "vk" | "vkglsl" => ShaderLanguage::VulkanGlsl,
        _ => ShaderLanguage::Glsl,
    }
}
