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

use crate::math::LinearRgba;
use crate::renderer::api::*;
use crate::renderer::error::{ResourceError, ShaderError};
use std::fmt::Debug;

/// The immediate-mode GPU context the executor drives.
///
/// Commands are issued one at a time against implicit bound state (current
/// framebuffer, program, viewport), in the order the executor calls them.
/// All methods take `&self`; implementations guard their state internally.
/// Every call happens on the rendering thread, so a full render call is the
/// unit of exclusion for implementations that are shared across threads.
pub trait GraphicsDevice: Send + Sync + Debug + 'static {
    /// Creates a new GPU texture.
    /// ## Arguments
    /// * `descriptor` - Size, format and sample count of the texture.
    /// ## Returns
    /// A `Result` containing the ID of the created texture or an error if the creation fails.
    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<TextureId, ResourceError>;

    /// Destroys a GPU texture.
    /// ## Arguments
    /// * `id` - The ID of the texture to be destroyed.
    /// ## Errors
    /// * `ResourceError::InvalidHandle` - If the texture does not exist.
    fn destroy_texture(&self, id: TextureId) -> Result<(), ResourceError>;

    /// Reallocates a texture's storage at a new size, keeping its ID and format.
    /// Contents are undefined afterwards.
    /// ## Errors
    /// * `ResourceError::InvalidHandle` - If the texture does not exist.
    fn resize_texture(&self, id: TextureId, width: u32, height: u32) -> Result<(), ResourceError>;

    /// Compiles a single shader stage.
    /// ## Arguments
    /// * `descriptor` - The stage and its final source text.
    /// ## Returns
    /// The ID of the compiled stage.
    /// ## Errors
    /// * `ShaderError::CompilationError` - Carries the raw compiler log.
    fn compile_shader(
        &self,
        descriptor: &ShaderModuleDescriptor<'_>,
    ) -> Result<ShaderModuleId, ShaderError>;

    /// Destroys a compiled stage. Programs already linked against it stay valid.
    fn destroy_shader(&self, id: ShaderModuleId) -> Result<(), ResourceError>;

    /// Links compiled stages into a program.
    /// ## Arguments
    /// * `label` - A debug label.
    /// * `stages` - The stages to attach, in any order.
    /// ## Errors
    /// * `ShaderError::LinkError` - Carries the raw linker log.
    fn link_program(&self, label: &str, stages: &[ShaderModuleId]) -> Result<ProgramId, ShaderError>;

    /// Destroys a linked program.
    fn destroy_program(&self, id: ProgramId) -> Result<(), ResourceError>;

    /// Assembles a framebuffer from existing textures.
    /// ## Errors
    /// * `ResourceError::IncompleteFramebuffer` - If the backend rejects the attachment set.
    fn create_framebuffer(
        &self,
        descriptor: &FramebufferDescriptor,
    ) -> Result<FramebufferId, ResourceError>;

    /// Destroys a framebuffer. The attached textures are not affected.
    fn destroy_framebuffer(&self, id: FramebufferId) -> Result<(), ResourceError>;

    /// Binds a framebuffer for drawing and clearing; `None` binds the default surface.
    fn bind_framebuffer(&self, framebuffer: Option<FramebufferId>);

    /// Enables fragment outputs `0..count` of the bound framebuffer.
    fn set_draw_buffers(&self, count: u32);

    /// Sets the viewport to `(0, 0, width, height)`.
    fn set_viewport(&self, width: u32, height: u32);

    /// Clears color attachment `index` of the bound framebuffer.
    fn clear_color_attachment(&self, index: u32, color: LinearRgba);

    /// Clears the depth/stencil attachment of the bound framebuffer.
    ///
    /// The stencil write mask is reset to all ones before clearing.
    fn clear_depth_stencil(&self, depth: f32, stencil: u32);

    /// Makes `program` current.
    fn use_program(&self, program: ProgramId);

    /// Uploads a uniform value to `program`. Unknown names are ignored.
    fn set_uniform(&self, program: ProgramId, name: &str, value: &UniformValue);

    /// Binds a texture to sampler unit `unit`.
    fn bind_texture(&self, unit: u32, texture: TextureId, binding: TextureBinding);

    /// Binds a uniform buffer to binding point `slot`.
    fn bind_uniform_buffer(&self, slot: u32, buffer: BufferId);

    /// Binds a shader storage buffer to binding point `slot`.
    fn bind_storage_buffer(&self, slot: u32, buffer: BufferId);

    /// Binds a texture as a read/write image at unit `slot`.
    /// `layered` binds every layer of a 3D image.
    fn bind_image(&self, slot: u32, texture: TextureId, layered: bool);

    /// Restores the baseline fixed-function state every shader pass starts from.
    fn apply_default_state(&self) {
        self.apply_render_state(&RenderStateDescriptor::default());
    }

    /// Applies a full fixed-function state snapshot.
    fn apply_render_state(&self, state: &RenderStateDescriptor);

    /// Toggles multisample rasterization.
    fn set_multisample(&self, enabled: bool);

    /// Issues a draw of `drawable` with the current program and state.
    fn draw(&self, drawable: DrawableId, call: &DrawCall);

    /// Dispatches the current compute program.
    fn dispatch_compute(&self, x: u32, y: u32, z: u32);

    /// Waits until the given classes of writes are visible to later commands.
    fn memory_barrier(&self, barrier: MemoryBarrier);

    /// Resolves color attachment `index` of `source` into the same attachment of `destination`.
    fn resolve_attachment(
        &self,
        source: FramebufferId,
        destination: FramebufferId,
        index: u32,
        width: u32,
        height: u32,
    );

    /// Synchronously reads one pixel of a single-sample color texture as RGBA8.
    /// ## Errors
    /// * `ResourceError::OutOfBounds` - If `(x, y)` lies outside the texture.
    /// * `ResourceError::InvalidHandle` - If the texture does not exist.
    fn read_pixel(&self, texture: TextureId, x: u32, y: u32) -> Result<[u8; 4], ResourceError>;
}
