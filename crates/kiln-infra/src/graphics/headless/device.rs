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

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use kiln_core::math::{LinearRgba, Vec2};
use kiln_core::renderer::api::debug::{
    IDENTITY_COLOR_UNIFORM, INSTANCE_ID_VARYING, VERTEX_ID_VARYING,
};
use kiln_core::renderer::{
    BufferId, DrawCall, DrawableId, FramebufferDescriptor, FramebufferId, GraphicsDevice,
    MemoryBarrier, ProgramId, RenderStateDescriptor, ResourceError, ShaderError,
    ShaderModuleDescriptor, ShaderModuleId, ShaderStage, TextureBinding, TextureDescriptor,
    TextureFormat, TextureId, UniformValue,
};

use super::command::DeviceCommand;

/// The part of the bound viewport a drawable covers, in `[0, 1]` viewport
/// coordinates. Draws without a registered coverage fill the whole viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coverage {
    pub min: Vec2,
    pub max: Vec2,
}

impl Coverage {
    pub const FULL: Self = Self {
        min: Vec2::ZERO,
        max: Vec2::ONE,
    };

    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }
}

#[derive(Debug)]
struct HeadlessTexture {
    descriptor: TextureDescriptor,
    pixels: Vec<[u8; 4]>,
}

impl HeadlessTexture {
    fn new(descriptor: TextureDescriptor) -> Self {
        let pixels = vec![[0; 4]; (descriptor.width * descriptor.height) as usize];
        Self { descriptor, pixels }
    }

    fn fill(&mut self, color: [u8; 4], x0: u32, y0: u32, x1: u32, y1: u32) {
        let x1 = x1.min(self.descriptor.width);
        let y1 = y1.min(self.descriptor.height);
        for y in y0..y1 {
            for x in x0..x1 {
                self.pixels[(y * self.descriptor.width + x) as usize] = color;
            }
        }
    }

    fn store(&self, color: LinearRgba) -> [u8; 4] {
        let mut rgba = color.to_rgba8();
        if self.descriptor.format == TextureFormat::Rgb8Unorm {
            rgba[3] = 255;
        }
        rgba
    }
}

#[derive(Debug)]
struct HeadlessShader {
    stage: ShaderStage,
    source: String,
}

#[derive(Debug)]
struct HeadlessProgram {
    pixel_source: String,
    uniforms: HashMap<String, UniformValue>,
}

/// What a fragment program writes, decided from its source.
enum FragmentOutput {
    Identity,
    VertexId,
    InstanceId,
    Constant,
}

#[derive(Debug, Default)]
struct HeadlessState {
    textures: HashMap<TextureId, HeadlessTexture>,
    shaders: HashMap<ShaderModuleId, HeadlessShader>,
    programs: HashMap<ProgramId, HeadlessProgram>,
    framebuffers: HashMap<FramebufferId, FramebufferDescriptor>,
    coverage: HashMap<DrawableId, Coverage>,

    bound_framebuffer: Option<FramebufferId>,
    current_program: Option<ProgramId>,
    draw_buffers: u32,
    viewport: (u32, u32),

    commands: Vec<DeviceCommand>,
    framebuffers_created: usize,
    shaders_compiled: usize,
}

/// The internal, shared state of a [`HeadlessDevice`].
#[derive(Debug)]
struct HeadlessDeviceInternal {
    state: Mutex<HeadlessState>,
    next_texture_id: AtomicUsize,
    next_shader_id: AtomicUsize,
    next_program_id: AtomicUsize,
    next_framebuffer_id: AtomicUsize,
}

/// A graphics device that executes nothing on a GPU.
///
/// It records every command, keeps RGBA8 storage for each color texture and
/// simulates clears, draws, resolves and readback well enough to exercise
/// pixel picking:
/// - a draw fills its drawable's [`Coverage`] of the viewport in every
///   active color attachment of the bound framebuffer;
/// - the fill color comes from the identity uniform for identity programs,
///   from the last vertex or instance index for pick programs, and is white
///   otherwise;
/// - shader sources containing `#error` fail to compile with a log that
///   points at the directive's line.
///
/// Clones share the same state.
#[derive(Debug, Clone)]
pub struct HeadlessDevice {
    internal: Arc<HeadlessDeviceInternal>,
}

impl Default for HeadlessDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessDevice {
    pub fn new() -> Self {
        Self {
            internal: Arc::new(HeadlessDeviceInternal {
                state: Mutex::new(HeadlessState {
                    draw_buffers: 1,
                    ..Default::default()
                }),
                next_texture_id: AtomicUsize::new(1),
                next_shader_id: AtomicUsize::new(1),
                next_program_id: AtomicUsize::new(1),
                next_framebuffer_id: AtomicUsize::new(1),
            }),
        }
    }

    // --- ID Generation Helpers ---

    fn generate_texture_id(&self) -> TextureId {
        TextureId(self.internal.next_texture_id.fetch_add(1, Ordering::Relaxed))
    }

    fn generate_shader_id(&self) -> ShaderModuleId {
        ShaderModuleId(self.internal.next_shader_id.fetch_add(1, Ordering::Relaxed))
    }

    fn generate_program_id(&self) -> ProgramId {
        ProgramId(self.internal.next_program_id.fetch_add(1, Ordering::Relaxed))
    }

    fn generate_framebuffer_id(&self) -> FramebufferId {
        FramebufferId(
            self.internal
                .next_framebuffer_id
                .fetch_add(1, Ordering::Relaxed),
        )
    }

    fn state(&self) -> MutexGuard<'_, HeadlessState> {
        self.internal
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, command: DeviceCommand) {
        self.state().commands.push(command);
    }

    // --- Inspection ---

    /// Restricts the pixels a drawable writes.
    pub fn set_coverage(&self, drawable: DrawableId, coverage: Coverage) {
        self.state().coverage.insert(drawable, coverage);
    }

    /// A snapshot of the command log.
    pub fn commands(&self) -> Vec<DeviceCommand> {
        self.state().commands.clone()
    }

    /// Empties the command log.
    pub fn clear_commands(&self) {
        self.state().commands.clear();
    }

    /// Number of logged commands matching a predicate.
    pub fn count_commands(&self, predicate: impl Fn(&DeviceCommand) -> bool) -> usize {
        self.state().commands.iter().filter(|c| predicate(c)).count()
    }

    /// Number of framebuffers created since the device was made.
    pub fn framebuffers_created(&self) -> usize {
        self.state().framebuffers_created
    }

    /// Number of successful shader compilations since the device was made.
    pub fn shaders_compiled(&self) -> usize {
        self.state().shaders_compiled
    }

    pub fn live_textures(&self) -> usize {
        self.state().textures.len()
    }

    pub fn live_shaders(&self) -> usize {
        self.state().shaders.len()
    }

    pub fn live_programs(&self) -> usize {
        self.state().programs.len()
    }

    pub fn live_framebuffers(&self) -> usize {
        self.state().framebuffers.len()
    }

    /// The descriptor a live framebuffer was created with.
    pub fn framebuffer(&self, id: FramebufferId) -> Option<FramebufferDescriptor> {
        self.state().framebuffers.get(&id).cloned()
    }

    /// Current size of a live texture.
    pub fn texture_size(&self, id: TextureId) -> Option<(u32, u32)> {
        self.state()
            .textures
            .get(&id)
            .map(|t| (t.descriptor.width, t.descriptor.height))
    }

    /// Last value set for a uniform of a live program.
    pub fn uniform(&self, program: ProgramId, name: &str) -> Option<UniformValue> {
        self.state()
            .programs
            .get(&program)
            .and_then(|p| p.uniforms.get(name).copied())
    }
}

fn fragment_output(source: &str) -> FragmentOutput {
    if source.contains(IDENTITY_COLOR_UNIFORM) {
        FragmentOutput::Identity
    } else if source.contains(VERTEX_ID_VARYING) {
        FragmentOutput::VertexId
    } else if source.contains(INSTANCE_ID_VARYING) {
        FragmentOutput::InstanceId
    } else {
        FragmentOutput::Constant
    }
}

fn encode_index(index: u32) -> [u8; 4] {
    [
        (index & 0xFF) as u8,
        ((index >> 8) & 0xFF) as u8,
        ((index >> 16) & 0xFF) as u8,
        255,
    ]
}

impl HeadlessState {
    fn draw_color(&self, call: &DrawCall) -> [u8; 4] {
        let Some(program) = self.current_program.and_then(|p| self.programs.get(&p)) else {
            return [255; 4];
        };
        match fragment_output(&program.pixel_source) {
            FragmentOutput::Identity => match program.uniforms.get(IDENTITY_COLOR_UNIFORM) {
                Some(UniformValue::Vec3(c)) => LinearRgba::rgb(c.x, c.y, c.z).to_rgba8(),
                _ => [0, 0, 0, 255],
            },
            FragmentOutput::VertexId => encode_index(call.vertex_count.saturating_sub(1)),
            FragmentOutput::InstanceId => encode_index(call.instance_count.saturating_sub(1)),
            FragmentOutput::Constant => [255; 4],
        }
    }

    fn bound_attachments(&self) -> Vec<TextureId> {
        self.bound_framebuffer
            .and_then(|fb| self.framebuffers.get(&fb))
            .map(|fb| {
                fb.color_attachments
                    .iter()
                    .take(self.draw_buffers as usize)
                    .copied()
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl GraphicsDevice for HeadlessDevice {
    // --- Texture Operations ---

    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<TextureId, ResourceError> {
        let id = self.generate_texture_id();
        self.state()
            .textures
            .insert(id, HeadlessTexture::new(descriptor.clone()));
        log::trace!(
            "HeadlessDevice: Created texture '{}' ({}x{}) with ID: {:?}",
            descriptor.label,
            descriptor.width,
            descriptor.height,
            id
        );
        Ok(id)
    }

    fn destroy_texture(&self, id: TextureId) -> Result<(), ResourceError> {
        self.state()
            .textures
            .remove(&id)
            .map(|_| ())
            .ok_or(ResourceError::InvalidHandle)
    }

    fn resize_texture(&self, id: TextureId, width: u32, height: u32) -> Result<(), ResourceError> {
        let mut state = self.state();
        let texture = state
            .textures
            .get_mut(&id)
            .ok_or(ResourceError::InvalidHandle)?;
        let mut descriptor = texture.descriptor.clone();
        descriptor.width = width;
        descriptor.height = height;
        *texture = HeadlessTexture::new(descriptor);
        Ok(())
    }

    // --- Shader and Program Operations ---

    fn compile_shader(
        &self,
        descriptor: &ShaderModuleDescriptor,
    ) -> Result<ShaderModuleId, ShaderError> {
        if let Some(line) = descriptor
            .source
            .lines()
            .position(|l| l.trim_start().starts_with("#error"))
        {
            log::debug!(
                "HeadlessDevice: Rejecting {} stage of '{}'",
                descriptor.stage.name(),
                descriptor.label
            );
            return Err(ShaderError::CompilationError {
                label: descriptor.label.to_string(),
                stage: descriptor.stage,
                log: format!("0({}) : error C0000: #error directive encountered", line + 1),
            });
        }

        let id = self.generate_shader_id();
        let mut state = self.state();
        state.shaders.insert(
            id,
            HeadlessShader {
                stage: descriptor.stage,
                source: descriptor.source.to_string(),
            },
        );
        state.shaders_compiled += 1;
        Ok(id)
    }

    fn destroy_shader(&self, id: ShaderModuleId) -> Result<(), ResourceError> {
        self.state()
            .shaders
            .remove(&id)
            .map(|_| ())
            .ok_or(ResourceError::InvalidHandle)
    }

    fn link_program(&self, label: &str, stages: &[ShaderModuleId]) -> Result<ProgramId, ShaderError> {
        let mut state = self.state();
        let mut pixel_source = String::new();
        for stage in stages {
            let shader = state.shaders.get(stage).ok_or_else(|| ShaderError::LinkError {
                label: label.to_string(),
                log: format!("shader module {stage:?} does not exist"),
            })?;
            if shader.stage == ShaderStage::Pixel {
                pixel_source.clone_from(&shader.source);
            }
        }

        let id = self.generate_program_id();
        state.programs.insert(
            id,
            HeadlessProgram {
                pixel_source,
                uniforms: HashMap::new(),
            },
        );
        log::trace!("HeadlessDevice: Linked program '{label}' with ID: {id:?}");
        Ok(id)
    }

    fn destroy_program(&self, id: ProgramId) -> Result<(), ResourceError> {
        let mut state = self.state();
        if state.current_program == Some(id) {
            state.current_program = None;
        }
        state
            .programs
            .remove(&id)
            .map(|_| ())
            .ok_or(ResourceError::InvalidHandle)
    }

    // --- Framebuffer Operations ---

    fn create_framebuffer(
        &self,
        descriptor: &FramebufferDescriptor,
    ) -> Result<FramebufferId, ResourceError> {
        let mut state = self.state();
        let missing = descriptor
            .color_attachments
            .iter()
            .chain(descriptor.depth_stencil.iter())
            .any(|t| !state.textures.contains_key(t));
        if descriptor.color_attachments.is_empty() || missing {
            return Err(ResourceError::IncompleteFramebuffer {
                label: descriptor.label.clone(),
            });
        }

        let id = self.generate_framebuffer_id();
        state.framebuffers.insert(id, descriptor.clone());
        state.framebuffers_created += 1;
        Ok(id)
    }

    fn destroy_framebuffer(&self, id: FramebufferId) -> Result<(), ResourceError> {
        let mut state = self.state();
        if state.bound_framebuffer == Some(id) {
            state.bound_framebuffer = None;
        }
        state
            .framebuffers
            .remove(&id)
            .map(|_| ())
            .ok_or(ResourceError::InvalidHandle)
    }

    fn bind_framebuffer(&self, framebuffer: Option<FramebufferId>) {
        let mut state = self.state();
        state.bound_framebuffer = framebuffer;
        state.commands.push(DeviceCommand::BindFramebuffer(framebuffer));
    }

    fn set_draw_buffers(&self, count: u32) {
        let mut state = self.state();
        state.draw_buffers = count;
        state.commands.push(DeviceCommand::SetDrawBuffers(count));
    }

    fn set_viewport(&self, width: u32, height: u32) {
        let mut state = self.state();
        state.viewport = (width, height);
        state.commands.push(DeviceCommand::SetViewport(width, height));
    }

    fn clear_color_attachment(&self, index: u32, color: LinearRgba) {
        let mut state = self.state();
        let framebuffer = state.bound_framebuffer;
        let target = framebuffer
            .and_then(|fb| state.framebuffers.get(&fb))
            .and_then(|fb| fb.color_attachments.get(index as usize).copied());
        if let Some(texture) = target.and_then(|t| state.textures.get_mut(&t)) {
            let rgba = texture.store(color);
            texture.pixels.fill(rgba);
        }
        state.commands.push(DeviceCommand::ClearColor {
            framebuffer,
            index,
            color,
        });
    }

    fn clear_depth_stencil(&self, _depth: f32, _stencil: u32) {
        let mut state = self.state();
        let framebuffer = state.bound_framebuffer;
        state
            .commands
            .push(DeviceCommand::ClearDepthStencil { framebuffer });
    }

    // --- Program State ---

    fn use_program(&self, program: ProgramId) {
        let mut state = self.state();
        state.current_program = Some(program);
        state.commands.push(DeviceCommand::UseProgram(program));
    }

    fn set_uniform(&self, program: ProgramId, name: &str, value: &UniformValue) {
        let mut state = self.state();
        if let Some(entry) = state.programs.get_mut(&program) {
            entry.uniforms.insert(name.to_string(), *value);
        }
        state.commands.push(DeviceCommand::SetUniform {
            program,
            name: name.to_string(),
            value: *value,
        });
    }

    fn bind_texture(&self, unit: u32, texture: TextureId, binding: TextureBinding) {
        self.record(DeviceCommand::BindTexture {
            unit,
            texture,
            binding,
        });
    }

    fn bind_uniform_buffer(&self, slot: u32, buffer: BufferId) {
        self.record(DeviceCommand::BindUniformBuffer { slot, buffer });
    }

    fn bind_storage_buffer(&self, slot: u32, buffer: BufferId) {
        self.record(DeviceCommand::BindStorageBuffer { slot, buffer });
    }

    fn bind_image(&self, slot: u32, texture: TextureId, layered: bool) {
        self.record(DeviceCommand::BindImage {
            slot,
            texture,
            layered,
        });
    }

    fn apply_render_state(&self, state: &RenderStateDescriptor) {
        self.record(DeviceCommand::ApplyRenderState(*state));
    }

    fn set_multisample(&self, enabled: bool) {
        self.record(DeviceCommand::SetMultisample(enabled));
    }

    // --- Work ---

    fn draw(&self, drawable: DrawableId, call: &DrawCall) {
        let mut state = self.state();
        let color = state.draw_color(call);
        let coverage = state
            .coverage
            .get(&drawable)
            .copied()
            .unwrap_or(Coverage::FULL);
        let (vw, vh) = state.viewport;
        let x0 = (coverage.min.x * vw as f32) as u32;
        let y0 = (coverage.min.y * vh as f32) as u32;
        let x1 = (coverage.max.x * vw as f32).ceil() as u32;
        let y1 = (coverage.max.y * vh as f32).ceil() as u32;

        for attachment in state.bound_attachments() {
            if let Some(texture) = state.textures.get_mut(&attachment) {
                let mut rgba = color;
                if texture.descriptor.format == TextureFormat::Rgb8Unorm {
                    rgba[3] = 255;
                }
                texture.fill(rgba, x0, y0, x1.min(vw), y1.min(vh));
            }
        }

        let framebuffer = state.bound_framebuffer;
        state.commands.push(DeviceCommand::Draw {
            framebuffer,
            drawable,
            call: *call,
        });
    }

    fn dispatch_compute(&self, x: u32, y: u32, z: u32) {
        self.record(DeviceCommand::DispatchCompute([x, y, z]));
    }

    fn memory_barrier(&self, barrier: MemoryBarrier) {
        self.record(DeviceCommand::MemoryBarrier(barrier));
    }

    fn resolve_attachment(
        &self,
        source: FramebufferId,
        destination: FramebufferId,
        index: u32,
        width: u32,
        height: u32,
    ) {
        let mut state = self.state();
        let attachment = |fb: FramebufferId| {
            state
                .framebuffers
                .get(&fb)
                .and_then(|d| d.color_attachments.get(index as usize).copied())
        };
        let (src, dst) = (attachment(source), attachment(destination));
        if let (Some(src), Some(dst)) = (src, dst) {
            let pixels = state.textures.get(&src).map(|t| {
                let w = t.descriptor.width;
                (w, t.pixels.clone())
            });
            if let (Some((src_w, pixels)), Some(target)) = (pixels, state.textures.get_mut(&dst)) {
                let w = width.min(src_w).min(target.descriptor.width);
                let h = height
                    .min(pixels.len() as u32 / src_w.max(1))
                    .min(target.descriptor.height);
                for y in 0..h {
                    for x in 0..w {
                        target.pixels[(y * target.descriptor.width + x) as usize] =
                            pixels[(y * src_w + x) as usize];
                    }
                }
            }
        } else {
            log::warn!("HeadlessDevice: Resolve between unknown framebuffers {source:?} -> {destination:?}");
        }
        state.commands.push(DeviceCommand::Resolve {
            source,
            destination,
            index,
        });
    }

    fn read_pixel(&self, texture: TextureId, x: u32, y: u32) -> Result<[u8; 4], ResourceError> {
        let state = self.state();
        let texture = state
            .textures
            .get(&texture)
            .ok_or(ResourceError::InvalidHandle)?;
        if x >= texture.descriptor.width || y >= texture.descriptor.height {
            return Err(ResourceError::OutOfBounds);
        }
        Ok(texture.pixels[(y * texture.descriptor.width + x) as usize])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_core::renderer::api::debug::IDENTITY_PIXEL_SHADER;
    use kiln_core::renderer::{PrimitiveTopology, ShaderStage};

    fn target(device: &HeadlessDevice, w: u32, h: u32) -> (TextureId, FramebufferId) {
        let color = device
            .create_texture(&TextureDescriptor::new("color", w, h, TextureFormat::Rgba8Unorm))
            .unwrap();
        let fb = device
            .create_framebuffer(&FramebufferDescriptor {
                label: "fb".to_string(),
                color_attachments: vec![color],
                depth_stencil: None,
                multisampled: false,
            })
            .unwrap();
        (color, fb)
    }

    fn program(device: &HeadlessDevice, pixel: &str) -> ProgramId {
        let vs = device
            .compile_shader(&ShaderModuleDescriptor {
                label: "test",
                stage: ShaderStage::Vertex,
                source: "void main() {}",
            })
            .unwrap();
        let ps = device
            .compile_shader(&ShaderModuleDescriptor {
                label: "test",
                stage: ShaderStage::Pixel,
                source: pixel,
            })
            .unwrap();
        device.link_program("test", &[vs, ps]).unwrap()
    }

    fn call(vertex_count: u32) -> DrawCall {
        DrawCall {
            topology: PrimitiveTopology::TriangleList,
            first_vertex: 0,
            vertex_count,
            instance_count: 1,
        }
    }

    // ─── Compilation ───────────────────────────────────────────────

    #[test]
    fn test_error_directive_fails_with_line() {
        let device = HeadlessDevice::new();
        let err = device
            .compile_shader(&ShaderModuleDescriptor {
                label: "Simple",
                stage: ShaderStage::Pixel,
                source: "#version 330\nvoid main() {\n#error broken\n}",
            })
            .unwrap_err();
        match err {
            ShaderError::CompilationError { log, stage, .. } => {
                assert_eq!(stage, ShaderStage::Pixel);
                assert!(log.starts_with("0(3) :"), "log should point at line 3: {log}");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(device.live_shaders(), 0);
    }

    // ─── Simulation ────────────────────────────────────────────────

    #[test]
    fn test_clear_then_draw_writes_identity_color() {
        let device = HeadlessDevice::new();
        let (color, fb) = target(&device, 4, 4);
        let prog = program(&device, IDENTITY_PIXEL_SHADER);

        device.bind_framebuffer(Some(fb));
        device.set_viewport(4, 4);
        device.clear_color_attachment(0, LinearRgba::TRANSPARENT);
        assert_eq!(device.read_pixel(color, 1, 1).unwrap(), [0, 0, 0, 0]);

        device.use_program(prog);
        device.set_uniform(
            prog,
            IDENTITY_COLOR_UNIFORM,
            &UniformValue::Vec3(kiln_core::math::Vec3::new(3.0 / 255.0, 0.0, 0.0)),
        );
        device.set_coverage(DrawableId(7), Coverage::new(Vec2::ZERO, Vec2::new(0.5, 1.0)));
        device.draw(DrawableId(7), &call(3));

        assert_eq!(device.read_pixel(color, 0, 0).unwrap(), [3, 0, 0, 255]);
        assert_eq!(
            device.read_pixel(color, 3, 0).unwrap(),
            [0, 0, 0, 0],
            "pixels outside the coverage stay cleared"
        );
    }

    #[test]
    fn test_resolve_copies_pixels() {
        let device = HeadlessDevice::new();
        let (ms_color, ms_fb) = target(&device, 2, 2);
        let (color, fb) = target(&device, 2, 2);
        device.bind_framebuffer(Some(ms_fb));
        device.clear_color_attachment(0, LinearRgba::WHITE);
        device.resolve_attachment(ms_fb, fb, 0, 2, 2);
        assert_eq!(device.read_pixel(color, 1, 1).unwrap(), [255; 4]);
        assert_eq!(device.read_pixel(ms_color, 1, 1).unwrap(), [255; 4]);
    }

    #[test]
    fn test_read_pixel_bounds() {
        let device = HeadlessDevice::new();
        let (color, _) = target(&device, 2, 2);
        assert!(matches!(
            device.read_pixel(color, 2, 0),
            Err(ResourceError::OutOfBounds)
        ));
        assert!(matches!(
            device.read_pixel(TextureId(999), 0, 0),
            Err(ResourceError::InvalidHandle)
        ));
    }

    #[test]
    fn test_incomplete_framebuffer_is_rejected() {
        let device = HeadlessDevice::new();
        let result = device.create_framebuffer(&FramebufferDescriptor {
            label: "broken".to_string(),
            color_attachments: vec![TextureId(42)],
            depth_stencil: None,
            multisampled: false,
        });
        assert!(matches!(
            result,
            Err(ResourceError::IncompleteFramebuffer { .. })
        ));
        assert_eq!(device.framebuffers_created(), 0);
    }
}
