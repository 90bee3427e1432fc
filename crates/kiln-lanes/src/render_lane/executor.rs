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

//! The frame executor: one walk over the cached pipeline per render call.
//!
//! Shader passes bind their framebuffer, clear what needs clearing, bind
//! their objects and draw their children. Compute passes dispatch, audio
//! passes hand over to their stream and plugin items to their owner. In a
//! debug render every pickable draw writes its identity color instead of
//! running the user's pixel shader.

use super::binding::{bind_buffers, bind_textures, BufferUsage};
use super::{CachedItem, FramebufferManager, PassFramebuffers, ReconcileReport, ResourceCache, WindowTargets};
use crate::pick_lane::{decode_identity, identity_color, patch_vertex_source, IndexPick, PickError, PickState};
use crate::shader_lane::{release_module, release_program, StageCompiler};
use crate::RenderServices;
use kiln_core::context::FrameContext;
use kiln_core::math::{LinearRgba, UVec2, Vec2};
use kiln_core::pipeline::{
    resolve_variables, ItemKey, ItemKind, ItemVariableValue, Model, Pipeline, PipelineItem, RenderTarget, ShaderPass,
    ShaderVariable,
};
use kiln_core::plugin::PluginCapability;
use kiln_core::renderer::api::debug::IDENTITY_COLOR_UNIFORM;
use kiln_core::renderer::{
    DrawCall, MemoryBarrier, PrimitiveTopology, ProgramId, RenderStateDescriptor, ResourceError,
    ShaderModuleDescriptor, ShaderStage, TextureId, UniformValue,
};
use kiln_core::RenderSettings;
use std::sync::Arc;

/// Counters of one render call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Shader passes that issued work.
    pub shader_passes: u32,
    /// Compute dispatches.
    pub compute_dispatches: u32,
    /// Audio passes run.
    pub audio_passes: u32,
    /// Draw calls issued.
    pub draw_calls: u32,
    /// Multisample attachments resolved.
    pub resolves: u32,
    /// Identity colors handed out (debug renders only).
    pub identities: u32,
    /// Pass framebuffer rebuilds.
    pub framebuffer_rebuilds: u32,
    /// What the cache did before the walk.
    pub reconcile: ReconcileReport,
}

/// Everything the executor reads during one render call.
#[derive(Debug, Clone)]
pub struct FrameRequest<'a> {
    /// The authoritative pipeline.
    pub pipeline: &'a Pipeline,
    /// Engine settings.
    pub settings: &'a RenderSettings,
    /// Every registered plugin, told when a render begins and ends.
    pub plugins: &'a [Arc<dyn PluginCapability>],
    /// The window textures, already at this frame's size.
    pub window: &'a WindowTargets,
    /// Frame index, clock and camera. The viewport is set per pass.
    pub context: FrameContext,
    /// Whether this is an identity-encoding debug render.
    pub debug: bool,
    /// Whether time is paused; compute passes do not run while paused.
    pub paused: bool,
}

/// Clear bookkeeping that spans the passes of one frame.
#[derive(Debug, Default)]
struct FrameScratch {
    previous_targets: Vec<RenderTarget>,
    previous_depth: Option<TextureId>,
    cleared_window: bool,
    next_identity: u32,
}

/// Walks the cache and issues every command of a frame.
#[derive(Debug)]
pub struct FrameExecutor<'a> {
    services: &'a RenderServices,
}

impl<'a> FrameExecutor<'a> {
    /// Creates an executor over the given collaborators.
    pub fn new(services: &'a RenderServices) -> Self {
        Self { services }
    }

    /// Renders one frame.
    ///
    /// A pending pick is resolved at the end of the walk, whatever the mode.
    pub fn execute(
        &self,
        request: &FrameRequest<'_>,
        cache: &ResourceCache,
        framebuffers: &mut FramebufferManager,
        picking: &mut PickState,
    ) -> FrameStats {
        let device = &self.services.device;
        let msaa = request.settings.is_msaa(request.debug);
        let rebuilds_before = framebuffers.rebuilds();
        let mut stats = FrameStats::default();
        let mut scratch = FrameScratch {
            next_identity: crate::pick_lane::FIRST_IDENTITY,
            ..Default::default()
        };

        if msaa {
            device.set_multisample(true);
        }
        for plugin in request.plugins {
            plugin.begin_render();
        }

        for entry in cache.entries() {
            let Some(item) = request.pipeline.get(entry.key) else {
                continue;
            };
            match &item.kind {
                ItemKind::ShaderPass(pass) => {
                    self.shader_pass(request, entry, item, pass, framebuffers, picking, &mut scratch, &mut stats)
                }
                ItemKind::ComputePass(pass)
                    if !request.debug && !request.paused && request.settings.compute_supported =>
                {
                    let Some(program) = entry.program else {
                        continue;
                    };
                    device.use_program(program);
                    bind_textures(self.services, entry.key);
                    bind_buffers(self.services, entry.key, BufferUsage::Storage);
                    let ctx = self.pass_context(request, request.window.size());
                    self.upload_variables(program, &pass.variables, &[], None, &ctx);
                    let [x, y, z] = pass.work_groups;
                    device.dispatch_compute(x, y, z);
                    device.memory_barrier(MemoryBarrier::COMPUTE_WRITES);
                    stats.compute_dispatches += 1;
                }
                ItemKind::AudioPass(pass) if !request.debug => {
                    bind_textures(self.services, entry.key);
                    bind_buffers(self.services, entry.key, BufferUsage::StorageBuffersOnly);
                    if let Some(program) = pass.stream.program() {
                        let ctx = self.pass_context(request, request.window.size());
                        self.upload_variables(program, &pass.variables, &[], None, &ctx);
                    }
                    pass.stream.render_audio();
                    stats.audio_passes += 1;
                }
                ItemKind::Plugin(plugin) if !request.debug => {
                    plugin.owner.execute_standalone(&plugin.item_type, plugin.data, &plugin.children);
                }
                _ => {}
            }
        }

        for plugin in request.plugins {
            plugin.end_render();
        }
        picking.finish();
        device.bind_framebuffer(None);
        if msaa {
            device.set_multisample(false);
        }

        stats.framebuffer_rebuilds = (framebuffers.rebuilds() - rebuilds_before) as u32;
        stats
    }

    #[allow(clippy::too_many_arguments)]
    fn shader_pass(
        &self,
        request: &FrameRequest<'_>,
        entry: &CachedItem,
        item: &PipelineItem,
        pass: &ShaderPass,
        framebuffers: &mut FramebufferManager,
        picking: &mut PickState,
        scratch: &mut FrameScratch,
        stats: &mut FrameStats,
    ) {
        let targets = pass.active_targets();
        if !pass.active || pass.children.is_empty() || targets.is_empty() || (request.debug && pass.gs_used) {
            return;
        }
        let Some(fbs) = framebuffers
            .update(entry.key, &item.name, pass, request.window, self.services)
            .cloned()
        else {
            return;
        };
        let program = if request.debug { entry.debug_program } else { entry.program };
        let Some(program) = program else {
            return;
        };

        let device = &self.services.device;
        let msaa = request.settings.is_msaa(request.debug);
        device.bind_framebuffer(Some(if msaa { fbs.multi } else { fbs.single }));
        device.set_draw_buffers(targets.len() as u32);

        // The window depth is cleared together with the window color only.
        if scratch.previous_depth != Some(fbs.depth) {
            if fbs.depth != request.window.depth || !scratch.cleared_window {
                device.clear_depth_stencil(1.0, 0);
            }
            scratch.previous_depth = Some(fbs.depth);
        }

        let rt_size = self.clear_targets(request, &targets, scratch);
        scratch.previous_targets = targets.clone();

        device.set_viewport(rt_size.x, rt_size.y);
        let mut ctx = self.pass_context(request, rt_size);
        device.use_program(program);
        bind_textures(self.services, entry.key);
        bind_buffers(self.services, entry.key, BufferUsage::Uniform);
        device.apply_default_state();

        for child_key in &pass.children {
            let Some(child) = request.pipeline.get(*child_key) else {
                continue;
            };
            ctx.picked = false;

            match &child.kind {
                ItemKind::Geometry(geo) => {
                    picking.test(*child_key, child);
                    if request.debug {
                        assign_identity(self.services, program, scratch, stats);
                    }
                    ctx.geometry_transform = geo.render_transform((rt_size.x as f32, rt_size.y as f32));
                    ctx.picked = picking.selection().contains(*child_key);
                    self.upload_variables(program, &pass.variables, &pass.item_values, Some(*child_key), &ctx);
                    device.draw(geo.drawable, &geo.draw_call());
                    stats.draw_calls += 1;
                }
                ItemKind::Model(model) => {
                    picking.test(*child_key, child);
                    if request.debug {
                        assign_identity(self.services, program, scratch, stats);
                    }
                    ctx.geometry_transform = model.render_transform();
                    ctx.picked = picking.selection().contains(*child_key);
                    self.upload_variables(program, &pass.variables, &pass.item_values, Some(*child_key), &ctx);
                    stats.draw_calls += draw_model(self.services, model);
                }
                ItemKind::RenderState(state) => device.apply_render_state(state),
                ItemKind::Plugin(plugin) => {
                    picking.test(*child_key, child);
                    if request.debug && plugin.owner.assigns_debug_identity(&plugin.item_type) {
                        assign_identity(self.services, program, scratch, stats);
                    }
                    let picked = plugin.owner.is_pickable(&plugin.item_type)
                        && picking.selection().contains(*child_key);
                    plugin.owner.execute_in_pass(&item.name, &plugin.item_type, plugin.data, picked);
                }
                _ => {}
            }
        }

        if msaa {
            for index in 0..targets.len() as u32 {
                device.resolve_attachment(fbs.multi, fbs.single, index, rt_size.x, rt_size.y);
                stats.resolves += 1;
            }
        }
        stats.shader_passes += 1;
    }

    /// Clears the pass's targets and returns the size of the area it renders to.
    ///
    /// A render texture is cleared unless the previous pass also wrote it;
    /// the window is cleared once per frame.
    fn clear_targets(&self, request: &FrameRequest<'_>, targets: &[RenderTarget], scratch: &mut FrameScratch) -> UVec2 {
        let device = &self.services.device;
        let window = request.window.size();
        let mut rt_size = window;

        for (index, target) in targets.iter().enumerate() {
            let index = index as u32;
            match target {
                RenderTarget::Window => {
                    if !scratch.cleared_window {
                        let color = if request.debug {
                            LinearRgba::TRANSPARENT
                        } else {
                            request.settings.clear_color
                        };
                        device.clear_color_attachment(index, color);
                        scratch.cleared_window = true;
                    }
                }
                RenderTarget::Texture(id) => {
                    let Some(info) = self.services.objects.render_texture(*id) else {
                        continue;
                    };
                    rt_size = info.calculate_size(window);
                    if info.clear && !scratch.previous_targets.contains(target) {
                        let color = if request.debug {
                            LinearRgba::TRANSPARENT
                        } else {
                            info.clear_color
                        };
                        device.clear_color_attachment(index, color);
                    }
                }
            }
        }
        rt_size
    }

    fn pass_context(&self, request: &FrameRequest<'_>, size: UVec2) -> FrameContext {
        FrameContext {
            viewport: size.as_vec2(),
            ..request.context.clone()
        }
    }

    fn upload_variables(
        &self,
        program: ProgramId,
        variables: &[ShaderVariable],
        overrides: &[ItemVariableValue],
        item: Option<ItemKey>,
        ctx: &FrameContext,
    ) {
        for (name, value) in resolve_variables(variables, overrides, item, ctx) {
            self.services.device.set_uniform(program, name, &value);
        }
    }

    /// Renders a single item with a patched vertex stage and reads back the
    /// vertex or instance index that covers a point.
    ///
    /// The pass's single-sample framebuffer is used and every target is
    /// cleared to zero, so uncovered pixels read as index 0. Render states
    /// only contribute their culling setup.
    ///
    /// ## Arguments
    /// * `relative` - The query point in `[0, 1]` coordinates of the pass's render area.
    pub fn index_pick(
        &self,
        request: &FrameRequest<'_>,
        framebuffers: &mut FramebufferManager,
        pass_key: ItemKey,
        item_key: ItemKey,
        pick: IndexPick,
        relative: Vec2,
    ) -> Result<u32, PickError> {
        let pass_item = request.pipeline.get(pass_key).ok_or(PickError::UnknownItem(pass_key))?;
        let ItemKind::ShaderPass(pass) = &pass_item.kind else {
            return Err(PickError::NotAShaderPass(pass_item.name.clone()));
        };

        let compiler = StageCompiler::new(self.services, &request.settings.include_paths, &pass_item.name);
        let loaded = compiler.load(ShaderStage::Vertex, &pass.vertex, &pass.macros, pass.gs_used)?;
        let patched = patch_vertex_source(&loaded.source, pick);

        let device = &self.services.device;
        let vs = device.compile_shader(&ShaderModuleDescriptor {
            label: &pass_item.name,
            stage: ShaderStage::Vertex,
            source: &patched,
        })?;
        let ps = match device.compile_shader(&ShaderModuleDescriptor {
            label: "Index pick",
            stage: ShaderStage::Pixel,
            source: pick.pixel_shader(),
        }) {
            Ok(ps) => ps,
            Err(e) => {
                release_module(self.services, vs);
                return Err(e.into());
            }
        };
        let result = device
            .link_program(&pass_item.name, &[vs, ps])
            .map_err(PickError::from)
            .and_then(|program| {
                let read = framebuffers
                    .update(pass_key, &pass_item.name, pass, request.window, self.services)
                    .cloned()
                    .ok_or_else(|| PickError::NoFramebuffer(pass_item.name.clone()))
                    .and_then(|fbs| self.draw_index_pass(request, pass_key, pass, item_key, &fbs, program, relative));
                release_program(self.services, program);
                read
            });

        release_module(self.services, vs);
        release_module(self.services, ps);
        result
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_index_pass(
        &self,
        request: &FrameRequest<'_>,
        pass_key: ItemKey,
        pass: &ShaderPass,
        item_key: ItemKey,
        fbs: &PassFramebuffers,
        program: ProgramId,
        relative: Vec2,
    ) -> Result<u32, PickError> {
        let device = &self.services.device;
        device.bind_framebuffer(Some(fbs.single));
        device.set_draw_buffers(fbs.colors.len() as u32);
        device.clear_depth_stencil(1.0, 0);
        for index in 0..fbs.colors.len() as u32 {
            device.clear_color_attachment(index, LinearRgba::TRANSPARENT);
        }

        let rt_size = super::target_size(&fbs.targets, request.window.size(), self.services);
        let point = pixel_at(rt_size, relative);

        device.set_viewport(rt_size.x, rt_size.y);
        device.use_program(program);
        bind_textures(self.services, pass_key);
        bind_buffers(self.services, pass_key, BufferUsage::Uniform);
        device.apply_default_state();

        let mut ctx = self.pass_context(request, rt_size);
        for child_key in &pass.children {
            let Some(child) = request.pipeline.get(*child_key) else {
                continue;
            };
            match &child.kind {
                ItemKind::Geometry(geo) if *child_key == item_key => {
                    ctx.geometry_transform = geo.render_transform((rt_size.x as f32, rt_size.y as f32));
                    self.upload_variables(program, &pass.variables, &pass.item_values, Some(*child_key), &ctx);
                    device.draw(geo.drawable, &geo.draw_call());
                }
                ItemKind::Model(model) if *child_key == item_key => {
                    ctx.geometry_transform = model.render_transform();
                    self.upload_variables(program, &pass.variables, &pass.item_values, Some(*child_key), &ctx);
                    draw_model(self.services, model);
                }
                ItemKind::RenderState(state) => device.apply_render_state(&RenderStateDescriptor {
                    cull_mode: state.cull_mode,
                    front_face: state.front_face,
                    ..Default::default()
                }),
                _ => {}
            }
        }

        let color = fbs
            .colors
            .first()
            .copied()
            .ok_or(ResourceError::NotFound)?;
        let pixel = device.read_pixel(color, point.x, point.y)?;
        Ok(decode_identity(pixel))
    }
}

/// Converts a `[0, 1]` point into a pixel of an area, clamped to its bounds.
pub fn pixel_at(size: UVec2, relative: Vec2) -> UVec2 {
    let p = (size.as_vec2() * relative).max(Vec2::ZERO).as_uvec2();
    p.min(size.saturating_sub(UVec2::ONE))
}

fn assign_identity(services: &RenderServices, program: ProgramId, scratch: &mut FrameScratch, stats: &mut FrameStats) {
    let color = identity_color(scratch.next_identity);
    services
        .device
        .set_uniform(program, IDENTITY_COLOR_UNIFORM, &UniformValue::Vec3(color));
    scratch.next_identity += 1;
    stats.identities += 1;
}

fn draw_model(services: &RenderServices, model: &Model) -> u32 {
    let mut draws = 0;
    for mesh in &model.mesh.sub_meshes {
        services.device.draw(
            mesh.drawable,
            &DrawCall {
                topology: PrimitiveTopology::TriangleList,
                first_vertex: 0,
                vertex_count: mesh.positions.len() as u32,
                instance_count: model.instances.unwrap_or(1),
            },
        );
        draws += 1;
    }
    draws
}

/// Whether a child receives an identity color in debug renders.
pub fn receives_identity(item: &PipelineItem) -> bool {
    match &item.kind {
        ItemKind::Geometry(_) | ItemKind::Model(_) => true,
        ItemKind::Plugin(plugin) => plugin.owner.assigns_debug_identity(&plugin.item_type),
        _ => false,
    }
}

/// Whether a debug render draws the children of a cached shader pass.
///
/// Mirrors the skip rules of the executor, using the framebuffers the last
/// render left behind.
pub fn renders_in_debug(entry: &CachedItem, pass: &ShaderPass, framebuffers: &FramebufferManager) -> bool {
    pass.active
        && !pass.children.is_empty()
        && !pass.active_targets().is_empty()
        && !pass.gs_used
        && framebuffers.get(entry.key).is_some()
        && entry.debug_program.is_some()
}

/// The `(pass, item)` pairs of a debug render, in identity order.
/// The pair at index `i` was drawn with identity `i + 1`.
pub fn identity_order(
    pipeline: &Pipeline,
    cache: &ResourceCache,
    framebuffers: &FramebufferManager,
) -> Vec<(ItemKey, ItemKey)> {
    let mut order = Vec::new();
    for entry in cache.entries() {
        let Some(ItemKind::ShaderPass(pass)) = pipeline.get(entry.key).map(|i| &i.kind) else {
            continue;
        };
        if !renders_in_debug(entry, pass, framebuffers) {
            continue;
        }
        for child in &pass.children {
            if pipeline.get(*child).is_some_and(receives_identity) {
                order.push((entry.key, *child));
            }
        }
    }
    order
}

/// Decodes a read-back pixel into the `(pass, item)` pair it was drawn by.
pub fn item_at_pixel(order: &[(ItemKey, ItemKey)], pixel: [u8; 4]) -> Option<(ItemKey, ItemKey)> {
    let id = decode_identity(pixel);
    id.checked_sub(crate::pick_lane::FIRST_IDENTITY)
        .and_then(|index| order.get(index as usize).copied())
}
