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

//! Defines the RenderEngine, the stateful owner of everything a frame needs.

use super::{EngineError, PixelInformation};
use kiln_core::context::{Camera, FrameContext};
use kiln_core::math::{LinearRgba, Mat4, Ray, UVec2, Vec2, Vec3};
use kiln_core::pipeline::{ItemKey, ItemKind, Pipeline, RenderTarget};
use kiln_core::plugin::PluginCapability;
use kiln_core::renderer::{GraphicsDevice, ResourceError, TextureId};
use kiln_core::RenderSettings;
use kiln_lanes::pick_lane::{IndexPick, PickCallback, PickState, Selection};
use kiln_lanes::render_lane::{
    identity_order, item_at_pixel, pixel_at, references_file, FrameExecutor, FrameRequest, FrameStats,
    FramebufferManager, ResourceCache, StageTexts, WindowTargets,
};
use kiln_lanes::RenderServices;
use std::sync::Arc;
use std::time::Instant;

/// Executes a pipeline one frame at a time.
///
/// The pipeline itself is owned by the caller and handed to every call that
/// reads it. The engine keeps what is derived from it: compiled programs,
/// framebuffers, window targets, the selection and the frame clock.
pub struct RenderEngine {
    services: RenderServices,
    settings: RenderSettings,
    plugins: Vec<Arc<dyn PluginCapability>>,
    camera: Camera,

    cache: ResourceCache,
    framebuffers: FramebufferManager,
    picking: PickState,
    window: Option<WindowTargets>,
    // Size of the last render, zero before the first one.
    last_size: UVec2,

    frame_index: u64,
    time: f32,
    last_tick: Option<Instant>,
    paused: bool,

    pixels: Vec<PixelInformation>,
    last_stats: FrameStats,
}

impl std::fmt::Debug for RenderEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderEngine")
            .field("cached_items", &self.cache.len())
            .field("last_size", &self.last_size)
            .field("frame_index", &self.frame_index)
            .field("paused", &self.paused)
            .finish_non_exhaustive()
    }
}

impl RenderEngine {
    /// Creates an engine. Nothing is allocated until the first render.
    pub fn new(services: RenderServices, settings: RenderSettings) -> Self {
        log::info!(
            "Creating render engine (MSAA {}x, compute {})",
            settings.msaa_samples,
            if settings.compute_supported { "on" } else { "off" }
        );
        Self {
            services,
            settings,
            plugins: Vec::new(),
            camera: Camera::look_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, 45f32.to_radians(), 1.0),
            cache: ResourceCache::new(),
            framebuffers: FramebufferManager::new(),
            picking: PickState::new(),
            window: None,
            last_size: UVec2::ZERO,
            frame_index: 0,
            time: 0.0,
            last_tick: None,
            paused: false,
            pixels: Vec::new(),
            last_stats: FrameStats::default(),
        }
    }

    // --- Configuration ---

    /// The active settings.
    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Replaces the settings. A new sample count reallocates the window
    /// targets and rebuilds every framebuffer on the next render.
    pub fn set_settings(&mut self, settings: RenderSettings) {
        if settings.msaa_samples != self.settings.msaa_samples
            || settings.use_alpha_channel != self.settings.use_alpha_channel
        {
            log::info!("Window target format changed, reallocating on next render");
            self.release_window();
            self.framebuffers.mark_dirty();
        }
        self.settings = settings;
    }

    /// Sets the camera used for rendering and ray picking.
    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    /// Registers a plugin to be told when renders begin and end.
    pub fn register_plugin(&mut self, plugin: Arc<dyn PluginCapability>) {
        self.plugins.push(plugin);
    }

    /// Freezes or resumes the clock and the frame counter. Paused frames
    /// skip compute passes. Pixel debugging results are dropped.
    pub fn pause(&mut self, paused: bool) {
        self.paused = paused;
        self.pixels.clear();
        log::debug!("Render engine {}", if paused { "paused" } else { "resumed" });
    }

    /// Whether time is paused.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    // --- Rendering ---

    /// Renders one frame at the given size.
    ///
    /// The cache is reconciled against `pipeline` first; shader problems are
    /// reported to the message sink and never fail the call.
    ///
    /// ## Errors
    /// Only when the window targets cannot be (re)allocated.
    pub fn render(
        &mut self,
        pipeline: &Pipeline,
        width: u32,
        height: u32,
        debug: bool,
    ) -> Result<FrameStats, EngineError> {
        let size = UVec2::new(width, height).max(UVec2::ONE);
        let resized = prepare_window(&mut self.window, self.services.device.as_ref(), size, &self.settings)?;
        if resized {
            self.services.objects.resize_relative_render_textures(size.x, size.y);
            self.framebuffers.mark_dirty();
        }
        self.last_size = size;

        let reconcile = self
            .cache
            .reconcile(pipeline, &self.settings, &self.services, &mut self.framebuffers);
        self.picking
            .selection_mut()
            .retain(|key| pipeline.get(*key).is_some());
        self.tick();

        let window = self.window.as_ref().ok_or(EngineError::NotRendered)?;
        let request = FrameRequest {
            pipeline,
            settings: &self.settings,
            plugins: &self.plugins,
            window,
            context: FrameContext {
                frame_index: self.frame_index,
                time: self.time,
                viewport: size.as_vec2(),
                camera: self.camera,
                geometry_transform: Mat4::IDENTITY,
                picked: false,
            },
            debug,
            paused: self.paused,
        };
        let mut stats = FrameExecutor::new(&self.services).execute(
            &request,
            &self.cache,
            &mut self.framebuffers,
            &mut self.picking,
        );
        stats.reconcile = reconcile;

        if !debug && !self.paused {
            self.frame_index += 1;
        }
        log::trace!("Rendered frame {} at {}x{}: {:?}", self.frame_index, size.x, size.y, stats);
        self.last_stats = stats;
        Ok(stats)
    }

    /// Renders again at the size of the last render.
    fn rerender(&mut self, pipeline: &Pipeline) -> Result<FrameStats, EngineError> {
        if self.last_size == UVec2::ZERO {
            return Ok(FrameStats::default());
        }
        self.render(pipeline, self.last_size.x, self.last_size.y, false)
    }

    fn tick(&mut self) {
        let now = Instant::now();
        if let (false, Some(last)) = (self.paused, self.last_tick) {
            self.time += now.duration_since(last).as_secs_f32();
        }
        self.last_tick = Some(now);
    }

    /// Counters of the most recent render.
    pub fn last_stats(&self) -> FrameStats {
        self.last_stats
    }

    /// The window color texture, once something was rendered.
    pub fn output(&self) -> Option<TextureId> {
        self.window.as_ref().map(|w| w.color)
    }

    /// Keys of the cached top-level items, in execution order.
    pub fn cached_items(&self) -> Vec<ItemKey> {
        self.cache.entries().iter().map(|entry| entry.key).collect()
    }

    /// Frames rendered outside of pauses and debug renders.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    // --- Recompilation ---

    /// Recompiles every cached item called `name` from its files, then
    /// renders again.
    ///
    /// Plugin items forward the request to their owner.
    pub fn recompile(&mut self, pipeline: &Pipeline, name: &str) -> Result<(), EngineError> {
        let keys = self.cached_keys(pipeline, name)?;
        log::info!("Recompiling '{name}'");
        self.recompile_keys(pipeline, &keys)
    }

    fn recompile_keys(&mut self, pipeline: &Pipeline, keys: &[ItemKey]) -> Result<(), EngineError> {
        for &key in keys {
            self.cache.rebuild(key, pipeline, &self.settings, &self.services);
        }
        self.rerender(pipeline).map(|_| ())
    }

    /// Recompiles an item from in-memory stage texts, then renders again.
    ///
    /// An empty text keeps the stage compiled previously. Compute and
    /// audio passes take their source from `vertex`.
    pub fn recompile_from_source(
        &mut self,
        pipeline: &Pipeline,
        name: &str,
        vertex: &str,
        pixel: &str,
        geometry: &str,
    ) -> Result<(), EngineError> {
        let keys = self.cached_keys(pipeline, name)?;
        log::info!("Recompiling '{name}' from memory");
        let texts = StageTexts { vertex, pixel, geometry };
        for key in keys {
            self.cache
                .rebuild_from_source(key, pipeline, &self.settings, &self.services, texts);
        }
        self.rerender(pipeline).map(|_| ())
    }

    /// Recompiles every cached item that compiles `path`.
    ///
    /// ## Returns
    /// The names of the recompiled items, in execution order.
    pub fn recompile_file(&mut self, pipeline: &Pipeline, path: &str) -> Result<Vec<String>, EngineError> {
        let (keys, names): (Vec<ItemKey>, Vec<String>) = self
            .cache
            .entries()
            .iter()
            .filter_map(|entry| pipeline.get(entry.key).map(|item| (entry.key, item)))
            .filter(|(_, item)| references_file(item, path, self.settings.compute_supported))
            .map(|(key, item)| (key, item.name.clone()))
            .unzip();
        if !keys.is_empty() {
            log::info!("Recompiling {} item(s) using '{path}'", keys.len());
            self.recompile_keys(pipeline, &keys)?;
        }
        Ok(names)
    }

    /// Releases every cached program and framebuffer and the window
    /// targets. The next render rebuilds everything.
    pub fn flush_cache(&mut self) {
        log::info!("Flushing render cache");
        self.cache.flush(&self.services, &mut self.framebuffers);
        self.framebuffers.mark_dirty();
        self.release_window();
    }

    fn release_window(&mut self) {
        if let Some(window) = self.window.take() {
            window.release(self.services.device.as_ref());
        }
    }

    /// Every cached item called `name`, in execution order.
    fn cached_keys(&self, pipeline: &Pipeline, name: &str) -> Result<Vec<ItemKey>, EngineError> {
        if pipeline.find_by_name(name).is_none() {
            return Err(EngineError::UnknownItem(name.to_string()));
        }
        let keys: Vec<ItemKey> = self
            .cache
            .entries()
            .iter()
            .map(|entry| entry.key)
            .filter(|key| pipeline.get(*key).is_some_and(|item| item.name == name))
            .collect();
        if keys.is_empty() {
            return Err(EngineError::NotCached(name.to_string()));
        }
        Ok(keys)
    }

    // --- Picking ---

    /// Queues a ray pick through a screen point, resolved by the next render.
    ///
    /// `screen` is in pixels of the last render with the origin at the
    /// bottom left. The callback receives the most recently selected item,
    /// or `None` when nothing was hit.
    pub fn pick(&mut self, screen: Vec2, multi: bool, callback: Option<PickCallback>) {
        let size = self.last_size.max(UVec2::ONE).as_vec2();
        let ray = Ray::from_screen(
            (screen.x, screen.y),
            (size.x, size.y),
            self.camera.view,
            self.camera.projection,
            self.camera.position,
        );
        self.picking.request(ray, multi, callback);
    }

    /// Selects an item directly. `None` clears the selection; `add` keeps
    /// the current selection and appends the item.
    pub fn pick_item(&mut self, item: Option<ItemKey>, add: bool) {
        self.picking.selection_mut().select(item, add);
    }

    /// The selected items, most recent last.
    pub fn selection(&self) -> &Selection {
        self.picking.selection()
    }

    /// Looks up the `(pass, item)` pair that identity `id` was assigned to
    /// in the last debug render.
    pub fn item_by_debug_id(&self, pipeline: &Pipeline, id: u32) -> Option<(ItemKey, ItemKey)> {
        let order = identity_order(pipeline, &self.cache, &self.framebuffers);
        id.checked_sub(kiln_lanes::pick_lane::FIRST_IDENTITY)
            .and_then(|index| order.get(index as usize).copied())
    }

    /// Finds what each render target shows at a point.
    ///
    /// The normal-mode colors are read first, then a debug render tells
    /// which pass and item drew each pixel, then a normal render restores
    /// the targets. Targets written by geometry-stage passes are skipped.
    ///
    /// ## Arguments
    /// * `relative` - The point in `[0, 1]` coordinates of each target.
    pub fn debug_pixel_pick(&mut self, pipeline: &Pipeline, relative: Vec2) -> Result<&[PixelInformation], EngineError> {
        self.pixels.clear();
        let window = self.window.as_ref().ok_or(EngineError::NotRendered)?;
        let window_size = self.last_size;

        let mut targets = vec![(RenderTarget::Window, "Window".to_string(), window.color, window_size)];
        for rt in self.services.objects.render_textures() {
            let size = rt.calculate_size(window_size);
            targets.push((RenderTarget::Texture(rt.color), rt.name, rt.color, size));
        }

        let device = self.services.device.as_ref();
        let colors = targets
            .iter()
            .map(|(_, _, texture, size)| read_color(device, *texture, pixel_at(*size, relative)))
            .collect::<Result<Vec<_>, _>>()?;

        self.render(pipeline, window_size.x, window_size.y, true)?;
        let order = identity_order(pipeline, &self.cache, &self.framebuffers);
        let device = self.services.device.as_ref();

        let mut found = Vec::new();
        for ((target, name, texture, size), color) in targets.into_iter().zip(colors) {
            if written_by_geometry_stage(pipeline, target) {
                continue;
            }
            let coordinate = pixel_at(size, relative);
            let pixel = device.read_pixel(texture, coordinate.x, coordinate.y)?;
            let Some((owner, object)) = item_at_pixel(&order, pixel) else {
                continue;
            };
            let attachment = match pipeline.get(owner).map(|item| &item.kind) {
                Some(ItemKind::ShaderPass(pass)) => pass
                    .active_targets()
                    .iter()
                    .position(|t| *t == target)
                    .unwrap_or(0),
                _ => 0,
            };
            found.push(PixelInformation {
                render_texture: name,
                attachment,
                owner,
                object,
                color,
                coordinate,
                relative,
            });
        }

        self.rerender(pipeline)?;
        self.pixels = found;
        Ok(&self.pixels)
    }

    /// Results of the last [`debug_pixel_pick`](Self::debug_pixel_pick).
    pub fn pixels(&self) -> &[PixelInformation] {
        &self.pixels
    }

    /// Returns the index of the vertex covering a point of `item`, drawn
    /// alone by `pass`. Uncovered points read as 0.
    pub fn debug_vertex_pick(
        &mut self,
        pipeline: &Pipeline,
        pass: ItemKey,
        item: ItemKey,
        relative: Vec2,
    ) -> Result<u32, EngineError> {
        self.index_pick(pipeline, pass, item, IndexPick::Vertex, relative)
    }

    /// Returns the index of the instance covering a point of `item`, drawn
    /// alone by `pass`. Uncovered points read as 0.
    pub fn debug_instance_pick(
        &mut self,
        pipeline: &Pipeline,
        pass: ItemKey,
        item: ItemKey,
        relative: Vec2,
    ) -> Result<u32, EngineError> {
        self.index_pick(pipeline, pass, item, IndexPick::Instance, relative)
    }

    fn index_pick(
        &mut self,
        pipeline: &Pipeline,
        pass: ItemKey,
        item: ItemKey,
        pick: IndexPick,
        relative: Vec2,
    ) -> Result<u32, EngineError> {
        let window = self.window.as_ref().ok_or(EngineError::NotRendered)?;
        let request = FrameRequest {
            pipeline,
            settings: &self.settings,
            plugins: &self.plugins,
            window,
            context: FrameContext {
                frame_index: self.frame_index,
                time: self.time,
                viewport: self.last_size.as_vec2(),
                camera: self.camera,
                geometry_transform: Mat4::IDENTITY,
                picked: false,
            },
            debug: false,
            paused: self.paused,
        };
        let index = FrameExecutor::new(&self.services).index_pick(
            &request,
            &mut self.framebuffers,
            pass,
            item,
            pick,
            relative,
        );
        self.rerender(pipeline)?;
        Ok(index?)
    }
}

impl Drop for RenderEngine {
    fn drop(&mut self) {
        self.cache.flush(&self.services, &mut self.framebuffers);
        self.release_window();
    }
}

/// Makes sure the window targets exist at `size` with the configured
/// sample count.
///
/// ## Returns
/// Whether the targets were created or resized.
fn prepare_window(
    slot: &mut Option<WindowTargets>,
    device: &dyn GraphicsDevice,
    size: UVec2,
    settings: &RenderSettings,
) -> Result<bool, ResourceError> {
    match slot.as_mut() {
        Some(window) if window.size() == size => Ok(false),
        Some(window) => {
            window.resize(device, size)?;
            log::debug!("Resized window targets to {}x{}", size.x, size.y);
            Ok(true)
        }
        None => {
            *slot = Some(WindowTargets::create(
                device,
                size,
                settings.msaa_samples,
                settings.use_alpha_channel,
            )?);
            Ok(true)
        }
    }
}

fn read_color(device: &dyn GraphicsDevice, texture: TextureId, at: UVec2) -> Result<LinearRgba, ResourceError> {
    device.read_pixel(texture, at.x, at.y).map(LinearRgba::from_rgba8)
}

fn written_by_geometry_stage(pipeline: &Pipeline, target: RenderTarget) -> bool {
    pipeline.items().iter().any(|key| {
        matches!(
            pipeline.get(*key).map(|item| &item.kind),
            Some(ItemKind::ShaderPass(pass)) if pass.gs_used && pass.writes_to(target)
        )
    })
}
