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

//! The resource cache: compiled programs kept in step with the pipeline.
//!
//! The cache holds one slot per top-level pipeline item, in pipeline order,
//! keyed by [`ItemKey`]. Reconciling adds slots for new items, releases
//! slots of removed ones and moves slots to follow reordering. Nothing is
//! recompiled unless an item is new or a recompile is requested.

use super::FramebufferManager;
use crate::shader_lane::{inject_macros, release_module, release_program, StageCompiler};
use crate::RenderServices;
use kiln_core::diagnostics::{Message, Severity};
use kiln_core::pipeline::{AudioPass, ComputePass, ItemKey, ItemKind, Pipeline, PipelineItem, ShaderPass};
use kiln_core::renderer::api::debug::IDENTITY_PIXEL_SHADER;
use kiln_core::renderer::{ProgramId, ShaderLanguage, ShaderModuleDescriptor, ShaderModuleId, ShaderStage};
use kiln_core::RenderSettings;
use std::collections::HashSet;
use std::time::{Duration, Instant};

/// The compiled stages a shader pass keeps for source-level recompiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShaderModules {
    /// Vertex stage.
    pub vertex: Option<ShaderModuleId>,
    /// Pixel stage.
    pub pixel: Option<ShaderModuleId>,
    /// Geometry stage, when the pass uses one.
    pub geometry: Option<ShaderModuleId>,
}

/// One cache slot.
///
/// A slot without a program is legal: the item failed to compile, has no
/// shaders set, or needs no program at all (plugin items). The executor
/// skips such slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedItem {
    /// The pipeline item this slot belongs to.
    pub key: ItemKey,
    /// Program used for normal renders.
    pub program: Option<ProgramId>,
    /// The pass's vertex stage linked against the identity pixel shader.
    pub debug_program: Option<ProgramId>,
    /// Stages kept alive for [`ResourceCache::rebuild_from_source`].
    pub modules: ShaderModules,
}

impl CachedItem {
    fn empty(key: ItemKey) -> Self {
        Self {
            key,
            program: None,
            debug_program: None,
            modules: ShaderModules::default(),
        }
    }
}

/// What one reconcile call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Whether the pipeline was compared at all; rate limiting may skip it.
    pub checked: bool,
    /// Slots created.
    pub added: u32,
    /// Slots released.
    pub removed: u32,
    /// Slots moved to follow reordering.
    pub moved: u32,
    /// Items whose shaders were compiled.
    pub compilations: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuildReason {
    Added,
    Recompiled,
}

/// Compiled state for every top-level pipeline item.
#[derive(Debug, Default)]
pub struct ResourceCache {
    entries: Vec<CachedItem>,
    last_check: Option<Instant>,
    identity_shader: Option<ShaderModuleId>,
}

impl ResourceCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Slots in pipeline order.
    pub fn entries(&self) -> &[CachedItem] {
        &self.entries
    }

    /// The slot of an item.
    pub fn get(&self, key: ItemKey) -> Option<&CachedItem> {
        self.entries.iter().find(|e| e.key == key)
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no slot.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, key: ItemKey) -> Option<usize> {
        self.entries.iter().position(|e| e.key == key)
    }

    /// Brings the slots in line with the pipeline's top-level items.
    ///
    /// When the slot count already equals the item count, the comparison
    /// runs at most once per `cache_check_interval_ms`. A count mismatch is
    /// always handled immediately.
    pub fn reconcile(
        &mut self,
        pipeline: &Pipeline,
        settings: &RenderSettings,
        services: &RenderServices,
        framebuffers: &mut FramebufferManager,
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        let order = pipeline.items();

        if self.entries.len() == order.len() {
            let interval = Duration::from_millis(settings.cache_check_interval_ms);
            if self.last_check.is_some_and(|at| at.elapsed() < interval) {
                return report;
            }
        }
        self.last_check = Some(Instant::now());
        report.checked = true;

        // additions
        for (index, key) in order.iter().enumerate() {
            if self.position(*key).is_some() {
                continue;
            }
            let Some(item) = pipeline.get(*key) else {
                continue;
            };
            log::debug!("Caching pipeline item '{}'", item.name);
            let mut entry = CachedItem::empty(*key);
            if build(&mut entry, item, settings, services, &mut self.identity_shader, BuildReason::Added) {
                report.compilations += 1;
            }
            self.entries.insert(index.min(self.entries.len()), entry);
            report.added += 1;
        }

        // removals
        let live: HashSet<ItemKey> = order.iter().copied().collect();
        let (kept, dropped): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.entries).into_iter().partition(|e| live.contains(&e.key));
        self.entries = kept;
        for mut entry in dropped {
            log::debug!("Releasing cached item {:?}", entry.key);
            release_entry(services, &mut entry);
            framebuffers.release(entry.key, services);
            report.removed += 1;
        }

        // reordering
        for index in 0..order.len().min(self.entries.len()) {
            if self.entries[index].key == order[index] {
                continue;
            }
            let Some(from) = self.entries[index..].iter().position(|e| e.key == order[index]) else {
                continue;
            };
            let entry = self.entries.remove(index + from);
            self.entries.insert(index, entry);
            report.moved += 1;
        }
        if report.moved > 0 {
            log::debug!("Moved {} cached items to follow the pipeline order", report.moved);
        }

        report
    }

    /// Recompiles one item from its files.
    ///
    /// Plugin items forward the request to their owner.
    ///
    /// ## Returns
    /// `false` when the item has no slot.
    pub fn rebuild(
        &mut self,
        key: ItemKey,
        pipeline: &Pipeline,
        settings: &RenderSettings,
        services: &RenderServices,
    ) -> bool {
        let (Some(index), Some(item)) = (self.position(key), pipeline.get(key)) else {
            return false;
        };
        if let ItemKind::Plugin(plugin) = &item.kind {
            plugin.owner.handle_recompile(&item.name);
            return true;
        }
        let entry = &mut self.entries[index];
        build(entry, item, settings, services, &mut self.identity_shader, BuildReason::Recompiled);
        true
    }

    /// Recompiles one item from in-memory source text.
    ///
    /// Empty texts keep the stage compiled previously. Compute and audio
    /// items take their only source from `vertex`.
    ///
    /// ## Returns
    /// `false` when the item has no slot.
    pub fn rebuild_from_source(
        &mut self,
        key: ItemKey,
        pipeline: &Pipeline,
        settings: &RenderSettings,
        services: &RenderServices,
        sources: StageTexts<'_>,
    ) -> bool {
        let (Some(index), Some(item)) = (self.position(key), pipeline.get(key)) else {
            return false;
        };
        let entry = &mut self.entries[index];
        let compiler = StageCompiler::new(services, &settings.include_paths, &item.name);

        match &item.kind {
            ItemKind::ShaderPass(pass) => {
                compiler.clear_messages();
                replace_stage(&compiler, services, &mut entry.modules.vertex, ShaderStage::Vertex, sources.vertex);
                replace_stage(&compiler, services, &mut entry.modules.pixel, ShaderStage::Pixel, sources.pixel);
                if pass.gs_used && pass.geometry.is_set() {
                    replace_stage(
                        &compiler,
                        services,
                        &mut entry.modules.geometry,
                        ShaderStage::Geometry,
                        sources.geometry,
                    );
                }
                release_programs(services, entry);
                link_shader_pass(&compiler, services, entry, pass, &mut self.identity_shader, BuildReason::Recompiled);
            }
            ItemKind::ComputePass(_) if settings.compute_supported => {
                compiler.clear_messages();
                release_programs(services, entry);
                match compiler.compile_text(ShaderStage::Compute, sources.vertex, 0, true) {
                    Some(cs) => {
                        entry.program = compiler.link(&[cs]);
                        release_module(services, cs);
                        compiler.report(Severity::Message, "Compiled the compute shader.", None);
                    }
                    None => compiler.report(
                        Severity::Error,
                        "Failed to compile the compute shader",
                        Some(ShaderStage::Compute),
                    ),
                }
            }
            ItemKind::AudioPass(pass) => {
                compiler.clear_messages();
                if let Err(e) =
                    pass.stream
                        .compile_from_source(services.messages.as_ref(), &item.name, sources.vertex, &pass.macros, true)
                {
                    log::error!("Audio pass '{}' failed to compile: {e}", item.name);
                }
            }
            _ => {}
        }
        true
    }

    /// Releases every slot and every framebuffer. The next reconcile
    /// rebuilds everything from scratch.
    pub fn flush(&mut self, services: &RenderServices, framebuffers: &mut FramebufferManager) {
        log::debug!("Flushing {} cached items", self.entries.len());
        for mut entry in self.entries.drain(..) {
            release_entry(services, &mut entry);
        }
        framebuffers.release_all(services);
        if let Some(identity) = self.identity_shader.take() {
            release_module(services, identity);
        }
        self.last_check = None;
    }
}

/// In-memory stage texts for [`ResourceCache::rebuild_from_source`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StageTexts<'a> {
    /// Vertex stage, or the only stage of compute and audio items.
    pub vertex: &'a str,
    /// Pixel stage.
    pub pixel: &'a str,
    /// Geometry stage.
    pub geometry: &'a str,
}

/// Whether an item compiles `path` as one of its stages.
pub fn references_file(item: &PipelineItem, path: &str, compute_supported: bool) -> bool {
    match &item.kind {
        ItemKind::ShaderPass(pass) => {
            pass.vertex.path == path
                || pass.pixel.path == path
                || (pass.gs_used && pass.geometry.path == path)
        }
        ItemKind::ComputePass(pass) => compute_supported && pass.source.path == path,
        ItemKind::AudioPass(pass) => pass.path == path,
        _ => false,
    }
}

/// Compiles an item into `entry`, replacing whatever it held.
///
/// ## Returns
/// Whether any compilation was attempted.
fn build(
    entry: &mut CachedItem,
    item: &PipelineItem,
    settings: &RenderSettings,
    services: &RenderServices,
    identity: &mut Option<ShaderModuleId>,
    reason: BuildReason,
) -> bool {
    match &item.kind {
        ItemKind::ShaderPass(pass) => build_shader_pass(entry, &item.name, pass, settings, services, identity, reason),
        ItemKind::ComputePass(pass) => build_compute_pass(entry, &item.name, pass, settings, services, reason),
        ItemKind::AudioPass(pass) => build_audio_pass(&item.name, pass, services),
        _ => false,
    }
}

fn build_shader_pass(
    entry: &mut CachedItem,
    name: &str,
    pass: &ShaderPass,
    settings: &RenderSettings,
    services: &RenderServices,
    identity: &mut Option<ShaderModuleId>,
    reason: BuildReason,
) -> bool {
    release_entry(services, entry);
    if pass.vertex.path.is_empty() || pass.pixel.path.is_empty() {
        log::warn!("Shader pass '{name}' has no vertex or pixel shader set");
        return false;
    }

    let compiler = StageCompiler::new(services, &settings.include_paths, name);
    compiler.clear_messages();

    entry.modules.vertex = compiler.compile(ShaderStage::Vertex, &pass.vertex, &pass.macros, pass.gs_used);
    entry.modules.pixel = compiler.compile(ShaderStage::Pixel, &pass.pixel, &pass.macros, pass.gs_used);
    if pass.gs_used && pass.geometry.is_set() {
        if !services.sources.language_of(&pass.geometry.path).is_native() {
            let warning = match reason {
                BuildReason::Added => "Geometry shaders are currently not supported by glslang",
                BuildReason::Recompiled => "HLSL geometry shaders are currently not supported by glslang",
            };
            compiler.report(Severity::Warning, warning, Some(ShaderStage::Geometry));
        }
        entry.modules.geometry = compiler.compile(ShaderStage::Geometry, &pass.geometry, &pass.macros, true);
    }

    link_shader_pass(&compiler, services, entry, pass, identity, reason);
    true
}

fn link_shader_pass(
    compiler: &StageCompiler<'_>,
    services: &RenderServices,
    entry: &mut CachedItem,
    pass: &ShaderPass,
    identity: &mut Option<ShaderModuleId>,
    reason: BuildReason,
) {
    let wants_geometry = pass.gs_used && pass.geometry.is_set();
    let modules = entry.modules;
    let (Some(vs), Some(ps)) = (modules.vertex, modules.pixel) else {
        report_shader_failure(compiler, reason);
        return;
    };
    if wants_geometry && modules.geometry.is_none() {
        report_shader_failure(compiler, reason);
        return;
    }

    let mut stages = vec![vs, ps];
    if wants_geometry {
        stages.extend(modules.geometry);
    }
    entry.program = compiler.link(&stages);
    entry.debug_program = identity_module(identity, services).and_then(|id| compiler.link(&[vs, id]));

    if reason == BuildReason::Recompiled && entry.program.is_some() {
        compiler.report(Severity::Message, "Compiled the shaders.", None);
    }
}

fn report_shader_failure(compiler: &StageCompiler<'_>, reason: BuildReason) {
    let text = match reason {
        BuildReason::Added => "Failed to compile the shader",
        BuildReason::Recompiled => "Failed to compile the shader(s)",
    };
    compiler.report(Severity::Error, text, None);
}

fn build_compute_pass(
    entry: &mut CachedItem,
    name: &str,
    pass: &ComputePass,
    settings: &RenderSettings,
    services: &RenderServices,
    reason: BuildReason,
) -> bool {
    release_entry(services, entry);
    if !settings.compute_supported {
        log::warn!("Compute shaders are not supported, '{name}' stays without a program");
        return false;
    }

    let compiler = StageCompiler::new(services, &settings.include_paths, name);
    compiler.clear_messages();
    match compiler.compile(ShaderStage::Compute, &pass.source, &pass.macros, false) {
        Some(cs) => {
            entry.program = compiler.link(&[cs]);
            release_module(services, cs);
            if reason == BuildReason::Recompiled && entry.program.is_some() {
                compiler.report(Severity::Message, "Compiled the compute shader.", None);
            }
        }
        None => compiler.report(
            Severity::Error,
            "Failed to compile the compute shader",
            Some(ShaderStage::Compute),
        ),
    }
    true
}

fn build_audio_pass(name: &str, pass: &AudioPass, services: &RenderServices) -> bool {
    services.messages.clear_group(name);
    let language = services.sources.language_of(&pass.path);
    let text = match services.sources.load_project_file(&pass.path) {
        Ok(text) => text,
        Err(e) => {
            log::error!("Failed to load audio shader of '{name}': {e}");
            services.messages.add(Message::new(Severity::Error, name, e.to_string()));
            return true;
        }
    };
    let text = if language.is_native() {
        inject_macros(&text, &pass.macros).0
    } else {
        text
    };

    let is_hlsl = language == ShaderLanguage::Hlsl;
    if let Err(e) = pass
        .stream
        .compile_from_source(services.messages.as_ref(), name, &text, &pass.macros, is_hlsl)
    {
        log::error!("Audio pass '{name}' failed to compile: {e}");
    }
    true
}

fn replace_stage(
    compiler: &StageCompiler<'_>,
    services: &RenderServices,
    slot: &mut Option<ShaderModuleId>,
    stage: ShaderStage,
    text: &str,
) {
    if text.is_empty() {
        return;
    }
    if let Some(old) = slot.take() {
        release_module(services, old);
    }
    *slot = compiler.compile_text(stage, text, 0, true);
}

fn identity_module(slot: &mut Option<ShaderModuleId>, services: &RenderServices) -> Option<ShaderModuleId> {
    if slot.is_none() {
        let descriptor = ShaderModuleDescriptor {
            label: "Identity",
            stage: ShaderStage::Pixel,
            source: IDENTITY_PIXEL_SHADER,
        };
        match services.device.compile_shader(&descriptor) {
            Ok(id) => *slot = Some(id),
            Err(e) => log::error!("Failed to compile the identity pixel shader: {e}"),
        }
    }
    *slot
}

fn release_programs(services: &RenderServices, entry: &mut CachedItem) {
    for program in [entry.program.take(), entry.debug_program.take()].into_iter().flatten() {
        release_program(services, program);
    }
}

fn release_entry(services: &RenderServices, entry: &mut CachedItem) {
    release_programs(services, entry);
    let modules = std::mem::take(&mut entry.modules);
    for module in [modules.vertex, modules.pixel, modules.geometry].into_iter().flatten() {
        release_module(services, module);
    }
}
