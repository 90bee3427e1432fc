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

//! Per-pass framebuffers.
//!
//! Each shader pass renders through two framebuffers over the same target
//! list: a single-sample one and a multisample one. They are rebuilt only
//! when the pass's target list changes or when a rebuild is forced.

use crate::RenderServices;
use kiln_core::math::UVec2;
use kiln_core::pipeline::{ItemKey, RenderTarget, ShaderPass};
use kiln_core::renderer::{FramebufferDescriptor, FramebufferId, ResourceError, TextureId};
use std::collections::HashMap;

use super::WindowTargets;

/// The framebuffers of one shader pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassFramebuffers {
    /// The target list they were built for.
    pub targets: Vec<RenderTarget>,
    /// Single-sample framebuffer; also the resolve destination.
    pub single: FramebufferId,
    /// Multisample framebuffer.
    pub multi: FramebufferId,
    /// Single-sample color textures, one per target.
    pub colors: Vec<TextureId>,
    /// Single-sample depth texture, taken from the last target.
    pub depth: TextureId,
}

#[derive(Debug)]
struct Slot {
    targets: Vec<RenderTarget>,
    built: Option<PassFramebuffers>,
    dirty: bool,
}

/// Owns the framebuffers of every cached shader pass.
#[derive(Debug, Default)]
pub struct FramebufferManager {
    passes: HashMap<ItemKey, Slot>,
    rebuilds: u64,
}

impl FramebufferManager {
    /// Creates an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes sure a pass's framebuffers match its current target list.
    ///
    /// ## Returns
    /// The framebuffers, or `None` when the pass has no targets or building
    /// them failed. A failed build is logged and retried on the next call.
    pub fn update(
        &mut self,
        key: ItemKey,
        label: &str,
        pass: &ShaderPass,
        window: &WindowTargets,
        services: &RenderServices,
    ) -> Option<&PassFramebuffers> {
        let targets = pass.active_targets();
        if targets.is_empty() {
            return None;
        }

        let stale = match self.passes.get(&key) {
            Some(slot) => slot.dirty || slot.targets != targets || slot.built.is_none(),
            None => true,
        };
        if stale {
            if let Some(old) = self.passes.remove(&key).and_then(|s| s.built) {
                destroy(services, &old);
            }
            let built = match build(label, &targets, window, services) {
                Ok(fbs) => {
                    self.rebuilds += 1;
                    log::debug!("Rebuilt framebuffers of '{label}' ({} targets)", targets.len());
                    Some(fbs)
                }
                Err(e) => {
                    log::error!("Failed to build framebuffers of '{label}': {e}");
                    None
                }
            };
            self.passes.insert(key, Slot { targets, built, dirty: false });
        }

        self.passes.get(&key).and_then(|s| s.built.as_ref())
    }

    /// The framebuffers last built for a pass.
    pub fn get(&self, key: ItemKey) -> Option<&PassFramebuffers> {
        self.passes.get(&key).and_then(|s| s.built.as_ref())
    }

    /// Forces every known pass to rebuild on its next update.
    ///
    /// The flag is per pass: a pass skipped for a few frames still rebuilds
    /// when it next runs, since its attachments may have been destroyed.
    pub fn mark_dirty(&mut self) {
        for slot in self.passes.values_mut() {
            slot.dirty = true;
        }
    }

    /// Total number of successful pass rebuilds.
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    /// Destroys the framebuffers of one pass.
    pub fn release(&mut self, key: ItemKey, services: &RenderServices) {
        if let Some(built) = self.passes.remove(&key).and_then(|s| s.built) {
            destroy(services, &built);
        }
    }

    /// Destroys every framebuffer.
    pub fn release_all(&mut self, services: &RenderServices) {
        for (_, slot) in self.passes.drain() {
            if let Some(built) = slot.built {
                destroy(services, &built);
            }
        }
    }
}

/// Size of the area a pass renders to: the window size, or the size of the
/// last render texture in its target list.
pub fn target_size(targets: &[RenderTarget], window: UVec2, services: &RenderServices) -> UVec2 {
    targets
        .iter()
        .rev()
        .find_map(|t| match t {
            RenderTarget::Window => None,
            RenderTarget::Texture(id) => services.objects.render_texture(*id),
        })
        .map_or(window, |info| info.calculate_size(window))
}

fn build(
    label: &str,
    targets: &[RenderTarget],
    window: &WindowTargets,
    services: &RenderServices,
) -> Result<PassFramebuffers, ResourceError> {
    let mut colors = Vec::with_capacity(targets.len());
    let mut colors_ms = Vec::with_capacity(targets.len());
    let mut depth = (window.depth, window.depth_ms);

    for target in targets {
        match target {
            RenderTarget::Window => {
                colors.push(window.color);
                colors_ms.push(window.color_ms);
                depth = (window.depth, window.depth_ms);
            }
            RenderTarget::Texture(id) => {
                let info = services
                    .objects
                    .render_texture(*id)
                    .ok_or(ResourceError::UnknownRenderTarget(*id))?;
                colors.push(info.color);
                colors_ms.push(info.color_ms);
                depth = (info.depth_stencil, info.depth_stencil_ms);
            }
        }
    }

    let device = &services.device;
    let single = device.create_framebuffer(&FramebufferDescriptor {
        label: label.to_string(),
        color_attachments: colors.clone(),
        depth_stencil: Some(depth.0),
        multisampled: false,
    })?;
    let multi = device.create_framebuffer(&FramebufferDescriptor {
        label: format!("{label} MS"),
        color_attachments: colors_ms,
        depth_stencil: Some(depth.1),
        multisampled: true,
    });
    let multi = match multi {
        Ok(fb) => fb,
        Err(e) => {
            let _ = device.destroy_framebuffer(single);
            return Err(e);
        }
    };

    Ok(PassFramebuffers {
        targets: targets.to_vec(),
        single,
        multi,
        colors,
        depth: depth.0,
    })
}

fn destroy(services: &RenderServices, fbs: &PassFramebuffers) {
    for fb in [fbs.single, fbs.multi] {
        if let Err(e) = services.device.destroy_framebuffer(fb) {
            log::warn!("Failed to destroy framebuffer {fb:?}: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Harness;
    use kiln_core::pipeline::{ItemKind, Pipeline, PipelineItem, ShaderStageSource};
    use kiln_core::project::RenderTextureSize;

    fn setup() -> (Harness, WindowTargets, Pipeline, ItemKey) {
        let h = Harness::new(&[]);
        let window = WindowTargets::create(&h.device, UVec2::new(64, 32), 4, true).unwrap();
        let mut pipeline = Pipeline::new();
        let pass = ShaderPass::new(ShaderStageSource::new("a.vert", "main"), ShaderStageSource::new("a.frag", "main"));
        let key = pipeline.add(PipelineItem::new("Pass", ItemKind::ShaderPass(pass)));
        (h, window, pipeline, key)
    }

    fn pass_of(pipeline: &Pipeline, key: ItemKey) -> &ShaderPass {
        match &pipeline.get(key).unwrap().kind {
            ItemKind::ShaderPass(p) => p,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_rebuild_only_on_target_change() {
        let (h, window, mut pipeline, key) = setup();
        let mut fbs = FramebufferManager::new();

        fbs.update(key, "Pass", pass_of(&pipeline, key), &window, &h.services).expect("window target builds");
        fbs.update(key, "Pass", pass_of(&pipeline, key), &window, &h.services);
        assert_eq!(fbs.rebuilds(), 1, "unchanged targets reuse the framebuffers");
        assert_eq!(h.device.framebuffers_created(), 2, "one single-sample, one multisample");

        let rt = h.objects.create_render_texture("RT", RenderTextureSize::Relative(glam::Vec2::ONE)).unwrap();
        if let ItemKind::ShaderPass(p) = &mut pipeline.get_mut(key).unwrap().kind {
            p.set_render_targets(&[RenderTarget::Window, RenderTarget::Texture(rt.color)]);
        }
        let built = fbs
            .update(key, "Pass", pass_of(&pipeline, key), &window, &h.services)
            .expect("render texture target builds")
            .clone();
        assert_eq!(fbs.rebuilds(), 2);
        assert_eq!(built.colors, vec![window.color, rt.color]);
        assert_eq!(built.depth, rt.depth_stencil, "depth comes from the last target");
        assert_eq!(h.device.live_framebuffers(), 2, "old framebuffers were destroyed");
    }

    #[test]
    fn test_forced_rebuild_happens_once() {
        let (h, window, pipeline, key) = setup();
        let mut fbs = FramebufferManager::new();
        fbs.update(key, "Pass", pass_of(&pipeline, key), &window, &h.services);

        fbs.mark_dirty();
        fbs.update(key, "Pass", pass_of(&pipeline, key), &window, &h.services);
        fbs.update(key, "Pass", pass_of(&pipeline, key), &window, &h.services);
        assert_eq!(fbs.rebuilds(), 2);
    }

    #[test]
    fn test_forced_rebuild_waits_for_skipped_pass() {
        let (h, window, pipeline, key) = setup();
        let mut fbs = FramebufferManager::new();
        fbs.update(key, "Pass", pass_of(&pipeline, key), &window, &h.services);

        // Window reallocated while the pass was not updated.
        fbs.mark_dirty();
        let moved = WindowTargets::create(&h.device, UVec2::new(64, 32), 1, false).unwrap();

        let built = fbs
            .update(key, "Pass", pass_of(&pipeline, key), &moved, &h.services)
            .expect("rebuilt against the new window")
            .clone();
        assert_eq!(fbs.rebuilds(), 2);
        assert_ne!(moved.color, window.color);
        assert_eq!(built.colors, vec![moved.color]);
    }

    #[test]
    fn test_unknown_render_texture_fails_softly() {
        let (h, window, mut pipeline, key) = setup();
        if let ItemKind::ShaderPass(p) = &mut pipeline.get_mut(key).unwrap().kind {
            p.set_render_targets(&[RenderTarget::Texture(TextureId(999))]);
        }
        let mut fbs = FramebufferManager::new();
        assert!(fbs.update(key, "Pass", pass_of(&pipeline, key), &window, &h.services).is_none());
        assert_eq!(h.device.live_framebuffers(), 0);
    }
}
