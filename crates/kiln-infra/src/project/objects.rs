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

//! An in-memory object registry backed by a graphics device.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use kiln_core::math::{LinearRgba, UVec2};
use kiln_core::pipeline::ItemKey;
use kiln_core::project::{ObjectQuery, RenderTextureInfo, RenderTextureSize, ResourceKind};
use kiln_core::renderer::{
    GraphicsDevice, ObjectId, ResourceError, TextureDescriptor, TextureFormat, TextureId,
};

#[derive(Debug, Default)]
struct ObjectsState {
    objects: HashMap<ObjectId, ResourceKind>,
    next_id: usize,
    bind_lists: HashMap<ItemKey, Vec<ObjectId>>,
    uniform_bind_lists: HashMap<ItemKey, Vec<ObjectId>>,
    render_textures: Vec<RenderTextureInfo>,
    window: UVec2,
}

/// Owns the project's objects and the passes' bind lists.
///
/// Render textures are allocated on the device as four textures: color,
/// multisample color, depth/stencil and multisample depth/stencil.
#[derive(Debug)]
pub struct ProjectObjects {
    device: Arc<dyn GraphicsDevice>,
    msaa_samples: u32,
    state: Mutex<ObjectsState>,
}

impl ProjectObjects {
    pub fn new(device: Arc<dyn GraphicsDevice>, msaa_samples: u32) -> Self {
        Self {
            device,
            msaa_samples,
            state: Mutex::new(ObjectsState {
                next_id: 1,
                window: UVec2::ONE,
                ..Default::default()
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, ObjectsState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers an object and returns its id.
    pub fn add_object(&self, kind: ResourceKind) -> ObjectId {
        let mut state = self.state();
        let id = ObjectId(state.next_id);
        state.next_id += 1;
        state.objects.insert(id, kind);
        id
    }

    /// Forgets an object and unbinds it from every pass.
    pub fn remove_object(&self, object: ObjectId) {
        let mut guard = self.state();
        let state = &mut *guard;
        state.objects.remove(&object);
        for list in state
            .bind_lists
            .values_mut()
            .chain(state.uniform_bind_lists.values_mut())
        {
            list.retain(|o| *o != object);
        }
    }

    /// Appends an object to a pass's texture bind list.
    pub fn bind(&self, pass: ItemKey, object: ObjectId) {
        self.state().bind_lists.entry(pass).or_default().push(object);
    }

    /// Appends an object to a pass's buffer/image bind list.
    pub fn bind_uniform(&self, pass: ItemKey, object: ObjectId) {
        self.state()
            .uniform_bind_lists
            .entry(pass)
            .or_default()
            .push(object);
    }

    /// Allocates a render texture and registers it as a bindable texture.
    /// ## Returns
    /// The new target's description; `color` identifies it in pass target lists.
    pub fn create_render_texture(
        &self,
        name: &str,
        size: RenderTextureSize,
    ) -> Result<RenderTextureInfo, ResourceError> {
        let window = self.state().window;
        let probe = RenderTextureInfo {
            name: name.to_string(),
            color: TextureId(0),
            color_ms: TextureId(0),
            depth_stencil: TextureId(0),
            depth_stencil_ms: TextureId(0),
            size,
            clear: true,
            clear_color: LinearRgba::BLACK,
        };
        let px = probe.calculate_size(window);
        let texture = |label: String, format: TextureFormat, samples: u32| {
            self.device.create_texture(
                &TextureDescriptor::new(label, px.x, px.y, format).with_samples(samples),
            )
        };

        let info = RenderTextureInfo {
            color: texture(name.to_string(), TextureFormat::Rgba8Unorm, 1)?,
            color_ms: texture(format!("{name} MS"), TextureFormat::Rgba8Unorm, self.msaa_samples)?,
            depth_stencil: texture(format!("{name} depth"), TextureFormat::Depth24Stencil8, 1)?,
            depth_stencil_ms: texture(
                format!("{name} depth MS"),
                TextureFormat::Depth24Stencil8,
                self.msaa_samples,
            )?,
            ..probe
        };
        self.add_object(ResourceKind::Texture(info.color));
        self.state().render_textures.push(info.clone());
        log::debug!("Created render texture '{name}' ({}x{})", px.x, px.y);
        Ok(info)
    }

    /// Changes whether and to what a render texture is cleared.
    pub fn set_clear(&self, color: TextureId, clear: bool, clear_color: LinearRgba) {
        let mut state = self.state();
        if let Some(rt) = state.render_textures.iter_mut().find(|rt| rt.color == color) {
            rt.clear = clear;
            rt.clear_color = clear_color;
        }
    }

    /// The object registered for a render texture's color texture.
    pub fn object_of(&self, color: TextureId) -> Option<ObjectId> {
        self.state()
            .objects
            .iter()
            .find(|(_, kind)| kind.texture() == Some(color))
            .map(|(id, _)| *id)
    }
}

impl ObjectQuery for ProjectObjects {
    fn bind_list(&self, pass: ItemKey) -> Vec<ObjectId> {
        self.state().bind_lists.get(&pass).cloned().unwrap_or_default()
    }

    fn uniform_bind_list(&self, pass: ItemKey) -> Vec<ObjectId> {
        self.state()
            .uniform_bind_lists
            .get(&pass)
            .cloned()
            .unwrap_or_default()
    }

    fn resource_kind(&self, object: ObjectId) -> Option<ResourceKind> {
        self.state().objects.get(&object).cloned()
    }

    fn render_texture(&self, color: TextureId) -> Option<RenderTextureInfo> {
        self.state()
            .render_textures
            .iter()
            .find(|rt| rt.color == color)
            .cloned()
    }

    fn render_textures(&self) -> Vec<RenderTextureInfo> {
        self.state().render_textures.clone()
    }

    fn resize_relative_render_textures(&self, width: u32, height: u32) {
        let window = UVec2::new(width, height);
        let targets = {
            let mut state = self.state();
            state.window = window;
            state.render_textures.clone()
        };
        for rt in targets {
            if !matches!(rt.size, RenderTextureSize::Relative(_)) {
                continue;
            }
            let px = rt.calculate_size(window);
            for texture in [rt.color, rt.color_ms, rt.depth_stencil, rt.depth_stencil_ms] {
                if let Err(e) = self.device.resize_texture(texture, px.x, px.y) {
                    log::error!("Failed to resize render texture '{}': {e}", rt.name);
                }
            }
        }
    }
}
