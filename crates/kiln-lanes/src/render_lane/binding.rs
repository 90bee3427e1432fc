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

//! Binding a pass's objects to texture units and buffer slots.
//!
//! Slot numbers are list positions: the `j`-th object of a bind list goes
//! to unit `j`.

use crate::RenderServices;
use kiln_core::pipeline::ItemKey;
use kiln_core::project::ResourceKind;
use kiln_core::renderer::TextureBinding;

/// How a pass uses the objects of its uniform bind list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    /// Shader passes: every buffer becomes a uniform buffer.
    Uniform,
    /// Compute passes: images are bound read/write, buffers as storage.
    Storage,
    /// Audio passes: only buffers, bound as storage.
    StorageBuffersOnly,
}

/// Binds the texture bind list of `pass`.
pub fn bind_textures(services: &RenderServices, pass: ItemKey) {
    let device = &services.device;
    for (unit, object) in services.objects.bind_list(pass).into_iter().enumerate() {
        let unit = unit as u32;
        match services.objects.resource_kind(object) {
            Some(ResourceKind::CubeMap(tex)) => device.bind_texture(unit, tex, TextureBinding::Cube),
            Some(ResourceKind::Image3D(tex)) => device.bind_texture(unit, tex, TextureBinding::D3),
            Some(ResourceKind::Texture(tex) | ResourceKind::Image(tex)) => {
                device.bind_texture(unit, tex, TextureBinding::D2)
            }
            Some(ResourceKind::Plugin(obj)) => obj.owner.bind_object(&obj.object_type, obj.data, unit),
            Some(ResourceKind::Buffer(_)) => log::trace!("Buffer {object:?} in a texture bind list"),
            None => log::warn!("Unknown object {object:?} in the bind list"),
        }
    }
}

/// Binds the uniform bind list of `pass`.
pub fn bind_buffers(services: &RenderServices, pass: ItemKey, usage: BufferUsage) {
    let device = &services.device;
    for (slot, object) in services.objects.uniform_bind_list(pass).into_iter().enumerate() {
        let slot = slot as u32;
        match (usage, services.objects.resource_kind(object)) {
            (BufferUsage::Uniform, Some(ResourceKind::Buffer(buf))) => device.bind_uniform_buffer(slot, buf),
            (BufferUsage::Storage | BufferUsage::StorageBuffersOnly, Some(ResourceKind::Buffer(buf))) => {
                device.bind_storage_buffer(slot, buf)
            }
            (BufferUsage::Storage, Some(ResourceKind::Image(tex))) => device.bind_image(slot, tex, false),
            (BufferUsage::Storage, Some(ResourceKind::Image3D(tex))) => device.bind_image(slot, tex, true),
            (BufferUsage::Storage, Some(ResourceKind::Plugin(obj))) => {
                obj.owner.bind_object(&obj.object_type, obj.data, slot)
            }
            (_, None) => log::warn!("Unknown object {object:?} in the uniform bind list"),
            _ => {}
        }
    }
}
