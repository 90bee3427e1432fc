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

//! Plugin capability interface.
//!
//! Plugins own their pipeline items and objects; the executor never looks
//! inside them and only calls through [`PluginCapability`].

use crate::math::{Mat4, Ray};
use crate::pipeline::ItemKey;
use std::fmt::Debug;

/// Opaque payload a plugin attaches to its items and objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PluginData(pub u64);

/// An object owned by a plugin that can appear in a pass's bind list.
#[derive(Debug, Clone)]
pub struct PluginObject {
    /// The owning plugin.
    pub owner: std::sync::Arc<dyn PluginCapability>,
    /// Plugin-defined object type name.
    pub object_type: String,
    /// Opaque payload.
    pub data: PluginData,
}

/// Operations a plugin exposes for the items and objects it owns.
pub trait PluginCapability: Send + Sync + Debug {
    /// Called once before the executor walks the pipeline.
    fn begin_render(&self) {}

    /// Called once after the executor walked the pipeline.
    fn end_render(&self) {}

    /// Binds one of the plugin's objects at the given resource slot.
    fn bind_object(&self, object_type: &str, data: PluginData, slot: u32);

    /// Executes an item placed inside a shader pass, with the pass's
    /// targets and program bound.
    /// ## Arguments
    /// * `pass` - Name of the enclosing shader pass.
    /// * `item_type` - Plugin-defined item type.
    /// * `data` - The item's payload.
    /// * `picked` - Whether the item is pickable and currently selected.
    fn execute_in_pass(&self, pass: &str, item_type: &str, data: PluginData, picked: bool);

    /// Executes a top-level item together with the items it owns.
    fn execute_standalone(&self, item_type: &str, data: PluginData, children: &[ItemKey]);

    /// Intersects an object-space ray with the item.
    /// ## Returns
    /// The ray parameter of the nearest hit, or `None`.
    fn intersect(&self, _item_type: &str, _data: PluginData, _ray: &Ray) -> Option<f32> {
        None
    }

    /// Recompiles whatever the plugin compiles for the named item.
    fn handle_recompile(&self, _item_name: &str) {}

    /// World transform of the named item, used to build its object-space ray.
    fn world_matrix(&self, _item_name: &str) -> Mat4 {
        Mat4::IDENTITY
    }

    /// Whether items of this type take part in ray picking.
    fn is_pickable(&self, _item_type: &str) -> bool {
        false
    }

    /// Whether items of this type receive an identity color in debug renders.
    fn assigns_debug_identity(&self, _item_type: &str) -> bool {
        false
    }
}
