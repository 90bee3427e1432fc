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

//! The pipeline item model.
//!
//! A [`Pipeline`] is the authoritative, externally edited list of work the
//! executor renders. Items live in a generational arena: an [`ItemKey`] is
//! the stable identity of an item's payload for its whole lifetime, which is
//! what the resource cache keys on. Names are display labels only and may
//! collide.

mod items;
mod variables;

pub use self::items::*;
pub use self::variables::*;

use crate::renderer::RenderStateDescriptor;
use slotmap::SlotMap;
use std::fmt;

slotmap::new_key_type! {
    /// Stable identity of a pipeline item's payload.
    pub struct ItemKey;
}

/// A named unit of pipeline work.
#[derive(Debug, Clone)]
pub struct PipelineItem {
    /// Display name; also the key used by recompilation requests.
    pub name: String,
    /// The variant payload.
    pub kind: ItemKind,
}

impl PipelineItem {
    /// Creates a new item.
    pub fn new(name: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// The closed set of pipeline item variants.
#[derive(Debug, Clone)]
pub enum ItemKind {
    /// Draws its children into a set of render targets.
    ShaderPass(ShaderPass),
    /// Dispatches a compute shader.
    ComputePass(ComputePass),
    /// Renders an audio stream from a shader.
    AudioPass(AudioPass),
    /// Fixed-function state applied when reached inside a pass.
    RenderState(RenderStateDescriptor),
    /// A primitive shape draw.
    Geometry(Geometry),
    /// A mesh draw.
    Model(Model),
    /// An item owned and executed by a plugin.
    Plugin(PluginItem),
}

impl ItemKind {
    /// Short type name for logs and errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            ItemKind::ShaderPass(_) => "shader pass",
            ItemKind::ComputePass(_) => "compute pass",
            ItemKind::AudioPass(_) => "audio pass",
            ItemKind::RenderState(_) => "render state",
            ItemKind::Geometry(_) => "geometry",
            ItemKind::Model(_) => "model",
            ItemKind::Plugin(_) => "plugin item",
        }
    }

    /// Whether this kind may be placed inside a shader pass.
    pub fn is_pass_child(&self) -> bool {
        matches!(
            self,
            ItemKind::Geometry(_) | ItemKind::Model(_) | ItemKind::RenderState(_) | ItemKind::Plugin(_)
        )
    }
}

/// An error raised when editing a [`Pipeline`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// The key does not refer to a live item.
    UnknownItem,
    /// Children can only be added to shader passes.
    NotAShaderPass {
        /// Name of the would-be parent.
        parent: String,
    },
    /// The item kind cannot be drawn inside a shader pass.
    InvalidChild {
        /// Name of the rejected item.
        name: String,
        /// Its kind.
        kind: &'static str,
    },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::UnknownItem => write!(f, "Pipeline item does not exist"),
            PipelineError::NotAShaderPass { parent } => {
                write!(f, "'{parent}' is not a shader pass and cannot own items")
            }
            PipelineError::InvalidChild { name, kind } => {
                write!(f, "'{name}' ({kind}) cannot be placed inside a shader pass")
            }
        }
    }
}

impl std::error::Error for PipelineError {}

/// The authoritative, ordered list of pipeline items.
#[derive(Debug, Default)]
pub struct Pipeline {
    items: SlotMap<ItemKey, PipelineItem>,
    order: Vec<ItemKey>,
}

impl Pipeline {
    /// Creates an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a top-level item.
    pub fn add(&mut self, item: PipelineItem) -> ItemKey {
        let key = self.items.insert(item);
        self.order.push(key);
        key
    }

    /// Inserts a top-level item at `index` (clamped to the list length).
    pub fn insert(&mut self, index: usize, item: PipelineItem) -> ItemKey {
        let key = self.items.insert(item);
        self.order.insert(index.min(self.order.len()), key);
        key
    }

    /// Appends `item` to the children of `parent`.
    ///
    /// Shader passes take drawable children only; plugin items own any kind.
    /// ## Errors
    /// * `PipelineError::UnknownItem` - If `parent` is not a live item.
    /// * `PipelineError::NotAShaderPass` - If `parent` cannot own children.
    /// * `PipelineError::InvalidChild` - If `item` cannot be drawn inside a pass.
    pub fn add_child(&mut self, parent: ItemKey, item: PipelineItem) -> Result<ItemKey, PipelineError> {
        let owner = self.items.get(parent).ok_or(PipelineError::UnknownItem)?;
        match &owner.kind {
            ItemKind::ShaderPass(_) if !item.kind.is_pass_child() => {
                return Err(PipelineError::InvalidChild {
                    name: item.name,
                    kind: item.kind.type_name(),
                });
            }
            ItemKind::ShaderPass(_) | ItemKind::Plugin(_) => {}
            _ => {
                return Err(PipelineError::NotAShaderPass {
                    parent: owner.name.clone(),
                });
            }
        }

        let key = self.items.insert(item);
        match self.items.get_mut(parent).map(|i| &mut i.kind) {
            Some(ItemKind::ShaderPass(data)) => data.children.push(key),
            Some(ItemKind::Plugin(data)) => data.children.push(key),
            _ => {}
        }
        Ok(key)
    }

    /// Removes an item (top-level or child) together with everything it owns:
    /// the children of shader passes and plugin items, recursively.
    pub fn remove(&mut self, key: ItemKey) -> Option<PipelineItem> {
        let item = self.items.remove(key)?;

        self.order.retain(|k| *k != key);
        for other in self.items.values_mut() {
            match &mut other.kind {
                ItemKind::ShaderPass(pass) => pass.children.retain(|k| *k != key),
                ItemKind::Plugin(plugin) => plugin.children.retain(|k| *k != key),
                _ => {}
            }
        }

        let owned = match &item.kind {
            ItemKind::ShaderPass(pass) => pass.children.clone(),
            ItemKind::Plugin(plugin) => plugin.children.clone(),
            _ => Vec::new(),
        };
        for child in owned {
            self.remove(child);
        }
        Some(item)
    }

    /// Moves a top-level item to `index` (clamped). Returns `false` if `key` is not top-level.
    pub fn move_to(&mut self, key: ItemKey, index: usize) -> bool {
        let Some(from) = self.order.iter().position(|k| *k == key) else {
            return false;
        };
        self.order.remove(from);
        self.order.insert(index.min(self.order.len()), key);
        true
    }

    /// Returns the item behind `key`.
    pub fn get(&self, key: ItemKey) -> Option<&PipelineItem> {
        self.items.get(key)
    }

    /// Returns the item behind `key`, mutably.
    pub fn get_mut(&mut self, key: ItemKey) -> Option<&mut PipelineItem> {
        self.items.get_mut(key)
    }

    /// Finds the first item with the given name, searching top-level items
    /// before children.
    pub fn find_by_name(&self, name: &str) -> Option<ItemKey> {
        self.order
            .iter()
            .copied()
            .find(|k| self.items[*k].name == name)
            .or_else(|| {
                self.items
                    .iter()
                    .find(|(_, item)| item.name == name)
                    .map(|(k, _)| k)
            })
    }

    /// The ordered list of top-level items.
    pub fn items(&self) -> &[ItemKey] {
        &self.order
    }

    /// The children of a shader pass or plugin item, or an empty slice for anything else.
    pub fn children(&self, pass: ItemKey) -> &[ItemKey] {
        match self.items.get(pass).map(|i| &i.kind) {
            Some(ItemKind::ShaderPass(data)) => &data.children,
            Some(ItemKind::Plugin(data)) => &data.children,
            _ => &[],
        }
    }

    /// Number of top-level items.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the pipeline has no top-level items.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::{PluginCapability, PluginData};
    use crate::renderer::DrawableId;

    fn pass(name: &str) -> PipelineItem {
        PipelineItem::new(
            name,
            ItemKind::ShaderPass(ShaderPass::new(
                ShaderStageSource::new("simple.vert", "main"),
                ShaderStageSource::new("simple.frag", "main"),
            )),
        )
    }

    fn cube(name: &str) -> PipelineItem {
        PipelineItem::new(
            name,
            ItemKind::Geometry(Geometry::new(GeometryShape::Cube, DrawableId(1))),
        )
    }

    #[test]
    fn test_add_child_only_to_shader_passes() {
        let mut pipeline = Pipeline::new();
        let p = pipeline.add(pass("Simple"));
        let c = pipeline.add_child(p, cube("Box")).unwrap();
        assert_eq!(pipeline.children(p), &[c]);

        let err = pipeline.add_child(c, cube("Nested")).unwrap_err();
        assert_eq!(
            err,
            PipelineError::NotAShaderPass {
                parent: "Box".to_string()
            }
        );

        let err = pipeline.add_child(p, pass("Inner")).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidChild { .. }));
    }

    #[test]
    fn test_remove_pass_drops_children() {
        let mut pipeline = Pipeline::new();
        let p = pipeline.add(pass("Simple"));
        let c = pipeline.add_child(p, cube("Box")).unwrap();

        assert!(pipeline.remove(p).is_some());
        assert!(pipeline.get(c).is_none());
        assert!(pipeline.is_empty());
    }

    #[derive(Debug)]
    struct Inert;

    impl PluginCapability for Inert {
        fn bind_object(&self, _object_type: &str, _data: PluginData, _slot: u32) {}
        fn execute_in_pass(&self, _pass: &str, _item_type: &str, _data: PluginData, _picked: bool) {}
        fn execute_standalone(&self, _item_type: &str, _data: PluginData, _children: &[ItemKey]) {}
    }

    #[test]
    fn test_remove_plugin_item_drops_what_it_owns() {
        let mut pipeline = Pipeline::new();
        let owner = pipeline.add(PipelineItem::new(
            "Group",
            ItemKind::Plugin(PluginItem::new(std::sync::Arc::new(Inert), "group", PluginData(1))),
        ));
        let inner = pipeline.add_child(owner, pass("Inner")).unwrap();
        let leaf = pipeline.add_child(inner, cube("Box")).unwrap();
        assert_eq!(pipeline.children(owner), &[inner]);

        assert!(pipeline.remove(owner).is_some());
        assert!(pipeline.get(inner).is_none());
        assert!(pipeline.get(leaf).is_none(), "grandchildren go too");
        assert!(pipeline.is_empty());
    }

    #[test]
    fn test_remove_child_detaches_it() {
        let mut pipeline = Pipeline::new();
        let p = pipeline.add(pass("Simple"));
        let c = pipeline.add_child(p, cube("Box")).unwrap();

        pipeline.remove(c);
        assert!(pipeline.children(p).is_empty());
        assert_eq!(pipeline.len(), 1);
    }

    #[test]
    fn test_keys_survive_reordering_and_names_may_collide() {
        let mut pipeline = Pipeline::new();
        let a = pipeline.add(pass("Same"));
        let b = pipeline.add(pass("Same"));
        assert_ne!(a, b);

        assert!(pipeline.move_to(b, 0));
        assert_eq!(pipeline.items(), &[b, a]);
        assert_eq!(pipeline.find_by_name("Same"), Some(b));
    }
}
