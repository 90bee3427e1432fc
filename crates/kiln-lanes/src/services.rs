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

//! The collaborators every lane talks through.

use kiln_core::diagnostics::MessageSink;
use kiln_core::project::{ObjectQuery, ShaderSource};
use kiln_core::renderer::GraphicsDevice;
use std::sync::Arc;

/// Shared handles to the device, the object layer, the shader source layer
/// and the diagnostics sink.
///
/// Cloning is cheap. The engine holds one instance and lends it to the lanes.
#[derive(Debug, Clone)]
pub struct RenderServices {
    /// The immediate-mode GPU context.
    pub device: Arc<dyn GraphicsDevice>,
    /// Bind lists, resource kinds and render textures.
    pub objects: Arc<dyn ObjectQuery>,
    /// Shader text and transcompilation.
    pub sources: Arc<dyn ShaderSource>,
    /// Build results, grouped by item name.
    pub messages: Arc<dyn MessageSink>,
}

impl RenderServices {
    /// Bundles the collaborators.
    pub fn new(
        device: Arc<dyn GraphicsDevice>,
        objects: Arc<dyn ObjectQuery>,
        sources: Arc<dyn ShaderSource>,
        messages: Arc<dyn MessageSink>,
    ) -> Self {
        Self {
            device,
            objects,
            sources,
            messages,
        }
    }
}
