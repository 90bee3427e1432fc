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

//! Framebuffer descriptors.

use super::TextureId;

/// Describes a framebuffer: ordered color attachments plus an optional
/// depth/stencil attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramebufferDescriptor {
    /// A debug label.
    pub label: String,
    /// Color attachments; attachment `i` is written by fragment output `i`.
    pub color_attachments: Vec<TextureId>,
    /// Depth/stencil attachment.
    pub depth_stencil: Option<TextureId>,
    /// Whether the attachments are multisample textures.
    pub multisampled: bool,
}
