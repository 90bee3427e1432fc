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

//! Texture descriptors.

/// Pixel formats the executor allocates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// 8-bit RGBA color.
    Rgba8Unorm,
    /// 8-bit RGB color, used for the window target when alpha is disabled.
    Rgb8Unorm,
    /// 24-bit depth with 8-bit stencil.
    Depth24Stencil8,
}

impl TextureFormat {
    /// Returns `true` for depth/stencil formats.
    pub fn is_depth_stencil(&self) -> bool {
        matches!(self, TextureFormat::Depth24Stencil8)
    }
}

/// How a texture is bound to a sampler unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureBinding {
    /// A regular 2D texture.
    D2,
    /// A 3D texture.
    D3,
    /// A cube map.
    Cube,
}

/// Describes a texture to allocate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureDescriptor {
    /// A debug label.
    pub label: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel format.
    pub format: TextureFormat,
    /// Number of samples per pixel. `1` means not multisampled.
    pub sample_count: u32,
}

impl TextureDescriptor {
    /// Describes a single-sample 2D target.
    pub fn new(label: impl Into<String>, width: u32, height: u32, format: TextureFormat) -> Self {
        Self {
            label: label.into(),
            width,
            height,
            format,
            sample_count: 1,
        }
    }

    /// Returns the same descriptor with a different sample count.
    pub fn with_samples(mut self, sample_count: u32) -> Self {
        self.sample_count = sample_count.max(1);
        self
    }
}
