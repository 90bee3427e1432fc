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

//! The engine-owned window targets.

use kiln_core::math::UVec2;
use kiln_core::renderer::{GraphicsDevice, ResourceError, TextureDescriptor, TextureFormat, TextureId};

/// The four textures standing in for the window: color and depth, each in a
/// single-sample and a multisample variant.
///
/// Passes that target [`RenderTarget::Window`](kiln_core::pipeline::RenderTarget::Window)
/// render into these. Resizing keeps the texture IDs, so framebuffers built
/// on top of them stay valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowTargets {
    /// Single-sample color.
    pub color: TextureId,
    /// Single-sample depth/stencil.
    pub depth: TextureId,
    /// Multisample color.
    pub color_ms: TextureId,
    /// Multisample depth/stencil.
    pub depth_ms: TextureId,
    size: UVec2,
    samples: u32,
}

impl WindowTargets {
    /// Allocates the window textures.
    ///
    /// ## Arguments
    /// * `use_alpha` - Whether the color textures carry an alpha channel.
    pub fn create(
        device: &dyn GraphicsDevice,
        size: UVec2,
        samples: u32,
        use_alpha: bool,
    ) -> Result<Self, ResourceError> {
        let size = size.max(UVec2::ONE);
        let samples = samples.max(1);
        let color_format = if use_alpha {
            TextureFormat::Rgba8Unorm
        } else {
            TextureFormat::Rgb8Unorm
        };
        let texture = |label: &str, format: TextureFormat, samples: u32| {
            device.create_texture(&TextureDescriptor::new(label, size.x, size.y, format).with_samples(samples))
        };

        let targets = Self {
            color: texture("Window", color_format, 1)?,
            depth: texture("Window depth", TextureFormat::Depth24Stencil8, 1)?,
            color_ms: texture("Window MS", color_format, samples)?,
            depth_ms: texture("Window depth MS", TextureFormat::Depth24Stencil8, samples)?,
            size,
            samples,
        };
        log::debug!("Created window targets ({}x{}, {samples}x MSAA)", size.x, size.y);
        Ok(targets)
    }

    /// Reallocates every window texture at a new size.
    pub fn resize(&mut self, device: &dyn GraphicsDevice, size: UVec2) -> Result<(), ResourceError> {
        let size = size.max(UVec2::ONE);
        for id in [self.color, self.depth, self.color_ms, self.depth_ms] {
            device.resize_texture(id, size.x, size.y)?;
        }
        self.size = size;
        Ok(())
    }

    /// Destroys the window textures.
    pub fn release(&self, device: &dyn GraphicsDevice) {
        for id in [self.color, self.depth, self.color_ms, self.depth_ms] {
            if let Err(e) = device.destroy_texture(id) {
                log::warn!("Failed to destroy window texture {id:?}: {e}");
            }
        }
    }

    /// Current size in pixels.
    pub fn size(&self) -> UVec2 {
        self.size
    }

    /// Sample count of the multisample variants.
    pub fn samples(&self) -> u32 {
        self.samples
    }
}
