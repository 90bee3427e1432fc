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

//! Results of pixel debugging.

use kiln_core::math::{LinearRgba, UVec2, Vec2};
use kiln_core::pipeline::ItemKey;

/// What was drawn at one pixel of one render target.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelInformation {
    /// `"Window"` or the render texture's name.
    pub render_texture: String,
    /// Index of the target in the owning pass's target list.
    pub attachment: usize,
    /// The shader pass that drew the pixel.
    pub owner: ItemKey,
    /// The child item that drew the pixel.
    pub object: ItemKey,
    /// The pixel's color in the normal render.
    pub color: LinearRgba,
    /// Pixel coordinate in the target.
    pub coordinate: UVec2,
    /// The queried point, in `[0, 1]` coordinates.
    pub relative: Vec2,
}
