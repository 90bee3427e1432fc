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

//! Per-render-call state threaded through the executor.
//!
//! Everything a shader variable may read from the engine (frame counter,
//! clock, camera, the transform and selection state of the item being drawn)
//! lives in a [`FrameContext`] owned by one engine instance, so several
//! engines can coexist in one process.

use crate::math::{Mat4, Vec2, Vec3};

/// The camera used for rendering and for building picking rays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// World-space eye position.
    pub position: Vec3,
    /// World-to-view matrix.
    pub view: Mat4,
    /// View-to-clip matrix.
    pub projection: Mat4,
}

impl Camera {
    /// A perspective camera at `eye` looking at `target`.
    pub fn look_at(eye: Vec3, target: Vec3, fov_y: f32, aspect: f32) -> Self {
        Self {
            position: eye,
            view: Mat4::look_at_rh(eye, target, Vec3::Y),
            projection: Mat4::perspective_rh_gl(fov_y, aspect, 0.1, 1000.0),
        }
    }

    /// `projection * view`.
    #[inline]
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::look_at(Vec3::new(0.0, 0.0, 7.0), Vec3::ZERO, 45f32.to_radians(), 1.0)
    }
}

/// Values shaders can bind to through system semantics.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameContext {
    /// Frames rendered while not paused.
    pub frame_index: u64,
    /// Seconds on the engine clock; frozen while paused.
    pub time: f32,
    /// Size of the target currently rendered, in pixels.
    pub viewport: Vec2,
    /// The active camera.
    pub camera: Camera,
    /// World transform of the item being drawn.
    pub geometry_transform: Mat4,
    /// Whether the item being drawn is selected.
    pub picked: bool,
}

impl FrameContext {
    /// Pixel-space orthographic projection of the current viewport.
    pub fn orthographic(&self) -> Mat4 {
        Mat4::orthographic_rh_gl(0.0, self.viewport.x, 0.0, self.viewport.y, 0.1, 1000.0)
    }
}

impl Default for FrameContext {
    fn default() -> Self {
        Self {
            frame_index: 0,
            time: 0.0,
            viewport: Vec2::ONE,
            camera: Camera::default(),
            geometry_transform: Mat4::IDENTITY,
            picked: false,
        }
    }
}
