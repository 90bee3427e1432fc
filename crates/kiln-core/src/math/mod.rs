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

//! Math primitives for item transforms and CPU-side picking.
//!
//! Linear algebra comes from `glam`; this module adds the few geometric
//! types the executor needs on top of it (bounding boxes, rays, colors).
//!
//! All angular functions operate in **radians**.

/// A small constant for floating-point comparisons.
pub const EPSILON: f32 = 1e-6;

pub mod color;
pub mod geometry;
pub mod ray;

pub use glam::{EulerRot, IVec2, Mat4, UVec2, Vec2, Vec3, Vec4};

pub use self::color::LinearRgba;
pub use self::geometry::Aabb;
pub use self::ray::Ray;

/// Builds a rotation matrix from Euler angles stored as `(pitch, yaw, roll)`.
///
/// The rotation is applied roll first, then pitch, then yaw, which is the
/// convention every pipeline item transform uses.
///
/// # Examples
///
/// ```
/// use kiln_core::math::{yaw_pitch_roll, Mat4, Vec3};
/// assert_eq!(yaw_pitch_roll(Vec3::ZERO), Mat4::IDENTITY);
/// ```
#[inline]
pub fn yaw_pitch_roll(rotation: Vec3) -> Mat4 {
    Mat4::from_euler(EulerRot::YXZ, rotation.y, rotation.x, rotation.z)
}

/// Performs an approximate equality comparison using [`EPSILON`] scaled by the magnitude.
#[inline]
pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() <= EPSILON * a.abs().max(b.abs()).max(1.0)
}
