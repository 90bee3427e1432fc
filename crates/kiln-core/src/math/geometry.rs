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

//! Axis-aligned bounding boxes and the ray/box slab test.

use super::{Ray, Vec3};

/// Represents an Axis-Aligned Bounding Box (AABB).
///
/// Used by the ray picker as the analytic shape for cubes, planes and
/// circles, and as the broad-phase volume of model meshes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// The corner of the box with the smallest coordinates on all axes.
    pub min: Vec3,
    /// The corner of the box with the largest coordinates on all axes.
    pub max: Vec3,
}

impl Aabb {
    /// An invalid `Aabb` where `min` components are positive infinity and `max` are negative infinity.
    ///
    /// Merging any point into `INVALID` yields a box around that point.
    pub const INVALID: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Creates a new `Aabb` from two corner points, in any order.
    #[inline]
    pub fn from_min_max(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Creates a box centered on the origin with the given full extents.
    #[inline]
    pub fn centered(size: Vec3) -> Self {
        let half = size * 0.5;
        Self::from_min_max(-half, half)
    }

    /// Computes the smallest box enclosing every point, or `None` for an empty slice.
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        Some(
            points
                .iter()
                .fold(Self::INVALID, |acc, p| acc.merged_with_point(*p)),
        )
    }

    /// Returns the center point of the box.
    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Returns the full size of the box along each axis.
    #[inline]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Checks whether `min <= max` on every axis.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.min.cmple(self.max).all()
    }

    /// Returns a copy of this box grown to include `point`.
    #[inline]
    pub fn merged_with_point(&self, point: Vec3) -> Self {
        Self {
            min: self.min.min(point),
            max: self.max.max(point),
        }
    }

    /// Intersects a ray with this box using the slab method.
    ///
    /// ## Returns
    /// The ray parameter `t` of the entry point (or `0.0` when the origin is
    /// inside the box), expressed in units of `ray.direction`. `None` when the
    /// ray misses or the box lies entirely behind the origin.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;

        for axis in 0..3 {
            let origin = ray.origin[axis];
            let dir = ray.direction[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if dir.abs() < f32::EPSILON {
                // Parallel to the slab: either always inside or never.
                if origin < lo || origin > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / dir;
            let mut t0 = (lo - origin) * inv;
            let mut t1 = (hi - origin) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }

        if t_max < 0.0 {
            return None;
        }
        Some(t_min.max(0.0))
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::INVALID
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_aabb_from_min_max_orders_corners() {
        let aabb = Aabb::from_min_max(Vec3::new(1.0, -2.0, 3.0), Vec3::new(-1.0, 2.0, -3.0));
        assert_eq!(aabb.min, Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 2.0, 3.0));
        assert!(aabb.is_valid());
    }

    #[test]
    fn test_aabb_from_points() {
        assert!(Aabb::from_points(&[]).is_none());
        let aabb = Aabb::from_points(&[
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(-2.0, 0.0, 4.0),
            Vec3::new(1.0, -1.0, 2.0),
        ])
        .unwrap();
        assert_eq!(aabb.min, Vec3::new(-2.0, -1.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 1.0, 4.0));
        assert_eq!(aabb.center(), Vec3::new(-0.5, 0.0, 2.0));
    }

    #[test]
    fn test_ray_hits_box_in_front() {
        let aabb = Aabb::centered(Vec3::splat(2.0));
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        assert_relative_eq!(aabb.intersect_ray(&ray).unwrap(), 4.0);
    }

    #[test]
    fn test_ray_parameter_scales_with_direction_length() {
        let aabb = Aabb::centered(Vec3::splat(2.0));
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z * 2.0);
        assert_relative_eq!(aabb.intersect_ray(&ray).unwrap(), 2.0);
    }

    #[test]
    fn test_ray_misses_box() {
        let aabb = Aabb::centered(Vec3::splat(2.0));
        let ray = Ray::new(Vec3::new(3.0, 0.0, -5.0), Vec3::Z);
        assert!(aabb.intersect_ray(&ray).is_none());

        let behind = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z);
        assert!(aabb.intersect_ray(&behind).is_none());
    }

    #[test]
    fn test_ray_starting_inside_box() {
        let aabb = Aabb::centered(Vec3::splat(2.0));
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        assert_eq!(aabb.intersect_ray(&ray), Some(0.0));
    }

    #[test]
    fn test_parallel_ray_outside_slab() {
        let aabb = Aabb::from_min_max(Vec3::new(-1.0, -1.0, -0.0001), Vec3::new(1.0, 1.0, 0.0001));
        let ray = Ray::new(Vec3::new(0.0, 0.0, 1.0), Vec3::X);
        assert!(aabb.intersect_ray(&ray).is_none());
    }
}
