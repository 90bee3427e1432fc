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

//! Rays and the analytic intersection tests used by CPU picking.
//!
//! Every test returns the ray parameter `t` in units of the ray's own
//! direction vector. Directions are never normalized here, so a world-space
//! ray transformed into an item's object space keeps the same `t` for the
//! same world point. That is what makes hits on differently-scaled items
//! comparable.

use super::{Mat4, Vec3, Vec4, EPSILON};

/// A half-line with an origin and a (not necessarily unit) direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Starting point of the ray.
    pub origin: Vec3,
    /// Direction of travel. `origin + direction * t` is the point at `t`.
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray.
    #[inline]
    pub const fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Builds a world-space picking ray from a screen coordinate.
    ///
    /// ## Arguments
    /// * `screen` - Pixel coordinate, with `y` growing upwards.
    /// * `size` - Size of the viewport in pixels.
    /// * `view` / `projection` - The camera matrices used for rendering.
    /// * `eye` - World-space camera position, used as the ray origin.
    ///
    /// ## Returns
    /// A ray from `eye` through the far-plane point under the cursor, with a
    /// unit-length direction.
    pub fn from_screen(screen: (f32, f32), size: (f32, f32), view: Mat4, projection: Mat4, eye: Vec3) -> Self {
        let ndc_x = screen.0 / (size.0.max(1.0) * 0.5) - 1.0;
        let ndc_y = screen.1 / (size.1.max(1.0) * 0.5) - 1.0;

        let inv_view_proj = (projection * view).inverse();
        let far = inv_view_proj * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
        let far = if far.w.abs() > EPSILON {
            far.truncate() / far.w
        } else {
            far.truncate()
        };

        Self::new(eye, (far - eye).normalize_or_zero())
    }

    /// Returns the point at parameter `t`.
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Moves this ray into another space, typically an item's object space
    /// via the inverse world matrix.
    #[inline]
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        Self {
            origin: matrix.transform_point3(self.origin),
            direction: matrix.transform_vector3(self.direction),
        }
    }

    /// Möller–Trumbore ray/triangle intersection, double sided.
    pub fn intersect_triangle(&self, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;
        let p = self.direction.cross(edge2);
        let det = edge1.dot(p);
        if det.abs() < EPSILON {
            return None;
        }

        let inv_det = 1.0 / det;
        let s = self.origin - v0;
        let u = s.dot(p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = self.direction.dot(q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = edge2.dot(q) * inv_det;
        (t >= 0.0).then_some(t)
    }

    /// Intersects the ray with a sphere, returning the nearest non-negative hit.
    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let oc = self.origin - center;
        let a = self.direction.length_squared();
        if a < EPSILON {
            return None;
        }
        let b = oc.dot(self.direction);
        let c = oc.length_squared() - radius * radius;
        let discriminant = b * b - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrt_d = discriminant.sqrt();
        let near = (-b - sqrt_d) / a;
        if near >= 0.0 {
            return Some(near);
        }
        let far = (-b + sqrt_d) / a;
        (far >= 0.0).then_some(far)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_triangle_hit_and_miss() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -3.0), Vec3::Z);
        let (v0, v1, v2) = (
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        );
        assert_relative_eq!(ray.intersect_triangle(v0, v1, v2).unwrap(), 3.0);

        let off = Ray::new(Vec3::new(5.0, 0.0, -3.0), Vec3::Z);
        assert!(off.intersect_triangle(v0, v1, v2).is_none());

        let away = Ray::new(Vec3::new(0.0, 0.0, -3.0), -Vec3::Z);
        assert!(away.intersect_triangle(v0, v1, v2).is_none());
    }

    #[test]
    fn test_sphere_nearest_hit() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -10.0), Vec3::Z);
        assert_relative_eq!(ray.intersect_sphere(Vec3::ZERO, 2.0).unwrap(), 8.0);

        let inside = Ray::new(Vec3::ZERO, Vec3::Z);
        assert_relative_eq!(inside.intersect_sphere(Vec3::ZERO, 2.0).unwrap(), 2.0);

        let miss = Ray::new(Vec3::new(0.0, 5.0, -10.0), Vec3::Z);
        assert!(miss.intersect_sphere(Vec3::ZERO, 2.0).is_none());
    }

    #[test]
    fn test_transformed_ray_keeps_parameter() {
        let world = Mat4::from_translation(Vec3::new(0.0, 0.0, 4.0)) * Mat4::from_scale(Vec3::splat(2.0));
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        let local = ray.transformed(&world.inverse());

        // The unit cube scaled by two spans z in [3, 5] in world space.
        let t = crate::math::Aabb::centered(Vec3::ONE).intersect_ray(&local).unwrap();
        assert_relative_eq!(ray.at(t).z, 3.0, epsilon = 1e-5);
    }

    #[test]
    fn test_from_screen_center_looks_forward() {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        let projection = Mat4::perspective_rh_gl(1.0, 1.0, 0.1, 100.0);
        let ray = Ray::from_screen((50.0, 50.0), (100.0, 100.0), view, projection, Vec3::new(0.0, 0.0, 5.0));

        assert_relative_eq!(ray.direction.x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(ray.direction.y, 0.0, epsilon = 1e-4);
        assert_relative_eq!(ray.direction.z, -1.0, epsilon = 1e-4);
    }
}
