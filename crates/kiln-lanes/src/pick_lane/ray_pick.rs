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

//! CPU ray picking against the analytic shape of each drawn item.
//!
//! A pick request is armed by the engine and resolved by the next render:
//! every drawable child the executor visits is tested, the nearest hit
//! wins, and the callback fires once the frame is done.

use super::Selection;
use kiln_core::math::{Aabb, Ray, Vec3};
use kiln_core::pipeline::{GeometryShape, ItemKey, ItemKind, PipelineItem};
use std::fmt;

/// Half-thickness given to flat shapes so a box test can hit them.
const FLAT_EPSILON: f32 = 0.0001;

/// Invoked with the resolved item, or `None` when nothing was hit.
pub type PickCallback = Box<dyn FnOnce(Option<ItemKey>) + Send>;

struct PendingPick {
    ray: Ray,
    multi: bool,
    best: f32,
    nearest: Option<ItemKey>,
    callback: Option<PickCallback>,
}

/// The selection plus at most one in-flight pick request.
#[derive(Default)]
pub struct PickState {
    selection: Selection,
    pending: Option<PendingPick>,
}

impl fmt::Debug for PickState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PickState")
            .field("selection", &self.selection)
            .field("pending", &self.pending.as_ref().map(|p| p.ray))
            .finish()
    }
}

impl PickState {
    /// Creates a state with nothing selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms a pick request. A request still pending is replaced without
    /// its callback being called.
    pub fn request(&mut self, ray: Ray, multi: bool, callback: Option<PickCallback>) {
        if self.pending.is_some() {
            log::debug!("Replacing an unresolved pick request");
        }
        self.pending = Some(PendingPick {
            ray,
            multi,
            best: f32::INFINITY,
            nearest: None,
            callback,
        });
    }

    /// Whether a request waits for the next render.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Tests one item against the pending ray, if any.
    ///
    /// Plugin items are only tested when their owner declares them pickable.
    /// Only a strictly closer hit replaces the running best, so ties keep
    /// the item seen first.
    pub fn test(&mut self, key: ItemKey, item: &PipelineItem) {
        let Some(pending) = self.pending.as_mut() else {
            return;
        };
        if let ItemKind::Plugin(plugin) = &item.kind {
            if !plugin.owner.is_pickable(&plugin.item_type) {
                return;
            }
        }
        if let Some(t) = intersect_item(&pending.ray, item, pending.best) {
            if t < pending.best {
                pending.best = t;
                pending.nearest = Some(key);
            }
        }
    }

    /// Resolves the pending request: applies the nearest hit to the
    /// selection and hands the outcome to the callback.
    pub fn finish(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        self.selection.select(pending.nearest, pending.multi);
        log::debug!("Pick resolved to {:?}", pending.nearest);
        if let Some(callback) = pending.callback {
            callback(self.selection.last());
        }
    }

    /// The current selection.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// The current selection, mutably.
    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }
}

/// Intersects a world-space ray with an item's analytic shape.
///
/// The ray is moved into the item's object space first. `best` is the
/// running nearest distance and only bounds work for models: their
/// triangles are tested only when the bounding box is closer than `best`,
/// and the scan stops at the first triangle that beats it.
///
/// ## Returns
/// The hit distance in units of the world ray's direction, or `None` for a
/// miss or for items that cannot be picked.
pub fn intersect_item(ray: &Ray, item: &PipelineItem, best: f32) -> Option<f32> {
    match &item.kind {
        ItemKind::Geometry(geo) => {
            if matches!(geo.shape, GeometryShape::Rectangle | GeometryShape::ScreenQuadNdc) {
                return None;
            }
            let local = ray.transformed(&geo.pick_transform().inverse());
            let extent = geo.size * geo.scale;
            match geo.shape {
                GeometryShape::Cube => Aabb::centered(extent).intersect_ray(&local),
                GeometryShape::Triangle => {
                    let size = extent.x;
                    let right = size / 30f32.to_radians().tan();
                    local.intersect_triangle(
                        Vec3::new(0.0, -size, 0.0),
                        Vec3::new(-right, size, 0.0),
                        Vec3::new(right, size, 0.0),
                    )
                }
                GeometryShape::Sphere => local.intersect_sphere(Vec3::ZERO, extent.x),
                GeometryShape::Plane => flat_box(extent * 0.5).intersect_ray(&local),
                GeometryShape::Circle => flat_box(extent).intersect_ray(&local),
                GeometryShape::Rectangle | GeometryShape::ScreenQuadNdc => None,
            }
        }
        ItemKind::Model(model) => {
            let local = ray.transformed(&model.pick_transform().inverse());
            let box_hit = model.mesh.bounds.intersect_ray(&local)?;
            if box_hit >= best {
                return Some(box_hit);
            }

            let mut nearest: Option<f32> = None;
            for mesh in &model.mesh.sub_meshes {
                for tri in mesh.positions.chunks_exact(3) {
                    let Some(t) = local.intersect_triangle(tri[0], tri[1], tri[2]) else {
                        continue;
                    };
                    if nearest.map_or(true, |n| t < n) {
                        nearest = Some(t);
                        if t < best {
                            return nearest;
                        }
                    }
                }
            }
            nearest
        }
        ItemKind::Plugin(plugin) => {
            let world = plugin.owner.world_matrix(&item.name);
            let local = ray.transformed(&world.inverse());
            plugin.owner.intersect(&plugin.item_type, plugin.data, &local)
        }
        _ => None,
    }
}

fn flat_box(half: Vec3) -> Aabb {
    Aabb::from_min_max(
        Vec3::new(-half.x, -half.y, -FLAT_EPSILON),
        Vec3::new(half.x, half.y, FLAT_EPSILON),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use kiln_core::pipeline::{Geometry, MeshGeometry, Model, Pipeline, SubMesh};
    use kiln_core::renderer::DrawableId;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    fn cube_at(z: f32) -> PipelineItem {
        let mut geo = Geometry::new(GeometryShape::Cube, DrawableId(0));
        geo.position = Vec3::new(0.0, 0.0, z);
        PipelineItem::new("Box", ItemKind::Geometry(geo))
    }

    fn down_z() -> Ray {
        Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::new(0.0, 0.0, -1.0))
    }

    // ─── Shape tests ─────────────────────────────────────────────

    #[test]
    fn test_cube_hit_distance() {
        let t = intersect_item(&down_z(), &cube_at(0.0), f32::INFINITY).expect("cube is on the ray");
        assert_relative_eq!(t, 9.5, epsilon = 1e-4);
    }

    #[test]
    fn test_scaled_sphere_uses_size_times_scale() {
        let mut geo = Geometry::new(GeometryShape::Sphere, DrawableId(0));
        geo.scale = Vec3::splat(2.0);
        let item = PipelineItem::new("Ball", ItemKind::Geometry(geo));
        let t = intersect_item(&down_z(), &item, f32::INFINITY).expect("sphere is on the ray");
        assert_relative_eq!(t, 8.0, epsilon = 1e-4);
    }

    #[test]
    fn test_screen_space_shapes_are_not_pickable() {
        let geo = Geometry::new(GeometryShape::Rectangle, DrawableId(0));
        let item = PipelineItem::new("Quad", ItemKind::Geometry(geo));
        assert_eq!(intersect_item(&down_z(), &item, f32::INFINITY), None);
    }

    #[test]
    fn test_model_tests_triangles_when_box_is_closer() {
        let mesh = MeshGeometry::new(vec![SubMesh {
            drawable: DrawableId(0),
            positions: vec![
                Vec3::new(-1.0, -1.0, 0.0),
                Vec3::new(1.0, -1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
        }]);
        let item = PipelineItem::new("Mesh", ItemKind::Model(Model::new(Arc::new(mesh))));

        let t = intersect_item(&down_z(), &item, f32::INFINITY).expect("triangle is on the ray");
        assert_relative_eq!(t, 10.0, epsilon = 1e-4);

        let aside = Ray::new(Vec3::new(0.9, 0.9, 10.0), Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(
            intersect_item(&aside, &item, f32::INFINITY),
            None,
            "inside the bounds but outside the triangle"
        );
        assert_eq!(
            intersect_item(&aside, &item, 1.0),
            Some(10.0),
            "a farther box hit is reported without testing triangles"
        );
    }

    // ─── Pick resolution ─────────────────────────────────────────

    #[test]
    fn test_nearest_hit_wins_regardless_of_order() {
        let mut pipeline = Pipeline::new();
        let far = pipeline.add(cube_at(5.5));
        let near = pipeline.add(cube_at(8.5));

        let resolved = Arc::new(Mutex::new(None));
        let sink = resolved.clone();
        let mut state = PickState::new();
        state.request(
            down_z(),
            false,
            Some(Box::new(move |item: Option<ItemKey>| *sink.lock().unwrap() = Some(item))),
        );
        for key in [far, near] {
            state.test(key, pipeline.get(key).unwrap());
        }
        state.finish();

        assert_eq!(*resolved.lock().unwrap(), Some(Some(near)), "depth 1.0 beats depth 4.0");
        assert_eq!(state.selection().items(), &[near]);
        assert!(!state.is_pending());
    }

    #[test]
    fn test_miss_clears_selection_and_reports_none() {
        let mut pipeline = Pipeline::new();
        let key = pipeline.add(cube_at(0.0));

        let called = Arc::new(AtomicBool::new(false));
        let flag = called.clone();
        let mut state = PickState::new();
        state.selection_mut().select(Some(key), false);

        let away = Ray::new(Vec3::new(50.0, 0.0, 10.0), Vec3::new(0.0, 0.0, -1.0));
        state.request(
            away,
            true,
            Some(Box::new(move |item: Option<ItemKey>| {
                assert_eq!(item, None);
                flag.store(true, Ordering::SeqCst);
            })),
        );
        state.test(key, pipeline.get(key).unwrap());
        state.finish();

        assert!(called.load(Ordering::SeqCst));
        assert!(state.selection().is_empty());
    }
}
