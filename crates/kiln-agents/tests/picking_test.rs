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

//! Integration tests for ray picking, the selection set and the
//! identity-encoded debug picks.

mod common;

use common::Fixture;
use kiln_core::math::{LinearRgba, Mat4, Ray, UVec2, Vec2, Vec3};
use kiln_core::pipeline::{GeometryShape, ItemKey, ItemKind, PipelineItem, PluginItem, RenderTarget};
use kiln_core::plugin::{PluginCapability, PluginData};
use kiln_core::project::RenderTextureSize;
use kiln_core::renderer::DrawableId;
use kiln_infra::Coverage;
use kiln_lanes::pick_lane::PickError;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

fn stripe(index: u32, count: u32) -> Coverage {
    let w = 1.0 / count as f32;
    Coverage::new(Vec2::new(w * index as f32, 0.0), Vec2::new(w * (index + 1) as f32, 1.0))
}

fn capture() -> (Arc<Mutex<Option<Option<ItemKey>>>>, kiln_lanes::pick_lane::PickCallback) {
    let slot = Arc::new(Mutex::new(None));
    let sink = slot.clone();
    let callback = Box::new(move |item: Option<ItemKey>| *sink.lock().unwrap() = Some(item));
    (slot, callback)
}

// ─────────────────────────────────────────────────────────────────────────────
// Ray picking
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_ray_pick_selects_nearest_hit() {
    let mut f = Fixture::new();
    let pass = f.pass("Scene", &[RenderTarget::Window]);
    let far = f.shape(pass, "Far", GeometryShape::Cube, 1);
    f.geometry_mut(far).position = Vec3::new(0.0, 0.0, 4.5);
    let near = f.shape(pass, "Near", GeometryShape::Cube, 2);
    f.geometry_mut(near).position = Vec3::new(0.0, 0.0, 7.5);
    f.render();

    let (result, callback) = capture();
    f.engine.pick(Vec2::new(32.0, 32.0), false, Some(callback));
    assert!(result.lock().unwrap().is_none(), "resolved by the next render only");
    f.render();

    assert_eq!(*result.lock().unwrap(), Some(Some(near)), "depth 2.0 beats depth 5.0");
    assert_eq!(f.engine.selection().items(), &[near]);
}

#[test]
fn test_ray_pick_miss_clears_selection() {
    let mut f = Fixture::new();
    let pass = f.pass("Scene", &[RenderTarget::Window]);
    let cube = f.shape(pass, "Cube", GeometryShape::Cube, 1);
    f.render();
    f.engine.pick_item(Some(cube), false);

    let (result, callback) = capture();
    f.engine.pick(Vec2::new(0.0, 0.0), true, Some(callback));
    f.render();

    assert_eq!(*result.lock().unwrap(), Some(None));
    assert!(f.engine.selection().is_empty());
}

#[test]
fn test_pick_item_multi_select() {
    let mut f = Fixture::new();
    let pass = f.pass("Scene", &[RenderTarget::Window]);
    let a = f.shape(pass, "A", GeometryShape::Cube, 1);
    let b = f.shape(pass, "B", GeometryShape::Cube, 2);

    f.engine.pick_item(Some(a), false);
    f.engine.pick_item(Some(b), true);
    assert_eq!(f.engine.selection().items(), &[a, b]);

    f.engine.pick_item(Some(a), false);
    assert_eq!(f.engine.selection().items(), &[a]);
}

#[test]
fn test_removed_item_leaves_selection() {
    let mut f = Fixture::new();
    let pass = f.pass("Scene", &[RenderTarget::Window]);
    let a = f.shape(pass, "A", GeometryShape::Cube, 1);
    f.engine.pick_item(Some(a), false);

    f.pipeline.remove(pass);
    f.render();
    assert!(f.engine.selection().is_empty());
}

#[derive(Debug)]
struct Sphere {
    begun: AtomicU32,
    in_pass: AtomicU32,
    picked: AtomicU32,
    standalone: AtomicU32,
}

impl Sphere {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            begun: AtomicU32::new(0),
            in_pass: AtomicU32::new(0),
            picked: AtomicU32::new(0),
            standalone: AtomicU32::new(0),
        })
    }
}

impl PluginCapability for Sphere {
    fn begin_render(&self) {
        self.begun.fetch_add(1, Ordering::Relaxed);
    }

    fn bind_object(&self, _object_type: &str, _data: PluginData, _slot: u32) {}

    fn execute_in_pass(&self, _pass: &str, _item_type: &str, _data: PluginData, picked: bool) {
        self.in_pass.fetch_add(1, Ordering::Relaxed);
        if picked {
            self.picked.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn execute_standalone(&self, _item_type: &str, _data: PluginData, _children: &[ItemKey]) {
        self.standalone.fetch_add(1, Ordering::Relaxed);
    }

    fn intersect(&self, _item_type: &str, _data: PluginData, ray: &Ray) -> Option<f32> {
        ray.intersect_sphere(Vec3::ZERO, 1.0)
    }

    fn world_matrix(&self, _item_name: &str) -> Mat4 {
        Mat4::from_translation(Vec3::new(0.0, 0.0, 8.0))
    }

    fn is_pickable(&self, item_type: &str) -> bool {
        item_type == "sphere"
    }

    fn assigns_debug_identity(&self, _item_type: &str) -> bool {
        true
    }
}

#[test]
fn test_plugin_items_execute_and_pick() {
    let mut f = Fixture::new();
    let plugin = Sphere::new();
    f.engine.register_plugin(plugin.clone());
    let pass = f.pass("Scene", &[RenderTarget::Window]);
    f.shape(pass, "Cube", GeometryShape::Cube, 1);
    let sphere = f
        .pipeline
        .add_child(
            pass,
            PipelineItem::new("Ball", ItemKind::Plugin(PluginItem::new(plugin.clone(), "sphere", PluginData(7)))),
        )
        .unwrap();
    f.pipeline.add(PipelineItem::new(
        "Post",
        ItemKind::Plugin(PluginItem::new(plugin.clone(), "post", PluginData(8))),
    ));

    f.render();
    assert_eq!(plugin.begun.load(Ordering::Relaxed), 1);
    assert_eq!(plugin.in_pass.load(Ordering::Relaxed), 1);
    assert_eq!(plugin.standalone.load(Ordering::Relaxed), 1);

    let (result, callback) = capture();
    f.engine.pick(Vec2::new(32.0, 32.0), false, Some(callback));
    f.render();
    assert_eq!(*result.lock().unwrap(), Some(Some(sphere)), "the sphere sits in front of the cube");
    assert_eq!(plugin.picked.load(Ordering::Relaxed), 0, "the pick resolves after the draws");

    let stats = f.engine.render(&f.pipeline, 64, 64, true).unwrap();
    assert_eq!(stats.identities, 2, "the cube and the plugin item");
    assert_eq!(plugin.in_pass.load(Ordering::Relaxed), 3, "pass children run in debug renders too");
    assert_eq!(plugin.standalone.load(Ordering::Relaxed), 2, "standalone items skip debug renders");
    assert_eq!(plugin.picked.load(Ordering::Relaxed), 1, "the selected sphere is drawn as picked");
    assert_eq!(f.engine.item_by_debug_id(&f.pipeline, 2), Some((pass, sphere)));
}

// ─────────────────────────────────────────────────────────────────────────────
// Identity picking
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_debug_ids_map_back_to_their_draws() {
    let mut f = Fixture::new();
    let first = f.pass("First", &[RenderTarget::Window]);
    let a = f.shape(first, "A", GeometryShape::Cube, 1);
    let b = f.shape(first, "B", GeometryShape::Cube, 2);
    let second = f.pass("Second", &[RenderTarget::Window]);
    let c = f.shape(second, "C", GeometryShape::Cube, 3);
    f.render();
    f.engine.render(&f.pipeline, 64, 64, true).unwrap();

    assert_eq!(f.engine.item_by_debug_id(&f.pipeline, 0), None, "0 encodes the background");
    assert_eq!(f.engine.item_by_debug_id(&f.pipeline, 1), Some((first, a)));
    assert_eq!(f.engine.item_by_debug_id(&f.pipeline, 2), Some((first, b)));
    assert_eq!(f.engine.item_by_debug_id(&f.pipeline, 3), Some((second, c)));
    assert_eq!(f.engine.item_by_debug_id(&f.pipeline, 4), None);
}

#[test]
fn test_pixel_pick_finds_each_stripe() {
    let mut f = Fixture::new();
    let pass = f.pass("Scene", &[RenderTarget::Window]);
    let keys: Vec<ItemKey> = (0..3)
        .map(|i| {
            f.device.set_coverage(DrawableId(i + 1), stripe(i as u32, 3));
            f.shape(pass, &format!("Stripe {i}"), GeometryShape::Cube, i + 1)
        })
        .collect();
    f.render();

    for (i, key) in keys.iter().enumerate() {
        let relative = Vec2::new((i as f32 + 0.5) / 3.0, 0.5);
        let pixels = f.engine.debug_pixel_pick(&f.pipeline, relative).unwrap().to_vec();
        assert_eq!(pixels.len(), 1, "only the window is written");
        let info = &pixels[0];
        assert_eq!(info.render_texture, "Window");
        assert_eq!((info.owner, info.object), (pass, *key));
        assert_eq!(info.attachment, 0);
        assert_eq!(info.color, LinearRgba::from_rgba8([255, 255, 255, 255]), "normal-mode color");
        assert_eq!(info.coordinate, UVec2::new((relative.x * 64.0) as u32, 32));
    }

    f.engine.pause(true);
    assert!(f.engine.pixels().is_empty(), "pausing drops pixel results");
}

#[test]
fn test_pixel_pick_reports_render_texture_attachment() {
    let mut f = Fixture::new();
    let rt = f
        .objects
        .create_render_texture("Normals", RenderTextureSize::Fixed(UVec2::new(32, 32)))
        .unwrap();
    let pass = f.pass("Gbuffer", &[RenderTarget::Window, RenderTarget::Texture(rt.color)]);
    let quad = f.shape(pass, "Quad", GeometryShape::ScreenQuadNdc, 1);
    f.render();

    let pixels = f.engine.debug_pixel_pick(&f.pipeline, Vec2::splat(0.5)).unwrap();
    let normals = pixels
        .iter()
        .find(|p| p.render_texture == "Normals")
        .expect("the render texture was written");
    assert_eq!(normals.attachment, 1);
    assert_eq!(normals.object, quad);
    assert_eq!(normals.coordinate, UVec2::new(16, 16));
}

#[test]
fn test_pixel_pick_skips_geometry_stage_targets() {
    let mut f = Fixture::new();
    let pass = f.pass("Scene", &[RenderTarget::Window]);
    f.shape(pass, "Cube", GeometryShape::Cube, 1);
    f.pass_mut(pass).gs_used = true;
    f.render();

    let pixels = f.engine.debug_pixel_pick(&f.pipeline, Vec2::splat(0.5)).unwrap();
    assert!(pixels.is_empty());
}

#[test]
fn test_vertex_and_instance_pick() {
    let mut f = Fixture::new();
    let pass = f.pass("Scene", &[RenderTarget::Window]);
    let tri = f.shape(pass, "Tri", GeometryShape::Triangle, 1);
    let crowd = f.shape(pass, "Crowd", GeometryShape::Cube, 2);
    f.geometry_mut(crowd).instances = Some(5);
    f.render();

    let vertex = f
        .engine
        .debug_vertex_pick(&f.pipeline, pass, tri, Vec2::splat(0.5))
        .unwrap();
    assert_eq!(vertex, 2);

    let instance = f
        .engine
        .debug_instance_pick(&f.pipeline, pass, crowd, Vec2::splat(0.5))
        .unwrap();
    assert_eq!(instance, 4);
    assert_eq!(f.engine.last_stats().draw_calls, 2, "a normal render follows the pick");
}

#[test]
fn test_index_pick_requires_shader_pass() {
    let mut f = Fixture::new();
    let pass = f.pass("Scene", &[RenderTarget::Window]);
    let tri = f.shape(pass, "Tri", GeometryShape::Triangle, 1);
    f.render();

    let result = f.engine.debug_vertex_pick(&f.pipeline, tri, tri, Vec2::ZERO);
    assert!(matches!(
        result,
        Err(kiln_agents::EngineError::Pick(PickError::NotAShaderPass(name))) if name == "Tri"
    ));
}
