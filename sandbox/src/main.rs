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

// Kiln Sandbox
// Renders a small pipeline on the headless device, then picks into it.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use kiln_agents::RenderEngine;
use kiln_core::context::Camera;
use kiln_core::math::{Vec2, Vec3};
use kiln_core::pipeline::{
    ComputePass, Geometry, GeometryShape, ItemKey, ItemKind, Pipeline, PipelineItem, RenderTarget, ShaderPass,
    ShaderStageSource, ShaderVariable, SystemSemantic,
};
use kiln_core::project::RenderTextureSize;
use kiln_core::renderer::DrawableId;
use kiln_core::RenderSettings;
use kiln_infra::{Coverage, HeadlessDevice, MessageLog, ProjectFiles, ProjectObjects};
use kiln_lanes::RenderServices;

const WIDTH: u32 = 800;
const HEIGHT: u32 = 600;

struct Scene {
    pipeline: Pipeline,
    pass: ItemKey,
    cube: ItemKey,
    sphere: ItemKey,
}

fn build_scene(objects: &ProjectObjects) -> Result<Scene> {
    let normals = objects
        .create_render_texture("Normals", RenderTextureSize::Relative(Vec2::ONE))
        .context("creating the normals target")?;

    let mut pass = ShaderPass::new(
        ShaderStageSource::new("scene.vert", "main"),
        ShaderStageSource::new("scene.frag", "main"),
    );
    pass.set_render_targets(&[RenderTarget::Window, RenderTarget::Texture(normals.color)]);
    pass.variables = vec![
        ShaderVariable::system("uMatVP", SystemSemantic::ViewProjection),
        ShaderVariable::system("uMatGeo", SystemSemantic::GeometryTransform),
    ];

    let mut pipeline = Pipeline::new();
    let mut particles = ComputePass::new(ShaderStageSource::new("particles.comp", "main"), [16, 1, 1]);
    particles.variables = vec![ShaderVariable::system("uTime", SystemSemantic::Time)];
    pipeline.add(PipelineItem::new("Particles", ItemKind::ComputePass(particles)));
    let pass = pipeline.add(PipelineItem::new("Scene", ItemKind::ShaderPass(pass)));

    let mut cube = Geometry::new(GeometryShape::Cube, DrawableId(1));
    cube.position = Vec3::new(-1.5, 0.0, 0.0);
    let cube = pipeline.add_child(pass, PipelineItem::new("Cube", ItemKind::Geometry(cube)))?;

    let mut sphere = Geometry::new(GeometryShape::Sphere, DrawableId(2));
    sphere.position = Vec3::new(1.5, 0.0, 0.0);
    let sphere = pipeline.add_child(pass, PipelineItem::new("Sphere", ItemKind::Geometry(sphere)))?;

    Ok(Scene {
        pipeline,
        pass,
        cube,
        sphere,
    })
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets");
    let settings_text =
        std::fs::read_to_string(root.join("settings.json")).context("reading sandbox settings")?;
    let settings = RenderSettings::from_json_str(&settings_text).context("parsing sandbox settings")?;

    let device = HeadlessDevice::new();
    let objects = Arc::new(ProjectObjects::new(Arc::new(device.clone()), settings.msaa_samples));
    let messages = Arc::new(MessageLog::new());
    let services = RenderServices::new(
        Arc::new(device.clone()),
        objects.clone(),
        Arc::new(ProjectFiles::new(&root)),
        messages.clone(),
    );

    let scene = build_scene(&objects)?;
    // The headless device has no rasterizer; tell it where each shape lands.
    device.set_coverage(DrawableId(1), Coverage::new(Vec2::new(0.1, 0.3), Vec2::new(0.4, 0.7)));
    device.set_coverage(DrawableId(2), Coverage::new(Vec2::new(0.6, 0.3), Vec2::new(0.9, 0.7)));

    let mut engine = RenderEngine::new(services, settings);
    engine.set_camera(Camera::look_at(
        Vec3::new(0.0, 0.0, 6.0),
        Vec3::ZERO,
        45f32.to_radians(),
        WIDTH as f32 / HEIGHT as f32,
    ));

    for _ in 0..3 {
        let stats = engine.render(&scene.pipeline, WIDTH, HEIGHT, false)?;
        log::info!(
            "Frame {}: {} passes, {} draws, {} dispatches, {} resolves, {} compilations",
            engine.frame_index(),
            stats.shader_passes,
            stats.draw_calls,
            stats.compute_dispatches,
            stats.resolves,
            stats.reconcile.compilations
        );
    }
    for message in messages.messages() {
        log::info!("[{}] {:?}: {}", message.group, message.severity, message.text);
    }

    // Ray pick through the sphere's center.
    let pass_name = scene
        .pipeline
        .get(scene.pass)
        .map(|item| item.name.clone())
        .unwrap_or_default();
    engine.pick(
        Vec2::new(WIDTH as f32 * 0.5 + 170.0, HEIGHT as f32 * 0.5),
        false,
        Some(Box::new(|item: Option<ItemKey>| log::info!("Ray pick resolved to {item:?}"))),
    );
    engine.render(&scene.pipeline, WIDTH, HEIGHT, false)?;
    log::info!("Selection after ray pick: {:?}", engine.selection().items());

    let probes = [
        ("cube", Vec2::new(0.25, 0.5)),
        ("sphere", Vec2::new(0.75, 0.5)),
        ("background", Vec2::new(0.5, 0.1)),
    ];
    for (label, at) in probes {
        let pixels = engine.debug_pixel_pick(&scene.pipeline, at)?;
        log::info!("Pixel debug over the {label}: {} hits", pixels.len());
        for pixel in pixels {
            let name = scene
                .pipeline
                .get(pixel.object)
                .map(|item| item.name.as_str())
                .unwrap_or("?");
            log::info!(
                "  {} #{} at {:?}: '{}' drawn by '{pass_name}', color {:?}",
                pixel.render_texture,
                pixel.attachment,
                pixel.coordinate,
                name,
                pixel.color
            );
        }
    }

    let vertex = engine.debug_vertex_pick(&scene.pipeline, scene.pass, scene.cube, Vec2::new(0.25, 0.5))?;
    let instance = engine.debug_instance_pick(&scene.pipeline, scene.pass, scene.sphere, Vec2::new(0.75, 0.5))?;
    log::info!("Cube vertex under the cursor: {vertex}, sphere instance: {instance}");

    engine.flush_cache();
    let stats = engine.render(&scene.pipeline, WIDTH, HEIGHT, false)?;
    log::info!(
        "After flush: {} compilations, {} framebuffer rebuilds",
        stats.reconcile.compilations,
        stats.framebuffer_rebuilds
    );

    Ok(())
}
