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

//! Shared fixture for the engine integration tests: a headless device, a
//! temporary project directory and an engine wired to both.

#![allow(dead_code)]

use kiln_agents::RenderEngine;
use kiln_core::pipeline::{
    Geometry, GeometryShape, ItemKey, ItemKind, Pipeline, PipelineItem, RenderTarget, ShaderPass, ShaderStageSource,
};
use kiln_core::renderer::DrawableId;
use kiln_core::RenderSettings;
use kiln_infra::{HeadlessDevice, MessageLog, ProjectFiles, ProjectObjects};
use kiln_lanes::RenderServices;
use std::sync::Arc;
use tempfile::TempDir;

pub const VERTEX: &str = "#version 330\nlayout(location = 0) in vec3 pos;\nvoid main()\n{\n\tgl_Position = vec4(pos, 1.0);\n}\n";
pub const PIXEL: &str = "#version 330\nout vec4 color;\nvoid main()\n{\n\tcolor = vec4(1.0);\n}\n";

pub struct Fixture {
    pub dir: TempDir,
    pub device: HeadlessDevice,
    pub objects: Arc<ProjectObjects>,
    pub log: Arc<MessageLog>,
    pub engine: RenderEngine,
    pub pipeline: Pipeline,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_files(&[])
    }

    /// Project files on top of `simple.vert` and `simple.frag`.
    pub fn with_files(files: &[(&str, &str)]) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let dir = tempfile::tempdir().unwrap();
        for (path, text) in [("simple.vert", VERTEX), ("simple.frag", PIXEL)].iter().chain(files) {
            std::fs::write(dir.path().join(path), text).unwrap();
        }

        let device = HeadlessDevice::new();
        let objects = Arc::new(ProjectObjects::new(Arc::new(device.clone()), 4));
        let log = Arc::new(MessageLog::new());
        let services = RenderServices::new(
            Arc::new(device.clone()),
            objects.clone(),
            Arc::new(ProjectFiles::new(dir.path())),
            log.clone(),
        );
        let settings = RenderSettings {
            cache_check_interval_ms: 0,
            ..Default::default()
        };

        Self {
            dir,
            device,
            objects,
            log,
            engine: RenderEngine::new(services, settings),
            pipeline: Pipeline::new(),
        }
    }

    pub fn pass(&mut self, name: &str, targets: &[RenderTarget]) -> ItemKey {
        self.pass_with(name, "simple.vert", targets)
    }

    pub fn pass_with(&mut self, name: &str, vertex: &str, targets: &[RenderTarget]) -> ItemKey {
        let mut pass = ShaderPass::new(
            ShaderStageSource::new(vertex, "main"),
            ShaderStageSource::new("simple.frag", "main"),
        );
        pass.set_render_targets(targets);
        self.pipeline
            .add(PipelineItem::new(name, ItemKind::ShaderPass(pass)))
    }

    pub fn shape(&mut self, pass: ItemKey, name: &str, shape: GeometryShape, drawable: usize) -> ItemKey {
        self.pipeline
            .add_child(
                pass,
                PipelineItem::new(name, ItemKind::Geometry(Geometry::new(shape, DrawableId(drawable)))),
            )
            .unwrap()
    }

    pub fn render(&mut self) -> kiln_lanes::render_lane::FrameStats {
        self.engine.render(&self.pipeline, 64, 64, false).unwrap()
    }

    pub fn pass_mut(&mut self, key: ItemKey) -> &mut ShaderPass {
        match self.pipeline.get_mut(key).map(|item| &mut item.kind) {
            Some(ItemKind::ShaderPass(pass)) => pass,
            _ => panic!("not a shader pass"),
        }
    }

    pub fn geometry_mut(&mut self, key: ItemKey) -> &mut Geometry {
        match self.pipeline.get_mut(key).map(|item| &mut item.kind) {
            Some(ItemKind::Geometry(geo)) => geo,
            _ => panic!("not a geometry item"),
        }
    }
}
