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

//! Integration tests for frame rendering and the resource cache as driven
//! through the RenderEngine.

mod common;

use common::Fixture;
use kiln_agents::EngineError;
use kiln_core::diagnostics::Severity;
use kiln_core::math::UVec2;
use kiln_core::pipeline::{ComputePass, GeometryShape, ItemKind, PipelineItem, RenderTarget, ShaderStageSource};
use kiln_core::project::RenderTextureSize;
use kiln_infra::DeviceCommand;

const COMPUTE: &str = "#version 430\nlayout(local_size_x = 8) in;\nvoid main() {}\n";

// ─────────────────────────────────────────────────────────────────────────────
// Reconciliation
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_second_render_compiles_and_rebuilds_nothing() {
    let mut f = Fixture::new();
    let pass = f.pass("Main", &[RenderTarget::Window]);
    f.shape(pass, "Box", GeometryShape::Cube, 1);

    let first = f.render();
    assert_eq!(first.reconcile.compilations, 1);
    assert_eq!(first.framebuffer_rebuilds, 1);
    let compiled = f.device.shaders_compiled();

    let second = f.render();
    assert_eq!(second.reconcile.compilations, 0, "no change, no compilation");
    assert_eq!(second.framebuffer_rebuilds, 0, "no change, no framebuffer rebuild");
    assert_eq!(f.device.shaders_compiled(), compiled);
    assert_eq!(second.draw_calls, 1);
}

#[test]
fn test_cache_order_follows_pipeline_edits() {
    let mut f = Fixture::new();
    let a = f.pass("A", &[RenderTarget::Window]);
    let b = f.pass("B", &[RenderTarget::Window]);
    let c = f.pass("C", &[RenderTarget::Window]);
    f.render();
    assert_eq!(f.engine.cached_items(), vec![a, b, c]);

    f.pipeline.move_to(c, 0);
    f.pipeline.remove(a);
    let d = f.pipeline.insert(1, pass_item("D"));
    f.pipeline.move_to(b, 0);
    let stats = f.render();

    assert_eq!(f.engine.cached_items(), f.pipeline.items().to_vec());
    assert_eq!(f.engine.cached_items(), vec![b, c, d]);
    assert_eq!((stats.reconcile.added, stats.reconcile.removed), (1, 1));
}

fn pass_item(name: &str) -> PipelineItem {
    PipelineItem::new(
        name,
        ItemKind::ShaderPass(kiln_core::pipeline::ShaderPass::new(
            ShaderStageSource::new("simple.vert", "main"),
            ShaderStageSource::new("simple.frag", "main"),
        )),
    )
}

#[test]
fn test_removed_items_release_their_programs() {
    let mut f = Fixture::new();
    let a = f.pass("A", &[RenderTarget::Window]);
    f.shape(a, "Box", GeometryShape::Cube, 1);
    f.render();
    let programs = f.device.live_programs();
    assert_eq!(programs, 2, "normal and debug program");

    f.pipeline.remove(a);
    f.render();
    assert_eq!(f.device.live_programs(), 0);
    assert!(f.engine.cached_items().is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Pass execution
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_inactive_or_targetless_passes_issue_no_work() {
    let mut f = Fixture::new();
    let detached = f.pass("Detached", &[]);
    f.shape(detached, "A", GeometryShape::Cube, 1);
    let off = f.pass("Off", &[RenderTarget::Window]);
    f.shape(off, "B", GeometryShape::Cube, 2);
    f.pass_mut(off).active = false;

    f.render();
    f.device.clear_commands();
    let stats = f.render();

    assert_eq!(stats.shader_passes, 0);
    assert_eq!(f.device.count_commands(DeviceCommand::is_work), 0);
    assert_eq!(
        f.device
            .count_commands(|c| matches!(c, DeviceCommand::BindFramebuffer(Some(_)))),
        0,
        "no pass framebuffer is bound"
    );
}

#[test]
fn test_flush_rebuilds_both_framebuffers_once() {
    let mut f = Fixture::new();
    let rt = f
        .objects
        .create_render_texture("RT1", RenderTextureSize::Fixed(UVec2::new(64, 64)))
        .unwrap();
    let pass = f.pass("P", &[RenderTarget::Window, RenderTarget::Texture(rt.color)]);
    f.shape(pass, "Quad", GeometryShape::ScreenQuadNdc, 1);
    f.render();

    f.engine.flush_cache();
    assert!(f.engine.cached_items().is_empty());
    assert_eq!(f.device.live_framebuffers(), 0, "flush releases every framebuffer");

    let created = f.device.framebuffers_created();
    let stats = f.render();
    assert_eq!(stats.framebuffer_rebuilds, 1);
    assert_eq!(f.device.framebuffers_created() - created, 2, "single and multisample framebuffer");

    assert_eq!(f.render().framebuffer_rebuilds, 0, "the rebuild flag was consumed");
}

#[test]
fn test_resize_rebuilds_framebuffers() {
    let mut f = Fixture::new();
    let pass = f.pass("Main", &[RenderTarget::Window]);
    f.shape(pass, "Box", GeometryShape::Cube, 1);
    f.render();

    let stats = f.engine.render(&f.pipeline, 128, 32, false).unwrap();
    assert_eq!(stats.framebuffer_rebuilds, 1);
    let output = f.engine.output().unwrap();
    assert_eq!(f.device.texture_size(output), Some((128, 32)));
}

#[test]
fn test_depth_is_cleared_once_per_depth_buffer_run() {
    let mut f = Fixture::new();
    let rt = f
        .objects
        .create_render_texture("RT", RenderTextureSize::Fixed(UVec2::new(64, 64)))
        .unwrap();
    for (name, target) in [
        ("RT A", RenderTarget::Texture(rt.color)),
        ("RT B", RenderTarget::Texture(rt.color)),
        ("Window A", RenderTarget::Window),
        ("Window B", RenderTarget::Window),
    ] {
        let pass = f.pass(name, &[target]);
        f.shape(pass, "Box", GeometryShape::Cube, 1);
    }
    f.render();

    f.device.clear_commands();
    assert_eq!(f.render().shader_passes, 4);
    let depth_clears = f
        .device
        .count_commands(|c| matches!(c, DeviceCommand::ClearDepthStencil { .. }));
    assert_eq!(depth_clears, 2, "one clear per depth buffer, not per pass");
}

#[test]
fn test_window_depth_is_not_cleared_twice_after_a_texture_pass() {
    let mut f = Fixture::new();
    let rt = f
        .objects
        .create_render_texture("RT", RenderTextureSize::Fixed(UVec2::new(64, 64)))
        .unwrap();
    for (name, target) in [
        ("RT A", RenderTarget::Texture(rt.color)),
        ("Window A", RenderTarget::Window),
        ("RT B", RenderTarget::Texture(rt.color)),
        ("Window B", RenderTarget::Window),
    ] {
        let pass = f.pass(name, &[target]);
        f.shape(pass, "Box", GeometryShape::Cube, 1);
    }
    f.render();

    f.device.clear_commands();
    f.render();
    let depth_clears = f
        .device
        .count_commands(|c| matches!(c, DeviceCommand::ClearDepthStencil { .. }));
    assert_eq!(
        depth_clears, 3,
        "texture depth is cleared on every switch, window depth only the first time"
    );
}

#[test]
fn test_pass_inactive_during_settings_change_rebinds_new_window() {
    let mut f = Fixture::new();
    let pass = f.pass("Main", &[RenderTarget::Window]);
    f.shape(pass, "Box", GeometryShape::Cube, 1);
    f.render();
    let old_output = f.engine.output().unwrap();

    let mut settings = f.engine.settings().clone();
    settings.msaa_samples = 4;
    f.engine.set_settings(settings);
    f.pass_mut(pass).active = false;
    f.render();
    assert_ne!(f.engine.output(), Some(old_output), "the window was reallocated");

    f.pass_mut(pass).active = true;
    f.device.clear_commands();
    let stats = f.render();
    assert_eq!(stats.draw_calls, 1);
    assert_eq!(stats.framebuffer_rebuilds, 1, "the skipped pass still rebuilds");

    let bound: Vec<_> = f
        .device
        .commands()
        .into_iter()
        .filter_map(|c| match c {
            DeviceCommand::BindFramebuffer(Some(fb)) => Some(fb),
            _ => None,
        })
        .collect();
    assert!(!bound.is_empty());
    for fb in bound {
        let desc = f.device.framebuffer(fb).expect("bound framebuffers are live");
        for texture in desc.color_attachments.iter().chain(desc.depth_stencil.iter()) {
            assert!(
                f.device.texture_size(*texture).is_some(),
                "'{}' attaches released texture {texture:?}",
                desc.label
            );
        }
    }
}

#[test]
fn test_pause_freezes_frames_and_compute() {
    let mut f = Fixture::with_files(&[("sim.comp", COMPUTE)]);
    f.pipeline.add(PipelineItem::new(
        "Sim",
        ItemKind::ComputePass(ComputePass::new(ShaderStageSource::new("sim.comp", "main"), [8, 8, 1])),
    ));

    assert_eq!(f.render().compute_dispatches, 1);
    assert_eq!(f.engine.frame_index(), 1);

    f.engine.pause(true);
    assert_eq!(f.render().compute_dispatches, 0);
    assert_eq!(f.engine.frame_index(), 1, "paused renders do not advance the frame");

    f.engine.pause(false);
    assert_eq!(f.render().compute_dispatches, 1);
    assert_eq!(f.engine.frame_index(), 2);
}

// ─────────────────────────────────────────────────────────────────────────────
// Recompilation and diagnostics
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_recompile_file_reports_then_clears_errors() {
    let mut f = Fixture::with_files(&[("main.vert", common::VERTEX)]);
    let pass = f.pass_with("Main", "main.vert", &[RenderTarget::Window]);
    f.shape(pass, "Box", GeometryShape::Cube, 1);
    f.render();
    assert!(!f.log.has_errors("Main"));

    std::fs::write(f.dir.path().join("main.vert"), "#version 330\n#error broken\nvoid main() {}\n").unwrap();
    let names = f.engine.recompile_file(&f.pipeline, "main.vert").unwrap();
    assert_eq!(names, vec!["Main".to_string()]);
    assert!(f.log.has_errors("Main"));
    assert_eq!(f.engine.last_stats().draw_calls, 0, "a failed pass does not draw");

    std::fs::write(f.dir.path().join("main.vert"), common::VERTEX).unwrap();
    f.engine.recompile(&f.pipeline, "Main").unwrap();
    let messages = f.log.group("Main");
    assert!(!f.log.has_errors("Main"), "the group is cleared before recompiling");
    assert!(messages
        .iter()
        .any(|m| m.severity == Severity::Message && m.text == "Compiled the shaders."));
    assert_eq!(f.engine.last_stats().draw_calls, 1);
}

#[test]
fn test_recompile_from_source_replaces_stages() {
    let mut f = Fixture::new();
    let pass = f.pass("Main", &[RenderTarget::Window]);
    f.shape(pass, "Box", GeometryShape::Cube, 1);
    f.render();

    f.engine
        .recompile_from_source(&f.pipeline, "Main", "", "#version 330\n#error nope\nvoid main() {}\n", "")
        .unwrap();
    assert!(f.log.has_errors("Main"));

    f.engine
        .recompile_from_source(&f.pipeline, "Main", "", common::PIXEL, "")
        .unwrap();
    assert!(!f.log.has_errors("Main"));
    assert_eq!(f.engine.last_stats().draw_calls, 1);
}

#[test]
fn test_recompile_reaches_every_item_sharing_a_name() {
    const BROKEN: &str = "#version 330\n#error broken\nvoid main() {}\n";
    let mut f = Fixture::with_files(&[("shared.vert", BROKEN)]);
    for drawable in [1, 2] {
        let pass = f.pass_with("Same", "shared.vert", &[RenderTarget::Window]);
        f.shape(pass, "Box", GeometryShape::Cube, drawable);
    }
    assert_eq!(f.render().draw_calls, 0);

    std::fs::write(f.dir.path().join("shared.vert"), common::VERTEX).unwrap();
    let names = f.engine.recompile_file(&f.pipeline, "shared.vert").unwrap();
    assert_eq!(names, vec!["Same".to_string(), "Same".to_string()]);
    assert_eq!(f.engine.last_stats().draw_calls, 2, "both passes were recompiled");

    std::fs::write(f.dir.path().join("shared.vert"), BROKEN).unwrap();
    f.engine.recompile(&f.pipeline, "Same").unwrap();
    assert_eq!(f.engine.last_stats().draw_calls, 0, "recompiling by name breaks both");
}

#[test]
fn test_recompile_unknown_item_fails() {
    let mut f = Fixture::new();
    let result = f.engine.recompile(&f.pipeline, "Missing");
    assert!(matches!(result, Err(EngineError::UnknownItem(name)) if name == "Missing"));

    f.pass("Fresh", &[RenderTarget::Window]);
    let result = f.engine.recompile(&f.pipeline, "Fresh");
    assert!(
        matches!(result, Err(EngineError::NotCached(_))),
        "an item the cache has not seen cannot be recompiled"
    );
}

#[test]
fn test_include_cycle_reports_single_error() {
    let mut f = Fixture::with_files(&[
        ("a.glsl", "#include \"b.glsl\"\nfloat a() { return 1.0; }\n"),
        ("b.glsl", "#include \"a.glsl\"\nfloat b() { return 2.0; }\n"),
        ("cyclic.vert", "#version 330\n#include \"a.glsl\"\nvoid main() {}\n"),
    ]);
    let pass = f.pass_with("Cyclic", "cyclic.vert", &[RenderTarget::Window]);
    f.shape(pass, "Box", GeometryShape::Cube, 1);

    f.render();

    let recursion: Vec<_> = f
        .log
        .group("Cyclic")
        .into_iter()
        .filter(|m| m.severity == Severity::Error && m.text.contains("Recursive #include"))
        .collect();
    assert_eq!(recursion.len(), 1, "one error per cycle entry: {recursion:?}");
}
