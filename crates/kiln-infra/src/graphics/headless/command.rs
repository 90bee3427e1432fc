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

//! The command log recorded by [`super::HeadlessDevice`].

use kiln_core::math::LinearRgba;
use kiln_core::renderer::{
    BufferId, DrawCall, DrawableId, FramebufferId, MemoryBarrier, ProgramId, RenderStateDescriptor,
    TextureBinding, TextureId, UniformValue,
};

/// One state-changing or work-issuing call made on the device, in call order.
///
/// Resource creation and destruction are not logged; the device exposes
/// live-resource counts for those instead.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCommand {
    BindFramebuffer(Option<FramebufferId>),
    SetDrawBuffers(u32),
    SetViewport(u32, u32),
    ClearColor {
        framebuffer: Option<FramebufferId>,
        index: u32,
        color: LinearRgba,
    },
    ClearDepthStencil {
        framebuffer: Option<FramebufferId>,
    },
    UseProgram(ProgramId),
    SetUniform {
        program: ProgramId,
        name: String,
        value: UniformValue,
    },
    BindTexture {
        unit: u32,
        texture: TextureId,
        binding: TextureBinding,
    },
    BindUniformBuffer {
        slot: u32,
        buffer: BufferId,
    },
    BindStorageBuffer {
        slot: u32,
        buffer: BufferId,
    },
    BindImage {
        slot: u32,
        texture: TextureId,
        layered: bool,
    },
    ApplyRenderState(RenderStateDescriptor),
    SetMultisample(bool),
    Draw {
        framebuffer: Option<FramebufferId>,
        drawable: DrawableId,
        call: DrawCall,
    },
    DispatchCompute([u32; 3]),
    MemoryBarrier(MemoryBarrier),
    Resolve {
        source: FramebufferId,
        destination: FramebufferId,
        index: u32,
    },
}

impl DeviceCommand {
    /// Whether the command issues GPU work rather than changing state.
    pub fn is_work(&self) -> bool {
        matches!(
            self,
            DeviceCommand::ClearColor { .. }
                | DeviceCommand::ClearDepthStencil { .. }
                | DeviceCommand::Draw { .. }
                | DeviceCommand::DispatchCompute(_)
                | DeviceCommand::Resolve { .. }
        )
    }
}
