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

//! Parameters of individual GPU commands.

use super::PrimitiveTopology;
use std::ops::BitOr;

/// A non-indexed, possibly instanced draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DrawCall {
    /// How vertices form primitives.
    pub topology: PrimitiveTopology,
    /// First vertex to fetch.
    pub first_vertex: u32,
    /// Number of vertices to fetch.
    pub vertex_count: u32,
    /// Number of instances; `1` for a plain draw.
    pub instance_count: u32,
}

/// Classes of memory writes a barrier makes visible to later commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemoryBarrier(u32);

impl MemoryBarrier {
    /// Vertex attribute fetches from buffers written by shaders.
    pub const VERTEX_ATTRIBUTE: Self = Self(1 << 0);
    /// Uniform buffer reads.
    pub const UNIFORM: Self = Self(1 << 1);
    /// Shader storage buffer access.
    pub const STORAGE_BUFFER: Self = Self(1 << 2);
    /// Image load/store access.
    pub const SHADER_IMAGE: Self = Self(1 << 3);
    /// Everything a compute dispatch can write and a later pass can read.
    pub const COMPUTE_WRITES: Self = Self(
        Self::VERTEX_ATTRIBUTE.0 | Self::UNIFORM.0 | Self::STORAGE_BUFFER.0 | Self::SHADER_IMAGE.0,
    );

    /// Raw bit representation.
    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Whether every bit of `other` is set in `self`.
    pub const fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for MemoryBarrier {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}
