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

//! Errors of the index-pick path.

use kiln_core::pipeline::ItemKey;
use kiln_core::renderer::{ResourceError, ShaderError};
use thiserror::Error;

/// Why a vertex or instance pick could not produce an index.
#[derive(Debug, Error)]
pub enum PickError {
    /// The key is not in the pipeline.
    #[error("Pipeline item {0:?} does not exist")]
    UnknownItem(ItemKey),
    /// Index picks read back a shader pass's targets.
    #[error("Pipeline item '{0}' is not a shader pass")]
    NotAShaderPass(String),
    /// The pass has no targets or its framebuffers could not be built.
    #[error("Shader pass '{0}' has no framebuffer to pick from")]
    NoFramebuffer(String),
    /// The patched vertex stage failed to load, compile or link.
    #[error(transparent)]
    Shader(#[from] ShaderError),
    /// Readback failed.
    #[error(transparent)]
    Resource(#[from] ResourceError),
}
