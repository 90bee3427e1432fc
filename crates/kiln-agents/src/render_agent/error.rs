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

//! Errors surfaced by the [`RenderEngine`](super::RenderEngine).

use kiln_core::renderer::ResourceError;
use kiln_lanes::pick_lane::PickError;
use thiserror::Error;

/// Failures of engine-level operations.
///
/// Shader problems are not errors here: they are reported to the message
/// sink and leave the item without a program.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No pipeline item has this name.
    #[error("No pipeline item named '{0}'")]
    UnknownItem(String),
    /// The item exists but the cache has not seen it yet.
    #[error("Pipeline item '{0}' has not been cached yet")]
    NotCached(String),
    /// The operation needs a frame rendered first.
    #[error("Nothing has been rendered yet")]
    NotRendered,
    /// Allocating the window targets failed.
    #[error("Window target allocation failed: {0}")]
    Resource(#[from] ResourceError),
    /// A vertex or instance pick failed.
    #[error(transparent)]
    Pick(#[from] PickError),
}
