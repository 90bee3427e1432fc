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

//! # Kiln Lanes
//!
//! The hot paths of the render-pipeline executor. Lanes are deterministic
//! and carry no engine-level policy: the engine in `kiln-agents` owns the
//! state and decides when each lane runs.
//!
//! - **[`shader_lane`]**: include expansion, macro injection, stage compilation.
//! - **[`render_lane`]**: the resource cache, per-pass framebuffers and the frame executor.
//! - **[`pick_lane`]**: ray picking, the selection set and identity-encoded debug picking.

#![warn(missing_docs)]

pub mod pick_lane;
pub mod render_lane;
pub mod shader_lane;

mod services;
#[cfg(test)]
mod test_support;

pub use services::RenderServices;
