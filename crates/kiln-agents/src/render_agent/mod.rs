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

//! Acts as the **[A]gent** of the executor: the one stateful object that
//! decides when each lane runs.
//!
//! The [`RenderEngine`] owns the resource cache, the framebuffers, the
//! window targets, the selection and the frame clock. Callers hand it the
//! authoritative [`Pipeline`](kiln_core::pipeline::Pipeline) on every call
//! and it brings its derived state in line before doing any work.

mod engine;
mod error;
mod pixel;

pub use engine::*;
pub use error::*;
pub use pixel::*;
