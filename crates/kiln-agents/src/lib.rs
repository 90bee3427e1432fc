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

//! # Kiln Agents
//!
//! The orchestration layer on top of `kiln-lanes`. Lanes are stateless hot
//! paths; the [`RenderEngine`] keeps the state between frames and exposes
//! the operations an editor drives: rendering, recompilation, picking and
//! pixel debugging.

#![warn(missing_docs)]

pub mod render_agent;

pub use render_agent::{EngineError, PixelInformation, RenderEngine};
