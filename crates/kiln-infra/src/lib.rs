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

//! Concrete implementations of the `kiln-core` collaborator traits.
//!
//! - [`HeadlessDevice`]: a [`GraphicsDevice`](kiln_core::renderer::GraphicsDevice)
//!   that records commands and simulates render targets on the CPU.
//! - [`ProjectFiles`]: shader sources read from a project directory.
//! - [`ProjectObjects`]: textures, buffers and render textures with per-pass bind lists.
//! - [`MessageLog`]: an in-memory message sink.

pub mod diagnostics;
pub mod graphics;
pub mod project;

pub use diagnostics::MessageLog;
pub use graphics::{Coverage, DeviceCommand, HeadlessDevice};
pub use project::{ProjectFiles, ProjectObjects, Transcompiler};
