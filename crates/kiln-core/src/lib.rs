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

//! # Kiln Core
//!
//! Foundational crate containing the traits, core types and interface contracts
//! of the render-pipeline executor. Nothing in here talks to a real GPU: the
//! lanes and the engine only ever see the [`renderer::GraphicsDevice`] contract
//! and the collaborator traits in [`project`], [`plugin`] and [`audio`].

#![warn(missing_docs)]

pub mod audio;
pub mod context;
pub mod diagnostics;
pub mod math;
pub mod pipeline;
pub mod plugin;
pub mod project;
pub mod renderer;
pub mod settings;

pub use context::{Camera, FrameContext};
pub use settings::RenderSettings;
