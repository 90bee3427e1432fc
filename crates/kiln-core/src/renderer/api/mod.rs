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

//! Backend-agnostic rendering API types.
//!
//! - **[`handles`]**: Opaque typed handles for GPU and object-layer resources.
//! - **[`texture`]** / **[`framebuffer`]**: Render target descriptors.
//! - **[`shader`]**: Stages, languages, macros and module descriptors.
//! - **[`state`]**: Rasterizer, blend, depth and stencil configuration.
//! - **[`command`]**: Draw and dispatch parameters, memory barriers.
//! - **[`uniform`]**: Values uploaded to program uniforms.
//! - **[`debug`]**: Built-in shaders and names of the identity-encoding path.

pub mod command;
pub mod debug;
pub mod framebuffer;
pub mod handles;
pub mod shader;
pub mod state;
pub mod texture;
pub mod uniform;

pub use self::command::*;
pub use self::framebuffer::*;
pub use self::handles::*;
pub use self::shader::*;
pub use self::state::*;
pub use self::texture::*;
pub use self::uniform::*;
