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

//! Render lane - the hot path of every frame.
//!
//! The [`ResourceCache`] mirrors the pipeline with compiled programs, the
//! [`FramebufferManager`] keeps each shader pass's framebuffers in step with
//! its targets and the [`FrameExecutor`] walks both to issue the frame.

mod binding;
mod cache;
mod executor;
mod framebuffer;
mod window;

pub use binding::*;
pub use cache::*;
pub use executor::*;
pub use framebuffer::*;
pub use window::*;
