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

//! Pick lane - resolving screen-space queries to pipeline items.
//!
//! Two strategies live here. Ray picking intersects a world-space ray with
//! each drawn item's analytic shape on the CPU. Identity picking renders
//! every pickable draw in a unique color and decodes read-back pixels; the
//! engine drives the renders, this lane provides the encoding, the shader
//! patching and the selection bookkeeping.

mod error;
mod identity;
mod patch;
mod ray_pick;
mod selection;

pub use error::*;
pub use identity::*;
pub use patch::*;
pub use ray_pick::*;
pub use selection::*;
