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

//! Audio stream interface used by audio passes.

use crate::diagnostics::MessageSink;
use crate::renderer::{ProgramId, ShaderError, ShaderMacro};
use std::fmt::Debug;

/// A stream whose samples are produced by a shader.
pub trait AudioStream: Send + Sync + Debug {
    /// Compiles the audio program from preprocessed source.
    /// ## Arguments
    /// * `group` - Message group (the owning item's name) for diagnostics.
    /// * `source` - Source text with macros already injected for native sources.
    /// * `macros` - The pass's macros, for transcompiled sources.
    /// * `is_hlsl` - Whether `source` is HLSL.
    /// ## Errors
    /// * `ShaderError::CompilationError` - If the program does not compile.
    fn compile_from_source(
        &self,
        sink: &dyn MessageSink,
        group: &str,
        source: &str,
        macros: &[ShaderMacro],
        is_hlsl: bool,
    ) -> Result<(), ShaderError>;

    /// The compiled program, if any.
    fn program(&self) -> Option<ProgramId>;

    /// Renders the next block of samples with the currently bound resources.
    fn render_audio(&self);
}
