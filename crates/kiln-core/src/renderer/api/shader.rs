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

//! Shader stages, source languages and module descriptors.

use serde::{Deserialize, Serialize};

/// A programmable pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShaderStage {
    /// Vertex stage.
    Vertex,
    /// Pixel (fragment) stage.
    Pixel,
    /// Geometry stage.
    Geometry,
    /// Compute stage.
    Compute,
}

impl ShaderStage {
    /// Lowercase, human-readable stage name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Pixel => "pixel",
            ShaderStage::Geometry => "geometry",
            ShaderStage::Compute => "compute",
        }
    }
}

/// The language a shader source file is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShaderLanguage {
    /// OpenGL GLSL, compiled as-is after preprocessing.
    Glsl,
    /// HLSL, transcompiled to GLSL before compilation.
    Hlsl,
    /// Vulkan-flavoured GLSL, transcompiled to GLSL before compilation.
    VulkanGlsl,
}

impl ShaderLanguage {
    /// Whether sources in this language go straight to the device compiler.
    ///
    /// Only native sources get include expansion, macro injection and
    /// line-corrected diagnostics; the transcompiler handles the rest.
    pub fn is_native(&self) -> bool {
        matches!(self, ShaderLanguage::Glsl)
    }
}

/// A preprocessor definition attached to a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderMacro {
    /// Macro name.
    pub name: String,
    /// Replacement text. May be empty.
    pub value: String,
    /// Inactive macros are kept on the pass but never injected.
    pub active: bool,
}

impl ShaderMacro {
    /// Creates an active macro.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            active: true,
        }
    }
}

/// Describes one shader stage to hand to the device compiler.
#[derive(Debug, Clone, Copy)]
pub struct ShaderModuleDescriptor<'a> {
    /// A debug label, typically the owning item's name.
    pub label: &'a str,
    /// The stage this source implements.
    pub stage: ShaderStage,
    /// Final, fully preprocessed source text.
    pub source: &'a str,
}
