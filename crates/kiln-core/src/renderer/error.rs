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

//! Defines the hierarchy of error types for the rendering subsystem.

use crate::renderer::api::{ShaderStage, TextureId};
use std::fmt;

/// An error related to the loading, compilation or linking of shader code.
#[derive(Debug, Clone)]
pub enum ShaderError {
    /// An error occurred while trying to load the shader source from a path.
    LoadError {
        /// The path of the file that failed to load.
        path: String,
        /// The underlying I/O or source error.
        source_error: String,
    },
    /// A single stage failed to compile.
    CompilationError {
        /// A descriptive label for the shader, usually the owning item's name.
        label: String,
        /// The stage that failed.
        stage: ShaderStage,
        /// The raw compiler log, to be parsed into diagnostics.
        log: String,
    },
    /// The stages compiled but could not be linked into a program.
    LinkError {
        /// A descriptive label for the program.
        label: String,
        /// The raw linker log.
        log: String,
    },
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderError::LoadError { path, source_error } => {
                write!(
                    f,
                    "Failed to load shader source from '{path}': {source_error}"
                )
            }
            ShaderError::CompilationError { label, stage, log } => {
                write!(
                    f,
                    "Shader compilation failed for '{label}' ({} stage): {log}",
                    stage.name()
                )
            }
            ShaderError::LinkError { label, log } => {
                write!(f, "Program link failed for '{label}': {log}")
            }
        }
    }
}

impl std::error::Error for ShaderError {}

/// An error related to the creation or use of a GPU resource.
#[derive(Debug, Clone)]
pub enum ResourceError {
    /// A shader-specific error occurred.
    Shader(ShaderError),
    /// A generic resource could not be found.
    NotFound,
    /// The handle or ID used to reference a resource is invalid.
    InvalidHandle,
    /// A framebuffer was assembled but the backend reports it incomplete.
    IncompleteFramebuffer {
        /// The label of the framebuffer.
        label: String,
    },
    /// A render target is referenced but the object layer knows nothing about it.
    UnknownRenderTarget(TextureId),
    /// An error originating from the specific graphics backend implementation.
    BackendError(String),
    /// An attempt was made to access a resource out of its bounds (e.g., a pixel readback).
    OutOfBounds,
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::Shader(err) => write!(f, "Shader resource error: {err}"),
            ResourceError::NotFound => write!(f, "Resource not found with ID."),
            ResourceError::InvalidHandle => write!(f, "Invalid resource handle or ID."),
            ResourceError::IncompleteFramebuffer { label } => {
                write!(f, "Framebuffer '{label}' is incomplete")
            }
            ResourceError::UnknownRenderTarget(id) => {
                write!(f, "Render target {id:?} is not a known render texture")
            }
            ResourceError::BackendError(msg) => {
                write!(f, "Backend-specific resource error: {msg}")
            }
            ResourceError::OutOfBounds => {
                write!(f, "Resource access out of bounds.")
            }
        }
    }
}

impl std::error::Error for ResourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResourceError::Shader(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ShaderError> for ResourceError {
    fn from(err: ShaderError) -> Self {
        ResourceError::Shader(err)
    }
}

/// A high-level error raised by the engine's public operations.
///
/// Per-item failures (compile errors, missing includes) never surface here;
/// they degrade that one item and are reported to the message sink.
#[derive(Debug)]
pub enum RenderError {
    /// No cached pipeline item carries the requested name.
    UnknownItem(String),
    /// The item exists but is not of the kind the operation needs.
    WrongItemKind {
        /// The item's name.
        name: String,
        /// What the operation expected.
        expected: &'static str,
    },
    /// An error occurred while managing a GPU resource.
    ResourceError(ResourceError),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::UnknownItem(name) => {
                write!(f, "No cached pipeline item named '{name}'")
            }
            RenderError::WrongItemKind { name, expected } => {
                write!(f, "Pipeline item '{name}' is not a {expected}")
            }
            RenderError::ResourceError(err) => {
                write!(f, "Graphics resource operation failed: {err}")
            }
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::ResourceError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ResourceError> for RenderError {
    fn from(err: ResourceError) -> Self {
        RenderError::ResourceError(err)
    }
}

impl From<ShaderError> for RenderError {
    fn from(err: ShaderError) -> Self {
        RenderError::ResourceError(err.into())
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn shader_error_display() {
        let err = ShaderError::LoadError {
            path: "shaders/simple.vert".to_string(),
            source_error: "File not found".to_string(),
        };
        assert_eq!(
            format!("{err}"),
            "Failed to load shader source from 'shaders/simple.vert': File not found"
        );

        let err_comp = ShaderError::CompilationError {
            label: "Simple".to_string(),
            stage: ShaderStage::Pixel,
            log: "0(5) : error C0000: syntax error".to_string(),
        };
        assert_eq!(
            format!("{err_comp}"),
            "Shader compilation failed for 'Simple' (pixel stage): 0(5) : error C0000: syntax error"
        );
    }

    #[test]
    fn render_error_display_wrapping_resource_error() {
        let shader_err = ShaderError::LinkError {
            label: "Simple".to_string(),
            log: "missing main".to_string(),
        };
        let render_err: RenderError = shader_err.into();
        assert_eq!(
            format!("{render_err}"),
            "Graphics resource operation failed: Shader resource error: Program link failed for 'Simple': missing main"
        );
        assert!(render_err.source().is_some());
        assert!(render_err.source().unwrap().source().is_some());
    }
}
