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

//! A filesystem-backed [`ShaderSource`].

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use kiln_core::project::{ShaderSource, TranscompileRequest};
use kiln_core::renderer::ShaderError;

/// Translates a non-GLSL source into GLSL. Receives the request and the
/// loaded source text.
pub type Transcompiler =
    Box<dyn Fn(&TranscompileRequest<'_>, &str) -> anyhow::Result<String> + Send + Sync>;

/// Serves shader files from a project directory.
///
/// Relative paths resolve against the project root; absolute paths are
/// used as-is. Without an installed [`Transcompiler`], non-GLSL sources
/// fail to compile.
pub struct ProjectFiles {
    root: PathBuf,
    transcompiler: Option<Transcompiler>,
}

impl fmt::Debug for ProjectFiles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectFiles")
            .field("root", &self.root)
            .field("transcompiler", &self.transcompiler.is_some())
            .finish()
    }
}

impl ProjectFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            transcompiler: None,
        }
    }

    /// Installs the translator used for HLSL and Vulkan GLSL sources.
    pub fn with_transcompiler(mut self, transcompiler: Transcompiler) -> Self {
        self.transcompiler = Some(transcompiler);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn read(&self, path: &str) -> anyhow::Result<String> {
        let full = self.resolve(path);
        fs::read_to_string(&full).with_context(|| format!("reading '{}'", full.display()))
    }
}

impl ShaderSource for ProjectFiles {
    fn load_project_file(&self, path: &str) -> Result<String, ShaderError> {
        self.read(path).map_err(|e| ShaderError::LoadError {
            path: path.to_string(),
            source_error: format!("{e:#}"),
        })
    }

    fn file_exists(&self, path: &str) -> bool {
        self.resolve(path).is_file()
    }

    fn project_path(&self, path: &str) -> String {
        self.resolve(path).to_string_lossy().into_owned()
    }

    fn transcompile(&self, request: &TranscompileRequest<'_>) -> Result<String, ShaderError> {
        let failure = |log: String| ShaderError::CompilationError {
            label: request.path.to_string(),
            stage: request.stage,
            log,
        };
        let Some(transcompiler) = &self.transcompiler else {
            log::warn!(
                "No transcompiler installed, cannot translate {:?} source '{}'",
                request.language,
                request.path
            );
            return Err(failure(format!(
                "no transcompiler available for {:?}",
                request.language
            )));
        };

        let source = self
            .read(request.path)
            .map_err(|e| failure(format!("{e:#}")))?;
        transcompiler(request, &source)
            .with_context(|| format!("translating '{}' ({})", request.path, request.entry))
            .map_err(|e| failure(format!("{e:#}")))
    }
}
