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

//! Turning a stage reference into a compiled module, with diagnostics.
//!
//! Native GLSL is loaded, include-expanded and macro-injected here. Every
//! other language goes through the transcompiler of the shader source
//! layer and reaches the device as generated GLSL.

use super::preprocess::{inject_macros, IncludeExpander};
use crate::RenderServices;
use kiln_core::diagnostics::{parse_compiler_log, Message, Severity};
use kiln_core::pipeline::ShaderStageSource;
use kiln_core::project::TranscompileRequest;
use kiln_core::renderer::{ProgramId, ShaderError, ShaderMacro, ShaderModuleDescriptor, ShaderModuleId, ShaderStage};

/// Final text of a stage, ready for the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedStage {
    /// The stage text.
    pub source: String,
    /// Lines added in front of user code.
    pub line_bias: u32,
    /// Whether the file was native GLSL. Only native logs are line-corrected.
    pub native: bool,
}

/// Loads, compiles and links the stages of one pipeline item.
///
/// Every failure is pushed to the message sink under `group` and logged;
/// callers only see `None`.
#[derive(Debug)]
pub struct StageCompiler<'a> {
    services: &'a RenderServices,
    include_paths: &'a [String],
    group: &'a str,
}

impl<'a> StageCompiler<'a> {
    /// Creates a compiler reporting to `group`, usually the item's name.
    pub fn new(services: &'a RenderServices, include_paths: &'a [String], group: &'a str) -> Self {
        Self {
            services,
            include_paths,
            group,
        }
    }

    /// Produces the final text of a stage.
    ///
    /// Include problems are reported to the sink but do not fail the load.
    pub fn load(
        &self,
        stage: ShaderStage,
        source: &ShaderStageSource,
        macros: &[ShaderMacro],
        gs_used: bool,
    ) -> Result<LoadedStage, ShaderError> {
        let sources = self.services.sources.as_ref();
        let language = sources.language_of(&source.path);

        if !language.is_native() {
            let text = sources.transcompile(&TranscompileRequest {
                language,
                path: &source.path,
                stage,
                entry: &source.entry,
                macros,
                gs_used,
            })?;
            return Ok(LoadedStage {
                source: text,
                line_bias: 0,
                native: false,
            });
        }

        let raw = sources.load_project_file(&source.path)?;
        let expanded = IncludeExpander::new(sources, self.include_paths).expand(&raw);
        for problem in &expanded.problems {
            self.report(Severity::Error, problem.to_string(), Some(stage));
        }
        let (text, injected) = inject_macros(&expanded.source, macros);
        Ok(LoadedStage {
            source: text,
            line_bias: expanded.line_bias + injected,
            native: true,
        })
    }

    /// Loads and compiles one stage.
    pub fn compile(
        &self,
        stage: ShaderStage,
        source: &ShaderStageSource,
        macros: &[ShaderMacro],
        gs_used: bool,
    ) -> Option<ShaderModuleId> {
        match self.load(stage, source, macros, gs_used) {
            Ok(loaded) => self.compile_text(stage, &loaded.source, loaded.line_bias, loaded.native),
            Err(e) => {
                log::error!("Failed to load {} stage of '{}': {e}", stage.name(), self.group);
                self.report(Severity::Error, e.to_string(), Some(stage));
                None
            }
        }
    }

    /// Compiles already-final text.
    ///
    /// ## Arguments
    /// * `line_bias` - Subtracted from log line numbers when `parse_log` is set.
    /// * `parse_log` - Whether the compiler log refers to user lines at all.
    pub fn compile_text(
        &self,
        stage: ShaderStage,
        text: &str,
        line_bias: u32,
        parse_log: bool,
    ) -> Option<ShaderModuleId> {
        let descriptor = ShaderModuleDescriptor {
            label: self.group,
            stage,
            source: text,
        };
        match self.services.device.compile_shader(&descriptor) {
            Ok(id) => Some(id),
            Err(ShaderError::CompilationError { log, .. }) => {
                log::error!("{} stage of '{}' failed to compile", stage.name(), self.group);
                if parse_log {
                    self.services
                        .messages
                        .add_all(parse_compiler_log(self.group, stage, &log, line_bias));
                } else {
                    self.report(Severity::Error, log, Some(stage));
                }
                None
            }
            Err(e) => {
                log::error!("{} stage of '{}' failed: {e}", stage.name(), self.group);
                self.report(Severity::Error, e.to_string(), Some(stage));
                None
            }
        }
    }

    /// Links compiled stages into a program.
    pub fn link(&self, stages: &[ShaderModuleId]) -> Option<ProgramId> {
        match self.services.device.link_program(self.group, stages) {
            Ok(program) => Some(program),
            Err(e) => {
                log::error!("Failed to link '{}': {e}", self.group);
                self.report(Severity::Error, e.to_string(), None);
                None
            }
        }
    }

    /// Pushes a message to this compiler's group.
    pub fn report(&self, severity: Severity, text: impl Into<String>, stage: Option<ShaderStage>) {
        let mut message = Message::new(severity, self.group, text);
        message.stage = stage;
        self.services.messages.add(message);
    }

    /// Drops every message of this compiler's group.
    pub fn clear_messages(&self) {
        self.services.messages.clear_group(self.group);
    }
}

/// Destroys a shader module, logging instead of failing.
pub fn release_module(services: &RenderServices, module: ShaderModuleId) {
    if let Err(e) = services.device.destroy_shader(module) {
        log::warn!("Failed to destroy shader module {module:?}: {e}");
    }
}

/// Destroys a program, logging instead of failing.
pub fn release_program(services: &RenderServices, program: ProgramId) {
    if let Err(e) = services.device.destroy_program(program) {
        log::warn!("Failed to destroy program {program:?}: {e}");
    }
}
