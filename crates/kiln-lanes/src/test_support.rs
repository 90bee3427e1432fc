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

//! Shared fixtures for the lane tests.

use crate::RenderServices;
use kiln_core::project::{ShaderSource, TranscompileRequest};
use kiln_core::renderer::ShaderError;
use kiln_infra::{HeadlessDevice, MessageLog, ProjectObjects};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Shader files kept in memory. Non-GLSL files "transcompile" to a trivial
/// GLSL stage unless they contain `#error`.
#[derive(Debug, Default)]
pub struct MemorySources {
    files: Mutex<HashMap<String, String>>,
}

impl MemorySources {
    pub fn new(files: &[(&str, &str)]) -> Self {
        let files = files
            .iter()
            .map(|(path, text)| (path.to_string(), text.to_string()))
            .collect();
        Self {
            files: Mutex::new(files),
        }
    }

    pub fn set(&self, path: &str, text: &str) {
        self.files.lock().unwrap().insert(path.to_string(), text.to_string());
    }
}

impl ShaderSource for MemorySources {
    fn load_project_file(&self, path: &str) -> Result<String, ShaderError> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| ShaderError::LoadError {
                path: path.to_string(),
                source_error: "no such file".to_string(),
            })
    }

    fn file_exists(&self, path: &str) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    fn project_path(&self, path: &str) -> String {
        path.to_string()
    }

    fn transcompile(&self, request: &TranscompileRequest<'_>) -> Result<String, ShaderError> {
        let text = self.load_project_file(request.path)?;
        if text.contains("#error") {
            return Err(ShaderError::CompilationError {
                label: request.path.to_string(),
                stage: request.stage,
                log: "translation failed".to_string(),
            });
        }
        Ok(format!("#version 330\n// {}\nvoid main() {{}}\n", request.entry))
    }
}

/// A headless device with in-memory project collaborators.
pub struct Harness {
    pub device: HeadlessDevice,
    pub objects: Arc<ProjectObjects>,
    pub sources: Arc<MemorySources>,
    pub log: Arc<MessageLog>,
    pub services: RenderServices,
}

impl Harness {
    pub fn new(files: &[(&str, &str)]) -> Self {
        let device = HeadlessDevice::new();
        let objects = Arc::new(ProjectObjects::new(Arc::new(device.clone()), 4));
        let sources = Arc::new(MemorySources::new(files));
        let log = Arc::new(MessageLog::new());
        let services = RenderServices::new(
            Arc::new(device.clone()),
            objects.clone(),
            sources.clone(),
            log.clone(),
        );
        Self {
            device,
            objects,
            sources,
            log,
            services,
        }
    }
}

pub const SIMPLE_VS: &str = "#version 330\nlayout(location = 0) in vec3 pos;\nvoid main()\n{\n\tgl_Position = vec4(pos, 1.0);\n}\n";
pub const SIMPLE_PS: &str = "#version 330\nout vec4 color;\nvoid main()\n{\n\tcolor = vec4(1.0);\n}\n";
