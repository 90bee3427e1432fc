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

//! Source patching for vertex and instance picking.
//!
//! The user's vertex stage is rewritten to copy a built-in index into a
//! flat varying, and linked against a pixel shader that encodes that
//! varying like an identity color.

use kiln_core::renderer::api::debug::{
    INSTANCE_ID_VARYING, INSTANCE_PICK_PIXEL_SHADER, VERTEX_ID_VARYING, VERTEX_PICK_PIXEL_SHADER,
};

/// Which built-in index a pick recovers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexPick {
    /// `gl_VertexID`.
    Vertex,
    /// `gl_InstanceID`.
    Instance,
}

impl IndexPick {
    /// Name of the flat varying carrying the index.
    pub fn varying(&self) -> &'static str {
        match self {
            IndexPick::Vertex => VERTEX_ID_VARYING,
            IndexPick::Instance => INSTANCE_ID_VARYING,
        }
    }

    /// The GLSL built-in being forwarded.
    pub fn builtin(&self) -> &'static str {
        match self {
            IndexPick::Vertex => "gl_VertexID",
            IndexPick::Instance => "gl_InstanceID",
        }
    }

    /// The pixel shader that encodes the varying.
    pub fn pixel_shader(&self) -> &'static str {
        match self {
            IndexPick::Vertex => VERTEX_PICK_PIXEL_SHADER,
            IndexPick::Instance => INSTANCE_PICK_PIXEL_SHADER,
        }
    }
}

/// Rewrites a final GLSL vertex stage to forward the picked index.
///
/// The assignment goes right after the opening brace of the first `main(`
/// that follows whitespace. The varying declaration goes at the end of the
/// `#version` line. A source without either anchor is left untouched in
/// that respect; the link then simply fails to produce the index.
pub fn patch_vertex_source(source: &str, pick: IndexPick) -> String {
    let mut text = source.to_string();

    if let Some(brace) = find_main_body(&text) {
        text.insert_str(brace + 1, &format!("\n{} = {};\n", pick.varying(), pick.builtin()));
    } else {
        log::warn!("No main() found while patching a vertex shader for picking");
    }

    let version_end = text
        .find("#version")
        .and_then(|v| text[v..].find('\n').map(|e| v + e));
    if let Some(at) = version_end {
        text.insert_str(at, &format!("\nflat out int {};\n", pick.varying()));
    }
    text
}

fn find_main_body(text: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(found) = text[from..].find("main(") {
        let pos = from + found;
        let preceded_by_space = text[..pos]
            .chars()
            .next_back()
            .is_some_and(char::is_whitespace);
        if preceded_by_space {
            return text[pos..].find('{').map(|b| pos + b);
        }
        from = pos + 1;
    }
    None
}
