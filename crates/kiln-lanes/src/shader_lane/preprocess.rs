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

//! Textual preprocessing of native shader sources.
//!
//! Two passes run before a native stage reaches the compiler: `#include`
//! expansion and macro injection. Both shift line numbers, so both report
//! how many lines they added. Compiler logs are corrected by that amount.

use kiln_core::project::ShaderSource;
use kiln_core::renderer::ShaderMacro;
use thiserror::Error;

const INCLUDE_DIRECTIVE: &str = "#include";

/// A problem found while expanding includes. Expansion never aborts on one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreprocessError {
    /// A file includes itself, directly or through other files.
    #[error("Recursive #include detected")]
    RecursiveInclude {
        /// The candidate path that was already being expanded.
        path: String,
    },
    /// The file exists but could not be read.
    #[error("Failed to load included file '{path}': {reason}")]
    IncludeLoad {
        /// The candidate path.
        path: String,
        /// Why loading failed.
        reason: String,
    },
}

/// The result of include expansion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preprocessed {
    /// The expanded source text.
    pub source: String,
    /// Lines added in front of user code, used to correct compiler line numbers.
    pub line_bias: u32,
    /// Problems encountered, in discovery order.
    pub problems: Vec<PreprocessError>,
}

/// Expands `#include` directives against a list of include roots.
///
/// A directive only counts when it starts a line. The file name sits
/// between `"` or `<` and the matching closing character. Roots are tried
/// in order, the project directory last; the first existing candidate wins.
/// Missing includes are dropped silently.
#[derive(Debug)]
pub struct IncludeExpander<'a> {
    sources: &'a dyn ShaderSource,
    roots: Vec<String>,
}

impl<'a> IncludeExpander<'a> {
    /// Creates an expander searching `include_paths` and then the project directory.
    pub fn new(sources: &'a dyn ShaderSource, include_paths: &[String]) -> Self {
        let roots = include_paths
            .iter()
            .cloned()
            .chain(std::iter::once(".".to_string()))
            .collect();
        Self { sources, roots }
    }

    /// Expands every include of `source`, recursively.
    pub fn expand(&self, source: &str) -> Preprocessed {
        let mut out = Preprocessed::default();
        let mut stack = Vec::new();
        out.source = self.expand_into(source, &mut stack, &mut out);
        out
    }

    fn expand_into(&self, source: &str, stack: &mut Vec<String>, out: &mut Preprocessed) -> String {
        let mut text = source.to_string();
        let mut cursor = 0;

        while let Some(found) = text[cursor..].find(INCLUDE_DIRECTIVE) {
            let pos = cursor + found;
            if pos != 0 && text.as_bytes()[pos - 1] != b'\n' {
                cursor = pos + 1;
                continue;
            }

            let line_end = text[pos..].find('\n').map_or(text.len(), |e| pos + e);
            let name = include_name(&text[pos..line_end]).map(str::to_string);
            text.replace_range(pos..line_end, "");

            let expanded = name
                .and_then(|name| self.resolve(&name, stack, out))
                .unwrap_or_default();
            text.insert_str(pos, &expanded);
            cursor = pos + expanded.len();
        }

        text
    }

    fn resolve(&self, name: &str, stack: &mut Vec<String>, out: &mut Preprocessed) -> Option<String> {
        for root in &self.roots {
            let candidate = join_root(root, name);

            if stack.contains(&candidate) {
                log::warn!("Recursive #include of '{candidate}'");
                out.problems.push(PreprocessError::RecursiveInclude { path: candidate });
                return None;
            }
            if !self.sources.file_exists(&candidate) {
                continue;
            }

            return match self.sources.load_project_file(&candidate) {
                Ok(loaded) => {
                    out.line_bias += loaded.matches('\n').count() as u32;
                    stack.push(candidate);
                    let expanded = self.expand_into(&loaded, stack, out);
                    stack.pop();
                    Some(expanded)
                }
                Err(e) => {
                    out.problems.push(PreprocessError::IncludeLoad {
                        path: candidate,
                        reason: e.to_string(),
                    });
                    None
                }
            };
        }
        log::trace!("Skipping missing include '{name}'");
        None
    }
}

fn include_name(directive: &str) -> Option<&str> {
    let start = directive.find(['"', '<'])? + 1;
    let len = directive[start..].find(['"', '>'])?;
    Some(&directive[start..start + len])
}

fn join_root(root: &str, name: &str) -> String {
    if root.ends_with('/') || root.ends_with('\\') {
        format!("{root}{name}")
    } else {
        format!("{root}/{name}")
    }
}

/// Injects `#define NAME VALUE` lines for every active macro.
///
/// The defines go right after the `#version` line, or at the very top when
/// there is none.
///
/// ## Returns
/// The new source and the number of lines injected.
pub fn inject_macros(source: &str, macros: &[ShaderMacro]) -> (String, u32) {
    let defines: String = macros
        .iter()
        .filter(|m| m.active)
        .map(|m| format!("#define {} {}\n", m.name, m.value))
        .collect();
    if defines.is_empty() {
        return (source.to_string(), 0);
    }
    let count = defines.matches('\n').count() as u32;

    let insert_at = source
        .find("#version")
        .and_then(|v| source[v..].find('\n').map(|e| v + e + 1));
    let text = match insert_at {
        Some(at) => format!("{}{}{}", &source[..at], defines, &source[at..]),
        None => format!("{defines}{source}"),
    };
    (text, count)
}
