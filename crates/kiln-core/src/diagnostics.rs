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

//! Build diagnostics and the message sink interface.
//!
//! The executor never formats or displays diagnostics itself. Compile
//! results are pushed to a [`MessageSink`], grouped by the owning item's
//! name, and raw compiler logs are translated into line-corrected
//! [`Message`]s by [`parse_compiler_log`].

use crate::renderer::ShaderStage;
use std::fmt::Debug;

/// How serious a message is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    /// The item cannot render.
    Error,
    /// The item renders but something is off.
    Warning,
    /// Informational, e.g. a successful compile.
    Message,
}

/// A single diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Severity of the message.
    pub severity: Severity,
    /// Group, normally the name of the pipeline item it belongs to.
    pub group: String,
    /// Message text.
    pub text: String,
    /// Source line in the user's file, when known.
    pub line: Option<u32>,
    /// Stage the message refers to, when known.
    pub stage: Option<ShaderStage>,
}

impl Message {
    /// A message with no source location.
    pub fn new(severity: Severity, group: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            severity,
            group: group.into(),
            text: text.into(),
            line: None,
            stage: None,
        }
    }

    /// Attaches the stage the message refers to.
    pub fn with_stage(mut self, stage: ShaderStage) -> Self {
        self.stage = Some(stage);
        self
    }
}

/// Receives build results. Implementations must be cheap to call.
pub trait MessageSink: Send + Sync + Debug {
    /// Records a message.
    fn add(&self, message: Message);

    /// Drops every message of a group.
    fn clear_group(&self, group: &str);

    /// Records several messages.
    fn add_all(&self, messages: Vec<Message>) {
        for message in messages {
            self.add(message);
        }
    }
}

/// Translates a raw compiler log into messages.
///
/// Understands the `0(12) : error C0000: ...`, `ERROR: 0:12: ...` and
/// `0:12(3): error: ...` styles. `line_bias` is subtracted from every line
/// number so it points back into the user's file; lines are clamped at 1.
/// Lines that match no known style become stage-tagged errors without a
/// line number.
pub fn parse_compiler_log(group: &str, stage: ShaderStage, log: &str, line_bias: u32) -> Vec<Message> {
    log.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|raw| {
            let (severity, line, text) =
                parse_line(raw).unwrap_or((Severity::Error, None, raw.to_string()));
            Message {
                severity,
                group: group.to_string(),
                text,
                line: line.map(|l| l.saturating_sub(line_bias).max(1)),
                stage: Some(stage),
            }
        })
        .collect()
}

fn parse_line(line: &str) -> Option<(Severity, Option<u32>, String)> {
    // ERROR: 0:12: 'x' : undeclared identifier
    for (prefix, severity) in [("ERROR:", Severity::Error), ("WARNING:", Severity::Warning)] {
        if let Some(rest) = line.strip_prefix(prefix) {
            let mut parts = rest.trim_start().splitn(3, ':');
            let _file = parts.next()?;
            let number = parts.next()?.trim().parse().ok()?;
            let text = parts.next().unwrap_or("").trim().to_string();
            return Some((severity, Some(number), text));
        }
    }

    let file_end = line.find(|c: char| !c.is_ascii_digit())?;
    if file_end == 0 {
        return None;
    }
    let rest = &line[file_end..];

    // 0(12) : error C0000: syntax error
    if let Some(rest) = rest.strip_prefix('(') {
        let close = rest.find(')')?;
        let number = rest[..close].parse().ok()?;
        let tail = rest[close + 1..].trim_start().strip_prefix(':')?.trim_start();
        let (severity, tail) = severity_word(tail)?;
        let text = tail.split_once(':').map_or(tail, |(_, t)| t).trim().to_string();
        return Some((severity, Some(number), text));
    }

    // 0:12(3): error: syntax error
    if let Some(rest) = rest.strip_prefix(':') {
        let open = rest.find('(')?;
        let number = rest[..open].parse().ok()?;
        let tail = rest[open..].split_once("):")?.1.trim_start();
        let (severity, tail) = severity_word(tail)?;
        let text = tail.strip_prefix(':').unwrap_or(tail).trim().to_string();
        return Some((severity, Some(number), text));
    }

    None
}

fn severity_word(text: &str) -> Option<(Severity, &str)> {
    if let Some(rest) = text.strip_prefix("error") {
        Some((Severity::Error, rest))
    } else if let Some(rest) = text.strip_prefix("warning") {
        Some((Severity::Warning, rest))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_nvidia_style() {
        let msgs = parse_compiler_log(
            "Simple",
            ShaderStage::Pixel,
            "0(14) : error C1008: undefined variable \"color\"",
            4,
        );
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].severity, Severity::Error);
        assert_eq!(msgs[0].line, Some(10));
        assert_eq!(msgs[0].text, "undefined variable \"color\"");
        assert_eq!(msgs[0].stage, Some(ShaderStage::Pixel));
        assert_eq!(msgs[0].group, "Simple");
    }

    #[test]
    fn test_parses_khronos_and_mesa_styles() {
        let log = "ERROR: 0:7: 'x' : undeclared identifier\n0:3(12): warning: unused variable\n";
        let msgs = parse_compiler_log("Simple", ShaderStage::Vertex, log, 0);
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].line, Some(7));
        assert_eq!(msgs[0].text, "'x' : undeclared identifier");
        assert_eq!(msgs[1].severity, Severity::Warning);
        assert_eq!(msgs[1].line, Some(3));
        assert_eq!(msgs[1].text, "unused variable");
    }

    #[test]
    fn test_line_bias_clamps_at_first_line() {
        let msgs = parse_compiler_log("Simple", ShaderStage::Vertex, "0(2) : error C0000: bad", 10);
        assert_eq!(msgs[0].line, Some(1));
    }

    #[test]
    fn test_unknown_lines_become_errors_without_location() {
        let msgs = parse_compiler_log("Simple", ShaderStage::Geometry, "link failed\n\n", 0);
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].severity, Severity::Error);
        assert_eq!(msgs[0].line, None);
        assert_eq!(msgs[0].text, "link failed");
    }
}
