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

//! Runtime configuration of the render engine.

use crate::math::LinearRgba;
use serde::{Deserialize, Serialize};

/// Engine settings. Missing fields take their defaults when deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// MSAA sample count for the window and render textures. 1 disables MSAA.
    pub msaa_samples: u32,
    /// Whether the window color target carries an alpha channel.
    pub use_alpha_channel: bool,
    /// Clear color of the window target in normal renders.
    pub clear_color: LinearRgba,
    /// Ordered include roots. `"."` is always searched last.
    pub include_paths: Vec<String>,
    /// Whether the device runs compute shaders.
    pub compute_supported: bool,
    /// Minimum time between two cache reconciliations while the pipeline
    /// length is unchanged.
    pub cache_check_interval_ms: u64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            msaa_samples: 1,
            use_alpha_channel: false,
            clear_color: LinearRgba::new(0.0, 0.0, 0.0, 1.0),
            include_paths: Vec::new(),
            compute_supported: true,
            cache_check_interval_ms: 500,
        }
    }
}

impl RenderSettings {
    /// Parses settings from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Whether a render with the given mode uses multisampling.
    #[inline]
    pub fn is_msaa(&self, debug: bool) -> bool {
        self.msaa_samples != 1 && !debug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = RenderSettings::from_json_str(r#"{ "msaa_samples": 4, "include_paths": ["inc"] }"#)
            .expect("valid settings");
        assert_eq!(settings.msaa_samples, 4);
        assert_eq!(settings.include_paths, vec!["inc".to_string()]);
        assert!(settings.compute_supported);
        assert_eq!(settings.cache_check_interval_ms, 500);
    }

    #[test]
    fn test_debug_renders_never_multisample() {
        let settings = RenderSettings {
            msaa_samples: 8,
            ..Default::default()
        };
        assert!(settings.is_msaa(false));
        assert!(!settings.is_msaa(true));
        assert!(!RenderSettings::default().is_msaa(false));
    }
}
