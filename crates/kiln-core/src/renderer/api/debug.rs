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

//! Names and built-in shaders of the identity-encoding debug path.
//!
//! The debug program of a shader pass links the pass's own vertex stage
//! against [`IDENTITY_PIXEL_SHADER`], which writes the value of
//! [`IDENTITY_COLOR_UNIFORM`]. Vertex and instance picking patch the user's
//! vertex stage to forward `gl_VertexID`/`gl_InstanceID` through the
//! varyings below and link it against the matching pick shader.

/// Uniform holding the identity color of the draw being issued.
pub const IDENTITY_COLOR_UNIFORM: &str = "_kiln_dbg_pixel_color";

/// Varying carrying the vertex index to the vertex-pick pixel shader.
pub const VERTEX_ID_VARYING: &str = "_kiln_dbg_vertex_id";

/// Varying carrying the instance index to the instance-pick pixel shader.
pub const INSTANCE_ID_VARYING: &str = "_kiln_dbg_instance_id";

/// Writes the identity color uniform.
pub const IDENTITY_PIXEL_SHADER: &str = r#"#version 330

uniform vec3 _kiln_dbg_pixel_color;
out vec4 outColor;

void main()
{
	outColor = vec4(_kiln_dbg_pixel_color, 1.0f);
}
"#;

/// Encodes the forwarded vertex index into the red, green and blue bytes.
pub const VERTEX_PICK_PIXEL_SHADER: &str = r#"#version 330

flat in int _kiln_dbg_vertex_id;
out vec4 outColor;

void main()
{
	float r = float(_kiln_dbg_vertex_id & 0x000000FF) / 255.0f;
	float g = float((_kiln_dbg_vertex_id & 0x0000FF00) >> 8) / 255.0f;
	float b = float((_kiln_dbg_vertex_id & 0x00FF0000) >> 16) / 255.0f;
	outColor = vec4(r, g, b, 1.0f);
}
"#;

/// Encodes the forwarded instance index into the red, green and blue bytes.
pub const INSTANCE_PICK_PIXEL_SHADER: &str = r#"#version 330

flat in int _kiln_dbg_instance_id;
out vec4 outColor;

void main()
{
	float r = float(_kiln_dbg_instance_id & 0x000000FF) / 255.0f;
	float g = float((_kiln_dbg_instance_id & 0x0000FF00) >> 8) / 255.0f;
	float b = float((_kiln_dbg_instance_id & 0x00FF0000) >> 16) / 255.0f;
	outColor = vec4(r, g, b, 1.0f);
}
"#;
