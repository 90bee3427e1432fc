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

//! Identity encoding of debug draws.
//!
//! Each pickable draw of a debug render gets an id counting up from 1.
//! The id is packed into the red, green and blue bytes, low byte first,
//! so 2^24 - 1 draws can be told apart. Id 0 means "nothing drawn here".

use kiln_core::math::Vec3;

/// First id handed out in a debug render.
pub const FIRST_IDENTITY: u32 = 1;

/// Largest id that fits the three color bytes.
pub const MAX_IDENTITY: u32 = 0x00FF_FFFF;

/// The three identity bytes of `id`.
pub fn identity_bytes(id: u32) -> [u8; 3] {
    [
        (id & 0xFF) as u8,
        ((id >> 8) & 0xFF) as u8,
        ((id >> 16) & 0xFF) as u8,
    ]
}

/// The normalized color uploaded to the identity uniform.
pub fn identity_color(id: u32) -> Vec3 {
    let [r, g, b] = identity_bytes(id);
    Vec3::new(r as f32, g as f32, b as f32) / 255.0
}

/// Recovers an id (or a vertex/instance index) from a read-back pixel.
/// Alpha is ignored.
pub fn decode_identity(pixel: [u8; 4]) -> u32 {
    pixel[0] as u32 | (pixel[1] as u32) << 8 | (pixel[2] as u32) << 16
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_core::math::LinearRgba;

    #[test]
    fn test_identity_survives_color_quantization() {
        for id in [1, 2, 255, 256, 257, 65_535, 65_536, 1_234_567, MAX_IDENTITY] {
            let c = identity_color(id);
            let pixel = LinearRgba::rgb(c.x, c.y, c.z).to_rgba8();
            assert_eq!(decode_identity(pixel), id, "id {id} must round-trip through rgba8");
        }
    }

    #[test]
    fn test_bytes_are_low_first() {
        assert_eq!(identity_bytes(0x0003_0201), [1, 2, 3]);
        assert_eq!(decode_identity([1, 2, 3, 0]), 0x0003_0201);
    }
}
