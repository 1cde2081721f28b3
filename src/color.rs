//! Cell color representation: default, 16/256-color indexed, and true color.

use serde::Serialize;

/// Terminal color representation supporting 16-color, 256-color, and truecolor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    #[default]
    Default,
    Indexed(u8),
    Rgb(u8, u8, u8),
}

/// Serializable color for embedders that want to transport cell state across
/// a process boundary (IPC, snapshot diffing, etc).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum SerializableColor {
    Default,
    Indexed { index: u8 },
    Rgb { r: u8, g: u8, b: u8 },
}

impl From<Color> for SerializableColor {
    fn from(c: Color) -> Self {
        match c {
            Color::Default => SerializableColor::Default,
            Color::Indexed(i) => SerializableColor::Indexed { index: i },
            Color::Rgb(r, g, b) => SerializableColor::Rgb { r, g, b },
        }
    }
}

/// Convert a 256-color index to an RGB tuple using the standard xterm ramp.
/// The first 16 are the shared palette (`Terminal::palette`, embedder
/// theme-dependent); 16-231 are a 6x6x6 color cube; 232-255 are a grayscale
/// ramp.
pub fn indexed_to_rgb(index: u8, palette: &[(u8, u8, u8); 16]) -> (u8, u8, u8) {
    match index {
        0..=15 => palette[index as usize],
        16..=231 => {
            let idx = index - 16;
            let r = idx / 36;
            let g = (idx % 36) / 6;
            let b = idx % 6;
            let to_val = |v: u8| if v == 0 { 0 } else { 55 + 40 * v };
            (to_val(r), to_val(g), to_val(b))
        }
        232..=255 => {
            let v = 8 + 10 * (index - 232);
            (v, v, v)
        }
    }
}

/// Default 16-color ANSI palette (Tokyo Night, matching the teacher's values).
pub const DEFAULT_PALETTE: [(u8, u8, u8); 16] = [
    (0x15, 0x16, 0x1e),
    (0xf7, 0x76, 0x8e),
    (0x9e, 0xce, 0x6a),
    (0xe0, 0xaf, 0x68),
    (0x7a, 0xa2, 0xf7),
    (0xbb, 0x9a, 0xf7),
    (0x7d, 0xcf, 0xff),
    (0xa9, 0xb1, 0xd6),
    (0x41, 0x48, 0x68),
    (0xff, 0x9e, 0x9e),
    (0xb9, 0xf2, 0x7c),
    (0xff, 0x9e, 0x64),
    (0x82, 0xaa, 0xff),
    (0xd4, 0xb0, 0xff),
    (0xa9, 0xe1, 0xff),
    (0xc0, 0xca, 0xf5),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_index_16_is_black() {
        assert_eq!(indexed_to_rgb(16, &DEFAULT_PALETTE), (0, 0, 0));
    }

    #[test]
    fn grayscale_ramp_last_entry() {
        assert_eq!(indexed_to_rgb(255, &DEFAULT_PALETTE), (238, 238, 238));
    }

    #[test]
    fn low_16_use_palette() {
        assert_eq!(indexed_to_rgb(1, &DEFAULT_PALETTE), DEFAULT_PALETTE[1]);
    }
}
