use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An sRGB color with components in `[0, 1]`.
///
/// Colors are stored the way users write them (hex strings, CSS names) and
/// converted to linear space only when handed to the GPU.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

/// Errors from color parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    #[error("invalid hex color: {0:?}")]
    InvalidHex(String),
    #[error("unknown color name: {0:?}")]
    UnknownName(String),
}

const NAMED: &[(&str, u32)] = &[
    ("black", 0x000000),
    ("white", 0xffffff),
    ("grey", 0x808080),
    ("gray", 0x808080),
    ("red", 0xff0000),
    ("green", 0x008000),
    ("blue", 0x0000ff),
    ("yellow", 0xffff00),
    ("orange", 0xffa500),
    ("pink", 0xffc0cb),
];

impl Color {
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` value.
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
        Self::rgb(channel(16), channel(8), channel(0))
    }

    /// Parse `#rrggbb`, `#rgb`, `0xrrggbb` or a CSS color name.
    pub fn parse(s: &str) -> Result<Self, ColorError> {
        let s = s.trim();
        let digits = s
            .strip_prefix('#')
            .or_else(|| s.strip_prefix("0x"))
            .or_else(|| s.strip_prefix("0X"));

        let Some(digits) = digits else {
            let lower = s.to_ascii_lowercase();
            return NAMED
                .iter()
                .find(|(name, _)| *name == lower)
                .map(|(_, hex)| Self::from_hex(*hex))
                .ok_or_else(|| ColorError::UnknownName(s.to_string()));
        };

        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorError::InvalidHex(s.to_string()));
        }
        let value = u32::from_str_radix(digits, 16).map_err(|_| ColorError::InvalidHex(s.to_string()))?;
        match digits.len() {
            6 => Ok(Self::from_hex(value)),
            3 => {
                // #abc expands to #aabbcc
                let r = (value >> 8) & 0xf;
                let g = (value >> 4) & 0xf;
                let b = value & 0xf;
                Ok(Self::from_hex((r * 0x11) << 16 | (g * 0x11) << 8 | b * 0x11))
            }
            _ => Err(ColorError::InvalidHex(s.to_string())),
        }
    }

    /// Packed `0xRRGGBB`, rounding each channel.
    pub fn to_hex(&self) -> u32 {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
        q(self.r) << 16 | q(self.g) << 8 | q(self.b)
    }

    pub fn to_hex_string(&self) -> String {
        format!("#{:06x}", self.to_hex())
    }

    pub fn to_array(&self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    /// Convert to linear-light components for shading.
    pub fn to_linear(&self) -> [f32; 3] {
        fn decode(c: f32) -> f32 {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        [decode(self.r), decode(self.g), decode(self.b)]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Color {
    type Error = ColorError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_hex_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex_string())
    }
}
