use serde::{Serialize, Serializer};
use std::fmt;

/// 8-bit RGB color, serialized as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Color {
    /// Color from channel values.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` (the `#` is optional); unreadable channels become 0.
    pub fn hex(s: &str) -> Self {
        let s = s.strip_prefix('#').unwrap_or(s);
        let channel = |i: usize| s.get(i..i + 2).and_then(|c| u8::from_str_radix(c, 16).ok());
        Self { r: channel(0).unwrap_or(0), g: channel(2).unwrap_or(0), b: channel(4).unwrap_or(0) }
    }

    /// Uppercase `#RRGGBB`.
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::rgb(0, 0, 0)
    }
}

// --- Palette ---

/// Series colors in assignment order (matplotlib "tab10" subset).
const DEFAULT_PALETTE: [&str; 8] =
    ["#1F77B4", "#FF7F0E", "#2CA02C", "#D62728", "#9467BD", "#8C564B", "#E377C2", "#7F7F7F"];

/// Color for the `i`-th series of a panel; wraps around.
pub fn palette_color(i: usize) -> Color {
    Color::hex(DEFAULT_PALETTE[i % DEFAULT_PALETTE.len()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip() {
        let c = Color::hex("#1f77b4");
        assert_eq!(c, Color::rgb(0x1F, 0x77, 0xB4));
        assert_eq!(c.to_hex(), "#1F77B4");
    }

    #[test]
    fn short_hex_falls_back_to_zero() {
        assert_eq!(Color::hex("#12"), Color::rgb(0x12, 0, 0));
    }

    #[test]
    fn palette_wraps() {
        assert_eq!(palette_color(0), palette_color(8));
    }
}
