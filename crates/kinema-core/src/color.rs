use crate::interpolate::Interpolate;

/// 8-bit RGBA color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color(pub u8, pub u8, pub u8, pub u8);

impl Color {
    pub const TRANSPARENT: Color = Color(0, 0, 0, 0);
    pub const BLACK: Color = Color(0, 0, 0, 255);
    pub const WHITE: Color = Color(255, 255, 255, 255);

    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Color(r, g, b, 255)
    }
    pub fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color(r, g, b, a)
    }
    /// Parses `#RRGGBB` or `#RRGGBBAA`. Malformed channels read as 0 (alpha as
    /// 255); any other length yields opaque black.
    pub fn from_hex(hex: &str) -> Self {
        let s = hex.trim_start_matches('#');
        let channel = |range: std::ops::Range<usize>, fallback: u8| {
            s.get(range)
                .and_then(|c| u8::from_str_radix(c, 16).ok())
                .unwrap_or(fallback)
        };
        match s.len() {
            6 => Color(channel(0..2, 0), channel(2..4, 0), channel(4..6, 0), 255),
            8 => Color(
                channel(0..2, 0),
                channel(2..4, 0),
                channel(4..6, 0),
                channel(6..8, 255),
            ),
            _ => Color::BLACK,
        }
    }
    pub fn with_alpha(self, a: u8) -> Self {
        Color(self.0, self.1, self.2, a)
    }
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}{:02X}", self.0, self.1, self.2, self.3)
    }
}

/// Channel-wise blend in sRGB space, rounded and clamped to `0..=255`.
impl Interpolate for Color {
    fn interpolate(&self, other: &Self, t: f64) -> Self {
        fn mix(a: u8, b: u8, t: f64) -> u8 {
            (a as f64 + (b as f64 - a as f64) * t).round().clamp(0.0, 255.0) as u8
        }
        Color(
            mix(self.0, other.0, t),
            mix(self.1, other.1, t),
            mix(self.2, other.2, t),
            mix(self.3, other.3, t),
        )
    }
}
