/// Straight (non-premultiplied) ARGB color packed as `0xAARRGGBB`.
///
/// Pixel buffers throughout the engine are plain `u32` slices in the same
/// packing; `Color` is the typed form used at API boundaries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color(pub u32);

impl Color {
    pub const TRANSPARENT: Color = Color(0x0000_0000);
    pub const BLACK: Color = Color(0xFF00_0000);
    pub const WHITE: Color = Color(0xFFFF_FFFF);
    pub const RED: Color = Color(0xFFFF_0000);

    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Color((a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::from_argb(255, r, g, b)
    }

    /// Parses `#RRGGBB` or `#AARRGGBB`. Malformed input yields opaque black.
    pub fn from_hex(hex: &str) -> Self {
        let s = hex.trim_start_matches('#');
        match s.len() {
            6 => u32::from_str_radix(s, 16)
                .map(|v| Color(0xFF00_0000 | v))
                .unwrap_or(Color::BLACK),
            8 => u32::from_str_radix(s, 16)
                .map(Color)
                .unwrap_or(Color::BLACK),
            _ => Color::BLACK,
        }
    }

    pub const fn argb(self) -> u32 {
        self.0
    }

    pub const fn alpha(self) -> u8 {
        alpha(self.0)
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Color((self.0 & 0x00FF_FFFF) | (a as u32) << 24)
    }

    pub const fn is_opaque(self) -> bool {
        self.alpha() == 0xFF
    }

    /// The RGB complement, keeping alpha.
    pub const fn complementary(self) -> Self {
        Color((self.0 & 0xFF00_0000) | (!self.0 & 0x00FF_FFFF))
    }
}

impl From<u32> for Color {
    fn from(v: u32) -> Self {
        Color(v)
    }
}

pub const fn alpha(argb: u32) -> u8 {
    (argb >> 24) as u8
}

/// Any coverage at all, i.e. alpha above zero.
pub const fn is_visible(argb: u32) -> bool {
    argb & 0xFF00_0000 != 0
}

/// Composites `src` over `dst` with straight alpha.
///
/// `src` alpha 255 returns `src` exactly; alpha 0 returns `dst` exactly.
pub fn blend_over(src: u32, dst: u32) -> u32 {
    let sa = src >> 24;
    if sa == 0xFF {
        return src;
    }
    if sa == 0 {
        return dst;
    }
    let da = dst >> 24;
    let inv = 255 - sa;
    // Output alpha, scaled by 255.
    let oa255 = sa * 255 + da * inv;
    if oa255 == 0 {
        return 0;
    }
    let channel = |shift: u32| -> u32 {
        let s = (src >> shift) & 0xFF;
        let d = (dst >> shift) & 0xFF;
        (s * sa * 255 + d * da * inv + oa255 / 2) / oa255
    };
    let oa = (oa255 + 127) / 255;
    (oa.min(255) << 24) | (channel(16).min(255) << 16) | (channel(8).min(255) << 8) | channel(0).min(255)
}
