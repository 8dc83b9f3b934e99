use std::collections::HashMap;

use ab_glyph::{Font as _, FontArc, PxScale, ScaleFont, point};
use parking_lot::Mutex;
use rice_core::{Font, Rect, Surface};

/// An outline font rendered with `ab_glyph` at one pixel size.
///
/// Advances are rounded to whole pixels and cached per character.
pub struct GlyphFont {
    font: FontArc,
    scale: PxScale,
    advances: Mutex<HashMap<char, i32, ahash::RandomState>>,
}

impl std::fmt::Debug for GlyphFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphFont")
            .field("px", &self.scale.y)
            .finish_non_exhaustive()
    }
}

impl GlyphFont {
    pub fn from_bytes(bytes: Vec<u8>, px: f32) -> Result<Self, ab_glyph::InvalidFont> {
        let font = FontArc::try_from_vec(bytes)?;
        Ok(Self::new(font, px))
    }

    pub fn new(font: FontArc, px: f32) -> Self {
        Self {
            font,
            scale: PxScale::from(px),
            advances: Mutex::new(HashMap::default()),
        }
    }
}

impl Font for GlyphFont {
    fn char_width(&self, ch: char) -> i32 {
        if let Some(&w) = self.advances.lock().get(&ch) {
            return w;
        }
        let scaled = self.font.as_scaled(self.scale);
        let id = self.font.glyph_id(ch);
        if id.0 == 0 {
            log::debug!("font has no glyph for {ch:?}");
        }
        let w = scaled.h_advance(id).round() as i32;
        self.advances.lock().insert(ch, w);
        w
    }

    fn height(&self) -> i32 {
        let scaled = self.font.as_scaled(self.scale);
        (scaled.ascent() - scaled.descent() + scaled.line_gap()).ceil() as i32
    }

    fn baseline(&self) -> i32 {
        self.font.as_scaled(self.scale).ascent().round() as i32
    }

    fn draw_string(&self, surface: &mut dyn Surface, text: &str, x: i32, y: i32, argb: u32) {
        let base_alpha = (argb >> 24) as f32;
        let rgb = argb & 0x00FF_FFFF;
        let baseline = (y + self.baseline()) as f32;
        let mut pen = x;
        for ch in text.chars() {
            let glyph = self
                .font
                .glyph_id(ch)
                .with_scale_and_position(self.scale, point(pen as f32, baseline));
            if let Some(outline) = self.font.outline_glyph(glyph) {
                let bounds = outline.px_bounds();
                let (ox, oy) = (bounds.min.x as i32, bounds.min.y as i32);
                outline.draw(|gx, gy, coverage| {
                    let a = (coverage.clamp(0.0, 1.0) * base_alpha).round() as u32;
                    if a > 0 {
                        let px = Rect::new(ox + gx as i32, oy + gy as i32, 1, 1);
                        surface.blend_rect(px, a << 24 | rgb);
                    }
                });
            }
            pen += self.char_width(ch);
        }
    }
}
