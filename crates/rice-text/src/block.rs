use rice_core::{Font, Rect, Surface};

/// A font without glyph shapes: every character advances by the same
/// amount and visible characters are drawn as solid blocks.
///
/// Spaces and control characters advance but draw nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockFont {
    pub advance: i32,
    pub line_height: i32,
}

impl Default for BlockFont {
    fn default() -> Self {
        Self::new(10, 12)
    }
}

impl BlockFont {
    pub const fn new(advance: i32, line_height: i32) -> Self {
        Self {
            advance,
            line_height,
        }
    }
}

impl Font for BlockFont {
    fn char_width(&self, _ch: char) -> i32 {
        self.advance
    }

    fn height(&self) -> i32 {
        self.line_height
    }

    fn baseline(&self) -> i32 {
        self.line_height - self.line_height / 6
    }

    fn draw_string(&self, surface: &mut dyn Surface, text: &str, x: i32, y: i32, argb: u32) {
        let mut pen = x;
        for ch in text.chars() {
            if !ch.is_whitespace() && !ch.is_control() {
                // One pixel of spacing on every side of the block.
                let block = Rect::new(pen + 1, y + 1, self.advance - 2, self.baseline() - 1);
                if block.w > 0 && block.h > 0 {
                    surface.fill_rect(block, argb);
                }
            }
            pen += self.advance;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rice_canvas::Raster;

    #[test]
    fn test_block_metrics() {
        let f = BlockFont::default();
        assert_eq!(f.string_width("AAAA BBBB"), 90);
        assert_eq!(f.height(), 12);
        assert_eq!(f.baseline(), 10);
    }

    #[test]
    fn test_spaces_draw_nothing() {
        let f = BlockFont::default();
        let mut r = Raster::new(30, 12);
        f.draw_string(&mut r, "A B", 0, 0, 0xFF00_0000);
        assert_eq!(r.pixel(1, 1), Some(0xFF00_0000));
        assert_eq!(r.pixel(15, 5), Some(0));
        assert_eq!(r.pixel(21, 1), Some(0xFF00_0000));
        assert_eq!(r.pixel(0, 0), Some(0));
    }
}
