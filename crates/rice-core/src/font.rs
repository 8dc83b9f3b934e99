use crate::render_api::Surface;

/// Metrics and glyph drawing for a single face at a single size.
pub trait Font: Send + Sync + std::fmt::Debug {
    fn char_width(&self, ch: char) -> i32;

    fn string_width(&self, s: &str) -> i32 {
        s.chars().map(|c| self.char_width(c)).sum()
    }

    /// Line height in pixels.
    fn height(&self) -> i32;

    /// Distance from the top of a line to the baseline.
    fn baseline(&self) -> i32;

    /// Draws `text` with its top-left corner at `(x, y)`.
    fn draw_string(&self, surface: &mut dyn Surface, text: &str, x: i32, y: i32, argb: u32);
}
