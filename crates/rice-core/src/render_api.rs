use crate::geometry::Rect;
use crate::image::Image;

/// A pixel target that views paint into.
///
/// Coordinates are absolute surface pixels. Every drawing call is limited to
/// the current clip; a surface starts with its clip covering itself.
pub trait Surface {
    fn width(&self) -> i32;
    fn height(&self) -> i32;

    fn clip(&self) -> Rect;
    fn set_clip(&mut self, clip: Rect);

    /// Fills `rect` replacing pixels, alpha included.
    fn fill_rect(&mut self, rect: Rect, argb: u32);

    /// Composites `argb` over `rect`.
    fn blend_rect(&mut self, rect: Rect, argb: u32);

    /// Composites `image` with its top-left corner at `(x, y)`.
    fn draw_image(&mut self, image: &Image, x: i32, y: i32);

    /// Draws a `w x h` block from `argb`, reading rows `scan` values apart.
    /// Without `process_alpha` the source is treated as opaque.
    #[allow(clippy::too_many_arguments)]
    fn draw_rgb(
        &mut self,
        argb: &[u32],
        offset: usize,
        scan: usize,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        process_alpha: bool,
    );

    /// Reads back the pixels of `rect`, clamped to the surface.
    fn read_pixels(&self, rect: Rect) -> Vec<u32>;

    /// Asks the host for another frame. Offscreen surfaces ignore it.
    fn request_redraw(&mut self) {}
}
