use rice_core::{Image, Rect, Surface, blend_over};

use crate::draw::clip_block;

/// An in-memory ARGB surface.
///
/// Fills write pixels through unchanged; blends composite with straight
/// alpha. Everything is limited to the current clip.
#[derive(Clone, Debug)]
pub struct Raster {
    width: i32,
    height: i32,
    pixels: Vec<u32>,
    clip: Rect,
    redraw_requested: bool,
}

impl Raster {
    pub fn new(width: i32, height: i32) -> Self {
        Self::filled(width, height, 0)
    }

    pub fn filled(width: i32, height: i32, argb: u32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            pixels: vec![argb; (width * height) as usize],
            clip: Rect::from_size(width, height),
            redraw_requested: false,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<u32> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[(y * self.width + x) as usize])
    }

    /// Whether anything called [`Surface::request_redraw`] since the last
    /// call to this method.
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }

    /// Snapshot as a shareable image.
    pub fn to_image(&self) -> Image {
        match Image::from_argb(self.width as u32, self.height as u32, self.pixels.clone()) {
            Ok(img) => img,
            Err(e) => {
                log::error!("raster snapshot failed: {e}");
                Image::solid(0, 0, 0)
            }
        }
    }

    fn visible(&self, rect: Rect) -> Option<Rect> {
        rect.intersect(&self.clip)
    }

    fn rows_mut(&mut self, r: Rect) -> impl Iterator<Item = &mut [u32]> {
        let w = self.width as usize;
        self.pixels
            .chunks_exact_mut(w.max(1))
            .skip(r.y as usize)
            .take(r.h as usize)
            .map(move |row| &mut row[r.x as usize..r.right() as usize])
    }
}

impl Surface for Raster {
    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn clip(&self) -> Rect {
        self.clip
    }

    fn set_clip(&mut self, clip: Rect) {
        self.clip = clip.intersect(&self.bounds()).unwrap_or_default();
    }

    fn fill_rect(&mut self, rect: Rect, argb: u32) {
        let Some(r) = self.visible(rect) else {
            return;
        };
        for row in self.rows_mut(r) {
            row.fill(argb);
        }
    }

    fn blend_rect(&mut self, rect: Rect, argb: u32) {
        match argb >> 24 {
            0 => {}
            0xFF => self.fill_rect(rect, argb),
            _ => {
                let Some(r) = self.visible(rect) else {
                    return;
                };
                for row in self.rows_mut(r) {
                    for px in row {
                        *px = blend_over(argb, *px);
                    }
                }
            }
        }
    }

    fn draw_image(&mut self, image: &Image, x: i32, y: i32) {
        let (w, h) = image.size();
        self.draw_rgb(image.pixels(), 0, w as usize, x, y, w, h, true);
    }

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
    ) {
        let Some(block) = clip_block(x, y, w, h, scan, self.clip) else {
            return;
        };
        let stride = self.width as usize;
        for row in 0..block.h as usize {
            let src_start = offset + block.offset + row * scan;
            let Some(src) = argb.get(src_start..src_start + block.w as usize) else {
                log::warn!("draw_rgb: source buffer too short for {w}x{h} block");
                return;
            };
            let dst_start = (block.y as usize + row) * stride + block.x as usize;
            let dst = &mut self.pixels[dst_start..dst_start + block.w as usize];
            if process_alpha {
                for (d, &s) in dst.iter_mut().zip(src) {
                    *d = blend_over(s, *d);
                }
            } else {
                for (d, &s) in dst.iter_mut().zip(src) {
                    *d = s | 0xFF00_0000;
                }
            }
        }
    }

    fn read_pixels(&self, rect: Rect) -> Vec<u32> {
        let Some(r) = rect.intersect(&self.bounds()) else {
            return Vec::new();
        };
        let mut out = Vec::with_capacity((r.w * r.h) as usize);
        for y in r.y..r.bottom() {
            let start = (y * self.width + r.x) as usize;
            out.extend_from_slice(&self.pixels[start..start + r.w as usize]);
        }
        out
    }

    fn request_redraw(&mut self) {
        self.redraw_requested = true;
    }
}
