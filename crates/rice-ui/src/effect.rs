//! Text and image post-processing.
//!
//! An [`Effect`] turns a string or an image into a pixel buffer plus the
//! insets a view has to reserve around its content so the effect (for
//! instance a drop shadow) is not clipped.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rice_canvas::Raster;
use rice_core::{Color, Font, Image, Insets, Rect, Surface};

const SHADOW_OFFSET_X: i32 = 1;
const SHADOW_OFFSET_Y: i32 = 1;
const SHADOW_BLUR_MARGIN: i32 = 3;

/// Normalized 7-tap Gaussian.
const BLUR_KERNEL: [f32; 7] = [
    0.004_568_957_7,
    0.053_275_038,
    0.246_184,
    0.391_665_25,
    0.246_184,
    0.053_275_038,
    0.004_568_957_7,
];

/// `BLUR_KERNEL[i] * alpha` for every tap and alpha level.
static ALPHA_LUT: Lazy<Box<[[f32; 256]; 7]>> = Lazy::new(|| {
    let mut lut = Box::new([[0f32; 256]; 7]);
    for (row, k) in lut.iter_mut().zip(BLUR_KERNEL) {
        for (a, v) in row.iter_mut().enumerate() {
            *v = k * a as f32;
        }
    }
    lut
});

/// An effect result: the pixels plus the insets around the original content.
#[derive(Clone, Debug)]
pub struct Filtered {
    pub image: Image,
    pub padding: Insets,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectKind {
    /// Content is passed through unchanged.
    Plain,
    /// A blurred silhouette in `shadow` color, offset by one pixel down and
    /// right, is composited under the content.
    DropShadow { shadow: u32 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct TextKey {
    text: String,
    max_width: Option<i32>,
    ellipsize: bool,
}

/// A font, a color and a filter, with a one-entry cache per input kind.
///
/// Font and color never change after construction, so a cached result is
/// always valid for the same text and width; a different color needs a
/// different `Effect`.
pub struct Effect {
    font: Arc<dyn Font>,
    color: u32,
    kind: EffectKind,
    last_text: Mutex<Option<(TextKey, Option<Filtered>)>>,
    last_image: Mutex<Option<(Image, Filtered)>>,
    blur_passes: AtomicUsize,
}

impl std::fmt::Debug for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Effect")
            .field("font", &self.font)
            .field("color", &format_args!("{:#010x}", self.color))
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl Effect {
    pub fn new(font: Arc<dyn Font>, color: u32, kind: EffectKind) -> Self {
        Self {
            font,
            color,
            kind,
            last_text: Mutex::new(None),
            last_image: Mutex::new(None),
            blur_passes: AtomicUsize::new(0),
        }
    }

    pub fn plain(font: Arc<dyn Font>, color: u32) -> Self {
        Self::new(font, color, EffectKind::Plain)
    }

    pub fn drop_shadow(font: Arc<dyn Font>, color: u32, shadow: u32) -> Self {
        Self::new(font, color, EffectKind::DropShadow { shadow })
    }

    pub fn font(&self) -> &Arc<dyn Font> {
        &self.font
    }

    pub fn color(&self) -> u32 {
        self.color
    }

    pub fn kind(&self) -> EffectKind {
        self.kind
    }

    /// Largest total horizontal and vertical inset this effect can add.
    pub fn max_padding(&self) -> (i32, i32) {
        match self.kind {
            EffectKind::Plain => (0, 0),
            EffectKind::DropShadow { .. } => (SHADOW_BLUR_MARGIN * 2, SHADOW_BLUR_MARGIN * 2),
        }
    }

    /// How many times the shadow blur has run. Cache hits do not count.
    pub fn blur_passes(&self) -> usize {
        self.blur_passes.load(Ordering::Relaxed)
    }

    /// Renders `text` as an image.
    ///
    /// Without `max_width` the text is one line. Otherwise it is wrapped (or
    /// ellipsized) to fit `max_width` minus the effect's horizontal inset
    /// budget, each line is rendered and filtered on its own and the lines
    /// are stacked top to bottom. Empty text yields `None`.
    pub fn filter_string(&self, text: &str, max_width: Option<i32>, ellipsize: bool) -> Option<Filtered> {
        let key = TextKey {
            text: text.to_string(),
            max_width,
            ellipsize,
        };
        let mut cache = self.last_text.lock();
        if let Some((last, out)) = cache.as_ref()
            && *last == key
        {
            log::debug!("effect text cache hit for {text:?}");
            return out.clone();
        }
        let out = self.render_text(text, max_width, ellipsize);
        *cache = Some((key, out.clone()));
        out
    }

    /// Filters an image. The plain effect hands back the same image; the
    /// drop shadow caches its last result by image identity.
    pub fn filter_image(&self, image: &Image) -> Filtered {
        let EffectKind::DropShadow { shadow } = self.kind else {
            return Filtered {
                image: image.clone(),
                padding: Insets::ZERO,
            };
        };

        let mut cache = self.last_image.lock();
        if let Some((src, out)) = cache.as_ref()
            && src.ptr_eq(image)
        {
            return out.clone();
        }

        let (w, h) = image.size();
        let out = match self.shadow(image.pixels(), w, h, shadow) {
            Some(block) => match Image::from_argb(block.w as u32, block.h as u32, block.argb) {
                Ok(img) => Filtered {
                    image: img,
                    padding: block.padding,
                },
                Err(e) => {
                    log::error!("drop shadow produced a bad buffer: {e}");
                    Filtered {
                        image: image.clone(),
                        padding: Insets::ZERO,
                    }
                }
            },
            None => Filtered {
                image: image.clone(),
                padding: Insets::ZERO,
            },
        };
        *cache = Some((image.clone(), out.clone()));
        out
    }

    fn render_text(&self, text: &str, max_width: Option<i32>, ellipsize: bool) -> Option<Filtered> {
        if text.is_empty() {
            return None;
        }
        let lines = match max_width {
            None => vec![text.to_string()],
            Some(w) => rice_text::fit(text, &*self.font, w - self.max_padding().0, ellipsize),
        };
        if lines.is_empty() {
            return None;
        }

        let mut padding: Option<Insets> = None;
        let mut blocks = Vec::with_capacity(lines.len());
        for line in &lines {
            let block = self.render_line(line);
            if let Some(p) = block.filtered_padding {
                padding = Some(padding.map_or(p, |q| q.min(&p)));
            }
            blocks.push(block);
        }

        let width = blocks.iter().map(|b| b.w).max().unwrap_or(0);
        let height = blocks.iter().map(|b| b.h).sum::<i32>();
        let mut dst = vec![0u32; (width * height) as usize];
        let mut y = 0usize;
        for b in &blocks {
            if !b.argb.is_empty() {
                for (row, src) in b.argb.chunks_exact(b.w as usize).enumerate() {
                    let at = (y + row) * width as usize;
                    dst[at..at + src.len()].copy_from_slice(src);
                }
            }
            y += b.h as usize;
        }

        match Image::from_argb(width as u32, height as u32, dst) {
            Ok(image) => Some(Filtered {
                image,
                padding: padding.unwrap_or(Insets::ZERO),
            }),
            Err(e) => {
                log::error!("text render produced a bad buffer: {e}");
                None
            }
        }
    }

    fn render_line(&self, line: &str) -> Block {
        let w = self.font.string_width(line);
        let h = self.font.height();
        if w <= 0 {
            // Blank line: height only.
            return Block {
                argb: Vec::new(),
                w: 0,
                h,
                padding: Insets::ZERO,
                filtered_padding: None,
            };
        }

        // Backdrop in the complementary color marks pixels the glyphs
        // did not touch.
        let mut key = Color(self.color).complementary().0;
        if key == self.color {
            key = 0;
        }
        let mut raster = Raster::new(w, h);
        if key != 0 {
            raster.fill_rect(Rect::from_size(w, h), key);
        }
        let key = raster.pixel(0, 0).unwrap_or(0);
        self.font.draw_string(&mut raster, line, 0, 0, self.color);
        let mut argb = raster.read_pixels(Rect::from_size(w, h));
        for px in argb.iter_mut().filter(|px| **px == key) {
            *px = 0;
        }

        match self.kind {
            EffectKind::Plain => Block {
                argb,
                w,
                h,
                padding: Insets::ZERO,
                filtered_padding: Some(Insets::ZERO),
            },
            EffectKind::DropShadow { shadow } => match self.shadow(&argb, w, h, shadow) {
                Some(mut block) => {
                    block.filtered_padding = Some(block.padding);
                    block
                }
                None => Block {
                    argb,
                    w,
                    h,
                    padding: Insets::ZERO,
                    filtered_padding: None,
                },
            },
        }
    }

    /// Drop shadow over a raw buffer. `None` when nothing in it is visible.
    fn shadow(&self, src: &[u32], w: i32, h: i32, shadow: u32) -> Option<Block> {
        let content = content_bounds(src, w, h)?;
        self.blur_passes.fetch_add(1, Ordering::Relaxed);

        let (max_h, max_v) = self.max_padding();
        let dst_w = w.max(content.w + max_h);
        let dst_h = h.max(content.h + max_v);
        let x_off = if dst_w <= w { 0 } else { ((dst_w - w) / 2 - SHADOW_OFFSET_X).max(0) };
        let y_off = if dst_h <= h { 0 } else { ((dst_h - h) / 2 - SHADOW_OFFSET_Y).max(0) };
        let padding = Insets::new(x_off, y_off, dst_w - (w + x_off), dst_h - (h + y_off));

        let (dw, dh) = (dst_w as usize, dst_h as usize);
        // Transparent pixels carry the shadow RGB so blurred edges keep it.
        let mut dst = vec![shadow & 0x00FF_FFFF; dw * dh];

        // Hard shadow under every fully opaque source pixel.
        for y in content.y..content.bottom() {
            let sy = y + y_off + SHADOW_OFFSET_Y;
            if sy >= dst_h {
                break;
            }
            for x in content.x..content.right() {
                let sx = x + x_off + SHADOW_OFFSET_X;
                if sx < dst_w && src[(y * w + x) as usize] >> 24 == 0xFF {
                    dst[sy as usize * dw + sx as usize] = shadow;
                }
            }
        }

        let mut tmp = vec![0u32; dw * dh];
        convolve_alpha(&dst, &mut tmp, dw, dh);
        convolve_alpha(&tmp, &mut dst, dh, dw);

        // Source on top.
        for y in content.y..content.bottom() {
            for x in content.x..content.right() {
                let c = src[(y * w + x) as usize];
                if rice_core::is_visible(c) {
                    dst[(y + y_off) as usize * dw + (x + x_off) as usize] = c;
                }
            }
        }

        Some(Block {
            argb: dst,
            w: dst_w,
            h: dst_h,
            padding,
            filtered_padding: None,
        })
    }
}

struct Block {
    argb: Vec<u32>,
    w: i32,
    h: i32,
    padding: Insets,
    /// Insets to report for text; `None` when the line was not filtered.
    filtered_padding: Option<Insets>,
}

/// Tight bounds of the pixels with any alpha.
fn content_bounds(argb: &[u32], w: i32, h: i32) -> Option<Rect> {
    if w <= 0 || h <= 0 {
        return None;
    }
    let row = |y: i32| &argb[(y * w) as usize..((y + 1) * w) as usize];
    let visible = |y: i32| row(y).iter().any(|&c| rice_core::is_visible(c));

    let top = (0..h).find(|&y| visible(y))?;
    let bottom = (top..h).rev().find(|&y| visible(y))?;
    let mut left = w;
    let mut right = 0;
    for y in top..=bottom {
        let r = row(y);
        if let Some(x) = r.iter().position(|&c| rice_core::is_visible(c)) {
            left = left.min(x as i32);
        }
        if let Some(x) = r.iter().rposition(|&c| rice_core::is_visible(c)) {
            right = right.max(x as i32);
        }
    }
    Some(Rect::new(left, top, right - left + 1, bottom - top + 1))
}

/// One horizontal blur pass over the alpha channel, writing the result
/// transposed (`out[y + x * height]`) so a second call blurs vertically and
/// restores the layout.
fn convolve_alpha(src: &[u32], out: &mut [u32], width: usize, height: usize) {
    let lut = &**ALPHA_LUT;
    let half = (BLUR_KERNEL.len() / 2) as isize;
    for y in 0..height {
        let row = &src[y * width..(y + 1) * width];
        for x in 0..width {
            let mut a = 0f32;
            for (k, taps) in lut.iter().enumerate() {
                let ix = x as isize + k as isize - half;
                if ix < 0 || ix >= width as isize {
                    continue;
                }
                let pa = (row[ix as usize] >> 24) as usize;
                if pa > 0 {
                    a += taps[pa];
                }
            }
            let ia = if a > 254.5 { 255 } else { a as u32 };
            out[y + x * height] = ia << 24 | (row[x] & 0x00FF_FFFF);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rice_text::BlockFont;

    const SHADOW: u32 = 0xC000_0000;

    fn font() -> Arc<dyn Font> {
        Arc::new(BlockFont::new(10, 12))
    }

    #[test]
    fn test_plain_image_is_identity() {
        let e = Effect::plain(font(), 0xFF00_0000);
        let img = Image::solid(4, 4, 0xFFFF_0000);
        let out = e.filter_image(&img);
        assert!(out.image.ptr_eq(&img));
        assert_eq!(out.padding, Insets::ZERO);
        assert_eq!(e.blur_passes(), 0);
    }

    #[test]
    fn test_drop_shadow_insets_non_negative() {
        let e = Effect::drop_shadow(font(), 0xFFFF_FFFF, SHADOW);
        for n in 1..=24 {
            let img = Image::solid(n, n, 0xFF33_6699);
            let out = e.filter_image(&img);
            let p = out.padding;
            assert!(p.left >= 0 && p.top >= 0 && p.right >= 0 && p.bottom >= 0, "n={n}: {p:?}");
            assert!(out.image.width() >= n && out.image.height() >= n);
            assert_eq!(out.image.width() as i32, n as i32 + p.horizontal());
            assert_eq!(out.image.height() as i32, n as i32 + p.vertical());
        }
    }

    #[test]
    fn test_drop_shadow_keeps_source_on_top() {
        let e = Effect::drop_shadow(font(), 0xFFFF_FFFF, SHADOW);
        let img = Image::solid(4, 4, 0xFF33_6699);
        let out = e.filter_image(&img);
        assert_eq!(out.padding, Insets::new(2, 2, 4, 4));
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(out.image.pixel(x + 2, y + 2), Some(0xFF33_6699));
            }
        }
        // Shadow spills past the bottom-right corner, fading outwards.
        let near = out.image.pixel(7, 7).unwrap() >> 24;
        let far = out.image.pixel(9, 9).unwrap() >> 24;
        assert!(near > 0);
        assert!(near > far);
        assert_eq!(out.image.pixel(7, 7).unwrap() & 0x00FF_FFFF, 0);
    }

    #[test]
    fn test_filter_image_cached_by_identity() {
        let e = Effect::drop_shadow(font(), 0xFFFF_FFFF, SHADOW);
        let img = Image::solid(6, 6, 0xFF00_FF00);
        let a = e.filter_image(&img);
        let b = e.filter_image(&img.clone());
        assert!(a.image.ptr_eq(&b.image));
        assert_eq!(e.blur_passes(), 1);

        // Equal pixels, different buffer: recomputed.
        let other = Image::solid(6, 6, 0xFF00_FF00);
        let c = e.filter_image(&other);
        assert!(!c.image.ptr_eq(&a.image));
        assert_eq!(e.blur_passes(), 2);
    }

    #[test]
    fn test_transparent_image_not_shadowed() {
        let e = Effect::drop_shadow(font(), 0xFFFF_FFFF, SHADOW);
        let img = Image::solid(5, 5, 0);
        let out = e.filter_image(&img);
        assert!(out.image.ptr_eq(&img));
        assert_eq!(out.padding, Insets::ZERO);
    }

    #[test]
    fn test_plain_text_keys_out_background() {
        let e = Effect::plain(font(), 0xFF00_0000);
        let out = e.filter_string("AB", None, false).unwrap();
        assert_eq!(out.image.size(), (20, 12));
        assert_eq!(out.image.pixel(0, 0), Some(0));
        assert_eq!(out.image.pixel(1, 1), Some(0xFF00_0000));
        assert_eq!(out.padding, Insets::ZERO);
    }

    #[test]
    fn test_wrapped_text_stacks_lines() {
        let e = Effect::plain(font(), 0xFF00_0000);
        let out = e.filter_string("AAAA BBBB", Some(45), false).unwrap();
        assert_eq!(out.image.size(), (40, 24));
    }

    #[test]
    fn test_blank_lines_keep_height() {
        let e = Effect::plain(font(), 0xFF00_0000);
        let out = e.filter_string("A\n\nB", Some(100), false).unwrap();
        assert_eq!(out.image.size(), (10, 36));
        assert_eq!(out.image.pixel(1, 13), Some(0));
        assert_eq!(out.image.pixel(1, 25), Some(0xFF00_0000));
    }

    #[test]
    fn test_empty_text_is_none() {
        let e = Effect::plain(font(), 0xFF00_0000);
        assert!(e.filter_string("", None, false).is_none());
    }

    #[test]
    fn test_text_cache_hit() {
        let e = Effect::drop_shadow(font(), 0xFFFF_FFFF, SHADOW);
        let a = e.filter_string("Hi", Some(100), false).unwrap();
        let b = e.filter_string("Hi", Some(100), false).unwrap();
        assert!(a.image.ptr_eq(&b.image));
        assert_eq!(e.blur_passes(), 1);

        // A different requested width is a different key.
        e.filter_string("Hi", Some(90), false);
        assert_eq!(e.blur_passes(), 2);
    }

    #[test]
    fn test_drop_shadow_text_reports_insets() {
        let e = Effect::drop_shadow(font(), 0xFFFF_FFFF, SHADOW);
        let out = e.filter_string("A", None, false).unwrap();
        let p = out.padding;
        assert!(p.left >= 0 && p.top >= 0 && p.right > 0 && p.bottom >= 0);
        assert_eq!(out.image.width() as i32, 10 + p.horizontal());
    }
}
